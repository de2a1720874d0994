//! Point filters.
//!
//! A [Filter] is an ordered list of [Criterion]s. A point is dropped by the first criterion that
//! matches it, and that criterion's counter is incremented. Filters are usually built from
//! command tokens:
//!
//! ```
//! use lasstream::{Filter, Point};
//! let mut filter: Filter = "-drop_z_below 0.5 -keep_class 2".parse().unwrap();
//! let mut point = Point::default();
//! point.classification = 2;
//! assert!(filter.filter(&point));
//! point.set_z(1.).unwrap();
//! assert!(!filter.filter(&point));
//! assert_eq!(vec![("drop_z_below", 1), ("keep_class", 0)], filter.counts().collect::<Vec<_>>());
//! ```
//!
//! `-filter_and` and `-filter_or` replace the two criteria right before them with their
//! combination:
//!
//! ```
//! use lasstream::Filter;
//! let filter: Filter = "-drop_first -drop_class 2 -filter_and".parse().unwrap();
//! assert_eq!(1, filter.len());
//! ```

mod criterion;
mod parse;

pub use self::criterion::{Attribute, Criterion, DEFAULT_SEED, Flag, IntervalKind, ReturnClass};

use crate::{Point, Result};
use log::{Level, log};

/// An ordered list of criteria with per-criterion drop counters.
#[derive(Clone, Debug, Default)]
pub struct Filter {
    criteria: Vec<Criterion>,
    counts: Vec<u64>,
}

impl Filter {
    /// Creates an empty filter, which keeps every point.
    pub fn new() -> Filter {
        Filter::default()
    }

    /// Parses command tokens, e.g. `["-keep_x", "10", "20"]`.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasstream::Filter;
    /// let filter = Filter::parse(&["-keep_x", "10", "20", "-drop_withheld"]).unwrap();
    /// assert_eq!(2, filter.len());
    /// assert!(Filter::parse(&["-keep_class", "2", "-drop_class", "3"]).is_err());
    /// ```
    pub fn parse<S: AsRef<str>>(tokens: &[S]) -> Result<Filter> {
        parse::parse(tokens)
    }

    /// Appends a criterion.
    pub fn push(&mut self, criterion: Criterion) {
        self.criteria.push(criterion);
        self.counts.push(0);
    }

    /// Returns the criteria, in evaluation order.
    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    /// Returns the number of top-level criteria.
    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    /// Returns true if this filter has no criteria.
    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    /// Returns true if the point should be dropped.
    pub fn filter(&mut self, point: &Point) -> bool {
        for (criterion, count) in self.criteria.iter_mut().zip(&mut self.counts) {
            if criterion.filter(point) {
                *count += 1;
                return true;
            }
        }
        false
    }

    /// Clears the state of every criterion and zeroes the counters.
    pub fn reset(&mut self) {
        for criterion in &mut self.criteria {
            criterion.reset();
        }
        self.counts.iter_mut().for_each(|count| *count = 0);
    }

    /// Returns the [selective](crate::selective) bits of every field any criterion needs.
    pub fn decompress_selective(&self) -> u32 {
        self.criteria
            .iter()
            .fold(0, |bits, criterion| bits | criterion.decompress_selective())
    }

    /// Renders the tokens that recreate this filter.
    pub fn command(&self) -> String {
        self.criteria
            .iter()
            .map(Criterion::command)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Returns each criterion's name with the number of points it dropped.
    pub fn counts(&self) -> impl Iterator<Item = (&'static str, u64)> + '_ {
        self.criteria
            .iter()
            .zip(&self.counts)
            .map(|(criterion, &count)| (criterion.name(), count))
    }

    /// Logs the drop counts.
    pub fn report(&self) {
        for (criterion, count) in self.criteria.iter().zip(&self.counts) {
            log!(
                Level::Info,
                "{} dropped {} point(s)",
                criterion.command(),
                count
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_match_wins() {
        let mut filter = Filter::new();
        filter.push(Criterion::drop_x_above(-1.));
        filter.push(Criterion::drop_y_above(-1.));
        assert!(filter.filter(&Point::default()));
        let counts: Vec<_> = filter.counts().collect();
        assert_eq!(vec![("drop_x_above", 1), ("drop_y_above", 0)], counts);
    }

    #[test]
    fn empty_filter_keeps() {
        let mut filter = Filter::new();
        assert!(filter.is_empty());
        assert!(!filter.filter(&Point::default()));
        assert_eq!("", filter.command());
    }

    #[test]
    fn reset_zeroes_counts() {
        let mut filter: Filter = "-keep_every_nth 2".parse().unwrap();
        let point = Point::default();
        assert!(filter.filter(&point));
        filter.reset();
        assert_eq!(Some(("keep_every_nth", 0)), filter.counts().next());
        assert!(filter.filter(&point));
    }

    #[test]
    fn selective_bits_are_combined() {
        let filter: Filter = "-drop_z_below 0 -keep_RGB_red 0 10".parse().unwrap();
        assert_eq!(
            crate::selective::Z | crate::selective::RGB,
            filter.decompress_selective()
        );
    }
}
