//! Builds a [Filter] from command tokens.

use super::{
    Filter,
    criterion::{Criterion, DEFAULT_SEED, Flag, INTERVALS, ReturnClass},
};
use crate::{Error, Result, Vector};
use log::{Level, log};
use std::str::FromStr;

const NUMBER_OF_RETURNS_SHORTCUTS: [(&str, &str, u8); 5] = [
    ("keep_single", "drop_single", 1),
    ("keep_double", "drop_double", 2),
    ("keep_triple", "drop_triple", 3),
    ("keep_quadruple", "drop_quadruple", 4),
    ("keep_quintuple", "drop_quintuple", 5),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MaskField {
    Return,
    NumberOfReturns,
    Classification,
}

/// A mask criterion that later tokens for the same field still merge into.
#[derive(Debug)]
struct OpenMask {
    field: MaskField,
    index: usize,
    bits: [u32; 8],
    extended: bool,
}

/// Parser state. Criteria live on an operand stack until the last token is consumed, so
/// combinators only ever see the two most recent entries.
struct Parser<'a, S> {
    tokens: &'a [S],
    position: usize,
    stack: Vec<Criterion>,
    open: Vec<OpenMask>,
    polarity: Vec<(MaskField, bool)>,
}

pub(super) fn parse<S: AsRef<str>>(tokens: &[S]) -> Result<Filter> {
    let mut parser = Parser {
        tokens,
        position: 0,
        stack: Vec::new(),
        open: Vec::new(),
        polarity: Vec::new(),
    };
    while let Some(token) = parser.next() {
        let option = token
            .strip_prefix('-')
            .ok_or_else(|| Error::UnknownFilterOption(token.to_string()))?;
        parser.option(option)?;
    }
    let mut filter = Filter::new();
    for criterion in parser.stack {
        filter.push(criterion);
    }
    log!(Level::Debug, "parsed filter: {}", filter.command());
    Ok(filter)
}

impl FromStr for Filter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Filter> {
        let tokens: Vec<&str> = s.split_whitespace().collect();
        parse(&tokens)
    }
}

impl<'a, S: AsRef<str>> Parser<'a, S> {
    fn next(&mut self) -> Option<&'a str> {
        let token = self.tokens.get(self.position)?.as_ref();
        self.position += 1;
        Some(token)
    }

    fn peek(&self) -> Option<&'a str> {
        self.tokens
            .get(self.position)
            .map(AsRef::as_ref)
            .filter(|token| !token.starts_with('-'))
    }

    fn option(&mut self, option: &str) -> Result<()> {
        match option {
            "filter_and" => self.combine("filter_and", Criterion::and),
            "filter_or" => self.combine("filter_or", Criterion::or),
            "keep_tile" => {
                let [ll_x, ll_y, size] = self.numbers(option)?;
                self.push(Criterion::keep_tile(ll_x, ll_y, size))
            }
            "keep_circle" => {
                let [x, y, radius] = self.numbers(option)?;
                self.push(Criterion::keep_circle(x, y, radius))
            }
            "keep_xy" | "drop_xy" => {
                let [min_x, min_y, max_x, max_y] = self.numbers(option)?;
                self.push(if option == "keep_xy" {
                    Criterion::keep_xy(min_x, min_y, max_x, max_y)
                } else {
                    Criterion::drop_xy(min_x, min_y, max_x, max_y)
                })
            }
            "keep_xyz" | "drop_xyz" => {
                let [min_x, min_y, min_z, max_x, max_y, max_z] = self.numbers(option)?;
                let (min, max) = (
                    Vector::new(min_x, min_y, min_z),
                    Vector::new(max_x, max_y, max_z),
                );
                self.push(if option == "keep_xyz" {
                    Criterion::keep_xyz(min, max)
                } else {
                    Criterion::drop_xyz(min, max)
                })
            }
            "keep_return" | "drop_return" => {
                let values = self.values(option, 15)?;
                self.mask(MaskField::Return, option == "keep_return", &values, false)
            }
            "keep_number_of_returns" | "drop_number_of_returns" => {
                let values = self.values(option, 15)?;
                let keep = option == "keep_number_of_returns";
                self.mask(MaskField::NumberOfReturns, keep, &values, false)
            }
            "keep_class" | "keep_classification" | "drop_class" | "drop_classification" => {
                let values = self.values(option, 255)?;
                let keep = option.starts_with("keep");
                self.mask(MaskField::Classification, keep, &values, false)
            }
            "keep_extended_class"
            | "keep_extended_classification"
            | "drop_extended_class"
            | "drop_extended_classification" => {
                let values = self.values(option, 255)?;
                let keep = option.starts_with("keep");
                self.mask(MaskField::Classification, keep, &values, true)
            }
            "keep_scan_direction_change" => self.push(Criterion::keep_scan_direction_change()),
            "keep_every_nth" => {
                let token = self.argument(option, 1)?;
                let n = token
                    .parse::<u32>()
                    .ok()
                    .filter(|&n| n > 0)
                    .ok_or_else(|| invalid(option, token))?;
                self.push(Criterion::keep_every_nth(n))
            }
            "keep_random_fraction" => {
                let [fraction] = self.numbers(option)?;
                let seed = match self.peek() {
                    Some(token) => match token.parse::<u64>() {
                        Ok(seed) => {
                            self.position += 1;
                            seed
                        }
                        Err(_) => DEFAULT_SEED,
                    },
                    None => DEFAULT_SEED,
                };
                self.push(Criterion::keep_random_fraction(fraction, seed))
            }
            "thin_with_grid" | "thin_with_time" => {
                let token = self.argument(option, 1)?;
                let spacing = token
                    .parse::<f64>()
                    .ok()
                    .filter(|&spacing| spacing > 0.)
                    .ok_or_else(|| invalid(option, token))?;
                self.push(if option == "thin_with_grid" {
                    Criterion::thin_with_grid(spacing)
                } else {
                    Criterion::thin_with_time(spacing)
                })
            }
            _ => self.table_option(option),
        }
    }

    fn table_option(&mut self, option: &str) -> Result<()> {
        if let Some(&class) = ReturnClass::ALL.iter().find(|class| class.name() == option) {
            return self.push(Criterion::returns(class));
        }
        for flag in Flag::ALL {
            for keep in [true, false] {
                if flag.name(keep) == option {
                    return self.push(if keep {
                        Criterion::keep_flag(flag)
                    } else {
                        Criterion::drop_flag(flag)
                    });
                }
            }
        }
        for (keep_name, drop_name, n) in NUMBER_OF_RETURNS_SHORTCUTS {
            if option == keep_name || option == drop_name {
                return self.mask(MaskField::NumberOfReturns, option == keep_name, &[n], false);
            }
        }
        if let Some(&(name, _, kind)) = INTERVALS.iter().find(|(name, _, _)| *name == option) {
            let (a, b) = if kind.is_between() {
                let [a, b] = self.numbers(option)?;
                (a, b)
            } else {
                let [a] = self.numbers(option)?;
                (a, 0.)
            };
            if let Some(criterion) = Criterion::from_interval_name(name, a, b) {
                return self.push(criterion);
            }
        }
        Err(Error::UnknownFilterOption(option.to_string()))
    }

    fn push(&mut self, criterion: Criterion) -> Result<()> {
        self.stack.push(criterion);
        Ok(())
    }

    fn combine(
        &mut self,
        name: &'static str,
        combinator: fn(Criterion, Criterion) -> Criterion,
    ) -> Result<()> {
        let (b, a) = match (self.stack.pop(), self.stack.pop()) {
            (Some(b), Some(a)) => (b, a),
            (Some(b), None) => {
                self.stack.push(b);
                return Err(Error::MissingOperand(name));
            }
            _ => return Err(Error::MissingOperand(name)),
        };
        let len = self.stack.len();
        self.open.retain(|open| open.index < len);
        self.push(combinator(a, b))
    }

    fn mask(&mut self, field: MaskField, keep: bool, values: &[u8], extended: bool) -> Result<()> {
        let polarity = self
            .polarity
            .iter()
            .find(|(f, _)| *f == field)
            .map(|&(_, keep)| keep);
        match polarity {
            Some(polarity) if polarity != keep => {
                return Err(Error::ConflictingMasks(field.name()));
            }
            Some(_) => {}
            None => self.polarity.push((field, keep)),
        }
        let mut bits = [0u32; 8];
        for &value in values {
            bits[usize::from(value / 32)] |= 1u32 << (value % 32);
        }
        if let Some(open) = self.open.iter_mut().find(|open| open.field == field) {
            for (word, new) in open.bits.iter_mut().zip(bits) {
                *word |= new;
            }
            open.extended |= extended;
            self.stack[open.index] = field.criterion(keep, open.bits, open.extended);
        } else {
            self.open.push(OpenMask {
                field,
                index: self.stack.len(),
                bits,
                extended,
            });
            self.stack.push(field.criterion(keep, bits, extended));
        }
        Ok(())
    }

    fn argument(&mut self, option: &str, expected: usize) -> Result<&'a str> {
        self.next().ok_or_else(|| Error::MissingArgument {
            option: option.to_string(),
            expected,
        })
    }

    fn numbers<const N: usize>(&mut self, option: &str) -> Result<[f64; N]> {
        let mut numbers = [0.; N];
        for number in numbers.iter_mut() {
            let token = self.argument(option, N)?;
            *number = token.parse().map_err(|_| invalid(option, token))?;
        }
        Ok(numbers)
    }

    /// Consumes one or more integer arguments no larger than `max`.
    fn values(&mut self, option: &str, max: u8) -> Result<Vec<u8>> {
        let mut values = Vec::new();
        while let Some(token) = self.peek() {
            let Ok(value) = token.parse::<u32>() else {
                break;
            };
            let value = u8::try_from(value)
                .ok()
                .filter(|&value| value <= max)
                .ok_or_else(|| invalid(option, token))?;
            values.push(value);
            self.position += 1;
        }
        if values.is_empty() {
            Err(Error::MissingArgument {
                option: option.to_string(),
                expected: 1,
            })
        } else {
            Ok(values)
        }
    }
}

impl MaskField {
    fn name(self) -> &'static str {
        match self {
            MaskField::Return => "return",
            MaskField::NumberOfReturns => "number_of_returns",
            MaskField::Classification => "classification",
        }
    }

    fn criterion(self, keep: bool, bits: [u32; 8], extended: bool) -> Criterion {
        let low = (bits[0] & 0xffff) as u16;
        match self {
            MaskField::Return => Criterion::return_mask(keep, low),
            MaskField::NumberOfReturns => Criterion::number_of_returns_mask(keep, low),
            MaskField::Classification => Criterion::class_mask(keep, bits, extended),
        }
    }
}

fn invalid(option: &str, value: &str) -> Error {
    Error::InvalidArgument {
        option: option.to_string(),
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Point;

    fn point(return_number: u8, number_of_returns: u8, classification: u8) -> Point {
        Point {
            return_number,
            number_of_returns,
            classification,
            ..Default::default()
        }
    }

    #[test]
    fn and_binds_the_two_preceding() {
        let filter: Filter = "-drop_class 2 -drop_first -filter_and".parse().unwrap();
        assert_eq!(1, filter.len());
        assert_eq!("-drop_class 2 -drop_first -filter_and", filter.command());
    }

    #[test]
    fn nested_combinators() {
        let filter = Filter::parse(&[
            "-drop_first",
            "-drop_class",
            "2",
            "-drop_withheld",
            "-filter_and",
            "-filter_or",
        ])
        .unwrap();
        assert_eq!(1, filter.len());
        assert_eq!(
            "-drop_first -drop_class 2 -drop_withheld -filter_and -filter_or",
            filter.command()
        );
    }

    #[test]
    fn combinator_skips_earlier_criteria() {
        let mut filter: Filter = "-drop_last -drop_first -drop_class 2 -filter_or"
            .parse()
            .unwrap();
        assert_eq!(2, filter.len());
        assert!(filter.filter(&point(1, 1, 0)));
        assert!(filter.filter(&point(2, 3, 2)));
        assert!(!filter.filter(&point(2, 3, 1)));
    }

    #[test]
    fn missing_operand() {
        assert!(matches!(
            "-drop_first -filter_and".parse::<Filter>(),
            Err(Error::MissingOperand("filter_and"))
        ));
        assert!(matches!(
            "-filter_or".parse::<Filter>(),
            Err(Error::MissingOperand("filter_or"))
        ));
    }

    #[test]
    fn masks_merge() {
        let mut filter: Filter = "-keep_class 2 -keep_class 9 6".parse().unwrap();
        assert_eq!(1, filter.len());
        assert_eq!("-keep_class 2 6 9", filter.command());
        assert!(!filter.filter(&point(1, 1, 9)));
        assert!(filter.filter(&point(1, 1, 3)));
    }

    #[test]
    fn masks_merge_into_extended() {
        let filter: Filter = "-keep_class 2 -keep_extended_class 40".parse().unwrap();
        assert_eq!("-keep_extended_class 2 40", filter.command());
    }

    #[test]
    fn consumed_masks_do_not_merge() {
        let filter: Filter = "-drop_class 2 -drop_first -filter_and -drop_class 3"
            .parse()
            .unwrap();
        assert_eq!(2, filter.len());
    }

    #[test]
    fn conflicting_masks() {
        assert!(matches!(
            "-keep_class 2 -drop_class 3".parse::<Filter>(),
            Err(Error::ConflictingMasks("classification"))
        ));
        assert!(matches!(
            "-keep_single -drop_double".parse::<Filter>(),
            Err(Error::ConflictingMasks("number_of_returns"))
        ));
    }

    #[test]
    fn number_of_returns_shortcuts() {
        let mut filter: Filter = "-keep_single -keep_double".parse().unwrap();
        assert_eq!("-keep_number_of_returns 1 2", filter.command());
        assert!(filter.filter(&point(1, 3, 0)));
        assert!(!filter.filter(&point(2, 2, 0)));
    }

    #[test]
    fn interval_arguments() {
        let filter: Filter = "-keep_z -5 10.5 -drop_intensity_above 200".parse().unwrap();
        assert_eq!("-keep_z -5 10.5 -drop_intensity_above 200", filter.command());
    }

    #[test]
    fn random_fraction_seed() {
        let filter: Filter = "-keep_random_fraction 0.25".parse().unwrap();
        assert_eq!("-keep_random_fraction 0.25 0", filter.command());
        let filter: Filter = "-keep_random_fraction 0.25 7 -drop_first".parse().unwrap();
        assert_eq!("-keep_random_fraction 0.25 7 -drop_first", filter.command());
    }

    #[test]
    fn errors() {
        assert!(matches!(
            "-keep_everything".parse::<Filter>(),
            Err(Error::UnknownFilterOption(_))
        ));
        assert!(matches!(
            "keep_first".parse::<Filter>(),
            Err(Error::UnknownFilterOption(_))
        ));
        assert!(matches!(
            "-keep_x 1".parse::<Filter>(),
            Err(Error::MissingArgument { expected: 2, .. })
        ));
        assert!(matches!(
            "-keep_x 1 two".parse::<Filter>(),
            Err(Error::InvalidArgument { .. })
        ));
        assert!(matches!(
            "-keep_return".parse::<Filter>(),
            Err(Error::MissingArgument { expected: 1, .. })
        ));
        assert!(matches!(
            "-keep_return 16".parse::<Filter>(),
            Err(Error::InvalidArgument { .. })
        ));
        assert!(matches!(
            "-keep_every_nth 0".parse::<Filter>(),
            Err(Error::InvalidArgument { .. })
        ));
    }

    #[test]
    fn command_roundtrip() {
        let command = "-keep_tile 10 20 100 -keep_first_of_many -drop_return 3 \
                       -keep_xyz 0 0 0 1 1 1 -drop_synthetic -thin_with_grid 0.5 \
                       -keep_every_nth 4 -drop_z_below 1 -drop_withheld -filter_or";
        let filter: Filter = command.parse().unwrap();
        let rendered = filter.command();
        assert_eq!(rendered, rendered.parse::<Filter>().unwrap().command());
        assert_eq!(command.split_whitespace().collect::<Vec<_>>().join(" "), rendered);
    }
}
