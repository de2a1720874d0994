use super::SpatialIndex;
use std::{collections::BTreeMap, ops::Range};

/// An in-memory grid of point index intervals.
///
/// # Examples
///
/// ```
/// use lasstream::spatial::{GridIndex, SpatialIndex};
/// let mut index = GridIndex::new(10.);
/// index.add(0, 1., 1.);
/// index.add(1, 1., 2.);
/// index.add(2, 55., 55.);
/// assert!(index.intersect_rectangle(0., 0., 5., 5.));
/// assert_eq!(Some(0), index.seek_next(0));
/// assert_eq!(Some(1), index.seek_next(1));
/// assert_eq!(None, index.seek_next(2));
/// ```
#[derive(Clone, Debug)]
pub struct GridIndex {
    cell_size: f64,
    cells: BTreeMap<(i64, i64), Vec<Range<u64>>>,
    candidates: Vec<Range<u64>>,
    cursor: usize,
}

impl GridIndex {
    /// Creates an empty index with square cells.
    pub fn new(cell_size: f64) -> GridIndex {
        GridIndex {
            cell_size,
            cells: BTreeMap::new(),
            candidates: Vec::new(),
            cursor: 0,
        }
    }

    /// Builds an index from `(x, y)` coordinates in point order.
    pub fn from_coordinates<I>(cell_size: f64, coordinates: I) -> GridIndex
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut index = GridIndex::new(cell_size);
        for (i, (x, y)) in (0u64..).zip(coordinates) {
            index.add(i, x, y);
        }
        index
    }

    /// Records that point `index` lies at `(x, y)`.
    pub fn add(&mut self, index: u64, x: f64, y: f64) {
        let intervals = self.cells.entry(self.cell(x, y)).or_default();
        match intervals.last_mut() {
            Some(last) if last.end == index => last.end = index + 1,
            _ => intervals.push(index..index + 1),
        }
    }

    fn cell(&self, x: f64, y: f64) -> (i64, i64) {
        (
            (x / self.cell_size).floor() as i64,
            (y / self.cell_size).floor() as i64,
        )
    }
}

impl SpatialIndex for GridIndex {
    fn intersect_rectangle(&mut self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> bool {
        let (min_cx, min_cy) = self.cell(min_x, min_y);
        let (max_cx, max_cy) = self.cell(max_x, max_y);
        let mut intervals: Vec<Range<u64>> = self
            .cells
            .iter()
            .filter(|((cx, cy), _)| (min_cx..=max_cx).contains(cx) && (min_cy..=max_cy).contains(cy))
            .flat_map(|(_, intervals)| intervals.iter().cloned())
            .collect();
        intervals.sort_by_key(|interval| interval.start);
        self.candidates.clear();
        for interval in intervals {
            match self.candidates.last_mut() {
                Some(last) if interval.start <= last.end => last.end = last.end.max(interval.end),
                _ => self.candidates.push(interval),
            }
        }
        self.cursor = 0;
        !self.candidates.is_empty()
    }

    fn seek_next(&mut self, current: u64) -> Option<u64> {
        while let Some(candidate) = self.candidates.get(self.cursor) {
            if current < candidate.end {
                return Some(current.max(candidate.start));
            }
            self.cursor += 1;
        }
        None
    }
}
