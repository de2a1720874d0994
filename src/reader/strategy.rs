/// How [Reader::read_point](crate::Reader::read_point) finds the next point.
///
/// Chosen whenever the filter, transform, spatial constraint or index change, never per point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// The spatial constraint can't contain any point, nothing is decoded.
    Empty,
    /// Decode and return.
    Direct,
    /// Decode, filter, transform.
    Filtered,
    /// Decode until a point falls inside the constraint.
    Inside,
    /// Seek to index candidates, decode until a point falls inside the constraint.
    InsideIndexed,
    /// Like [Strategy::Inside], then filter and transform.
    InsideFiltered,
    /// Like [Strategy::InsideIndexed], then filter and transform.
    InsideIndexedFiltered,
}

impl Strategy {
    /// Picks the strategy for a reader configuration.
    ///
    /// An index is only used together with a constraint. `disjoint` means the constraint can't
    /// contain any point, e.g. because it misses the header's bounding box.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasstream::reader::Strategy;
    /// assert_eq!(Strategy::Direct, Strategy::select(false, false, false, false));
    /// assert_eq!(Strategy::Empty, Strategy::select(true, true, true, true));
    /// ```
    pub fn select(constrained: bool, disjoint: bool, indexed: bool, filtered: bool) -> Strategy {
        match (constrained, disjoint, indexed, filtered) {
            (false, _, _, false) => Strategy::Direct,
            (false, _, _, true) => Strategy::Filtered,
            (true, true, _, _) => Strategy::Empty,
            (true, false, false, false) => Strategy::Inside,
            (true, false, true, false) => Strategy::InsideIndexed,
            (true, false, false, true) => Strategy::InsideFiltered,
            (true, false, true, true) => Strategy::InsideIndexedFiltered,
        }
    }
}
