use crate::utils::AsLasStr;

const ENTRY_SIZE: usize = 16;

/// Names for classification codes, `LASF_Spec` record 0.
///
/// Each sixteen-byte entry is a class number followed by a fifteen-byte description.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassificationLookup {
    /// `(class number, description)` pairs, in file order.
    pub entries: Vec<(u8, String)>,
}

impl ClassificationLookup {
    /// Decodes a lookup table. Trailing bytes that don't fill an entry are ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasstream::vlr::ClassificationLookup;
    /// let mut data = vec![2];
    /// data.extend_from_slice(b"ground\0\0\0\0\0\0\0\0\0");
    /// let lookup = ClassificationLookup::new(&data);
    /// assert_eq!(Some("ground"), lookup.description(2));
    /// ```
    pub fn new(data: &[u8]) -> ClassificationLookup {
        let entries = data
            .chunks_exact(ENTRY_SIZE)
            .map(|entry| (entry[0], (&entry[1..]).as_las_string_lossy()))
            .collect();
        ClassificationLookup { entries }
    }

    /// Returns the description of a class, if the table has one.
    pub fn description(&self, class: u8) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| *n == class)
            .map(|(_, description)| description.as_str())
    }
}
