use crate::{Error, Result};
use std::fmt;

const COMPRESSION_MASK: u8 = 0x80 | 0x40;

/// Point record format.
///
/// The two high bits of the point data format id have been used by laszip to signal compressed
/// data, so they are split off into `is_compressed`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Format {
    id: u8,
    /// Are the point records compressed?
    pub is_compressed: bool,
    /// The number of bytes past the standard record.
    pub extra_bytes: u16,
}

impl Format {
    /// Creates a new point format from the header's point data format id.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasstream::point::Format;
    /// let format = Format::new(131).unwrap();
    /// assert_eq!(3, format.id());
    /// assert!(format.is_compressed);
    /// assert!(Format::new(11).is_err());
    /// ```
    pub fn new(n: u8) -> Result<Format> {
        let id = n & !COMPRESSION_MASK;
        if id > 10 {
            Err(Error::InvalidPointFormat(n))
        } else {
            Ok(Format {
                id,
                is_compressed: n & COMPRESSION_MASK != 0,
                extra_bytes: 0,
            })
        }
    }

    /// Returns the point format id, without the compression bits.
    pub fn id(&self) -> u8 {
        self.id
    }

    /// Returns the point data format id as written to the header.
    pub fn to_u8(&self) -> u8 {
        if self.is_compressed {
            self.id | 0x80
        } else {
            self.id
        }
    }

    /// Does this format use the 1.4 point record layout?
    pub fn is_extended(&self) -> bool {
        self.id >= 6
    }

    /// Does this format have gps time?
    pub fn has_gps_time(&self) -> bool {
        !matches!(self.id, 0 | 2)
    }

    /// Does this format have rgb color?
    pub fn has_color(&self) -> bool {
        matches!(self.id, 2 | 3 | 5 | 7 | 8 | 10)
    }

    /// Does this format have a near infrared channel?
    pub fn has_nir(&self) -> bool {
        matches!(self.id, 8 | 10)
    }

    /// Does this format have wave packet information?
    pub fn has_waveform(&self) -> bool {
        matches!(self.id, 4 | 5 | 9 | 10)
    }

    /// Returns the length of the standard record, without extra bytes.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasstream::point::Format;
    /// assert_eq!(20, Format::new(0).unwrap().base_len());
    /// assert_eq!(30, Format::new(6).unwrap().base_len());
    /// ```
    pub fn base_len(&self) -> u16 {
        match self.id {
            0 => 20,
            1 => 28,
            2 => 26,
            3 => 34,
            4 => 57,
            5 => 63,
            6 => 30,
            7 => 36,
            8 => 38,
            9 => 59,
            _ => 67,
        }
    }

    /// Returns the full record length, extra bytes included.
    pub fn len(&self) -> u16 {
        self.base_len() + self.extra_bytes
    }

    /// Sets the extra bytes from a declared point data record length.
    pub fn with_record_length(mut self, length: u16) -> Result<Format> {
        if length < self.base_len() {
            return Err(Error::InvalidPointDataRecordLength {
                format: self,
                length,
            });
        }
        self.extra_bytes = length - self.base_len();
        Ok(self)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "point format {}", self.id)
    }
}
