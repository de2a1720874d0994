use crate::{Error, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

/// The size of a vlr record header.
pub const VLR_HEADER_SIZE: u16 = 54;

/// The size of an evlr record header.
pub const EVLR_HEADER_SIZE: u16 = 60;

/// A raw variable length record.
#[derive(Clone, Debug, Default, PartialEq)]
#[allow(missing_docs)]
pub struct Vlr {
    pub reserved: u16,
    pub user_id: [u8; 16],
    pub record_id: u16,
    pub record_length_after_header: RecordLength,
    pub description: [u8; 32],
    pub data: Vec<u8>,
}

/// The length of the data in the vlr.
///
/// Regular vlrs store it in two bytes, extended vlrs in eight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum RecordLength {
    Vlr(u16),
    Evlr(u64),
}

impl Vlr {
    /// Reads the fixed part of a raw vlr (or evlr), one field at a time.
    ///
    /// The data are left empty.
    pub fn read_header_from<R: Read>(mut read: R, extended: bool) -> Result<Vlr> {
        let reserved = read.read_u16::<LittleEndian>()?;
        let mut user_id = [0; 16];
        read.read_exact(&mut user_id)?;
        let record_id = read.read_u16::<LittleEndian>()?;
        let record_length_after_header = if extended {
            RecordLength::Evlr(read.read_u64::<LittleEndian>()?)
        } else {
            RecordLength::Vlr(read.read_u16::<LittleEndian>()?)
        };
        let mut description = [0; 32];
        read.read_exact(&mut description)?;
        Ok(Vlr {
            reserved,
            user_id,
            record_id,
            record_length_after_header,
            description,
            data: Vec::new(),
        })
    }

    /// Reads a raw vlr (or evlr), data included.
    ///
    /// Only the bytes that are actually there are buffered, so a bogus record length is an
    /// error rather than a huge allocation.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io::Cursor;
    /// use lasstream::raw::Vlr;
    /// let mut cursor = Cursor::new(Vec::new());
    /// Vlr::default().write_to(&mut cursor).unwrap();
    /// cursor.set_position(0);
    /// let vlr = Vlr::read_from(cursor, false).unwrap();
    /// ```
    pub fn read_from<R: Read>(mut read: R, extended: bool) -> Result<Vlr> {
        let mut vlr = Vlr::read_header_from(&mut read, extended)?;
        let expected = u64::from(vlr.record_length_after_header);
        let mut data = Vec::new();
        let found = read.by_ref().take(expected).read_to_end(&mut data)? as u64;
        if found != expected {
            return Err(Error::TruncatedVlr { expected, found });
        }
        vlr.data = data;
        Ok(vlr)
    }

    /// Writes a raw vlr.
    pub fn write_to<W: Write>(&self, mut write: W) -> Result<()> {
        write.write_u16::<LittleEndian>(self.reserved)?;
        write.write_all(&self.user_id)?;
        write.write_u16::<LittleEndian>(self.record_id)?;
        match self.record_length_after_header {
            RecordLength::Vlr(n) => write.write_u16::<LittleEndian>(n)?,
            RecordLength::Evlr(n) => write.write_u64::<LittleEndian>(n)?,
        }
        write.write_all(&self.description)?;
        write.write_all(&self.data)?;
        Ok(())
    }

    /// Is this an extended vlr?
    pub fn is_extended(&self) -> bool {
        matches!(self.record_length_after_header, RecordLength::Evlr(_))
    }
}

impl Default for RecordLength {
    fn default() -> RecordLength {
        RecordLength::Vlr(0)
    }
}

impl From<RecordLength> for u64 {
    fn from(record_length: RecordLength) -> u64 {
        match record_length {
            RecordLength::Vlr(n) => u64::from(n),
            RecordLength::Evlr(n) => n,
        }
    }
}
