use crate::{Error, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

/// The laszip compression descriptor.
///
/// Only validated here. The codec hands the bytes to the decompressor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct LasZip {
    pub compressor: u16,
    pub coder: u16,
    pub version_major: u8,
    pub version_minor: u8,
    pub version_revision: u16,
    pub options: u32,
    pub chunk_size: u32,
    pub number_of_special_evlrs: i64,
    pub offset_to_special_evlrs: i64,
    pub items: Vec<LasZipItem>,
}

/// One compressed field group of a point record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct LasZipItem {
    pub item_type: u16,
    pub size: u16,
    pub version: u16,
}

impl LasZip {
    /// Reads a descriptor.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasstream::vlr::{LasZip, LasZipItem};
    /// let laszip = LasZip {
    ///     compressor: 2,
    ///     items: vec![LasZipItem { item_type: 6, size: 20, version: 2 }],
    ///     ..Default::default()
    /// };
    /// let mut data = Vec::new();
    /// laszip.write_to(&mut data).unwrap();
    /// assert_eq!(laszip, LasZip::read_from(&data[..]).unwrap());
    /// ```
    pub fn read_from<R: Read>(mut read: R) -> Result<LasZip> {
        let compressor = read.read_u16::<LittleEndian>()?;
        let coder = read.read_u16::<LittleEndian>()?;
        let version_major = read.read_u8()?;
        let version_minor = read.read_u8()?;
        let version_revision = read.read_u16::<LittleEndian>()?;
        let options = read.read_u32::<LittleEndian>()?;
        let chunk_size = read.read_u32::<LittleEndian>()?;
        let number_of_special_evlrs = read.read_i64::<LittleEndian>()?;
        let offset_to_special_evlrs = read.read_i64::<LittleEndian>()?;
        let num_items = read.read_u16::<LittleEndian>()?;
        let mut items = Vec::with_capacity(usize::from(num_items));
        for _ in 0..num_items {
            items.push(LasZipItem {
                item_type: read.read_u16::<LittleEndian>()?,
                size: read.read_u16::<LittleEndian>()?,
                version: read.read_u16::<LittleEndian>()?,
            });
        }
        Ok(LasZip {
            compressor,
            coder,
            version_major,
            version_minor,
            version_revision,
            options,
            chunk_size,
            number_of_special_evlrs,
            offset_to_special_evlrs,
            items,
        })
    }

    /// Writes a descriptor.
    pub fn write_to<W: Write>(&self, mut write: W) -> Result<()> {
        write.write_u16::<LittleEndian>(self.compressor)?;
        write.write_u16::<LittleEndian>(self.coder)?;
        write.write_u8(self.version_major)?;
        write.write_u8(self.version_minor)?;
        write.write_u16::<LittleEndian>(self.version_revision)?;
        write.write_u32::<LittleEndian>(self.options)?;
        write.write_u32::<LittleEndian>(self.chunk_size)?;
        write.write_i64::<LittleEndian>(self.number_of_special_evlrs)?;
        write.write_i64::<LittleEndian>(self.offset_to_special_evlrs)?;
        write.write_u16::<LittleEndian>(u16::try_from(self.items.len())?)?;
        for item in &self.items {
            write.write_u16::<LittleEndian>(item.item_type)?;
            write.write_u16::<LittleEndian>(item.size)?;
            write.write_u16::<LittleEndian>(item.version)?;
        }
        Ok(())
    }

    /// Returns the descriptor as record bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut data = Vec::with_capacity(34 + 6 * self.items.len());
        self.write_to(&mut data)?;
        Ok(data)
    }

    /// Checks that the descriptor is one we can hand to a decompressor, and that its items
    /// add up to the point record length.
    pub fn validate(&self, point_data_record_length: u16) -> Result<()> {
        if self.compressor > 3 {
            return Err(Error::Compression(format!(
                "unknown compressor {}",
                self.compressor
            )));
        }
        if self.coder != 0 {
            return Err(Error::Compression(format!("unknown coder {}", self.coder)));
        }
        let mut size = 0u32;
        for item in &self.items {
            if !matches!(item.item_type, 0 | 6 | 7 | 8 | 10 | 11 | 12 | 14) {
                return Err(Error::Compression(format!(
                    "unsupported item type {} (size {}, version {})",
                    item.item_type, item.size, item.version
                )));
            }
            size += u32::from(item.size);
        }
        if size != u32::from(point_data_record_length) {
            return Err(Error::Compression(format!(
                "items add up to {} bytes but points are {} bytes",
                size, point_data_record_length
            )));
        }
        Ok(())
    }
}
