use crate::Result;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

/// The GeoTIFF key directory, `LASF_Projection` record 34735.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GeoKeyDirectory {
    /// Always one.
    pub key_directory_version: u16,
    /// Always one.
    pub key_revision: u16,
    /// Always zero.
    pub minor_revision: u16,
    /// The keys.
    pub entries: Vec<GeoKeyEntry>,
}

/// One GeoTIFF key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GeoKeyEntry {
    /// The key id.
    pub key_id: u16,
    /// Zero if the value is stored inline, otherwise the record id holding it.
    pub tiff_tag_location: u16,
    /// The number of values.
    pub count: u16,
    /// The inline value, or the index into the referenced record.
    pub value_offset: u16,
}

impl GeoKeyDirectory {
    /// Reads a key directory.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasstream::vlr::GeoKeyDirectory;
    /// let data = [1, 0, 1, 0, 0, 0, 1, 0, 0, 4, 0, 0, 1, 0, 1, 0];
    /// let directory = GeoKeyDirectory::read_from(&data[..]).unwrap();
    /// assert_eq!(1024, directory.entries[0].key_id);
    /// ```
    pub fn read_from<R: Read>(mut read: R) -> Result<GeoKeyDirectory> {
        let key_directory_version = read.read_u16::<LittleEndian>()?;
        let key_revision = read.read_u16::<LittleEndian>()?;
        let minor_revision = read.read_u16::<LittleEndian>()?;
        let number_of_keys = read.read_u16::<LittleEndian>()?;
        let mut entries = Vec::with_capacity(usize::from(number_of_keys));
        for _ in 0..number_of_keys {
            entries.push(GeoKeyEntry {
                key_id: read.read_u16::<LittleEndian>()?,
                tiff_tag_location: read.read_u16::<LittleEndian>()?,
                count: read.read_u16::<LittleEndian>()?,
                value_offset: read.read_u16::<LittleEndian>()?,
            });
        }
        Ok(GeoKeyDirectory {
            key_directory_version,
            key_revision,
            minor_revision,
            entries,
        })
    }

    /// Writes a key directory.
    pub fn write_to<W: Write>(&self, mut write: W) -> Result<()> {
        write.write_u16::<LittleEndian>(self.key_directory_version)?;
        write.write_u16::<LittleEndian>(self.key_revision)?;
        write.write_u16::<LittleEndian>(self.minor_revision)?;
        write.write_u16::<LittleEndian>(u16::try_from(self.entries.len())?)?;
        for entry in &self.entries {
            write.write_u16::<LittleEndian>(entry.key_id)?;
            write.write_u16::<LittleEndian>(entry.tiff_tag_location)?;
            write.write_u16::<LittleEndian>(entry.count)?;
            write.write_u16::<LittleEndian>(entry.value_offset)?;
        }
        Ok(())
    }
}

/// Reads the `LASF_Projection` 34736 record, a flat array of doubles.
pub(crate) fn read_double_params(data: &[u8]) -> Vec<f64> {
    data.chunks_exact(8)
        .map(|chunk| {
            let mut bytes = [0; 8];
            bytes.copy_from_slice(chunk);
            f64::from_le_bytes(bytes)
        })
        .collect()
}
