//! Raw file metadata.

use crate::{
    Error, Result, Version,
    feature::{Evlrs, LargeFiles, Waveforms},
    raw::LASF,
};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

/// The size of the fixed header shared by every las version.
pub const MIN_HEADER_SIZE: u16 = 227;

/// The version-gated header fields that follow the fixed 227 bytes, in wire order.
///
/// Each step is read only if the version knows about it and the declared header size reaches
/// the step's end offset. Whatever the steps don't consume is user data in the header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Tail {
    Waveform,
    Evlr,
    LargeFile,
}

const TAIL: [(Tail, u16); 3] = [
    (Tail::Waveform, 235),
    (Tail::Evlr, 247),
    (Tail::LargeFile, 375),
];

impl Tail {
    fn is_supported_by(self, version: Version) -> bool {
        match self {
            Tail::Waveform => version.supports::<Waveforms>(),
            Tail::Evlr => version.supports::<Evlrs>(),
            Tail::LargeFile => version.supports::<LargeFiles>(),
        }
    }
}

/// A raw las header, field for field.
#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub struct Header {
    pub file_signature: [u8; 4],
    pub file_source_id: u16,
    pub global_encoding: u16,
    pub guid: [u8; 16],
    pub version: Version,
    pub system_identifier: [u8; 32],
    pub generating_software: [u8; 32],
    pub file_creation_day_of_year: u16,
    pub file_creation_year: u16,
    pub header_size: u16,
    pub offset_to_point_data: u32,
    pub number_of_variable_length_records: u32,
    pub point_data_format_id: u8,
    pub point_data_record_length: u16,
    pub number_of_point_records: u32,
    pub number_of_points_by_return: [u32; 5],
    pub x_scale_factor: f64,
    pub y_scale_factor: f64,
    pub z_scale_factor: f64,
    pub x_offset: f64,
    pub y_offset: f64,
    pub z_offset: f64,
    pub max_x: f64,
    pub min_x: f64,
    pub max_y: f64,
    pub min_y: f64,
    pub max_z: f64,
    pub min_z: f64,
    /// **las 1.3 and 1.4**: offset to the waveform data packet record.
    pub start_of_waveform_data_packet_record: Option<u64>,
    /// **las 1.4**: location and count of the extended vlrs.
    pub evlr: Option<Evlr>,
    /// **las 1.4**: 64-bit point counts.
    pub large_file: Option<LargeFile>,
    /// Bytes between the last standard field and `header_size`.
    pub padding: Vec<u8>,
}

/// Location of the extended variable length records.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[allow(missing_docs)]
pub struct Evlr {
    pub start_of_first_evlr: u64,
    pub number_of_evlrs: u32,
}

/// 64-bit point counts.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[allow(missing_docs)]
pub struct LargeFile {
    pub number_of_point_records: u64,
    pub number_of_points_by_return: [u64; 15],
}

impl Header {
    /// Reads a raw header from a `Read`.
    ///
    /// Structural problems (signature, header size, offset to point data) are errors. Everything
    /// else is read as-is.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io::Cursor;
    /// use lasstream::raw::Header;
    /// let mut cursor = Cursor::new(Vec::new());
    /// Header::default().write_to(&mut cursor).unwrap();
    /// cursor.set_position(0);
    /// let header = Header::read_from(cursor).unwrap();
    /// ```
    pub fn read_from<R: Read>(mut read: R) -> Result<Header> {
        let mut file_signature = [0; 4];
        read.read_exact(&mut file_signature)?;
        if file_signature != LASF {
            return Err(Error::InvalidFileSignature(file_signature));
        }
        let file_source_id = read.read_u16::<LittleEndian>()?;
        let global_encoding = read.read_u16::<LittleEndian>()?;
        let mut guid = [0; 16];
        read.read_exact(&mut guid)?;
        let version_major = read.read_u8()?;
        let version_minor = read.read_u8()?;
        let version = Version::new(version_major, version_minor);
        let mut system_identifier = [0; 32];
        read.read_exact(&mut system_identifier)?;
        let mut generating_software = [0; 32];
        read.read_exact(&mut generating_software)?;
        let file_creation_day_of_year = read.read_u16::<LittleEndian>()?;
        let file_creation_year = read.read_u16::<LittleEndian>()?;
        let header_size = read.read_u16::<LittleEndian>()?;
        if header_size < MIN_HEADER_SIZE {
            return Err(Error::HeaderTooSmall(header_size));
        }
        let offset_to_point_data = read.read_u32::<LittleEndian>()?;
        if offset_to_point_data < u32::from(header_size) {
            return Err(Error::OffsetToPointDataTooSmall {
                offset: offset_to_point_data,
                header_size,
            });
        }
        if version.supports::<LargeFiles>() && header_size < version.header_size() {
            return Err(Error::HeaderTooSmallForVersion {
                version,
                header_size,
                minimum: version.header_size(),
            });
        }
        let number_of_variable_length_records = read.read_u32::<LittleEndian>()?;
        let point_data_format_id = read.read_u8()?;
        let point_data_record_length = read.read_u16::<LittleEndian>()?;
        let number_of_point_records = read.read_u32::<LittleEndian>()?;
        let mut number_of_points_by_return = [0; 5];
        for n in &mut number_of_points_by_return {
            *n = read.read_u32::<LittleEndian>()?;
        }
        let x_scale_factor = read.read_f64::<LittleEndian>()?;
        let y_scale_factor = read.read_f64::<LittleEndian>()?;
        let z_scale_factor = read.read_f64::<LittleEndian>()?;
        let x_offset = read.read_f64::<LittleEndian>()?;
        let y_offset = read.read_f64::<LittleEndian>()?;
        let z_offset = read.read_f64::<LittleEndian>()?;
        let max_x = read.read_f64::<LittleEndian>()?;
        let min_x = read.read_f64::<LittleEndian>()?;
        let max_y = read.read_f64::<LittleEndian>()?;
        let min_y = read.read_f64::<LittleEndian>()?;
        let max_z = read.read_f64::<LittleEndian>()?;
        let min_z = read.read_f64::<LittleEndian>()?;

        let mut start_of_waveform_data_packet_record = None;
        let mut evlr = None;
        let mut large_file = None;
        let mut consumed = MIN_HEADER_SIZE;
        for (step, end) in TAIL {
            if !step.is_supported_by(version) || header_size < end {
                break;
            }
            match step {
                Tail::Waveform => {
                    start_of_waveform_data_packet_record = Some(read.read_u64::<LittleEndian>()?)
                }
                Tail::Evlr => evlr = Some(Evlr::read_from(&mut read)?),
                Tail::LargeFile => large_file = Some(LargeFile::read_from(&mut read)?),
            }
            consumed = end;
        }
        let mut padding = vec![0; usize::from(header_size - consumed)];
        read.read_exact(&mut padding)?;

        Ok(Header {
            file_signature,
            file_source_id,
            global_encoding,
            guid,
            version,
            system_identifier,
            generating_software,
            file_creation_day_of_year,
            file_creation_year,
            header_size,
            offset_to_point_data,
            number_of_variable_length_records,
            point_data_format_id,
            point_data_record_length,
            number_of_point_records,
            number_of_points_by_return,
            x_scale_factor,
            y_scale_factor,
            z_scale_factor,
            x_offset,
            y_offset,
            z_offset,
            max_x,
            min_x,
            max_y,
            min_y,
            max_z,
            min_z,
            start_of_waveform_data_packet_record,
            evlr,
            large_file,
            padding,
        })
    }

    /// Writes a raw header to a `Write`.
    ///
    /// Version-gated fields are written if the version knows about them and the header size
    /// leaves room for them, present or not.
    pub fn write_to<W: Write>(&self, mut write: W) -> Result<()> {
        write.write_all(&self.file_signature)?;
        write.write_u16::<LittleEndian>(self.file_source_id)?;
        write.write_u16::<LittleEndian>(self.global_encoding)?;
        write.write_all(&self.guid)?;
        write.write_u8(self.version.major)?;
        write.write_u8(self.version.minor)?;
        write.write_all(&self.system_identifier)?;
        write.write_all(&self.generating_software)?;
        write.write_u16::<LittleEndian>(self.file_creation_day_of_year)?;
        write.write_u16::<LittleEndian>(self.file_creation_year)?;
        write.write_u16::<LittleEndian>(self.header_size)?;
        write.write_u32::<LittleEndian>(self.offset_to_point_data)?;
        write.write_u32::<LittleEndian>(self.number_of_variable_length_records)?;
        write.write_u8(self.point_data_format_id)?;
        write.write_u16::<LittleEndian>(self.point_data_record_length)?;
        write.write_u32::<LittleEndian>(self.number_of_point_records)?;
        for n in &self.number_of_points_by_return {
            write.write_u32::<LittleEndian>(*n)?;
        }
        write.write_f64::<LittleEndian>(self.x_scale_factor)?;
        write.write_f64::<LittleEndian>(self.y_scale_factor)?;
        write.write_f64::<LittleEndian>(self.z_scale_factor)?;
        write.write_f64::<LittleEndian>(self.x_offset)?;
        write.write_f64::<LittleEndian>(self.y_offset)?;
        write.write_f64::<LittleEndian>(self.z_offset)?;
        write.write_f64::<LittleEndian>(self.max_x)?;
        write.write_f64::<LittleEndian>(self.min_x)?;
        write.write_f64::<LittleEndian>(self.max_y)?;
        write.write_f64::<LittleEndian>(self.min_y)?;
        write.write_f64::<LittleEndian>(self.max_z)?;
        write.write_f64::<LittleEndian>(self.min_z)?;
        for (step, end) in TAIL {
            if !step.is_supported_by(self.version) || self.header_size < end {
                break;
            }
            match step {
                Tail::Waveform => write.write_u64::<LittleEndian>(
                    self.start_of_waveform_data_packet_record.unwrap_or(0),
                )?,
                Tail::Evlr => {
                    let evlr = self.evlr.unwrap_or_default();
                    write.write_u64::<LittleEndian>(evlr.start_of_first_evlr)?;
                    write.write_u32::<LittleEndian>(evlr.number_of_evlrs)?;
                }
                Tail::LargeFile => {
                    let large_file = self.large_file.unwrap_or_default();
                    write.write_u64::<LittleEndian>(large_file.number_of_point_records)?;
                    for n in &large_file.number_of_points_by_return {
                        write.write_u64::<LittleEndian>(*n)?;
                    }
                }
            }
        }
        write.write_all(&self.padding)?;
        Ok(())
    }
}

impl Default for Header {
    fn default() -> Header {
        let version = Version::new(1, 2);
        Header {
            file_signature: LASF,
            file_source_id: 0,
            global_encoding: 0,
            guid: [0; 16],
            version,
            system_identifier: [0; 32],
            generating_software: [0; 32],
            file_creation_day_of_year: 0,
            file_creation_year: 0,
            header_size: version.header_size(),
            offset_to_point_data: u32::from(version.header_size()),
            number_of_variable_length_records: 0,
            point_data_format_id: 0,
            point_data_record_length: 20,
            number_of_point_records: 0,
            number_of_points_by_return: [0; 5],
            x_scale_factor: 0.01,
            y_scale_factor: 0.01,
            z_scale_factor: 0.01,
            x_offset: 0.,
            y_offset: 0.,
            z_offset: 0.,
            max_x: 0.,
            min_x: 0.,
            max_y: 0.,
            min_y: 0.,
            max_z: 0.,
            min_z: 0.,
            start_of_waveform_data_packet_record: None,
            evlr: None,
            large_file: None,
            padding: Vec::new(),
        }
    }
}

impl Evlr {
    fn read_from<R: Read>(mut read: R) -> Result<Evlr> {
        Ok(Evlr {
            start_of_first_evlr: read.read_u64::<LittleEndian>()?,
            number_of_evlrs: read.read_u32::<LittleEndian>()?,
        })
    }
}

impl LargeFile {
    fn read_from<R: Read>(mut read: R) -> Result<LargeFile> {
        let number_of_point_records = read.read_u64::<LittleEndian>()?;
        let mut number_of_points_by_return = [0; 15];
        for n in &mut number_of_points_by_return {
            *n = read.read_u64::<LittleEndian>()?;
        }
        Ok(LargeFile {
            number_of_point_records,
            number_of_points_by_return,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn bytes(header: &Header) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        header.write_to(&mut cursor).unwrap();
        cursor.into_inner()
    }

    macro_rules! roundtrip {
        ($name:ident, $minor:expr) => {
            #[test]
            fn $name() {
                let version = Version::new(1, $minor);
                let mut header = Header {
                    version,
                    header_size: version.header_size(),
                    offset_to_point_data: u32::from(version.header_size()),
                    ..Default::default()
                };
                if version.supports::<Waveforms>() {
                    header.start_of_waveform_data_packet_record = Some(0);
                }
                if version.supports::<Evlrs>() {
                    header.evlr = Some(Evlr::default());
                    header.large_file = Some(LargeFile::default());
                }
                let bytes = bytes(&header);
                assert_eq!(usize::from(version.header_size()), bytes.len());
                assert_eq!(header, Header::read_from(Cursor::new(bytes)).unwrap());
            }
        };
    }

    roundtrip!(las_1_0, 0);
    roundtrip!(las_1_1, 1);
    roundtrip!(las_1_2, 2);
    roundtrip!(las_1_3, 3);
    roundtrip!(las_1_4, 4);

    #[test]
    fn bad_signature() {
        let mut bytes = bytes(&Header::default());
        bytes[0] = b'X';
        assert!(matches!(
            Header::read_from(Cursor::new(bytes)),
            Err(Error::InvalidFileSignature(_))
        ));
    }

    #[test]
    fn header_too_small() {
        let header = Header {
            header_size: 226,
            ..Default::default()
        };
        assert!(matches!(
            Header::read_from(Cursor::new(bytes(&header))),
            Err(Error::HeaderTooSmall(226))
        ));
    }

    #[test]
    fn offset_too_small() {
        let header = Header {
            offset_to_point_data: 100,
            ..Default::default()
        };
        assert!(matches!(
            Header::read_from(Cursor::new(bytes(&header))),
            Err(Error::OffsetToPointDataTooSmall { .. })
        ));
    }

    #[test]
    fn las_1_4_too_small() {
        let header = Header {
            version: Version::new(1, 4),
            header_size: 235,
            offset_to_point_data: 375,
            ..Default::default()
        };
        assert!(matches!(
            Header::read_from(Cursor::new(bytes(&header))),
            Err(Error::HeaderTooSmallForVersion { .. })
        ));
    }

    #[test]
    fn las_1_3_short_header_is_padding() {
        // A 1.3 header that stops at 230 bytes: the waveform offset can't fit, so the three
        // extra bytes are user data.
        let mut bytes = bytes(&Header {
            header_size: 230,
            offset_to_point_data: 230,
            ..Default::default()
        });
        bytes[24] = 1;
        bytes[25] = 3;
        bytes.extend_from_slice(&[1, 2, 3]);
        let header = Header::read_from(Cursor::new(bytes)).unwrap();
        assert_eq!(None, header.start_of_waveform_data_packet_record);
        assert_eq!(vec![1, 2, 3], header.padding);
    }

    #[test]
    fn user_data_in_header() {
        let header = Header {
            header_size: 230,
            offset_to_point_data: 230,
            padding: vec![7, 8, 9],
            ..Default::default()
        };
        let read = Header::read_from(Cursor::new(bytes(&header))).unwrap();
        assert_eq!(vec![7, 8, 9], read.padding);
    }
}
