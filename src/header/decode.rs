use super::Header;
use crate::{
    Bounds, Error, Result, Transform, Vector,
    feature::{Evlrs, ExtendedPointFormats, GpsStandardTime, LargeFiles},
    point::Format,
    raw::{self, RecordLength, VLR_HEADER_SIZE},
    utils::AsLasStr,
    vlr::{
        ClassificationLookup, ExtraBytes, GeoKeyDirectory, LASF_PROJECTION, LASF_SPEC,
        LASORIGINAL_RECORD_ID, LASORIGINAL_SIZE, LASTILING_RECORD_ID, LASTILING_SIZE, LASTOOLS,
        LASZIP_ENCODED, LASZIP_RECORD_ID, LasOriginal, LasTiling, LasZip,
        WAVE_PACKET_DESCRIPTOR_SIZE, Vlr, WavePacketDescriptor, read_double_params,
    },
};
use std::{
    collections::BTreeMap,
    io::{Read, Seek, SeekFrom},
};

impl Header {
    /// Reads a header, its vlrs, and the user data between the vlrs and the points.
    ///
    /// Afterwards `read` is positioned at the first point. Structural problems are errors,
    /// anything else is logged and kept in [Header::warnings].
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io::Cursor;
    /// use lasstream::Header;
    /// let mut bytes = Vec::new();
    /// Header::default().write_to(&mut bytes).unwrap();
    /// let header = Header::read_from(Cursor::new(bytes)).unwrap();
    /// assert!(header.warnings().is_empty());
    /// ```
    pub fn read_from<R: Read>(mut read: R) -> Result<Header> {
        let raw_header = raw::Header::read_from(&mut read)?;
        let number_of_vlrs = raw_header.number_of_variable_length_records;
        let mut header = Header::from_raw(raw_header)?;
        header.read_vlrs(&mut read, number_of_vlrs)?;
        header.check_compression()?;
        Ok(header)
    }

    /// Reads the evlrs of a las 1.4 file, then seeks back to where `read` was.
    ///
    /// An evlr that can't be read stops the scan with a warning.
    pub fn read_evlrs<R: Read + Seek>(&mut self, mut read: R) -> Result<()> {
        let n = self.declared_evlrs;
        if n == 0 || !self.version.supports::<Evlrs>() {
            return Ok(());
        }
        let start = self.start_of_first_evlr;
        if start == 0 {
            self.warn(format!("{} evlrs declared but the start of the first is zero", n));
            return Ok(());
        }
        let position = read.stream_position()?;
        read.seek(SeekFrom::Start(start))?;
        for i in 0..n {
            match raw::Vlr::read_from(&mut read, true) {
                Ok(raw_evlr) => {
                    let evlr = Vlr::new(raw_evlr);
                    self.decode_payload(&evlr);
                    self.evlrs.push(evlr);
                }
                Err(err) => {
                    self.warn(format!("could not read evlr {} of {}: {}", i + 1, n, err));
                    break;
                }
            }
        }
        self.declared_evlrs = 0;
        read.seek(SeekFrom::Start(position))?;
        Ok(())
    }

    fn from_raw(raw_header: raw::Header) -> Result<Header> {
        let point_format = Format::new(raw_header.point_data_format_id)?
            .with_record_length(raw_header.point_data_record_length)?;
        let mut header = Header {
            file_source_id: raw_header.file_source_id,
            global_encoding: raw_header.global_encoding,
            guid: raw_header.guid,
            version: raw_header.version,
            system_identifier: raw_header.system_identifier.as_ref().as_las_string_lossy(),
            generating_software: raw_header
                .generating_software
                .as_ref()
                .as_las_string_lossy(),
            file_creation_day_of_year: raw_header.file_creation_day_of_year,
            file_creation_year: raw_header.file_creation_year,
            header_size: raw_header.header_size,
            offset_to_point_data: raw_header.offset_to_point_data,
            point_format,
            number_of_point_records: raw_header.number_of_point_records,
            number_of_points_by_return: raw_header.number_of_points_by_return,
            transforms: Vector::new(
                Transform {
                    scale: raw_header.x_scale_factor,
                    offset: raw_header.x_offset,
                },
                Transform {
                    scale: raw_header.y_scale_factor,
                    offset: raw_header.y_offset,
                },
                Transform {
                    scale: raw_header.z_scale_factor,
                    offset: raw_header.z_offset,
                },
            ),
            bounds: Bounds {
                min: Vector::new(raw_header.min_x, raw_header.min_y, raw_header.min_z),
                max: Vector::new(raw_header.max_x, raw_header.max_y, raw_header.max_z),
            },
            start_of_waveform_data_packet_record: raw_header.start_of_waveform_data_packet_record,
            start_of_first_evlr: raw_header
                .evlr
                .map(|evlr| evlr.start_of_first_evlr)
                .unwrap_or(0),
            declared_evlrs: raw_header
                .evlr
                .map(|evlr| evlr.number_of_evlrs)
                .unwrap_or(0),
            large_file: raw_header.large_file,
            user_data_in_header: raw_header.padding,
            vlrs: Vec::new(),
            evlrs: Vec::new(),
            user_data_after_header: Vec::new(),
            geokeys: None,
            geo_double_params: None,
            geo_ascii_params: None,
            geo_wkt_math_transform: None,
            geo_wkt_coordinate_system: None,
            classification_lookup: None,
            text_area_description: None,
            extra_bytes: None,
            wave_packet_descriptors: BTreeMap::new(),
            laszip: None,
            tiling: None,
            original: None,
            warnings: Vec::new(),
        };
        header.check_fields();
        Ok(header)
    }

    fn check_fields(&mut self) {
        if !self.version.is_known() {
            self.warn(format!("unknown las version {}", self.version));
        }
        if self.point_format.is_extended() && !self.version.supports::<ExtendedPointFormats>() {
            self.warn(format!(
                "point format {} needs las 1.4, found {}",
                self.point_format, self.version
            ));
        }
        if self.global_encoding & 1 == 1 && !self.version.supports::<GpsStandardTime>() {
            self.warn(format!(
                "gps standard time flag is set, but las {} has no such flag",
                self.version
            ));
        }
        for (axis, transform) in [
            ("x", self.transforms.x),
            ("y", self.transforms.y),
            ("z", self.transforms.z),
        ] {
            if transform.scale == 0. {
                self.warn(format!("{} scale factor is zero", axis));
            }
        }
        if self.bounds.is_inverted() {
            self.warn(format!(
                "bounding box is inverted: min {:?} max {:?}",
                self.bounds.min, self.bounds.max
            ));
        }
        if self.version.supports::<LargeFiles>() {
            let legacy = u64::from(self.number_of_point_records);
            let extended = self
                .large_file
                .map(|large_file| large_file.number_of_point_records)
                .unwrap_or(0);
            if legacy > 0 && extended > 0 && legacy != extended {
                self.warn(format!(
                    "legacy point count {} disagrees with extended point count {}",
                    legacy, extended
                ));
            }
        }
    }

    fn read_vlrs<R: Read>(&mut self, mut read: R, number_of_vlrs: u32) -> Result<()> {
        let vlr_header_size = u32::from(VLR_HEADER_SIZE);
        let mut remaining = self.offset_to_point_data - u32::from(self.header_size);
        for i in 0..number_of_vlrs {
            if remaining < vlr_header_size {
                self.warn(format!(
                    "only {} bytes until the point block after reading {} of {} vlrs, \
                     skipping the rest",
                    remaining, i, number_of_vlrs
                ));
                break;
            }
            let mut raw_vlr = raw::Vlr::read_header_from(&mut read, false)?;
            remaining -= vlr_header_size;
            let declared = u32::try_from(u64::from(raw_vlr.record_length_after_header))?;
            let len = if declared > remaining {
                self.warn(format!(
                    "only {} bytes until the point block when reading {} bytes into vlr {}",
                    remaining,
                    declared,
                    i + 1
                ));
                remaining
            } else {
                declared
            };
            raw_vlr.record_length_after_header = RecordLength::Vlr(u16::try_from(len)?);
            raw_vlr.data = vec![0; usize::try_from(len)?];
            read.read_exact(&mut raw_vlr.data)?;
            remaining -= len;

            let vlr = Vlr::new(raw_vlr);
            if self.lift(&vlr)? {
                self.offset_to_point_data -= u32::try_from(vlr.len())?;
            } else {
                self.decode_payload(&vlr);
                self.vlrs.push(vlr);
            }
        }
        if remaining > 0 {
            self.user_data_after_header = vec![0; usize::try_from(remaining)?];
            read.read_exact(&mut self.user_data_after_header)?;
        }
        Ok(())
    }

    /// Takes records that the header manages itself out of the vlr list.
    fn lift(&mut self, vlr: &Vlr) -> Result<bool> {
        if vlr.is(LASZIP_ENCODED, LASZIP_RECORD_ID) {
            if self.laszip.is_some() {
                self.duplicate(vlr);
                return Ok(false);
            }
            let laszip = LasZip::read_from(vlr.data.as_slice())
                .map_err(|err| Error::Compression(err.to_string()))?;
            self.laszip = Some(laszip);
            Ok(true)
        } else if vlr.is(LASTOOLS, LASTILING_RECORD_ID) {
            if vlr.data.len() != LASTILING_SIZE {
                self.wrong_size(vlr, LASTILING_SIZE);
                Ok(false)
            } else if self.tiling.is_some() {
                self.duplicate(vlr);
                Ok(false)
            } else {
                self.tiling = Some(LasTiling::read_from(vlr.data.as_slice())?);
                Ok(true)
            }
        } else if vlr.is(LASTOOLS, LASORIGINAL_RECORD_ID) {
            if vlr.data.len() != LASORIGINAL_SIZE {
                self.wrong_size(vlr, LASORIGINAL_SIZE);
                Ok(false)
            } else if self.original.is_some() {
                self.duplicate(vlr);
                Ok(false)
            } else {
                self.original = Some(LasOriginal::read_from(vlr.data.as_slice())?);
                Ok(true)
            }
        } else {
            Ok(false)
        }
    }

    /// Decodes the payload of a well-known record. The first of each kind wins.
    fn decode_payload(&mut self, vlr: &Vlr) {
        let data = vlr.data.as_slice();
        if vlr.user_id == LASF_PROJECTION {
            match vlr.record_id {
                34735 => {
                    if self.geokeys.is_some() {
                        self.duplicate(vlr);
                    } else {
                        match GeoKeyDirectory::read_from(data) {
                            Ok(geokeys) => self.geokeys = Some(geokeys),
                            Err(err) => self.warn(format!("invalid geokey directory: {}", err)),
                        }
                    }
                }
                34736 => {
                    if self.geo_double_params.is_some() {
                        self.duplicate(vlr);
                    } else {
                        self.geo_double_params = Some(read_double_params(data));
                    }
                }
                34737 => {
                    if self.geo_ascii_params.is_some() {
                        self.duplicate(vlr);
                    } else {
                        self.geo_ascii_params = Some(data.as_las_string_lossy());
                    }
                }
                2111 => {
                    if self.geo_wkt_math_transform.is_some() {
                        self.duplicate(vlr);
                    } else {
                        self.geo_wkt_math_transform = Some(data.as_las_string_lossy());
                    }
                }
                2112 => {
                    if self.geo_wkt_coordinate_system.is_some() {
                        self.duplicate(vlr);
                    } else {
                        self.geo_wkt_coordinate_system = Some(data.as_las_string_lossy());
                    }
                }
                _ => {}
            }
        } else if vlr.user_id == LASF_SPEC {
            match vlr.record_id {
                0 => {
                    if self.classification_lookup.is_some() {
                        self.duplicate(vlr);
                    } else {
                        self.classification_lookup = Some(ClassificationLookup::new(data));
                    }
                }
                // Histogram, kept opaque in the vlr list.
                2 => {}
                3 => {
                    if self.text_area_description.is_some() {
                        self.duplicate(vlr);
                    } else {
                        self.text_area_description = Some(data.as_las_string_lossy());
                    }
                }
                4 => {
                    if self.extra_bytes.is_some() {
                        self.duplicate(vlr);
                    } else {
                        self.decode_extra_bytes(data);
                    }
                }
                100..=354 => self.decode_wave_packet_descriptor(vlr),
                _ => {}
            }
        }
    }

    fn decode_extra_bytes(&mut self, data: &[u8]) {
        match ExtraBytes::read_all(data) {
            Ok(extra_bytes) => {
                let size: u32 = extra_bytes.iter().map(|e| u32::from(e.size())).sum();
                if size > u32::from(self.point_format.extra_bytes) {
                    self.warn(format!(
                        "extra bytes descriptors need {} bytes but points only have {}",
                        size, self.point_format.extra_bytes
                    ));
                }
                self.extra_bytes = Some(extra_bytes);
            }
            Err(err) => self.warn(format!("invalid extra bytes descriptor: {}", err)),
        }
    }

    fn decode_wave_packet_descriptor(&mut self, vlr: &Vlr) {
        let Ok(index) = u8::try_from(vlr.record_id - 99) else {
            return;
        };
        if vlr.data.len() < WAVE_PACKET_DESCRIPTOR_SIZE {
            self.wrong_size(vlr, WAVE_PACKET_DESCRIPTOR_SIZE);
            return;
        }
        if self.wave_packet_descriptors.contains_key(&index) {
            self.duplicate(vlr);
            return;
        }
        match WavePacketDescriptor::read_from(vlr.data.as_slice()) {
            Ok(descriptor) => {
                if let Some(anomaly) = descriptor.anomaly() {
                    self.warn(format!("wave packet descriptor {}: {}", index, anomaly));
                }
                let _ = self.wave_packet_descriptors.insert(index, descriptor);
            }
            Err(err) => self.warn(format!("invalid wave packet descriptor {}: {}", index, err)),
        }
    }

    fn check_compression(&mut self) -> Result<()> {
        match (&self.laszip, self.point_format.is_compressed) {
            (Some(laszip), true) => laszip.validate(self.point_format.len()),
            (None, true) => Err(Error::MissingLaszipVlr),
            (Some(_), false) => {
                self.warn("found a laszip vlr but the points are not compressed".to_string());
                Ok(())
            }
            (None, false) => Ok(()),
        }
    }

    fn duplicate(&mut self, vlr: &Vlr) {
        self.warn(format!(
            "found a second {} {} record, keeping the first",
            vlr.user_id, vlr.record_id
        ));
    }

    fn wrong_size(&mut self, vlr: &Vlr, expected: usize) {
        self.warn(format!(
            "{} {} record has {} bytes instead of {}, keeping it as is",
            vlr.user_id,
            vlr.record_id,
            vlr.data.len(),
            expected
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Version, vlr::GeoKeyEntry};
    use std::io::Cursor;

    fn raw_vlr(user_id: &str, record_id: u16, data: Vec<u8>) -> raw::Vlr {
        Vlr::with_data(user_id, record_id, data).into_raw().unwrap()
    }

    /// Writes a raw header followed by the vlrs and `trailing` bytes, fixing up nothing.
    fn bytes(raw_header: &raw::Header, vlrs: &[raw::Vlr], trailing: &[u8]) -> Vec<u8> {
        let mut bytes = Vec::new();
        raw_header.write_to(&mut bytes).unwrap();
        for vlr in vlrs {
            vlr.write_to(&mut bytes).unwrap();
        }
        bytes.extend_from_slice(trailing);
        bytes
    }

    fn accounted(header: &Header) -> u32 {
        u32::from(header.header_size())
            + header.vlrs().iter().map(|v| v.len() as u32).sum::<u32>()
            + header.user_data_after_header().len() as u32
    }

    #[test]
    fn roundtrip() {
        let mut header = Header::default();
        header
            .add_vlr(Vlr::with_data("lasstream", 1, vec![1, 2, 3]), false)
            .unwrap();
        header.set_user_data_after_header(vec![9; 5]).unwrap();
        header.set_number_of_points(2);
        let mut bytes = Vec::new();
        header.write_to(&mut bytes).unwrap();
        let read = Header::read_from(Cursor::new(bytes)).unwrap();
        assert_eq!(header, read);
        assert_eq!(accounted(&read), read.offset_to_point_data());
    }

    #[test]
    fn truncated_vlr_table() {
        let vlr = raw_vlr("a", 1, vec![0; 4]);
        let raw_header = raw::Header {
            number_of_variable_length_records: 2,
            offset_to_point_data: 227 + 58 + 10,
            ..Default::default()
        };
        let header =
            Header::read_from(Cursor::new(bytes(&raw_header, &[vlr], &[7; 10]))).unwrap();
        assert_eq!(1, header.vlrs().len());
        assert_eq!(vec![7; 10], header.user_data_after_header());
        assert_eq!(1, header.warnings().len());
        assert_eq!(accounted(&header), header.offset_to_point_data());
    }

    #[test]
    fn vlr_payload_runs_into_points() {
        let mut vlr = raw_vlr("a", 1, vec![0; 20]);
        let raw_header = raw::Header {
            number_of_variable_length_records: 1,
            offset_to_point_data: 227 + 54 + 8,
            ..Default::default()
        };
        vlr.data.truncate(8);
        let header = Header::read_from(Cursor::new(bytes(&raw_header, &[vlr], &[]))).unwrap();
        assert_eq!(8, header.vlrs()[0].data.len());
        assert_eq!(1, header.warnings().len());
        assert_eq!(accounted(&header), header.offset_to_point_data());
    }

    #[test]
    fn duplicate_geokeys() {
        let geokeys = GeoKeyDirectory {
            key_directory_version: 1,
            key_revision: 1,
            minor_revision: 0,
            entries: vec![GeoKeyEntry {
                key_id: 1024,
                ..Default::default()
            }],
        };
        let mut first = Vec::new();
        geokeys.write_to(&mut first).unwrap();
        let second = vec![1, 0, 1, 0, 0, 0, 0, 0];
        let mut header = Header::default();
        header
            .add_vlr(Vlr::with_data(LASF_PROJECTION, 34735, first), true)
            .unwrap();
        header
            .add_vlr(Vlr::with_data(LASF_PROJECTION, 34735, second), true)
            .unwrap();
        let mut bytes = Vec::new();
        header.write_to(&mut bytes).unwrap();
        let read = Header::read_from(Cursor::new(bytes)).unwrap();
        assert_eq!(Some(&geokeys), read.geokeys());
        assert_eq!(2, read.vlrs().len());
        assert_eq!(1, read.warnings().len());
    }

    #[test]
    fn lifted_records() {
        let mut header = Header::default();
        header.add_vlr(Vlr::with_data("a", 1, vec![1]), false).unwrap();
        header.set_lastiling(LasTiling {
            level: 1,
            ..Default::default()
        });
        header.set_number_of_points(5);
        header.set_lasoriginal();
        let mut bytes = Vec::new();
        header.write_to(&mut bytes).unwrap();
        let read = Header::read_from(Cursor::new(bytes.clone())).unwrap();
        assert_eq!(1, read.vlrs().len());
        assert_eq!(227 + 55, read.offset_to_point_data());
        assert_eq!(Some(1), read.lastiling().map(|t| t.level));
        assert_eq!(Some(5), read.lasoriginal().map(|o| o.number_of_point_records));
        let mut rewritten = Vec::new();
        read.write_to(&mut rewritten).unwrap();
        assert_eq!(bytes, rewritten);
    }

    #[test]
    fn compressed_without_laszip() {
        let raw_header = raw::Header {
            point_data_format_id: 0x80,
            ..Default::default()
        };
        assert!(matches!(
            Header::read_from(Cursor::new(bytes(&raw_header, &[], &[]))),
            Err(Error::MissingLaszipVlr)
        ));
    }

    #[test]
    fn bad_laszip() {
        let laszip = LasZip {
            compressor: 7,
            ..Default::default()
        };
        let vlr = raw_vlr(LASZIP_ENCODED, LASZIP_RECORD_ID, laszip.to_bytes().unwrap());
        let raw_header = raw::Header {
            point_data_format_id: 0x80,
            number_of_variable_length_records: 1,
            offset_to_point_data: 227 + 54 + 34,
            ..Default::default()
        };
        assert!(matches!(
            Header::read_from(Cursor::new(bytes(&raw_header, &[vlr], &[]))),
            Err(Error::Compression(_))
        ));
    }

    #[test]
    fn recoverable_anomalies() {
        let raw_header = raw::Header {
            version: Version::new(1, 9),
            x_scale_factor: 0.,
            min_x: 10.,
            max_x: 0.,
            ..Default::default()
        };
        let header = Header::read_from(Cursor::new(bytes(&raw_header, &[], &[]))).unwrap();
        assert_eq!(3, header.warnings().len());
    }

    #[test]
    fn version_gated_fields() {
        let raw_header = raw::Header {
            point_data_format_id: 6,
            point_data_record_length: 30,
            global_encoding: 1,
            version: Version::new(1, 1),
            ..Default::default()
        };
        let header = Header::read_from(Cursor::new(bytes(&raw_header, &[], &[]))).unwrap();
        assert_eq!(2, header.warnings().len());
    }

    #[test]
    fn histogram_is_kept() {
        let mut header = Header::default();
        header
            .add_vlr(Vlr::with_data(LASF_SPEC, 2, vec![0; 12]), false)
            .unwrap();
        let mut bytes = Vec::new();
        header.write_to(&mut bytes).unwrap();
        let read = Header::read_from(Cursor::new(bytes)).unwrap();
        assert!(read.warnings().is_empty());
        assert_eq!(vec![0; 12], read.get_vlr(LASF_SPEC, 2).unwrap().data);
    }

    #[test]
    fn wave_packet_descriptors() {
        let descriptor = WavePacketDescriptor {
            bits_per_sample: 12,
            number_of_samples: 10,
            ..Default::default()
        };
        let mut data = Vec::new();
        descriptor.write_to(&mut data).unwrap();
        let mut header = Header::default();
        header
            .add_vlr(Vlr::with_data(LASF_SPEC, 100, data.clone()), false)
            .unwrap();
        header
            .add_vlr(Vlr::with_data(LASF_SPEC, 354, data), false)
            .unwrap();
        let mut bytes = Vec::new();
        header.write_to(&mut bytes).unwrap();
        let read = Header::read_from(Cursor::new(bytes)).unwrap();
        assert_eq!(Some(&descriptor), read.wave_packet_descriptor(1));
        assert!(read.wave_packet_descriptor(255).is_some());
        assert_eq!(2, read.warnings().len());
    }

    #[test]
    fn evlrs() {
        let evlr = Vlr {
            is_extended: true,
            ..Vlr::with_data(LASF_PROJECTION, 2112, b"PROJCS[]\0".to_vec())
        };
        let raw_header = raw::Header {
            version: Version::new(1, 4),
            header_size: 375,
            offset_to_point_data: 375,
            evlr: Some(raw::Evlr {
                start_of_first_evlr: 375 + 20,
                number_of_evlrs: 1,
            }),
            large_file: Some(raw::LargeFile::default()),
            ..Default::default()
        };
        let mut bytes = bytes(&raw_header, &[], &[0; 20]);
        evlr.clone().into_raw().unwrap().write_to(&mut bytes).unwrap();
        let mut cursor = Cursor::new(bytes);
        let mut header = Header::read_from(&mut cursor).unwrap();
        header.read_evlrs(&mut cursor).unwrap();
        assert_eq!(375, cursor.position());
        assert_eq!(&[evlr], header.evlrs());
        assert_eq!(Some("PROJCS[]"), header.geo_wkt_coordinate_system());
    }

    #[test]
    fn evlr_longer_than_the_file() {
        let mut evlr = raw_vlr(LASF_PROJECTION, 2112, b"PROJCS[]\0".to_vec());
        evlr.record_length_after_header = RecordLength::Evlr(u64::MAX);
        let raw_header = raw::Header {
            version: Version::new(1, 4),
            header_size: 375,
            offset_to_point_data: 375,
            evlr: Some(raw::Evlr {
                start_of_first_evlr: 375,
                number_of_evlrs: 1,
            }),
            large_file: Some(raw::LargeFile::default()),
            ..Default::default()
        };
        let mut cursor = Cursor::new(bytes(&raw_header, &[], &[]));
        evlr.write_to(cursor.get_mut()).unwrap();
        let mut header = Header::read_from(&mut cursor).unwrap();
        header.read_evlrs(&mut cursor).unwrap();
        assert_eq!(375, cursor.position());
        assert!(header.evlrs().is_empty());
        assert!(header.geo_wkt_coordinate_system().is_none());
        assert_eq!(1, header.warnings().len());
        assert!(header.warnings()[0].starts_with("could not read evlr 1 of 1"));
    }
}
