//! Work with las headers and the information contained therein.
//!
//! A [Header] is the decoded fixed header together with its variable length records and the
//! records' well-known payloads. Headers keep their byte accounting consistent: after every
//! mutation,
//!
//! ```text
//! offset_to_point_data == header_size + Σ vlr.len() + user_data_after_header.len()
//! ```
//!
//! The compression descriptor and the LAStools tiling and original-counts records are lifted out
//! of the vlr list when read, so they don't count towards that sum. [Header::write_to] puts them
//! back.
//!
//! ```
//! use lasstream::{Header, Vlr};
//! let mut header = Header::default();
//! assert_eq!(227, header.offset_to_point_data());
//! header.add_vlr(Vlr::with_data("lasstream", 1, vec![0; 10]), false).unwrap();
//! assert_eq!(227 + 54 + 10, header.offset_to_point_data());
//! ```

mod decode;

use crate::{
    Bounds, Error, Result, Transform, Vector, Version,
    feature::{Evlrs, LargeFiles, Waveforms},
    point::Format,
    raw,
    utils::FromLasStr,
    vlr::{
        ClassificationLookup, ExtraBytes, GeoKeyDirectory, LASORIGINAL_RECORD_ID,
        LASTILING_RECORD_ID, LASTOOLS, LASZIP_ENCODED, LASZIP_RECORD_ID, LasOriginal, LasTiling,
        LasZip, Vlr, WavePacketDescriptor,
    },
};
use chrono::NaiveDate;
use log::{Level, log};
use std::{collections::BTreeMap, io::Write};
use uuid::Uuid;

/// Metadata describing the layout and interpretation of the points.
#[derive(Clone, Debug, PartialEq)]
pub struct Header {
    file_source_id: u16,
    global_encoding: u16,
    guid: [u8; 16],
    version: Version,
    system_identifier: String,
    generating_software: String,
    file_creation_day_of_year: u16,
    file_creation_year: u16,
    header_size: u16,
    offset_to_point_data: u32,
    point_format: Format,
    number_of_point_records: u32,
    number_of_points_by_return: [u32; 5],
    transforms: Vector<Transform>,
    bounds: Bounds,
    start_of_waveform_data_packet_record: Option<u64>,
    start_of_first_evlr: u64,
    declared_evlrs: u32,
    large_file: Option<raw::LargeFile>,
    user_data_in_header: Vec<u8>,
    vlrs: Vec<Vlr>,
    evlrs: Vec<Vlr>,
    user_data_after_header: Vec<u8>,

    geokeys: Option<GeoKeyDirectory>,
    geo_double_params: Option<Vec<f64>>,
    geo_ascii_params: Option<String>,
    geo_wkt_math_transform: Option<String>,
    geo_wkt_coordinate_system: Option<String>,
    classification_lookup: Option<ClassificationLookup>,
    text_area_description: Option<String>,
    extra_bytes: Option<Vec<ExtraBytes>>,
    wave_packet_descriptors: BTreeMap<u8, WavePacketDescriptor>,
    laszip: Option<LasZip>,
    tiling: Option<LasTiling>,
    original: Option<LasOriginal>,

    warnings: Vec<String>,
}

impl Header {
    /// Returns this header's version.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Returns the file source id.
    pub fn file_source_id(&self) -> u16 {
        self.file_source_id
    }

    /// Returns the global encoding bit field.
    pub fn global_encoding(&self) -> u16 {
        self.global_encoding
    }

    /// Returns the project id.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasstream::Header;
    /// assert!(Header::default().guid().is_nil());
    /// ```
    pub fn guid(&self) -> Uuid {
        Uuid::from_bytes_le(self.guid)
    }

    /// Sets the project id.
    pub fn set_guid(&mut self, guid: Uuid) {
        self.guid = guid.to_bytes_le();
    }

    /// Returns the system identifier.
    pub fn system_identifier(&self) -> &str {
        &self.system_identifier
    }

    /// Returns the generating software.
    pub fn generating_software(&self) -> &str {
        &self.generating_software
    }

    /// Returns the file creation date, if the day and year make a valid date.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use lasstream::Header;
    /// let mut header = Header::default();
    /// header.set_date(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
    /// assert_eq!(NaiveDate::from_ymd_opt(2024, 2, 1), header.date());
    /// ```
    pub fn date(&self) -> Option<NaiveDate> {
        NaiveDate::from_yo_opt(
            i32::from(self.file_creation_year),
            u32::from(self.file_creation_day_of_year),
        )
    }

    /// Sets the file creation date.
    ///
    /// Years a las header can't hold leave the date unchanged, with a warning.
    pub fn set_date(&mut self, date: NaiveDate) {
        use chrono::Datelike;
        match (u16::try_from(date.year()), u16::try_from(date.ordinal())) {
            (Ok(year), Ok(day_of_year)) => {
                self.file_creation_year = year;
                self.file_creation_day_of_year = day_of_year;
            }
            _ => self.warn(format!("{} does not fit in a las header", date)),
        }
    }

    /// Returns the size of the header, user data in the header included.
    pub fn header_size(&self) -> u16 {
        self.header_size
    }

    /// Returns the offset to the point data, not counting lifted records.
    pub fn offset_to_point_data(&self) -> u32 {
        self.offset_to_point_data
    }

    /// Returns the point format.
    pub fn point_format(&self) -> Format {
        self.point_format
    }

    /// Returns the transforms from quantized to real coordinates.
    pub fn transforms(&self) -> Vector<Transform> {
        self.transforms
    }

    /// Sets the transforms.
    pub fn set_transforms(&mut self, transforms: Vector<Transform>) {
        self.transforms = transforms;
    }

    /// Returns the bounding box.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Replaces the bounding box as-is, without quantizing it.
    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.bounds = bounds;
    }

    /// Returns the number of points.
    ///
    /// The legacy 32-bit count wins if it's set, as it's what older readers see.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasstream::Header;
    /// let mut header = Header::default();
    /// header.set_number_of_points(42);
    /// assert_eq!(42, header.number_of_points());
    /// ```
    pub fn number_of_points(&self) -> u64 {
        if self.number_of_point_records > 0 {
            u64::from(self.number_of_point_records)
        } else {
            self.large_file
                .map(|large_file| large_file.number_of_point_records)
                .unwrap_or(0)
        }
    }

    /// Returns the number of points with the given return number, one-indexed.
    pub fn number_of_points_by_return(&self, n: u8) -> Option<u64> {
        let index = usize::from(n.checked_sub(1)?);
        let legacy = self.number_of_points_by_return.get(index).copied().unwrap_or(0);
        if legacy > 0 {
            Some(u64::from(legacy))
        } else if let Some(large_file) = self.large_file {
            large_file.number_of_points_by_return.get(index).copied()
        } else if index < 5 {
            Some(0)
        } else {
            None
        }
    }

    /// Sets the number of points.
    ///
    /// Counts that don't fit the legacy field leave it zero.
    pub fn set_number_of_points(&mut self, n: u64) {
        let fits = u32::try_from(n).ok();
        self.number_of_point_records = fits.unwrap_or(0);
        if self.version.supports::<LargeFiles>() {
            self.large_file.get_or_insert_with(Default::default).number_of_point_records = n;
        } else if fits.is_none() {
            self.warn(format!(
                "{} points do not fit in a las {} header",
                n, self.version
            ));
        }
    }

    /// Sets the number of points by return, one-indexed and up to fifteen.
    pub fn set_number_of_points_by_return(&mut self, counts: &[u64]) {
        for (i, n) in self.number_of_points_by_return.iter_mut().enumerate() {
            *n = counts
                .get(i)
                .and_then(|&n| u32::try_from(n).ok())
                .unwrap_or(0);
        }
        if self.version.supports::<LargeFiles>() {
            let large_file = self.large_file.get_or_insert_with(Default::default);
            for (i, n) in large_file.number_of_points_by_return.iter_mut().enumerate() {
                *n = counts.get(i).copied().unwrap_or(0);
            }
        }
    }

    /// Returns the offset to the waveform data packet record, las 1.3 and later.
    pub fn start_of_waveform_data_packet_record(&self) -> Option<u64> {
        self.start_of_waveform_data_packet_record
    }

    /// Returns the bytes after the standard header fields but inside `header_size`.
    pub fn user_data_in_header(&self) -> &[u8] {
        &self.user_data_in_header
    }

    /// Returns the bytes between the last vlr and the point data.
    pub fn user_data_after_header(&self) -> &[u8] {
        &self.user_data_after_header
    }

    /// Returns the variable length records.
    pub fn vlrs(&self) -> &[Vlr] {
        &self.vlrs
    }

    /// Returns the extended variable length records.
    pub fn evlrs(&self) -> &[Vlr] {
        &self.evlrs
    }

    /// Returns the GeoTIFF key directory.
    pub fn geokeys(&self) -> Option<&GeoKeyDirectory> {
        self.geokeys.as_ref()
    }

    /// Returns the GeoTIFF double parameters.
    pub fn geo_double_params(&self) -> Option<&[f64]> {
        self.geo_double_params.as_deref()
    }

    /// Returns the GeoTIFF ascii parameters.
    pub fn geo_ascii_params(&self) -> Option<&str> {
        self.geo_ascii_params.as_deref()
    }

    /// Returns the OGC math transform WKT.
    pub fn geo_wkt_math_transform(&self) -> Option<&str> {
        self.geo_wkt_math_transform.as_deref()
    }

    /// Returns the OGC coordinate system WKT.
    pub fn geo_wkt_coordinate_system(&self) -> Option<&str> {
        self.geo_wkt_coordinate_system.as_deref()
    }

    /// Returns the classification lookup table.
    pub fn classification_lookup(&self) -> Option<&ClassificationLookup> {
        self.classification_lookup.as_ref()
    }

    /// Returns the text area description.
    pub fn text_area_description(&self) -> Option<&str> {
        self.text_area_description.as_deref()
    }

    /// Returns the extra bytes descriptors.
    pub fn extra_bytes(&self) -> &[ExtraBytes] {
        self.extra_bytes.as_deref().unwrap_or(&[])
    }

    /// Returns the wave packet descriptor with the given index, one through 255.
    pub fn wave_packet_descriptor(&self, index: u8) -> Option<&WavePacketDescriptor> {
        self.wave_packet_descriptors.get(&index)
    }

    /// Returns the compression descriptor.
    pub fn laszip(&self) -> Option<&LasZip> {
        self.laszip.as_ref()
    }

    /// Returns the tiling record.
    pub fn lastiling(&self) -> Option<&LasTiling> {
        self.tiling.as_ref()
    }

    /// Returns the original-counts record.
    pub fn lasoriginal(&self) -> Option<&LasOriginal> {
        self.original.as_ref()
    }

    /// Returns the warnings collected while reading or changing this header.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Adds a vlr.
    ///
    /// A vlr with the same user id and record id is overwritten in place, unless `force_append`
    /// is set.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasstream::{Header, Vlr};
    /// let mut header = Header::default();
    /// header.add_vlr(Vlr::with_data("lasstream", 1, vec![0; 10]), false).unwrap();
    /// header.add_vlr(Vlr::with_data("lasstream", 1, vec![0; 4]), false).unwrap();
    /// assert_eq!(1, header.vlrs().len());
    /// assert_eq!(227 + 54 + 4, header.offset_to_point_data());
    /// ```
    pub fn add_vlr(&mut self, mut vlr: Vlr, force_append: bool) -> Result<()> {
        vlr.is_extended = false;
        if vlr.data.len() > usize::from(u16::MAX) {
            return Err(Error::VlrTooLong(vlr.data.len()));
        }
        let added = vlr_len(&vlr)?;
        let existing = if force_append {
            None
        } else {
            self.vlrs
                .iter()
                .position(|v| v.is(&vlr.user_id, vlr.record_id))
        };
        let removed = match existing {
            Some(i) => vlr_len(&self.vlrs[i])?,
            None => 0,
        };
        let offset = (self.offset_to_point_data - removed)
            .checked_add(added)
            .ok_or(Error::VlrTooLong(vlr.data.len()))?;
        match existing {
            Some(i) => self.vlrs[i] = vlr,
            None => self.vlrs.push(vlr),
        }
        self.offset_to_point_data = offset;
        Ok(())
    }

    /// Removes the vlr with the given ids, moving the last vlr into its slot.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasstream::{Header, Vlr};
    /// let mut header = Header::default();
    /// header.add_vlr(Vlr::with_data("a", 1, vec![]), false).unwrap();
    /// header.add_vlr(Vlr::with_data("b", 2, vec![]), false).unwrap();
    /// header.add_vlr(Vlr::with_data("c", 3, vec![]), false).unwrap();
    /// header.remove_vlr("a", 1).unwrap();
    /// assert_eq!("c", header.vlrs()[0].user_id);
    /// assert_eq!(227 + 2 * 54, header.offset_to_point_data());
    /// ```
    pub fn remove_vlr(&mut self, user_id: &str, record_id: u16) -> Option<Vlr> {
        let i = self.vlrs.iter().position(|v| v.is(user_id, record_id))?;
        let vlr = self.vlrs.swap_remove(i);
        self.offset_to_point_data -= vlr_len(&vlr).unwrap_or(0);
        Some(vlr)
    }

    /// Returns the vlr with the given ids.
    pub fn get_vlr(&self, user_id: &str, record_id: u16) -> Option<&Vlr> {
        self.vlrs.iter().find(|v| v.is(user_id, record_id))
    }

    /// Removes every vlr.
    pub fn clean_vlrs(&mut self) {
        let removed: u32 = self.vlrs.iter().map(|v| vlr_len(v).unwrap_or(0)).sum();
        self.offset_to_point_data -= removed;
        self.vlrs.clear();
    }

    /// Adds an extended vlr, with the same overwrite rule as [Header::add_vlr].
    ///
    /// Evlrs live after the points, so the offset to point data doesn't change.
    pub fn add_evlr(&mut self, mut evlr: Vlr, force_append: bool) {
        evlr.is_extended = true;
        if !self.version.supports::<Evlrs>() {
            self.warn(format!(
                "las {} does not support evlrs, {} {} will not be written",
                self.version, evlr.user_id, evlr.record_id
            ));
        }
        let existing = if force_append {
            None
        } else {
            self.evlrs
                .iter()
                .position(|v| v.is(&evlr.user_id, evlr.record_id))
        };
        match existing {
            Some(i) => self.evlrs[i] = evlr,
            None => self.evlrs.push(evlr),
        }
    }

    /// Removes the evlr with the given ids, moving the last evlr into its slot.
    pub fn remove_evlr(&mut self, user_id: &str, record_id: u16) -> Option<Vlr> {
        let i = self.evlrs.iter().position(|v| v.is(user_id, record_id))?;
        Some(self.evlrs.swap_remove(i))
    }

    /// Returns the evlr with the given ids.
    pub fn get_evlr(&self, user_id: &str, record_id: u16) -> Option<&Vlr> {
        self.evlrs.iter().find(|v| v.is(user_id, record_id))
    }

    /// Removes every evlr.
    pub fn clean_evlrs(&mut self) {
        self.evlrs.clear();
    }

    /// Replaces the user data inside the header, growing or shrinking `header_size`.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasstream::Header;
    /// let mut header = Header::default();
    /// header.set_user_data_in_header(vec![0; 3]).unwrap();
    /// assert_eq!(230, header.header_size());
    /// assert_eq!(230, header.offset_to_point_data());
    /// ```
    pub fn set_user_data_in_header(&mut self, data: Vec<u8>) -> Result<()> {
        let standard = self.header_size - u16::try_from(self.user_data_in_header.len())?;
        let header_size = standard
            .checked_add(u16::try_from(data.len())?)
            .ok_or(Error::HeaderTooSmall(standard))?;
        self.offset_to_point_data =
            self.offset_to_point_data - u32::from(self.header_size) + u32::from(header_size);
        self.header_size = header_size;
        self.user_data_in_header = data;
        Ok(())
    }

    /// Replaces the user data between the vlrs and the points.
    pub fn set_user_data_after_header(&mut self, data: Vec<u8>) -> Result<()> {
        let old = u32::try_from(self.user_data_after_header.len())?;
        let new = u32::try_from(data.len())?;
        self.offset_to_point_data = (self.offset_to_point_data - old)
            .checked_add(new)
            .ok_or(Error::VlrTooLong(data.len()))?;
        self.user_data_after_header = data;
        Ok(())
    }

    /// Sets the tiling record.
    pub fn set_lastiling(&mut self, tiling: LasTiling) {
        self.tiling = Some(tiling);
    }

    /// Removes the tiling record.
    pub fn clean_lastiling(&mut self) {
        self.tiling = None;
    }

    /// Snapshots the current point counts and bounds, so they can be restored after an operation
    /// that changes them.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasstream::{Header, Vector};
    /// let mut header = Header::default();
    /// header.set_number_of_points(10);
    /// header.set_lasoriginal();
    /// header.set_number_of_points(3);
    /// assert!(header.restore_lasoriginal());
    /// assert_eq!(10, header.number_of_points());
    /// assert!(header.lasoriginal().is_none());
    /// ```
    pub fn set_lasoriginal(&mut self) {
        let mut number_of_points_by_return = [0; 15];
        for (i, n) in number_of_points_by_return.iter_mut().enumerate() {
            *n = self
                .number_of_points_by_return(i as u8 + 1)
                .unwrap_or(0);
        }
        self.original = Some(LasOriginal {
            number_of_point_records: self.number_of_points(),
            number_of_points_by_return,
            bounds: self.bounds,
        });
    }

    /// Copies the original-counts snapshot back into the header and discards it.
    ///
    /// Returns false if there was no snapshot.
    pub fn restore_lasoriginal(&mut self) -> bool {
        let Some(original) = self.original.take() else {
            return false;
        };
        self.set_number_of_points(original.number_of_point_records);
        self.set_number_of_points_by_return(&original.number_of_points_by_return);
        self.bounds = original.bounds;
        true
    }

    /// Sets the bounding box, optionally choosing scale factors and offsets to suit it.
    ///
    /// Boxes that fit in longitude and latitude ranges get a `1e-7` xy scale and no offset.
    /// Everything else gets a `0.01` scale and offsets rounded to 100,000 near the box's center.
    /// The stored box is quantized with the resulting transforms.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasstream::{Header, Vector};
    /// let mut header = Header::default();
    /// header.set_bounding_box(
    ///     Vector::new(-123.1, 44.0, 0.),
    ///     Vector::new(-123.0, 44.1, 10.),
    ///     true,
    ///     true,
    /// );
    /// assert_eq!(1e-7, header.transforms().x.scale);
    /// assert_eq!(0., header.transforms().x.offset);
    /// ```
    pub fn set_bounding_box(
        &mut self,
        min: Vector<f64>,
        max: Vector<f64>,
        auto_scale: bool,
        auto_offset: bool,
    ) {
        let geographic = -360. < min.x && max.x < 360. && -90. < min.y && max.y < 90.;
        if auto_scale {
            let xy = if geographic { 1e-7 } else { 0.01 };
            self.transforms.x.scale = xy;
            self.transforms.y.scale = xy;
            self.transforms.z.scale = 0.01;
        }
        if auto_offset {
            if geographic {
                self.transforms.x.offset = 0.;
                self.transforms.y.offset = 0.;
                self.transforms.z.offset = 0.;
            } else {
                self.transforms.x.offset = centered_offset(min.x, max.x);
                self.transforms.y.offset = centered_offset(min.y, max.y);
                self.transforms.z.offset = centered_offset(min.z, max.z);
            }
        }
        let Vector { x, y, z } = self.transforms;
        self.bounds = Bounds {
            min: Vector::new(x.quantize(min.x), y.quantize(min.y), z.quantize(min.z)),
            max: Vector::new(x.quantize(max.x), y.quantize(max.y), z.quantize(max.z)),
        };
    }

    /// Converts this header into a raw header, putting the lifted records back into the counts.
    pub fn to_raw(&self) -> Result<raw::Header> {
        let lifted = self.lifted_vlrs()?;
        let lifted_len = lifted
            .iter()
            .map(vlr_len)
            .sum::<Result<u32>>()?;
        let mut system_identifier = [0; 32];
        system_identifier
            .as_mut()
            .from_las_str(&self.system_identifier)?;
        let mut generating_software = [0; 32];
        generating_software
            .as_mut()
            .from_las_str(&self.generating_software)?;
        let Vector { x, y, z } = self.transforms;
        Ok(raw::Header {
            file_signature: raw::LASF,
            file_source_id: self.file_source_id,
            global_encoding: self.global_encoding,
            guid: self.guid,
            version: self.version,
            system_identifier,
            generating_software,
            file_creation_day_of_year: self.file_creation_day_of_year,
            file_creation_year: self.file_creation_year,
            header_size: self.header_size,
            offset_to_point_data: self.offset_to_point_data + lifted_len,
            number_of_variable_length_records: u32::try_from(self.vlrs.len() + lifted.len())?,
            point_data_format_id: self.point_format.to_u8(),
            point_data_record_length: self.point_format.len(),
            number_of_point_records: self.number_of_point_records,
            number_of_points_by_return: self.number_of_points_by_return,
            x_scale_factor: x.scale,
            y_scale_factor: y.scale,
            z_scale_factor: z.scale,
            x_offset: x.offset,
            y_offset: y.offset,
            z_offset: z.offset,
            max_x: self.bounds.max.x,
            min_x: self.bounds.min.x,
            max_y: self.bounds.max.y,
            min_y: self.bounds.min.y,
            max_z: self.bounds.max.z,
            min_z: self.bounds.min.z,
            start_of_waveform_data_packet_record: if self.version.supports::<Waveforms>() {
                Some(self.start_of_waveform_data_packet_record.unwrap_or(0))
            } else {
                None
            },
            evlr: if self.version.supports::<Evlrs>() {
                Some(raw::Evlr {
                    start_of_first_evlr: self.start_of_first_evlr,
                    number_of_evlrs: u32::try_from(self.evlrs.len())?,
                })
            } else {
                None
            },
            large_file: self.large_file,
            padding: self.user_data_in_header.clone(),
        })
    }

    /// Writes the header, the vlrs and the user data after the header.
    ///
    /// The lifted records follow the other vlrs. Evlrs are not written, see
    /// [Header::write_evlrs_to].
    ///
    /// # Examples
    ///
    /// ```
    /// use lasstream::Header;
    /// let header = Header::default();
    /// let mut bytes = Vec::new();
    /// header.write_to(&mut bytes).unwrap();
    /// assert_eq!(227, bytes.len());
    /// ```
    pub fn write_to<W: Write>(&self, mut write: W) -> Result<()> {
        self.to_raw()?.write_to(&mut write)?;
        for vlr in self.vlrs.iter().cloned().chain(self.lifted_vlrs()?) {
            vlr.into_raw()?.write_to(&mut write)?;
        }
        write.write_all(&self.user_data_after_header)?;
        Ok(())
    }

    /// Writes the evlrs, to be placed after the point data.
    pub fn write_evlrs_to<W: Write>(&self, mut write: W) -> Result<()> {
        for evlr in &self.evlrs {
            evlr.clone().into_raw()?.write_to(&mut write)?;
        }
        Ok(())
    }

    fn lifted_vlrs(&self) -> Result<Vec<Vlr>> {
        let mut vlrs = Vec::new();
        if let Some(tiling) = self.tiling {
            let mut data = Vec::new();
            tiling.write_to(&mut data)?;
            vlrs.push(Vlr {
                description: "tile of a quadtree".to_string(),
                ..Vlr::with_data(LASTOOLS, LASTILING_RECORD_ID, data)
            });
        }
        if let Some(original) = self.original {
            let mut data = Vec::new();
            original.write_to(&mut data)?;
            vlrs.push(Vlr {
                description: "counts and bounds before edit".to_string(),
                ..Vlr::with_data(LASTOOLS, LASORIGINAL_RECORD_ID, data)
            });
        }
        if let Some(laszip) = &self.laszip {
            vlrs.push(Vlr {
                description: "laszip compression".to_string(),
                ..Vlr::with_data(LASZIP_ENCODED, LASZIP_RECORD_ID, laszip.to_bytes()?)
            });
        }
        Ok(vlrs)
    }

    pub(crate) fn warn(&mut self, message: String) {
        log!(Level::Warn, "{}", message);
        self.warnings.push(message);
    }
}

impl Default for Header {
    fn default() -> Header {
        let raw = raw::Header::default();
        let transform = Transform {
            scale: raw.x_scale_factor,
            offset: 0.,
        };
        Header {
            file_source_id: 0,
            global_encoding: 0,
            guid: [0; 16],
            version: raw.version,
            system_identifier: String::new(),
            generating_software: format!("lasstream {}", env!("CARGO_PKG_VERSION")),
            file_creation_day_of_year: 0,
            file_creation_year: 0,
            header_size: raw.header_size,
            offset_to_point_data: raw.offset_to_point_data,
            point_format: Format::default(),
            number_of_point_records: 0,
            number_of_points_by_return: [0; 5],
            transforms: Vector::new(transform, transform, transform),
            bounds: Bounds {
                min: Vector::default(),
                max: Vector::default(),
            },
            start_of_waveform_data_packet_record: None,
            start_of_first_evlr: 0,
            declared_evlrs: 0,
            large_file: None,
            user_data_in_header: Vec::new(),
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
        }
    }
}

fn vlr_len(vlr: &Vlr) -> Result<u32> {
    Ok(u32::try_from(vlr.len())?)
}

fn centered_offset(min: f64, max: f64) -> f64 {
    f64::from(((min + max) / 200_000.) as i32) * 100_000.
}
