//! Variable length records are used to store additional metadata not defined in the header.
//!
//! Variable length records (VLRs) can be "regular" or "extended". "Regular" vlrs are stored right
//! after the header, before the point records. "Extended" vlrs (EVLRs) are stored at the end of
//! the file, after the point records.
//!
//! Vlrs contain arbitrary data:
//!
//! ```
//! use lasstream::Vlr;
//! let vlr = Vlr {
//!     user_id: "lasstream".to_string(),
//!     record_id: 42,
//!     description: "Some really important data".to_string(),
//!     data: vec![1, 2, 3],
//!     is_extended: false,
//! };
//! assert_eq!(57, vlr.len());
//! ```
//!
//! Some records are well known, and their payloads are decoded into the types in this module
//! when a [Header](crate::Header) is read.

mod classification;
mod extra_bytes;
mod geokeys;
mod lastools;
mod laszip;
mod wave_packet;

pub use self::classification::ClassificationLookup;
pub use self::extra_bytes::{DataType, EXTRA_BYTES_DESCRIPTOR_SIZE, ExtraBytes};
pub use self::geokeys::{GeoKeyDirectory, GeoKeyEntry};
pub use self::lastools::{
    LASORIGINAL_RECORD_ID, LASORIGINAL_SIZE, LASTILING_RECORD_ID, LASTILING_SIZE, LasOriginal,
    LasTiling,
};
pub use self::laszip::{LasZip, LasZipItem};
pub use self::wave_packet::{WAVE_PACKET_DESCRIPTOR_SIZE, WavePacketDescriptor};

pub(crate) use self::geokeys::read_double_params;

use crate::{
    Error, Result, raw,
    raw::{EVLR_HEADER_SIZE, RecordLength, VLR_HEADER_SIZE},
    utils::{AsLasStr, FromLasStr},
};

/// The user id of the records defined by the las specification.
pub const LASF_SPEC: &str = "LASF_Spec";

/// The user id of the georeferencing records.
pub const LASF_PROJECTION: &str = "LASF_Projection";

/// The user id of the tiling and original-counts records.
pub const LASTOOLS: &str = "LAStools";

/// The user id of the compression descriptor.
pub const LASZIP_ENCODED: &str = "laszip encoded";

/// The record id of the compression descriptor.
pub const LASZIP_RECORD_ID: u16 = 22204;

/// A variable length record.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Vlr {
    /// The user that created this record.
    ///
    /// This value is often an official, "registered" user_id, such as "LASF_Spec" or
    /// "LASF_Projection".
    pub user_id: String,

    /// This value specifies the type of record, and depends on the user id.
    pub record_id: u16,

    /// Textual description of these data.
    pub description: String,

    /// The data themselves.
    pub data: Vec<u8>,

    /// Should this vlr be written "extended", i.e. at the end of the file.
    pub is_extended: bool,
}

impl Vlr {
    /// Creates a vlr from a raw vlr.
    ///
    /// Invalid characters in the strings are replaced, not rejected.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasstream::{Vlr, raw};
    /// let vlr = Vlr::new(raw::Vlr::default());
    /// ```
    pub fn new(raw_vlr: raw::Vlr) -> Vlr {
        Vlr {
            user_id: raw_vlr.user_id.as_ref().as_las_string_lossy(),
            record_id: raw_vlr.record_id,
            description: raw_vlr.description.as_ref().as_las_string_lossy(),
            is_extended: raw_vlr.is_extended(),
            data: raw_vlr.data,
        }
    }

    /// Creates a vlr with the given ids and data.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasstream::Vlr;
    /// let vlr = Vlr::with_data("LASF_Projection", 2112, vec![0]);
    /// assert!(vlr.is("LASF_Projection", 2112));
    /// ```
    pub fn with_data(user_id: &str, record_id: u16, data: Vec<u8>) -> Vlr {
        Vlr {
            user_id: user_id.to_string(),
            record_id,
            data,
            ..Default::default()
        }
    }

    /// Converts this vlr to a raw vlr.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasstream::Vlr;
    /// let raw_vlr = Vlr::default().into_raw().unwrap();
    /// ```
    pub fn into_raw(self) -> Result<raw::Vlr> {
        let mut user_id = [0; 16];
        user_id.as_mut().from_las_str(&self.user_id)?;
        let mut description = [0; 32];
        description.as_mut().from_las_str(&self.description)?;
        let record_length_after_header = if self.is_extended {
            RecordLength::Evlr(self.data.len() as u64)
        } else {
            RecordLength::Vlr(
                u16::try_from(self.data.len()).map_err(|_| Error::VlrTooLong(self.data.len()))?,
            )
        };
        Ok(raw::Vlr {
            reserved: 0,
            user_id,
            record_id: self.record_id,
            record_length_after_header,
            description,
            data: self.data,
        })
    }

    /// Returns the total length of this vlr, header and data.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasstream::Vlr;
    /// let mut vlr = Vlr::default();
    /// assert_eq!(54, vlr.len());
    /// vlr.is_extended = true;
    /// assert_eq!(60, vlr.len());
    /// ```
    pub fn len(&self) -> usize {
        let header_size = if self.is_extended {
            EVLR_HEADER_SIZE
        } else {
            VLR_HEADER_SIZE
        };
        self.data.len() + usize::from(header_size)
    }

    /// Returns true if the data of this vlr are empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Does this vlr have the given user id and record id?
    pub fn is(&self, user_id: &str, record_id: u16) -> bool {
        self.record_id == record_id && self.user_id == user_id
    }
}
