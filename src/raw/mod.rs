//! Raw structures that map directly onto structures as defined in the las format specifications.
//!
//! These structures are "dumb": they only check what's needed to keep reading. For example, the
//! raw header keeps a zero scale factor, while [crate::Header] warns about it:
//!
//! ```
//! let raw_header = lasstream::raw::Header::default();
//! assert_eq!(0.01, raw_header.x_scale_factor);
//! ```
//!
//! Users should prefer the non-raw versions, e.g. [crate::Header] over [Header].

mod header;
pub mod point;
mod vlr;

pub use self::header::{Evlr, Header, LargeFile, MIN_HEADER_SIZE};
pub use self::vlr::{EVLR_HEADER_SIZE, RecordLength, VLR_HEADER_SIZE, Vlr};

/// The file magic number used for all las files.
pub const LASF: [u8; 4] = *b"LASF";
