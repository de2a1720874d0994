use crate::{Transform, Version, point::Format};
use thiserror::Error;

/// Crate-specific error enum.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The file signature was not "LASF".
    #[error("file signature must be LASF, found {0:?}")]
    InvalidFileSignature([u8; 4]),

    /// The header is smaller than any las header can be.
    #[error("header size {0} is smaller than the minimum of 227 bytes")]
    HeaderTooSmall(u16),

    /// The header is too small for the fields its version requires.
    #[error("las {version} requires a header of at least {minimum} bytes, found {header_size}")]
    HeaderTooSmallForVersion {
        /// The declared version.
        version: Version,
        /// The declared header size.
        header_size: u16,
        /// The smallest header this version allows.
        minimum: u16,
    },

    /// The point data would start inside the header.
    #[error("offset to point data {offset} is smaller than the header size {header_size}")]
    OffsetToPointDataTooSmall {
        /// The declared offset to point data.
        offset: u32,
        /// The declared header size.
        header_size: u16,
    },

    /// Wrapper around `std::io::Error`.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper around `std::num::TryFromIntError`.
    #[error(transparent)]
    TryFromInt(#[from] std::num::TryFromIntError),

    /// The compression descriptor is unreadable or does not describe the point records.
    #[error("invalid compression descriptor: {0}")]
    Compression(String),

    /// The point format says compressed, but there's no descriptor telling us how.
    #[error("point data is compressed but the laszip vlr is missing")]
    MissingLaszipVlr,

    /// The data are compressed but this crate was built without laz support.
    #[error("laszip support is not enabled, rebuild with the `laz` feature")]
    LaszipNotEnabled,

    /// Wrapper around `laz::LasZipError`.
    #[cfg(feature = "laz")]
    #[error(transparent)]
    Laz(#[from] laz::LasZipError),

    /// Keep and drop masks were both given for the same field.
    #[error("cannot combine keep and drop masks for {0}")]
    ConflictingMasks(&'static str),

    /// The filter option is not known.
    #[error("unknown filter option: {0}")]
    UnknownFilterOption(String),

    /// The filter option needs more arguments than were given.
    #[error("-{option} expects {expected} argument(s)")]
    MissingArgument {
        /// The option name, without the leading dash.
        option: String,
        /// How many arguments the option takes.
        expected: usize,
    },

    /// A filter argument could not be parsed or is out of range.
    #[error("invalid argument {value:?} for -{option}")]
    InvalidArgument {
        /// The option name, without the leading dash.
        option: String,
        /// The offending argument.
        value: String,
    },

    /// A boolean combinator was given fewer than two preceding criteria.
    #[error("-{0} needs two preceding criteria")]
    MissingOperand(&'static str),

    /// The record ends before the data its header declares.
    #[error("vlr declares {expected} bytes of data, found {found}")]
    TruncatedVlr {
        /// The declared record length.
        expected: u64,
        /// The bytes that were there.
        found: u64,
    },

    /// The vlr data is too long for its record length field.
    #[error("the vlr is too long: {0} bytes")]
    VlrTooLong(usize),

    /// This string is not ASCII, and it was supposed to be.
    #[error("this string is not ascii: {0}")]
    NotAscii(String),

    /// This string does not fit in its fixed-size field.
    #[error("string {string:?} does not fit in {len} bytes")]
    StringTooLong {
        /// The string.
        string: String,
        /// The field length.
        len: usize,
    },

    /// The value can't be represented as an i32 by this transform.
    #[error("{n} cannot be stored as an i32 with {transform}")]
    InverseTransform {
        /// The float value.
        n: f64,
        /// The transform that failed.
        transform: Transform,
    },

    /// The point format is not defined by any las version.
    #[error("invalid point format: {0}")]
    InvalidPointFormat(u8),

    /// The point data record length is less than the point format demands.
    #[error("{format} requires at least {} bytes per point, found {length}", format.len())]
    InvalidPointDataRecordLength {
        /// The point format.
        format: Format,
        /// The declared record length.
        length: u16,
    },

    /// A point could not be decoded.
    #[error("failed to read point {index} of {total}: {source}")]
    Point {
        /// The zero-based index of the point.
        index: u64,
        /// The number of points the header declares.
        total: u64,
        /// The underlying error.
        #[source]
        source: Box<Error>,
    },

    /// The point block can't be addressed with 64-bit offsets.
    #[error("{npoints} points of {record_length} bytes do not fit in a file")]
    PointCountTooLarge {
        /// The number of points.
        npoints: u64,
        /// The point record length.
        record_length: u16,
    },

    /// The point block didn't end where the header says it should.
    #[error("point data should end at byte {expected}, but ends at {found}")]
    PointDataEnd {
        /// The expected end.
        expected: u64,
        /// Where decoding stopped.
        found: u64,
    },

    /// Direct seeking is only defined for unconstrained, unindexed readers.
    #[error("cannot seek while a spatial constraint or spatial index is active")]
    SeekUnsupported,

    /// The seek target is past the end of the point block.
    #[error("cannot seek to point {index}, there are only {npoints} points")]
    SeekOutOfRange {
        /// The requested point index.
        index: u64,
        /// The number of points.
        npoints: u64,
    },

    /// The reader has been closed.
    #[error("the reader is closed")]
    Closed,
}
