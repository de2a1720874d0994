//! Which point fields a consumer needs decoded.
//!
//! Criteria, transforms and the reader each report the fields they look at. A selective
//! decompressor may skip decoding the rest. The bit values match laszip's layered point
//! formats, where x, y, returns and channel are always decoded.
//!
//! ```
//! use lasstream::selective;
//! let needed = selective::Z | selective::GPS_TIME;
//! assert_ne!(0, needed & selective::Z);
//! ```

/// The layer that is always decoded: x, y, return numbers and scanner channel.
pub const CHANNEL_RETURNS_XY: u32 = 0;
/// Z.
pub const Z: u32 = 1 << 0;
/// Classification.
pub const CLASSIFICATION: u32 = 1 << 1;
/// Classification flags, scan direction and edge of flight line.
pub const FLAGS: u32 = 1 << 2;
/// Intensity.
pub const INTENSITY: u32 = 1 << 3;
/// Scan angle.
pub const SCAN_ANGLE: u32 = 1 << 4;
/// User data.
pub const USER_DATA: u32 = 1 << 5;
/// Point source id.
pub const POINT_SOURCE: u32 = 1 << 6;
/// Gps time.
pub const GPS_TIME: u32 = 1 << 7;
/// Red, green and blue.
pub const RGB: u32 = 1 << 8;
/// Near infrared.
pub const NIR: u32 = 1 << 9;
/// Wave packet information.
pub const WAVEPACKET: u32 = 1 << 10;
/// Every extra byte.
pub const EXTRA_BYTES: u32 = 1 << 11;
/// Everything.
pub const ALL: u32 = u32::MAX;
