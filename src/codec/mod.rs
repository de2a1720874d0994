//! Point codecs turn the bytes of the point block into [Point]s.
//!
//! The [Reader](crate::Reader) never looks at point bytes itself. It asks a [PointCodec] for
//! one point at a time, and for a seek when a spatial index says to skip ahead.

mod las;
#[cfg(feature = "laz")]
mod laz;

pub use self::las::LasCodec;
#[cfg(feature = "laz")]
pub use self::laz::LazCodec;

use crate::{Point, Result};

/// Decodes point records.
pub trait PointCodec {
    /// Decodes the next point into `point`, transforms included.
    fn read(&mut self, point: &mut Point) -> Result<()>;

    /// Moves from point `current` to point `target`.
    fn seek(&mut self, current: u64, target: u64) -> Result<()>;

    /// Checks that the point block ended where the codec expected it to.
    ///
    /// Called once, after the last declared point is read.
    fn check_end(&mut self) -> Result<()> {
        Ok(())
    }

    /// Returns a message about a problem that didn't stop decoding.
    fn warning(&self) -> Option<&str> {
        None
    }
}

impl<C: PointCodec + ?Sized> PointCodec for Box<C> {
    fn read(&mut self, point: &mut Point) -> Result<()> {
        (**self).read(point)
    }

    fn seek(&mut self, current: u64, target: u64) -> Result<()> {
        (**self).seek(current, target)
    }

    fn check_end(&mut self) -> Result<()> {
        (**self).check_end()
    }

    fn warning(&self) -> Option<&str> {
        (**self).warning()
    }
}
