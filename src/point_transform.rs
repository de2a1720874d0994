//! Changes applied to points after they pass the filter.

use crate::{Point, Result, Vector, selective};

/// Modifies points on their way out of a [Reader](crate::Reader).
///
/// Closures work too:
///
/// ```
/// use lasstream::{Point, PointTransform};
/// let mut transform = |point: &mut Point| point.classification = 2;
/// let mut point = Point::default();
/// transform.transform(&mut point).unwrap();
/// assert_eq!(2, point.classification);
/// ```
pub trait PointTransform {
    /// Transforms the point in place.
    fn transform(&mut self, point: &mut Point) -> Result<()>;

    /// Clears any per-stream state.
    fn reset(&mut self) {}

    /// Returns the [selective] bits of the fields this transform reads or writes.
    fn decompress_selective(&self) -> u32 {
        selective::ALL
    }
}

impl<F: FnMut(&mut Point)> PointTransform for F {
    fn transform(&mut self, point: &mut Point) -> Result<()> {
        self(point);
        Ok(())
    }
}

/// Shifts real coordinates, re-quantizing them with the point's transforms.
///
/// # Examples
///
/// ```
/// use lasstream::{Point, PointTransform, Translate, Vector};
/// let mut translate = Translate::new(Vector::new(1., 0., -0.5));
/// let mut point = Point::default();
/// translate.transform(&mut point).unwrap();
/// assert_eq!((1., 0., -0.5), (point.x(), point.y(), point.z()));
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Translate {
    offset: Vector<f64>,
}

impl Translate {
    /// Creates a translation by `offset`.
    pub fn new(offset: Vector<f64>) -> Translate {
        Translate { offset }
    }
}

impl PointTransform for Translate {
    fn transform(&mut self, point: &mut Point) -> Result<()> {
        point.set_x(point.x() + self.offset.x)?;
        point.set_y(point.y() + self.offset.y)?;
        point.set_z(point.z() + self.offset.z)?;
        Ok(())
    }

    fn decompress_selective(&self) -> u32 {
        selective::CHANNEL_RETURNS_XY | selective::Z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translate_out_of_range() {
        let mut translate = Translate::new(Vector::new(1e12, 0., 0.));
        assert!(translate.transform(&mut Point::default()).is_err());
    }

    #[test]
    fn closures_need_everything() {
        let transform = |_: &mut Point| {};
        assert_eq!(selective::ALL, transform.decompress_selective());
    }
}
