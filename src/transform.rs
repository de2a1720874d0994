use crate::{Error, Result};
use std::fmt;

/// A scale and an offset that transforms xyz coordinates.
///
/// Integer point coordinates relate to real coordinates by `real = offset + scale * integer`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// The scale.
    pub scale: f64,
    /// The offset.
    pub offset: f64,
}

/// How to round when going from a float to an integer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundingMode {
    /// Round half away from zero.
    Round,
    /// Round towards negative infinity.
    Floor,
    /// Round towards positive infinity.
    Ceil,
}

impl Transform {
    /// Applies this transform to an i32, returning a float.
    ///
    /// # Examples
    ///
    /// ```
    /// # use lasstream::Transform;
    /// let transform = Transform { scale: 2., offset: 1. };
    /// assert_eq!(3., transform.direct(1));
    /// ```
    pub fn direct(&self, n: i32) -> f64 {
        self.scale * f64::from(n) + self.offset
    }

    /// Applies the inverse transform, and rounds the result.
    ///
    /// Returns an error if the resultant value can't be represented as an i32.
    ///
    /// # Examples
    ///
    /// ```
    /// # use lasstream::Transform;
    /// let transform = Transform { scale: 2., offset: 1. };
    /// assert_eq!(1, transform.inverse(2.9).unwrap());
    /// ```
    pub fn inverse(&self, n: f64) -> Result<i32> {
        self.inverse_with_rounding_mode(n, RoundingMode::Round)
    }

    /// Applies the inverse transform, rounding with the given mode.
    pub fn inverse_with_rounding_mode(&self, n: f64, rounding: RoundingMode) -> Result<i32> {
        let q = (n - self.offset) / self.scale;
        let q = match rounding {
            RoundingMode::Round => q.round(),
            RoundingMode::Floor => q.floor(),
            RoundingMode::Ceil => q.ceil(),
        };
        if q.is_nan() || q > f64::from(i32::MAX) || q < f64::from(i32::MIN) {
            Err(Error::InverseTransform {
                n,
                transform: *self,
            })
        } else {
            Ok(q as i32)
        }
    }

    /// Snaps a real value onto the grid this transform can represent.
    ///
    /// Values that overflow the integer range are returned unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// # use lasstream::Transform;
    /// let transform = Transform { scale: 0.01, offset: 0. };
    /// assert!((transform.quantize(1.234) - 1.23).abs() < 1e-9);
    /// ```
    pub fn quantize(&self, n: f64) -> f64 {
        self.inverse(n).map(|i| self.direct(i)).unwrap_or(n)
    }
}

impl Default for Transform {
    fn default() -> Transform {
        Transform {
            scale: 0.001,
            offset: 0.,
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{} * x + {}`", self.scale, self.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn too_large() {
        let transform = Transform::default();
        let n = i32::MAX as f64 * transform.scale + 1.;
        assert!(transform.inverse(n).is_err());
    }

    #[test]
    fn too_small() {
        let transform = Transform::default();
        let n = i32::MIN as f64 * transform.scale - 1.;
        assert!(transform.inverse(n).is_err());
    }

    #[test]
    fn rounds_half_away_from_zero() {
        let transform = Transform {
            scale: 1.,
            offset: 0.,
        };
        assert_eq!(3, transform.inverse(2.5).unwrap());
        assert_eq!(-3, transform.inverse(-2.5).unwrap());
        assert_eq!(
            2,
            transform
                .inverse_with_rounding_mode(2.5, RoundingMode::Floor)
                .unwrap()
        );
    }
}
