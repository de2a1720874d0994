use crate::Vector;

/// Minimum and maximum bounds in three dimensions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    /// The minimum values.
    pub min: Vector<f64>,

    /// The maximum values.
    pub max: Vector<f64>,
}

impl Bounds {
    /// Grows the bounds to encompass this point in xyz space.
    ///
    /// # Examples
    ///
    /// ```
    /// # use lasstream::{Bounds, Vector};
    /// let mut bounds = Bounds::default();
    /// bounds.grow(1., 2., 3.);
    /// assert_eq!(1., bounds.min.x);
    /// ```
    pub fn grow(&mut self, x: f64, y: f64, z: f64) {
        if x < self.min.x {
            self.min.x = x;
        }
        if y < self.min.y {
            self.min.y = y;
        }
        if z < self.min.z {
            self.min.z = z;
        }
        if x > self.max.x {
            self.max.x = x;
        }
        if y > self.max.y {
            self.max.y = y;
        }
        if z > self.max.z {
            self.max.z = z;
        }
    }

    /// Returns true if any minimum is larger than its maximum.
    pub fn is_inverted(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Returns true if the xy footprint of these bounds cannot touch the rectangle.
    ///
    /// # Examples
    ///
    /// ```
    /// # use lasstream::{Bounds, Vector};
    /// let bounds = Bounds { min: Vector::new(0., 0., 0.), max: Vector::new(10., 10., 10.) };
    /// assert!(bounds.is_disjoint_xy(20., 20., 30., 30.));
    /// assert!(!bounds.is_disjoint_xy(5., 5., 30., 30.));
    /// ```
    pub fn is_disjoint_xy(&self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> bool {
        self.min.x > max_x || self.min.y > max_y || self.max.x < min_x || self.max.y < min_y
    }

    /// Clamps the xy footprint to the rectangle, leaving z alone.
    pub fn clamp_xy(&self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Bounds {
        Bounds {
            min: Vector::new(self.min.x.max(min_x), self.min.y.max(min_y), self.min.z),
            max: Vector::new(self.max.x.min(max_x), self.max.y.min(max_y), self.max.z),
        }
    }
}

impl Default for Bounds {
    fn default() -> Bounds {
        Bounds {
            min: Vector {
                x: f64::INFINITY,
                y: f64::INFINITY,
                z: f64::INFINITY,
            },
            max: Vector {
                x: f64::NEG_INFINITY,
                y: f64::NEG_INFINITY,
                z: f64::NEG_INFINITY,
            },
        }
    }
}
