//! Spatial constraints and the index contract used to skip ahead to candidate points.

mod index;

pub use self::index::GridIndex;

use crate::{Bounds, Point, Vector};

/// A region of the xy plane that points must fall inside.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SpatialConstraint {
    /// A square tile, upper bounds exclusive.
    Tile {
        /// Lower left x.
        ll_x: f64,
        /// Lower left y.
        ll_y: f64,
        /// Edge length.
        size: f64,
    },
    /// A circle, boundary excluded.
    Circle {
        /// Center x.
        center_x: f64,
        /// Center y.
        center_y: f64,
        /// Radius.
        radius: f64,
    },
    /// An axis-aligned rectangle, upper bounds exclusive.
    Rectangle {
        /// Minimum x.
        min_x: f64,
        /// Minimum y.
        min_y: f64,
        /// Maximum x.
        max_x: f64,
        /// Maximum y.
        max_y: f64,
    },
}

impl SpatialConstraint {
    /// Is the point inside this region?
    ///
    /// # Examples
    ///
    /// ```
    /// use lasstream::{Point, spatial::SpatialConstraint};
    /// let tile = SpatialConstraint::Tile { ll_x: 0., ll_y: 0., size: 1. };
    /// assert!(tile.contains(&Point::default()));
    /// ```
    pub fn contains(&self, point: &Point) -> bool {
        match *self {
            SpatialConstraint::Tile { ll_x, ll_y, size } => {
                point.inside_tile(ll_x, ll_y, ll_x + size, ll_y + size)
            }
            SpatialConstraint::Circle {
                center_x,
                center_y,
                radius,
            } => point.inside_circle(center_x, center_y, radius * radius),
            SpatialConstraint::Rectangle {
                min_x,
                min_y,
                max_x,
                max_y,
            } => point.inside_rectangle(min_x, min_y, max_x, max_y),
        }
    }

    /// Returns the xy extent as `(min_x, min_y, max_x, max_y)`.
    pub fn extent(&self) -> (f64, f64, f64, f64) {
        match *self {
            SpatialConstraint::Tile { ll_x, ll_y, size } => (ll_x, ll_y, ll_x + size, ll_y + size),
            SpatialConstraint::Circle {
                center_x,
                center_y,
                radius,
            } => (
                center_x - radius,
                center_y - radius,
                center_x + radius,
                center_y + radius,
            ),
            SpatialConstraint::Rectangle {
                min_x,
                min_y,
                max_x,
                max_y,
            } => (min_x, min_y, max_x, max_y),
        }
    }

    /// Returns the bounds to report while this constraint is active.
    ///
    /// The xy extent is intersected with `bounds`. A tile's upper edge is pulled in by one
    /// scale unit, since points on it are excluded.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasstream::{Bounds, Vector, spatial::SpatialConstraint};
    /// let bounds = Bounds { min: Vector::new(0., 0., 0.), max: Vector::new(100., 100., 10.) };
    /// let tile = SpatialConstraint::Tile { ll_x: 10., ll_y: 10., size: 10. };
    /// let clipped = tile.clip(bounds, Vector::new(0.01, 0.01, 0.01));
    /// assert_eq!(19.99, clipped.max.x);
    /// ```
    pub fn clip(&self, bounds: Bounds, scale: Vector<f64>) -> Bounds {
        let (min_x, min_y, mut max_x, mut max_y) = self.extent();
        if let SpatialConstraint::Tile { .. } = self {
            max_x -= scale.x;
            max_y -= scale.y;
        }
        bounds.clamp_xy(min_x, min_y, max_x, max_y)
    }

    /// Can any point inside `bounds` fall inside this region?
    pub fn intersects(&self, bounds: &Bounds) -> bool {
        let (min_x, min_y, max_x, max_y) = self.extent();
        !bounds.is_disjoint_xy(min_x, min_y, max_x, max_y)
    }
}

/// An index that knows which points might fall inside a region.
///
/// After one of the `intersect_*` calls, [SpatialIndex::seek_next] walks the candidate points
/// in increasing order.
pub trait SpatialIndex {
    /// Restricts the candidates to the rectangle. Returns false if there are none.
    fn intersect_rectangle(&mut self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> bool;

    /// Restricts the candidates to the tile. Returns false if there are none.
    fn intersect_tile(&mut self, ll_x: f64, ll_y: f64, size: f64) -> bool {
        self.intersect_rectangle(ll_x, ll_y, ll_x + size, ll_y + size)
    }

    /// Restricts the candidates to the circle. Returns false if there are none.
    fn intersect_circle(&mut self, center_x: f64, center_y: f64, radius: f64) -> bool {
        self.intersect_rectangle(
            center_x - radius,
            center_y - radius,
            center_x + radius,
            center_y + radius,
        )
    }

    /// Returns the index of the first candidate point at or after `current`, or `None` when
    /// the candidates are exhausted.
    fn seek_next(&mut self, current: u64) -> Option<u64>;
}

impl SpatialConstraint {
    pub(crate) fn intersect(&self, index: &mut dyn SpatialIndex) -> bool {
        match *self {
            SpatialConstraint::Tile { ll_x, ll_y, size } => index.intersect_tile(ll_x, ll_y, size),
            SpatialConstraint::Circle {
                center_x,
                center_y,
                radius,
            } => index.intersect_circle(center_x, center_y, radius),
            SpatialConstraint::Rectangle {
                min_x,
                min_y,
                max_x,
                max_y,
            } => index.intersect_rectangle(min_x, min_y, max_x, max_y),
        }
    }
}
