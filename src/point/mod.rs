//! Points, as they come out of the stream.
//!
//! A [Point] keeps its coordinates quantized, exactly as stored, together with the
//! [Transform]s that map them to real coordinates. Filters and spatial tests read the real
//! coordinates through [Point::x], [Point::y] and [Point::z].

mod format;

pub use format::Format;

use crate::{Color, Result, Transform, Vector};

const SCAN_ANGLE_SCALE_FACTOR: f32 = 0.006;

/// The direction the scanner mirror was traveling when the point was measured.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ScanDirection {
    /// Negative scan direction.
    #[default]
    RightToLeft,
    /// Positive scan direction.
    LeftToRight,
}

/// The scan angle, as stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanAngle {
    /// Whole degrees, point formats zero through five.
    Rank(i8),
    /// Increments of 0.006 degrees, point formats six through ten.
    Scaled(i16),
}

/// Wave packet information attached to a point.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[allow(missing_docs)]
pub struct Waveform {
    /// Index of the wave packet descriptor, zero meaning no waveform.
    pub wave_packet_descriptor_index: u8,
    pub byte_offset_to_waveform_data: u64,
    pub waveform_packet_size_in_bytes: u32,
    pub return_point_waveform_location: f32,
    pub x_t: f32,
    pub y_t: f32,
    pub z_t: f32,
}

/// A las point.
#[derive(Clone, Debug, PartialEq)]
pub struct Point {
    /// The quantized coordinates.
    pub raw: Vector<i32>,
    /// The transforms from quantized to real coordinates.
    pub transforms: Vector<Transform>,
    /// The pulse return magnitude.
    pub intensity: u16,
    /// The return number of this point within its pulse, starting at one.
    pub return_number: u8,
    /// The number of returns of this point's pulse.
    pub number_of_returns: u8,
    /// The direction of the scanner mirror.
    pub scan_direction: ScanDirection,
    /// Is this the last point of a scan line?
    pub is_edge_of_flight_line: bool,
    /// The classification.
    ///
    /// Point formats zero through five only store five bits.
    pub classification: u8,
    /// Was this point created by something other than lidar collection?
    pub is_synthetic: bool,
    /// Is this a model key point?
    pub is_key_point: bool,
    /// Should this point be skipped in processing?
    pub is_withheld: bool,
    /// Is this point within the overlap of two or more swaths?
    pub is_overlap: bool,
    /// The channel of a multi-channel scanner.
    pub scanner_channel: u8,
    /// The scan angle.
    pub scan_angle: ScanAngle,
    /// Free for users.
    pub user_data: u8,
    /// The file from which this point originated.
    pub point_source_id: u16,
    /// The gps time.
    pub gps_time: Option<f64>,
    /// The color.
    pub color: Option<Color>,
    /// The near infrared channel.
    pub nir: Option<u16>,
    /// Wave packet information.
    pub waveform: Option<Waveform>,
    /// Bytes past the standard record.
    pub extra_bytes: Vec<u8>,
}

impl Point {
    /// Returns the real x coordinate.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasstream::{Point, Transform, Vector};
    /// let mut point = Point::default();
    /// point.transforms.x = Transform { scale: 0.01, offset: 100. };
    /// point.raw.x = 150;
    /// assert_eq!(101.5, point.x());
    /// ```
    pub fn x(&self) -> f64 {
        self.transforms.x.direct(self.raw.x)
    }

    /// Returns the real y coordinate.
    pub fn y(&self) -> f64 {
        self.transforms.y.direct(self.raw.y)
    }

    /// Returns the real z coordinate.
    pub fn z(&self) -> f64 {
        self.transforms.z.direct(self.raw.z)
    }

    /// Quantizes and stores a real x coordinate.
    pub fn set_x(&mut self, x: f64) -> Result<()> {
        self.raw.x = self.transforms.x.inverse(x)?;
        Ok(())
    }

    /// Quantizes and stores a real y coordinate.
    pub fn set_y(&mut self, y: f64) -> Result<()> {
        self.raw.y = self.transforms.y.inverse(y)?;
        Ok(())
    }

    /// Quantizes and stores a real z coordinate.
    pub fn set_z(&mut self, z: f64) -> Result<()> {
        self.raw.z = self.transforms.z.inverse(z)?;
        Ok(())
    }

    /// Returns the scan angle in degrees.
    pub fn scan_angle_degrees(&self) -> f32 {
        match self.scan_angle {
            ScanAngle::Rank(rank) => f32::from(rank),
            ScanAngle::Scaled(scaled) => f32::from(scaled) * SCAN_ANGLE_SCALE_FACTOR,
        }
    }

    /// Returns the gps time, or zero if the format doesn't have one.
    pub fn gps_time_or_zero(&self) -> f64 {
        self.gps_time.unwrap_or(0.)
    }

    /// Returns the wave packet descriptor index, or zero if there's no waveform.
    pub fn wave_packet_descriptor_index(&self) -> u8 {
        self.waveform
            .map(|w| w.wave_packet_descriptor_index)
            .unwrap_or(0)
    }

    /// Is this point inside the tile? Upper bounds are exclusive.
    pub fn inside_tile(&self, ll_x: f64, ll_y: f64, ur_x: f64, ur_y: f64) -> bool {
        let (x, y) = (self.x(), self.y());
        x >= ll_x && x < ur_x && y >= ll_y && y < ur_y
    }

    /// Is this point strictly inside the circle with the given squared radius?
    pub fn inside_circle(&self, center_x: f64, center_y: f64, radius_squared: f64) -> bool {
        let dx = center_x - self.x();
        let dy = center_y - self.y();
        dx * dx + dy * dy < radius_squared
    }

    /// Is this point inside the rectangle? Upper bounds are exclusive.
    pub fn inside_rectangle(&self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> bool {
        let (x, y) = (self.x(), self.y());
        x >= min_x && x < max_x && y >= min_y && y < max_y
    }

    /// Is this point inside the box? Upper bounds are exclusive.
    pub fn inside_box(&self, min: Vector<f64>, max: Vector<f64>) -> bool {
        let z = self.z();
        self.inside_rectangle(min.x, min.y, max.x, max.y) && z >= min.z && z < max.z
    }
}

impl Default for Point {
    fn default() -> Point {
        let transform = Transform {
            scale: 0.01,
            offset: 0.,
        };
        Point {
            raw: Vector::default(),
            transforms: Vector::new(transform, transform, transform),
            intensity: 0,
            return_number: 1,
            number_of_returns: 1,
            scan_direction: ScanDirection::default(),
            is_edge_of_flight_line: false,
            classification: 0,
            is_synthetic: false,
            is_key_point: false,
            is_withheld: false,
            is_overlap: false,
            scanner_channel: 0,
            scan_angle: ScanAngle::Rank(0),
            user_data: 0,
            point_source_id: 0,
            gps_time: None,
            color: None,
            nir: None,
            waveform: None,
            extra_bytes: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point_at(x: i32, y: i32) -> Point {
        Point {
            raw: Vector::new(x, y, 0),
            ..Default::default()
        }
    }

    #[test]
    fn real_coordinates() {
        let point = Point {
            raw: Vector::new(100, 200, -50),
            ..Default::default()
        };
        assert_eq!(1., point.x());
        assert_eq!(2., point.y());
        assert_eq!(-0.5, point.z());
    }

    #[test]
    fn set_coordinates() {
        let mut point = Point::default();
        point.set_x(1.234).unwrap();
        assert_eq!(123, point.raw.x);
        assert!(point.set_z(1e12).is_err());
    }

    #[test]
    fn tile_upper_bound_is_exclusive() {
        assert!(point_at(0, 0).inside_tile(0., 0., 1., 1.));
        assert!(!point_at(100, 50).inside_tile(0., 0., 1., 1.));
        assert!(!point_at(50, 100).inside_tile(0., 0., 1., 1.));
    }

    #[test]
    fn circle_is_strict() {
        assert!(point_at(0, 0).inside_circle(0., 0., 1.));
        assert!(!point_at(100, 0).inside_circle(0., 0., 1.));
    }

    #[test]
    fn scan_angle() {
        let mut point = Point::default();
        point.scan_angle = ScanAngle::Scaled(1000);
        assert!((point.scan_angle_degrees() - 6.).abs() < 1e-4);
        point.scan_angle = ScanAngle::Rank(-12);
        assert_eq!(-12., point.scan_angle_degrees());
    }
}
