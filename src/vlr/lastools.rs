//! The LAStools tiling and original-counts records.

use crate::{Bounds, Result, Vector};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

/// The record id of the tiling record.
pub const LASTILING_RECORD_ID: u16 = 10;

/// The size of the tiling record payload.
pub const LASTILING_SIZE: usize = 28;

/// The record id of the original-counts record.
pub const LASORIGINAL_RECORD_ID: u16 = 20;

/// The size of the original-counts record payload.
pub const LASORIGINAL_SIZE: usize = 176;

/// Where this file sits in a quadtree tiling.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[allow(missing_docs)]
pub struct LasTiling {
    pub level: u32,
    pub level_index: u32,
    /// The low bits hold the implicit levels, the top bits say whether this tile is buffered
    /// or was reversibly buffered.
    pub implicit_levels: u32,
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl LasTiling {
    /// Reads a tiling record.
    pub fn read_from<R: Read>(mut read: R) -> Result<LasTiling> {
        Ok(LasTiling {
            level: read.read_u32::<LittleEndian>()?,
            level_index: read.read_u32::<LittleEndian>()?,
            implicit_levels: read.read_u32::<LittleEndian>()?,
            min_x: read.read_f32::<LittleEndian>()?,
            max_x: read.read_f32::<LittleEndian>()?,
            min_y: read.read_f32::<LittleEndian>()?,
            max_y: read.read_f32::<LittleEndian>()?,
        })
    }

    /// Writes a tiling record.
    pub fn write_to<W: Write>(&self, mut write: W) -> Result<()> {
        write.write_u32::<LittleEndian>(self.level)?;
        write.write_u32::<LittleEndian>(self.level_index)?;
        write.write_u32::<LittleEndian>(self.implicit_levels)?;
        write.write_f32::<LittleEndian>(self.min_x)?;
        write.write_f32::<LittleEndian>(self.max_x)?;
        write.write_f32::<LittleEndian>(self.min_y)?;
        write.write_f32::<LittleEndian>(self.max_y)?;
        Ok(())
    }

    /// Is this tile buffered?
    pub fn is_buffered(&self) -> bool {
        self.implicit_levels & 0x8000_0000 != 0
    }
}

/// Point counts and bounds from before an operation that changed them, e.g. clipping.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LasOriginal {
    /// The original number of points.
    pub number_of_point_records: u64,
    /// The original number of points by return.
    pub number_of_points_by_return: [u64; 15],
    /// The original bounds.
    pub bounds: Bounds,
}

impl LasOriginal {
    /// Reads an original-counts record.
    pub fn read_from<R: Read>(mut read: R) -> Result<LasOriginal> {
        let number_of_point_records = read.read_u64::<LittleEndian>()?;
        let mut number_of_points_by_return = [0; 15];
        for n in &mut number_of_points_by_return {
            *n = read.read_u64::<LittleEndian>()?;
        }
        let min_x = read.read_f64::<LittleEndian>()?;
        let max_x = read.read_f64::<LittleEndian>()?;
        let min_y = read.read_f64::<LittleEndian>()?;
        let max_y = read.read_f64::<LittleEndian>()?;
        let min_z = read.read_f64::<LittleEndian>()?;
        let max_z = read.read_f64::<LittleEndian>()?;
        Ok(LasOriginal {
            number_of_point_records,
            number_of_points_by_return,
            bounds: Bounds {
                min: Vector::new(min_x, min_y, min_z),
                max: Vector::new(max_x, max_y, max_z),
            },
        })
    }

    /// Writes an original-counts record.
    pub fn write_to<W: Write>(&self, mut write: W) -> Result<()> {
        write.write_u64::<LittleEndian>(self.number_of_point_records)?;
        for n in &self.number_of_points_by_return {
            write.write_u64::<LittleEndian>(*n)?;
        }
        let Bounds { min, max } = self.bounds;
        for n in [min.x, max.x, min.y, max.y, min.z, max.z] {
            write.write_f64::<LittleEndian>(n)?;
        }
        Ok(())
    }
}
