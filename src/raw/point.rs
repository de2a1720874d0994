//! Raw point records, decoded straight into a [Point].

use crate::{
    Color, Point, Result,
    point::{Format, ScanAngle, ScanDirection, Waveform},
};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

/// Reads one point record into `point`, overwriting every attribute the format stores.
///
/// The transforms on `point` are left alone.
///
/// # Examples
///
/// ```
/// use std::io::Cursor;
/// use lasstream::{Point, point::Format, raw};
/// let format = Format::new(0).unwrap();
/// let mut cursor = Cursor::new(Vec::new());
/// raw::point::write_to(&mut cursor, format, &Point::default()).unwrap();
/// cursor.set_position(0);
/// let mut point = Point::default();
/// raw::point::read_into(&mut cursor, format, &mut point).unwrap();
/// ```
pub fn read_into<R: Read>(mut read: R, format: Format, point: &mut Point) -> Result<()> {
    point.raw.x = read.read_i32::<LittleEndian>()?;
    point.raw.y = read.read_i32::<LittleEndian>()?;
    point.raw.z = read.read_i32::<LittleEndian>()?;
    point.intensity = read.read_u16::<LittleEndian>()?;
    if format.is_extended() {
        let returns = read.read_u8()?;
        point.return_number = returns & 0b0000_1111;
        point.number_of_returns = returns >> 4;
        let flags = read.read_u8()?;
        point.is_synthetic = flags & 0b0000_0001 != 0;
        point.is_key_point = flags & 0b0000_0010 != 0;
        point.is_withheld = flags & 0b0000_0100 != 0;
        point.is_overlap = flags & 0b0000_1000 != 0;
        point.scanner_channel = (flags >> 4) & 0b11;
        point.scan_direction = scan_direction(flags & 0b0100_0000 != 0);
        point.is_edge_of_flight_line = flags & 0b1000_0000 != 0;
        point.classification = read.read_u8()?;
        point.user_data = read.read_u8()?;
        point.scan_angle = ScanAngle::Scaled(read.read_i16::<LittleEndian>()?);
        point.point_source_id = read.read_u16::<LittleEndian>()?;
    } else {
        let returns = read.read_u8()?;
        point.return_number = returns & 0b0000_0111;
        point.number_of_returns = (returns >> 3) & 0b0000_0111;
        point.scan_direction = scan_direction(returns & 0b0100_0000 != 0);
        point.is_edge_of_flight_line = returns & 0b1000_0000 != 0;
        let classification = read.read_u8()?;
        point.classification = classification & 0b0001_1111;
        point.is_synthetic = classification & 0b0010_0000 != 0;
        point.is_key_point = classification & 0b0100_0000 != 0;
        point.is_withheld = classification & 0b1000_0000 != 0;
        point.is_overlap = false;
        point.scanner_channel = 0;
        point.scan_angle = ScanAngle::Rank(read.read_i8()?);
        point.user_data = read.read_u8()?;
        point.point_source_id = read.read_u16::<LittleEndian>()?;
    }
    point.gps_time = if format.has_gps_time() {
        Some(read.read_f64::<LittleEndian>()?)
    } else {
        None
    };
    point.color = if format.has_color() {
        let red = read.read_u16::<LittleEndian>()?;
        let green = read.read_u16::<LittleEndian>()?;
        let blue = read.read_u16::<LittleEndian>()?;
        Some(Color::new(red, green, blue))
    } else {
        None
    };
    point.nir = if format.has_nir() {
        Some(read.read_u16::<LittleEndian>()?)
    } else {
        None
    };
    point.waveform = if format.has_waveform() {
        Some(Waveform {
            wave_packet_descriptor_index: read.read_u8()?,
            byte_offset_to_waveform_data: read.read_u64::<LittleEndian>()?,
            waveform_packet_size_in_bytes: read.read_u32::<LittleEndian>()?,
            return_point_waveform_location: read.read_f32::<LittleEndian>()?,
            x_t: read.read_f32::<LittleEndian>()?,
            y_t: read.read_f32::<LittleEndian>()?,
            z_t: read.read_f32::<LittleEndian>()?,
        })
    } else {
        None
    };
    point.extra_bytes.resize(usize::from(format.extra_bytes), 0);
    read.read_exact(&mut point.extra_bytes)?;
    Ok(())
}

/// Writes one point record.
///
/// Attributes the format doesn't store are dropped, missing ones are written as zeros.
pub fn write_to<W: Write>(mut write: W, format: Format, point: &Point) -> Result<()> {
    write.write_i32::<LittleEndian>(point.raw.x)?;
    write.write_i32::<LittleEndian>(point.raw.y)?;
    write.write_i32::<LittleEndian>(point.raw.z)?;
    write.write_u16::<LittleEndian>(point.intensity)?;
    let scan_direction = u8::from(point.scan_direction == ScanDirection::LeftToRight);
    let edge = u8::from(point.is_edge_of_flight_line);
    if format.is_extended() {
        write.write_u8((point.return_number & 0b1111) | (point.number_of_returns << 4))?;
        write.write_u8(
            u8::from(point.is_synthetic)
                | u8::from(point.is_key_point) << 1
                | u8::from(point.is_withheld) << 2
                | u8::from(point.is_overlap) << 3
                | (point.scanner_channel & 0b11) << 4
                | scan_direction << 6
                | edge << 7,
        )?;
        write.write_u8(point.classification)?;
        write.write_u8(point.user_data)?;
        let scan_angle = match point.scan_angle {
            ScanAngle::Scaled(n) => n,
            ScanAngle::Rank(n) => (f32::from(n) / 0.006).round() as i16,
        };
        write.write_i16::<LittleEndian>(scan_angle)?;
        write.write_u16::<LittleEndian>(point.point_source_id)?;
    } else {
        write.write_u8(
            (point.return_number & 0b111)
                | (point.number_of_returns & 0b111) << 3
                | scan_direction << 6
                | edge << 7,
        )?;
        write.write_u8(
            (point.classification & 0b1_1111)
                | u8::from(point.is_synthetic) << 5
                | u8::from(point.is_key_point) << 6
                | u8::from(point.is_withheld) << 7,
        )?;
        let scan_angle = match point.scan_angle {
            ScanAngle::Rank(n) => n,
            ScanAngle::Scaled(n) => (f32::from(n) * 0.006).round() as i8,
        };
        write.write_i8(scan_angle)?;
        write.write_u8(point.user_data)?;
        write.write_u16::<LittleEndian>(point.point_source_id)?;
    }
    if format.has_gps_time() {
        write.write_f64::<LittleEndian>(point.gps_time.unwrap_or(0.))?;
    }
    if format.has_color() {
        let color = point.color.unwrap_or_default();
        write.write_u16::<LittleEndian>(color.red)?;
        write.write_u16::<LittleEndian>(color.green)?;
        write.write_u16::<LittleEndian>(color.blue)?;
    }
    if format.has_nir() {
        write.write_u16::<LittleEndian>(point.nir.unwrap_or(0))?;
    }
    if format.has_waveform() {
        let waveform = point.waveform.unwrap_or_default();
        write.write_u8(waveform.wave_packet_descriptor_index)?;
        write.write_u64::<LittleEndian>(waveform.byte_offset_to_waveform_data)?;
        write.write_u32::<LittleEndian>(waveform.waveform_packet_size_in_bytes)?;
        write.write_f32::<LittleEndian>(waveform.return_point_waveform_location)?;
        write.write_f32::<LittleEndian>(waveform.x_t)?;
        write.write_f32::<LittleEndian>(waveform.y_t)?;
        write.write_f32::<LittleEndian>(waveform.z_t)?;
    }
    let n = usize::from(format.extra_bytes);
    let mut extra_bytes = point.extra_bytes.clone();
    extra_bytes.resize(n, 0);
    write.write_all(&extra_bytes)?;
    Ok(())
}

fn scan_direction(positive: bool) -> ScanDirection {
    if positive {
        ScanDirection::LeftToRight
    } else {
        ScanDirection::RightToLeft
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vector;
    use std::io::Cursor;

    fn roundtrip(format: Format, point: &Point) -> Point {
        let mut cursor = Cursor::new(Vec::new());
        write_to(&mut cursor, format, point).unwrap();
        assert_eq!(usize::from(format.len()), cursor.get_ref().len());
        cursor.set_position(0);
        let mut read = Point::default();
        read_into(cursor, format, &mut read).unwrap();
        read
    }

    #[test]
    fn legacy_flags() {
        let point = Point {
            raw: Vector::new(1, -2, 3),
            return_number: 2,
            number_of_returns: 3,
            scan_direction: ScanDirection::LeftToRight,
            is_edge_of_flight_line: true,
            classification: 9,
            is_withheld: true,
            scan_angle: ScanAngle::Rank(-7),
            ..Default::default()
        };
        assert_eq!(point, roundtrip(Format::new(0).unwrap(), &point));
    }

    #[test]
    fn extended_flags() {
        let point = Point {
            return_number: 11,
            number_of_returns: 15,
            classification: 200,
            is_overlap: true,
            scanner_channel: 3,
            scan_angle: ScanAngle::Scaled(-1200),
            gps_time: Some(42.5),
            color: Some(Color::new(1, 2, 3)),
            nir: Some(4),
            waveform: Some(Waveform {
                wave_packet_descriptor_index: 1,
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(point, roundtrip(Format::new(10).unwrap(), &point));
    }

    #[test]
    fn extra_bytes() {
        let format = Format::new(1).unwrap().with_record_length(31).unwrap();
        let point = Point {
            gps_time: Some(1.),
            extra_bytes: vec![1, 2, 3],
            ..Default::default()
        };
        assert_eq!(point, roundtrip(format, &point));
    }

    #[test]
    fn truncated() {
        let mut point = Point::default();
        let result = read_into(Cursor::new(vec![0; 10]), Format::new(0).unwrap(), &mut point);
        assert!(result.is_err());
    }
}
