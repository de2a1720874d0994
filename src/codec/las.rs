use super::PointCodec;
use crate::{Error, Header, Point, Result, Transform, Vector, point::Format, raw};
use std::io::{Read, Seek, SeekFrom};

/// Decodes uncompressed point records.
///
/// # Examples
///
/// ```
/// use std::io::Cursor;
/// use lasstream::{Header, Point, codec::{LasCodec, PointCodec}};
/// let header = Header::default();
/// let mut codec = LasCodec::new(Cursor::new(vec![0u8; 20]), &header).unwrap();
/// let mut point = Point::default();
/// codec.read(&mut point).unwrap();
/// assert!(codec.read(&mut point).is_err());
/// ```
#[derive(Debug)]
pub struct LasCodec<R: Read + Seek> {
    read: R,
    format: Format,
    transforms: Vector<Transform>,
    start: u64,
    end: u64,
}

impl<R: Read + Seek> LasCodec<R> {
    /// Creates a codec that starts decoding at the current position of `read`.
    pub fn new(read: R, header: &Header) -> Result<LasCodec<R>> {
        LasCodec::with_number_of_points(read, header, header.number_of_points())
    }

    /// Creates a codec for a point block of `npoints` records, whatever the header says.
    ///
    /// Fails if the block would end past the largest 64-bit offset.
    pub fn with_number_of_points(
        mut read: R,
        header: &Header,
        npoints: u64,
    ) -> Result<LasCodec<R>> {
        let start = read.stream_position()?;
        let format = header.point_format();
        let end = offset(start, npoints, format)?;
        Ok(LasCodec {
            read,
            format,
            transforms: header.transforms(),
            start,
            end,
        })
    }

    /// Returns the underlying reader.
    pub fn into_inner(self) -> R {
        self.read
    }
}

impl<R: Read + Seek> PointCodec for LasCodec<R> {
    fn read(&mut self, point: &mut Point) -> Result<()> {
        raw::point::read_into(&mut self.read, self.format, point)?;
        point.transforms = self.transforms;
        Ok(())
    }

    fn seek(&mut self, _current: u64, target: u64) -> Result<()> {
        let _ = self
            .read
            .seek(SeekFrom::Start(offset(self.start, target, self.format)?))?;
        Ok(())
    }

    fn check_end(&mut self) -> Result<()> {
        let found = self.read.stream_position()?;
        if found == self.end {
            Ok(())
        } else {
            Err(Error::PointDataEnd {
                expected: self.end,
                found,
            })
        }
    }
}

fn offset(start: u64, index: u64, format: Format) -> Result<u64> {
    index
        .checked_mul(u64::from(format.len()))
        .and_then(|n| n.checked_add(start))
        .ok_or(Error::PointCountTooLarge {
            npoints: index,
            record_length: format.len(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn codec(n: u64, bytes: Vec<u8>) -> LasCodec<Cursor<Vec<u8>>> {
        let mut header = Header::default();
        header.set_number_of_points(n);
        LasCodec::new(Cursor::new(bytes), &header).unwrap()
    }

    fn points(raw_x: &[i32]) -> Vec<u8> {
        let format = Format::new(0).unwrap();
        let mut bytes = Vec::new();
        for &x in raw_x {
            let point = Point {
                raw: Vector::new(x, 0, 0),
                ..Default::default()
            };
            raw::point::write_to(&mut bytes, format, &point).unwrap();
        }
        bytes
    }

    #[test]
    fn read_sets_transforms() {
        let mut codec = codec(1, points(&[150]));
        let mut point = Point::default();
        point.transforms.x.scale = 1.;
        codec.read(&mut point).unwrap();
        assert_eq!(1.5, point.x());
        codec.check_end().unwrap();
    }

    #[test]
    fn seek() {
        let mut codec = codec(3, points(&[1, 2, 3]));
        let mut point = Point::default();
        codec.seek(0, 2).unwrap();
        codec.read(&mut point).unwrap();
        assert_eq!(3, point.raw.x);
    }

    #[test]
    fn point_block_past_u64() {
        let header = Header::default();
        assert!(matches!(
            LasCodec::with_number_of_points(Cursor::new(Vec::new()), &header, u64::MAX),
            Err(Error::PointCountTooLarge {
                npoints: u64::MAX,
                record_length: 20
            })
        ));
        let mut codec = codec(1, points(&[1]));
        assert!(matches!(
            codec.seek(0, u64::MAX / 4),
            Err(Error::PointCountTooLarge { .. })
        ));
    }

    #[test]
    fn early_end() {
        let mut codec = codec(2, points(&[1, 2]));
        let mut point = Point::default();
        codec.read(&mut point).unwrap();
        assert!(matches!(
            codec.check_end(),
            Err(Error::PointDataEnd {
                expected: 40,
                found: 20
            })
        ));
    }
}
