use lasstream::{
    Bounds, Error, Header, Point, PointTransform, Reader, Result, Translate, Vector,
    codec::PointCodec,
    raw,
    reader::Strategy,
    spatial::GridIndex,
};
use std::{
    cell::Cell,
    io::{Cursor, Write},
    rc::Rc,
};
use tempfile::NamedTempFile;

fn header(raw: &[(i32, i32, i32)]) -> Header {
    let mut header = Header::default();
    header.set_number_of_points(raw.len() as u64);
    let mut bounds = Bounds::default();
    for &(x, y, z) in raw {
        bounds.grow(
            f64::from(x) * 0.01,
            f64::from(y) * 0.01,
            f64::from(z) * 0.01,
        );
    }
    header.set_bounds(bounds);
    header
}

fn las(raw: &[(i32, i32, i32)]) -> Vec<u8> {
    let header = header(raw);
    let mut bytes = Vec::new();
    header.write_to(&mut bytes).unwrap();
    for &(x, y, z) in raw {
        let point = Point {
            raw: Vector::new(x, y, z),
            ..Default::default()
        };
        raw::point::write_to(&mut bytes, header.point_format(), &point).unwrap();
    }
    bytes
}

/// Counts decode calls, and never has a point to give.
struct CountingCodec(Rc<Cell<usize>>);

impl PointCodec for CountingCodec {
    fn read(&mut self, _: &mut Point) -> Result<()> {
        self.0.set(self.0.get() + 1);
        Err(Error::Closed)
    }

    fn seek(&mut self, _: u64, _: u64) -> Result<()> {
        Ok(())
    }
}

#[test]
fn drop_raw_z_below() {
    let mut reader = Reader::new(Cursor::new(las(&[(100, 100, 100), (200, 200, 50)]))).unwrap();
    reader.set_filter("-drop_Z_below 60".parse().unwrap());
    let points: Vec<Point> = reader.points().collect();
    assert_eq!(1, points.len());
    assert_eq!(Vector::new(100, 100, 100), points[0].raw);
    assert_eq!(1., points[0].z());
    let counts: Vec<_> = reader.filter().unwrap().counts().collect();
    assert_eq!(vec![("drop_Z_below", 1)], counts);
    assert!(reader.error().is_none());
    assert!(reader.warning().is_none());
}

#[test]
fn disjoint_region_decodes_nothing() {
    let calls = Rc::new(Cell::new(0));
    let header = header(&[(0, 0, 0), (1000, 1000, 0)]);
    let mut reader = Reader::with_codec(header, CountingCodec(Rc::clone(&calls)));
    assert!(!reader.inside_rectangle(100., 100., 200., 200.));
    assert!(reader.read_point().is_none());
    assert_eq!(0, calls.get());
    assert!(reader.error().is_none());

    reader.inside_none();
    assert!(reader.read_point().is_none());
    assert_eq!(1, calls.get());
    assert!(reader.error().is_some());
}

#[test]
fn tile_excludes_upper_corner() {
    let mut reader = Reader::new(Cursor::new(las(&[
        (0, 0, 0),
        (999, 999, 0),
        (1000, 1000, 0),
        (1000, 500, 0),
    ])))
    .unwrap();
    assert!(reader.inside_tile(0., 0., 10.));
    let xs: Vec<i32> = reader.points().map(|point| point.raw.x).collect();
    assert_eq!(vec![0, 999], xs);
    assert_eq!(9.99, reader.header().bounds().max.x);
}

#[test]
fn circle() {
    let mut reader =
        Reader::new(Cursor::new(las(&[(0, 0, 0), (300, 0, 0), (500, 0, 0)]))).unwrap();
    assert!(reader.inside_circle(0., 0., 5.));
    let xs: Vec<i32> = reader.points().map(|point| point.raw.x).collect();
    assert_eq!(vec![0, 300], xs);
}

#[test]
fn indexed_reads_skip_ahead() {
    let raw = [(0, 0, 0), (5000, 5000, 0), (5001, 5001, 0), (100, 100, 0)];
    let mut reader = Reader::new(Cursor::new(las(&raw))).unwrap();
    reader.set_index(GridIndex::from_coordinates(
        10.,
        raw.iter()
            .map(|&(x, y, _)| (f64::from(x) * 0.01, f64::from(y) * 0.01)),
    ));
    assert!(reader.inside_rectangle(0., 0., 5., 5.));
    assert_eq!(Strategy::InsideIndexed, reader.strategy());
    let xs: Vec<i32> = reader.points().map(|point| point.raw.x).collect();
    assert_eq!(vec![0, 100], xs);
    assert!(reader.error().is_none());
}

#[test]
fn index_without_candidates_is_empty() {
    let raw = [(0, 0, 0), (5000, 5000, 0)];
    let mut reader = Reader::new(Cursor::new(las(&raw))).unwrap();
    reader.set_index(GridIndex::from_coordinates(
        10.,
        raw.iter()
            .map(|&(x, y, _)| (f64::from(x) * 0.01, f64::from(y) * 0.01)),
    ));
    assert!(!reader.inside_rectangle(20., 20., 30., 30.));
    assert_eq!(Strategy::Empty, reader.strategy());
}

#[test]
fn inside_filtered_and_transformed() {
    let mut reader = Reader::new(Cursor::new(las(&[
        (0, 0, 0),
        (100, 100, 0),
        (200, 200, 0),
        (5000, 5000, 0),
    ])))
    .unwrap();
    reader.set_filter("-drop_x 0.5 1.5".parse().unwrap());
    reader.set_transform(Translate::new(Vector::new(0., 0., 1.)));
    assert!(reader.inside_rectangle(0., 0., 10., 10.));
    assert_eq!(Strategy::InsideFiltered, reader.strategy());
    let points: Vec<Point> = reader.points().collect();
    assert_eq!(2, points.len());
    assert!(points.iter().all(|point| point.z() == 1.));
}

/// Numbers the points it sees, starting over on reset.
struct Numbered(i32);

impl PointTransform for Numbered {
    fn transform(&mut self, point: &mut Point) -> Result<()> {
        point.raw.z = self.0;
        self.0 += 1;
        Ok(())
    }

    fn reset(&mut self) {
        self.0 = 0;
    }
}

#[test]
fn indexed_filtered_reads_replay_after_reopen() {
    let raw = [
        (0, 0, 0),
        (5000, 5000, 0),
        (100, 100, 0),
        (200, 200, 0),
        (5001, 5001, 0),
        (300, 300, 0),
    ];
    let mut reader = Reader::new(Cursor::new(las(&raw))).unwrap();
    reader.set_index(GridIndex::from_coordinates(
        10.,
        raw.iter()
            .map(|&(x, y, _)| (f64::from(x) * 0.01, f64::from(y) * 0.01)),
    ));
    reader.set_filter("-drop_x 0.5 1.5".parse().unwrap());
    reader.set_transform(Numbered(0));
    assert!(reader.inside_rectangle(0., 0., 5., 5.));
    assert_eq!(Strategy::InsideIndexedFiltered, reader.strategy());

    let expected = vec![(0, 0), (200, 1), (300, 2)];
    for _ in 0..2 {
        let points: Vec<(i32, i32)> = reader
            .points()
            .map(|point| (point.raw.x, point.raw.z))
            .collect();
        assert_eq!(expected, points);
        let counts: Vec<_> = reader.filter().unwrap().counts().collect();
        assert_eq!(vec![("drop_x", 1)], counts);
        assert!(reader.error().is_none());
        reader.reopen(Cursor::new(las(&raw))).unwrap();
    }
}

#[test]
fn trailing_bytes_are_ignored() {
    let mut bytes = las(&[(0, 0, 0)]);
    bytes.extend_from_slice(&[0; 7]);
    let mut reader = Reader::new(Cursor::new(bytes)).unwrap();
    assert_eq!(1, reader.points().count());
    assert!(reader.error().is_none());
    assert!(reader.warning().is_none());
}

#[test]
fn from_path() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(&las(&[(1, 2, 3), (4, 5, 6)])).unwrap();
    file.flush().unwrap();
    let mut reader = Reader::from_path(file.path()).unwrap();
    assert_eq!(2, reader.npoints());
    let point = reader.read_point().unwrap();
    assert_eq!(Vector::new(1, 2, 3), point.raw);
}

#[test]
fn bad_signature() {
    let mut bytes = las(&[]);
    bytes[0] = b'X';
    assert!(matches!(
        Reader::new(Cursor::new(bytes)),
        Err(Error::InvalidFileSignature(_))
    ));
}
