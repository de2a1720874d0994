use lasstream::{Error, Header, Point, Reader, ReaderOptions, Vector, Version, Vlr, raw};
use std::io::Cursor;

fn accounted(header: &Header) -> u32 {
    let vlrs: usize = header.vlrs().iter().map(Vlr::len).sum();
    u32::from(header.header_size()) + vlrs as u32 + header.user_data_after_header().len() as u32
}

#[test]
fn offset_to_point_data_tracks_vlrs() {
    let mut header = Header::default();
    let check = |header: &Header| assert_eq!(accounted(header), header.offset_to_point_data());
    header
        .add_vlr(Vlr::with_data("a", 1, vec![0; 10]), false)
        .unwrap();
    check(&header);
    header
        .add_vlr(Vlr::with_data("b", 2, vec![0; 3]), false)
        .unwrap();
    check(&header);
    header
        .add_vlr(Vlr::with_data("a", 1, vec![0; 100]), false)
        .unwrap();
    check(&header);
    header.add_vlr(Vlr::with_data("a", 1, vec![]), true).unwrap();
    check(&header);
    assert!(header.remove_vlr("b", 2).is_some());
    check(&header);
    header.set_user_data_after_header(vec![1, 2, 3]).unwrap();
    check(&header);
    assert!(header.remove_vlr("nope", 0).is_none());
    check(&header);
    header.clean_vlrs();
    check(&header);
    assert_eq!(227 + 3, header.offset_to_point_data());
}

#[test]
fn roundtrip_keeps_accounting() {
    let mut header = Header::default();
    header
        .add_vlr(Vlr::with_data("lasstream", 7, vec![42; 16]), false)
        .unwrap();
    header.set_number_of_points(4);
    header.set_lasoriginal();
    let mut bytes = Vec::new();
    header.write_to(&mut bytes).unwrap();

    let read = Header::read_from(Cursor::new(&bytes)).unwrap();
    assert_eq!(accounted(&read), read.offset_to_point_data());
    assert_eq!(1, read.vlrs().len());
    assert!(read.lasoriginal().is_some());
}

#[test]
fn restore_original_reports_counts_but_reads_the_clip() {
    let mut header = Header::default();
    header.set_number_of_points(5);
    header.set_lasoriginal();
    header.set_number_of_points(2);
    let mut bytes = Vec::new();
    header.write_to(&mut bytes).unwrap();
    for x in [1, 2] {
        let point = Point {
            raw: Vector::new(x, 0, 0),
            ..Default::default()
        };
        raw::point::write_to(&mut bytes, header.point_format(), &point).unwrap();
    }

    let mut reader = Reader::new(Cursor::new(bytes.clone())).unwrap();
    assert_eq!(2, reader.header().number_of_points());
    let xs: Vec<i32> = reader.points().map(|point| point.raw.x).collect();
    assert_eq!(vec![1, 2], xs);

    let options = ReaderOptions::default().with_restore_original(true);
    let mut reader = Reader::with_options(Cursor::new(bytes.clone()), options).unwrap();
    assert!(reader.header().lasoriginal().is_none());
    assert_eq!(5, reader.header().number_of_points());
    assert_eq!(2, reader.npoints());
    let xs: Vec<i32> = reader.points().map(|point| point.raw.x).collect();
    assert_eq!(vec![1, 2], xs);
    assert!(reader.error().is_none());
    assert!(reader.warning().is_none());

    reader.reopen(Cursor::new(bytes)).unwrap();
    assert_eq!(2, reader.points().count());
    assert!(reader.error().is_none());
}

fn las14(number_of_point_records: u64, evlr: Option<raw::Evlr>) -> raw::Header {
    raw::Header {
        version: Version::new(1, 4),
        header_size: 375,
        offset_to_point_data: 375,
        evlr,
        large_file: Some(raw::LargeFile {
            number_of_point_records,
            ..Default::default()
        }),
        ..Default::default()
    }
}

#[test]
fn huge_point_count_is_an_error() {
    let mut bytes = Vec::new();
    las14(u64::MAX, None).write_to(&mut bytes).unwrap();
    assert!(matches!(
        Reader::new(Cursor::new(bytes)),
        Err(Error::PointCountTooLarge { .. })
    ));
}

#[test]
fn evlr_past_the_end_is_a_warning() {
    let evlr = raw::Evlr {
        start_of_first_evlr: 375,
        number_of_evlrs: 1,
    };
    let mut bytes = Vec::new();
    las14(0, Some(evlr)).write_to(&mut bytes).unwrap();
    raw::Vlr {
        record_length_after_header: raw::RecordLength::Evlr(u64::MAX),
        ..Default::default()
    }
    .write_to(&mut bytes)
    .unwrap();
    let mut reader = Reader::new(Cursor::new(bytes)).unwrap();
    assert!(reader.header().evlrs().is_empty());
    assert_eq!(1, reader.header().warnings().len());
    assert!(reader.read_point().is_none());
    assert!(reader.error().is_none());
}
