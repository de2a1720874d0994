use criterion::{Criterion as Bench, criterion_group, criterion_main};
use lasstream::{Filter, Header, Point, Reader, Vector, raw};
use std::{hint::black_box, io::Cursor};

fn points(n: i32) -> Vec<Point> {
    (0..n)
        .map(|i| Point {
            raw: Vector::new(i % 1000, i / 1000, i % 97),
            classification: (i % 8) as u8,
            intensity: (i % 4096) as u16,
            ..Default::default()
        })
        .collect()
}

fn file(points: &[Point]) -> Vec<u8> {
    let mut header = Header::default();
    header.set_number_of_points(points.len() as u64);
    let mut bytes = Vec::new();
    header.write_to(&mut bytes).unwrap();
    for point in points {
        raw::point::write_to(&mut bytes, header.point_format(), point).unwrap();
    }
    bytes
}

fn filter(c: &mut Bench) {
    let points = points(10_000);
    let mut filter: Filter = "-keep_class 2 3 -drop_z_above 0.5 -keep_intensity 100 4000"
        .parse()
        .unwrap();
    c.bench_function("filter_10000", |b| {
        b.iter(|| {
            filter.reset();
            points
                .iter()
                .filter(|point| !filter.filter(black_box(point)))
                .count()
        })
    });
}

fn read(c: &mut Bench) {
    let bytes = file(&points(10_000));
    c.bench_function("read_inside_filtered_10000", |b| {
        b.iter(|| {
            let mut reader = Reader::new(Cursor::new(bytes.clone())).unwrap();
            reader.set_filter("-drop_class 0 1".parse().unwrap());
            let _ = reader.inside_rectangle(0., 0., 5., 5.);
            reader.points().count()
        })
    });
}

criterion_group!(benches, filter, read);
criterion_main!(benches);
