//! Read las points through filters, spatial constraints and transforms.
//!
//! ```
//! use std::io::Cursor;
//! use lasstream::{Filter, Header, Point, Reader, raw};
//!
//! let mut header = Header::default();
//! header.set_number_of_points(2);
//! let mut bytes = Vec::new();
//! header.write_to(&mut bytes).unwrap();
//! for z in [100, 50] {
//!     let point = Point { raw: lasstream::Vector::new(0, 0, z), ..Default::default() };
//!     raw::point::write_to(&mut bytes, header.point_format(), &point).unwrap();
//! }
//!
//! let mut reader = Reader::new(Cursor::new(bytes)).unwrap();
//! reader.set_filter("-drop_z_below 0.6".parse::<Filter>().unwrap());
//! assert_eq!(1., reader.read_point().unwrap().z());
//! assert!(reader.read_point().is_none());
//! ```
//!
//! `Reader::from_path` wraps the file in a `BufReader` for you.
//!
//! # Compression
//!
//! [laszip](https://laszip.org/) is supported by enabling the `laz` feature in your
//! `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! lasstream = { version = "*", features = ["laz"] }
//! ```

mod strategy;

pub use self::strategy::Strategy;

use crate::{
    Bounds, Error, Filter, Header, Point, PointTransform, Result, Vector,
    codec::{LasCodec, PointCodec},
    selective,
    spatial::{SpatialConstraint, SpatialIndex},
};
use log::{Level, log};
use std::{
    fs::File,
    io::{BufReader, Read, Seek, SeekFrom},
    path::Path,
};

/// Choice of laz parallelism.
#[cfg(feature = "laz")]
#[derive(Debug, Clone, Copy)]
pub enum LazParallelism {
    /// Decompress whole chunks in parallel. Selective decompression is not available.
    #[cfg(feature = "laz-parallel")]
    Yes,
    /// Decompress one point at a time.
    No,
}

/// Options for [Reader].
///
/// # Examples
///
/// ```
/// use lasstream::{ReaderOptions, selective};
/// let options = ReaderOptions::default()
///     .with_restore_original(true)
///     .with_decompress_selective(selective::Z | selective::CLASSIFICATION);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ReaderOptions {
    restore_original: bool,
    decompress_selective: u32,
    #[cfg(feature = "laz")]
    laz_parallelism: LazParallelism,
}

impl ReaderOptions {
    /// Undo a previous clip by restoring the counts and bounds of the lasoriginal record.
    ///
    /// Only the reported header changes. Points are still read up to the count on disk.
    pub fn with_restore_original(mut self, restore_original: bool) -> Self {
        self.restore_original = restore_original;
        self
    }

    /// Sets the [selective] bits of the fields to decompress.
    ///
    /// On [Reader::reopen], whatever the filter and transform need is added.
    pub fn with_decompress_selective(mut self, decompress_selective: u32) -> Self {
        self.decompress_selective = decompress_selective;
        self
    }

    /// Change the laz parallelism option.
    #[cfg(feature = "laz")]
    pub fn with_laz_parallelism(mut self, laz_parallelism: LazParallelism) -> Self {
        self.laz_parallelism = laz_parallelism;
        self
    }
}

impl Default for ReaderOptions {
    fn default() -> Self {
        ReaderOptions {
            restore_original: false,
            decompress_selective: selective::ALL,
            #[cfg(feature = "laz")]
            laz_parallelism: LazParallelism::No,
        }
    }
}

/// Reads points, one at a time.
pub struct Reader {
    codec: Option<Box<dyn PointCodec>>,
    point_data_start: u64,
    header: Header,
    original_bounds: Bounds,
    options: ReaderOptions,
    filter: Option<Filter>,
    transform: Option<Box<dyn PointTransform>>,
    constraint: Option<SpatialConstraint>,
    index: Option<Box<dyn SpatialIndex>>,
    disjoint: bool,
    strategy: Strategy,
    point: Point,
    npoints: u64,
    p_count: u64,
    ended: bool,
    error: Option<Error>,
    warning: Option<String>,
}

impl Reader {
    /// Creates a new reader with default options.
    ///
    /// This does *not* wrap the `Read` in a `BufRead`, so if you're concerned
    /// about performance you should do that wrapping yourself (or use
    /// `from_path`).
    pub fn new<R: Read + Seek + Send + Sync + 'static>(read: R) -> Result<Reader> {
        Reader::with_options(read, ReaderOptions::default())
    }

    /// Creates a new reader with custom options.
    pub fn with_options<R: Read + Seek + Send + Sync + 'static>(
        mut read: R,
        options: ReaderOptions,
    ) -> Result<Reader> {
        let mut header = Header::read_from(&mut read)?;
        header.read_evlrs(&mut read)?;
        let start = point_data_start(&header);
        let npoints = header.number_of_points();
        let codec = open_codec(
            read,
            start,
            npoints,
            &header,
            &options,
            options.decompress_selective,
        )?;
        if options.restore_original && !header.restore_lasoriginal() {
            log!(Level::Debug, "no lasoriginal record to restore");
        }
        let mut reader = Reader::from_parts(header, codec);
        reader.point_data_start = start;
        reader.npoints = npoints;
        reader.options = options;
        Ok(reader)
    }

    /// Creates a new reader from a path.
    ///
    /// The underlying `File` is wrapped in a `BufReader` for performance reasons.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Reader> {
        File::open(path)
            .map_err(Error::from)
            .and_then(|file| Reader::new(BufReader::new(file)))
    }

    /// Creates a reader around a header and a codec positioned at the first point.
    pub fn with_codec<C: PointCodec + 'static>(header: Header, codec: C) -> Reader {
        Reader::from_parts(header, Box::new(codec))
    }

    fn from_parts(header: Header, codec: Box<dyn PointCodec>) -> Reader {
        let mut point = Point::default();
        point.transforms = header.transforms();
        Reader {
            codec: Some(codec),
            point_data_start: point_data_start(&header),
            original_bounds: header.bounds(),
            npoints: header.number_of_points(),
            header,
            options: ReaderOptions::default(),
            filter: None,
            transform: None,
            constraint: None,
            index: None,
            disjoint: false,
            strategy: Strategy::Direct,
            point,
            p_count: 0,
            ended: false,
            error: None,
            warning: None,
        }
    }

    /// Returns the header.
    ///
    /// While a spatial constraint is active, the bounds are clipped to it.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Returns the number of points in the point block.
    pub fn npoints(&self) -> u64 {
        self.npoints
    }

    /// Returns the number of points decoded so far, i.e. the index of the next point.
    pub fn p_count(&self) -> u64 {
        self.p_count
    }

    /// Returns the current read strategy.
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Returns the filter, which holds the drop counters.
    pub fn filter(&self) -> Option<&Filter> {
        self.filter.as_ref()
    }

    /// Returns the error that ended the stream, if any.
    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// Returns the warning raised at the end of the stream, if any.
    pub fn warning(&self) -> Option<&str> {
        self.warning.as_deref()
    }

    /// Sets the filter, replacing any previous one.
    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = Some(filter);
        self.select_strategy();
    }

    /// Removes the filter.
    pub fn clear_filter(&mut self) -> Option<Filter> {
        let filter = self.filter.take();
        self.select_strategy();
        filter
    }

    /// Sets the transform, replacing any previous one.
    pub fn set_transform<T: PointTransform + 'static>(&mut self, transform: T) {
        self.transform = Some(Box::new(transform));
        self.select_strategy();
    }

    /// Removes the transform.
    pub fn clear_transform(&mut self) {
        self.transform = None;
        self.select_strategy();
    }

    /// Sets the spatial index used to skip to candidate points.
    pub fn set_index<I: SpatialIndex + 'static>(&mut self, index: I) {
        self.index = Some(Box::new(index));
        self.reconstrain();
    }

    /// Removes the spatial index.
    pub fn clear_index(&mut self) {
        self.index = None;
        self.reconstrain();
    }

    /// Only returns points inside the tile. Upper bounds are exclusive.
    ///
    /// Returns false if no point can be inside.
    pub fn inside_tile(&mut self, ll_x: f64, ll_y: f64, size: f64) -> bool {
        self.constrain(SpatialConstraint::Tile { ll_x, ll_y, size })
    }

    /// Only returns points strictly inside the circle.
    ///
    /// Returns false if no point can be inside.
    pub fn inside_circle(&mut self, center_x: f64, center_y: f64, radius: f64) -> bool {
        self.constrain(SpatialConstraint::Circle {
            center_x,
            center_y,
            radius,
        })
    }

    /// Only returns points inside the rectangle. Upper bounds are exclusive.
    ///
    /// Returns false if no point can be inside.
    pub fn inside_rectangle(&mut self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> bool {
        self.constrain(SpatialConstraint::Rectangle {
            min_x,
            min_y,
            max_x,
            max_y,
        })
    }

    /// Removes the spatial constraint and restores the header's bounds.
    pub fn inside_none(&mut self) {
        self.constraint = None;
        self.disjoint = false;
        self.header.set_bounds(self.original_bounds);
        self.select_strategy();
    }

    fn constrain(&mut self, constraint: SpatialConstraint) -> bool {
        let transforms = self.header.transforms();
        let scale = Vector::new(
            transforms.x.scale,
            transforms.y.scale,
            transforms.z.scale,
        );
        self.constraint = Some(constraint);
        self.disjoint = !constraint.intersects(&self.original_bounds);
        if !self.disjoint {
            if let Some(index) = self.index.as_mut() {
                self.disjoint = !constraint.intersect(index.as_mut());
            }
        }
        self.header
            .set_bounds(constraint.clip(self.original_bounds, scale));
        self.select_strategy();
        !self.disjoint
    }

    fn reconstrain(&mut self) {
        match self.constraint {
            Some(constraint) => {
                let _ = self.constrain(constraint);
            }
            None => self.select_strategy(),
        }
    }

    fn select_strategy(&mut self) {
        let filtered = self.filter.is_some() || self.transform.is_some();
        self.strategy = Strategy::select(
            self.constraint.is_some(),
            self.disjoint,
            self.index.is_some(),
            filtered,
        );
        log!(Level::Debug, "reading points with {:?}", self.strategy);
    }

    /// Returns the [selective] bits of the fields the filter, transform and constraint need.
    pub fn decompress_selective(&self) -> u32 {
        let mut bits = selective::CHANNEL_RETURNS_XY;
        if let Some(filter) = &self.filter {
            bits |= filter.decompress_selective();
        }
        if let Some(transform) = &self.transform {
            bits |= transform.decompress_selective();
        }
        bits
    }

    /// Reads the next point that passes the constraint and the filter.
    ///
    /// Returns `None` at the end of the stream, after an error (see [Reader::error]), or after
    /// [Reader::close].
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io::Cursor;
    /// use lasstream::{Header, Reader};
    /// let mut bytes = Vec::new();
    /// Header::default().write_to(&mut bytes).unwrap();
    /// let mut reader = Reader::new(Cursor::new(bytes)).unwrap();
    /// assert!(reader.read_point().is_none());
    /// assert!(reader.error().is_none());
    /// ```
    pub fn read_point(&mut self) -> Option<&Point> {
        let found = match self.strategy {
            Strategy::Empty => false,
            Strategy::Direct => self.decode(),
            Strategy::Filtered => self.read_filtered(),
            Strategy::Inside => self.read_inside(),
            Strategy::InsideIndexed => self.read_inside_indexed(),
            Strategy::InsideFiltered => self.read_inside_filtered(),
            Strategy::InsideIndexedFiltered => self.read_inside_indexed_filtered(),
        };
        if found { Some(&self.point) } else { None }
    }

    /// Returns an iterator over the remaining points.
    pub fn points(&mut self) -> Points<'_> {
        Points { reader: self }
    }

    fn read_filtered(&mut self) -> bool {
        while self.decode() {
            if self.accept() {
                return true;
            }
        }
        false
    }

    fn read_inside(&mut self) -> bool {
        while self.decode() {
            if self.is_inside() {
                return true;
            }
        }
        false
    }

    fn read_inside_indexed(&mut self) -> bool {
        while self.next_candidate() && self.decode() {
            if self.is_inside() {
                return true;
            }
        }
        false
    }

    fn read_inside_filtered(&mut self) -> bool {
        while self.decode() {
            if self.is_inside() && self.accept() {
                return true;
            }
        }
        false
    }

    fn read_inside_indexed_filtered(&mut self) -> bool {
        while self.next_candidate() && self.decode() {
            if self.is_inside() && self.accept() {
                return true;
            }
        }
        false
    }

    fn is_inside(&self) -> bool {
        self.constraint
            .is_none_or(|constraint| constraint.contains(&self.point))
    }

    /// Filters, then transforms, the current point. False if dropped or the transform failed.
    fn accept(&mut self) -> bool {
        if let Some(filter) = self.filter.as_mut() {
            if filter.filter(&self.point) {
                return false;
            }
        }
        if let Some(transform) = self.transform.as_mut() {
            if let Err(err) = transform.transform(&mut self.point) {
                self.fail(self.p_count - 1, err);
                return false;
            }
        }
        true
    }

    /// Decodes the next point. False at the end of the stream or on error.
    fn decode(&mut self) -> bool {
        if self.error.is_some() {
            return false;
        }
        if self.p_count >= self.npoints {
            self.end();
            return false;
        }
        let Some(codec) = self.codec.as_mut() else {
            return false;
        };
        match codec.read(&mut self.point) {
            Ok(()) => {
                self.p_count += 1;
                true
            }
            Err(err) => {
                self.fail(self.p_count, err);
                false
            }
        }
    }

    /// Seeks the codec to the next index candidate. False once they're exhausted.
    fn next_candidate(&mut self) -> bool {
        if self.error.is_some() {
            return false;
        }
        let Some(index) = self.index.as_mut() else {
            return true;
        };
        match index.seek_next(self.p_count) {
            None => false,
            Some(target) if target == self.p_count => true,
            Some(target) if target >= self.npoints => false,
            Some(target) => {
                let Some(codec) = self.codec.as_mut() else {
                    return false;
                };
                match codec.seek(self.p_count, target) {
                    Ok(()) => {
                        self.p_count = target;
                        true
                    }
                    Err(err) => {
                        self.fail(target, err);
                        false
                    }
                }
            }
        }
    }

    fn fail(&mut self, index: u64, err: Error) {
        let err = Error::Point {
            index,
            total: self.npoints,
            source: Box::new(err),
        };
        log!(Level::Error, "{}", err);
        self.error = Some(err);
    }

    fn end(&mut self) {
        if self.ended {
            return;
        }
        self.ended = true;
        let Some(codec) = self.codec.as_mut() else {
            return;
        };
        if let Err(err) = codec.check_end() {
            log!(Level::Warn, "{}", err);
            self.warning = Some(err.to_string());
        } else if let Some(warning) = codec.warning() {
            log!(Level::Warn, "{}", warning);
            self.warning = Some(warning.to_string());
        }
    }

    /// Seeks to the given point index, zero-based.
    ///
    /// Only allowed without a spatial constraint or index.
    pub fn seek(&mut self, index: u64) -> Result<()> {
        if self.constraint.is_some() || self.index.is_some() {
            return Err(Error::SeekUnsupported);
        }
        if index > self.npoints {
            return Err(Error::SeekOutOfRange {
                index,
                npoints: self.npoints,
            });
        }
        let codec = self.codec.as_mut().ok_or(Error::Closed)?;
        codec.seek(self.p_count, index)?;
        self.p_count = index;
        self.ended = false;
        Ok(())
    }

    /// Starts over on a fresh byte source for the same file, keeping the configuration.
    ///
    /// The filter and transform are reset, not rebuilt.
    pub fn reopen<R: Read + Seek + Send + Sync + 'static>(&mut self, read: R) -> Result<()> {
        let decompress_selective = self.options.decompress_selective | self.decompress_selective();
        let codec = open_codec(
            read,
            self.point_data_start,
            self.npoints,
            &self.header,
            &self.options,
            decompress_selective,
        )?;
        self.restart(codec);
        Ok(())
    }

    /// Like [Reader::reopen], with a codec positioned at the first point.
    pub fn reopen_with_codec<C: PointCodec + 'static>(&mut self, codec: C) {
        self.restart(Box::new(codec));
    }

    fn restart(&mut self, codec: Box<dyn PointCodec>) {
        self.codec = Some(codec);
        self.p_count = 0;
        self.ended = false;
        self.error = None;
        self.warning = None;
        if let Some(filter) = self.filter.as_mut() {
            filter.reset();
        }
        if let Some(transform) = self.transform.as_mut() {
            transform.reset();
        }
        self.reconstrain();
    }

    /// Releases the byte source. Later reads return `None`.
    pub fn close(&mut self) {
        if self.codec.take().is_some() {
            log!(
                Level::Debug,
                "closed after {} of {} points",
                self.p_count,
                self.npoints
            );
        }
    }

    /// Has this reader been closed?
    pub fn is_closed(&self) -> bool {
        self.codec.is_none()
    }
}

/// Where the point block starts on disk, lifted records included.
fn point_data_start(header: &Header) -> u64 {
    header
        .to_raw()
        .map(|raw| raw.offset_to_point_data)
        .unwrap_or_else(|_| header.offset_to_point_data())
        .into()
}

fn open_codec<R: Read + Seek + Send + Sync + 'static>(
    mut read: R,
    start: u64,
    npoints: u64,
    header: &Header,
    options: &ReaderOptions,
    decompress_selective: u32,
) -> Result<Box<dyn PointCodec>> {
    let _ = read.seek(SeekFrom::Start(start))?;
    if header.point_format().is_compressed {
        open_laz(read, header, options, decompress_selective)
    } else {
        Ok(Box::new(LasCodec::with_number_of_points(
            read, header, npoints,
        )?))
    }
}

#[cfg(feature = "laz")]
fn open_laz<R: Read + Seek + Send + Sync + 'static>(
    read: R,
    header: &Header,
    options: &ReaderOptions,
    decompress_selective: u32,
) -> Result<Box<dyn PointCodec>> {
    use crate::codec::LazCodec;
    let codec = match options.laz_parallelism {
        #[cfg(feature = "laz-parallel")]
        LazParallelism::Yes => LazCodec::new_parallel(read, header)?,
        LazParallelism::No => LazCodec::new(read, header, decompress_selective)?,
    };
    Ok(Box::new(codec))
}

#[cfg(not(feature = "laz"))]
fn open_laz<R>(_: R, _: &Header, _: &ReaderOptions, _: u32) -> Result<Box<dyn PointCodec>> {
    Err(Error::LaszipNotEnabled)
}

impl std::fmt::Debug for Reader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reader")
            .field("strategy", &self.strategy)
            .field("constraint", &self.constraint)
            .field("filter", &self.filter)
            .field("npoints", &self.npoints)
            .field("p_count", &self.p_count)
            .finish_non_exhaustive()
    }
}

/// An iterator over the points of a [Reader].
///
/// Stops at the end of the stream or at the first error, see [Reader::error].
#[derive(Debug)]
pub struct Points<'a> {
    reader: &'a mut Reader,
}

impl Iterator for Points<'_> {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        self.reader.read_point().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw;
    use std::io::Cursor;

    fn file(raw: &[(i32, i32, i32)]) -> Cursor<Vec<u8>> {
        let mut header = Header::default();
        header.set_number_of_points(raw.len() as u64);
        let mut bounds = Bounds::default();
        for &(x, y, z) in raw {
            bounds.grow(f64::from(x) / 100., f64::from(y) / 100., f64::from(z) / 100.);
        }
        header.set_bounds(bounds);
        let mut bytes = Vec::new();
        header.write_to(&mut bytes).unwrap();
        for &(x, y, z) in raw {
            let point = Point {
                raw: Vector::new(x, y, z),
                ..Default::default()
            };
            raw::point::write_to(&mut bytes, header.point_format(), &point).unwrap();
        }
        Cursor::new(bytes)
    }

    fn xs(reader: &mut Reader) -> Vec<i32> {
        reader.points().map(|point| point.raw.x).collect()
    }

    #[test]
    fn direct() {
        let mut reader = Reader::new(file(&[(1, 1, 1), (2, 2, 2)])).unwrap();
        assert_eq!(Strategy::Direct, reader.strategy());
        assert_eq!(vec![1, 2], xs(&mut reader));
        assert_eq!(2, reader.p_count());
        assert!(reader.warning().is_none());
    }

    #[test]
    fn truncated_point_block() {
        let mut cursor = file(&[(1, 1, 1), (2, 2, 2)]);
        let len = cursor.get_ref().len();
        cursor.get_mut().truncate(len - 5);
        let mut reader = Reader::new(cursor).unwrap();
        assert_eq!(vec![1], xs(&mut reader));
        assert!(matches!(
            reader.error(),
            Some(Error::Point {
                index: 1,
                total: 2,
                ..
            })
        ));
        assert!(reader.read_point().is_none());
    }

    #[test]
    fn inside_rectangle() {
        let mut reader = Reader::new(file(&[(100, 100, 0), (500, 500, 0), (150, 150, 0)])).unwrap();
        assert!(reader.inside_rectangle(0., 0., 2., 2.));
        assert_eq!(Strategy::Inside, reader.strategy());
        assert_eq!(2., reader.header().bounds().max.x);
        assert_eq!(vec![100, 150], xs(&mut reader));
        reader.inside_none();
        assert_eq!(5., reader.header().bounds().max.x);
    }

    #[test]
    fn tile_bounds_are_nudged() {
        let mut reader = Reader::new(file(&[(0, 0, 0), (1000, 1000, 0)])).unwrap();
        assert!(reader.inside_tile(0., 0., 5.));
        assert_eq!(4.99, reader.header().bounds().max.x);
    }

    #[test]
    fn disjoint_rectangle() {
        let mut reader = Reader::new(file(&[(100, 100, 0)])).unwrap();
        assert!(!reader.inside_rectangle(10., 10., 20., 20.));
        assert_eq!(Strategy::Empty, reader.strategy());
        assert!(reader.read_point().is_none());
        assert_eq!(0, reader.p_count());
    }

    #[test]
    fn filter_and_transform() {
        let mut reader = Reader::new(file(&[(100, 0, 0), (200, 0, 0), (300, 0, 0)])).unwrap();
        reader.set_filter("-drop_x 1.5 2.5".parse().unwrap());
        reader.set_transform(|point: &mut Point| point.raw.y = 7);
        assert_eq!(Strategy::Filtered, reader.strategy());
        let points: Vec<Point> = reader.points().collect();
        assert_eq!(2, points.len());
        assert!(points.iter().all(|point| point.raw.y == 7));
        assert_eq!(
            Some(("drop_x", 1)),
            reader.filter().and_then(|filter| filter.counts().next())
        );
    }

    #[test]
    fn seek() {
        let mut reader = Reader::new(file(&[(1, 0, 0), (2, 0, 0), (3, 0, 0)])).unwrap();
        reader.seek(2).unwrap();
        assert_eq!(vec![3], xs(&mut reader));
        assert!(matches!(
            reader.seek(4),
            Err(Error::SeekOutOfRange { index: 4, .. })
        ));
        let _ = reader.inside_rectangle(0., 0., 1., 1.);
        assert!(matches!(reader.seek(0), Err(Error::SeekUnsupported)));
    }

    #[test]
    fn reopen_resets_filter() {
        let mut reader = Reader::new(file(&[(1, 0, 0), (2, 0, 0), (3, 0, 0)])).unwrap();
        reader.set_filter("-keep_every_nth 2".parse().unwrap());
        assert_eq!(vec![2], xs(&mut reader));
        reader
            .reopen(file(&[(1, 0, 0), (2, 0, 0), (3, 0, 0)]))
            .unwrap();
        assert_eq!(vec![2], xs(&mut reader));
    }

    #[test]
    fn close() {
        let mut reader = Reader::new(file(&[(1, 0, 0)])).unwrap();
        reader.close();
        reader.close();
        assert!(reader.is_closed());
        assert!(reader.read_point().is_none());
        assert!(matches!(reader.seek(0), Err(Error::Closed)));
    }
}
