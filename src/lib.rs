//! Stream points out of [ASPRS LAS](https://www.asprs.org/committee-general/laser-las-file-format-exchange-activities.html)
//! and laz files, with filtering, spatial clipping and per-point transforms.
//!
//! # Reading
//!
//! Create a `Reader` from a `Path`, or from anything that implements `Read` and `Seek`:
//!
//! ```
//! use std::io::Cursor;
//! use lasstream::{Header, Reader};
//!
//! let mut bytes = Vec::new();
//! Header::default().write_to(&mut bytes).unwrap();
//! let reader = Reader::new(Cursor::new(bytes)).unwrap();
//! assert_eq!(0, reader.npoints());
//! ```
//!
//! ## Prefer `BufRead`
//!
//! Your performance will be better if your `Read` is actually a `BufRead`. `Reader::from_path`
//! takes care of this for you, but `Reader::new` doesn't.
//!
//! ## Filters
//!
//! Filters are parsed from lastools-style option strings. A point is dropped as soon as one
//! criterion matches, and that criterion's counter goes up:
//!
//! ```
//! use lasstream::{Filter, Point};
//! let mut filter: Filter = "-keep_class 2 -drop_z_above 100".parse().unwrap();
//! let point = Point { classification: 2, ..Default::default() };
//! assert!(!filter.filter(&point));
//! ```
//!
//! ## Spatial constraints
//!
//! `Reader::inside_tile`, `Reader::inside_circle` and `Reader::inside_rectangle` restrict the
//! points returned to a region. With a [spatial::SpatialIndex] the reader seeks straight to
//! candidate points.

#![deny(missing_docs, missing_debug_implementations, unsafe_code)]
#![warn(
    trivial_casts,
    trivial_numeric_casts,
    unused_import_braces,
    unused_qualifications
)]

pub mod codec;
pub mod feature;
pub mod filter;
pub mod header;
pub mod point;
pub mod raw;
pub mod reader;
pub mod selective;
pub mod spatial;
pub mod vlr;

mod bounds;
mod color;
mod error;
mod point_transform;
mod transform;
mod utils;
mod vector;
mod version;

pub use crate::{
    bounds::Bounds,
    color::Color,
    error::Error,
    feature::Feature,
    filter::{Criterion, Filter},
    header::Header,
    point::Point,
    point_transform::{PointTransform, Translate},
    reader::{Reader, ReaderOptions},
    transform::Transform,
    vector::Vector,
    version::Version,
    vlr::Vlr,
};

#[cfg(feature = "laz")]
pub use crate::reader::LazParallelism;

/// Crate-specific result type.
pub type Result<T> = std::result::Result<T, Error>;
