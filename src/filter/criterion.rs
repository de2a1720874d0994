//! Single point predicates.

use crate::{Point, Vector, selective};
use rand::{RngCore, SeedableRng, rngs::StdRng};
use std::collections::{HashMap, HashSet, hash_map::Entry};

/// The seed used by `-keep_random_fraction` when none is given.
pub const DEFAULT_SEED: u64 = 0;

/// A numeric point attribute compared by an interval criterion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Attribute {
    X,
    Y,
    Z,
    RawX,
    RawY,
    RawZ,
    Intensity,
    ScanAngle,
    AbsScanAngle,
    UserData,
    PointSource,
    GpsTime,
    Red,
    Green,
    Blue,
    Nir,
    ScannerChannel,
    WavepacketIndex,
}

/// How an interval criterion compares a value `v` with its bounds `a` and `b`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntervalKind {
    /// Drops when `v < a || v >= b`.
    KeepHalfOpen,
    /// Drops when `a <= v < b`.
    DropHalfOpen,
    /// Drops when `v < a || v > b`.
    KeepInclusive,
    /// Drops when `a <= v <= b`.
    DropInclusive,
    /// Drops when `v < a`.
    Below,
    /// Drops when `v > a`.
    Above,
    /// Drops when `v == a`.
    Equal,
    /// Drops when `v != a`.
    NotEqual,
}

/// Return-number classes.
///
/// A single return is both first and last, but never first-of-many or last-of-many.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum ReturnClass {
    KeepFirst,
    KeepFirstOfMany,
    KeepMiddle,
    KeepLast,
    KeepLastOfMany,
    KeepSecondLast,
    DropFirst,
    DropFirstOfMany,
    DropMiddle,
    DropLast,
    DropLastOfMany,
    DropSecondLast,
}

/// Single-bit point flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Flag {
    Synthetic,
    KeyPoint,
    Withheld,
    Overlap,
    EdgeOfFlightLine,
}

/// A point predicate. [Criterion::filter] returns true when the point should be dropped.
///
/// # Examples
///
/// ```
/// use lasstream::{Point, filter::Criterion};
/// let mut criterion = Criterion::keep_x(0., 1.);
/// let mut point = Point::default();
/// assert!(!criterion.filter(&point));
/// point.set_x(1.).unwrap();
/// assert!(criterion.filter(&point));
/// assert_eq!("-keep_x 0 1", criterion.command());
/// ```
#[derive(Clone, Debug)]
pub struct Criterion {
    kind: Kind,
}

#[derive(Clone, Debug)]
enum Kind {
    Interval {
        name: &'static str,
        attribute: Attribute,
        kind: IntervalKind,
        a: f64,
        b: f64,
    },
    Tile {
        ll_x: f64,
        ll_y: f64,
        size: f64,
    },
    Circle {
        x: f64,
        y: f64,
        radius: f64,
    },
    Rectangle {
        keep: bool,
        min_x: f64,
        min_y: f64,
        max_x: f64,
        max_y: f64,
    },
    Box {
        keep: bool,
        min: Vector<f64>,
        max: Vector<f64>,
    },
    Return(ReturnClass),
    ReturnMask {
        keep: bool,
        drop_mask: u16,
    },
    NumberOfReturnsMask {
        keep: bool,
        drop_mask: u16,
    },
    Class {
        keep: bool,
        drop_mask: u32,
    },
    ExtendedClass {
        keep: bool,
        drop_mask: [u32; 8],
    },
    Flag {
        flag: Flag,
        keep: bool,
    },
    ScanDirectionChange {
        previous: Option<crate::point::ScanDirection>,
    },
    EveryNth {
        n: u32,
        counter: u32,
    },
    RandomFraction {
        fraction: f64,
        initial_seed: u64,
        seed: u64,
    },
    ThinWithGrid {
        spacing: f64,
        cells: HashSet<(i64, i64)>,
    },
    ThinWithTime {
        spacing: f64,
        cells: HashMap<i64, f64>,
    },
    And(Box<Criterion>, Box<Criterion>),
    Or(Box<Criterion>, Box<Criterion>),
}

macro_rules! intervals {
    (
        $(between $bfn:ident => $bname:literal, $battr:ident, $bkind:ident;)*
        $(single $sfn:ident => $sname:literal, $sattr:ident, $skind:ident;)*
    ) => {
        /// Every interval option name, with the attribute and comparison it maps to.
        pub(crate) const INTERVALS: &[(&str, Attribute, IntervalKind)] = &[
            $(($bname, Attribute::$battr, IntervalKind::$bkind),)*
            $(($sname, Attribute::$sattr, IntervalKind::$skind),)*
        ];

        impl Criterion {
            $(
                #[doc = concat!("Creates the `-", $bname, "` criterion.")]
                pub fn $bfn(a: f64, b: f64) -> Criterion {
                    Criterion::interval($bname, Attribute::$battr, IntervalKind::$bkind, a, b)
                }
            )*
            $(
                #[doc = concat!("Creates the `-", $sname, "` criterion.")]
                pub fn $sfn(a: f64) -> Criterion {
                    Criterion::interval($sname, Attribute::$sattr, IntervalKind::$skind, a, 0.)
                }
            )*
        }
    };
}

intervals! {
    between keep_x => "keep_x", X, KeepHalfOpen;
    between drop_x => "drop_x", X, DropHalfOpen;
    between keep_y => "keep_y", Y, KeepHalfOpen;
    between drop_y => "drop_y", Y, DropHalfOpen;
    between keep_z => "keep_z", Z, KeepHalfOpen;
    between drop_z => "drop_z", Z, DropHalfOpen;
    between keep_raw_x => "keep_X", RawX, KeepHalfOpen;
    between drop_raw_x => "drop_X", RawX, DropHalfOpen;
    between keep_raw_y => "keep_Y", RawY, KeepHalfOpen;
    between drop_raw_y => "drop_Y", RawY, DropHalfOpen;
    between keep_raw_z => "keep_Z", RawZ, KeepHalfOpen;
    between drop_raw_z => "drop_Z", RawZ, DropHalfOpen;
    between keep_intensity => "keep_intensity", Intensity, KeepInclusive;
    between drop_intensity_between => "drop_intensity_between", Intensity, DropInclusive;
    between keep_scan_angle => "keep_scan_angle", ScanAngle, KeepInclusive;
    between drop_scan_angle_between => "drop_scan_angle_between", ScanAngle, DropInclusive;
    between keep_user_data_between => "keep_user_data_between", UserData, KeepInclusive;
    between drop_user_data_between => "drop_user_data_between", UserData, DropInclusive;
    between keep_point_source_between => "keep_point_source_between", PointSource, KeepInclusive;
    between drop_point_source_between => "drop_point_source_between", PointSource, DropInclusive;
    between keep_gps_time => "keep_gps_time", GpsTime, KeepInclusive;
    between drop_gps_time_between => "drop_gps_time_between", GpsTime, DropInclusive;
    between keep_rgb_red => "keep_RGB_red", Red, KeepInclusive;
    between drop_rgb_red => "drop_RGB_red", Red, DropInclusive;
    between keep_rgb_green => "keep_RGB_green", Green, KeepInclusive;
    between drop_rgb_green => "drop_RGB_green", Green, DropInclusive;
    between keep_rgb_blue => "keep_RGB_blue", Blue, KeepInclusive;
    between drop_rgb_blue => "drop_RGB_blue", Blue, DropInclusive;
    between keep_rgb_nir => "keep_RGB_nir", Nir, KeepInclusive;
    between drop_rgb_nir => "drop_RGB_nir", Nir, DropInclusive;
    single drop_x_below => "drop_x_below", X, Below;
    single drop_x_above => "drop_x_above", X, Above;
    single drop_y_below => "drop_y_below", Y, Below;
    single drop_y_above => "drop_y_above", Y, Above;
    single drop_z_below => "drop_z_below", Z, Below;
    single drop_z_above => "drop_z_above", Z, Above;
    single drop_raw_x_below => "drop_X_below", RawX, Below;
    single drop_raw_x_above => "drop_X_above", RawX, Above;
    single drop_raw_y_below => "drop_Y_below", RawY, Below;
    single drop_raw_y_above => "drop_Y_above", RawY, Above;
    single drop_raw_z_below => "drop_Z_below", RawZ, Below;
    single drop_raw_z_above => "drop_Z_above", RawZ, Above;
    single drop_intensity_below => "drop_intensity_below", Intensity, Below;
    single drop_intensity_above => "drop_intensity_above", Intensity, Above;
    single drop_scan_angle_below => "drop_scan_angle_below", ScanAngle, Below;
    single drop_scan_angle_above => "drop_scan_angle_above", ScanAngle, Above;
    single drop_abs_scan_angle_below => "drop_abs_scan_angle_below", AbsScanAngle, Below;
    single drop_abs_scan_angle_above => "drop_abs_scan_angle_above", AbsScanAngle, Above;
    single keep_user_data => "keep_user_data", UserData, NotEqual;
    single drop_user_data => "drop_user_data", UserData, Equal;
    single drop_user_data_below => "drop_user_data_below", UserData, Below;
    single drop_user_data_above => "drop_user_data_above", UserData, Above;
    single keep_point_source => "keep_point_source", PointSource, NotEqual;
    single drop_point_source => "drop_point_source", PointSource, Equal;
    single drop_point_source_below => "drop_point_source_below", PointSource, Below;
    single drop_point_source_above => "drop_point_source_above", PointSource, Above;
    single drop_gps_time_below => "drop_gps_time_below", GpsTime, Below;
    single drop_gps_time_above => "drop_gps_time_above", GpsTime, Above;
    single keep_scanner_channel => "keep_scanner_channel", ScannerChannel, NotEqual;
    single drop_scanner_channel => "drop_scanner_channel", ScannerChannel, Equal;
    single keep_wavepacket => "keep_wavepacket", WavepacketIndex, NotEqual;
    single drop_wavepacket => "drop_wavepacket", WavepacketIndex, Equal;
}

impl Criterion {
    fn interval(
        name: &'static str,
        attribute: Attribute,
        kind: IntervalKind,
        a: f64,
        b: f64,
    ) -> Criterion {
        Criterion {
            kind: Kind::Interval {
                name,
                attribute,
                kind,
                a,
                b,
            },
        }
    }

    /// Creates an interval criterion from its option name, e.g. `"drop_z_below"`.
    ///
    /// Single-valued options ignore `b`. Returns `None` if the name is not an interval option.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasstream::filter::Criterion;
    /// assert!(Criterion::from_interval_name("keep_intensity", 10., 20.).is_some());
    /// assert!(Criterion::from_interval_name("keep_tile", 0., 0.).is_none());
    /// ```
    pub fn from_interval_name(name: &str, a: f64, b: f64) -> Option<Criterion> {
        INTERVALS
            .iter()
            .find(|(n, _, _)| *n == name)
            .map(|&(name, attribute, kind)| Criterion::interval(name, attribute, kind, a, b))
    }

    /// Keeps points inside the square tile with lower left corner `(ll_x, ll_y)`.
    ///
    /// Upper bounds are exclusive.
    pub fn keep_tile(ll_x: f64, ll_y: f64, size: f64) -> Criterion {
        Criterion {
            kind: Kind::Tile { ll_x, ll_y, size },
        }
    }

    /// Keeps points strictly inside the circle.
    pub fn keep_circle(x: f64, y: f64, radius: f64) -> Criterion {
        Criterion {
            kind: Kind::Circle { x, y, radius },
        }
    }

    /// Keeps points inside the rectangle, upper bounds exclusive.
    pub fn keep_xy(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Criterion {
        Criterion::rectangle(true, min_x, min_y, max_x, max_y)
    }

    /// Drops points inside the rectangle, upper bounds exclusive.
    pub fn drop_xy(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Criterion {
        Criterion::rectangle(false, min_x, min_y, max_x, max_y)
    }

    fn rectangle(keep: bool, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Criterion {
        Criterion {
            kind: Kind::Rectangle {
                keep,
                min_x,
                min_y,
                max_x,
                max_y,
            },
        }
    }

    /// Keeps points inside the box, upper bounds exclusive.
    pub fn keep_xyz(min: Vector<f64>, max: Vector<f64>) -> Criterion {
        Criterion {
            kind: Kind::Box {
                keep: true,
                min,
                max,
            },
        }
    }

    /// Drops points inside the box, upper bounds exclusive.
    pub fn drop_xyz(min: Vector<f64>, max: Vector<f64>) -> Criterion {
        Criterion {
            kind: Kind::Box {
                keep: false,
                min,
                max,
            },
        }
    }

    /// Keeps or drops a class of returns.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasstream::{Point, filter::{Criterion, ReturnClass}};
    /// let mut criterion = Criterion::returns(ReturnClass::KeepFirstOfMany);
    /// let single = Point::default();
    /// assert!(criterion.filter(&single));
    /// ```
    pub fn returns(class: ReturnClass) -> Criterion {
        Criterion {
            kind: Kind::Return(class),
        }
    }

    /// Keeps points whose return number is listed. Return numbers above 15 are ignored.
    pub fn keep_returns(returns: &[u8]) -> Criterion {
        Criterion::return_mask(true, mask16(returns))
    }

    /// Drops points whose return number is listed. Return numbers above 15 are ignored.
    pub fn drop_returns(returns: &[u8]) -> Criterion {
        Criterion::return_mask(false, mask16(returns))
    }

    pub(crate) fn return_mask(keep: bool, bits: u16) -> Criterion {
        Criterion {
            kind: Kind::ReturnMask {
                keep,
                drop_mask: if keep { !bits } else { bits },
            },
        }
    }

    /// Keeps points whose number of returns is listed.
    pub fn keep_number_of_returns(numbers: &[u8]) -> Criterion {
        Criterion::number_of_returns_mask(true, mask16(numbers))
    }

    /// Drops points whose number of returns is listed.
    pub fn drop_number_of_returns(numbers: &[u8]) -> Criterion {
        Criterion::number_of_returns_mask(false, mask16(numbers))
    }

    pub(crate) fn number_of_returns_mask(keep: bool, bits: u16) -> Criterion {
        Criterion {
            kind: Kind::NumberOfReturnsMask {
                keep,
                drop_mask: if keep { !bits } else { bits },
            },
        }
    }

    /// Keeps points with one of the listed classifications.
    ///
    /// Classifications above 31 switch to the extended mask.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasstream::{Point, filter::Criterion};
    /// let mut criterion = Criterion::keep_classes(&[2, 9]);
    /// let mut point = Point::default();
    /// point.classification = 2;
    /// assert!(!criterion.filter(&point));
    /// point.classification = 3;
    /// assert!(criterion.filter(&point));
    /// ```
    pub fn keep_classes(classes: &[u8]) -> Criterion {
        Criterion::class_mask(true, mask256(classes), false)
    }

    /// Drops points with one of the listed classifications.
    pub fn drop_classes(classes: &[u8]) -> Criterion {
        Criterion::class_mask(false, mask256(classes), false)
    }

    /// Keeps points with one of the listed classifications, always using the extended mask.
    pub fn keep_extended_classes(classes: &[u8]) -> Criterion {
        Criterion::class_mask(true, mask256(classes), true)
    }

    /// Drops points with one of the listed classifications, always using the extended mask.
    pub fn drop_extended_classes(classes: &[u8]) -> Criterion {
        Criterion::class_mask(false, mask256(classes), true)
    }

    pub(crate) fn class_mask(keep: bool, bits: [u32; 8], extended: bool) -> Criterion {
        let kind = if extended || bits[1..].iter().any(|&word| word != 0) {
            Kind::ExtendedClass {
                keep,
                drop_mask: if keep { bits.map(|word| !word) } else { bits },
            }
        } else {
            Kind::Class {
                keep,
                drop_mask: if keep { !bits[0] } else { bits[0] },
            }
        };
        Criterion { kind }
    }

    /// Keeps points with the flag set.
    pub fn keep_flag(flag: Flag) -> Criterion {
        Criterion {
            kind: Kind::Flag { flag, keep: true },
        }
    }

    /// Drops points with the flag set.
    pub fn drop_flag(flag: Flag) -> Criterion {
        Criterion {
            kind: Kind::Flag { flag, keep: false },
        }
    }

    /// Keeps only points whose scan direction differs from the previous point's.
    ///
    /// The first point is dropped, since there's nothing to compare it to.
    pub fn keep_scan_direction_change() -> Criterion {
        Criterion {
            kind: Kind::ScanDirectionChange { previous: None },
        }
    }

    /// Keeps every `n`th point, starting with the `n`th.
    pub fn keep_every_nth(n: u32) -> Criterion {
        Criterion {
            kind: Kind::EveryNth { n, counter: 1 },
        }
    }

    /// Keeps a pseudo-random fraction of the points.
    ///
    /// The sequence of decisions only depends on `seed`.
    pub fn keep_random_fraction(fraction: f64, seed: u64) -> Criterion {
        Criterion {
            kind: Kind::RandomFraction {
                fraction,
                initial_seed: seed,
                seed,
            },
        }
    }

    /// Keeps the first point in each square grid cell.
    pub fn thin_with_grid(spacing: f64) -> Criterion {
        Criterion {
            kind: Kind::ThinWithGrid {
                spacing,
                cells: HashSet::new(),
            },
        }
    }

    /// Keeps the first point in each gps time bucket, plus later points with the same time.
    pub fn thin_with_time(spacing: f64) -> Criterion {
        Criterion {
            kind: Kind::ThinWithTime {
                spacing,
                cells: HashMap::new(),
            },
        }
    }

    /// Drops points that both criteria drop.
    pub fn and(a: Criterion, b: Criterion) -> Criterion {
        Criterion {
            kind: Kind::And(Box::new(a), Box::new(b)),
        }
    }

    /// Drops points that either criterion drops.
    pub fn or(a: Criterion, b: Criterion) -> Criterion {
        Criterion {
            kind: Kind::Or(Box::new(a), Box::new(b)),
        }
    }

    /// Returns the option name of this criterion, without the leading dash.
    pub fn name(&self) -> &'static str {
        match &self.kind {
            Kind::Interval { name, .. } => name,
            Kind::Tile { .. } => "keep_tile",
            Kind::Circle { .. } => "keep_circle",
            Kind::Rectangle { keep: true, .. } => "keep_xy",
            Kind::Rectangle { keep: false, .. } => "drop_xy",
            Kind::Box { keep: true, .. } => "keep_xyz",
            Kind::Box { keep: false, .. } => "drop_xyz",
            Kind::Return(class) => class.name(),
            Kind::ReturnMask { keep: true, .. } => "keep_return",
            Kind::ReturnMask { keep: false, .. } => "drop_return",
            Kind::NumberOfReturnsMask { keep: true, .. } => "keep_number_of_returns",
            Kind::NumberOfReturnsMask { keep: false, .. } => "drop_number_of_returns",
            Kind::Class { keep: true, .. } => "keep_class",
            Kind::Class { keep: false, .. } => "drop_class",
            Kind::ExtendedClass { keep: true, .. } => "keep_extended_class",
            Kind::ExtendedClass { keep: false, .. } => "drop_extended_class",
            Kind::Flag { flag, keep } => flag.name(*keep),
            Kind::ScanDirectionChange { .. } => "keep_scan_direction_change",
            Kind::EveryNth { .. } => "keep_every_nth",
            Kind::RandomFraction { .. } => "keep_random_fraction",
            Kind::ThinWithGrid { .. } => "thin_with_grid",
            Kind::ThinWithTime { .. } => "thin_with_time",
            Kind::And(..) => "filter_and",
            Kind::Or(..) => "filter_or",
        }
    }

    /// Returns true if the point should be dropped.
    pub fn filter(&mut self, point: &Point) -> bool {
        match &mut self.kind {
            Kind::Interval {
                attribute, kind, a, b, ..
            } => kind.drops(attribute.value(point), *a, *b),
            Kind::Tile { ll_x, ll_y, size } => {
                !point.inside_tile(*ll_x, *ll_y, *ll_x + *size, *ll_y + *size)
            }
            Kind::Circle { x, y, radius } => !point.inside_circle(*x, *y, *radius * *radius),
            Kind::Rectangle {
                keep,
                min_x,
                min_y,
                max_x,
                max_y,
            } => point.inside_rectangle(*min_x, *min_y, *max_x, *max_y) != *keep,
            Kind::Box { keep, min, max } => point.inside_box(*min, *max) != *keep,
            Kind::Return(class) => class.drops(point.return_number, point.number_of_returns),
            Kind::ReturnMask { drop_mask, .. } => *drop_mask & bit16(point.return_number) != 0,
            Kind::NumberOfReturnsMask { drop_mask, .. } => {
                *drop_mask & bit16(point.number_of_returns) != 0
            }
            Kind::Class { keep, drop_mask } => {
                if point.classification > 31 {
                    *keep
                } else {
                    *drop_mask & (1u32 << point.classification) != 0
                }
            }
            Kind::ExtendedClass { drop_mask, .. } => {
                let class = usize::from(point.classification);
                drop_mask[class / 32] & (1u32 << (class % 32)) != 0
            }
            Kind::Flag { flag, keep } => flag.is_set(point) != *keep,
            Kind::ScanDirectionChange { previous } => match previous.replace(point.scan_direction)
            {
                Some(direction) => direction == point.scan_direction,
                None => true,
            },
            Kind::EveryNth { n, counter } => {
                if counter == n {
                    *counter = 1;
                    false
                } else {
                    *counter += 1;
                    true
                }
            }
            Kind::RandomFraction { fraction, seed, .. } => {
                let draw = StdRng::seed_from_u64(*seed).next_u32();
                *seed = u64::from(draw);
                f64::from(draw) / f64::from(u32::MAX) > *fraction
            }
            Kind::ThinWithGrid { spacing, cells } => {
                let cell = (
                    (point.x() / *spacing).floor() as i64,
                    (point.y() / *spacing).floor() as i64,
                );
                !cells.insert(cell)
            }
            Kind::ThinWithTime { spacing, cells } => {
                let gps_time = point.gps_time_or_zero();
                match cells.entry((gps_time / *spacing).floor() as i64) {
                    Entry::Occupied(entry) => *entry.get() != gps_time,
                    Entry::Vacant(entry) => {
                        let _ = entry.insert(gps_time);
                        false
                    }
                }
            }
            Kind::And(a, b) => a.filter(point) && b.filter(point),
            Kind::Or(a, b) => a.filter(point) || b.filter(point),
        }
    }

    /// Clears any per-stream state.
    pub fn reset(&mut self) {
        match &mut self.kind {
            Kind::ScanDirectionChange { previous } => *previous = None,
            Kind::EveryNth { counter, .. } => *counter = 1,
            Kind::RandomFraction {
                initial_seed, seed, ..
            } => *seed = *initial_seed,
            Kind::ThinWithGrid { cells, .. } => cells.clear(),
            Kind::ThinWithTime { cells, .. } => cells.clear(),
            Kind::And(a, b) | Kind::Or(a, b) => {
                a.reset();
                b.reset();
            }
            _ => {}
        }
    }

    /// Returns the [selective] bits of the fields this criterion looks at.
    pub fn decompress_selective(&self) -> u32 {
        match &self.kind {
            Kind::Interval { attribute, .. } => attribute.decompress_selective(),
            Kind::Tile { .. }
            | Kind::Circle { .. }
            | Kind::Rectangle { .. }
            | Kind::Return(_)
            | Kind::ReturnMask { .. }
            | Kind::NumberOfReturnsMask { .. }
            | Kind::ThinWithGrid { .. }
            | Kind::EveryNth { .. }
            | Kind::RandomFraction { .. } => selective::CHANNEL_RETURNS_XY,
            Kind::Box { .. } => selective::CHANNEL_RETURNS_XY | selective::Z,
            Kind::Class { .. } | Kind::ExtendedClass { .. } => selective::CLASSIFICATION,
            Kind::Flag { .. } | Kind::ScanDirectionChange { .. } => selective::FLAGS,
            Kind::ThinWithTime { .. } => selective::GPS_TIME,
            Kind::And(a, b) | Kind::Or(a, b) => a.decompress_selective() | b.decompress_selective(),
        }
    }

    /// Renders the command tokens that recreate this criterion.
    ///
    /// # Examples
    ///
    /// ```
    /// use lasstream::filter::Criterion;
    /// let criterion = Criterion::and(Criterion::drop_z_below(1.5), Criterion::keep_classes(&[2]));
    /// assert_eq!("-drop_z_below 1.5 -keep_class 2 -filter_and", criterion.command());
    /// ```
    pub fn command(&self) -> String {
        let name = self.name();
        match &self.kind {
            Kind::Interval { kind, a, b, .. } => {
                if kind.is_between() {
                    format!("-{} {} {}", name, a, b)
                } else {
                    format!("-{} {}", name, a)
                }
            }
            Kind::Tile { ll_x, ll_y, size } => format!("-{} {} {} {}", name, ll_x, ll_y, size),
            Kind::Circle { x, y, radius } => format!("-{} {} {} {}", name, x, y, radius),
            Kind::Rectangle {
                min_x,
                min_y,
                max_x,
                max_y,
                ..
            } => format!("-{} {} {} {} {}", name, min_x, min_y, max_x, max_y),
            Kind::Box { min, max, .. } => format!(
                "-{} {} {} {} {} {} {}",
                name, min.x, min.y, min.z, max.x, max.y, max.z
            ),
            Kind::ReturnMask { keep, drop_mask } | Kind::NumberOfReturnsMask { keep, drop_mask } => {
                let bits = if *keep { !*drop_mask } else { *drop_mask };
                with_values(name, (0..16u8).filter(|&n| bits & bit16(n) != 0))
            }
            Kind::Class { keep, drop_mask } => {
                let bits = if *keep { !*drop_mask } else { *drop_mask };
                with_values(name, (0..32u32).filter(|&n| bits & (1u32 << n) != 0))
            }
            Kind::ExtendedClass { keep, drop_mask } => with_values(
                name,
                (0..256usize).filter(|&n| {
                    let word = if *keep {
                        !drop_mask[n / 32]
                    } else {
                        drop_mask[n / 32]
                    };
                    word & (1u32 << (n % 32)) != 0
                }),
            ),
            Kind::EveryNth { n, .. } => format!("-{} {}", name, n),
            Kind::RandomFraction {
                fraction,
                initial_seed,
                ..
            } => format!("-{} {} {}", name, fraction, initial_seed),
            Kind::ThinWithGrid { spacing, .. } | Kind::ThinWithTime { spacing, .. } => {
                format!("-{} {}", name, spacing)
            }
            Kind::And(a, b) | Kind::Or(a, b) => {
                format!("{} {} -{}", a.command(), b.command(), name)
            }
            Kind::Return(_) | Kind::Flag { .. } | Kind::ScanDirectionChange { .. } => {
                format!("-{}", name)
            }
        }
    }
}

impl Attribute {
    fn value(self, point: &Point) -> f64 {
        match self {
            Attribute::X => point.x(),
            Attribute::Y => point.y(),
            Attribute::Z => point.z(),
            Attribute::RawX => f64::from(point.raw.x),
            Attribute::RawY => f64::from(point.raw.y),
            Attribute::RawZ => f64::from(point.raw.z),
            Attribute::Intensity => f64::from(point.intensity),
            Attribute::ScanAngle => f64::from(point.scan_angle_degrees()),
            Attribute::AbsScanAngle => f64::from(point.scan_angle_degrees().abs()),
            Attribute::UserData => f64::from(point.user_data),
            Attribute::PointSource => f64::from(point.point_source_id),
            Attribute::GpsTime => point.gps_time_or_zero(),
            Attribute::Red => f64::from(point.color.map(|c| c.red).unwrap_or(0)),
            Attribute::Green => f64::from(point.color.map(|c| c.green).unwrap_or(0)),
            Attribute::Blue => f64::from(point.color.map(|c| c.blue).unwrap_or(0)),
            Attribute::Nir => f64::from(point.nir.unwrap_or(0)),
            Attribute::ScannerChannel => f64::from(point.scanner_channel),
            Attribute::WavepacketIndex => f64::from(point.wave_packet_descriptor_index()),
        }
    }

    fn decompress_selective(self) -> u32 {
        match self {
            Attribute::X
            | Attribute::Y
            | Attribute::RawX
            | Attribute::RawY
            | Attribute::ScannerChannel => selective::CHANNEL_RETURNS_XY,
            Attribute::Z | Attribute::RawZ => selective::Z,
            Attribute::Intensity => selective::INTENSITY,
            Attribute::ScanAngle | Attribute::AbsScanAngle => selective::SCAN_ANGLE,
            Attribute::UserData => selective::USER_DATA,
            Attribute::PointSource => selective::POINT_SOURCE,
            Attribute::GpsTime => selective::GPS_TIME,
            Attribute::Red | Attribute::Green | Attribute::Blue => selective::RGB,
            Attribute::Nir => selective::NIR,
            Attribute::WavepacketIndex => selective::WAVEPACKET,
        }
    }
}

impl IntervalKind {
    /// Does this comparison take two bounds?
    pub fn is_between(self) -> bool {
        matches!(
            self,
            IntervalKind::KeepHalfOpen
                | IntervalKind::DropHalfOpen
                | IntervalKind::KeepInclusive
                | IntervalKind::DropInclusive
        )
    }

    fn drops(self, v: f64, a: f64, b: f64) -> bool {
        match self {
            IntervalKind::KeepHalfOpen => v < a || v >= b,
            IntervalKind::DropHalfOpen => a <= v && v < b,
            IntervalKind::KeepInclusive => v < a || b < v,
            IntervalKind::DropInclusive => a <= v && v <= b,
            IntervalKind::Below => v < a,
            IntervalKind::Above => v > a,
            IntervalKind::Equal => v == a,
            IntervalKind::NotEqual => v != a,
        }
    }
}

impl ReturnClass {
    pub(crate) const ALL: [ReturnClass; 12] = [
        ReturnClass::KeepFirst,
        ReturnClass::KeepFirstOfMany,
        ReturnClass::KeepMiddle,
        ReturnClass::KeepLast,
        ReturnClass::KeepLastOfMany,
        ReturnClass::KeepSecondLast,
        ReturnClass::DropFirst,
        ReturnClass::DropFirstOfMany,
        ReturnClass::DropMiddle,
        ReturnClass::DropLast,
        ReturnClass::DropLastOfMany,
        ReturnClass::DropSecondLast,
    ];

    /// Returns the option name.
    pub fn name(self) -> &'static str {
        match self {
            ReturnClass::KeepFirst => "keep_first",
            ReturnClass::KeepFirstOfMany => "keep_first_of_many",
            ReturnClass::KeepMiddle => "keep_middle",
            ReturnClass::KeepLast => "keep_last",
            ReturnClass::KeepLastOfMany => "keep_last_of_many",
            ReturnClass::KeepSecondLast => "keep_second_last",
            ReturnClass::DropFirst => "drop_first",
            ReturnClass::DropFirstOfMany => "drop_first_of_many",
            ReturnClass::DropMiddle => "drop_middle",
            ReturnClass::DropLast => "drop_last",
            ReturnClass::DropLastOfMany => "drop_last_of_many",
            ReturnClass::DropSecondLast => "drop_second_last",
        }
    }

    fn drops(self, return_number: u8, number_of_returns: u8) -> bool {
        let (rn, nr) = (return_number, number_of_returns);
        match self {
            ReturnClass::KeepFirst => rn > 1,
            ReturnClass::KeepFirstOfMany => nr == 1 || rn > 1,
            ReturnClass::KeepMiddle => rn == 1 || rn >= nr,
            ReturnClass::KeepLast => rn < nr,
            ReturnClass::KeepLastOfMany => nr == 1 || rn < nr,
            ReturnClass::KeepSecondLast => nr <= 1 || rn != nr - 1,
            ReturnClass::DropFirst => rn == 1,
            ReturnClass::DropFirstOfMany => nr > 1 && rn == 1,
            ReturnClass::DropMiddle => rn > 1 && rn < nr,
            ReturnClass::DropLast => rn >= nr,
            ReturnClass::DropLastOfMany => nr > 1 && rn >= nr,
            ReturnClass::DropSecondLast => nr > 1 && rn == nr - 1,
        }
    }
}

impl Flag {
    pub(crate) const ALL: [Flag; 5] = [
        Flag::Synthetic,
        Flag::KeyPoint,
        Flag::Withheld,
        Flag::Overlap,
        Flag::EdgeOfFlightLine,
    ];

    /// Returns the keep or drop option name.
    pub fn name(self, keep: bool) -> &'static str {
        match (self, keep) {
            (Flag::Synthetic, true) => "keep_synthetic",
            (Flag::Synthetic, false) => "drop_synthetic",
            (Flag::KeyPoint, true) => "keep_keypoint",
            (Flag::KeyPoint, false) => "drop_keypoint",
            (Flag::Withheld, true) => "keep_withheld",
            (Flag::Withheld, false) => "drop_withheld",
            (Flag::Overlap, true) => "keep_overlap",
            (Flag::Overlap, false) => "drop_overlap",
            (Flag::EdgeOfFlightLine, true) => "keep_edge_of_flight_line",
            (Flag::EdgeOfFlightLine, false) => "drop_edge_of_flight_line",
        }
    }

    fn is_set(self, point: &Point) -> bool {
        match self {
            Flag::Synthetic => point.is_synthetic,
            Flag::KeyPoint => point.is_key_point,
            Flag::Withheld => point.is_withheld,
            Flag::Overlap => point.is_overlap,
            Flag::EdgeOfFlightLine => point.is_edge_of_flight_line,
        }
    }
}

fn bit16(n: u8) -> u16 {
    1u16.checked_shl(u32::from(n)).unwrap_or(0)
}

fn mask16(values: &[u8]) -> u16 {
    values.iter().fold(0, |mask, &n| mask | bit16(n))
}

fn mask256(values: &[u8]) -> [u32; 8] {
    let mut mask = [0; 8];
    for &n in values {
        let n = usize::from(n);
        mask[n / 32] |= 1u32 << (n % 32);
    }
    mask
}

fn with_values<T: std::fmt::Display>(name: &str, values: impl Iterator<Item = T>) -> String {
    let mut command = format!("-{}", name);
    for value in values {
        command.push(' ');
        command.push_str(&value.to_string());
    }
    command
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::ScanDirection;

    fn point_at(x: f64) -> Point {
        let mut point = Point::default();
        point.set_x(x).unwrap();
        point
    }

    fn returns(return_number: u8, number_of_returns: u8) -> Point {
        Point {
            return_number,
            number_of_returns,
            ..Default::default()
        }
    }

    #[test]
    fn keep_and_drop_are_complements() {
        let mut keep = Criterion::keep_x(1., 2.);
        let mut drop = Criterion::drop_x(1., 2.);
        for x in [0.99, 1., 1.5, 1.99, 2., 2.01] {
            let point = point_at(x);
            let inside = (1. ..2.).contains(&x);
            assert_eq!(!inside, keep.filter(&point), "keep_x at {}", x);
            assert_eq!(inside, drop.filter(&point), "drop_x at {}", x);
        }
    }

    #[test]
    fn inclusive_ranges() {
        let mut keep = Criterion::keep_intensity(10., 20.);
        let mut point = Point::default();
        for (intensity, dropped) in [(9, true), (10, false), (20, false), (21, true)] {
            point.intensity = intensity;
            assert_eq!(dropped, keep.filter(&point));
        }
    }

    #[test]
    fn raw_coordinates() {
        let mut criterion = Criterion::drop_raw_z_below(60.);
        let mut point = Point::default();
        point.raw.z = 50;
        assert!(criterion.filter(&point));
        point.raw.z = 100;
        assert!(!criterion.filter(&point));
    }

    #[test]
    fn return_classes() {
        let single = returns(1, 1);
        let first = returns(1, 3);
        let middle = returns(2, 3);
        let last = returns(3, 3);
        let expected = [
            (ReturnClass::KeepFirst, [false, false, true, true]),
            (ReturnClass::KeepFirstOfMany, [true, false, true, true]),
            (ReturnClass::KeepMiddle, [true, true, false, true]),
            (ReturnClass::KeepLast, [false, true, true, false]),
            (ReturnClass::KeepLastOfMany, [true, true, true, false]),
            (ReturnClass::KeepSecondLast, [true, true, false, true]),
            (ReturnClass::DropFirst, [true, true, false, false]),
            (ReturnClass::DropFirstOfMany, [false, true, false, false]),
            (ReturnClass::DropMiddle, [false, false, true, false]),
            (ReturnClass::DropLast, [true, false, false, true]),
            (ReturnClass::DropLastOfMany, [false, false, false, true]),
            (ReturnClass::DropSecondLast, [false, false, true, false]),
        ];
        for (class, drops) in expected {
            let mut criterion = Criterion::returns(class);
            for (point, dropped) in [&single, &first, &middle, &last].into_iter().zip(drops) {
                assert_eq!(dropped, criterion.filter(point), "{:?} {:?}", class, point);
            }
        }
    }

    #[test]
    fn keep_mask_derives_drop_mask() {
        let criterion = Criterion::keep_classes(&[2, 9]);
        match criterion.kind {
            Kind::Class { keep, drop_mask } => {
                assert!(keep);
                assert_eq!(!0b10_0000_0100u32, drop_mask);
            }
            _ => panic!("expected a legacy class mask"),
        }
    }

    #[test]
    fn class_mask_membership() {
        let mut criterion = Criterion::keep_classes(&[2, 9]);
        let mut point = Point::default();
        for class in 0..32 {
            point.classification = class;
            assert_eq!(class != 2 && class != 9, criterion.filter(&point));
        }
        point.classification = 40;
        assert!(criterion.filter(&point));
        assert!(!Criterion::drop_classes(&[2]).filter(&point));
    }

    #[test]
    fn extended_class_mask() {
        let mut criterion = Criterion::keep_classes(&[2, 64]);
        assert_eq!("keep_extended_class", criterion.name());
        let mut point = Point::default();
        point.classification = 64;
        assert!(!criterion.filter(&point));
        point.classification = 65;
        assert!(criterion.filter(&point));
        assert_eq!("-keep_extended_class 2 64", criterion.command());
    }

    #[test]
    fn return_mask() {
        let mut criterion = Criterion::drop_returns(&[1, 2]);
        assert!(criterion.filter(&returns(2, 3)));
        assert!(!criterion.filter(&returns(3, 3)));
        assert_eq!("-drop_return 1 2", criterion.command());
    }

    #[test]
    fn flags() {
        let mut point = Point::default();
        let mut keep = Criterion::keep_flag(Flag::Withheld);
        let mut drop = Criterion::drop_flag(Flag::Withheld);
        assert!(keep.filter(&point));
        assert!(!drop.filter(&point));
        point.is_withheld = true;
        assert!(!keep.filter(&point));
        assert!(drop.filter(&point));
    }

    #[test]
    fn scan_direction_change() {
        let mut criterion = Criterion::keep_scan_direction_change();
        let mut point = Point::default();
        assert!(criterion.filter(&point));
        assert!(criterion.filter(&point));
        point.scan_direction = ScanDirection::LeftToRight;
        assert!(!criterion.filter(&point));
        assert!(criterion.filter(&point));
        criterion.reset();
        assert!(criterion.filter(&point));
    }

    #[test]
    fn every_nth() {
        let mut criterion = Criterion::keep_every_nth(3);
        let point = Point::default();
        let kept: Vec<bool> = (0..6).map(|_| !criterion.filter(&point)).collect();
        assert_eq!(vec![false, false, true, false, false, true], kept);
    }

    #[test]
    fn random_fraction_reset() {
        let mut criterion = Criterion::keep_random_fraction(0.5, 42);
        let point = Point::default();
        let first: Vec<bool> = (0..64).map(|_| criterion.filter(&point)).collect();
        criterion.reset();
        let second: Vec<bool> = (0..64).map(|_| criterion.filter(&point)).collect();
        assert_eq!(first, second);
        assert!(first.iter().any(|&d| d));
        assert!(first.iter().any(|&d| !d));
    }

    #[test]
    fn thin_with_grid() {
        let mut criterion = Criterion::thin_with_grid(1.);
        assert!(!criterion.filter(&point_at(0.5)));
        assert!(criterion.filter(&point_at(0.7)));
        assert!(!criterion.filter(&point_at(1.5)));
        criterion.reset();
        assert!(!criterion.filter(&point_at(0.7)));
    }

    #[test]
    fn thin_with_time() {
        let mut criterion = Criterion::thin_with_time(1.);
        let at = |t: f64| Point {
            gps_time: Some(t),
            ..Default::default()
        };
        assert!(!criterion.filter(&at(10.2)));
        assert!(!criterion.filter(&at(10.2)));
        assert!(criterion.filter(&at(10.5)));
        assert!(!criterion.filter(&at(11.)));
    }

    #[test]
    fn tile_and_circle() {
        let mut tile = Criterion::keep_tile(0., 0., 1.);
        assert!(!tile.filter(&point_at(0.)));
        assert!(tile.filter(&point_at(1.)));
        let mut circle = Criterion::keep_circle(0., 0., 1.);
        assert!(!circle.filter(&point_at(0.5)));
        assert!(circle.filter(&point_at(1.)));
    }

    #[test]
    fn combinators() {
        let mut and = Criterion::and(Criterion::drop_x_below(1.), Criterion::drop_z_above(0.));
        assert!(!and.filter(&point_at(0.5)));
        let mut or = Criterion::or(Criterion::drop_x_below(1.), Criterion::drop_z_above(0.));
        assert!(or.filter(&point_at(0.5)));
        assert_eq!(
            selective::Z | selective::GPS_TIME,
            Criterion::or(Criterion::drop_z_above(0.), Criterion::thin_with_time(1.))
                .decompress_selective()
        );
        assert_eq!("-drop_x_below 1 -drop_z_above 0 -filter_or", or.command());
    }

    #[test]
    fn interval_names_are_unique() {
        for (i, (name, _, _)) in INTERVALS.iter().enumerate() {
            assert!(INTERVALS[i + 1..].iter().all(|(other, _, _)| other != name));
        }
    }
}
