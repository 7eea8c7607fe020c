//! Driver boundary: result cursors, metadata, streams and native objects.
//!
//! These traits are implemented by the statement-execution layer that owns
//! the real driver. Decoders only ever see a column through [`RowCursor`].
//!
//! Native driver objects are adapted into the closed [`DriverObject`] union at
//! the point where the driver hands them over, so that nothing past this module
//! pattern-matches on foreign types.

use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, Read};

use chrono::{NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::value::Value;
use crate::error::DriverFault;

/// Result type for calls across the driver boundary.
pub type DriverResult<T> = std::result::Result<T, DriverFault>;

/// Column metadata of an executed statement's result.
///
/// Indexes are 1-based, as drivers report them.
pub trait ResultMetadata {
    /// Number of columns in the result.
    fn column_count(&self) -> DriverResult<usize>;

    /// Column label (alias if one was given, otherwise the column name).
    fn column_label(&self, index: usize) -> DriverResult<String>;

    /// Declared type code.
    fn column_type(&self, index: usize) -> DriverResult<i32>;

    /// Declared precision / display size.
    fn precision(&self, index: usize) -> DriverResult<i32>;

    /// Declared scale.
    fn scale(&self, index: usize) -> DriverResult<i32>;
}

/// Forward-only row cursor.
///
/// Every `read_*` call reads exactly one column of the current row. Nullable
/// primitive reads return the type's zero value for SQL NULL; callers consult
/// [`RowCursor::was_null`] right after the read to tell the two apart.
pub trait RowCursor {
    /// Move to the next row. Returns `false` once the result is exhausted.
    fn advance(&mut self) -> DriverResult<bool>;

    /// Whether the last value read was SQL NULL.
    fn was_null(&self) -> DriverResult<bool>;

    /// Type code of a column for the *current row*.
    ///
    /// Drivers with static typing return the declared type. Drivers whose type
    /// reporting follows the stored value (dynamic typing) return the live type.
    fn live_column_type(&self, index: usize) -> DriverResult<i32>;

    fn read_i64(&mut self, index: usize) -> DriverResult<i64>;

    fn read_f64(&mut self, index: usize) -> DriverResult<f64>;

    fn read_bool(&mut self, index: usize) -> DriverResult<bool>;

    /// Text in the driver's reported encoding, already decoded.
    fn read_text(&mut self, index: usize) -> DriverResult<Option<String>>;

    /// Raw undecoded bytes of a character or binary column.
    fn read_bytes(&mut self, index: usize) -> DriverResult<Option<Vec<u8>>>;

    fn read_decimal(&mut self, index: usize) -> DriverResult<Option<Decimal>>;

    fn read_date(&mut self, index: usize) -> DriverResult<Option<DriverDate>>;

    fn read_time(&mut self, index: usize) -> DriverResult<Option<NaiveTime>>;

    fn read_timestamp(&mut self, index: usize) -> DriverResult<Option<NaiveDateTime>>;

    /// Open a byte stream over a binary column. `None` when the value is NULL.
    fn open_binary_stream(&mut self, index: usize)
        -> DriverResult<Option<Box<dyn DriverStream + '_>>>;

    /// Open a character stream over a text column. `None` when the value is NULL.
    fn open_char_stream(&mut self, index: usize) -> DriverResult<Option<Box<dyn CharStream + '_>>>;

    /// Obtain an XML handle. `None` when the value is NULL.
    fn read_xml(&mut self, index: usize) -> DriverResult<Option<Box<dyn XmlHandle + '_>>>;

    /// Obtain the driver-native object, adapted into [`DriverObject`].
    fn read_object(&mut self, index: usize) -> DriverResult<Option<DriverObject>>;
}

/// Byte stream handed out by a driver for a large binary value.
///
/// The stream must be closed by whoever opened it, exactly once.
pub trait DriverStream: Read {
    fn close(&mut self) -> io::Result<()>;
}

/// Character stream handed out by a driver for a large text value.
pub trait CharStream {
    /// Read up to `buf.len()` characters. Returns 0 at end of stream.
    fn read_chars(&mut self, buf: &mut [char]) -> io::Result<usize>;

    fn close(&mut self) -> io::Result<()>;
}

/// Driver XML handle. Must be freed after use, even when reading failed.
pub trait XmlHandle {
    /// Text form of the document.
    fn text(&mut self) -> DriverResult<String>;

    fn free(&mut self) -> DriverResult<()>;
}

/// Calendar date as reported by the driver, before validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl DriverDate {
    pub fn new(year: i32, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }
}

/// Point of a geometric value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Interval split into calendar and clock fields.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Interval {
    pub years: i32,
    pub months: i32,
    pub days: i32,
    pub hours: i32,
    pub minutes: i32,
    pub seconds: f64,
}

/// Native driver object, adapted at the driver boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum DriverObject {
    /// Object that already maps onto a host value (boxed numbers, strings...).
    Scalar(Value),
    /// Object known only through its default text form.
    Display(String),
    Interval(Interval),
    Point(Point),
    LineSegment(Point, Point),
    Box(Point, Point),
    Path { points: Vec<Point>, open: bool },
    Polygon(Vec<Point>),
    Circle { center: Point, radius: f64 },
    /// Line `{a,b,c}` for `ax + by + c = 0`.
    Line { a: f64, b: f64, c: f64 },
    Uuid(Uuid),
    /// Store of associative text pairs.
    KeyValue(BTreeMap<String, Option<String>>),
    /// Dialect object with a type name and a text value.
    Generic {
        type_name: String,
        value: Option<String>,
    },
}

fn join_points(points: &[Point]) -> String {
    points
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Default text form of each object kind, as its driver would print it.
impl fmt::Display for DriverObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverObject::Scalar(v) => write!(f, "{}", v),
            DriverObject::Display(s) => f.write_str(s),
            DriverObject::Interval(i) => write!(
                f,
                "{} years {} mons {} days {} hours {} mins {} secs",
                i.years, i.months, i.days, i.hours, i.minutes, i.seconds
            ),
            DriverObject::Point(p) => write!(f, "{}", p),
            DriverObject::LineSegment(a, b) => write!(f, "[{},{}]", a, b),
            DriverObject::Box(a, b) => write!(f, "{},{}", a, b),
            DriverObject::Path { points, open } => {
                if *open {
                    write!(f, "[{}]", join_points(points))
                } else {
                    write!(f, "({})", join_points(points))
                }
            }
            DriverObject::Polygon(points) => write!(f, "({})", join_points(points)),
            DriverObject::Circle { center, radius } => write!(f, "<{},{}>", center, radius),
            DriverObject::Line { a, b, c } => write!(f, "{{{},{},{}}}", a, b, c),
            DriverObject::Uuid(u) => write!(f, "{}", u),
            DriverObject::KeyValue(pairs) => {
                let mut first = true;
                for (k, v) in pairs {
                    if !first {
                        f.write_str(", ")?;
                    }
                    first = false;
                    match v {
                        Some(v) => write!(f, "\"{}\"=>\"{}\"", k, v)?,
                        None => write!(f, "\"{}\"=>NULL", k)?,
                    }
                }
                Ok(())
            }
            DriverObject::Generic { value, .. } => f.write_str(value.as_deref().unwrap_or("")),
        }
    }
}
