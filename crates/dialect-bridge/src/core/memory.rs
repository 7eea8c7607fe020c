//! In-memory result cursor.
//!
//! [`MemoryCursor`] implements both [`ResultMetadata`] and [`RowCursor`] over
//! rows held in memory. It backs the CLI `decode` command (rows loaded from a
//! JSON fixture) and the crate's tests, and it counts stream closes and XML
//! frees so that resource handling can be asserted.
//!
//! Fixture format:
//!
//! ```json
//! {
//!   "dynamic_types": false,
//!   "columns": [{"label": "ID", "type_code": 4}, {"label": "NAME", "type_code": 12}],
//!   "rows": [[1, "alpha"], [2, null]]
//! }
//! ```
//!
//! Cells are JSON scalars, or single-key objects for richer values:
//! `{"hex": "CAFE"}`, `{"decimal": "1.50"}`, `{"date": "2024-02-29"}`,
//! `{"time": "10:30:00"}`, `{"timestamp": "2024-02-29 10:30:00"}`,
//! `{"xml": "<a/>"}`, `{"uuid": "..."}`, `{"interval": {"days": 2}}`,
//! `{"point": [1, 2]}`, `{"hstore": {"k": "v"}}`, `{"object": "text"}`,
//! `{"fault": "message"}`.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::io::{self, Read};

use chrono::{NaiveDateTime, NaiveTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use super::cursor::{
    CharStream, DriverDate, DriverObject, DriverResult, DriverStream, Interval, Point,
    ResultMetadata, RowCursor, XmlHandle,
};
use super::types::{ColumnDescriptor, SqlType};
use super::value::Value;
use crate::error::{BridgeError, DriverFault, Result};

const TIME_FORMAT: &str = "%H:%M:%S%.f";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// One stored cell.
#[derive(Debug, Clone, PartialEq)]
pub enum MemoryCell {
    Null,
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    Bytes(Vec<u8>),
    Decimal(Decimal),
    Date(DriverDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    /// XML document; `None` makes text extraction fail.
    Xml(Option<String>),
    Object(DriverObject),
    /// Every read of this cell fails with the message.
    Fault(String),
    /// Binary stream that fails after `after` bytes.
    FailingStream { after: usize },
    /// Character stream that fails after `after` characters.
    FailingCharStream { after: usize },
}

impl MemoryCell {
    /// Parse a fixture cell.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        use serde_json::Value as J;

        let cell = match value {
            J::Null => MemoryCell::Null,
            J::Bool(b) => MemoryCell::Bool(*b),
            J::Number(n) => match n.as_i64() {
                Some(i) => MemoryCell::Int(i),
                None => MemoryCell::Float(n.as_f64().unwrap_or_default()),
            },
            J::String(s) => MemoryCell::Text(s.clone()),
            J::Object(map) if map.len() == 1 => {
                let (key, inner) = map.iter().next().ok_or_else(|| bad_cell(value))?;
                parse_tagged(key, inner).ok_or_else(|| bad_cell(value))?
            }
            _ => return Err(bad_cell(value)),
        };
        Ok(cell)
    }

    /// Type code a dynamically typed driver would report for this cell.
    fn live_type(&self) -> Option<SqlType> {
        let t = match self {
            MemoryCell::Null => SqlType::Null,
            MemoryCell::Int(_) => SqlType::Integer,
            MemoryCell::Float(_) => SqlType::Double,
            MemoryCell::Bool(_) => SqlType::Boolean,
            MemoryCell::Text(_) => SqlType::VarChar,
            MemoryCell::FailingCharStream { .. } => SqlType::Clob,
            MemoryCell::Bytes(_) | MemoryCell::FailingStream { .. } => SqlType::Blob,
            MemoryCell::Decimal(_) => SqlType::Numeric,
            MemoryCell::Date(_) => SqlType::Date,
            MemoryCell::Time(_) => SqlType::Time,
            MemoryCell::Timestamp(_) => SqlType::Timestamp,
            _ => return None,
        };
        Some(t)
    }
}

fn bad_cell(value: &serde_json::Value) -> BridgeError {
    BridgeError::Config(format!("Unrecognized fixture cell: {}", value))
}

fn parse_tagged(key: &str, inner: &serde_json::Value) -> Option<MemoryCell> {
    let text = inner.as_str();
    let cell = match key {
        "hex" => MemoryCell::Bytes(hex::decode(text?).ok()?),
        "decimal" => MemoryCell::Decimal(text?.parse().ok()?),
        "date" => MemoryCell::Date(parse_driver_date(text?)?),
        "time" => MemoryCell::Time(NaiveTime::parse_from_str(text?, TIME_FORMAT).ok()?),
        "timestamp" => {
            MemoryCell::Timestamp(NaiveDateTime::parse_from_str(text?, TIMESTAMP_FORMAT).ok()?)
        }
        "xml" => MemoryCell::Xml(text.map(str::to_string)),
        "fault" => MemoryCell::Fault(text?.to_string()),
        "uuid" => MemoryCell::Object(DriverObject::Uuid(Uuid::parse_str(text?).ok()?)),
        "object" => MemoryCell::Object(DriverObject::Display(text?.to_string())),
        "point" => {
            let xy = inner.as_array()?;
            MemoryCell::Object(DriverObject::Point(Point::new(
                xy.first()?.as_f64()?,
                xy.get(1)?.as_f64()?,
            )))
        }
        "interval" => {
            let fields = inner.as_object()?;
            let int = |name: &str| fields.get(name).and_then(|v| v.as_i64()).unwrap_or(0) as i32;
            MemoryCell::Object(DriverObject::Interval(Interval {
                years: int("years"),
                months: int("months"),
                days: int("days"),
                hours: int("hours"),
                minutes: int("minutes"),
                seconds: fields.get("seconds").and_then(|v| v.as_f64()).unwrap_or(0.0),
            }))
        }
        "hstore" => {
            let pairs = inner
                .as_object()?
                .iter()
                .map(|(k, v)| (k.clone(), v.as_str().map(str::to_string)))
                .collect::<BTreeMap<_, _>>();
            MemoryCell::Object(DriverObject::KeyValue(pairs))
        }
        _ => return None,
    };
    Some(cell)
}

fn parse_driver_date(text: &str) -> Option<DriverDate> {
    let mut parts = text.trim().splitn(3, '-');
    let year = parts.next()?.parse().ok()?;
    let month = parts.next()?.parse().ok()?;
    let day = parts.next()?.parse().ok()?;
    Some(DriverDate::new(year, month, day))
}

/// Column declaration of a fixture.
#[derive(Debug, Clone, Deserialize)]
pub struct FixtureColumn {
    pub label: String,
    pub type_code: i32,
    #[serde(default)]
    pub precision: i32,
    #[serde(default)]
    pub scale: i32,
}

/// JSON fixture describing a result.
#[derive(Debug, Clone, Deserialize)]
pub struct Fixture {
    /// Report per-cell types from `live_column_type`.
    #[serde(default)]
    pub dynamic_types: bool,
    pub columns: Vec<FixtureColumn>,
    #[serde(default)]
    pub rows: Vec<Vec<serde_json::Value>>,
}

impl Fixture {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Build a cursor over the fixture rows.
    pub fn into_cursor(self) -> Result<MemoryCursor> {
        let columns = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| {
                ColumnDescriptor::new(
                    c.label.clone(),
                    SqlType::from_code(c.type_code),
                    c.precision,
                    c.scale,
                    i + 1,
                )
            })
            .collect::<Vec<_>>();

        let mut rows = Vec::with_capacity(self.rows.len());
        for (n, row) in self.rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(BridgeError::Config(format!(
                    "Fixture row {} has {} cells, expected {}",
                    n + 1,
                    row.len(),
                    columns.len()
                )));
            }
            rows.push(row.iter().map(MemoryCell::from_json).collect::<Result<Vec<_>>>()?);
        }

        let cursor = MemoryCursor::new(columns, rows);
        Ok(if self.dynamic_types {
            cursor.with_dynamic_types()
        } else {
            cursor
        })
    }
}

/// Cursor over rows held in memory.
#[derive(Debug)]
pub struct MemoryCursor {
    columns: Vec<ColumnDescriptor>,
    rows: Vec<Vec<MemoryCell>>,
    position: Option<usize>,
    last_null: bool,
    dynamic_types: bool,
    was_null_calls: Cell<usize>,
    stream_closes: Cell<usize>,
    xml_frees: Cell<usize>,
}

impl MemoryCursor {
    pub fn new(columns: Vec<ColumnDescriptor>, rows: Vec<Vec<MemoryCell>>) -> Self {
        Self {
            columns,
            rows,
            position: None,
            last_null: false,
            dynamic_types: false,
            was_null_calls: Cell::new(0),
            stream_closes: Cell::new(0),
            xml_frees: Cell::new(0),
        }
    }

    /// One column, one row per cell.
    pub fn single_column(label: &str, sql_type: SqlType, cells: Vec<MemoryCell>) -> Self {
        let columns = vec![ColumnDescriptor::new(label, sql_type, 0, 0, 1)];
        Self::new(columns, cells.into_iter().map(|c| vec![c]).collect())
    }

    /// Report the stored value's type from `live_column_type`.
    pub fn with_dynamic_types(mut self) -> Self {
        self.dynamic_types = true;
        self
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    /// Rewind to before the first row.
    pub fn rewind(&mut self) {
        self.position = None;
    }

    pub fn was_null_calls(&self) -> usize {
        self.was_null_calls.get()
    }

    pub fn stream_closes(&self) -> usize {
        self.stream_closes.get()
    }

    pub fn xml_frees(&self) -> usize {
        self.xml_frees.get()
    }

    fn column(&self, index: usize) -> DriverResult<&ColumnDescriptor> {
        index
            .checked_sub(1)
            .and_then(|i| self.columns.get(i))
            .ok_or_else(|| DriverFault::new(format!("Column index {} out of range", index)))
    }

    fn cell(&self, index: usize) -> DriverResult<&MemoryCell> {
        let row = self
            .position
            .and_then(|p| self.rows.get(p))
            .ok_or_else(|| DriverFault::new("Cursor is not positioned on a row"))?;
        let cell = index
            .checked_sub(1)
            .and_then(|i| row.get(i))
            .ok_or_else(|| DriverFault::new(format!("Column index {} out of range", index)))?;
        if let MemoryCell::Fault(message) = cell {
            return Err(DriverFault::new(message.clone()));
        }
        Ok(cell)
    }

    /// Fetch a cell and record whether it is NULL.
    fn take(&mut self, index: usize) -> DriverResult<MemoryCell> {
        let cell = self.cell(index)?.clone();
        self.last_null = cell == MemoryCell::Null;
        Ok(cell)
    }
}

fn mismatch(cell: &MemoryCell, wanted: &str) -> DriverFault {
    DriverFault::new(format!("Cannot read {:?} as {}", cell, wanted))
}

impl ResultMetadata for MemoryCursor {
    fn column_count(&self) -> DriverResult<usize> {
        Ok(self.columns.len())
    }

    fn column_label(&self, index: usize) -> DriverResult<String> {
        Ok(self.column(index)?.label.clone())
    }

    fn column_type(&self, index: usize) -> DriverResult<i32> {
        Ok(self.column(index)?.sql_type.code())
    }

    fn precision(&self, index: usize) -> DriverResult<i32> {
        Ok(self.column(index)?.precision)
    }

    fn scale(&self, index: usize) -> DriverResult<i32> {
        Ok(self.column(index)?.scale)
    }
}

impl RowCursor for MemoryCursor {
    fn advance(&mut self) -> DriverResult<bool> {
        let next = self.position.map_or(0, |p| p + 1);
        if next < self.rows.len() {
            self.position = Some(next);
            Ok(true)
        } else {
            self.position = None;
            Ok(false)
        }
    }

    fn was_null(&self) -> DriverResult<bool> {
        self.was_null_calls.set(self.was_null_calls.get() + 1);
        Ok(self.last_null)
    }

    fn live_column_type(&self, index: usize) -> DriverResult<i32> {
        let declared = self.column(index)?.sql_type;
        if !self.dynamic_types {
            return Ok(declared.code());
        }
        Ok(self.cell(index)?.live_type().unwrap_or(declared).code())
    }

    fn read_i64(&mut self, index: usize) -> DriverResult<i64> {
        match self.take(index)? {
            MemoryCell::Null => Ok(0),
            MemoryCell::Int(v) => Ok(v),
            MemoryCell::Bool(b) => Ok(i64::from(b)),
            MemoryCell::Float(f) => Ok(f as i64),
            MemoryCell::Decimal(d) => d.to_i64().ok_or_else(|| mismatch(&MemoryCell::Decimal(d), "i64")),
            MemoryCell::Text(s) => s.trim().parse().map_err(|_| mismatch(&MemoryCell::Text(s.clone()), "i64")),
            other => Err(mismatch(&other, "i64")),
        }
    }

    fn read_f64(&mut self, index: usize) -> DriverResult<f64> {
        match self.take(index)? {
            MemoryCell::Null => Ok(0.0),
            MemoryCell::Float(f) => Ok(f),
            MemoryCell::Int(v) => Ok(v as f64),
            MemoryCell::Decimal(d) => d.to_f64().ok_or_else(|| mismatch(&MemoryCell::Decimal(d), "f64")),
            MemoryCell::Text(s) => s.trim().parse().map_err(|_| mismatch(&MemoryCell::Text(s.clone()), "f64")),
            other => Err(mismatch(&other, "f64")),
        }
    }

    fn read_bool(&mut self, index: usize) -> DriverResult<bool> {
        match self.take(index)? {
            MemoryCell::Null => Ok(false),
            MemoryCell::Bool(b) => Ok(b),
            MemoryCell::Int(v) => Ok(v != 0),
            MemoryCell::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "1" | "t" | "true" | "y" | "yes" => Ok(true),
                "0" | "f" | "false" | "n" | "no" => Ok(false),
                _ => Err(mismatch(&MemoryCell::Text(s.clone()), "bool")),
            },
            other => Err(mismatch(&other, "bool")),
        }
    }

    fn read_text(&mut self, index: usize) -> DriverResult<Option<String>> {
        let text = match self.take(index)? {
            MemoryCell::Null => return Ok(None),
            MemoryCell::Text(s) => s,
            MemoryCell::Int(v) => v.to_string(),
            MemoryCell::Float(f) => f.to_string(),
            MemoryCell::Bool(b) => b.to_string(),
            MemoryCell::Decimal(d) => d.to_string(),
            MemoryCell::Time(t) => t.format(TIME_FORMAT).to_string(),
            MemoryCell::Timestamp(ts) => ts.format(TIMESTAMP_FORMAT).to_string(),
            MemoryCell::Date(d) => format!("{:04}-{:02}-{:02}", d.year, d.month, d.day),
            MemoryCell::Xml(Some(s)) => s,
            MemoryCell::Object(obj) => obj.to_string(),
            MemoryCell::Bytes(b) => String::from_utf8(b).map_err(|e| DriverFault::new(e.to_string()))?,
            other => return Err(mismatch(&other, "text")),
        };
        Ok(Some(text))
    }

    fn read_bytes(&mut self, index: usize) -> DriverResult<Option<Vec<u8>>> {
        match self.take(index)? {
            MemoryCell::Null => Ok(None),
            MemoryCell::Bytes(b) => Ok(Some(b)),
            MemoryCell::Text(s) => Ok(Some(s.into_bytes())),
            other => Err(mismatch(&other, "bytes")),
        }
    }

    fn read_decimal(&mut self, index: usize) -> DriverResult<Option<Decimal>> {
        match self.take(index)? {
            MemoryCell::Null => Ok(None),
            MemoryCell::Decimal(d) => Ok(Some(d)),
            MemoryCell::Int(v) => Ok(Some(Decimal::from(v))),
            MemoryCell::Float(f) => Decimal::try_from(f)
                .map(Some)
                .map_err(|e| DriverFault::new(e.to_string())),
            MemoryCell::Text(s) => s
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| mismatch(&MemoryCell::Text(s.clone()), "decimal")),
            other => Err(mismatch(&other, "decimal")),
        }
    }

    fn read_date(&mut self, index: usize) -> DriverResult<Option<DriverDate>> {
        match self.take(index)? {
            MemoryCell::Null => Ok(None),
            MemoryCell::Date(d) => Ok(Some(d)),
            MemoryCell::Timestamp(ts) => {
                use chrono::Datelike;
                Ok(Some(DriverDate::new(ts.year(), ts.month(), ts.day())))
            }
            MemoryCell::Text(s) => parse_driver_date(&s)
                .map(Some)
                .ok_or_else(|| mismatch(&MemoryCell::Text(s.clone()), "date")),
            other => Err(mismatch(&other, "date")),
        }
    }

    fn read_time(&mut self, index: usize) -> DriverResult<Option<NaiveTime>> {
        match self.take(index)? {
            MemoryCell::Null => Ok(None),
            MemoryCell::Time(t) => Ok(Some(t)),
            MemoryCell::Timestamp(ts) => Ok(Some(ts.time())),
            MemoryCell::Text(s) => NaiveTime::parse_from_str(s.trim(), TIME_FORMAT)
                .map(Some)
                .map_err(|e| DriverFault::new(e.to_string())),
            other => Err(mismatch(&other, "time")),
        }
    }

    fn read_timestamp(&mut self, index: usize) -> DriverResult<Option<NaiveDateTime>> {
        match self.take(index)? {
            MemoryCell::Null => Ok(None),
            MemoryCell::Timestamp(ts) => Ok(Some(ts)),
            MemoryCell::Text(s) => NaiveDateTime::parse_from_str(s.trim(), TIMESTAMP_FORMAT)
                .map(Some)
                .map_err(|e| DriverFault::new(e.to_string())),
            other => Err(mismatch(&other, "timestamp")),
        }
    }

    fn open_binary_stream(
        &mut self,
        index: usize,
    ) -> DriverResult<Option<Box<dyn DriverStream + '_>>> {
        let (data, fail_after) = match self.take(index)? {
            MemoryCell::Null => return Ok(None),
            MemoryCell::Bytes(b) => (b, None),
            MemoryCell::Text(s) => (s.into_bytes(), None),
            MemoryCell::FailingStream { after } => (vec![0u8; after.saturating_mul(2).max(1)], Some(after)),
            other => return Err(mismatch(&other, "binary stream")),
        };
        Ok(Some(Box::new(MemoryStream {
            data,
            pos: 0,
            fail_after,
            closes: &self.stream_closes,
        })))
    }

    fn open_char_stream(&mut self, index: usize) -> DriverResult<Option<Box<dyn CharStream + '_>>> {
        let (chars, fail_after) = match self.take(index)? {
            MemoryCell::Null => return Ok(None),
            MemoryCell::Text(s) => (s.chars().collect(), None),
            MemoryCell::FailingCharStream { after } => {
                (vec!['x'; after.saturating_mul(2).max(1)], Some(after))
            }
            other => return Err(mismatch(&other, "character stream")),
        };
        Ok(Some(Box::new(MemoryCharStream {
            chars,
            pos: 0,
            fail_after,
            closes: &self.stream_closes,
        })))
    }

    fn read_xml(&mut self, index: usize) -> DriverResult<Option<Box<dyn XmlHandle + '_>>> {
        let text = match self.take(index)? {
            MemoryCell::Null => return Ok(None),
            MemoryCell::Xml(text) => text,
            MemoryCell::Text(s) => Some(s),
            other => return Err(mismatch(&other, "xml")),
        };
        Ok(Some(Box::new(MemoryXml {
            text,
            frees: &self.xml_frees,
        })))
    }

    fn read_object(&mut self, index: usize) -> DriverResult<Option<DriverObject>> {
        let obj = match self.take(index)? {
            MemoryCell::Null => return Ok(None),
            MemoryCell::Object(obj) => obj,
            MemoryCell::Int(v) => DriverObject::Scalar(Value::Integer(v)),
            MemoryCell::Float(f) => DriverObject::Scalar(Value::Float(f)),
            MemoryCell::Bool(b) => DriverObject::Scalar(Value::Bool(b)),
            MemoryCell::Text(s) => DriverObject::Scalar(Value::Text(s)),
            MemoryCell::Bytes(b) => DriverObject::Scalar(Value::Bytes(b)),
            MemoryCell::Decimal(d) => DriverObject::Scalar(Value::Decimal(d)),
            MemoryCell::Time(t) => DriverObject::Scalar(Value::Time(t)),
            MemoryCell::Timestamp(ts) => DriverObject::Scalar(Value::Timestamp(ts)),
            other => DriverObject::Display(format!("{:?}", other)),
        };
        Ok(Some(obj))
    }
}

struct MemoryStream<'a> {
    data: Vec<u8>,
    pos: usize,
    fail_after: Option<usize>,
    closes: &'a Cell<usize>,
}

impl Read for MemoryStream<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if let Some(after) = self.fail_after {
            if self.pos >= after {
                return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "stream truncated"));
            }
        }
        let limit = self.fail_after.unwrap_or(self.data.len()).min(self.data.len());
        let n = buf.len().min(limit.max(self.pos) - self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

impl DriverStream for MemoryStream<'_> {
    fn close(&mut self) -> io::Result<()> {
        self.closes.set(self.closes.get() + 1);
        Ok(())
    }
}

struct MemoryCharStream<'a> {
    chars: Vec<char>,
    pos: usize,
    fail_after: Option<usize>,
    closes: &'a Cell<usize>,
}

impl CharStream for MemoryCharStream<'_> {
    fn read_chars(&mut self, buf: &mut [char]) -> io::Result<usize> {
        if let Some(after) = self.fail_after {
            if self.pos >= after {
                return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "stream truncated"));
            }
        }
        let limit = self.fail_after.unwrap_or(self.chars.len()).min(self.chars.len());
        let n = buf.len().min(limit.max(self.pos) - self.pos);
        buf[..n].copy_from_slice(&self.chars[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }

    fn close(&mut self) -> io::Result<()> {
        self.closes.set(self.closes.get() + 1);
        Ok(())
    }
}

struct MemoryXml<'a> {
    text: Option<String>,
    frees: &'a Cell<usize>,
}

impl XmlHandle for MemoryXml<'_> {
    fn text(&mut self) -> DriverResult<String> {
        self.text
            .clone()
            .ok_or_else(|| DriverFault::new("XML document is unreadable"))
    }

    fn free(&mut self) -> DriverResult<()> {
        self.frees.set(self.frees.get() + 1);
        Ok(())
    }
}
