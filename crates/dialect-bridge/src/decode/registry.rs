//! Decoder registry.
//!
//! Classifies every column of a result once per result shape and caches the
//! resulting decoder set. The cache is advisory: it may be cleared at any
//! time and is cleared wholesale when it reaches capacity.
//!
//! Classification order for a column:
//!
//! 1. the dialect reclassifies the declared type ([`Dialect::reclassify`])
//! 2. the dialect may pick a decoder outright ([`Dialect::decode_override`])
//! 3. otherwise the generic mapping applies ([`DecoderKind::for_type`])
//!
//! Dialects whose drivers report types per row
//! ([`Dialect::declared_types_unreliable`]) repeat this classification for
//! every row against the live type.

use std::collections::HashMap;
use std::sync::Arc;

use encoding_rs::Encoding;
use tracing::debug;

use super::{Decoder, DecoderKind};
use crate::core::cursor::{ResultMetadata, RowCursor};
use crate::core::traits::Dialect;
use crate::core::types::{ColumnDescriptor, SqlType};
use crate::core::value::Value;
use crate::error::{BridgeError, DriverFault, Result};

/// Pick the decoder for one column.
pub fn classify(dialect: &dyn Dialect, column: &ColumnDescriptor) -> Result<DecoderKind> {
    let column = column.with_type(dialect.reclassify(column));
    if let Some(kind) = dialect.decode_override(&column) {
        return Ok(kind);
    }
    DecoderKind::for_type(column.sql_type).ok_or_else(|| BridgeError::UnsupportedShape {
        label: column.label.clone(),
        index: column.index,
        type_code: column.sql_type.code(),
        precision: column.precision,
        scale: column.scale,
    })
}

/// Read the column descriptors of a result.
fn read_shape(dialect: &dyn Dialect, meta: &dyn ResultMetadata) -> Result<Vec<ColumnDescriptor>> {
    let fault = |e: DriverFault| BridgeError::retrieval(dialect.name(), "read result metadata", e);
    let count = meta.column_count().map_err(fault)?;
    (1..=count)
        .map(|i| {
            Ok(ColumnDescriptor::new(
                meta.column_label(i).map_err(fault)?,
                SqlType::from_code(meta.column_type(i).map_err(fault)?),
                meta.precision(i).map_err(fault)?,
                meta.scale(i).map_err(fault)?,
                i,
            ))
        })
        .collect()
}

/// One decoded row: host labels paired with values, in column order.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedRow {
    columns: Vec<(Arc<str>, Value)>,
}

impl DecodedRow {
    /// Value of the first column with `label`.
    pub fn get(&self, label: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(l, _)| l.as_ref() == label)
            .map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(l, v)| (l.as_ref(), v))
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.columns.iter().map(|(_, v)| v)
    }

    /// JSON object keyed by label.
    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .columns
            .iter()
            .map(|(l, v)| (l.to_string(), v.to_json()))
            .collect::<serde_json::Map<_, _>>();
        serde_json::Value::Object(map)
    }
}

/// Immutable decoder set for one result shape.
#[derive(Debug)]
pub struct ResultDecoder {
    columns: Vec<(ColumnDescriptor, Decoder)>,
    per_row: bool,
}

impl ResultDecoder {
    /// Decoders in column order.
    pub fn decoders(&self) -> impl Iterator<Item = &Decoder> {
        self.columns.iter().map(|(_, d)| d)
    }

    /// Host labels in column order.
    pub fn labels(&self) -> Vec<&str> {
        self.decoders().map(Decoder::label).collect()
    }

    /// Decode the cursor's current row.
    pub fn decode_row(&self, dialect: &dyn Dialect, cursor: &mut dyn RowCursor) -> Result<DecodedRow> {
        let mut columns = Vec::with_capacity(self.columns.len());
        for (descriptor, decoder) in &self.columns {
            let value = if self.per_row {
                let code = cursor
                    .live_column_type(decoder.index())
                    .map_err(|e| BridgeError::retrieval(dialect.name(), "read live column type", e))?;
                let live = descriptor.with_type(SqlType::from_code(code));
                decoder.decode_as(classify(dialect, &live)?, cursor)?
            } else {
                decoder.decode(cursor)?
            };
            columns.push((decoder.shared_label(), value));
        }
        Ok(DecodedRow { columns })
    }

    /// Advance through the rest of the result, decoding every row.
    pub fn decode_all(&self, dialect: &dyn Dialect, cursor: &mut dyn RowCursor) -> Result<Vec<DecodedRow>> {
        let mut rows = Vec::new();
        while cursor
            .advance()
            .map_err(|e| BridgeError::retrieval(dialect.name(), "advance row", e))?
        {
            rows.push(self.decode_row(dialect, cursor)?);
        }
        Ok(rows)
    }
}

/// Per-connection registry of decoder sets.
#[derive(Debug)]
pub struct DecoderRegistry {
    encoding: &'static Encoding,
    capacity: usize,
    labels: HashMap<String, Arc<str>>,
    shapes: HashMap<Vec<ColumnDescriptor>, Arc<ResultDecoder>>,
}

impl DecoderRegistry {
    /// Create a registry caching at most `capacity` shapes (0 disables caching).
    pub fn new(encoding: &'static Encoding, capacity: usize) -> Self {
        Self {
            encoding,
            capacity,
            labels: HashMap::new(),
            shapes: HashMap::new(),
        }
    }

    /// Number of cached result shapes.
    pub fn cached_shapes(&self) -> usize {
        self.shapes.len()
    }

    /// Number of cached host labels.
    pub fn cached_labels(&self) -> usize {
        self.labels.len()
    }

    /// Drop every cached shape and label.
    pub fn clear(&mut self) {
        self.shapes.clear();
        self.labels.clear();
    }

    /// Build (or reuse) the decoder set for a result.
    pub fn prepare(&mut self, dialect: &dyn Dialect, meta: &dyn ResultMetadata) -> Result<Arc<ResultDecoder>> {
        let shape = read_shape(dialect, meta)?;
        if let Some(cached) = self.shapes.get(&shape) {
            debug!("Reusing decoders for {}-column result shape", shape.len());
            return Ok(Arc::clone(cached));
        }

        let mut columns = Vec::with_capacity(shape.len());
        for descriptor in &shape {
            let kind = classify(dialect, descriptor)?;
            debug!(
                "Classified column {} (#{}, {}) as {}",
                descriptor.label,
                descriptor.index,
                descriptor.sql_type,
                kind.name()
            );
            let label = self.host_label(dialect, &descriptor.label);
            columns.push((
                descriptor.clone(),
                Decoder::new(label, descriptor.index, kind, self.encoding),
            ));
        }

        let decoder = Arc::new(ResultDecoder {
            columns,
            per_row: dialect.declared_types_unreliable(),
        });

        if self.capacity > 0 {
            if self.shapes.len() >= self.capacity {
                debug!("Shape cache full ({} entries), clearing", self.shapes.len());
                self.clear();
            }
            self.shapes.insert(shape, Arc::clone(&decoder));
        }
        Ok(decoder)
    }

    /// Host form of a raw column label, cached alongside the shapes.
    fn host_label(&mut self, dialect: &dyn Dialect, raw: &str) -> Arc<str> {
        if self.capacity == 0 {
            return Arc::from(dialect.identifier_to_external(raw));
        }
        if let Some(label) = self.labels.get(raw) {
            return Arc::clone(label);
        }
        let label: Arc<str> = Arc::from(dialect.identifier_to_external(raw));
        self.labels.insert(raw.to_string(), Arc::clone(&label));
        label
    }
}
