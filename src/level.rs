//! Declarative level input/output
//!
//! Level descriptions are JSON documents read and written through a
//! keyed-clause abstraction so the rest of the crate never touches the
//! encoding directly:
//!
//! - **Current schema**: an ordered array of single-key clause objects,
//!   e.g. `[{"name": "icefield"}, {"gravity": 10}, {"tilemap": {...}}]`.
//!   Clause order is load-bearing (it is registration order).
//! - **Legacy schema**: one flat object with well-known keys plus an
//!   optional `"objects"` clause list.
//!
//! The reader exposes: enumerate top-level clauses in file order, read
//! typed fields by key with optional defaults, and read a nested clause
//! list by key.

use serde_json::{Map, Value};
use thiserror::Error;

/// Fatal level-load failures. Anything recoverable is logged and
/// skipped instead of surfacing here.
#[derive(Debug, Error)]
pub enum LoadError {
    /// A sector without solid ground cannot simulate.
    #[error("sector does not contain a solid tile layer")]
    MissingSolidLayer,

    /// The document root has the wrong shape for the chosen schema.
    #[error("level document is malformed: {0}")]
    MalformedDocument(&'static str),
}

/// One top-level (or nested) clause: a keyword plus its payload.
#[derive(Debug, Clone, Copy)]
pub struct Clause<'a> {
    pub token: &'a str,
    pub value: &'a Value,
}

impl<'a> Clause<'a> {
    /// Keyed-field reader over this clause's payload. Scalar payloads
    /// yield an empty reader; every `read_*` returns `None`.
    pub fn reader(&self) -> ClauseReader<'a> {
        ClauseReader::new(self.value)
    }

    pub fn as_str(&self) -> Option<&'a str> {
        self.value.as_str()
    }

    pub fn as_int(&self) -> Option<i64> {
        self.value.as_i64()
    }
}

/// Enumerate the top-level clauses of a current-schema document in
/// file order. Elements that are not single-key objects are skipped
/// with a diagnostic.
pub fn clauses(document: &Value) -> Result<Vec<Clause<'_>>, LoadError> {
    let items = document
        .as_array()
        .ok_or(LoadError::MalformedDocument("expected a clause list"))?;

    let mut out = Vec::with_capacity(items.len());
    for item in items {
        match single_key_clause(item) {
            Some(clause) => out.push(clause),
            None => tracing::warn!("skipping malformed clause: {item}"),
        }
    }
    Ok(out)
}

fn single_key_clause(item: &Value) -> Option<Clause<'_>> {
    let map = item.as_object()?;
    if map.len() != 1 {
        return None;
    }
    let (token, value) = map.iter().next()?;
    Some(Clause { token, value })
}

/// Read typed fields out of one clause (or out of a whole legacy
/// document, which is a single flat clause).
pub struct ClauseReader<'a> {
    fields: Option<&'a Map<String, Value>>,
}

impl<'a> ClauseReader<'a> {
    pub fn new(value: &'a Value) -> Self {
        ClauseReader {
            fields: value.as_object(),
        }
    }

    fn field(&self, key: &str) -> Option<&'a Value> {
        self.fields.and_then(|map| map.get(key))
    }

    pub fn read_string(&self, key: &str) -> Option<String> {
        self.field(key)?.as_str().map(str::to_owned)
    }

    pub fn read_int(&self, key: &str) -> Option<i64> {
        self.field(key)?.as_i64()
    }

    pub fn read_float(&self, key: &str) -> Option<f32> {
        self.field(key)?.as_f64().map(|v| v as f32)
    }

    pub fn read_bool(&self, key: &str) -> Option<bool> {
        self.field(key)?.as_bool()
    }

    /// Flat integer array, e.g. a tile-id grid. Non-integer elements
    /// poison the whole read.
    pub fn read_int_vec(&self, key: &str) -> Option<Vec<u32>> {
        self.field(key)?
            .as_array()?
            .iter()
            .map(|v| v.as_u64().map(|n| n as u32))
            .collect()
    }

    /// Nested clause list by key (the legacy `objects` field).
    pub fn read_clauses(&self, key: &str) -> Vec<Clause<'a>> {
        let Some(items) = self.field(key).and_then(Value::as_array) else {
            return Vec::new();
        };
        items
            .iter()
            .filter_map(|item| {
                let clause = single_key_clause(item);
                if clause.is_none() {
                    tracing::warn!("skipping malformed nested clause: {item}");
                }
                clause
            })
            .collect()
    }
}

/// Builder for a clause payload, used by the writer side.
#[derive(Default)]
pub struct ClauseFields(Map<String, Value>);

impl ClauseFields {
    pub fn new() -> Self {
        ClauseFields(Map::new())
    }

    pub fn string(mut self, key: &str, value: &str) -> Self {
        self.0.insert(key.to_owned(), Value::from(value));
        self
    }

    pub fn int(mut self, key: &str, value: i64) -> Self {
        self.0.insert(key.to_owned(), Value::from(value));
        self
    }

    pub fn float(mut self, key: &str, value: f32) -> Self {
        self.0.insert(key.to_owned(), Value::from(value as f64));
        self
    }

    pub fn bool(mut self, key: &str, value: bool) -> Self {
        self.0.insert(key.to_owned(), Value::from(value));
        self
    }

    pub fn int_vec(mut self, key: &str, values: &[u32]) -> Self {
        self.0.insert(key.to_owned(), Value::from(values.to_vec()));
        self
    }
}

/// Accumulates clauses and produces a current-schema document.
#[derive(Default)]
pub struct LevelWriter {
    clauses: Vec<Value>,
}

impl LevelWriter {
    pub fn new() -> Self {
        LevelWriter {
            clauses: Vec::new(),
        }
    }

    fn push(&mut self, token: &str, value: Value) {
        let mut map = Map::new();
        map.insert(token.to_owned(), value);
        self.clauses.push(Value::Object(map));
    }

    pub fn write_string(&mut self, token: &str, value: &str) {
        self.push(token, Value::from(value));
    }

    pub fn write_float(&mut self, token: &str, value: f32) {
        self.push(token, Value::from(value as f64));
    }

    pub fn write_clause(&mut self, token: &str, fields: ClauseFields) {
        self.push(token, Value::Object(fields.0));
    }

    pub fn into_value(self) -> Value {
        Value::Array(self.clauses)
    }
}

/// Objects that persist themselves into the level description.
///
/// The sector writer walks the registry in insertion order and lets
/// every serializable object emit its own clause.
pub trait LevelSerializable {
    fn write(&self, writer: &mut LevelWriter);
}
