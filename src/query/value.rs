//! Row and Value types for pgmeta
//!
//! This module defines how catalog values and result rows are represented
//! in memory, independently of the driver that produced them.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// A single catalog value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// NULL value
    Null,
    /// Boolean value
    Boolean(bool),
    /// Integer value (32-bit)
    Integer(i32),
    /// Big integer value (64-bit)
    BigInt(i64),
    /// Object identifier
    Oid(u32),
    /// Float value (64-bit)
    Float(f64),
    /// String value
    String(String),
    /// Text array (used for `= ANY($n)` parameters)
    TextArray(Vec<String>),
}

impl Value {
    /// Check if this value is NULL
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Try to convert to boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to convert to i64
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i as i64),
            Value::BigInt(i) => Some(*i),
            Value::Oid(o) => Some(*o as i64),
            _ => None,
        }
    }

    /// Try to convert to an object identifier
    pub fn as_oid(&self) -> Option<u32> {
        match self {
            Value::Oid(o) => Some(*o),
            Value::Integer(i) => (*i).try_into().ok(),
            Value::BigInt(i) => (*i).try_into().ok(),
            _ => None,
        }
    }

    /// Try to borrow as string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the type name of this value
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Boolean(_) => "BOOLEAN",
            Value::Integer(_) => "INTEGER",
            Value::BigInt(_) => "BIGINT",
            Value::Oid(_) => "OID",
            Value::Float(_) => "FLOAT",
            Value::String(_) => "TEXT",
            Value::TextArray(_) => "TEXT[]",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Boolean(b) => write!(f, "{}", if *b { "t" } else { "f" }),
            Value::Integer(i) => write!(f, "{}", i),
            Value::BigInt(i) => write!(f, "{}", i),
            Value::Oid(o) => write!(f, "{}", o),
            Value::Float(v) => write!(f, "{}", v),
            Value::String(s) => write!(f, "{}", s),
            Value::TextArray(items) => write!(f, "{{{}}}", items.join(",")),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::BigInt(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Oid(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Vec<String>> for Value {
    fn from(v: Vec<String>) -> Self {
        Value::TextArray(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// One result row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    values: Vec<Value>,
}

impl Row {
    /// Create a new row from values
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// Get all values
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Consume the row into its values
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// Get value at index
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Number of values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if row is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn at(&self, label: &str, index: usize, expected: &'static str) -> Result<&Value> {
        self.values.get(index).ok_or_else(|| Error::Decode {
            label: label.to_string(),
            column: index,
            expected,
        })
    }

    fn mismatch(label: &str, index: usize, expected: &'static str) -> Error {
        Error::Decode {
            label: label.to_string(),
            column: index,
            expected,
        }
    }

    /// Non-null text column
    pub fn text(&self, label: &str, index: usize) -> Result<String> {
        self.opt_text(label, index)?
            .ok_or_else(|| Self::mismatch(label, index, "text"))
    }

    /// Nullable text column
    pub fn opt_text(&self, label: &str, index: usize) -> Result<Option<String>> {
        match self.at(label, index, "text")? {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s.clone())),
            _ => Err(Self::mismatch(label, index, "text")),
        }
    }

    /// Non-null boolean column
    pub fn boolean(&self, label: &str, index: usize) -> Result<bool> {
        self.opt_boolean(label, index)?
            .ok_or_else(|| Self::mismatch(label, index, "boolean"))
    }

    /// Nullable boolean column
    pub fn opt_boolean(&self, label: &str, index: usize) -> Result<Option<bool>> {
        match self.at(label, index, "boolean")? {
            Value::Null => Ok(None),
            Value::Boolean(b) => Ok(Some(*b)),
            _ => Err(Self::mismatch(label, index, "boolean")),
        }
    }

    /// Non-null integer column (any width)
    pub fn int(&self, label: &str, index: usize) -> Result<i64> {
        self.opt_int(label, index)?
            .ok_or_else(|| Self::mismatch(label, index, "integer"))
    }

    /// Nullable integer column (any width)
    pub fn opt_int(&self, label: &str, index: usize) -> Result<Option<i64>> {
        let value = self.at(label, index, "integer")?;
        if value.is_null() {
            return Ok(None);
        }
        value
            .as_i64()
            .map(Some)
            .ok_or_else(|| Self::mismatch(label, index, "integer"))
    }

    /// Non-null object identifier column
    pub fn oid(&self, label: &str, index: usize) -> Result<u32> {
        self.at(label, index, "oid")?
            .as_oid()
            .ok_or_else(|| Self::mismatch(label, index, "oid"))
    }
}

/// Result of one catalog query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Column names
    pub columns: Vec<String>,
    /// Result rows
    pub rows: Vec<Row>,
}

impl QueryResult {
    /// Create a new empty result
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a result from column names and rows
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if there are no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First row, if any
    pub fn first(&self) -> Option<&Row> {
        self.rows.first()
    }
}
