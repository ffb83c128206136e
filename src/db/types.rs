//! Result row types for hive-indexer.
//!
//! Defines the structures used to represent rows and server-side failures
//! returned by HiveServer.

use serde::{Deserialize, Serialize, Serializer};
use std::borrow::Cow;
use std::fmt;
use thiserror::Error;

/// Column separator HiveServer uses when serializing a row to a string.
pub const COLUMN_SEPARATOR: &str = "\t";

const COLUMN_SEPARATOR_BYTE: u8 = b'\t';

/// A row of data from a query result.
pub type Row = Vec<Value>;

/// Represents a single value from a query result.
///
/// The client never interprets these; they are carried through to output.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Value {
    /// NULL value.
    #[default]
    Null,

    /// Boolean value.
    Bool(bool),

    /// Signed integer (up to i64).
    Int(i64),

    /// Floating point number.
    Float(f64),

    /// Text/string value.
    String(String),

    /// Collection value, such as the output of `COLLECT_SET`.
    List(Vec<Value>),

    /// Cell text that is not valid UTF-8, kept byte for byte.
    #[serde(skip_deserializing, serialize_with = "serialize_lossy")]
    Bytes(Vec<u8>),
}

impl Value {
    /// Attempts to convert the value to a string representation.
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::String(s) => s.clone(),
            Value::List(items) => {
                let inner: Vec<String> = items.iter().map(Value::to_display_string).collect();
                format!("[{}]", inner.join(","))
            }
            Value::Bytes(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        }
    }

    /// The exact bytes text output writes for this value.
    pub fn display_bytes(&self) -> Cow<'_, [u8]> {
        match self {
            Value::Bytes(bytes) => Cow::Borrowed(bytes),
            other => Cow::Owned(other.to_display_string().into_bytes()),
        }
    }
}

fn serialize_lossy<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&String::from_utf8_lossy(bytes))
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_display_string())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl<T> From<Vec<T>> for Value
where
    T: Into<Value>,
{
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Value::Null,
        }
    }
}

/// Splits a row as serialized by HiveServer into its cells.
///
/// Cells stay text: UTF-8 cells become strings and any other cell keeps its
/// raw bytes, so joining them back with [`COLUMN_SEPARATOR`] reproduces the
/// server bytes exactly.
pub fn split_row(line: &[u8]) -> Row {
    line.split(|b| *b == COLUMN_SEPARATOR_BYTE)
        .map(|cell| match String::from_utf8(cell.to_vec()) {
            Ok(text) => Value::String(text),
            Err(e) => Value::Bytes(e.into_bytes()),
        })
        .collect()
}

/// Exception raised by HiveServer for a failed `execute` or fetch call.
#[derive(Error, Debug, Clone, Default, PartialEq, Eq)]
#[error("{message} (errorCode={error_code}, SQLState={sql_state})")]
pub struct HiveServerException {
    pub message: String,
    pub error_code: i32,
    pub sql_state: String,
}

impl HiveServerException {
    pub fn new(message: impl Into<String>, error_code: i32, sql_state: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error_code,
            sql_state: sql_state.into(),
        }
    }
}
