//! Field values and their transport form.
//!
//! A [`FieldValue`] is what callers put into a [`Row`](crate::Row). Before a
//! statement is sent, every value is normalized into a [`Param`]: a
//! [`BindValue`] plus an optional [`BindType`] hint.
//!
//! - booleans bind as `0` / `1`
//! - timestamps bind as `YYYY-MM-DD HH:MM:SS.ffffff` text
//! - structured values bind as compact JSON text

use chrono::{DateTime, NaiveDateTime, TimeZone};
use serde::Serialize;
use std::fmt;

/// Document substituted for a structured value that cannot be serialized.
pub const JSON_ENCODE_ERROR: &str = r#"{"json":"encode error"}"#;

/// Timestamp layout used for bound timestamps (microsecond precision).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Wire-level type hint passed alongside a bound value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindType {
    Null,
    Integer,
    String,
    Binary,
    Boolean,
}

/// A normalized value ready to be bound to a `?` placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    Null,
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl BindValue {
    /// Borrow the text payload, if this is a text value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            BindValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Read the value as a signed integer, if it is one (or fits one).
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            BindValue::Int(v) => Some(*v),
            BindValue::UInt(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, BindValue::Null)
    }
}

impl fmt::Display for BindValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindValue::Null => f.write_str("NULL"),
            BindValue::Int(v) => write!(f, "{v}"),
            BindValue::UInt(v) => write!(f, "{v}"),
            BindValue::Float(v) => write!(f, "{v}"),
            BindValue::Text(s) => f.write_str(s),
            BindValue::Bytes(b) => write!(f, "{}", String::from_utf8_lossy(b)),
        }
    }
}

/// One entry of a parameter stream.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub value: BindValue,
    /// `None` lets the transport infer the type.
    pub ty: Option<BindType>,
}

impl Param {
    pub fn new(value: BindValue, ty: Option<BindType>) -> Self {
        Self { value, ty }
    }

    /// Normalize a value for the row-major path: the bind type defaults to
    /// [`BindType::String`] unless the value carries an explicit hint.
    pub fn flattened(value: &FieldValue) -> Self {
        let (value, hint) = normalize(value);
        Self {
            value,
            ty: Some(hint.unwrap_or(BindType::String)),
        }
    }

    /// Normalize a value keeping its hint as given (bulk-update path).
    pub fn hinted(value: &FieldValue) -> Self {
        let (value, ty) = normalize(value);
        Self { value, ty }
    }
}

/// A semantically typed field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Timestamp(NaiveDateTime),
    /// Structured value, bound as JSON text.
    Json(serde_json::Value),
    /// Explicit `(value, type)` pair; a `None` type means "infer".
    Typed(Box<FieldValue>, Option<BindType>),
}

impl FieldValue {
    /// Wrap a value with an explicit bind type.
    pub fn typed(value: impl Into<FieldValue>, ty: BindType) -> Self {
        FieldValue::Typed(Box::new(value.into()), Some(ty))
    }

    /// Serialize any value into a structured field value.
    ///
    /// Serialization failures never abort a write: the value degrades to the
    /// [`JSON_ENCODE_ERROR`] document.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(v) => FieldValue::Json(v),
            Err(_) => FieldValue::Json(encode_error_document()),
        }
    }

    /// Whether this value counts as "not provided" for default-field rules.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::Bytes(b) => b.is_empty(),
            FieldValue::Typed(inner, _) => inner.is_empty(),
            _ => false,
        }
    }
}

fn encode_error_document() -> serde_json::Value {
    serde_json::json!({ "json": "encode error" })
}

/// Normalize a field value into its bind value and (optional) type hint.
pub fn normalize(value: &FieldValue) -> (BindValue, Option<BindType>) {
    match value {
        FieldValue::Typed(inner, hint) => (normalize(inner).0, *hint),
        FieldValue::Null => (BindValue::Null, None),
        FieldValue::Bool(b) => (BindValue::Int(i64::from(*b)), None),
        FieldValue::Int(v) => (BindValue::Int(*v), None),
        FieldValue::UInt(v) => (BindValue::UInt(*v), None),
        FieldValue::Float(v) => (BindValue::Float(*v), None),
        FieldValue::Text(s) => (BindValue::Text(s.clone()), None),
        FieldValue::Bytes(b) => (BindValue::Bytes(b.clone()), None),
        FieldValue::Timestamp(ts) => (BindValue::Text(format_timestamp(ts)), None),
        FieldValue::Json(v) => {
            let text = serde_json::to_string(v).unwrap_or_else(|_| JSON_ENCODE_ERROR.to_string());
            (BindValue::Text(text), None)
        }
    }
}

/// Format a timestamp the way it is bound (`YYYY-MM-DD HH:MM:SS.ffffff`).
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

macro_rules! impl_from_int {
    ($variant:ident, $target:ty: $($t:ty),*) => {
        $(
            impl From<$t> for FieldValue {
                fn from(v: $t) -> Self {
                    FieldValue::$variant(<$target>::from(v))
                }
            }
        )*
    };
}

impl_from_int!(Int, i64: i8, i16, i32, i64);
impl_from_int!(UInt, u64: u8, u16, u32, u64);

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<f32> for FieldValue {
    fn from(v: f32) -> Self {
        FieldValue::Float(f64::from(v))
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

impl From<&String> for FieldValue {
    fn from(v: &String) -> Self {
        FieldValue::Text(v.clone())
    }
}

impl From<Vec<u8>> for FieldValue {
    fn from(v: Vec<u8>) -> Self {
        FieldValue::Bytes(v)
    }
}

impl From<NaiveDateTime> for FieldValue {
    fn from(v: NaiveDateTime) -> Self {
        FieldValue::Timestamp(v)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for FieldValue {
    fn from(v: DateTime<Tz>) -> Self {
        FieldValue::Timestamp(v.naive_local())
    }
}

impl From<uuid::Uuid> for FieldValue {
    fn from(v: uuid::Uuid) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(v: serde_json::Value) -> Self {
        FieldValue::Json(v)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(FieldValue::Null, Into::into)
    }
}

impl<T: Into<FieldValue>> From<(T, BindType)> for FieldValue {
    fn from((value, ty): (T, BindType)) -> Self {
        FieldValue::typed(value, ty)
    }
}
