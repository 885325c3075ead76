//! Flat field values and their mapping to BSON.

use std::collections::BTreeMap;
use std::fmt;

use mongodb::bson::Bson;
use serde::{Deserialize, Serialize};

/// Field name to scalar value. The synthetic `id` field lives here too once a
/// fetch has resolved.
pub type FieldMap = BTreeMap<String, FieldValue>;

/// A scalar field value.
///
/// The field store only holds strings, so everything it returns is
/// [`FieldValue::Str`]. The typed accessors below parse strings on demand so an
/// entity builds the same way no matter which tier served it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl FieldValue {
    /// Parse an operator-supplied literal: bool, then integer, then float,
    /// otherwise a string.
    pub fn parse_literal(raw: &str) -> Self {
        if let Some(b) = parse_bool(raw) {
            return Self::Bool(b);
        }
        if let Ok(i) = raw.parse::<i64>() {
            return Self::Int(i);
        }
        if let Ok(f) = raw.parse::<f64>() {
            return Self::Float(f);
        }
        Self::Str(raw.to_string())
    }

    /// Borrow the value if it is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f64),
            Self::Str(s) => s.trim().parse().ok(),
            Self::Bool(_) => None,
        }
    }

    /// Booleans written by older clients show up as `"True"`/`"False"` or
    /// `"1"`/`"0"` in the field store.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Int(0) => Some(false),
            Self::Int(1) => Some(true),
            Self::Str(s) => match s.trim() {
                "1" => Some(true),
                "0" => Some(false),
                other => parse_bool(other),
            },
            _ => None,
        }
    }

    /// The value as the field store holds it.
    pub fn into_stored(self) -> Self {
        match self {
            Self::Str(_) => self,
            other => Self::Str(other.to_string()),
        }
    }

    /// Convert a document value into a cacheable scalar.
    ///
    /// Returns `None` for embedded documents, arrays, null and any BSON kind
    /// without a flat string form.
    pub fn from_bson(value: &Bson) -> Option<Self> {
        match value {
            Bson::String(s) => Some(Self::Str(s.clone())),
            Bson::Int32(i) => Some(Self::Int(i64::from(*i))),
            Bson::Int64(i) => Some(Self::Int(*i)),
            Bson::Double(f) => Some(Self::Float(*f)),
            Bson::Boolean(b) => Some(Self::Bool(*b)),
            Bson::ObjectId(oid) => Some(Self::Str(oid.to_hex())),
            Bson::DateTime(dt) => dt.try_to_rfc3339_string().ok().map(Self::Str),
            _ => None,
        }
    }
}

/// Copy of `fields` in field store form.
pub fn stored_form(fields: &FieldMap) -> FieldMap {
    fields
        .iter()
        .map(|(name, value)| (name.clone(), value.clone().into_stored()))
        .collect()
}

fn parse_bool(raw: &str) -> Option<bool> {
    if raw.eq_ignore_ascii_case("true") {
        Some(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<&FieldValue> for Bson {
    fn from(value: &FieldValue) -> Self {
        match value {
            FieldValue::Bool(b) => Bson::Boolean(*b),
            FieldValue::Int(i) => Bson::Int64(*i),
            FieldValue::Float(f) => Bson::Double(*f),
            FieldValue::Str(s) => Bson::String(s.clone()),
        }
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}
