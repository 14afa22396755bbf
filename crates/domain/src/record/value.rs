//! Typed field values held by records.

use serde::{Deserialize, Serialize};

use crate::time::{self, Timestamp};

/// A single typed field value.
///
/// Values are resolved once, when a record is loaded from JSON: RFC 3339
/// strings become [`FieldValue::Date`], nested objects stay as raw JSON.
/// Serialising converts back to the exact JSON that was loaded: dates keep
/// their original text and integers never go through `f64`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "serde_json::Value")]
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
    Date { at: Timestamp, raw: String },
    List(Vec<FieldValue>),
    Json(serde_json::Value),
}

impl FieldValue {
    /// A date value written in the stored `Z` form.
    #[must_use]
    pub fn date(at: Timestamp) -> Self {
        Self::Date {
            raw: time::format_rfc3339(&at),
            at,
        }
    }

    /// `true` for null, empty text and empty lists.
    ///
    /// `0`, `false` and non-empty collections are *not* empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(text) => text.is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Bool(_) | Self::Number(_) | Self::Date { .. } | Self::Json(_) => false,
        }
    }

    /// String coercion: null is empty, lists join their items with `,`.
    #[must_use]
    pub fn as_text(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => format_number(n),
            Self::Text(text) | Self::Date { raw: text, .. } => text.clone(),
            Self::List(items) => items
                .iter()
                .map(Self::as_text)
                .collect::<Vec<_>>()
                .join(","),
            Self::Json(value) => value.to_string(),
        }
    }

    /// Numeric coercion.
    ///
    /// Numbers, numeric text and dates (as epoch milliseconds) coerce;
    /// everything else is non-numeric and yields `None`.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64().filter(|n| n.is_finite()),
            Self::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return None;
                }
                trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
            }
            #[allow(clippy::cast_precision_loss)]
            Self::Date { at, .. } => Some(at.timestamp_millis() as f64),
            Self::Null | Self::Bool(_) | Self::List(_) | Self::Json(_) => None,
        }
    }

    /// Loose equality used by the `equals` operator.
    ///
    /// Compares numerically when both sides coerce to numbers, otherwise
    /// compares the string coercions. Null only equals null.
    #[must_use]
    pub fn loosely_equals(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Null, _) | (_, Self::Null) => false,
            _ => match (self.as_number(), other.as_number()) {
                #[allow(clippy::float_cmp)]
                (Some(a), Some(b)) => a == b,
                _ => self.as_text() == other.as_text(),
            },
        }
    }

    /// Convert to plain JSON.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        self.clone().into()
    }
}

/// Largest magnitude below which every integral `f64` is exact.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

fn format_number(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(float) if n.is_f64() && float.fract() == 0.0 && float.abs() < MAX_SAFE_INTEGER => {
            #[allow(clippy::cast_possible_truncation)]
            let int = float as i64;
            int.to_string()
        }
        _ => n.to_string(),
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n),
            serde_json::Value::String(text) => match time::parse_rfc3339(&text) {
                Some(at) => Self::Date { at, raw: text },
                None => Self::Text(text),
            },
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Self::from).collect())
            }
            object @ serde_json::Value::Object(_) => Self::Json(object),
        }
    }
}

impl From<FieldValue> for serde_json::Value {
    fn from(value: FieldValue) -> Self {
        match value {
            FieldValue::Null => Self::Null,
            FieldValue::Bool(b) => Self::Bool(b),
            FieldValue::Number(n) => Self::Number(n),
            FieldValue::Text(text) | FieldValue::Date { raw: text, .. } => Self::String(text),
            FieldValue::List(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            FieldValue::Json(value) => value,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Integral floats within the exact range are stored as integers so they
/// serialise as `3`, not `3.0`. Non-finite floats become null.
impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        if value.fract() == 0.0 && value.abs() < MAX_SAFE_INTEGER {
            #[allow(clippy::cast_possible_truncation)]
            let int = value as i64;
            return Self::from(int);
        }
        serde_json::Number::from_f64(value).map_or(Self::Null, Self::Number)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Number(value.into())
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        Self::Number(value.into())
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_text())
    }
}
