//! Feature-row data model shared by the normalization and enrichment layers.
//!
//! Rows arrive from loaded tabular data with heterogeneous, frequently
//! missing cells. Every accessor here resolves to a documented default
//! instead of failing, so per-record data problems never surface as errors.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque per-entity identifier. Datasets key entities either numerically or
/// by free-form string; both forms compare and hash by value.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Num(i64),
    Text(String),
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Num(id) => write!(f, "{id}"),
            Self::Text(id) => write!(f, "{id}"),
        }
    }
}

impl From<i64> for EntityId {
    fn from(value: i64) -> Self {
        Self::Num(value)
    }
}

impl From<i32> for EntityId {
    fn from(value: i32) -> Self {
        Self::Num(i64::from(value))
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// One heterogeneous table cell. `Number(f64::NAN)` and `Missing` are both
/// treated as absent by every coercion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
    Missing,
}

impl FieldValue {
    pub fn is_missing(&self) -> bool {
        match self {
            Self::Number(value) => value.is_nan(),
            Self::Text(_) => false,
            Self::Missing => true,
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
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

/// One entity's feature snapshot: field name to heterogeneous value.
///
/// The coercion accessors (`num`, `int`, `text`) walk a fallback chain of
/// field names: the first field *present* in the row wins, even when its
/// value is null, and a present-but-uncoercible value resolves to the
/// default rather than consulting later names.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow(HashMap<String, FieldValue>);

impl FeatureRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) {
        self.0.insert(field.into(), value.into());
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.set(field, value);
        self
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.0.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Numeric coercion: first present field in the chain, parsed as a
    /// float when textual; missing or unparseable resolves to `default`.
    pub fn num(&self, fields: &[&str], default: f64) -> f64 {
        let Some(value) = self.first_present(fields) else {
            return default;
        };

        match value {
            FieldValue::Number(number) if !number.is_nan() => *number,
            FieldValue::Number(_) | FieldValue::Missing => default,
            FieldValue::Text(text) => text.trim().parse().unwrap_or(default),
        }
    }

    /// Integer coercion: numeric coercion rounded to the nearest whole.
    pub fn int(&self, fields: &[&str], default: i64) -> i64 {
        self.num(fields, default as f64).round() as i64
    }

    /// String coercion: the field text verbatim, numbers formatted with
    /// their natural display form; missing resolves to the empty string.
    pub fn text(&self, fields: &[&str]) -> String {
        match self.first_present(fields) {
            Some(FieldValue::Text(text)) => text.clone(),
            Some(FieldValue::Number(number)) if !number.is_nan() => number.to_string(),
            _ => String::new(),
        }
    }

    fn first_present(&self, fields: &[&str]) -> Option<&FieldValue> {
        fields.iter().find_map(|field| self.0.get(*field))
    }
}

impl FromIterator<(String, FieldValue)> for FeatureRow {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
