//! JSON output and serde adapters for model types
//!
//! Envelopes only ever hold plain values or values routed through one of
//! the `with`-adapters below, so the wire form never depends on how a
//! numeric or summary type happens to implement `Serialize`.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

/// Pretty JSON of `value` with non-finite numbers as `null`
///
/// Always returns a well-formed document; a serializer failure becomes
/// `{"error": ...}`.
pub fn to_json<T: Serialize>(value: &T) -> String {
    let rendered = serde_json::to_value(value)
        .map(normalize)
        .and_then(|v| serde_json::to_string_pretty(&v));
    match rendered {
        Ok(json) => json,
        Err(e) => {
            warn!(error = %e, "result serialization failed");
            let mut fallback = Map::new();
            fallback.insert("error".to_string(), Value::String(e.to_string()));
            Value::Object(fallback).to_string()
        }
    }
}

/// Replace non-finite numbers with `null`, leaving everything else as is
pub fn normalize(value: Value) -> Value {
    match value {
        Value::Number(n) => match n.as_f64() {
            Some(f) if !f.is_finite() => Value::Null,
            _ => Value::Number(n),
        },
        Value::Array(items) => Value::Array(items.into_iter().map(normalize).collect()),
        Value::Object(map) => {
            Value::Object(map.into_iter().map(|(k, v)| (k, normalize(v))).collect())
        }
        other => other,
    }
}

/// `f64` as a JSON number, `null` when not finite
fn finite(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}

/// `Array1<f64>` as a list of numbers
pub mod array1 {
    use ndarray::Array1;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(
        values: &Array1<f64>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(values.iter().map(|&v| super::finite(v)))
    }
}

/// `Array2<f64>` as a list of rows
pub mod array2 {
    use ndarray::Array2;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(
        values: &Array2<f64>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(
            values
                .rows()
                .into_iter()
                .map(|row| row.iter().map(|&v| super::finite(v)).collect::<Vec<_>>()),
        )
    }
}

/// `NaiveDateTime` as an ISO-8601 string
pub mod timestamp {
    use chrono::NaiveDateTime;
    use serde::Serializer;

    pub const FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

    pub fn serialize<S: Serializer>(
        value: &NaiveDateTime,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(FORMAT))
    }
}

/// Any [`TextSummary`](eo_models::TextSummary) as its rendered table
pub mod summary_text {
    use eo_models::TextSummary;
    use serde::Serializer;

    pub fn serialize<T: TextSummary, S: Serializer>(
        value: &T,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.summary_text())
    }
}

/// [`IndexValue`](eo_core::IndexValue) as a number or string
pub mod label {
    use eo_core::IndexValue;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(
        value: &IndexValue,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            IndexValue::Integer(v) => serializer.serialize_i64(*v),
            IndexValue::Float(v) => match super::finite(*v) {
                Some(v) => serializer.serialize_f64(v),
                None => serializer.serialize_none(),
            },
            IndexValue::String(v) => serializer.serialize_str(v),
            IndexValue::Datetime(v) => super::timestamp::serialize(v, serializer),
        }
    }
}
