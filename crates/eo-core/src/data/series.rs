//! Series data structure for holding homogeneous data
//!
//! A Series is a one-dimensional array that can hold data of a specific type.
//! It's the building block of DataFrames. Floating point columns use `NaN`
//! as the missing-value marker.

use super::*;

use chrono::NaiveDateTime;
use ndarray::Array1;

/// A Series is a typed, one-dimensional array of data
#[derive(Clone, Debug, PartialEq)]
pub enum Series {
    /// Floating point numbers (f64)
    Float(FloatArray),
    /// Integer numbers (i64)
    Int(IntArray),
    /// Boolean values
    Bool(BoolArray),
    /// String values
    String(StringArray),
    /// Categorical data (encoded as u32)
    Categorical(Array1<u32>, Vec<String>), // values, categories
    /// Timestamps without time zone
    Datetime(DatetimeArray),
}

impl Series {
    /// Create a new Float series
    pub fn float(data: impl Into<FloatArray>) -> Self {
        Series::Float(data.into())
    }

    /// Create a new Int series
    pub fn int(data: impl Into<IntArray>) -> Self {
        Series::Int(data.into())
    }

    /// Create a new Bool series
    pub fn bool(data: impl Into<BoolArray>) -> Self {
        Series::Bool(data.into())
    }

    /// Create a new String series
    pub fn string<S: Into<String>>(data: impl IntoIterator<Item = S>) -> Self {
        Series::String(data.into_iter().map(Into::into).collect())
    }

    /// Create a new Datetime series
    pub fn datetime(data: impl Into<DatetimeArray>) -> Self {
        Series::Datetime(data.into())
    }

    /// Create a new Categorical series
    pub fn categorical<T: AsRef<str>>(data: &[T]) -> Self {
        let categories: Vec<String> = data
            .iter()
            .map(|s| s.as_ref().to_string())
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .collect();

        // Categories are sorted, so the code is the position in the list
        let encoded: Array1<u32> = data
            .iter()
            .map(|s| {
                categories
                    .binary_search_by(|c| c.as_str().cmp(s.as_ref()))
                    .map(|i| i as u32)
                    .unwrap_or_default()
            })
            .collect();

        Series::Categorical(encoded, categories)
    }

    /// Get the length of the series
    pub fn len(&self) -> usize {
        match self {
            Series::Float(arr) => arr.len(),
            Series::Int(arr) => arr.len(),
            Series::Bool(arr) => arr.len(),
            Series::String(arr) => arr.len(),
            Series::Categorical(arr, _) => arr.len(),
            Series::Datetime(arr) => arr.len(),
        }
    }

    /// Check if the series is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the type name of the series
    pub fn dtype(&self) -> &'static str {
        match self {
            Series::Float(_) => "float64",
            Series::Int(_) => "int64",
            Series::Bool(_) => "bool",
            Series::String(_) => "string",
            Series::Categorical(_, _) => "categorical",
            Series::Datetime(_) => "datetime64",
        }
    }

    /// Whether the series can be used as a regression variable
    pub fn is_numeric(&self) -> bool {
        matches!(self, Series::Float(_) | Series::Int(_) | Series::Bool(_))
    }

    /// Get a value at index
    pub fn get(&self, idx: usize) -> Option<SeriesValue> {
        match self {
            Series::Float(arr) => arr.get(idx).map(|&v| SeriesValue::Float(v)),
            Series::Int(arr) => arr.get(idx).map(|&v| SeriesValue::Int(v)),
            Series::Bool(arr) => arr.get(idx).map(|&v| SeriesValue::Bool(v)),
            Series::String(arr) => arr.get(idx).map(|v| SeriesValue::String(v.clone())),
            Series::Categorical(arr, cats) => arr
                .get(idx)
                .and_then(|&code| cats.get(code as usize))
                .map(|cat| SeriesValue::String(cat.clone())),
            Series::Datetime(arr) => arr.get(idx).map(|&v| SeriesValue::Datetime(v)),
        }
    }

    /// Whether the value at `idx` is missing (`NaN` in a float column)
    pub fn is_missing(&self, idx: usize) -> bool {
        match self {
            Series::Float(arr) => arr.get(idx).is_some_and(|v| v.is_nan()),
            _ => false,
        }
    }

    /// Filter the series with a boolean mask
    pub fn filter(&self, mask: &[bool]) -> Result<Self> {
        if mask.len() != self.len() {
            return Err(DataError::DimensionMismatch {
                expected: format!("mask length {}", self.len()),
                actual: format!("mask length {}", mask.len()),
            });
        }

        let keep: Vec<usize> = mask
            .iter()
            .enumerate()
            .filter(|(_, keep)| **keep)
            .map(|(i, _)| i)
            .collect();

        self.reorder(&keep)
    }

    /// Build a new series from the rows at `indices`, in that order
    pub fn reorder(&self, indices: &[usize]) -> Result<Self> {
        let len = self.len();
        if let Some(&bad) = indices.iter().find(|&&idx| idx >= len) {
            return Err(DataError::IndexOutOfBounds { index: bad, len });
        }

        Ok(match self {
            Series::Float(arr) => Series::Float(indices.iter().map(|&i| arr[i]).collect()),
            Series::Int(arr) => Series::Int(indices.iter().map(|&i| arr[i]).collect()),
            Series::Bool(arr) => Series::Bool(indices.iter().map(|&i| arr[i]).collect()),
            Series::String(vec) => {
                Series::String(indices.iter().map(|&i| vec[i].clone()).collect())
            }
            Series::Categorical(arr, cats) => {
                Series::Categorical(indices.iter().map(|&i| arr[i]).collect(), cats.clone())
            }
            Series::Datetime(vec) => Series::Datetime(indices.iter().map(|&i| vec[i]).collect()),
        })
    }

    /// Numeric values as `f64`; `None` for non-numeric series
    pub fn to_f64(&self) -> Option<FloatArray> {
        match self {
            Series::Float(arr) => Some(arr.clone()),
            Series::Int(arr) => Some(arr.mapv(|v| v as f64)),
            Series::Bool(arr) => Some(arr.mapv(|v| if v { 1.0 } else { 0.0 })),
            Series::String(_) | Series::Categorical(_, _) | Series::Datetime(_) => None,
        }
    }
}

/// Enum for type-safe value access
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesValue {
    Float(f64),
    Int(i64),
    Bool(bool),
    String(String),
    Datetime(NaiveDateTime),
}

impl std::fmt::Display for SeriesValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeriesValue::Float(v) => write!(f, "{}", v),
            SeriesValue::Int(v) => write!(f, "{}", v),
            SeriesValue::Bool(v) => write!(f, "{}", v),
            SeriesValue::String(v) => write!(f, "{}", v),
            SeriesValue::Datetime(v) => write!(f, "{}", v.format("%Y-%m-%dT%H:%M:%S")),
        }
    }
}
