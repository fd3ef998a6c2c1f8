//! Index structures for DataFrames
//!
//! Panel data is addressed by an (entity, time) pair. `PanelIndex` turns the
//! two identifier columns into dense codes and the row permutation that sorts
//! the frame by entity, then time.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Range;

use chrono::NaiveDateTime;

use super::*;

/// Index value enum
#[derive(Debug, Clone)]
pub enum IndexValue {
    Integer(i64),
    Float(f64),
    String(String),
    Datetime(NaiveDateTime),
}

impl IndexValue {
    fn rank(&self) -> u8 {
        match self {
            IndexValue::Integer(_) => 0,
            IndexValue::Float(_) => 1,
            IndexValue::Datetime(_) => 2,
            IndexValue::String(_) => 3,
        }
    }
}

impl From<SeriesValue> for IndexValue {
    fn from(value: SeriesValue) -> Self {
        match value {
            SeriesValue::Float(v) => IndexValue::Float(v),
            SeriesValue::Int(v) => IndexValue::Integer(v),
            SeriesValue::Bool(v) => IndexValue::Integer(i64::from(v)),
            SeriesValue::String(v) => IndexValue::String(v),
            SeriesValue::Datetime(v) => IndexValue::Datetime(v),
        }
    }
}

impl PartialEq for IndexValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for IndexValue {}

impl PartialOrd for IndexValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for IndexValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (IndexValue::Integer(a), IndexValue::Integer(b)) => a.cmp(b),
            (IndexValue::Float(a), IndexValue::Float(b)) => a.total_cmp(b),
            (IndexValue::String(a), IndexValue::String(b)) => a.cmp(b),
            (IndexValue::Datetime(a), IndexValue::Datetime(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl Hash for IndexValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            IndexValue::Integer(v) => v.hash(state),
            IndexValue::Float(v) => v.to_bits().hash(state),
            IndexValue::String(v) => v.hash(state),
            IndexValue::Datetime(v) => v.hash(state),
        }
    }
}

impl fmt::Display for IndexValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexValue::Integer(v) => write!(f, "{}", v),
            IndexValue::Float(v) => write!(f, "{}", v),
            IndexValue::String(v) => write!(f, "{}", v),
            IndexValue::Datetime(v) => write!(f, "{}", v.format("%Y-%m-%dT%H:%M:%S")),
        }
    }
}

/// Two-level (entity, time) index over the rows of a DataFrame
#[derive(Debug, Clone)]
pub struct PanelIndex {
    entity_col: String,
    time_col: String,
    entities: Vec<IndexValue>,
    periods: Vec<IndexValue>,
    /// Original row positions sorted by (entity, time)
    order: Vec<usize>,
    /// Entity code per sorted row
    entity_codes: Vec<usize>,
    /// Time code per sorted row
    time_codes: Vec<usize>,
}

impl PanelIndex {
    /// Build the index from two identifier columns
    pub fn new(df: &DataFrame, entity_col: &str, time_col: &str) -> Result<Self> {
        df.require_columns(&[entity_col, time_col])?;

        let entity_labels = labels(df, entity_col)?;
        let time_labels = labels(df, time_col)?;

        let entities = dense_codes(&entity_labels);
        let periods = dense_codes(&time_labels);

        let mut order: Vec<usize> = (0..df.nrows()).collect();
        order.sort_by(|&a, &b| {
            entity_labels[a]
                .cmp(&entity_labels[b])
                .then_with(|| time_labels[a].cmp(&time_labels[b]))
        });

        for pair in order.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if entity_labels[a] == entity_labels[b] && time_labels[a] == time_labels[b] {
                return Err(DataError::DuplicateObservation {
                    entity: entity_labels[a].to_string(),
                    time: time_labels[a].to_string(),
                });
            }
        }

        let entity_codes = order.iter().map(|&i| entities[&entity_labels[i]]).collect();
        let time_codes = order.iter().map(|&i| periods[&time_labels[i]]).collect();

        Ok(Self {
            entity_col: entity_col.to_string(),
            time_col: time_col.to_string(),
            entities: entities.into_keys().collect(),
            periods: periods.into_keys().collect(),
            order,
            entity_codes,
            time_codes,
        })
    }

    /// Name of the entity identifier column
    pub fn entity_col(&self) -> &str {
        &self.entity_col
    }

    /// Name of the time identifier column
    pub fn time_col(&self) -> &str {
        &self.time_col
    }

    /// Row permutation that sorts the source frame by (entity, time)
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Number of observations
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if the index is empty
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Number of distinct entities
    pub fn n_entities(&self) -> usize {
        self.entities.len()
    }

    /// Number of distinct time periods
    pub fn n_periods(&self) -> usize {
        self.periods.len()
    }

    /// Sorted distinct entity labels
    pub fn entities(&self) -> &[IndexValue] {
        &self.entities
    }

    /// Sorted distinct time labels
    pub fn periods(&self) -> &[IndexValue] {
        &self.periods
    }

    /// Entity code of each sorted row
    pub fn entity_codes(&self) -> &[usize] {
        &self.entity_codes
    }

    /// Time code of each sorted row
    pub fn time_codes(&self) -> &[usize] {
        &self.time_codes
    }

    /// Contiguous row ranges (in sorted order), one per entity
    pub fn groups(&self) -> Vec<Range<usize>> {
        let mut groups = Vec::with_capacity(self.entities.len());
        let mut start = 0;

        for i in 1..=self.entity_codes.len() {
            if i == self.entity_codes.len() || self.entity_codes[i] != self.entity_codes[start] {
                groups.push(start..i);
                start = i;
            }
        }

        groups
    }
}

fn labels(df: &DataFrame, column: &str) -> Result<Vec<IndexValue>> {
    let series = df.column(column)?;

    (0..df.nrows())
        .map(|i| {
            if series.is_missing(i) {
                return Err(DataError::MissingData(column.to_string()));
            }
            series
                .get(i)
                .map(IndexValue::from)
                .ok_or(DataError::IndexOutOfBounds {
                    index: i,
                    len: series.len(),
                })
        })
        .collect()
}

fn dense_codes(labels: &[IndexValue]) -> BTreeMap<IndexValue, usize> {
    let mut codes: BTreeMap<IndexValue, usize> =
        labels.iter().cloned().map(|label| (label, 0)).collect();
    for (code, slot) in codes.values_mut().enumerate() {
        *slot = code;
    }
    codes
}
