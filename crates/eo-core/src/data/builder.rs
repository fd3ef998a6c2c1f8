//! Builder pattern for constructing DataFrames

use indexmap::IndexMap;

use super::*;

/// Builder for creating DataFrames
#[derive(Debug, Default)]
pub struct DataFrameBuilder {
    columns: IndexMap<String, Series>,
    nrows: Option<usize>,
}

impl DataFrameBuilder {
    /// Create a new DataFrameBuilder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column to the DataFrame
    pub fn with_column<S: Into<String>>(mut self, name: S, series: Series) -> Result<Self> {
        let name = name.into();

        if self.columns.contains_key(&name) {
            return Err(DataError::DuplicateColumn(name));
        }

        // Check dimension consistency
        match self.nrows {
            Some(n) if series.len() != n => {
                return Err(DataError::DimensionMismatch {
                    expected: format!("{} rows", n),
                    actual: format!("{} rows", series.len()),
                });
            }
            None => {
                self.nrows = Some(series.len());
            }
            _ => {}
        }

        self.columns.insert(name, series);
        Ok(self)
    }

    /// Build the DataFrame
    pub fn build(self) -> Result<DataFrame> {
        Ok(DataFrame {
            columns: self.columns,
            nrows: self.nrows.unwrap_or(0),
        })
    }
}
