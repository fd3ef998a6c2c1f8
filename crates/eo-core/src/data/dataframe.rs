//! DataFrame implementation for tabular data
//!
//! A DataFrame is a 2-dimensional labeled data structure with columns of
//! potentially different types. It's optimized for statistical operations.

use super::*;

use indexmap::IndexMap;

/// Main DataFrame structure
#[derive(Clone, Debug, Default)]
pub struct DataFrame {
    pub(crate) columns: IndexMap<String, Series>,
    pub(crate) nrows: usize,
}

impl DataFrame {
    /// Create an empty DataFrame
    pub fn new() -> Self {
        Self::default()
    }

    /// Create DataFrame from columns
    pub fn from_columns<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Series)>,
        S: Into<String>,
    {
        let mut builder = DataFrameBuilder::new();

        for (name, series) in columns.into_iter() {
            builder = builder.with_column(name, series)?;
        }

        builder.build()
    }

    /// Get the shape of the DataFrame (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        (self.nrows, self.columns.len())
    }

    /// Get the number of rows
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    /// Get the number of columns
    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    /// Get column names
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.keys().map(|k| k.as_str()).collect()
    }

    /// Get a reference to a column
    pub fn get_column(&self, name: &str) -> Option<&Series> {
        self.columns.get(name)
    }

    /// Get a column or a `ColumnNotFound` error listing what is available
    pub fn column(&self, name: &str) -> Result<&Series> {
        self.columns
            .get(name)
            .ok_or_else(|| self.column_not_found(name))
    }

    /// Check if column exists
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Fail on the first name that is not a column of this frame
    pub fn require_columns<S: AsRef<str>>(&self, names: &[S]) -> Result<()> {
        match names.iter().find(|name| !self.has_column(name.as_ref())) {
            Some(missing) => Err(self.column_not_found(missing.as_ref())),
            None => Ok(()),
        }
    }

    fn column_not_found(&self, name: &str) -> DataError {
        DataError::ColumnNotFound {
            column: name.to_string(),
            available: self.columns.keys().cloned().collect(),
        }
    }

    /// Numeric column as `f64` values
    pub fn column_f64(&self, name: &str) -> Result<FloatArray> {
        let series = self.column(name)?;
        series.to_f64().ok_or_else(|| DataError::NonNumericData {
            column: name.to_string(),
            dtype: series.dtype(),
        })
    }

    /// Select specific columns
    pub fn select<I, S>(&self, names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = DataFrameBuilder::new();

        for name in names.into_iter() {
            let name = name.as_ref();
            builder = builder.with_column(name, self.column(name)?.clone())?;
        }

        builder.build()
    }

    /// Filter rows with a boolean mask
    pub fn filter(&self, mask: &[bool]) -> Result<Self> {
        if mask.len() != self.nrows {
            return Err(DataError::DimensionMismatch {
                expected: format!("mask length {}", self.nrows),
                actual: format!("mask length {}", mask.len()),
            });
        }

        let mut builder = DataFrameBuilder::new();

        for (name, series) in &self.columns {
            let filtered = series.filter(mask)?;
            builder = builder.with_column(name.clone(), filtered)?;
        }

        let mut df = builder.build()?;
        df.nrows = mask.iter().filter(|keep| **keep).count();
        Ok(df)
    }

    /// Mask of rows with no missing value in any of `names`
    pub fn complete_rows<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<bool>> {
        let mut mask = vec![true; self.nrows];

        for name in names {
            let series = self.column(name.as_ref())?;
            for (i, keep) in mask.iter_mut().enumerate() {
                if series.is_missing(i) {
                    *keep = false;
                }
            }
        }

        Ok(mask)
    }

    /// Add a new column
    pub fn with_column<S: Into<String>>(mut self, name: S, series: Series) -> Result<Self> {
        let name = name.into();

        if self.columns.contains_key(&name) {
            return Err(DataError::DuplicateColumn(name));
        }

        if !self.columns.is_empty() && series.len() != self.nrows {
            return Err(DataError::DimensionMismatch {
                expected: format!("{} rows", self.nrows),
                actual: format!("{} rows", series.len()),
            });
        }

        if self.columns.is_empty() {
            self.nrows = series.len();
        }

        self.columns.insert(name, series);

        Ok(self)
    }

    /// Rows in the order given by `indices`
    pub fn reorder_rows(&self, indices: &[usize]) -> Result<Self> {
        let mut builder = DataFrameBuilder::new();

        for (name, series) in &self.columns {
            let reordered = series.reorder(indices)?;
            builder = builder.with_column(name.clone(), reordered)?;
        }

        let mut df = builder.build()?;
        df.nrows = indices.len();
        Ok(df)
    }
}

impl std::fmt::Display for DataFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DataFrame({} rows × {} cols)", self.nrows, self.ncols())
    }
}
