//! Design matrix extraction
//!
//! Turns named DataFrame columns into the `(y, X)` arrays the estimators
//! work on. When requested, an intercept column named `const` is placed
//! first, which is the column order every downstream summary assumes.

use ndarray::{Array1, Array2, Axis};

use crate::data::{DataError, DataFrame, FloatArray, Matrix, Result};

/// Name given to the intercept column
pub const CONSTANT: &str = "const";

/// Response vector and regressor matrix with column labels
#[derive(Debug, Clone, PartialEq)]
pub struct DesignMatrix {
    pub response: String,
    pub y: FloatArray,
    pub x: Matrix,
    /// Column labels of `x`, `const` first when present
    pub names: Vec<String>,
}

impl DesignMatrix {
    /// Extract `response ~ regressors` from a frame
    ///
    /// Every referenced column must exist and be numeric. Missing values are
    /// rejected here; callers drop incomplete rows beforehand.
    pub fn build<S: AsRef<str>>(
        df: &DataFrame,
        response: &str,
        regressors: &[S],
        add_constant: bool,
    ) -> Result<Self> {
        df.require_columns(&[response])?;
        df.require_columns(regressors)?;

        if regressors.is_empty() && !add_constant {
            return Err(DataError::InvalidParameter(
                "design matrix needs at least one regressor".to_string(),
            ));
        }

        let y = df.column_f64(response)?;
        if y.iter().any(|v| v.is_nan()) {
            return Err(DataError::MissingData(response.to_string()));
        }

        let n = df.nrows();
        let k = regressors.len() + usize::from(add_constant);
        let mut x = Array2::<f64>::zeros((n, k));
        let mut names = Vec::with_capacity(k);
        let mut col = 0;

        if add_constant {
            x.column_mut(0).fill(1.0);
            names.push(CONSTANT.to_string());
            col += 1;
        }

        for name in regressors {
            let name = name.as_ref();
            let values = df.column_f64(name)?;
            if values.iter().any(|v| v.is_nan()) {
                return Err(DataError::MissingData(name.to_string()));
            }
            x.column_mut(col).assign(&values);
            names.push(name.to_string());
            col += 1;
        }

        Ok(Self {
            response: response.to_string(),
            y,
            x,
            names,
        })
    }

    /// Number of observations
    pub fn nobs(&self) -> usize {
        self.y.len()
    }

    /// Number of columns in `x`
    pub fn ncols(&self) -> usize {
        self.x.ncols()
    }

    /// Whether the first column is the intercept
    pub fn has_constant(&self) -> bool {
        self.names.first().is_some_and(|n| n == CONSTANT)
    }

    /// Rows in the order given by `indices`
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        Self {
            response: self.response.clone(),
            y: self.y.select(Axis(0), indices),
            x: self.x.select(Axis(0), indices),
            names: self.names.clone(),
        }
    }
}

/// Prepend a column of ones
pub fn add_constant(x: &Matrix) -> Matrix {
    let mut out = Array2::<f64>::ones((x.nrows(), x.ncols() + 1));
    out.slice_mut(ndarray::s![.., 1..]).assign(x);
    out
}

/// Single column as an `n x 1` matrix
pub fn column_matrix(v: &Array1<f64>) -> Matrix {
    v.clone().insert_axis(Axis(1))
}
