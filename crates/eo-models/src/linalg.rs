//! Dense linear algebra on `ndarray` values
//!
//! Arrays stay in `ndarray` everywhere else in the crate; the decompositions
//! are delegated to `nalgebra` and converted back at this boundary.

use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use crate::base::Result;
use crate::error::ModelError;

/// Relative singular-value cutoff used for rank checks
const RANK_TOL: f64 = 1e-10;

pub(crate) fn to_dmatrix(a: &ArrayView2<'_, f64>) -> DMatrix<f64> {
    DMatrix::from_fn(a.nrows(), a.ncols(), |i, j| a[[i, j]])
}

pub(crate) fn to_dvector(v: &ArrayView1<'_, f64>) -> DVector<f64> {
    DVector::from_iterator(v.len(), v.iter().copied())
}

pub(crate) fn from_dmatrix(m: &DMatrix<f64>) -> Array2<f64> {
    Array2::from_shape_fn((m.nrows(), m.ncols()), |(i, j)| m[(i, j)])
}

pub(crate) fn from_dvector(v: &DVector<f64>) -> Array1<f64> {
    v.iter().copied().collect()
}

/// Inverse of a square matrix, `SingularMatrix` when it does not exist
pub fn inv(a: &Array2<f64>, operation: &str) -> Result<Array2<f64>> {
    let m = to_dmatrix(&a.view());
    let inverse = m
        .try_inverse()
        .ok_or_else(|| ModelError::singular(operation))?;

    if inverse.iter().any(|v| !v.is_finite()) {
        return Err(ModelError::singular(operation));
    }

    Ok(from_dmatrix(&inverse))
}

/// Inverse of a symmetric positive definite matrix via Cholesky
pub fn inv_spd(a: &Array2<f64>, operation: &str) -> Result<Array2<f64>> {
    let chol = to_dmatrix(&a.view())
        .cholesky()
        .ok_or_else(|| ModelError::singular(operation))?;
    Ok(from_dmatrix(&chol.inverse()))
}

/// Least squares solution of `x b = y` through the SVD
///
/// Fails when `x` is numerically rank deficient, since the coefficient
/// covariance would not exist.
pub fn lstsq(x: &Array2<f64>, y: &Array1<f64>, operation: &str) -> Result<Array1<f64>> {
    let svd = to_dmatrix(&x.view()).svd(true, true);

    let max_sv = svd.singular_values.iter().copied().fold(0.0_f64, f64::max);
    let min_sv = svd
        .singular_values
        .iter()
        .copied()
        .fold(f64::INFINITY, f64::min);
    if max_sv == 0.0 || min_sv <= RANK_TOL * max_sv {
        return Err(ModelError::singular(operation));
    }

    let solution = svd
        .solve(&to_dvector(&y.view()), RANK_TOL * max_sv)
        .map_err(|e| ModelError::numerical(e, operation))?;

    Ok(from_dvector(&solution))
}

/// `X'X`
pub fn gram(x: &Array2<f64>) -> Array2<f64> {
    x.t().dot(x)
}
