//! Forward-difference Jacobians restricted to a set of columns.
//!
//! Every column is computed from a private copy of the base point, so an
//! evaluation never has to restore state left behind by a previous one.

use nalgebra::{DMatrix, DVector};
use robocal_core::Real;

use crate::error::EstimationError;

/// Forward-difference step.
pub const FD_EPSILON: Real = 1e-6;

/// Column `index` of the Jacobian of `f` at `x0`: `(f(x0 + eps * e_index) - f0) / eps`.
pub fn jacobian_column<F>(
    f: &F,
    x0: &DVector<Real>,
    f0: &DVector<Real>,
    index: usize,
    epsilon: Real,
) -> Result<DVector<Real>, EstimationError>
where
    F: Fn(&DVector<Real>) -> Result<DVector<Real>, EstimationError>,
{
    let mut x = x0.clone();
    x[index] += epsilon;
    let f1 = f(&x)?;
    if f1.len() != f0.len() {
        return Err(EstimationError::PerturbedLength {
            expected: f0.len(),
            got: f1.len(),
        });
    }
    Ok((f1 - f0) / epsilon)
}

/// Jacobian of `f` at `x0`, evaluated only for `columns` (other columns stay zero).
///
/// Columns are evaluated sequentially in the given order.
pub fn forward_difference<F>(
    f: F,
    x0: &DVector<Real>,
    columns: &[usize],
    epsilon: Real,
) -> Result<DMatrix<Real>, EstimationError>
where
    F: Fn(&DVector<Real>) -> Result<DVector<Real>, EstimationError>,
{
    let f0 = f(x0)?;
    let mut jac = DMatrix::zeros(f0.len(), x0.len());
    for &col in columns {
        debug_assert!(col < x0.len());
        let column = jacobian_column(&f, x0, &f0, col, epsilon)?;
        jac.set_column(col, &column);
    }
    Ok(jac)
}
