use anyhow::Result;
use nalgebra::{DMatrix, DVector};
use robocal_core::Real;
use serde::{Deserialize, Serialize};

/// Generic non-linear least squares problem with dense parameter/residual vectors.
///
/// Evaluation is fallible: a contract violation inside the residual model is
/// reported instead of being turned into a bogus residual.
pub trait NllsProblem {
    /// Number of parameters in the optimization vector.
    fn num_params(&self) -> usize;
    /// Number of residual rows in the problem.
    fn num_residuals(&self) -> usize;

    /// Residuals for the given parameters.
    fn residuals(&self, x: &DVector<Real>) -> Result<DVector<Real>>;
    /// Jacobian of [`Self::residuals`], `num_residuals x num_params`.
    fn jacobian(&self, x: &DVector<Real>) -> Result<DMatrix<Real>>;
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SolveOptions {
    /// Maximum number of solver iterations before termination.
    ///
    /// Backends may interpret this as a function-evaluation cap; the LM backend
    /// follows the MINPACK convention `max_iters * (n + 1)`.
    pub max_iters: usize,
    /// Relative tolerance on the objective (cost) reduction.
    pub ftol: Real,
    /// Orthogonality/gradient tolerance.
    pub gtol: Real,
    /// Relative tolerance on parameter updates.
    pub xtol: Real,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            max_iters: 200,
            ftol: 1e-10,
            gtol: 1e-10,
            xtol: 1e-10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SolveReport {
    pub iterations: usize,
    pub final_cost: Real,
    pub converged: bool,
    /// Backend-specific description of why the solver stopped.
    pub termination: String,
}

pub trait NllsSolverBackend {
    fn solve<P: NllsProblem>(
        &self,
        problem: &P,
        x0: DVector<Real>,
        opts: &SolveOptions,
    ) -> Result<(DVector<Real>, SolveReport)>;
}
