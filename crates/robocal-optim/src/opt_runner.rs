//! Solver driver: model configuration in, refined configuration out.

use anyhow::Result;
use log::info;
use nalgebra::{DMatrix, DVector};
use robocal_core::{Real, SingleTransform};

use crate::error::EstimationError;
use crate::error_calc::ErrorCalc;
use crate::model::{ParameterModel, Sensor};
use crate::multisensor::Multisensor;
use crate::params::POSE_DIM;
use crate::{NllsSolverBackend, SolveOptions, SolveReport};

/// Result of [`opt_runner`].
#[derive(Debug, Clone)]
pub struct OptRunnerOutput<C> {
    /// Model configuration with the refined free parameters.
    pub params: C,
    /// One refined target pose per group, `[tx, ty, tz, rx, ry, rz]` per row.
    pub target_poses: DMatrix<Real>,
    /// `sqrt(mean(r^2))` over the final residual.
    pub rms_error: Real,
    pub report: SolveReport,
}

/// Jointly refine the free model parameters and the per-group target poses.
///
/// `pose_guesses` holds one row per group in group order.
pub fn opt_runner<M, S, B>(
    backend: &B,
    config: &M::Config,
    pose_guesses: &DMatrix<Real>,
    free: &M::Selection,
    multisensors: Vec<Multisensor<M, S>>,
    opts: &SolveOptions,
) -> Result<OptRunnerOutput<M::Config>>
where
    M: ParameterModel,
    S: Sensor<M>,
    B: NllsSolverBackend,
{
    let poses = poses_from_matrix(pose_guesses, multisensors.len())?;
    let model = M::from_config(config)?;
    let calc = ErrorCalc::new(model, free, multisensors)?;

    let layout = calc.layout();
    let x0 = layout.join(calc.initial_free_params().as_slice(), &poses)?;
    info!(
        "optimizing {} free parameters and {} target poses over {} residuals",
        layout.num_free,
        layout.num_groups,
        calc.num_residuals()
    );

    let (x_opt, report) = backend.solve(&calc, x0, opts)?;

    let (opt_params, opt_poses) = calc.split_all(&x_opt)?;
    let mut refined = calc.model().clone();
    refined.inflate(&calc.calculate_full_param_vec(opt_params)?)?;

    let rms_error = rms(&calc.calculate_error(&x_opt)?);
    info!(
        "RMS error: {rms_error:.6e} ({} evaluations, {})",
        report.iterations, report.termination
    );

    Ok(OptRunnerOutput {
        params: refined.to_config(),
        target_poses: poses_to_matrix(&opt_poses),
        rms_error,
        report,
    })
}

/// Root mean square of a residual vector; zero when empty.
pub fn rms(r: &DVector<Real>) -> Real {
    if r.is_empty() {
        return 0.0;
    }
    (r.norm_squared() / r.len() as Real).sqrt()
}

/// Stack poses into an `N x 6` matrix.
pub fn poses_to_matrix(poses: &[SingleTransform]) -> DMatrix<Real> {
    DMatrix::from_fn(poses.len(), POSE_DIM, |i, j| poses[i].params()[j])
}

/// Read `expected_rows` poses from an `N x 6` matrix.
pub fn poses_from_matrix(
    m: &DMatrix<Real>,
    expected_rows: usize,
) -> Result<Vec<SingleTransform>, EstimationError> {
    if m.ncols() != POSE_DIM || m.nrows() != expected_rows {
        return Err(EstimationError::PoseGuessShape {
            rows: m.nrows(),
            cols: m.ncols(),
            expected_rows,
        });
    }
    Ok((0..m.nrows())
        .map(|i| SingleTransform::from_params(std::array::from_fn(|j| m[(i, j)])))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend_lm::LmBackend;
    use crate::test_utils::{toy_group, ToyModel, ToySensor};
    use approx::assert_relative_eq;
    use nalgebra::dvector;
    use robocal_core::Pt3;

    /// r = [p0 - 2 + x_0, p1 + 1 + y_0]
    fn offset(p: &[Real], pts: &[Pt3]) -> Vec<Real> {
        vec![p[0] - 2.0 + pts[0].x, p[1] + 1.0 + pts[0].y]
    }

    #[test]
    fn pose_guess_shape_is_checked_first() {
        let groups = vec![toy_group(vec![ToySensor::new(2, vec![true, true], offset)])];
        let err = opt_runner(
            &LmBackend,
            &vec![0.0, 0.0],
            &DMatrix::zeros(2, 6),
            &vec![true, true],
            groups,
            &SolveOptions::default(),
        )
        .unwrap_err();
        assert_eq!(
            err.downcast_ref::<EstimationError>(),
            Some(&EstimationError::PoseGuessShape {
                rows: 2,
                cols: 6,
                expected_rows: 1
            })
        );
    }

    #[test]
    fn fixed_params_are_untouched() {
        let groups = vec![toy_group(vec![ToySensor::new(2, vec![true, true], offset)])];
        let out = opt_runner(
            &LmBackend,
            &vec![0.0, 0.0],
            &DMatrix::zeros(1, 6),
            &vec![false, false],
            groups,
            &SolveOptions::default(),
        )
        .unwrap();
        assert_eq!(out.params, vec![0.0, 0.0]);
        assert_eq!(out.target_poses.shape(), (1, 6));
        // the pose absorbs the offset
        assert_relative_eq!(out.target_poses[(0, 0)], 2.0, epsilon = 1e-6);
        assert_relative_eq!(out.target_poses[(0, 1)], -1.0, epsilon = 1e-6);
        assert!(out.rms_error < 1e-8);
    }

    #[test]
    fn rms_of_known_vector() {
        assert_relative_eq!(rms(&dvector![3.0, -4.0]), (12.5 as Real).sqrt());
        assert_eq!(rms(&DVector::zeros(0)), 0.0);
    }

    #[test]
    fn pose_matrix_conversion() {
        let poses = vec![
            SingleTransform::from_params([1.0, 2.0, 3.0, 0.1, 0.2, 0.3]),
            SingleTransform::identity(),
        ];
        let m = poses_to_matrix(&poses);
        assert_eq!(m.shape(), (2, 6));
        assert_eq!(m[(0, 5)], 0.3);
        let back = poses_from_matrix(&m, 2).unwrap();
        assert_eq!(back[0].params(), poses[0].params());
        assert!(poses_from_matrix(&m.transpose(), 2).is_err());
    }
}
