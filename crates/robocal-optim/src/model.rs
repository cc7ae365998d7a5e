//! Contracts between the estimation engine and the parameter model / sensors.
//!
//! The engine never inspects the physics behind a model or sensor. It only
//! moves flat parameter vectors in and out of a [`ParameterModel`] and asks
//! each [`Sensor`] for a fixed-length residual against a set of target points.

use nalgebra::DVector;
use robocal_core::{ParamSelection, Pt3, Real, RobotParams};

use crate::error::EstimationError;
use crate::params::FreeMask;

/// Calibration parameter model reducible to, and reconstructible from, a flat vector.
///
/// Implementations must be cheap enough to clone: the engine evaluates every
/// residual on its own working copy.
pub trait ParameterModel: Clone {
    /// Serializable description of the whole model.
    type Config;
    /// Typed selection of parameter entries (free parameters, sensor sparsity).
    type Selection;

    fn from_config(config: &Self::Config) -> Result<Self, EstimationError>;
    fn to_config(&self) -> Self::Config;

    /// Number of entries in the full parameter vector.
    fn num_params(&self) -> usize;
    /// Flatten every parameter.
    fn deflate(&self) -> DVector<Real>;
    /// Overwrite every parameter and re-derive the model's cached state.
    fn inflate(&mut self, full: &DVector<Real>) -> Result<(), EstimationError>;
    /// Boolean mask aligned with [`Self::deflate`].
    fn free_mask(&self, selection: &Self::Selection) -> Result<FreeMask, EstimationError>;
    /// Canonical points of a named calibration target, in the target frame.
    fn target_points(&self, target: &str) -> Result<Vec<Pt3>, EstimationError>;
    /// Parameters [`Self::target_points`] depends on for `target`.
    fn target_mask(&self, target: &str) -> Result<FreeMask, EstimationError>;
}

/// A single measurement source of an observation group.
pub trait Sensor<M: ParameterModel>: Clone {
    /// Fixed number of residual entries this sensor produces.
    fn residual_length(&self) -> usize;
    /// Parameters this sensor's residual depends on, apart from the target
    /// geometry ([`ParameterModel::target_mask`]), which the engine adds itself.
    fn sparsity(&self) -> M::Selection;
    /// Pull every derived quantity the residual needs from an updated model.
    fn refresh_from_model(&mut self, model: &M) -> Result<(), EstimationError>;
    /// Residual against the posed target points (world frame).
    fn compute_residual(&self, target_points: &[Pt3]) -> Result<DVector<Real>, EstimationError>;
}

impl ParameterModel for RobotParams {
    type Config = RobotParams;
    type Selection = ParamSelection;

    fn from_config(config: &RobotParams) -> Result<Self, EstimationError> {
        config.validate()?;
        Ok(config.clone())
    }

    fn to_config(&self) -> RobotParams {
        self.clone()
    }

    fn num_params(&self) -> usize {
        RobotParams::num_params(self)
    }

    fn deflate(&self) -> DVector<Real> {
        RobotParams::deflate(self)
    }

    fn inflate(&mut self, full: &DVector<Real>) -> Result<(), EstimationError> {
        Ok(RobotParams::inflate(self, full)?)
    }

    fn free_mask(&self, selection: &ParamSelection) -> Result<FreeMask, EstimationError> {
        Ok(FreeMask::new(self.calc_free(selection)?))
    }

    fn target_points(&self, target: &str) -> Result<Vec<Pt3>, EstimationError> {
        Ok(self.checkerboard(target)?.generate_points())
    }

    fn target_mask(&self, target: &str) -> Result<FreeMask, EstimationError> {
        self.free_mask(&ParamSelection::default().with_checkerboard(target))
    }
}
