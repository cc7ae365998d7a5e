//! Reference sensors for the robot parameter model.
//!
//! - [`camera`] - rectified camera observing checkerboard corners in pixels
//! - [`chain`] - kinematic chain holding the checkerboard at its end effector
//!
//! [`StandardSensor`] lets one observation group mix both kinds.

pub mod camera;
pub mod chain;

use nalgebra::DVector;
use robocal_core::{ParamSelection, Pt3, Real, RobotParams};

use crate::error::EstimationError;
use crate::model::Sensor;

pub use camera::CameraSensor;
pub use chain::ChainSensor;

/// Any of the reference sensors.
#[derive(Debug, Clone)]
pub enum StandardSensor {
    Camera(CameraSensor),
    Chain(ChainSensor),
}

impl From<CameraSensor> for StandardSensor {
    fn from(sensor: CameraSensor) -> Self {
        StandardSensor::Camera(sensor)
    }
}

impl From<ChainSensor> for StandardSensor {
    fn from(sensor: ChainSensor) -> Self {
        StandardSensor::Chain(sensor)
    }
}

impl Sensor<RobotParams> for StandardSensor {
    fn residual_length(&self) -> usize {
        match self {
            StandardSensor::Camera(s) => s.residual_length(),
            StandardSensor::Chain(s) => s.residual_length(),
        }
    }

    fn sparsity(&self) -> ParamSelection {
        match self {
            StandardSensor::Camera(s) => s.sparsity(),
            StandardSensor::Chain(s) => s.sparsity(),
        }
    }

    fn refresh_from_model(&mut self, model: &RobotParams) -> Result<(), EstimationError> {
        match self {
            StandardSensor::Camera(s) => s.refresh_from_model(model),
            StandardSensor::Chain(s) => s.refresh_from_model(model),
        }
    }

    fn compute_residual(&self, target_points: &[Pt3]) -> Result<DVector<Real>, EstimationError> {
        match self {
            StandardSensor::Camera(s) => s.compute_residual(target_points),
            StandardSensor::Chain(s) => s.compute_residual(target_points),
        }
    }
}
