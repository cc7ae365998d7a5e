//! Residual/Jacobian engine and solver driver for multi-sensor calibration.
//!
//! The engine jointly estimates the free entries of a [`ParameterModel`] and
//! one 6-parameter target pose per observation group ([`Multisensor`]). Each
//! group holds the [`Sensor`]s that observed a calibration target at one
//! unknown pose. The Jacobian is built by forward differences restricted to
//! the parameters each sensor declares it depends on.

mod error;

pub mod backend_lm;
pub mod error_calc;
pub mod finite_diff;
pub mod model;
pub mod multisensor;
pub mod opt_runner;
pub mod params;
pub mod sensors;
pub mod traits;

#[cfg(test)]
pub(crate) mod test_utils;

pub use backend_lm::LmBackend;
pub use error::EstimationError;
pub use error_calc::ErrorCalc;
pub use model::{ParameterModel, Sensor};
pub use multisensor::Multisensor;
pub use opt_runner::{opt_runner, OptRunnerOutput};
pub use params::{FreeMask, OptLayout, POSE_DIM};
pub use sensors::{CameraSensor, ChainSensor, StandardSensor};
pub use traits::{NllsProblem, NllsSolverBackend, SolveOptions, SolveReport};
