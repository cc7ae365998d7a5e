//! Core math and model primitives for `robocal`.
//!
//! This crate contains:
//! - linear algebra type aliases (`Real`, `Pt3`, `Iso3`, ...),
//! - the six-parameter pose used for calibration targets ([`SingleTransform`]),
//! - the reference robot parameter model ([`RobotParams`]) with its
//!   DH chains, transforms, rectified cameras and checkerboards,
//! - explicit parameter selections ([`ParamSelection`]) used as free and
//!   sparsity masks.

mod error;
/// Linear algebra type aliases and helpers.
pub mod math;
/// Calibration primitives and the robot parameter model.
pub mod models;

pub use error::ModelError;
pub use math::*;
pub use models::*;
