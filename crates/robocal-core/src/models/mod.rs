//! Calibration primitives and the robot parameter model built from them.
//!
//! Each primitive owns a fixed-size (or, for DH chains, per-joint) block of
//! the flat parameter vector and re-derives its cached geometry whenever the
//! block is overwritten.

mod checkerboard;
mod dh_chain;
mod rectified_cam;
mod robot_params;
mod selection;
mod transform;

pub use checkerboard::*;
pub use dh_chain::*;
pub use rectified_cam::*;
pub use robot_params::*;
pub use selection::*;
pub use transform::*;
