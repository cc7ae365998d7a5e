//! Parameter-vector bookkeeping for the estimation engine.
//!
//! - [`FreeMask`] splits a full parameter vector into its free subset and
//!   expands a subset back over a baseline.
//! - [`OptLayout`] describes the optimization vector: free parameters first,
//!   then one six-parameter pose block per observation group.

mod free_mask;
mod layout;

pub use free_mask::FreeMask;
pub use layout::{OptLayout, POSE_DIM};
