use thiserror::Error;

/// Errors raised by the robot parameter model.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// A selection or sensor refers to a block the model does not have.
    #[error("unknown {category} block `{name}`")]
    UnknownBlock {
        category: &'static str,
        name: String,
    },
    /// A flat parameter slice has the wrong length.
    #[error("expected {expected} parameters, got {got}")]
    ParamLength { expected: usize, got: usize },
    /// A DH chain received the wrong number of joint positions.
    #[error("chain `{chain}` has {expected} joints, got {got} joint positions")]
    JointCount {
        chain: String,
        expected: usize,
        got: usize,
    },
    /// A per-block mask does not match the block shape.
    #[error("mask for {category} block `{name}` has {got} rows, expected {expected}")]
    MaskShape {
        category: &'static str,
        name: String,
        expected: usize,
        got: usize,
    },
    /// A checkerboard needs at least one corner in each direction.
    #[error("checkerboard `{name}` has no corners")]
    EmptyCheckerboard { name: String },
}
