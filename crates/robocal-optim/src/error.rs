use robocal_core::ModelError;
use thiserror::Error;

/// Precondition and contract violations raised while building residuals and Jacobians.
///
/// None of these are recoverable at this layer.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EstimationError {
    /// The optimization vector does not match `num_free + 6 * num_groups`.
    #[error(
        "optimization vector has length {got}, \
         expected {num_free} free parameters + 6 x {num_groups} poses"
    )]
    OptVectorLength {
        got: usize,
        num_free: usize,
        num_groups: usize,
    },
    /// A free-parameter subset does not match the number of free entries.
    #[error("free parameter subset has length {got}, expected {expected}")]
    SubsetLength { expected: usize, got: usize },
    /// A mask is not aligned with the full parameter vector.
    #[error("mask has length {got}, full parameter vector has {expected}")]
    MaskLength { expected: usize, got: usize },
    /// Pose guesses must be an `num_groups x 6` array.
    #[error("pose guesses are {rows}x{cols}, expected {expected_rows}x6")]
    PoseGuessShape {
        rows: usize,
        cols: usize,
        expected_rows: usize,
    },
    #[error("at least one observation group is required")]
    NoObservationGroups,
    #[error("observation group {0} has no sensors")]
    EmptyObservationGroup(usize),
    /// A sensor returned a residual of a different length than it declared.
    ///
    /// `group` is 0 when a group is evaluated on its own.
    #[error("sensor {sensor} of group {group} declared {declared} residuals but returned {actual}")]
    ResidualLength {
        group: usize,
        sensor: usize,
        declared: usize,
        actual: usize,
    },
    /// A perturbed evaluation changed the residual length.
    #[error("perturbed evaluation returned {got} residuals, base evaluation {expected}")]
    PerturbedLength { expected: usize, got: usize },
    /// A sensor was handed a point set that does not match its measurements.
    #[error("sensor expects {expected} target points, got {got}")]
    PointCount { expected: usize, got: usize },
    /// A sensor was evaluated before being refreshed from a model.
    #[error("sensor has not been refreshed from a parameter model")]
    NotRefreshed,
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl EstimationError {
    /// Attribute a group-local failure to observation group `group`.
    pub(crate) fn in_group(self, group: usize) -> Self {
        match self {
            EstimationError::ResidualLength {
                sensor,
                declared,
                actual,
                ..
            } => EstimationError::ResidualLength {
                group,
                sensor,
                declared,
                actual,
            },
            other => other,
        }
    }
}
