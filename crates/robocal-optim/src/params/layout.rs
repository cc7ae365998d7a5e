use nalgebra::DVector;
use robocal_core::{Real, SingleTransform};
use std::ops::Range;

use crate::error::EstimationError;

/// Number of parameters of one target pose block.
pub const POSE_DIM: usize = SingleTransform::DIM;

/// Column layout of the optimization vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptLayout {
    pub num_free: usize,
    pub num_groups: usize,
}

impl OptLayout {
    pub fn new(num_free: usize, num_groups: usize) -> Self {
        Self {
            num_free,
            num_groups,
        }
    }

    pub fn len(&self) -> usize {
        self.num_free + POSE_DIM * self.num_groups
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn param_columns(&self) -> Range<usize> {
        0..self.num_free
    }

    pub fn pose_columns(&self, group: usize) -> Range<usize> {
        let start = self.num_free + POSE_DIM * group;
        start..start + POSE_DIM
    }

    pub fn check(&self, x: &DVector<Real>) -> Result<(), EstimationError> {
        if x.len() != self.len() {
            return Err(EstimationError::OptVectorLength {
                got: x.len(),
                num_free: self.num_free,
                num_groups: self.num_groups,
            });
        }
        Ok(())
    }

    /// Split into the free-parameter prefix and one pose per group.
    pub fn split<'a>(
        &self,
        x: &'a DVector<Real>,
    ) -> Result<(&'a [Real], Vec<SingleTransform>), EstimationError> {
        self.check(x)?;
        let (params, poses) = x.as_slice().split_at(self.num_free);
        let poses = poses
            .chunks_exact(POSE_DIM)
            .map(SingleTransform::from_slice)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((params, poses))
    }

    /// Concatenate a free-parameter subset and pose blocks.
    pub fn join(
        &self,
        params: &[Real],
        poses: &[SingleTransform],
    ) -> Result<DVector<Real>, EstimationError> {
        if params.len() != self.num_free || poses.len() != self.num_groups {
            return Err(EstimationError::OptVectorLength {
                got: params.len() + POSE_DIM * poses.len(),
                num_free: self.num_free,
                num_groups: self.num_groups,
            });
        }
        let mut x = Vec::with_capacity(self.len());
        x.extend_from_slice(params);
        for pose in poses {
            x.extend_from_slice(pose.params());
        }
        Ok(DVector::from_vec(x))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_partition_the_vector() {
        let layout = OptLayout::new(3, 2);
        assert_eq!(layout.len(), 15);
        assert_eq!(layout.param_columns(), 0..3);
        assert_eq!(layout.pose_columns(0), 3..9);
        assert_eq!(layout.pose_columns(1), 9..15);
    }

    #[test]
    fn split_then_join_is_identity() {
        let layout = OptLayout::new(2, 2);
        let x = DVector::from_iterator(14, (0..14).map(|i| i as Real * 0.01));
        let (params, poses) = layout.split(&x).unwrap();
        assert_eq!(params, &[0.0, 0.01]);
        assert_eq!(poses.len(), 2);
        assert_eq!(poses[1].params()[0], x[8]);
        assert_eq!(layout.join(params, &poses).unwrap(), x);
    }

    #[test]
    fn split_rejects_partial_pose_blocks() {
        let layout = OptLayout::new(2, 2);
        let x = DVector::zeros(13);
        assert_eq!(
            layout.split(&x).unwrap_err(),
            EstimationError::OptVectorLength {
                got: 13,
                num_free: 2,
                num_groups: 2
            }
        );
    }

    #[test]
    fn split_rejects_extra_groups() {
        let layout = OptLayout::new(0, 1);
        assert!(layout.split(&DVector::zeros(12)).is_err());
    }
}
