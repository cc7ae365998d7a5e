use nalgebra::DVector;
use robocal_core::Real;

use crate::error::EstimationError;

/// Boolean mask over the full parameter vector; `true` marks a selected entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreeMask {
    mask: Vec<bool>,
    free: Vec<usize>,
}

impl FreeMask {
    pub fn new(mask: Vec<bool>) -> Self {
        let free = mask
            .iter()
            .enumerate()
            .filter_map(|(i, f)| f.then_some(i))
            .collect();
        Self { mask, free }
    }

    /// Length of the full parameter vector this mask is aligned with.
    pub fn len(&self) -> usize {
        self.mask.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mask.is_empty()
    }

    pub fn count_free(&self) -> usize {
        self.free.len()
    }

    /// Full-vector indices of the selected entries, ascending.
    pub fn free_indices(&self) -> &[usize] {
        &self.free
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.mask
    }

    fn check_aligned(&self, len: usize) -> Result<(), EstimationError> {
        if len != self.mask.len() {
            return Err(EstimationError::MaskLength {
                expected: len,
                got: self.mask.len(),
            });
        }
        Ok(())
    }

    /// Selected entries of `full`, in order.
    pub fn extract(&self, full: &DVector<Real>) -> Result<DVector<Real>, EstimationError> {
        self.check_aligned(full.len())?;
        Ok(DVector::from_iterator(
            self.free.len(),
            self.free.iter().map(|&i| full[i]),
        ))
    }

    /// Copy of `baseline` with the selected entries overwritten, in order, by `subset`.
    pub fn expand(
        &self,
        baseline: &DVector<Real>,
        subset: &[Real],
    ) -> Result<DVector<Real>, EstimationError> {
        self.check_aligned(baseline.len())?;
        if subset.len() != self.free.len() {
            return Err(EstimationError::SubsetLength {
                expected: self.free.len(),
                got: subset.len(),
            });
        }
        let mut full = baseline.clone();
        for (&i, &v) in self.free.iter().zip(subset) {
            full[i] = v;
        }
        Ok(full)
    }

    /// Entries selected in either mask.
    pub fn union(&self, other: &FreeMask) -> Result<FreeMask, EstimationError> {
        self.check_aligned(other.len())?;
        Ok(FreeMask::new(
            self.mask.iter().zip(&other.mask).map(|(a, b)| *a || *b).collect(),
        ))
    }

    /// Positions within the free subset whose full-vector entry is also set in `other`.
    ///
    /// These are the optimization-vector columns a residual restricted to
    /// `other` can have non-zero derivatives in.
    pub fn free_columns(&self, other: &FreeMask) -> Result<Vec<usize>, EstimationError> {
        self.check_aligned(other.len())?;
        Ok(self
            .free
            .iter()
            .enumerate()
            .filter_map(|(col, &i)| other.mask[i].then_some(col))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::dvector;

    fn mask() -> FreeMask {
        FreeMask::new(vec![false, true, true, false, true])
    }

    #[test]
    fn counts_and_indices() {
        let m = mask();
        assert_eq!(m.len(), 5);
        assert_eq!(m.count_free(), 3);
        assert_eq!(m.free_indices(), &[1, 2, 4]);
    }

    #[test]
    fn extract_then_expand_is_identity() {
        let m = mask();
        let full = dvector![1.0, 2.0, 3.0, 4.0, 5.0];
        let subset = m.extract(&full).unwrap();
        assert_eq!(subset, dvector![2.0, 3.0, 5.0]);
        assert_eq!(m.expand(&full, subset.as_slice()).unwrap(), full);
    }

    #[test]
    fn expand_only_touches_free_entries() {
        let m = mask();
        let baseline = dvector![1.0, 2.0, 3.0, 4.0, 5.0];
        let full = m.expand(&baseline, &[20.0, 30.0, 50.0]).unwrap();
        assert_eq!(full, dvector![1.0, 20.0, 30.0, 4.0, 50.0]);
        // baseline is not modified
        assert_eq!(baseline[1], 2.0);
    }

    #[test]
    fn expand_rejects_wrong_subset_length() {
        let baseline = DVector::zeros(5);
        assert_eq!(
            mask().expand(&baseline, &[1.0]).unwrap_err(),
            EstimationError::SubsetLength {
                expected: 3,
                got: 1
            }
        );
    }

    #[test]
    fn misaligned_vectors_are_rejected() {
        let short = DVector::zeros(4);
        assert!(matches!(
            mask().extract(&short),
            Err(EstimationError::MaskLength { .. })
        ));
    }

    #[test]
    fn free_columns_intersect_in_subset_coordinates() {
        let m = mask();
        let sparsity = FreeMask::new(vec![true, false, true, true, true]);
        // free entries 1, 2, 4 -> columns 0, 1, 2; sparsity keeps 2 and 4
        assert_eq!(m.free_columns(&sparsity).unwrap(), vec![1, 2]);
    }

    #[test]
    fn union_selects_either() {
        let other = FreeMask::new(vec![true, false, false, false, true]);
        let u = mask().union(&other).unwrap();
        assert_eq!(u.free_indices(), &[0, 1, 2, 4]);
        assert!(mask().union(&FreeMask::new(vec![true])).is_err());
    }

    #[test]
    fn empty_mask_has_no_free_entries() {
        let m = FreeMask::new(vec![false; 3]);
        let full = dvector![1.0, 2.0, 3.0];
        assert_eq!(m.extract(&full).unwrap().len(), 0);
        assert_eq!(m.expand(&full, &[]).unwrap(), full);
    }
}
