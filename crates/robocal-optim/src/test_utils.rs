//! Minimal model and sensor used by unit tests of the engine.

use nalgebra::DVector;
use robocal_core::{ModelError, Pt3, Real};

use crate::error::EstimationError;
use crate::model::{ParameterModel, Sensor};
use crate::multisensor::Multisensor;
use crate::params::FreeMask;

/// Flat parameter vector with a three-point target named `board`.
///
/// The board is fixed unless [`ToyModel::with_board_scale`] ties its size to
/// one parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ToyModel {
    pub params: DVector<Real>,
    board_scale: Option<usize>,
}

impl ToyModel {
    pub fn new(params: Vec<Real>) -> Self {
        Self {
            params: DVector::from_vec(params),
            board_scale: None,
        }
    }

    pub fn with_board_scale(mut self, index: usize) -> Self {
        self.board_scale = Some(index);
        self
    }

    pub fn board() -> Vec<Pt3> {
        vec![
            Pt3::new(0.0, 0.0, 0.0),
            Pt3::new(0.1, 0.0, 0.0),
            Pt3::new(0.0, 0.1, 0.0),
        ]
    }
}

impl ParameterModel for ToyModel {
    type Config = Vec<Real>;
    type Selection = Vec<bool>;

    fn from_config(config: &Vec<Real>) -> Result<Self, EstimationError> {
        Ok(Self::new(config.clone()))
    }

    fn to_config(&self) -> Vec<Real> {
        self.params.as_slice().to_vec()
    }

    fn num_params(&self) -> usize {
        self.params.len()
    }

    fn deflate(&self) -> DVector<Real> {
        self.params.clone()
    }

    fn inflate(&mut self, full: &DVector<Real>) -> Result<(), EstimationError> {
        if full.len() != self.params.len() {
            return Err(ModelError::ParamLength {
                expected: self.params.len(),
                got: full.len(),
            }
            .into());
        }
        self.params.copy_from(full);
        Ok(())
    }

    fn free_mask(&self, selection: &Vec<bool>) -> Result<FreeMask, EstimationError> {
        if selection.len() != self.params.len() {
            return Err(EstimationError::MaskLength {
                expected: self.params.len(),
                got: selection.len(),
            });
        }
        Ok(FreeMask::new(selection.clone()))
    }

    fn target_points(&self, target: &str) -> Result<Vec<Pt3>, EstimationError> {
        if target != "board" {
            return Err(ModelError::UnknownBlock {
                category: "checkerboard",
                name: target.to_string(),
            }
            .into());
        }
        Ok(match self.board_scale {
            Some(i) => Self::board().iter().map(|p| p * self.params[i]).collect(),
            None => Self::board(),
        })
    }

    fn target_mask(&self, target: &str) -> Result<FreeMask, EstimationError> {
        self.target_points(target)?;
        let mut mask = vec![false; self.params.len()];
        if let Some(i) = self.board_scale {
            mask[i] = true;
        }
        Ok(FreeMask::new(mask))
    }
}

/// Residual given by a plain function of the refreshed parameters and posed points.
#[derive(Debug, Clone)]
pub struct ToySensor {
    declared_len: usize,
    uses: Vec<bool>,
    eval: fn(&[Real], &[Pt3]) -> Vec<Real>,
    params: Option<Vec<Real>>,
}

impl ToySensor {
    pub fn new(
        declared_len: usize,
        uses: Vec<bool>,
        eval: fn(&[Real], &[Pt3]) -> Vec<Real>,
    ) -> Self {
        Self {
            declared_len,
            uses,
            eval,
            params: None,
        }
    }
}

impl Sensor<ToyModel> for ToySensor {
    fn residual_length(&self) -> usize {
        self.declared_len
    }

    fn sparsity(&self) -> Vec<bool> {
        self.uses.clone()
    }

    fn refresh_from_model(&mut self, model: &ToyModel) -> Result<(), EstimationError> {
        self.params = Some(model.params.as_slice().to_vec());
        Ok(())
    }

    fn compute_residual(&self, target_points: &[Pt3]) -> Result<DVector<Real>, EstimationError> {
        let params = self.params.as_ref().ok_or(EstimationError::NotRefreshed)?;
        Ok(DVector::from_vec((self.eval)(params, target_points)))
    }
}

pub fn toy_group(sensors: Vec<ToySensor>) -> Multisensor<ToyModel, ToySensor> {
    Multisensor::new("board", sensors)
}
