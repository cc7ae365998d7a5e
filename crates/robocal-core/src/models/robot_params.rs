//! Robot parameter model: every calibration primitive of the system.

use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Checkerboard, DhChain, ParamSelection, RectifiedCamera, SingleTransform};
use crate::{ModelError, Real};

const DH_CHAINS: &str = "dh_chains";
const TRANSFORMS: &str = "transforms";
const RECTIFIED_CAMS: &str = "rectified_cams";
const CHECKERBOARDS: &str = "checkerboards";

/// All calibration primitives, keyed by name within each category.
///
/// The flat parameter vector lists the categories in declaration order
/// (DH chains, transforms, rectified cameras, checkerboards), blocks sorted by
/// name, and each block's parameters in its own order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotParams {
    pub dh_chains: BTreeMap<String, DhChain>,
    pub transforms: BTreeMap<String, SingleTransform>,
    pub rectified_cams: BTreeMap<String, RectifiedCamera>,
    pub checkerboards: BTreeMap<String, Checkerboard>,
}

impl RobotParams {
    /// Shape checks applied to a freshly loaded configuration.
    pub fn validate(&self) -> Result<(), ModelError> {
        for (name, board) in &self.checkerboards {
            if board.num_points() == 0 {
                return Err(ModelError::EmptyCheckerboard { name: name.clone() });
            }
        }
        Ok(())
    }

    pub fn num_params(&self) -> usize {
        self.dh_chains.values().map(DhChain::dim).sum::<usize>()
            + SingleTransform::DIM * self.transforms.len()
            + RectifiedCamera::DIM * self.rectified_cams.len()
            + Checkerboard::DIM * self.checkerboards.len()
    }

    /// Flatten every parameter into one vector.
    pub fn deflate(&self) -> DVector<Real> {
        let mut flat = Vec::with_capacity(self.num_params());
        for chain in self.dh_chains.values() {
            chain.write_params(&mut flat);
        }
        for t in self.transforms.values() {
            flat.extend_from_slice(t.params());
        }
        for cam in self.rectified_cams.values() {
            flat.extend_from_slice(&cam.params());
        }
        for board in self.checkerboards.values() {
            flat.extend_from_slice(&board.params());
        }
        DVector::from_vec(flat)
    }

    /// Overwrite every parameter from a flat vector and re-derive cached state.
    pub fn inflate(&mut self, full: &DVector<Real>) -> Result<(), ModelError> {
        let expected = self.num_params();
        if full.len() != expected {
            return Err(ModelError::ParamLength {
                expected,
                got: full.len(),
            });
        }
        let mut rest = full.as_slice();
        for chain in self.dh_chains.values_mut() {
            chain.set_params(take(&mut rest, chain.dim()))?;
        }
        for t in self.transforms.values_mut() {
            t.set_params(take(&mut rest, SingleTransform::DIM))?;
        }
        for cam in self.rectified_cams.values_mut() {
            cam.set_params(take(&mut rest, RectifiedCamera::DIM))?;
        }
        for board in self.checkerboards.values_mut() {
            board.set_params(take(&mut rest, Checkerboard::DIM))?;
        }
        debug_assert!(rest.is_empty());
        Ok(())
    }

    /// Expand a selection into a boolean mask aligned with [`Self::deflate`].
    pub fn calc_free(&self, selection: &ParamSelection) -> Result<Vec<bool>, ModelError> {
        check_known(DH_CHAINS, &selection.dh_chains, &self.dh_chains)?;
        check_known(TRANSFORMS, &selection.transforms, &self.transforms)?;
        check_known(RECTIFIED_CAMS, &selection.rectified_cams, &self.rectified_cams)?;
        check_known(CHECKERBOARDS, &selection.checkerboards, &self.checkerboards)?;

        let mut mask = Vec::with_capacity(self.num_params());
        for (name, chain) in &self.dh_chains {
            match selection.dh_chains.get(name) {
                Some(rows) if rows.len() != chain.num_joints() => {
                    return Err(ModelError::MaskShape {
                        category: DH_CHAINS,
                        name: name.clone(),
                        expected: chain.num_joints(),
                        got: rows.len(),
                    });
                }
                Some(rows) => mask.extend(rows.iter().flatten()),
                None => mask.extend(std::iter::repeat(false).take(chain.dim())),
            }
        }
        for name in self.transforms.keys() {
            let block = selection.transforms.get(name).copied().unwrap_or_default();
            mask.extend(block);
        }
        for name in self.rectified_cams.keys() {
            let block = selection.rectified_cams.get(name).copied().unwrap_or_default();
            mask.extend(block.to_array());
        }
        for name in self.checkerboards.keys() {
            let block = selection.checkerboards.get(name).copied().unwrap_or_default();
            mask.extend(block.to_array());
        }
        debug_assert_eq!(mask.len(), self.num_params());
        Ok(mask)
    }

    /// Copy of this model with every parameter taken from `full`.
    pub fn params_to_config(&self, full: &DVector<Real>) -> Result<RobotParams, ModelError> {
        let mut config = self.clone();
        config.inflate(full)?;
        Ok(config)
    }

    pub fn dh_chain(&self, name: &str) -> Result<&DhChain, ModelError> {
        lookup(DH_CHAINS, &self.dh_chains, name)
    }

    pub fn transform(&self, name: &str) -> Result<&SingleTransform, ModelError> {
        lookup(TRANSFORMS, &self.transforms, name)
    }

    pub fn rectified_cam(&self, name: &str) -> Result<&RectifiedCamera, ModelError> {
        lookup(RECTIFIED_CAMS, &self.rectified_cams, name)
    }

    pub fn checkerboard(&self, name: &str) -> Result<&Checkerboard, ModelError> {
        lookup(CHECKERBOARDS, &self.checkerboards, name)
    }
}

fn take<'a>(rest: &mut &'a [Real], n: usize) -> &'a [Real] {
    let (head, tail) = rest.split_at(n);
    *rest = tail;
    head
}

fn lookup<'a, T>(
    category: &'static str,
    blocks: &'a BTreeMap<String, T>,
    name: &str,
) -> Result<&'a T, ModelError> {
    blocks.get(name).ok_or_else(|| ModelError::UnknownBlock {
        category,
        name: name.to_string(),
    })
}

fn check_known<M, T>(
    category: &'static str,
    selected: &BTreeMap<String, M>,
    blocks: &BTreeMap<String, T>,
) -> Result<(), ModelError> {
    match selected.keys().find(|name| !blocks.contains_key(*name)) {
        Some(name) => Err(ModelError::UnknownBlock {
            category,
            name: name.clone(),
        }),
        None => Ok(()),
    }
}
