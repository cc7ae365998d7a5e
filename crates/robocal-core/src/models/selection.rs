//! Parameter selection masks.
//!
//! A [`ParamSelection`] marks entries of the robot parameter vector, one
//! typed mask per block. It is used both to declare which parameters are free
//! during optimization and to declare which parameters a sensor depends on.
//! Blocks that do not appear in a category are unselected.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-joint DH mask, same order as [`super::DhRow`]: `[theta, alpha, a, d]`.
pub type DhRowMask = [bool; 4];

/// Transform mask, same order as the transform parameters `[tx, ty, tz, rx, ry, rz]`.
pub type TransformMask = [bool; 6];

/// Mask over rectified camera parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RectifiedCamMask {
    pub fx: bool,
    pub fy: bool,
    pub cx: bool,
    pub cy: bool,
    pub baseline_shift: bool,
}

impl RectifiedCamMask {
    pub fn all() -> Self {
        Self {
            fx: true,
            fy: true,
            cx: true,
            cy: true,
            baseline_shift: true,
        }
    }

    pub fn to_array(self) -> [bool; 5] {
        [self.fx, self.fy, self.cx, self.cy, self.baseline_shift]
    }
}

/// Mask over checkerboard spacing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckerboardMask {
    pub spacing_x: bool,
    pub spacing_y: bool,
}

impl CheckerboardMask {
    pub fn all() -> Self {
        Self {
            spacing_x: true,
            spacing_y: true,
        }
    }

    pub fn to_array(self) -> [bool; 2] {
        [self.spacing_x, self.spacing_y]
    }
}

/// Selection over every parameter category of the robot model.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParamSelection {
    pub dh_chains: BTreeMap<String, Vec<DhRowMask>>,
    pub transforms: BTreeMap<String, TransformMask>,
    pub rectified_cams: BTreeMap<String, RectifiedCamMask>,
    pub checkerboards: BTreeMap<String, CheckerboardMask>,
}

impl ParamSelection {
    /// Select every DH entry of a chain with `num_joints` joints.
    pub fn with_dh_chain(mut self, name: &str, num_joints: usize) -> Self {
        self.dh_chains
            .insert(name.to_string(), vec![[true; 4]; num_joints]);
        self
    }

    pub fn with_dh_chain_mask(mut self, name: &str, rows: Vec<DhRowMask>) -> Self {
        self.dh_chains.insert(name.to_string(), rows);
        self
    }

    pub fn with_transform(mut self, name: &str) -> Self {
        self.transforms.insert(name.to_string(), [true; 6]);
        self
    }

    pub fn with_transform_mask(mut self, name: &str, mask: TransformMask) -> Self {
        self.transforms.insert(name.to_string(), mask);
        self
    }

    pub fn with_rectified_cam(self, name: &str) -> Self {
        self.with_rectified_cam_mask(name, RectifiedCamMask::all())
    }

    pub fn with_rectified_cam_mask(mut self, name: &str, mask: RectifiedCamMask) -> Self {
        self.rectified_cams.insert(name.to_string(), mask);
        self
    }

    pub fn with_checkerboard(self, name: &str) -> Self {
        self.with_checkerboard_mask(name, CheckerboardMask::all())
    }

    pub fn with_checkerboard_mask(mut self, name: &str, mask: CheckerboardMask) -> Self {
        self.checkerboards.insert(name.to_string(), mask);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.dh_chains.is_empty()
            && self.transforms.is_empty()
            && self.rectified_cams.is_empty()
            && self.checkerboards.is_empty()
    }
}
