//! Six-parameter rigid transform.

use nalgebra::{Translation3, UnitQuaternion};
use serde::{Deserialize, Serialize};

use crate::{transform_points, Iso3, ModelError, Pt3, Real, Vec3};

/// Rigid transform parameterized as `[tx, ty, tz, rx, ry, rz]`.
///
/// The first three entries are the translation, the last three a rotation
/// vector (unit axis scaled by the angle in radians). The isometry is
/// re-derived every time the parameters change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "[Real; 6]", into = "[Real; 6]")]
pub struct SingleTransform {
    params: [Real; 6],
    iso: Iso3,
}

impl SingleTransform {
    pub const DIM: usize = 6;

    pub fn from_params(params: [Real; 6]) -> Self {
        Self {
            params,
            iso: params_to_iso(&params),
        }
    }

    pub fn identity() -> Self {
        Self::from_params([0.0; 6])
    }

    /// Build from a slice; fails unless it holds exactly six values.
    pub fn from_slice(params: &[Real]) -> Result<Self, ModelError> {
        let mut t = Self::identity();
        t.set_params(params)?;
        Ok(t)
    }

    /// Parameterize an existing isometry.
    pub fn from_iso(iso: &Iso3) -> Self {
        let t = iso.translation.vector;
        let r = iso.rotation.scaled_axis();
        Self {
            params: [t.x, t.y, t.z, r.x, r.y, r.z],
            iso: *iso,
        }
    }

    pub fn params(&self) -> &[Real; 6] {
        &self.params
    }

    pub fn set_params(&mut self, params: &[Real]) -> Result<(), ModelError> {
        if params.len() != Self::DIM {
            return Err(ModelError::ParamLength {
                expected: Self::DIM,
                got: params.len(),
            });
        }
        self.params.copy_from_slice(params);
        self.iso = params_to_iso(&self.params);
        Ok(())
    }

    pub fn iso(&self) -> &Iso3 {
        &self.iso
    }

    pub fn transform_points(&self, points: &[Pt3]) -> Vec<Pt3> {
        transform_points(&self.iso, points)
    }
}

impl Default for SingleTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<[Real; 6]> for SingleTransform {
    fn from(params: [Real; 6]) -> Self {
        Self::from_params(params)
    }
}

impl From<SingleTransform> for [Real; 6] {
    fn from(t: SingleTransform) -> Self {
        t.params
    }
}

fn params_to_iso(p: &[Real; 6]) -> Iso3 {
    let rotation = UnitQuaternion::from_scaled_axis(Vec3::new(p[3], p[4], p[5]));
    Iso3::from_parts(Translation3::new(p[0], p[1], p[2]), rotation)
}
