//! Serial kinematic chain in Denavit-Hartenberg form.

use nalgebra::{Translation3, UnitQuaternion};
use serde::{Deserialize, Serialize};

use crate::{Iso3, ModelError, Real, Vec3};

/// One DH row: `[theta, alpha, a, d]`.
pub type DhRow = [Real; 4];

/// Chain of revolute joints described by standard DH parameters.
///
/// Link `i` contributes `RotZ(theta_i + q_i) * TransZ(d_i) * TransX(a_i) * RotX(alpha_i)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DhChain {
    pub dh: Vec<DhRow>,
}

impl DhChain {
    pub fn num_joints(&self) -> usize {
        self.dh.len()
    }

    pub fn dim(&self) -> usize {
        4 * self.dh.len()
    }

    pub fn write_params(&self, out: &mut Vec<Real>) {
        out.extend(self.dh.iter().flatten());
    }

    pub fn set_params(&mut self, params: &[Real]) -> Result<(), ModelError> {
        if params.len() != self.dim() {
            return Err(ModelError::ParamLength {
                expected: self.dim(),
                got: params.len(),
            });
        }
        for (row, chunk) in self.dh.iter_mut().zip(params.chunks_exact(4)) {
            row.copy_from_slice(chunk);
        }
        Ok(())
    }

    /// Forward kinematics: pose of the end effector in the chain base frame.
    pub fn fk(&self, name: &str, joints: &[Real]) -> Result<Iso3, ModelError> {
        if joints.len() != self.num_joints() {
            return Err(ModelError::JointCount {
                chain: name.to_string(),
                expected: self.num_joints(),
                got: joints.len(),
            });
        }
        Ok(self
            .dh
            .iter()
            .zip(joints)
            .fold(Iso3::identity(), |acc, (row, q)| acc * dh_link(row, *q)))
    }
}

fn dh_link(&[theta, alpha, a, d]: &DhRow, q: Real) -> Iso3 {
    let rot_z = Iso3::from_parts(
        Translation3::new(0.0, 0.0, d),
        UnitQuaternion::from_axis_angle(&Vec3::z_axis(), theta + q),
    );
    let rot_x = Iso3::from_parts(
        Translation3::new(a, 0.0, 0.0),
        UnitQuaternion::from_axis_angle(&Vec3::x_axis(), alpha),
    );
    rot_z * rot_x
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Pt3;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn planar_arm() -> DhChain {
        DhChain {
            dh: vec![[0.0, 0.0, 1.0, 0.0], [0.0, 0.0, 1.0, 0.0]],
        }
    }

    #[test]
    fn zero_joints_stretch_along_x() {
        let ee = planar_arm().fk("arm", &[0.0, 0.0]).unwrap();
        assert_relative_eq!(ee * Pt3::origin(), Pt3::new(2.0, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn elbow_bend_reaches_corner() {
        let ee = planar_arm().fk("arm", &[0.0, FRAC_PI_2]).unwrap();
        assert_relative_eq!(ee * Pt3::origin(), Pt3::new(1.0, 1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn offset_and_twist_follow_dh_convention() {
        let chain = DhChain {
            dh: vec![[0.0, FRAC_PI_2, 0.0, 0.5]],
        };
        let ee = chain.fk("lift", &[0.0]).unwrap();
        // d lifts along z; alpha twists the local y axis onto z
        assert_relative_eq!(ee * Pt3::origin(), Pt3::new(0.0, 0.0, 0.5), epsilon = 1e-12);
        assert_relative_eq!(
            ee * Pt3::new(0.0, 1.0, 0.0),
            Pt3::new(0.0, 0.0, 1.5),
            epsilon = 1e-12
        );
    }

    #[test]
    fn joint_count_is_checked() {
        let err = planar_arm().fk("arm", &[0.0]).unwrap_err();
        assert!(matches!(err, ModelError::JointCount { expected: 2, got: 1, .. }));
    }

    #[test]
    fn params_are_flattened_row_by_row() {
        let mut chain = planar_arm();
        let mut flat = Vec::new();
        chain.write_params(&mut flat);
        assert_eq!(flat, vec![0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
        chain.set_params(&[0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8]).unwrap();
        assert_eq!(chain.dh[1], [0.5, 0.6, 0.7, 0.8]);
    }
}
