//! Rectified pinhole camera with an optional stereo baseline shift.

use serde::{Deserialize, Serialize};

use crate::{ModelError, Pt2, Pt3, Real};

/// Rectified camera projection.
///
/// The projection matrix is
///
/// ```text
/// P = | fx   0  cx  -fx*b |
///     |  0  fy  cy    0   |
///     |  0   0   1    0   |
/// ```
///
/// where `b` is the baseline shift (zero for a left/mono camera).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RectifiedCamera {
    pub fx: Real,
    pub fy: Real,
    pub cx: Real,
    pub cy: Real,
    #[serde(default)]
    pub baseline_shift: Real,
}

impl RectifiedCamera {
    pub const DIM: usize = 5;

    pub fn params(&self) -> [Real; 5] {
        [self.fx, self.fy, self.cx, self.cy, self.baseline_shift]
    }

    pub fn set_params(&mut self, params: &[Real]) -> Result<(), ModelError> {
        match params {
            [fx, fy, cx, cy, b] => {
                *self = Self {
                    fx: *fx,
                    fy: *fy,
                    cx: *cx,
                    cy: *cy,
                    baseline_shift: *b,
                };
                Ok(())
            }
            _ => Err(ModelError::ParamLength {
                expected: Self::DIM,
                got: params.len(),
            }),
        }
    }

    /// Project a point expressed in the camera frame. No check is made for `z <= 0`.
    pub fn project(&self, p: &Pt3) -> Pt2 {
        let u = (self.fx * p.x - self.fx * self.baseline_shift) / p.z + self.cx;
        let v = self.fy * p.y / p.z + self.cy;
        Pt2::new(u, v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn principal_point_on_axis() {
        let cam = RectifiedCamera {
            fx: 500.0,
            fy: 510.0,
            cx: 320.0,
            cy: 240.0,
            baseline_shift: 0.0,
        };
        let uv = cam.project(&Pt3::new(0.0, 0.0, 2.0));
        assert_relative_eq!(uv, Pt2::new(320.0, 240.0));
    }

    #[test]
    fn baseline_shift_moves_u_only() {
        let mut cam = RectifiedCamera {
            fx: 500.0,
            fy: 500.0,
            cx: 320.0,
            cy: 240.0,
            baseline_shift: 0.0,
        };
        let p = Pt3::new(0.1, 0.1, 1.0);
        let left = cam.project(&p);
        cam.set_params(&[500.0, 500.0, 320.0, 240.0, 0.1]).unwrap();
        let right = cam.project(&p);
        assert_relative_eq!(left.x - right.x, 50.0, epsilon = 1e-9);
        assert_relative_eq!(left.y, right.y);
    }
}
