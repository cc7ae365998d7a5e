//! Planar checkerboard target geometry.

use serde::{Deserialize, Serialize};

use crate::{ModelError, Pt3, Real};

/// A checkerboard with `corners_x * corners_y` interior corners.
///
/// Only the spacings are calibration parameters; the corner counts are fixed
/// by the physical target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Checkerboard {
    pub corners_x: usize,
    pub corners_y: usize,
    pub spacing_x: Real,
    pub spacing_y: Real,
}

impl Checkerboard {
    pub const DIM: usize = 2;

    pub fn num_points(&self) -> usize {
        self.corners_x * self.corners_y
    }

    pub fn params(&self) -> [Real; 2] {
        [self.spacing_x, self.spacing_y]
    }

    pub fn set_params(&mut self, params: &[Real]) -> Result<(), ModelError> {
        match params {
            [sx, sy] => {
                self.spacing_x = *sx;
                self.spacing_y = *sy;
                Ok(())
            }
            _ => Err(ModelError::ParamLength {
                expected: Self::DIM,
                got: params.len(),
            }),
        }
    }

    /// Corner positions in the board frame on the `z = 0` plane, x varying fastest.
    pub fn generate_points(&self) -> Vec<Pt3> {
        let mut points = Vec::with_capacity(self.num_points());
        for j in 0..self.corners_y {
            for i in 0..self.corners_x {
                points.push(Pt3::new(
                    i as Real * self.spacing_x,
                    j as Real * self.spacing_y,
                    0.0,
                ));
            }
        }
        points
    }
}
