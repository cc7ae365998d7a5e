//! Rectified camera observing target corners.

use nalgebra::DVector;
use robocal_core::{Iso3, ParamSelection, Pt2, Pt3, Real, RectifiedCamera, RobotParams};

use crate::error::EstimationError;
use crate::model::Sensor;

/// Camera measurement of every corner of one target.
///
/// `frame` names the transform of the camera in the world frame
/// (`world <- camera`). The residual is `measured - projected`, ordered
/// `[u_0, v_0, u_1, v_1, ...]`.
#[derive(Debug, Clone)]
pub struct CameraSensor {
    pub camera: String,
    pub frame: String,
    pub measurements: Vec<Pt2>,
    state: Option<CameraState>,
}

#[derive(Debug, Clone, Copy)]
struct CameraState {
    camera: RectifiedCamera,
    camera_from_world: Iso3,
}

impl CameraSensor {
    /// Create a sensor after checking that `camera` and `frame` exist in `model`.
    pub fn new(
        model: &RobotParams,
        camera: impl Into<String>,
        frame: impl Into<String>,
        measurements: Vec<Pt2>,
    ) -> Result<Self, EstimationError> {
        let camera = camera.into();
        let frame = frame.into();
        model.rectified_cam(&camera)?;
        model.transform(&frame)?;
        Ok(Self {
            camera,
            frame,
            measurements,
            state: None,
        })
    }

    /// Project world-frame points with the state pulled at the last refresh.
    pub fn project(&self, points: &[Pt3]) -> Result<Vec<Pt2>, EstimationError> {
        let state = self.state.as_ref().ok_or(EstimationError::NotRefreshed)?;
        Ok(points
            .iter()
            .map(|p| state.camera.project(&state.camera_from_world.transform_point(p)))
            .collect())
    }
}

impl Sensor<RobotParams> for CameraSensor {
    fn residual_length(&self) -> usize {
        2 * self.measurements.len()
    }

    fn sparsity(&self) -> ParamSelection {
        ParamSelection::default()
            .with_rectified_cam(&self.camera)
            .with_transform(&self.frame)
    }

    fn refresh_from_model(&mut self, model: &RobotParams) -> Result<(), EstimationError> {
        self.state = Some(CameraState {
            camera: *model.rectified_cam(&self.camera)?,
            camera_from_world: model.transform(&self.frame)?.iso().inverse(),
        });
        Ok(())
    }

    fn compute_residual(&self, target_points: &[Pt3]) -> Result<DVector<Real>, EstimationError> {
        if target_points.len() != self.measurements.len() {
            return Err(EstimationError::PointCount {
                expected: self.measurements.len(),
                got: target_points.len(),
            });
        }
        let projected = self.project(target_points)?;
        let mut r = DVector::zeros(self.residual_length());
        for (i, (meas, proj)) in self.measurements.iter().zip(&projected).enumerate() {
            r[2 * i] = meas.x - proj.x;
            r[2 * i + 1] = meas.y - proj.y;
        }
        Ok(r)
    }
}
