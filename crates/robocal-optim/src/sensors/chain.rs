//! Kinematic chain holding the calibration target.

use nalgebra::DVector;
use robocal_core::{transform_points, Iso3, ParamSelection, Pt3, Real, RobotParams};

use crate::error::EstimationError;
use crate::model::Sensor;

/// Target corners predicted through a DH chain at measured joint positions.
///
/// The predicted target frame is `base * fk(joint_positions) * tool`, where
/// `base` is `world <- chain base` and `tool` is `end effector <- target`.
/// The residual is `predicted - observed` per corner, ordered `[x, y, z]`.
#[derive(Debug, Clone)]
pub struct ChainSensor {
    pub chain: String,
    pub base: String,
    pub tool: String,
    pub checkerboard: String,
    pub joint_positions: Vec<Real>,
    num_points: usize,
    num_joints: usize,
    predicted: Option<Vec<Pt3>>,
}

impl ChainSensor {
    /// Create a sensor after checking every referenced block and the joint count.
    pub fn new(
        model: &RobotParams,
        chain: impl Into<String>,
        base: impl Into<String>,
        tool: impl Into<String>,
        checkerboard: impl Into<String>,
        joint_positions: Vec<Real>,
    ) -> Result<Self, EstimationError> {
        let mut sensor = Self {
            chain: chain.into(),
            base: base.into(),
            tool: tool.into(),
            checkerboard: checkerboard.into(),
            joint_positions,
            num_points: 0,
            num_joints: 0,
            predicted: None,
        };
        sensor.target_pose(model)?;
        sensor.num_points = model.checkerboard(&sensor.checkerboard)?.num_points();
        sensor.num_joints = sensor.joint_positions.len();
        Ok(sensor)
    }

    /// World pose of the target implied by the chain.
    pub fn target_pose(&self, model: &RobotParams) -> Result<Iso3, EstimationError> {
        let base = model.transform(&self.base)?.iso();
        let ee = model
            .dh_chain(&self.chain)?
            .fk(&self.chain, &self.joint_positions)?;
        let tool = model.transform(&self.tool)?.iso();
        Ok(base * ee * tool)
    }
}

impl Sensor<RobotParams> for ChainSensor {
    fn residual_length(&self) -> usize {
        3 * self.num_points
    }

    fn sparsity(&self) -> ParamSelection {
        ParamSelection::default()
            .with_dh_chain(&self.chain, self.num_joints)
            .with_transform(&self.base)
            .with_transform(&self.tool)
            .with_checkerboard(&self.checkerboard)
    }

    fn refresh_from_model(&mut self, model: &RobotParams) -> Result<(), EstimationError> {
        let pose = self.target_pose(model)?;
        let board = model.checkerboard(&self.checkerboard)?.generate_points();
        self.predicted = Some(transform_points(&pose, &board));
        Ok(())
    }

    fn compute_residual(&self, target_points: &[Pt3]) -> Result<DVector<Real>, EstimationError> {
        let predicted = self.predicted.as_ref().ok_or(EstimationError::NotRefreshed)?;
        if target_points.len() != predicted.len() {
            return Err(EstimationError::PointCount {
                expected: predicted.len(),
                got: target_points.len(),
            });
        }
        let mut r = DVector::zeros(self.residual_length());
        for (i, (pred, obs)) in predicted.iter().zip(target_points).enumerate() {
            let d = pred - obs;
            r[3 * i] = d.x;
            r[3 * i + 1] = d.y;
            r[3 * i + 2] = d.z;
        }
        Ok(r)
    }
}
