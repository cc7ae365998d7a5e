//! Observation groups: sensors that observed one calibration target pose.

use nalgebra::DVector;
use robocal_core::{Pt3, Real};
use std::marker::PhantomData;
use std::ops::Range;

use crate::error::EstimationError;
use crate::model::{ParameterModel, Sensor};

/// Sensors sharing one observed target pose.
///
/// The group residual is the concatenation of the sensor residuals in sensor order.
#[derive(Debug, Clone)]
pub struct Multisensor<M, S> {
    /// Name of the target geometry the sensors observed.
    pub checkerboard: String,
    pub sensors: Vec<S>,
    _model: PhantomData<fn() -> M>,
}

impl<M: ParameterModel, S: Sensor<M>> Multisensor<M, S> {
    pub fn new(checkerboard: impl Into<String>, sensors: Vec<S>) -> Self {
        Self {
            checkerboard: checkerboard.into(),
            sensors,
            _model: PhantomData,
        }
    }

    pub fn residual_length(&self) -> usize {
        self.sensors.iter().map(S::residual_length).sum()
    }

    /// Row range of each sensor inside the group residual.
    pub fn sensor_row_ranges(&self) -> Vec<Range<usize>> {
        let mut start = 0;
        self.sensors
            .iter()
            .map(|s| {
                let range = start..start + s.residual_length();
                start = range.end;
                range
            })
            .collect()
    }

    pub fn refresh_from_model(&mut self, model: &M) -> Result<(), EstimationError> {
        for sensor in &mut self.sensors {
            sensor.refresh_from_model(model)?;
        }
        Ok(())
    }

    /// Concatenated residual of every sensor against the posed target points.
    pub fn compute_residual(
        &self,
        target_points: &[Pt3],
    ) -> Result<DVector<Real>, EstimationError> {
        let mut r = DVector::zeros(self.residual_length());
        let mut offset = 0;
        for (idx, sensor) in self.sensors.iter().enumerate() {
            let r_sensor = checked_residual(idx, sensor, target_points)?;
            r.rows_mut(offset, r_sensor.len()).copy_from(&r_sensor);
            offset += r_sensor.len();
        }
        Ok(r)
    }
}

/// Evaluate one sensor and verify it honours its declared residual length.
pub(crate) fn checked_residual<M: ParameterModel, S: Sensor<M>>(
    idx: usize,
    sensor: &S,
    target_points: &[Pt3],
) -> Result<DVector<Real>, EstimationError> {
    let r = sensor.compute_residual(target_points)?;
    if r.len() != sensor.residual_length() {
        return Err(EstimationError::ResidualLength {
            group: 0,
            sensor: idx,
            declared: sensor.residual_length(),
            actual: r.len(),
        });
    }
    Ok(r)
}
