//! Residual and Jacobian construction over observation groups.
//!
//! The optimization vector is `[free params | pose_0 | pose_1 | ...]`. Every
//! evaluation inflates its own clone of the parameter model, so residual and
//! Jacobian calls never observe each other's perturbed states.
//!
//! The Jacobian is assembled block by block:
//! - rows of sensor `k` in group `i` get forward differences only in the free
//!   columns selected by that sensor's sparsity or by the group target's
//!   geometry,
//! - rows of group `i` get forward differences in the six columns of pose `i`,
//! - every other entry is an exact zero.

use log::{debug, trace, warn};
use nalgebra::{DMatrix, DVector};
use robocal_core::{ModelError, Pt3, Real, SingleTransform};
use std::ops::Range;

use crate::error::EstimationError;
use crate::finite_diff::{forward_difference, FD_EPSILON};
use crate::model::{ParameterModel, Sensor};
use crate::multisensor::{checked_residual, Multisensor};
use crate::params::{FreeMask, OptLayout, POSE_DIM};
use crate::NllsProblem;

/// Residual/Jacobian engine for one optimization run.
#[derive(Debug, Clone)]
pub struct ErrorCalc<M: ParameterModel, S: Sensor<M>> {
    model: M,
    expanded_params: DVector<Real>,
    free_mask: FreeMask,
    multisensors: Vec<Multisensor<M, S>>,
    /// Free-subset columns each sensor depends on, indexed `[group][sensor]`.
    sensor_columns: Vec<Vec<Vec<usize>>>,
    group_rows: Vec<Range<usize>>,
    layout: OptLayout,
}

impl<M: ParameterModel, S: Sensor<M>> ErrorCalc<M, S> {
    /// Snapshot the model, derive the free mask and every sensor's free columns.
    pub fn new(
        model: M,
        free: &M::Selection,
        multisensors: Vec<Multisensor<M, S>>,
    ) -> Result<Self, EstimationError> {
        if multisensors.is_empty() {
            return Err(EstimationError::NoObservationGroups);
        }
        if let Some(idx) = multisensors.iter().position(|ms| ms.sensors.is_empty()) {
            return Err(EstimationError::EmptyObservationGroup(idx));
        }

        let expanded_params = model.deflate();
        if expanded_params.len() != model.num_params() {
            return Err(ModelError::ParamLength {
                expected: model.num_params(),
                got: expanded_params.len(),
            }
            .into());
        }
        let free_mask = model.free_mask(free)?;
        if free_mask.len() != expanded_params.len() {
            return Err(EstimationError::MaskLength {
                expected: expanded_params.len(),
                got: free_mask.len(),
            });
        }

        let mut sensor_columns = Vec::with_capacity(multisensors.len());
        let mut group_rows = Vec::with_capacity(multisensors.len());
        let mut row = 0;
        for ms in &multisensors {
            model.target_points(&ms.checkerboard)?;
            // every sensor is evaluated against the posed target
            let target_mask = model.target_mask(&ms.checkerboard)?;
            let columns = ms
                .sensors
                .iter()
                .map(|s| {
                    let depends_on = model.free_mask(&s.sparsity())?.union(&target_mask)?;
                    free_mask.free_columns(&depends_on)
                })
                .collect::<Result<Vec<_>, _>>()?;
            sensor_columns.push(columns);
            group_rows.push(row..row + ms.residual_length());
            row += ms.residual_length();
        }

        let layout = OptLayout::new(free_mask.count_free(), multisensors.len());
        let calc = Self {
            model,
            expanded_params,
            free_mask,
            multisensors,
            sensor_columns,
            group_rows,
            layout,
        };
        calc.log_layout();
        Ok(calc)
    }

    fn log_layout(&self) {
        debug!(
            "error calc: {} params ({} free), {} groups, {} residual rows",
            self.expanded_params.len(),
            self.layout.num_free,
            self.layout.num_groups,
            self.num_residuals()
        );
        let mut used = vec![false; self.layout.num_free];
        for col in self.sensor_columns.iter().flatten().flatten() {
            used[*col] = true;
        }
        for (col, &full_idx) in self.free_mask.free_indices().iter().enumerate() {
            if !used[col] {
                warn!(
                    "free parameter {full_idx} affects no sensor; its Jacobian column stays zero"
                );
            }
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn free_mask(&self) -> &FreeMask {
        &self.free_mask
    }

    pub fn multisensors(&self) -> &[Multisensor<M, S>] {
        &self.multisensors
    }

    pub fn layout(&self) -> OptLayout {
        self.layout
    }

    /// Total residual rows over every group.
    pub fn num_residuals(&self) -> usize {
        self.group_rows.last().map_or(0, |r| r.end)
    }

    /// Row range of each group in the stacked residual.
    pub fn group_rows(&self) -> &[Range<usize>] {
        &self.group_rows
    }

    /// Free subset of the model's parameters at construction time.
    pub fn initial_free_params(&self) -> DVector<Real> {
        // the mask was aligned with the snapshot in `new`
        DVector::from_iterator(
            self.free_mask.count_free(),
            self.free_mask
                .free_indices()
                .iter()
                .map(|&i| self.expanded_params[i]),
        )
    }

    /// Snapshot of the full parameter vector with the free entries replaced by `opt_param_vec`.
    pub fn calculate_full_param_vec(
        &self,
        opt_param_vec: &[Real],
    ) -> Result<DVector<Real>, EstimationError> {
        self.free_mask.expand(&self.expanded_params, opt_param_vec)
    }

    /// Split an optimization vector into its free parameters and per-group poses.
    pub fn split_all<'a>(
        &self,
        opt_all_vec: &'a DVector<Real>,
    ) -> Result<(&'a [Real], Vec<SingleTransform>), EstimationError> {
        self.layout.split(opt_all_vec)
    }

    /// Independent model copy carrying the given free parameters.
    fn working_model(&self, opt_param_vec: &[Real]) -> Result<M, EstimationError> {
        let full = self.calculate_full_param_vec(opt_param_vec)?;
        let mut model = self.model.clone();
        model.inflate(&full)?;
        Ok(model)
    }

    /// Stacked residual of every group, in group order.
    pub fn calculate_error(
        &self,
        opt_all_vec: &DVector<Real>,
    ) -> Result<DVector<Real>, EstimationError> {
        let (opt_param_vec, poses) = self.split_all(opt_all_vec)?;
        let model = self.working_model(opt_param_vec)?;

        let mut r = DVector::zeros(self.num_residuals());
        let groups = self.multisensors.iter().zip(&poses).zip(&self.group_rows);
        for (i, ((ms, pose), rows)) in groups.enumerate() {
            let mut ms = ms.clone();
            ms.refresh_from_model(&model)?;
            let cb_points = posed_target(&model, &ms.checkerboard, pose)?;
            let r_ms = ms
                .compute_residual(&cb_points)
                .map_err(|e| e.in_group(i))?;
            r.rows_mut(rows.start, rows.len()).copy_from(&r_ms);
        }
        trace!("residual evaluated, |r| = {:.6e}", r.norm());
        Ok(r)
    }

    /// Block-sparse forward-difference Jacobian of [`Self::calculate_error`].
    pub fn calculate_jacobian(
        &self,
        opt_all_vec: &DVector<Real>,
    ) -> Result<DMatrix<Real>, EstimationError> {
        let (opt_param_vec, poses) = self.split_all(opt_all_vec)?;
        let x_params = DVector::from_column_slice(opt_param_vec);
        let num_free = self.layout.num_free;

        let mut jac = DMatrix::zeros(self.num_residuals(), self.layout.len());
        for (i, ms) in self.multisensors.iter().enumerate() {
            let rows = &self.group_rows[i];

            let sensors = ms.sensors.iter().zip(ms.sensor_row_ranges());
            for (k, (sensor, s_rows)) in sensors.enumerate() {
                let columns = &self.sensor_columns[i][k];
                if columns.is_empty() {
                    continue;
                }
                let j_s = self
                    .single_sensor_params_jacobian(
                        &x_params,
                        &poses[i],
                        &ms.checkerboard,
                        k,
                        sensor,
                        columns,
                    )
                    .map_err(|e| e.in_group(i))?;
                jac.view_mut((rows.start + s_rows.start, 0), (s_rows.len(), num_free))
                    .copy_from(&j_s);
            }

            let cols = self.layout.pose_columns(i);
            let j_pose = self
                .multisensor_pose_jacobian(opt_param_vec, &poses[i], ms)
                .map_err(|e| e.in_group(i))?;
            debug_assert_eq!(j_pose.ncols(), POSE_DIM);
            jac.view_mut((rows.start, cols.start), (rows.len(), POSE_DIM))
                .copy_from(&j_pose);
        }
        trace!("jacobian evaluated, {}x{}", jac.nrows(), jac.ncols());
        Ok(jac)
    }

    /// Derivatives of one sensor's residual with respect to its free columns.
    fn single_sensor_params_jacobian(
        &self,
        x_params: &DVector<Real>,
        pose: &SingleTransform,
        checkerboard: &str,
        sensor_idx: usize,
        sensor: &S,
        columns: &[usize],
    ) -> Result<DMatrix<Real>, EstimationError> {
        let f = |p: &DVector<Real>| -> Result<DVector<Real>, EstimationError> {
            let model = self.working_model(p.as_slice())?;
            let mut sensor = sensor.clone();
            sensor.refresh_from_model(&model)?;
            let cb_points = posed_target(&model, checkerboard, pose)?;
            checked_residual(sensor_idx, &sensor, &cb_points)
        };
        forward_difference(f, x_params, columns, FD_EPSILON)
    }

    /// Derivatives of a group's residual with respect to its own pose.
    fn multisensor_pose_jacobian(
        &self,
        opt_param_vec: &[Real],
        pose: &SingleTransform,
        ms: &Multisensor<M, S>,
    ) -> Result<DMatrix<Real>, EstimationError> {
        let model = self.working_model(opt_param_vec)?;
        let mut ms = ms.clone();
        ms.refresh_from_model(&model)?;
        let local_cb_points = model.target_points(&ms.checkerboard)?;

        let x0 = DVector::from_column_slice(pose.params());
        let f = |p: &DVector<Real>| -> Result<DVector<Real>, EstimationError> {
            let pose = SingleTransform::from_slice(p.as_slice())?;
            ms.compute_residual(&pose.transform_points(&local_cb_points))
        };
        let columns: Vec<usize> = (0..POSE_DIM).collect();
        forward_difference(f, &x0, &columns, FD_EPSILON)
    }
}

fn posed_target<M: ParameterModel>(
    model: &M,
    checkerboard: &str,
    pose: &SingleTransform,
) -> Result<Vec<Pt3>, EstimationError> {
    Ok(pose.transform_points(&model.target_points(checkerboard)?))
}

impl<M: ParameterModel, S: Sensor<M>> NllsProblem for ErrorCalc<M, S> {
    fn num_params(&self) -> usize {
        self.layout.len()
    }

    fn num_residuals(&self) -> usize {
        ErrorCalc::num_residuals(self)
    }

    fn residuals(&self, x: &DVector<Real>) -> anyhow::Result<DVector<Real>> {
        Ok(self.calculate_error(x)?)
    }

    fn jacobian(&self, x: &DVector<Real>) -> anyhow::Result<DMatrix<Real>> {
        Ok(self.calculate_jacobian(x)?)
    }
}
