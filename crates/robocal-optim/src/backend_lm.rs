use crate::{NllsProblem, NllsSolverBackend, SolveOptions, SolveReport};
use anyhow::Result;
use levenberg_marquardt::{LeastSquaresProblem, LevenbergMarquardt};
use log::{debug, warn};
use nalgebra::{storage::Owned, DMatrix, DVector, Dyn};
use robocal_core::Real;
use std::cell::RefCell;

struct LmWrapper<'a, P: NllsProblem> {
    problem: &'a P,
    params: DVector<Real>,
    /// First evaluation error; the solver only sees `None`.
    failure: RefCell<Option<anyhow::Error>>,
}

impl<P: NllsProblem> LmWrapper<'_, P> {
    fn capture<T>(&self, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                let mut failure = self.failure.borrow_mut();
                if failure.is_none() {
                    *failure = Some(err);
                }
                None
            }
        }
    }
}

impl<P: NllsProblem> LeastSquaresProblem<Real, Dyn, Dyn> for LmWrapper<'_, P> {
    type ResidualStorage = Owned<Real, Dyn>;
    type JacobianStorage = Owned<Real, Dyn, Dyn>;
    type ParameterStorage = Owned<Real, Dyn>;

    fn set_params(&mut self, x: &DVector<Real>) {
        self.params.clone_from(x);
    }

    fn params(&self) -> DVector<Real> {
        self.params.clone()
    }

    fn residuals(&self) -> Option<DVector<Real>> {
        self.capture(self.problem.residuals(&self.params))
    }

    fn jacobian(&self) -> Option<DMatrix<Real>> {
        self.capture(self.problem.jacobian(&self.params))
    }
}

#[derive(Debug, Default, Clone)]
pub struct LmBackend;

impl NllsSolverBackend for LmBackend {
    fn solve<P: NllsProblem>(
        &self,
        problem: &P,
        x0: DVector<Real>,
        opts: &SolveOptions,
    ) -> Result<(DVector<Real>, SolveReport)> {
        let lm = LevenbergMarquardt::new()
            .with_ftol(opts.ftol)
            .with_xtol(opts.xtol)
            .with_gtol(opts.gtol)
            .with_patience(opts.max_iters.max(1));

        debug!(
            "LM solve: {} params, {} residuals",
            problem.num_params(),
            problem.num_residuals()
        );
        let wrapper = LmWrapper {
            problem,
            params: x0,
            failure: RefCell::new(None),
        };

        let (wrapper, report) = lm.minimize(wrapper);
        if let Some(err) = wrapper.failure.into_inner() {
            return Err(err.context("residual evaluation failed inside the LM solver"));
        }
        let x_opt = wrapper.params;

        let converged = report.termination.was_successful();
        if !converged {
            warn!("LM terminated without convergence: {:?}", report.termination);
        }
        Ok((
            x_opt,
            SolveReport {
                iterations: report.number_of_evaluations,
                final_cost: report.objective_function,
                converged,
                termination: format!("{:?}", report.termination),
            },
        ))
    }
}
