//! `good_lp` backend driving the pure-Rust `microlp` MILP solver.
use super::{SolveResponse, SolveStatus, SolverBackend, SolverError};
use crate::config::SolverSettings;
use crate::model::{LinearExpr, Model};
use good_lp::solvers::microlp::microlp;
use good_lp::{Expression, ProblemVariables, ResolutionError, Solution, SolverModel, Variable, variable};
use std::time::Instant;
use tracing::{debug, info, warn};

pub struct GoodLpBackend {
    settings: SolverSettings,
}

impl GoodLpBackend {
    pub fn new(settings: SolverSettings) -> Self {
        Self { settings }
    }
}

impl Default for GoodLpBackend {
    fn default() -> Self {
        Self::new(SolverSettings::default())
    }
}

fn to_expression(expr: &LinearExpr, vars: &[Variable]) -> Expression {
    expr.terms
        .iter()
        .fold(Expression::from(expr.constant as f64), |acc, (c, v)| {
            acc + (*c as f64) * vars[v.index()]
        })
}

impl SolverBackend for GoodLpBackend {
    fn name(&self) -> &'static str {
        "good_lp/microlp"
    }

    fn solve(&self, model: &Model) -> Result<SolveResponse, SolverError> {
        let start = Instant::now();
        if let Some(kind) = model.trivially_infeasible() {
            info!(?kind, "model infeasible before solving");
            return Ok(SolveResponse::infeasible(start.elapsed()));
        }
        if model.num_vars() == 0 {
            return Ok(SolveResponse {
                status: SolveStatus::Optimal,
                values: Vec::new(),
                wall_time: start.elapsed(),
            });
        }
        if self.settings.time_limit_seconds.is_some() || self.settings.threads.is_some() {
            warn!("microlp ignores time limits and thread counts");
        }

        let mut problem = ProblemVariables::new();
        let vars: Vec<Variable> = model
            .vars()
            .iter()
            .map(|info| {
                let def = if info.is_binary() {
                    variable().binary()
                } else {
                    variable()
                        .integer()
                        .min(info.lower as f64)
                        .max(info.upper as f64)
                };
                problem.add(def.name(info.name.clone()))
            })
            .collect();

        let objective = to_expression(model.objective(), &vars);
        let mut lp = problem.maximise(objective).using(microlp);
        for c in model.constraints() {
            let expr = to_expression(&c.expr, &vars);
            match (c.lower, c.upper) {
                (Some(lo), Some(hi)) if lo == hi => {
                    lp.add_constraint(expr.eq(lo as f64));
                }
                (lo, hi) => {
                    if let Some(lo) = lo {
                        lp.add_constraint(expr.clone().geq(lo as f64));
                    }
                    if let Some(hi) = hi {
                        lp.add_constraint(expr.leq(hi as f64));
                    }
                }
            }
        }
        debug!(
            vars = model.num_vars(),
            constraints = model.constraints().len(),
            "invoking microlp"
        );

        match lp.solve() {
            Ok(solution) => {
                let values = vars.iter().map(|v| solution.value(*v)).collect();
                Ok(SolveResponse {
                    status: SolveStatus::Optimal,
                    values,
                    wall_time: start.elapsed(),
                })
            }
            Err(ResolutionError::Infeasible) => Ok(SolveResponse::infeasible(start.elapsed())),
            Err(e) => Ok(SolveResponse {
                status: SolveStatus::Error(e.to_string()),
                values: Vec::new(),
                wall_time: start.elapsed(),
            }),
        }
    }
}
