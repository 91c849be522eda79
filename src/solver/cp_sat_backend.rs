//! OR-Tools CP-SAT backend, compiled with the `cp-sat` feature.
use super::{SolveResponse, SolveStatus, SolverBackend, SolverError};
use crate::config::SolverSettings;
use crate::model::Model;
use cp_sat::builder::{CpModelBuilder, IntVar, LinearExpr};
use cp_sat::proto::{CpSolverStatus, SatParameters};
use std::time::Instant;
use tracing::{debug, info};

pub struct CpSatBackend {
    settings: SolverSettings,
}

impl CpSatBackend {
    pub fn new(settings: SolverSettings) -> Self {
        Self { settings }
    }

    fn params(&self) -> SatParameters {
        let mut params = SatParameters::default();
        params.max_time_in_seconds = self.settings.time_limit_seconds;
        params.num_search_workers = self.settings.threads.map(|n| n as i32);
        params.random_seed = Some(42);
        params.log_search_progress = Some(false);
        params
    }
}

/// Stored constraints carry their constant in the bounds, so only the terms are translated.
fn to_cp_expr(expr: &crate::model::LinearExpr, vars: &[IntVar]) -> LinearExpr {
    expr.terms
        .iter()
        .map(|(c, v)| (*c, vars[v.index()].clone()))
        .collect()
}

impl SolverBackend for CpSatBackend {
    fn name(&self) -> &'static str {
        "cp_sat"
    }

    fn solve(&self, model: &Model) -> Result<SolveResponse, SolverError> {
        let start = Instant::now();
        if let Some(kind) = model.trivially_infeasible() {
            info!(?kind, "model infeasible before solving");
            return Ok(SolveResponse::infeasible(start.elapsed()));
        }

        let mut builder = CpModelBuilder::default();
        let vars: Vec<IntVar> = model
            .vars()
            .iter()
            .map(|info| builder.new_int_var(vec![(info.lower, info.upper)]))
            .collect();

        for c in model.constraints() {
            let expr = to_cp_expr(&c.expr, &vars);
            match (c.lower, c.upper) {
                (Some(lo), Some(hi)) if lo == hi => {
                    builder.add_eq(expr, LinearExpr::from(lo));
                }
                (lo, hi) => {
                    if let Some(lo) = lo {
                        builder.add_ge(expr.clone(), LinearExpr::from(lo));
                    }
                    if let Some(hi) = hi {
                        builder.add_le(expr, LinearExpr::from(hi));
                    }
                }
            }
        }
        builder.maximize(to_cp_expr(model.objective(), &vars));
        debug!(
            vars = vars.len(),
            constraints = model.constraints().len(),
            "invoking cp-sat"
        );

        let response = builder.solve_with_parameters(&self.params());
        let status = match response.status() {
            CpSolverStatus::Optimal => SolveStatus::Optimal,
            CpSolverStatus::Feasible => SolveStatus::Feasible,
            CpSolverStatus::Infeasible => SolveStatus::Infeasible,
            other => SolveStatus::Error(format!("{other:?}")),
        };
        let values = if status.has_solution() {
            vars.iter()
                .map(|v| v.solution_value(&response) as f64)
                .collect()
        } else {
            Vec::new()
        };
        Ok(SolveResponse {
            status,
            values,
            wall_time: start.elapsed(),
        })
    }
}
