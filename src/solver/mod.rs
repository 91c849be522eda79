//! Boundary to the external integer solver.
//!
//! A backend receives a finished [`Model`] and reports a [`SolveResponse`]: a status and, when a
//! solution was found, one value per model variable. Backends never see scheduling concepts.

mod good_lp_backend;
#[cfg(feature = "cp-sat")]
mod cp_sat_backend;

pub use good_lp_backend::GoodLpBackend;
#[cfg(feature = "cp-sat")]
pub use cp_sat_backend::CpSatBackend;

use crate::config::{BackendKind, ConfigError, SolverSettings};
use crate::model::Model;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolverError {
    #[error("{backend}: {message}")]
    Failed {
        backend: &'static str,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveStatus {
    /// Proven optimal.
    Optimal,
    /// Feasible but not proven optimal (stopped early).
    Feasible,
    Infeasible,
    Error(String),
}

impl SolveStatus {
    pub fn has_solution(&self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::Feasible)
    }
}

#[derive(Debug, Clone)]
pub struct SolveResponse {
    pub status: SolveStatus,
    /// Indexed by [`crate::model::VarId`]; empty unless a solution was found.
    pub values: Vec<f64>,
    pub wall_time: Duration,
}

impl SolveResponse {
    pub fn infeasible(wall_time: Duration) -> Self {
        Self {
            status: SolveStatus::Infeasible,
            values: Vec::new(),
            wall_time,
        }
    }

    /// Values rounded at 0.5, the threshold used when decoding binaries.
    pub fn rounded(&self) -> Vec<i64> {
        self.values.iter().map(|v| v.round() as i64).collect()
    }
}

/// A combinatorial solver that accepts bounded integer variables, linear constraints and a
/// maximization objective.
pub trait SolverBackend {
    fn name(&self) -> &'static str;

    fn solve(&self, model: &Model) -> Result<SolveResponse, SolverError>;
}

/// Instantiates the backend named in the settings.
pub fn backend_for(settings: &SolverSettings) -> Result<Box<dyn SolverBackend>, ConfigError> {
    match settings.backend {
        BackendKind::GoodLp => Ok(Box::new(GoodLpBackend::new(settings.clone()))),
        #[cfg(feature = "cp-sat")]
        BackendKind::CpSat => Ok(Box::new(CpSatBackend::new(settings.clone()))),
        #[cfg(not(feature = "cp-sat"))]
        BackendKind::CpSat => Err(ConfigError::BackendUnavailable(
            BackendKind::CpSat.to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_backend_is_good_lp() {
        let backend = backend_for(&SolverSettings::default()).unwrap();
        assert_eq!(backend.name(), "good_lp/microlp");
    }

    #[cfg(not(feature = "cp-sat"))]
    #[test]
    fn cp_sat_requires_feature() {
        let settings = SolverSettings {
            backend: BackendKind::CpSat,
            ..Default::default()
        };
        assert!(matches!(
            backend_for(&settings),
            Err(ConfigError::BackendUnavailable(_))
        ));
    }

    #[test]
    fn rounding_uses_half_threshold() {
        let response = SolveResponse {
            status: SolveStatus::Optimal,
            values: vec![0.0, 0.49, 0.51, 1.0, 0.999_999],
            wall_time: Duration::ZERO,
        };
        assert_eq!(response.rounded(), vec![0, 0, 1, 1, 1]);
    }
}
