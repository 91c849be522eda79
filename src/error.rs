use crate::config::ConfigError;
use crate::solver::SolverError;
use crate::validation::ValidationError;
use thiserror::Error;

/// Terminal outcomes of a scheduling run other than a usable schedule.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("solver failed: {0}")]
    Solver(#[from] SolverError),

    /// No assignment satisfies every hard constraint.
    #[error("no feasible schedule satisfies all hard constraints")]
    Infeasible,
}
