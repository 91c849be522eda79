//! Constraint-model builder for weekly TA office-hour and recitation assignment.
//!
//! [`build_model_pipeline`] turns a [`ProblemInput`] and a [`SchedulerConfig`] into a
//! solver-independent integer [`Model`]; [`solve_schedule`] hands that model to a
//! [`SolverBackend`] and decodes the result into a [`Schedule`].

pub mod config;
pub mod error;
pub mod input;
pub mod model;
pub mod report;
pub mod schedule;
pub mod solver;
pub mod validation;

pub use config::{BackendKind, BuddyLinearization, ConfigError, SchedulerConfig, SolverSettings};
pub use error::SchedulerError;
pub use input::{
    BuddyRequest, ClockTime, CoverageWindow, Day, Override, OverrideTarget, ProblemInput,
    RecitationSlot, Ta,
};
pub use model::{BuiltModel, ConstraintKind, Model, TimeBlock, build_model_pipeline};
pub use schedule::{Schedule, solve, solve_schedule};
pub use solver::{SolveResponse, SolveStatus, SolverBackend, SolverError, backend_for};
pub use validation::ValidationError;
