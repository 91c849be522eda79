//! Model building and constraint logic for the TA assignment solver.

mod linear;
mod model_blocks;
mod model_commitment;
mod model_context;
mod model_objective;
mod model_office_hours;
mod model_recitations;
mod model_shifts;

pub use linear::{ConstraintKind, LinearConstraint, LinearExpr, Model, VarId, VarInfo};
pub use model_blocks::{BlockIndex, Demand, TimeBlock};
pub use model_context::{BuddyVar, BuiltModel, ModelBuilderContext, ShiftVar, build_model_pipeline};
pub use model_recitations::overlaps;
pub use model_shifts::{ShiftCandidate, enumerate_shifts};
