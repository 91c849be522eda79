//! Shared state threaded through every model-building pass.
use super::linear::{Model, VarId};
use super::model_blocks::BlockIndex;
use super::model_commitment::{add_commitment_constraints, add_override_constraints};
use super::model_objective::add_objective;
use super::model_office_hours::{
    add_coverage_constraints, add_global_minimum_constraint, add_shift_limit_constraints,
};
use super::model_recitations::{
    add_overlap_constraints, add_recitation_constraints, add_recitation_vars,
};
use super::model_shifts::{ShiftCandidate, add_shift_vars};
use crate::config::SchedulerConfig;
use crate::error::SchedulerError;
use crate::input::ProblemInput;
use crate::validation::{validate_coverage, validate_input};
use std::collections::BTreeMap;
use tracing::info;

/// A generated shift and the variable that selects it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftVar {
    pub ta: usize,
    pub shift: ShiftCandidate,
    pub var: VarId,
}

/// Auxiliary variable rewarding a buddy pair leading the same recitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuddyVar {
    pub requester: usize,
    pub requested: usize,
    pub slot: usize,
    pub var: VarId,
}

/// Holds the model under construction and the sparse variable maps.
///
/// Maps are keyed by `(ta index, resource id)`; a missing key means the TA can never be
/// assigned to that resource.
pub struct ModelBuilderContext<'a> {
    pub input: &'a ProblemInput,
    pub config: &'a SchedulerConfig,
    pub blocks: BlockIndex,
    pub model: Model,
    pub block_vars: BTreeMap<(usize, usize), VarId>,
    pub shift_vars: Vec<ShiftVar>,
    pub recitation_vars: BTreeMap<(usize, usize), VarId>,
    pub buddy_vars: Vec<BuddyVar>,
}

impl<'a> ModelBuilderContext<'a> {
    pub fn new(input: &'a ProblemInput, config: &'a SchedulerConfig, blocks: BlockIndex) -> Self {
        Self {
            input,
            config,
            blocks,
            model: Model::new(),
            block_vars: BTreeMap::new(),
            shift_vars: Vec::new(),
            recitation_vars: BTreeMap::new(),
            buddy_vars: Vec::new(),
        }
    }

    /// Shift variables of one TA.
    pub fn shifts_of(&self, ta: usize) -> impl Iterator<Item = &ShiftVar> {
        self.shift_vars.iter().filter(move |s| s.ta == ta)
    }

    /// Block variables of one TA, in block order.
    pub fn blocks_of(&self, ta: usize) -> impl Iterator<Item = (usize, VarId)> + '_ {
        self.block_vars
            .range((ta, 0)..(ta + 1, 0))
            .map(|(&(_, block), &var)| (block, var))
    }

    /// Recitation variables of one TA, in slot order.
    pub fn recitations_of(&self, ta: usize) -> impl Iterator<Item = (usize, VarId)> + '_ {
        self.recitation_vars
            .range((ta, 0)..(ta + 1, 0))
            .map(|(&(_, slot), &var)| (slot, var))
    }

    fn finish(self) -> BuiltModel {
        BuiltModel {
            blocks: self.blocks,
            model: self.model,
            block_vars: self.block_vars,
            shift_vars: self.shift_vars,
            recitation_vars: self.recitation_vars,
            buddy_vars: self.buddy_vars,
        }
    }
}

/// Output of [`build_model_pipeline`]: the model plus the maps needed to decode a solution.
#[derive(Debug, Clone)]
pub struct BuiltModel {
    pub blocks: BlockIndex,
    pub model: Model,
    pub block_vars: BTreeMap<(usize, usize), VarId>,
    pub shift_vars: Vec<ShiftVar>,
    pub recitation_vars: BTreeMap<(usize, usize), VarId>,
    pub buddy_vars: Vec<BuddyVar>,
}

/// Validates the input and runs every construction pass in order.
pub fn build_model_pipeline(
    input: &ProblemInput,
    config: &SchedulerConfig,
) -> Result<BuiltModel, SchedulerError> {
    config.validate()?;
    validate_coverage(&input.coverage)?;
    let blocks = BlockIndex::new(&input.coverage);
    validate_input(input, &blocks)?;

    let mut ctx = ModelBuilderContext::new(input, config, blocks);

    add_shift_vars(&mut ctx);
    add_shift_limit_constraints(&mut ctx);
    add_coverage_constraints(&mut ctx);
    add_global_minimum_constraint(&mut ctx);
    add_recitation_vars(&mut ctx);
    add_recitation_constraints(&mut ctx);
    add_overlap_constraints(&mut ctx);
    add_commitment_constraints(&mut ctx);
    add_objective(&mut ctx);
    add_override_constraints(&mut ctx);

    info!(
        tas = input.tas.len(),
        blocks = ctx.blocks.len(),
        recitations = input.recitations.len(),
        "model built: {}",
        ctx.model
    );
    Ok(ctx.finish())
}
