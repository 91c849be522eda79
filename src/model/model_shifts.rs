//! Shift enumeration and the two-way shift/block linking.
//!
//! Every TA gets one block variable per available block and one shift variable per legal
//! contiguous run of available blocks. Two passes tie the layers together:
//!
//! - shift selected ⇒ every constituent block selected (`shift <= block`)
//! - block selected ⇒ some covering shift selected (`block <= sum(covering shifts)`)
//!
//! so the selected blocks of a TA are always exactly the union of their selected shifts.
//! A block that no generated shift covers is pinned to 0.
use super::linear::{ConstraintKind, LinearExpr, VarId};
use super::model_blocks::{BlockIndex, TimeBlock};
use super::model_context::{ModelBuilderContext, ShiftVar};
use crate::config::SchedulerConfig;
use crate::input::{Day, Ta};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info, warn};

/// A contiguous run of office hours `[start, end)` on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShiftCandidate {
    pub day: Day,
    pub start: u32,
    pub end: u32,
}

impl ShiftCandidate {
    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn contains(&self, block: &TimeBlock) -> bool {
        block.day == self.day && block.start >= self.start && block.end() <= self.end
    }
}

impl fmt::Display for ShiftCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:02}:00-{:02}:00", self.day, self.start, self.end)
    }
}

/// All legal shifts for one TA, each with the ids of the blocks it spans.
///
/// A shift is legal when it is 1 to `max_shift_length` hours long, every hour is a block the TA
/// is available for on the same day, and, if it starts at or after the late threshold, it is at
/// least two hours long.
pub fn enumerate_shifts(
    ta: &Ta,
    blocks: &BlockIndex,
    config: &SchedulerConfig,
) -> Vec<(ShiftCandidate, Vec<usize>)> {
    let mut shifts = Vec::new();
    for (id, block) in blocks.iter() {
        if !ta.is_available(id) {
            continue;
        }
        let mut run = vec![id];
        for len in 1..=config.max_shift_length {
            if len > 1 {
                match blocks.find(block.day, block.start + len - 1) {
                    Some(next) if ta.is_available(next) => run.push(next),
                    _ => break,
                }
            }
            if len < 2 && block.start >= config.late_shift_hour_threshold {
                continue;
            }
            shifts.push((
                ShiftCandidate {
                    day: block.day,
                    start: block.start,
                    end: block.start + len,
                },
                run.clone(),
            ));
        }
    }
    shifts
}

/// Creates block and shift variables for every TA and links them both ways.
pub fn add_shift_vars(ctx: &mut ModelBuilderContext<'_>) {
    let input = ctx.input;
    for (t, ta) in input.tas.iter().enumerate() {
        for (b, _) in ctx.blocks.iter() {
            if ta.is_available(b) {
                let var = ctx.model.new_bool_var(format!("oh[{}][{b}]", ta.name));
                ctx.block_vars.insert((t, b), var);
            }
        }

        let mut covering: BTreeMap<usize, Vec<VarId>> = BTreeMap::new();
        let shifts = enumerate_shifts(ta, &ctx.blocks, ctx.config);
        debug!(ta = %ta.name, shifts = shifts.len(), "enumerated shifts");
        for (shift, run) in shifts {
            let var = ctx.model.new_bool_var(format!("shift[{}][{shift}]", ta.name));
            for b in run {
                let block_var = ctx.block_vars[&(t, b)];
                ctx.model
                    .add_le(ConstraintKind::ShiftImpliesBlock, var, block_var);
                covering.entry(b).or_default().push(var);
            }
            ctx.shift_vars.push(ShiftVar { ta: t, shift, var });
        }

        let mut orphans = 0;
        let own_blocks: Vec<(usize, VarId)> = ctx.blocks_of(t).collect();
        for (b, block_var) in own_blocks {
            match covering.remove(&b) {
                Some(shift_vars) => {
                    let sum: LinearExpr = shift_vars.into_iter().collect();
                    ctx.model
                        .add_le(ConstraintKind::BlockNeedsShift, block_var, sum);
                }
                None => {
                    ctx.model.add_eq(ConstraintKind::OrphanBlock, block_var, 0);
                    orphans += 1;
                }
            }
        }
        if orphans > 0 {
            warn!(ta = %ta.name, orphans, "available blocks not covered by any legal shift");
        }
    }
    info!(
        block_vars = ctx.block_vars.len(),
        shift_vars = ctx.shift_vars.len(),
        "shift variables created"
    );
}
