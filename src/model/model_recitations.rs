//! Recitation variables, leader caps, slot demand and office-hour/recitation overlap.
use super::linear::{ConstraintKind, LinearExpr, VarId};
use super::model_blocks::TimeBlock;
use super::model_context::ModelBuilderContext;
use crate::input::RecitationSlot;
use tracing::{debug, info};

/// Half-open overlap test between an office-hour block and a recitation slot.
pub fn overlaps(block: &TimeBlock, slot: &RecitationSlot) -> bool {
    if block.day != slot.day {
        return false;
    }
    let (b_start, b_end) = block.minutes();
    b_start.max(slot.start.minutes()) < b_end.min(slot.end.minutes())
}

/// One binary variable per (TA, slot) the TA can lead. TAs with willingness 0 get none.
pub fn add_recitation_vars(ctx: &mut ModelBuilderContext<'_>) {
    let input = ctx.input;
    for (t, ta) in input.tas.iter().enumerate() {
        if ctx.config.recitation_cap(ta.willingness) == 0 {
            continue;
        }
        for r in 0..input.recitations.len() {
            if ta.can_lead(r) {
                let var = ctx.model.new_bool_var(format!("rec[{}][{r}]", ta.name));
                ctx.recitation_vars.insert((t, r), var);
            }
        }
    }
    info!(
        recitation_vars = ctx.recitation_vars.len(),
        "recitation variables created"
    );
}

/// Per TA: at most the willingness-tier cap. Per slot: within `recitation_leaders`.
pub fn add_recitation_constraints(ctx: &mut ModelBuilderContext<'_>) {
    let input = ctx.input;
    for (t, ta) in input.tas.iter().enumerate() {
        let vars: LinearExpr = ctx.recitations_of(t).map(|(_, v)| v).collect();
        if vars.is_constant() {
            continue;
        }
        let cap = ctx.config.recitation_cap(ta.willingness);
        debug!(ta = %ta.name, cap, "recitation cap");
        ctx.model
            .add_le(ConstraintKind::RecitationCap, vars, i64::from(cap));
    }

    let [lo, hi] = ctx.config.recitation_leaders;
    let mut per_slot: Vec<LinearExpr> = vec![LinearExpr::new(); input.recitations.len()];
    for (&(_, r), &var) in &ctx.recitation_vars {
        per_slot[r].add_term(1, var);
    }
    for expr in per_slot {
        ctx.model.add_range(
            ConstraintKind::RecitationDemand,
            expr,
            Some(i64::from(lo)),
            Some(i64::from(hi)),
        );
    }
}

/// No TA holds office hours during a recitation they lead.
pub fn add_overlap_constraints(ctx: &mut ModelBuilderContext<'_>) {
    let mut pairs: Vec<(VarId, VarId)> = Vec::new();
    for (b, block) in ctx.blocks.iter() {
        for (r, slot) in ctx.input.recitations.iter().enumerate() {
            if !overlaps(block, slot) {
                continue;
            }
            for t in 0..ctx.input.tas.len() {
                if let (Some(&bv), Some(&rv)) = (
                    ctx.block_vars.get(&(t, b)),
                    ctx.recitation_vars.get(&(t, r)),
                ) {
                    pairs.push((bv, rv));
                }
            }
        }
    }
    for (bv, rv) in pairs {
        ctx.model
            .add_le(ConstraintKind::Overlap, LinearExpr::from(bv) + rv, 1);
    }
    info!(
        overlap = ctx.model.count(ConstraintKind::Overlap),
        "overlap constraints added"
    );
}
