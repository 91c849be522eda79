//! Office-hour constraints: per-TA shift limits, per-block coverage and the global hour floor.
use super::linear::{ConstraintKind, LinearExpr, VarId};
use super::model_context::ModelBuilderContext;
use crate::input::Day;
use std::collections::BTreeMap;
use tracing::info;

/// Per TA: one shift per day, `max_shifts_per_week` shifts, one maximum-length shift and one
/// weekend shift.
pub fn add_shift_limit_constraints(ctx: &mut ModelBuilderContext<'_>) {
    let max_len = ctx.config.max_shift_length;
    let weekly_cap = i64::from(ctx.config.max_shifts_per_week);

    for t in 0..ctx.input.tas.len() {
        let mut per_day: BTreeMap<Day, Vec<VarId>> = BTreeMap::new();
        let mut all = Vec::new();
        let mut longest = Vec::new();
        let mut weekend = Vec::new();
        for s in ctx.shifts_of(t) {
            per_day.entry(s.shift.day).or_default().push(s.var);
            all.push(s.var);
            if s.shift.len() == max_len {
                longest.push(s.var);
            }
            if s.shift.day.is_weekend() {
                weekend.push(s.var);
            }
        }
        if all.is_empty() {
            continue;
        }

        let model = &mut ctx.model;
        for vars in per_day.into_values() {
            if vars.len() > 1 {
                model.add_le(
                    ConstraintKind::OneShiftPerDay,
                    vars.into_iter().collect::<LinearExpr>(),
                    1,
                );
            }
        }
        model.add_le(
            ConstraintKind::WeeklyShiftCap,
            all.into_iter().collect::<LinearExpr>(),
            weekly_cap,
        );
        if !longest.is_empty() {
            model.add_le(
                ConstraintKind::LongShiftCap,
                longest.into_iter().collect::<LinearExpr>(),
                1,
            );
        }
        if !weekend.is_empty() {
            model.add_le(
                ConstraintKind::WeekendShiftCap,
                weekend.into_iter().collect::<LinearExpr>(),
                1,
            );
        }
    }
    info!(
        per_day = ctx.model.count(ConstraintKind::OneShiftPerDay),
        weekly = ctx.model.count(ConstraintKind::WeeklyShiftCap),
        "shift limit constraints added"
    );
}

/// Per block: the number of assigned TAs lies within the block's demand range.
pub fn add_coverage_constraints(ctx: &mut ModelBuilderContext<'_>) {
    let mut per_block: Vec<LinearExpr> = vec![LinearExpr::new(); ctx.blocks.len()];
    for (&(_, b), &var) in &ctx.block_vars {
        per_block[b].add_term(1, var);
    }
    for (b, expr) in per_block.into_iter().enumerate() {
        let demand = ctx.blocks.demand(b);
        ctx.model.add_range(
            ConstraintKind::Coverage,
            expr,
            Some(i64::from(demand.lower)),
            Some(i64::from(demand.upper)),
        );
    }
}

/// Total assigned TA-hours across all blocks is at least `min_total_ta_hours`.
pub fn add_global_minimum_constraint(ctx: &mut ModelBuilderContext<'_>) {
    let floor = i64::from(ctx.config.min_total_ta_hours);
    if floor == 0 {
        return;
    }
    let total: LinearExpr = ctx.block_vars.values().copied().collect();
    ctx.model
        .add_range(ConstraintKind::GlobalMinimum, total, Some(floor), None);
}
