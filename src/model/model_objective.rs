//! Weighted utility objective with linearized buddy bonuses.
use super::linear::{ConstraintKind, LinearExpr, VarId};
use super::model_context::{BuddyVar, ModelBuilderContext};
use crate::config::BuddyLinearization;
use tracing::{info, warn};

/// Links `b` to the recitation variables of a buddy pair.
///
/// With [`BuddyLinearization::Conjunction`], `b <= requester`, `b <= requested` and
/// `b >= requester + requested - 1`, so `b` is 1 exactly when both lead the slot.
/// [`BuddyLinearization::RequesterOnly`] keeps the legacy bound that adds the requester to itself,
/// `2 * requester - 1 <= b <= 2 * requester`, under which `b` equals the requester's variable.
pub fn link_buddy_var(
    ctx: &mut ModelBuilderContext<'_>,
    b: VarId,
    requester: VarId,
    requested: VarId,
) {
    let model = &mut ctx.model;
    match ctx.config.buddy_linearization {
        BuddyLinearization::Conjunction => {
            model.add_le(ConstraintKind::BuddyLink, b, requester);
            model.add_le(ConstraintKind::BuddyLink, b, requested);
            model.add_ge(
                ConstraintKind::BuddyLink,
                b,
                LinearExpr::from(requester) + requested - 1,
            );
        }
        BuddyLinearization::RequesterOnly => {
            let doubled = LinearExpr::from(requester) + requester;
            model.add_ge(ConstraintKind::BuddyLink, b, doubled.clone() - 1);
            model.add_le(ConstraintKind::BuddyLink, b, doubled);
        }
    }
}

/// Creates one buddy variable per (request, shared recitation slot). Requests naming an unknown
/// TA, or the requester twice, are dropped.
pub fn add_buddy_vars(ctx: &mut ModelBuilderContext<'_>) {
    let input = ctx.input;
    for request in &input.buddies {
        let (Some(requester), Some(requested)) = (
            input.ta_index(&request.requester),
            input.ta_index(&request.requested),
        ) else {
            warn!(
                requester = %request.requester,
                requested = %request.requested,
                "dropping buddy request naming an unknown TA"
            );
            continue;
        };
        if requester == requested {
            warn!(ta = %request.requester, "dropping buddy request naming the requester as partner");
            continue;
        }
        for slot in 0..input.recitations.len() {
            let (Some(&r1), Some(&r2)) = (
                ctx.recitation_vars.get(&(requester, slot)),
                ctx.recitation_vars.get(&(requested, slot)),
            ) else {
                continue;
            };
            let var = ctx.model.new_bool_var(format!(
                "buddy[{}][{}][{slot}]",
                request.requester, request.requested
            ));
            link_buddy_var(ctx, var, r1, r2);
            ctx.buddy_vars.push(BuddyVar {
                requester,
                requested,
                slot,
                var,
            });
        }
    }
}

/// `OH term + alpha * recitation term`, maximized.
///
/// Office-hour blocks weigh `oh_preferred_weight` when preferred, 1 otherwise. Each recitation a
/// TA leads is worth `round(multiplier * shape^willingness)`, and each buddy variable
/// `buddy_weight`.
pub fn add_objective(ctx: &mut ModelBuilderContext<'_>) {
    add_buddy_vars(ctx);

    let config = ctx.config;
    let mut oh_term = LinearExpr::new();
    for (&(t, b), &var) in &ctx.block_vars {
        let weight = if ctx.input.tas[t].prefers(b) {
            config.oh_preferred_weight
        } else {
            1
        };
        oh_term.add_term(weight, var);
    }

    let mut recitation_term = LinearExpr::new();
    for (&(t, _), &var) in &ctx.recitation_vars {
        let ta = &ctx.input.tas[t];
        recitation_term.add_term(config.recitation_utility(ta.willingness, ta.returning), var);
    }
    for buddy in &ctx.buddy_vars {
        recitation_term.add_term(config.buddy_weight, buddy.var);
    }

    info!(
        oh_terms = oh_term.terms.len(),
        recitation_terms = recitation_term.terms.len(),
        buddy_vars = ctx.buddy_vars.len(),
        "objective assembled"
    );
    ctx.model
        .maximize(oh_term + recitation_term * config.recitation_weight);
}
