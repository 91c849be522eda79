//! Weekly commitment bounds and pinned overrides.
use super::linear::{ConstraintKind, LinearExpr};
use super::model_context::ModelBuilderContext;
use crate::input::OverrideTarget;
use tracing::{debug, info};

/// Per TA: `min_hours - grading <= OH blocks + recitation_time_cost * recitations <= max_hours - grading`.
///
/// The floor is only imposed when it is positive.
pub fn add_commitment_constraints(ctx: &mut ModelBuilderContext<'_>) {
    let grading = i64::from(ctx.config.grading_time_cost);
    let rec_cost = i64::from(ctx.config.recitation_time_cost);

    let input = ctx.input;
    for (t, ta) in input.tas.iter().enumerate() {
        let mut load: LinearExpr = ctx.blocks_of(t).map(|(_, v)| v).collect();
        for (_, v) in ctx.recitations_of(t) {
            load.add_term(rec_cost, v);
        }
        let floor = i64::from(ta.min_hours) - grading;
        let ceiling = i64::from(ta.max_hours) - grading;
        debug!(ta = %ta.name, floor, ceiling, "commitment bounds");
        ctx.model.add_range(
            ConstraintKind::Commitment,
            load,
            (floor > 0).then_some(floor),
            Some(ceiling),
        );
    }
}

/// Pins individual assignments. Forcing 0 where no variable exists is already implied.
pub fn add_override_constraints(ctx: &mut ModelBuilderContext<'_>) {
    let input = ctx.input;
    for pin in &input.overrides {
        let Some(t) = input.ta_index(&pin.ta) else {
            continue;
        };
        let var = match pin.resource {
            OverrideTarget::Block { day, hour } => ctx
                .blocks
                .find(day, hour)
                .and_then(|b| ctx.block_vars.get(&(t, b)).copied()),
            OverrideTarget::Recitation(r) => ctx.recitation_vars.get(&(t, r)).copied(),
        };
        let value = i64::from(pin.value);
        match var {
            Some(var) => ctx.model.add_eq(ConstraintKind::Override, var, value),
            None => ctx
                .model
                .add_eq(ConstraintKind::Override, LinearExpr::new(), value),
        }
    }
    if !input.overrides.is_empty() {
        info!(
            overrides = ctx.model.count(ConstraintKind::Override),
            "override constraints added"
        );
    }
}

#[cfg(test)]
mod tests {
    use crate::config::SchedulerConfig;
    use crate::input::{ClockTime, CoverageWindow, Day, Override, ProblemInput, RecitationSlot, Ta};
    use crate::model::{ConstraintKind, build_model_pipeline};

    fn input() -> ProblemInput {
        ProblemInput {
            coverage: vec![CoverageWindow::new(Day::Mon, 10, 12, 0, 2)],
            recitations: vec![RecitationSlot::new(
                Day::Wed,
                ClockTime::from_hour(9),
                ClockTime::from_hm(9, 50),
            )],
            tas: vec![
                Ta::new("Ada", 8, 10)
                    .with_willingness(4)
                    .with_availability(vec![true, true])
                    .with_recitations(vec![true]),
                Ta::new("Grace", 2, 6)
                    .with_willingness(0)
                    .with_availability(vec![true, false])
                    .with_recitations(vec![false]),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn commitment_bounds_subtract_grading() {
        let built = build_model_pipeline(&input(), &SchedulerConfig::default()).unwrap();
        let bounds: Vec<_> = built
            .model
            .constraints()
            .iter()
            .filter(|c| c.kind == ConstraintKind::Commitment)
            .collect();
        assert_eq!(bounds.len(), 2);
        // Ada: 8 - 4 .. 10 - 4, recitation weighted 2
        assert_eq!((bounds[0].lower, bounds[0].upper), (Some(4), Some(6)));
        let rec = built.recitation_vars[&(0, 0)];
        assert!(bounds[0].expr.terms.contains(&(2, rec)));
        // Grace: min 2 below grading cost, so no floor
        assert_eq!((bounds[1].lower, bounds[1].upper), (None, Some(2)));
    }

    #[test]
    fn overrides_pin_variables() {
        let mut input = input();
        input.overrides = vec![
            Override::block("Ada", Day::Mon, 11, true),
            Override::recitation("Ada", 0, false),
            Override::block("Grace", Day::Mon, 11, false),
        ];
        let built = build_model_pipeline(&input, &SchedulerConfig::default()).unwrap();
        let pins: Vec<_> = built
            .model
            .constraints()
            .iter()
            .filter(|c| c.kind == ConstraintKind::Override)
            .collect();
        assert_eq!(pins.len(), 2);
        let ada_mon11 = built.block_vars[&(0, 1)];
        assert_eq!(pins[0].expr.terms, vec![(1, ada_mon11)]);
        assert_eq!((pins[0].lower, pins[0].upper), (Some(1), Some(1)));
        assert_eq!(pins[1].upper, Some(0));
        assert_eq!(built.model.trivially_infeasible(), None);
    }
}
