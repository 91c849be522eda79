//! Solving a [`ProblemInput`] and decoding the solver's values into a [`Schedule`].
use crate::config::SchedulerConfig;
use crate::error::SchedulerError;
use crate::input::{ProblemInput, RecitationSlot};
use crate::model::{BuiltModel, Demand, ShiftCandidate, TimeBlock, build_model_pipeline};
use crate::solver::{SolveResponse, SolveStatus, SolverBackend, SolverError, backend_for};
use std::fmt;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfficeHourAssignment {
    pub ta: String,
    pub block_id: usize,
    pub block: TimeBlock,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftAssignment {
    pub ta: String,
    pub shift: ShiftCandidate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecitationAssignment {
    pub ta: String,
    pub slot_id: usize,
    pub slot: RecitationSlot,
}

/// A directed buddy request whose two TAs both lead the same recitation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuddyCredit {
    pub requester: String,
    pub requested: String,
    pub slot_id: usize,
}

/// Weekly hours a TA ends up with, next to their stated budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commitment {
    pub ta: String,
    pub office_hours: u32,
    pub recitations: u32,
    /// Grading, office hours and recitation time combined.
    pub total_hours: u32,
    pub min_hours: u32,
    pub max_hours: u32,
}

impl Commitment {
    pub fn within_budget(&self) -> bool {
        self.total_hours <= self.max_hours
    }
}

#[derive(Debug, Clone)]
pub struct Schedule {
    pub status: SolveStatus,
    /// Objective value of the rounded assignment, evaluated on the integer model.
    pub objective: i64,
    pub wall_time: Duration,
    pub office_hours: Vec<OfficeHourAssignment>,
    pub shifts: Vec<ShiftAssignment>,
    pub recitations: Vec<RecitationAssignment>,
    pub buddies: Vec<BuddyCredit>,
    pub commitments: Vec<Commitment>,
    blocks: Vec<TimeBlock>,
    demand: Vec<Demand>,
    slots: Vec<RecitationSlot>,
}

impl Schedule {
    /// Decodes rounded values (one per model variable) against the builder's variable maps.
    /// `values` must cover every model variable; [`solve_schedule`] checks this first.
    pub(crate) fn decode(
        built: &BuiltModel,
        input: &ProblemInput,
        config: &SchedulerConfig,
        response: &SolveResponse,
        values: &[i64],
    ) -> Self {
        let selected = |var: crate::model::VarId| values[var.index()] == 1;
        let name = |t: usize| input.tas[t].name.clone();

        let office_hours: Vec<_> = built
            .block_vars
            .iter()
            .filter(|&(_, &var)| selected(var))
            .filter_map(|(&(t, b), _)| {
                built.blocks.get(b).map(|block| OfficeHourAssignment {
                    ta: name(t),
                    block_id: b,
                    block: *block,
                })
            })
            .collect();

        let shifts = built
            .shift_vars
            .iter()
            .filter(|s| selected(s.var))
            .map(|s| ShiftAssignment {
                ta: name(s.ta),
                shift: s.shift,
            })
            .collect();

        let recitations: Vec<_> = built
            .recitation_vars
            .iter()
            .filter(|&(_, &var)| selected(var))
            .map(|(&(t, r), _)| RecitationAssignment {
                ta: name(t),
                slot_id: r,
                slot: input.recitations[r].clone(),
            })
            .collect();

        // Credited on the assignment itself so a loose linearization cannot report phantom pairs.
        let leads = |t: usize, r: usize| {
            built
                .recitation_vars
                .get(&(t, r))
                .is_some_and(|&var| selected(var))
        };
        let buddies = built
            .buddy_vars
            .iter()
            .filter(|b| leads(b.requester, b.slot) && leads(b.requested, b.slot))
            .map(|b| BuddyCredit {
                requester: name(b.requester),
                requested: name(b.requested),
                slot_id: b.slot,
            })
            .collect();

        let commitments = input
            .tas
            .iter()
            .map(|ta| {
                let oh = office_hours.iter().filter(|a| a.ta == ta.name).count() as u32;
                let recs = recitations.iter().filter(|a| a.ta == ta.name).count() as u32;
                Commitment {
                    ta: ta.name.clone(),
                    office_hours: oh,
                    recitations: recs,
                    total_hours: config.grading_time_cost
                        + oh
                        + config.recitation_time_cost * recs,
                    min_hours: ta.min_hours,
                    max_hours: ta.max_hours,
                }
            })
            .collect();

        Schedule {
            status: response.status.clone(),
            objective: built.model.evaluate(values),
            wall_time: response.wall_time,
            office_hours,
            shifts,
            recitations,
            buddies,
            commitments,
            blocks: built.blocks.blocks().to_vec(),
            demand: (0..built.blocks.len()).map(|b| built.blocks.demand(b)).collect(),
            slots: input.recitations.clone(),
        }
    }

    /// Every block in index order with the TAs staffing it.
    pub fn by_block(&self) -> Vec<(TimeBlock, Vec<&str>)> {
        self.blocks
            .iter()
            .enumerate()
            .map(|(id, block)| {
                let tas = self
                    .office_hours
                    .iter()
                    .filter(|a| a.block_id == id)
                    .map(|a| a.ta.as_str())
                    .collect();
                (*block, tas)
            })
            .collect()
    }

    /// Every block in index order with its demand range and the TAs staffing it.
    pub fn staffing(&self) -> Vec<(TimeBlock, Demand, Vec<&str>)> {
        self.by_block()
            .into_iter()
            .zip(&self.demand)
            .map(|((block, tas), demand)| (block, *demand, tas))
            .collect()
    }

    /// Every recitation slot in input order with its leaders.
    pub fn by_recitation(&self) -> Vec<(&RecitationSlot, Vec<&str>)> {
        self.slots
            .iter()
            .enumerate()
            .map(|(id, slot)| {
                let tas = self
                    .recitations
                    .iter()
                    .filter(|a| a.slot_id == id)
                    .map(|a| a.ta.as_str())
                    .collect();
                (slot, tas)
            })
            .collect()
    }

    pub fn commitment(&self, ta: &str) -> Option<&Commitment> {
        self.commitments.iter().find(|c| c.ta == ta)
    }

    pub fn shifts_of<'a>(&'a self, ta: &'a str) -> impl Iterator<Item = &'a ShiftCandidate> {
        self.shifts.iter().filter(move |s| s.ta == ta).map(|s| &s.shift)
    }

    pub fn leads(&self, ta: &str, slot_id: usize) -> bool {
        self.recitations
            .iter()
            .any(|a| a.ta == ta && a.slot_id == slot_id)
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "status: {:?}, objective: {}, solved in {:.2?}",
            self.status, self.objective, self.wall_time
        )?;
        writeln!(f, "\nOffice hours")?;
        for (block, tas) in self.by_block() {
            writeln!(f, "  {:<18} {}", block.to_string(), tas.join(", "))?;
        }
        if !self.slots.is_empty() {
            writeln!(f, "\nRecitations")?;
            for (slot, tas) in self.by_recitation() {
                writeln!(f, "  {:<18} {}", slot.to_string(), tas.join(", "))?;
            }
        }
        if !self.buddies.is_empty() {
            writeln!(f, "\nBuddy pairs")?;
            for b in &self.buddies {
                writeln!(
                    f,
                    "  {} -> {} ({})",
                    b.requester, b.requested, self.slots[b.slot_id]
                )?;
            }
        }
        writeln!(f, "\nWorkload")?;
        for c in &self.commitments {
            writeln!(
                f,
                "  {:<16} OH {:>2}h  rec {}  total {:>2}h  budget {}-{}h",
                c.ta, c.office_hours, c.recitations, c.total_hours, c.min_hours, c.max_hours
            )?;
        }
        Ok(())
    }
}

/// Builds the model, runs `backend` and decodes the result.
///
/// Infeasibility is reported as [`SchedulerError::Infeasible`]; no partial schedule is produced.
pub fn solve_schedule(
    input: &ProblemInput,
    config: &SchedulerConfig,
    backend: &dyn SolverBackend,
) -> Result<Schedule, SchedulerError> {
    let built = build_model_pipeline(input, config)?;
    info!(backend = backend.name(), "solving");
    let response = backend.solve(&built.model)?;
    let failed = |message: String| SolverError::Failed {
        backend: backend.name(),
        message,
    };

    match &response.status {
        SolveStatus::Optimal | SolveStatus::Feasible => {}
        SolveStatus::Infeasible => {
            warn!(
                elapsed = ?response.wall_time,
                "no assignment satisfies every hard constraint"
            );
            return Err(SchedulerError::Infeasible);
        }
        SolveStatus::Error(message) => return Err(failed(message.clone()).into()),
    }

    let values = response.rounded();
    if values.len() != built.model.num_vars() {
        return Err(failed(format!(
            "returned {} values for {} variables",
            values.len(),
            built.model.num_vars()
        ))
        .into());
    }
    let violations = built.model.violations(&values);
    if !violations.is_empty() {
        for v in &violations {
            warn!(constraint = %v, "solution violates constraint");
        }
        return Err(failed(format!(
            "solution violates {} constraints",
            violations.len()
        ))
        .into());
    }

    let schedule = Schedule::decode(&built, input, config, &response, &values);
    info!(
        status = ?schedule.status,
        objective = schedule.objective,
        office_hours = schedule.office_hours.len(),
        recitations = schedule.recitations.len(),
        "schedule decoded"
    );
    Ok(schedule)
}

/// [`solve_schedule`] with the backend named in `config.solver`.
pub fn solve(input: &ProblemInput, config: &SchedulerConfig) -> Result<Schedule, SchedulerError> {
    let backend = backend_for(&config.solver)?;
    solve_schedule(input, config, backend.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{BuddyRequest, ClockTime, CoverageWindow, Day, Ta};
    use crate::model::build_model_pipeline;

    fn input() -> ProblemInput {
        ProblemInput {
            coverage: vec![CoverageWindow::new(Day::Mon, 10, 12, 1, 1)],
            recitations: vec![RecitationSlot::new(
                Day::Tue,
                ClockTime::from_hour(9),
                ClockTime::from_hm(9, 50),
            )],
            tas: vec![
                Ta::new("Ada", 0, 20)
                    .with_willingness(3)
                    .with_availability(vec![true, true])
                    .with_recitations(vec![true]),
                Ta::new("Grace", 0, 20)
                    .with_willingness(3)
                    .with_availability(vec![false, false])
                    .with_recitations(vec![true]),
            ],
            buddies: vec![BuddyRequest::new("Ada", "Grace")],
            ..Default::default()
        }
    }

    #[test]
    fn decode_reads_selected_vars() {
        let input = input();
        let config = SchedulerConfig::default();
        let built = build_model_pipeline(&input, &config).unwrap();

        let mut values = vec![0; built.model.num_vars()];
        values[built.block_vars[&(0, 0)].index()] = 1;
        values[built.block_vars[&(0, 1)].index()] = 1;
        let long = built
            .shift_vars
            .iter()
            .find(|s| s.ta == 0 && s.shift.len() == 2)
            .unwrap();
        values[long.var.index()] = 1;
        values[built.recitation_vars[&(0, 0)].index()] = 1;
        values[built.recitation_vars[&(1, 0)].index()] = 1;
        values[built.buddy_vars[0].var.index()] = 1;
        assert!(built.model.violations(&values).is_empty());

        let response = SolveResponse {
            status: SolveStatus::Optimal,
            values: values.iter().map(|&v| v as f64).collect(),
            wall_time: Duration::ZERO,
        };
        let schedule = Schedule::decode(&built, &input, &config, &response, &values);

        assert_eq!(schedule.office_hours.len(), 2);
        assert_eq!(schedule.shifts.len(), 1);
        assert_eq!(schedule.shifts[0].shift.len(), 2);
        assert!(schedule.leads("Ada", 0) && schedule.leads("Grace", 0));
        assert_eq!(schedule.buddies.len(), 1);
        // 2 blocks + two recitations worth round(2^3) each + one buddy bonus
        assert_eq!(schedule.objective, 2 + 8 + 8 + 3);

        let ada = schedule.commitment("Ada").unwrap();
        assert_eq!((ada.office_hours, ada.recitations, ada.total_hours), (2, 1, 8));
        assert!(ada.within_budget());

        let by_block = schedule.by_block();
        assert_eq!(by_block[0].1, vec!["Ada"]);
        let staffing = schedule.staffing();
        assert_eq!(staffing.len(), 2);
        assert_eq!((staffing[1].1.lower, staffing[1].1.upper), (1, 1));
        assert_eq!(schedule.by_recitation()[0].1, vec!["Ada", "Grace"]);
        assert!(schedule.to_string().contains("Mon 10:00-11:00"));
    }

    #[test]
    fn buddy_is_not_credited_for_a_lone_leader() {
        let input = input();
        let config = SchedulerConfig::default();
        let built = build_model_pipeline(&input, &config).unwrap();

        let mut values = vec![0; built.model.num_vars()];
        values[built.recitation_vars[&(0, 0)].index()] = 1;
        let response = SolveResponse {
            status: SolveStatus::Feasible,
            values: values.iter().map(|&v| v as f64).collect(),
            wall_time: Duration::ZERO,
        };
        let schedule = Schedule::decode(&built, &input, &config, &response, &values);
        assert!(schedule.buddies.is_empty());
        assert_eq!(schedule.status, SolveStatus::Feasible);
    }

    struct Fixed(SolveStatus);

    impl SolverBackend for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn solve(&self, _: &crate::model::Model) -> Result<SolveResponse, SolverError> {
            Ok(SolveResponse {
                status: self.0.clone(),
                values: Vec::new(),
                wall_time: Duration::ZERO,
            })
        }
    }

    #[test]
    fn infeasible_status_is_terminal() {
        let err = solve_schedule(
            &input(),
            &SchedulerConfig::default(),
            &Fixed(SolveStatus::Infeasible),
        )
        .unwrap_err();
        assert!(matches!(err, SchedulerError::Infeasible));
    }

    #[test]
    fn solver_errors_and_short_solutions_are_reported() {
        let err = solve_schedule(
            &input(),
            &SchedulerConfig::default(),
            &Fixed(SolveStatus::Error("boom".into())),
        )
        .unwrap_err();
        assert!(matches!(err, SchedulerError::Solver(_)));
        assert!(err.to_string().contains("boom"));

        let err = solve_schedule(
            &input(),
            &SchedulerConfig::default(),
            &Fixed(SolveStatus::Optimal),
        )
        .unwrap_err();
        assert!(err.to_string().contains("values for"));
    }
}
