use tasched_core::solver::GoodLpBackend;
use tasched_core::{
    BuddyLinearization, BuddyRequest, ClockTime, ConfigError, CoverageWindow, Day, Override,
    ProblemInput, RecitationSlot, SchedulerConfig, SchedulerError, Ta, ValidationError,
    solve_schedule,
};

fn slot(day: Day, hour: u32) -> RecitationSlot {
    RecitationSlot::new(day, ClockTime::from_hour(hour), ClockTime::from_hm(hour, 50))
}

fn run(input: &ProblemInput, config: &SchedulerConfig) -> Result<tasched_core::Schedule, SchedulerError> {
    solve_schedule(input, config, &GoodLpBackend::default())
}

#[test]
fn adjacent_blocks_form_one_two_hour_shift() {
    let input = ProblemInput {
        coverage: vec![CoverageWindow::new(Day::Mon, 10, 12, 0, 1)],
        tas: vec![Ta::new("Ada", 0, 20).with_availability(vec![true, true])],
        ..Default::default()
    };
    let schedule = run(&input, &SchedulerConfig::default()).unwrap();

    assert_eq!(schedule.office_hours.len(), 2);
    assert_eq!(schedule.shifts.len(), 1);
    let shift = schedule.shifts[0].shift;
    assert_eq!((shift.day, shift.start, shift.end), (Day::Mon, 10, 12));
    assert_eq!(schedule.objective, 2);
}

#[test]
fn high_willingness_is_capped_at_max_recitations() {
    let input = ProblemInput {
        recitations: vec![slot(Day::Tue, 9), slot(Day::Wed, 9), slot(Day::Thu, 9)],
        tas: vec![
            Ta::new("Ada", 0, 20)
                .with_willingness(5)
                .with_recitations(vec![true, true, true]),
            Ta::new("Grace", 0, 20)
                .with_willingness(2)
                .with_recitations(vec![true, true, true]),
        ],
        ..Default::default()
    };
    let schedule = run(&input, &SchedulerConfig::default()).unwrap();

    let ada = schedule.commitment("Ada").unwrap();
    let grace = schedule.commitment("Grace").unwrap();
    assert_eq!(ada.recitations, 2);
    assert_eq!(grace.recitations, 1);
    for (_, leaders) in schedule.by_recitation() {
        assert_eq!(leaders.len(), 1);
    }
}

#[test]
fn mutual_buddies_earn_the_bonus_twice() {
    let input = ProblemInput {
        recitations: vec![slot(Day::Fri, 13)],
        tas: vec![
            Ta::new("Ada", 0, 20)
                .with_willingness(3)
                .with_recitations(vec![true]),
            Ta::new("Grace", 0, 20)
                .with_willingness(3)
                .with_recitations(vec![true]),
        ],
        buddies: vec![
            BuddyRequest::new("Ada", "Grace"),
            BuddyRequest::new("Grace", "Ada"),
        ],
        ..Default::default()
    };
    let config = SchedulerConfig::default();
    let schedule = run(&input, &config).unwrap();

    assert!(schedule.leads("Ada", 0) && schedule.leads("Grace", 0));
    assert_eq!(schedule.buddies.len(), 2);
    assert_eq!(schedule.objective, 8 + 8 + 2 * config.buddy_weight);
}

/// Two slots that each need a leader, two single-recitation TAs: the buddy pair can never share.
fn split_pair() -> ProblemInput {
    ProblemInput {
        recitations: vec![slot(Day::Tue, 9), slot(Day::Wed, 9)],
        tas: vec![
            Ta::new("Ada", 0, 20)
                .with_willingness(3)
                .with_recitations(vec![true, true]),
            Ta::new("Grace", 0, 20)
                .with_willingness(3)
                .with_recitations(vec![true, true]),
        ],
        buddies: vec![BuddyRequest::new("Ada", "Grace")],
        ..Default::default()
    }
}

#[test]
fn conjunction_mode_never_credits_a_split_pair() {
    let schedule = run(&split_pair(), &SchedulerConfig::default()).unwrap();
    assert!(schedule.buddies.is_empty());
    assert_eq!(schedule.objective, 16);
}

#[test]
fn requester_only_mode_tracks_the_requester_alone() {
    let config =
        SchedulerConfig::default().with_buddy_linearization(BuddyLinearization::RequesterOnly);
    let schedule = run(&split_pair(), &config).unwrap();

    // The objective still pays the bonus for the slot Ada leads, without Grace.
    assert_eq!(schedule.objective, 16 + config.buddy_weight);
    assert!(schedule.buddies.is_empty());
}

#[test]
fn unmet_demand_is_infeasible() {
    let input = ProblemInput {
        coverage: vec![CoverageWindow::new(Day::Mon, 10, 11, 2, 3)],
        tas: vec![Ta::new("Ada", 0, 20).with_availability(vec![true])],
        ..Default::default()
    };
    let err = run(&input, &SchedulerConfig::default()).unwrap_err();
    assert!(matches!(err, SchedulerError::Infeasible));
}

#[test]
fn unstaffable_block_is_infeasible_without_solving() {
    let input = ProblemInput {
        coverage: vec![CoverageWindow::new(Day::Mon, 10, 11, 1, 1)],
        tas: vec![Ta::new("Ada", 0, 20).with_availability(vec![false])],
        ..Default::default()
    };
    let err = run(&input, &SchedulerConfig::default()).unwrap_err();
    assert!(matches!(err, SchedulerError::Infeasible));
}

#[test]
fn global_minimum_forces_extra_hours() {
    let input = ProblemInput {
        coverage: vec![CoverageWindow::new(Day::Mon, 10, 14, 0, 1)],
        tas: vec![Ta::new("Ada", 0, 6).with_availability(vec![true; 4])],
        ..Default::default()
    };
    // 6 - 4 grading leaves room for 2 hours, short of the 3 required.
    let config = SchedulerConfig::default().with_min_total_ta_hours(3);
    let err = run(&input, &config).unwrap_err();
    assert!(matches!(err, SchedulerError::Infeasible));

    let config = SchedulerConfig::default().with_min_total_ta_hours(2);
    let schedule = run(&input, &config).unwrap();
    assert_eq!(schedule.office_hours.len(), 2);
}

#[test]
fn overrides_pin_assignments() {
    let input = ProblemInput {
        coverage: vec![CoverageWindow::new(Day::Mon, 10, 12, 0, 1)],
        tas: vec![Ta::new("Ada", 0, 20).with_availability(vec![true, true])],
        overrides: vec![Override::block("Ada", Day::Mon, 11, false)],
        ..Default::default()
    };
    let schedule = run(&input, &SchedulerConfig::default()).unwrap();
    assert_eq!(schedule.office_hours.len(), 1);
    assert_eq!(schedule.office_hours[0].block.start, 10);
}

#[test]
fn validation_errors_abort_before_solving() {
    let input = ProblemInput {
        coverage: vec![CoverageWindow::new(Day::Mon, 10, 12, 0, 1)],
        tas: vec![
            Ta::new("Ada", 0, 20)
                .with_availability(vec![true, false])
                .with_preferred(vec![false, true]),
        ],
        ..Default::default()
    };
    let err = run(&input, &SchedulerConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        SchedulerError::Validation(ValidationError::PreferredNotAvailable { .. })
    ));
}

#[test]
fn unsupported_config_fails_fast() {
    let input = ProblemInput::default();
    let config = SchedulerConfig {
        one_shift_per_day: false,
        ..Default::default()
    };
    let err = run(&input, &config).unwrap_err();
    assert!(matches!(
        err,
        SchedulerError::Config(ConfigError::Unsupported(_))
    ));
}

#[test]
fn unknown_buddy_requests_are_ignored() {
    let mut input = split_pair();
    input.buddies.push(BuddyRequest::new("Ada", "Nobody"));
    assert!(run(&input, &SchedulerConfig::default()).is_ok());
}

#[test]
fn self_buddy_request_earns_nothing() {
    let input = ProblemInput {
        recitations: vec![slot(Day::Fri, 13)],
        tas: vec![
            Ta::new("Ada", 0, 20)
                .with_willingness(3)
                .with_recitations(vec![true]),
        ],
        buddies: vec![BuddyRequest::new("Ada", "Ada")],
        ..Default::default()
    };
    let schedule = run(&input, &SchedulerConfig::default()).unwrap();
    assert!(schedule.leads("Ada", 0));
    assert!(schedule.buddies.is_empty());
    assert_eq!(schedule.objective, 8);
}
