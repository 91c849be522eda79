//! Input validation.
//!
//! Data invariants are checked before any variable is created. A violation aborts model
//! construction; nothing is dropped or coerced. Buddy requests naming unknown TAs are the one
//! exception: they are filtered out by the objective pass with a warning.
use crate::input::{CoverageWindow, Day, OverrideTarget, ProblemInput};
use crate::model::BlockIndex;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("duplicate TA name '{0}'")]
    DuplicateTa(String),

    #[error("TA '{ta}': {field} has {actual} entries, expected {expected}")]
    BitsetLength {
        ta: String,
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("TA '{ta}' prefers block {day} {hour}:00 but is not available for it")]
    PreferredNotAvailable { ta: String, day: Day, hour: u32 },

    #[error("TA '{ta}' has willingness {willingness}, expected 0..=5")]
    WillingnessOutOfRange { ta: String, willingness: u8 },

    #[error("TA '{ta}' has willingness 0 but is marked available for recitation {slot}")]
    UnwillingButAvailable { ta: String, slot: usize },

    #[error("TA '{ta}' has min_hours {min} above max_hours {max}")]
    HourBudget { ta: String, min: u32, max: u32 },

    #[error("coverage window {day} {start}-{end}: {reason}")]
    BadWindow {
        day: Day,
        start: u32,
        end: u32,
        reason: &'static str,
    },

    #[error("coverage windows overlap on {day} at {hour}:00")]
    OverlappingWindows { day: Day, hour: u32 },

    #[error("recitation {slot} ends before it starts")]
    BadRecitation { slot: usize },

    #[error("override names unknown TA '{0}'")]
    OverrideUnknownTa(String),

    #[error("override for '{ta}' references unknown resource {target}")]
    OverrideUnknownResource { ta: String, target: String },

    #[error("override forces '{ta}' onto {target}, which they are not available for")]
    OverrideUnavailable { ta: String, target: String },
}

/// Checks coverage windows in isolation; must pass before a [`BlockIndex`] is built.
pub fn validate_coverage(windows: &[CoverageWindow]) -> Result<(), ValidationError> {
    let mut covered: HashSet<(Day, u32)> = HashSet::new();
    for w in windows {
        let bad = |reason| ValidationError::BadWindow {
            day: w.day,
            start: w.start_hour,
            end: w.end_hour,
            reason,
        };
        if w.end_hour <= w.start_hour {
            return Err(bad("end hour must be after start hour"));
        }
        if w.end_hour > 24 {
            return Err(bad("end hour past midnight"));
        }
        if w.min_tas > w.max_tas {
            return Err(bad("min_tas exceeds max_tas"));
        }
        for hour in w.start_hour..w.end_hour {
            if !covered.insert((w.day, hour)) {
                return Err(ValidationError::OverlappingWindows { day: w.day, hour });
            }
        }
    }
    Ok(())
}

/// Checks the roster, recitation list and overrides against the block universe.
pub fn validate_input(input: &ProblemInput, blocks: &BlockIndex) -> Result<(), ValidationError> {
    let num_blocks = blocks.len();
    let num_slots = input.recitations.len();

    for (slot, rec) in input.recitations.iter().enumerate() {
        if rec.end <= rec.start {
            return Err(ValidationError::BadRecitation { slot });
        }
    }

    let mut names = HashSet::new();
    for ta in &input.tas {
        if !names.insert(ta.name.as_str()) {
            return Err(ValidationError::DuplicateTa(ta.name.clone()));
        }
        let check_len = |field, actual: usize, expected| {
            if actual != expected {
                Err(ValidationError::BitsetLength {
                    ta: ta.name.clone(),
                    field,
                    expected,
                    actual,
                })
            } else {
                Ok(())
            }
        };
        check_len("available", ta.available.len(), num_blocks)?;
        if !ta.preferred.is_empty() {
            check_len("preferred", ta.preferred.len(), num_blocks)?;
        }
        check_len(
            "recitation_available",
            ta.recitation_available.len(),
            num_slots,
        )?;

        if ta.willingness > 5 {
            return Err(ValidationError::WillingnessOutOfRange {
                ta: ta.name.clone(),
                willingness: ta.willingness,
            });
        }
        if ta.min_hours > ta.max_hours {
            return Err(ValidationError::HourBudget {
                ta: ta.name.clone(),
                min: ta.min_hours,
                max: ta.max_hours,
            });
        }
        for (id, block) in blocks.iter() {
            if ta.prefers(id) && !ta.is_available(id) {
                return Err(ValidationError::PreferredNotAvailable {
                    ta: ta.name.clone(),
                    day: block.day,
                    hour: block.start,
                });
            }
        }
        if ta.willingness == 0 {
            if let Some(slot) = ta.recitation_available.iter().position(|&a| a) {
                return Err(ValidationError::UnwillingButAvailable {
                    ta: ta.name.clone(),
                    slot,
                });
            }
        }
    }

    for pin in &input.overrides {
        let Some(ta_idx) = input.ta_index(&pin.ta) else {
            return Err(ValidationError::OverrideUnknownTa(pin.ta.clone()));
        };
        let ta = &input.tas[ta_idx];
        let (target, available) = match &pin.resource {
            OverrideTarget::Block { day, hour } => {
                let target = format!("block {day} {hour}:00");
                match blocks.find(*day, *hour) {
                    Some(id) => (target, ta.is_available(id)),
                    None => {
                        return Err(ValidationError::OverrideUnknownResource {
                            ta: pin.ta.clone(),
                            target,
                        });
                    }
                }
            }
            OverrideTarget::Recitation(slot) => {
                let target = format!("recitation {slot}");
                if *slot >= num_slots {
                    return Err(ValidationError::OverrideUnknownResource {
                        ta: pin.ta.clone(),
                        target,
                    });
                }
                (target, ta.can_lead(*slot))
            }
        };
        if pin.value && !available {
            return Err(ValidationError::OverrideUnavailable {
                ta: pin.ta.clone(),
                target,
            });
        }
    }

    Ok(())
}
