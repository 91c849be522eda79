//! Scheduler configuration.
//!
//! Every option has a default, so an empty TOML document is a valid configuration:
//!
//! ```
//! use tasched_core::SchedulerConfig;
//!
//! let config = SchedulerConfig::from_toml_str(r#"
//!     max_shifts_per_week = 2
//!     buddy_weight = 5
//!
//!     [solver]
//!     backend = "good_lp"
//! "#).unwrap();
//!
//! assert_eq!(config.max_shifts_per_week, 2);
//! assert_eq!(config.max_shift_length, 3);
//! ```
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("unsupported configuration: {0}")]
    Unsupported(String),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("solver backend '{0}' is not compiled into this build")]
    BackendUnavailable(String),
}

/// How the buddy bonus variable is tied to the two recitation variables it rewards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuddyLinearization {
    /// `b = requester AND requested`.
    #[default]
    Conjunction,
    /// Legacy bound `2r - 1 <= b <= 2r`, which makes `b` follow the requester alone.
    RequesterOnly,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    #[default]
    GoodLp,
    CpSat,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::GoodLp => f.write_str("good_lp"),
            BackendKind::CpSat => f.write_str("cp_sat"),
        }
    }
}

/// Solver invocation settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    pub backend: BackendKind,
    /// Wall-clock limit; backends that support early stop return the best feasible solution.
    pub time_limit_seconds: Option<f64>,
    pub threads: Option<u32>,
}

impl SolverSettings {
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_seconds.map(Duration::from_secs_f64)
    }
}

/// Model-building options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Longest office-hour shift, in hours.
    pub max_shift_length: u32,
    pub max_shifts_per_week: u32,
    pub max_recitations_per_ta: u32,
    /// Willingness at or above this may lead up to `max_recitations_per_ta`; below it, one.
    pub high_willingness_threshold: u8,
    /// Hours charged per recitation led.
    pub recitation_time_cost: u32,
    /// Fixed weekly grading hours charged to every TA.
    pub grading_time_cost: u32,
    /// Only `true` is supported.
    pub one_shift_per_day: bool,
    pub oh_preferred_weight: i64,
    pub recitation_pref_shape: f64,
    pub returning_ta_multiplier: f64,
    pub buddy_weight: i64,
    /// Scales the recitation term against the office-hour term (alpha).
    pub recitation_weight: i64,
    pub min_total_ta_hours: u32,
    /// Shifts starting at or after this hour must be at least two hours long.
    pub late_shift_hour_threshold: u32,
    /// Inclusive `[min, max]` leaders per recitation slot.
    pub recitation_leaders: [u32; 2],
    pub buddy_linearization: BuddyLinearization,
    pub solver: SolverSettings,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_shift_length: 3,
            max_shifts_per_week: 3,
            max_recitations_per_ta: 2,
            high_willingness_threshold: 4,
            recitation_time_cost: 2,
            grading_time_cost: 4,
            one_shift_per_day: true,
            oh_preferred_weight: 2,
            recitation_pref_shape: 2.0,
            returning_ta_multiplier: 1.5,
            buddy_weight: 3,
            recitation_weight: 1,
            min_total_ta_hours: 0,
            late_shift_hour_threshold: 20,
            recitation_leaders: [1, 2],
            buddy_linearization: BuddyLinearization::Conjunction,
            solver: SolverSettings::default(),
        }
    }
}

impl SchedulerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if file doesn't exist or contains invalid TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn with_max_shifts_per_week(mut self, n: u32) -> Self {
        self.max_shifts_per_week = n;
        self
    }

    pub fn with_max_shift_length(mut self, hours: u32) -> Self {
        self.max_shift_length = hours;
        self
    }

    pub fn with_grading_time_cost(mut self, hours: u32) -> Self {
        self.grading_time_cost = hours;
        self
    }

    pub fn with_recitation_time_cost(mut self, hours: u32) -> Self {
        self.recitation_time_cost = hours;
        self
    }

    pub fn with_min_total_ta_hours(mut self, hours: u32) -> Self {
        self.min_total_ta_hours = hours;
        self
    }

    pub fn with_buddy_weight(mut self, weight: i64) -> Self {
        self.buddy_weight = weight;
        self
    }

    pub fn with_buddy_linearization(mut self, mode: BuddyLinearization) -> Self {
        self.buddy_linearization = mode;
        self
    }

    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.solver.backend = backend;
        self
    }

    pub fn with_time_limit_seconds(mut self, secs: f64) -> Self {
        self.solver.time_limit_seconds = Some(secs);
        self
    }

    /// Recitation cap for a TA with the given willingness score.
    pub fn recitation_cap(&self, willingness: u8) -> u32 {
        if willingness == 0 {
            0
        } else if willingness >= self.high_willingness_threshold {
            self.max_recitations_per_ta
        } else {
            1
        }
    }

    /// Integer utility of one recitation led by a TA: `round(m * shape^willingness)`.
    pub fn recitation_utility(&self, willingness: u8, returning: bool) -> i64 {
        let multiplier = if returning {
            self.returning_ta_multiplier
        } else {
            1.0
        };
        (multiplier * self.recitation_pref_shape.powi(i32::from(willingness))).round() as i64
    }

    /// Rejects options the model builder cannot honor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.one_shift_per_day {
            return Err(ConfigError::Unsupported(
                "one_shift_per_day = false is not supported".into(),
            ));
        }
        if self.max_shift_length == 0 {
            return Err(ConfigError::Invalid(
                "max_shift_length must be at least 1".into(),
            ));
        }
        let [lo, hi] = self.recitation_leaders;
        if lo > hi {
            return Err(ConfigError::Invalid(format!(
                "recitation_leaders lower bound {lo} exceeds upper bound {hi}"
            )));
        }
        if !(self.recitation_pref_shape.is_finite() && self.recitation_pref_shape > 0.0) {
            return Err(ConfigError::Invalid(
                "recitation_pref_shape must be finite and positive".into(),
            ));
        }
        if !(self.returning_ta_multiplier.is_finite() && self.returning_ta_multiplier > 0.0) {
            return Err(ConfigError::Invalid(
                "returning_ta_multiplier must be finite and positive".into(),
            ));
        }
        if !(1..=5).contains(&self.high_willingness_threshold) {
            return Err(ConfigError::Invalid(
                "high_willingness_threshold must be between 1 and 5".into(),
            ));
        }
        if let Some(secs) = self.solver.time_limit_seconds {
            if !(secs.is_finite() && secs > 0.0) {
                return Err(ConfigError::Invalid(
                    "solver.time_limit_seconds must be positive".into(),
                ));
            }
        }
        Ok(())
    }
}
