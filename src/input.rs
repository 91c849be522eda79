//! Problem input: the TA roster, coverage windows and recitation slots.
//!
//! This is the normalized form handed over by the data-ingestion side. Availability is carried
//! as plain boolean bitsets indexed by block id (see [`crate::model::BlockIndex`]) and by
//! recitation slot position.
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Day of the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Day {
    #[serde(alias = "Monday", alias = "M")]
    Mon,
    #[serde(alias = "Tuesday", alias = "T")]
    Tue,
    #[serde(alias = "Wednesday", alias = "W")]
    Wed,
    #[serde(alias = "Thursday", alias = "R")]
    Thu,
    #[serde(alias = "Friday", alias = "F")]
    Fri,
    #[serde(alias = "Saturday", alias = "S")]
    Sat,
    #[serde(alias = "Sunday", alias = "U")]
    Sun,
}

impl Day {
    pub fn is_weekend(self) -> bool {
        matches!(self, Day::Sat | Day::Sun)
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Day::Mon => "Mon",
            Day::Tue => "Tue",
            Day::Wed => "Wed",
            Day::Thu => "Thu",
            Day::Fri => "Fri",
            Day::Sat => "Sat",
            Day::Sun => "Sun",
        };
        f.write_str(s)
    }
}

/// Time of day with minute precision, stored as minutes past midnight.
///
/// Serialized as `"HH:MM"`; a bare hour (`"14"`) is accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime(u32);

impl ClockTime {
    pub fn from_hm(hour: u32, minute: u32) -> Self {
        ClockTime(hour * 60 + minute)
    }

    pub fn from_hour(hour: u32) -> Self {
        ClockTime(hour * 60)
    }

    pub fn minutes(self) -> u32 {
        self.0
    }
}

impl FromStr for ClockTime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (h, m) = match s.split_once(':') {
            Some((h, m)) => (h, m),
            None => (s, "0"),
        };
        let hour: u32 = h.parse().map_err(|_| format!("invalid hour in clock time '{s}'"))?;
        let minute: u32 = m.parse().map_err(|_| format!("invalid minute in clock time '{s}'"))?;
        if hour > 24 || minute >= 60 || (hour == 24 && minute != 0) {
            return Err(format!("clock time '{s}' out of range"));
        }
        Ok(ClockTime::from_hm(hour, minute))
    }
}

impl TryFrom<String> for ClockTime {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ClockTime> for String {
    fn from(value: ClockTime) -> Self {
        value.to_string()
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

/// A contiguous run of office-hour coverage on one day, with an inclusive staffing range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageWindow {
    pub day: Day,
    pub start_hour: u32,
    pub end_hour: u32,
    pub min_tas: u32,
    pub max_tas: u32,
}

impl CoverageWindow {
    pub fn new(day: Day, start_hour: u32, end_hour: u32, min_tas: u32, max_tas: u32) -> Self {
        Self {
            day,
            start_hour,
            end_hour,
            min_tas,
            max_tas,
        }
    }
}

/// A recitation section. Slots are identified by their position in [`ProblemInput::recitations`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecitationSlot {
    pub day: Day,
    pub start: ClockTime,
    pub end: ClockTime,
}

impl RecitationSlot {
    pub fn new(day: Day, start: ClockTime, end: ClockTime) -> Self {
        Self { day, start, end }
    }
}

impl fmt::Display for RecitationSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}-{}", self.day, self.start, self.end)
    }
}

/// One teaching assistant and their stated availability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ta {
    pub name: String,
    pub min_hours: u32,
    pub max_hours: u32,
    /// Self-reported recitation preference, 0 (never) to 5.
    pub willingness: u8,
    #[serde(default)]
    pub returning: bool,
    /// Indexed by block id.
    pub available: Vec<bool>,
    /// Indexed by block id; must be a subset of `available`. Empty means no preferences.
    #[serde(default)]
    pub preferred: Vec<bool>,
    /// Indexed by recitation slot.
    #[serde(default)]
    pub recitation_available: Vec<bool>,
}

impl Ta {
    /// A TA with the given budget and no availability yet.
    pub fn new(name: impl Into<String>, min_hours: u32, max_hours: u32) -> Self {
        Self {
            name: name.into(),
            min_hours,
            max_hours,
            willingness: 0,
            returning: false,
            available: Vec::new(),
            preferred: Vec::new(),
            recitation_available: Vec::new(),
        }
    }

    pub fn with_willingness(mut self, willingness: u8) -> Self {
        self.willingness = willingness;
        self
    }

    pub fn returning(mut self) -> Self {
        self.returning = true;
        self
    }

    pub fn with_availability(mut self, available: Vec<bool>) -> Self {
        self.available = available;
        self
    }

    pub fn with_preferred(mut self, preferred: Vec<bool>) -> Self {
        self.preferred = preferred;
        self
    }

    pub fn with_recitations(mut self, recitation_available: Vec<bool>) -> Self {
        self.recitation_available = recitation_available;
        self
    }

    pub fn is_available(&self, block: usize) -> bool {
        self.available.get(block).copied().unwrap_or(false)
    }

    pub fn prefers(&self, block: usize) -> bool {
        self.preferred.get(block).copied().unwrap_or(false)
    }

    pub fn can_lead(&self, slot: usize) -> bool {
        self.recitation_available.get(slot).copied().unwrap_or(false)
    }
}

/// A one-directional request to co-lead a recitation with a named peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuddyRequest {
    pub requester: String,
    pub requested: String,
}

impl BuddyRequest {
    pub fn new(requester: impl Into<String>, requested: impl Into<String>) -> Self {
        Self {
            requester: requester.into(),
            requested: requested.into(),
        }
    }
}

/// The resource an [`Override`] pins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideTarget {
    Block { day: Day, hour: u32 },
    Recitation(usize),
}

/// Forces one TA's assignment to a resource to a fixed value (semester-specific pins).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Override {
    pub ta: String,
    pub resource: OverrideTarget,
    pub value: bool,
}

impl Override {
    pub fn block(ta: impl Into<String>, day: Day, hour: u32, value: bool) -> Self {
        Self {
            ta: ta.into(),
            resource: OverrideTarget::Block { day, hour },
            value,
        }
    }

    pub fn recitation(ta: impl Into<String>, slot: usize, value: bool) -> Self {
        Self {
            ta: ta.into(),
            resource: OverrideTarget::Recitation(slot),
            value,
        }
    }
}

/// Everything the model builder consumes besides [`crate::SchedulerConfig`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProblemInput {
    pub coverage: Vec<CoverageWindow>,
    #[serde(default)]
    pub recitations: Vec<RecitationSlot>,
    pub tas: Vec<Ta>,
    #[serde(default)]
    pub buddies: Vec<BuddyRequest>,
    #[serde(default)]
    pub overrides: Vec<Override>,
}

impl ProblemInput {
    pub fn from_json_str(s: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_json_str(&contents)
    }

    pub fn ta_index(&self, name: &str) -> Option<usize> {
        self.tas.iter().position(|ta| ta.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_time_parses_hours_and_minutes() {
        assert_eq!("10:30".parse::<ClockTime>().unwrap().minutes(), 630);
        assert_eq!("9".parse::<ClockTime>().unwrap(), ClockTime::from_hour(9));
        assert!("25:00".parse::<ClockTime>().is_err());
        assert!("10:75".parse::<ClockTime>().is_err());
        assert_eq!(ClockTime::from_hm(8, 5).to_string(), "08:05");
    }

    #[test]
    fn weekend_days() {
        assert!(Day::Sat.is_weekend());
        assert!(Day::Sun.is_weekend());
        assert!(!Day::Fri.is_weekend());
    }

    #[test]
    fn problem_input_from_json() {
        let json = r#"{
            "coverage": [{"day": "Mon", "start_hour": 10, "end_hour": 12, "min_tas": 1, "max_tas": 2}],
            "recitations": [{"day": "Tuesday", "start": "10:30", "end": "11:20"}],
            "tas": [{
                "name": "Ada",
                "min_hours": 6,
                "max_hours": 10,
                "willingness": 3,
                "available": [true, true],
                "preferred": [false, true],
                "recitation_available": [true]
            }],
            "buddies": [{"requester": "Ada", "requested": "Grace"}],
            "overrides": [{"ta": "Ada", "resource": {"block": {"day": "Mon", "hour": 10}}, "value": true}]
        }"#;
        let input = ProblemInput::from_json_str(json).unwrap();
        assert_eq!(input.coverage.len(), 1);
        assert_eq!(input.recitations[0].day, Day::Tue);
        assert_eq!(input.recitations[0].start, ClockTime::from_hm(10, 30));
        assert!(!input.tas[0].returning);
        assert!(input.tas[0].prefers(1));
        assert!(!input.tas[0].is_available(7));
        assert_eq!(
            input.overrides[0].resource,
            OverrideTarget::Block {
                day: Day::Mon,
                hour: 10
            }
        );
        assert_eq!(input.ta_index("Ada"), Some(0));
        assert_eq!(input.ta_index("Grace"), None);
    }

    #[test]
    fn missing_input_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let err = ProblemInput::from_json_file(&path).unwrap_err();
        assert!(err.to_string().contains("absent.json"));
    }
}
