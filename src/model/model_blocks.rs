//! Time-block index: the fixed universe of hour-long office-hour blocks.
use crate::input::{CoverageWindow, Day};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// One hour of office-hour coverage, `[start, start + 1)` on `day`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeBlock {
    pub day: Day,
    pub start: u32,
}

impl TimeBlock {
    pub fn new(day: Day, start: u32) -> Self {
        Self { day, start }
    }

    pub fn end(&self) -> u32 {
        self.start + 1
    }

    /// Start and end in minutes past midnight.
    pub fn minutes(&self) -> (u32, u32) {
        (self.start * 60, self.end() * 60)
    }
}

impl fmt::Display for TimeBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:02}:00-{:02}:00", self.day, self.start, self.end())
    }
}

/// Inclusive staffing range for one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Demand {
    pub lower: u32,
    pub upper: u32,
}

/// Ordered block universe. Ids follow window declaration order, hours ascending within a window;
/// availability bitsets in [`crate::input::Ta`] are indexed by these ids.
#[derive(Debug, Clone, Default)]
pub struct BlockIndex {
    blocks: Vec<TimeBlock>,
    demand: Vec<Demand>,
    lookup: HashMap<(Day, u32), usize>,
}

impl BlockIndex {
    /// Enumerates one block per covered hour. Windows must not overlap on a day
    /// (see [`crate::validation::validate_coverage`]).
    pub fn new(windows: &[CoverageWindow]) -> Self {
        let mut index = BlockIndex::default();
        for w in windows {
            for hour in w.start_hour..w.end_hour {
                let block = TimeBlock::new(w.day, hour);
                index.lookup.insert((w.day, hour), index.blocks.len());
                index.blocks.push(block);
                index.demand.push(Demand {
                    lower: w.min_tas,
                    upper: w.max_tas,
                });
            }
        }
        index
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, id: usize) -> Option<&TimeBlock> {
        self.blocks.get(id)
    }

    pub fn demand(&self, id: usize) -> Demand {
        self.demand[id]
    }

    pub fn find(&self, day: Day, hour: u32) -> Option<usize> {
        self.lookup.get(&(day, hour)).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &TimeBlock)> {
        self.blocks.iter().enumerate()
    }

    pub fn blocks(&self) -> &[TimeBlock] {
        &self.blocks
    }
}
