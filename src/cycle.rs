use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::lesson::WeekVariant;
use crate::merge::merge_blocks;
use crate::timetable::{DayBlock, Timetable};

/// The closest lesson day and the one after it
pub type DayCell = [DayBlock; 2];

/// Precomputed lookahead for every (variant, weekday) pair.
///
/// Each variant maps to seven cells indexed Sunday-first (0 = Sunday,
/// 1 = Monday .. 6 = Saturday), matching a calendar week view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeekCycleTable {
    weeks: BTreeMap<WeekVariant, Vec<DayCell>>,
}

impl WeekCycleTable {
    pub fn build(timetable: &Timetable) -> Result<Self> {
        let mut resolved: Vec<Vec<DayCell>> = Vec::with_capacity(WeekVariant::ALL.len());

        for variant in WeekVariant::ALL {
            let mut days = Vec::with_capacity(6);
            for weekday in 1..=6 {
                let mut cell = timetable.closest_days(variant, weekday)?;
                merge_blocks(&mut cell);
                days.push(cell);
            }
            resolved.push(days);
        }

        // Sunday is the day before the next variant's Monday
        let mut weeks = BTreeMap::new();
        for variant in WeekVariant::ALL {
            let mut sunday = resolved[usize::from(variant.next().index())][0].clone();
            for block in sunday.iter_mut() {
                block.date_offset += 1;
            }

            let mut days = Vec::with_capacity(7);
            days.push(sunday);
            days.extend(resolved[usize::from(variant.index())].iter().cloned());
            weeks.insert(variant, days);
        }

        debug!("Built week cycle table for {} lessons", timetable.lessons().len());

        Ok(Self { weeks })
    }

    /// Cells of one variant, Sunday first
    pub fn week(&self, variant: WeekVariant) -> Option<&[DayCell]> {
        self.weeks.get(&variant).map(Vec::as_slice)
    }

    /// `weekday` counts from Sunday = 0
    pub fn cell(&self, variant: WeekVariant, weekday: u8) -> Option<&DayCell> {
        self.week(variant)?.get(usize::from(weekday))
    }
}
