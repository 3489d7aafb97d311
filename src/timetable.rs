use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::MILITARY_TRAINING_MARKER;
use crate::error::{Result, ScheduleError};
use crate::lesson::{normalize_feed, LessonEntry, RawScheduleFeed, WeekVariant};

/// Days in one full pass over the week cycle (4 variants x 7 days)
pub const CYCLE_DAYS: u32 = 28;

/// Weekday number the feed uses for Sunday. Sunday never holds lessons,
/// the search only steps over it.
const SUNDAY: u8 = 7;

/// A day of lessons, `date_offset` days after the day the search started from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayBlock {
    pub date_offset: u32,
    pub lessons: Vec<LessonEntry>,
}

/// The normalized lessons of one group plus the rule deciding which of
/// them count when looking for lesson days.
#[derive(Debug, Clone)]
pub struct Timetable {
    lessons: Vec<LessonEntry>,
    excluded_marker: Option<String>,
}

impl Timetable {
    pub fn new(lessons: Vec<LessonEntry>) -> Self {
        Self {
            lessons,
            excluded_marker: Some(MILITARY_TRAINING_MARKER.to_string()),
        }
    }

    pub fn from_feed(feed: &RawScheduleFeed) -> Result<Self> {
        Ok(Self::new(normalize_feed(feed)?))
    }

    /// Replace the teacher marker of lessons that never count; an empty
    /// marker disables the exclusion
    pub fn with_excluded_marker(mut self, marker: &str) -> Self {
        let marker = marker.trim();
        self.excluded_marker = (!marker.is_empty()).then(|| marker.to_string());
        self
    }

    pub fn lessons(&self) -> &[LessonEntry] {
        &self.lessons
    }

    fn counts(&self, lesson: &LessonEntry) -> bool {
        match &self.excluded_marker {
            Some(marker) => !lesson.teacher.contains(marker.as_str()),
            None => true,
        }
    }

    /// Counted lessons of one (variant, weekday) cell ordered by slot
    pub fn lessons_on(&self, week: WeekVariant, day_number: u8) -> Vec<LessonEntry> {
        let mut lessons: Vec<LessonEntry> = self
            .lessons
            .iter()
            .filter(|l| l.week == week && l.day_number == day_number && self.counts(l))
            .cloned()
            .collect();
        lessons.sort_by_key(|l| l.lesson_number);
        lessons
    }

    /// The first two lesson days at or after `weekday` of `week`.
    ///
    /// `weekday` is 1 (Monday) ..= 6 (Saturday); 0 and 7 both mean the
    /// Sunday closing `week`, so the search starts on the Monday of the
    /// following variant one day later.
    pub fn closest_days(&self, week: WeekVariant, weekday: u8) -> Result<[DayBlock; 2]> {
        if weekday > SUNDAY {
            return Err(ScheduleError::Config(format!(
                "weekday {} out of range 0..=7",
                weekday
            )));
        }

        let (first_state, first_lessons) = self.next_lesson_day(SearchState::start(week, weekday))?;
        let (second_state, second_lessons) = self.next_lesson_day(first_state.advance())?;

        debug!(
            "Closest days from {} day {}: +{} and +{} ({} variant wraps)",
            week, weekday, first_state.offset, second_state.offset, second_state.wraps
        );

        Ok([
            DayBlock {
                date_offset: first_state.offset,
                lessons: first_lessons,
            },
            DayBlock {
                date_offset: second_state.offset,
                lessons: second_lessons,
            },
        ])
    }

    fn next_lesson_day(&self, mut state: SearchState) -> Result<(SearchState, Vec<LessonEntry>)> {
        for _ in 0..=CYCLE_DAYS {
            if state.weekday != SUNDAY {
                let lessons = self.lessons_on(state.variant, state.weekday);
                if !lessons.is_empty() {
                    return Ok((state, lessons));
                }
            }
            state = state.advance();
        }
        Err(ScheduleError::NoLessons)
    }
}

/// Cursor over the (variant, weekday) torus. `offset` counts days walked
/// from the start day, `wraps` counts how many week boundaries were crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SearchState {
    variant: WeekVariant,
    weekday: u8,
    offset: u32,
    wraps: u32,
}

impl SearchState {
    fn start(variant: WeekVariant, weekday: u8) -> Self {
        Self {
            variant,
            weekday: if weekday == 0 { SUNDAY } else { weekday },
            offset: 0,
            wraps: 0,
        }
    }

    fn advance(self) -> Self {
        if self.weekday == SUNDAY {
            Self {
                variant: self.variant.next(),
                weekday: 1,
                offset: self.offset + 1,
                wraps: self.wraps + 1,
            }
        } else {
            Self {
                weekday: self.weekday + 1,
                offset: self.offset + 1,
                ..self
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sunday_rolls_into_next_variant_monday() {
        let state = SearchState::start(WeekVariant::SecondDenominator, 0).advance();
        assert_eq!(state.variant, WeekVariant::FirstNumerator);
        assert_eq!(state.weekday, 1);
        assert_eq!(state.offset, 1);
        assert_eq!(state.wraps, 1);
    }

    #[test]
    fn full_cycle_returns_to_start() {
        let start = SearchState::start(WeekVariant::FirstDenominator, 3);
        let mut state = start;
        for _ in 0..CYCLE_DAYS {
            state = state.advance();
        }
        assert_eq!((state.variant, state.weekday), (start.variant, start.weekday));
        assert_eq!(state.offset, CYCLE_DAYS);
        assert_eq!(state.wraps, 4);
    }
}
