use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::cycle::WeekCycleTable;
use crate::error::{Result, ScheduleError};
use crate::lesson::{LessonEntry, WeekVariant};
use crate::timetable::DayBlock;
use crate::util::day_title;

/// A lesson day pinned to the calendar
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpcomingDay {
    pub date: NaiveDate,
    pub title: String,
    pub lessons: Vec<LessonEntry>,
}

impl UpcomingDay {
    pub fn text_blocks(&self) -> Vec<String> {
        self.lessons.iter().map(LessonEntry::text_block).collect()
    }
}

/// The next two lesson days as seen at `now` (Moscow wall-clock time) in a
/// `week` variant week.
///
/// Lessons of today that already ended are hidden; when none are left the
/// view moves on to tomorrow's cell.
pub fn upcoming_days(table: &WeekCycleTable, week: WeekVariant, now: NaiveDateTime) -> Result<Vec<UpcomingDay>> {
    let weekday = weekday_from_sunday(now.date());
    let mut cell = lookup(table, week, weekday)?.to_vec();
    let mut base_offset = 0;

    if cell[0].date_offset == 0 {
        cell[0].lessons.retain(|l| l.end_time > now.time());
        if cell[0].lessons.is_empty() {
            base_offset = 1;
            cell = lookup(table, week, (weekday + 1) % 7)?.to_vec();
        }
    }

    Ok(cell
        .into_iter()
        .map(|block| {
            let date = now.date() + Duration::days(i64::from(base_offset + block.date_offset));
            UpcomingDay {
                date,
                title: day_title(date),
                lessons: block.lessons,
            }
        })
        .collect())
}

fn weekday_from_sunday(date: NaiveDate) -> u8 {
    // always 0..=6
    date.weekday().num_days_from_sunday() as u8
}

fn lookup(table: &WeekCycleTable, week: WeekVariant, weekday: u8) -> Result<&[DayBlock]> {
    table
        .cell(week, weekday)
        .map(|cell| cell.as_slice())
        .ok_or_else(|| ScheduleError::Store(format!("table has no cell for {} day {}", week, weekday)))
}
