use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Europe::Moscow;
use serde::ser::SerializeTuple;
use serde::{Deserialize, Serialize, Serializer};
use tracing::debug;

use crate::discipline::Discipline;
use crate::error::{Result, ScheduleError};
use crate::lesson::hhmm;
use crate::util::{day_title, time_left_string};

/// Exam dates are written in Moscow standard time, UTC+3
const EXAM_UTC_OFFSET_SECS: i32 = 3 * 3600;

/// Events further in the past than this are dropped from the timeline
pub fn past_event_grace() -> chrono::Duration {
    chrono::Duration::hours(2)
}

/// Month tokens the exam dates are written with; sessions only ever
/// fall into winter (January, February) or summer (June, July).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExamMonth {
    January,
    February,
    June,
    July,
}

impl ExamMonth {
    pub fn number(self) -> u32 {
        match self {
            ExamMonth::January => 1,
            ExamMonth::February => 2,
            ExamMonth::June => 6,
            ExamMonth::July => 7,
        }
    }
}

impl FromStr for ExamMonth {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "января" => Ok(ExamMonth::January),
            "февраля" => Ok(ExamMonth::February),
            "июня" => Ok(ExamMonth::June),
            "июля" => Ok(ExamMonth::July),
            _ => Err(ScheduleError::UnknownMonth(s.to_string())),
        }
    }
}

/// Parse "15 января 2024" + "10:00" written at UTC+3 into UTC
pub fn parse_exam_utc_datetime(date: &str, time: &str) -> Result<DateTime<Utc>> {
    let parts: Vec<&str> = date.split_whitespace().collect();
    let [day, month, year] = parts.as_slice() else {
        return Err(ScheduleError::InvalidDateTime(format!(
            "expected '<day> <month> <year>', got '{}'",
            date
        )));
    };

    let month = month.parse::<ExamMonth>()?;
    let day: u32 = day
        .parse()
        .map_err(|_| ScheduleError::InvalidDateTime(format!("bad day in '{}'", date)))?;
    let year: i32 = year
        .parse()
        .map_err(|_| ScheduleError::InvalidDateTime(format!("bad year in '{}'", date)))?;

    let date = NaiveDate::from_ymd_opt(year, month.number(), day)
        .ok_or_else(|| ScheduleError::InvalidDateTime(format!("no such date '{}'", date)))?;
    let time = parse_clock(time)?;

    let offset = FixedOffset::east_opt(EXAM_UTC_OFFSET_SECS)
        .ok_or_else(|| ScheduleError::InvalidDateTime("bad exam UTC offset".to_string()))?;
    offset
        .from_local_datetime(&date.and_time(time))
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| ScheduleError::InvalidDateTime(format!("no instant for {} {}", date, time)))
}

fn parse_clock(time: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(time.trim(), "%H:%M")
        .map_err(|e| ScheduleError::InvalidDateTime(format!("bad time '{}': {}", time, e)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExamEventKind {
    #[serde(rename = "Конс")]
    Consultation,
    #[serde(rename = "Экз")]
    Exam,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamEvent {
    pub label: String,
    pub kind: ExamEventKind,
    pub location: String,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    #[serde(rename = "whenUTC")]
    pub when_utc: DateTime<Utc>,
}

impl ExamEvent {
    fn new(
        discipline: &Discipline,
        kind: ExamEventKind,
        date: &str,
        time: &str,
        room: Option<&String>,
    ) -> Result<Self> {
        Ok(Self {
            label: discipline.label(),
            kind,
            location: room.map(|r| r.trim().to_string()).unwrap_or_default(),
            time: parse_clock(time)?,
            when_utc: parse_exam_utc_datetime(date, time)?,
        })
    }

    pub fn text_block(&self) -> String {
        let kind = match self.kind {
            ExamEventKind::Consultation => "Консультация",
            ExamEventKind::Exam => "Экзамен",
        };
        format!("{} ({})\n{}\n{}", self.label, kind, self.location, self.time.format("%H:%M"))
    }
}

fn filled<'a>(date: &'a Option<String>, time: &'a Option<String>) -> Option<(&'a str, &'a str)> {
    match (date.as_deref().map(str::trim), time.as_deref().map(str::trim)) {
        (Some(d), Some(t)) if !d.is_empty() && !t.is_empty() => Some((d, t)),
        _ => None,
    }
}

/// Consultation and exam events of every examined discipline, earliest first.
///
/// Disciplines without an exam date/time are left out, as are events that
/// ended up more than [`past_event_grace`] before `now`.
pub fn build_exam_timeline(disciplines: &[Discipline], now: DateTime<Utc>) -> Result<Vec<ExamEvent>> {
    let mut events = Vec::new();

    for discipline in disciplines {
        if !discipline.is_examined() {
            continue;
        }
        let Some((exam_date, exam_time)) = filled(&discipline.date_exam, &discipline.time_exam) else {
            debug!("Skipping '{}': no exam date", discipline.name);
            continue;
        };

        if let Some((cons_date, cons_time)) = filled(&discipline.date_cons, &discipline.time_cons) {
            events.push(ExamEvent::new(
                discipline,
                ExamEventKind::Consultation,
                cons_date,
                cons_time,
                discipline.room_cons.as_ref(),
            )?);
        }
        events.push(ExamEvent::new(
            discipline,
            ExamEventKind::Exam,
            exam_date,
            exam_time,
            discipline.room_exam.as_ref(),
        )?);
    }

    Ok(upcoming(events, now))
}

/// Drop stale events and sort the rest by date
pub fn upcoming(mut events: Vec<ExamEvent>, now: DateTime<Utc>) -> Vec<ExamEvent> {
    let cutoff = now - past_event_grace();
    events.retain(|e| e.when_utc >= cutoff);
    events.sort_by_key(|e| e.when_utc);
    events
}

/// One rendered timeline line: heading with countdown, the event, its instant.
/// Serializes as the `[title, [event], when]` triple renderers consume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineEntry {
    pub title: String,
    pub event: ExamEvent,
    pub when: DateTime<Utc>,
}

impl Serialize for TimelineEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut triple = serializer.serialize_tuple(3)?;
        triple.serialize_element(&self.title)?;
        triple.serialize_element(std::slice::from_ref(&self.event))?;
        triple.serialize_element(&self.when)?;
        triple.end()
    }
}

pub fn timeline_title(event: &ExamEvent, now: DateTime<Utc>) -> String {
    let local_date = event.when_utc.with_timezone(&Moscow).date_naive();
    let mut title = day_title(local_date);
    if let Some(left) = time_left_string(event.when_utc - now) {
        title.push(' ');
        title.push_str(&left);
    }
    title
}

pub fn render_timeline(events: &[ExamEvent], now: DateTime<Utc>) -> Vec<TimelineEntry> {
    events
        .iter()
        .map(|event| TimelineEntry {
            title: timeline_title(event, now),
            event: event.clone(),
            when: event.when_utc,
        })
        .collect()
}
