use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::config::{Config, TimetableConfig};
use crate::cycle::WeekCycleTable;
use crate::discipline::DisciplineFeed;
use crate::error::Result;
use crate::exams::{build_exam_timeline, ExamEvent};
use crate::feed::FeedClient;
use crate::lesson::{RawScheduleFeed, WeekVariant};
use crate::store::Store;
use crate::timetable::Timetable;

pub const INFO_KEY: &str = "info";

/// Whatever was derived from the raw feed: the lesson lookup table during
/// the term, the exam timeline during the session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "data", rename_all = "lowercase")]
pub enum CountedSchedule {
    Lessons(WeekCycleTable),
    Exams(Vec<ExamEvent>),
}

/// Everything kept under the `info` key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedInfo {
    pub group: String,
    pub update_time: DateTime<Utc>,
    pub is_exams_time: bool,
    #[serde(default)]
    pub week: Option<WeekVariant>,
    pub original_schedule: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counted_schedule: Option<CountedSchedule>,
}

impl CachedInfo {
    pub fn is_fresh(&self, now: DateTime<Utc>, period: chrono::Duration) -> bool {
        now - self.update_time < period
    }

    /// Derive the counted schedule from the raw feed
    pub fn count(&self, timetable: &TimetableConfig, now: DateTime<Utc>) -> Result<CountedSchedule> {
        if self.is_exams_time {
            let feed: DisciplineFeed = serde_json::from_value(self.original_schedule.clone())?;
            Ok(CountedSchedule::Exams(build_exam_timeline(&feed.dises, now)?))
        } else {
            let feed: RawScheduleFeed = serde_json::from_value(self.original_schedule.clone())?;
            let timetable =
                Timetable::from_feed(&feed)?.with_excluded_marker(&timetable.excluded_teacher_marker);
            Ok(CountedSchedule::Lessons(WeekCycleTable::build(&timetable)?))
        }
    }

    /// Compute the counted schedule unless one is already present.
    /// Returns whether anything was computed.
    pub fn ensure_counted(&mut self, timetable: &TimetableConfig, now: DateTime<Utc>) -> Result<bool> {
        if self.counted_schedule.is_some() {
            debug!("Counted schedule of {} already present", self.group);
            return Ok(false);
        }
        self.counted_schedule = Some(self.count(timetable, now)?);
        Ok(true)
    }
}

/// Bring the cached state up to date
pub async fn refresh(config: &Config, client: &FeedClient, store: &mut Store, force: bool) -> Result<CachedInfo> {
    refresh_at(config, client, store, force, Utc::now()).await
}

pub async fn refresh_at(
    config: &Config,
    client: &FeedClient,
    store: &mut Store,
    force: bool,
    now: DateTime<Utc>,
) -> Result<CachedInfo> {
    let cached: Option<CachedInfo> = store.get(INFO_KEY)?;

    let mut state = match cached {
        Some(state) if !force && state.is_fresh(now, config.cache.update_period()) => {
            debug!("Cached data from {} is fresh", state.update_time);
            state
        }
        _ => fetch_info(client, now).await?,
    };

    if state.ensure_counted(&config.timetable, now)? {
        info!(
            "Counted {} schedule for {}",
            if state.is_exams_time { "exam" } else { "lesson" },
            state.group
        );
        store.set(INFO_KEY, &state)?;
        if let Some(CountedSchedule::Lessons(table)) = &state.counted_schedule {
            store.set(&state.group, table)?;
        }
    }

    Ok(state)
}

/// Drop every cached entry so the next refresh starts from scratch.
/// Returns how many entries were removed.
pub fn clear_cache(store: &mut Store) -> Result<usize> {
    let keys: Vec<String> = store.keys().map(str::to_string).collect();
    let mut removed = 0;
    for key in &keys {
        if store.remove(key)? {
            debug!("Removed cached entry '{}'", key);
            removed += 1;
        }
    }
    Ok(removed)
}

async fn fetch_info(client: &FeedClient, now: DateTime<Utc>) -> Result<CachedInfo> {
    let page = client.fetch_student_page().await?;
    info!(
        "Group {}, {}",
        page.group,
        if page.is_exam_session { "exam session" } else { "term time" }
    );

    let original_schedule = if page.is_exam_session {
        serde_json::to_value(page.disciplines()?)?
    } else {
        serde_json::to_value(client.fetch_schedule(&page.group).await?)?
    };

    Ok(CachedInfo {
        group: page.group,
        update_time: now,
        is_exams_time: page.is_exam_session,
        week: page.week,
        original_schedule,
        counted_schedule: None,
    })
}
