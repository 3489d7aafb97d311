use serde::Deserialize;
use std::fs;

use crate::error::{Result, ScheduleError};

pub const DEFAULT_STUDENT_URL: &str = "https://orioks.miet.ru/student/student";
pub const DEFAULT_SCHEDULE_URL: &str = "https://miet.ru/schedule/data";
pub const MILITARY_TRAINING_MARKER: &str = "УВЦ";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub timetable: TimetableConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FeedConfig {
    #[serde(default = "default_student_url")]
    pub student_url: String,
    #[serde(default = "default_schedule_url")]
    pub schedule_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_cache_path")]
    pub path: String,
    /// How long fetched data stays fresh before `refresh` refetches it
    #[serde(default = "default_update_period_hours")]
    pub update_period_hours: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TimetableConfig {
    /// Lessons whose teacher contains this marker never count as lesson days
    #[serde(default = "default_excluded_marker")]
    pub excluded_teacher_marker: String,
}

fn default_student_url() -> String {
    DEFAULT_STUDENT_URL.to_string()
}

fn default_schedule_url() -> String {
    DEFAULT_SCHEDULE_URL.to_string()
}

fn default_cache_path() -> String {
    "schedule_cache.json".to_string()
}

fn default_update_period_hours() -> u32 {
    6
}

fn default_excluded_marker() -> String {
    MILITARY_TRAINING_MARKER.to_string()
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            student_url: default_student_url(),
            schedule_url: default_schedule_url(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: default_cache_path(),
            update_period_hours: default_update_period_hours(),
        }
    }
}

impl Default for TimetableConfig {
    fn default() -> Self {
        Self {
            excluded_teacher_marker: default_excluded_marker(),
        }
    }
}

impl CacheConfig {
    pub fn update_period(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.update_period_hours))
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ScheduleError::Config(format!("Failed to read config file '{}': {}", path, e))
        })?;

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
