use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};

/// One of the four repeating timetable patterns. The cycle advances by one
/// variant every calendar week and wraps after the second denominator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WeekVariant {
    #[serde(rename = "1 числитель")]
    FirstNumerator,
    #[serde(rename = "1 знаменатель")]
    FirstDenominator,
    #[serde(rename = "2 числитель")]
    SecondNumerator,
    #[serde(rename = "2 знаменатель")]
    SecondDenominator,
}

impl WeekVariant {
    pub const ALL: [WeekVariant; 4] = [
        WeekVariant::FirstNumerator,
        WeekVariant::FirstDenominator,
        WeekVariant::SecondNumerator,
        WeekVariant::SecondDenominator,
    ];

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(usize::from(index)).copied()
    }

    pub fn index(self) -> u8 {
        match self {
            WeekVariant::FirstNumerator => 0,
            WeekVariant::FirstDenominator => 1,
            WeekVariant::SecondNumerator => 2,
            WeekVariant::SecondDenominator => 3,
        }
    }

    /// The variant of the following calendar week
    pub fn next(self) -> Self {
        Self::ALL[usize::from((self.index() + 1) % 4)]
    }

    pub fn label(self) -> &'static str {
        match self {
            WeekVariant::FirstNumerator => "1 числитель",
            WeekVariant::FirstDenominator => "1 знаменатель",
            WeekVariant::SecondNumerator => "2 числитель",
            WeekVariant::SecondDenominator => "2 знаменатель",
        }
    }
}

impl fmt::Display for WeekVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for WeekVariant {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
        Self::ALL
            .into_iter()
            .find(|v| v.label() == normalized)
            .ok_or_else(|| ScheduleError::Config(format!("Unknown week variant '{}'", s)))
    }
}

/// Lesson type derived from the bracketed tag; serialized as the feed's
/// English names with an empty string for untagged lessons
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LessonKind {
    Lecture,
    Practice,
    Lab,
    #[default]
    #[serde(rename = "")]
    Untyped,
}

impl LessonKind {
    fn from_tag(tag: Option<&str>) -> Self {
        match tag.map(|t| t.trim().to_lowercase()) {
            Some(t) if t.starts_with("лек") => LessonKind::Lecture,
            Some(t) if t.starts_with("пр") => LessonKind::Practice,
            Some(t) if t.starts_with("лаб") => LessonKind::Lab,
            _ => LessonKind::Untyped,
        }
    }
}

/// A lesson title split at its first bracket group: the subject, the type
/// tag and whatever follows the tag (`"Иностранный язык [Пр] (англ.)"` is
/// `Иностранный язык` + `Пр` + `(англ.)`). `pairs` counts how many
/// consecutive slots the lesson occupies after merging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonName {
    pub base: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest: Option<String>,
    #[serde(default = "single_pair")]
    pub pairs: u32,
}

fn single_pair() -> u32 {
    1
}

impl LessonName {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let bracketed = raw
            .find('[')
            .and_then(|open| raw[open..].find(']').map(|close| (open, open + close)));

        match bracketed {
            Some((open, close)) => {
                let rest = raw[close + 1..].trim();
                Self {
                    base: raw[..open].trim_end().to_string(),
                    tag: Some(raw[open + 1..close].trim().to_string()),
                    rest: (!rest.is_empty()).then(|| rest.to_string()),
                    pairs: 1,
                }
            }
            None => Self {
                base: raw.to_string(),
                tag: None,
                rest: None,
                pairs: 1,
            },
        }
    }

    pub fn kind(&self) -> LessonKind {
        LessonKind::from_tag(self.tag.as_deref())
    }

    /// Two names belong to the same run when everything but the pair count matches
    pub fn same_lesson(&self, other: &LessonName) -> bool {
        self.base == other.base && self.tag == other.tag && self.rest == other.rest
    }

    pub fn display_name(&self) -> String {
        let mut name = self.base.clone();
        if self.pairs > 1 {
            name.push(' ');
            name.push_str(&pairs_suffix(self.pairs));
        }
        if let Some(tag) = &self.tag {
            name.push_str(&format!(" [{}]", tag));
        }
        if let Some(rest) = &self.rest {
            name.push(' ');
            name.push_str(rest);
        }
        name
    }
}

/// `(N пары)` below five, `(N пар)` from five on
pub fn pairs_suffix(count: u32) -> String {
    if count < 5 {
        format!("({} пары)", count)
    } else {
        format!("({} пар)", count)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonEntry {
    pub name: LessonName,
    #[serde(rename = "type", default)]
    pub kind: LessonKind,
    pub teacher: String,
    /// 1 = Monday .. 7 = Sunday
    pub day_number: u8,
    pub week: WeekVariant,
    pub location: String,
    pub lesson_number: u32,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
}

impl LessonEntry {
    pub fn display_name(&self) -> String {
        self.name.display_name()
    }

    /// Opaque text block handed to whatever renders the day
    pub fn text_block(&self) -> String {
        format!(
            "{}\n► {}\n{}\n{} ~ {}",
            self.display_name(),
            self.teacher,
            self.location,
            self.start_time.format("%H:%M"),
            self.end_time.format("%H:%M")
        )
    }
}

// Raw lesson feed as served by the schedule endpoint

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawScheduleFeed {
    #[serde(rename = "Data")]
    pub data: Vec<RawLesson>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawLesson {
    #[serde(rename = "Class")]
    pub class: Option<RawClass>,
    #[serde(rename = "Day")]
    pub day: Option<u8>,
    #[serde(rename = "DayNumber")]
    pub day_number: Option<u8>,
    #[serde(rename = "Room")]
    pub room: Option<RawRoom>,
    #[serde(rename = "Time")]
    pub time: Option<RawTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawClass {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "TeacherFull", default)]
    pub teacher_full: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRoom {
    #[serde(rename = "Name", default)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTime {
    #[serde(rename = "Time")]
    pub time: u32,
    #[serde(rename = "TimeFrom")]
    pub time_from: String,
    #[serde(rename = "TimeTo")]
    pub time_to: String,
}

impl LessonEntry {
    /// Convert one raw feed record; `index` is only used for error reporting
    pub fn from_raw(index: usize, raw: &RawLesson) -> Result<Self> {
        let malformed = |reason: String| ScheduleError::MalformedRecord { index, reason };

        let class = raw.class.as_ref().ok_or_else(|| malformed("missing Class".into()))?;
        let room = raw.room.as_ref().ok_or_else(|| malformed("missing Room".into()))?;
        let time = raw.time.as_ref().ok_or_else(|| malformed("missing Time".into()))?;

        let day_number = match raw.day {
            Some(day @ 1..=7) => day,
            other => return Err(malformed(format!("day out of range: {:?}", other))),
        };
        let week = raw
            .day_number
            .and_then(WeekVariant::from_index)
            .ok_or_else(|| malformed(format!("week variant out of range: {:?}", raw.day_number)))?;

        let start_time = parse_time_of_day(&time.time_from)
            .ok_or_else(|| malformed(format!("unparseable TimeFrom '{}'", time.time_from)))?;
        let end_time = parse_time_of_day(&time.time_to)
            .ok_or_else(|| malformed(format!("unparseable TimeTo '{}'", time.time_to)))?;

        let name = LessonName::parse(&class.name);
        Ok(Self {
            kind: name.kind(),
            name,
            teacher: class.teacher_full.trim().to_string(),
            day_number,
            week,
            location: room.name.trim().to_string(),
            lesson_number: time.time,
            start_time,
            end_time,
        })
    }
}

/// Normalize every record of the feed, failing on the first malformed one
pub fn normalize_feed(feed: &RawScheduleFeed) -> Result<Vec<LessonEntry>> {
    feed.data
        .iter()
        .enumerate()
        .map(|(index, raw)| LessonEntry::from_raw(index, raw))
        .collect()
}

/// Extract the time-of-day part of a feed timestamp
fn parse_time_of_day(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.time());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.time());
        }
    }
    ["%H:%M:%S", "%H:%M"]
        .into_iter()
        .find_map(|fmt| NaiveTime::parse_from_str(s, fmt).ok())
}

/// Serde helper storing times as `HH:MM`
pub(crate) mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let s = String::deserialize(d)?;
        NaiveTime::parse_from_str(&s, "%H:%M").map_err(serde::de::Error::custom)
    }
}
