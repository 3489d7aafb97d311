use chrono::{TimeZone, Utc};
use serde_json::json;

use orioks_schedule::config::TimetableConfig;
use orioks_schedule::cycle::WeekCycleTable;
use orioks_schedule::error::ScheduleError;
use orioks_schedule::refresh::{clear_cache, CachedInfo, CountedSchedule, INFO_KEY};
use orioks_schedule::store::Store;

fn cached(original_schedule: serde_json::Value, counted: Option<CountedSchedule>) -> CachedInfo {
    CachedInfo {
        group: "ПИН-21".to_string(),
        update_time: Utc.with_ymd_and_hms(2024, 2, 5, 6, 0, 0).unwrap(),
        is_exams_time: false,
        week: None,
        original_schedule,
        counted_schedule: counted,
    }
}

#[test]
fn missing_file_opens_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(dir.path().join("absent.json")).unwrap();

    assert_eq!(store.keys().count(), 0);
    assert!(store.get::<String>("info").unwrap().is_none());
}

#[test]
fn entries_persist_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");

    let mut store = Store::open(&path).unwrap();
    store.set("greeting", &"привет").unwrap();
    store.set("numbers", &vec![1, 2, 3]).unwrap();

    let store = Store::open(&path).unwrap();
    assert_eq!(store.get::<String>("greeting").unwrap().as_deref(), Some("привет"));
    assert_eq!(store.get::<Vec<u32>>("numbers").unwrap(), Some(vec![1, 2, 3]));
    assert_eq!(store.keys().collect::<Vec<_>>(), vec!["greeting", "numbers"]);
}

#[test]
fn remove_reports_presence() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");

    let mut store = Store::open(&path).unwrap();
    store.set("a", &1).unwrap();

    assert!(store.remove("a").unwrap());
    assert!(!store.remove("a").unwrap());
    assert!(Store::open(&path).unwrap().get::<u32>("a").unwrap().is_none());
}

#[test]
fn wrong_shape_is_a_store_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = Store::open(dir.path().join("store.json")).unwrap();
    store.set("info", &"not an object").unwrap();

    assert!(matches!(store.get::<CachedInfo>("info"), Err(ScheduleError::Store(_))));
}

#[test]
fn corrupt_file_is_a_store_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");
    std::fs::write(&path, "{ truncated").unwrap();

    assert!(matches!(Store::open(&path), Err(ScheduleError::Store(_))));
}

#[test]
fn clearing_empties_the_cache_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");

    let mut store = Store::open(&path).unwrap();
    store.set(INFO_KEY, &cached(json!({ "Data": [] }), None)).unwrap();
    store.set("ПИН-21", &WeekCycleTable::default()).unwrap();

    assert_eq!(clear_cache(&mut store).unwrap(), 2);
    assert_eq!(store.keys().count(), 0);
    assert_eq!(Store::open(&path).unwrap().keys().count(), 0);
    assert_eq!(clear_cache(&mut store).unwrap(), 0);
}

// ── Memoization ──────────────────────────────────────────────────

#[test]
fn counted_schedule_is_never_recomputed() {
    let table = WeekCycleTable::default();
    let mut state = cached(json!("garbage"), Some(CountedSchedule::Lessons(table.clone())));

    let computed = state
        .ensure_counted(&TimetableConfig::default(), Utc::now())
        .unwrap();

    assert!(!computed);
    assert_eq!(state.counted_schedule, Some(CountedSchedule::Lessons(table)));
}

#[test]
fn counting_garbage_fails() {
    let mut state = cached(json!({ "unexpected": true }), None);

    assert!(state
        .ensure_counted(&TimetableConfig::default(), Utc::now())
        .is_err());
    assert!(state.counted_schedule.is_none());
}

#[test]
fn counting_fills_the_table() {
    let feed = json!({
        "Data": [{
            "Class": { "Name": "История [Пр]", "TeacherFull": "Петров Пётр Петрович" },
            "Day": 4,
            "DayNumber": 2,
            "Room": { "Name": "1201" },
            "Time": { "Time": 3, "TimeFrom": "11:10", "TimeTo": "12:30" }
        }]
    });
    let mut state = cached(feed, None);

    assert!(state
        .ensure_counted(&TimetableConfig::default(), Utc::now())
        .unwrap());
    let Some(CountedSchedule::Lessons(table)) = &state.counted_schedule else {
        panic!("Expected a lesson table");
    };
    assert_eq!(table.week(orioks_schedule::lesson::WeekVariant::SecondNumerator).unwrap().len(), 7);
}
