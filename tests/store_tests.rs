use std::fs;
use chrono::{Local, NaiveDate, TimeZone};
use dailydo::board::{add_task, toggle_completion, DayBoard};
use dailydo::storage::{FileStore, KeyValueStore, MemoryStore, StoreError, TaskStore, TODOS_KEY};
use pretty_assertions::assert_eq;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_first_run_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = TaskStore::new(FileStore::new(dir.path()));
    assert!(store.load_all().unwrap().is_empty());
}

#[test]
fn test_buy_milk_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let store = TaskStore::new(FileStore::new(dir.path()));

    let tasks = add_task(store.load_all().unwrap(), "Buy milk", date(2024, 1, 1));
    store.save_all(&tasks).unwrap();

    let loaded = store.load_all().unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].title, "Buy milk");
    assert!(!loaded[0].is_completed);
    let midnight = Local.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).earliest().unwrap();
    assert_eq!(loaded[0].created_at, midnight.timestamp_millis());
}

#[test]
fn test_save_of_load_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let store = TaskStore::new(FileStore::new(dir.path()));
    let tasks = add_task(Vec::new(), "Read", date(2024, 1, 1));
    let tasks = add_task(tasks, "Stretch", date(2024, 1, 2));
    let id = tasks[0].id.clone();
    let (tasks, _) = toggle_completion(tasks, &id);
    store.save_all(&tasks).unwrap();

    let first = store.load_all().unwrap();
    store.save_all(&first).unwrap();
    let second = store.load_all().unwrap();
    assert_eq!(first, second);
    assert_eq!(first, tasks);
}

#[test]
fn test_clear_all_removes_payload() {
    let dir = tempfile::tempdir().unwrap();
    let kv = FileStore::new(dir.path());
    let store = TaskStore::new(&kv);
    store.save_all(&add_task(Vec::new(), "Yoga", date(2024, 1, 1))).unwrap();
    assert!(kv.path_for(TODOS_KEY).exists());

    store.clear_all().unwrap();
    assert!(!kv.path_for(TODOS_KEY).exists());
    assert!(store.load_all().unwrap().is_empty());
    // Clearing twice is fine.
    store.clear_all().unwrap();
}

#[test]
fn test_malformed_file_is_an_error_not_empty() {
    let dir = tempfile::tempdir().unwrap();
    let kv = FileStore::new(dir.path());
    fs::write(kv.path_for(TODOS_KEY), "[{\"id\": 1}]").unwrap();

    let err = TaskStore::new(&kv).load_all().unwrap_err();
    assert!(matches!(err, StoreError::Malformed { .. }));
    assert!(DayBoard::open(TaskStore::new(&kv)).is_err());
    // The file is left alone so nothing is lost.
    assert_eq!(fs::read_to_string(kv.path_for(TODOS_KEY)).unwrap(), "[{\"id\": 1}]");
}

#[test]
fn test_reads_records_written_by_the_mobile_app() {
    let kv = MemoryStore::new();
    kv.set(
        TODOS_KEY,
        r#"[{"id":"1704067200000","title":"📚 Read books","isCompleted":true,
             "createdAt":1704067200000,"completedAt":1704100000000,
             "details":"Ch. 3","checklist":[{"id":"c1","text":"Intro","isCompleted":false}]}]"#,
    )
    .unwrap();

    let tasks = TaskStore::new(&kv).load_all().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].completed_at, Some(1_704_100_000_000));
    assert_eq!(tasks[0].checklist.as_ref().unwrap()[0].text, "Intro");
    assert_eq!(tasks[0].image_uri, None);
}

#[test]
fn test_save_failure_keeps_in_memory_state() {
    let dir = tempfile::tempdir().unwrap();
    // A regular file where the data directory should be makes every write fail.
    let blocker = dir.path().join("data");
    fs::write(&blocker, "").unwrap();

    let mut board = DayBoard::open(TaskStore::new(FileStore::new(&blocker))).unwrap();
    let err = board.add("Water plants").unwrap_err();
    assert!(matches!(err, StoreError::Io { .. }));
    assert_eq!(board.tasks().len(), 1);
}
