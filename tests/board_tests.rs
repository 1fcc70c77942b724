use chrono::{Local, NaiveDate, TimeZone};
use dailydo::board::*;
use dailydo::day::{day_of, local_midnight};
use dailydo::models::Task;
use dailydo::storage::{MemoryStore, TaskStore};
use pretty_assertions::assert_eq;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn task(id: &str, title: &str, day: NaiveDate) -> Task {
    Task {
        id: id.into(),
        title: title.into(),
        is_completed: false,
        created_at: local_midnight(day),
        completed_at: None,
        details: None,
        image_uri: None,
        checklist: None,
    }
}

#[test]
fn test_add_task_trims_and_assigns_day() {
    let day = date(2024, 1, 1);
    let tasks = add_task(Vec::new(), "  Buy milk  ", day);
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "Buy milk");
    assert!(!tasks[0].is_completed);
    assert_eq!(tasks[0].created_at, local_midnight(day));
    assert_eq!(tasks[0].completed_at, None);
}

#[test]
fn test_add_task_ignores_blank_titles() {
    let existing = vec![task("1", "Read", date(2024, 1, 1))];
    assert_eq!(add_task(existing.clone(), "", date(2024, 1, 2)), existing);
    assert_eq!(add_task(existing.clone(), "   ", date(2024, 1, 2)), existing);
}

#[test]
fn test_add_many_gives_distinct_ids() {
    let tasks = add_many(Vec::new(), ["Exercise", " ", "Journal", "Yoga"], date(2024, 5, 1));
    assert_eq!(tasks.len(), 3);
    let mut ids: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 3);
    assert!(tasks.iter().all(|t| day_of(t.created_at) == date(2024, 5, 1)));
}

#[test]
fn test_filter_by_day_partitions_collection() {
    let days = [date(2024, 2, 28), date(2024, 2, 29), date(2024, 3, 1)];
    let mut tasks = Vec::new();
    for (n, d) in days.iter().cycle().take(9).enumerate() {
        tasks.push(task(&n.to_string(), "t", *d));
    }

    let mut seen = 0;
    for d in days {
        let bucket = filter_by_day(&tasks, d);
        assert_eq!(bucket.len(), 3);
        assert!(bucket.iter().all(|t| day_of(t.created_at) == d));
        seen += bucket.len();
    }
    assert_eq!(seen, tasks.len());
    assert!(filter_by_day(&tasks, date(2024, 3, 2)).is_empty());
}

#[test]
fn test_filter_by_day_uses_calendar_identity() {
    let d = date(2024, 6, 10);
    let late = Local
        .from_local_datetime(&d.and_hms_opt(23, 59, 0).unwrap())
        .earliest()
        .unwrap()
        .timestamp_millis();
    let mut late_task = task("late", "late", d);
    late_task.created_at = late;
    let mut early_task = task("early", "early", date(2024, 6, 11));
    early_task.created_at += 60_000;

    let tasks = vec![late_task, early_task];
    assert_eq!(filter_by_day(&tasks, d)[0].id, "late");
    assert_eq!(filter_by_day(&tasks, date(2024, 6, 11))[0].id, "early");
}

#[test]
fn test_toggle_twice_restores_state() {
    let tasks = vec![task("1", "Meditate", date(2024, 1, 1))];
    let (tasks, first) = toggle_completion(tasks, "1");
    assert_eq!(first, Transition::Completed);
    assert!(tasks[0].is_completed);
    assert!(tasks[0].completed_at.is_some());

    let (tasks, second) = toggle_completion(tasks, "1");
    assert_eq!(second, Transition::Reopened);
    assert!(!tasks[0].is_completed);
    assert_eq!(tasks[0].completed_at, None);
}

#[test]
fn test_toggle_unknown_id() {
    let tasks = vec![task("1", "Meditate", date(2024, 1, 1))];
    let (after, transition) = toggle_completion(tasks.clone(), "nope");
    assert_eq!(transition, Transition::NotFound);
    assert_eq!(after, tasks);
}

#[test]
fn test_delete_absent_id_is_noop() {
    let tasks = vec![task("1", "a", date(2024, 1, 1)), task("2", "b", date(2024, 1, 1))];
    assert_eq!(delete_task(tasks.clone(), "3"), tasks);
    let after = delete_task(tasks, "1");
    assert_eq!(after.len(), 1);
    assert_eq!(after[0].id, "2");
}

#[test]
fn test_update_details_keeps_omitted_fields() {
    let mut t = task("1", "Plan meals", date(2024, 1, 1));
    t.image_uri = Some("file:///photo.jpg".into());
    let tasks = add_checklist_item(vec![t], "1", "Soup");

    let patch = DetailsPatch { details: Some("Veggie week".into()), ..Default::default() };
    let tasks = update_details(tasks, "1", patch);
    assert_eq!(tasks[0].details.as_deref(), Some("Veggie week"));
    assert_eq!(tasks[0].image_uri.as_deref(), Some("file:///photo.jpg"));
    assert_eq!(tasks[0].checklist.as_ref().map(Vec::len), Some(1));

    let clear = DetailsPatch { image_uri: Some(None), details: Some(String::new()), ..Default::default() };
    let tasks = update_details(tasks, "1", clear);
    assert_eq!(tasks[0].image_uri, None);
    assert_eq!(tasks[0].details, None);
}

#[test]
fn test_checklist_item_lifecycle() {
    let tasks = vec![task("1", "Pack", date(2024, 1, 1))];
    let tasks = add_checklist_item(tasks, "1", "Socks");
    let tasks = add_checklist_item(tasks, "1", "  ");
    let tasks = add_checklist_item(tasks, "1", "Shoes");
    let items = tasks[0].checklist.clone().unwrap();
    assert_eq!(items.iter().map(|i| i.text.as_str()).collect::<Vec<_>>(), vec!["Socks", "Shoes"]);

    let tasks = toggle_checklist_item(tasks, "1", &items[1].id);
    assert_eq!(tasks[0].checklist_progress(), Some((1, 2)));

    let tasks = remove_checklist_item(tasks, "1", &items[0].id);
    let left = tasks[0].checklist.as_ref().unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].text, "Shoes");
    assert!(left[0].is_completed);
}

#[test]
fn test_import_merge_skip() {
    let d = date(2024, 1, 1);
    let existing = vec![task("1", "existing", d)];
    let incoming = vec![task("1", "incoming", d), task("2", "new", d)];

    let outcome = import_merge(existing, incoming, ImportPolicy::Skip);
    assert_eq!(outcome.duplicates, vec!["1".to_string()]);
    let titles: Vec<(&str, &str)> = outcome.merged.iter().map(|t| (t.id.as_str(), t.title.as_str())).collect();
    assert_eq!(titles, vec![("1", "existing"), ("2", "new")]);
}

#[test]
fn test_import_merge_replace() {
    let d = date(2024, 1, 1);
    let existing = vec![task("0", "keep", d), task("1", "existing", d)];
    let incoming = vec![task("1", "incoming", d), task("2", "new", d)];

    let outcome = import_merge(existing, incoming, ImportPolicy::Replace);
    assert_eq!(outcome.duplicates, vec!["1".to_string()]);
    let titles: Vec<(&str, &str)> = outcome.merged.iter().map(|t| (t.id.as_str(), t.title.as_str())).collect();
    assert_eq!(titles, vec![("0", "keep"), ("1", "incoming"), ("2", "new")]);
}

#[test]
fn test_import_merge_without_duplicates_appends() {
    let d = date(2024, 1, 1);
    for policy in [ImportPolicy::Skip, ImportPolicy::Replace] {
        let outcome = import_merge(vec![task("1", "a", d)], vec![task("2", "b", d)], policy);
        assert!(outcome.duplicates.is_empty());
        assert_eq!(outcome.merged.len(), 2);
    }
}

#[test]
fn test_board_persists_every_mutation() {
    let kv = MemoryStore::new();
    let mut board = DayBoard::open(TaskStore::new(&kv)).unwrap();
    board.select_day(date(2024, 1, 1));

    let id = board.add("Buy milk").unwrap().unwrap();
    assert_eq!(board.add("  ").unwrap(), None);
    assert_eq!(board.toggle(&id).unwrap(), Transition::Completed);
    assert!(board.add_checklist_item(&id, "Oat").unwrap());

    let stored = TaskStore::new(&kv).load_all().unwrap();
    assert_eq!(stored, board.tasks().to_vec());
    assert!(stored[0].is_completed);

    assert!(board.delete(&id).unwrap());
    assert!(!board.delete(&id).unwrap());
    assert!(TaskStore::new(&kv).load_all().unwrap().is_empty());
}

#[test]
fn test_board_visible_follows_selection() {
    let kv = MemoryStore::new();
    let mut board = DayBoard::open(TaskStore::new(&kv)).unwrap();
    board.select_day(date(2024, 1, 1));
    board.add("Monday").unwrap();
    board.next_day();
    board.add("Tuesday").unwrap();

    assert_eq!(board.visible()[0].title, "Tuesday");
    board.prev_day();
    assert_eq!(board.visible()[0].title, "Monday");
    assert_eq!(board.visible().len(), 1);
}

#[test]
fn test_board_week_navigation() {
    let kv = MemoryStore::new();
    let mut board = DayBoard::open(TaskStore::new(&kv)).unwrap();
    let start = date(2024, 1, 1);
    board.select_day(start);
    assert_eq!(board.week_days().len(), 7);

    board.next_week();
    assert_eq!(board.selected(), date(2024, 1, 8));
    assert_eq!(board.week_days()[0], date(2024, 1, 8));

    board.prev_week();
    board.prev_week();
    assert_eq!(board.selected(), date(2023, 12, 25));

    // Selecting inside the strip keeps it in place.
    board.select_day(date(2023, 12, 28));
    assert_eq!(board.week_days()[0], date(2023, 12, 25));
}

#[test]
fn test_board_import_and_clear() {
    let kv = MemoryStore::new();
    let mut board = DayBoard::open(TaskStore::new(&kv)).unwrap();
    let d = date(2024, 1, 1);
    board.import(vec![task("1", "a", d)], ImportPolicy::Skip).unwrap();
    let dups = board.import(vec![task("1", "b", d), task("2", "c", d)], ImportPolicy::Replace).unwrap();
    assert_eq!(dups, vec!["1".to_string()]);
    assert_eq!(TaskStore::new(&kv).load_all().unwrap().len(), 2);

    board.clear().unwrap();
    assert!(board.tasks().is_empty());
    assert!(TaskStore::new(&kv).load_all().unwrap().is_empty());
}
