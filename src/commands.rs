use std::io::{self, Write};
use std::path::Path;
use chrono::{DateTime, Local, NaiveDate, NaiveTime};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use crate::analytics::{format_duration, Stats};
use crate::board::{DayBoard, DetailsPatch, ImportPolicy, Transition};
use crate::day::{self, day_of, parse_day};
use crate::models::{ReminderKind, Task};
use crate::recommended;
use crate::settings::SettingsStore;
use crate::storage::{KeyValueStore, TaskStore};
use crate::transfer;

/// The random part of an id, which is what the CLI displays and accepts.
pub fn short_id(id: &str) -> &str {
    id.rsplit_once('-').map(|(_, tail)| tail).unwrap_or(id)
}

fn open_board<S: KeyValueStore>(kv: &S, silent: bool) -> Option<DayBoard<&S>> {
    match DayBoard::open(TaskStore::new(kv)) {
        Ok(board) => Some(board),
        Err(e) => {
            if !silent { eprintln!("Failed to load tasks: {}", e); }
            None
        }
    }
}

fn resolve_day(day: Option<&str>, silent: bool) -> Option<NaiveDate> {
    match day {
        None => Some(day::today()),
        Some(s) => match parse_day(s) {
            Ok(d) => Some(d),
            Err(e) => {
                if !silent { eprintln!("Invalid day '{}': {}. Use YYYY-MM-DD.", s, e); }
                None
            }
        },
    }
}

/// Finds the full id of a task from its full or short id.
fn resolve_id<S: KeyValueStore>(board: &DayBoard<S>, query: &str, silent: bool) -> Option<String> {
    let query = query.trim();
    if board.tasks().iter().any(|t| t.id == query) {
        return Some(query.to_string());
    }
    let matches: Vec<&Task> = board.tasks().iter().filter(|t| short_id(&t.id) == query).collect();
    match matches.as_slice() {
        [t] => Some(t.id.clone()),
        [] => {
            if !silent { eprintln!("Task {} not found.", query); }
            None
        }
        _ => {
            if !silent { eprintln!("Id {} is ambiguous; use the full id.", query); }
            None
        }
    }
}

/// Adds a task to `day` (today if not given).
pub fn cmd_add<S: KeyValueStore>(kv: &S, title: String, day: Option<String>, silent: bool) {
    let Some(day) = resolve_day(day.as_deref(), silent) else { return };
    let Some(mut board) = open_board(kv, silent) else { return };
    board.select_day(day);
    match board.add(&title) {
        Ok(Some(id)) => {
            if !silent { println!("Task added (id = {}) on {}", short_id(&id), day); }
        }
        Ok(None) => {
            if !silent { eprintln!("Task title cannot be empty."); }
        }
        Err(e) => {
            if !silent { eprintln!("Failed to save tasks: {}", e); }
        }
    }
}

/// Lists the tasks of one day, or every task with `all`.
pub fn cmd_list<S: KeyValueStore>(kv: &S, day: Option<String>, all: bool) {
    let Some(day) = resolve_day(day.as_deref(), false) else { return };
    let Some(mut board) = open_board(kv, false) else { return };
    board.select_day(day);
    let mut tasks = if all { board.tasks().to_vec() } else { board.visible() };
    if tasks.is_empty() {
        if all { println!("No tasks found."); } else { println!("No tasks for {}.", day); }
        return;
    }
    if all {
        tasks.sort_by_key(|t| t.created_at);
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").add_attribute(Attribute::Bold),
            Cell::new("Title").add_attribute(Attribute::Bold),
            Cell::new("Day").add_attribute(Attribute::Bold),
            Cell::new("Checklist").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
        ]);

    for t in &tasks {
        let checklist = t
            .checklist_progress()
            .map(|(done, total)| format!("{done}/{total}"))
            .unwrap_or_default();
        let status = if t.is_completed { "Done" } else { "Pending" };
        let status_color = if t.is_completed { Color::Green } else { Color::Yellow };
        table.add_row(vec![
            Cell::new(short_id(&t.id)),
            Cell::new(&t.title),
            Cell::new(day_of(t.created_at)),
            Cell::new(checklist),
            Cell::new(status).fg(status_color),
        ]);
    }

    if !all {
        let done = tasks.iter().filter(|t| t.is_completed).count();
        println!("{}: {}/{} done", day.format("%A, %B %-d %Y"), done, tasks.len());
    }
    println!("{table}");
}

/// Flips a task between pending and done.
pub fn cmd_toggle<S: KeyValueStore>(kv: &S, id: String, silent: bool) {
    let Some(mut board) = open_board(kv, silent) else { return };
    let Some(id) = resolve_id(&board, &id, silent) else { return };
    match board.toggle(&id) {
        Ok(Transition::Completed) => {
            if !silent { println!("🎉 Task {} done. Keep it up!", short_id(&id)); }
        }
        Ok(Transition::Reopened) => {
            if !silent { println!("Task {} marked as pending.", short_id(&id)); }
        }
        Ok(Transition::NotFound) => {
            if !silent { eprintln!("Task {} not found.", short_id(&id)); }
        }
        Err(e) => {
            if !silent { eprintln!("Failed to save tasks: {}", e); }
        }
    }
}

/// Removes a task.
pub fn cmd_remove<S: KeyValueStore>(kv: &S, id: String, silent: bool) {
    let Some(mut board) = open_board(kv, silent) else { return };
    let Some(id) = resolve_id(&board, &id, silent) else { return };
    match board.delete(&id) {
        Ok(true) => {
            if !silent { println!("Task {} removed.", short_id(&id)); }
        }
        Ok(false) => {
            if !silent { eprintln!("Task {} not found.", short_id(&id)); }
        }
        Err(e) => {
            if !silent { eprintln!("Failed to save tasks: {}", e); }
        }
    }
}

/// Edits the details text and image reference of a task.
///
/// Fields that are not given are kept as they are.
pub fn cmd_details<S: KeyValueStore>(kv: &S, id: String, details: Option<String>, image: Option<String>, clear_image: bool, silent: bool) {
    let patch = DetailsPatch {
        details,
        image_uri: if clear_image { Some(None) } else { image.map(Some) },
        checklist: None,
    };
    if patch.is_empty() {
        if !silent { eprintln!("Nothing to update."); }
        return;
    }
    let Some(mut board) = open_board(kv, silent) else { return };
    let Some(id) = resolve_id(&board, &id, silent) else { return };
    match board.update_details(&id, patch) {
        Ok(_) => {
            if !silent { println!("Task {} updated.", short_id(&id)); }
        }
        Err(e) => {
            if !silent { eprintln!("Failed to save tasks: {}", e); }
        }
    }
}

pub fn cmd_checklist_add<S: KeyValueStore>(kv: &S, id: String, text: String, silent: bool) {
    let Some(mut board) = open_board(kv, silent) else { return };
    let Some(id) = resolve_id(&board, &id, silent) else { return };
    match board.add_checklist_item(&id, &text) {
        Ok(true) => {
            if !silent { println!("Checklist item added to task {}.", short_id(&id)); }
        }
        Ok(false) => {
            if !silent { eprintln!("Checklist item cannot be empty."); }
        }
        Err(e) => {
            if !silent { eprintln!("Failed to save tasks: {}", e); }
        }
    }
}

/// Resolves a 1-based checklist position to the item id.
fn checklist_item_id<S: KeyValueStore>(board: &DayBoard<S>, id: &str, position: usize, silent: bool) -> Option<String> {
    let item = board
        .find(id)
        .and_then(|t| t.checklist.as_ref())
        .and_then(|items| position.checked_sub(1).and_then(|i| items.get(i)));
    if item.is_none() && !silent {
        eprintln!("Task {} has no checklist item {}.", short_id(id), position);
    }
    item.map(|i| i.id.clone())
}

pub fn cmd_checklist_toggle<S: KeyValueStore>(kv: &S, id: String, position: usize, silent: bool) {
    let Some(mut board) = open_board(kv, silent) else { return };
    let Some(id) = resolve_id(&board, &id, silent) else { return };
    let Some(item_id) = checklist_item_id(&board, &id, position, silent) else { return };
    if let Err(e) = board.toggle_checklist_item(&id, &item_id) {
        if !silent { eprintln!("Failed to save tasks: {}", e); }
    } else if !silent {
        println!("Checklist item {} toggled.", position);
    }
}

pub fn cmd_checklist_remove<S: KeyValueStore>(kv: &S, id: String, position: usize, silent: bool) {
    let Some(mut board) = open_board(kv, silent) else { return };
    let Some(id) = resolve_id(&board, &id, silent) else { return };
    let Some(item_id) = checklist_item_id(&board, &id, position, silent) else { return };
    if let Err(e) = board.remove_checklist_item(&id, &item_id) {
        if !silent { eprintln!("Failed to save tasks: {}", e); }
    } else if !silent {
        println!("Checklist item {} removed.", position);
    }
}

fn format_millis(millis: i64) -> String {
    DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".into())
}

/// Prints every field of one task.
pub fn cmd_show<S: KeyValueStore>(kv: &S, id: String) {
    let Some(board) = open_board(kv, false) else { return };
    let Some(id) = resolve_id(&board, &id, false) else { return };
    let Some(t) = board.find(&id) else { return };

    println!("{}", t.title);
    println!("  id:        {}", t.id);
    println!("  day:       {}", day_of(t.created_at));
    println!("  status:    {}", if t.is_completed { "Done" } else { "Pending" });
    if let Some(at) = t.completed_at {
        println!("  completed: {}", format_millis(at));
    }
    if let Some(uri) = &t.image_uri {
        println!("  image:     {}", uri);
    }
    if let Some(details) = &t.details {
        println!();
        for line in details.lines() {
            println!("  {}", line);
        }
    }
    if let Some(items) = t.checklist.as_ref().filter(|i| !i.is_empty()) {
        println!();
        for (n, item) in items.iter().enumerate() {
            let mark = if item.is_completed { "x" } else { " " };
            println!("  {}. [{}] {}", n + 1, mark, item.text);
        }
    }
}

/// Lists the recommended habits, numbered for `habits pick`.
pub fn cmd_habits_list<S: KeyValueStore>(kv: &S) {
    match recommended::recommended(kv) {
        Ok(habits) => {
            for (n, h) in habits.iter().enumerate() {
                println!("{:>3}. {}", n + 1, h);
            }
        }
        Err(e) => eprintln!("Failed to load habits: {}", e),
    }
}

pub fn cmd_habits_add<S: KeyValueStore>(kv: &S, title: String, silent: bool) {
    match recommended::add_custom(kv, &title) {
        Ok(_) => {
            if !silent { println!("Habit '{}' added to recommendations.", title.trim()); }
        }
        Err(e) => {
            if !silent { eprintln!("Failed to add habit: {}", e); }
        }
    }
}

/// Adds the recommended habits at the given 1-based positions to `day`.
pub fn cmd_habits_pick<S: KeyValueStore>(kv: &S, picks: Vec<usize>, day: Option<String>, silent: bool) {
    let Some(day) = resolve_day(day.as_deref(), silent) else { return };
    let habits = match recommended::recommended(kv) {
        Ok(h) => h,
        Err(e) => {
            if !silent { eprintln!("Failed to load habits: {}", e); }
            return;
        }
    };
    let mut chosen = Vec::new();
    for n in picks {
        match n.checked_sub(1).and_then(|i| habits.get(i)) {
            Some(h) if !chosen.contains(&h) => chosen.push(h),
            Some(_) => {}
            None => {
                if !silent { eprintln!("No habit number {}.", n); }
                return;
            }
        }
    }
    let Some(mut board) = open_board(kv, silent) else { return };
    board.select_day(day);
    match board.add_many(chosen) {
        Ok(added) => {
            if !silent { println!("Added {} habit(s) to {}.", added, day); }
        }
        Err(e) => {
            if !silent { eprintln!("Failed to save tasks: {}", e); }
        }
    }
}

/// Prints completion figures and the last seven days.
pub fn cmd_stats<S: KeyValueStore>(kv: &S) {
    let Some(board) = open_board(kv, false) else { return };
    let stats = Stats::compute(board.tasks(), day::today());

    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["Total", "Completed", "Pending", "Rate", "Avg. time to done"]);
    table.add_row(vec![
        Cell::new(stats.total),
        Cell::new(stats.completed).fg(Color::Green),
        Cell::new(stats.pending).fg(Color::Yellow),
        Cell::new(format!("{}%", stats.completion_rate)),
        Cell::new(stats.average_completion.map(format_duration).unwrap_or_else(|| "-".into())),
    ]);
    println!("{table}");

    let max = stats.max_daily();
    for d in &stats.daily {
        let width = d.completed * 20 / max;
        println!("{} {:<20} {}", d.weekday, "█".repeat(width), d.completed);
    }
}

pub fn cmd_export<S: KeyValueStore>(kv: &S, path: &Path, silent: bool) {
    let Some(board) = open_board(kv, silent) else { return };
    match transfer::write_export(path, board.tasks()) {
        Ok(()) => {
            if !silent { println!("Exported {} task(s) to {}.", board.tasks().len(), path.display()); }
        }
        Err(e) => {
            if !silent { eprintln!("Failed to export data: {}", e); }
        }
    }
}

pub fn cmd_import<S: KeyValueStore>(kv: &S, path: &Path, policy: ImportPolicy, silent: bool) {
    let Some(mut board) = open_board(kv, silent) else { return };
    let before = board.tasks().len();
    match transfer::import_file(&mut board, path, policy) {
        Ok(duplicates) => {
            if silent { return; }
            let added = board.tasks().len().saturating_sub(before);
            if duplicates.is_empty() {
                println!("Imported {} task(s).", added);
            } else {
                let verb = match policy {
                    ImportPolicy::Skip => "skipped",
                    ImportPolicy::Replace => "replaced",
                };
                println!("Imported {} new task(s); {} existing task(s) {}.", added, duplicates.len(), verb);
            }
        }
        Err(e) => {
            if !silent { eprintln!("Failed to import data: {}. Please ensure the file is valid.", e); }
        }
    }
}

/// Deletes all tasks after confirmation.
pub fn cmd_clear<S: KeyValueStore>(kv: &S, force: bool) {
    if !force {
        print!("Are you sure you want to delete all your tasks? This cannot be undone. [y/N] ");
        let _ = io::stdout().flush();
        let mut input = String::new();
        if io::stdin().read_line(&mut input).is_err() || input.trim().to_lowercase() != "y" {
            println!("Aborted.");
            return;
        }
    }

    if let Err(e) = TaskStore::new(kv).clear_all() {
        eprintln!("Failed to clear data: {}", e);
    } else {
        println!("All data has been cleared.");
    }
}

pub fn cmd_reminders_show<S: KeyValueStore>(kv: &S) {
    match SettingsStore::new(kv).reminders() {
        Ok(settings) => {
            for (label, kind) in [("Plan your day", ReminderKind::Task), ("Daily review", ReminderKind::Review)] {
                let r = settings.get(kind);
                let state = if r.enabled { "on" } else { "off" };
                println!("{:<14} {}  {}", label, r.time.format("%H:%M"), state);
            }
        }
        Err(e) => eprintln!("Failed to load reminder settings: {}", e),
    }
}

pub fn cmd_reminders_toggle<S: KeyValueStore>(kv: &S, kind: ReminderKind, silent: bool) {
    match SettingsStore::new(kv).toggle_reminder(kind) {
        Ok(settings) => {
            let state = if settings.get(kind).enabled { "enabled" } else { "disabled" };
            if !silent { println!("Reminder {}.", state); }
        }
        Err(e) => {
            if !silent { eprintln!("Failed to update reminder settings: {}", e); }
        }
    }
}

pub fn cmd_reminders_time<S: KeyValueStore>(kv: &S, kind: ReminderKind, time: String, silent: bool) {
    let time = match NaiveTime::parse_from_str(time.trim(), "%H:%M") {
        Ok(t) => t,
        Err(e) => {
            if !silent { eprintln!("Invalid time '{}': {}. Use HH:MM.", time, e); }
            return;
        }
    };
    match SettingsStore::new(kv).set_reminder_time(kind, time) {
        Ok(_) => {
            if !silent { println!("Reminder set for {}.", time.format("%H:%M")); }
        }
        Err(e) => {
            if !silent { eprintln!("Failed to update reminder settings: {}", e); }
        }
    }
}

/// Shows the display name, or sets it when `name` is given.
pub fn cmd_name<S: KeyValueStore>(kv: &S, name: Option<String>, silent: bool) {
    let settings = SettingsStore::new(kv);
    match name {
        Some(name) => {
            if let Err(e) = settings.set_display_name(&name) {
                if !silent { eprintln!("Failed to save name: {}", e); }
            } else if !silent {
                println!("Name saved.");
            }
        }
        None => match settings.display_name() {
            Ok(Some(name)) => println!("{}", name),
            Ok(None) => println!("No name set."),
            Err(e) => eprintln!("Failed to load name: {}", e),
        },
    }
}
