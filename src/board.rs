//! Day-bucketed view of the task collection and the operations that mutate it.
//!
//! The free functions are pure: they take the collection and return the new
//! one. [`DayBoard`] owns the collection and the selected day, and persists the
//! whole collection after every mutation.

use std::collections::HashSet;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use crate::day::{self, day_of, local_midnight, now_millis};
use crate::models::{ChecklistItem, Task};
use crate::storage::{KeyValueStore, StoreError, TaskStore};

/// Generates a timestamp-based identifier with a random suffix.
pub fn new_id() -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{}", now_millis(), &suffix[..9])
}

/// Every task belonging to the calendar day `day`.
pub fn filter_by_day(tasks: &[Task], day: NaiveDate) -> Vec<Task> {
    tasks.iter().filter(|t| day_of(t.created_at) == day).cloned().collect()
}

fn new_task(title: &str, day: NaiveDate) -> Task {
    Task {
        id: new_id(),
        title: title.to_string(),
        is_completed: false,
        created_at: local_midnight(day),
        completed_at: None,
        details: None,
        image_uri: None,
        checklist: None,
    }
}

/// Appends a new task to `day`. Blank titles are ignored.
pub fn add_task(mut tasks: Vec<Task>, title: &str, day: NaiveDate) -> Vec<Task> {
    let title = title.trim();
    if title.is_empty() {
        return tasks;
    }
    tasks.push(new_task(title, day));
    tasks
}

/// Appends one task per non-blank title, all on `day`.
pub fn add_many<I, T>(mut tasks: Vec<Task>, titles: I, day: NaiveDate) -> Vec<Task>
where
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    let mut used: HashSet<String> = tasks.iter().map(|t| t.id.clone()).collect();
    for title in titles {
        let title = title.as_ref().trim();
        if title.is_empty() {
            continue;
        }
        let mut task = new_task(title, day);
        // Regenerate on the rare id collision.
        while used.contains(&task.id) {
            task.id = new_id();
        }
        used.insert(task.id.clone());
        tasks.push(task);
    }
    tasks
}

/// What a completion toggle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The task went from pending to completed.
    Completed,
    /// The task went from completed back to pending.
    Reopened,
    /// No task had the given id.
    NotFound,
}

/// Flips the completion state of the task with `id`.
pub fn toggle_completion(mut tasks: Vec<Task>, id: &str) -> (Vec<Task>, Transition) {
    let Some(task) = tasks.iter_mut().find(|t| t.id == id) else {
        return (tasks, Transition::NotFound);
    };
    task.is_completed = !task.is_completed;
    let transition = if task.is_completed {
        task.completed_at = Some(now_millis());
        Transition::Completed
    } else {
        task.completed_at = None;
        Transition::Reopened
    };
    (tasks, transition)
}

/// Removes the task with `id`, if any.
pub fn delete_task(mut tasks: Vec<Task>, id: &str) -> Vec<Task> {
    tasks.retain(|t| t.id != id);
    tasks
}

/// Partial update of a task's detail fields. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailsPatch {
    pub details: Option<String>,
    /// `Some(None)` removes the image reference.
    pub image_uri: Option<Option<String>>,
    pub checklist: Option<Vec<ChecklistItem>>,
}

impl DetailsPatch {
    pub fn is_empty(&self) -> bool {
        self.details.is_none() && self.image_uri.is_none() && self.checklist.is_none()
    }
}

/// Applies `patch` to the task with `id`. Unknown ids leave the collection untouched.
pub fn update_details(mut tasks: Vec<Task>, id: &str, patch: DetailsPatch) -> Vec<Task> {
    if let Some(t) = tasks.iter_mut().find(|t| t.id == id) {
        if let Some(d) = patch.details {
            t.details = Some(d).filter(|d| !d.is_empty());
        }
        if let Some(uri) = patch.image_uri {
            t.image_uri = uri;
        }
        if let Some(items) = patch.checklist {
            t.checklist = Some(items);
        }
    }
    tasks
}

fn with_checklist<F>(mut tasks: Vec<Task>, id: &str, f: F) -> Vec<Task>
where
    F: FnOnce(&mut Vec<ChecklistItem>),
{
    if let Some(t) = tasks.iter_mut().find(|t| t.id == id) {
        f(t.checklist.get_or_insert_with(Vec::new));
    }
    tasks
}

/// Appends an item to a task's checklist. Blank text is ignored.
pub fn add_checklist_item(tasks: Vec<Task>, id: &str, text: &str) -> Vec<Task> {
    let text = text.trim();
    if text.is_empty() {
        return tasks;
    }
    with_checklist(tasks, id, |items| {
        let mut item_id = new_id();
        while items.iter().any(|i| i.id == item_id) {
            item_id = new_id();
        }
        items.push(ChecklistItem { id: item_id, text: text.to_string(), is_completed: false });
    })
}

pub fn toggle_checklist_item(tasks: Vec<Task>, id: &str, item_id: &str) -> Vec<Task> {
    with_checklist(tasks, id, |items| {
        if let Some(item) = items.iter_mut().find(|i| i.id == item_id) {
            item.is_completed = !item.is_completed;
        }
    })
}

pub fn remove_checklist_item(tasks: Vec<Task>, id: &str, item_id: &str) -> Vec<Task> {
    with_checklist(tasks, id, |items| items.retain(|i| i.id != item_id))
}

/// How imported records whose id already exists are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportPolicy {
    /// Keep the existing record and drop the imported one.
    #[default]
    Skip,
    /// Drop the existing record and keep the imported one.
    Replace,
}

/// Result of merging an imported collection into the existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub merged: Vec<Task>,
    /// Ids present in both collections.
    pub duplicates: Vec<String>,
}

/// Merges `incoming` into `existing`, resolving duplicate ids by `policy`.
pub fn import_merge(existing: Vec<Task>, incoming: Vec<Task>, policy: ImportPolicy) -> MergeOutcome {
    let existing_ids: HashSet<&str> = existing.iter().map(|t| t.id.as_str()).collect();
    let duplicates: Vec<String> = incoming
        .iter()
        .filter(|t| existing_ids.contains(t.id.as_str()))
        .map(|t| t.id.clone())
        .collect();

    let merged = match policy {
        ImportPolicy::Skip => {
            let fresh: Vec<Task> = incoming
                .into_iter()
                .filter(|t| !existing_ids.contains(t.id.as_str()))
                .collect();
            let mut merged = existing.clone();
            merged.extend(fresh);
            merged
        }
        ImportPolicy::Replace => {
            let dup: HashSet<&str> = duplicates.iter().map(String::as_str).collect();
            let mut merged: Vec<Task> = existing
                .iter()
                .filter(|t| !dup.contains(t.id.as_str()))
                .cloned()
                .collect();
            merged.extend(incoming);
            merged
        }
    };
    MergeOutcome { merged, duplicates }
}

/// The task collection together with the day currently being viewed.
///
/// Each mutator updates the in-memory collection first and then saves the
/// whole collection. A failed save is returned to the caller; the in-memory
/// collection keeps the change.
#[derive(Debug)]
pub struct DayBoard<S> {
    store: TaskStore<S>,
    tasks: Vec<Task>,
    selected: NaiveDate,
    week_start: NaiveDate,
}

impl<S: KeyValueStore> DayBoard<S> {
    /// Loads the collection and selects today.
    pub fn open(store: TaskStore<S>) -> Result<Self, StoreError> {
        let tasks = store.load_all()?;
        let today = day::today();
        Ok(Self { store, tasks, selected: today, week_start: today })
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn store(&self) -> &TaskStore<S> {
        &self.store
    }

    pub fn selected(&self) -> NaiveDate {
        self.selected
    }

    pub fn find(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Tasks of the selected day, in insertion order.
    pub fn visible(&self) -> Vec<Task> {
        filter_by_day(&self.tasks, self.selected)
    }

    /// The seven days of the calendar strip.
    pub fn week_days(&self) -> Vec<NaiveDate> {
        day::week_from(self.week_start)
    }

    /// Selects `day`, moving the strip so that it stays in view.
    pub fn select_day(&mut self, day: NaiveDate) {
        self.selected = day;
        let offset = (day - self.week_start).num_days();
        if !(0..7).contains(&offset) {
            self.week_start = day;
        }
    }

    pub fn today(&mut self) {
        let today = day::today();
        self.week_start = today;
        self.selected = today;
    }

    pub fn next_day(&mut self) {
        self.select_day(day::shift(self.selected, 1));
    }

    pub fn prev_day(&mut self) {
        self.select_day(day::shift(self.selected, -1));
    }

    /// Moves the strip one week forward and selects its first day.
    pub fn next_week(&mut self) {
        self.week_start = day::shift(self.week_start, 7);
        self.selected = self.week_start;
    }

    pub fn prev_week(&mut self) {
        self.week_start = day::shift(self.week_start, -7);
        self.selected = self.week_start;
    }

    fn commit(&mut self, tasks: Vec<Task>) -> Result<(), StoreError> {
        self.tasks = tasks;
        self.store.save_all(&self.tasks)
    }

    /// Adds a task to the selected day. Returns the new task's id, or `None` for a blank title.
    pub fn add(&mut self, title: &str) -> Result<Option<String>, StoreError> {
        let before = self.tasks.len();
        let tasks = add_task(std::mem::take(&mut self.tasks), title, self.selected);
        if tasks.len() == before {
            self.tasks = tasks;
            return Ok(None);
        }
        let id = tasks.last().map(|t| t.id.clone());
        self.commit(tasks)?;
        Ok(id)
    }

    /// Adds several tasks to the selected day and returns how many were added.
    pub fn add_many<I, T>(&mut self, titles: I) -> Result<usize, StoreError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let before = self.tasks.len();
        let tasks = add_many(std::mem::take(&mut self.tasks), titles, self.selected);
        let added = tasks.len() - before;
        if added == 0 {
            self.tasks = tasks;
            return Ok(0);
        }
        self.commit(tasks)?;
        debug!(added, day = %self.selected, "added tasks");
        Ok(added)
    }

    pub fn toggle(&mut self, id: &str) -> Result<Transition, StoreError> {
        let (tasks, transition) = toggle_completion(std::mem::take(&mut self.tasks), id);
        if transition == Transition::NotFound {
            self.tasks = tasks;
            return Ok(transition);
        }
        self.commit(tasks)?;
        Ok(transition)
    }

    /// Deletes a task. Returns whether a task was removed.
    pub fn delete(&mut self, id: &str) -> Result<bool, StoreError> {
        let before = self.tasks.len();
        let tasks = delete_task(std::mem::take(&mut self.tasks), id);
        let removed = tasks.len() != before;
        if !removed {
            self.tasks = tasks;
            return Ok(false);
        }
        self.commit(tasks)?;
        Ok(true)
    }

    /// Applies a detail patch. Returns whether the task exists.
    pub fn update_details(&mut self, id: &str, patch: DetailsPatch) -> Result<bool, StoreError> {
        if self.find(id).is_none() {
            return Ok(false);
        }
        let tasks = update_details(std::mem::take(&mut self.tasks), id, patch);
        self.commit(tasks)?;
        Ok(true)
    }

    pub fn add_checklist_item(&mut self, id: &str, text: &str) -> Result<bool, StoreError> {
        if self.find(id).is_none() || text.trim().is_empty() {
            return Ok(false);
        }
        let tasks = add_checklist_item(std::mem::take(&mut self.tasks), id, text);
        self.commit(tasks)?;
        Ok(true)
    }

    pub fn toggle_checklist_item(&mut self, id: &str, item_id: &str) -> Result<bool, StoreError> {
        if !self.has_checklist_item(id, item_id) {
            return Ok(false);
        }
        let tasks = toggle_checklist_item(std::mem::take(&mut self.tasks), id, item_id);
        self.commit(tasks)?;
        Ok(true)
    }

    pub fn remove_checklist_item(&mut self, id: &str, item_id: &str) -> Result<bool, StoreError> {
        if !self.has_checklist_item(id, item_id) {
            return Ok(false);
        }
        let tasks = remove_checklist_item(std::mem::take(&mut self.tasks), id, item_id);
        self.commit(tasks)?;
        Ok(true)
    }

    fn has_checklist_item(&self, id: &str, item_id: &str) -> bool {
        self.find(id)
            .and_then(|t| t.checklist.as_ref())
            .is_some_and(|items| items.iter().any(|i| i.id == item_id))
    }

    /// Merges imported tasks into the collection and returns the duplicate ids.
    pub fn import(&mut self, incoming: Vec<Task>, policy: ImportPolicy) -> Result<Vec<String>, StoreError> {
        let count = incoming.len();
        let outcome = import_merge(std::mem::take(&mut self.tasks), incoming, policy);
        self.commit(outcome.merged)?;
        info!(count, duplicates = outcome.duplicates.len(), ?policy, "imported tasks");
        Ok(outcome.duplicates)
    }

    /// Deletes every task and removes the persisted collection.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.tasks.clear();
        self.store.clear_all()
    }
}
