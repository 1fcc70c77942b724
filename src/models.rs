use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// A single to-do item assigned to one calendar day.
///
/// Field names are serialized in camelCase so exported files stay readable by
/// older releases of the app.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier, generated once at creation time.
    pub id: String,
    /// The label shown in the day list.
    pub title: String,
    /// Whether the task has been completed.
    #[serde(default)]
    pub is_completed: bool,
    /// Unix milliseconds of local midnight of the day the task belongs to.
    pub created_at: i64,
    /// Unix milliseconds of the moment the task was last completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
    /// Free-form notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Reference to an image stored elsewhere on the device.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_uri: Option<String>,
    /// Ordered sub-steps of the task.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checklist: Option<Vec<ChecklistItem>>,
}

impl Task {
    /// Number of checklist items done out of the total, if the task has a checklist.
    pub fn checklist_progress(&self) -> Option<(usize, usize)> {
        self.checklist.as_ref().filter(|items| !items.is_empty()).map(|items| {
            let done = items.iter().filter(|i| i.is_completed).count();
            (done, items.len())
        })
    }
}

/// One entry in a task's checklist.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub is_completed: bool,
}

/// A daily reminder: whether it is on and the time of day it fires.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reminder {
    pub enabled: bool,
    #[serde(with = "hour_minute")]
    pub time: NaiveTime,
}

/// Which of the two reminders an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReminderKind {
    /// Morning "plan your day" reminder.
    Task,
    /// Evening "review your progress" reminder.
    Review,
}

/// The persisted reminder settings record.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReminderSettings {
    pub task_reminder: Reminder,
    pub review_reminder: Reminder,
}

impl ReminderSettings {
    pub fn get(&self, kind: ReminderKind) -> &Reminder {
        match kind {
            ReminderKind::Task => &self.task_reminder,
            ReminderKind::Review => &self.review_reminder,
        }
    }

    pub fn get_mut(&mut self, kind: ReminderKind) -> &mut Reminder {
        match kind {
            ReminderKind::Task => &mut self.task_reminder,
            ReminderKind::Review => &mut self.review_reminder,
        }
    }
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self {
            task_reminder: Reminder {
                enabled: false,
                time: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
            },
            review_reminder: Reminder {
                enabled: false,
                time: NaiveTime::from_hms_opt(21, 0, 0).unwrap_or_default(),
            },
        }
    }
}

/// Serializes a time of day as `HH:MM`.
mod hour_minute {
    use chrono::NaiveTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveTime::parse_from_str(&raw, FORMAT).map_err(de::Error::custom)
    }
}
