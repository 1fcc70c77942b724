use chrono::NaiveTime;
use tracing::debug;
use crate::models::{ReminderKind, ReminderSettings};
use crate::storage::{read_json, write_json, KeyValueStore, StoreError};

pub const REMINDER_SETTINGS_KEY: &str = "reminder_settings";
pub const USER_NAME_KEY: &str = "user_name";

/// Small user preferences stored independently of the task collection.
#[derive(Debug)]
pub struct SettingsStore<S> {
    kv: S,
}

impl<S: KeyValueStore> SettingsStore<S> {
    pub fn new(kv: S) -> Self {
        Self { kv }
    }

    /// Stored reminder settings, or the defaults if none were saved.
    pub fn reminders(&self) -> Result<ReminderSettings, StoreError> {
        Ok(read_json(&self.kv, REMINDER_SETTINGS_KEY)?.unwrap_or_default())
    }

    pub fn save_reminders(&self, settings: &ReminderSettings) -> Result<(), StoreError> {
        write_json(&self.kv, REMINDER_SETTINGS_KEY, settings)
    }

    /// Flips the enabled flag of one reminder and returns the updated settings.
    pub fn toggle_reminder(&self, kind: ReminderKind) -> Result<ReminderSettings, StoreError> {
        let mut settings = self.reminders()?;
        let reminder = settings.get_mut(kind);
        reminder.enabled = !reminder.enabled;
        debug!(?kind, enabled = reminder.enabled, "toggled reminder");
        self.save_reminders(&settings)?;
        Ok(settings)
    }

    /// Sets the time of day of one reminder, keeping its enabled flag.
    pub fn set_reminder_time(&self, kind: ReminderKind, time: NaiveTime) -> Result<ReminderSettings, StoreError> {
        let mut settings = self.reminders()?;
        settings.get_mut(kind).time = time;
        self.save_reminders(&settings)?;
        Ok(settings)
    }

    pub fn display_name(&self) -> Result<Option<String>, StoreError> {
        read_json(&self.kv, USER_NAME_KEY)
    }

    /// Stores the trimmed display name. An empty name clears it.
    pub fn set_display_name(&self, name: &str) -> Result<(), StoreError> {
        let name = name.trim();
        if name.is_empty() {
            self.kv.remove(USER_NAME_KEY)
        } else {
            write_json(&self.kv, USER_NAME_KEY, name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn defaults_until_saved() {
        let store = SettingsStore::new(MemoryStore::new());
        let settings = store.reminders().unwrap();
        assert!(!settings.task_reminder.enabled);
        assert_eq!(settings.review_reminder.time, NaiveTime::from_hms_opt(21, 0, 0).unwrap());
    }

    #[test]
    fn toggle_and_retime_persist() {
        let store = SettingsStore::new(MemoryStore::new());
        store.toggle_reminder(ReminderKind::Review).unwrap();
        let seven = NaiveTime::from_hms_opt(7, 30, 0).unwrap();
        store.set_reminder_time(ReminderKind::Task, seven).unwrap();

        let settings = store.reminders().unwrap();
        assert!(settings.review_reminder.enabled);
        assert!(!settings.task_reminder.enabled);
        assert_eq!(settings.task_reminder.time, seven);
    }

    #[test]
    fn blank_name_clears() {
        let store = SettingsStore::new(MemoryStore::new());
        store.set_display_name("  Sam ").unwrap();
        assert_eq!(store.display_name().unwrap().as_deref(), Some("Sam"));
        store.set_display_name("   ").unwrap();
        assert_eq!(store.display_name().unwrap(), None);
    }
}
