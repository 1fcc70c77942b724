use crate::storage::{read_json, write_json, KeyValueStore, StoreError};

pub const CUSTOM_HABITS_KEY: &str = "custom_recommended_tasks";

/// Habits offered during onboarding before the user adds their own.
pub const DEFAULT_HABITS: [&str; 12] = [
    "🏃‍♂️ Exercise",
    "📚 Read books",
    "🧘‍♂️ Meditate",
    "📝 Plan meals",
    "🪴 Water plants",
    "📔 Journal",
    "🤸‍♂️ Stretch",
    "🎯 Review goals",
    "✅ Review daily goals",
    "🧘‍♀️ Yoga",
    "🛒 Grocery shopping",
    "💪 Go to the gym",
];

/// Built-in habits followed by the user's custom ones.
pub fn recommended<S: KeyValueStore + ?Sized>(kv: &S) -> Result<Vec<String>, StoreError> {
    let mut all: Vec<String> = DEFAULT_HABITS.iter().map(|s| s.to_string()).collect();
    all.extend(custom_habits(kv)?);
    Ok(all)
}

pub fn custom_habits<S: KeyValueStore + ?Sized>(kv: &S) -> Result<Vec<String>, StoreError> {
    Ok(read_json(kv, CUSTOM_HABITS_KEY)?.unwrap_or_default())
}

/// Appends a custom habit and returns the full recommended list.
///
/// A habit already offered is not added twice.
pub fn add_custom<S: KeyValueStore + ?Sized>(kv: &S, title: &str) -> Result<Vec<String>, StoreError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(StoreError::InvalidInput("habit title is empty".into()));
    }
    let mut custom = custom_habits(kv)?;
    let known = DEFAULT_HABITS.contains(&title) || custom.iter().any(|h| h == title);
    if !known {
        custom.push(title.to_string());
        write_json(kv, CUSTOM_HABITS_KEY, &custom)?;
    }
    recommended(kv)
}
