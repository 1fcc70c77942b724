use chrono::{Duration, NaiveDate};
use crate::day::{self, day_of};
use crate::models::Task;

/// Completions within one day bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyCompletion {
    pub date: NaiveDate,
    /// Short weekday name, e.g. `Mon`.
    pub weekday: String,
    pub completed: usize,
}

/// Summary figures over the whole collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    /// Rounded percentage of completed tasks.
    pub completion_rate: u32,
    /// The seven days ending at `today`, oldest first.
    pub daily: Vec<DailyCompletion>,
    /// Mean time from a task's day starting to it being completed.
    pub average_completion: Option<Duration>,
}

impl Stats {
    pub fn compute(tasks: &[Task], today: NaiveDate) -> Self {
        let total = tasks.len();
        let completed = tasks.iter().filter(|t| t.is_completed).count();
        let completion_rate = if total == 0 {
            0
        } else {
            ((completed as f64 / total as f64) * 100.0).round() as u32
        };

        let daily = day::week_from(day::shift(today, -6))
            .into_iter()
            .map(|date| DailyCompletion {
                date,
                weekday: date.format("%a").to_string(),
                completed: tasks
                    .iter()
                    .filter(|t| t.is_completed && day_of(t.created_at) == date)
                    .count(),
            })
            .collect();

        let spans: Vec<i128> = tasks
            .iter()
            .filter(|t| t.is_completed)
            .filter_map(|t| t.completed_at.map(|at| (i128::from(at) - i128::from(t.created_at)).max(0)))
            .collect();
        let average_completion = (!spans.is_empty()).then(|| {
            let mean = spans.iter().sum::<i128>() / spans.len() as i128;
            i64::try_from(mean)
                .ok()
                .and_then(Duration::try_milliseconds)
                .unwrap_or(Duration::MAX)
        });

        Self {
            total,
            completed,
            pending: total - completed,
            completion_rate,
            daily,
            average_completion,
        }
    }

    /// Largest daily count, at least one, for scaling bars.
    pub fn max_daily(&self) -> usize {
        self.daily.iter().map(|d| d.completed).max().unwrap_or(0).max(1)
    }
}

/// Renders a duration as `3h 05m` or `12m`.
pub fn format_duration(d: Duration) -> String {
    let minutes = d.num_minutes();
    if minutes >= 60 {
        format!("{}h {:02}m", minutes / 60, minutes % 60)
    } else {
        format!("{}m", minutes)
    }
}
