//! Care task types.
//!
//! A [`Task`] is one unit of pet care work: a duration, a priority, a
//! recurrence pattern and an optional completion history. Overdue status
//! is derived from the recurrence pattern and the last completion time.

use chrono::{Duration, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::error::ValidationError;
use crate::timeline::TimeWindow;

/// Longest task accepted, in minutes (one full day).
pub const MAX_TASK_MINUTES: i64 = 24 * 60;

/// Separator between a task id's base name and its successor counter.
const SUCCESSOR_MARKER: &str = "_next_";

/// Task priority, ordered `Low < Medium < High < Critical`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    /// Lowercase name, as used in serialized forms and config keys.
    pub fn key(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Critical => "critical",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Priority::Low => "LOW",
            Priority::Medium => "MEDIUM",
            Priority::High => "HIGH",
            Priority::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How often a task logically repeats.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Recurrence {
    #[default]
    Daily,
    Weekly,
    Biweekly,
    Monthly,
    AsNeeded,
}

impl Recurrence {
    /// Time after the last completion at which the task becomes overdue.
    ///
    /// `AsNeeded` has no deadline.
    pub fn interval(&self) -> Option<Duration> {
        match self {
            Recurrence::Daily => Some(Duration::hours(24)),
            Recurrence::Weekly => Some(Duration::days(7)),
            Recurrence::Biweekly => Some(Duration::days(14)),
            Recurrence::Monthly => Some(Duration::days(30)),
            Recurrence::AsNeeded => None,
        }
    }

    /// Whether completing the task spawns a successor.
    pub fn is_recurring(&self) -> bool {
        !matches!(self, Recurrence::AsNeeded)
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Recurrence::Daily => "daily",
            Recurrence::Weekly => "weekly",
            Recurrence::Biweekly => "biweekly",
            Recurrence::Monthly => "monthly",
            Recurrence::AsNeeded => "as_needed",
        };
        f.write_str(s)
    }
}

/// A unit of pet care work.
///
/// Deserialization runs [`Task::validate`], so a decoded task always
/// satisfies the same bounds as one built with [`Task::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTask")]
pub struct Task {
    /// Identifier, unique within a pet
    pub id: String,
    pub title: String,
    /// Duration in minutes, within `1..=1440`
    pub duration_minutes: i64,
    pub priority: Priority,
    /// Windows tried, in order, before general availability
    pub preferred_windows: Vec<TimeWindow>,
    pub required: bool,
    /// Last completion time, `None` if never done
    pub last_done: Option<NaiveDateTime>,
    pub recurrence: Recurrence,
    /// Ids of tasks that must be placed earlier in the same run
    pub dependencies: BTreeSet<String>,
    /// Owning pet, set when the task is added to a pet
    pub pet_id: Option<String>,
}

/// Wire form of a task; optional fields fall back to their defaults.
#[derive(Deserialize)]
struct RawTask {
    id: String,
    title: String,
    duration_minutes: i64,
    #[serde(default)]
    priority: Priority,
    #[serde(default)]
    preferred_windows: Vec<TimeWindow>,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    last_done: Option<NaiveDateTime>,
    #[serde(default)]
    recurrence: Recurrence,
    #[serde(default)]
    dependencies: BTreeSet<String>,
    #[serde(default)]
    pet_id: Option<String>,
}

impl TryFrom<RawTask> for Task {
    type Error = ValidationError;

    fn try_from(raw: RawTask) -> Result<Self, Self::Error> {
        let task = Task {
            id: raw.id,
            title: raw.title,
            duration_minutes: raw.duration_minutes,
            priority: raw.priority,
            preferred_windows: raw.preferred_windows,
            required: raw.required,
            last_done: raw.last_done,
            recurrence: raw.recurrence,
            dependencies: raw.dependencies,
            pet_id: raw.pet_id,
        };
        task.validate()?;
        Ok(task)
    }
}

impl Task {
    /// Create a medium priority, optional, daily task.
    ///
    /// # Errors
    /// Returns a [`ValidationError`] for a blank id or title, or a duration
    /// outside `1..=1440` minutes.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        duration_minutes: i64,
    ) -> Result<Self, ValidationError> {
        let task = Self {
            id: id.into(),
            title: title.into(),
            duration_minutes,
            priority: Priority::default(),
            preferred_windows: Vec::new(),
            required: false,
            last_done: None,
            recurrence: Recurrence::default(),
            dependencies: BTreeSet::new(),
            pet_id: None,
        };
        task.validate()?;
        Ok(task)
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_recurrence(mut self, recurrence: Recurrence) -> Self {
        self.recurrence = recurrence;
        self
    }

    pub fn with_preferred_window(mut self, window: TimeWindow) -> Self {
        self.preferred_windows.push(window);
        self
    }

    pub fn with_dependency(mut self, task_id: impl Into<String>) -> Self {
        self.dependencies.insert(task_id.into());
        self
    }

    pub fn with_last_done(mut self, at: NaiveDateTime) -> Self {
        self.last_done = Some(at);
        self
    }

    /// Check the id, title and duration bounds.
    pub fn validate(&self) -> Result<(), ValidationError> {
        ValidationError::require_non_blank("id", &self.id)?;
        ValidationError::require_non_blank("title", &self.title)?;
        if self.duration_minutes <= 0 {
            return Err(ValidationError::invalid(
                "duration_minutes",
                "Duration must be positive",
            ));
        }
        if self.duration_minutes > MAX_TASK_MINUTES {
            return Err(ValidationError::invalid(
                "duration_minutes",
                "Duration cannot exceed 24 hours",
            ));
        }
        Ok(())
    }

    /// Whether the task has ever been completed.
    pub fn is_completed(&self) -> bool {
        self.last_done.is_some()
    }

    /// Overdue status against the local wall clock.
    pub fn is_overdue(&self) -> bool {
        self.is_overdue_at(Local::now().naive_local())
    }

    /// Overdue status at `now`.
    ///
    /// A never-done task is overdue iff it is required. A done task is
    /// overdue once the time since `last_done` exceeds its recurrence
    /// interval; `AsNeeded` tasks never become overdue this way.
    pub fn is_overdue_at(&self, now: NaiveDateTime) -> bool {
        match self.last_done {
            None => self.required,
            Some(_) => self.overdue_by(now).is_some(),
        }
    }

    /// How far past its recurrence deadline a completed task is.
    ///
    /// `None` for never-done tasks, `AsNeeded` tasks and tasks still
    /// within their interval.
    pub fn overdue_by(&self, now: NaiveDateTime) -> Option<Duration> {
        let last_done = self.last_done?;
        let interval = self.recurrence.interval()?;
        let late = (now - last_done) - interval;
        (late > Duration::zero()).then_some(late)
    }

    /// Time elapsed since the last completion.
    pub fn since_last_done(&self, now: NaiveDateTime) -> Option<Duration> {
        self.last_done.map(|at| now - at)
    }

    /// Copy of this task's static fields under a new id, never done.
    pub fn successor(&self, id: impl Into<String>) -> Task {
        Task {
            id: id.into(),
            last_done: None,
            ..self.clone()
        }
    }

    /// The id with any successor counter stripped.
    pub fn base_id(&self) -> &str {
        base_id(&self.id)
    }
}

/// Strip a trailing `_next_<n>` counter from a task id.
pub(crate) fn base_id(id: &str) -> &str {
    match id.rfind(SUCCESSOR_MARKER) {
        Some(pos) if successor_counter(id, &id[..pos]).is_some() => &id[..pos],
        _ => id,
    }
}

/// Counter of `id` if it is `<base>_next_<n>`.
pub(crate) fn successor_counter(id: &str, base: &str) -> Option<u32> {
    let digits = id.strip_prefix(base)?.strip_prefix(SUCCESSOR_MARKER)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Successor id for `base` with counter `n`.
pub(crate) fn successor_id(base: &str, n: u32) -> String {
    format!("{base}{SUCCESSOR_MARKER}{n}")
}
