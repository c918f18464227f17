//! Task scoring for placement order.
//!
//! Higher scores are attempted earlier. A score is the sum of:
//! - a base value per priority
//! - a bonus for required tasks
//! - an overdue bonus, scaled by how late the task is (capped)
//! - a penalty for tasks completed in the last few hours
//! - a small bonus for tasks that snugly fill their tightest preferred window

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::task::{Priority, Task};

/// Scoring weights. Defaults reproduce the standard scoring table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    /// Base score per priority, keyed by `Priority::key`
    #[serde(default = "default_priority_base")]
    pub priority_base: BTreeMap<String, f64>,
    /// Base used for a priority missing from `priority_base`
    #[serde(default = "default_fallback_base")]
    pub fallback_base: f64,
    #[serde(default = "default_required_bonus")]
    pub required_bonus: f64,
    /// Bonus per full day past the recurrence deadline
    #[serde(default = "default_overdue_per_day")]
    pub overdue_per_day: f64,
    #[serde(default = "default_overdue_cap")]
    pub overdue_cap: f64,
    /// Flat bonus for a required task that was never done
    #[serde(default = "default_never_done_bonus")]
    pub never_done_bonus: f64,
    #[serde(default = "default_recent_hours")]
    pub recent_hours: i64,
    #[serde(default = "default_recent_penalty")]
    pub recent_penalty: f64,
    #[serde(default = "default_settling_hours")]
    pub settling_hours: i64,
    #[serde(default = "default_settling_penalty")]
    pub settling_penalty: f64,
    #[serde(default = "default_window_fit_weight")]
    pub window_fit_weight: f64,
}

fn default_priority_base() -> BTreeMap<String, f64> {
    [
        (Priority::Critical, 4.0),
        (Priority::High, 3.0),
        (Priority::Medium, 2.0),
        (Priority::Low, 1.0),
    ]
    .into_iter()
    .map(|(p, base)| (p.key().to_string(), base))
    .collect()
}
fn default_fallback_base() -> f64 {
    2.0
}
fn default_required_bonus() -> f64 {
    2.0
}
fn default_overdue_per_day() -> f64 {
    0.5
}
fn default_overdue_cap() -> f64 {
    3.0
}
fn default_never_done_bonus() -> f64 {
    1.0
}
fn default_recent_hours() -> i64 {
    6
}
fn default_recent_penalty() -> f64 {
    1.0
}
fn default_settling_hours() -> i64 {
    12
}
fn default_settling_penalty() -> f64 {
    0.5
}
fn default_window_fit_weight() -> f64 {
    0.5
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            priority_base: default_priority_base(),
            fallback_base: default_fallback_base(),
            required_bonus: default_required_bonus(),
            overdue_per_day: default_overdue_per_day(),
            overdue_cap: default_overdue_cap(),
            never_done_bonus: default_never_done_bonus(),
            recent_hours: default_recent_hours(),
            recent_penalty: default_recent_penalty(),
            settling_hours: default_settling_hours(),
            settling_penalty: default_settling_penalty(),
            window_fit_weight: default_window_fit_weight(),
        }
    }
}

/// Per-factor contributions to a task's score.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ScoreBreakdown {
    pub priority: f64,
    pub required: f64,
    pub overdue: f64,
    pub recency: f64,
    pub window_fit: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.priority + self.required + self.overdue + self.recency + self.window_fit
    }
}

/// Scores tasks against a fixed reference time.
#[derive(Debug, Clone)]
pub struct TaskScorer {
    weights: ScoreWeights,
    now: NaiveDateTime,
}

impl TaskScorer {
    pub fn new(weights: ScoreWeights, now: NaiveDateTime) -> Self {
        Self { weights, now }
    }

    pub fn now(&self) -> NaiveDateTime {
        self.now
    }

    pub fn score(&self, task: &Task) -> f64 {
        self.breakdown(task).total()
    }

    pub fn breakdown(&self, task: &Task) -> ScoreBreakdown {
        ScoreBreakdown {
            priority: self.priority_score(task.priority),
            required: if task.required {
                self.weights.required_bonus
            } else {
                0.0
            },
            overdue: self.overdue_bonus(task),
            recency: self.recency_penalty(task),
            window_fit: self.window_fit_bonus(task),
        }
    }

    /// The fallback only applies when a configuration omits a priority.
    fn priority_score(&self, priority: Priority) -> f64 {
        match self.weights.priority_base.get(priority.key()) {
            Some(base) => *base,
            None => self.weights.fallback_base,
        }
    }

    fn overdue_bonus(&self, task: &Task) -> f64 {
        if !task.is_overdue_at(self.now) {
            return 0.0;
        }
        match task.overdue_by(self.now) {
            Some(late) => {
                let days = late.num_minutes() as f64 / (24.0 * 60.0);
                (days * self.weights.overdue_per_day).min(self.weights.overdue_cap)
            }
            None => self.weights.never_done_bonus,
        }
    }

    /// A threshold too large for a `Duration` never applies.
    fn recency_penalty(&self, task: &Task) -> f64 {
        let Some(elapsed) = task.since_last_done(self.now) else {
            return 0.0;
        };
        let within = |hours: i64| Duration::try_hours(hours).is_some_and(|limit| elapsed < limit);
        if within(self.weights.recent_hours) {
            -self.weights.recent_penalty
        } else if within(self.weights.settling_hours) {
            -self.weights.settling_penalty
        } else {
            0.0
        }
    }

    /// Ratio of the task to its tightest preferred window that can hold it.
    fn window_fit_bonus(&self, task: &Task) -> f64 {
        task.preferred_windows
            .iter()
            .filter(|w| w.fits_task(task.duration_minutes))
            .map(|w| w.duration_minutes())
            .min()
            .map(|tightest| task.duration_minutes as f64 / tightest as f64 * self.weights.window_fit_weight)
            .unwrap_or(0.0)
    }
}
