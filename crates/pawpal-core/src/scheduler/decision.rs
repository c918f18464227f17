//! Decision transcript entries.
//!
//! Every step of a scheduling run is recorded as a [`Decision`]. The
//! rendered lines form the schedule's explanation; overlap refusals are
//! also collected separately as [`ConflictWarning`]s.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::fmt;

use crate::schedule::ScheduleConflict;

/// Where a placement came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowSource {
    /// One of the task's own preferred windows
    Preferred,
    /// The general free-window pool
    Availability,
}

impl fmt::Display for WindowSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowSource::Preferred => f.write_str("preferred window"),
            WindowSource::Availability => f.write_str("availability"),
        }
    }
}

/// A placement attempt that overlapped an existing placement.
///
/// This records the refused attempt only. The same task may still be
/// placed later from another window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictWarning {
    pub task_id: String,
    pub task_title: String,
    pub attempted: String,
    pub existing_task_id: String,
    pub existing_title: String,
    pub existing: String,
}

impl From<&ScheduleConflict> for ConflictWarning {
    fn from(conflict: &ScheduleConflict) -> Self {
        Self {
            task_id: conflict.candidate.task.id.clone(),
            task_title: conflict.candidate.task.title.clone(),
            attempted: conflict.candidate.time_range(),
            existing_task_id: conflict.existing.task.id.clone(),
            existing_title: conflict.existing.task.title.clone(),
            existing: conflict.existing.time_range(),
        }
    }
}

impl fmt::Display for ConflictWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Conflict: '{}' ({}) overlaps '{}' ({}); attempt refused",
            self.task_title, self.attempted, self.existing_title, self.existing
        )
    }
}

/// One entry of the decision transcript.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Decision {
    Started {
        pet_name: String,
        date: NaiveDate,
        available_minutes: i64,
        windows: usize,
    },
    Placed {
        task_id: String,
        title: String,
        start: NaiveDateTime,
        end: NaiveDateTime,
        score: f64,
        source: WindowSource,
        reason: String,
    },
    BlockedByDependency {
        task_id: String,
        title: String,
        missing: Vec<String>,
    },
    Unplaced {
        task_id: String,
        title: String,
        duration_minutes: i64,
        score: f64,
    },
    Conflict(ConflictWarning),
    Finished {
        scheduled: usize,
        unscheduled: usize,
        minutes_scheduled: i64,
        utilization: f64,
    },
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Started {
                pet_name,
                date,
                available_minutes,
                windows,
            } => write!(
                f,
                "Planning {} for {}: {} minutes available in {} window(s)",
                pet_name, date, available_minutes, windows
            ),
            Decision::Placed {
                title,
                start,
                end,
                score,
                source,
                reason,
                ..
            } => write!(
                f,
                "Scheduled '{}' {}-{} from {} (score {:.2}): {}",
                title,
                start.format("%H:%M"),
                end.format("%H:%M"),
                source,
                score,
                reason
            ),
            Decision::BlockedByDependency { title, missing, .. } => write!(
                f,
                "Skipped '{}': waiting on unscheduled dependencies {}",
                title,
                missing.join(", ")
            ),
            Decision::Unplaced {
                title,
                duration_minutes,
                score,
                ..
            } => write!(
                f,
                "Skipped '{}' (score {:.2}): no free window fits {} minutes",
                title, score, duration_minutes
            ),
            Decision::Conflict(warning) => fmt::Display::fmt(warning, f),
            Decision::Finished {
                scheduled,
                unscheduled,
                minutes_scheduled,
                utilization,
            } => write!(
                f,
                "Done: {} scheduled, {} unscheduled, {} minutes used ({:.1}% utilization)",
                scheduled, unscheduled, minutes_scheduled, utilization
            ),
        }
    }
}
