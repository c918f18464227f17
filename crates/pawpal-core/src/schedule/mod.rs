//! Schedule types: placed tasks and the per-day schedule aggregate.
//!
//! A [`Schedule`] keeps its placed tasks sorted by start time and refuses
//! any placement that would overlap an existing one.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;
use crate::task::Task;

/// Allowed difference between a placement's length and its task duration.
const DURATION_TOLERANCE_MINUTES: i64 = 1;

/// A task bound to a concrete start and end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawScheduledTask")]
pub struct ScheduledTask {
    pub id: String,
    pub task: Task,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    /// Why the task was placed, e.g. `Priority: HIGH, Required`
    pub reason: String,
}

#[derive(Deserialize)]
struct RawScheduledTask {
    id: String,
    task: Task,
    start_time: NaiveDateTime,
    end_time: NaiveDateTime,
    #[serde(default)]
    reason: String,
}

impl TryFrom<RawScheduledTask> for ScheduledTask {
    type Error = ValidationError;

    fn try_from(raw: RawScheduledTask) -> Result<Self, Self::Error> {
        let mut scheduled = ScheduledTask::new(raw.task, raw.start_time, raw.end_time, raw.reason)?;
        scheduled.id = raw.id;
        Ok(scheduled)
    }
}

impl ScheduledTask {
    /// # Errors
    /// Returns a [`ValidationError`] unless `start < end` and the span
    /// matches the task duration within one minute.
    pub fn new(
        task: Task,
        start_time: NaiveDateTime,
        end_time: NaiveDateTime,
        reason: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        if start_time >= end_time {
            return Err(ValidationError::InvalidPlacement {
                start: start_time,
                end: end_time,
            });
        }
        let actual = (end_time - start_time).num_minutes();
        if (actual - task.duration_minutes).abs() > DURATION_TOLERANCE_MINUTES {
            return Err(ValidationError::DurationMismatch {
                expected: task.duration_minutes,
                actual,
            });
        }

        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            task,
            start_time,
            end_time,
            reason: reason.into(),
        })
    }

    /// Get total duration in minutes
    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }

    /// Half-open overlap: back-to-back placements do not overlap.
    pub fn overlaps_with(&self, other: &ScheduledTask) -> bool {
        self.start_time < other.end_time && other.start_time < self.end_time
    }

    /// `HH:MM-HH:MM` for transcripts and warnings.
    pub fn time_range(&self) -> String {
        format!(
            "{}-{}",
            self.start_time.format("%H:%M"),
            self.end_time.format("%H:%M")
        )
    }
}

/// Refused placement: the candidate overlaps an existing entry.
#[derive(Debug, Clone)]
pub struct ScheduleConflict {
    /// The entry already in the schedule
    pub existing: ScheduledTask,
    /// The refused placement
    pub candidate: ScheduledTask,
}

impl fmt::Display for ScheduleConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' ({}) overlaps '{}' ({})",
            self.candidate.task.title,
            self.candidate.time_range(),
            self.existing.task.title,
            self.existing.time_range()
        )
    }
}

impl std::error::Error for ScheduleConflict {}

/// One pet's plan for one day.
///
/// A deserialized schedule is rebuilt through
/// [`Schedule::add_scheduled_task`], so overlaps are refused and the
/// scheduled-minute total is recomputed rather than trusted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawSchedule")]
pub struct Schedule {
    pub pet_id: String,
    pub date: NaiveDate,
    scheduled_tasks: Vec<ScheduledTask>,
    /// Tasks that could not be placed, in attempt order
    pub unscheduled_tasks: Vec<Task>,
    pub total_minutes_available: i64,
    total_minutes_scheduled: i64,
    /// Transcript of the decisions that produced this schedule
    pub explanation: String,
}

#[derive(Deserialize)]
struct RawSchedule {
    pet_id: String,
    date: NaiveDate,
    #[serde(default)]
    scheduled_tasks: Vec<ScheduledTask>,
    #[serde(default)]
    unscheduled_tasks: Vec<Task>,
    total_minutes_available: i64,
    #[serde(default)]
    explanation: String,
}

impl TryFrom<RawSchedule> for Schedule {
    type Error = ValidationError;

    fn try_from(raw: RawSchedule) -> Result<Self, Self::Error> {
        ValidationError::require_non_blank("pet_id", &raw.pet_id)?;
        if raw.total_minutes_available < 0 {
            return Err(ValidationError::invalid(
                "total_minutes_available",
                "must not be negative",
            ));
        }

        let mut schedule = Schedule::new(raw.pet_id, raw.date, raw.total_minutes_available);
        for scheduled in raw.scheduled_tasks {
            schedule
                .add_scheduled_task(scheduled)
                .map_err(|conflict| ValidationError::invalid("scheduled_tasks", conflict.to_string()))?;
        }
        schedule.unscheduled_tasks = raw.unscheduled_tasks;
        schedule.explanation = raw.explanation;
        Ok(schedule)
    }
}

impl Schedule {
    pub fn new(pet_id: impl Into<String>, date: NaiveDate, total_minutes_available: i64) -> Self {
        Self {
            pet_id: pet_id.into(),
            date,
            scheduled_tasks: Vec::new(),
            unscheduled_tasks: Vec::new(),
            total_minutes_available,
            total_minutes_scheduled: 0,
            explanation: String::new(),
        }
    }

    /// Placed tasks, ascending by start time.
    pub fn scheduled_tasks(&self) -> &[ScheduledTask] {
        &self.scheduled_tasks
    }

    pub fn total_minutes_scheduled(&self) -> i64 {
        self.total_minutes_scheduled
    }

    /// Whether a task with this id has been placed.
    pub fn contains_task(&self, task_id: &str) -> bool {
        self.scheduled_tasks.iter().any(|st| st.task.id == task_id)
    }

    /// Insert a placement in start-time order.
    ///
    /// # Errors
    /// Returns the conflict, leaving the schedule untouched, if the
    /// placement overlaps any existing entry.
    pub fn add_scheduled_task(&mut self, scheduled: ScheduledTask) -> Result<(), ScheduleConflict> {
        if let Some(existing) = self.scheduled_tasks.iter().find(|st| st.overlaps_with(&scheduled)) {
            return Err(ScheduleConflict {
                existing: existing.clone(),
                candidate: scheduled,
            });
        }

        let pos = self
            .scheduled_tasks
            .partition_point(|st| st.start_time <= scheduled.start_time);
        self.total_minutes_scheduled += scheduled.duration_minutes();
        self.scheduled_tasks.insert(pos, scheduled);
        Ok(())
    }

    /// Every overlapping pair currently present. Empty unless the
    /// insertion invariant was bypassed.
    pub fn get_conflicts(&self) -> Vec<(&ScheduledTask, &ScheduledTask)> {
        let mut conflicts = Vec::new();
        for (i, a) in self.scheduled_tasks.iter().enumerate() {
            for b in &self.scheduled_tasks[i + 1..] {
                if a.overlaps_with(b) {
                    conflicts.push((a, b));
                }
            }
        }
        conflicts
    }

    /// Percentage of available minutes that were scheduled; 0 when
    /// nothing was available.
    pub fn get_utilization_rate(&self) -> f64 {
        if self.total_minutes_available <= 0 {
            return 0.0;
        }
        self.total_minutes_scheduled as f64 / self.total_minutes_available as f64 * 100.0
    }

    /// Stable chronological sort of the placed tasks.
    pub fn sort_by_time(&mut self) {
        self.scheduled_tasks.sort_by_key(|st| st.start_time);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveTime};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        date().and_time(NaiveTime::from_hms_opt(h, m, 0).unwrap())
    }

    fn placed(id: &str, h: u32, m: u32, minutes: i64) -> ScheduledTask {
        let task = Task::new(id, format!("Task {id}"), minutes).unwrap();
        let start = at(h, m);
        ScheduledTask::new(task, start, start + Duration::minutes(minutes), "test").unwrap()
    }

    #[test]
    fn scheduled_task_validates_span() {
        let task = Task::new("t", "T", 30).unwrap();
        assert!(ScheduledTask::new(task.clone(), at(9, 30), at(9, 0), "").is_err());
        assert!(matches!(
            ScheduledTask::new(task.clone(), at(9, 0), at(9, 45), ""),
            Err(ValidationError::DurationMismatch { expected: 30, actual: 45 })
        ));
        assert!(ScheduledTask::new(task, at(9, 0), at(9, 31), "").is_ok());
    }

    #[test]
    fn back_to_back_tasks_do_not_overlap() {
        let a = placed("a", 9, 0, 30);
        let b = placed("b", 9, 30, 30);
        let c = placed("c", 9, 15, 30);
        assert!(!a.overlaps_with(&b));
        assert!(a.overlaps_with(&c) && c.overlaps_with(&a));
    }

    #[test]
    fn add_keeps_start_order_and_totals() {
        let mut schedule = Schedule::new("pet1", date(), 120);
        schedule.add_scheduled_task(placed("late", 10, 0, 30)).unwrap();
        schedule.add_scheduled_task(placed("early", 9, 0, 15)).unwrap();
        schedule.add_scheduled_task(placed("mid", 9, 30, 20)).unwrap();

        let ids: Vec<_> = schedule.scheduled_tasks().iter().map(|st| st.task.id.as_str()).collect();
        assert_eq!(ids, vec!["early", "mid", "late"]);
        assert_eq!(schedule.total_minutes_scheduled(), 65);
        assert!(schedule.contains_task("mid"));
    }

    #[test]
    fn overlapping_add_is_refused_without_mutation() {
        let mut schedule = Schedule::new("pet1", date(), 60);
        schedule.add_scheduled_task(placed("a", 9, 0, 30)).unwrap();

        let conflict = schedule.add_scheduled_task(placed("b", 9, 15, 30)).unwrap_err();
        assert_eq!(conflict.existing.task.id, "a");
        assert_eq!(conflict.candidate.task.id, "b");
        assert_eq!(conflict.to_string(), "'Task b' (09:15-09:45) overlaps 'Task a' (09:00-09:30)");
        assert_eq!(schedule.scheduled_tasks().len(), 1);
        assert_eq!(schedule.total_minutes_scheduled(), 30);
        assert!(schedule.get_conflicts().is_empty());
    }

    #[test]
    fn utilization_rate() {
        let mut schedule = Schedule::new("pet1", date(), 60);
        schedule.add_scheduled_task(placed("a", 9, 0, 30)).unwrap();
        assert!((schedule.get_utilization_rate() - 50.0).abs() < f64::EPSILON);

        let empty = Schedule::new("pet1", date(), 0);
        assert_eq!(empty.get_utilization_rate(), 0.0);
    }

    #[test]
    fn deserialize_recomputes_totals_and_keeps_ids() {
        let mut schedule = Schedule::new("pet1", date(), 120);
        schedule.add_scheduled_task(placed("b", 10, 0, 30)).unwrap();
        schedule.add_scheduled_task(placed("a", 9, 0, 15)).unwrap();

        let mut json = serde_json::to_value(&schedule).unwrap();
        json["total_minutes_scheduled"] = serde_json::json!(9999);
        let back: Schedule = serde_json::from_value(json).unwrap();

        assert_eq!(back.total_minutes_scheduled(), 45);
        assert_eq!(back.scheduled_tasks(), schedule.scheduled_tasks());
    }

    #[test]
    fn deserialize_rejects_overlapping_placements() {
        let mut schedule = Schedule::new("pet1", date(), 120);
        schedule.add_scheduled_task(placed("a", 9, 0, 30)).unwrap();
        let mut json = serde_json::to_value(&schedule).unwrap();
        let overlapping = serde_json::to_value(placed("b", 9, 15, 30)).unwrap();
        json["scheduled_tasks"].as_array_mut().unwrap().push(overlapping);

        let err = serde_json::from_value::<Schedule>(json).unwrap_err();
        assert!(err.to_string().contains("overlaps"));
    }

    #[test]
    fn deserialize_rejects_mismatched_placement() {
        let mut json = serde_json::to_value(placed("a", 9, 0, 30)).unwrap();
        json["end_time"] = serde_json::json!("2024-03-01T11:00:00");
        assert!(serde_json::from_value::<ScheduledTask>(json).is_err());
    }
}
