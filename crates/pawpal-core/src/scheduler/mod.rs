//! Greedy single-pass scheduler for pet care tasks.
//!
//! This module assigns a pet's tasks to concrete time slots:
//! - Resolves the owner's availability into a sorted free-window pool
//! - Scores tasks and orders them, required tasks first
//! - Places each task at the start of the first window that can hold it,
//!   trying the task's preferred windows before the pool
//! - Carves each placement out of the pool so leftovers stay usable
//! - Records every decision and every refused overlap

pub mod decision;
pub mod scoring;

use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::household::{Owner, Pet};
use crate::schedule::{Schedule, ScheduledTask};
use crate::storage::Config;
use crate::task::Task;
use crate::timeline::{normalize, FreeWindowPool, TimeWindow};

pub use decision::{ConflictWarning, Decision, WindowSource};
pub use scoring::{ScoreBreakdown, ScoreWeights, TaskScorer};

/// Transcript returned by [`Scheduler::explain_decision`] before any run.
pub const NO_SCHEDULE_MESSAGE: &str = "No schedule has been generated yet.";

/// Everything one scheduling run produced.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleRun {
    pub schedule: Schedule,
    pub decisions: Vec<Decision>,
    /// Refused overlapping attempts, in the order they happened
    pub warnings: Vec<ConflictWarning>,
}

impl ScheduleRun {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Decisions rendered one per line.
    pub fn explanation(&self) -> String {
        self.decisions
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Scheduling engine.
///
/// [`Scheduler::plan`] is a pure function of its inputs and the reference
/// time. [`Scheduler::generate_schedule`] wraps it and keeps the last run
/// so callers can ask for the explanation and warnings afterwards.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    weights: ScoreWeights,
    now: Option<NaiveDateTime>,
    last_run: Option<ScheduleRun>,
}

impl Scheduler {
    /// Create a scheduler with default weights, reading the local clock
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weights(weights: ScoreWeights) -> Self {
        Self {
            weights,
            ..Self::default()
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::with_weights(config.scoring.clone())
    }

    /// Freeze the reference time used for overdue and recency checks.
    pub fn with_now(mut self, now: NaiveDateTime) -> Self {
        self.now = Some(now);
        self
    }

    pub fn weights(&self) -> &ScoreWeights {
        &self.weights
    }

    fn reference_time(&self) -> NaiveDateTime {
        self.now.unwrap_or_else(|| Local::now().naive_local())
    }

    pub fn scorer(&self) -> TaskScorer {
        TaskScorer::new(self.weights.clone(), self.reference_time())
    }

    pub fn score_task(&self, task: &Task) -> f64 {
        self.scorer().score(task)
    }

    /// Placement order: required tasks by descending score, then optional
    /// tasks by descending score. Equal scores keep list order.
    pub fn order_tasks<'a>(&self, tasks: &'a [Task], scorer: &TaskScorer) -> Vec<(&'a Task, f64)> {
        let (mut required, mut optional): (Vec<_>, Vec<_>) = tasks
            .iter()
            .map(|t| (t, scorer.score(t)))
            .partition(|(t, _)| t.required);

        required.sort_by(|a, b| b.1.total_cmp(&a.1));
        optional.sort_by(|a, b| b.1.total_cmp(&a.1));
        required.extend(optional);
        required
    }

    /// Plan `pet`'s day against the owner's availability.
    pub fn plan(&self, owner: &Owner, pet: &Pet, date: NaiveDate) -> ScheduleRun {
        self.plan_in(pet, date, owner.get_availability(date))
    }

    /// Plan `pet`'s day against explicit windows instead of the owner's.
    pub fn plan_with_windows(&self, pet: &Pet, date: NaiveDate, windows: &[TimeWindow]) -> ScheduleRun {
        self.plan_in(pet, date, windows.to_vec())
    }

    fn plan_in(&self, pet: &Pet, date: NaiveDate, windows: Vec<TimeWindow>) -> ScheduleRun {
        let availability = normalize(windows);
        let total_available: i64 = availability.iter().map(TimeWindow::duration_minutes).sum();
        let scorer = self.scorer();

        let mut placement = Placement {
            date,
            schedule: Schedule::new(&pet.id, date, total_available),
            pool: FreeWindowPool::new(availability.iter().copied()),
            decisions: vec![Decision::Started {
                pet_name: pet.name.clone(),
                date,
                available_minutes: total_available,
                windows: availability.len(),
            }],
            warnings: Vec::new(),
        };

        for (task, score) in self.order_tasks(pet.tasks(), &scorer) {
            placement.attempt(task, score, task.is_overdue_at(scorer.now()));
        }

        placement.finish(pet)
    }

    /// Generate and remember a schedule for `pet` on `date`.
    pub fn generate_schedule(&mut self, owner: &Owner, pet: &Pet, date: NaiveDate) -> Schedule {
        let run = self.plan(owner, pet, date);
        self.remember(run)
    }

    /// Like [`Scheduler::generate_schedule`] with explicit availability.
    pub fn generate_schedule_with_windows(
        &mut self,
        pet: &Pet,
        date: NaiveDate,
        windows: &[TimeWindow],
    ) -> Schedule {
        let run = self.plan_with_windows(pet, date, windows);
        self.remember(run)
    }

    fn remember(&mut self, run: ScheduleRun) -> Schedule {
        let schedule = run.schedule.clone();
        self.last_run = Some(run);
        schedule
    }

    pub fn last_run(&self) -> Option<&ScheduleRun> {
        self.last_run.as_ref()
    }

    /// Transcript of the most recent run.
    pub fn explain_decision(&self) -> String {
        match &self.last_run {
            Some(run) => run.schedule.explanation.clone(),
            None => NO_SCHEDULE_MESSAGE.to_string(),
        }
    }

    pub fn get_warnings(&self) -> Vec<ConflictWarning> {
        self.last_run
            .as_ref()
            .map(|run| run.warnings.clone())
            .unwrap_or_default()
    }

    pub fn has_warnings(&self) -> bool {
        self.last_run.as_ref().is_some_and(ScheduleRun::has_warnings)
    }
}

/// Working state of one run.
struct Placement {
    date: NaiveDate,
    schedule: Schedule,
    pool: FreeWindowPool,
    decisions: Vec<Decision>,
    warnings: Vec<ConflictWarning>,
}

impl Placement {
    fn attempt(&mut self, task: &Task, score: f64, overdue: bool) {
        let missing: Vec<String> = task
            .dependencies
            .iter()
            .filter(|dep| !self.schedule.contains_task(dep))
            .cloned()
            .collect();
        if !missing.is_empty() {
            debug!(task_id = %task.id, ?missing, "dependencies not scheduled, skipping");
            self.decisions.push(Decision::BlockedByDependency {
                task_id: task.id.clone(),
                title: task.title.clone(),
                missing,
            });
            self.schedule.unscheduled_tasks.push(task.clone());
            return;
        }

        let reason = placement_reason(task, overdue);
        let candidates: Vec<(TimeWindow, WindowSource)> = task
            .preferred_windows
            .iter()
            .map(|w| (*w, WindowSource::Preferred))
            .chain(self.pool.iter().map(|w| (*w, WindowSource::Availability)))
            .collect();

        for (window, source) in candidates {
            if self.try_window(task, window, source, score, &reason) {
                return;
            }
        }

        debug!(task_id = %task.id, score, "no window fits, leaving unscheduled");
        self.decisions.push(Decision::Unplaced {
            task_id: task.id.clone(),
            title: task.title.clone(),
            duration_minutes: task.duration_minutes,
            score,
        });
        self.schedule.unscheduled_tasks.push(task.clone());
    }

    /// Place `task` at the start of `window` if it fits and overlaps nothing.
    fn try_window(
        &mut self,
        task: &Task,
        window: TimeWindow,
        source: WindowSource,
        score: f64,
        reason: &str,
    ) -> bool {
        let Some((start, end)) = window.placement_on(self.date, task.duration_minutes) else {
            return false;
        };
        let candidate = match ScheduledTask::new(task.clone(), start, end, reason) {
            Ok(candidate) => candidate,
            Err(e) => {
                warn!(task_id = %task.id, error = %e, "rejected placement");
                return false;
            }
        };

        match self.schedule.add_scheduled_task(candidate) {
            Ok(()) => {
                self.pool.consume(start.time(), end.time());
                debug!(task_id = %task.id, %start, %end, %source, score, "placed task");
                self.decisions.push(Decision::Placed {
                    task_id: task.id.clone(),
                    title: task.title.clone(),
                    start,
                    end,
                    score,
                    source,
                    reason: reason.to_string(),
                });
                true
            }
            Err(conflict) => {
                let warning = ConflictWarning::from(&conflict);
                warn!(task_id = %task.id, existing = %warning.existing_task_id, "{}", warning);
                self.decisions.push(Decision::Conflict(warning.clone()));
                self.warnings.push(warning);
                false
            }
        }
    }

    fn finish(mut self, pet: &Pet) -> ScheduleRun {
        self.schedule.sort_by_time();
        self.decisions.push(Decision::Finished {
            scheduled: self.schedule.scheduled_tasks().len(),
            unscheduled: self.schedule.unscheduled_tasks.len(),
            minutes_scheduled: self.schedule.total_minutes_scheduled(),
            utilization: self.schedule.get_utilization_rate(),
        });

        let mut run = ScheduleRun {
            schedule: self.schedule,
            decisions: self.decisions,
            warnings: self.warnings,
        };
        run.schedule.explanation = run.explanation();

        info!(
            pet_id = %pet.id,
            date = %run.schedule.date,
            scheduled = run.schedule.scheduled_tasks().len(),
            unscheduled = run.schedule.unscheduled_tasks.len(),
            warnings = run.warnings.len(),
            "generated schedule"
        );
        run
    }
}

/// `Priority: HIGH, Required, Overdue`
fn placement_reason(task: &Task, overdue: bool) -> String {
    let mut reason = format!("Priority: {}", task.priority);
    if task.required {
        reason.push_str(", Required");
    }
    if overdue {
        reason.push_str(", Overdue");
    }
    reason
}
