//! A pet and the care tasks it owns.

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CoreError, Result, ValidationError};
use crate::task::{self, Priority, Task};

/// A pet with its list of care tasks.
///
/// Task ids are unique within a pet; [`Pet::add_task`] enforces it, and
/// deserialization goes through the same checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPet")]
pub struct Pet {
    pub id: String,
    pub name: String,
    pub species: String,
    /// Owning owner's id, set by `Owner::add_pet`
    pub owner_id: Option<String>,
    tasks: Vec<Task>,
}

#[derive(Deserialize)]
struct RawPet {
    id: String,
    name: String,
    #[serde(default)]
    species: String,
    #[serde(default)]
    owner_id: Option<String>,
    #[serde(default)]
    tasks: Vec<Task>,
}

impl TryFrom<RawPet> for Pet {
    type Error = ValidationError;

    fn try_from(raw: RawPet) -> Result<Self, Self::Error> {
        let mut pet = Pet::new(raw.id, raw.name, raw.species)?;
        pet.owner_id = raw.owner_id;
        for task in raw.tasks {
            pet.add_task(task)?;
        }
        Ok(pet)
    }
}

impl Pet {
    /// # Errors
    /// Returns a [`ValidationError`] for a blank id or name.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        species: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let pet = Self {
            id: id.into(),
            name: name.into(),
            species: species.into(),
            owner_id: None,
            tasks: Vec::new(),
        };
        ValidationError::require_non_blank("id", &pet.id)?;
        ValidationError::require_non_blank("name", &pet.name)?;
        Ok(pet)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get_task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    pub fn get_task_mut(&mut self, task_id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == task_id)
    }

    /// Add a task, stamping it with this pet's id.
    ///
    /// # Errors
    /// Returns a [`ValidationError`] if the task is invalid or its id is
    /// already used on this pet.
    pub fn add_task(&mut self, mut task: Task) -> Result<(), ValidationError> {
        task.validate()?;
        if self.get_task(&task.id).is_some() {
            return Err(ValidationError::DuplicateId {
                collection: "Task",
                id: task.id,
            });
        }
        task.pet_id = Some(self.id.clone());
        self.tasks.push(task);
        Ok(())
    }

    /// Remove a task by id. Returns `false` if no task had that id.
    pub fn remove_task(&mut self, task_id: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != task_id);
        self.tasks.len() != before
    }

    /// Mark a task done now. See [`Pet::mark_task_complete_at`].
    pub fn mark_task_complete(&mut self, task_id: &str) -> Result<Option<Task>> {
        self.mark_task_complete_at(task_id, Local::now().naive_local())
    }

    /// Record a completion at `now`.
    ///
    /// Recurring tasks spawn a never-done successor which is appended to
    /// this pet's tasks and returned. `AsNeeded` tasks return `None`.
    ///
    /// # Errors
    /// Returns [`CoreError::NotFound`] if no task has `task_id`.
    pub fn mark_task_complete_at(&mut self, task_id: &str, now: NaiveDateTime) -> Result<Option<Task>> {
        let next_id = self.next_successor_id(task_id);
        let task = self
            .get_task_mut(task_id)
            .ok_or_else(|| CoreError::task_not_found(task_id))?;
        task.last_done = Some(now);

        if !task.recurrence.is_recurring() {
            debug!(task_id, "completed as-needed task, no successor");
            return Ok(None);
        }

        let successor = task.successor(next_id);
        debug!(task_id, successor_id = %successor.id, recurrence = %successor.recurrence, "spawned successor task");
        self.tasks.push(successor.clone());
        Ok(Some(successor))
    }

    /// `<base>_next_<n>` with `n` one past the highest counter in use.
    ///
    /// Once the counter space is exhausted the lowest free counter is used.
    fn next_successor_id(&self, task_id: &str) -> String {
        let base = task::base_id(task_id);
        let highest = self
            .tasks
            .iter()
            .filter_map(|t| task::successor_counter(&t.id, base))
            .max()
            .unwrap_or(0);
        let mut n = highest.checked_add(1).unwrap_or(1);
        let mut id = task::successor_id(base, n);
        while self.get_task(&id).is_some() {
            n = n.checked_add(1).unwrap_or(1);
            id = task::successor_id(base, n);
        }
        id
    }

    pub fn get_tasks_by_priority(&self, priority: Priority) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.priority == priority).collect()
    }

    pub fn get_required_tasks(&self) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.required).collect()
    }

    /// Tasks with a completion history.
    pub fn get_completed_tasks(&self) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.is_completed()).collect()
    }

    pub fn get_incomplete_tasks(&self) -> Vec<&Task> {
        self.tasks.iter().filter(|t| !t.is_completed()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Recurrence;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    fn pet() -> Pet {
        Pet::new("pet1", "Buddy", "Dog").unwrap()
    }

    fn task(id: &str) -> Task {
        Task::new(id, format!("Task {id}"), 15).unwrap()
    }

    #[test]
    fn add_task_increases_count_and_sets_pet_id() {
        let mut pet = pet();
        pet.add_task(task("task1")).unwrap();
        assert_eq!(pet.tasks().len(), 1);
        assert_eq!(pet.tasks()[0].pet_id.as_deref(), Some("pet1"));
    }

    #[test]
    fn duplicate_task_id_rejected() {
        let mut pet = pet();
        pet.add_task(task("task1")).unwrap();
        let err = pet.add_task(Task::new("task1", "Different Task", 20).unwrap()).unwrap_err();
        assert_eq!(err.to_string(), "Task with id task1 already exists");
        assert_eq!(pet.tasks().len(), 1);
    }

    #[test]
    fn add_task_revalidates() {
        let mut pet = pet();
        let mut bad = task("task1");
        bad.duration_minutes = 0;
        assert!(pet.add_task(bad).is_err());
        assert!(pet.tasks().is_empty());
    }

    #[test]
    fn remove_task_reports_outcome() {
        let mut pet = pet();
        pet.add_task(task("task1")).unwrap();
        assert!(pet.remove_task("task1"));
        assert!(pet.tasks().is_empty());
        assert!(!pet.remove_task("nonexistent_id"));
    }

    #[test]
    fn blank_identity_rejected() {
        assert!(Pet::new("", "Max", "Dog").is_err());
        assert!(Pet::new("pet1", "", "Dog").is_err());
    }

    #[test]
    fn completing_daily_task_spawns_successor() {
        let mut pet = pet();
        pet.add_task(task("daily_walk")).unwrap();

        let next = pet.mark_task_complete_at("daily_walk", now()).unwrap().unwrap();
        assert_eq!(next.id, "daily_walk_next_1");
        assert_eq!(next.last_done, None);
        assert_eq!(pet.tasks().len(), 2);
        assert_eq!(pet.get_task("daily_walk").unwrap().last_done, Some(now()));

        let third = pet.mark_task_complete_at("daily_walk_next_1", now()).unwrap().unwrap();
        assert_eq!(third.id, "daily_walk_next_2");
        let fourth = pet.mark_task_complete_at(&third.id, now()).unwrap().unwrap();
        assert_eq!(fourth.id, "daily_walk_next_3");
        assert_eq!(pet.tasks().len(), 4);
    }

    #[test]
    fn completing_original_again_never_reuses_a_suffix() {
        let mut pet = pet();
        pet.add_task(task("walk")).unwrap();
        pet.mark_task_complete_at("walk", now()).unwrap();
        let again = pet.mark_task_complete_at("walk", now()).unwrap().unwrap();
        assert_eq!(again.id, "walk_next_2");
    }

    #[test]
    fn as_needed_completion_does_not_grow_list() {
        let mut pet = pet();
        pet.add_task(task("bath").with_recurrence(Recurrence::AsNeeded)).unwrap();
        assert!(pet.mark_task_complete_at("bath", now()).unwrap().is_none());
        assert_eq!(pet.tasks().len(), 1);
        assert!(pet.get_task("bath").unwrap().is_completed());
    }

    #[test]
    fn completing_unknown_task_is_not_found() {
        let mut pet = pet();
        let err = pet.mark_task_complete_at("non_existent_task", now()).unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));
    }

    #[test]
    fn filters_preserve_insertion_order() {
        let mut pet = pet();
        pet.add_task(task("a").with_priority(Priority::High).with_required(true)).unwrap();
        pet.add_task(task("b").with_priority(Priority::Low).with_last_done(now())).unwrap();
        pet.add_task(task("c").with_priority(Priority::High)).unwrap();

        let ids = |tasks: Vec<&Task>| tasks.into_iter().map(|t| t.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(pet.get_tasks_by_priority(Priority::High)), vec!["a", "c"]);
        assert_eq!(ids(pet.get_required_tasks()), vec!["a"]);
        assert_eq!(ids(pet.get_completed_tasks()), vec!["b"]);
        assert_eq!(ids(pet.get_incomplete_tasks()), vec!["a", "c"]);
    }

    #[test]
    fn successor_counter_at_limit_restarts_at_lowest_free() {
        let mut pet = pet();
        pet.add_task(task("w")).unwrap();
        pet.add_task(task(&format!("w_next_{}", u32::MAX))).unwrap();
        pet.add_task(task("w_next_1")).unwrap();

        let next = pet
            .mark_task_complete_at(&format!("w_next_{}", u32::MAX), now())
            .unwrap()
            .unwrap();
        assert_eq!(next.id, "w_next_2");
    }

    #[test]
    fn deserialize_rejects_duplicate_task_ids() {
        let json = r#"{"id":"pet1","name":"Buddy","tasks":[
            {"id":"a","title":"Walk","duration_minutes":30},
            {"id":"a","title":"Feed","duration_minutes":10}
        ]}"#;
        let err = serde_json::from_str::<Pet>(json).unwrap_err();
        assert!(err.to_string().contains("Task with id a already exists"));
    }

    #[test]
    fn deserialize_rejects_invalid_tasks() {
        let too_short = format!(
            r#"{{"id":"pet1","name":"Buddy","tasks":[{{"id":"a","title":"Walk","duration_minutes":{}}}]}}"#,
            i64::MIN
        );
        assert!(serde_json::from_str::<Pet>(&too_short).is_err());

        let blank_title = r#"{"id":"pet1","name":"Buddy","tasks":[{"id":"a","title":"","duration_minutes":0}]}"#;
        assert!(serde_json::from_str::<Pet>(blank_title).is_err());
    }

    #[test]
    fn deserialize_rejects_blank_identity() {
        assert!(serde_json::from_str::<Pet>(r#"{"id":"","name":"Buddy"}"#).is_err());
        assert!(serde_json::from_str::<Pet>(r#"{"id":"pet1","name":"  "}"#).is_err());
    }

    #[test]
    fn deserialized_pet_stamps_its_tasks() {
        let json = r#"{"id":"pet1","name":"Buddy","species":"Dog",
            "tasks":[{"id":"a","title":"Walk","duration_minutes":30,"pet_id":"other"}]}"#;
        let pet: Pet = serde_json::from_str(json).unwrap();
        assert_eq!(pet.tasks().len(), 1);
        assert_eq!(pet.tasks()[0].pet_id.as_deref(), Some("pet1"));

        let back: Pet = serde_json::from_str(&serde_json::to_string(&pet).unwrap()).unwrap();
        assert_eq!(back, pet);
    }
}
