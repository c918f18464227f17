//! A pet owner: availability windows and the pets they care for.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::pet::Pet;
use crate::error::ValidationError;
use crate::task::Task;
use crate::timeline::TimeWindow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawOwner")]
pub struct Owner {
    pub id: String,
    pub name: String,
    /// Informational label only; no timezone arithmetic is done
    pub timezone: Option<String>,
    /// Daily availability, reused for every date
    pub availability: Vec<TimeWindow>,
    pets: Vec<Pet>,
}

#[derive(Deserialize)]
struct RawOwner {
    id: String,
    name: String,
    #[serde(default)]
    timezone: Option<String>,
    #[serde(default)]
    availability: Vec<TimeWindow>,
    #[serde(default)]
    pets: Vec<Pet>,
}

/// A decoded owner holding the same pet id twice is rejected rather than
/// deduplicated.
impl TryFrom<RawOwner> for Owner {
    type Error = ValidationError;

    fn try_from(raw: RawOwner) -> Result<Self, Self::Error> {
        let mut owner = Owner::new(raw.id, raw.name)?.with_availability(raw.availability);
        owner.timezone = raw.timezone;
        for pet in raw.pets {
            let id = pet.id.clone();
            if !owner.add_pet(pet) {
                return Err(ValidationError::DuplicateId {
                    collection: "Pet",
                    id,
                });
            }
        }
        Ok(owner)
    }
}

impl Owner {
    /// # Errors
    /// Returns a [`ValidationError`] for a blank id or name.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Result<Self, ValidationError> {
        let owner = Self {
            id: id.into(),
            name: name.into(),
            timezone: None,
            availability: Vec::new(),
            pets: Vec::new(),
        };
        ValidationError::require_non_blank("id", &owner.id)?;
        ValidationError::require_non_blank("name", &owner.name)?;
        Ok(owner)
    }

    pub fn with_availability(mut self, windows: impl IntoIterator<Item = TimeWindow>) -> Self {
        self.availability.extend(windows);
        self
    }

    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }

    /// Availability for `date`.
    ///
    /// The same windows apply to every date for now; per-date overrides
    /// (holidays, weekday patterns) would hook in here.
    pub fn get_availability(&self, _date: NaiveDate) -> Vec<TimeWindow> {
        self.availability.clone()
    }

    pub fn pets(&self) -> &[Pet] {
        &self.pets
    }

    pub fn get_pet(&self, pet_id: &str) -> Option<&Pet> {
        self.pets.iter().find(|p| p.id == pet_id)
    }

    pub fn get_pet_mut(&mut self, pet_id: &str) -> Option<&mut Pet> {
        self.pets.iter_mut().find(|p| p.id == pet_id)
    }

    /// Take ownership of a pet and point it back at this owner.
    ///
    /// Adding a pet whose id is already present is a no-op and returns
    /// `false`.
    pub fn add_pet(&mut self, mut pet: Pet) -> bool {
        if self.get_pet(&pet.id).is_some() {
            return false;
        }
        pet.owner_id = Some(self.id.clone());
        self.pets.push(pet);
        true
    }

    /// Remove a pet, clearing its back-reference.
    pub fn remove_pet(&mut self, pet_id: &str) -> Option<Pet> {
        let idx = self.pets.iter().position(|p| p.id == pet_id)?;
        let mut pet = self.pets.remove(idx);
        pet.owner_id = None;
        Some(pet)
    }

    /// Tasks of the first pet called `name`, empty if there is none.
    pub fn get_tasks_by_pet_name(&self, name: &str) -> Vec<&Task> {
        self.pets
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.tasks().iter().collect())
            .unwrap_or_default()
    }
}
