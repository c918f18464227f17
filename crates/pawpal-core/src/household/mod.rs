//! Owners and pets.
//!
//! An [`Owner`] owns its pets and a [`Pet`] owns its tasks. The reverse
//! links (`Pet::owner_id`, `Task::pet_id`) are plain ids.

mod owner;
mod pet;

pub use owner::Owner;
pub use pet::Pet;
