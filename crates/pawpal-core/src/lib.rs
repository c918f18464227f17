//! # PawPal Core Library
//!
//! Daily care planning for pets. An [`Owner`] keeps pets and a daily
//! availability; each [`Pet`] keeps its care [`Task`]s. The [`Scheduler`]
//! scores the tasks and packs them greedily into free time, producing a
//! [`Schedule`] together with a human-readable decision transcript.
//!
//! ## Architecture
//!
//! - **Timeline**: [`TimeWindow`] intervals and the [`FreeWindowPool`] that
//!   fragments as tasks are placed
//! - **Household**: owners, pets and their task lists
//! - **Scheduler**: scoring, ordering, placement and conflict reporting
//! - **Storage**: TOML-based configuration of the scoring weights
//!
//! The library emits `tracing` events but never installs a subscriber.

pub mod error;
pub mod household;
pub mod schedule;
pub mod scheduler;
pub mod storage;
pub mod task;
pub mod timeline;

pub use error::{ConfigError, CoreError, Result, ValidationError};
pub use household::{Owner, Pet};
pub use schedule::{Schedule, ScheduleConflict, ScheduledTask};
pub use scheduler::{
    ConflictWarning, Decision, ScheduleRun, Scheduler, ScoreBreakdown, ScoreWeights, TaskScorer,
    WindowSource,
};
pub use storage::Config;
pub use task::{Priority, Recurrence, Task};
pub use timeline::{FreeWindowPool, TimeWindow};
