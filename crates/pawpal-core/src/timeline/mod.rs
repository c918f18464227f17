//! Time-of-day windows and the free-window pool.
//!
//! This module provides:
//! - [`TimeWindow`], the validated interval used for availability and
//!   preferred windows
//! - [`FreeWindowPool`], the working pool the scheduler fragments as it
//!   places tasks

mod pool;
mod window;

pub use pool::{normalize, FreeWindowPool};
pub use window::TimeWindow;
