//! Free-window pool used during a single scheduling run.
//!
//! The pool starts as the owner's availability sorted by start time. After
//! every placement the consumed interval is carved out of the pool so the
//! leftover capacity on either side stays available to later tasks.

use chrono::NaiveTime;
use serde::Serialize;

use super::window::TimeWindow;

/// Ordered list of windows that are still free.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FreeWindowPool {
    windows: Vec<TimeWindow>,
}

impl FreeWindowPool {
    /// Build a pool, sorting by start time (stable for equal starts).
    pub fn new(windows: impl IntoIterator<Item = TimeWindow>) -> Self {
        Self {
            windows: normalize(windows),
        }
    }

    pub fn windows(&self) -> &[TimeWindow] {
        &self.windows
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimeWindow> {
        self.windows.iter()
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Sum of free minutes left in the pool.
    pub fn total_minutes(&self) -> i64 {
        self.windows.iter().map(TimeWindow::duration_minutes).sum()
    }

    /// Remove `[start, end]` from every free window it overlaps.
    ///
    /// Each affected window is replaced in place by its leftover pieces
    /// (before, then after), so the pool stays in relative order. Returns
    /// `true` if any window was touched.
    pub fn consume(&mut self, start: NaiveTime, end: NaiveTime) -> bool {
        let Ok(used) = TimeWindow::new(start, end) else {
            return false;
        };

        let mut carved = false;
        let mut i = 0;
        while i < self.windows.len() {
            let window = self.windows[i];
            if !window.overlaps(&used) {
                i += 1;
                continue;
            }

            let pieces: Vec<TimeWindow> = window.carve(start, end).into_iter().flatten().collect();
            let inserted = pieces.len();
            self.windows.splice(i..=i, pieces);
            i += inserted;
            carved = true;
        }
        carved
    }
}

/// Sort windows ascending by start time; equal starts keep input order.
pub fn normalize(windows: impl IntoIterator<Item = TimeWindow>) -> Vec<TimeWindow> {
    let mut windows: Vec<TimeWindow> = windows.into_iter().collect();
    windows.sort_by_key(TimeWindow::start);
    windows
}
