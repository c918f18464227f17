//! Time-of-day windows.
//!
//! A [`TimeWindow`] is a validated `[start, end]` interval within a single
//! day, at minute precision. Owners declare their availability with
//! windows, tasks declare preferred windows, and the scheduler's free pool
//! is a list of them.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A validated interval of time-of-day.
///
/// `start < end` always holds; the duration is computed once at
/// construction. Windows are never mutated after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawTimeWindow", into = "RawTimeWindow")]
pub struct TimeWindow {
    start: NaiveTime,
    end: NaiveTime,
    duration_minutes: i64,
}

/// Wire form of a window, validated on the way in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RawTimeWindow {
    start: NaiveTime,
    end: NaiveTime,
}

impl TryFrom<RawTimeWindow> for TimeWindow {
    type Error = ValidationError;

    fn try_from(raw: RawTimeWindow) -> Result<Self, Self::Error> {
        TimeWindow::new(raw.start, raw.end)
    }
}

impl From<TimeWindow> for RawTimeWindow {
    fn from(window: TimeWindow) -> Self {
        Self {
            start: window.start,
            end: window.end,
        }
    }
}

fn truncate_to_minute(t: NaiveTime) -> NaiveTime {
    NaiveTime::from_hms_opt(t.hour(), t.minute(), 0).unwrap_or(t)
}

impl TimeWindow {
    /// Create a window, truncating both bounds to the minute.
    ///
    /// # Errors
    /// Returns [`ValidationError::InvalidTimeRange`] unless `start < end`.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, ValidationError> {
        let start = truncate_to_minute(start);
        let end = truncate_to_minute(end);
        if start >= end {
            return Err(ValidationError::InvalidTimeRange { start, end });
        }

        Ok(Self {
            start,
            end,
            duration_minutes: (end - start).num_minutes(),
        })
    }

    /// Create a window from `(hour, minute)` pairs.
    pub fn from_hm(start: (u32, u32), end: (u32, u32)) -> Result<Self, ValidationError> {
        let parse = |field: &str, (h, m): (u32, u32)| {
            NaiveTime::from_hms_opt(h, m, 0)
                .ok_or_else(|| ValidationError::invalid(field, format!("{h:02}:{m:02} is not a time of day")))
        };
        Self::new(parse("start", start)?, parse("end", end)?)
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }

    /// Whole minutes between start and end.
    pub fn duration_minutes(&self) -> i64 {
        self.duration_minutes
    }

    /// Closed-interval containment: both bounds are inside the window.
    pub fn contains(&self, t: NaiveTime) -> bool {
        self.start <= t && t <= self.end
    }

    /// Whether the two windows share more than a single boundary point.
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        !(self.end <= other.start || other.end <= self.start)
    }

    /// Check if a task of `minutes` can fit in this window
    pub fn fits_task(&self, minutes: i64) -> bool {
        self.duration_minutes >= minutes
    }

    /// Split the window at `t`.
    ///
    /// Returns `(Some(self), None)` when `t` lies outside the window.
    /// Otherwise returns the pieces before and after `t`, omitting a side
    /// that would be empty.
    pub fn split_at(&self, t: NaiveTime) -> (Option<TimeWindow>, Option<TimeWindow>) {
        if !self.contains(t) {
            return (Some(*self), None);
        }
        (
            TimeWindow::new(self.start, t).ok(),
            TimeWindow::new(t, self.end).ok(),
        )
    }

    /// What is left of this window after removing `[start, end]`.
    ///
    /// Pieces are returned in chronological order; empty pieces are `None`.
    pub fn carve(&self, start: NaiveTime, end: NaiveTime) -> [Option<TimeWindow>; 2] {
        let before = if self.start < start {
            TimeWindow::new(self.start, start.min(self.end)).ok()
        } else {
            None
        };
        let after = if end < self.end {
            TimeWindow::new(end.max(self.start), self.end).ok()
        } else {
            None
        };
        [before, after]
    }

    /// Anchor the window on a calendar date.
    pub fn on(&self, date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
        (date.and_time(self.start), date.and_time(self.end))
    }

    /// Concrete placement of `minutes` starting at the window's start.
    ///
    /// Returns `None` when the window cannot hold the task or `minutes` is
    /// not positive.
    pub fn placement_on(&self, date: NaiveDate, minutes: i64) -> Option<(NaiveDateTime, NaiveDateTime)> {
        if minutes <= 0 || !self.fits_task(minutes) {
            return None;
        }
        let (start, window_end) = self.on(date);
        let end = start + Duration::minutes(minutes);
        (end <= window_end).then_some((start, end))
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn w(start: (u32, u32), end: (u32, u32)) -> TimeWindow {
        TimeWindow::from_hm(start, end).unwrap()
    }

    #[test]
    fn duration_is_wall_clock_difference() {
        assert_eq!(w((9, 0), (11, 30)).duration_minutes(), 150);
    }

    #[test]
    fn rejects_inverted_and_empty_windows() {
        assert!(matches!(
            TimeWindow::new(t(14, 0), t(10, 0)),
            Err(ValidationError::InvalidTimeRange { .. })
        ));
        assert!(TimeWindow::new(t(10, 0), t(10, 0)).is_err());
    }

    #[test]
    fn seconds_are_truncated() {
        let window = TimeWindow::new(
            NaiveTime::from_hms_opt(9, 0, 45).unwrap(),
            NaiveTime::from_hms_opt(9, 30, 10).unwrap(),
        )
        .unwrap();
        assert_eq!(window.start(), t(9, 0));
        assert_eq!(window.duration_minutes(), 30);
    }

    #[test]
    fn fits_task_boundaries() {
        let window = w((9, 0), (10, 0));
        assert!(window.fits_task(30));
        assert!(window.fits_task(60));
        assert!(!window.fits_task(90));
    }

    #[test]
    fn contains_is_closed_on_both_ends() {
        let window = w((9, 0), (10, 0));
        assert!(window.contains(t(9, 0)));
        assert!(window.contains(t(10, 0)));
        assert!(!window.contains(t(10, 1)));
    }

    #[test]
    fn touching_windows_do_not_overlap() {
        let a = w((9, 0), (11, 0));
        let b = w((10, 0), (12, 0));
        let c = w((11, 0), (12, 0));
        let d = w((14, 0), (16, 0));
        assert!(a.overlaps(&b) && b.overlaps(&a));
        assert!(!a.overlaps(&c) && !c.overlaps(&a));
        assert!(!a.overlaps(&d));
    }

    #[test]
    fn split_inside_and_outside() {
        let window = w((9, 0), (10, 0));
        assert_eq!(
            window.split_at(t(9, 20)),
            (Some(w((9, 0), (9, 20))), Some(w((9, 20), (10, 0))))
        );
        assert_eq!(window.split_at(t(9, 0)), (None, Some(window)));
        assert_eq!(window.split_at(t(10, 0)), (Some(window), None));
        assert_eq!(window.split_at(t(11, 0)), (Some(window), None));
    }

    #[test]
    fn carve_leaves_pieces_on_both_sides() {
        let window = w((9, 0), (12, 0));
        assert_eq!(
            window.carve(t(10, 0), t(10, 30)),
            [Some(w((9, 0), (10, 0))), Some(w((10, 30), (12, 0)))]
        );
        assert_eq!(window.carve(t(9, 0), t(12, 0)), [None, None]);
        assert_eq!(window.carve(t(8, 0), t(9, 30)), [None, Some(w((9, 30), (12, 0)))]);
    }

    #[test]
    fn placement_respects_window_end() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let window = w((9, 0), (10, 0));
        let (start, end) = window.placement_on(date, 60).unwrap();
        assert_eq!(start, date.and_time(t(9, 0)));
        assert_eq!(end, date.and_time(t(10, 0)));
        assert!(window.placement_on(date, 61).is_none());
    }

    #[test]
    fn placement_rejects_non_positive_minutes() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let window = w((9, 0), (10, 0));
        for minutes in [0, -30, i64::MIN] {
            assert!(window.placement_on(date, minutes).is_none());
        }
    }

    #[test]
    fn deserializing_validates() {
        let ok: TimeWindow = serde_json::from_str(r#"{"start":"07:00:00","end":"08:00:00"}"#).unwrap();
        assert_eq!(ok.duration_minutes(), 60);
        let bad = serde_json::from_str::<TimeWindow>(r#"{"start":"08:00:00","end":"07:00:00"}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn display_uses_clock_format() {
        assert_eq!(w((7, 5), (8, 0)).to_string(), "07:05-08:00");
    }
}
