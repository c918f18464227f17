//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use pawpal_core::{Owner, Pet, Priority, Task, TimeWindow};

/// Route `tracing` output through the test harness. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("pawpal_core=debug")),
        )
        .with_test_writer()
        .try_init();
}

pub fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
}

pub fn at(h: u32, m: u32) -> NaiveDateTime {
    day().and_hms_opt(h, m, 0).unwrap()
}

pub fn window(start: (u32, u32), end: (u32, u32)) -> TimeWindow {
    TimeWindow::from_hm(start, end).unwrap()
}

pub fn owner_with(windows: Vec<TimeWindow>) -> Owner {
    Owner::new("owner1", "Jordan").unwrap().with_availability(windows)
}

pub fn pet_with(tasks: Vec<Task>) -> Pet {
    let mut pet = Pet::new("pet1", "Mochi", "Dog").unwrap();
    for task in tasks {
        pet.add_task(task).unwrap();
    }
    pet
}

pub fn task(id: &str, title: &str, minutes: i64, priority: Priority) -> Task {
    Task::new(id, title, minutes).unwrap().with_priority(priority)
}
