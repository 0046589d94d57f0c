// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker sleep schedules.

use serde::{Deserialize, Serialize};

/// A worker's sleep schedule as exchanged with the manager.
///
/// Time-of-day fields are "HH:MM" strings; the manager rejects empty strings,
/// so they must be omitted entirely when unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SleepSchedule {
    #[serde(default)]
    pub schedule_active: bool,
    /// Space-separated day abbreviations, e.g. "mo tu we th fr".
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub days_of_week: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_end: Option<String>,
}

impl SleepSchedule {
    /// Copy with empty time-of-day fields erased, so they serialize as
    /// omitted keys instead of empty strings.
    pub fn normalized(&self) -> Self {
        let mut schedule = self.clone();
        schedule.time_start = schedule.time_start.filter(|t| !t.is_empty());
        schedule.time_end = schedule.time_end.filter(|t| !t.is_empty());
        schedule
    }
}

#[cfg(test)]
#[path = "schedule_tests.rs"]
mod tests;
