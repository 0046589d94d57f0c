// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Splitting the worker list into current and idle buckets.

use chrono::{DateTime, Duration, Utc};

use crate::status::Worker;

/// Workers silent for longer than this are listed separately as idle.
pub const STALE_AFTER_DAYS: i64 = 14;

/// Split workers into (current, idle) by last activity.
///
/// A worker with no `last_activity` was never heard from and goes to the idle
/// bucket. An absent or null worker list yields two empty buckets.
pub fn partition(
    workers: Option<Vec<Worker>>,
    now: DateTime<Utc>,
    stale_after: Duration,
) -> (Vec<Worker>, Vec<Worker>) {
    let mut current = Vec::new();
    let mut idle = Vec::new();

    for worker in workers.unwrap_or_default() {
        match worker.last_activity {
            Some(seen) if now - seen <= stale_after => current.push(worker),
            _ => idle.push(worker),
        }
    }

    (current, idle)
}

/// Drop selected IDs that are no longer in the current bucket.
///
/// Only current workers are selectable; a worker that went idle must not
/// stay selected, because it can no longer be unselected.
pub fn retain_selectable(selected: Vec<String>, current: &[Worker]) -> Vec<String> {
    selected.into_iter().filter(|id| current.iter().any(|w| &w.id == id)).collect()
}

#[cfg(test)]
#[path = "partition_tests.rs"]
mod tests;
