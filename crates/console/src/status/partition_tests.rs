// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use chrono::Utc;

use super::*;
use crate::status::WorkerStatus;

fn worker(id: &str, last_activity: Option<chrono::DateTime<Utc>>) -> Worker {
    Worker {
        id: id.to_owned(),
        nickname: id.to_owned(),
        address: String::new(),
        status: WorkerStatus::Awake,
        status_requested: None,
        current_task: None,
        current_job: None,
        current_task_updated: None,
        last_activity,
        software: None,
        sleep_schedule: None,
        blacklist: Vec::new(),
    }
}

fn stale_after() -> Duration {
    Duration::days(STALE_AFTER_DAYS)
}

#[test]
fn buckets_by_last_activity() -> anyhow::Result<()> {
    let now = Utc::now();
    let workers = vec![
        worker("never-seen", None),
        worker("old", Some(now - Duration::days(20))),
        worker("fresh", Some(now - Duration::hours(1))),
    ];

    let (current, idle) = partition(Some(workers), now, stale_after());

    let current_ids: Vec<&str> = current.iter().map(|w| w.id.as_str()).collect();
    let idle_ids: Vec<&str> = idle.iter().map(|w| w.id.as_str()).collect();
    assert_eq!(current_ids, ["fresh"]);
    assert_eq!(idle_ids, ["never-seen", "old"]);
    Ok(())
}

#[test]
fn absent_worker_list_yields_empty_buckets() -> anyhow::Result<()> {
    let (current, idle) = partition(None, Utc::now(), stale_after());
    assert!(current.is_empty());
    assert!(idle.is_empty());
    Ok(())
}

#[test]
fn selection_drops_workers_that_went_idle() -> anyhow::Result<()> {
    let now = Utc::now();
    let current = vec![worker("kept", Some(now))];

    let selected = vec!["kept".to_owned(), "gone".to_owned()];
    assert_eq!(retain_selectable(selected, &current), ["kept"]);
    Ok(())
}
