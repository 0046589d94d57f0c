// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rendering seam.
//!
//! The actual dashboard tables live elsewhere; the poller only hands a
//! partitioned snapshot (or an error line) to whatever view is plugged in.

use chrono::{DateTime, Utc};

use crate::status::{ManagerStatus, Worker};
use crate::worker::WorkerAction;

/// A status payload after partitioning and selection pruning.
#[derive(Debug, Clone)]
pub struct StatusSnapshot {
    pub info: ManagerStatus,
    pub current: Vec<Worker>,
    pub idle: Vec<Worker>,
    pub selected: Vec<String>,
    pub show_schedule: bool,
}

/// Where poll results land.
pub trait StatusView: Send {
    fn render(&mut self, snapshot: &StatusSnapshot);
    fn render_error(&mut self, message: &str);
}

/// Plain-text view for the headless watch loop.
#[derive(Debug, Default)]
pub struct TextView {
    last_error: Option<String>,
}

impl TextView {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StatusView for TextView {
    fn render(&mut self, snapshot: &StatusSnapshot) {
        if self.last_error.take().is_some() {
            println!("recovered, manager reachable again");
        }

        let info = &snapshot.info;
        println!(
            "{} {} — {} workers, {} tasks, upstream queue {}",
            info.manager_name,
            info.version,
            info.nr_of_workers,
            info.nr_of_tasks,
            info.upstream_queue_size,
        );

        let now = Utc::now();
        for worker in &snapshot.current {
            let marker = if snapshot.selected.contains(&worker.id) { "*" } else { " " };
            println!(
                " {marker} {:<20} {:<9} last seen {:<14} {}",
                worker.nickname,
                worker.status.as_str(),
                relative_time(worker.last_activity, now),
                describe_actions(worker),
            );
            if snapshot.show_schedule {
                if let Some(schedule) = &worker.sleep_schedule {
                    println!("       sleeps {}", describe_schedule(schedule));
                }
            }
        }
        if !snapshot.idle.is_empty() {
            println!("   ({} idle workers not shown)", snapshot.idle.len());
        }
    }

    fn render_error(&mut self, message: &str) {
        // Repeating the same line every retry would drown the log.
        if self.last_error.as_deref() != Some(message) {
            eprintln!("{message}");
            self.last_error = Some(message.to_owned());
        }
    }
}

fn describe_actions(worker: &Worker) -> String {
    let actions = WorkerAction::actions_for(worker);
    if actions.is_empty() {
        return String::new();
    }
    let names: Vec<&str> = actions
        .iter()
        .map(|a| match a {
            WorkerAction::ShutdownLazy => "shutdown-lazy",
            WorkerAction::ShutdownImmediate => "shutdown",
            WorkerAction::SleepLazy => "sleep-lazy",
            WorkerAction::SleepImmediate => "sleep",
            WorkerAction::WakeUp => "wake",
            WorkerAction::AckTimeout => "ack-timeout",
            WorkerAction::SendTestJob => "test-job",
            WorkerAction::ForgetWorker | WorkerAction::ForgetBlacklistLine { .. } => "forget",
        })
        .collect();
    format!("[{}]", names.join(" "))
}

/// One-line rendering of a sleep schedule.
pub fn describe_schedule(schedule: &crate::worker::SleepSchedule) -> String {
    if !schedule.schedule_active {
        return "never (schedule inactive)".to_owned();
    }
    let days = if schedule.days_of_week.is_empty() {
        "every day"
    } else {
        schedule.days_of_week.as_str()
    };
    match (&schedule.time_start, &schedule.time_end) {
        (Some(start), Some(end)) => format!("{days} {start}-{end}"),
        (Some(start), None) => format!("{days} from {start}"),
        (None, Some(end)) => format!("{days} until {end}"),
        (None, None) => format!("{days} all day"),
    }
}

/// Human-readable time since `timestamp`, bucketed like the dashboard.
pub fn relative_time(timestamp: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(timestamp) = timestamp else {
        return "never".to_owned();
    };

    let millis = (now - timestamp).num_milliseconds();
    if millis < 1_000 {
        return "just now".to_owned();
    }
    if millis < 60_000 {
        return format!("{} sec ago", round_div(millis, 1_000));
    }
    if millis < 3_600_000 {
        return format!("{} min ago", round_div(millis, 60_000));
    }
    if millis < 2 * 24 * 3_600_000 {
        return format!("{} hours ago", round_div(millis, 3_600_000));
    }

    timestamp.format("%e %b %Y").to_string().trim_start().to_owned()
}

fn round_div(n: i64, d: i64) -> i64 {
    (n + d / 2) / d
}

#[cfg(test)]
#[path = "view_tests.rs"]
mod tests;
