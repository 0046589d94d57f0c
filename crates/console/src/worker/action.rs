// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker control actions.
//!
//! A closed set of variants with an exhaustive availability predicate and an
//! exact wire payload per variant. Availability rules match the dashboard's:
//! an action that would bring the worker to a status it already has (or has
//! already requested) is not offered.

use serde::Serialize;

use crate::status::{Worker, WorkerStatus};

/// Everything the console can ask a worker to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerAction {
    /// Shut down after the current task finishes.
    ShutdownLazy,
    /// Shut down immediately.
    ShutdownImmediate,
    /// Sleep after the current task finishes.
    SleepLazy,
    /// Sleep immediately.
    SleepImmediate,
    /// Wake a sleeping worker.
    WakeUp,
    /// Acknowledge a worker's timeout state.
    AckTimeout,
    /// Send a test job; requires the worker to be in test mode.
    SendTestJob,
    /// Erase the worker from the manager.
    ForgetWorker,
    /// Remove one blacklist entry from the worker.
    ForgetBlacklistLine { job_id: String, task_type: String },
}

impl WorkerAction {
    /// The JSON body POSTed to `/worker-action/{workerID}`.
    pub fn payload(&self) -> ActionPayload {
        match self {
            Self::ShutdownLazy => ActionPayload::Shutdown { lazy: true },
            Self::ShutdownImmediate => ActionPayload::Shutdown { lazy: false },
            Self::SleepLazy => {
                ActionPayload::SetStatus { status: TargetStatus::Asleep, lazy: Some(true) }
            }
            Self::SleepImmediate => {
                ActionPayload::SetStatus { status: TargetStatus::Asleep, lazy: Some(false) }
            }
            Self::WakeUp => ActionPayload::SetStatus { status: TargetStatus::Awake, lazy: None },
            Self::AckTimeout => ActionPayload::AckTimeout,
            Self::SendTestJob => ActionPayload::SendTestJob,
            Self::ForgetWorker => ActionPayload::ForgetWorker,
            Self::ForgetBlacklistLine { job_id, task_type } => ActionPayload::ForgetBlacklistLine {
                job_id: job_id.clone(),
                task_type: task_type.clone(),
            },
        }
    }

    /// Whether this action makes sense for a worker in `status`, possibly
    /// with another status already requested.
    pub fn available(&self, status: WorkerStatus, requested: Option<WorkerStatus>) -> bool {
        use WorkerStatus::{Asleep, Testing, Timeout};
        match self {
            // Shutdown is a bulk-selection action, never offered per worker.
            Self::ShutdownLazy | Self::ShutdownImmediate => false,
            Self::SleepLazy => {
                status != Timeout && status != Asleep && requested != Some(Asleep)
            }
            Self::SleepImmediate => requested == Some(Asleep) && status != Asleep,
            Self::WakeUp => status == Asleep || requested == Some(Asleep),
            Self::AckTimeout => status == Timeout,
            Self::SendTestJob => status == Testing,
            Self::ForgetWorker | Self::ForgetBlacklistLine { .. } => true,
        }
    }

    /// Per-worker action list, in display order.
    pub fn actions_for(worker: &Worker) -> Vec<WorkerAction> {
        [
            Self::ShutdownLazy,
            Self::ShutdownImmediate,
            Self::SleepLazy,
            Self::SleepImmediate,
            Self::WakeUp,
            Self::AckTimeout,
            Self::SendTestJob,
        ]
        .into_iter()
        .filter(|action| action.available(worker.status, worker.status_requested))
        .collect()
    }
}

/// Wire payload for a worker action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum ActionPayload {
    Shutdown {
        lazy: bool,
    },
    SetStatus {
        status: TargetStatus,
        #[serde(skip_serializing_if = "Option::is_none")]
        lazy: Option<bool>,
    },
    AckTimeout,
    SendTestJob,
    ForgetWorker,
    ForgetBlacklistLine {
        job_id: String,
        task_type: String,
    },
}

/// Status a `set-status` action steers the worker toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetStatus {
    Asleep,
    Awake,
}

#[cfg(test)]
#[path = "action_tests.rs"]
mod tests;
