// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire types for the manager's status snapshot.
//!
//! Every payload field the console reads is declared here and validated on
//! receipt; unknown fields are ignored, absent ones default, so partial
//! payloads from older managers still parse.

pub mod partition;
pub mod poller;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::worker::schedule::SleepSchedule;

/// Status snapshot returned by `GET /as-json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ManagerStatus {
    #[serde(default)]
    pub nr_of_workers: u32,
    #[serde(default)]
    pub nr_of_tasks: u32,
    #[serde(default)]
    pub upstream_queue_size: u32,
    #[serde(default = "unknown")]
    pub version: String,
    #[serde(default)]
    pub server: ServerInfo,
    #[serde(default = "default_manager_name")]
    pub manager_name: String,
    #[serde(default)]
    pub manager_mode: String,
    /// Absent or null means "no workers", never an error.
    #[serde(default)]
    pub workers: Option<Vec<Worker>>,
    #[serde(default)]
    pub dynamic_pools: Option<DynamicPoolPlatforms>,
}

/// The upstream server this manager is linked to.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerInfo {
    #[serde(default = "unknown")]
    pub name: String,
    #[serde(default)]
    pub url: String,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self { name: unknown(), url: String::new() }
    }
}

/// One render-farm worker as reported by the manager.
#[derive(Debug, Clone, Deserialize)]
pub struct Worker {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub nickname: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub status: WorkerStatus,
    #[serde(default)]
    pub status_requested: Option<WorkerStatus>,
    #[serde(default)]
    pub current_task: Option<String>,
    #[serde(default)]
    pub current_job: Option<String>,
    #[serde(default)]
    pub current_task_updated: Option<DateTime<Utc>>,
    /// Missing means the worker was never heard from.
    #[serde(default)]
    pub last_activity: Option<DateTime<Utc>>,
    #[serde(default)]
    pub software: Option<String>,
    #[serde(default)]
    pub sleep_schedule: Option<SleepSchedule>,
    #[serde(default)]
    pub blacklist: Vec<BlacklistEntry>,
}

impl Worker {
    /// Software name with the default worker prefix stripped; the version
    /// suffix is kept.
    pub fn software_label(&self) -> String {
        match &self.software {
            Some(software) => software.replace("Render-Worker/", ""),
            None => "-unknown-".to_owned(),
        }
    }
}

/// Closed set of worker states. `Unknown` absorbs states introduced by newer
/// managers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerStatus {
    Starting,
    Awake,
    Asleep,
    Offline,
    Shutdown,
    Timeout,
    Error,
    Testing,
    #[default]
    #[serde(other)]
    Unknown,
}

impl WorkerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Starting => "starting",
            Self::Awake => "awake",
            Self::Asleep => "asleep",
            Self::Offline => "offline",
            Self::Shutdown => "shutdown",
            Self::Timeout => "timeout",
            Self::Error => "error",
            Self::Testing => "testing",
            Self::Unknown => "unknown",
        }
    }
}

/// A failed job/task-type combination the worker refuses to run.
#[derive(Debug, Clone, Deserialize)]
pub struct BlacklistEntry {
    pub job_id: String,
    pub task_type: String,
    #[serde(rename = "_created", default)]
    pub created: Option<DateTime<Utc>>,
}

/// Dynamic worker pools, keyed by platform name then pool ID.
pub type DynamicPoolPlatforms =
    std::collections::BTreeMap<String, std::collections::BTreeMap<String, DynamicPool>>;

#[derive(Debug, Clone, Deserialize)]
pub struct DynamicPool {
    #[serde(rename = "ID", default)]
    pub id: String,
    #[serde(rename = "allocationState", default)]
    pub allocation_state: String,
    #[serde(rename = "currentSize", default)]
    pub current_size: PoolSize,
    #[serde(rename = "desiredSize", default)]
    pub desired_size: PoolSize,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, serde::Serialize)]
pub struct PoolSize {
    #[serde(rename = "dedicatedNodes", default)]
    pub dedicated_nodes: i64,
    #[serde(rename = "lowPriorityNodes", default)]
    pub low_priority_nodes: i64,
}

impl PoolSize {
    pub fn node_count(&self) -> i64 {
        self.dedicated_nodes + self.low_priority_nodes
    }
}

fn unknown() -> String {
    "unknown".to_owned()
}

fn default_manager_name() -> String {
    "Render Manager".to_owned()
}
