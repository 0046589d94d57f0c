// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use crate::status::poller::PollIntervals;

/// Configuration for the console.
#[derive(Debug, Clone, clap::Args)]
pub struct ConsoleConfig {
    /// Base URL of the render-farm manager.
    #[arg(long, default_value = "http://localhost:8083", env = "RENDERDECK_MANAGER_URL")]
    pub manager_url: String,

    /// Directory for persisted state (token mirror, worker selection).
    #[arg(long, env = "RENDERDECK_STATE_DIR")]
    pub state_dir: Option<PathBuf>,

    /// Poll delay after a successful status fetch, in milliseconds.
    #[arg(long, default_value_t = 2000, env = "RENDERDECK_POLL_OK_MS")]
    pub poll_ok_ms: u64,

    /// Poll delay after a failed status fetch, in milliseconds.
    #[arg(long, default_value_t = 10000, env = "RENDERDECK_POLL_ERROR_MS")]
    pub poll_error_ms: u64,

    /// Poll delay once a fresh token arrives, in milliseconds.
    #[arg(long, default_value_t = 250, env = "RENDERDECK_POLL_TOKEN_RETRY_MS")]
    pub poll_token_retry_ms: u64,

    /// Poll delay after a failed token handshake, in milliseconds.
    #[arg(long, default_value_t = 5000, env = "RENDERDECK_POLL_TOKEN_ERROR_MS")]
    pub poll_token_error_ms: u64,

    /// Workers silent for longer than this many days are listed as idle.
    #[arg(long, default_value_t = 14, env = "RENDERDECK_STALE_DAYS")]
    pub stale_days: i64,

    /// Also follow the latest-rendered-image stream while watching.
    #[arg(long, env = "RENDERDECK_WATCH_IMAGES")]
    pub watch_images: bool,

    /// Show sleep schedules in the worker listing; remembered across runs.
    #[arg(long, conflicts_with = "hide_schedules")]
    pub show_schedules: bool,

    /// Stop showing sleep schedules; remembered across runs.
    #[arg(long)]
    pub hide_schedules: bool,

    /// Log filter (tracing env-filter syntax).
    #[arg(long, default_value = "info", env = "RENDERDECK_LOG_LEVEL")]
    pub log_level: String,

    /// Log format: text or json.
    #[arg(long, default_value = "text", env = "RENDERDECK_LOG_FORMAT")]
    pub log_format: String,
}

impl ConsoleConfig {
    pub fn intervals(&self) -> PollIntervals {
        PollIntervals {
            ok: std::time::Duration::from_millis(self.poll_ok_ms),
            error: std::time::Duration::from_millis(self.poll_error_ms),
            token_retry: std::time::Duration::from_millis(self.poll_token_retry_ms),
            token_error: std::time::Duration::from_millis(self.poll_token_error_ms),
        }
    }

    pub fn stale_after(&self) -> chrono::Duration {
        chrono::Duration::days(self.stale_days)
    }

    pub fn state_dir(&self) -> PathBuf {
        self.state_dir.clone().unwrap_or_else(crate::persist::state_dir)
    }
}
