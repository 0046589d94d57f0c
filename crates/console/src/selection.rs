// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persisted UI state: the worker selection and the show-schedule flag.

use std::path::PathBuf;

use crate::persist::write_atomic;

const SELECTION_FILE: &str = "selected_workers.json";
const SHOW_SCHEDULE_FILE: &str = "show_schedule";

/// File-backed counterpart of the dashboard's local storage.
pub struct SelectionStore {
    dir: PathBuf,
}

impl SelectionStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Load the selected worker IDs. A corrupt entry is removed and treated
    /// as empty; it must never take the poll loop down.
    pub fn load_selected(&self) -> Vec<String> {
        let path = self.dir.join(SELECTION_FILE);
        let Ok(contents) = std::fs::read_to_string(&path) else {
            return Vec::new();
        };
        match serde_json::from_str(&contents) {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!(err = %e, "corrupt worker selection, clearing");
                let _ = std::fs::remove_file(&path);
                Vec::new()
            }
        }
    }

    /// Store the selected worker IDs; an empty selection removes the entry.
    pub fn save_selected(&self, ids: &[String]) {
        let path = self.dir.join(SELECTION_FILE);
        if ids.is_empty() {
            let _ = std::fs::remove_file(&path);
            return;
        }
        match serde_json::to_vec(ids) {
            Ok(json) => {
                if let Err(e) = write_atomic(&path, &json) {
                    tracing::warn!(err = %e, "failed to persist worker selection");
                }
            }
            Err(e) => tracing::warn!(err = %e, "failed to encode worker selection"),
        }
    }

    /// Whether sleep schedules should be shown.
    pub fn show_schedule(&self) -> bool {
        self.dir.join(SHOW_SCHEDULE_FILE).exists()
    }

    pub fn set_show_schedule(&self, show: bool) {
        let path = self.dir.join(SHOW_SCHEDULE_FILE);
        if show {
            if let Err(e) = write_atomic(&path, b"true") {
                tracing::warn!(err = %e, "failed to persist show-schedule flag");
            }
        } else {
            let _ = std::fs::remove_file(&path);
        }
    }
}

#[cfg(test)]
#[path = "selection_tests.rs"]
mod tests;
