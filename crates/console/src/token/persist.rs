// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persisted token mirror.
//!
//! The browser dashboard mirrors the token into a cookie with a fixed 1-day
//! expiry; the token itself is way shorter lived than that. The mirror is a
//! convenience cache only — a stale token is caught by the 401 path, never by
//! a client-side timer.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::persist::write_atomic;

/// Fixed mirror lifetime: one day, independent of actual token validity.
const MAX_AGE_SECS: u64 = 24 * 3600;

const MIRROR_FILE: &str = "token.json";

#[derive(Debug, Serialize, Deserialize)]
struct PersistedToken {
    token: String,
    /// Epoch seconds after which the mirror is discarded.
    expires_at: u64,
}

/// File-backed counterpart of the dashboard's `jwtToken` cookie.
pub struct TokenMirror {
    path: PathBuf,
}

impl TokenMirror {
    pub fn new(state_dir: &Path) -> Self {
        Self { path: state_dir.join(MIRROR_FILE) }
    }

    /// Load the mirrored token. Expired or unreadable mirrors are removed.
    pub fn load(&self) -> Option<String> {
        let contents = std::fs::read_to_string(&self.path).ok()?;
        let persisted: PersistedToken = match serde_json::from_str(&contents) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(err = %e, "corrupt token mirror, removing");
                self.clear();
                return None;
            }
        };
        if persisted.expires_at <= epoch_secs() {
            self.clear();
            return None;
        }
        Some(persisted.token)
    }

    pub fn save(&self, token: &str) -> anyhow::Result<()> {
        let persisted =
            PersistedToken { token: token.to_owned(), expires_at: epoch_secs() + MAX_AGE_SECS };
        let json = serde_json::to_string_pretty(&persisted)?;
        write_atomic(&self.path, json.as_bytes())
    }

    pub fn clear(&self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

fn epoch_secs() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs()
}

#[cfg(test)]
#[path = "persist_tests.rs"]
mod tests;
