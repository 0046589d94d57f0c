// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cross-component signaling.
//!
//! The token broker is the only emitter of auth events; the status poller,
//! image watch, and settings commands subscribe. Listeners register against
//! this bus object, never against ambient global state.

use tokio::sync::broadcast;

use crate::error::RequestFailure;

/// Events fanned out to every subsystem of the console.
#[derive(Debug, Clone)]
pub enum ConsoleEvent {
    /// A fresh bearer token was cached; authenticated requests may be retried.
    NewToken,
    /// Token-URL discovery against the manager failed (anything but 404).
    ManagerError { failure: RequestFailure },
    /// Token exchange against the authentication server failed (anything but 403).
    ServerError { failure: RequestFailure },
    /// The image watch stream announced a newly rendered file.
    LatestImage { filename: String },
}

/// Owner of the broadcast channel.
pub struct EventBus {
    tx: broadcast::Sender<ConsoleEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(64);
        Self { tx }
    }

    /// Sender clone for components that emit.
    pub fn sender(&self) -> broadcast::Sender<ConsoleEvent> {
        self.tx.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ConsoleEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
