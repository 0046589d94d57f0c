// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Renderdeck: headless console client for a render-farm manager.

pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod imagewatch;
pub mod persist;
pub mod selection;
pub mod settings;
pub mod status;
pub mod token;
pub mod view;
pub mod worker;

use tokio_util::sync::CancellationToken;

use crate::client::ManagerClient;
use crate::config::ConsoleConfig;
use crate::events::EventBus;
use crate::selection::SelectionStore;
use crate::status::poller::StatusPoller;
use crate::token::TokenBroker;
use crate::view::TextView;

/// Build the broker and client pair every command needs.
pub fn build_client(config: &ConsoleConfig, bus: &EventBus) -> ManagerClient {
    let broker =
        TokenBroker::new(&config.manager_url, bus.sender(), Some(config.state_dir()));
    ManagerClient::new(&config.manager_url, broker)
}

/// Run the watch loop until Ctrl-C (or an unrecoverable login requirement).
pub async fn run_watch(config: ConsoleConfig) -> anyhow::Result<()> {
    let shutdown = CancellationToken::new();
    let bus = EventBus::new();
    let client = build_client(&config, &bus);

    if config.watch_images {
        let image_events = bus.subscribe();
        imagewatch::spawn_image_watch(
            client.clone(),
            bus.sender(),
            image_events,
            shutdown.clone(),
        );
        spawn_image_logger(bus.subscribe(), shutdown.clone());
    }

    let selection = SelectionStore::new(config.state_dir());
    if config.show_schedules {
        selection.set_show_schedule(true);
    } else if config.hide_schedules {
        selection.set_show_schedule(false);
    }

    let poller = StatusPoller::new(
        client,
        TextView::new(),
        selection,
        config.intervals(),
        config.stale_after(),
    );

    let ctrl_cancel = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutting down");
            ctrl_cancel.cancel();
        }
    });

    poller.run(bus.subscribe(), shutdown).await
}

/// Report announced renders while watching.
fn spawn_image_logger(
    mut rx: tokio::sync::broadcast::Receiver<events::ConsoleEvent>,
    cancel: CancellationToken,
) {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                event = rx.recv() => match event {
                    Ok(events::ConsoleEvent::LatestImage { filename }) => {
                        tracing::info!(file = %filename, "new render");
                    }
                    Ok(_) => {}
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => {}
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                },
            }
        }
    });
}
