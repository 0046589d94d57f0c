// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Status polling loop with adaptive retry timing.
//!
//! One task, one outstanding timer. Success re-arms at the short delay,
//! failures at the long delay; an auth rejection defers to the token broker
//! and re-polls quickly once a token arrives. Network and auth errors never
//! escape the loop — it runs until cancelled.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::client::ManagerClient;
use crate::error::RequestFailure;
use crate::events::ConsoleEvent;
use crate::selection::SelectionStore;
use crate::status::partition::{partition, retain_selectable};
use crate::token::{AcquireError, TokenBroker};
use crate::view::{StatusSnapshot, StatusView};

/// Where the poll loop currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Idle,
    InFlight,
    Success,
    Failure,
}

/// Delays between polls, by outcome of the previous one.
#[derive(Debug, Clone, Copy)]
pub struct PollIntervals {
    /// After a successful poll.
    pub ok: Duration,
    /// After a non-auth failure.
    pub error: Duration,
    /// After a fresh token arrives.
    pub token_retry: Duration,
    /// After the token handshake itself fails.
    pub token_error: Duration,
}

impl Default for PollIntervals {
    fn default() -> Self {
        Self {
            ok: Duration::from_millis(2000),
            error: Duration::from_millis(10_000),
            token_retry: Duration::from_millis(250),
            token_error: Duration::from_millis(5000),
        }
    }
}

/// Generation counter behind the only-one-outstanding-timer rule.
///
/// Arming hands out a [`Ticket`]; re-arming supersedes every earlier ticket,
/// so a stale timer can never fire after a newer one was armed.
#[derive(Debug, Default)]
pub struct RearmTimer {
    generation: u64,
}

/// Proof of the most recent arm — until the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

impl RearmTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(&mut self) -> Ticket {
        self.generation += 1;
        Ticket(self.generation)
    }

    pub fn is_current(&self, ticket: &Ticket) -> bool {
        ticket.0 == self.generation
    }
}

/// The polling loop.
pub struct StatusPoller<V: StatusView> {
    client: ManagerClient,
    broker: Arc<TokenBroker>,
    view: V,
    selection: SelectionStore,
    intervals: PollIntervals,
    stale_after: chrono::Duration,
    state: PollState,
    timer: RearmTimer,
}

impl<V: StatusView> StatusPoller<V> {
    pub fn new(
        client: ManagerClient,
        view: V,
        selection: SelectionStore,
        intervals: PollIntervals,
        stale_after: chrono::Duration,
    ) -> Self {
        let broker = Arc::clone(client.broker());
        Self {
            client,
            broker,
            view,
            selection,
            intervals,
            stale_after,
            state: PollState::Idle,
            timer: RearmTimer::new(),
        }
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    /// Run until cancelled. The only error that ends the loop is a token
    /// exchange demanding interactive login.
    pub async fn run(
        mut self,
        mut events: broadcast::Receiver<ConsoleEvent>,
        cancel: CancellationToken,
    ) -> anyhow::Result<()> {
        let mut ticket = self.timer.arm();
        let mut deadline = tokio::time::Instant::now();
        let mut events_open = true;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => return Ok(()),
                _ = tokio::time::sleep_until(deadline) => {}
                event = events.recv(), if events_open => {
                    match event {
                        Ok(ConsoleEvent::NewToken) => {
                            // Some other component refreshed the token;
                            // re-poll soon with it.
                            ticket = self.timer.arm();
                            deadline = tokio::time::Instant::now() + self.intervals.token_retry;
                        }
                        Ok(_) => {}
                        Err(broadcast::error::RecvError::Lagged(_)) => {}
                        Err(broadcast::error::RecvError::Closed) => events_open = false,
                    }
                    continue;
                }
            }

            if !self.timer.is_current(&ticket) {
                continue;
            }

            let next_delay = self.poll_once().await?;
            ticket = self.timer.arm();
            deadline = tokio::time::Instant::now() + next_delay;
        }
    }

    /// One poll round; returns the delay until the next one.
    async fn poll_once(&mut self) -> anyhow::Result<Duration> {
        self.state = PollState::InFlight;

        match self.client.fetch_status().await {
            Ok(mut info) => {
                let workers = info.workers.take();
                let (current, idle) = partition(workers, Utc::now(), self.stale_after);
                let selected = retain_selectable(self.selection.load_selected(), &current);
                self.selection.save_selected(&selected);

                self.view.render(&StatusSnapshot {
                    info,
                    current,
                    idle,
                    selected,
                    show_schedule: self.selection.show_schedule(),
                });
                self.state = PollState::Success;
                Ok(self.intervals.ok)
            }
            Err(failure) if failure.is_auth() => self.recover_token().await,
            Err(failure) => Ok(self.report_failure(&failure)),
        }
    }

    fn report_failure(&mut self, failure: &RequestFailure) -> Duration {
        self.view.render_error(&failure.status_report());
        self.state = PollState::Failure;
        self.intervals.error
    }

    /// The manager rejected our credentials; defer to the broker.
    async fn recover_token(&mut self) -> anyhow::Result<Duration> {
        match self.broker.acquire().await {
            Ok(Some(_)) => {
                self.state = PollState::Idle;
                Ok(self.intervals.token_retry)
            }
            Ok(None) => {
                // Security is reported disabled, yet the request was
                // rejected. Treat as an ordinary failure and keep retrying.
                self.view.render_error(
                    "Manager rejected the request but reports security disabled",
                );
                self.state = PollState::Failure;
                Ok(self.intervals.error)
            }
            Err(AcquireError::LoginRequired { login_url }) => {
                let message = format!("Interactive login required; log in at {login_url}");
                self.view.render_error(&message);
                anyhow::bail!(message)
            }
            Err(e) => {
                self.view.render_error(&e.view_message());
                self.state = PollState::Failure;
                Ok(self.intervals.token_error)
            }
        }
    }
}

#[cfg(test)]
#[path = "poller_tests.rs"]
mod tests;
