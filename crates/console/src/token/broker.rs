// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Token broker: caches the bearer token, runs the two-step handshake, and
//! collapses concurrent demand into a single in-flight attempt.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::{broadcast, Mutex, RwLock};

use crate::error::RequestFailure;
use crate::events::ConsoleEvent;
use crate::token::persist::TokenMirror;
use crate::token::{AcquireError, TokenUrls};

/// Outcome of a handshake. `Ok(None)` means the manager has security
/// disabled — a valid, final state, not an error.
pub type AcquireResult = Result<Option<String>, AcquireError>;

type PendingAcquire = Shared<BoxFuture<'static, AcquireResult>>;

/// Produces bearer tokens for outgoing manager calls.
///
/// At most one handshake is in flight at any time; all concurrent callers of
/// [`TokenBroker::acquire`] share the same eventual outcome.
pub struct TokenBroker {
    manager_url: String,
    http: reqwest::Client,
    cached: RwLock<Option<String>>,
    pending: Mutex<Option<PendingAcquire>>,
    event_tx: broadcast::Sender<ConsoleEvent>,
    mirror: Option<TokenMirror>,
}

impl TokenBroker {
    /// Create a broker for the given manager.
    ///
    /// The broker's HTTP client keeps a cookie store: the token exchange is a
    /// cross-origin call that must carry the identity provider's session
    /// cookies.
    pub fn new(
        manager_url: &str,
        event_tx: broadcast::Sender<ConsoleEvent>,
        state_dir: Option<PathBuf>,
    ) -> Arc<Self> {
        let mirror = state_dir.map(|dir| TokenMirror::new(&dir));
        let cached = mirror.as_ref().and_then(TokenMirror::load);
        Arc::new(Self {
            manager_url: manager_url.trim_end_matches('/').to_owned(),
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .cookie_store(true)
                .build()
                .unwrap_or_default(),
            cached: RwLock::new(cached),
            pending: Mutex::new(None),
            event_tx,
            mirror,
        })
    }

    /// Return the cached token, if any. Never triggers acquisition.
    pub async fn token(&self) -> Option<String> {
        self.cached.read().await.clone()
    }

    /// Acquire a token, deduplicating concurrent attempts.
    ///
    /// If a handshake is already pending, the caller awaits that same
    /// attempt. The pending slot is cleared once the attempt completes, so a
    /// later call starts fresh.
    pub async fn acquire(self: &Arc<Self>) -> AcquireResult {
        let attempt = {
            let mut pending = self.pending.lock().await;
            match pending.as_ref() {
                Some(fut) => fut.clone(),
                None => {
                    let broker = Arc::clone(self);
                    let fut: PendingAcquire =
                        async move { broker.handshake().await }.boxed().shared();
                    *pending = Some(fut.clone());
                    fut
                }
            }
        };

        let outcome = attempt.clone().await;

        let mut pending = self.pending.lock().await;
        if pending.as_ref().is_some_and(|p| p.ptr_eq(&attempt)) {
            *pending = None;
        }
        outcome
    }

    /// Forget the cached token and its persisted mirror. Debug escape hatch.
    pub async fn forget(&self) {
        *self.cached.write().await = None;
        if let Some(mirror) = &self.mirror {
            mirror.clear();
        }
        tracing::info!("auth token forgotten");
    }

    async fn handshake(self: Arc<Self>) -> AcquireResult {
        let urls = match self.fetch_token_urls().await {
            Ok(urls) => urls,
            Err(failure) if failure.is_not_found() => {
                // The manager has security disabled; no token, no error.
                tracing::info!("manager has security disabled, continuing without a token");
                return Ok(None);
            }
            Err(failure) => {
                let _ = self.event_tx.send(ConsoleEvent::ManagerError { failure: failure.clone() });
                return Err(AcquireError::Manager(failure));
            }
        };

        let token = match self.fetch_token(&urls.token_url).await {
            Ok(token) => token,
            Err(failure) if failure.is_forbidden() => {
                // Interactive login wanted; the dashboard navigates to the
                // login page here. No error event either way.
                return Err(AcquireError::LoginRequired { login_url: urls.login_url });
            }
            Err(failure) => {
                let _ = self.event_tx.send(ConsoleEvent::ServerError { failure: failure.clone() });
                return Err(AcquireError::Server(failure));
            }
        };

        *self.cached.write().await = Some(token.clone());
        if let Some(mirror) = &self.mirror {
            if let Err(e) = mirror.save(&token) {
                tracing::warn!(err = %e, "failed to persist token mirror");
            }
        }
        tracing::debug!("auth token acquired");
        let _ = self.event_tx.send(ConsoleEvent::NewToken);
        Ok(Some(token))
    }

    async fn fetch_token_urls(&self) -> Result<TokenUrls, RequestFailure> {
        let url = format!("{}/jwt/token-urls", self.manager_url);
        let resp = self.http.get(&url).send().await.map_err(RequestFailure::transport)?;
        let resp = RequestFailure::check(resp).await?;
        resp.json().await.map_err(RequestFailure::transport)
    }

    async fn fetch_token(&self, token_url: &str) -> Result<String, RequestFailure> {
        let resp = self.http.get(token_url).send().await.map_err(RequestFailure::transport)?;
        let resp = RequestFailure::check(resp).await?;
        resp.text().await.map_err(RequestFailure::transport)
    }
}

#[cfg(test)]
#[path = "broker_tests.rs"]
mod tests;
