// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP client for one render-farm manager.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{RequestFailure, StagedFailure};
use crate::status::ManagerStatus;
use crate::token::TokenBroker;
use crate::worker::{SleepSchedule, WorkerAction};

/// Client wrapper for the manager's HTTP API.
///
/// Every request carries `Authorization: Bearer <token>` when the broker has
/// a token cached; callers handle auth rejections.
#[derive(Clone)]
pub struct ManagerClient {
    base_url: String,
    http: reqwest::Client,
    broker: Arc<TokenBroker>,
}

impl ManagerClient {
    pub fn new(base_url: &str, broker: Arc<TokenBroker>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self { base_url: base_url.trim_end_matches('/').to_owned(), http, broker }
    }

    pub fn broker(&self) -> &Arc<TokenBroker> {
        &self.broker
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn apply_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.broker.token().await {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, RequestFailure> {
        let req = self.apply_auth(req).await;
        let resp = req.send().await.map_err(RequestFailure::transport)?;
        RequestFailure::check(resp).await
    }

    async fn send_text(&self, req: reqwest::RequestBuilder) -> Result<String, RequestFailure> {
        let resp = self.send(req).await?;
        resp.text().await.map_err(RequestFailure::transport)
    }

    /// Fetch the status snapshot (`GET /as-json`).
    pub async fn fetch_status(&self) -> Result<ManagerStatus, RequestFailure> {
        let resp = self.send(self.http.get(self.url("/as-json"))).await?;
        resp.json().await.map_err(RequestFailure::transport)
    }

    /// Send a control action to a worker. An empty response body is reported
    /// as a generic confirmation, like the dashboard's toast.
    pub async fn worker_action(
        &self,
        worker_id: &str,
        action: &WorkerAction,
    ) -> Result<String, RequestFailure> {
        let url = self.url(&format!("/worker-action/{worker_id}"));
        let text = self.send_text(self.http.post(url).json(&action.payload())).await?;
        if text.is_empty() {
            return Ok("Request confirmed".to_owned());
        }
        Ok(text)
    }

    /// Save a worker's sleep schedule. Empty time-of-day fields are omitted,
    /// never sent empty.
    pub async fn set_sleep_schedule(
        &self,
        worker_id: &str,
        schedule: &SleepSchedule,
    ) -> Result<String, RequestFailure> {
        let url = self.url(&format!("/set-sleep-schedule/{worker_id}"));
        self.send_text(self.http.post(url).json(&schedule.normalized())).await
    }

    /// Kick the manager's task downloader.
    pub async fn kick(&self) -> Result<(), RequestFailure> {
        self.send(self.http.get(self.url("/kick"))).await?;
        Ok(())
    }

    /// Request a resize of a dynamic worker pool.
    pub async fn dynamic_pool_resize(
        &self,
        platform_name: &str,
        pool_id: &str,
        desired_size: crate::status::PoolSize,
    ) -> Result<(), RequestFailure> {
        let body = serde_json::json!({
            "platformName": platform_name,
            "poolID": pool_id,
            "desiredSize": desired_size,
        });
        self.send(self.http.post(self.url("/dynamic-pool-resize")).json(&body)).await?;
        Ok(())
    }

    /// URL of a task's log file.
    pub fn logfile_url(&self, job_id: &str, task_id: &str) -> String {
        self.url(&format!("/logfile/{job_id}/{task_id}"))
    }

    /// A copy-pasteable authenticated download command for a task log.
    pub async fn logfile_curl_command(&self, job_id: &str, task_id: &str) -> String {
        let url = self.logfile_url(job_id, task_id);
        match self.broker.token().await {
            Some(token) => format!("curl -H \"Authorization: Bearer {token}\" {url}"),
            None => format!("curl {url}"),
        }
    }

    // -- Setup API ------------------------------------------------------------

    /// Whether the manager still needs to be linked to a server.
    pub async fn link_required(&self) -> Result<LinkCheck, RequestFailure> {
        let resp = self.send(self.http.get(self.url("/setup/api/link-required"))).await?;
        resp.json().await.map_err(RequestFailure::transport)
    }

    /// Start the linking exchange; returns the URL to direct the user to.
    pub async fn link_start(&self, server: &str) -> Result<LinkStart, RequestFailure> {
        let req = self.http.get(self.url("/setup/api/link-start")).query(&[("server", server)]);
        let resp = self.send(req).await?;
        resp.json().await.map_err(RequestFailure::transport)
    }

    /// Fetch the settings document (YAML text).
    pub async fn setup_data(&self) -> Result<String, RequestFailure> {
        self.send_text(self.http.get(self.url("/setup/data"))).await
    }

    /// Store a new settings document.
    pub async fn save_setup_data(&self, yaml: &str) -> Result<(), RequestFailure> {
        let req = self
            .http
            .post(self.url("/setup/data"))
            .header(reqwest::header::CONTENT_TYPE, "application/x-yaml")
            .body(yaml.to_owned());
        self.send(req).await?;
        Ok(())
    }

    /// Ask the manager to restart, either back to normal operation or into
    /// setup mode.
    pub async fn restart(&self, to_setup: bool) -> Result<(), RequestFailure> {
        let path = if to_setup { "/setup/restart-to-setup" } else { "/setup/restart" };
        self.send(self.http.post(self.url(path))).await?;
        Ok(())
    }

    /// Run `op`; on an auth rejection, acquire a token and retry once.
    ///
    /// Failures are tagged with the stage they occurred in so callers can
    /// distinguish "could not get a token" from the operation's own failure.
    pub async fn with_auth_retry<T, F, Fut>(&self, op: F) -> Result<T, StagedFailure>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, RequestFailure>>,
    {
        match op().await {
            Ok(value) => Ok(value),
            Err(failure) if failure.is_auth() => match self.broker.acquire().await {
                Ok(_) => op().await.map_err(StagedFailure::request),
                Err(e) => Err(StagedFailure::token(e.into_failure())),
            },
            Err(failure) => Err(StagedFailure::request(failure)),
        }
    }

    /// Open the latest-rendered-image event stream (`GET /imagewatch`).
    pub async fn open_image_stream(&self) -> Result<reqwest::Response, RequestFailure> {
        self.send(self.http.get(self.url("/imagewatch"))).await
    }
}

/// Response of `GET /setup/api/link-required`.
#[derive(Debug, Clone, Deserialize)]
pub struct LinkCheck {
    pub link_required: bool,
    #[serde(default)]
    pub server_url: Option<String>,
}

/// Response of `GET /setup/api/link-start`.
#[derive(Debug, Clone, Deserialize)]
pub struct LinkStart {
    pub location: String,
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
