// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request failure taxonomy shared by the poller, broker, and one-shot commands.

use std::fmt;

/// Outcome of a failed manager or authentication-server request.
///
/// `status: None` is a transport failure (the request never produced an HTTP
/// response); otherwise `message` holds the response body verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestFailure {
    pub status: Option<u16>,
    pub message: String,
}

impl RequestFailure {
    /// A failure without an HTTP status (connection refused, timeout, bad body).
    pub fn transport(err: impl fmt::Display) -> Self {
        Self { status: None, message: err.to_string() }
    }

    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self { status: Some(status), message: message.into() }
    }

    /// Pass a successful response through; turn anything else into a failure
    /// carrying the response body.
    pub async fn check(resp: reqwest::Response) -> Result<reqwest::Response, Self> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let message = resp.text().await.unwrap_or_default();
        Err(Self::http(status.as_u16(), message))
    }

    /// 401, or the nonstandard 498 some token-auth deployments send for an
    /// expired token.
    pub fn is_auth(&self) -> bool {
        matches!(self.status, Some(401) | Some(498))
    }

    pub fn is_not_found(&self) -> bool {
        self.status == Some(404)
    }

    pub fn is_forbidden(&self) -> bool {
        self.status == Some(403)
    }

    /// Error line for the status view, mirroring the dashboard's wording.
    pub fn status_report(&self) -> String {
        match self.status {
            Some(status) => format!("Error {status}: {}", self.message),
            None => "Unable to get the status report. Is the manager still running & reachable?"
                .to_owned(),
        }
    }
}

impl fmt::Display for RequestFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "error {status}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for RequestFailure {}

/// Which stage of an authenticated call failed; used by one-shot commands to
/// title their report ("unable to obtain authorization token" vs the
/// operation's own failure).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Token,
    Request,
}

/// A [`RequestFailure`] tagged with the stage it occurred in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFailure {
    pub stage: Stage,
    pub failure: RequestFailure,
}

impl StagedFailure {
    pub fn token(failure: RequestFailure) -> Self {
        Self { stage: Stage::Token, failure }
    }

    pub fn request(failure: RequestFailure) -> Self {
        Self { stage: Stage::Request, failure }
    }
}

impl fmt::Display for StagedFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.stage {
            Stage::Token => write!(f, "unable to obtain authorization token: {}", self.failure),
            Stage::Request => self.failure.fmt(f),
        }
    }
}

impl std::error::Error for StagedFailure {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
