// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bearer-token acquisition: two-step handshake, shared in-flight attempt,
//! persisted mirror.

pub mod broker;
pub mod persist;

use std::fmt;

use serde::Deserialize;

use crate::error::RequestFailure;

pub use broker::TokenBroker;
pub use persist::TokenMirror;

/// Descriptor returned by the manager's `/jwt/token-urls` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenUrls {
    /// Token-issuing endpoint on the authentication server.
    #[serde(rename = "tokenURL")]
    pub token_url: String,
    /// Interactive login page to direct the user to on a 403.
    #[serde(rename = "loginURL")]
    pub login_url: String,
}

/// Why a token handshake failed.
///
/// `LoginRequired` is not a network failure: the authentication server wants
/// an interactive login, which a headless client cannot perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquireError {
    /// Token-URL discovery against the manager failed.
    Manager(RequestFailure),
    /// Token exchange against the authentication server failed.
    Server(RequestFailure),
    /// The authentication server answered 403; log in at this URL first.
    LoginRequired { login_url: String },
}

impl AcquireError {
    /// Error line for the status view, mirroring the dashboard's wording.
    pub fn view_message(&self) -> String {
        match self {
            Self::Manager(f) => match f.status {
                None => "Unable to get authentication URLs; is the manager still running?"
                    .to_owned(),
                Some(status) => format!(
                    "Error {status} getting authentication URLs from the manager: {}",
                    f.message
                ),
            },
            Self::Server(f) => match f.status {
                None => {
                    "Unable to get authentication token; is the authentication server still running?"
                        .to_owned()
                }
                Some(status) => format!(
                    "Error {status} getting authentication token from the authentication server: {}",
                    f.message
                ),
            },
            Self::LoginRequired { login_url } => {
                format!("Interactive login required; log in at {login_url}")
            }
        }
    }

    /// Collapse into a plain [`RequestFailure`] for staged reporting.
    pub fn into_failure(self) -> RequestFailure {
        match self {
            Self::Manager(f) | Self::Server(f) => f,
            Self::LoginRequired { login_url } => {
                RequestFailure::http(403, format!("login required at {login_url}"))
            }
        }
    }
}

impl fmt::Display for AcquireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.view_message())
    }
}

impl std::error::Error for AcquireError {}
