// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn transport_failure_has_no_status() -> anyhow::Result<()> {
    let f = RequestFailure::transport("connection refused");
    assert_eq!(f.status, None);
    assert!(!f.is_auth());
    assert_eq!(
        f.status_report(),
        "Unable to get the status report. Is the manager still running & reachable?"
    );
    Ok(())
}

#[yare::parameterized(
    unauthorized = { 401, true },
    expired_token = { 498, true },
    forbidden = { 403, false },
    server_error = { 500, false },
)]
fn auth_classification(status: u16, expected: bool) {
    assert_eq!(RequestFailure::http(status, "").is_auth(), expected);
}

#[test]
fn application_failure_surfaces_body_verbatim() -> anyhow::Result<()> {
    let f = RequestFailure::http(503, "scheduler is down");
    assert_eq!(f.status_report(), "Error 503: scheduler is down");
    assert_eq!(f.to_string(), "error 503: scheduler is down");
    Ok(())
}

#[test]
fn staged_failure_titles_token_stage() -> anyhow::Result<()> {
    let staged = StagedFailure::token(RequestFailure::http(500, "boom"));
    assert_eq!(staged.stage, Stage::Token);
    assert!(staged.to_string().starts_with("unable to obtain authorization token"));

    let staged = StagedFailure::request(RequestFailure::http(500, "boom"));
    assert_eq!(staged.to_string(), "error 500: boom");
    Ok(())
}
