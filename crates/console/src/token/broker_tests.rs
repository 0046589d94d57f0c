// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn event_channel() -> (broadcast::Sender<ConsoleEvent>, broadcast::Receiver<ConsoleEvent>) {
    broadcast::channel(16)
}

/// Mount the two handshake endpoints on `server`, each expecting `hits` calls.
async fn mount_handshake(
    server: &mut mockito::ServerGuard,
    token: &str,
    hits: usize,
) -> (mockito::Mock, mockito::Mock) {
    let descriptor = serde_json::json!({
        "tokenURL": format!("{}/token", server.url()),
        "loginURL": format!("{}/login", server.url()),
    });
    let urls = server
        .mock("GET", "/jwt/token-urls")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(descriptor.to_string())
        .expect(hits)
        .create_async()
        .await;
    let exchange = server
        .mock("GET", "/token")
        .with_status(200)
        .with_body(token)
        .expect(hits)
        .create_async()
        .await;
    (urls, exchange)
}

#[tokio::test]
async fn concurrent_acquires_share_one_handshake() -> anyhow::Result<()> {
    let mut server = mockito::Server::new_async().await;
    let (urls, exchange) = mount_handshake(&mut server, "tok-123", 1).await;

    let (tx, _rx) = event_channel();
    let broker = TokenBroker::new(&server.url(), tx, None);

    let (a, b, c) = tokio::join!(broker.acquire(), broker.acquire(), broker.acquire());
    for outcome in [a, b, c] {
        assert_eq!(outcome.map_err(|e| anyhow::anyhow!("{e}"))?.as_deref(), Some("tok-123"));
    }

    urls.assert_async().await;
    exchange.assert_async().await;
    assert_eq!(broker.token().await.as_deref(), Some("tok-123"));
    Ok(())
}

#[tokio::test]
async fn concurrent_acquires_share_the_same_failure() -> anyhow::Result<()> {
    let mut server = mockito::Server::new_async().await;
    let urls = server
        .mock("GET", "/jwt/token-urls")
        .with_status(500)
        .with_body("broken")
        .expect(1)
        .create_async()
        .await;

    let (tx, _rx) = event_channel();
    let broker = TokenBroker::new(&server.url(), tx, None);

    let (a, b) = tokio::join!(broker.acquire(), broker.acquire());
    let expected = AcquireError::Manager(RequestFailure::http(500, "broken"));
    assert_eq!(a, Err(expected.clone()));
    assert_eq!(b, Err(expected));

    urls.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn completed_attempt_clears_the_pending_slot() -> anyhow::Result<()> {
    let mut server = mockito::Server::new_async().await;
    let (urls, exchange) = mount_handshake(&mut server, "tok-1", 2).await;

    let (tx, _rx) = event_channel();
    let broker = TokenBroker::new(&server.url(), tx, None);

    broker.acquire().await.map_err(|e| anyhow::anyhow!("{e}"))?;
    broker.acquire().await.map_err(|e| anyhow::anyhow!("{e}"))?;

    // Two sequential calls mean two full handshakes, not a replayed future.
    urls.assert_async().await;
    exchange.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn discovery_404_means_security_disabled() -> anyhow::Result<()> {
    let mut server = mockito::Server::new_async().await;
    let _urls = server
        .mock("GET", "/jwt/token-urls")
        .with_status(404)
        .create_async()
        .await;

    let (tx, mut rx) = event_channel();
    let broker = TokenBroker::new(&server.url(), tx, None);

    assert_eq!(broker.acquire().await, Ok(None));
    assert_eq!(broker.token().await, None);

    // No error event of any kind.
    assert!(matches!(rx.try_recv(), Err(broadcast::error::TryRecvError::Empty)));
    Ok(())
}

#[tokio::test]
async fn discovery_failure_emits_manager_error() -> anyhow::Result<()> {
    let mut server = mockito::Server::new_async().await;
    let _urls = server
        .mock("GET", "/jwt/token-urls")
        .with_status(500)
        .with_body("boom")
        .create_async()
        .await;

    let (tx, mut rx) = event_channel();
    let broker = TokenBroker::new(&server.url(), tx, None);

    let outcome = broker.acquire().await;
    assert_eq!(outcome, Err(AcquireError::Manager(RequestFailure::http(500, "boom"))));

    match rx.try_recv() {
        Ok(ConsoleEvent::ManagerError { failure }) => {
            assert_eq!(failure, RequestFailure::http(500, "boom"));
        }
        other => anyhow::bail!("expected ManagerError event, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn exchange_403_requires_login_without_error_event() -> anyhow::Result<()> {
    let mut server = mockito::Server::new_async().await;
    let login_url = format!("{}/login", server.url());
    let descriptor = serde_json::json!({
        "tokenURL": format!("{}/token", server.url()),
        "loginURL": login_url,
    });
    let _urls = server
        .mock("GET", "/jwt/token-urls")
        .with_status(200)
        .with_body(descriptor.to_string())
        .create_async()
        .await;
    let _exchange = server.mock("GET", "/token").with_status(403).create_async().await;

    let (tx, mut rx) = event_channel();
    let broker = TokenBroker::new(&server.url(), tx, None);

    assert_eq!(broker.acquire().await, Err(AcquireError::LoginRequired { login_url }));
    assert_eq!(broker.token().await, None);
    assert!(matches!(rx.try_recv(), Err(broadcast::error::TryRecvError::Empty)));
    Ok(())
}

#[tokio::test]
async fn exchange_failure_emits_server_error() -> anyhow::Result<()> {
    let mut server = mockito::Server::new_async().await;
    let descriptor = serde_json::json!({
        "tokenURL": format!("{}/token", server.url()),
        "loginURL": format!("{}/login", server.url()),
    });
    let _urls = server
        .mock("GET", "/jwt/token-urls")
        .with_status(200)
        .with_body(descriptor.to_string())
        .create_async()
        .await;
    let _exchange =
        server.mock("GET", "/token").with_status(502).with_body("bad gateway").create_async().await;

    let (tx, mut rx) = event_channel();
    let broker = TokenBroker::new(&server.url(), tx, None);

    let outcome = broker.acquire().await;
    assert_eq!(outcome, Err(AcquireError::Server(RequestFailure::http(502, "bad gateway"))));
    assert!(matches!(rx.try_recv(), Ok(ConsoleEvent::ServerError { .. })));
    Ok(())
}

#[tokio::test]
async fn success_emits_new_token_and_persists_the_mirror() -> anyhow::Result<()> {
    let mut server = mockito::Server::new_async().await;
    let (_urls, _exchange) = mount_handshake(&mut server, "tok-xyz", 1).await;
    let dir = tempfile::tempdir()?;

    let (tx, mut rx) = event_channel();
    let broker = TokenBroker::new(&server.url(), tx, Some(dir.path().to_path_buf()));

    let outcome = broker.acquire().await.map_err(|e| anyhow::anyhow!("{e}"))?;
    assert_eq!(outcome.as_deref(), Some("tok-xyz"));
    assert!(matches!(rx.try_recv(), Ok(ConsoleEvent::NewToken)));

    // A fresh broker over the same state dir starts with the mirrored token.
    let (tx2, _rx2) = event_channel();
    let revived = TokenBroker::new(&server.url(), tx2, Some(dir.path().to_path_buf()));
    assert_eq!(revived.token().await.as_deref(), Some("tok-xyz"));
    Ok(())
}

#[tokio::test]
async fn forget_clears_cache_and_mirror() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    TokenMirror::new(dir.path()).save("tok-old")?;

    let (tx, _rx) = event_channel();
    let broker = TokenBroker::new("http://localhost:1", tx, Some(dir.path().to_path_buf()));
    assert_eq!(broker.token().await.as_deref(), Some("tok-old"));

    broker.forget().await;
    assert_eq!(broker.token().await, None);

    let (tx2, _rx2) = event_channel();
    let revived = TokenBroker::new("http://localhost:1", tx2, Some(dir.path().to_path_buf()));
    assert_eq!(revived.token().await, None);
    Ok(())
}
