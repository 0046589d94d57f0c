// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Latest-rendered-image push stream.
//!
//! The manager serves `/imagewatch` as a server-sent-event stream of `image`
//! events carrying a filename. The watcher reconnects with exponential
//! backoff, re-runs the token handshake on stream errors, and reconnects
//! immediately when a fresh token arrives.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::client::ManagerClient;
use crate::events::ConsoleEvent;

/// One parsed server-sent event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    pub event: String,
    pub data: String,
}

/// Incremental server-sent-event parser.
///
/// Feed it chunks as they arrive; it yields events as their terminating
/// blank line comes in. Handles CRLF, comment lines, and multi-line data.
#[derive(Debug, Default)]
pub struct SseParser {
    buf: String,
    event: Option<String>,
    data: Vec<String>,
}

impl SseParser {
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.buf.push_str(&String::from_utf8_lossy(chunk));

        let mut out = Vec::new();
        while let Some(pos) = self.buf.find('\n') {
            let line: String = self.buf.drain(..=pos).collect();
            self.feed_line(line.trim_end_matches(['\n', '\r']), &mut out);
        }
        out
    }

    fn feed_line(&mut self, line: &str, out: &mut Vec<SseEvent>) {
        if line.is_empty() {
            // Blank line dispatches the pending event.
            if !self.data.is_empty() {
                out.push(SseEvent {
                    event: self.event.take().unwrap_or_else(|| "message".to_owned()),
                    data: self.data.join("\n"),
                });
                self.data.clear();
            } else {
                self.event = None;
            }
            return;
        }
        if line.starts_with(':') {
            return;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => self.event = Some(value.to_owned()),
            "data" => self.data.push(value.to_owned()),
            // id and retry are irrelevant here.
            _ => {}
        }
    }
}

/// Spawn the image watch task.
pub fn spawn_image_watch(
    client: ManagerClient,
    event_tx: broadcast::Sender<ConsoleEvent>,
    mut event_rx: broadcast::Receiver<ConsoleEvent>,
    cancel: CancellationToken,
) {
    tokio::spawn(async move {
        let broker = Arc::clone(client.broker());
        let mut backoff = Duration::from_millis(100);
        let max_backoff = Duration::from_secs(5);
        let mut events_open = true;

        loop {
            if cancel.is_cancelled() {
                break;
            }

            let mut handshake_wanted = false;
            match client.open_image_stream().await {
                Ok(mut resp) => {
                    backoff = Duration::from_millis(100); // Reset on success.
                    let mut parser = SseParser::default();

                    loop {
                        tokio::select! {
                            _ = cancel.cancelled() => return,
                            event = event_rx.recv(), if events_open => {
                                match event {
                                    // A fresh token warrants a fresh stream.
                                    Ok(ConsoleEvent::NewToken) => break,
                                    Ok(_) => {}
                                    Err(broadcast::error::RecvError::Lagged(_)) => {}
                                    Err(broadcast::error::RecvError::Closed) => events_open = false,
                                }
                            }
                            chunk = resp.chunk() => match chunk {
                                Ok(Some(bytes)) => {
                                    for event in parser.push(&bytes) {
                                        if event.event == "image" {
                                            let _ = event_tx.send(ConsoleEvent::LatestImage {
                                                filename: event.data,
                                            });
                                        }
                                    }
                                }
                                Ok(None) => {
                                    handshake_wanted = true;
                                    break;
                                }
                                Err(e) => {
                                    tracing::debug!(err = %e, "image stream error");
                                    handshake_wanted = true;
                                    break;
                                }
                            }
                        }
                    }
                }
                Err(failure) => {
                    tracing::debug!(failure = %failure, "image stream connect failed");
                    handshake_wanted = true;
                }
            }

            // The dashboard re-runs the token handshake on any stream error;
            // the broker dedups and caps the cost.
            if handshake_wanted {
                let _ = broker.acquire().await;
            }

            if cancel.is_cancelled() {
                break;
            }
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(backoff) => {}
            }
            backoff = (backoff * 2).min(max_backoff);
        }
    });
}

#[cfg(test)]
#[path = "imagewatch_tests.rs"]
mod tests;
