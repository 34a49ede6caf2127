//! C10 Stream Sink (§4.10): abstraction over a server-sent-event response.
//! `emit(obj)` writes `data: <json>\n\n` and flushes; `end()` closes.
//! Implementers guarantee header emission before first `emit`. Concurrent
//! emit is unsafe — callers serialise writes per stream, enforced here with
//! an internal lock so two tasks can never interleave frames on one sink.

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{mpsc, Mutex};

#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("stream closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, StreamError>;

#[async_trait]
pub trait StreamSink: Send + Sync {
    /// Writes `data: <compact-json>\n\n` and flushes (§4.10, §6).
    async fn emit(&self, obj: Value) -> Result<()>;

    /// Closes the stream. Implementers should be idempotent.
    async fn end(&self);
}

/// The gateway's concrete sink: frames are pushed onto an mpsc channel that
/// an axum SSE body stream drains. Holding `inner` behind a `Mutex` is what
/// gives the serialize-writes-per-stream guarantee (§4.10), even though a
/// plain `mpsc::Sender` clone would already preserve per-message atomicity
/// — the lock also lets `end()` observe "already closed" cleanly.
pub struct SseChannelSink {
    inner: Mutex<Option<mpsc::Sender<String>>>,
}

impl SseChannelSink {
    #[must_use]
    pub fn new(sender: mpsc::Sender<String>) -> Self {
        Self {
            inner: Mutex::new(Some(sender)),
        }
    }
}

#[async_trait]
impl StreamSink for SseChannelSink {
    async fn emit(&self, obj: Value) -> Result<()> {
        let guard = self.inner.lock().await;
        let Some(sender) = guard.as_ref() else {
            return Err(StreamError::Closed);
        };
        let frame = format!("data: {}\n\n", obj);
        sender.send(frame).await.map_err(|_| StreamError::Closed)
    }

    async fn end(&self) {
        let mut guard = self.inner.lock().await;
        *guard = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn emit_frames_as_data_lines() {
        let (tx, mut rx) = mpsc::channel(8);
        let sink = SseChannelSink::new(tx);
        sink.emit(json!({"content": "hi"})).await.unwrap();
        let frame = rx.recv().await.unwrap();
        assert_eq!(frame, "data: {\"content\":\"hi\"}\n\n");
    }

    #[tokio::test]
    async fn emit_after_end_errors() {
        let (tx, _rx) = mpsc::channel(8);
        let sink = SseChannelSink::new(tx);
        sink.end().await;
        assert!(matches!(sink.emit(json!({})).await, Err(StreamError::Closed)));
    }

    #[tokio::test]
    async fn end_is_idempotent() {
        let (tx, _rx) = mpsc::channel(8);
        let sink = SseChannelSink::new(tx);
        sink.end().await;
        sink.end().await;
    }
}
