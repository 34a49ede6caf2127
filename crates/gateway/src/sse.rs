//! Builds an axum SSE response body fed by a [`vps_stream::SseChannelSink`]
//! (§4.10, §6 "SSE framing"). The channel already yields pre-formatted
//! `data: <json>\n\n` frames, so the body stream just forwards them
//! verbatim.

use axum::body::Body;
use axum::http::header;
use axum::response::Response;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use vps_stream::SseChannelSink;

/// Capacity of the internal frame channel; callers emit faster than the
/// socket drains under normal conditions, so a modest bound is enough to
/// smooth out bursts without unbounded buildup.
const CHANNEL_CAPACITY: usize = 64;

/// Creates a paired `SseChannelSink` and streaming `axum::Response`. The
/// caller spawns a task that drives the sink via `emit`/`end`; the
/// response body drains frames as they arrive.
#[must_use]
pub fn sse_response() -> (SseChannelSink, Response) {
    let (tx, rx) = mpsc::channel::<String>(CHANNEL_CAPACITY);
    let sink = SseChannelSink::new(tx);

    let stream = ReceiverStream::new(rx).map(|frame| Ok::<_, std::convert::Infallible>(frame));
    let body = Body::from_stream(stream);

    let response = Response::builder()
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .header("X-Accel-Buffering", "no")
        .body(body)
        .expect("building a streaming SSE response cannot fail");

    (sink, response)
}
