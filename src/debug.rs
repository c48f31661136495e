use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio_stream::{wrappers::UnboundedReceiverStream, Stream};
use uuid::Uuid;

/// One entry of the request/response telemetry shown to the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebugEvent {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: String,
    pub payload: Value,
}

impl DebugEvent {
    pub fn new(kind: impl Into<String>, payload: Value) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            kind: kind.into(),
            payload,
        }
    }
}

/// Publishing half of the debug channel. Cloned into every in-flight request.
#[derive(Debug, Clone, Default)]
pub struct DebugLog {
    tx: Option<mpsc::UnboundedSender<DebugEvent>>,
}

impl DebugLog {
    pub fn channel() -> (DebugLog, DebugStream) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            DebugLog { tx: Some(tx) },
            DebugStream {
                inner: UnboundedReceiverStream::new(rx),
            },
        )
    }

    /// A log that drops everything.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub fn publish(&self, event: DebugEvent) {
        log::debug!("debug event {}: {}", event.kind, event.payload);
        if let Some(tx) = &self.tx {
            // receiver gone means nobody is watching any more
            let _ = tx.send(event);
        }
    }

    pub fn emit(&self, kind: impl Into<String>, payload: Value) {
        self.publish(DebugEvent::new(kind, payload));
    }

    /// Forwards a backend-provided `debugInfo` object, using its `type`
    /// field as the event kind when there is one.
    pub fn forward(&self, debug_info: Value) {
        let kind = debug_info
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("Backend Debug Info")
            .to_string();
        self.emit(kind, debug_info);
    }
}

/// Append-only stream of [`DebugEvent`]s, ends once every [`DebugLog`] is dropped.
pub struct DebugStream {
    inner: UnboundedReceiverStream<DebugEvent>,
}

impl DebugStream {
    /// Drains whatever has been published so far without waiting.
    pub fn drain(&mut self) -> Vec<DebugEvent> {
        let rx = self.inner.as_mut();
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }
}

impl Stream for DebugStream {
    type Item = DebugEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<DebugEvent>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use serde_json::json;

    #[tokio::test]
    async fn test_events_arrive_in_order() {
        let (log, stream) = DebugLog::channel();
        log.emit("Request to Backend", json!({ "url": "/a" }));
        log.clone().emit("Request to Backend", json!({ "url": "/b" }));
        drop(log);

        let events: Vec<DebugEvent> = stream.collect().await;
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].payload["url"], "/a");
        assert_eq!(events[1].payload["url"], "/b");
    }

    #[test]
    fn test_forward_uses_type_field() {
        let (log, mut stream) = DebugLog::channel();
        log.forward(json!({ "type": "Gemini \"Have Fun\" Image Generation", "request": {} }));
        log.forward(json!({ "model": "gen4_turbo" }));

        let events = stream.drain();
        assert_eq!(events[0].kind, "Gemini \"Have Fun\" Image Generation");
        assert_eq!(events[1].kind, "Backend Debug Info");
    }

    #[test]
    fn test_disabled_log_is_silent() {
        DebugLog::disabled().emit("ignored", json!(null));
    }

    #[test]
    fn test_event_serializes_kind_as_type() {
        let event = DebugEvent::new("Request to Backend", json!({}));
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "Request to Backend");
    }
}
