use serde::Serialize;
use tokio::sync::mpsc;
use tracing::warn;

/// Published once for every backend request that failed.
///
/// `request_id` identifies the query run, so consumers can drop notifications
/// left over from a superseded query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedRequestEvent {
    pub ref_id: String,
    pub request_id: String,
    pub message: String,
}

impl FailedRequestEvent {
    pub fn new(
        ref_id: impl Into<String>,
        request_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            ref_id: ref_id.into(),
            request_id: request_id.into(),
            message: message.into(),
        }
    }
}

/// Sending half of the per-query notification channel.
#[derive(Debug, Clone)]
pub struct EventPublisher {
    tx: Option<mpsc::UnboundedSender<FailedRequestEvent>>,
}

impl EventPublisher {
    pub fn new(tx: mpsc::UnboundedSender<FailedRequestEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    pub fn channel() -> (Self, mpsc::UnboundedReceiver<FailedRequestEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    /// A publisher that only logs.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub fn publish(&self, event: FailedRequestEvent) {
        warn!(
            ref_id = %event.ref_id,
            request_id = %event.request_id,
            "request failed: {}",
            event.message
        );

        if let Some(tx) = &self.tx {
            // nobody listening any more
            let _ = tx.send(event);
        }
    }
}

/// Takes every queued notification, keeping the ones that belong to `request_id`.
pub fn drain_events(
    rx: &mut mpsc::UnboundedReceiver<FailedRequestEvent>,
    request_id: &str,
) -> Vec<FailedRequestEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if event.request_id == request_id {
            events.push(event);
        }
    }
    events
}
