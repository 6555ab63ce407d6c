//! # Analytics Notifications
//!
//! Fire-and-forget events emitted when a process is created. A sink must
//! never block the engine, and a failing sink never fails the operation that
//! triggered it: the engine logs the error and carries on.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::info;

/// Event type emitted on process creation.
pub const CREATE_PROCESS_EVENT: &str = "create_process";

/// An analytics event, shaped like the usage-analytics service payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    /// User the event is attributed to.
    pub user_id: String,
    /// Lab identifier.
    pub lab_type: String,
    /// What happened.
    pub event_type: String,
    /// Event-specific fields.
    pub event_data: serde_json::Value,
}

/// Reasons a sink can refuse an event.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The receiving side has gone away.
    #[error("analytics sink closed")]
    Closed,

    /// The sink is at capacity.
    #[error("analytics sink full")]
    Full,

    /// The sink rejected the event.
    #[error("analytics sink rejected event: {0}")]
    Rejected(String),
}

/// Destination for analytics events.
///
/// Implementations must return promptly; they are called while the engine
/// is mid-operation.
pub trait EventSink: Send + Sync {
    /// Delivers one event.
    fn emit(&self, event: AnalyticsEvent) -> Result<(), SinkError>;
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn emit(&self, _event: AnalyticsEvent) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Writes events to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: AnalyticsEvent) -> Result<(), SinkError> {
        info!(
            user_id = %event.user_id,
            lab_type = %event.lab_type,
            event_type = %event.event_type,
            event_data = %event.event_data,
            "analytics event"
        );
        Ok(())
    }
}

/// Hands events to a bounded tokio channel without waiting.
///
/// A full or closed channel is reported as an error, which the engine
/// swallows.
///
/// # Example
///
/// ```rust
/// use waitgraph_core::{ChannelSink, EventSink, AnalyticsEvent};
///
/// let (sink, mut rx) = ChannelSink::bounded(8);
/// sink.emit(AnalyticsEvent {
///     user_id: "user1".into(),
///     lab_type: "deadlock-sim".into(),
///     event_type: "create_process".into(),
///     event_data: serde_json::json!({}),
/// }).unwrap();
/// assert!(rx.try_recv().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<AnalyticsEvent>,
}

impl ChannelSink {
    /// Wraps an existing sender.
    pub fn new(tx: mpsc::Sender<AnalyticsEvent>) -> Self {
        Self { tx }
    }

    /// Creates a sink and the receiver that drains it.
    pub fn bounded(capacity: usize) -> (Self, mpsc::Receiver<AnalyticsEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: AnalyticsEvent) -> Result<(), SinkError> {
        self.tx.try_send(event).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => SinkError::Full,
            mpsc::error::TrySendError::Closed(_) => SinkError::Closed,
        })
    }
}
