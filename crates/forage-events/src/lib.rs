//! In-process event bus for the asset-loading pipeline.
//!
//! The bus provides a typed event enum, sequential identifiers, and replay of
//! recent events for late subscribers (e.g. a status reporter attached after
//! the startup load already began). Internally it uses `tokio::broadcast`
//! with a bounded buffer; when the channel overflows, the oldest events are
//! dropped so slow consumers never stall the pipeline.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tokio::sync::broadcast::{Receiver, Sender};
use uuid::Uuid;

/// Identifier assigned to each event emitted by the loader.
pub type EventId = u64;

/// Default buffer size for the in-memory replay ring.
const DEFAULT_REPLAY_CAPACITY: usize = 1_024;

/// Typed lifecycle events surfaced by the loading pipeline.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A queued request was dequeued and its run began.
    RunStarted {
        request_id: Uuid,
        source: String,
    },
    /// The directory scan (or descriptor intake) produced the candidate list.
    ScanCompleted {
        request_id: Uuid,
        candidates: usize,
    },
    /// Bytes arrived for the in-flight fetch; published only for runs that
    /// asked for progress.
    FetchProgress {
        request_id: Uuid,
        url: String,
        fraction: f64,
    },
    /// An asset was fetched, decoded, and inserted into the collection.
    AssetLoaded {
        request_id: Uuid,
        key: String,
        kind: String,
    },
    /// An asset was dropped by a recoverable per-item failure.
    AssetFailed {
        request_id: Uuid,
        key: String,
        url: String,
        reason: String,
    },
    /// The run finished and the completion callback returned.
    RunCompleted {
        request_id: Uuid,
        loaded: usize,
        skipped: usize,
        failed: usize,
        elapsed_ms: u64,
    },
    /// The caller-supplied completion callback panicked.
    CallbackFailed {
        request_id: Uuid,
        reason: String,
    },
}

impl Event {
    /// Machine-friendly discriminator for log lines and stream consumers.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Event::RunStarted { .. } => "run_started",
            Event::ScanCompleted { .. } => "scan_completed",
            Event::FetchProgress { .. } => "fetch_progress",
            Event::AssetLoaded { .. } => "asset_loaded",
            Event::AssetFailed { .. } => "asset_failed",
            Event::RunCompleted { .. } => "run_completed",
            Event::CallbackFailed { .. } => "callback_failed",
        }
    }

    /// The request this event belongs to.
    #[must_use]
    pub const fn request_id(&self) -> Uuid {
        match self {
            Event::RunStarted { request_id, .. }
            | Event::ScanCompleted { request_id, .. }
            | Event::FetchProgress { request_id, .. }
            | Event::AssetLoaded { request_id, .. }
            | Event::AssetFailed { request_id, .. }
            | Event::RunCompleted { request_id, .. }
            | Event::CallbackFailed { request_id, .. } => *request_id,
        }
    }
}

/// Metadata wrapper around events. Each envelope tracks the event id and
/// emission timestamp.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct EventEnvelope {
    pub id: EventId,
    pub timestamp: DateTime<Utc>,
    pub event: Event,
}

/// Shared event bus built on top of `tokio::broadcast`.
#[derive(Clone)]
pub struct EventBus {
    sender: Sender<EventEnvelope>,
    buffer: Arc<Mutex<VecDeque<EventEnvelope>>>,
    next_id: Arc<std::sync::atomic::AtomicU64>,
    replay_capacity: usize,
}

impl EventBus {
    /// Construct a new bus with the provided broadcast capacity.
    ///
    /// The broadcast channel uses the same capacity as the in-memory replay
    /// buffer, ensuring dropped events impact both structures consistently.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            buffer: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            next_id: Arc::new(std::sync::atomic::AtomicU64::new(1)),
            replay_capacity: capacity,
        }
    }

    /// Construct a bus with the default in-memory buffer size.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_REPLAY_CAPACITY)
    }

    /// Publish a new event to the bus, assigning it a sequential identifier.
    #[must_use]
    pub fn publish(&self, event: Event) -> EventId {
        let id = self
            .next_id
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        let envelope = EventEnvelope {
            id,
            timestamp: Utc::now(),
            event,
        };

        {
            let mut buffer = self.lock_buffer();
            if buffer.len() == self.replay_capacity {
                buffer.pop_front();
            }
            buffer.push_back(envelope.clone());
        }

        let _ = self.sender.send(envelope);
        id
    }

    /// Subscribe to the bus, replaying any buffered events newer than `since_id`.
    #[must_use]
    pub fn subscribe(&self, since_id: Option<EventId>) -> EventStream {
        let mut backlog = VecDeque::new();
        if let Some(since) = since_id {
            let buffer = self.lock_buffer();
            for item in buffer.iter() {
                if item.id > since {
                    backlog.push_back(item.clone());
                }
            }
        }

        let receiver = self.sender.subscribe();
        EventStream { backlog, receiver }
    }

    /// Returns the last assigned identifier, if any events have been published.
    #[must_use]
    pub fn last_event_id(&self) -> Option<EventId> {
        self.lock_buffer().back().map(|event| event.id)
    }

    fn lock_buffer(&self) -> MutexGuard<'_, VecDeque<EventEnvelope>> {
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Stream wrapper that yields events either from the replay backlog or from the
/// live broadcast channel.
pub struct EventStream {
    backlog: VecDeque<EventEnvelope>,
    receiver: Receiver<EventEnvelope>,
}

impl EventStream {
    /// Receive the next event, respecting the replay backlog first.
    pub async fn next(&mut self) -> Option<EventEnvelope> {
        if let Some(event) = self.backlog.pop_front() {
            return Some(event);
        }

        match self.receiver.recv().await {
            Ok(event) => Some(event),
            Err(broadcast::error::RecvError::Lagged(_)) => self.receiver.recv().await.ok(),
            Err(broadcast::error::RecvError::Closed) => None,
        }
    }
}
