//! Outbox event log for cross-party propagation.
//!
//! Local state is mutated optimistically; anything that must reach the
//! counterpart's view (notification, persistence of a confirmed match) is
//! appended here and drained later by a dispatcher. Delivery is best-effort:
//! a failing sink is logged and the event dropped, retry/backoff belongs to
//! the external layer.

use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::{Actor, MatchType, NegotiationId};

/// Events emitted at each state transition, suitable for delivery over any
/// external push channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutboxEvent {
    /// Audit record for every accepted transition.
    Transition {
        negotiation_id: NegotiationId,
        from_state: String,
        to_state: String,
        actor: Actor,
        at: DateTime<Utc>,
    },
    /// A party backed out after entering the ready-check phase. Emitted in
    /// addition to the DECLINED transition so audits can tell the two apart.
    Withdrawn {
        negotiation_id: NegotiationId,
        actor: Actor,
        at: DateTime<Utc>,
    },
    /// A confirmed challenge was started and handed off for recording.
    MatchReady {
        challenge_id: NegotiationId,
        challenger_id: Uuid,
        challenged_id: Uuid,
        match_type: MatchType,
    },
    PartnershipFormed {
        player_a: Uuid,
        player_b: Uuid,
    },
    PartnershipDissolved {
        player_a: Uuid,
        player_b: Uuid,
    },
}

#[derive(Debug, Error)]
#[error("event delivery failed: {0}")]
pub struct SinkError(pub String);

/// Destination a dispatcher drains the outbox into.
pub trait EventSink {
    fn deliver(&self, event: &OutboxEvent) -> Result<(), SinkError>;
}

/// FIFO queue of undelivered events.
#[derive(Debug, Default)]
pub struct Outbox {
    queue: VecDeque<OutboxEvent>,
}

impl Outbox {
    pub fn new() -> Self {
        Outbox::default()
    }

    pub fn push(&mut self, event: OutboxEvent) {
        self.queue.push_back(event);
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Drain every queued event into the sink; returns how many were
    /// delivered. Failed deliveries are logged and dropped.
    pub fn drain_into(&mut self, sink: &dyn EventSink) -> usize {
        let mut delivered = 0;
        while let Some(event) = self.queue.pop_front() {
            match sink.deliver(&event) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    warn!(error = %e, event = ?event, "Dropping undeliverable outbox event");
                }
            }
        }
        delivered
    }
}

/// Sink that logs each event; useful as a default push channel stand-in.
#[derive(Debug, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn deliver(&self, event: &OutboxEvent) -> Result<(), SinkError> {
        let payload = serde_json::to_string(event).map_err(|e| SinkError(e.to_string()))?;
        info!(payload = %payload, "Outbox event");
        Ok(())
    }
}

/// Sink that collects delivered events, for tests and embedding UIs that
/// poll rather than push.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<OutboxEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        MemorySink::default()
    }

    pub fn events(&self) -> Vec<OutboxEvent> {
        self.events
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl EventSink for MemorySink {
    fn deliver(&self, event: &OutboxEvent) -> Result<(), SinkError> {
        self.events
            .lock()
            .map_err(|e| SinkError(e.to_string()))?
            .push(event.clone());
        Ok(())
    }
}
