//! Arena challenge & partnership negotiation engine.
//!
//! Governs how two players agree to play a singles match (challenge) or
//! team up as doubles partners (partner request): a two-sided ready-check
//! handshake before a match is confirmed, a compatibility scorer that ranks
//! the discovery pool, and a partnership manager enforcing at most one
//! active partner per player.
//!
//! The engine is a library for a single session's client. Identity, tier
//! and location come from an external player directory; confirmed matches
//! and audit events leave through an outbox drained by an external
//! dispatcher. Cross-party consistency is that dispatcher's problem: local
//! transitions apply optimistically and never await the counterpart.

pub mod config;
pub mod directory;
pub mod error;
pub mod models;
pub mod outbox;
pub mod service;
pub mod store;
pub mod telemetry;

pub use config::EngineConfig;
pub use directory::{PlayerDirectory, Roster};
pub use error::EngineError;
pub use outbox::{EventSink, MemorySink, Outbox, OutboxEvent, SinkError, TracingSink};
pub use service::{
    compatibility_score, filter_pool, DiscoveryMode, DiscoveryParams, MatchTypeFilter,
    NegotiationService, PartnershipManager, ScoredCandidate,
};
pub use store::NegotiationStore;
