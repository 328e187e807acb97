// Core models
pub mod challenge;
pub mod partner;
pub mod player;

// Re-export commonly used types
pub use challenge::*;
pub use partner::*;
pub use player::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Negotiation identifier assigned by the store, monotonically increasing
/// so that ids are creation-ordered.
pub type NegotiationId = u64;

/// Who performed a transition. Expiry is fired by an external scheduler,
/// every other transition is attributed to a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Actor {
    Player(Uuid),
    Scheduler,
}

impl std::fmt::Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Actor::Player(id) => write!(f, "{}", id),
            Actor::Scheduler => write!(f, "scheduler"),
        }
    }
}

/// State transition record kept on each negotiation, in order of occurrence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionRecord<S> {
    pub from: S,
    pub to: S,
    pub actor: Actor,
    pub at: DateTime<Utc>,
}
