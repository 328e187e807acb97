use thiserror::Error;
use uuid::Uuid;

use crate::models::{AvailabilityStatus, NegotiationId};

/// Engine errors. All variants are local, synchronous and recoverable; the
/// calling layer decides user-facing messaging. The engine never retries on
/// its own.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("a team challenge requires an active partnership")]
    PartnerRequired,

    #[error("negotiation {0} is missing or already settled")]
    StaleNegotiation(NegotiationId),

    #[error("invalid transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("candidate {id} is not open to challenges (status: {status})")]
    CandidateUnavailable {
        id: Uuid,
        status: AvailabilityStatus,
    },

    #[error("unknown player: {0}")]
    UnknownPlayer(Uuid),

    #[error("a negotiation requires two distinct players, got {0} on both sides")]
    SelfNegotiation(Uuid),

    #[error("validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

impl EngineError {
    pub fn invalid_transition(
        from: impl std::fmt::Display,
        to: impl std::fmt::Display,
    ) -> Self {
        EngineError::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}
