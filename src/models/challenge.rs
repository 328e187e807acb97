use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{NegotiationId, PlayerRef, TransitionRecord};

/// Match type a challenge proposes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchType {
    Singles,
    DoublesTeam,
}

impl std::fmt::Display for MatchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchType::Singles => write!(f, "singles"),
            MatchType::DoublesTeam => write!(f, "doubles_team"),
        }
    }
}

/// Provenance of a negotiation. Always passed explicitly at creation time,
/// never inferred from presentation state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Origin {
    Swipe,
    CreateMatch,
    Manual,
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Origin::Swipe => write!(f, "swipe"),
            Origin::CreateMatch => write!(f, "create_match"),
            Origin::Manual => write!(f, "manual"),
        }
    }
}

/// Challenge lifecycle states.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChallengeStatus {
    Pending,
    ReadyCheck,
    Confirmed,
    Declined,
    Expired,
}

impl ChallengeStatus {
    /// Check if transition to another state is valid.
    pub fn can_transition_to(&self, to: &ChallengeStatus) -> bool {
        match (self, to) {
            // PENDING -> READY_CHECK on accept
            (ChallengeStatus::Pending, ChallengeStatus::ReadyCheck) => true,
            // PENDING -> DECLINED or EXPIRED
            (ChallengeStatus::Pending, ChallengeStatus::Declined) => true,
            (ChallengeStatus::Pending, ChallengeStatus::Expired) => true,
            // READY_CHECK -> CONFIRMED when both flags are set
            (ChallengeStatus::ReadyCheck, ChallengeStatus::Confirmed) => true,
            // READY_CHECK -> DECLINED is a withdrawal after acceptance
            (ChallengeStatus::ReadyCheck, ChallengeStatus::Declined) => true,
            // All other transitions are invalid
            _ => false,
        }
    }

    /// Terminal states admit no further transitions. A confirmed challenge
    /// is only consumed by `start`, never mutated.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ChallengeStatus::Confirmed | ChallengeStatus::Declined | ChallengeStatus::Expired
        )
    }

    /// Settled challenges are dead weight the store may drop. A confirmed
    /// challenge is terminal but not settled: it stays in the store until
    /// `start` consumes it for match recording.
    pub fn is_settled(&self) -> bool {
        matches!(self, ChallengeStatus::Declined | ChallengeStatus::Expired)
    }
}

impl std::fmt::Display for ChallengeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChallengeStatus::Pending => write!(f, "pending"),
            ChallengeStatus::ReadyCheck => write!(f, "ready_check"),
            ChallengeStatus::Confirmed => write!(f, "confirmed"),
            ChallengeStatus::Declined => write!(f, "declined"),
            ChallengeStatus::Expired => write!(f, "expired"),
        }
    }
}

/// Which side of a challenge is acting in the ready-check.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChallengeSide {
    Challenger,
    Challenged,
}

/// Two-sided ready-check flags. Both stay false until the challenge enters
/// READY_CHECK; both true implies the challenge is confirmed.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReadyStatus {
    pub challenger_ready: bool,
    pub challenged_ready: bool,
}

impl ReadyStatus {
    pub fn both_ready(&self) -> bool {
        self.challenger_ready && self.challenged_ready
    }
}

/// A proposal from one player to another to play a singles or team match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Challenge {
    pub id: NegotiationId,
    pub challenger: PlayerRef,
    pub challenged: PlayerRef,
    pub match_type: MatchType,
    pub message: Option<String>,
    pub created_via: Origin,
    pub status: ChallengeStatus,
    pub ready: ReadyStatus,
    pub created_at: DateTime<Utc>,
    pub transitions: Vec<TransitionRecord<ChallengeStatus>>,
}

impl Challenge {
    pub fn involves(&self, player: Uuid) -> bool {
        self.challenger.id == player || self.challenged.id == player
    }

    /// A pending challenge past its window may be expired by the scheduler.
    pub fn is_expirable(&self, now: DateTime<Utc>, window: Duration) -> bool {
        self.status == ChallengeStatus::Pending && now - self.created_at >= window
    }
}

/// Creation request for a challenge.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateChallenge {
    pub challenger_id: Uuid,
    pub challenged_id: Uuid,
    pub match_type: MatchType,
    #[validate(length(max = 280))]
    pub message: Option<String>,
    pub origin: Origin,
}
