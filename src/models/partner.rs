use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{NegotiationId, Origin, PlayerRef, TransitionRecord};

/// Acceptance policy for partner requests. The richer ready-check variant
/// is the default; immediate acceptance is kept as a policy switch.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PartnerAcceptPolicy {
    Immediate,
    #[default]
    ReadyCheck,
}

impl std::str::FromStr for PartnerAcceptPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "immediate" => Ok(PartnerAcceptPolicy::Immediate),
            "ready_check" | "ready-check" => Ok(PartnerAcceptPolicy::ReadyCheck),
            other => Err(anyhow::anyhow!("unknown partner accept policy: {other}")),
        }
    }
}

/// Partner request lifecycle states.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PartnerRequestStatus {
    Pending,
    ReadyCheck,
    Accepted,
    Declined,
    Expired,
}

impl PartnerRequestStatus {
    /// Check if transition to another state is valid. PENDING -> ACCEPTED
    /// is only reachable under the immediate-accept policy.
    pub fn can_transition_to(&self, to: &PartnerRequestStatus) -> bool {
        match (self, to) {
            (PartnerRequestStatus::Pending, PartnerRequestStatus::ReadyCheck) => true,
            (PartnerRequestStatus::Pending, PartnerRequestStatus::Accepted) => true,
            (PartnerRequestStatus::Pending, PartnerRequestStatus::Declined) => true,
            (PartnerRequestStatus::Pending, PartnerRequestStatus::Expired) => true,
            (PartnerRequestStatus::ReadyCheck, PartnerRequestStatus::Accepted) => true,
            (PartnerRequestStatus::ReadyCheck, PartnerRequestStatus::Declined) => true,
            _ => false,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PartnerRequestStatus::Accepted
                | PartnerRequestStatus::Declined
                | PartnerRequestStatus::Expired
        )
    }
}

impl std::fmt::Display for PartnerRequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PartnerRequestStatus::Pending => write!(f, "pending"),
            PartnerRequestStatus::ReadyCheck => write!(f, "ready_check"),
            PartnerRequestStatus::Accepted => write!(f, "accepted"),
            PartnerRequestStatus::Declined => write!(f, "declined"),
            PartnerRequestStatus::Expired => write!(f, "expired"),
        }
    }
}

/// Which side of a partner request is acting in the ready-check.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PartnerSide {
    Requester,
    Target,
}

/// Ready-check flags for a partner request.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PartnerReadyStatus {
    pub requester_ready: bool,
    pub target_ready: bool,
}

impl PartnerReadyStatus {
    pub fn both_ready(&self) -> bool {
        self.requester_ready && self.target_ready
    }
}

/// A proposal to form a doubles partnership.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnerRequest {
    pub id: NegotiationId,
    pub requester: PlayerRef,
    pub target: PlayerRef,
    pub message: Option<String>,
    pub created_via: Origin,
    pub status: PartnerRequestStatus,
    pub ready: PartnerReadyStatus,
    pub created_at: DateTime<Utc>,
    pub transitions: Vec<TransitionRecord<PartnerRequestStatus>>,
}

impl PartnerRequest {
    pub fn involves(&self, player: Uuid) -> bool {
        self.requester.id == player || self.target.id == player
    }

    pub fn is_expirable(&self, now: DateTime<Utc>, window: Duration) -> bool {
        self.status == PartnerRequestStatus::Pending && now - self.created_at >= window
    }
}

/// Creation request for a partner request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreatePartnerRequest {
    pub requester_id: Uuid,
    pub target_id: Uuid,
    #[validate(length(max = 280))]
    pub message: Option<String>,
    pub origin: Origin,
}

/// An active doubles pairing. Unordered: {a, b} and {b, a} are the same
/// partnership.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Partnership {
    pub a: PlayerRef,
    pub b: PlayerRef,
    pub formed_at: DateTime<Utc>,
}

impl Partnership {
    pub fn involves(&self, player: Uuid) -> bool {
        self.a.id == player || self.b.id == player
    }

    pub fn counterpart_of(&self, player: Uuid) -> Option<&PlayerRef> {
        if self.a.id == player {
            Some(&self.b)
        } else if self.b.id == player {
            Some(&self.a)
        } else {
            None
        }
    }

    pub fn members(&self) -> [&PlayerRef; 2] {
        [&self.a, &self.b]
    }
}
