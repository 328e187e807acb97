use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Skill tier from the player directory. Read-only to this engine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SkillTier {
    Recreational,
    Competitive,
    Elite,
    Professional,
}

impl std::fmt::Display for SkillTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkillTier::Recreational => write!(f, "recreational"),
            SkillTier::Competitive => write!(f, "competitive"),
            SkillTier::Elite => write!(f, "elite"),
            SkillTier::Professional => write!(f, "professional"),
        }
    }
}

/// Presence/availability as reported by the directory.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AvailabilityStatus {
    Online,
    Available,
    Away,
    Busy,
    Offline,
}

impl AvailabilityStatus {
    /// A challenge may only be created against an online or available target.
    pub fn is_challengeable(&self) -> bool {
        matches!(self, AvailabilityStatus::Online | AvailabilityStatus::Available)
    }
}

impl std::fmt::Display for AvailabilityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AvailabilityStatus::Online => write!(f, "online"),
            AvailabilityStatus::Available => write!(f, "available"),
            AvailabilityStatus::Away => write!(f, "away"),
            AvailabilityStatus::Busy => write!(f, "busy"),
            AvailabilityStatus::Offline => write!(f, "offline"),
        }
    }
}

/// The player's current match-type intent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchIntent {
    Singles,
    DoublesSeeking,
    DoublesTeam,
}

impl MatchIntent {
    pub fn is_doubles(&self) -> bool {
        matches!(self, MatchIntent::DoublesSeeking | MatchIntent::DoublesTeam)
    }
}

/// Lightweight identity reference carried inside negotiations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerRef {
    pub id: Uuid,
    pub name: String,
}

/// Player snapshot from the external directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: Uuid,
    pub name: String,
    pub tier: SkillTier,
    pub ranking_points: u32,
    pub wins: u32,
    pub losses: u32,
    /// Distance from the viewing player, in kilometers.
    pub distance_km: f64,
    pub status: AvailabilityStatus,
    pub intent: MatchIntent,
    /// Set when intent is DoublesTeam.
    pub partner: Option<PlayerRef>,
}

impl Player {
    pub fn games_played(&self) -> u32 {
        self.wins + self.losses
    }

    /// Win rate in [0,1]; 0 for players with no recorded games.
    pub fn win_rate(&self) -> f64 {
        let games = self.games_played();
        if games == 0 {
            0.0
        } else {
            f64::from(self.wins) / f64::from(games)
        }
    }

    pub fn player_ref(&self) -> PlayerRef {
        PlayerRef {
            id: self.id,
            name: self.name.clone(),
        }
    }
}
