//! Discovery filter.
//!
//! Narrows the candidate pool to the set visible under the active mode.
//! Output order is input order; an empty result is a valid output, not an
//! error.

use serde::{Deserialize, Serialize};

use crate::models::{MatchIntent, Player};

/// Whether discovery is bounded by physical distance or searches globally.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "mode", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscoveryMode {
    Proximity { radius_km: f64 },
    Global,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchTypeFilter {
    #[default]
    All,
    SinglesOnly,
    DoublesOnly,
}

impl MatchTypeFilter {
    fn admits(&self, intent: MatchIntent) -> bool {
        match self {
            MatchTypeFilter::All => true,
            MatchTypeFilter::SinglesOnly => intent == MatchIntent::Singles,
            MatchTypeFilter::DoublesOnly => intent.is_doubles(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiscoveryParams {
    /// Case-insensitive substring match on display name.
    pub search: Option<String>,
    pub match_type: MatchTypeFilter,
}

/// Apply mode, search and match-type predicates to the pool.
pub fn filter_pool(
    pool: &[Player],
    mode: &DiscoveryMode,
    params: &DiscoveryParams,
) -> Vec<Player> {
    let needle = params
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    pool.iter()
        .filter(|player| match mode {
            DiscoveryMode::Proximity { radius_km } => player.distance_km <= *radius_km,
            DiscoveryMode::Global => true,
        })
        .filter(|player| match &needle {
            Some(needle) => player.name.to_lowercase().contains(needle),
            None => true,
        })
        .filter(|player| params.match_type.admits(player.intent))
        .cloned()
        .collect()
}
