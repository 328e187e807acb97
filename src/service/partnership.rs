//! Partnership manager.
//!
//! Tracks at most one active partnership per player. Forming a new pairing
//! dissolves any stale partnership either party still holds, so auto-accept
//! flows can never leave a player double-partnered.

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use crate::models::{Partnership, PlayerRef};

#[derive(Debug, Default)]
pub struct PartnershipManager {
    active: Vec<Partnership>,
}

impl PartnershipManager {
    pub fn new() -> Self {
        PartnershipManager::default()
    }

    pub fn partnership_for(&self, player: Uuid) -> Option<&Partnership> {
        self.active.iter().find(|p| p.involves(player))
    }

    pub fn has_partner(&self, player: Uuid) -> bool {
        self.partnership_for(player).is_some()
    }

    /// Form a partnership between `a` and `b`, dissolving any existing
    /// pairing either of them holds first. Returns the new partnership and
    /// the pairings that were displaced.
    pub fn form(
        &mut self,
        a: PlayerRef,
        b: PlayerRef,
        formed_at: DateTime<Utc>,
    ) -> (Partnership, Vec<Partnership>) {
        let mut displaced = Vec::new();
        if let Some(old) = self.dissolve(a.id) {
            displaced.push(old);
        }
        if let Some(old) = self.dissolve(b.id) {
            displaced.push(old);
        }

        info!(
            player_a = %a.id,
            player_b = %b.id,
            displaced = displaced.len(),
            "Partnership formed"
        );

        let partnership = Partnership { a, b, formed_at };
        self.active.push(partnership.clone());
        (partnership, displaced)
    }

    /// Remove the partnership involving `player`, if any. No-op when the
    /// player is unpartnered.
    pub fn dissolve(&mut self, player: Uuid) -> Option<Partnership> {
        let index = self.active.iter().position(|p| p.involves(player))?;
        let partnership = self.active.swap_remove(index);
        info!(
            player_a = %partnership.a.id,
            player_b = %partnership.b.id,
            "Partnership dissolved"
        );
        Some(partnership)
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }
}
