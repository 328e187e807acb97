//! Player directory seam.
//!
//! Identity, tier, ranking and location come from an external directory;
//! this engine only reads them. `Roster` is the local session view the
//! embedding client keeps synchronized from directory snapshots.

use std::collections::HashMap;

use uuid::Uuid;

use crate::models::{MatchIntent, Player, PlayerRef};

/// Inbound candidate lookup consumed by the discovery filter.
pub trait PlayerDirectory {
    /// Every known player except the viewer, in directory order.
    fn candidates(&self, viewer: Uuid) -> Vec<Player>;

    fn lookup(&self, id: Uuid) -> Option<Player>;
}

/// Local session view of the player pool.
#[derive(Debug, Default)]
pub struct Roster {
    players: HashMap<Uuid, Player>,
    order: Vec<Uuid>,
}

impl Roster {
    pub fn new() -> Self {
        Roster::default()
    }

    pub fn from_players(players: Vec<Player>) -> Self {
        let mut roster = Roster::new();
        for player in players {
            roster.upsert(player);
        }
        roster
    }

    /// Insert or refresh a directory snapshot. Insertion order is kept so
    /// discovery output stays stable across refreshes.
    pub fn upsert(&mut self, player: Player) {
        if !self.players.contains_key(&player.id) {
            self.order.push(player.id);
        }
        self.players.insert(player.id, player);
    }

    pub fn get(&self, id: Uuid) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn set_intent(&mut self, id: Uuid, intent: MatchIntent) -> bool {
        match self.players.get_mut(&id) {
            Some(player) => {
                player.intent = intent;
                true
            }
            None => false,
        }
    }

    pub fn set_partner(&mut self, id: Uuid, partner: Option<PlayerRef>) -> bool {
        match self.players.get_mut(&id) {
            Some(player) => {
                player.partner = partner;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

impl PlayerDirectory for Roster {
    fn candidates(&self, viewer: Uuid) -> Vec<Player> {
        self.order
            .iter()
            .filter(|id| **id != viewer)
            .filter_map(|id| self.players.get(id))
            .cloned()
            .collect()
    }

    fn lookup(&self, id: Uuid) -> Option<Player> {
        self.players.get(&id).cloned()
    }
}
