//! In-memory negotiation store.
//!
//! Owned exclusively by the session that created it; the sole mutator of
//! negotiation state. All mutation goes through the state-machine API in
//! `service::negotiation`, never through direct external writes.

use std::collections::BTreeMap;

use uuid::Uuid;

use crate::error::EngineError;
use crate::models::{Challenge, NegotiationId, PartnerRequest};

#[derive(Debug, Default)]
pub struct NegotiationStore {
    next_id: NegotiationId,
    challenges: BTreeMap<NegotiationId, Challenge>,
    partner_requests: BTreeMap<NegotiationId, PartnerRequest>,
}

impl NegotiationStore {
    pub fn new() -> Self {
        NegotiationStore {
            next_id: 1,
            challenges: BTreeMap::new(),
            partner_requests: BTreeMap::new(),
        }
    }

    /// Insert a challenge built from the next creation-ordered id.
    pub fn add_challenge(
        &mut self,
        make: impl FnOnce(NegotiationId) -> Challenge,
    ) -> NegotiationId {
        let id = self.allocate_id();
        self.challenges.insert(id, make(id));
        id
    }

    pub fn add_partner_request(
        &mut self,
        make: impl FnOnce(NegotiationId) -> PartnerRequest,
    ) -> NegotiationId {
        let id = self.allocate_id();
        self.partner_requests.insert(id, make(id));
        id
    }

    fn allocate_id(&mut self) -> NegotiationId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn challenge(&self, id: NegotiationId) -> Result<&Challenge, EngineError> {
        self.challenges
            .get(&id)
            .ok_or(EngineError::StaleNegotiation(id))
    }

    pub fn challenge_mut(&mut self, id: NegotiationId) -> Result<&mut Challenge, EngineError> {
        self.challenges
            .get_mut(&id)
            .ok_or(EngineError::StaleNegotiation(id))
    }

    pub fn remove_challenge(&mut self, id: NegotiationId) -> Result<Challenge, EngineError> {
        self.challenges
            .remove(&id)
            .ok_or(EngineError::StaleNegotiation(id))
    }

    pub fn partner_request(&self, id: NegotiationId) -> Result<&PartnerRequest, EngineError> {
        self.partner_requests
            .get(&id)
            .ok_or(EngineError::StaleNegotiation(id))
    }

    pub fn partner_request_mut(
        &mut self,
        id: NegotiationId,
    ) -> Result<&mut PartnerRequest, EngineError> {
        self.partner_requests
            .get_mut(&id)
            .ok_or(EngineError::StaleNegotiation(id))
    }

    /// Open (non-terminal) challenges involving a player, in creation order.
    pub fn open_challenges_for(&self, player: Uuid) -> Vec<&Challenge> {
        self.challenges
            .values()
            .filter(|c| !c.status.is_terminal() && c.involves(player))
            .collect()
    }

    pub fn open_partner_requests_for(&self, player: Uuid) -> Vec<&PartnerRequest> {
        self.partner_requests
            .values()
            .filter(|r| !r.status.is_terminal() && r.involves(player))
            .collect()
    }

    pub fn challenges(&self) -> impl Iterator<Item = &Challenge> {
        self.challenges.values()
    }

    pub fn partner_requests(&self) -> impl Iterator<Item = &PartnerRequest> {
        self.partner_requests.values()
    }

    /// Drop settled records; returns how many were removed. The UI layer
    /// calls this to keep long-lived sessions bounded. Confirmed challenges
    /// are kept: only `start` may consume them.
    pub fn prune_settled(&mut self) -> usize {
        let before = self.challenges.len() + self.partner_requests.len();
        self.challenges.retain(|_, c| !c.status.is_settled());
        self.partner_requests.retain(|_, r| !r.status.is_terminal());
        before - (self.challenges.len() + self.partner_requests.len())
    }
}
