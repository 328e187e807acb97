//! Negotiation service - state machine enforcer for challenges and partner
//! requests.
//!
//! The service owns the store, the partnership manager and the outbox for a
//! single session. Local state is updated optimistically; every accepted
//! transition appends an audit event to the outbox for best-effort delivery
//! to the counterpart's view.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

use crate::config::EngineConfig;
use crate::directory::{PlayerDirectory, Roster};
use crate::error::EngineError;
use crate::models::*;
use crate::outbox::{EventSink, Outbox, OutboxEvent};
use crate::service::discovery::{filter_pool, DiscoveryMode, DiscoveryParams};
use crate::service::partnership::PartnershipManager;
use crate::service::scoring::{score_pool, ScoredCandidate};
use crate::store::NegotiationStore;

pub struct NegotiationService {
    config: EngineConfig,
    roster: Roster,
    store: NegotiationStore,
    partnerships: PartnershipManager,
    outbox: Outbox,
}

impl NegotiationService {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_roster(config, Roster::new())
    }

    pub fn with_roster(config: EngineConfig, roster: Roster) -> Self {
        NegotiationService {
            config,
            roster,
            store: NegotiationStore::new(),
            partnerships: PartnershipManager::new(),
            outbox: Outbox::new(),
        }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Refresh the local session view from a directory snapshot.
    pub fn sync_roster(&mut self, players: Vec<Player>) {
        for player in players {
            self.roster.upsert(player);
        }
    }

    // =========================================================================
    // DISCOVERY
    // =========================================================================

    /// Proximity mode at the configured default radius.
    pub fn default_mode(&self) -> DiscoveryMode {
        DiscoveryMode::Proximity {
            radius_km: self.config.discovery.default_radius_km,
        }
    }

    /// Visible candidates for the viewer, annotated with compatibility
    /// scores. Requested proximity radii are clamped to the configured range.
    pub fn discover(
        &self,
        viewer: Uuid,
        mode: DiscoveryMode,
        params: &DiscoveryParams,
    ) -> Result<Vec<ScoredCandidate>, EngineError> {
        let viewer_player = self
            .roster
            .get(viewer)
            .ok_or(EngineError::UnknownPlayer(viewer))?;

        // Not `clamp`: a hand-built config may carry min > max, which must
        // not panic here.
        let mode = match mode {
            DiscoveryMode::Proximity { radius_km } => DiscoveryMode::Proximity {
                radius_km: radius_km
                    .max(self.config.discovery.min_radius_km)
                    .min(self.config.discovery.max_radius_km),
            },
            DiscoveryMode::Global => DiscoveryMode::Global,
        };

        let pool = self.roster.candidates(viewer);
        let visible = filter_pool(&pool, &mode, params);
        Ok(score_pool(viewer_player, visible))
    }

    // =========================================================================
    // CHALLENGES
    // =========================================================================

    /// Create a challenge in PENDING state.
    /// Preconditions: the target is online or available, and a team
    /// challenge requires the challenger to already hold a partnership.
    pub fn create_challenge(&mut self, dto: CreateChallenge) -> Result<Challenge, EngineError> {
        dto.validate()?;

        if dto.challenger_id == dto.challenged_id {
            return Err(EngineError::SelfNegotiation(dto.challenger_id));
        }

        let challenger = self
            .roster
            .get(dto.challenger_id)
            .ok_or(EngineError::UnknownPlayer(dto.challenger_id))?
            .player_ref();
        let challenged = self
            .roster
            .get(dto.challenged_id)
            .ok_or(EngineError::UnknownPlayer(dto.challenged_id))?;

        if !challenged.status.is_challengeable() {
            return Err(EngineError::CandidateUnavailable {
                id: challenged.id,
                status: challenged.status,
            });
        }

        if dto.match_type == MatchType::DoublesTeam
            && !self.partnerships.has_partner(dto.challenger_id)
        {
            return Err(EngineError::PartnerRequired);
        }

        let challenged = challenged.player_ref();
        let created_at = Utc::now();
        let message = dto.message;
        let id = self.store.add_challenge(|id| Challenge {
            id,
            challenger,
            challenged,
            match_type: dto.match_type,
            message,
            created_via: dto.origin,
            status: ChallengeStatus::Pending,
            ready: ReadyStatus::default(),
            created_at,
            transitions: vec![],
        });

        let challenge = self.store.challenge_mut(id)?;
        record_challenge_transition(
            challenge,
            &mut self.outbox,
            ChallengeStatus::Pending,
            ChallengeStatus::Pending,
            Actor::Player(dto.challenger_id),
        );

        info!(
            challenge_id = id,
            challenger = %challenge.challenger.id,
            challenged = %challenge.challenged.id,
            match_type = %challenge.match_type,
            origin = %challenge.created_via,
            "Challenge created"
        );

        Ok(challenge.clone())
    }

    /// Accept a challenge (PENDING -> READY_CHECK). Both ready flags start
    /// false.
    pub fn accept_challenge(
        &mut self,
        id: NegotiationId,
        actor: Uuid,
    ) -> Result<Challenge, EngineError> {
        let challenge = self.store.challenge_mut(id)?;
        transition_challenge(
            challenge,
            &mut self.outbox,
            ChallengeStatus::ReadyCheck,
            Actor::Player(actor),
        )?;
        challenge.ready = ReadyStatus::default();
        Ok(challenge.clone())
    }

    /// Toggle one side's ready flag. When both flags are set the challenge
    /// advances to CONFIRMED as a consequence, never as a separate call.
    pub fn set_challenge_ready(
        &mut self,
        id: NegotiationId,
        side: ChallengeSide,
        actor: Uuid,
    ) -> Result<Challenge, EngineError> {
        let challenge = self.store.challenge_mut(id)?;
        match challenge.status {
            ChallengeStatus::ReadyCheck => {}
            s if s.is_terminal() => return Err(EngineError::StaleNegotiation(id)),
            s => return Err(EngineError::invalid_transition(s, ChallengeStatus::Confirmed)),
        }

        match side {
            ChallengeSide::Challenger => {
                challenge.ready.challenger_ready = !challenge.ready.challenger_ready;
            }
            ChallengeSide::Challenged => {
                challenge.ready.challenged_ready = !challenge.ready.challenged_ready;
            }
        }
        debug!(
            challenge_id = id,
            side = ?side,
            ready = ?challenge.ready,
            "Ready flag toggled"
        );

        if challenge.ready.both_ready() {
            transition_challenge(
                challenge,
                &mut self.outbox,
                ChallengeStatus::Confirmed,
                Actor::Player(actor),
            )?;
        }
        Ok(challenge.clone())
    }

    /// Decline a challenge (PENDING|READY_CHECK -> DECLINED). Declining out
    /// of the ready-check additionally emits a withdrawal audit event.
    pub fn decline_challenge(
        &mut self,
        id: NegotiationId,
        actor: Uuid,
    ) -> Result<Challenge, EngineError> {
        let challenge = self.store.challenge_mut(id)?;
        let withdrawn = challenge.status == ChallengeStatus::ReadyCheck;
        transition_challenge(
            challenge,
            &mut self.outbox,
            ChallengeStatus::Declined,
            Actor::Player(actor),
        )?;
        if withdrawn {
            self.outbox.push(OutboxEvent::Withdrawn {
                negotiation_id: id,
                actor: Actor::Player(actor),
                at: Utc::now(),
            });
            info!(challenge_id = id, actor = %actor, "Withdrawal after acceptance");
        }
        Ok(challenge.clone())
    }

    /// Expire a pending challenge. Fired by the external scheduler; the
    /// engine exposes the transition, not the timer.
    pub fn expire_challenge(&mut self, id: NegotiationId) -> Result<Challenge, EngineError> {
        let challenge = self.store.challenge_mut(id)?;
        transition_challenge(
            challenge,
            &mut self.outbox,
            ChallengeStatus::Expired,
            Actor::Scheduler,
        )?;
        Ok(challenge.clone())
    }

    /// Hand a confirmed challenge off for match recording. The record is
    /// consumed and removed from the active store.
    pub fn start_challenge(&mut self, id: NegotiationId) -> Result<Challenge, EngineError> {
        match self.store.challenge(id)?.status {
            ChallengeStatus::Confirmed => {}
            ChallengeStatus::Declined | ChallengeStatus::Expired => {
                return Err(EngineError::StaleNegotiation(id));
            }
            s => return Err(EngineError::invalid_transition(s, "started")),
        }

        let challenge = self.store.remove_challenge(id)?;
        self.outbox.push(OutboxEvent::MatchReady {
            challenge_id: challenge.id,
            challenger_id: challenge.challenger.id,
            challenged_id: challenge.challenged.id,
            match_type: challenge.match_type,
        });
        info!(
            challenge_id = id,
            match_type = %challenge.match_type,
            "Challenge handed off for match recording"
        );
        Ok(challenge)
    }

    // =========================================================================
    // PARTNER REQUESTS
    // =========================================================================

    /// Create a partner request in PENDING state. The target must be online
    /// or available, same as for challenges.
    pub fn create_partner_request(
        &mut self,
        dto: CreatePartnerRequest,
    ) -> Result<PartnerRequest, EngineError> {
        dto.validate()?;

        if dto.requester_id == dto.target_id {
            return Err(EngineError::SelfNegotiation(dto.requester_id));
        }

        let requester = self
            .roster
            .get(dto.requester_id)
            .ok_or(EngineError::UnknownPlayer(dto.requester_id))?
            .player_ref();
        let target = self
            .roster
            .get(dto.target_id)
            .ok_or(EngineError::UnknownPlayer(dto.target_id))?;

        if !target.status.is_challengeable() {
            return Err(EngineError::CandidateUnavailable {
                id: target.id,
                status: target.status,
            });
        }

        let target = target.player_ref();
        let created_at = Utc::now();
        let message = dto.message;
        let id = self.store.add_partner_request(|id| PartnerRequest {
            id,
            requester,
            target,
            message,
            created_via: dto.origin,
            status: PartnerRequestStatus::Pending,
            ready: PartnerReadyStatus::default(),
            created_at,
            transitions: vec![],
        });

        let request = self.store.partner_request_mut(id)?;
        record_partner_transition(
            request,
            &mut self.outbox,
            PartnerRequestStatus::Pending,
            PartnerRequestStatus::Pending,
            Actor::Player(dto.requester_id),
        );

        info!(
            request_id = id,
            requester = %request.requester.id,
            target = %request.target.id,
            origin = %request.created_via,
            "Partner request created"
        );

        Ok(request.clone())
    }

    /// Accept a partner request. Under the ready-check policy this enters
    /// READY_CHECK; under the immediate policy it forms the partnership at
    /// once.
    pub fn accept_partner_request(
        &mut self,
        id: NegotiationId,
        actor: Uuid,
    ) -> Result<PartnerRequest, EngineError> {
        match self.config.negotiation.partner_accept_policy {
            PartnerAcceptPolicy::ReadyCheck => {
                let request = self.store.partner_request_mut(id)?;
                transition_partner_request(
                    request,
                    &mut self.outbox,
                    PartnerRequestStatus::ReadyCheck,
                    Actor::Player(actor),
                )?;
                request.ready = PartnerReadyStatus::default();
                Ok(request.clone())
            }
            PartnerAcceptPolicy::Immediate => {
                let request = self.store.partner_request_mut(id)?;
                transition_partner_request(
                    request,
                    &mut self.outbox,
                    PartnerRequestStatus::Accepted,
                    Actor::Player(actor),
                )?;
                let snapshot = request.clone();
                self.finalize_partnership(snapshot.requester.clone(), snapshot.target.clone());
                Ok(snapshot)
            }
        }
    }

    /// Toggle one side's ready flag on a partner request in READY_CHECK.
    /// Both flags set advances to ACCEPTED and forms the partnership.
    pub fn set_partner_ready(
        &mut self,
        id: NegotiationId,
        side: PartnerSide,
        actor: Uuid,
    ) -> Result<PartnerRequest, EngineError> {
        let request = self.store.partner_request_mut(id)?;
        match request.status {
            PartnerRequestStatus::ReadyCheck => {}
            s if s.is_terminal() => return Err(EngineError::StaleNegotiation(id)),
            s => {
                return Err(EngineError::invalid_transition(
                    s,
                    PartnerRequestStatus::Accepted,
                ))
            }
        }

        match side {
            PartnerSide::Requester => {
                request.ready.requester_ready = !request.ready.requester_ready;
            }
            PartnerSide::Target => {
                request.ready.target_ready = !request.ready.target_ready;
            }
        }
        debug!(request_id = id, side = ?side, ready = ?request.ready, "Ready flag toggled");

        if request.ready.both_ready() {
            transition_partner_request(
                request,
                &mut self.outbox,
                PartnerRequestStatus::Accepted,
                Actor::Player(actor),
            )?;
            let snapshot = request.clone();
            self.finalize_partnership(snapshot.requester.clone(), snapshot.target.clone());
            return Ok(snapshot);
        }
        Ok(request.clone())
    }

    /// Decline a partner request; withdrawal from READY_CHECK is audited
    /// separately, as for challenges.
    pub fn decline_partner_request(
        &mut self,
        id: NegotiationId,
        actor: Uuid,
    ) -> Result<PartnerRequest, EngineError> {
        let request = self.store.partner_request_mut(id)?;
        let withdrawn = request.status == PartnerRequestStatus::ReadyCheck;
        transition_partner_request(
            request,
            &mut self.outbox,
            PartnerRequestStatus::Declined,
            Actor::Player(actor),
        )?;
        if withdrawn {
            self.outbox.push(OutboxEvent::Withdrawn {
                negotiation_id: id,
                actor: Actor::Player(actor),
                at: Utc::now(),
            });
            info!(request_id = id, actor = %actor, "Withdrawal after acceptance");
        }
        Ok(request.clone())
    }

    pub fn expire_partner_request(
        &mut self,
        id: NegotiationId,
    ) -> Result<PartnerRequest, EngineError> {
        let request = self.store.partner_request_mut(id)?;
        transition_partner_request(
            request,
            &mut self.outbox,
            PartnerRequestStatus::Expired,
            Actor::Scheduler,
        )?;
        Ok(request.clone())
    }

    /// Expire every pending negotiation past the configured window. Driven
    /// by the external scheduler's tick.
    pub fn expire_overdue(
        &mut self,
        now: DateTime<Utc>,
    ) -> Result<Vec<NegotiationId>, EngineError> {
        let window = Duration::seconds(self.config.negotiation.expiry_secs);
        let challenge_ids: Vec<_> = self
            .store
            .challenges()
            .filter(|c| c.is_expirable(now, window))
            .map(|c| c.id)
            .collect();
        let request_ids: Vec<_> = self
            .store
            .partner_requests()
            .filter(|r| r.is_expirable(now, window))
            .map(|r| r.id)
            .collect();

        let mut expired = Vec::with_capacity(challenge_ids.len() + request_ids.len());
        for id in challenge_ids {
            self.expire_challenge(id)?;
            expired.push(id);
        }
        for id in request_ids {
            self.expire_partner_request(id)?;
            expired.push(id);
        }
        Ok(expired)
    }

    // =========================================================================
    // PARTNERSHIPS
    // =========================================================================

    fn finalize_partnership(&mut self, requester: PlayerRef, target: PlayerRef) {
        let (partnership, displaced) =
            self.partnerships
                .form(requester.clone(), target.clone(), Utc::now());

        for old in &displaced {
            for member in old.members() {
                if member.id != requester.id && member.id != target.id {
                    self.roster.set_intent(member.id, MatchIntent::DoublesSeeking);
                    self.roster.set_partner(member.id, None);
                }
            }
            self.outbox.push(OutboxEvent::PartnershipDissolved {
                player_a: old.a.id,
                player_b: old.b.id,
            });
        }

        self.roster.set_intent(requester.id, MatchIntent::DoublesTeam);
        self.roster.set_partner(requester.id, Some(target.clone()));
        self.roster.set_intent(target.id, MatchIntent::DoublesTeam);
        self.roster.set_partner(target.id, Some(requester.clone()));

        self.outbox.push(OutboxEvent::PartnershipFormed {
            player_a: partnership.a.id,
            player_b: partnership.b.id,
        });
    }

    /// Dissolve the partnership involving `player`, returning both members
    /// to doubles-seeking intent. No-op when the player is unpartnered.
    pub fn dissolve_partnership(&mut self, player: Uuid) -> Option<Partnership> {
        let partnership = self.partnerships.dissolve(player)?;
        for member in partnership.members() {
            self.roster.set_intent(member.id, MatchIntent::DoublesSeeking);
            self.roster.set_partner(member.id, None);
        }
        self.outbox.push(OutboxEvent::PartnershipDissolved {
            player_a: partnership.a.id,
            player_b: partnership.b.id,
        });
        Some(partnership)
    }

    pub fn partnership_for(&self, player: Uuid) -> Option<&Partnership> {
        self.partnerships.partnership_for(player)
    }

    // =========================================================================
    // QUERIES & OUTBOX
    // =========================================================================

    pub fn challenge(&self, id: NegotiationId) -> Result<&Challenge, EngineError> {
        self.store.challenge(id)
    }

    pub fn partner_request(&self, id: NegotiationId) -> Result<&PartnerRequest, EngineError> {
        self.store.partner_request(id)
    }

    pub fn open_challenges_for(&self, player: Uuid) -> Vec<&Challenge> {
        self.store.open_challenges_for(player)
    }

    pub fn open_partner_requests_for(&self, player: Uuid) -> Vec<&PartnerRequest> {
        self.store.open_partner_requests_for(player)
    }

    pub fn prune_settled(&mut self) -> usize {
        self.store.prune_settled()
    }

    pub fn pending_outbox(&self) -> usize {
        self.outbox.len()
    }

    /// Drain queued events into the external push channel. Best-effort:
    /// failures are logged and dropped, the external layer owns retry.
    pub fn drain_outbox(&mut self, sink: &dyn EventSink) -> usize {
        self.outbox.drain_into(sink)
    }
}

/// Apply a validated challenge transition: status change, per-record audit
/// trail, outbox event.
fn transition_challenge(
    challenge: &mut Challenge,
    outbox: &mut Outbox,
    to: ChallengeStatus,
    actor: Actor,
) -> Result<(), EngineError> {
    let from = challenge.status;
    if from.is_terminal() {
        return Err(EngineError::StaleNegotiation(challenge.id));
    }
    if !from.can_transition_to(&to) {
        return Err(EngineError::invalid_transition(from, to));
    }
    challenge.status = to;
    record_challenge_transition(challenge, outbox, from, to, actor);
    info!(
        challenge_id = challenge.id,
        from_state = %from,
        to_state = %to,
        actor = %actor,
        "Challenge transition"
    );
    Ok(())
}

fn transition_partner_request(
    request: &mut PartnerRequest,
    outbox: &mut Outbox,
    to: PartnerRequestStatus,
    actor: Actor,
) -> Result<(), EngineError> {
    let from = request.status;
    if from.is_terminal() {
        return Err(EngineError::StaleNegotiation(request.id));
    }
    if !from.can_transition_to(&to) {
        return Err(EngineError::invalid_transition(from, to));
    }
    request.status = to;
    record_partner_transition(request, outbox, from, to, actor);
    info!(
        request_id = request.id,
        from_state = %from,
        to_state = %to,
        actor = %actor,
        "Partner request transition"
    );
    Ok(())
}

fn record_challenge_transition(
    challenge: &mut Challenge,
    outbox: &mut Outbox,
    from: ChallengeStatus,
    to: ChallengeStatus,
    actor: Actor,
) {
    let at = Utc::now();
    challenge.transitions.push(TransitionRecord { from, to, actor, at });
    outbox.push(OutboxEvent::Transition {
        negotiation_id: challenge.id,
        from_state: from.to_string(),
        to_state: to.to_string(),
        actor,
        at,
    });
}

fn record_partner_transition(
    request: &mut PartnerRequest,
    outbox: &mut Outbox,
    from: PartnerRequestStatus,
    to: PartnerRequestStatus,
    actor: Actor,
) {
    let at = Utc::now();
    request.transitions.push(TransitionRecord { from, to, actor, at });
    outbox.push(OutboxEvent::Transition {
        negotiation_id: request.id,
        from_state: from.to_string(),
        to_state: to.to_string(),
        actor,
        at,
    });
}
