//! End-to-end flows through the negotiation engine: discovery feeding
//! challenge creation, the ready-check handshake, partnership displacement
//! and the outbox event stream.

use uuid::Uuid;

use arena_negotiation::models::*;
use arena_negotiation::service::{DiscoveryMode, DiscoveryParams, MatchTypeFilter};
use arena_negotiation::{
    EngineConfig, MemorySink, NegotiationService, OutboxEvent, Roster,
};

fn player(name: &str, points: u32, wins: u32, losses: u32, distance_km: f64) -> Player {
    Player {
        id: Uuid::new_v4(),
        name: name.to_string(),
        tier: SkillTier::Competitive,
        ranking_points: points,
        wins,
        losses,
        distance_km,
        status: AvailabilityStatus::Online,
        intent: MatchIntent::Singles,
        partner: None,
    }
}

#[test]
fn discovery_to_confirmed_match() {
    let viewer = player("Viewer", 1200, 68, 32, 0.0);
    let near = player("Maria Santos", 1200, 68, 32, 0.5);
    let far = player("Jo Park", 1150, 60, 40, 3.5);

    let roster = Roster::from_players(vec![viewer.clone(), near.clone(), far.clone()]);
    let mut service = NegotiationService::with_roster(EngineConfig::default(), roster);

    // Proximity discovery at 2km sees only the near candidate, scored 100
    // for identical stats.
    let mode = DiscoveryMode::Proximity { radius_km: 2.0 };
    let candidates = service
        .discover(viewer.id, mode, &DiscoveryParams::default())
        .unwrap();
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].player.id, near.id);
    assert_eq!(candidates[0].score, 100);

    // Global discovery sees both regardless of distance.
    let all = service
        .discover(viewer.id, DiscoveryMode::Global, &DiscoveryParams::default())
        .unwrap();
    assert_eq!(all.len(), 2);

    // Challenge the discovered candidate and run the full handshake.
    let challenge = service
        .create_challenge(CreateChallenge {
            challenger_id: viewer.id,
            challenged_id: near.id,
            match_type: MatchType::Singles,
            message: Some("Court 4 in twenty?".to_string()),
            origin: Origin::Swipe,
        })
        .unwrap();
    assert_eq!(challenge.status, ChallengeStatus::Pending);

    service.accept_challenge(challenge.id, near.id).unwrap();
    service
        .set_challenge_ready(challenge.id, ChallengeSide::Challenger, viewer.id)
        .unwrap();
    let confirmed = service
        .set_challenge_ready(challenge.id, ChallengeSide::Challenged, near.id)
        .unwrap();
    assert_eq!(confirmed.status, ChallengeStatus::Confirmed);

    let started = service.start_challenge(challenge.id).unwrap();
    assert_eq!(started.id, challenge.id);

    // The outbox carries the audit trail plus the match-ready handoff.
    let sink = MemorySink::new();
    assert!(service.drain_outbox(&sink) > 0);
    let events = sink.events();

    let transitions: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            OutboxEvent::Transition {
                from_state,
                to_state,
                ..
            } => Some((from_state.as_str(), to_state.as_str())),
            _ => None,
        })
        .collect();
    assert!(transitions.contains(&("pending", "ready_check")));
    assert!(transitions.contains(&("ready_check", "confirmed")));

    assert!(events.iter().any(|e| matches!(
        e,
        OutboxEvent::MatchReady { challenge_id, match_type, .. }
            if *challenge_id == challenge.id && *match_type == MatchType::Singles
    )));
}

#[test]
fn radius_is_clamped_to_configured_range() {
    let viewer = player("Viewer", 1000, 10, 10, 0.0);
    let distant = player("Distant", 1000, 10, 10, 4.0);

    let roster = Roster::from_players(vec![viewer.clone(), distant.clone()]);
    let service = NegotiationService::with_roster(EngineConfig::default(), roster);

    // 50km is clamped down to the configured max of 5km, which still
    // includes a 4km candidate.
    let wide = service
        .discover(
            viewer.id,
            DiscoveryMode::Proximity { radius_km: 50.0 },
            &DiscoveryParams::default(),
        )
        .unwrap();
    assert_eq!(wide.len(), 1);

    // 0.1km is clamped up to the 0.5km minimum; the candidate stays out.
    let narrow = service
        .discover(
            viewer.id,
            DiscoveryMode::Proximity { radius_km: 0.1 },
            &DiscoveryParams::default(),
        )
        .unwrap();
    assert!(narrow.is_empty());
}

#[test]
fn search_and_match_type_narrow_the_pool() {
    let viewer = player("Viewer", 1000, 10, 10, 0.0);
    let mut seeker = player("Dana Reyes", 1000, 10, 10, 1.0);
    seeker.intent = MatchIntent::DoublesSeeking;
    let single = player("Dana Cho", 1000, 10, 10, 1.0);

    let roster = Roster::from_players(vec![viewer.clone(), seeker.clone(), single.clone()]);
    let service = NegotiationService::with_roster(EngineConfig::default(), roster);

    let params = DiscoveryParams {
        search: Some("dana".to_string()),
        match_type: MatchTypeFilter::DoublesOnly,
    };
    let found = service
        .discover(viewer.id, DiscoveryMode::Global, &params)
        .unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].player.id, seeker.id);
}

#[test]
fn partnership_lifecycle_with_displacement() {
    let ana = player("Ana", 1100, 20, 10, 1.0);
    let ben = player("Ben", 1050, 15, 15, 1.0);
    let cam = player("Cam", 1000, 10, 20, 1.0);

    let roster = Roster::from_players(vec![ana.clone(), ben.clone(), cam.clone()]);
    let mut service = NegotiationService::with_roster(EngineConfig::default(), roster);

    let pair_up = |service: &mut NegotiationService, requester: Uuid, target: Uuid| {
        let request = service
            .create_partner_request(CreatePartnerRequest {
                requester_id: requester,
                target_id: target,
                message: None,
                origin: Origin::Manual,
            })
            .unwrap();
        service.accept_partner_request(request.id, target).unwrap();
        service
            .set_partner_ready(request.id, PartnerSide::Requester, requester)
            .unwrap();
        service
            .set_partner_ready(request.id, PartnerSide::Target, target)
            .unwrap();
        request.id
    };

    pair_up(&mut service, ana.id, ben.id);
    assert!(service.partnership_for(ana.id).is_some());
    assert_eq!(
        service
            .partnership_for(ana.id)
            .unwrap()
            .counterpart_of(ana.id)
            .unwrap()
            .id,
        ben.id
    );

    // Ana accepts Cam instead: Ben is displaced back to seeking.
    pair_up(&mut service, cam.id, ana.id);
    assert!(service.partnership_for(ben.id).is_none());
    assert_eq!(
        service.roster().get(ben.id).unwrap().intent,
        MatchIntent::DoublesSeeking
    );

    let sink = MemorySink::new();
    service.drain_outbox(&sink);
    let events = sink.events();

    let formed = events
        .iter()
        .filter(|e| matches!(e, OutboxEvent::PartnershipFormed { .. }))
        .count();
    let dissolved = events
        .iter()
        .filter(|e| matches!(e, OutboxEvent::PartnershipDissolved { .. }))
        .count();
    assert_eq!(formed, 2);
    assert_eq!(dissolved, 1);

    // Explicit dissolution frees both current partners.
    service.dissolve_partnership(cam.id).unwrap();
    assert!(service.partnership_for(ana.id).is_none());
    assert!(service.partnership_for(cam.id).is_none());
}

#[test]
fn open_negotiations_listing_and_prune() {
    let a = player("A", 1000, 10, 10, 1.0);
    let b = player("B", 1000, 10, 10, 1.0);

    let roster = Roster::from_players(vec![a.clone(), b.clone()]);
    let mut service = NegotiationService::with_roster(EngineConfig::default(), roster);

    let first = service
        .create_challenge(CreateChallenge {
            challenger_id: a.id,
            challenged_id: b.id,
            match_type: MatchType::Singles,
            message: None,
            origin: Origin::CreateMatch,
        })
        .unwrap();
    let second = service
        .create_challenge(CreateChallenge {
            challenger_id: b.id,
            challenged_id: a.id,
            match_type: MatchType::Singles,
            message: None,
            origin: Origin::Manual,
        })
        .unwrap();

    assert_eq!(service.open_challenges_for(a.id).len(), 2);

    service.decline_challenge(first.id, b.id).unwrap();
    assert_eq!(service.open_challenges_for(a.id).len(), 1);
    assert_eq!(service.open_challenges_for(a.id)[0].id, second.id);

    assert_eq!(service.prune_settled(), 1);
    assert!(service.challenge(first.id).is_err());
    assert!(service.challenge(second.id).is_ok());
}
