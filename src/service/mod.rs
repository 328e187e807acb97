// Service layer for the negotiation engine
pub mod discovery;
pub mod negotiation;
pub mod partnership;
pub mod scoring;

pub use discovery::{filter_pool, DiscoveryMode, DiscoveryParams, MatchTypeFilter};
pub use negotiation::NegotiationService;
pub use partnership::PartnershipManager;
pub use scoring::{compatibility_score, score_pool, ScoredCandidate, SCORE_CEILING, SCORE_FLOOR};
