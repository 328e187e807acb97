//! Compatibility scorer.
//!
//! Pure heuristic estimating competitive balance between the viewer and a
//! candidate from ranking-point, win-rate and experience distance. Scores
//! are floored at 20 so every candidate stays nominally challengeable.

use serde::{Deserialize, Serialize};

use crate::models::Player;

pub const SCORE_FLOOR: u8 = 20;
pub const SCORE_CEILING: u8 = 100;

const POINTS_SPAN: f64 = 1000.0;
const WIN_RATE_SPAN: f64 = 0.3;
const EXPERIENCE_SPAN: f64 = 50.0;

const POINTS_WEIGHT: f64 = 0.5;
const WIN_RATE_WEIGHT: f64 = 0.3;
const EXPERIENCE_WEIGHT: f64 = 0.2;

/// Compatibility between two players, in [20, 100]. Deterministic and
/// symmetric in its inputs.
pub fn compatibility_score(viewer: &Player, candidate: &Player) -> u8 {
    let points_gap = f64::from(candidate.ranking_points.abs_diff(viewer.ranking_points));
    let points_compat = axis_compat(points_gap, POINTS_SPAN);

    let win_rate_gap = (candidate.win_rate() - viewer.win_rate()).abs();
    let win_rate_compat = axis_compat(win_rate_gap, WIN_RATE_SPAN);

    let experience_gap = f64::from(candidate.games_played().abs_diff(viewer.games_played()));
    let experience_compat = axis_compat(experience_gap, EXPERIENCE_SPAN);

    let raw = 100.0
        * (POINTS_WEIGHT * points_compat
            + WIN_RATE_WEIGHT * win_rate_compat
            + EXPERIENCE_WEIGHT * experience_compat);

    (raw.round() as u8).max(SCORE_FLOOR)
}

/// Distance on one axis mapped to [0,1] compatibility over its span.
fn axis_compat(gap: f64, span: f64) -> f64 {
    ((span - gap) / span).clamp(0.0, 1.0)
}

/// Candidate annotated with its score against the viewer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub player: Player,
    pub score: u8,
}

/// Annotate a candidate pool, preserving input order.
pub fn score_pool(viewer: &Player, pool: Vec<Player>) -> Vec<ScoredCandidate> {
    pool.into_iter()
        .map(|player| {
            let score = compatibility_score(viewer, &player);
            ScoredCandidate { player, score }
        })
        .collect()
}
