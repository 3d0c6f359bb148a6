// Ranked pick recommendations for the user's next selection.

use serde::Serialize;
use tracing::debug;

use crate::draft::catalog::Player;
use crate::draft::state::DraftState;
use crate::error::{DraftError, Result};
use crate::valuation::scarcity::ScarcityProfile;
use crate::valuation::scoring::{score_breakdown, ScoreBreakdown, ScoringWeights};

/// One recommended player and why.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub player: Player,
    pub breakdown: ScoreBreakdown,
}

impl Recommendation {
    pub fn score(&self) -> f64 {
        self.breakdown.total
    }
}

/// Top `top_n` undrafted players the user's roster can still take, best
/// first.
///
/// Ties break by rank (lower first), then by player identity, so the order
/// is fully deterministic. Returns fewer than `top_n` when the eligible pool
/// is smaller; an empty pool yields an empty list.
pub fn recommend(
    state: &DraftState,
    profile: &ScarcityProfile,
    weights: &ScoringWeights,
    top_n: usize,
) -> Result<Vec<Recommendation>> {
    if top_n == 0 {
        return Err(DraftError::invalid_argument("top_n must be >= 1"));
    }

    let roster = state.roster();
    let mut scored = Vec::new();
    for player in state.available() {
        if !roster.can_accept(player.position()) {
            continue;
        }
        let breakdown = score_breakdown(player, state, profile, weights)?;
        scored.push(Recommendation {
            player: player.clone(),
            breakdown,
        });
    }

    scored.sort_by(|a, b| {
        b.breakdown
            .total
            .total_cmp(&a.breakdown.total)
            .then_with(|| a.player.rank.cmp(&b.player.rank))
            .then_with(|| a.player.id.cmp(&b.player.id))
    });

    debug!(
        "Scored {} eligible players at pick {}, returning top {}",
        scored.len(),
        state.pick_number(),
        top_n.min(scored.len())
    );

    scored.truncate(top_n);
    Ok(scored)
}
