// Composite player scoring.
//
// score = w_rank * rank_value + w_proj * projection_value
//       + w_scarcity * scarcity(pos) + need_bonus (if the roster can still use pos)
//
// rank_value and projection_value are normalized to [0, 1] over the full
// catalog, so the weights trade off comparable quantities.

use serde::{Deserialize, Serialize};

use crate::draft::catalog::{Player, PlayerCatalog};
use crate::draft::roster::RosterModel;
use crate::draft::state::DraftState;
use crate::error::{DraftError, Result};
use crate::valuation::scarcity::ScarcityProfile;

/// Default flat bonus for a player whose position the roster can still take.
pub const DEFAULT_NEED_BONUS: f64 = 0.5;

/// Which open roster spots earn the need bonus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeedMode {
    /// Any open slot, bench included.
    #[default]
    OpenSlots,
    /// Only unfilled starting slots (direct or FLEX).
    Starting,
}

/// Scoring weights. All components are finite and non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoringWeights {
    rank: f64,
    projection: f64,
    scarcity: f64,
    need_bonus: f64,
    need_mode: NeedMode,
}

impl ScoringWeights {
    pub fn new(rank: f64, projection: f64, scarcity: f64, need_bonus: f64) -> Result<Self> {
        for (name, value) in [
            ("rank", rank),
            ("projection", projection),
            ("scarcity", scarcity),
            ("need_bonus", need_bonus),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(DraftError::invalid_argument(format!(
                    "weight {name} must be a finite non-negative number, got {value}"
                )));
            }
        }
        Ok(ScoringWeights {
            rank,
            projection,
            scarcity,
            need_bonus,
            need_mode: NeedMode::default(),
        })
    }

    pub fn with_need_mode(mut self, need_mode: NeedMode) -> Self {
        self.need_mode = need_mode;
        self
    }

    pub fn rank(&self) -> f64 {
        self.rank
    }

    pub fn projection(&self) -> f64 {
        self.projection
    }

    pub fn scarcity(&self) -> f64 {
        self.scarcity
    }

    pub fn need_bonus(&self) -> f64 {
        self.need_bonus
    }

    pub fn need_mode(&self) -> NeedMode {
        self.need_mode
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        ScoringWeights {
            rank: 1.0,
            projection: 1.0,
            scarcity: 1.0,
            need_bonus: DEFAULT_NEED_BONUS,
            need_mode: NeedMode::OpenSlots,
        }
    }
}

/// Weighted contribution of each score component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub rank: f64,
    pub projection: f64,
    pub scarcity: f64,
    pub need: f64,
    pub total: f64,
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Rank mapped to [0, 1] over the catalog: best rank 1.0, worst 0.0.
/// A catalog where every rank is equal maps everyone to 1.0.
pub fn normalized_rank_value(catalog: &PlayerCatalog, player: &Player) -> f64 {
    let (best, worst) = catalog.rank_range();
    if worst <= best {
        return 1.0;
    }
    let rank = player.rank.clamp(best, worst);
    f64::from(worst - rank) / f64::from(worst - best)
}

/// Projection mapped to [0, 1] over the catalog. Players without a
/// projection contribute 0.0.
pub fn normalized_projection(catalog: &PlayerCatalog, player: &Player) -> f64 {
    let Some(points) = player.projected_points else {
        return 0.0;
    };
    match catalog.projection_range() {
        Some((lo, hi)) if hi > lo => ((points - lo) / (hi - lo)).clamp(0.0, 1.0),
        Some(_) => 1.0,
        None => 0.0,
    }
}

/// Need bonus for `player` given the user's current roster.
///
/// With [`NeedMode::OpenSlots`] bench space counts as an open slot for any
/// position, so the bonus only drops once nothing on the roster can take
/// the player.
pub fn need_bonus(player: &Player, roster: &RosterModel, weights: &ScoringWeights) -> f64 {
    let open = match weights.need_mode() {
        NeedMode::OpenSlots => roster.open_slots(),
        NeedMode::Starting => roster.starting_needs(),
    };
    if open.contains(&player.position()) {
        weights.need_bonus()
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Full score breakdown for an undrafted player.
pub fn score_breakdown(
    player: &Player,
    state: &DraftState,
    profile: &ScarcityProfile,
    weights: &ScoringWeights,
) -> Result<ScoreBreakdown> {
    if !state.is_available(&player.id) {
        return Err(DraftError::PlayerUnavailable {
            identity: player.id.to_string(),
        });
    }

    let catalog = state.catalog();
    let rank = weights.rank() * normalized_rank_value(catalog, player);
    let projection = weights.projection() * normalized_projection(catalog, player);
    let scarcity = weights.scarcity() * profile.scarcity(player.position());
    let need = need_bonus(player, state.roster(), weights);

    Ok(ScoreBreakdown {
        rank,
        projection,
        scarcity,
        need,
        total: rank + projection + scarcity + need,
    })
}

/// Composite score for an undrafted player.
pub fn score(
    player: &Player,
    state: &DraftState,
    profile: &ScarcityProfile,
    weights: &ScoringWeights,
) -> Result<f64> {
    score_breakdown(player, state, profile, weights).map(|b| b.total)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use super::*;
    use crate::draft::catalog::{PlayerId, PlayerRow};
    use crate::draft::position::Position;
    use crate::draft::roster::{RosterSlot, SlotKind};
    use crate::draft::state::DraftOrder;
    use crate::valuation::scarcity::{compute_scarcity, ScarcitySettings};

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    fn row(name: &str, pos: &str, rank: u32, pts: Option<f64>) -> PlayerRow {
        PlayerRow {
            name: name.into(),
            team: "TST".into(),
            position: pos.into(),
            rank,
            projected_points: pts,
        }
    }

    fn catalog() -> Arc<PlayerCatalog> {
        Arc::new(
            PlayerCatalog::build(vec![
                row("Alpha", "RB", 1, Some(300.0)),
                row("Bravo", "RB", 2, Some(250.0)),
                row("Charlie", "WR", 3, Some(200.0)),
                row("Delta", "WR", 5, None),
            ])
            .unwrap(),
        )
    }

    fn state_with_rb_slot() -> DraftState {
        let roster = RosterModel::new(
            vec![RosterSlot::new(SlotKind::Position(Position::RunningBack), 1)],
            2,
        )
        .unwrap();
        DraftState::new(catalog(), roster, DraftOrder::solo())
    }

    fn settings() -> ScarcitySettings {
        let mut sizes = BTreeMap::new();
        sizes.insert(Position::RunningBack, 1);
        sizes.insert(Position::WideReceiver, 1);
        ScarcitySettings::new(sizes, 1).unwrap()
    }

    fn player<'a>(state: &'a DraftState, name: &str, pos: Position) -> &'a Player {
        state
            .catalog()
            .lookup(&PlayerId::new(name, "TST", pos))
            .unwrap()
    }

    #[test]
    fn weights_validation() {
        assert!(ScoringWeights::new(1.0, 0.0, 2.5, 0.0).is_ok());
        assert!(matches!(
            ScoringWeights::new(-0.1, 1.0, 1.0, 0.5),
            Err(DraftError::InvalidArgument { .. })
        ));
        assert!(ScoringWeights::new(1.0, f64::NAN, 1.0, 0.5).is_err());
        assert!(ScoringWeights::new(1.0, 1.0, f64::INFINITY, 0.5).is_err());
    }

    #[test]
    fn default_weights_are_equal() {
        let w = ScoringWeights::default();
        assert_eq!(w.rank(), w.projection());
        assert_eq!(w.projection(), w.scarcity());
        assert!(approx_eq(w.need_bonus(), DEFAULT_NEED_BONUS, 1e-12));
        assert_eq!(w.need_mode(), NeedMode::OpenSlots);
    }

    #[test]
    fn rank_normalization_spans_unit_interval() {
        let state = state_with_rb_slot();
        let cat = state.catalog();
        let best = player(&state, "Alpha", Position::RunningBack);
        let worst = player(&state, "Delta", Position::WideReceiver);
        let mid = player(&state, "Charlie", Position::WideReceiver);

        assert!(approx_eq(normalized_rank_value(cat, best), 1.0, 1e-9));
        assert!(approx_eq(normalized_rank_value(cat, worst), 0.0, 1e-9));
        assert!(approx_eq(normalized_rank_value(cat, mid), 0.5, 1e-9));
    }

    #[test]
    fn projection_normalization() {
        let state = state_with_rb_slot();
        let cat = state.catalog();
        let top = player(&state, "Alpha", Position::RunningBack);
        let low = player(&state, "Charlie", Position::WideReceiver);
        let missing = player(&state, "Delta", Position::WideReceiver);

        assert!(approx_eq(normalized_projection(cat, top), 1.0, 1e-9));
        assert!(approx_eq(normalized_projection(cat, low), 0.0, 1e-9));
        assert!(approx_eq(normalized_projection(cat, missing), 0.0, 1e-9));
    }

    #[test]
    fn degenerate_ranges_map_to_one() {
        let cat = PlayerCatalog::build(vec![
            row("Solo", "QB", 7, Some(10.0)),
            row("Other", "QB", 7, Some(10.0)),
        ])
        .unwrap();
        let p = &cat.players()[0];
        assert!(approx_eq(normalized_rank_value(&cat, p), 1.0, 1e-9));
        assert!(approx_eq(normalized_projection(&cat, p), 1.0, 1e-9));
    }

    #[test]
    fn breakdown_sums_components() {
        let state = state_with_rb_slot();
        let profile = compute_scarcity(&state, &settings());
        let weights = ScoringWeights::new(1.0, 2.0, 1.0, 0.5).unwrap();

        let alpha = player(&state, "Alpha", Position::RunningBack);
        let b = score_breakdown(alpha, &state, &profile, &weights).unwrap();
        assert!(approx_eq(b.rank, 1.0, 1e-9));
        assert!(approx_eq(b.projection, 2.0, 1e-9));
        assert!(approx_eq(b.scarcity, 0.0, 1e-9));
        assert!(approx_eq(b.need, 0.5, 1e-9));
        assert!(approx_eq(b.total, 3.5, 1e-9));

        // WR has no starting slot, but the bench can take one.
        let charlie = player(&state, "Charlie", Position::WideReceiver);
        let b = score_breakdown(charlie, &state, &profile, &weights).unwrap();
        assert!(approx_eq(b.need, 0.5, 1e-9));

        let starting = weights.with_need_mode(NeedMode::Starting);
        let b = score_breakdown(charlie, &state, &profile, &starting).unwrap();
        assert!(approx_eq(b.need, 0.0, 1e-9));
    }

    #[test]
    fn scarcity_term_tracks_profile() {
        let state = state_with_rb_slot();
        let state = state
            .record_pick(&PlayerId::new("Alpha", "TST", Position::RunningBack), false)
            .unwrap();
        let profile = compute_scarcity(&state, &settings());
        // RB band is Alpha + Bravo; half gone.
        let bravo = player(&state, "Bravo", Position::RunningBack);
        let b = score_breakdown(bravo, &state, &profile, &ScoringWeights::default()).unwrap();
        assert!(approx_eq(b.scarcity, 0.5, 1e-9));
    }

    #[test]
    fn bench_space_keeps_need_bonus() {
        // RB starting slot filled, bench still open.
        let state = state_with_rb_slot()
            .record_pick(&PlayerId::new("Alpha", "TST", Position::RunningBack), true)
            .unwrap();
        assert!(state.roster().open_slots().contains(&Position::RunningBack));

        let profile = compute_scarcity(&state, &settings());
        let bravo = player(&state, "Bravo", Position::RunningBack);
        let b = score_breakdown(bravo, &state, &profile, &ScoringWeights::default()).unwrap();
        assert!(approx_eq(b.need, DEFAULT_NEED_BONUS, 1e-9));
    }

    #[test]
    fn starting_mode_drops_bonus_once_slot_filled() {
        let state = state_with_rb_slot()
            .record_pick(&PlayerId::new("Alpha", "TST", Position::RunningBack), true)
            .unwrap();
        let profile = compute_scarcity(&state, &settings());
        let bravo = player(&state, "Bravo", Position::RunningBack);
        let weights = ScoringWeights::default().with_need_mode(NeedMode::Starting);
        let b = score_breakdown(bravo, &state, &profile, &weights).unwrap();
        assert!(approx_eq(b.need, 0.0, 1e-9));
    }

    #[test]
    fn full_roster_earns_no_bonus() {
        let roster = RosterModel::new(
            vec![RosterSlot::new(SlotKind::Position(Position::RunningBack), 1)],
            0,
        )
        .unwrap();
        let state = DraftState::new(catalog(), roster, DraftOrder::solo());
        let profile = compute_scarcity(&state, &settings());
        let charlie = player(&state, "Charlie", Position::WideReceiver);
        let b = score_breakdown(charlie, &state, &profile, &ScoringWeights::default()).unwrap();
        assert!(approx_eq(b.need, 0.0, 1e-9));
    }

    #[test]
    fn drafted_player_cannot_be_scored() {
        let state = state_with_rb_slot()
            .record_pick(&PlayerId::new("Alpha", "TST", Position::RunningBack), false)
            .unwrap();
        let profile = compute_scarcity(&state, &settings());
        let alpha = player(&state, "Alpha", Position::RunningBack);
        let err = score(alpha, &state, &profile, &ScoringWeights::default()).unwrap_err();
        assert!(matches!(err, DraftError::PlayerUnavailable { .. }));
    }

    #[test]
    fn score_is_deterministic() {
        let state = state_with_rb_slot();
        let profile = compute_scarcity(&state, &settings());
        let weights = ScoringWeights::default();
        let p = player(&state, "Bravo", Position::RunningBack);
        let a = score(p, &state, &profile, &weights).unwrap();
        let b = score(p, &state, &profile, &weights).unwrap();
        assert_eq!(a.to_bits(), b.to_bits());
    }
}
