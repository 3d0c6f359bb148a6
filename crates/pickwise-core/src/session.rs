// Draft session: the query interface over one evolving draft.
//
// A session owns its `DraftState` and scarcity cache. The catalog is shared
// read-only, so independent sessions (one per league or per user) can run on
// separate threads against the same `Arc<PlayerCatalog>`.

use std::sync::Arc;

use tracing::info;

use crate::config::Config;
use crate::draft::catalog::{PlayerCatalog, PlayerId};
use crate::draft::roster::RosterModel;
use crate::draft::state::{DraftOrder, DraftPick, DraftSnapshot, DraftState};
use crate::error::{DraftError, Result};
use crate::valuation::recommend::{recommend, Recommendation};
use crate::valuation::scarcity::{ScarcityCalculator, ScarcityProfile, ScarcitySettings};
use crate::valuation::scoring::{score_breakdown, ScoreBreakdown, ScoringWeights};

#[derive(Debug)]
pub struct DraftSession {
    state: DraftState,
    weights: ScoringWeights,
    scarcity: ScarcityCalculator,
}

impl DraftSession {
    pub fn new(
        catalog: Arc<PlayerCatalog>,
        roster: RosterModel,
        order: DraftOrder,
        weights: ScoringWeights,
        settings: ScarcitySettings,
    ) -> Self {
        DraftSession {
            state: DraftState::new(catalog, roster, order),
            weights,
            scarcity: ScarcityCalculator::new(settings),
        }
    }

    /// Build a session for the league and strategy described by `config`.
    pub fn from_config(catalog: Arc<PlayerCatalog>, config: &Config) -> Result<Self> {
        let session = DraftSession::new(
            catalog,
            config.roster_model()?,
            config.draft_order()?,
            config.scoring_weights()?,
            config.scarcity_settings()?,
        );
        info!(
            "Started draft session for {} ({} teams, slot {})",
            config.league.name, config.league.num_teams, config.league.draft_position
        );
        Ok(session)
    }

    /// Record a pick by any team. On error the session is unchanged.
    pub fn record_pick(&mut self, id: &PlayerId, is_user: bool) -> Result<&DraftPick> {
        self.state = self.state.record_pick(id, is_user)?;
        self.state
            .picks()
            .last()
            .ok_or_else(|| DraftError::InvalidState {
                message: "pick history is empty after a recorded pick".into(),
            })
    }

    /// Top `top_n` recommendations for the user's next pick.
    pub fn recommend(&self, top_n: usize) -> Result<Vec<Recommendation>> {
        let profile = self.scarcity_profile();
        recommend(&self.state, &profile, &self.weights, top_n)
    }

    /// Score breakdown for a single undrafted player.
    pub fn score(&self, id: &PlayerId) -> Result<ScoreBreakdown> {
        let player = self.state.catalog().lookup(id)?;
        let profile = self.scarcity_profile();
        score_breakdown(player, &self.state, &profile, &self.weights)
    }

    pub fn draft_state(&self) -> &DraftState {
        &self.state
    }

    /// Serializable view of the current draft.
    pub fn snapshot(&self) -> DraftSnapshot {
        self.state.snapshot()
    }

    /// Scarcity for the current pick, cached until the next pick.
    pub fn scarcity_profile(&self) -> Arc<ScarcityProfile> {
        self.scarcity.profile(&self.state)
    }

    /// Mark the draft complete. Further picks fail with `InvalidState`.
    pub fn end_draft(&mut self) {
        self.state = self.state.end_draft();
    }

    /// Replace the current state with an earlier one from this session, e.g.
    /// to undo a mistaken pick.
    pub fn restore(&mut self, state: DraftState) -> Result<()> {
        if !Arc::ptr_eq(state.catalog(), self.state.catalog()) {
            return Err(DraftError::invalid_argument(
                "cannot restore a state built on a different catalog",
            ));
        }
        self.state = state;
        self.scarcity.invalidate();
        Ok(())
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    pub fn scarcity_settings(&self) -> &ScarcitySettings {
        self.scarcity.settings()
    }

    pub fn catalog(&self) -> &Arc<PlayerCatalog> {
        self.state.catalog()
    }
}
