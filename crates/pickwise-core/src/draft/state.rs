// Draft state: the shrinking player pool, pick counter, and the user's roster.
//
// State transitions are value-style. `record_pick` returns a new `DraftState`
// and leaves the receiver untouched, so several sessions can evolve
// independently over one shared catalog.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use super::catalog::{Player, PlayerCatalog, PlayerId};
use super::roster::{Placement, RosterModel};
use crate::error::{DraftError, Result};

// ---------------------------------------------------------------------------
// Draft order
// ---------------------------------------------------------------------------

/// Snake draft order for a league: who is on the clock at each pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DraftOrder {
    num_teams: usize,
    /// The user's 1-based draft slot in round one.
    user_slot: usize,
}

impl DraftOrder {
    pub fn new(num_teams: usize, user_slot: usize) -> Result<Self> {
        if num_teams == 0 {
            return Err(DraftError::invalid_argument("num_teams must be >= 1"));
        }
        if user_slot == 0 || user_slot > num_teams {
            return Err(DraftError::invalid_argument(format!(
                "draft position must be between 1 and {num_teams}, got {user_slot}"
            )));
        }
        Ok(DraftOrder {
            num_teams,
            user_slot,
        })
    }

    /// A one-team order, for drafting without tracking opponents' turns.
    pub fn solo() -> Self {
        DraftOrder {
            num_teams: 1,
            user_slot: 1,
        }
    }

    pub fn num_teams(&self) -> usize {
        self.num_teams
    }

    pub fn user_slot(&self) -> usize {
        self.user_slot
    }

    /// 1-based round of an overall (1-based) pick number.
    pub fn round_of(&self, pick: usize) -> usize {
        (pick.max(1) - 1) / self.num_teams + 1
    }

    /// 1-based position of a pick within its round.
    pub fn pick_in_round(&self, pick: usize) -> usize {
        (pick.max(1) - 1) % self.num_teams + 1
    }

    /// 1-based draft slot of the team on the clock at `pick`.
    ///
    /// Odd rounds run 1..=n, even rounds run n..=1.
    pub fn team_on_clock(&self, pick: usize) -> usize {
        let in_round = self.pick_in_round(pick);
        if self.round_of(pick) % 2 == 1 {
            in_round
        } else {
            self.num_teams - in_round + 1
        }
    }

    /// The first overall pick at or after `pick` that belongs to the user.
    pub fn next_user_pick(&self, pick: usize) -> usize {
        let start = pick.max(1);
        (start..start + 2 * self.num_teams)
            .find(|&p| self.team_on_clock(p) == self.user_slot)
            .unwrap_or(start)
    }
}

// ---------------------------------------------------------------------------
// Picks and status
// ---------------------------------------------------------------------------

/// Whether picks can still be recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DraftStatus {
    Active,
    Complete,
}

/// A recorded draft event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DraftPick {
    /// 1-based overall pick number.
    pub pick_number: usize,
    pub round: usize,
    pub player: PlayerId,
    pub is_user: bool,
    /// Where the player landed on the user's roster. `None` for other teams' picks.
    pub placement: Option<Placement>,
}

// ---------------------------------------------------------------------------
// Draft state
// ---------------------------------------------------------------------------

/// The complete state of one draft session.
#[derive(Debug, Clone)]
pub struct DraftState {
    catalog: Arc<PlayerCatalog>,
    /// Indexed by catalog index.
    drafted: Vec<bool>,
    picks: Vec<DraftPick>,
    roster: RosterModel,
    order: DraftOrder,
    status: DraftStatus,
}

impl DraftState {
    /// Start a draft over `catalog` with nobody drafted.
    pub fn new(catalog: Arc<PlayerCatalog>, roster: RosterModel, order: DraftOrder) -> Self {
        let drafted = vec![false; catalog.len()];
        DraftState {
            catalog,
            drafted,
            picks: Vec::new(),
            roster,
            order,
            status: DraftStatus::Active,
        }
    }

    /// Record that `id` left the pool.
    ///
    /// When `is_user` is true the player's position is assigned to the user's
    /// roster. Fails with `InvalidState` once the draft is complete,
    /// `NotFound` for an unknown identity, `AlreadyDrafted` for a repeat, and
    /// `RosterFull` when the user's roster cannot take the position. On any
    /// failure `self` is unchanged.
    pub fn record_pick(&self, id: &PlayerId, is_user: bool) -> Result<DraftState> {
        if self.status == DraftStatus::Complete {
            return Err(DraftError::InvalidState {
                message: format!("draft is complete; cannot record {id}"),
            });
        }

        let idx = self.catalog.index_of(id)?;
        if self.drafted[idx] {
            return Err(DraftError::AlreadyDrafted {
                identity: id.to_string(),
            });
        }

        let (roster, placement) = if is_user {
            let (roster, placement) = self.roster.assign_with_placement(id.position)?;
            (roster, Some(placement))
        } else {
            (self.roster.clone(), None)
        };

        let pick_number = self.current_pick();
        let pick = DraftPick {
            pick_number,
            round: self.order.round_of(pick_number),
            player: id.clone(),
            is_user,
            placement,
        };

        let mut drafted = self.drafted.clone();
        drafted[idx] = true;
        let mut picks = self.picks.clone();
        picks.push(pick);

        let status = if is_user && roster.is_full() {
            info!("User roster is full after pick {}; draft complete", pick_number);
            DraftStatus::Complete
        } else {
            DraftStatus::Active
        };

        debug!(
            "Pick {} (round {}): {} drafted{}",
            pick_number,
            self.order.round_of(pick_number),
            id,
            if is_user { " by user" } else { "" }
        );

        Ok(DraftState {
            catalog: Arc::clone(&self.catalog),
            drafted,
            picks,
            roster,
            order: self.order,
            status,
        })
    }

    /// Apply the external "draft ended" signal.
    pub fn end_draft(&self) -> DraftState {
        if self.status == DraftStatus::Active {
            info!("Draft ended after {} picks", self.pick_number());
        }
        let mut next = self.clone();
        next.status = DraftStatus::Complete;
        next
    }

    // -- Pick counter and order --

    /// Number of picks recorded so far.
    pub fn pick_number(&self) -> usize {
        self.picks.len()
    }

    /// 1-based overall number of the next pick.
    pub fn current_pick(&self) -> usize {
        self.picks.len() + 1
    }

    /// Round of the next pick.
    pub fn round(&self) -> usize {
        self.order.round_of(self.current_pick())
    }

    /// Draft slot of the team on the clock for the next pick.
    pub fn team_on_clock(&self) -> usize {
        self.order.team_on_clock(self.current_pick())
    }

    pub fn is_user_turn(&self) -> bool {
        self.team_on_clock() == self.order.user_slot()
    }

    /// Picks other teams make before the user is next on the clock.
    pub fn picks_until_user_turn(&self) -> usize {
        let current = self.current_pick();
        self.order.next_user_pick(current) - current
    }

    // -- Accessors --

    pub fn status(&self) -> DraftStatus {
        self.status
    }

    pub fn is_complete(&self) -> bool {
        self.status == DraftStatus::Complete
    }

    pub fn catalog(&self) -> &Arc<PlayerCatalog> {
        &self.catalog
    }

    pub fn roster(&self) -> &RosterModel {
        &self.roster
    }

    pub fn order(&self) -> DraftOrder {
        self.order
    }

    /// All recorded picks in order.
    pub fn picks(&self) -> &[DraftPick] {
        &self.picks
    }

    /// The user's own picks in order.
    pub fn user_picks(&self) -> impl Iterator<Item = &DraftPick> + '_ {
        self.picks.iter().filter(|p| p.is_user)
    }

    /// Whether the player at catalog index `idx` has been drafted.
    pub fn is_drafted(&self, idx: usize) -> bool {
        self.drafted.get(idx).copied().unwrap_or(false)
    }

    /// Whether `id` is in the catalog and still undrafted.
    pub fn is_available(&self, id: &PlayerId) -> bool {
        self.catalog
            .index_of(id)
            .map(|idx| !self.drafted[idx])
            .unwrap_or(false)
    }

    /// Undrafted players in catalog source order.
    pub fn available(&self) -> impl Iterator<Item = &Player> + '_ {
        self.catalog
            .players()
            .iter()
            .enumerate()
            .filter(|(i, _)| !self.drafted[*i])
            .map(|(_, p)| p)
    }

    pub fn available_count(&self) -> usize {
        self.catalog.len() - self.picks.len()
    }

    /// Read-only view for presentation layers.
    pub fn snapshot(&self) -> DraftSnapshot {
        DraftSnapshot {
            status: self.status,
            picks_made: self.pick_number(),
            current_pick: self.current_pick(),
            round: self.round(),
            team_on_clock: self.team_on_clock(),
            is_user_turn: self.is_user_turn(),
            available_count: self.available_count(),
            picks: self.picks.clone(),
            roster: self.roster.clone(),
        }
    }
}

/// Serializable snapshot of a [`DraftState`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DraftSnapshot {
    pub status: DraftStatus,
    pub picks_made: usize,
    pub current_pick: usize,
    pub round: usize,
    pub team_on_clock: usize,
    pub is_user_turn: bool,
    pub available_count: usize,
    pub picks: Vec<DraftPick>,
    pub roster: RosterModel,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
