// Positional scarcity and depth calculation.
//
// For each position, measures how much of the replacement-level-or-better
// talent has already left the pool (scarcity) and how many usable players
// remain near the top of what is left (depth). Both shift after every pick,
// by any team.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::draft::position::Position;
use crate::draft::roster::{RosterModel, SlotKind};
use crate::draft::state::DraftState;
use crate::error::{DraftError, Result};

/// Default width of the replacement tier, in players.
pub const DEFAULT_TIER_WIDTH: usize = 3;

// ---------------------------------------------------------------------------
// Scarcity urgency levels
// ---------------------------------------------------------------------------

/// How urgently a position needs to be addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum ScarcityUrgency {
    /// 75%+ of the tier is gone.
    Critical,
    /// 50-75% gone.
    High,
    /// 25-50% gone.
    Medium,
    /// Under 25% gone.
    Low,
}

impl ScarcityUrgency {
    /// Determine urgency from a scarcity fraction.
    pub fn from_scarcity(scarcity: f64) -> Self {
        if scarcity >= 0.75 {
            ScarcityUrgency::Critical
        } else if scarcity >= 0.5 {
            ScarcityUrgency::High
        } else if scarcity >= 0.25 {
            ScarcityUrgency::Medium
        } else {
            ScarcityUrgency::Low
        }
    }

    /// Return a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            ScarcityUrgency::Critical => "CRITICAL",
            ScarcityUrgency::High => "HIGH",
            ScarcityUrgency::Medium => "MEDIUM",
            ScarcityUrgency::Low => "LOW",
        }
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Tier sizing for the scarcity calculation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScarcitySettings {
    /// Starters league-wide per position: the top tier.
    tier_sizes: BTreeMap<Position, usize>,
    /// Width of the replacement tier just below the top tier.
    tier_width: usize,
}

impl ScarcitySettings {
    /// Build settings with explicit tier sizes. Positions missing from
    /// `tier_sizes` get an empty top tier.
    pub fn new(tier_sizes: BTreeMap<Position, usize>, tier_width: usize) -> Result<Self> {
        if tier_width == 0 {
            return Err(DraftError::invalid_argument("tier_width must be >= 1"));
        }
        Ok(ScarcitySettings {
            tier_sizes,
            tier_width,
        })
    }

    /// Derive tier sizes from league roster rules.
    ///
    /// Every team uses the same roster construction, so the top tier at a
    /// position is `num_teams` times its dedicated slots, plus an even share
    /// of each FLEX slot group that accepts it (rounded up). `overrides`
    /// replace the derived size for the positions they name.
    pub fn from_league(
        roster: &RosterModel,
        num_teams: usize,
        tier_width: usize,
        overrides: &HashMap<Position, usize>,
    ) -> Result<Self> {
        let mut tier_sizes: BTreeMap<Position, usize> = BTreeMap::new();

        for pos in Position::ALL {
            let mut starters = 0;
            for slot in roster.slots() {
                match slot.kind() {
                    SlotKind::Position(p) if *p == pos => starters += slot.capacity() * num_teams,
                    SlotKind::Flex(eligible) if eligible.contains(&pos) => {
                        starters += (slot.capacity() * num_teams).div_ceil(eligible.len());
                    }
                    _ => {}
                }
            }
            tier_sizes.insert(pos, starters);
        }

        for (&pos, &size) in overrides {
            tier_sizes.insert(pos, size);
        }

        ScarcitySettings::new(tier_sizes, tier_width)
    }

    pub fn tier_size(&self, pos: Position) -> usize {
        self.tier_sizes.get(&pos).copied().unwrap_or(0)
    }

    pub fn tier_width(&self) -> usize {
        self.tier_width
    }
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// Scarcity analysis for a single position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScarcityEntry {
    pub position: Position,
    /// Fraction of the replacement-tier-or-better band already drafted.
    pub scarcity: f64,
    /// Undrafted players within one tier width of the best remaining player.
    pub depth: usize,
    /// Size of the top (starter) tier, clamped to the position's population.
    pub tier_size: usize,
    /// Top-tier players still available.
    pub tier_remaining: usize,
    /// Size of the replacement-tier-or-better band.
    pub band_size: usize,
    /// Band players already drafted.
    pub band_drafted: usize,
    /// Rank of the best undrafted player, if any remain.
    pub best_remaining_rank: Option<u32>,
    pub urgency: ScarcityUrgency,
}

/// Per-position scarcity and depth for one draft state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScarcityProfile {
    /// Pick number of the draft state this profile was computed from.
    pub pick_number: usize,
    /// One entry per position, in position order.
    pub entries: Vec<ScarcityEntry>,
}

impl ScarcityProfile {
    pub fn entry(&self, pos: Position) -> Option<&ScarcityEntry> {
        self.entries.iter().find(|e| e.position == pos)
    }

    /// Scarcity at `pos`; 0.0 for positions with no players.
    pub fn scarcity(&self, pos: Position) -> f64 {
        self.entry(pos).map(|e| e.scarcity).unwrap_or(0.0)
    }

    pub fn depth(&self, pos: Position) -> usize {
        self.entry(pos).map(|e| e.depth).unwrap_or(0)
    }

    /// Entries ordered most urgent first, then by scarcity descending.
    pub fn by_urgency(&self) -> Vec<&ScarcityEntry> {
        let mut entries: Vec<&ScarcityEntry> = self.entries.iter().collect();
        entries.sort_by(|a, b| {
            a.urgency
                .cmp(&b.urgency)
                .then_with(|| b.scarcity.total_cmp(&a.scarcity))
                .then_with(|| a.position.cmp(&b.position))
        });
        entries
    }
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// Compute scarcity and depth for every position in the catalog.
///
/// For each position, players are taken in catalog rank order:
/// 1. The band is the top tier plus `tier_width` replacement players.
/// 2. scarcity = drafted band players / band size.
/// 3. depth = undrafted players whose position order lies within
///    `tier_width` of the best undrafted player's.
pub fn compute_scarcity(state: &DraftState, settings: &ScarcitySettings) -> ScarcityProfile {
    let catalog = state.catalog();
    let width = settings.tier_width();
    let mut entries = Vec::new();

    for pos in catalog.positions() {
        let indices = catalog.position_indices(pos);
        let total = indices.len();

        let tier_size = settings.tier_size(pos).min(total);
        let band_size = (settings.tier_size(pos) + width).min(total);

        let band_drafted = indices[..band_size]
            .iter()
            .filter(|&&i| state.is_drafted(i))
            .count();
        let tier_remaining = indices[..tier_size]
            .iter()
            .filter(|&&i| !state.is_drafted(i))
            .count();

        let scarcity = if band_size == 0 {
            0.0
        } else {
            band_drafted as f64 / band_size as f64
        };

        let best = indices.iter().position(|&i| !state.is_drafted(i));
        let (depth, best_remaining_rank) = match best {
            Some(start) => {
                let end = (start + width).min(total);
                let depth = indices[start..end]
                    .iter()
                    .filter(|&&i| !state.is_drafted(i))
                    .count();
                let rank = catalog.get(indices[start]).map(|p| p.rank);
                (depth, rank)
            }
            None => (0, None),
        };

        entries.push(ScarcityEntry {
            position: pos,
            scarcity,
            depth,
            tier_size,
            tier_remaining,
            band_size,
            band_drafted,
            best_remaining_rank,
            urgency: ScarcityUrgency::from_scarcity(scarcity),
        });
    }

    ScarcityProfile {
        pick_number: state.pick_number(),
        entries,
    }
}

// ---------------------------------------------------------------------------
// Cached calculator
// ---------------------------------------------------------------------------

/// Scarcity calculator holding the profile for the latest pick number.
///
/// Owned by exactly one `DraftSession`. The cache is keyed on pick number
/// alone, so it is only valid for one line of states; the session calls
/// `invalidate` whenever it swaps in a different state. Callers outside the
/// crate use [`compute_scarcity`] or `DraftSession::scarcity_profile`.
#[derive(Debug)]
pub(crate) struct ScarcityCalculator {
    settings: ScarcitySettings,
    cache: RefCell<Option<Arc<ScarcityProfile>>>,
}

impl ScarcityCalculator {
    pub fn new(settings: ScarcitySettings) -> Self {
        ScarcityCalculator {
            settings,
            cache: RefCell::new(None),
        }
    }

    pub fn settings(&self) -> &ScarcitySettings {
        &self.settings
    }

    /// Profile for `state`, computed on the first call after the pick number
    /// changes.
    pub fn profile(&self, state: &DraftState) -> Arc<ScarcityProfile> {
        if let Some(cached) = self.cache.borrow().as_ref() {
            if cached.pick_number == state.pick_number() {
                return Arc::clone(cached);
            }
        }

        debug!("Recomputing scarcity at pick {}", state.pick_number());
        let profile = Arc::new(compute_scarcity(state, &self.settings));
        *self.cache.borrow_mut() = Some(Arc::clone(&profile));
        profile
    }

    /// Drop the cached profile. Needed when a session swaps in a state whose
    /// pick number may collide with the cached one (e.g. after an undo).
    pub fn invalidate(&self) {
        self.cache.borrow_mut().take();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
