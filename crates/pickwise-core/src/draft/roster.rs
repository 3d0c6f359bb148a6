// Roster construction and slot assignment for the user's team.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use super::position::Position;
use crate::error::{DraftError, Result};

// ---------------------------------------------------------------------------
// Slots
// ---------------------------------------------------------------------------

/// What a roster slot accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SlotKind {
    /// A dedicated slot for exactly one position.
    Position(Position),
    /// A FLEX slot accepting any of the listed positions (kept sorted).
    Flex(Vec<Position>),
}

impl SlotKind {
    /// Build a FLEX slot kind. The eligible list is sorted and deduplicated.
    pub fn flex(eligible: &[Position]) -> Self {
        let set: BTreeSet<Position> = eligible.iter().copied().collect();
        SlotKind::Flex(set.into_iter().collect())
    }

    pub fn accepts(&self, pos: Position) -> bool {
        match self {
            SlotKind::Position(p) => *p == pos,
            SlotKind::Flex(eligible) => eligible.contains(&pos),
        }
    }

    /// How many positions the slot accepts. Lower is more specific.
    fn breadth(&self) -> usize {
        match self {
            SlotKind::Position(_) => 1,
            SlotKind::Flex(eligible) => eligible.len(),
        }
    }

    /// Display label, e.g. "RB" or "FLEX (RB/WR/TE)".
    pub fn label(&self) -> String {
        match self {
            SlotKind::Position(p) => p.display_str().to_string(),
            SlotKind::Flex(eligible) => {
                let names: Vec<&str> = eligible.iter().map(|p| p.display_str()).collect();
                format!("FLEX ({})", names.join("/"))
            }
        }
    }
}

/// A position requirement with a capacity count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterSlot {
    kind: SlotKind,
    capacity: usize,
    filled: usize,
}

impl RosterSlot {
    /// A new, empty slot group.
    pub fn new(kind: SlotKind, capacity: usize) -> Self {
        RosterSlot {
            kind,
            capacity,
            filled: 0,
        }
    }

    pub fn kind(&self) -> &SlotKind {
        &self.kind
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn filled(&self) -> usize {
        self.filled
    }

    pub fn is_open(&self) -> bool {
        self.filled < self.capacity
    }
}

/// Where an assigned player landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Placement {
    /// Index into [`RosterModel::slots`].
    Slot(usize),
    Bench,
}

// ---------------------------------------------------------------------------
// Roster model
// ---------------------------------------------------------------------------

/// The user's roster: ordered slot groups plus bench capacity.
///
/// Invariants: total capacity (slots + bench) is at least one, and no slot's
/// filled count exceeds its capacity. Assignment is value-style: `assign`
/// returns an updated copy and leaves `self` untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterModel {
    slots: Vec<RosterSlot>,
    bench_capacity: usize,
    bench_filled: usize,
}

impl RosterModel {
    /// Create a roster from slot groups and a bench size.
    pub fn new(slots: Vec<RosterSlot>, bench_capacity: usize) -> Result<Self> {
        for slot in &slots {
            if let SlotKind::Flex(eligible) = &slot.kind {
                if eligible.is_empty() {
                    return Err(DraftError::invalid_argument(
                        "FLEX slot must accept at least one position",
                    ));
                }
            }
        }

        let slots: Vec<RosterSlot> = slots.into_iter().filter(|s| s.capacity > 0).collect();
        let total: usize = slots.iter().map(|s| s.capacity).sum::<usize>() + bench_capacity;
        if total == 0 {
            return Err(DraftError::invalid_argument(
                "roster must have at least one slot or bench spot",
            ));
        }

        Ok(RosterModel {
            slots,
            bench_capacity,
            bench_filled: 0,
        })
    }

    /// Create a roster from a league config mapping slot names to counts.
    ///
    /// The mapping comes from league.toml `[league.roster]`, e.g.
    /// `{"QB": 1, "RB": 2, "WR": 2, "TE": 1, "FLEX": 1, "K": 1, "DST": 1, "BE": 6}`.
    /// "FLEX" slots accept `flex_eligible`; "SUPERFLEX"/"OP" slots accept
    /// QB/RB/WR/TE. Slots are ordered dedicated positions first, then FLEX
    /// groups from narrowest to widest.
    pub fn from_config(roster: &HashMap<String, usize>, flex_eligible: &[Position]) -> Result<Self> {
        let mut slots: Vec<RosterSlot> = Vec::new();
        let mut bench = 0;

        for (key, &count) in roster {
            match key.trim().to_uppercase().as_str() {
                "BE" | "BN" | "BENCH" => bench += count,
                "FLEX" => slots.push(RosterSlot::new(SlotKind::flex(flex_eligible), count)),
                "SUPERFLEX" | "OP" => slots.push(RosterSlot::new(
                    SlotKind::flex(&[
                        Position::Quarterback,
                        Position::RunningBack,
                        Position::WideReceiver,
                        Position::TightEnd,
                    ]),
                    count,
                )),
                other => {
                    let pos = Position::from_str_pos(other).ok_or_else(|| {
                        DraftError::invalid_argument(format!("unknown roster slot {key:?}"))
                    })?;
                    slots.push(RosterSlot::new(SlotKind::Position(pos), count));
                }
            }
        }

        // HashMap iteration order is arbitrary; sort for a deterministic layout.
        slots.sort_by(|a, b| {
            a.kind
                .breadth()
                .cmp(&b.kind.breadth())
                .then_with(|| match (&a.kind, &b.kind) {
                    (SlotKind::Position(x), SlotKind::Position(y)) => x.cmp(y),
                    (SlotKind::Flex(x), SlotKind::Flex(y)) => x.cmp(y),
                    (SlotKind::Position(_), SlotKind::Flex(_)) => std::cmp::Ordering::Less,
                    (SlotKind::Flex(_), SlotKind::Position(_)) => std::cmp::Ordering::Greater,
                })
        });

        RosterModel::new(slots, bench)
    }

    pub fn slots(&self) -> &[RosterSlot] {
        &self.slots
    }

    pub fn bench_capacity(&self) -> usize {
        self.bench_capacity
    }

    pub fn bench_filled(&self) -> usize {
        self.bench_filled
    }

    /// Positions that at least one slot (direct, FLEX, or bench) can still take.
    pub fn open_slots(&self) -> BTreeSet<Position> {
        if self.bench_filled < self.bench_capacity {
            return Position::ALL.into_iter().collect();
        }
        self.starting_needs()
    }

    /// Positions with an unfilled starting slot (direct or FLEX), ignoring bench.
    pub fn starting_needs(&self) -> BTreeSet<Position> {
        Position::ALL
            .into_iter()
            .filter(|&pos| self.slots.iter().any(|s| s.is_open() && s.kind.accepts(pos)))
            .collect()
    }

    /// Whether a player at `pos` could be rostered right now.
    pub fn can_accept(&self, pos: Position) -> bool {
        self.placement_for(pos).is_some()
    }

    /// Where a player at `pos` would go.
    ///
    /// Priority: the dedicated slot, then the narrowest open FLEX slot that
    /// accepts the position, then the bench.
    pub fn placement_for(&self, pos: Position) -> Option<Placement> {
        let slot = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_open() && s.kind.accepts(pos))
            .min_by_key(|(i, s)| (s.kind.breadth(), *i))
            .map(|(i, _)| Placement::Slot(i));

        slot.or_else(|| {
            (self.bench_filled < self.bench_capacity).then_some(Placement::Bench)
        })
    }

    /// Assign a player at `pos`, returning the updated roster.
    pub fn assign(&self, pos: Position) -> Result<RosterModel> {
        self.assign_with_placement(pos).map(|(roster, _)| roster)
    }

    /// Assign a player at `pos`, returning the updated roster and where the
    /// player landed. Fails with `RosterFull` when nothing can take `pos`.
    pub fn assign_with_placement(&self, pos: Position) -> Result<(RosterModel, Placement)> {
        let placement = self.placement_for(pos).ok_or_else(|| DraftError::RosterFull {
            position: pos.to_string(),
        })?;

        let mut next = self.clone();
        match placement {
            Placement::Slot(i) => next.slots[i].filled += 1,
            Placement::Bench => next.bench_filled += 1,
        }
        Ok((next, placement))
    }

    /// True when every slot and bench spot is taken.
    pub fn is_full(&self) -> bool {
        self.bench_filled >= self.bench_capacity && self.slots.iter().all(|s| !s.is_open())
    }

    pub fn filled_count(&self) -> usize {
        self.slots.iter().map(|s| s.filled).sum::<usize>() + self.bench_filled
    }

    pub fn total_capacity(&self) -> usize {
        self.slots.iter().map(|s| s.capacity).sum::<usize>() + self.bench_capacity
    }

    pub fn empty_count(&self) -> usize {
        self.total_capacity() - self.filled_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard_config() -> HashMap<String, usize> {
        let mut config = HashMap::new();
        config.insert("QB".to_string(), 1);
        config.insert("RB".to_string(), 2);
        config.insert("WR".to_string(), 2);
        config.insert("TE".to_string(), 1);
        config.insert("FLEX".to_string(), 1);
        config.insert("K".to_string(), 1);
        config.insert("DST".to_string(), 1);
        config.insert("BE".to_string(), 6);
        config
    }

    fn flex_positions() -> Vec<Position> {
        vec![
            Position::RunningBack,
            Position::WideReceiver,
            Position::TightEnd,
        ]
    }

    fn standard_roster() -> RosterModel {
        RosterModel::from_config(&standard_config(), &flex_positions()).unwrap()
    }

    #[test]
    fn from_config_counts_and_order() {
        let roster = standard_roster();
        assert_eq!(roster.total_capacity(), 15);
        assert_eq!(roster.bench_capacity(), 6);
        assert_eq!(roster.filled_count(), 0);
        assert_eq!(roster.empty_count(), 15);

        let labels: Vec<String> = roster.slots().iter().map(|s| s.kind().label()).collect();
        assert_eq!(
            labels,
            vec!["QB", "RB", "WR", "TE", "K", "DST", "FLEX (RB/WR/TE)"]
        );
    }

    #[test]
    fn from_config_rejects_unknown_key() {
        let mut config = standard_config();
        config.insert("IDP".to_string(), 1);
        let err = RosterModel::from_config(&config, &flex_positions()).unwrap_err();
        assert!(matches!(err, DraftError::InvalidArgument { .. }));
    }

    #[test]
    fn zero_capacity_roster_rejected() {
        let err = RosterModel::new(vec![], 0).unwrap_err();
        assert!(matches!(err, DraftError::InvalidArgument { .. }));

        let err = RosterModel::new(
            vec![RosterSlot::new(SlotKind::Position(Position::Quarterback), 0)],
            0,
        )
        .unwrap_err();
        assert!(matches!(err, DraftError::InvalidArgument { .. }));
    }

    #[test]
    fn empty_flex_rejected() {
        let err = RosterModel::new(vec![RosterSlot::new(SlotKind::flex(&[]), 1)], 0).unwrap_err();
        assert!(matches!(err, DraftError::InvalidArgument { .. }));
    }

    #[test]
    fn single_qb_slot_fills_once() {
        let roster = RosterModel::new(
            vec![RosterSlot::new(SlotKind::Position(Position::Quarterback), 1)],
            0,
        )
        .unwrap();

        let roster = roster.assign(Position::Quarterback).unwrap();
        let err = roster.assign(Position::Quarterback).unwrap_err();
        assert_eq!(
            err,
            DraftError::RosterFull {
                position: "QB".into()
            }
        );
        assert!(roster.is_full());
    }

    #[test]
    fn assign_is_value_style() {
        let roster = standard_roster();
        let next = roster.assign(Position::Quarterback).unwrap();
        assert_eq!(roster.filled_count(), 0);
        assert_eq!(next.filled_count(), 1);
    }

    #[test]
    fn dedicated_slot_preferred_over_flex() {
        let roster = standard_roster();
        let (roster, first) = roster.assign_with_placement(Position::RunningBack).unwrap();
        let (roster, second) = roster.assign_with_placement(Position::RunningBack).unwrap();
        let (roster, third) = roster.assign_with_placement(Position::RunningBack).unwrap();
        let (_, fourth) = roster.assign_with_placement(Position::RunningBack).unwrap();

        let rb_idx = 1;
        let flex_idx = 6;
        assert_eq!(first, Placement::Slot(rb_idx));
        assert_eq!(second, Placement::Slot(rb_idx));
        assert_eq!(third, Placement::Slot(flex_idx));
        assert_eq!(fourth, Placement::Bench);
    }

    #[test]
    fn narrow_flex_preferred_over_superflex() {
        let mut config = HashMap::new();
        config.insert("WR".to_string(), 1);
        config.insert("FLEX".to_string(), 1);
        config.insert("SUPERFLEX".to_string(), 1);
        let roster = RosterModel::from_config(&config, &flex_positions()).unwrap();

        let roster = roster.assign(Position::WideReceiver).unwrap();
        let (roster, placement) = roster.assign_with_placement(Position::WideReceiver).unwrap();
        match placement {
            Placement::Slot(i) => assert_eq!(roster.slots()[i].kind().breadth(), 3),
            Placement::Bench => panic!("expected FLEX slot"),
        }

        // QB can only use the superflex.
        let (_, placement) = roster.assign_with_placement(Position::Quarterback).unwrap();
        match placement {
            Placement::Slot(i) => assert_eq!(roster.slots()[i].kind().breadth(), 4),
            Placement::Bench => panic!("expected SUPERFLEX slot"),
        }
    }

    #[test]
    fn kicker_skips_flex_and_goes_to_bench() {
        let roster = standard_roster();
        let roster = roster.assign(Position::Kicker).unwrap();
        let (_, placement) = roster.assign_with_placement(Position::Kicker).unwrap();
        assert_eq!(placement, Placement::Bench);
    }

    #[test]
    fn open_slots_counts_bench_for_every_position() {
        let roster = standard_roster();
        let roster = roster.assign(Position::Kicker).unwrap();
        assert!(roster.open_slots().contains(&Position::Kicker));
        assert!(!roster.starting_needs().contains(&Position::Kicker));
    }

    #[test]
    fn open_slots_without_bench() {
        let roster = RosterModel::new(
            vec![
                RosterSlot::new(SlotKind::Position(Position::Quarterback), 1),
                RosterSlot::new(SlotKind::flex(&flex_positions()), 1),
            ],
            0,
        )
        .unwrap();

        let open = roster.open_slots();
        assert!(open.contains(&Position::Quarterback));
        assert!(open.contains(&Position::TightEnd));
        assert!(!open.contains(&Position::Kicker));

        let roster = roster.assign(Position::WideReceiver).unwrap();
        let open = roster.open_slots();
        assert_eq!(open.into_iter().collect::<Vec<_>>(), vec![Position::Quarterback]);
        assert!(!roster.can_accept(Position::RunningBack));
    }

    #[test]
    fn fills_to_capacity_then_full() {
        let mut roster = standard_roster();
        let picks = [
            Position::Quarterback,
            Position::RunningBack,
            Position::RunningBack,
            Position::WideReceiver,
            Position::WideReceiver,
            Position::TightEnd,
            Position::RunningBack,
            Position::Kicker,
            Position::Defense,
        ];
        for pos in picks {
            roster = roster.assign(pos).unwrap();
        }
        assert!(roster.starting_needs().is_empty());
        assert!(!roster.is_full());

        for _ in 0..6 {
            roster = roster.assign(Position::WideReceiver).unwrap();
        }
        assert!(roster.is_full());
        assert!(roster.open_slots().is_empty());
        assert!(matches!(
            roster.assign(Position::Quarterback),
            Err(DraftError::RosterFull { .. })
        ));
        for slot in roster.slots() {
            assert!(slot.filled() <= slot.capacity());
        }
    }
}
