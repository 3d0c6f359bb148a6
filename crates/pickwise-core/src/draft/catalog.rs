// Player catalog: the immutable, normalized set of players a draft scores.
//
// Built once from ingested ranking/projection rows and shared read-only by
// every draft session (wrap it in an `Arc` to share across threads).

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::position::Position;
use crate::error::{DraftError, Result};

// ---------------------------------------------------------------------------
// Identity and records
// ---------------------------------------------------------------------------

/// A player's identity: name + team + position, unique within a catalog.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId {
    pub name: String,
    pub team: String,
    pub position: Position,
}

impl PlayerId {
    pub fn new(name: impl Into<String>, team: impl Into<String>, position: Position) -> Self {
        PlayerId {
            name: name.into(),
            team: team.into(),
            position,
        }
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.team.is_empty() {
            write!(f, "{} ({})", self.name, self.position)
        } else {
            write!(f, "{} ({}, {})", self.name, self.team, self.position)
        }
    }
}

/// A normalized row handed over by the ingestion layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRow {
    pub name: String,
    pub team: String,
    /// Position abbreviation; must parse into the closed [`Position`] set.
    pub position: String,
    /// Static expert rank, lower is better.
    pub rank: u32,
    /// Projected fantasy points, if the sources had one for this player.
    pub projected_points: Option<f64>,
}

/// An immutable catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Player {
    pub id: PlayerId,
    pub rank: u32,
    pub projected_points: Option<f64>,
    /// 0-based place within the player's position, ordered by rank with
    /// ties broken by source order.
    pub position_order: usize,
    /// Index of the source row this player came from.
    pub source_index: usize,
}

impl Player {
    pub fn name(&self) -> &str {
        &self.id.name
    }

    pub fn team(&self) -> &str {
        &self.id.team
    }

    pub fn position(&self) -> Position {
        self.id.position
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// The full player pool for a draft session. Never mutated after `build`.
#[derive(Debug, Clone)]
pub struct PlayerCatalog {
    /// Players in source order. Indices into this vector are stable for the
    /// catalog's lifetime and are what draft state tracks.
    players: Vec<Player>,
    index: HashMap<PlayerId, usize>,
    /// Catalog indices per position, in position order.
    by_position: BTreeMap<Position, Vec<usize>>,
    rank_range: (u32, u32),
    projection_range: Option<(f64, f64)>,
}

impl PlayerCatalog {
    /// Build a catalog from normalized rows.
    ///
    /// Fails with `DraftError::Data` when a row has an empty name, a position
    /// outside the closed set, or an identity already seen. Non-finite
    /// projections are logged and treated as missing.
    pub fn build<I>(rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = PlayerRow>,
    {
        let mut players: Vec<Player> = Vec::new();
        let mut index: HashMap<PlayerId, usize> = HashMap::new();

        for (source_index, row) in rows.into_iter().enumerate() {
            let name = row.name.trim();
            if name.is_empty() {
                return Err(DraftError::data(format!(
                    "row {source_index} has an empty player name"
                )));
            }
            let position = Position::from_str_pos(&row.position).ok_or_else(|| {
                DraftError::data(format!(
                    "row {source_index} ({name}) has unrecognized position {:?}",
                    row.position
                ))
            })?;

            let id = PlayerId::new(name, row.team.trim(), position);
            if index.contains_key(&id) {
                return Err(DraftError::data(format!("duplicate player identity: {id}")));
            }

            let projected_points = match row.projected_points {
                Some(p) if !p.is_finite() => {
                    warn!("treating non-finite projection for {} as missing", id);
                    None
                }
                other => other,
            };

            index.insert(id.clone(), players.len());
            players.push(Player {
                id,
                rank: row.rank,
                projected_points,
                position_order: 0,
                source_index,
            });
        }

        let mut by_position: BTreeMap<Position, Vec<usize>> = BTreeMap::new();
        for (idx, player) in players.iter().enumerate() {
            by_position.entry(player.position()).or_default().push(idx);
        }
        for indices in by_position.values_mut() {
            indices.sort_by_key(|&i| (players[i].rank, players[i].source_index));
            for (order, &i) in indices.iter().enumerate() {
                players[i].position_order = order;
            }
        }

        let rank_range = players
            .iter()
            .map(|p| p.rank)
            .fold(None, |acc: Option<(u32, u32)>, r| match acc {
                None => Some((r, r)),
                Some((lo, hi)) => Some((lo.min(r), hi.max(r))),
            })
            .unwrap_or((0, 0));

        let projection_range = players
            .iter()
            .filter_map(|p| p.projected_points)
            .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            });

        let missing = players.iter().filter(|p| p.projected_points.is_none()).count();
        info!(
            "Built player catalog: {} players across {} positions ({} without projections)",
            players.len(),
            by_position.len(),
            missing
        );

        Ok(PlayerCatalog {
            players,
            index,
            by_position,
            rank_range,
            projection_range,
        })
    }

    /// Look up a player by identity.
    pub fn lookup(&self, id: &PlayerId) -> Result<&Player> {
        self.index_of(id).map(|i| &self.players[i])
    }

    /// Catalog index of a player identity.
    pub fn index_of(&self, id: &PlayerId) -> Result<usize> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| DraftError::NotFound {
                identity: id.to_string(),
            })
    }

    pub fn get(&self, idx: usize) -> Option<&Player> {
        self.players.get(idx)
    }

    /// All players in source order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Catalog indices of every player at `pos`, best first.
    pub fn position_indices(&self, pos: Position) -> &[usize] {
        self.by_position.get(&pos).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Players at `pos`, best first.
    pub fn at_position(&self, pos: Position) -> impl Iterator<Item = &Player> + '_ {
        self.position_indices(pos).iter().map(|&i| &self.players[i])
    }

    /// Positions that have at least one player.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.by_position.keys().copied()
    }

    /// (best, worst) rank over the full catalog.
    pub fn rank_range(&self) -> (u32, u32) {
        self.rank_range
    }

    /// (min, max) projection over players that have one.
    pub fn projection_range(&self) -> Option<(f64, f64)> {
        self.projection_range
    }

    /// Case-insensitive name search.
    ///
    /// Exact full-name matches win over substring matches, so a query for
    /// "Josh Allen" does not also return "Josh Allenby".
    pub fn search(&self, query: &str) -> Vec<&Player> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let partial: Vec<&Player> = self
            .players
            .iter()
            .filter(|p| p.name().to_lowercase().contains(&needle))
            .collect();

        let exact: Vec<&Player> = partial
            .iter()
            .copied()
            .filter(|p| p.name().to_lowercase() == needle)
            .collect();

        if exact.is_empty() {
            partial
        } else {
            exact
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, team: &str, pos: &str, rank: u32, pts: Option<f64>) -> PlayerRow {
        PlayerRow {
            name: name.into(),
            team: team.into(),
            position: pos.into(),
            rank,
            projected_points: pts,
        }
    }

    fn sample_rows() -> Vec<PlayerRow> {
        vec![
            row("Bijan Robinson", "ATL", "RB", 1, Some(310.0)),
            row("Ja'Marr Chase", "CIN", "WR", 1, Some(330.0)),
            row("Saquon Barkley", "PHI", "RB", 2, Some(300.0)),
            row("Josh Allen", "BUF", "QB", 1, Some(390.0)),
            row("Harrison Butker", "KC", "K", 1, None),
        ]
    }

    #[test]
    fn lookup_returns_every_input_identity() {
        let rows = sample_rows();
        let catalog = PlayerCatalog::build(rows.clone()).unwrap();
        assert_eq!(catalog.len(), rows.len());

        for r in &rows {
            let pos = Position::from_str_pos(&r.position).unwrap();
            let id = PlayerId::new(r.name.clone(), r.team.clone(), pos);
            let player = catalog.lookup(&id).unwrap();
            assert_eq!(player.id, id);
            assert_eq!(player.rank, r.rank);
            assert_eq!(player.projected_points, r.projected_points);
        }
    }

    #[test]
    fn lookup_unknown_is_not_found() {
        let catalog = PlayerCatalog::build(sample_rows()).unwrap();
        let err = catalog
            .lookup(&PlayerId::new("Nobody", "FA", Position::Quarterback))
            .unwrap_err();
        assert!(matches!(err, DraftError::NotFound { .. }));
    }

    #[test]
    fn duplicate_identity_rejected() {
        let mut rows = sample_rows();
        rows.push(row("Bijan Robinson", "ATL", "RB", 9, Some(1.0)));
        let err = PlayerCatalog::build(rows).unwrap_err();
        assert!(matches!(err, DraftError::Data { .. }), "got {err:?}");
    }

    #[test]
    fn same_name_different_team_is_distinct() {
        let rows = vec![
            row("Mike Williams", "NYJ", "WR", 40, Some(120.0)),
            row("Mike Williams", "PIT", "WR", 55, Some(90.0)),
        ];
        let catalog = PlayerCatalog::build(rows).unwrap();
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn unknown_position_rejected() {
        let rows = vec![row("Some Punter", "NYG", "P", 1, None)];
        let err = PlayerCatalog::build(rows).unwrap_err();
        match err {
            DraftError::Data { message } => assert!(message.contains("Some Punter")),
            other => panic!("expected Data error, got {other:?}"),
        }
    }

    #[test]
    fn empty_name_rejected() {
        let rows = vec![row("   ", "NYG", "QB", 1, None)];
        assert!(matches!(
            PlayerCatalog::build(rows),
            Err(DraftError::Data { .. })
        ));
    }

    #[test]
    fn position_order_breaks_rank_ties_by_source_order() {
        let rows = vec![
            row("Second Listed", "AAA", "TE", 3, None),
            row("Top TE", "BBB", "TE", 1, None),
            row("Third Listed", "CCC", "TE", 3, None),
        ];
        let catalog = PlayerCatalog::build(rows).unwrap();
        let names: Vec<&str> = catalog
            .at_position(Position::TightEnd)
            .map(|p| p.name())
            .collect();
        assert_eq!(names, vec!["Top TE", "Second Listed", "Third Listed"]);

        let orders: Vec<usize> = catalog
            .at_position(Position::TightEnd)
            .map(|p| p.position_order)
            .collect();
        assert_eq!(orders, vec![0, 1, 2]);
    }

    #[test]
    fn ranges_cover_full_catalog() {
        let catalog = PlayerCatalog::build(sample_rows()).unwrap();
        assert_eq!(catalog.rank_range(), (1, 2));
        assert_eq!(catalog.projection_range(), Some((300.0, 390.0)));
    }

    #[test]
    fn non_finite_projection_treated_as_missing() {
        let rows = vec![
            row("Good", "AAA", "WR", 1, Some(100.0)),
            row("Bad", "BBB", "WR", 2, Some(f64::NAN)),
        ];
        let catalog = PlayerCatalog::build(rows).unwrap();
        let bad = catalog
            .lookup(&PlayerId::new("Bad", "BBB", Position::WideReceiver))
            .unwrap();
        assert!(bad.projected_points.is_none());
        assert_eq!(catalog.projection_range(), Some((100.0, 100.0)));
    }

    #[test]
    fn empty_catalog_is_allowed() {
        let catalog = PlayerCatalog::build(Vec::new()).unwrap();
        assert!(catalog.is_empty());
        assert_eq!(catalog.rank_range(), (0, 0));
        assert!(catalog.projection_range().is_none());
        assert_eq!(catalog.positions().count(), 0);
    }

    #[test]
    fn search_prefers_exact_matches() {
        let rows = vec![
            row("Josh Allen", "BUF", "QB", 1, None),
            row("Josh Allenby", "FA", "QB", 40, None),
            row("Keenan Allen", "CHI", "WR", 30, None),
        ];
        let catalog = PlayerCatalog::build(rows).unwrap();

        let hits = catalog.search("josh allen");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name(), "Josh Allen");

        let hits = catalog.search("allen");
        assert_eq!(hits.len(), 3);

        assert!(catalog.search("  ").is_empty());
        assert!(catalog.search("zzz").is_empty());
    }

    #[test]
    fn identity_display() {
        let id = PlayerId::new("Josh Allen", "BUF", Position::Quarterback);
        assert_eq!(id.to_string(), "Josh Allen (BUF, QB)");
        let id = PlayerId::new("Ravens", "", Position::Defense);
        assert_eq!(id.to_string(), "Ravens (DST)");
    }
}
