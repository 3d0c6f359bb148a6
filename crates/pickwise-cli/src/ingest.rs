// Ranking and projection CSV loading.
//
// Reads a rankings CSV (Player, Team, POS, AVG) where POS carries a
// positional tag such as "RB12", and a season points CSV (Player, TTL).
// The two are joined on player name into catalog rows.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::Read;
use std::path::Path;

use pickwise_core::draft::catalog::PlayerRow;
use pickwise_core::draft::position::Position;
use serde::Deserialize;
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("validation error: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Raw CSV serde structs (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct RawRanking {
    Player: String,
    #[serde(default)]
    Team: String,
    POS: String,
    /// Average draft position. Blank or missing sorts last.
    #[serde(default)]
    AVG: Option<f64>,
}

/// Points rows keep TTL as text: source files mix in section markers and
/// blanks, which count as missing rather than failing the load.
#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct RawPoints {
    Player: String,
    #[serde(default)]
    TTL: String,
}

/// One parsed rankings row before merging.
#[derive(Debug, Clone, PartialEq)]
pub struct RankingEntry {
    pub name: String,
    pub team: String,
    pub position: Position,
    /// Numeric suffix of the POS tag, if present.
    pub tag_rank: Option<u32>,
    pub adp: Option<f64>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Split a positional tag such as "RB12" into ("RB", Some(12)).
///
/// The base is the leading alphabetic run (plus "/" for "D/ST"); the rank is
/// whatever digits follow it.
pub fn split_position_tag(tag: &str) -> (String, Option<u32>) {
    let tag = tag.trim();
    let split = tag
        .find(|c: char| !(c.is_ascii_alphabetic() || c == '/'))
        .unwrap_or(tag.len());
    let (base, rest) = tag.split_at(split);
    let rank = rest
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|&r| r > 0);
    (base.to_uppercase(), rank)
}

// ---------------------------------------------------------------------------
// Reader-based loaders (private, enable testing without temp files)
// ---------------------------------------------------------------------------

fn load_rankings_from_reader<R: Read>(rdr: R) -> Result<Vec<RankingEntry>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut entries = Vec::new();
    for result in reader.deserialize::<RawRanking>() {
        match result {
            Ok(raw) => {
                let name = raw.Player.trim().to_string();
                if name.is_empty() {
                    continue;
                }
                let (base, tag_rank) = split_position_tag(&raw.POS);
                let Some(position) = Position::from_str_pos(&base) else {
                    warn!("skipping ranking for '{}': unknown POS '{}'", name, raw.POS);
                    continue;
                };
                let adp = match raw.AVG {
                    Some(v) if !v.is_finite() => {
                        warn!("ignoring non-finite AVG for '{}'", name);
                        None
                    }
                    other => other,
                };
                entries.push(RankingEntry {
                    name,
                    team: raw.Team.trim().to_string(),
                    position,
                    tag_rank,
                    adp,
                });
            }
            Err(e) => {
                warn!("skipping malformed ranking row: {}", e);
            }
        }
    }
    Ok(entries)
}

fn load_points_from_reader<R: Read>(rdr: R) -> Result<HashMap<String, f64>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut map = HashMap::new();
    for result in reader.deserialize::<RawPoints>() {
        match result {
            Ok(raw) => {
                let name = raw.Player.trim().to_string();
                if name.is_empty() {
                    continue;
                }
                let Some(points) = raw.TTL.trim().parse::<f64>().ok().filter(|v| v.is_finite())
                else {
                    continue;
                };
                if map.contains_key(&name) {
                    warn!("duplicate points entry for '{}', using latest value", name);
                }
                map.insert(name, points);
            }
            Err(e) => {
                warn!("skipping malformed points row: {}", e);
            }
        }
    }
    Ok(map)
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

/// Join rankings with points by player name.
///
/// Entries are ordered by ADP (missing last, file order on ties). Each
/// player's rank is the POS tag number when present, else its order within
/// its position. Repeated identities keep the first row.
pub fn merge(rankings: Vec<RankingEntry>, points: &HashMap<String, f64>) -> Vec<PlayerRow> {
    let mut ordered = rankings;
    ordered.sort_by(|a, b| match (a.adp, b.adp) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    let mut seen: HashSet<(String, String, Position)> = HashSet::new();
    let mut counters: BTreeMap<Position, u32> = BTreeMap::new();
    let mut rows = Vec::with_capacity(ordered.len());

    for entry in ordered {
        let key = (entry.name.clone(), entry.team.clone(), entry.position);
        if !seen.insert(key) {
            warn!("duplicate ranking for '{}' ({}), keeping first", entry.name, entry.position);
            continue;
        }

        let counter = counters.entry(entry.position).or_insert(0);
        *counter += 1;
        let rank = entry.tag_rank.unwrap_or(*counter);

        rows.push(PlayerRow {
            projected_points: points.get(&entry.name).copied(),
            name: entry.name,
            team: entry.team,
            position: entry.position.to_string(),
            rank,
        });
    }

    rows
}

// ---------------------------------------------------------------------------
// Public path-based loaders
// ---------------------------------------------------------------------------

pub fn load_rankings(path: &Path) -> Result<Vec<RankingEntry>, IngestError> {
    let file = std::fs::File::open(path).map_err(|e| IngestError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    load_rankings_from_reader(file).map_err(|e| IngestError::Csv {
        path: path.display().to_string(),
        source: e,
    })
}

pub fn load_points(path: &Path) -> Result<HashMap<String, f64>, IngestError> {
    let file = std::fs::File::open(path).map_err(|e| IngestError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    load_points_from_reader(file).map_err(|e| IngestError::Csv {
        path: path.display().to_string(),
        source: e,
    })
}

/// Load both files and produce catalog rows.
pub fn load_player_rows(rankings: &Path, points: &Path) -> Result<Vec<PlayerRow>, IngestError> {
    let entries = load_rankings(rankings)?;
    if entries.is_empty() {
        return Err(IngestError::Validation(format!(
            "{} produced zero valid ranking rows",
            rankings.display()
        )));
    }
    let points = load_points(points)?;

    let rows = merge(entries, &points);
    let matched = rows.iter().filter(|r| r.projected_points.is_some()).count();
    info!(
        "Loaded {} ranked players ({} with points, {} without)",
        rows.len(),
        matched,
        rows.len() - matched
    );
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
