// Configuration loading and parsing (league.toml, strategy.toml).

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::draft::position::Position;
use crate::draft::roster::RosterModel;
use crate::draft::state::DraftOrder;
use crate::valuation::scarcity::{ScarcitySettings, DEFAULT_TIER_WIDTH};
use crate::valuation::scoring::{NeedMode, ScoringWeights, DEFAULT_NEED_BONUS};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub league: LeagueConfig,
    pub strategy: StrategyConfig,
    pub data_paths: DataPaths,
}

// ---------------------------------------------------------------------------
// league.toml structs
// ---------------------------------------------------------------------------

/// Wrapper for the top-level `[league]` table in league.toml.
#[derive(Debug, Clone, Deserialize)]
struct LeagueFile {
    league: LeagueConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueConfig {
    pub name: String,
    pub num_teams: usize,
    /// The user's 1-based slot in round one.
    #[serde(default = "default_draft_position")]
    pub draft_position: usize,
    /// Slot name -> count, e.g. `QB = 1`, `FLEX = 1`, `BE = 6`.
    pub roster: HashMap<String, usize>,
    #[serde(default = "default_flex_positions")]
    pub flex_positions: Vec<String>,
}

fn default_draft_position() -> usize {
    1
}

fn default_flex_positions() -> Vec<String> {
    vec!["RB".into(), "WR".into(), "TE".into()]
}

// ---------------------------------------------------------------------------
// strategy.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire strategy.toml file.
#[derive(Debug, Clone, Deserialize)]
struct StrategyFile {
    #[serde(default)]
    weights: WeightsConfig,
    #[serde(default)]
    scarcity: ScarcityConfig,
    #[serde(default)]
    display: DisplayConfig,
    data_paths: DataPaths,
}

/// The public strategy config assembled from the strategy.toml sections.
#[derive(Debug, Clone)]
pub struct StrategyConfig {
    pub weights: WeightsConfig,
    pub scarcity: ScarcityConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WeightsConfig {
    pub rank: f64,
    pub projection: f64,
    pub scarcity: f64,
    pub need_bonus: f64,
    /// `open_slots` (bench counts) or `starting`.
    pub need_mode: NeedMode,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        WeightsConfig {
            rank: 1.0,
            projection: 1.0,
            scarcity: 1.0,
            need_bonus: DEFAULT_NEED_BONUS,
            need_mode: NeedMode::OpenSlots,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScarcityConfig {
    pub tier_width: usize,
    /// Per-position top-tier size overrides, keyed by position label.
    pub top_tier: HashMap<String, usize>,
}

impl Default for ScarcityConfig {
    fn default() -> Self {
        ScarcityConfig {
            tier_width: DEFAULT_TIER_WIDTH,
            top_tier: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub top_n: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig { top_n: 15 }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    pub rankings: String,
    pub points: String,
}

// ---------------------------------------------------------------------------
// Engine construction
// ---------------------------------------------------------------------------

impl Config {
    /// Positions a FLEX slot accepts.
    pub fn flex_eligible(&self) -> crate::Result<Vec<Position>> {
        self.league
            .flex_positions
            .iter()
            .map(|s| s.parse::<Position>())
            .collect()
    }

    /// The user's empty roster.
    pub fn roster_model(&self) -> crate::Result<RosterModel> {
        RosterModel::from_config(&self.league.roster, &self.flex_eligible()?)
    }

    pub fn draft_order(&self) -> crate::Result<DraftOrder> {
        DraftOrder::new(self.league.num_teams, self.league.draft_position)
    }

    pub fn scoring_weights(&self) -> crate::Result<ScoringWeights> {
        let w = &self.strategy.weights;
        Ok(ScoringWeights::new(w.rank, w.projection, w.scarcity, w.need_bonus)?
            .with_need_mode(w.need_mode))
    }

    /// Tier sizes derived from the league's roster rules plus any overrides.
    pub fn scarcity_settings(&self) -> crate::Result<ScarcitySettings> {
        let roster = self.roster_model()?;
        let overrides = self
            .strategy
            .scarcity
            .top_tier
            .iter()
            .map(|(k, &v)| k.parse::<Position>().map(|p| (p, v)))
            .collect::<crate::Result<HashMap<Position, usize>>>()?;
        ScarcitySettings::from_league(
            &roster,
            self.league.num_teams,
            self.strategy.scarcity.tier_width,
            &overrides,
        )
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/league.toml` and
/// `config/strategy.toml` relative to `base_dir`.
///
/// Does not copy defaults; call `ensure_config_files` first.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    let league_path = config_dir.join("league.toml");
    let league_text = read_file(&league_path)?;
    let league_file: LeagueFile =
        toml::from_str(&league_text).map_err(|e| ConfigError::ParseError {
            path: league_path.clone(),
            source: e,
        })?;

    let strategy_path = config_dir.join("strategy.toml");
    let strategy_text = read_file(&strategy_path)?;
    let strategy_file: StrategyFile =
        toml::from_str(&strategy_text).map_err(|e| ConfigError::ParseError {
            path: strategy_path.clone(),
            source: e,
        })?;

    let config = Config {
        league: league_file.league,
        strategy: StrategyConfig {
            weights: strategy_file.weights,
            scarcity: strategy_file.scarcity,
            display: strategy_file.display,
        },
        data_paths: strategy_file.data_paths,
    };

    validate(&config)?;

    Ok(config)
}

/// Files `load_config_from` reads from `config/`.
const CONFIG_FILES: [&str; 2] = ["league.toml", "strategy.toml"];

/// Copy `league.toml` and `strategy.toml` from `defaults/` into `config/`
/// when they are missing there. Existing files are left alone. Returns the
/// paths that were written.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.is_dir() {
        if config_dir.is_dir() {
            return Ok(Vec::new());
        }
        return Err(ConfigError::DefaultsCopyError {
            message: format!(
                "neither defaults/ nor config/ directory found in {}; \
                 pass --base-dir or run from the project root",
                base_dir.display()
            ),
        });
    }

    let copy_error = |message: String| ConfigError::DefaultsCopyError { message };
    std::fs::create_dir_all(&config_dir)
        .map_err(|e| copy_error(format!("failed to create {}: {e}", config_dir.display())))?;

    let mut copied = Vec::new();
    for name in CONFIG_FILES {
        let source = defaults_dir.join(name);
        let target = config_dir.join(name);
        if target.exists() || !source.is_file() {
            continue;
        }
        std::fs::copy(&source, &target).map_err(|e| {
            copy_error(format!(
                "failed to copy {} to {}: {e}",
                source.display(),
                target.display()
            ))
        })?;
        copied.push(target);
    }

    Ok(copied)
}

/// Copy missing defaults into `base_dir/config`, then load.
pub fn load_config(base_dir: &Path) -> Result<Config, ConfigError> {
    ensure_config_files(base_dir)?;
    load_config_from(base_dir)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.into(),
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let league = &config.league;

    if league.num_teams == 0 {
        return Err(invalid("league.num_teams", "must be greater than 0"));
    }

    if league.draft_position == 0 || league.draft_position > league.num_teams {
        return Err(invalid(
            "league.draft_position",
            format!(
                "must be between 1 and {}, got {}",
                league.num_teams, league.draft_position
            ),
        ));
    }

    config
        .flex_eligible()
        .map_err(|e| invalid("league.flex_positions", e.to_string()))?;
    config
        .roster_model()
        .map_err(|e| invalid("league.roster", e.to_string()))?;

    let w = &config.strategy.weights;
    let weight_fields: &[(&str, f64)] = &[
        ("weights.rank", w.rank),
        ("weights.projection", w.projection),
        ("weights.scarcity", w.scarcity),
        ("weights.need_bonus", w.need_bonus),
    ];
    for (name, val) in weight_fields {
        if !val.is_finite() || *val < 0.0 {
            return Err(invalid(name, format!("must be a finite value >= 0, got {val}")));
        }
    }

    if config.strategy.scarcity.tier_width == 0 {
        return Err(invalid("scarcity.tier_width", "must be greater than 0"));
    }

    for key in config.strategy.scarcity.top_tier.keys() {
        if Position::from_str_pos(key).is_none() {
            return Err(invalid(
                "scarcity.top_tier",
                format!("unknown position {key:?}"),
            ));
        }
    }

    if config.strategy.display.top_n == 0 {
        return Err(invalid("display.top_n", "must be greater than 0"));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
