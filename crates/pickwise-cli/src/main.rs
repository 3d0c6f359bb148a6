// pickwise entry point.
//
// Startup sequence:
// 1. Parse arguments and find the base directory
// 2. Initialize tracing (log to file, not the terminal)
// 3. Copy default config files if missing, then load config
// 4. Load rankings and points, build the player catalog
// 5. Start a draft session and run the interactive loop

mod app;
mod commands;
mod display;
mod ingest;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use directories::ProjectDirs;
use pickwise_core::config;
use pickwise_core::draft::catalog::PlayerCatalog;
use pickwise_core::session::DraftSession;
use tracing::info;

/// Fantasy football draft recommendations that react to positional scarcity.
#[derive(Debug, Parser)]
#[command(name = "pickwise", version, about)]
struct Args {
    /// Directory holding config/ and defaults/. Defaults to the current
    /// directory when it has either, else the platform config directory.
    #[arg(long)]
    base_dir: Option<PathBuf>,

    /// Rankings CSV (Player, Team, POS, AVG). Overrides strategy.toml.
    #[arg(long)]
    rankings: Option<PathBuf>,

    /// Season points CSV (Player, TTL). Overrides strategy.toml.
    #[arg(long)]
    points: Option<PathBuf>,

    /// Number of recommendations to show.
    #[arg(short = 'n', long)]
    top: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 1. Base directory
    let base_dir = resolve_base_dir(args.base_dir.as_deref())?;

    // 2. Tracing
    init_tracing(&base_dir)?;
    info!("pickwise starting up in {}", base_dir.display());

    // 3. Config
    for copied in config::ensure_config_files(&base_dir)
        .context("failed to initialize config files")?
    {
        info!("Copied default config to {}", copied.display());
    }
    let config = config::load_config_from(&base_dir).context("failed to load configuration")?;
    info!(
        "Config loaded: league={}, {} teams, draft slot {}",
        config.league.name, config.league.num_teams, config.league.draft_position
    );

    // 4. Player catalog
    let rankings = args
        .rankings
        .unwrap_or_else(|| base_dir.join(&config.data_paths.rankings));
    let points = args
        .points
        .unwrap_or_else(|| base_dir.join(&config.data_paths.points));
    let rows = ingest::load_player_rows(&rankings, &points).context("failed to load player data")?;
    let catalog = Arc::new(PlayerCatalog::build(rows).context("failed to build player catalog")?);

    // 5. Session and loop
    let session =
        DraftSession::from_config(catalog, &config).context("failed to start draft session")?;
    let top_n = args.top.unwrap_or(config.strategy.display.top_n);
    let mut app = app::App::new(session, top_n);

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    app.run(stdin.lock(), &mut stdout.lock())?;

    info!(
        "pickwise shut down cleanly after {} picks",
        app.session().draft_state().pick_number()
    );
    Ok(())
}

/// Pick the directory that holds config/ and defaults/.
fn resolve_base_dir(explicit: Option<&Path>) -> anyhow::Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir.to_path_buf());
    }

    let cwd = std::env::current_dir().context("failed to read current directory")?;
    if cwd.join("config").is_dir() || cwd.join("defaults").is_dir() {
        return Ok(cwd);
    }

    let dirs = ProjectDirs::from("", "", "pickwise")
        .context("could not determine a config directory; pass --base-dir")?;
    Ok(dirs.config_dir().to_path_buf())
}

/// Initialize tracing to log to a file, keeping the terminal for the draft board.
fn init_tracing(base_dir: &Path) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = base_dir.join("logs");
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("failed to create {}", log_dir.display()))?;

    let log_file = std::fs::File::create(log_dir.join("pickwise.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("pickwise=info,pickwise_core=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
