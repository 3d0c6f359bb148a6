// Interactive command parsing and player-name resolution.

use pickwise_core::draft::catalog::{PlayerCatalog, PlayerId};
use pickwise_core::draft::state::DraftState;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Another team drafted this player.
    Draft(String),
    /// The user drafted this player.
    Mine(String),
    /// Show recommendations; `None` uses the configured count.
    Top(Option<usize>),
    Scarcity,
    Roster,
    History,
    Undo,
    Json,
    End,
    Help,
    Quit,
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("`{command}` needs a player name")]
    MissingName { command: String },

    #[error("invalid count {value:?}: expected a whole number >= 1")]
    InvalidCount { value: String },

    #[error("no player matches {query:?}")]
    NoMatch { query: String },

    #[error("{query:?} matches several players: {candidates}; be more specific")]
    Ambiguous { query: String, candidates: String },
}

/// Parse one input line.
///
/// A line that does not start with a known command word is read as a player
/// name drafted by another team, so typing a name alone records the pick.
pub fn parse(line: &str) -> Result<Command, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Command::Empty);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((w, r)) => (w, r.trim()),
        None => (line, ""),
    };

    let name_arg = |command: &str| -> Result<String, CommandError> {
        if rest.is_empty() {
            Err(CommandError::MissingName {
                command: command.to_string(),
            })
        } else {
            Ok(rest.to_string())
        }
    };

    match word.to_lowercase().as_str() {
        "draft" | "d" => name_arg("draft").map(Command::Draft),
        "mine" | "m" => name_arg("mine").map(Command::Mine),
        "top" | "t" => {
            if rest.is_empty() {
                return Ok(Command::Top(None));
            }
            match rest.parse::<usize>() {
                Ok(n) if n >= 1 => Ok(Command::Top(Some(n))),
                _ => Err(CommandError::InvalidCount {
                    value: rest.to_string(),
                }),
            }
        }
        "scarcity" | "s" if rest.is_empty() => Ok(Command::Scarcity),
        "roster" | "r" if rest.is_empty() => Ok(Command::Roster),
        "history" | "h" if rest.is_empty() => Ok(Command::History),
        "undo" | "u" if rest.is_empty() => Ok(Command::Undo),
        "json" if rest.is_empty() => Ok(Command::Json),
        "end" if rest.is_empty() => Ok(Command::End),
        "help" | "?" if rest.is_empty() => Ok(Command::Help),
        "quit" | "exit" | "done" | "q" if rest.is_empty() => Ok(Command::Quit),
        _ => Ok(Command::Draft(line.to_string())),
    }
}

/// Resolve a typed name to exactly one player identity.
///
/// Exact name matches win over partial ones. When several players match,
/// undrafted ones are preferred, since a pick can only take someone still in
/// the pool.
pub fn resolve(catalog: &PlayerCatalog, state: &DraftState, query: &str) -> Result<PlayerId, CommandError> {
    let matches = catalog.search(query);
    match matches.as_slice() {
        [] => Err(CommandError::NoMatch {
            query: query.to_string(),
        }),
        [only] => Ok(only.id.clone()),
        many => {
            let available: Vec<_> = many
                .iter()
                .filter(|p| state.is_available(&p.id))
                .collect();
            if let [only] = available.as_slice() {
                return Ok(only.id.clone());
            }
            let shown = if available.is_empty() { many.iter().collect() } else { available };
            let candidates = shown
                .iter()
                .take(5)
                .map(|p| p.id.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            Err(CommandError::Ambiguous {
                query: query.to_string(),
                candidates,
            })
        }
    }
}

pub const HELP: &str = "\
Commands:
  draft <name>   record another team's pick (a bare name does the same)
  mine <name>    record your own pick
  top [n]        show the best available players
  scarcity       per-position scarcity and depth
  roster         your roster slots
  history        all picks so far
  undo           take back the last pick
  json           dump the draft state as JSON
  end            mark the draft finished
  quit           leave";
