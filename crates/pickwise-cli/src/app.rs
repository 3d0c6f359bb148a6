// Interactive draft loop: read a command, apply it to the session, print.
//
// Each line is processed to completion before the next is read. Domain
// errors (unknown player, repeat pick, full roster) are reported and the
// loop continues; only I/O failures end it.

use std::io::{BufRead, Write};

use anyhow::Context;
use pickwise_core::draft::roster::Placement;
use pickwise_core::draft::state::{DraftSnapshot, DraftState};
use pickwise_core::session::DraftSession;
use pickwise_core::valuation::ScarcityProfile;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::commands::{self, Command};
use crate::display;

/// Whether the loop should keep reading input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

#[derive(Serialize)]
struct JsonView<'a> {
    draft: DraftSnapshot,
    scarcity: &'a ScarcityProfile,
}

pub struct App {
    session: DraftSession,
    /// States before each recorded pick, newest last.
    undo_stack: Vec<DraftState>,
    top_n: usize,
}

impl App {
    pub fn new(session: DraftSession, top_n: usize) -> Self {
        App {
            session,
            undo_stack: Vec::new(),
            top_n: top_n.max(1),
        }
    }

    pub fn session(&self) -> &DraftSession {
        &self.session
    }

    /// Run until `quit`, `exit`, or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> anyhow::Result<()> {
        writeln!(out, "--- Fantasy Draft Picker ---")?;
        writeln!(out, "Type a player name to record a pick, or `help` for commands.")?;
        self.show_board(out)?;

        let mut lines = input.lines();
        loop {
            write!(out, "\n> ")?;
            out.flush()?;

            let Some(line) = lines.next() else {
                debug!("input closed");
                break;
            };
            let line = line.context("failed to read input")?;

            let flow = match commands::parse(&line) {
                Ok(command) => self.handle(command, out)?,
                Err(e) => {
                    writeln!(out, "--- {e} ---")?;
                    Flow::Continue
                }
            };
            if flow == Flow::Quit {
                break;
            }
        }

        info!(
            "Leaving draft loop at pick {}",
            self.session.draft_state().pick_number()
        );
        Ok(())
    }

    /// Apply one command and print its result.
    pub fn handle<W: Write>(&mut self, command: Command, out: &mut W) -> anyhow::Result<Flow> {
        match command {
            Command::Empty => {}
            Command::Draft(name) => self.pick(&name, false, out)?,
            Command::Mine(name) => self.pick(&name, true, out)?,
            Command::Top(n) => {
                let recs = self.session.recommend(n.unwrap_or(self.top_n))?;
                write!(out, "{}", display::recommendations(&recs))?;
            }
            Command::Scarcity => {
                write!(out, "{}", display::scarcity(&self.session.scarcity_profile()))?;
            }
            Command::Roster => {
                write!(out, "{}", display::roster(self.session.draft_state()))?;
            }
            Command::History => {
                writeln!(out, "{}", display::history(self.session.draft_state()).trim_end())?;
            }
            Command::Undo => self.undo(out)?,
            Command::Json => {
                let profile = self.session.scarcity_profile();
                let view = JsonView {
                    draft: self.session.snapshot(),
                    scarcity: &profile,
                };
                writeln!(out, "{}", serde_json::to_string_pretty(&view)?)?;
            }
            Command::End => {
                self.session.end_draft();
                writeln!(out, "{}", display::status_line(self.session.draft_state()))?;
            }
            Command::Help => writeln!(out, "{}", commands::HELP)?,
            Command::Quit => {
                writeln!(out, "\nDraft finished!")?;
                return Ok(Flow::Quit);
            }
        }
        Ok(Flow::Continue)
    }

    fn pick<W: Write>(&mut self, query: &str, is_user: bool, out: &mut W) -> anyhow::Result<()> {
        let before = self.session.draft_state().clone();
        let id = match commands::resolve(self.session.catalog(), &before, query) {
            Ok(id) => id,
            Err(e) => {
                writeln!(out, "--- {e} ---")?;
                return Ok(());
            }
        };

        let pick = match self.session.record_pick(&id, is_user) {
            Ok(pick) => pick.clone(),
            Err(e) => {
                warn!("pick rejected for {}: {}", id, e);
                writeln!(out, "--- {e} ---")?;
                return Ok(());
            }
        };
        self.undo_stack.push(before);

        let landed = match pick.placement {
            Some(Placement::Bench) => " to your bench",
            Some(Placement::Slot(_)) => " to your starting lineup",
            None => "",
        };
        writeln!(
            out,
            "\n>>> Pick {}: {} has been drafted{}. <<<",
            pick.pick_number, pick.player, landed
        )?;
        self.show_board(out)
    }

    fn undo<W: Write>(&mut self, out: &mut W) -> anyhow::Result<()> {
        let Some(previous) = self.undo_stack.pop() else {
            writeln!(out, "--- nothing to undo ---")?;
            return Ok(());
        };
        let undone = self.session.draft_state().picks().last().map(|p| p.player.to_string());
        self.session.restore(previous)?;
        if let Some(player) = undone {
            info!("Undid pick of {}", player);
            writeln!(out, "Undid pick: {player} is back in the pool.")?;
        }
        self.show_board(out)
    }

    fn show_board<W: Write>(&self, out: &mut W) -> anyhow::Result<()> {
        let state = self.session.draft_state();
        writeln!(out, "\n{}", display::status_line(state))?;
        if state.is_complete() {
            return Ok(());
        }
        let recs = self.session.recommend(self.top_n)?;
        writeln!(out, "\n--- Top {} Available Players ---", recs.len())?;
        write!(out, "{}", display::recommendations(&recs))?;
        Ok(())
    }
}
