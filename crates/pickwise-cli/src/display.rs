// Plain-text rendering of recommendations, scarcity, roster and history.

use std::fmt::Write;

use pickwise_core::draft::roster::Placement;
use pickwise_core::draft::state::{DraftState, DraftStatus};
use pickwise_core::valuation::{Recommendation, ScarcityProfile};

/// One-line draft status: pick, round, who is on the clock.
pub fn status_line(state: &DraftState) -> String {
    if state.status() == DraftStatus::Complete {
        return format!("Draft complete after {} picks.", state.pick_number());
    }
    let clock = if state.is_user_turn() {
        "you are on the clock".to_string()
    } else {
        match state.picks_until_user_turn() {
            1 => "1 pick until your turn".to_string(),
            n => format!("{n} picks until your turn"),
        }
    };
    format!(
        "Pick {} (round {}), team {} on the clock; {}. {} players available.",
        state.current_pick(),
        state.round(),
        state.team_on_clock(),
        clock,
        state.available_count()
    )
}

pub fn recommendations(recs: &[Recommendation]) -> String {
    if recs.is_empty() {
        return "No eligible players left for your roster.".to_string();
    }
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>3}  {:<26} {:<4} {:<4} {:>5} {:>7} {:>6} {:>6} {:>6} {:>6} {:>6}",
        "#", "Player", "Team", "Pos", "Rank", "Points", "Score", "rank", "proj", "scar", "need"
    );
    for (i, rec) in recs.iter().enumerate() {
        let p = &rec.player;
        let points = p
            .projected_points
            .map(|v| format!("{v:.1}"))
            .unwrap_or_else(|| "-".to_string());
        let b = &rec.breakdown;
        let _ = writeln!(
            out,
            "{:>3}  {:<26} {:<4} {:<4} {:>5} {:>7} {:>6.3} {:>6.3} {:>6.3} {:>6.3} {:>6.3}",
            i + 1,
            truncate(p.name(), 26),
            p.team(),
            p.position(),
            p.rank,
            points,
            b.total,
            b.rank,
            b.projection,
            b.scarcity,
            b.need
        );
    }
    out
}

pub fn scarcity(profile: &ScarcityProfile) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<4} {:>8} {:>9} {:>6} {:>10} {:>9}",
        "Pos", "Urgency", "Scarcity", "Depth", "Top tier", "Best rank"
    );
    for entry in profile.by_urgency() {
        let best = entry
            .best_remaining_rank
            .map(|r| r.to_string())
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "{:<4} {:>8} {:>8.0}% {:>6} {:>10} {:>9}",
            entry.position,
            entry.urgency.label(),
            entry.scarcity * 100.0,
            entry.depth,
            format!("{}/{}", entry.tier_remaining, entry.tier_size),
            best
        );
    }
    out
}

pub fn roster(state: &DraftState) -> String {
    let roster = state.roster();
    let mut out = String::new();

    let mut by_slot: Vec<Vec<String>> = vec![Vec::new(); roster.slots().len()];
    let mut bench: Vec<String> = Vec::new();
    for pick in state.user_picks() {
        match pick.placement {
            Some(Placement::Slot(i)) if i < by_slot.len() => by_slot[i].push(pick.player.name.clone()),
            _ => bench.push(pick.player.name.clone()),
        }
    }

    for (slot, names) in roster.slots().iter().zip(by_slot) {
        let _ = writeln!(
            out,
            "{:<16} {}/{}  {}",
            slot.kind().label(),
            slot.filled(),
            slot.capacity(),
            names.join(", ")
        );
    }
    let _ = writeln!(
        out,
        "{:<16} {}/{}  {}",
        "BENCH",
        roster.bench_filled(),
        roster.bench_capacity(),
        bench.join(", ")
    );
    out
}

pub fn history(state: &DraftState) -> String {
    if state.picks().is_empty() {
        return "No picks yet.".to_string();
    }
    let mut out = String::new();
    for pick in state.picks() {
        let _ = writeln!(
            out,
            "{:>4}  R{:<3} {}{}",
            pick.pick_number,
            pick.round,
            pick.player,
            if pick.is_user { "  (you)" } else { "" }
        );
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}~")
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use pickwise_core::draft::catalog::{PlayerCatalog, PlayerId, PlayerRow};
    use pickwise_core::draft::position::Position;
    use pickwise_core::draft::roster::{RosterModel, RosterSlot, SlotKind};
    use pickwise_core::draft::state::DraftOrder;
    use pickwise_core::valuation::{compute_scarcity, recommend, ScarcitySettings, ScoringWeights};

    use super::*;

    fn state() -> DraftState {
        let rows = vec![
            PlayerRow {
                name: "Saquon Barkley".into(),
                team: "PHI".into(),
                position: "RB".into(),
                rank: 1,
                projected_points: Some(320.5),
            },
            PlayerRow {
                name: "Puka Nacua".into(),
                team: "LAR".into(),
                position: "WR".into(),
                rank: 1,
                projected_points: None,
            },
        ];
        let catalog = Arc::new(PlayerCatalog::build(rows).unwrap());
        let roster = RosterModel::new(
            vec![RosterSlot::new(SlotKind::Position(Position::RunningBack), 1)],
            1,
        )
        .unwrap();
        DraftState::new(catalog, roster, DraftOrder::new(4, 2).unwrap())
    }

    fn settings() -> ScarcitySettings {
        let sizes: BTreeMap<Position, usize> =
            [(Position::RunningBack, 1), (Position::WideReceiver, 1)].into_iter().collect();
        ScarcitySettings::new(sizes, 1).unwrap()
    }

    #[test]
    fn status_counts_picks_until_turn() {
        let s = state();
        assert!(status_line(&s).contains("1 pick until your turn"));
        let s = s
            .record_pick(&PlayerId::new("Puka Nacua", "LAR", Position::WideReceiver), false)
            .unwrap();
        assert!(status_line(&s).contains("you are on the clock"));
        assert!(status_line(&s.end_draft()).starts_with("Draft complete"));
    }

    #[test]
    fn recommendation_table_shows_missing_points() {
        let s = state();
        let profile = compute_scarcity(&s, &settings());
        let recs = recommend(&s, &profile, &ScoringWeights::default(), 5).unwrap();
        let text = recommendations(&recs);
        assert!(text.contains("Saquon Barkley"));
        assert!(text.contains("320.5"));
        let puka = text.lines().find(|l| l.contains("Puka Nacua")).unwrap();
        assert!(puka.contains(" - "));
        assert_eq!(recommendations(&[]), "No eligible players left for your roster.");
    }

    #[test]
    fn scarcity_table_lists_positions() {
        let s = state()
            .record_pick(&PlayerId::new("Saquon Barkley", "PHI", Position::RunningBack), false)
            .unwrap();
        let text = scarcity(&compute_scarcity(&s, &settings()));
        let first_row = text.lines().nth(1).unwrap();
        assert!(first_row.starts_with("RB"));
        assert!(first_row.contains("CRITICAL"));
        assert!(first_row.contains("0/1"));
    }

    #[test]
    fn roster_lists_user_picks_by_slot() {
        let s = state()
            .record_pick(&PlayerId::new("Saquon Barkley", "PHI", Position::RunningBack), true)
            .unwrap()
            .record_pick(&PlayerId::new("Puka Nacua", "LAR", Position::WideReceiver), true)
            .unwrap();
        let text = roster(&s);
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("RB"));
        assert!(lines[0].contains("Saquon Barkley"));
        assert!(lines[1].starts_with("BENCH"));
        assert!(lines[1].contains("Puka Nacua"));
    }

    #[test]
    fn history_marks_user_picks() {
        let s = state();
        assert_eq!(history(&s), "No picks yet.");
        let s = s
            .record_pick(&PlayerId::new("Puka Nacua", "LAR", Position::WideReceiver), true)
            .unwrap();
        let text = history(&s);
        assert!(text.contains("Puka Nacua (LAR, WR)"));
        assert!(text.contains("(you)"));
    }

    #[test]
    fn long_names_truncated() {
        assert_eq!(truncate("abcdef", 4), "abc~");
        assert_eq!(truncate("abc", 4), "abc");
    }
}
