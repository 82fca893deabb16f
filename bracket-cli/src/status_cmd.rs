//! Status command - replay a journal and show where the tournament stands

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use bracket_core::{ReplayMode, Session};

use crate::output::{self, MatchView, StandingView};

// ============================================================================
// COMMAND ARGUMENTS
// ============================================================================

#[derive(Args)]
pub struct StatusArgs {
    /// Journal file of the tournament
    #[arg(long, value_name = "FILE")]
    pub journal: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Everything `status` reports
#[derive(Serialize)]
pub struct StatusReport {
    pub mode: ReplayMode,
    pub active_match: String,
    pub champion: Option<String>,
    pub matches: Vec<MatchView>,
    pub standings: Vec<StandingView>,
}

// ============================================================================
// ORCHESTRATION
// ============================================================================

pub fn run(args: StatusArgs) -> Result<()> {
    let session = Session::resume(&args.journal)
        .with_context(|| format!("Failed to replay journal: {}", args.journal.display()))?;

    if args.json {
        output::print_json(&build_report(&session))
    } else {
        print_text(&session);
        Ok(())
    }
}

pub fn build_report(session: &Session) -> StatusReport {
    let state = session.state();
    StatusReport {
        mode: session.mode(),
        active_match: state.active_match().to_string(),
        champion: state.champion().map(ToString::to_string),
        matches: output::match_views(state),
        standings: output::standings(state),
    }
}

fn print_text(session: &Session) {
    let state = session.state();

    match session.mode() {
        ReplayMode::ViewOnly => println!("Tournament complete (view only)"),
        ReplayMode::Continue => match state.active() {
            Some(m) => println!("Next match: {}  {} vs {}", m.id(), m.slot_label(0), m.slot_label(1)),
            None => println!("Next match: {}", state.active_match()),
        },
    }

    output::print_bracket(state);
    output::print_standings(state);

    if let Some(champion) = state.champion() {
        println!("\nChampion: {}", champion);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bracket_core::{Roster, TeamId, Topology, TournamentState};
    use std::path::Path;

    fn start(journal: &Path) -> Session {
        let topology = Topology::from_json_str(
            include_str!("../../data/3teamD.json"),
            Path::new("3teamD.json"),
        )
        .unwrap();
        let teams = (1..=3)
            .map(|i| (TeamId::seeded(i), Roster::new(format!("A{}", i), format!("B{}", i))))
            .collect();
        let state = TournamentState::generate(teams, &topology);
        Session::create(state, Some(journal.to_path_buf())).unwrap()
    }

    #[test]
    fn test_report_for_running_tournament() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.jsonl");
        start(&path);

        let session = Session::resume(&path).unwrap();
        let report = build_report(&session);
        assert_eq!(report.mode, ReplayMode::Continue);
        assert_eq!(report.active_match, "G1");
        assert!(report.champion.is_none());
        assert!(report.standings.is_empty());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["mode"], "continue");
        assert_eq!(json["matches"][0]["status"], "READY");
    }

    #[test]
    fn test_report_for_finished_tournament() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.jsonl");
        let mut session = start(&path);
        let t = TeamId::seeded;
        session.resolve("G1", &t(2), &t(3), None).unwrap();
        session.resolve("G2", &t(1), &t(2), None).unwrap();
        session.resolve("G3", &t(2), &t(3), None).unwrap();
        session.resolve("GF", &t(1), &t(2), None).unwrap();

        let report = build_report(&Session::resume(&path).unwrap());
        assert_eq!(report.mode, ReplayMode::ViewOnly);
        assert_eq!(report.active_match, "TOURNAMENT_OVER");
        assert_eq!(report.champion.as_deref(), Some("Team 1"));
        let ranks: Vec<&str> = report.standings.iter().map(|s| s.rank.as_str()).collect();
        assert_eq!(ranks, vec!["1ST", "2ND", "3RD"]);
    }
}
