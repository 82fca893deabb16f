//! Shared text and JSON rendering of a tournament

use anyhow::{Context, Result};
use serde::Serialize;

use bracket_core::state::place_number;
use bracket_core::{Match, MatchStatus, TournamentState};

/// One match as shown to the user
#[derive(Serialize)]
pub struct MatchView {
    pub id: String,
    pub slots: [String; 2],
    pub winner: Option<String>,
    pub winner_tag: Option<String>,
    pub status: MatchStatus,
}

impl MatchView {
    pub fn of(m: &Match) -> Self {
        Self {
            id: m.id().to_string(),
            slots: [m.slot_label(0), m.slot_label(1)],
            winner: m.winner().map(ToString::to_string),
            winner_tag: m.winner_tag().map(str::to_string),
            status: m.status(),
        }
    }
}

/// One final placing
#[derive(Serialize)]
pub struct StandingView {
    pub rank: String,
    pub team: String,
    pub players: Option<[String; 2]>,
    pub prize: u32,
}

/// Matches that are part of the bracket as played (unused finals hidden)
pub fn match_views(state: &TournamentState) -> Vec<MatchView> {
    state
        .matches()
        .filter(|m| !(m.id().is_final() && m.status() == MatchStatus::Pending && !m.is_reset()))
        .map(MatchView::of)
        .collect()
}

pub fn standings(state: &TournamentState) -> Vec<StandingView> {
    state
        .rankings()
        .placings()
        .into_iter()
        .map(|(rank, team)| StandingView {
            rank: rank.to_string(),
            team: team.to_string(),
            players: state.roster(team).map(|r| r.players().clone()),
            prize: state.prizes().for_place(place_number(rank) as usize),
        })
        .collect()
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

pub fn print_bracket(state: &TournamentState) {
    println!("\n=== Bracket ===");
    for view in match_views(state) {
        let marker = match state.active_match().match_id() {
            Some(active) if active.as_str() == view.id => ">",
            _ => " ",
        };
        let result = match (&view.winner, &view.winner_tag) {
            (Some(w), Some(tag)) => format!("winner: {} ({})", w, tag),
            (Some(w), None) => format!("winner: {}", w),
            _ => String::new(),
        };
        println!(
            "{} {:<4} {:<18} vs {:<18} {:<12} {}",
            marker,
            view.id,
            view.slots[0],
            view.slots[1],
            status_label(view.status),
            result
        );
    }
}

pub fn print_standings(state: &TournamentState) {
    let standings = standings(state);
    if standings.is_empty() {
        return;
    }

    println!("\n=== Standings ===");
    for s in standings {
        let players = s
            .players
            .map(|[a, b]| format!(" ({} / {})", a, b))
            .unwrap_or_default();
        if s.prize > 0 {
            println!("  {:<5} {}{}  ${} (${} each)", s.rank, s.team, players, s.prize, s.prize / 2);
        } else {
            println!("  {:<5} {}{}", s.rank, s.team, players);
        }
    }
}

pub fn status_label(status: MatchStatus) -> &'static str {
    match status {
        MatchStatus::Pending => "pending",
        MatchStatus::Ready => "ready",
        MatchStatus::Resolved => "done",
        MatchStatus::ResetPending => "reset",
        MatchStatus::Terminal => "final",
    }
}
