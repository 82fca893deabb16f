//! Resolve command - record a match result in a tournament journal
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: target_match(), pick_teams(), report()
//! - Level 3: describe()
//! - Level 4: argument parsing

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::Args;
use serde::Serialize;

use bracket_core::{Match, Resolution, Session, TeamId};

use crate::output;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct ResolveArgs {
    /// Journal file of the tournament
    #[arg(long, value_name = "FILE")]
    pub journal: PathBuf,

    /// Winning team, by name (e.g. "Team 3")
    #[arg(long, conflicts_with = "slot", required_unless_present = "slot")]
    pub winner: Option<String>,

    /// Winning team, by slot (0 = top, 1 = bottom)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=1))]
    pub slot: Option<u8>,

    /// Match to resolve (defaults to the active match)
    #[arg(long = "match", value_name = "ID")]
    pub match_id: Option<String>,

    /// Display label stored with the winner (e.g. the side they played)
    #[arg(long)]
    pub tag: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// How the winner was named on the command line
#[derive(Clone, Debug, PartialEq, Eq)]
enum WinnerChoice {
    Team(TeamId),
    Slot(usize),
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run resolve command
///
/// 1. Replay the journal
/// 2. Work out the match and the two teams
/// 3. Resolve through the session (which appends the new snapshot)
/// 4. Report the outcome
pub fn run(args: ResolveArgs) -> Result<()> {
    let mut session = Session::resume(&args.journal)
        .with_context(|| format!("Failed to replay journal: {}", args.journal.display()))?;

    let match_id = target_match(&session, args.match_id.as_deref())?;
    let choice = match (&args.winner, args.slot) {
        (Some(team), _) => WinnerChoice::Team(TeamId::new(team.trim())),
        (None, Some(slot)) => WinnerChoice::Slot(slot as usize),
        (None, None) => bail!("Give the winner with --winner or --slot"),
    };
    let (winner, loser) = pick_teams(session.state().get(&match_id), &choice)?;

    let resolution = session
        .resolve(&match_id, &winner, &loser, args.tag.clone())
        .with_context(|| format!("Could not record result for {}", match_id))?;

    report(&session, &match_id, &winner, &loser, &resolution, args.json)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn target_match(session: &Session, requested: Option<&str>) -> Result<String> {
    if let Some(id) = requested {
        return Ok(id.trim().to_string());
    }
    session
        .state()
        .active_match()
        .match_id()
        .map(ToString::to_string)
        .ok_or_else(|| anyhow!("Tournament is over; nothing left to resolve"))
}

/// Winner and loser for a match.
///
/// An unknown match or team is passed through so the engine reports it.
fn pick_teams(m: Option<&Match>, choice: &WinnerChoice) -> Result<(TeamId, TeamId)> {
    match choice {
        WinnerChoice::Team(winner) => {
            let loser = m
                .and_then(|m| m.opponent_of(winner))
                .cloned()
                .unwrap_or_else(|| winner.clone());
            Ok((winner.clone(), loser))
        }
        WinnerChoice::Slot(slot) => {
            let m = m.ok_or_else(|| anyhow!("Unknown match"))?;
            match (m.slot(*slot), m.slot(1 - *slot)) {
                (Some(w), Some(l)) => Ok((w.clone(), l.clone())),
                _ => bail!("{} does not have two teams yet", m.id()),
            }
        }
    }
}

fn report(
    session: &Session,
    match_id: &str,
    winner: &TeamId,
    loser: &TeamId,
    resolution: &Resolution,
    json: bool,
) -> Result<()> {
    if json {
        #[derive(Serialize)]
        struct ResolveJson<'a> {
            #[serde(rename = "match")]
            match_id: &'a str,
            winner: &'a TeamId,
            loser: &'a TeamId,
            resolution: &'a Resolution,
            active_match: String,
        }

        return output::print_json(&ResolveJson {
            match_id,
            winner,
            loser,
            resolution,
            active_match: session.state().active_match().to_string(),
        });
    }

    println!("{}: {} defeats {}", match_id, winner, loser);
    println!("{}", describe(session, resolution));

    if matches!(resolution, Resolution::Decided { .. }) {
        output::print_standings(session.state());
    }
    Ok(())
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn describe(session: &Session, resolution: &Resolution) -> String {
    let state = session.state();
    match resolution {
        Resolution::Advanced { next } => match state.active() {
            Some(m) => format!("Next match: {}  {} vs {}", m.id(), m.slot_label(0), m.slot_label(1)),
            None => format!("Next match: {}", next),
        },
        Resolution::ResetForced => match state.active() {
            Some(m) => format!(
                "Bracket reset! Deciding match {}: {} vs {}",
                m.id(),
                m.slot_label(0),
                m.slot_label(1)
            ),
            None => "Bracket reset!".to_string(),
        },
        Resolution::Decided { champion } => format!("Champion: {}", champion),
    }
}

// ============================================================================
// TESTS
// ============================================================================
