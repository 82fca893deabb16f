//! New command - draw teams, load the bracket and start the tournament
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: read_players(), load_bracket(), report()
//! - Level 3: parse_player_line()
//! - Level 4: formatting utilities

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Serialize;

use bracket_core::{
    draw_teams, load_topology, DrawConfig, DrawResult, EliminationType, LoaderConfig, PlayerEntry,
    PrizeTable, Session, Topology, TournamentState,
};

use crate::output;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct NewArgs {
    /// Player list, one name per line (`name, draw` with --manual-draw)
    #[arg(long, value_name = "FILE")]
    pub players: PathBuf,

    /// Use the draw numbers given in the player file
    #[arg(long)]
    pub manual_draw: bool,

    /// Random seed for a reproducible draw
    #[arg(long)]
    pub seed: Option<u64>,

    /// Bracket type: D (double) or S (single)
    #[arg(long, default_value = "D", value_parser = parse_elimination)]
    pub elimination: EliminationType,

    /// Extra directory to search for bracket files (searched before the defaults)
    #[arg(long = "data-dir", value_name = "DIR")]
    pub data_dirs: Vec<PathBuf>,

    /// Journal file to record the tournament in
    #[arg(long, value_name = "FILE")]
    pub journal: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

fn parse_elimination(tag: &str) -> std::result::Result<EliminationType, String> {
    EliminationType::from_tag(tag).ok_or_else(|| format!("unknown bracket type '{}' (use D or S)", tag))
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run new command
///
/// 1. Read the player list and run the draw
/// 2. Load the bracket for the resulting team count
/// 3. Generate the tournament and open its journal
/// 4. Report the draw and the first match
pub fn run(args: NewArgs) -> Result<()> {
    let players = read_players(&args.players, args.manual_draw)?;

    let mut draw_config = DrawConfig::default();
    if let Some(seed) = args.seed {
        draw_config = draw_config.with_seed(seed);
    }
    let draw = draw_teams(&players, &draw_config).context("Draw failed")?;

    tracing::info!("Drew {} players into {} teams", players.len(), draw.team_count());

    let topology = load_bracket(draw.team_count(), &args)?;
    let state = TournamentState::generate(draw.teams.clone(), &topology);
    let session = Session::create(state, args.journal.clone()).context("Failed to start journal")?;

    report(&draw, &session, &args)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Read a player file
fn read_players(path: &Path, manual_draw: bool) -> Result<Vec<PlayerEntry>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read player list: {}", path.display()))?;

    let mut players = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let player = parse_player_line(line, manual_draw)
            .with_context(|| format!("{}:{}", path.display(), idx + 1))?;
        players.push(player);
    }

    Ok(players)
}

fn load_bracket(team_count: usize, args: &NewArgs) -> Result<Topology> {
    let mut config = LoaderConfig::default().with_elimination(args.elimination);
    for dir in args.data_dirs.iter().rev() {
        config = config.with_dir_first(dir.clone());
    }

    load_topology(team_count, &config)
        .with_context(|| format!("No {}-team bracket available", team_count))
}

fn report(draw: &DrawResult, session: &Session, args: &NewArgs) -> Result<()> {
    let state = session.state();

    if args.json {
        #[derive(Serialize)]
        struct TeamJson {
            team: String,
            players: [String; 2],
        }

        #[derive(Serialize)]
        struct NewJson<'a> {
            draw: &'a [(u32, String)],
            teams: Vec<TeamJson>,
            prizes: &'a PrizeTable,
            active_match: String,
            journal: Option<String>,
        }

        return output::print_json(&NewJson {
            draw: &draw.draws,
            teams: draw
                .teams
                .iter()
                .map(|(team, roster)| TeamJson {
                    team: team.to_string(),
                    players: roster.players().clone(),
                })
                .collect(),
            prizes: state.prizes(),
            active_match: state.active_match().to_string(),
            journal: session.journal_path().map(|p| p.display().to_string()),
        });
    }

    println!("\n=== Draw ===");
    for (number, name) in &draw.draws {
        println!("  {:>2}. {}", number, name);
    }

    println!("\n=== Teams ===");
    for (team, roster) in &draw.teams {
        println!("  {:<8} {}", team.as_str(), roster);
    }

    print_prizes(state.prizes());
    output::print_bracket(state);

    println!("\nFirst match: {}", state.active_match());
    if let Some(path) = session.journal_path() {
        println!("Journal: {}", path.display());
    }

    Ok(())
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// `Ana` or `Ana, 3`
fn parse_player_line(line: &str, manual_draw: bool) -> Result<PlayerEntry> {
    let (name, draw) = match line.split_once(',') {
        Some((name, draw)) => (name.trim(), Some(draw.trim())),
        None => (line, None),
    };
    if name.is_empty() {
        bail!("player name is empty");
    }

    match (manual_draw, draw) {
        (true, Some(draw)) => {
            let number: u32 = draw
                .parse()
                .with_context(|| format!("draw number '{}' for {} is not a number", draw, name))?;
            Ok(PlayerEntry::with_draw(name, number))
        }
        (true, None) => bail!("{} has no draw number", name),
        (false, Some(_)) => {
            tracing::warn!("Ignoring draw number for {} (no --manual-draw)", name);
            Ok(PlayerEntry::new(name))
        }
        (false, None) => Ok(PlayerEntry::new(name)),
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn print_prizes(prizes: &PrizeTable) {
    println!("\n=== Prizes (pool ${}) ===", prizes.total_pool());
    for place in 1..=3 {
        let amount = prizes.for_place(place);
        if amount > 0 {
            println!("  {}: ${} (${} per player)", place, amount, prizes.per_player(place));
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
