//! Player draw and team formation
//!
//! Players are given draw numbers (manually or by a seeded shuffle), sorted
//! by draw number and paired consecutively: draws 1+2 form "Team 1", draws
//! 3+4 form "Team 2", and so on. Team order is seed order (`T1`, `T2`, ...).

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::error::{BracketError, Result};
use crate::team::{Roster, TeamId};

/// Smallest supported field (three teams)
pub const MIN_PLAYERS: usize = 6;
/// Largest supported field (ten teams)
pub const MAX_PLAYERS: usize = 20;

/// A player entering the draw
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerEntry {
    pub name: String,
    /// Pre-assigned draw number for a manual draw
    pub draw: Option<u32>,
}

impl PlayerEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            draw: None,
        }
    }

    pub fn with_draw(name: impl Into<String>, draw: u32) -> Self {
        Self {
            name: name.into(),
            draw: Some(draw),
        }
    }
}

/// Draw configuration
#[derive(Clone, Debug, Default)]
pub struct DrawConfig {
    /// Random seed for reproducible draws (None = entropy)
    pub seed: Option<u64>,
}

impl DrawConfig {
    /// Set random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Outcome of a draw
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DrawResult {
    /// (draw number, player) sorted by draw number
    pub draws: Vec<(u32, String)>,
    /// Seeded teams in `T1..Tn` order
    pub teams: Vec<(TeamId, Roster)>,
}

impl DrawResult {
    pub fn team_count(&self) -> usize {
        self.teams.len()
    }
}

/// Run the draw and form teams of two
pub fn draw_teams(players: &[PlayerEntry], config: &DrawConfig) -> Result<DrawResult> {
    validate_player_count(players.len())?;

    let manual = players.iter().filter(|p| p.draw.is_some()).count();
    let mut draws = if manual == players.len() {
        manual_draws(players)?
    } else if manual == 0 {
        random_draws(players, config)
    } else {
        return Err(BracketError::InvalidDraw(format!(
            "{} of {} players have draw numbers; give all or none",
            manual,
            players.len()
        )));
    };

    draws.sort_by_key(|(number, _)| *number);
    let teams = form_teams(&draws);

    tracing::debug!("Drew {} players into {} teams", draws.len(), teams.len());

    Ok(DrawResult { draws, teams })
}

fn validate_player_count(count: usize) -> Result<()> {
    if count % 2 != 0 || !(MIN_PLAYERS..=MAX_PLAYERS).contains(&count) {
        return Err(BracketError::InvalidPlayerCount {
            count,
            min: MIN_PLAYERS,
            max: MAX_PLAYERS,
        });
    }
    Ok(())
}

/// Manual draw numbers must be exactly 1..=n
fn manual_draws(players: &[PlayerEntry]) -> Result<Vec<(u32, String)>> {
    let n = players.len() as u32;
    let mut seen = vec![false; players.len()];
    let mut draws = Vec::with_capacity(players.len());

    for player in players {
        let number = player.draw.unwrap_or(0);
        if number == 0 || number > n {
            return Err(BracketError::InvalidDraw(format!(
                "draw number {} for {} is outside 1..={}",
                number, player.name, n
            )));
        }
        let idx = (number - 1) as usize;
        if seen[idx] {
            return Err(BracketError::InvalidDraw(format!(
                "draw number {} is used twice",
                number
            )));
        }
        seen[idx] = true;
        draws.push((number, player.name.clone()));
    }

    Ok(draws)
}

fn random_draws(players: &[PlayerEntry], config: &DrawConfig) -> Vec<(u32, String)> {
    let mut rng = create_rng(config.seed);
    let mut numbers: Vec<u32> = (1..=players.len() as u32).collect();
    numbers.shuffle(&mut rng);

    numbers
        .into_iter()
        .zip(players)
        .map(|(number, player)| (number, player.name.clone()))
        .collect()
}

fn form_teams(sorted_draws: &[(u32, String)]) -> Vec<(TeamId, Roster)> {
    sorted_draws
        .chunks(2)
        .enumerate()
        .filter(|(_, pair)| pair.len() == 2)
        .map(|(i, pair)| {
            (
                TeamId::seeded(i + 1),
                Roster::new(pair[0].1.clone(), pair[1].1.clone()),
            )
        })
        .collect()
}

/// Create RNG from seed or random
fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}
