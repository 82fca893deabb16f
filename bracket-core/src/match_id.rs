//! Match identifiers and their chronological ordering key

use serde::{Deserialize, Serialize};
use std::fmt;

/// Id of the grand final
pub const GRAND_FINAL: &str = "GF";
/// Id of the grand-final reset
pub const GRAND_FINAL_RESET: &str = "GGF";
/// Sentinel written in place of a match id once the tournament is decided
pub const TOURNAMENT_OVER: &str = "TOURNAMENT_OVER";

/// Match identifier: `G<n>`, `GF` or `GGF`
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchId(String);

impl MatchId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn grand_final() -> Self {
        Self::new(GRAND_FINAL)
    }

    pub fn grand_final_reset() -> Self {
        Self::new(GRAND_FINAL_RESET)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_grand_final(&self) -> bool {
        self.0 == GRAND_FINAL
    }

    pub fn is_grand_final_reset(&self) -> bool {
        self.0 == GRAND_FINAL_RESET
    }

    /// Either of the two injected finals
    pub fn is_final(&self) -> bool {
        self.is_grand_final() || self.is_grand_final_reset()
    }

    /// Chronological ordering key
    pub fn order(&self) -> MatchOrder {
        MatchOrder::of(&self.0)
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MatchId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Chronological position of a match.
///
/// Variant order is the play order: every `G<n>` by number, then `GF`,
/// then `GGF`, then anything unrecognised.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchOrder {
    Game(u32),
    GrandFinal,
    GrandFinalReset,
    Other,
}

impl MatchOrder {
    pub fn of(id: &str) -> Self {
        match id {
            GRAND_FINAL => MatchOrder::GrandFinal,
            GRAND_FINAL_RESET => MatchOrder::GrandFinalReset,
            _ => parse_game_number(id)
                .map(MatchOrder::Game)
                .unwrap_or(MatchOrder::Other),
        }
    }
}

/// `G12` and `G12_b` both number 12
fn parse_game_number(id: &str) -> Option<u32> {
    let rest = id.strip_prefix('G')?;
    let digits = rest.split('_').next()?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// True for ids the topology formats can name directly (`G<n>`, `GF`, `GGF`)
pub fn is_bracket_id(id: &str) -> bool {
    !matches!(MatchOrder::of(id), MatchOrder::Other)
}
