//! Legacy `.game` text topology reader
//!
//! ```text
//! PRIZES:
//!   1: 20
//!   2: 12
//!
//! G1 (Winners Round 1):
//! Teams: T1, T4
//! Winner_Advances_To: G3 [Slot: 0]
//! Loser_Drops_To: ELIMINATED (5th)
//! ```
//!
//! Produces the same [`TopologyFile`] the JSON reader does, so both formats
//! go through one decoding path.

use std::collections::BTreeMap;

use super::{DestSpec, GameEntry, ResultKind, TopologyFile};
use crate::match_id::is_bracket_id;

/// Parse the text of a `.game` file
pub fn parse_game_file(content: &str) -> Result<TopologyFile, String> {
    let mut prizes = BTreeMap::new();
    let mut games: BTreeMap<String, PartialGame> = BTreeMap::new();
    let mut current: Option<String> = None;
    let mut in_prizes = false;

    for (idx, raw) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();

        if line.starts_with("PRIZES:") {
            in_prizes = true;
            continue;
        }

        if in_prizes {
            if let Some((place, amount)) = parse_prize_line(line) {
                if matches!(place.as_str(), "1" | "2" | "3") {
                    prizes.insert(place, amount);
                }
                continue;
            }
            if line.is_empty() || parse_header(line).is_some() {
                in_prizes = false;
            } else {
                continue;
            }
        }

        if let Some(id) = parse_header(line) {
            games.insert(id.clone(), PartialGame::default());
            current = Some(id);
            continue;
        }

        let Some(id) = current.as_ref() else {
            continue;
        };
        let Some(game) = games.get_mut(id) else {
            continue;
        };

        if let Some(rest) = line.strip_prefix("Teams:") {
            game.teams = Some(parse_teams(rest).map_err(|e| format!("line {}: {}", line_no, e))?);
        } else if let Some(rest) = line.strip_prefix("Winner_Advances_To:") {
            game.winner = parse_destination(rest).map_err(|e| format!("line {}: {}", line_no, e))?;
        } else if let Some(rest) = line.strip_prefix("Loser_Drops_To:") {
            game.loser = parse_destination(rest).map_err(|e| format!("line {}: {}", line_no, e))?;
        }
    }

    // Entries without a Teams line are not matches
    let games = games
        .into_iter()
        .filter_map(|(id, game)| {
            let teams = game.teams?;
            Some((
                id,
                GameEntry {
                    teams,
                    winner_advances_to: game.winner,
                    loser_drops_to: game.loser,
                },
            ))
        })
        .collect();

    Ok(TopologyFile {
        tournament_name: None,
        prizes,
        games,
    })
}

#[derive(Default)]
struct PartialGame {
    teams: Option<[String; 2]>,
    winner: Option<DestSpec>,
    loser: Option<DestSpec>,
}

/// `G3 (Winners Final):` -> `G3`
fn parse_header(line: &str) -> Option<String> {
    let end = line.find(|c: char| c.is_whitespace() || c == '(')?;
    let id = &line[..end];
    let rest = line[end..].trim_start();
    if is_bracket_id(id) && rest.starts_with('(') && rest.contains("):") {
        Some(id.to_string())
    } else {
        None
    }
}

/// `3: 20` -> ("3", 20)
fn parse_prize_line(line: &str) -> Option<(String, u32)> {
    let (place, amount) = line.split_once(':')?;
    let place = place.trim();
    if place.is_empty() || !place.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let digits: String = amount
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    Some((place.to_string(), digits.parse().ok()?))
}

/// `T1, (W-G2 winner)` -> ["T1", "W-G2"]
fn parse_teams(text: &str) -> Result<[String; 2], String> {
    let teams: Vec<String> = text
        .split(',')
        .map(|t| {
            t.trim()
                .replace(['(', ')'], "")
                .split(' ')
                .next()
                .unwrap_or_default()
                .to_string()
        })
        .collect();

    match teams.as_slice() {
        [a, b] => Ok([a.clone(), b.clone()]),
        _ => Err(format!("expected two teams, found {}", teams.len())),
    }
}

/// Parse a destination such as `G4 [Slot: 1]`, `CHAMPION` or `ELIMINATED (5th)`
pub fn parse_destination(text: &str) -> Result<Option<DestSpec>, String> {
    let text = text.trim();
    if text.is_empty() || text.eq_ignore_ascii_case("none") || text == "-" {
        return Ok(None);
    }

    if let Some(dest) = parse_slot_destination(text) {
        return Ok(Some(dest));
    }

    if text.contains("CHAMPION") {
        return Ok(Some(DestSpec::Result {
            result: ResultKind::Champion,
            rank: None,
        }));
    }

    if let Some(rank) = parse_elimination(text) {
        return Ok(Some(DestSpec::Result {
            result: ResultKind::Eliminated,
            rank: Some(rank),
        }));
    }

    if text.ends_with("_CONDITIONAL") {
        return Ok(Some(DestSpec::Result {
            result: ResultKind::GfConditional,
            rank: None,
        }));
    }

    Err(format!("unrecognized destination '{}'", text))
}

/// `G4 [Slot: 1]`; `[Slot: N/A]` marks the conditional grand-final route
fn parse_slot_destination(text: &str) -> Option<DestSpec> {
    let open = text.find('[')?;
    let id = text[..open]
        .trim_end()
        .rsplit(|c: char| c.is_whitespace())
        .next()?;
    if !is_bracket_id(id) {
        return None;
    }

    let inner = text[open + 1..].split(']').next()?.trim();
    let value = inner.strip_prefix("Slot:")?.trim();

    if value == "N/A" {
        return Some(DestSpec::Result {
            result: ResultKind::GfConditional,
            rank: None,
        });
    }
    let slot = value.parse::<u8>().unwrap_or(0);
    Some(DestSpec::Game {
        game: id.to_string(),
        slot,
    })
}

/// `ELIMINATED (5th.)` -> `5TH`
fn parse_elimination(text: &str) -> Option<String> {
    let upper = text.to_uppercase();
    let start = upper.find("ELIMINATED")? + "ELIMINATED".len();
    let rest = upper[start..].trim_start();
    let inner = rest.strip_prefix('(')?;
    let rank = inner.split(')').next()?;
    let rank = super::normalize_rank(rank);
    (!rank.is_empty()).then_some(rank)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::{Destination, Topology};
    use std::path::Path;

    const FOUR_TEAM_GAME: &str = "\
PRIZES:
  1: 20
  2: 12
  3: 8

G1 (Winners Round 1):
Teams: T1, T4
Winner_Advances_To: G3 [Slot: 0]
Loser_Drops_To: G4 [Slot: 0]

G2 (Winners Round 1):
Teams: T2, T3
Winner_Advances_To: G3 [Slot: 1]
Loser_Drops_To: G4 [Slot: 1]

G3 (Winners Final):
Teams: (W-G1 winner), (W-G2 winner)
Winner_Advances_To: CHAMPION
Loser_Drops_To: G5 [Slot: 0]

G4 (Losers Round 1):
Teams: L-G1, L-G2
Winner_Advances_To: G5 [Slot: 1]
Loser_Drops_To: ELIMINATED (4th)

G5 (Losers Final):
Teams: L-G3, W-G4
Winner_Advances_To: GF [Slot: N/A]
Loser_Drops_To: ELIMINATED (3rd.)
";

    #[test]
    fn test_parse_legacy_file() {
        let file = parse_game_file(FOUR_TEAM_GAME).unwrap();
        assert_eq!(file.games.len(), 5);
        assert_eq!(file.prizes.get("1"), Some(&20));
        assert_eq!(file.prizes.get("3"), Some(&8));

        let g3 = &file.games["G3"];
        assert_eq!(g3.teams, ["W-G1".to_string(), "W-G2".to_string()]);
        assert_eq!(
            g3.winner_advances_to,
            Some(DestSpec::Result { result: ResultKind::Champion, rank: None })
        );

        let g5 = &file.games["G5"];
        assert_eq!(
            g5.winner_advances_to,
            Some(DestSpec::Result { result: ResultKind::GfConditional, rank: None })
        );
        assert_eq!(
            g5.loser_drops_to,
            Some(DestSpec::Result { result: ResultKind::Eliminated, rank: Some("3RD".to_string()) })
        );
    }

    #[test]
    fn test_legacy_topology_matches_json_shape() {
        let file = parse_game_file(FOUR_TEAM_GAME).unwrap();
        let topo = Topology::from_file(file, Path::new("4teamD.game")).unwrap();
        assert_eq!(topo.matches.len(), 7);
        assert_eq!(
            topo.get("G5").unwrap().winner_destination,
            Some(Destination::advance_to("GF", 1))
        );
        assert_eq!(topo.prizes.total_pool(), 40);
    }

    #[test]
    fn test_games_without_teams_are_dropped() {
        let content = "G1 (Only):\nWinner_Advances_To: CHAMPION\n\nG2 (Real):\nTeams: T1, T2\nWinner_Advances_To: CHAMPION\n";
        let file = parse_game_file(content).unwrap();
        assert_eq!(file.games.len(), 1);
        assert!(file.games.contains_key("G2"));
    }

    #[test]
    fn test_parse_destination_forms() {
        assert_eq!(
            parse_destination("G7 [Slot: 1]").unwrap(),
            Some(DestSpec::Game { game: "G7".to_string(), slot: 1 })
        );
        assert_eq!(
            parse_destination("eliminated (7th)").unwrap(),
            Some(DestSpec::Result { result: ResultKind::Eliminated, rank: Some("7TH".to_string()) })
        );
        assert_eq!(
            parse_destination("G9_CONDITIONAL").unwrap(),
            Some(DestSpec::Result { result: ResultKind::GfConditional, rank: None })
        );
        assert_eq!(parse_destination("").unwrap(), None);
        assert!(parse_destination("somewhere else").is_err());
    }

    #[test]
    fn test_bad_teams_line_reports_line_number() {
        let err = parse_game_file("G1 (x):\nTeams: T1\n").unwrap_err();
        assert!(err.starts_with("line 2"));
    }
}
