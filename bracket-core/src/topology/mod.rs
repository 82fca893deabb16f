//! Bracket topology - routing graph loading
//!
//! A topology file names every match, the two initial slot specs of each
//! match, and where its winner and loser go next. Loading decodes the file
//! into typed [`Destination`]s once, then injects the grand final (`GF`) and
//! its reset (`GGF`):
//!
//! - the winners-bracket final is the first match whose winner is routed to
//!   `CHAMPION`; its winner is rewired into `GF` slot 0
//! - the losers-bracket final is found by following the winners-bracket
//!   final's loser along winner routes until a match whose winner leaves
//!   the graph; its winner is rewired into `GF` slot 1
//! - `GF` (winner -> champion, loser -> `GGF` slot 0) and `GGF` (both ->
//!   champion) are always appended
//!
//! When the winners-bracket final eliminates its loser there is no losers
//! bracket (single elimination, third-place playoffs included), so nothing
//! is rewired and the two finals are never seated.

pub mod legacy;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{BracketError, Result};
use crate::match_id::MatchId;
use crate::prizes::PrizeTable;

/// Smallest team count with a bracket file convention
pub const MIN_TEAMS: usize = 3;
/// Largest team count with a bracket file convention
pub const MAX_TEAMS: usize = 16;

// ============================================================================
// FILE FORMAT
// ============================================================================

/// Topology file as written on disk
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologyFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tournament_name: Option<String>,
    #[serde(default)]
    pub prizes: BTreeMap<String, u32>,
    pub games: BTreeMap<String, GameEntry>,
}

/// One match entry in a topology file
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEntry {
    #[serde(default = "tbd_slots")]
    pub teams: [String; 2],
    #[serde(default)]
    pub winner_advances_to: Option<DestSpec>,
    #[serde(default)]
    pub loser_drops_to: Option<DestSpec>,
}

fn tbd_slots() -> [String; 2] {
    ["TBD".to_string(), "TBD".to_string()]
}

/// Destination as spelled in JSON
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DestSpec {
    Game {
        game: String,
        slot: u8,
    },
    Result {
        result: ResultKind,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rank: Option<String>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultKind {
    Champion,
    Eliminated,
    GfConditional,
}

// ============================================================================
// DECODED TYPES
// ============================================================================

/// Where a match's winner or loser goes next
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DestSpec", into = "DestSpec")]
pub enum Destination {
    /// Seat the team in a slot of another match
    AdvanceTo { match_id: MatchId, slot: usize },
    /// The team is the tournament champion
    Champion,
    /// The team finishes with this placement
    Eliminated { rank: String },
    /// Placeholder on the grand final; the reset is handled by the engine
    ConditionalReset,
}

impl Destination {
    pub fn advance_to(match_id: impl Into<MatchId>, slot: usize) -> Self {
        Destination::AdvanceTo {
            match_id: match_id.into(),
            slot,
        }
    }

    pub fn eliminated(rank: &str) -> Self {
        Destination::Eliminated {
            rank: normalize_rank(rank),
        }
    }

    /// The routing target, if this destination seats the team somewhere
    pub fn target(&self) -> Option<(&MatchId, usize)> {
        match self {
            Destination::AdvanceTo { match_id, slot } => Some((match_id, *slot)),
            _ => None,
        }
    }
}

impl TryFrom<DestSpec> for Destination {
    type Error = String;

    fn try_from(spec: DestSpec) -> std::result::Result<Self, Self::Error> {
        match spec {
            DestSpec::Game { game, slot } => {
                if slot > 1 {
                    return Err(format!("slot {} for game {} must be 0 or 1", slot, game));
                }
                if game.trim().is_empty() {
                    return Err("destination game id is empty".to_string());
                }
                Ok(Destination::advance_to(MatchId::new(game.trim()), slot as usize))
            }
            DestSpec::Result { result, rank } => match result {
                ResultKind::Champion => Ok(Destination::Champion),
                ResultKind::GfConditional => Ok(Destination::ConditionalReset),
                ResultKind::Eliminated => {
                    let rank = rank
                        .as_deref()
                        .map(normalize_rank)
                        .filter(|r| !r.is_empty())
                        .ok_or_else(|| "ELIMINATED destination has no rank".to_string())?;
                    Ok(Destination::Eliminated { rank })
                }
            },
        }
    }
}

impl From<Destination> for DestSpec {
    fn from(dest: Destination) -> Self {
        match dest {
            Destination::AdvanceTo { match_id, slot } => DestSpec::Game {
                game: match_id.as_str().to_string(),
                slot: slot as u8,
            },
            Destination::Champion => DestSpec::Result {
                result: ResultKind::Champion,
                rank: None,
            },
            Destination::Eliminated { rank } => DestSpec::Result {
                result: ResultKind::Eliminated,
                rank: Some(rank),
            },
            Destination::ConditionalReset => DestSpec::Result {
                result: ResultKind::GfConditional,
                rank: None,
            },
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::AdvanceTo { match_id, slot } => write!(f, "{} [slot {}]", match_id, slot),
            Destination::Champion => f.write_str("CHAMPION"),
            Destination::Eliminated { rank } => write!(f, "ELIMINATED ({})", rank),
            Destination::ConditionalReset => f.write_str("GF CONDITIONAL"),
        }
    }
}

/// "5th." -> "5TH"
pub fn normalize_rank(rank: &str) -> String {
    rank.trim().replace('.', "").to_uppercase()
}

/// Initial content of a slot
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SlotSpec {
    /// `T<n>`: the n-th seeded team (1-based)
    Seed(usize),
    /// Routing text shown until the slot is filled (`W-G1`, `TBD`, ...)
    Reference(String),
}

impl SlotSpec {
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        let seed = text.strip_prefix('T').and_then(|rest| {
            let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
            digits.parse::<usize>().ok().filter(|n| *n > 0)
        });
        match seed {
            Some(n) => SlotSpec::Seed(n),
            None => SlotSpec::Reference(text.to_string()),
        }
    }
}

impl From<String> for SlotSpec {
    fn from(text: String) -> Self {
        SlotSpec::parse(&text)
    }
}

impl From<SlotSpec> for String {
    fn from(spec: SlotSpec) -> Self {
        spec.to_string()
    }
}

impl fmt::Display for SlotSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotSpec::Seed(n) => write!(f, "T{}", n),
            SlotSpec::Reference(text) => f.write_str(text),
        }
    }
}

/// One match of the routing graph
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchSpec {
    pub id: MatchId,
    pub slots: [SlotSpec; 2],
    pub winner_destination: Option<Destination>,
    pub loser_destination: Option<Destination>,
}

impl MatchSpec {
    fn leaves_graph(&self) -> bool {
        match &self.winner_destination {
            None | Some(Destination::Champion) | Some(Destination::ConditionalReset) => true,
            Some(Destination::Eliminated { .. }) => false,
            Some(Destination::AdvanceTo { match_id, .. }) => match_id.is_final(),
        }
    }
}

/// Decoded routing graph with `GF`/`GGF` injected
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Topology {
    pub name: Option<String>,
    pub prizes: PrizeTable,
    /// Matches in chronological order
    pub matches: Vec<MatchSpec>,
}

impl Topology {
    /// Parse a JSON topology
    pub fn from_json_str(content: &str, source: &Path) -> Result<Self> {
        let file: TopologyFile = serde_json::from_str(content)
            .map_err(|e| BracketError::parse(source, e.to_string()))?;
        Self::from_file(file, source)
    }

    /// Decode a parsed topology file, inject the finals and validate routing
    pub fn from_file(file: TopologyFile, source: &Path) -> Result<Self> {
        if file.games.is_empty() {
            return Err(BracketError::parse(source, "topology has no games"));
        }

        let mut matches = decode_games(&file, source)?;
        sort_chronologically(&mut matches);
        inject_finals(&mut matches, source)?;
        validate_routing(&matches, source)?;

        Ok(Self {
            name: file.tournament_name,
            prizes: PrizeTable::from_places(&file.prizes),
            matches,
        })
    }

    pub fn get(&self, id: &str) -> Option<&MatchSpec> {
        self.matches.iter().find(|m| m.id.as_str() == id)
    }

    /// Highest `T<n>` seed referenced by any match
    pub fn seed_count(&self) -> usize {
        self.matches
            .iter()
            .flat_map(|m| m.slots.iter())
            .filter_map(|s| match s {
                SlotSpec::Seed(n) => Some(*n),
                SlotSpec::Reference(_) => None,
            })
            .max()
            .unwrap_or(0)
    }
}

// ============================================================================
// LOADING PHASES
// ============================================================================

fn decode_games(file: &TopologyFile, source: &Path) -> Result<Vec<MatchSpec>> {
    let mut matches = Vec::with_capacity(file.games.len() + 2);

    for (id, entry) in &file.games {
        let id = MatchId::new(id.trim());
        if id.is_final() {
            tracing::debug!("Replacing {} from {} with the injected final", id, source.display());
            continue;
        }

        let decode = |spec: &Option<DestSpec>| -> Result<Option<Destination>> {
            spec.clone()
                .map(Destination::try_from)
                .transpose()
                .map_err(|reason| BracketError::parse(source, format!("game {}: {}", id, reason)))
        };

        matches.push(MatchSpec {
            slots: [SlotSpec::parse(&entry.teams[0]), SlotSpec::parse(&entry.teams[1])],
            winner_destination: decode(&entry.winner_advances_to)?,
            loser_destination: decode(&entry.loser_drops_to)?,
            id,
        });
    }

    Ok(matches)
}

fn sort_chronologically(matches: &mut [MatchSpec]) {
    matches.sort_by(|a, b| {
        a.id
            .order()
            .cmp(&b.id.order())
            .then_with(|| a.id.cmp(&b.id))
    });
}

fn inject_finals(matches: &mut Vec<MatchSpec>, source: &Path) -> Result<()> {
    let gf = MatchId::grand_final();
    let ggf = MatchId::grand_final_reset();

    let wb_final = matches
        .iter()
        .position(|m| m.winner_destination == Some(Destination::Champion))
        .or_else(|| {
            matches.iter().position(|m| {
                matches!(&m.winner_destination,
                    Some(Destination::AdvanceTo { match_id, slot: 0 }) if match_id.is_grand_final())
            })
        })
        .ok_or_else(|| BracketError::parse(source, "no game sends its winner to CHAMPION"))?;

    let lb_final = find_lb_final(matches, wb_final);

    let wb_id = matches[wb_final].id.clone();
    let lb_ref = match lb_final {
        Some(lb) => {
            matches[wb_final].winner_destination = Some(Destination::advance_to(gf.clone(), 0));
            matches[lb].winner_destination = Some(Destination::advance_to(gf.clone(), 1));
            tracing::debug!(
                "Grand final seeded from {} (winners) and {} (losers)",
                wb_id,
                matches[lb].id
            );
            format!("W-{}", matches[lb].id)
        }
        None => {
            tracing::debug!("No losers bracket found; {} decides the champion", wb_id);
            "TBD".to_string()
        }
    };

    matches.push(MatchSpec {
        id: gf.clone(),
        slots: [
            SlotSpec::Reference(format!("W-{}", wb_id)),
            SlotSpec::Reference(lb_ref),
        ],
        winner_destination: Some(Destination::Champion),
        loser_destination: Some(Destination::advance_to(ggf.clone(), 0)),
    });
    matches.push(MatchSpec {
        id: ggf,
        slots: [
            SlotSpec::Reference(format!("W-{}", gf)),
            SlotSpec::Reference(format!("L-{}", gf)),
        ],
        winner_destination: Some(Destination::Champion),
        loser_destination: Some(Destination::Champion),
    });

    Ok(())
}

/// Follow the winners-bracket final's loser until a winner leaves the graph
fn find_lb_final(matches: &[MatchSpec], wb_final: usize) -> Option<usize> {
    let (mut next, _) = matches[wb_final].loser_destination.as_ref()?.target()?;

    for _ in 0..matches.len() {
        let i = matches.iter().position(|m| &m.id == next)?;
        if i == wb_final {
            return None;
        }
        if matches[i].leaves_graph() {
            return Some(i);
        }
        (next, _) = matches[i].winner_destination.as_ref()?.target()?;
    }
    None
}

fn validate_routing(matches: &[MatchSpec], source: &Path) -> Result<()> {
    let ids: HashSet<&MatchId> = matches.iter().map(|m| &m.id).collect();

    for m in matches {
        for dest in [&m.winner_destination, &m.loser_destination].into_iter().flatten() {
            if let Some((target, _)) = dest.target() {
                if !ids.contains(target) {
                    return Err(BracketError::parse(
                        source,
                        format!("game {} routes to unknown game {}", m.id, target),
                    ));
                }
                if target == &m.id {
                    return Err(BracketError::parse(
                        source,
                        format!("game {} routes to itself", m.id),
                    ));
                }
            }
        }
    }

    Ok(())
}

// ============================================================================
// FILE LOCATION
// ============================================================================

/// Bracket type tag used in file names
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EliminationType {
    Single,
    #[default]
    Double,
}

impl EliminationType {
    pub fn tag(self) -> char {
        match self {
            EliminationType::Single => 'S',
            EliminationType::Double => 'D',
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_uppercase().as_str() {
            "S" | "SINGLE" => Some(EliminationType::Single),
            "D" | "DOUBLE" => Some(EliminationType::Double),
            _ => None,
        }
    }
}

/// Where and what to look for when loading a bracket
#[derive(Clone, Debug)]
pub struct LoaderConfig {
    /// Directories searched in order
    pub search_dirs: Vec<PathBuf>,
    /// Bracket type tag
    pub elimination: EliminationType,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            search_dirs: vec![PathBuf::from("."), PathBuf::from("data")],
            elimination: EliminationType::Double,
        }
    }
}

impl LoaderConfig {
    /// Search only these directories
    pub fn with_search_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.search_dirs = dirs;
        self
    }

    /// Look in this directory before the others
    pub fn with_dir_first(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_dirs.insert(0, dir.into());
        self
    }

    /// Set bracket type
    pub fn with_elimination(mut self, elimination: EliminationType) -> Self {
        self.elimination = elimination;
        self
    }
}

/// File stem by convention: `4teamD`
pub fn file_stem(team_count: usize, elimination: EliminationType) -> String {
    format!("{}team{}", team_count, elimination.tag())
}

/// Find the topology file for a team count
pub fn locate(team_count: usize, config: &LoaderConfig) -> Result<PathBuf> {
    let stem = file_stem(team_count, config.elimination);
    let not_found = || BracketError::ConfigNotFound {
        file_name: format!("{}.json", stem),
        searched: config.search_dirs.clone(),
    };

    if !(MIN_TEAMS..=MAX_TEAMS).contains(&team_count) {
        return Err(not_found());
    }

    for dir in &config.search_dirs {
        for ext in ["json", "game"] {
            let candidate = dir.join(format!("{}.{}", stem, ext));
            if candidate.is_file() {
                return Ok(candidate);
            }
        }
    }

    Err(not_found())
}

/// Locate and load the topology for a team count
pub fn load_topology(team_count: usize, config: &LoaderConfig) -> Result<Topology> {
    let path = locate(team_count, config)?;
    load_topology_file(&path)
}

/// Load a topology from an explicit path (`.game` files use the legacy reader)
pub fn load_topology_file(path: &Path) -> Result<Topology> {
    let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => BracketError::ConfigNotFound {
            file_name: path.display().to_string(),
            searched: path.parent().map(Path::to_path_buf).into_iter().collect(),
        },
        _ => BracketError::parse(path, e.to_string()),
    })?;

    let topology = if path.extension().is_some_and(|ext| ext == "game") {
        let file = legacy::parse_game_file(&content).map_err(|reason| BracketError::parse(path, reason))?;
        Topology::from_file(file, path)?
    } else {
        Topology::from_json_str(&content, path)?
    };

    tracing::info!(
        "Loaded bracket {} ({} matches)",
        path.display(),
        topology.matches.len()
    );

    Ok(topology)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const FOUR_TEAM: &str = r#"{
        "prizes": {"1": 20, "2": 12, "3": 8},
        "games": {
            "G1": {"teams": ["T1", "T4"],
                   "winner_advances_to": {"game": "G3", "slot": 0},
                   "loser_drops_to": {"game": "G4", "slot": 0}},
            "G2": {"teams": ["T2", "T3"],
                   "winner_advances_to": {"game": "G3", "slot": 1},
                   "loser_drops_to": {"game": "G4", "slot": 1}},
            "G3": {"teams": ["W-G1", "W-G2"],
                   "winner_advances_to": {"result": "CHAMPION"},
                   "loser_drops_to": {"game": "G5", "slot": 0}},
            "G4": {"teams": ["L-G1", "L-G2"],
                   "winner_advances_to": {"game": "G5", "slot": 1},
                   "loser_drops_to": {"result": "ELIMINATED", "rank": "4th"}},
            "G5": {"teams": ["L-G3", "W-G4"],
                   "winner_advances_to": null,
                   "loser_drops_to": {"result": "ELIMINATED", "rank": "3RD"}}
        }
    }"#;

    fn four_team() -> Topology {
        Topology::from_json_str(FOUR_TEAM, Path::new("4teamD.json")).unwrap()
    }

    #[test]
    fn test_injects_grand_finals() {
        let topo = four_team();
        let ids: Vec<&str> = topo.matches.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["G1", "G2", "G3", "G4", "G5", "GF", "GGF"]);

        assert_eq!(
            topo.get("G3").unwrap().winner_destination,
            Some(Destination::advance_to("GF", 0))
        );
        assert_eq!(
            topo.get("G5").unwrap().winner_destination,
            Some(Destination::advance_to("GF", 1))
        );

        let gf = topo.get("GF").unwrap();
        assert_eq!(gf.winner_destination, Some(Destination::Champion));
        assert_eq!(gf.loser_destination, Some(Destination::advance_to("GGF", 0)));
        assert_eq!(gf.slots[0], SlotSpec::Reference("W-G3".to_string()));
        assert_eq!(gf.slots[1], SlotSpec::Reference("W-G5".to_string()));

        let ggf = topo.get("GGF").unwrap();
        assert_eq!(ggf.winner_destination, Some(Destination::Champion));
        assert_eq!(ggf.loser_destination, Some(Destination::Champion));
    }

    #[test]
    fn test_decodes_destinations_once() {
        let topo = four_team();
        let g4 = topo.get("G4").unwrap();
        assert_eq!(g4.loser_destination, Some(Destination::eliminated("4TH")));
        assert_eq!(g4.slots[0], SlotSpec::Reference("L-G1".to_string()));
        assert_eq!(topo.get("G1").unwrap().slots[1], SlotSpec::Seed(4));
        assert_eq!(topo.seed_count(), 4);
        assert_eq!(topo.prizes.total_pool(), 40);
    }

    #[test]
    fn test_existing_finals_are_replaced() {
        let mut file: TopologyFile = serde_json::from_str(FOUR_TEAM).unwrap();
        file.games.insert(
            "GF".to_string(),
            GameEntry {
                teams: ["X".to_string(), "Y".to_string()],
                winner_advances_to: None,
                loser_drops_to: None,
            },
        );
        let topo = Topology::from_file(file, Path::new("4teamD.json")).unwrap();
        assert_eq!(topo.matches.iter().filter(|m| m.id.is_grand_final()).count(), 1);
        assert_eq!(topo.get("GF").unwrap().loser_destination, Some(Destination::advance_to("GGF", 0)));
    }

    #[test]
    fn test_single_elimination_leaves_champion_route() {
        let json = r#"{"games": {
            "G1": {"teams": ["T1", "T4"], "winner_advances_to": {"game": "G3", "slot": 0},
                   "loser_drops_to": {"result": "ELIMINATED", "rank": "3RD"}},
            "G2": {"teams": ["T2", "T3"], "winner_advances_to": {"game": "G3", "slot": 1},
                   "loser_drops_to": {"result": "ELIMINATED", "rank": "4TH"}},
            "G3": {"teams": ["W-G1", "W-G2"], "winner_advances_to": {"result": "CHAMPION"},
                   "loser_drops_to": {"result": "ELIMINATED", "rank": "2ND"}}
        }}"#;
        let topo = Topology::from_json_str(json, Path::new("4teamS.json")).unwrap();
        assert_eq!(topo.get("G3").unwrap().winner_destination, Some(Destination::Champion));
        assert!(topo.get("GF").is_some());
        assert!(topo.get("GGF").is_some());
    }

    #[test]
    fn test_third_place_playoff_is_not_a_losers_final() {
        let json = r#"{"games": {
            "G1": {"teams": ["T1", "T4"], "winner_advances_to": {"game": "G3", "slot": 0},
                   "loser_drops_to": {"game": "G4", "slot": 0}},
            "G2": {"teams": ["T2", "T3"], "winner_advances_to": {"game": "G3", "slot": 1},
                   "loser_drops_to": {"game": "G4", "slot": 1}},
            "G3": {"teams": ["W-G1", "W-G2"], "winner_advances_to": {"result": "CHAMPION"},
                   "loser_drops_to": {"result": "ELIMINATED", "rank": "2ND"}},
            "G4": {"teams": ["L-G1", "L-G2"], "winner_advances_to": null,
                   "loser_drops_to": {"result": "ELIMINATED", "rank": "4TH"}}
        }}"#;
        let topo = Topology::from_json_str(json, Path::new("4teamS.json")).unwrap();
        assert_eq!(topo.get("G3").unwrap().winner_destination, Some(Destination::Champion));
        assert_eq!(topo.get("G4").unwrap().winner_destination, None);
        assert_eq!(topo.get("GF").unwrap().slots[1], SlotSpec::Reference("TBD".to_string()));
    }

    #[test]
    fn test_losers_final_follows_wb_final_loser() {
        // G4 is a side match that also ends in the graph, but the WB final's
        // loser never reaches it
        let json = r#"{"games": {
            "G1": {"teams": ["T1", "T2"], "winner_advances_to": {"game": "G2", "slot": 0},
                   "loser_drops_to": {"game": "G3", "slot": 0}},
            "G2": {"teams": ["W-G1", "T3"], "winner_advances_to": {"result": "CHAMPION"},
                   "loser_drops_to": {"game": "G3", "slot": 1}},
            "G3": {"teams": ["L-G1", "L-G2"], "winner_advances_to": null,
                   "loser_drops_to": {"result": "ELIMINATED", "rank": "3RD"}},
            "G4": {"teams": ["T4", "T5"], "winner_advances_to": null,
                   "loser_drops_to": {"result": "ELIMINATED", "rank": "5TH"}}
        }}"#;
        let topo = Topology::from_json_str(json, Path::new("5teamD.json")).unwrap();
        assert_eq!(topo.get("G3").unwrap().winner_destination, Some(Destination::advance_to("GF", 1)));
        assert_eq!(topo.get("G4").unwrap().winner_destination, None);
        assert_eq!(topo.get("GF").unwrap().slots[1], SlotSpec::Reference("W-G3".to_string()));
    }

    #[test]
    fn test_parse_errors() {
        let path = Path::new("bad.json");
        assert!(matches!(
            Topology::from_json_str("{not json", path),
            Err(BracketError::ConfigParse { .. })
        ));
        assert!(matches!(
            Topology::from_json_str(r#"{"games": {}}"#, path),
            Err(BracketError::ConfigParse { .. })
        ));

        let bad_slot = FOUR_TEAM.replace(r#"{"game": "G3", "slot": 0}"#, r#"{"game": "G3", "slot": 2}"#);
        assert!(matches!(
            Topology::from_json_str(&bad_slot, path),
            Err(BracketError::ConfigParse { .. })
        ));

        let dangling = FOUR_TEAM.replace(r#"{"game": "G4", "slot": 0}"#, r#"{"game": "G9", "slot": 0}"#);
        assert!(matches!(
            Topology::from_json_str(&dangling, path),
            Err(BracketError::ConfigParse { .. })
        ));

        let no_rank = FOUR_TEAM.replace(r#""rank": "4th""#, r#""note": "none""#);
        assert!(matches!(
            Topology::from_json_str(&no_rank, path),
            Err(BracketError::ConfigParse { .. })
        ));

        let no_champion = FOUR_TEAM.replace(r#"{"result": "CHAMPION"}"#, r#"{"game": "G5", "slot": 0}"#);
        assert!(matches!(
            Topology::from_json_str(&no_champion, path),
            Err(BracketError::ConfigParse { .. })
        ));
    }

    #[test]
    fn test_destination_json_shape() {
        let dest = Destination::eliminated("7th");
        let json = serde_json::to_string(&dest).unwrap();
        assert_eq!(json, r#"{"result":"ELIMINATED","rank":"7TH"}"#);

        let back: Destination = serde_json::from_str(r#"{"game":"G4","slot":1}"#).unwrap();
        assert_eq!(back, Destination::advance_to("G4", 1));

        let cond: Destination = serde_json::from_str(r#"{"result":"GF_CONDITIONAL"}"#).unwrap();
        assert_eq!(cond, Destination::ConditionalReset);
    }

    #[test]
    fn test_slot_spec_parse() {
        assert_eq!(SlotSpec::parse("T3"), SlotSpec::Seed(3));
        assert_eq!(SlotSpec::parse(" T12 "), SlotSpec::Seed(12));
        assert_eq!(SlotSpec::parse("TBD"), SlotSpec::Reference("TBD".to_string()));
        assert_eq!(SlotSpec::parse("T0"), SlotSpec::Reference("T0".to_string()));
        assert_eq!(SlotSpec::parse("W-G1"), SlotSpec::Reference("W-G1".to_string()));
    }

    #[test]
    fn test_locate_searches_dirs_in_order() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        fs::write(second.path().join("4teamD.json"), FOUR_TEAM).unwrap();

        let config = LoaderConfig::default()
            .with_search_dirs(vec![first.path().to_path_buf(), second.path().to_path_buf()]);
        let path = locate(4, &config).unwrap();
        assert_eq!(path, second.path().join("4teamD.json"));

        let topo = load_topology(4, &config).unwrap();
        assert_eq!(topo.matches.len(), 7);
    }

    #[test]
    fn test_locate_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoaderConfig::default().with_search_dirs(vec![dir.path().to_path_buf()]);
        assert!(matches!(
            load_topology(4, &config),
            Err(BracketError::ConfigNotFound { .. })
        ));
        assert!(matches!(
            locate(40, &config),
            Err(BracketError::ConfigNotFound { .. })
        ));
    }

    #[test]
    fn test_elimination_tags() {
        assert_eq!(file_stem(6, EliminationType::Double), "6teamD");
        assert_eq!(EliminationType::from_tag("s"), Some(EliminationType::Single));
        assert_eq!(EliminationType::from_tag("x"), None);
    }
}
