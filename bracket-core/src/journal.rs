//! Snapshot journal - append-only NDJSON replay log
//!
//! Every line is a full [`Snapshot`] of the tournament. Only the last line
//! that decodes into a consistent state matters on replay; malformed lines
//! (a torn final write, hand edits) are skipped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::{BracketError, Result};
use crate::match_id::MatchId;
use crate::prizes::PrizeTable;
use crate::state::{ActiveMatch, Match, Rankings, TournamentState};
use crate::team::{Roster, TeamId};
use crate::topology::{Destination, SlotSpec};

/// Record type tag of a snapshot line
pub const SNAPSHOT_TYPE: &str = "SNAPSHOT";
/// Current snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

// ============================================================================
// SNAPSHOT FORMAT
// ============================================================================

/// One journal line
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(rename = "type")]
    pub record_type: String,
    #[serde(default = "default_version")]
    pub version: u32,
    pub timestamp: DateTime<Utc>,
    pub teams: Vec<TeamId>,
    #[serde(default)]
    pub rosters: BTreeMap<TeamId, Roster>,
    pub state: BTreeMap<MatchId, MatchSnapshot>,
    #[serde(default)]
    pub rankings: Rankings,
    pub active_match_id: ActiveMatch,
    #[serde(default)]
    pub prizes: BTreeMap<String, u32>,
}

fn default_version() -> u32 {
    SNAPSHOT_VERSION
}

/// Persisted form of a single match
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub slots: [Option<TeamId>; 2],
    #[serde(default)]
    pub winner: Option<TeamId>,
    #[serde(default)]
    pub winner_tag: Option<String>,
    #[serde(default)]
    pub is_reset: bool,
    #[serde(default)]
    pub champion: Option<TeamId>,
    #[serde(default)]
    pub destinations: Destinations,
    #[serde(default = "unknown_slot_specs")]
    pub slot_specs: [SlotSpec; 2],
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destinations {
    #[serde(default)]
    pub winner: Option<Destination>,
    #[serde(default)]
    pub loser: Option<Destination>,
}

fn unknown_slot_specs() -> [SlotSpec; 2] {
    [SlotSpec::parse("TBD"), SlotSpec::parse("TBD")]
}

impl Snapshot {
    /// Capture the current state, stamped with the current time
    pub fn capture(state: &TournamentState) -> Self {
        let matches = state
            .matches()
            .map(|m| {
                (
                    m.id.clone(),
                    MatchSnapshot {
                        slots: m.slots.clone(),
                        winner: m.winner.clone(),
                        winner_tag: m.winner_tag.clone(),
                        is_reset: m.is_reset,
                        champion: m.champion.clone(),
                        destinations: Destinations {
                            winner: m.winner_destination.clone(),
                            loser: m.loser_destination.clone(),
                        },
                        slot_specs: m.slot_specs.clone(),
                    },
                )
            })
            .collect();

        Self {
            record_type: SNAPSHOT_TYPE.to_string(),
            version: SNAPSHOT_VERSION,
            timestamp: Utc::now(),
            teams: state.teams.clone(),
            rosters: state.rosters.clone(),
            state: matches,
            rankings: state.rankings.clone(),
            active_match_id: state.active_match.clone(),
            prizes: state.prizes.to_places(),
        }
    }

    /// Rebuild a tournament, checking that the snapshot hangs together.
    ///
    /// The active match is re-derived from the matches; a recorded value
    /// that disagrees is replaced.
    pub fn into_state(self) -> std::result::Result<TournamentState, String> {
        if self.record_type != SNAPSHOT_TYPE {
            return Err(format!("record type '{}' is not {}", self.record_type, SNAPSHOT_TYPE));
        }
        if self.version > SNAPSHOT_VERSION {
            return Err(format!("unsupported snapshot version {}", self.version));
        }
        if self.state.is_empty() {
            return Err("snapshot has no matches".to_string());
        }

        let ids: HashSet<&MatchId> = self.state.keys().collect();
        for (id, snap) in &self.state {
            for dest in [&snap.destinations.winner, &snap.destinations.loser].into_iter().flatten() {
                if let Some((target, _)) = dest.target() {
                    if !ids.contains(target) {
                        return Err(format!("{} routes to unknown match {}", id, target));
                    }
                }
            }
            if let Some(winner) = &snap.winner {
                if !snap.slots.iter().flatten().any(|t| t == winner) {
                    return Err(format!("{} winner {} is not seated", id, winner));
                }
            }
        }
        if let Some(active) = self.active_match_id.match_id() {
            if !ids.contains(active) {
                return Err(format!("active match {} does not exist", active));
            }
        }

        let matches = self
            .state
            .into_iter()
            .map(|(id, snap)| Match {
                order: id.order(),
                id,
                slots: snap.slots,
                slot_specs: snap.slot_specs,
                winner_destination: snap.destinations.winner,
                loser_destination: snap.destinations.loser,
                winner: snap.winner,
                winner_tag: snap.winner_tag,
                is_reset: snap.is_reset,
                champion: snap.champion,
            })
            .collect();

        let recorded = self.active_match_id;
        let mut state = TournamentState::from_parts(
            matches,
            recorded.clone(),
            self.rankings,
            self.teams,
            self.rosters,
            PrizeTable::from_places(&self.prizes),
        );
        state.refresh_active_match();
        if state.active_match != recorded {
            tracing::warn!(
                "Snapshot active match {} replaced by {}",
                recorded,
                state.active_match
            );
        }

        Ok(state)
    }
}

/// Decode one journal line (1-based `line` for error reporting)
pub fn decode_line(line: usize, text: &str) -> Result<TournamentState> {
    let corrupt = |reason: String| BracketError::SnapshotCorrupt { line, reason };
    let snapshot: Snapshot = serde_json::from_str(text).map_err(|e| corrupt(e.to_string()))?;
    snapshot.into_state().map_err(corrupt)
}

// ============================================================================
// WRITE PATH
// ============================================================================

/// Open journal file positioned for appends
#[derive(Debug)]
pub struct Journal {
    path: PathBuf,
    file: File,
}

impl Journal {
    /// Open for appending, creating the file and its directory if needed.
    ///
    /// A torn final line (no trailing newline) is closed off first, so the
    /// next snapshot starts on a line of its own.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| BracketError::journal(parent, e))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)
            .map_err(|e| BracketError::journal(&path, e))?;

        if ends_with_torn_line(&mut file).map_err(|e| BracketError::journal(&path, e))? {
            tracing::warn!("Journal {} ends in a partial line; closing it", path.display());
            file.write_all(b"\n")
                .and_then(|_| file.sync_all())
                .map_err(|e| BracketError::journal(&path, e))?;
        }

        tracing::debug!("Journal open: {}", path.display());
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write one snapshot line and sync it to disk
    pub fn append(&mut self, snapshot: &Snapshot) -> Result<()> {
        let mut line = serde_json::to_string(snapshot)
            .map_err(|e| BracketError::journal(&self.path, e.into()))?;
        line.push('\n');

        self.file
            .write_all(line.as_bytes())
            .and_then(|_| self.file.flush())
            .and_then(|_| self.file.sync_all())
            .map_err(|e| BracketError::journal(&self.path, e))
    }
}

/// Non-empty and missing its final newline
fn ends_with_torn_line(file: &mut File) -> std::io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(false);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

// ============================================================================
// READ PATH
// ============================================================================

/// Replay a journal: the state from its last well-formed snapshot
pub fn load_last(path: &Path) -> Result<TournamentState> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(BracketError::NoSnapshot(path.to_path_buf()))
        }
        Err(e) => return Err(BracketError::journal(path, e)),
    };
    let content = String::from_utf8_lossy(&bytes);

    let mut last = None;
    let mut skipped = 0usize;
    for (idx, text) in content.lines().enumerate() {
        if text.trim().is_empty() {
            continue;
        }
        match decode_line(idx + 1, text) {
            Ok(state) => last = Some(state),
            Err(e) => {
                skipped += 1;
                tracing::debug!("{}: {}", path.display(), e);
            }
        }
    }

    if skipped > 0 {
        tracing::info!("Skipped {} unreadable journal line(s) in {}", skipped, path.display());
    }
    last.ok_or_else(|| BracketError::NoSnapshot(path.to_path_buf()))
}
