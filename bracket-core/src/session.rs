//! Session - owner of one tournament and its journal

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::engine::{self, Resolution};
use crate::error::{BracketError, Result};
use crate::journal::{self, Journal, Snapshot};
use crate::state::TournamentState;
use crate::team::TeamId;

/// How a session was opened
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplayMode {
    /// Results may be recorded
    Continue,
    /// Finished tournament; read-only
    ViewOnly,
}

/// A running (or finished) tournament
#[derive(Debug)]
pub struct Session {
    state: TournamentState,
    journal: Option<Journal>,
    mode: ReplayMode,
}

impl Session {
    /// Start a new tournament; with a path, the initial snapshot is written
    pub fn create(state: TournamentState, journal_path: Option<PathBuf>) -> Result<Self> {
        let journal = match journal_path {
            Some(path) => {
                let mut journal = Journal::open(path)?;
                journal.append(&Snapshot::capture(&state))?;
                tracing::info!("Journal created: {}", journal.path().display());
                Some(journal)
            }
            None => None,
        };

        Ok(Self {
            state,
            journal,
            mode: ReplayMode::Continue,
        })
    }

    /// Reopen a tournament from its journal
    pub fn resume(path: &Path) -> Result<Self> {
        let state = journal::load_last(path)?;

        if state.is_complete() {
            tracing::info!("Tournament in {} is complete; opening view-only", path.display());
            return Ok(Self {
                state,
                journal: None,
                mode: ReplayMode::ViewOnly,
            });
        }

        tracing::info!(
            "Resuming {} at {}",
            path.display(),
            state.active_match()
        );
        Ok(Self {
            state,
            journal: Some(Journal::open(path)?),
            mode: ReplayMode::Continue,
        })
    }

    /// Record a result.
    ///
    /// The engine runs on a working copy that is committed only after the
    /// snapshot is on disk. A rejected result leaves the tournament as it
    /// was, with its active match re-derived.
    pub fn resolve(
        &mut self,
        match_id: &str,
        winner: &TeamId,
        loser: &TeamId,
        tag: Option<String>,
    ) -> Result<Resolution> {
        if self.mode == ReplayMode::ViewOnly {
            return Err(BracketError::ViewOnly);
        }

        let mut working = self.state.clone();
        let resolution = match engine::resolve(&mut working, match_id, winner, loser, tag) {
            Ok(resolution) => resolution,
            Err(e) => {
                if e.is_recoverable() {
                    self.state.refresh_active_match();
                    tracing::warn!("Result for {} rejected: {}", match_id, e);
                }
                return Err(e);
            }
        };

        if let Some(journal) = self.journal.as_mut() {
            journal.append(&Snapshot::capture(&working))?;
        }
        self.state = working;

        Ok(resolution)
    }

    pub fn state(&self) -> &TournamentState {
        &self.state
    }

    pub fn mode(&self) -> ReplayMode {
        self.mode
    }

    pub fn is_view_only(&self) -> bool {
        self.mode == ReplayMode::ViewOnly
    }

    pub fn journal_path(&self) -> Option<&Path> {
        self.journal.as_ref().map(Journal::path)
    }
}
