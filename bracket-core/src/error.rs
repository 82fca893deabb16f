//! Error types for bracket operations

use std::path::PathBuf;

/// Result alias used throughout the core
pub type Result<T> = std::result::Result<T, BracketError>;

/// Error types for loading, resolving and replaying a bracket
#[derive(Debug, thiserror::Error)]
pub enum BracketError {
    #[error("bracket configuration '{file_name}' not found (searched: {})", display_paths(.searched))]
    ConfigNotFound {
        file_name: String,
        searched: Vec<PathBuf>,
    },

    #[error("failed to parse bracket configuration {}: {reason}", .path.display())]
    ConfigParse { path: PathBuf, reason: String },

    #[error("invalid match: {0}")]
    InvalidMatch(String),

    #[error("match {0} has already been resolved")]
    AlreadyResolved(String),

    #[error("team '{team}' is not seated in match {match_id}")]
    TeamNotInMatch { match_id: String, team: String },

    #[error("corrupt snapshot on line {line}: {reason}")]
    SnapshotCorrupt { line: usize, reason: String },

    #[error("no valid snapshot found in {}", .0.display())]
    NoSnapshot(PathBuf),

    #[error("tournament is complete and opened view-only")]
    ViewOnly,

    #[error("player count {count} must be even and between {min} and {max}")]
    InvalidPlayerCount { count: usize, min: usize, max: usize },

    #[error("invalid draw: {0}")]
    InvalidDraw(String),

    #[error("journal I/O failed on {}: {source}", .path.display())]
    Journal {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BracketError {
    pub(crate) fn parse(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        BracketError::ConfigParse {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn journal(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BracketError::Journal {
            path: path.into(),
            source,
        }
    }

    /// Errors that leave the tournament untouched and can be retried
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            BracketError::InvalidMatch(_)
                | BracketError::AlreadyResolved(_)
                | BracketError::TeamNotInMatch { .. }
        )
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
