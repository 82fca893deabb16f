//! Bracket Core - tournament bracket engine
//!
//! This crate provides the core logic for running a bracket:
//! - Topology loading (JSON and legacy `.game` routing graphs)
//! - Tournament state and match resolution with grand-final reset
//! - Active match selection
//! - Snapshot journal for replaying a tournament after a restart
//! - Player draw, team formation and prize table

pub mod error;
pub mod match_id;
pub mod team;
pub mod topology;
pub mod prizes;
pub mod state;
pub mod engine;
pub mod selector;
pub mod journal;
pub mod session;
pub mod draw;

// Re-exports for convenient access
pub use error::{BracketError, Result};
pub use match_id::{MatchId, MatchOrder, GRAND_FINAL, GRAND_FINAL_RESET, TOURNAMENT_OVER};
pub use team::{Roster, TeamId};
pub use topology::{load_topology, load_topology_file, Destination, EliminationType, LoaderConfig, SlotSpec, Topology};
pub use prizes::PrizeTable;
pub use state::{ActiveMatch, Match, MatchStatus, Rankings, TournamentState, FIRST, SECOND};
pub use engine::{resolve, Resolution};
pub use selector::find_next_active_match;
pub use journal::{load_last, Journal, Snapshot};
pub use session::{ReplayMode, Session};
pub use draw::{draw_teams, DrawConfig, DrawResult, PlayerEntry};
