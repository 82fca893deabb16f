//! Active match selection

use crate::state::{ActiveMatch, MatchStatus, TournamentState};

/// Pick the match to play next.
///
/// A crowned grand final (or reset) ends the tournament outright. Otherwise
/// the first `Ready` match in chronological order wins. With nothing ready,
/// a pending reset in the last scheduled match is offered; otherwise the
/// tournament is over. A grand final waiting on its reset is never offered.
pub fn find_next_active_match(state: &TournamentState) -> ActiveMatch {
    if state.matches().any(|m| m.id().is_final() && m.champion().is_some()) {
        return ActiveMatch::TournamentOver;
    }

    if let Some(ready) = state.matches().find(|m| m.status() == MatchStatus::Ready) {
        return ActiveMatch::Match(ready.id().clone());
    }

    match state.matches().last() {
        Some(last) if last.is_reset() && last.winner().is_none() && last.champion().is_none() => {
            ActiveMatch::Match(last.id().clone())
        }
        _ => ActiveMatch::TournamentOver,
    }
}
