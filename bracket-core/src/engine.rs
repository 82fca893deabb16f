//! Match resolution - the only code that mutates a tournament
//!
//! Every check runs before the first write, so a rejected result leaves the
//! state exactly as it was.

use serde::Serialize;

use crate::error::{BracketError, Result};
use crate::match_id::{MatchId, TOURNAMENT_OVER};
use crate::state::{ActiveMatch, TournamentState, FIRST, SECOND};
use crate::team::TeamId;
use crate::topology::Destination;

/// What a successful resolution did to the tournament
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Resolution {
    /// Teams moved on; `next` is the new active match
    Advanced { next: ActiveMatch },
    /// The losers-bracket finalist took the grand final; the reset is next
    ResetForced,
    /// The tournament has a champion
    Decided { champion: TeamId },
}

/// Record the result of one match and propagate it through the bracket
pub fn resolve(
    state: &mut TournamentState,
    match_id: &str,
    winner: &TeamId,
    loser: &TeamId,
    tag: Option<String>,
) -> Result<Resolution> {
    let id = validate(state, match_id, winner, loser)?;

    tracing::info!("{}: {} defeats {}", id, winner, loser);

    if id.is_grand_final() {
        Ok(resolve_grand_final(state, &id, winner, loser, tag))
    } else if id.is_grand_final_reset() {
        Ok(resolve_reset(state, &id, winner, tag))
    } else {
        Ok(resolve_standard(state, &id, winner, loser, tag))
    }
}

fn validate(state: &TournamentState, match_id: &str, winner: &TeamId, loser: &TeamId) -> Result<MatchId> {
    if match_id == TOURNAMENT_OVER {
        return Err(BracketError::InvalidMatch(format!(
            "{} is not a playable match",
            TOURNAMENT_OVER
        )));
    }
    let m = state
        .get(match_id)
        .ok_or_else(|| BracketError::InvalidMatch(format!("unknown match {}", match_id)))?;

    if m.winner().is_some() || m.champion().is_some() {
        return Err(BracketError::AlreadyResolved(match_id.to_string()));
    }

    if let Some(champion) = state.matches().filter(|m| m.id().is_final()).find_map(|m| m.champion()) {
        return Err(BracketError::InvalidMatch(format!(
            "tournament already won by {}; {} is not playable",
            champion, match_id
        )));
    }

    for team in [winner, loser] {
        if !m.has_team(team) {
            return Err(BracketError::TeamNotInMatch {
                match_id: match_id.to_string(),
                team: team.to_string(),
            });
        }
    }
    if m.opponent_of(winner) != Some(loser) {
        return Err(BracketError::TeamNotInMatch {
            match_id: match_id.to_string(),
            team: loser.to_string(),
        });
    }

    Ok(m.id().clone())
}

fn record_winner(state: &mut TournamentState, id: &MatchId, winner: &TeamId, tag: Option<String>) {
    if let Some(m) = state.get_mut(id) {
        m.winner = Some(winner.clone());
        m.winner_tag = tag;
    }
}

fn crown(state: &mut TournamentState, id: &MatchId, champion: &TeamId, runner_up: &TeamId) -> Resolution {
    if let Some(m) = state.get_mut(id) {
        m.champion = Some(champion.clone());
    }
    assign_rank(state, FIRST, champion);
    assign_rank(state, SECOND, runner_up);
    state.refresh_active_match();

    tracing::info!("{} wins the tournament", champion);
    Resolution::Decided {
        champion: champion.clone(),
    }
}

// ============================================================================
// FINALS
// ============================================================================

fn resolve_grand_final(
    state: &mut TournamentState,
    id: &MatchId,
    winner: &TeamId,
    loser: &TeamId,
    tag: Option<String>,
) -> Resolution {
    let (wb_finalist, already_reset) = match state.get_mut(id) {
        Some(gf) => (gf.slots[0].clone(), gf.is_reset),
        None => (None, false),
    };

    record_winner(state, id, winner, tag);

    if wb_finalist.as_ref() == Some(winner) || already_reset {
        return crown(state, id, winner, loser);
    }

    // Upset: the winners-bracket finalist takes its first loss
    let ggf = MatchId::grand_final_reset();
    if let Some(reset) = state.get_mut(&ggf) {
        for (slot, team) in [winner, loser].into_iter().enumerate() {
            if !reset.seat(slot, team.clone()) {
                tracing::warn!("{} slot {} already filled; keeping existing team", ggf, slot);
            }
        }
        reset.is_reset = true;
    }
    if let Some(gf) = state.get_mut(id) {
        gf.is_reset = true;
        gf.winner = None;
        gf.winner_tag = None;
    }
    state.active_match = ActiveMatch::Match(ggf.clone());

    tracing::info!("{} takes {}; bracket reset, {} decides", winner, id, ggf);
    Resolution::ResetForced
}

fn resolve_reset(state: &mut TournamentState, id: &MatchId, winner: &TeamId, tag: Option<String>) -> Resolution {
    let runner_up = state
        .get_mut(id)
        .and_then(|m| m.opponent_of(winner).cloned())
        .unwrap_or_else(|| winner.clone());

    record_winner(state, id, winner, tag);
    crown(state, id, winner, &runner_up)
}

// ============================================================================
// STANDARD MATCHES
// ============================================================================

fn resolve_standard(
    state: &mut TournamentState,
    id: &MatchId,
    winner: &TeamId,
    loser: &TeamId,
    tag: Option<String>,
) -> Resolution {
    let (winner_dest, loser_dest) = match state.get_mut(id) {
        Some(m) => (m.winner_destination.clone(), m.loser_destination.clone()),
        None => (None, None),
    };

    record_winner(state, id, winner, tag);

    if let Some(dest) = &winner_dest {
        route(state, id, winner, dest, true);
    }
    if let Some(dest) = &loser_dest {
        route(state, id, loser, dest, false);
    }

    state.refresh_active_match();

    match (&state.active_match, state.rankings.get(FIRST)) {
        (ActiveMatch::TournamentOver, Some(champion)) => Resolution::Decided {
            champion: champion.clone(),
        },
        (next, _) => Resolution::Advanced { next: next.clone() },
    }
}

/// Apply one destination to one team
fn route(state: &mut TournamentState, from: &MatchId, team: &TeamId, dest: &Destination, is_winner: bool) {
    match dest {
        Destination::AdvanceTo { match_id, slot } => match state.get_mut(match_id) {
            Some(target) => {
                if target.seat(*slot, team.clone()) {
                    tracing::debug!("{} -> {} slot {}", team, match_id, slot);
                } else {
                    tracing::warn!(
                        "{} slot {} already filled; {} from {} not seated",
                        match_id,
                        slot,
                        team,
                        from
                    );
                }
            }
            None => tracing::warn!("{} routes to missing match {}", from, match_id),
        },
        Destination::Champion if is_winner => {
            if let Some(m) = state.get_mut(from) {
                m.champion = Some(team.clone());
            }
            assign_rank(state, FIRST, team);
            tracing::info!("{} wins the tournament", team);
        }
        Destination::Champion => {
            tracing::debug!("{}: loser route to CHAMPION ignored", from);
        }
        Destination::Eliminated { rank } => {
            assign_rank(state, rank, team);
        }
        Destination::ConditionalReset => {}
    }
}

fn assign_rank(state: &mut TournamentState, rank: &str, team: &TeamId) {
    if state.rankings.record(rank, team.clone()) {
        tracing::debug!("{} finishes {}", team, rank);
    } else {
        tracing::warn!("rank {} already assigned; {} not recorded", rank, team);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::find_next_active_match;
    use crate::state::MatchStatus;
    use crate::test_support::{four_team_state, single_elim_state, team};

    fn play(state: &mut TournamentState, id: &str, winner: usize, loser: usize) -> Resolution {
        resolve(state, id, &team(winner), &team(loser), None).unwrap()
    }

    #[test]
    fn test_winner_and_loser_advance() {
        let mut state = four_team_state();
        let res = play(&mut state, "G1", 1, 4);
        assert_eq!(res, Resolution::Advanced { next: ActiveMatch::Match(MatchId::new("G2")) });

        assert_eq!(state.get("G1").unwrap().winner(), Some(&team(1)));
        assert_eq!(state.get("G3").unwrap().slot(0), Some(&team(1)));
        assert_eq!(state.get("G4").unwrap().slot(0), Some(&team(4)));
        assert_eq!(state.get("G1").unwrap().status(), MatchStatus::Resolved);
    }

    #[test]
    fn test_winner_tag_recorded() {
        let mut state = four_team_state();
        resolve(&mut state, "G1", &team(4), &team(1), Some("Left".to_string())).unwrap();
        assert_eq!(state.get("G1").unwrap().winner_tag(), Some("Left"));
    }

    #[test]
    fn test_already_resolved_leaves_state() {
        let mut state = four_team_state();
        play(&mut state, "G1", 1, 4);
        let before = state.clone();

        let err = resolve(&mut state, "G1", &team(4), &team(1), None).unwrap_err();
        assert!(matches!(err, BracketError::AlreadyResolved(_)));
        assert_eq!(state, before);
    }

    #[test]
    fn test_invalid_match_ids() {
        let mut state = four_team_state();
        assert!(matches!(
            resolve(&mut state, "G42", &team(1), &team(4), None),
            Err(BracketError::InvalidMatch(_))
        ));
        assert!(matches!(
            resolve(&mut state, TOURNAMENT_OVER, &team(1), &team(4), None),
            Err(BracketError::InvalidMatch(_))
        ));
    }

    #[test]
    fn test_team_not_in_match() {
        let mut state = four_team_state();
        let before = state.clone();
        assert!(matches!(
            resolve(&mut state, "G1", &team(2), &team(4), None),
            Err(BracketError::TeamNotInMatch { .. })
        ));
        assert!(matches!(
            resolve(&mut state, "G1", &team(1), &team(1), None),
            Err(BracketError::TeamNotInMatch { .. })
        ));
        assert!(matches!(
            resolve(&mut state, "G3", &team(1), &team(2), None),
            Err(BracketError::TeamNotInMatch { .. })
        ));
        assert_eq!(state, before);
    }

    #[test]
    fn test_elimination_rank_recorded_once() {
        let mut state = four_team_state();
        play(&mut state, "G1", 1, 4);
        play(&mut state, "G2", 2, 3);
        play(&mut state, "G4", 3, 4);
        assert_eq!(state.rankings().get("4TH"), Some(&team(4)));

        state.rankings.record("3RD", team(9));
        play(&mut state, "G3", 1, 2);
        play(&mut state, "G5", 2, 3);
        assert_eq!(state.rankings().get("3RD"), Some(&team(9)));
    }

    #[test]
    fn test_straight_grand_final() {
        let mut state = four_team_state();
        play(&mut state, "G1", 1, 4);
        play(&mut state, "G2", 2, 3);
        play(&mut state, "G3", 1, 2);
        play(&mut state, "G4", 3, 4);
        let res = play(&mut state, "G5", 2, 3);
        assert_eq!(res, Resolution::Advanced { next: ActiveMatch::Match(MatchId::grand_final()) });

        let gf = state.get("GF").unwrap();
        assert_eq!(gf.slots(), &[Some(team(1)), Some(team(2))]);

        let res = play(&mut state, "GF", 1, 2);
        assert_eq!(res, Resolution::Decided { champion: team(1) });
        assert_eq!(state.rankings().get(FIRST), Some(&team(1)));
        assert_eq!(state.rankings().get(SECOND), Some(&team(2)));
        assert!(state.active_match().is_over());
        assert_eq!(state.champion(), Some(&team(1)));
        assert_eq!(state.get("GF").unwrap().status(), MatchStatus::Terminal);
    }

    #[test]
    fn test_grand_final_upset_forces_reset() {
        let mut state = four_team_state();
        play(&mut state, "G1", 1, 4);
        play(&mut state, "G2", 2, 3);
        play(&mut state, "G3", 1, 2);
        play(&mut state, "G4", 3, 4);
        play(&mut state, "G5", 2, 3);

        let res = resolve(&mut state, "GF", &team(2), &team(1), Some("Right".into())).unwrap();
        assert_eq!(res, Resolution::ResetForced);

        let gf = state.get("GF").unwrap();
        assert!(gf.is_reset());
        assert_eq!(gf.winner(), None);
        assert_eq!(gf.winner_tag(), None);
        assert_eq!(gf.status(), MatchStatus::ResetPending);

        let ggf = state.get("GGF").unwrap();
        assert_eq!(ggf.slots(), &[Some(team(2)), Some(team(1))]);
        assert!(ggf.is_reset());
        assert_eq!(state.active_match(), &ActiveMatch::Match(MatchId::grand_final_reset()));

        let res = play(&mut state, "GGF", 2, 1);
        assert_eq!(res, Resolution::Decided { champion: team(2) });
        assert_eq!(state.rankings().get(FIRST), Some(&team(2)));
        assert_eq!(state.rankings().get(SECOND), Some(&team(1)));
        assert!(state.active_match().is_over());

        assert!(matches!(
            play_err(&mut state, "GGF", 2, 1),
            BracketError::AlreadyResolved(_)
        ));
    }

    fn play_err(state: &mut TournamentState, id: &str, winner: usize, loser: usize) -> BracketError {
        resolve(state, id, &team(winner), &team(loser), None).unwrap_err()
    }

    #[test]
    fn test_grand_final_after_reset_is_decisive() {
        let mut state = four_team_state();
        play(&mut state, "G1", 1, 4);
        play(&mut state, "G2", 2, 3);
        play(&mut state, "G3", 1, 2);
        play(&mut state, "G4", 3, 4);
        play(&mut state, "G5", 2, 3);
        play(&mut state, "GF", 2, 1);

        let res = play(&mut state, "GF", 2, 1);
        assert_eq!(res, Resolution::Decided { champion: team(2) });
        assert_eq!(state.rankings().get(FIRST), Some(&team(2)));

        // The seeded reset is no longer offered or playable
        assert!(state.active_match().is_over());
        assert_eq!(state.active_match(), &find_next_active_match(&state));
        assert!(matches!(play_err(&mut state, "GGF", 2, 1), BracketError::InvalidMatch(_)));

        let replayed = crate::journal::Snapshot::capture(&state).into_state().unwrap();
        assert_eq!(replayed, state);
    }

    #[test]
    fn test_single_elimination_champion() {
        let mut state = single_elim_state();
        play(&mut state, "G1", 1, 4);
        play(&mut state, "G2", 2, 3);
        let res = play(&mut state, "G3", 2, 1);

        assert_eq!(res, Resolution::Decided { champion: team(2) });
        assert_eq!(state.rankings().get(FIRST), Some(&team(2)));
        assert_eq!(state.rankings().get(SECOND), Some(&team(1)));
        assert_eq!(state.rankings().get("3RD"), Some(&team(4)));
        assert!(state.active_match().is_over());
        assert!(state.get("GF").unwrap().slots().iter().all(Option::is_none));
    }
}
