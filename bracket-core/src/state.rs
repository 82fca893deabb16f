//! Tournament state - matches, roster, rankings and the active match

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

use crate::match_id::{MatchId, MatchOrder, TOURNAMENT_OVER};
use crate::prizes::PrizeTable;
use crate::selector::find_next_active_match;
use crate::team::{Roster, TeamId};
use crate::topology::{Destination, MatchSpec, SlotSpec, Topology};

/// Rank label of the champion
pub const FIRST: &str = "1ST";
/// Rank label of the runner-up
pub const SECOND: &str = "2ND";

// ============================================================================
// MATCH
// ============================================================================

/// Derived lifecycle state of a match
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    /// Not both slots filled
    Pending,
    /// Both slots filled, no winner
    Ready,
    /// Winner recorded
    Resolved,
    /// Grand final un-resolved by an upset; its rematch is the reset match
    ResetPending,
    /// Produced the champion
    Terminal,
}

/// A single match of the bracket
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Match {
    pub(crate) id: MatchId,
    pub(crate) order: MatchOrder,
    pub(crate) slots: [Option<TeamId>; 2],
    pub(crate) slot_specs: [SlotSpec; 2],
    pub(crate) winner_destination: Option<Destination>,
    pub(crate) loser_destination: Option<Destination>,
    pub(crate) winner: Option<TeamId>,
    pub(crate) winner_tag: Option<String>,
    pub(crate) is_reset: bool,
    pub(crate) champion: Option<TeamId>,
}

impl Match {
    /// Empty match for a routing-graph entry
    pub fn from_spec(spec: &MatchSpec) -> Self {
        Self {
            id: spec.id.clone(),
            order: spec.id.order(),
            slots: [None, None],
            slot_specs: spec.slots.clone(),
            winner_destination: spec.winner_destination.clone(),
            loser_destination: spec.loser_destination.clone(),
            winner: None,
            winner_tag: None,
            is_reset: false,
            champion: None,
        }
    }

    pub fn id(&self) -> &MatchId {
        &self.id
    }

    pub fn order(&self) -> MatchOrder {
        self.order
    }

    pub fn slots(&self) -> &[Option<TeamId>; 2] {
        &self.slots
    }

    pub fn slot(&self, slot: usize) -> Option<&TeamId> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    pub fn slot_specs(&self) -> &[SlotSpec; 2] {
        &self.slot_specs
    }

    pub fn winner_destination(&self) -> Option<&Destination> {
        self.winner_destination.as_ref()
    }

    pub fn loser_destination(&self) -> Option<&Destination> {
        self.loser_destination.as_ref()
    }

    pub fn winner(&self) -> Option<&TeamId> {
        self.winner.as_ref()
    }

    pub fn winner_tag(&self) -> Option<&str> {
        self.winner_tag.as_deref()
    }

    pub fn is_reset(&self) -> bool {
        self.is_reset
    }

    pub fn champion(&self) -> Option<&TeamId> {
        self.champion.as_ref()
    }

    pub fn status(&self) -> MatchStatus {
        if self.champion.is_some() {
            MatchStatus::Terminal
        } else if self.winner.is_some() {
            MatchStatus::Resolved
        } else if self.is_reset && self.id.is_grand_final() {
            MatchStatus::ResetPending
        } else if self.is_full() {
            MatchStatus::Ready
        } else {
            MatchStatus::Pending
        }
    }

    pub fn is_full(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    pub fn has_team(&self, team: &TeamId) -> bool {
        self.slots.iter().flatten().any(|t| t == team)
    }

    /// The other occupant, if `team` is seated here
    pub fn opponent_of(&self, team: &TeamId) -> Option<&TeamId> {
        match &self.slots {
            [Some(a), Some(b)] if a == team => Some(b),
            [Some(a), Some(b)] if b == team => Some(a),
            _ => None,
        }
    }

    /// Seat a team; an occupied slot is never overwritten (first writer wins)
    pub(crate) fn seat(&mut self, slot: usize, team: TeamId) -> bool {
        match self.slots.get_mut(slot) {
            Some(entry @ None) => {
                *entry = Some(team);
                true
            }
            _ => false,
        }
    }

    /// Text to show for a slot: the team, or the routing text until seated
    pub fn slot_label(&self, slot: usize) -> String {
        match (self.slot(slot), self.slot_specs.get(slot)) {
            (Some(team), _) => team.to_string(),
            (None, Some(spec)) => spec.to_string(),
            (None, None) => "TBD".to_string(),
        }
    }
}

// ============================================================================
// ACTIVE MATCH
// ============================================================================

/// The match to play next, or the end of the tournament
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActiveMatch {
    Match(MatchId),
    TournamentOver,
}

impl ActiveMatch {
    pub fn match_id(&self) -> Option<&MatchId> {
        match self {
            ActiveMatch::Match(id) => Some(id),
            ActiveMatch::TournamentOver => None,
        }
    }

    pub fn is_over(&self) -> bool {
        matches!(self, ActiveMatch::TournamentOver)
    }
}

impl From<String> for ActiveMatch {
    fn from(id: String) -> Self {
        if id == TOURNAMENT_OVER {
            ActiveMatch::TournamentOver
        } else {
            ActiveMatch::Match(MatchId::new(id))
        }
    }
}

impl From<ActiveMatch> for String {
    fn from(active: ActiveMatch) -> Self {
        active.to_string()
    }
}

impl fmt::Display for ActiveMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActiveMatch::Match(id) => write!(f, "{}", id),
            ActiveMatch::TournamentOver => f.write_str(TOURNAMENT_OVER),
        }
    }
}

// ============================================================================
// RANKINGS
// ============================================================================

/// Final placements in the order they were decided.
///
/// Each label is assigned at most once.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Rankings {
    entries: Vec<(String, TeamId)>,
}

impl Rankings {
    pub fn get(&self, rank: &str) -> Option<&TeamId> {
        self.entries
            .iter()
            .find(|(label, _)| label == rank)
            .map(|(_, team)| team)
    }

    pub fn contains(&self, rank: &str) -> bool {
        self.get(rank).is_some()
    }

    /// Assign a rank unless it is already taken; returns whether it was written
    pub(crate) fn record(&mut self, rank: &str, team: TeamId) -> bool {
        if self.contains(rank) {
            return false;
        }
        self.entries.push((rank.to_string(), team));
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TeamId)> {
        self.entries.iter().map(|(label, team)| (label.as_str(), team))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Placements ordered by place number (`1ST`, `2ND`, `3RD`, `5TH`, ...)
    pub fn placings(&self) -> Vec<(&str, &TeamId)> {
        let mut placings: Vec<_> = self.iter().collect();
        placings.sort_by_key(|(label, _)| place_number(label));
        placings
    }
}

/// Leading digits of a rank label; labels without one sort last
pub fn place_number(label: &str) -> u32 {
    let digits: String = label.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(u32::MAX)
}

impl Serialize for Rankings {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, team) in &self.entries {
            map.serialize_entry(label, team)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Rankings {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RankingsVisitor;

        impl<'de> Visitor<'de> for RankingsVisitor {
            type Value = Rankings;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of rank label to team")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Rankings, A::Error> {
                let mut rankings = Rankings::default();
                while let Some((label, team)) = access.next_entry::<String, TeamId>()? {
                    if !rankings.record(&label, team) {
                        return Err(serde::de::Error::custom(format!(
                            "rank {} assigned twice",
                            label
                        )));
                    }
                }
                Ok(rankings)
            }
        }

        deserializer.deserialize_map(RankingsVisitor)
    }
}

// ============================================================================
// TOURNAMENT STATE
// ============================================================================

/// The whole mutable aggregate of one tournament
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TournamentState {
    pub(crate) matches: BTreeMap<MatchId, Match>,
    /// Match ids in chronological order, fixed at construction
    pub(crate) schedule: Vec<MatchId>,
    pub(crate) active_match: ActiveMatch,
    pub(crate) rankings: Rankings,
    pub(crate) teams: Vec<TeamId>,
    pub(crate) rosters: BTreeMap<TeamId, Roster>,
    pub(crate) prizes: PrizeTable,
}

impl TournamentState {
    /// Build a fresh bracket from seeded teams and a routing graph.
    ///
    /// `T<n>` slot specs are resolved to the n-th team here and nowhere
    /// else; seeds beyond the roster leave the slot empty.
    pub fn generate(teams: Vec<(TeamId, Roster)>, topology: &Topology) -> Self {
        let team_ids: Vec<TeamId> = teams.iter().map(|(id, _)| id.clone()).collect();

        let matches = topology
            .matches
            .iter()
            .map(|spec| {
                let mut m = Match::from_spec(spec);
                for (slot, slot_spec) in spec.slots.iter().enumerate() {
                    if let SlotSpec::Seed(n) = slot_spec {
                        match team_ids.get(n - 1) {
                            Some(team) => {
                                m.seat(slot, team.clone());
                            }
                            None => tracing::warn!(
                                "{} slot {} expects seed T{} but only {} teams entered",
                                spec.id,
                                slot,
                                n,
                                team_ids.len()
                            ),
                        }
                    }
                }
                m
            })
            .collect();

        let prizes = if topology.prizes.is_empty() {
            PrizeTable::from_entry_fee(team_ids.len(), crate::prizes::DEFAULT_ENTRY_FEE)
        } else {
            topology.prizes
        };

        let mut state = Self::from_parts(
            matches,
            ActiveMatch::TournamentOver,
            Rankings::default(),
            team_ids,
            teams.into_iter().collect(),
            prizes,
        );
        state.refresh_active_match();

        tracing::info!(
            "Generated bracket: {} teams, {} matches, first match {}",
            state.teams.len(),
            state.matches.len(),
            state.active_match
        );

        state
    }

    /// Assemble a state and compute its schedule
    pub(crate) fn from_parts(
        matches: Vec<Match>,
        active_match: ActiveMatch,
        rankings: Rankings,
        teams: Vec<TeamId>,
        rosters: BTreeMap<TeamId, Roster>,
        prizes: PrizeTable,
    ) -> Self {
        let mut schedule: Vec<(MatchOrder, MatchId)> =
            matches.iter().map(|m| (m.order, m.id.clone())).collect();
        schedule.sort();

        Self {
            matches: matches.into_iter().map(|m| (m.id.clone(), m)).collect(),
            schedule: schedule.into_iter().map(|(_, id)| id).collect(),
            active_match,
            rankings,
            teams,
            rosters,
            prizes,
        }
    }

    pub fn get(&self, id: &str) -> Option<&Match> {
        self.matches.get(&MatchId::new(id))
    }

    pub(crate) fn get_mut(&mut self, id: &MatchId) -> Option<&mut Match> {
        self.matches.get_mut(id)
    }

    /// Matches in chronological order
    pub fn matches(&self) -> impl Iterator<Item = &Match> {
        self.schedule.iter().filter_map(|id| self.matches.get(id))
    }

    pub fn schedule(&self) -> &[MatchId] {
        &self.schedule
    }

    pub fn active_match(&self) -> &ActiveMatch {
        &self.active_match
    }

    /// The match to play next, if any
    pub fn active(&self) -> Option<&Match> {
        self.active_match
            .match_id()
            .and_then(|id| self.matches.get(id))
    }

    pub fn rankings(&self) -> &Rankings {
        &self.rankings
    }

    pub fn teams(&self) -> &[TeamId] {
        &self.teams
    }

    pub fn rosters(&self) -> &BTreeMap<TeamId, Roster> {
        &self.rosters
    }

    pub fn roster(&self, team: &TeamId) -> Option<&Roster> {
        self.rosters.get(team)
    }

    pub fn prizes(&self) -> &PrizeTable {
        &self.prizes
    }

    /// The champion, once a match has produced one
    pub fn champion(&self) -> Option<&TeamId> {
        self.matches().find_map(Match::champion)
    }

    /// Finished: nothing left to play or a champion is ranked
    pub fn is_complete(&self) -> bool {
        self.active_match.is_over() || self.rankings.contains(FIRST)
    }

    /// Re-derive the active match from the rest of the state
    pub fn refresh_active_match(&mut self) {
        self.active_match = find_next_active_match(self);
    }
}
