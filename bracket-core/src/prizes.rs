//! Prize table (display-only, never consulted by the engine)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default entry fee per person used by the fallback split
pub const DEFAULT_ENTRY_FEE: u32 = 5;

/// Payouts for the top three places
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrizeTable {
    pub first: u32,
    pub second: u32,
    pub third: u32,
}

impl PrizeTable {
    /// Build from a topology `prizes` block keyed by place ("1", "2", "3")
    pub fn from_places(places: &BTreeMap<String, u32>) -> Self {
        let get = |place: &str| places.get(place).copied().unwrap_or(0);
        Self {
            first: get("1"),
            second: get("2"),
            third: get("3"),
        }
    }

    /// Back to the `{"1": .., "2": .., "3": ..}` form
    pub fn to_places(&self) -> BTreeMap<String, u32> {
        BTreeMap::from([
            ("1".to_string(), self.first),
            ("2".to_string(), self.second),
            ("3".to_string(), self.third),
        ])
    }

    /// Fallback split when a topology carries no prizes.
    ///
    /// Pool is two entry fees per team. Three teams split 70/30; larger
    /// fields split 50/30 and third place takes the whole-dollar remainder.
    pub fn from_entry_fee(num_teams: usize, fee_per_person: u32) -> Self {
        let pool = num_teams as u32 * 2 * fee_per_person;
        if num_teams == 3 {
            let first = pool * 70 / 100;
            Self {
                first,
                second: pool * 30 / 100,
                third: 0,
            }
        } else {
            let first = pool * 50 / 100;
            let second = pool * 30 / 100;
            Self {
                first,
                second,
                third: pool - first - second,
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_pool() == 0
    }

    pub fn total_pool(&self) -> u32 {
        self.first + self.second + self.third
    }

    /// Prize for a 1-based place
    pub fn for_place(&self, place: usize) -> u32 {
        match place {
            1 => self.first,
            2 => self.second,
            3 => self.third,
            _ => 0,
        }
    }

    /// Share for one member of a two-person team
    pub fn per_player(&self, place: usize) -> u32 {
        self.for_place(place) / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_places_defaults_missing_to_zero() {
        let places = BTreeMap::from([("1".to_string(), 40), ("2".to_string(), 25)]);
        let prizes = PrizeTable::from_places(&places);
        assert_eq!(prizes.first, 40);
        assert_eq!(prizes.second, 25);
        assert_eq!(prizes.third, 0);
        assert_eq!(prizes.total_pool(), 65);
        assert_eq!(prizes.per_player(2), 12);
    }

    #[test]
    fn test_entry_fee_split_three_teams() {
        let prizes = PrizeTable::from_entry_fee(3, DEFAULT_ENTRY_FEE);
        assert_eq!(prizes.total_pool(), 30);
        assert_eq!(prizes.first, 21);
        assert_eq!(prizes.second, 9);
        assert_eq!(prizes.third, 0);
    }

    #[test]
    fn test_entry_fee_split_keeps_whole_pool() {
        let prizes = PrizeTable::from_entry_fee(7, DEFAULT_ENTRY_FEE);
        assert_eq!(prizes.first, 35);
        assert_eq!(prizes.second, 21);
        assert_eq!(prizes.third, 14);
        assert_eq!(prizes.total_pool(), 70);
    }
}
