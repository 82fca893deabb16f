//! Team identity and two-person rosters

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque team identifier (e.g. "Team 3")
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(String);

impl TeamId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Name for the n-th seeded team (1-based)
    pub fn seeded(n: usize) -> Self {
        Self(format!("Team {}", n))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TeamId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Fixed two-person roster. Display-only; the engine never looks inside.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roster([String; 2]);

impl Roster {
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self([first.into(), second.into()])
    }

    pub fn players(&self) -> &[String; 2] {
        &self.0
    }
}

impl fmt::Display for Roster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.0[0], self.0[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_team_names() {
        assert_eq!(TeamId::seeded(1).as_str(), "Team 1");
        assert_eq!(TeamId::seeded(12).to_string(), "Team 12");
    }

    #[test]
    fn test_roster_serializes_as_pair() {
        let roster = Roster::new("Ana", "Bo");
        let json = serde_json::to_string(&roster).unwrap();
        assert_eq!(json, r#"["Ana","Bo"]"#);
        assert_eq!(roster.to_string(), "Ana / Bo");
    }
}
