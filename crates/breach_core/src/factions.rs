//! Faction definitions and identifiers.
//!
//! The faction table is static: identity and starting hit points never
//! change at runtime. Deck composition lives in [`crate::data`] because it
//! is balance data.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Unique identifier for factions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactionId {
    /// Phantom - high-variance offense: exploits, payloads, zero-days.
    Phantom,
    /// Sentinel - defense and sustain: firewalls, patches, purges.
    Sentinel,
}

/// Static per-faction data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FactionProfile {
    /// Faction identifier.
    pub id: FactionId,
    /// Display name.
    pub name: &'static str,
    /// Hit points at the start of a match (also the maximum).
    pub starting_hp: i32,
}

const PHANTOM: FactionProfile = FactionProfile {
    id: FactionId::Phantom,
    name: "Phantom",
    starting_hp: 22,
};

const SENTINEL: FactionProfile = FactionProfile {
    id: FactionId::Sentinel,
    name: "Sentinel",
    starting_hp: 20,
};

impl FactionId {
    /// Every playable faction.
    pub const ALL: [FactionId; 2] = [FactionId::Phantom, FactionId::Sentinel];

    /// Static profile for this faction.
    #[must_use]
    pub const fn profile(&self) -> &'static FactionProfile {
        match self {
            Self::Phantom => &PHANTOM,
            Self::Sentinel => &SENTINEL,
        }
    }

    /// Get the display name for this faction.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        self.profile().name
    }

    /// Starting (and maximum) hit points.
    #[must_use]
    pub const fn starting_hp(&self) -> i32 {
        self.profile().starting_hp
    }

    /// Lowercase identifier used in configs, logs and the CLI.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::Phantom => "phantom",
            Self::Sentinel => "sentinel",
        }
    }
}

impl fmt::Display for FactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for FactionId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "phantom" => Ok(Self::Phantom),
            "sentinel" => Ok(Self::Sentinel),
            other => Err(format!(
                "unknown faction '{other}' (expected 'phantom' or 'sentinel')"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starting_hp() {
        assert_eq!(FactionId::Phantom.starting_hp(), 22);
        assert_eq!(FactionId::Sentinel.starting_hp(), 20);
    }

    #[test]
    fn test_parse_round_trips_key() {
        for faction in FactionId::ALL {
            assert_eq!(faction.key().parse::<FactionId>(), Ok(faction));
        }
        assert_eq!(" Sentinel ".parse::<FactionId>(), Ok(FactionId::Sentinel));
        assert!("zephyr".parse::<FactionId>().is_err());
    }

    #[test]
    fn test_serde_uses_key() {
        assert_eq!(
            serde_json::to_string(&FactionId::Phantom).unwrap(),
            "\"phantom\""
        );
    }
}
