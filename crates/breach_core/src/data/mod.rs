//! Balance data.
//!
//! Pure data structures for rule constants, deck recipes and AI scoring
//! tables. All of them deserialize from RON, and every field has a stock
//! value, so an override file only needs to name what it changes.
//!
//! **Note:** This module contains no IO - it only defines data types and
//! parses strings. File loading is handled by `breach_headless`.

mod deck_data;
mod heuristic_data;
mod rules_data;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::factions::FactionId;

pub use deck_data::{CardTemplate, DeckEntry, DeckRecipe, ValueRange};
pub use heuristic_data::{HeuristicTable, PhantomHeuristics, SentinelHeuristics};
pub use rules_data::GameRules;

/// Everything tunable about a match.
///
/// # Example RON
///
/// ```ron
/// Ruleset(
///     rules: (patch_heal: 4),
///     sentinel_deck: (entries: [
///         (card: Firewall(block: (min: 2, max: 4)), count: 14),
///         (card: Purge, count: 3),
///     ]),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Ruleset {
    /// Turn structure and effect amounts.
    pub rules: GameRules,
    /// Phantom starting deck.
    pub phantom_deck: DeckRecipe,
    /// Sentinel starting deck.
    pub sentinel_deck: DeckRecipe,
    /// AI scoring tables.
    pub heuristics: HeuristicTable,
}

impl Default for Ruleset {
    fn default() -> Self {
        Self::standard()
    }
}

impl Ruleset {
    /// Stock balance.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            rules: GameRules::default(),
            phantom_deck: DeckRecipe::phantom(),
            sentinel_deck: DeckRecipe::sentinel(),
            heuristics: HeuristicTable::default(),
        }
    }

    /// Deck recipe for a faction.
    #[must_use]
    pub const fn deck_for(&self, faction: FactionId) -> &DeckRecipe {
        match faction {
            FactionId::Phantom => &self.phantom_deck,
            FactionId::Sentinel => &self.sentinel_deck,
        }
    }

    /// Validate the whole ruleset.
    ///
    /// Returns a list of validation errors.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = self.rules.validate();
        errors.extend(self.phantom_deck.validate("phantom_deck"));
        errors.extend(self.sentinel_deck.validate("sentinel_deck"));
        errors
    }

    /// Parse a ruleset from RON text. `label` names the source in errors.
    ///
    /// # Errors
    ///
    /// [`GameError::DataParseError`] if the text is not a valid ruleset.
    pub fn from_ron_str(text: &str, label: &str) -> Result<Self> {
        ron::from_str(text).map_err(|e| GameError::DataParseError {
            path: label.to_string(),
            message: e.to_string(),
        })
    }

    /// Ensure [`Ruleset::validate`] found nothing.
    ///
    /// # Errors
    ///
    /// [`GameError::InvalidRuleset`] listing every problem.
    pub fn ensure_valid(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(GameError::InvalidRuleset(errors))
        }
    }
}
