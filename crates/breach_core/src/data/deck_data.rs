//! Deck recipes.
//!
//! A recipe is an ordered list of entries. Building a deck walks the list
//! in order, creating `count` cards per entry and rolling any random values
//! as it goes, so the order of entries is part of the balance data.

use serde::{Deserialize, Serialize};

use crate::cards::{Card, CardId, CardKind};
use crate::rng::SeededRandom;

/// Inclusive integer range for a per-card value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValueRange {
    /// Lowest value.
    pub min: i32,
    /// Highest value.
    pub max: i32,
}

impl ValueRange {
    /// Range containing only `value`.
    #[must_use]
    pub const fn fixed(value: i32) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    /// Range `[min, max]`.
    #[must_use]
    pub const fn between(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    /// Whether the range holds a single value.
    #[must_use]
    pub const fn is_fixed(&self) -> bool {
        self.min == self.max
    }

    /// Pick a value. Fixed ranges leave the random source untouched.
    pub fn roll(&self, rng: &mut SeededRandom) -> i32 {
        if self.is_fixed() {
            self.min
        } else {
            rng.next_int(self.min, self.max)
        }
    }
}

/// Card kind with its value range, before instantiation.
///
/// # Example RON
///
/// ```ron
/// Exploit(damage: (min: 2, max: 5))
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardTemplate {
    /// Exploit with rolled base damage.
    Exploit {
        /// Base damage range.
        damage: ValueRange,
    },
    /// Payload.
    Payload,
    /// Zero-day.
    ZeroDay,
    /// Siphon.
    Siphon,
    /// Firewall with rolled block value.
    Firewall {
        /// Block value range.
        block: ValueRange,
    },
    /// Patch.
    Patch,
    /// Purge.
    Purge,
}

impl CardTemplate {
    /// Roll values and produce a card.
    pub fn instantiate(&self, id: CardId, rng: &mut SeededRandom) -> Card {
        let kind = match self {
            Self::Exploit { damage } => CardKind::Exploit {
                base_damage: damage.roll(rng),
            },
            Self::Payload => CardKind::Payload,
            Self::ZeroDay => CardKind::ZeroDay,
            Self::Siphon => CardKind::Siphon,
            Self::Firewall { block } => CardKind::Firewall {
                block_value: block.roll(rng),
            },
            Self::Patch => CardKind::Patch,
            Self::Purge => CardKind::Purge,
        };
        Card::new(id, kind)
    }

    const fn range(&self) -> Option<ValueRange> {
        match self {
            Self::Exploit { damage } => Some(*damage),
            Self::Firewall { block } => Some(*block),
            _ => None,
        }
    }
}

/// `count` copies of one template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeckEntry {
    /// Template to instantiate.
    pub card: CardTemplate,
    /// Number of copies.
    pub count: u32,
}

impl DeckEntry {
    /// Shorthand constructor.
    #[must_use]
    pub const fn new(card: CardTemplate, count: u32) -> Self {
        Self { card, count }
    }
}

/// A faction's starting deck composition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeckRecipe {
    /// Entries in creation order.
    pub entries: Vec<DeckEntry>,
}

impl DeckRecipe {
    /// Stock Phantom deck: offense and variance.
    #[must_use]
    pub fn phantom() -> Self {
        Self {
            entries: vec![
                DeckEntry::new(
                    CardTemplate::Exploit {
                        damage: ValueRange::between(2, 5),
                    },
                    12,
                ),
                DeckEntry::new(CardTemplate::Payload, 10),
                DeckEntry::new(CardTemplate::ZeroDay, 4),
                DeckEntry::new(CardTemplate::Siphon, 4),
            ],
        }
    }

    /// Stock Sentinel deck: defense and sustain.
    #[must_use]
    pub fn sentinel() -> Self {
        Self {
            entries: vec![
                DeckEntry::new(
                    CardTemplate::Firewall {
                        block: ValueRange::between(2, 5),
                    },
                    12,
                ),
                DeckEntry::new(
                    CardTemplate::Exploit {
                        damage: ValueRange::fixed(2),
                    },
                    8,
                ),
                DeckEntry::new(CardTemplate::Patch, 6),
                DeckEntry::new(CardTemplate::Purge, 3),
            ],
        }
    }

    /// Total number of cards the recipe produces.
    #[must_use]
    pub fn size(&self) -> usize {
        self.entries.iter().map(|e| e.count as usize).sum()
    }

    /// Problems with this recipe, prefixed with `label`.
    #[must_use]
    pub fn validate(&self, label: &str) -> Vec<String> {
        let mut errors = Vec::new();

        if self.size() == 0 {
            errors.push(format!("{label}: deck is empty"));
        }

        for (i, entry) in self.entries.iter().enumerate() {
            if let Some(range) = entry.card.range() {
                if range.min > range.max {
                    errors.push(format!(
                        "{label}: entry {i} has inverted range {}..={}",
                        range.min, range.max
                    ));
                }
                if range.min < 0 {
                    errors.push(format!(
                        "{label}: entry {i} has negative value {}",
                        range.min
                    ));
                }
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_sizes() {
        assert_eq!(DeckRecipe::phantom().size(), 30);
        assert_eq!(DeckRecipe::sentinel().size(), 29);
    }

    #[test]
    fn test_fixed_range_does_not_consume_rng() {
        let mut a = SeededRandom::new(3);
        let mut b = SeededRandom::new(3);
        assert_eq!(ValueRange::fixed(2).roll(&mut a), 2);
        assert_eq!(a.next_int(0, 1000), b.next_int(0, 1000));
    }

    #[test]
    fn test_validate_catches_inverted_range() {
        let recipe = DeckRecipe {
            entries: vec![DeckEntry::new(
                CardTemplate::Firewall {
                    block: ValueRange::between(5, 2),
                },
                3,
            )],
        };
        let errors = recipe.validate("sentinel");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("sentinel:"));
    }

    #[test]
    fn test_validate_catches_empty_deck() {
        let recipe = DeckRecipe { entries: vec![] };
        assert_eq!(recipe.validate("x"), vec!["x: deck is empty".to_string()]);
    }

    #[test]
    fn test_template_ron_syntax() {
        let template: CardTemplate = ron::from_str("Exploit(damage: (min: 2, max: 5))").unwrap();
        assert_eq!(
            template,
            CardTemplate::Exploit {
                damage: ValueRange::between(2, 5)
            }
        );
    }
}
