//! Card model.
//!
//! A card is an immutable tagged value. Every place that handles cards
//! matches on [`CardKind`] exhaustively, so adding a card type is a
//! compile-time-checked change.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Per-match unique card identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CardId(pub u32);

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Card({})", self.0)
    }
}

/// What a card does, with its per-card values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardKind {
    /// Damage resisted by the defender's firewalls, amplified by boost.
    Exploit {
        /// Damage before boost.
        base_damage: i32,
    },
    /// Grants a one-turn boost to the next exploit.
    Payload,
    /// Unblockable damage with self-damage.
    #[serde(rename = "zeroday")]
    ZeroDay,
    /// Drains an enemy firewall and heals, or hits directly.
    Siphon,
    /// Deploys a barrier.
    Firewall {
        /// Absorption value of the deployed barrier.
        block_value: i32,
    },
    /// Heals when low, otherwise draws.
    Patch,
    /// Converts own firewalls into direct damage.
    Purge,
}

/// Card type without per-card values, as reported in events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardType {
    /// See [`CardKind::Exploit`].
    Exploit,
    /// See [`CardKind::Payload`].
    Payload,
    /// See [`CardKind::ZeroDay`].
    #[serde(rename = "zeroday")]
    ZeroDay,
    /// See [`CardKind::Siphon`].
    Siphon,
    /// See [`CardKind::Firewall`].
    Firewall,
    /// See [`CardKind::Patch`].
    Patch,
    /// See [`CardKind::Purge`].
    Purge,
}

impl CardKind {
    /// The value-free type tag.
    #[must_use]
    pub const fn card_type(&self) -> CardType {
        match self {
            Self::Exploit { .. } => CardType::Exploit,
            Self::Payload => CardType::Payload,
            Self::ZeroDay => CardType::ZeroDay,
            Self::Siphon => CardType::Siphon,
            Self::Firewall { .. } => CardType::Firewall,
            Self::Patch => CardType::Patch,
            Self::Purge => CardType::Purge,
        }
    }
}

impl CardType {
    /// Lowercase name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Exploit => "exploit",
            Self::Payload => "payload",
            Self::ZeroDay => "zeroday",
            Self::Siphon => "siphon",
            Self::Firewall => "firewall",
            Self::Patch => "patch",
            Self::Purge => "purge",
        }
    }
}

/// A card instance in a deck or hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    /// Traceability id, never used by game logic.
    pub id: CardId,
    /// Behaviour and values.
    pub kind: CardKind,
}

impl Card {
    /// Create a card.
    #[must_use]
    pub const fn new(id: CardId, kind: CardKind) -> Self {
        Self { id, kind }
    }

    /// Shorthand for `self.kind.card_type()`.
    #[must_use]
    pub const fn card_type(&self) -> CardType {
        self.kind.card_type()
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            CardKind::Exploit { base_damage } => write!(f, "exploit({base_damage})"),
            CardKind::Firewall { block_value } => write!(f, "firewall({block_value})"),
            other => f.write_str(other.card_type().name()),
        }
    }
}
