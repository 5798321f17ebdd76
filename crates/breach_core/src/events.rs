//! Observable effects of applying an action.
//!
//! Events are produced once per action and never mutated afterwards.

use serde::{Deserialize, Serialize};

use crate::cards::CardType;
use crate::firewall::ActiveFirewall;
use crate::state::PlayerIndex;

/// What dealt a point of damage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageSource {
    /// Exploit damage on an unprotected defender.
    Exploit,
    /// Zero-day hit (either side).
    #[serde(rename = "zeroday")]
    ZeroDay,
    /// Siphon direct damage.
    Siphon,
    /// Purged firewalls converted into damage.
    Purge,
    /// Excess exploit value reflected onto the attacker.
    Backtrace,
}

/// What restored hit points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealSource {
    /// Patch heal.
    Patch,
    /// Siphon drain.
    Siphon,
}

/// One entry in an action's event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    /// Hit points lost.
    Damage {
        /// Player who lost hp.
        target: PlayerIndex,
        /// Amount lost.
        amount: i32,
        /// Cause.
        source: DamageSource,
    },
    /// Hit points gained.
    Heal {
        /// Player who gained hp.
        target: PlayerIndex,
        /// Amount gained.
        amount: i32,
        /// Cause.
        source: HealSource,
    },
    /// A firewall was appended to a player's sequence.
    FirewallDeployed {
        /// Owner.
        player: PlayerIndex,
        /// Absorption value.
        value: i32,
    },
    /// Firewalls were removed from a player's sequence.
    FirewallDestroyed {
        /// Owner.
        player: PlayerIndex,
        /// Removed firewalls, as they were before removal.
        firewalls: Vec<ActiveFirewall>,
    },
    /// Always the first event of a card play.
    CardPlayed {
        /// Acting player.
        player: PlayerIndex,
        /// Type of card played.
        card_type: CardType,
        /// Boosted damage for exploits, block value for firewalls.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        card_value: Option<i32>,
    },
    /// Cards moved from deck to hand.
    Draw {
        /// Drawing player.
        player: PlayerIndex,
        /// Number of cards actually drawn.
        count: usize,
    },
    /// Payload set the player's boost.
    BoostApplied {
        /// Boosted player.
        player: PlayerIndex,
        /// New boost value.
        amount: i32,
    },
    /// An exploit used up a nonzero boost.
    BoostConsumed {
        /// Player whose boost was spent.
        player: PlayerIndex,
        /// Boost that was added to the exploit.
        amount: i32,
    },
    /// The turn passed.
    TurnStart {
        /// New current player.
        player: PlayerIndex,
        /// Turn number after the increment.
        turn_number: u32,
    },
    /// The action ended the match.
    GameOver {
        /// Winning player.
        winner: PlayerIndex,
    },
}
