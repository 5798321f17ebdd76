//! Match state.
//!
//! [`GameState`] is plain data: the engine is its only mutator, and
//! everything in it is serializable and hashable so replays can compare
//! states field for field.

use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::factions::FactionId;
use crate::firewall::{total_firewall_value, ActiveFirewall};

/// Seat index, `0` or `1`.
pub type PlayerIndex = usize;

/// The other seat.
#[must_use]
pub const fn opponent_of(player: PlayerIndex) -> PlayerIndex {
    if player == 0 {
        1
    } else {
        0
    }
}

/// Match lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    /// Only exists while the engine is being constructed.
    Setup,
    /// Accepting actions.
    Playing,
    /// Terminal.
    GameOver,
}

/// One seat's state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerState {
    /// Faction played.
    pub faction: FactionId,
    /// Current hit points.
    pub hp: i32,
    /// Starting hit points.
    pub max_hp: i32,
    /// Draw pile; the top is the end of the vector.
    pub deck: Vec<Card>,
    /// Cards in hand, addressed by index.
    pub hand: Vec<Card>,
    /// Deployed firewalls, front absorbs first.
    pub firewalls: Vec<ActiveFirewall>,
    /// Bonus added to the next exploit this turn.
    pub boost: i32,
}

impl PlayerState {
    /// Fresh seat with a built deck and an empty hand.
    #[must_use]
    pub fn new(faction: FactionId, deck: Vec<Card>) -> Self {
        let hp = faction.starting_hp();
        Self {
            faction,
            hp,
            max_hp: hp,
            deck,
            hand: Vec::new(),
            firewalls: Vec::new(),
            boost: 0,
        }
    }

    /// Move the top card of the deck into the hand.
    ///
    /// Returns false if the deck is empty.
    pub fn draw_one(&mut self) -> bool {
        match self.deck.pop() {
            Some(card) => {
                self.hand.push(card);
                true
            }
            None => false,
        }
    }

    /// Move the top `count` cards into the hand as one block, keeping their
    /// deck order. Draws fewer if the deck runs short.
    ///
    /// Returns the number of cards drawn.
    pub fn draw_block(&mut self, count: usize) -> usize {
        let count = count.min(self.deck.len());
        let drawn = self.deck.split_off(self.deck.len() - count);
        self.hand.extend(drawn);
        count
    }

    /// Whether hit points are above zero.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Combined absorption of this seat's firewalls.
    #[must_use]
    pub fn firewall_total(&self) -> i32 {
        total_firewall_value(&self.firewalls)
    }
}

/// Authoritative state of one match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameState {
    /// Caller-supplied match identifier.
    pub match_id: String,
    /// Both seats.
    pub players: [PlayerState; 2],
    /// Seat allowed to act.
    pub current_turn: PlayerIndex,
    /// Actions left in the current turn.
    pub actions_remaining: u32,
    /// Starts at 1, incremented on every end of turn.
    pub turn_number: u32,
    /// Lifecycle phase.
    pub phase: GamePhase,
    /// Set exactly when `phase` is [`GamePhase::GameOver`].
    pub winner: Option<PlayerIndex>,
    /// Seed the match was built from.
    pub seed: u64,
}

impl GameState {
    /// Seat at `index`.
    #[must_use]
    pub fn player(&self, index: PlayerIndex) -> &PlayerState {
        &self.players[index]
    }

    /// Seat holding the turn.
    #[must_use]
    pub fn current_player(&self) -> &PlayerState {
        &self.players[self.current_turn]
    }

    /// Whether the match accepts actions.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    /// Mutable access to `(attacker, defender)` for the given attacker seat.
    pub fn split_players_mut(
        &mut self,
        attacker: PlayerIndex,
    ) -> (&mut PlayerState, &mut PlayerState) {
        let [first, second] = &mut self.players;
        if attacker == 0 {
            (first, second)
        } else {
            (second, first)
        }
    }
}
