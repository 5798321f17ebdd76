//! JSON-lines protocol for interactive play.
//!
//! One JSON object per line in each direction:
//!
//! **Input (stdin):** commands from the human (or a script)
//! **Output (stdout):** responses from the session
//!
//! # Example Session
//!
//! ```text
//! <- {"type":"ready","version":"1.0"}
//! -> {"cmd":"new_game","faction":"phantom","opponent":"sentinel","seed":42}
//! <- {"type":"state","match_id":"session_42","turn_number":1,...}
//! -> {"cmd":"play","card_index":0}
//! <- {"type":"events","events":[{"type":"card_played",...}],...}
//! -> {"cmd":"end_turn"}
//! <- {"type":"events","events":[...],...}
//! -> {"cmd":"quit"}
//! <- {"type":"bye"}
//! ```

use serde::{Deserialize, Serialize};

use breach_core::cards::{Card, CardKind, CardType};
use breach_core::error::ActionError;
use breach_core::events::GameEvent;
use breach_core::factions::FactionId;
use breach_core::state::{opponent_of, GameState, PlayerIndex, PlayerState};

/// Protocol version announced in [`Response::Ready`].
pub const PROTOCOL_VERSION: &str = "1.0";

// ============================================================================
// Input Commands (player -> session)
// ============================================================================

/// Commands accepted by a play session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
    /// Start a new match, discarding any current one.
    NewGame {
        /// Human faction.
        #[serde(default = "default_faction")]
        faction: FactionId,
        /// Computer faction.
        #[serde(default = "default_opponent")]
        opponent: FactionId,
        /// Match seed (defaults to the current time).
        #[serde(default)]
        seed: Option<u64>,
    },

    /// Play the card at `card_index` in the human's hand.
    Play {
        /// Index into the hand.
        card_index: usize,
    },

    /// End the human's turn; the computer then plays its turn.
    EndTurn,

    /// Report the current state without acting.
    State,

    /// Write the match replay to a file.
    SaveReplay {
        /// Destination path.
        path: String,
    },

    /// Close the session.
    Quit,
}

fn default_faction() -> FactionId {
    FactionId::Phantom
}

fn default_opponent() -> FactionId {
    FactionId::Sentinel
}

// ============================================================================
// Output Responses (session -> player)
// ============================================================================

/// Responses written by a play session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Session is ready to accept commands.
    Ready {
        /// Protocol version.
        version: String,
    },

    /// Current match state from the human's point of view.
    State(StateView),

    /// Events produced by the last command.
    Events {
        /// Events in order; the computer's turn follows the human's.
        events: Vec<GameEvent>,
        /// Seat holding the turn afterwards.
        current_turn: PlayerIndex,
        /// Actions left in that turn.
        actions_remaining: u32,
    },

    /// Command failed. A rejected human action leaves the match unchanged;
    /// a rejected computer action follows the events already applied.
    Error {
        /// Human-readable reason.
        message: String,
        /// Engine rejection, when the engine refused the action.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rejection: Option<ActionError>,
    },

    /// The match has ended.
    GameOver {
        /// Winning seat.
        winner: PlayerIndex,
        /// Whether the human won.
        you_won: bool,
        /// Final turn number.
        turn_number: u32,
    },

    /// Replay written to disk.
    ReplaySaved {
        /// Destination path.
        path: String,
        /// Number of recorded actions.
        actions: usize,
    },

    /// Goodbye message before shutdown.
    Bye,
}

impl Response {
    /// Error response with no engine rejection attached.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
            rejection: None,
        }
    }

    /// Error response for an action the engine refused.
    #[must_use]
    pub fn rejected(rejection: ActionError) -> Self {
        Self::Error {
            message: rejection.to_string(),
            rejection: Some(rejection),
        }
    }
}

// ============================================================================
// State Types
// ============================================================================

/// Match state as shown to the human in seat 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateView {
    /// Match identifier.
    pub match_id: String,
    /// Current turn number.
    pub turn_number: u32,
    /// Seat holding the turn.
    pub current_turn: PlayerIndex,
    /// Actions left in the current turn.
    pub actions_remaining: u32,
    /// The human's seat.
    pub you: SeatView,
    /// The computer's seat, hand hidden.
    pub opponent: SeatView,
    /// Winner, once the match is over.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<PlayerIndex>,
}

impl StateView {
    /// View of `state` for the human at `seat`.
    #[must_use]
    pub fn for_seat(state: &GameState, seat: PlayerIndex) -> Self {
        Self {
            match_id: state.match_id.clone(),
            turn_number: state.turn_number,
            current_turn: state.current_turn,
            actions_remaining: state.actions_remaining,
            you: SeatView::new(state.player(seat), true),
            opponent: SeatView::new(state.player(opponent_of(seat)), false),
            winner: state.winner,
        }
    }
}

/// One seat's public (and, for the human, private) information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatView {
    /// Faction played.
    pub faction: FactionId,
    /// Current hit points.
    pub hp: i32,
    /// Starting hit points.
    pub max_hp: i32,
    /// Cards in hand, only for the human.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hand: Option<Vec<HandCard>>,
    /// Number of cards in hand.
    pub hand_size: usize,
    /// Cards left to draw.
    pub deck_size: usize,
    /// Deployed firewall values, front first.
    pub firewalls: Vec<i32>,
    /// Pending exploit boost.
    pub boost: i32,
}

impl SeatView {
    fn new(player: &PlayerState, show_hand: bool) -> Self {
        let hand = show_hand.then(|| {
            player
                .hand
                .iter()
                .enumerate()
                .map(|(index, card)| HandCard::new(index, card))
                .collect()
        });

        Self {
            faction: player.faction,
            hp: player.hp,
            max_hp: player.max_hp,
            hand,
            hand_size: player.hand.len(),
            deck_size: player.deck.len(),
            firewalls: player.firewalls.iter().map(|fw| fw.value).collect(),
            boost: player.boost,
        }
    }
}

/// A card in the human's hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandCard {
    /// Index to pass to [`Command::Play`].
    pub index: usize,
    /// Card type.
    pub card_type: CardType,
    /// Exploit damage or firewall block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<i32>,
}

impl HandCard {
    fn new(index: usize, card: &Card) -> Self {
        let value = match card.kind {
            CardKind::Exploit { base_damage } => Some(base_damage),
            CardKind::Firewall { block_value } => Some(block_value),
            _ => None,
        };
        Self {
            index,
            card_type: card.card_type(),
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use breach_core::engine::{GameEngine, MatchConfig};

    #[test]
    fn test_parse_commands() {
        let cmd: Command = serde_json::from_str(r#"{"cmd":"play","card_index":3}"#).unwrap();
        assert_eq!(cmd, Command::Play { card_index: 3 });

        let cmd: Command = serde_json::from_str(r#"{"cmd":"new_game"}"#).unwrap();
        assert_eq!(
            cmd,
            Command::NewGame {
                faction: FactionId::Phantom,
                opponent: FactionId::Sentinel,
                seed: None,
            }
        );

        let cmd: Command =
            serde_json::from_str(r#"{"cmd":"new_game","faction":"sentinel","seed":9}"#).unwrap();
        assert!(matches!(
            cmd,
            Command::NewGame {
                faction: FactionId::Sentinel,
                seed: Some(9),
                ..
            }
        ));

        assert!(serde_json::from_str::<Command>(r#"{"cmd":"surrender"}"#).is_err());
    }

    #[test]
    fn test_response_tags() {
        let json = serde_json::to_string(&Response::Bye).unwrap();
        assert_eq!(json, r#"{"type":"bye"}"#);

        let json = serde_json::to_string(&Response::rejected(ActionError::NoActionsRemaining))
            .unwrap();
        assert!(json.starts_with(r#"{"type":"error","message":"No actions remaining""#));
        assert!(json.contains(r#""code":"no_actions_remaining""#));
    }

    #[test]
    fn test_state_view_hides_opponent_hand() {
        let engine = GameEngine::new(&MatchConfig::new(
            "view",
            FactionId::Phantom,
            FactionId::Sentinel,
            42,
        ));
        let view = StateView::for_seat(engine.state(), 0);

        assert_eq!(view.you.faction, FactionId::Phantom);
        assert_eq!(view.you.hand.as_ref().map(Vec::len), Some(5));
        assert_eq!(view.opponent.hand, None);
        assert_eq!(view.opponent.hand_size, 5);
        assert_eq!(view.opponent.hp, 20);

        let json = serde_json::to_string(&Response::State(view)).unwrap();
        assert!(json.starts_with(r#"{"type":"state","match_id":"view""#));
    }
}
