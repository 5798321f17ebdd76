//! Player actions and the serializable action report.

use serde::{Deserialize, Serialize};

use crate::engine::ActionResult;
use crate::error::{ActionError, GameError, Result};
use crate::events::GameEvent;
use crate::state::PlayerIndex;

/// One discrete player decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameAction {
    /// Play the card at this position in the acting player's hand.
    PlayCard {
        /// Index into the hand.
        card_index: usize,
    },
    /// Pass the turn to the opponent.
    EndTurn,
}

/// Flat JSON encoding shared with external callers:
/// `{"type":"play_card","card_index":2}` or `{"type":"end_turn"}`.
#[derive(Debug, Serialize, Deserialize)]
struct WireAction {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    card_index: Option<usize>,
}

impl GameAction {
    /// Decode an action from its JSON wire form.
    ///
    /// # Errors
    ///
    /// [`GameError::Serialization`] for malformed JSON or a `play_card`
    /// without `card_index`, and [`ActionError::UnknownActionType`] (as
    /// [`GameError::Rejected`]) for an unrecognised `type`.
    pub fn from_json(json: &str) -> Result<Self> {
        let wire: WireAction =
            serde_json::from_str(json).map_err(|e| GameError::Serialization(e.to_string()))?;

        match wire.kind.as_str() {
            "play_card" => wire
                .card_index
                .map(|card_index| Self::PlayCard { card_index })
                .ok_or_else(|| GameError::Serialization("play_card requires card_index".into())),
            "end_turn" => Ok(Self::EndTurn),
            _ => Err(ActionError::UnknownActionType {
                action_type: wire.kind,
            }
            .into()),
        }
    }

    /// Encode an action in its JSON wire form.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Serialization`] if encoding fails.
    pub fn to_json(&self) -> Result<String> {
        let wire = match *self {
            Self::PlayCard { card_index } => WireAction {
                kind: "play_card".into(),
                card_index: Some(card_index),
            },
            Self::EndTurn => WireAction {
                kind: "end_turn".into(),
                card_index: None,
            },
        };
        serde_json::to_string(&wire).map_err(|e| GameError::Serialization(e.to_string()))
    }
}

/// Flattened view of an [`ActionResult`] for callers that persist or
/// forward results as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionReport {
    /// Whether the engine accepted the action.
    pub success: bool,
    /// Rejection reason, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ActionError>,
    /// Events produced (empty on rejection).
    pub events: Vec<GameEvent>,
    /// Whether the match is over.
    pub game_over: bool,
    /// Winner, once the match is over.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<PlayerIndex>,
}

impl From<ActionResult> for ActionReport {
    fn from(result: ActionResult) -> Self {
        match result {
            Ok(outcome) => Self {
                success: true,
                error: None,
                events: outcome.events,
                game_over: outcome.game_over,
                winner: outcome.winner,
            },
            Err(error) => Self {
                success: false,
                // Only a finished match rejects with InactiveGame.
                game_over: error == ActionError::InactiveGame,
                error: Some(error),
                events: Vec::new(),
                winner: None,
            },
        }
    }
}
