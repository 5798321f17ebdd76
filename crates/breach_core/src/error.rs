//! Error types for the game engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::state::PlayerIndex;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Why an action was rejected.
///
/// Every variant is local and recoverable by the caller: a rejected action
/// leaves the game state exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum ActionError {
    /// The match is already over.
    #[error("Game is not active")]
    InactiveGame,

    /// The acting player does not hold the turn.
    #[error("Not your turn: player {player} acted during player {current}'s turn")]
    NotYourTurn {
        /// Player who submitted the action.
        player: PlayerIndex,
        /// Player whose turn it is.
        current: PlayerIndex,
    },

    /// The current turn has used up its action allotment.
    #[error("No actions remaining")]
    NoActionsRemaining,

    /// The hand index does not refer to a card.
    #[error("Invalid card index {index} (hand holds {hand_size} cards)")]
    InvalidCardIndex {
        /// Requested index.
        index: usize,
        /// Size of the acting player's hand.
        hand_size: usize,
    },

    /// An externally encoded action carried an unrecognised type tag.
    #[error("Unknown action type: {action_type}")]
    UnknownActionType {
        /// The tag that was received.
        action_type: String,
    },
}

/// Top-level error type for everything that is not an action rejection.
#[derive(Debug, Error)]
pub enum GameError {
    /// Binary or JSON (de)serialization failed.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Balance data file parsing error.
    #[error("Failed to parse data file '{path}': {message}")]
    DataParseError {
        /// Path (or label) of the data that failed to parse.
        path: String,
        /// Error message.
        message: String,
    },

    /// Balance data parsed but is not playable.
    #[error("Invalid ruleset: {}", .0.join("; "))]
    InvalidRuleset(Vec<String>),

    /// Replay written by an incompatible version.
    #[error("Replay version mismatch: expected {expected}, got {found}")]
    ReplayVersionMismatch {
        /// Version this build understands.
        expected: u32,
        /// Version found in the file.
        found: u32,
    },

    /// A logged action was rejected while reconstructing a match.
    #[error("Replay diverged at action {index}: {source}")]
    ReplayDiverged {
        /// Position of the rejected action in the log.
        index: usize,
        /// Rejection reason.
        source: ActionError,
    },

    /// An action was refused outside a live match (e.g. while decoding).
    #[error(transparent)]
    Rejected(#[from] ActionError),

    /// File IO failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_error_messages() {
        assert_eq!(ActionError::InactiveGame.to_string(), "Game is not active");
        assert_eq!(
            ActionError::InvalidCardIndex {
                index: 7,
                hand_size: 3
            }
            .to_string(),
            "Invalid card index 7 (hand holds 3 cards)"
        );
    }

    #[test]
    fn test_action_error_json_shape() {
        let json = serde_json::to_string(&ActionError::NotYourTurn {
            player: 1,
            current: 0,
        })
        .unwrap();
        assert_eq!(json, r#"{"code":"not_your_turn","player":1,"current":0}"#);
    }

    #[test]
    fn test_replay_diverged_keeps_source() {
        let err = GameError::ReplayDiverged {
            index: 4,
            source: ActionError::NoActionsRemaining,
        };
        assert_eq!(
            err.to_string(),
            "Replay diverged at action 4: No actions remaining"
        );
        assert!(std::error::Error::source(&err).is_some());
    }
}
