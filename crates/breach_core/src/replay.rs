//! Match replays.
//!
//! A replay stores the match config (which carries the seed) and the
//! ordered list of accepted actions. Rebuilding a fresh engine from the
//! config and re-applying every action reproduces the live state exactly.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::action::GameAction;
use crate::data::Ruleset;
use crate::engine::{GameEngine, MatchConfig};
use crate::error::{GameError, Result};
use crate::state::PlayerIndex;

/// Replay file format version for compatibility.
pub const REPLAY_VERSION: u32 = 1;

/// One accepted action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedAction {
    /// Acting seat.
    pub player: PlayerIndex,
    /// What it did.
    pub action: GameAction,
}

/// Complete replay of one match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchReplay {
    /// Replay format version.
    pub version: u32,
    /// Config the match was built from.
    pub config: MatchConfig,
    /// Accepted actions in application order.
    pub actions: Vec<RecordedAction>,
    /// State hash when the replay was finalized (0 until then).
    pub final_hash: u64,
}

impl MatchReplay {
    /// Start an empty replay for a match.
    #[must_use]
    pub const fn new(config: MatchConfig) -> Self {
        Self {
            version: REPLAY_VERSION,
            config,
            actions: Vec::new(),
            final_hash: 0,
        }
    }

    /// Record an action the engine accepted.
    pub fn record(&mut self, player: PlayerIndex, action: GameAction) {
        self.actions.push(RecordedAction { player, action });
    }

    /// Store the final state hash.
    pub fn finalize(&mut self, final_hash: u64) {
        self.final_hash = final_hash;
    }

    /// Number of recorded actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Whether no actions were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Save the replay to a file.
    ///
    /// # Errors
    /// Returns an error if serialization or file writing fails.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = bincode::serialize(self)
            .map_err(|e| GameError::Serialization(format!("Failed to serialize replay: {e}")))?;
        std::fs::write(path.as_ref(), bytes)?;
        Ok(())
    }

    /// Load a replay from a file.
    ///
    /// # Errors
    /// Returns an error if file reading or deserialization fails, or if the
    /// file was written by an incompatible version.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        let replay: Self = bincode::deserialize(&bytes)
            .map_err(|e| GameError::Serialization(format!("Failed to deserialize replay: {e}")))?;

        if replay.version != REPLAY_VERSION {
            return Err(GameError::ReplayVersionMismatch {
                expected: REPLAY_VERSION,
                found: replay.version,
            });
        }

        Ok(replay)
    }

    /// Rebuild the match by re-applying every action to a fresh engine.
    ///
    /// # Errors
    /// Returns [`GameError::ReplayDiverged`] if the engine rejects an action.
    pub fn reconstruct(&self, ruleset: &Ruleset) -> Result<GameEngine> {
        self.reconstruct_prefix(ruleset, self.actions.len())
    }

    /// Rebuild the match as it was after the first `count` actions.
    ///
    /// # Errors
    /// Returns [`GameError::ReplayDiverged`] if the engine rejects an action.
    pub fn reconstruct_prefix(&self, ruleset: &Ruleset, count: usize) -> Result<GameEngine> {
        let mut engine = GameEngine::with_ruleset(&self.config, ruleset);

        for (index, recorded) in self.actions.iter().take(count).enumerate() {
            engine
                .apply_action(recorded.player, recorded.action)
                .map_err(|source| GameError::ReplayDiverged { index, source })?;
        }

        debug!(
            match_id = %self.config.match_id,
            actions = count.min(self.actions.len()),
            state_hash = engine.state_hash(),
            "Replay reconstructed"
        );

        Ok(engine)
    }

    /// Reconstruct and compare against the finalized hash.
    ///
    /// # Errors
    /// Returns an error if reconstruction fails.
    pub fn verify(&self, ruleset: &Ruleset) -> Result<bool> {
        Ok(self.reconstruct(ruleset)?.state_hash() == self.final_hash)
    }
}
