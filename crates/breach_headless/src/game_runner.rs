//! Single match execution for headless simulation.
//!
//! Both seats are driven by the heuristic AI. Every loop is bounded: a
//! match stops at the turn cap even if nobody is knocked out, and the
//! winner is then decided on remaining hit points.

use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, warn};

use breach_core::action::GameAction;
use breach_core::ai::AiPlayer;
use breach_core::data::Ruleset;
use breach_core::engine::{GameEngine, MatchConfig};
use breach_core::error::ActionError;
use breach_core::factions::FactionId;
use breach_core::replay::MatchReplay;
use breach_core::state::{GameState, PlayerIndex};

use crate::metrics::{GameMetrics, MetricsCollector, WinCondition};

/// Default turn cap per match.
pub const DEFAULT_MAX_TURNS: u32 = 100;

/// Seed taken from the wall clock, in milliseconds, for runs started
/// without one.
#[must_use]
pub fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis() as u64)
}

/// Configuration for a single match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    /// Position in the batch.
    pub game_index: u32,
    /// Seed for deck generation.
    pub seed: u64,
    /// Faction in seat 0.
    pub faction1: FactionId,
    /// Faction in seat 1.
    pub faction2: FactionId,
    /// Completed turns after which the match is stopped.
    pub max_turns: u32,
}

impl GameConfig {
    /// Match with the default turn cap.
    #[must_use]
    pub fn new(game_index: u32, seed: u64, faction1: FactionId, faction2: FactionId) -> Self {
        Self {
            game_index,
            seed,
            faction1,
            faction2,
            max_turns: DEFAULT_MAX_TURNS,
        }
    }

    /// Identifier handed to the engine.
    #[must_use]
    pub fn game_id(&self) -> String {
        format!("game_{}_{}", self.game_index, self.seed)
    }

    fn match_config(&self) -> MatchConfig {
        MatchConfig::new(self.game_id(), self.faction1, self.faction2, self.seed)
    }
}

/// Outcome of a finished match.
#[derive(Debug, Clone)]
pub struct GameResult {
    /// Collected statistics.
    pub metrics: GameMetrics,
    /// Finalized action log.
    pub replay: MatchReplay,
}

/// Play one AI-vs-AI match to completion.
///
/// # Errors
///
/// Returns the engine's rejection if the AI ever submits an illegal
/// action, which would indicate a bug in the AI or the engine.
pub fn run_game(
    config: &GameConfig,
    ruleset: &Ruleset,
    ai: &AiPlayer,
) -> Result<GameResult, ActionError> {
    let match_config = config.match_config();
    let mut engine = GameEngine::with_ruleset(&match_config, ruleset);
    let mut replay = MatchReplay::new(match_config);
    let mut collector = MetricsCollector::new(
        config.game_index,
        config.game_id(),
        config.seed,
        [config.faction1, config.faction2],
    );

    let mut turns_played = 0u32;
    while !engine.is_game_over() && turns_played < config.max_turns {
        let player = engine.state().current_turn;
        let action = ai.choose_action(engine.state(), player);

        let outcome = engine.apply_action(player, action).map_err(|e| {
            warn!(
                game = config.game_index,
                seed = config.seed,
                player,
                ?action,
                error = %e,
                "AI action rejected"
            );
            e
        })?;

        replay.record(player, action);
        collector.on_action(player, &outcome.events);
        if action == GameAction::EndTurn {
            turns_played += 1;
        }
    }

    let (winner, win_condition) = match engine.winner() {
        Some(winner) => (winner, WinCondition::Knockout),
        None => (turn_limit_winner(engine.state()), WinCondition::TurnLimit),
    };

    let final_state_hash = engine.state_hash();
    replay.finalize(final_state_hash);

    debug!(
        game = config.game_index,
        seed = config.seed,
        winner,
        ?win_condition,
        turns = engine.state().turn_number,
        "Match finished"
    );

    Ok(GameResult {
        metrics: collector.finish(engine.state(), winner, win_condition, final_state_hash),
        replay,
    })
}

/// Winner of a match stopped by the turn cap: more hit points wins, a tie
/// goes to seat 1.
#[must_use]
pub fn turn_limit_winner(state: &GameState) -> PlayerIndex {
    if state.players[0].hp > state.players[1].hp {
        0
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play(seed: u64, max_turns: u32) -> GameResult {
        let mut config = GameConfig::new(0, seed, FactionId::Phantom, FactionId::Sentinel);
        config.max_turns = max_turns;
        run_game(&config, &Ruleset::standard(), &AiPlayer::default()).unwrap()
    }

    #[test]
    fn test_seed_42_terminates_with_winner() {
        let result = play(42, DEFAULT_MAX_TURNS);
        let metrics = &result.metrics;

        assert!(metrics.winner <= 1);
        assert!(metrics.turns <= DEFAULT_MAX_TURNS + 1);
        if metrics.win_condition == WinCondition::Knockout {
            assert_eq!(metrics.final_hp[1 - metrics.winner], 0);
        }
    }

    #[test]
    fn test_run_game_deterministic() {
        let a = play(7, DEFAULT_MAX_TURNS);
        let b = play(7, DEFAULT_MAX_TURNS);
        assert_eq!(a.metrics, b.metrics);
        assert_eq!(a.replay, b.replay);
    }

    #[test]
    fn test_replay_reproduces_final_state() {
        let result = play(1234, DEFAULT_MAX_TURNS);
        assert_eq!(result.replay.len() as u32, result.metrics.actions);
        assert!(result.replay.verify(&Ruleset::standard()).unwrap());
    }

    #[test]
    fn test_turn_cap_uses_hp_tie_break() {
        let result = play(5, 1);
        let metrics = &result.metrics;

        assert_eq!(metrics.win_condition, WinCondition::TurnLimit);
        assert_eq!(metrics.turns, 2);
        let expected = if metrics.final_hp[0] > metrics.final_hp[1] { 0 } else { 1 };
        assert_eq!(metrics.winner, expected);
    }

    #[test]
    fn test_zero_turn_cap_plays_nothing() {
        let result = play(5, 0);
        assert_eq!(result.metrics.actions, 0);
        assert_eq!(result.metrics.turns, 1);
        // Phantom 22 vs Sentinel 20 at the start.
        assert_eq!(result.metrics.winner, 0);
    }

    #[test]
    fn test_equal_hp_goes_to_second_seat() {
        let mut state = GameEngine::new(&MatchConfig::new(
            "tie",
            FactionId::Sentinel,
            FactionId::Sentinel,
            3,
        ))
        .state()
        .clone();
        assert_eq!(turn_limit_winner(&state), 1);

        state.players[1].hp -= 1;
        assert_eq!(turn_limit_winner(&state), 0);
    }

    #[test]
    fn test_clock_seed_is_wall_clock_millis() {
        let before = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_millis() as u64;
        let seed = clock_seed();
        assert!(seed >= before);
        assert!(seed - before < 60_000);
    }
}
