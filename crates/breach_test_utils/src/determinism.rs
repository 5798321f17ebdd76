//! Determinism testing utilities.
//!
//! Provides a harness for verifying that matches produce identical results
//! given identical inputs.
//!
//! # Testing Strategy
//!
//! Replays and batch statistics both assume that a match is a pure function
//! of its config, ruleset and action log. Sources of non-determinism include:
//!
//! - **System randomness**: every random draw must come from the match's
//!   seeded generator.
//! - **Shared counters**: id allocation must be scoped to one engine, or
//!   concurrently created matches interfere.
//! - **HashMap iteration order**: game state holds only ordered sequences.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: rng, deck building and effects in isolation
//! 2. **Property tests**: random seeds and action scripts stay reproducible
//! 3. **Integration tests**: full AI-vs-AI matches and replays

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use breach_core::ai::AiPlayer;
use breach_core::data::Ruleset;
use breach_core::engine::{GameEngine, MatchConfig};
use breach_core::error::Result;
use breach_core::replay::MatchReplay;
use tracing::warn;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Final hash from each run.
    pub hashes: Vec<u64>,
    /// Number of steps (actions) per run.
    pub steps: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic match).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that every run matched, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Match is non-deterministic!\n\
                 Runs: {}\n\
                 Steps: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.steps,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a process multiple times and verify every run ends in the same hash.
///
/// # Arguments
///
/// * `runs` - Number of times to run
/// * `steps` - Number of steps per run
/// * `setup` - Function to create the initial state
/// * `step` - Function to advance the state by one step
/// * `hash` - Function to compute the state hash
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    steps: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..steps {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        steps,
    }
}

/// Play an AI-vs-AI match one action at a time, recording a replay.
///
/// Stops when the match ends, after `max_actions` actions, or if the
/// engine rejects an action (which the AI should never cause).
#[must_use]
pub fn play_ai_match(
    config: &MatchConfig,
    ruleset: &Ruleset,
    max_actions: usize,
) -> (GameEngine, MatchReplay) {
    let mut engine = GameEngine::with_ruleset(config, ruleset);
    let mut replay = MatchReplay::new(config.clone());
    let ai = AiPlayer::new(ruleset.heuristics.clone());

    for _ in 0..max_actions {
        if engine.is_game_over() {
            break;
        }
        let player = engine.state().current_turn;
        let action = ai.choose_action(engine.state(), player);
        if let Err(error) = engine.apply_action(player, action) {
            warn!(%error, ?action, "AI action rejected");
            break;
        }
        replay.record(player, action);
    }

    replay.finalize(engine.state_hash());
    (engine, replay)
}

/// Play the same AI-vs-AI match `runs` times and compare final hashes.
#[must_use]
pub fn verify_match_determinism(config: &MatchConfig, runs: usize, max_actions: usize) -> DeterminismResult {
    let ruleset = Ruleset::standard();
    let hashes: Vec<u64> = (0..runs)
        .map(|_| play_ai_match(config, &ruleset, max_actions).0.state_hash())
        .collect();

    DeterminismResult {
        is_deterministic: hashes.windows(2).all(|w| w[0] == w[1]),
        hashes,
        steps: max_actions as u64,
    }
}

/// Result of parallel match runs.
#[derive(Debug, Clone)]
pub struct ParallelMatchResult {
    /// Final state hash from each match.
    pub hashes: Vec<u64>,
    /// Number of matches run.
    pub num_matches: usize,
}

impl ParallelMatchResult {
    /// Check if all matches produced identical results.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }

    /// Assert all matches agreed.
    ///
    /// # Panics
    ///
    /// Panics if matches produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic() {
            panic!(
                "Parallel matches diverged!\n\
                 Matches: {}\n\
                 All hashes: {:?}",
                self.num_matches, self.hashes
            );
        }
    }
}

/// Play the same match on `num_matches` scoped threads at once.
///
/// Catches state shared between engines, such as process-wide counters.
///
/// # Panics
///
/// Panics if any match thread panics.
#[must_use]
pub fn run_parallel_matches(config: &MatchConfig, num_matches: usize) -> ParallelMatchResult {
    let ruleset = Ruleset::standard();
    run_parallel(num_matches, || {
        play_ai_match(config, &ruleset, 1_000).0.state_hash()
    })
}

/// Run `play` on `num_matches` scoped threads and collect each hash.
///
/// # Panics
///
/// Re-panics if any thread panics; a crashed thread never yields a hash.
pub fn run_parallel<F>(num_matches: usize, play: F) -> ParallelMatchResult
where
    F: Fn() -> u64 + Sync,
{
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..num_matches).map(|_| s.spawn(&play)).collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("match thread panicked"))
            .collect()
    });

    ParallelMatchResult {
        hashes,
        num_matches,
    }
}

/// State hash after every action of a replay.
///
/// # Errors
///
/// Returns an error if an action in the replay is rejected.
pub fn hash_trace(replay: &MatchReplay, ruleset: &Ruleset) -> Result<Vec<u64>> {
    let mut engine = GameEngine::with_ruleset(&replay.config, ruleset);
    let mut trace = Vec::with_capacity(replay.len());

    for recorded in &replay.actions {
        engine.apply_action(recorded.player, recorded.action)?;
        trace.push(engine.state_hash());
    }

    Ok(trace)
}

/// Index of the first step where two hash traces differ.
///
/// A trace that is a strict prefix of the other diverges at its length.
#[must_use]
pub fn find_first_divergence(a: &[u64], b: &[u64]) -> Option<usize> {
    a.iter()
        .zip(b)
        .position(|(x, y)| x != y)
        .or_else(|| (a.len() != b.len()).then(|| a.len().min(b.len())))
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}
