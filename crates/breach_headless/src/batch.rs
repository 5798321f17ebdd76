//! Batch match runner for balance testing.
//!
//! Runs many AI-vs-AI matches in parallel using rayon. Every match owns its
//! engine and random source, and results are collected in game order, so a
//! parallel batch produces exactly what a sequential one would.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use breach_core::ai::AiPlayer;
use breach_core::data::Ruleset;
use breach_core::factions::FactionId;
use breach_core::state::PlayerIndex;

use crate::balance_loader::{load_ruleset, BalanceLoadError};
use crate::game_runner::{clock_seed, run_game, GameConfig, GameResult, DEFAULT_MAX_TURNS};
use crate::metrics::{BatchSummary, GameMetrics};

/// Default number of completed matches between progress checkpoints.
pub const DEFAULT_CHECKPOINT_INTERVAL: u32 = 10;

/// Configuration for a batch run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Faction in seat 0
    pub faction1: FactionId,
    /// Faction in seat 1
    pub faction2: FactionId,
    /// Number of matches to run
    pub game_count: u32,
    /// Seed of the first match; match `i` uses `seed_start + i`.
    /// `None` means the current time.
    pub seed_start: Option<u64>,
    /// Turn cap per match
    pub max_turns: u32,
    /// Completed matches between progress checkpoints
    pub checkpoint_interval: u32,
    /// Maximum parallel matches (0 = use rayon default)
    pub parallel_games: u32,
    /// Output directory for results
    pub output_dir: PathBuf,
    /// Balance override file
    pub balance_path: Option<PathBuf>,
    /// Write every match's replay under `output_dir/replays`
    pub save_replays: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            faction1: FactionId::Phantom,
            faction2: FactionId::Sentinel,
            game_count: 100,
            seed_start: None,
            max_turns: DEFAULT_MAX_TURNS,
            checkpoint_interval: DEFAULT_CHECKPOINT_INTERVAL,
            parallel_games: 0,
            output_dir: PathBuf::from("results"),
            balance_path: None,
            save_replays: false,
        }
    }
}

impl BatchConfig {
    /// Create config for a matchup
    pub fn new(faction1: FactionId, faction2: FactionId, game_count: u32) -> Self {
        Self {
            faction1,
            faction2,
            game_count,
            ..Default::default()
        }
    }

    /// Set output directory
    pub fn with_output(mut self, dir: PathBuf) -> Self {
        self.output_dir = dir;
        self
    }

    /// Set seed start
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed_start = Some(seed);
        self
    }

    /// Set the per-match turn cap
    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }

    /// Set the checkpoint interval
    pub fn with_checkpoint_interval(mut self, interval: u32) -> Self {
        self.checkpoint_interval = interval;
        self
    }

    /// Set the worker count
    pub fn with_parallel(mut self, workers: u32) -> Self {
        self.parallel_games = workers;
        self
    }

    /// Use a balance override file
    pub fn with_balance(mut self, path: PathBuf) -> Self {
        self.balance_path = Some(path);
        self
    }

    /// Save a replay for every match
    pub fn with_replays(mut self, save: bool) -> Self {
        self.save_replays = save;
        self
    }

    /// Seed of match `index`.
    pub fn seed_for(&self, seed_start: u64, index: u32) -> u64 {
        seed_start.wrapping_add(u64::from(index))
    }
}

/// Results from a batch run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResults {
    /// Configuration used, with the seed start actually used filled in
    pub config: BatchConfig,
    /// Individual match metrics, in game order
    pub games: Vec<GameMetrics>,
    /// Aggregate summary
    pub summary: BatchSummary,
    /// Errors encountered
    pub errors: Vec<BatchError>,
    /// Total runtime
    pub duration_seconds: f64,
    /// Whether the batch was stopped early
    pub cancelled: bool,
}

impl BatchResults {
    /// Save results to JSON file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Load results from JSON file
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(std::io::Error::other)
    }
}

/// A match that could not be completed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchError {
    /// Game index
    pub game_index: u32,
    /// Seed used
    pub seed: u64,
    /// Error message
    pub message: String,
}

/// Thread-safe progress handle for a running batch.
///
/// Clones share the same counters, so a caller can keep one clone to poll
/// or cancel while another thread runs the batch.
#[derive(Debug, Clone)]
pub struct BatchProgress {
    total: u32,
    checkpoint_interval: u32,
    completed: Arc<AtomicU32>,
    checkpoint: Arc<AtomicU32>,
    cancelled: Arc<AtomicBool>,
    start_time: Instant,
    partial_wins: Arc<Mutex<[u32; 2]>>,
}

impl BatchProgress {
    /// Tracker for `total` matches, checkpointing every `checkpoint_interval`.
    pub fn new(total: u32, checkpoint_interval: u32) -> Self {
        Self {
            total,
            checkpoint_interval: checkpoint_interval.max(1),
            completed: Arc::new(AtomicU32::new(0)),
            checkpoint: Arc::new(AtomicU32::new(0)),
            cancelled: Arc::new(AtomicBool::new(false)),
            start_time: Instant::now(),
            partial_wins: Arc::new(Mutex::new([0; 2])),
        }
    }

    /// Matches in the batch.
    pub fn total(&self) -> u32 {
        self.total
    }

    /// Record a completed match; returns the new completion count.
    pub fn record_completion(&self, winner: Option<PlayerIndex>) -> u32 {
        if let Some(seat) = winner {
            if let Ok(mut wins) = self.partial_wins.lock() {
                wins[seat] += 1;
            }
        }

        let completed = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
        if completed % self.checkpoint_interval == 0 {
            self.checkpoint.fetch_max(completed, Ordering::SeqCst);
        }
        completed
    }

    /// Mark the batch finished, checkpointing whatever completed.
    pub fn finish(&self) {
        self.checkpoint.fetch_max(self.completed(), Ordering::SeqCst);
    }

    /// Matches finished so far, failed ones included.
    pub fn completed(&self) -> u32 {
        self.completed.load(Ordering::SeqCst)
    }

    /// Completion count at the last checkpoint.
    pub fn checkpoint(&self) -> u32 {
        self.checkpoint.load(Ordering::SeqCst)
    }

    /// Ask the batch to stop; matches already running finish normally.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether [`cancel`](Self::cancel) was called.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Get completion percentage
    pub fn percentage(&self) -> f64 {
        f64::from(self.completed()) / f64::from(self.total.max(1)) * 100.0
    }

    /// Get estimated time remaining
    pub fn eta(&self) -> Duration {
        let completed = self.completed();
        if completed == 0 {
            return Duration::from_secs(0);
        }

        let per_game = self.start_time.elapsed().as_secs_f64() / f64::from(completed);
        let remaining = self.total.saturating_sub(completed);
        Duration::from_secs_f64(per_game * f64::from(remaining))
    }

    /// Win rates per seat among completed matches
    pub fn current_win_rates(&self) -> [f64; 2] {
        let completed = self.completed();
        if completed == 0 {
            return [0.0; 2];
        }

        self.partial_wins.lock().map_or([0.0; 2], |wins| {
            (*wins).map(|w| f64::from(w) / f64::from(completed))
        })
    }

    /// Display progress to stderr
    pub fn display(&self) {
        let eta = self.eta();
        let [p1, p2] = self.current_win_rates();

        eprintln!("╔════════════════════════════════════╗");
        eprintln!(
            "║ Batch Progress: {:>4}/{:<4} ({:>5.1}%) ║",
            self.completed(),
            self.total,
            self.percentage()
        );
        eprintln!(
            "║ ETA: {:>29} ║",
            format!("{}m {}s", eta.as_secs() / 60, eta.as_secs() % 60)
        );
        eprintln!("╟────────────────────────────────────╢");
        eprintln!("║ Player 1 wins so far: {:>6.1}%      ║", p1 * 100.0);
        eprintln!("║ Player 2 wins so far: {:>6.1}%      ║", p2 * 100.0);
        eprintln!("╚════════════════════════════════════╝");
    }
}

/// Run a batch, loading the balance file named in the config if any.
///
/// # Errors
///
/// Returns an error if the balance file cannot be loaded.
pub fn run_batch(config: BatchConfig) -> Result<BatchResults, BalanceLoadError> {
    let progress = BatchProgress::new(config.game_count, config.checkpoint_interval);
    run_batch_with_progress(config, &progress)
}

/// Like [`run_batch`], reporting to a caller-held progress handle.
///
/// # Errors
///
/// Returns an error if the balance file cannot be loaded.
pub fn run_batch_with_progress(
    config: BatchConfig,
    progress: &BatchProgress,
) -> Result<BatchResults, BalanceLoadError> {
    let ruleset = match &config.balance_path {
        Some(path) => load_ruleset(path)?,
        None => Ruleset::standard(),
    };
    Ok(run_batch_with_ruleset(config, &ruleset, progress))
}

/// Run a batch with an already-loaded ruleset.
pub fn run_batch_with_ruleset(
    mut config: BatchConfig,
    ruleset: &Ruleset,
    progress: &BatchProgress,
) -> BatchResults {
    let start = Instant::now();
    let seed_start = config.seed_start.unwrap_or_else(clock_seed);
    config.seed_start = Some(seed_start);

    info!(
        faction1 = %config.faction1,
        faction2 = %config.faction2,
        games = config.game_count,
        seed_start,
        max_turns = config.max_turns,
        "Starting batch run"
    );

    let replay_dir = config.output_dir.join("replays");
    if config.save_replays {
        if let Err(e) = std::fs::create_dir_all(&replay_dir) {
            warn!(error = %e, path = %replay_dir.display(), "Cannot create replay directory");
        }
    }

    let ai = AiPlayer::new(ruleset.heuristics.clone());
    let play_all = || -> Vec<Option<Result<GameMetrics, BatchError>>> {
        (0..config.game_count)
            .into_par_iter()
            .map(|index| {
                if progress.is_cancelled() {
                    return None;
                }
                let seed = config.seed_for(seed_start, index);
                let result = play_one(&config, ruleset, &ai, index, seed, &replay_dir);

                let winner = result.as_ref().ok().map(|m| m.winner);
                let completed = progress.record_completion(winner);
                if completed % progress.checkpoint_interval == 0 {
                    debug!(completed, total = config.game_count, "Batch checkpoint");
                }
                if completed % 100 == 0 {
                    progress.display();
                }
                Some(result)
            })
            .collect()
    };

    let outcomes = if config.parallel_games > 0 {
        match rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallel_games as usize)
            .build()
        {
            Ok(pool) => pool.install(play_all),
            Err(e) => {
                warn!(error = %e, "Cannot build worker pool, using the global pool");
                play_all()
            }
        }
    } else {
        play_all()
    };
    progress.finish();

    let mut games = Vec::new();
    let mut errors = Vec::new();
    for outcome in outcomes.into_iter().flatten() {
        match outcome {
            Ok(metrics) => games.push(metrics),
            Err(error) => errors.push(error),
        }
    }

    let summary = BatchSummary::from_games(&games);
    let duration_seconds = start.elapsed().as_secs_f64();
    let cancelled = progress.is_cancelled();

    info!(
        games = games.len(),
        failed = errors.len(),
        cancelled,
        faction1_wins = summary.faction1_wins,
        faction2_wins = summary.faction2_wins,
        duration_seconds,
        "Batch complete"
    );

    BatchResults {
        config,
        games,
        summary,
        errors,
        duration_seconds,
        cancelled,
    }
}

fn play_one(
    config: &BatchConfig,
    ruleset: &Ruleset,
    ai: &AiPlayer,
    index: u32,
    seed: u64,
    replay_dir: &Path,
) -> Result<GameMetrics, BatchError> {
    let game = GameConfig {
        game_index: index,
        seed,
        faction1: config.faction1,
        faction2: config.faction2,
        max_turns: config.max_turns,
    };

    let GameResult { metrics, replay } = run_game(&game, ruleset, ai).map_err(|e| {
        warn!(game = index, seed, error = %e, "Match failed");
        BatchError {
            game_index: index,
            seed,
            message: e.to_string(),
        }
    })?;

    if config.save_replays {
        let path = replay_dir.join(format!("{}.replay", metrics.game_id));
        if let Err(e) = replay.save(&path) {
            warn!(error = %e, path = %path.display(), "Failed to save replay");
        }
    }

    Ok(metrics)
}

/// Run the same seed `runs` times and check that every run ends
/// identically, down to the final state hash.
pub fn verify_determinism(faction1: FactionId, faction2: FactionId, seed: u64, runs: u32) -> bool {
    let ruleset = Ruleset::standard();
    let ai = AiPlayer::default();
    let game = GameConfig::new(0, seed, faction1, faction2);

    let mut first: Option<GameMetrics> = None;
    for run in 0..runs {
        let metrics = match run_game(&game, &ruleset, &ai) {
            Ok(result) => result.metrics,
            Err(e) => {
                warn!(run, seed, error = %e, "Verification run failed");
                return false;
            }
        };

        match &first {
            None => first = Some(metrics),
            Some(expected) if *expected != metrics => {
                warn!(
                    run,
                    seed,
                    expected_hash = expected.final_state_hash,
                    actual_hash = metrics.final_state_hash,
                    "Verification run diverged"
                );
                return false;
            }
            Some(_) => {}
        }
    }

    true
}
