//! Headless match runner for balance simulation and scripted play.
//!
//! This crate drives [`breach_core`] without any user interface:
//!
//! - **Batch simulation**: thousands of AI-vs-AI matches in parallel, with
//!   aggregate statistics and a balance report
//! - **Determinism checks**: the same seed must end the same way every time
//! - **Replay verification**: recorded action logs must rebuild the same state
//! - **Interactive play**: a human-vs-AI match over JSON lines
//!
//! # Protocol
//!
//! Interactive play uses JSON lines (one JSON object per line):
//!
//! - **stdin**: Commands (new_game, play, end_turn, state, quit)
//! - **stdout**: Responses (state, events, game_over, ...)
//! - **stderr**: Logs (human-readable)
//!
//! See [`protocol`] module for the full command/response specification.
//!
//! # Example
//!
//! ```bash
//! # Balance batch
//! cargo run -p breach_headless -- batch --faction1 phantom --faction2 sentinel --count 1000
//!
//! # Verify determinism
//! cargo run -p breach_headless -- verify --seed 42 --runs 5
//!
//! # Play against the computer
//! echo '{"cmd":"new_game","seed":42}' | cargo run -p breach_headless -- play
//! ```

pub mod analyzer;
pub mod balance_loader;
pub mod batch;
pub mod game_runner;
pub mod metrics;
pub mod protocol;
pub mod session;

pub use analyzer::{analyze_batch, BalanceAnalysis, BalanceOutlier, Severity};
pub use balance_loader::{load_or_standard, load_ruleset, BalanceLoadError};
pub use batch::{
    run_batch, run_batch_with_progress, run_batch_with_ruleset, verify_determinism, BatchConfig,
    BatchError, BatchProgress, BatchResults,
};
pub use game_runner::{run_game, GameConfig, GameResult, DEFAULT_MAX_TURNS};
pub use metrics::{BatchSummary, GameMetrics, MetricsCollector, SideMetrics, WinCondition};
pub use protocol::{Command, Response, StateView};
pub use session::PlaySession;
