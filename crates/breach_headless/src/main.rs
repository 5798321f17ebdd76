//! Headless Breach Protocol runner.
//!
//! # Usage
//!
//! ```bash
//! # Run a balance batch
//! cargo run -p breach_headless -- batch --count 1000 --output results/
//!
//! # Analyze batch results
//! cargo run -p breach_headless -- analyze --input results/batch_results.json
//!
//! # Check that a seed always plays out the same way
//! cargo run -p breach_headless -- verify --seed 42 --runs 5
//!
//! # Verify a recorded replay
//! cargo run -p breach_headless -- replay --file match.replay
//!
//! # Play against the computer over JSON lines
//! cargo run -p breach_headless -- play
//!
//! # Check a balance file, or print the stock one
//! cargo run -p breach_headless -- validate --file balance.ron
//! cargo run -p breach_headless -- defaults > balance.ron
//! ```
//!
//! Logs go to stderr; stdout carries protocol and report output.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use breach_core::factions::FactionId;
use breach_core::replay::MatchReplay;
use breach_headless::{
    analyzer::analyze_batch,
    balance_loader::{load_or_standard, parse_ruleset, standard_ruleset_ron},
    batch::{run_batch, verify_determinism, BatchConfig, BatchResults},
    game_runner::DEFAULT_MAX_TURNS,
    session::PlaySession,
};

#[derive(Parser)]
#[command(name = "breach_headless")]
#[command(about = "Headless Breach Protocol runner for balance testing and scripted play")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a batch of AI-vs-AI matches
    Batch {
        /// Faction in seat 1
        #[arg(long, default_value = "phantom")]
        faction1: FactionId,

        /// Faction in seat 2
        #[arg(long, default_value = "sentinel")]
        faction2: FactionId,

        /// Number of matches to run
        #[arg(short, long, default_value = "100")]
        count: u32,

        /// Seed of the first match (default: current time)
        #[arg(long)]
        seed: Option<u64>,

        /// Turn cap per match
        #[arg(long, default_value_t = DEFAULT_MAX_TURNS)]
        max_turns: u32,

        /// Completed matches between progress checkpoints
        #[arg(long, default_value = "10")]
        checkpoint: u32,

        /// Maximum parallel matches (0 = auto)
        #[arg(short, long, default_value = "0")]
        parallel: u32,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        /// Balance override file (RON)
        #[arg(long)]
        balance: Option<PathBuf>,

        /// Save a replay of every match
        #[arg(long)]
        save_replays: bool,
    },

    /// Analyze batch results
    Analyze {
        /// Input batch results JSON file
        #[arg(short, long)]
        input: PathBuf,

        /// Output markdown report (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Verify determinism by running the same seed multiple times
    Verify {
        /// Faction in seat 1
        #[arg(long, default_value = "phantom")]
        faction1: FactionId,

        /// Faction in seat 2
        #[arg(long, default_value = "sentinel")]
        faction2: FactionId,

        /// Seed to verify
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Number of verification runs
        #[arg(short, long, default_value = "5")]
        runs: u32,
    },

    /// Rebuild a recorded match and check its final state hash
    Replay {
        /// Replay file path
        #[arg(short, long)]
        file: PathBuf,

        /// Balance file the match was played with
        #[arg(long)]
        balance: Option<PathBuf>,
    },

    /// Play against the computer over JSON lines on stdin/stdout
    Play {
        /// Balance override file (RON)
        #[arg(long)]
        balance: Option<PathBuf>,
    },

    /// Check a balance file
    Validate {
        /// Balance file (RON)
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Print the stock balance as RON
    Defaults,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr; stdout is reserved for protocol and reports
    let log_level = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(
            EnvFilter::builder()
                .with_default_directive(log_level.into())
                .from_env_lossy(),
        )
        .init();

    let result = match cli.command {
        Commands::Batch {
            faction1,
            faction2,
            count,
            seed,
            max_turns,
            checkpoint,
            parallel,
            output,
            balance,
            save_replays,
        } => {
            let mut config = BatchConfig::new(faction1, faction2, count)
                .with_output(output)
                .with_max_turns(max_turns)
                .with_checkpoint_interval(checkpoint)
                .with_parallel(parallel)
                .with_replays(save_replays);
            config.seed_start = seed;
            config.balance_path = balance;
            cmd_batch(config)
        }
        Commands::Analyze { input, output } => cmd_analyze(&input, output),
        Commands::Verify {
            faction1,
            faction2,
            seed,
            runs,
        } => cmd_verify(faction1, faction2, seed, runs),
        Commands::Replay { file, balance } => cmd_replay(&file, balance),
        Commands::Play { balance } => cmd_play(balance),
        Commands::Validate { file } => cmd_validate(&file),
        Commands::Defaults => standard_ruleset_ron()
            .map(|ron| println!("{ron}"))
            .map_err(|e| e.to_string()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            tracing::error!("{message}");
            eprintln!("FATAL: {message}");
            ExitCode::FAILURE
        }
    }
}

/// Run a batch of matches and save the results
fn cmd_batch(config: BatchConfig) -> Result<(), String> {
    let output = config.output_dir.clone();
    std::fs::create_dir_all(&output)
        .map_err(|e| format!("Cannot create output directory '{}': {e}", output.display()))?;

    let results = run_batch(config).map_err(|e| e.to_string())?;

    let results_path = output.join("batch_results.json");
    results
        .save(&results_path)
        .map_err(|e| format!("Failed to save results: {e}"))?;

    let summary = &results.summary;
    eprintln!("\n{}", "=".repeat(50));
    eprintln!("BATCH COMPLETE");
    eprintln!("{}", "=".repeat(50));
    eprintln!(
        "Matchup: {} vs {}",
        results.config.faction1.display_name(),
        results.config.faction2.display_name()
    );
    eprintln!("Games played: {}", summary.games_played);
    if !results.errors.is_empty() {
        eprintln!("Games FAILED: {}", results.errors.len());
    }
    if results.cancelled {
        eprintln!("Batch was cancelled before completion");
    }
    eprintln!("Duration: {:.1}s", results.duration_seconds);
    eprintln!(
        "Player 1 wins: {} ({:.1}%)",
        summary.faction1_wins,
        summary.faction1_win_rate * 100.0
    );
    eprintln!(
        "Player 2 wins: {} ({:.1}%)",
        summary.faction2_wins,
        summary.faction2_win_rate * 100.0
    );
    eprintln!("Average turns: {}", summary.average_turns);
    eprintln!(
        "Average final hp: {:.1} / {:.1}",
        summary.average_final_hp[0], summary.average_final_hp[1]
    );

    for error in results.errors.iter().take(10) {
        eprintln!(
            "  Game {} (seed {}): {}",
            error.game_index, error.seed, error.message
        );
    }

    eprintln!("\nResults saved to: {}", results_path.display());

    let analysis = analyze_batch(&results);
    if !analysis.outliers.is_empty() {
        eprintln!("\nBalance Issues Detected:");
        for outlier in analysis.outliers_by_severity().iter().take(3) {
            eprintln!(
                "  [{:?}] {}/{}: {:.2}",
                outlier.severity, outlier.category, outlier.metric, outlier.value
            );
        }
    }

    Ok(())
}

/// Turn saved batch results into a markdown report
fn cmd_analyze(input: &Path, output: Option<PathBuf>) -> Result<(), String> {
    let results = BatchResults::load(input)
        .map_err(|e| format!("Failed to load '{}': {e}", input.display()))?;
    let report = analyze_batch(&results).to_markdown();

    match output {
        Some(path) => {
            std::fs::write(&path, report)
                .map_err(|e| format!("Failed to write '{}': {e}", path.display()))?;
            eprintln!("Report written to {}", path.display());
        }
        None => println!("{report}"),
    }
    Ok(())
}

fn cmd_verify(faction1: FactionId, faction2: FactionId, seed: u64, runs: u32) -> Result<(), String> {
    tracing::info!(%faction1, %faction2, seed, runs, "Verifying determinism");

    if verify_determinism(faction1, faction2, seed, runs) {
        eprintln!("Determinism verified: {runs} runs of seed {seed} ended identically");
        Ok(())
    } else {
        Err(format!("Seed {seed} did not play out identically"))
    }
}

fn cmd_replay(file: &Path, balance: Option<PathBuf>) -> Result<(), String> {
    let ruleset = load_or_standard(balance.as_deref()).map_err(|e| e.to_string())?;
    let replay = MatchReplay::load(file).map_err(|e| e.to_string())?;
    let engine = replay.reconstruct(&ruleset).map_err(|e| e.to_string())?;

    let state = engine.state();
    eprintln!(
        "Match {}: {} actions, turn {}, hp {} / {}",
        replay.config.match_id,
        replay.len(),
        state.turn_number,
        state.players[0].hp,
        state.players[1].hp
    );

    if engine.state_hash() == replay.final_hash {
        eprintln!("Replay verified: final hash {:#018x}", replay.final_hash);
        Ok(())
    } else {
        Err(format!(
            "Replay hash mismatch: recorded {:#018x}, rebuilt {:#018x}",
            replay.final_hash,
            engine.state_hash()
        ))
    }
}

fn cmd_play(balance: Option<PathBuf>) -> Result<(), String> {
    let ruleset = load_or_standard(balance.as_deref()).map_err(|e| e.to_string())?;
    let mut session = PlaySession::new(ruleset);

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    session
        .run(stdin.lock(), stdout.lock())
        .map_err(|e| format!("Session I/O failed: {e}"))
}

fn cmd_validate(file: &Path) -> Result<(), String> {
    let ruleset = parse_ruleset(file).map_err(|e| e.to_string())?;
    let problems = ruleset.validate();

    if problems.is_empty() {
        eprintln!("{}: OK", file.display());
        Ok(())
    } else {
        for problem in &problems {
            eprintln!("  - {problem}");
        }
        Err(format!("{}: {} problem(s)", file.display(), problems.len()))
    }
}
