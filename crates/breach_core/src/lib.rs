//! # Breach Core
//!
//! Deterministic game engine for Breach Protocol, a two-player card battle
//! between hacker factions.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No networking or persistence (callers store seeds and action logs)
//! - No system randomness (every match is driven by a seeded generator)
//! - No floating-point math in game rules
//!
//! This separation enables:
//! - Live play (one human action at a time) against the heuristic AI
//! - Offline batch simulation for balance testing
//! - Replay reconstruction from `{config, seed, actions}`
//! - Determinism testing
//!
//! ## Crate Structure
//!
//! - [`rng`] - Seeded random source
//! - [`factions`] - Static faction table
//! - [`cards`] / [`deck`] - Card model and deck building
//! - [`firewall`] - Exploit vs firewall resolution (absorption and backtrace)
//! - [`effects`] - Per-card effect resolution
//! - [`engine`] - The match state machine
//! - [`ai`] - Heuristic decision procedure
//! - [`replay`] - Action logs and reconstruction
//! - [`data`] - Balance data (rules, deck recipes, AI heuristics)

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod action;
pub mod ai;
pub mod cards;
pub mod data;
pub mod deck;
pub mod effects;
pub mod engine;
pub mod error;
pub mod events;
pub mod factions;
pub mod firewall;
pub mod ids;
pub mod replay;
pub mod rng;
pub mod state;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::action::{ActionReport, GameAction};
    pub use crate::ai::AiPlayer;
    pub use crate::cards::{Card, CardId, CardKind, CardType};
    pub use crate::data::{DeckRecipe, GameRules, HeuristicTable, Ruleset};
    pub use crate::engine::{ActionOutcome, ActionResult, GameEngine, MatchConfig};
    pub use crate::error::{ActionError, GameError, Result};
    pub use crate::events::{DamageSource, GameEvent, HealSource};
    pub use crate::factions::FactionId;
    pub use crate::firewall::{
        resolve_exploit_vs_firewall, total_firewall_value, ActiveFirewall, FirewallId,
        FirewallResolution,
    };
    pub use crate::replay::{MatchReplay, RecordedAction};
    pub use crate::rng::SeededRandom;
    pub use crate::state::{opponent_of, GamePhase, GameState, PlayerIndex, PlayerState};
}
