//! Test fixtures and helpers.
//!
//! Pre-built matches, hands and firewall sequences for consistent testing.

use breach_core::cards::{Card, CardId, CardKind};
use breach_core::data::Ruleset;
use breach_core::engine::{GameEngine, MatchConfig};
use breach_core::factions::FactionId;
use breach_core::firewall::{ActiveFirewall, FirewallId};
use breach_core::state::GameState;

/// Ids handed to injected cards start here so they never collide with
/// dealt cards.
const FIXTURE_CARD_ID_BASE: u32 = 10_000;

/// Phantom (seat 0) vs Sentinel (seat 1).
#[must_use]
pub fn standard_config(seed: u64) -> MatchConfig {
    MatchConfig::new(format!("fixture-{seed}"), FactionId::Phantom, FactionId::Sentinel, seed)
}

/// Both seats play `faction`.
#[must_use]
pub fn mirror_config(faction: FactionId, seed: u64) -> MatchConfig {
    MatchConfig::new(format!("mirror-{seed}"), faction, faction, seed)
}

/// Fresh stock engine for [`standard_config`].
#[must_use]
pub fn standard_engine(seed: u64) -> GameEngine {
    GameEngine::new(&standard_config(seed))
}

/// Stock engine with its state adjusted by `tweak` before play starts.
///
/// # Example
///
/// ```
/// use breach_test_utils::fixtures::engine_with;
///
/// let engine = engine_with(42, |state| state.players[1].hp = 3);
/// assert_eq!(engine.state().players[1].hp, 3);
/// ```
#[must_use]
pub fn engine_with<F>(seed: u64, tweak: F) -> GameEngine
where
    F: FnOnce(&mut GameState),
{
    let base = standard_engine(seed);
    let mut state = base.state().clone();
    tweak(&mut state);
    GameEngine::from_state(state, Ruleset::standard().rules)
}

/// Stock engine with both hands replaced.
#[must_use]
pub fn engine_with_hands(seed: u64, hand0: &[CardKind], hand1: &[CardKind]) -> GameEngine {
    engine_with(seed, |state| {
        state.players[0].hand = hand(hand0, FIXTURE_CARD_ID_BASE);
        state.players[1].hand = hand(hand1, FIXTURE_CARD_ID_BASE + 1_000);
    })
}

/// Cards with consecutive ids starting at `first_id`.
#[must_use]
pub fn hand(kinds: &[CardKind], first_id: u32) -> Vec<Card> {
    kinds
        .iter()
        .zip(first_id..)
        .map(|(&kind, id)| Card::new(CardId(id), kind))
        .collect()
}

/// Firewall sequence with ids 1, 2, ...
#[must_use]
pub fn firewalls(values: &[i32]) -> Vec<ActiveFirewall> {
    values
        .iter()
        .zip(1..)
        .map(|(&value, id)| ActiveFirewall::new(FirewallId(id), value))
        .collect()
}

/// Exploit card kind.
#[must_use]
pub const fn exploit(base_damage: i32) -> CardKind {
    CardKind::Exploit { base_damage }
}

/// Firewall card kind.
#[must_use]
pub const fn firewall(block_value: i32) -> CardKind {
    CardKind::Firewall { block_value }
}
