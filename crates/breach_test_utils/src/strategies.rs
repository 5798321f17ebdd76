//! Proptest strategies for matches and action scripts.

use breach_core::action::GameAction;
use breach_core::engine::MatchConfig;
use breach_core::factions::FactionId;
use proptest::prelude::*;

/// Either faction.
pub fn arb_faction() -> impl Strategy<Value = FactionId> {
    prop_oneof![Just(FactionId::Phantom), Just(FactionId::Sentinel)]
}

/// Any faction pairing with any seed.
pub fn arb_match_config() -> impl Strategy<Value = MatchConfig> {
    (arb_faction(), arb_faction(), any::<u64>())
        .prop_map(|(f1, f2, seed)| MatchConfig::new(format!("prop-{seed}"), f1, f2, seed))
}

/// A single action. Card indices deliberately overshoot typical hand sizes
/// so scripts exercise rejection paths too.
pub fn arb_action() -> impl Strategy<Value = GameAction> {
    prop_oneof![
        3 => (0usize..8).prop_map(|card_index| GameAction::PlayCard { card_index }),
        1 => Just(GameAction::EndTurn),
    ]
}

/// A script of `(seat, action)` pairs. Seats are random, so roughly half
/// the entries are out of turn.
pub fn arb_action_script(max_len: usize) -> impl Strategy<Value = Vec<(usize, GameAction)>> {
    prop::collection::vec((0usize..2, arb_action()), 0..max_len)
}
