//! Property-based tests over random seeds and action scripts.

use breach_core::prelude::*;
use breach_test_utils::strategies::{arb_action_script, arb_match_config};
use proptest::prelude::*;

fn check_invariants(engine: &GameEngine) -> std::result::Result<(), TestCaseError> {
    let state = engine.state();
    prop_assert!(state.actions_remaining <= engine.rules().actions_per_turn);
    prop_assert!(state.current_turn < 2);
    prop_assert_eq!(state.winner.is_some(), state.phase == GamePhase::GameOver);
    prop_assert_ne!(state.phase, GamePhase::Setup);

    if state.phase == GamePhase::Playing {
        prop_assert!(state.players.iter().all(PlayerState::is_alive));
    } else if let Some(winner) = state.winner {
        prop_assert!(!state.players[opponent_of(winner)].is_alive());
    }
    Ok(())
}

proptest! {
    /// Same seed, same opening position.
    #[test]
    fn prop_construction_is_deterministic(config in arb_match_config()) {
        let a = GameEngine::new(&config);
        let b = GameEngine::new(&config);
        prop_assert_eq!(a.state(), b.state());
        check_invariants(&a)?;
    }

    /// Random scripts never break invariants, rejected actions never
    /// mutate, and the accepted log replays to the same state.
    #[test]
    fn prop_scripts_preserve_invariants_and_replay(
        config in arb_match_config(),
        script in arb_action_script(120),
    ) {
        let mut live = GameEngine::new(&config);
        let mut replay = MatchReplay::new(config.clone());

        for (player, action) in script {
            let before = live.state().clone();
            match live.apply_action(player, action) {
                Ok(_) => replay.record(player, action),
                Err(_) => prop_assert_eq!(live.state(), &before),
            }
            check_invariants(&live)?;
        }

        let rebuilt = replay.reconstruct(&Ruleset::standard()).unwrap();
        prop_assert_eq!(rebuilt.state(), live.state());
    }

    /// After any accepted end of turn the new player has a full allotment
    /// and no boost.
    #[test]
    fn prop_end_turn_resets(config in arb_match_config(), script in arb_action_script(60)) {
        let mut engine = GameEngine::new(&config);
        for (player, action) in script {
            let accepted = engine.apply_action(player, action).is_ok();
            if accepted && action == GameAction::EndTurn {
                let state = engine.state();
                prop_assert_eq!(state.actions_remaining, engine.rules().actions_per_turn);
                prop_assert_eq!(state.current_player().boost, 0);
            }
        }
    }

    /// The AI only ever proposes legal actions.
    #[test]
    fn prop_ai_actions_are_legal(config in arb_match_config()) {
        let mut engine = GameEngine::new(&config);
        let ai = AiPlayer::default();

        for _ in 0..300 {
            if engine.is_game_over() {
                break;
            }
            let player = engine.state().current_turn;
            let action = ai.choose_action(engine.state(), player);
            prop_assert!(engine.legal_actions(player).contains(&action));
            prop_assert!(engine.apply_action(player, action).is_ok());
            check_invariants(&engine)?;
        }
    }

    /// Firewall resolution conserves exploit value.
    #[test]
    fn prop_firewall_resolution_accounts_for_value(
        exploit in 0i32..20,
        values in prop::collection::vec(1i32..6, 0..6),
    ) {
        let walls: Vec<ActiveFirewall> = values
            .iter()
            .zip(1..)
            .map(|(&v, id)| ActiveFirewall::new(FirewallId(id), v))
            .collect();
        let r = resolve_exploit_vs_firewall(exploit, &walls);

        prop_assert_eq!(
            r.destroyed_firewalls.len() + r.remaining_firewalls.len(),
            walls.len()
        );
        if walls.is_empty() {
            prop_assert_eq!(r.damage_to_defender, exploit);
        } else {
            prop_assert_eq!(r.damage_to_defender, 0);
            let absorbed = total_firewall_value(&r.destroyed_firewalls);
            prop_assert_eq!(r.backtrace_to_attacker, (exploit - absorbed).max(0));
            prop_assert_eq!(r.fully_blocked, r.backtrace_to_attacker == 0);
        }
    }
}
