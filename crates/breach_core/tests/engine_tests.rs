//! Engine scenario tests.
//!
//! Drive full matches and hand-built positions through the public API.

use breach_core::prelude::*;
use breach_test_utils::fixtures::{
    engine_with, engine_with_hands, exploit, firewall, firewalls, hand, mirror_config,
    standard_config, standard_engine,
};

// =============================================================================
// Turn Structure
// =============================================================================

mod turns {
    use super::*;

    #[test]
    fn test_end_turn_resets_allotment_and_boost() {
        let mut engine = engine_with_hands(1, &[CardKind::Payload, exploit(2)], &[]);
        engine
            .apply_action(0, GameAction::PlayCard { card_index: 0 })
            .unwrap();
        assert_eq!(engine.state().players[0].boost, 1);

        engine.apply_action(0, GameAction::EndTurn).unwrap();
        engine.apply_action(1, GameAction::EndTurn).unwrap();

        let state = engine.state();
        assert_eq!(state.current_turn, 0);
        assert_eq!(state.actions_remaining, 2);
        assert_eq!(state.players[0].boost, 0, "unused boost expires");
        assert_eq!(state.turn_number, 3);
    }

    #[test]
    fn test_turns_alternate() {
        let mut engine = standard_engine(3);
        for expected in [1, 0, 1, 0] {
            let current = engine.state().current_turn;
            engine.apply_action(current, GameAction::EndTurn).unwrap();
            assert_eq!(engine.state().current_turn, expected);
        }
    }

    #[test]
    fn test_rejections_do_not_mutate() {
        let mut engine = standard_engine(8);
        let before = engine.state_hash();

        let attempts = [
            (1, GameAction::EndTurn),
            (1, GameAction::PlayCard { card_index: 0 }),
            (0, GameAction::PlayCard { card_index: 99 }),
        ];
        for (player, action) in attempts {
            assert!(engine.apply_action(player, action).is_err());
            assert_eq!(engine.state_hash(), before);
        }
    }
}

// =============================================================================
// Card Scenarios
// =============================================================================

mod cards {
    use super::*;

    #[test]
    fn test_boosted_exploit_through_firewalls_backtraces() {
        let mut engine = engine_with(2, |state| {
            state.players[0].hand = hand(&[CardKind::Payload, exploit(5)], 500);
            state.players[1].firewalls = firewalls(&[1, 2]);
        });

        engine
            .apply_action(0, GameAction::PlayCard { card_index: 0 })
            .unwrap();
        let outcome = engine
            .apply_action(0, GameAction::PlayCard { card_index: 0 })
            .unwrap();

        // 5 + 1 boost against 3 total firewall: 3 reflected.
        let state = engine.state();
        assert_eq!(state.players[0].hp, 19);
        assert_eq!(state.players[1].hp, 20);
        assert!(state.players[1].firewalls.is_empty());
        assert_eq!(
            outcome.events[0],
            GameEvent::CardPlayed {
                player: 0,
                card_type: CardType::Exploit,
                card_value: Some(6)
            }
        );
        assert!(outcome.events.contains(&GameEvent::Damage {
            target: 0,
            amount: 3,
            source: DamageSource::Backtrace
        }));
    }

    #[test]
    fn test_sentinel_firewall_then_purge() {
        let mut engine = engine_with(4, |state| {
            state.current_turn = 1;
            state.players[1].hand = hand(&[firewall(3), CardKind::Purge], 700);
            state.players[1].firewalls = firewalls(&[2, 2]);
        });

        engine
            .apply_action(1, GameAction::PlayCard { card_index: 0 })
            .unwrap();
        assert_eq!(engine.state().players[1].firewalls.len(), 3);

        let deck_before = engine.state().players[1].deck.len();
        engine
            .apply_action(1, GameAction::PlayCard { card_index: 0 })
            .unwrap();

        let state = engine.state();
        assert!(state.players[1].firewalls.is_empty());
        assert_eq!(state.players[0].hp, 22 - 3);
        assert_eq!(state.players[1].deck.len(), deck_before - 1);
    }

    #[test]
    fn test_backtrace_can_lose_the_game() {
        let mut engine = engine_with(6, |state| {
            state.players[0].hp = 2;
            state.players[0].hand = hand(&[exploit(5)], 900);
            state.players[1].firewalls = firewalls(&[2]);
        });

        let outcome = engine
            .apply_action(0, GameAction::PlayCard { card_index: 0 })
            .unwrap();
        assert!(outcome.game_over);
        assert_eq!(outcome.winner, Some(1));
    }
}

// =============================================================================
// Full Matches
// =============================================================================

mod matches {
    use super::*;

    fn play_to_cap(config: &MatchConfig, max_turns: u32) -> GameEngine {
        let mut engine = GameEngine::new(config);
        let ai = AiPlayer::default();
        while !engine.is_game_over() && engine.state().turn_number <= max_turns {
            let player = engine.state().current_turn;
            ai.take_turn(&mut engine, player)
                .expect("AI actions are always legal");
        }
        engine
    }

    #[test]
    fn test_seed_42_terminates_within_cap() {
        let engine = play_to_cap(&standard_config(42), 100);
        let state = engine.state();

        if engine.is_game_over() {
            let winner = state.winner.expect("winner set at game over");
            assert!(!state.players[opponent_of(winner)].is_alive());
        } else {
            assert!(state.turn_number > 100);
            assert!(state.players.iter().all(PlayerState::is_alive));
        }
    }

    #[test]
    fn test_winner_iff_game_over() {
        for seed in 0..20 {
            let engine = play_to_cap(&standard_config(seed), 100);
            assert_eq!(engine.is_game_over(), engine.winner().is_some());
        }
    }

    #[test]
    fn test_mirror_matches_run() {
        for faction in FactionId::ALL {
            let engine = play_to_cap(&mirror_config(faction, 12), 100);
            let state = engine.state();
            assert_eq!(state.players[0].faction, faction);
            assert_eq!(state.players[1].faction, faction);
        }
    }

    #[test]
    fn test_concurrent_construction_is_independent() {
        let configs: Vec<MatchConfig> = (0..8).map(standard_config).collect();
        let sequential: Vec<u64> = configs
            .iter()
            .map(|c| GameEngine::new(c).state_hash())
            .collect();

        let parallel: Vec<u64> = std::thread::scope(|s| {
            let handles: Vec<_> = configs
                .iter()
                .map(|c| s.spawn(move || GameEngine::new(c).state_hash()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(sequential, parallel);
    }
}
