//! Replay persistence and reconstruction tests.

use breach_core::error::GameError;
use breach_core::prelude::*;
use breach_core::replay::REPLAY_VERSION;
use breach_test_utils::determinism::{find_first_divergence, hash_trace, play_ai_match};
use breach_test_utils::fixtures::standard_config;

#[test]
fn test_ai_match_replay_round_trips_through_file() {
    let ruleset = Ruleset::standard();
    let (live, replay) = play_ai_match(&standard_config(42), &ruleset, 2_000);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("match.replay");
    replay.save(&path).unwrap();

    let loaded = MatchReplay::load(&path).unwrap();
    assert_eq!(loaded, replay);

    let rebuilt = loaded.reconstruct(&ruleset).unwrap();
    assert_eq!(rebuilt.state(), live.state());
    assert!(loaded.verify(&ruleset).unwrap());
}

#[test]
fn test_load_rejects_other_versions() {
    let (_, mut replay) = play_ai_match(&standard_config(1), &Ruleset::standard(), 10);
    replay.version = REPLAY_VERSION + 1;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.replay");
    replay.save(&path).unwrap();

    match MatchReplay::load(&path) {
        Err(GameError::ReplayVersionMismatch { expected, found }) => {
            assert_eq!(expected, REPLAY_VERSION);
            assert_eq!(found, REPLAY_VERSION + 1);
        }
        other => panic!("expected version mismatch, got {other:?}"),
    }
}

#[test]
fn test_load_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = MatchReplay::load(dir.path().join("nope.replay"));
    assert!(matches!(result, Err(GameError::Io(_))));
}

#[test]
fn test_different_ruleset_diverges_in_trace() {
    let stock = Ruleset::standard();
    let (_, replay) = play_ai_match(&standard_config(9), &stock, 60);

    let stock_trace = hash_trace(&replay, &stock).unwrap();
    assert_eq!(stock_trace.len(), replay.len());
    assert_eq!(find_first_divergence(&stock_trace, &stock_trace), None);

    // Bigger opening hands keep the first recorded action legal.
    let mut tuned = Ruleset::standard();
    tuned.rules.initial_hand_size = 6;
    let tuned_first = replay.reconstruct_prefix(&tuned, 1).unwrap();

    assert_eq!(
        find_first_divergence(&stock_trace[..1], &[tuned_first.state_hash()]),
        Some(0)
    );
}

#[test]
fn test_snapshot_mid_match_continues_identically() {
    let ruleset = Ruleset::standard();
    let (_, replay) = play_ai_match(&standard_config(77), &ruleset, 200);
    let half = replay.len() / 2;

    let engine = replay.reconstruct_prefix(&ruleset, half).unwrap();
    let mut resumed = GameEngine::restore(&engine.snapshot().unwrap()).unwrap();
    for recorded in &replay.actions[half..] {
        resumed
            .apply_action(recorded.player, recorded.action)
            .unwrap();
    }

    assert_eq!(resumed.state_hash(), replay.final_hash);
}
