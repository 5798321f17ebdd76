//! The match state machine.
//!
//! A [`GameEngine`] owns one match. [`GameEngine::apply_action`] is the
//! only mutation surface: it validates the action, applies it completely,
//! and evaluates game over before returning. Rejected actions leave the
//! state untouched.
//!
//! ## Determinism Guarantees
//!
//! - All randomness is consumed at construction, from a generator seeded
//!   by [`MatchConfig::seed`]
//! - Card and firewall ids come from counters owned by the engine
//! - Applying the same actions to two engines built from the same config
//!   yields equal states (and equal [`GameEngine::state_hash`] values)

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::action::GameAction;
use crate::data::{GameRules, Ruleset};
use crate::deck::build_deck;
use crate::effects::{play_card, EffectContext};
use crate::error::{ActionError, GameError, Result};
use crate::events::GameEvent;
use crate::factions::FactionId;
use crate::ids::IdAllocator;
use crate::rng::SeededRandom;
use crate::state::{opponent_of, GamePhase, GameState, PlayerIndex, PlayerState};

/// Everything needed to build (or rebuild) a match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Caller-chosen identifier.
    pub match_id: String,
    /// Faction in seat 0.
    pub player1_faction: FactionId,
    /// Faction in seat 1.
    pub player2_faction: FactionId,
    /// Seed for deck generation and shuffling.
    pub seed: u64,
}

impl MatchConfig {
    /// Create a match config.
    pub fn new(
        match_id: impl Into<String>,
        player1_faction: FactionId,
        player2_faction: FactionId,
        seed: u64,
    ) -> Self {
        Self {
            match_id: match_id.into(),
            player1_faction,
            player2_faction,
            seed,
        }
    }
}

/// An accepted action.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ActionOutcome {
    /// Events in the order they happened.
    pub events: Vec<GameEvent>,
    /// Whether this action ended the match.
    pub game_over: bool,
    /// Winner, if the match ended.
    pub winner: Option<PlayerIndex>,
}

/// Result of [`GameEngine::apply_action`].
pub type ActionResult = std::result::Result<ActionOutcome, ActionError>;

/// Authoritative engine for one match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameEngine {
    state: GameState,
    rules: GameRules,
    ids: IdAllocator,
}

impl GameEngine {
    /// Build a match with the stock ruleset.
    #[must_use]
    pub fn new(config: &MatchConfig) -> Self {
        Self::with_ruleset(config, &Ruleset::standard())
    }

    /// Build a match with custom balance data.
    ///
    /// Player 1's deck is built and shuffled first, then player 2's, both
    /// from the same generator. Initial hands are dealt to player 1 first.
    #[must_use]
    pub fn with_ruleset(config: &MatchConfig, ruleset: &Ruleset) -> Self {
        let mut rng = SeededRandom::new(config.seed);
        let mut ids = IdAllocator::new();

        let mut seat = |faction: FactionId| {
            let deck = build_deck(ruleset.deck_for(faction), &mut rng, &mut ids);
            PlayerState::new(faction, deck)
        };
        let players = [seat(config.player1_faction), seat(config.player2_faction)];

        let rules = ruleset.rules.clone();
        let mut state = GameState {
            match_id: config.match_id.clone(),
            players,
            current_turn: 0,
            actions_remaining: rules.actions_per_turn,
            turn_number: 1,
            phase: GamePhase::Setup,
            winner: None,
            seed: config.seed,
        };

        for player in &mut state.players {
            for _ in 0..rules.initial_hand_size {
                player.draw_one();
            }
        }
        state.phase = GamePhase::Playing;

        debug!(
            match_id = %config.match_id,
            seed = config.seed,
            player1 = %config.player1_faction,
            player2 = %config.player2_faction,
            "Match created"
        );

        Self { state, rules, ids }
    }

    /// Resume a match from a stored state.
    ///
    /// Id counters continue after the highest card and firewall ids still
    /// present in the state.
    #[must_use]
    pub fn from_state(state: GameState, rules: GameRules) -> Self {
        let last_card = state
            .players
            .iter()
            .flat_map(|p| p.deck.iter().chain(&p.hand))
            .map(|c| c.id.0)
            .max()
            .unwrap_or(0);
        let last_firewall = state
            .players
            .iter()
            .flat_map(|p| &p.firewalls)
            .map(|f| f.id.0)
            .max()
            .unwrap_or(0);

        Self {
            state,
            rules,
            ids: IdAllocator::resume(last_card + 1, last_firewall + 1),
        }
    }

    /// Read-only view of the match.
    #[must_use]
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    /// Rules this match runs under.
    #[must_use]
    pub const fn rules(&self) -> &GameRules {
        &self.rules
    }

    /// Whether the match has ended.
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.state.phase == GamePhase::GameOver
    }

    /// Seed the match was built from.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.state.seed
    }

    /// Winner, once the match is over.
    #[must_use]
    pub const fn winner(&self) -> Option<PlayerIndex> {
        self.state.winner
    }

    /// Apply one action for `player`.
    ///
    /// # Errors
    ///
    /// Returns an [`ActionError`] if the match is over, it is not
    /// `player`'s turn, no actions remain, or the card index is out of
    /// range. The state is unchanged in every error case.
    pub fn apply_action(&mut self, player: PlayerIndex, action: GameAction) -> ActionResult {
        if !self.state.is_playing() {
            return Err(ActionError::InactiveGame);
        }

        if player != self.state.current_turn {
            return Err(ActionError::NotYourTurn {
                player,
                current: self.state.current_turn,
            });
        }

        match action {
            GameAction::PlayCard { card_index } => self.play_card(player, card_index),
            GameAction::EndTurn => Ok(self.end_turn()),
        }
    }

    fn play_card(&mut self, player: PlayerIndex, card_index: usize) -> ActionResult {
        if self.state.actions_remaining == 0 {
            return Err(ActionError::NoActionsRemaining);
        }

        let hand_size = self.state.players[player].hand.len();
        if card_index >= hand_size {
            return Err(ActionError::InvalidCardIndex {
                index: card_index,
                hand_size,
            });
        }

        let opponent = opponent_of(player);
        let card = self.state.players[player].hand.remove(card_index);

        let mut ctx = EffectContext {
            attacker_index: player,
            defender_index: opponent,
            rules: &self.rules,
            ids: &mut self.ids,
        };
        let (attacker, defender) = self.state.split_players_mut(player);
        let mut events = play_card(card, attacker, defender, &mut ctx);

        self.state.actions_remaining -= 1;

        debug!(
            player,
            card = %card,
            actions_remaining = self.state.actions_remaining,
            "Card played"
        );

        let winner = self.check_game_over();
        if let Some(winner) = winner {
            events.push(GameEvent::GameOver { winner });
        }

        Ok(ActionOutcome {
            events,
            game_over: winner.is_some(),
            winner,
        })
    }

    fn end_turn(&mut self) -> ActionOutcome {
        let next = opponent_of(self.state.current_turn);
        self.state.current_turn = next;

        let player = &mut self.state.players[next];
        player.boost = 0;
        let drawn = player.draw_block(self.rules.draw_per_turn);

        self.state.actions_remaining = self.rules.actions_per_turn;
        self.state.turn_number += 1;

        debug!(
            player = next,
            turn = self.state.turn_number,
            "Turn started"
        );

        ActionOutcome {
            events: vec![
                GameEvent::TurnStart {
                    player: next,
                    turn_number: self.state.turn_number,
                },
                GameEvent::Draw {
                    player: next,
                    count: drawn,
                },
            ],
            game_over: false,
            winner: None,
        }
    }

    /// Seat 0 is checked first, so if both seats drop to zero in one action
    /// seat 1 wins.
    fn check_game_over(&mut self) -> Option<PlayerIndex> {
        let loser = self.state.players.iter().position(|p| !p.is_alive())?;
        let winner = opponent_of(loser);

        self.state.phase = GamePhase::GameOver;
        self.state.winner = Some(winner);

        debug!(
            winner,
            turn = self.state.turn_number,
            hp1 = self.state.players[0].hp,
            hp2 = self.state.players[1].hp,
            "Game over"
        );

        Some(winner)
    }

    /// Every action the engine would currently accept from `player`.
    #[must_use]
    pub fn legal_actions(&self, player: PlayerIndex) -> Vec<GameAction> {
        if !self.state.is_playing() || player != self.state.current_turn {
            return Vec::new();
        }

        let mut actions = Vec::new();
        if self.state.actions_remaining > 0 {
            let hand_size = self.state.players[player].hand.len();
            actions.extend((0..hand_size).map(|card_index| GameAction::PlayCard { card_index }));
        }
        actions.push(GameAction::EndTurn);
        actions
    }

    /// Hash of the full match state.
    ///
    /// Two engines with identical state produce identical hashes.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.state.hash(&mut hasher);
        hasher.finish()
    }

    /// Serialize the whole engine (state, rules and id counters).
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn snapshot(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| GameError::Serialization(format!("Failed to serialize engine: {e}")))
    }

    /// Rebuild an engine from [`GameEngine::snapshot`] bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn restore(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes)
            .map_err(|e| GameError::Serialization(format!("Failed to deserialize engine: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Card, CardId, CardKind};

    fn engine(seed: u64) -> GameEngine {
        GameEngine::new(&MatchConfig::new(
            "test",
            FactionId::Phantom,
            FactionId::Sentinel,
            seed,
        ))
    }

    #[test]
    fn test_construction() {
        let e = engine(42);
        let s = e.state();
        assert_eq!(s.phase, GamePhase::Playing);
        assert_eq!(s.current_turn, 0);
        assert_eq!(s.turn_number, 1);
        assert_eq!(s.actions_remaining, 2);
        assert_eq!(s.winner, None);
        assert_eq!(s.players[0].hp, 22);
        assert_eq!(s.players[1].hp, 20);
        assert_eq!(s.players[0].hand.len(), 5);
        assert_eq!(s.players[1].hand.len(), 5);
        assert_eq!(s.players[0].deck.len(), 25);
        assert_eq!(s.players[1].deck.len(), 24);
    }

    #[test]
    fn test_same_seed_same_state() {
        assert_eq!(engine(42).state(), engine(42).state());
        assert_eq!(engine(42).state_hash(), engine(42).state_hash());
        assert_ne!(engine(1).state(), engine(2).state());
    }

    #[test]
    fn test_not_your_turn() {
        let mut e = engine(42);
        let before = e.state().clone();
        let err = e.apply_action(1, GameAction::EndTurn).unwrap_err();
        assert_eq!(err, ActionError::NotYourTurn { player: 1, current: 0 });
        assert_eq!(e.state(), &before);
    }

    #[test]
    fn test_invalid_card_index() {
        let mut e = engine(42);
        let before = e.state().clone();
        let err = e
            .apply_action(0, GameAction::PlayCard { card_index: 5 })
            .unwrap_err();
        assert_eq!(err, ActionError::InvalidCardIndex { index: 5, hand_size: 5 });
        assert_eq!(e.state(), &before);
    }

    #[test]
    fn test_action_allotment() {
        let mut e = engine(42);
        for _ in 0..2 {
            let outcome = e
                .apply_action(0, GameAction::PlayCard { card_index: 0 })
                .unwrap();
            assert!(matches!(outcome.events[0], GameEvent::CardPlayed { .. }));
        }
        if !e.is_game_over() {
            let err = e
                .apply_action(0, GameAction::PlayCard { card_index: 0 })
                .unwrap_err();
            assert_eq!(err, ActionError::NoActionsRemaining);
        }
    }

    #[test]
    fn test_end_turn() {
        let mut e = engine(42);
        e.state.players[1].boost = 1;
        let outcome = e.apply_action(0, GameAction::EndTurn).unwrap();

        let s = e.state();
        assert_eq!(s.current_turn, 1);
        assert_eq!(s.turn_number, 2);
        assert_eq!(s.actions_remaining, 2);
        assert_eq!(s.players[1].boost, 0);
        assert_eq!(s.players[1].hand.len(), 6);
        assert_eq!(
            outcome.events,
            vec![
                GameEvent::TurnStart {
                    player: 1,
                    turn_number: 2
                },
                GameEvent::Draw {
                    player: 1,
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn test_end_turn_with_empty_deck_draws_nothing() {
        let mut e = engine(42);
        e.state.players[1].deck.clear();
        let outcome = e.apply_action(0, GameAction::EndTurn).unwrap();
        assert_eq!(outcome.events[1], GameEvent::Draw { player: 1, count: 0 });
    }

    #[test]
    fn test_lethal_play_ends_game_and_freezes() {
        let mut e = engine(42);
        e.state.players[1].hp = 4;
        e.state.players[0].hand[0] = Card::new(CardId(500), CardKind::ZeroDay);

        let outcome = e
            .apply_action(0, GameAction::PlayCard { card_index: 0 })
            .unwrap();
        assert!(outcome.game_over);
        assert_eq!(outcome.winner, Some(0));
        assert_eq!(outcome.events.last(), Some(&GameEvent::GameOver { winner: 0 }));
        assert!(e.is_game_over());
        assert_eq!(e.winner(), Some(0));

        let frozen = e.state().clone();
        assert_eq!(
            e.apply_action(0, GameAction::EndTurn).unwrap_err(),
            ActionError::InactiveGame
        );
        assert_eq!(
            e.apply_action(1, GameAction::EndTurn).unwrap_err(),
            ActionError::InactiveGame
        );
        assert_eq!(e.state(), &frozen);
        assert!(e.legal_actions(0).is_empty());
    }

    #[test]
    fn test_mutual_knockout_checks_seat_zero_first() {
        let mut e = engine(42);
        e.state.players[0].hp = 2;
        e.state.players[1].hp = 4;
        e.state.players[0].hand[0] = Card::new(CardId(500), CardKind::ZeroDay);

        let outcome = e
            .apply_action(0, GameAction::PlayCard { card_index: 0 })
            .unwrap();
        assert_eq!(outcome.winner, Some(1));
    }

    #[test]
    fn test_legal_actions() {
        let mut e = engine(42);
        assert_eq!(e.legal_actions(0).len(), 6);
        assert!(e.legal_actions(1).is_empty());

        e.state.actions_remaining = 0;
        assert_eq!(e.legal_actions(0), vec![GameAction::EndTurn]);
    }

    #[test]
    fn test_snapshot_restore() {
        let mut e = engine(7);
        e.apply_action(0, GameAction::PlayCard { card_index: 1 }).unwrap();
        let bytes = e.snapshot().unwrap();
        let restored = GameEngine::restore(&bytes).unwrap();
        assert_eq!(restored.state(), e.state());
        assert_eq!(restored.state_hash(), e.state_hash());
        assert_eq!(restored.rules(), e.rules());
    }

    #[test]
    fn test_from_state_resumes() {
        let live = engine(9);
        let mut resumed = GameEngine::from_state(live.state().clone(), live.rules().clone());
        assert_eq!(resumed.state_hash(), live.state_hash());

        resumed.state.players[0].hand[0] = Card::new(CardId(900), CardKind::Firewall { block_value: 3 });
        resumed
            .apply_action(0, GameAction::PlayCard { card_index: 0 })
            .unwrap();
        assert_eq!(resumed.state().players[0].firewalls[0].id.0, 1);
    }

    #[test]
    fn test_restore_rejects_garbage() {
        assert!(matches!(
            GameEngine::restore(&[1, 2, 3]),
            Err(GameError::Serialization(_))
        ));
    }
}
