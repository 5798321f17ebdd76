//! Match metrics collection for balance analysis.
//!
//! A [`MetricsCollector`] folds the events of one match into
//! [`GameMetrics`]; [`BatchSummary::from_games`] aggregates many of them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use breach_core::events::{DamageSource, GameEvent};
use breach_core::factions::FactionId;
use breach_core::state::{GameState, PlayerIndex};

/// How a match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WinCondition {
    /// A seat dropped to zero hit points.
    Knockout,
    /// The turn cap was reached and remaining hit points decided it.
    TurnLimit,
}

/// Per-seat statistics for one match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideMetrics {
    /// Faction in this seat.
    pub faction: FactionId,
    /// Cards played, keyed by card type name.
    pub cards_played: BTreeMap<String, u32>,
    /// Damage this seat inflicted on the opponent.
    pub damage_dealt: i64,
    /// Damage this seat received from any source.
    pub damage_taken: i64,
    /// Damage reflected back by enemy firewalls.
    pub backtrace_taken: i64,
    /// Hit points restored.
    pub healed: i64,
    /// Firewalls this seat deployed.
    pub firewalls_deployed: u32,
    /// Firewalls this seat lost.
    pub firewalls_lost: u32,
}

impl SideMetrics {
    /// Empty statistics for a seat.
    #[must_use]
    pub fn new(faction: FactionId) -> Self {
        Self {
            faction,
            cards_played: BTreeMap::new(),
            damage_dealt: 0,
            damage_taken: 0,
            backtrace_taken: 0,
            healed: 0,
            firewalls_deployed: 0,
            firewalls_lost: 0,
        }
    }

    /// Total number of cards played.
    #[must_use]
    pub fn total_cards_played(&self) -> u32 {
        self.cards_played.values().sum()
    }
}

/// Complete metrics for a single match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameMetrics {
    /// Position of the match in its batch.
    pub game_index: u32,
    /// Match identifier passed to the engine.
    pub game_id: String,
    /// Seed the match was built from.
    pub seed: u64,
    /// Winning seat.
    pub winner: PlayerIndex,
    /// How the winner was decided.
    pub win_condition: WinCondition,
    /// Final turn number.
    pub turns: u32,
    /// Remaining hit points per seat, never below zero.
    pub final_hp: [i32; 2],
    /// Accepted actions, end-of-turn included.
    pub actions: u32,
    /// Per-seat statistics.
    pub sides: [SideMetrics; 2],
    /// Engine state hash at the end of the match.
    pub final_state_hash: u64,
}

impl GameMetrics {
    /// Faction of the winning seat.
    #[must_use]
    pub fn winner_faction(&self) -> FactionId {
        self.sides[self.winner].faction
    }
}

/// Accumulates statistics while a match is being played.
#[derive(Debug)]
pub struct MetricsCollector {
    game_index: u32,
    game_id: String,
    seed: u64,
    actions: u32,
    sides: [SideMetrics; 2],
}

impl MetricsCollector {
    /// Start collecting for a match between `factions`.
    #[must_use]
    pub fn new(game_index: u32, game_id: impl Into<String>, seed: u64, factions: [FactionId; 2]) -> Self {
        Self {
            game_index,
            game_id: game_id.into(),
            seed,
            actions: 0,
            sides: factions.map(SideMetrics::new),
        }
    }

    /// Record one accepted action by `player` and the events it produced.
    pub fn on_action(&mut self, player: PlayerIndex, events: &[GameEvent]) {
        self.actions += 1;
        for event in events {
            self.on_event(player, event);
        }
    }

    fn on_event(&mut self, player: PlayerIndex, event: &GameEvent) {
        match event {
            GameEvent::Damage {
                target,
                amount,
                source,
            } => {
                let amount = i64::from(*amount);
                self.sides[*target].damage_taken += amount;
                if *source == DamageSource::Backtrace {
                    self.sides[*target].backtrace_taken += amount;
                } else if *target != player {
                    self.sides[player].damage_dealt += amount;
                }
            }
            GameEvent::Heal { target, amount, .. } => {
                self.sides[*target].healed += i64::from(*amount);
            }
            GameEvent::FirewallDeployed { player, .. } => {
                self.sides[*player].firewalls_deployed += 1;
            }
            GameEvent::FirewallDestroyed { player, firewalls } => {
                self.sides[*player].firewalls_lost += firewalls.len() as u32;
            }
            GameEvent::CardPlayed {
                player, card_type, ..
            } => {
                *self.sides[*player]
                    .cards_played
                    .entry(card_type.name().to_string())
                    .or_default() += 1;
            }
            _ => {}
        }
    }

    /// Close the match.
    #[must_use]
    pub fn finish(
        self,
        state: &GameState,
        winner: PlayerIndex,
        win_condition: WinCondition,
        final_state_hash: u64,
    ) -> GameMetrics {
        GameMetrics {
            game_index: self.game_index,
            game_id: self.game_id,
            seed: self.seed,
            winner,
            win_condition,
            turns: state.turn_number,
            final_hp: [state.players[0].hp.max(0), state.players[1].hp.max(0)],
            actions: self.actions,
            sides: self.sides,
            final_state_hash,
        }
    }
}

/// Aggregate statistics across a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Number of completed matches.
    pub games_played: u32,
    /// Matches won by seat 0.
    pub faction1_wins: u32,
    /// Matches won by seat 1.
    pub faction2_wins: u32,
    /// Seat 0 win rate (0.0 - 1.0).
    pub faction1_win_rate: f64,
    /// Seat 1 win rate (0.0 - 1.0).
    pub faction2_win_rate: f64,
    /// Mean final turn number, rounded to whole turns.
    pub average_turns: u32,
    /// Mean final hit points per seat, rounded to one decimal.
    pub average_final_hp: [f64; 2],
    /// Shortest match.
    pub min_turns: u32,
    /// Longest match.
    pub max_turns: u32,
    /// Matches decided by the turn cap.
    pub turn_limit_games: u32,
    /// Mean damage dealt per seat.
    pub average_damage_dealt: [f64; 2],
    /// Mean backtrace damage taken per seat.
    pub average_backtrace_taken: [f64; 2],
    /// Cards played per seat over the whole batch, by type.
    pub cards_played: [BTreeMap<String, u32>; 2],
}

impl BatchSummary {
    /// Build a summary from individual match metrics.
    #[must_use]
    pub fn from_games(games: &[GameMetrics]) -> Self {
        if games.is_empty() {
            return Self::default();
        }

        let count = games.len() as f64;
        let mut summary = Self {
            games_played: games.len() as u32,
            min_turns: u32::MAX,
            ..Default::default()
        };

        let mut turn_sum = 0u64;
        let mut hp_sum = [0i64; 2];
        let mut damage_sum = [0i64; 2];
        let mut backtrace_sum = [0i64; 2];

        for game in games {
            if game.winner == 0 {
                summary.faction1_wins += 1;
            } else {
                summary.faction2_wins += 1;
            }
            if game.win_condition == WinCondition::TurnLimit {
                summary.turn_limit_games += 1;
            }

            turn_sum += u64::from(game.turns);
            summary.min_turns = summary.min_turns.min(game.turns);
            summary.max_turns = summary.max_turns.max(game.turns);

            for seat in 0..2 {
                let side = &game.sides[seat];
                hp_sum[seat] += i64::from(game.final_hp[seat]);
                damage_sum[seat] += side.damage_dealt;
                backtrace_sum[seat] += side.backtrace_taken;
                for (card, played) in &side.cards_played {
                    *summary.cards_played[seat].entry(card.clone()).or_default() += played;
                }
            }
        }

        summary.faction1_win_rate = f64::from(summary.faction1_wins) / count;
        summary.faction2_win_rate = f64::from(summary.faction2_wins) / count;
        summary.average_turns = (turn_sum as f64 / count).round() as u32;
        summary.average_final_hp = hp_sum.map(|sum| round_one_decimal(sum as f64 / count));
        summary.average_damage_dealt = damage_sum.map(|sum| sum as f64 / count);
        summary.average_backtrace_taken = backtrace_sum.map(|sum| sum as f64 / count);

        summary
    }

    /// Win rate of a seat.
    #[must_use]
    pub fn win_rate(&self, seat: PlayerIndex) -> f64 {
        if seat == 0 {
            self.faction1_win_rate
        } else {
            self.faction2_win_rate
        }
    }

    /// Whether both win rates are within `threshold` of 50%.
    #[must_use]
    pub fn is_balanced(&self, threshold: f64) -> bool {
        (self.faction1_win_rate - 0.5).abs() <= threshold
            && (self.faction2_win_rate - 0.5).abs() <= threshold
    }

    /// Seat winning more than `0.5 + threshold` of matches, if any.
    #[must_use]
    pub fn dominant_side(&self, threshold: f64) -> Option<PlayerIndex> {
        (0..2).find(|&seat| self.win_rate(seat) > 0.5 + threshold)
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use breach_core::cards::CardType;
    use breach_core::events::HealSource;
    use breach_core::firewall::{ActiveFirewall, FirewallId};

    fn game(winner: PlayerIndex, turns: u32, final_hp: [i32; 2], condition: WinCondition) -> GameMetrics {
        GameMetrics {
            game_index: 0,
            game_id: "test".into(),
            seed: 0,
            winner,
            win_condition: condition,
            turns,
            final_hp,
            actions: 0,
            sides: [
                SideMetrics::new(FactionId::Phantom),
                SideMetrics::new(FactionId::Sentinel),
            ],
            final_state_hash: 0,
        }
    }

    #[test]
    fn test_collector_attributes_damage() {
        let mut collector =
            MetricsCollector::new(0, "g", 1, [FactionId::Phantom, FactionId::Sentinel]);

        collector.on_action(
            0,
            &[
                GameEvent::CardPlayed {
                    player: 0,
                    card_type: CardType::Exploit,
                    card_value: Some(6),
                },
                GameEvent::FirewallDestroyed {
                    player: 1,
                    firewalls: vec![ActiveFirewall::new(FirewallId(1), 3)],
                },
                GameEvent::Damage {
                    target: 0,
                    amount: 3,
                    source: DamageSource::Backtrace,
                },
            ],
        );
        collector.on_action(
            0,
            &[
                GameEvent::CardPlayed {
                    player: 0,
                    card_type: CardType::ZeroDay,
                    card_value: None,
                },
                GameEvent::Damage {
                    target: 1,
                    amount: 4,
                    source: DamageSource::ZeroDay,
                },
                GameEvent::Damage {
                    target: 0,
                    amount: 2,
                    source: DamageSource::ZeroDay,
                },
            ],
        );
        collector.on_action(
            1,
            &[GameEvent::Heal {
                target: 1,
                amount: 3,
                source: HealSource::Patch,
            }],
        );

        let mut engine_state = breach_core::engine::GameEngine::new(
            &breach_core::engine::MatchConfig::new("g", FactionId::Phantom, FactionId::Sentinel, 1),
        )
        .state()
        .clone();
        engine_state.players[1].hp = -3;

        let metrics = collector.finish(&engine_state, 0, WinCondition::Knockout, 99);
        assert_eq!(metrics.actions, 3);
        assert_eq!(metrics.final_hp, [22, 0]);
        assert_eq!(metrics.winner_faction(), FactionId::Phantom);

        let attacker = &metrics.sides[0];
        assert_eq!(attacker.damage_dealt, 4);
        assert_eq!(attacker.damage_taken, 5);
        assert_eq!(attacker.backtrace_taken, 3);
        assert_eq!(attacker.total_cards_played(), 2);
        assert_eq!(attacker.cards_played["zeroday"], 1);

        let defender = &metrics.sides[1];
        assert_eq!(defender.firewalls_lost, 1);
        assert_eq!(defender.damage_taken, 4);
        assert_eq!(defender.healed, 3);
    }

    #[test]
    fn test_summary_aggregates() {
        let games = vec![
            game(0, 10, [5, 0], WinCondition::Knockout),
            game(1, 13, [0, 7], WinCondition::Knockout),
            game(1, 100, [3, 3], WinCondition::TurnLimit),
        ];
        let summary = BatchSummary::from_games(&games);

        assert_eq!(summary.games_played, 3);
        assert_eq!(summary.faction1_wins + summary.faction2_wins, 3);
        assert_eq!(summary.faction2_wins, 2);
        assert_eq!(summary.average_turns, 41);
        assert_eq!(summary.min_turns, 10);
        assert_eq!(summary.max_turns, 100);
        assert_eq!(summary.turn_limit_games, 1);
        assert!((summary.average_final_hp[0] - 2.7).abs() < 1e-9);
        assert!((summary.average_final_hp[1] - 3.3).abs() < 1e-9);
        assert!((summary.faction2_win_rate - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_summary() {
        let summary = BatchSummary::from_games(&[]);
        assert_eq!(summary.games_played, 0);
        assert_eq!(summary.min_turns, 0);
    }

    #[test]
    fn test_balance_checks() {
        let games: Vec<_> = (0..10)
            .map(|i| game(usize::from(i >= 7), 12, [1, 1], WinCondition::Knockout))
            .collect();
        let summary = BatchSummary::from_games(&games);

        assert!(!summary.is_balanced(0.1));
        assert!(summary.is_balanced(0.25));
        assert_eq!(summary.dominant_side(0.1), Some(0));
        assert_eq!(summary.dominant_side(0.25), None);
    }
}
