//! Heuristic computer player.
//!
//! Stateless: a decision depends only on the game state and the scoring
//! table. The same player drives the live computer opponent and both seats
//! in batch simulation.

use tracing::trace;

use crate::action::GameAction;
use crate::cards::{Card, CardKind};
use crate::data::{HeuristicTable, PhantomHeuristics, SentinelHeuristics};
use crate::engine::GameEngine;
use crate::error::ActionError;
use crate::events::GameEvent;
use crate::factions::FactionId;
use crate::state::{opponent_of, GameState, PlayerIndex, PlayerState};

/// Scores every card in hand and plays the best one.
#[derive(Debug, Clone, Default)]
pub struct AiPlayer {
    heuristics: HeuristicTable,
}

impl AiPlayer {
    /// Create a player with custom scoring tables.
    #[must_use]
    pub const fn new(heuristics: HeuristicTable) -> Self {
        Self { heuristics }
    }

    /// Scoring tables in use.
    #[must_use]
    pub const fn heuristics(&self) -> &HeuristicTable {
        &self.heuristics
    }

    /// Pick the next action for `player`.
    ///
    /// Ends the turn only when no actions remain or the hand is empty; low
    /// scores never force an early end. A `player` outside seats 0 and 1
    /// gets `EndTurn`, which the engine then rejects as out of turn.
    #[must_use]
    pub fn choose_action(&self, state: &GameState, player: PlayerIndex) -> GameAction {
        if player >= state.players.len() {
            return GameAction::EndTurn;
        }

        let me = state.player(player);
        let opponent = state.player(opponent_of(player));

        if state.actions_remaining == 0 {
            return GameAction::EndTurn;
        }

        match self.choose_card(me, opponent) {
            Some(card_index) => GameAction::PlayCard { card_index },
            None => GameAction::EndTurn,
        }
    }

    /// Index of the highest-scoring card, earliest on ties. `None` for an
    /// empty hand.
    #[must_use]
    pub fn choose_card(&self, me: &PlayerState, opponent: &PlayerState) -> Option<usize> {
        let mut best: Option<(usize, i32)> = None;

        for (index, card) in me.hand.iter().enumerate() {
            let score = self.score_card(card, me, opponent);
            trace!(index, card = %card, score, "Scored card");
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((index, score));
            }
        }

        best.map(|(index, _)| index)
    }

    /// Heuristic value of playing `card` now.
    #[must_use]
    pub fn score_card(&self, card: &Card, me: &PlayerState, opponent: &PlayerState) -> i32 {
        let score = match me.faction {
            FactionId::Phantom => score_phantom(&self.heuristics.phantom, card, me, opponent),
            FactionId::Sentinel => score_sentinel(&self.heuristics.sentinel, card, me, opponent),
        };
        score.unwrap_or(self.heuristics.unlisted_card)
    }

    /// Play `player`'s whole turn: apply chosen actions until the AI ends
    /// its turn or the match ends.
    ///
    /// # Errors
    ///
    /// Returns the engine's [`ActionError`] if an action is rejected, for
    /// example when it is not `player`'s turn.
    pub fn take_turn(
        &self,
        engine: &mut GameEngine,
        player: PlayerIndex,
    ) -> Result<Vec<GameEvent>, ActionError> {
        let mut events = Vec::new();

        while !engine.is_game_over() {
            let action = self.choose_action(engine.state(), player);
            let outcome = engine.apply_action(player, action)?;
            events.extend(outcome.events);

            if action == GameAction::EndTurn || outcome.game_over {
                break;
            }
        }

        Ok(events)
    }
}

fn score_phantom(
    table: &PhantomHeuristics,
    card: &Card,
    me: &PlayerState,
    opponent: &PlayerState,
) -> Option<i32> {
    let enemy_firewalls = opponent.firewall_total();

    let score = match card.kind {
        CardKind::ZeroDay => {
            if opponent.hp <= table.zeroday_finisher_hp {
                table.zeroday_finisher
            } else if me.hp > table.zeroday_healthy_hp {
                table.zeroday_healthy
            } else {
                table.zeroday_low
            }
        }
        CardKind::Siphon => {
            if enemy_firewalls > 0 {
                table.siphon_vs_firewall
            } else {
                table.siphon_direct
            }
        }
        CardKind::Exploit { base_damage } => {
            let damage = base_damage + me.boost;
            if enemy_firewalls == 0 {
                table.exploit_open_base + damage
            } else if damage <= enemy_firewalls {
                table.exploit_absorbed
            } else {
                table.exploit_backtrace_base - (damage - enemy_firewalls)
            }
        }
        CardKind::Payload => {
            if me.boost == 0 {
                table.payload_unboosted
            } else {
                table.payload_boosted
            }
        }
        CardKind::Firewall { .. } | CardKind::Patch | CardKind::Purge => return None,
    };

    Some(score)
}

fn score_sentinel(
    table: &SentinelHeuristics,
    card: &Card,
    me: &PlayerState,
    opponent: &PlayerState,
) -> Option<i32> {
    let score = match card.kind {
        CardKind::Purge => {
            let count = me.firewalls.len();
            let reach = i32::try_from(count)
                .unwrap_or(i32::MAX)
                .saturating_add(table.purge_finisher_margin);
            if count >= table.purge_finisher_min_firewalls && opponent.hp <= reach {
                table.purge_finisher
            } else if count >= table.purge_stack_min_firewalls {
                table.purge_stack
            } else {
                table.purge_default
            }
        }
        CardKind::Patch => {
            if me.hp <= table.patch_low_hp {
                table.patch_low
            } else {
                table.patch_default
            }
        }
        CardKind::Firewall { .. } => {
            if opponent.boost > 0 {
                table.firewall_vs_boost
            } else {
                table.firewall_default
            }
        }
        CardKind::Exploit { .. } => {
            if opponent.firewall_total() == 0 {
                table.exploit_open
            } else {
                table.exploit_blocked
            }
        }
        CardKind::Payload | CardKind::ZeroDay | CardKind::Siphon => return None,
    };

    Some(score)
}
