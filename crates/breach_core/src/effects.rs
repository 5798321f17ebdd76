//! Card effect resolution.
//!
//! Each card type has one transition function taking exclusive access to
//! the attacker and defender seats. Effects cannot fail, so they are never
//! applied partially. Every effect logs `card_played` first, then its
//! secondary events in the order they happen.

use tracing::trace;

use crate::cards::{Card, CardKind, CardType};
use crate::data::GameRules;
use crate::events::{DamageSource, GameEvent, HealSource};
use crate::firewall::{resolve_exploit_vs_firewall, ActiveFirewall};
use crate::ids::IdAllocator;
use crate::state::{PlayerIndex, PlayerState};

/// Who is acting, under which rules.
pub struct EffectContext<'a> {
    /// Seat playing the card.
    pub attacker_index: PlayerIndex,
    /// The other seat.
    pub defender_index: PlayerIndex,
    /// Effect amounts.
    pub rules: &'a GameRules,
    /// Match id counters, for new firewalls.
    pub ids: &'a mut IdAllocator,
}

/// Resolve `card` played by the attacker.
pub fn play_card(
    card: Card,
    attacker: &mut PlayerState,
    defender: &mut PlayerState,
    ctx: &mut EffectContext<'_>,
) -> Vec<GameEvent> {
    trace!(
        player = ctx.attacker_index,
        card = %card,
        "Resolving card effect"
    );

    match card.kind {
        CardKind::Exploit { base_damage } => play_exploit(base_damage, attacker, defender, ctx),
        CardKind::Payload => play_payload(attacker, ctx),
        CardKind::ZeroDay => play_zeroday(attacker, defender, ctx),
        CardKind::Siphon => play_siphon(attacker, defender, ctx),
        CardKind::Firewall { block_value } => play_firewall(block_value, attacker, ctx),
        CardKind::Patch => play_patch(attacker, ctx),
        CardKind::Purge => play_purge(attacker, defender, ctx),
    }
}

fn played(ctx: &EffectContext<'_>, card_type: CardType, card_value: Option<i32>) -> GameEvent {
    GameEvent::CardPlayed {
        player: ctx.attacker_index,
        card_type,
        card_value,
    }
}

fn play_exploit(
    base_damage: i32,
    attacker: &mut PlayerState,
    defender: &mut PlayerState,
    ctx: &EffectContext<'_>,
) -> Vec<GameEvent> {
    let boost = attacker.boost;
    let damage = (base_damage + boost).max(0);
    attacker.boost = 0;

    let mut events = vec![played(ctx, CardType::Exploit, Some(damage))];
    if boost > 0 {
        events.push(GameEvent::BoostConsumed {
            player: ctx.attacker_index,
            amount: boost,
        });
    }

    let resolution = resolve_exploit_vs_firewall(damage, &defender.firewalls);
    defender.firewalls = resolution.remaining_firewalls;

    if !resolution.destroyed_firewalls.is_empty() {
        events.push(GameEvent::FirewallDestroyed {
            player: ctx.defender_index,
            firewalls: resolution.destroyed_firewalls,
        });
    }

    if resolution.backtrace_to_attacker > 0 {
        attacker.hp -= resolution.backtrace_to_attacker;
        events.push(GameEvent::Damage {
            target: ctx.attacker_index,
            amount: resolution.backtrace_to_attacker,
            source: DamageSource::Backtrace,
        });
    }

    if resolution.damage_to_defender > 0 {
        defender.hp -= resolution.damage_to_defender;
        events.push(GameEvent::Damage {
            target: ctx.defender_index,
            amount: resolution.damage_to_defender,
            source: DamageSource::Exploit,
        });
    }

    events
}

fn play_payload(attacker: &mut PlayerState, ctx: &EffectContext<'_>) -> Vec<GameEvent> {
    let amount = ctx.rules.payload_boost;
    attacker.boost = amount;

    vec![
        played(ctx, CardType::Payload, None),
        GameEvent::BoostApplied {
            player: ctx.attacker_index,
            amount,
        },
    ]
}

fn play_zeroday(
    attacker: &mut PlayerState,
    defender: &mut PlayerState,
    ctx: &EffectContext<'_>,
) -> Vec<GameEvent> {
    let damage = ctx.rules.zeroday_damage;
    let self_damage = ctx.rules.zeroday_self_damage;
    defender.hp -= damage;
    attacker.hp -= self_damage;

    vec![
        played(ctx, CardType::ZeroDay, None),
        GameEvent::Damage {
            target: ctx.defender_index,
            amount: damage,
            source: DamageSource::ZeroDay,
        },
        GameEvent::Damage {
            target: ctx.attacker_index,
            amount: self_damage,
            source: DamageSource::ZeroDay,
        },
    ]
}

fn play_siphon(
    attacker: &mut PlayerState,
    defender: &mut PlayerState,
    ctx: &EffectContext<'_>,
) -> Vec<GameEvent> {
    let mut events = vec![played(ctx, CardType::Siphon, None)];

    if defender.firewalls.is_empty() {
        let damage = ctx.rules.siphon_direct_damage;
        defender.hp -= damage;
        events.push(GameEvent::Damage {
            target: ctx.defender_index,
            amount: damage,
            source: DamageSource::Siphon,
        });
        return events;
    }

    let front = &mut defender.firewalls[0];
    let before = *front;
    front.value -= ctx.rules.siphon_drain;
    if front.value <= 0 {
        defender.firewalls.remove(0);
        events.push(GameEvent::FirewallDestroyed {
            player: ctx.defender_index,
            firewalls: vec![before],
        });
    }

    let heal = ctx.rules.siphon_heal;
    attacker.hp += heal;
    events.push(GameEvent::Heal {
        target: ctx.attacker_index,
        amount: heal,
        source: HealSource::Siphon,
    });

    events
}

fn play_firewall(
    block_value: i32,
    attacker: &mut PlayerState,
    ctx: &mut EffectContext<'_>,
) -> Vec<GameEvent> {
    let firewall = ActiveFirewall::new(ctx.ids.next_firewall(), block_value);
    attacker.firewalls.push(firewall);

    vec![
        played(ctx, CardType::Firewall, Some(block_value)),
        GameEvent::FirewallDeployed {
            player: ctx.attacker_index,
            value: block_value,
        },
    ]
}

fn play_patch(attacker: &mut PlayerState, ctx: &EffectContext<'_>) -> Vec<GameEvent> {
    let mut events = vec![played(ctx, CardType::Patch, None)];

    if attacker.hp <= ctx.rules.patch_hp_threshold {
        let heal = ctx.rules.patch_heal;
        attacker.hp += heal;
        events.push(GameEvent::Heal {
            target: ctx.attacker_index,
            amount: heal,
            source: HealSource::Patch,
        });
    } else {
        let count = attacker.draw_block(ctx.rules.patch_draw);
        events.push(GameEvent::Draw {
            player: ctx.attacker_index,
            count,
        });
    }

    events
}

fn play_purge(
    attacker: &mut PlayerState,
    defender: &mut PlayerState,
    ctx: &EffectContext<'_>,
) -> Vec<GameEvent> {
    let mut events = vec![played(ctx, CardType::Purge, None)];

    if !attacker.firewalls.is_empty() {
        let purged = std::mem::take(&mut attacker.firewalls);
        let damage = i32::try_from(purged.len()).unwrap_or(i32::MAX);
        defender.hp -= damage;
        events.push(GameEvent::FirewallDestroyed {
            player: ctx.attacker_index,
            firewalls: purged,
        });
        events.push(GameEvent::Damage {
            target: ctx.defender_index,
            amount: damage,
            source: DamageSource::Purge,
        });
    }

    if attacker.draw_one() {
        events.push(GameEvent::Draw {
            player: ctx.attacker_index,
            count: 1,
        });
    }

    events
}
