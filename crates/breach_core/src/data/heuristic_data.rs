//! AI scoring tables.
//!
//! The decision procedure in [`crate::ai`] only compares numbers; every
//! score and threshold it uses lives here so balance tuning never touches
//! control flow.

use serde::{Deserialize, Serialize};

/// Phantom card scores.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct PhantomHeuristics {
    /// Opponent hp at or below which a zero-day is a finisher.
    pub zeroday_finisher_hp: i32,
    /// Zero-day score when it can finish.
    pub zeroday_finisher: i32,
    /// Own hp above which the zero-day self-damage is affordable.
    pub zeroday_healthy_hp: i32,
    /// Zero-day score while healthy.
    pub zeroday_healthy: i32,
    /// Zero-day score otherwise.
    pub zeroday_low: i32,
    /// Siphon score when the opponent has firewalls.
    pub siphon_vs_firewall: i32,
    /// Siphon score against an open opponent.
    pub siphon_direct: i32,
    /// Exploit score against an open opponent, before adding its damage.
    pub exploit_open_base: i32,
    /// Exploit score when the firewalls would absorb it completely.
    pub exploit_absorbed: i32,
    /// Exploit score when it would backtrace, before subtracting the excess.
    pub exploit_backtrace_base: i32,
    /// Payload score with no boost active.
    pub payload_unboosted: i32,
    /// Payload score with a boost already active.
    pub payload_boosted: i32,
}

impl Default for PhantomHeuristics {
    fn default() -> Self {
        Self {
            zeroday_finisher_hp: 4,
            zeroday_finisher: 100,
            zeroday_healthy_hp: 10,
            zeroday_healthy: 15,
            zeroday_low: 5,
            siphon_vs_firewall: 40,
            siphon_direct: 30,
            exploit_open_base: 60,
            exploit_absorbed: 40,
            exploit_backtrace_base: 20,
            payload_unboosted: 30,
            payload_boosted: 0,
        }
    }
}

/// Sentinel card scores.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct SentinelHeuristics {
    /// Minimum own firewalls for a finishing purge.
    pub purge_finisher_min_firewalls: usize,
    /// A purge finishes when opponent hp is at most firewalls + this margin.
    pub purge_finisher_margin: i32,
    /// Purge score when it can finish.
    pub purge_finisher: i32,
    /// Minimum own firewalls for a purge to be worth it anyway.
    pub purge_stack_min_firewalls: usize,
    /// Purge score with a big stack.
    pub purge_stack: i32,
    /// Purge score otherwise.
    pub purge_default: i32,
    /// Own hp at or below which patch is urgent.
    pub patch_low_hp: i32,
    /// Patch score when low.
    pub patch_low: i32,
    /// Patch score otherwise.
    pub patch_default: i32,
    /// Firewall score when the opponent holds a boost.
    pub firewall_vs_boost: i32,
    /// Firewall score otherwise.
    pub firewall_default: i32,
    /// Exploit score against an open opponent.
    pub exploit_open: i32,
    /// Exploit score into firewalls.
    pub exploit_blocked: i32,
}

impl Default for SentinelHeuristics {
    fn default() -> Self {
        Self {
            purge_finisher_min_firewalls: 3,
            purge_finisher_margin: 3,
            purge_finisher: 90,
            purge_stack_min_firewalls: 4,
            purge_stack: 50,
            purge_default: 5,
            patch_low_hp: 10,
            patch_low: 70,
            patch_default: 15,
            firewall_vs_boost: 55,
            firewall_default: 30,
            exploit_open: 45,
            exploit_blocked: 15,
        }
    }
}

/// Per-faction scoring tables, selected by the acting player's faction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicTable {
    /// Used when the AI plays Phantom.
    pub phantom: PhantomHeuristics,
    /// Used when the AI plays Sentinel.
    pub sentinel: SentinelHeuristics,
    /// Score for any card the faction table has no entry for.
    pub unlisted_card: i32,
}
