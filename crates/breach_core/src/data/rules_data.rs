//! Turn structure and fixed card-effect amounts.

use serde::{Deserialize, Serialize};

/// Rule constants shared by both factions.
///
/// Missing fields in a RON override fall back to the stock values.
///
/// # Example RON
///
/// ```ron
/// GameRules(
///     actions_per_turn: 2,
///     initial_hand_size: 5,
///     zeroday_damage: 5,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct GameRules {
    /// Card plays allowed per turn.
    pub actions_per_turn: u32,
    /// Cards drawn by each player at match start.
    pub initial_hand_size: usize,
    /// Cards drawn by the new current player at each end of turn.
    pub draw_per_turn: usize,
    /// Zero-day damage to the defender.
    pub zeroday_damage: i32,
    /// Zero-day damage to the attacker.
    pub zeroday_self_damage: i32,
    /// Patch heal when at or below the threshold.
    pub patch_heal: i32,
    /// Patch draw when above the threshold.
    pub patch_draw: usize,
    /// Hit points at or below which patch heals instead of drawing.
    pub patch_hp_threshold: i32,
    /// Value siphon removes from the front enemy firewall.
    pub siphon_drain: i32,
    /// Heal siphon grants when it drains a firewall.
    pub siphon_heal: i32,
    /// Siphon damage when the defender has no firewalls.
    pub siphon_direct_damage: i32,
    /// Boost granted by payload.
    pub payload_boost: i32,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            actions_per_turn: 2,
            initial_hand_size: 5,
            draw_per_turn: 1,
            zeroday_damage: 4,
            zeroday_self_damage: 2,
            patch_heal: 3,
            patch_draw: 2,
            patch_hp_threshold: 10,
            siphon_drain: 1,
            siphon_heal: 1,
            siphon_direct_damage: 2,
            payload_boost: 1,
        }
    }
}

impl GameRules {
    /// Problems that would make a match unplayable or nonsensical.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.actions_per_turn == 0 {
            errors.push("actions_per_turn must be at least 1".to_string());
        }

        let amounts = [
            ("zeroday_damage", self.zeroday_damage),
            ("zeroday_self_damage", self.zeroday_self_damage),
            ("patch_heal", self.patch_heal),
            ("siphon_drain", self.siphon_drain),
            ("siphon_heal", self.siphon_heal),
            ("siphon_direct_damage", self.siphon_direct_damage),
            ("payload_boost", self.payload_boost),
        ];
        for (name, value) in amounts {
            if value < 0 {
                errors.push(format!("{name} must not be negative (got {value})"));
            }
        }

        errors
    }
}
