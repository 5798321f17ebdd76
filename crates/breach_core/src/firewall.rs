//! Exploit vs firewall resolution.
//!
//! Firewalls are consumed whole, front to back, while exploit value
//! remains. Whatever value is still left once every firewall is gone is
//! reflected back onto the attacker as backtrace damage; it never reaches
//! the defender.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Per-match unique firewall identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FirewallId(pub u32);

impl fmt::Display for FirewallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Firewall({})", self.0)
    }
}

/// A deployed barrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActiveFirewall {
    /// Traceability id.
    pub id: FirewallId,
    /// Absorption value.
    pub value: i32,
}

impl ActiveFirewall {
    /// Create a firewall.
    #[must_use]
    pub const fn new(id: FirewallId, value: i32) -> Self {
        Self { id, value }
    }
}

/// Outcome of one exploit hitting a firewall sequence.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FirewallResolution {
    /// Damage that reaches the defender (only when no firewalls exist).
    pub damage_to_defender: i32,
    /// Excess value reflected onto the attacker.
    pub backtrace_to_attacker: i32,
    /// Untouched firewalls, in original order.
    pub remaining_firewalls: Vec<ActiveFirewall>,
    /// Consumed firewalls, in the order they absorbed.
    pub destroyed_firewalls: Vec<ActiveFirewall>,
    /// True when the firewalls absorbed the whole exploit.
    pub fully_blocked: bool,
}

/// Resolve an exploit of `exploit_value` against `firewalls`.
///
/// ```
/// use breach_core::firewall::{resolve_exploit_vs_firewall, ActiveFirewall, FirewallId};
///
/// let walls = [
///     ActiveFirewall::new(FirewallId(1), 3),
///     ActiveFirewall::new(FirewallId(2), 4),
/// ];
/// let hit = resolve_exploit_vs_firewall(10, &walls);
/// assert_eq!(hit.backtrace_to_attacker, 3);
/// assert_eq!(hit.damage_to_defender, 0);
/// ```
#[must_use]
pub fn resolve_exploit_vs_firewall(
    exploit_value: i32,
    firewalls: &[ActiveFirewall],
) -> FirewallResolution {
    if firewalls.is_empty() {
        return FirewallResolution {
            damage_to_defender: exploit_value,
            ..FirewallResolution::default()
        };
    }

    if exploit_value == 0 {
        return FirewallResolution {
            remaining_firewalls: firewalls.to_vec(),
            fully_blocked: true,
            ..FirewallResolution::default()
        };
    }

    let mut remaining_exploit = exploit_value;
    let mut destroyed = Vec::new();
    let mut remaining = Vec::new();

    for firewall in firewalls {
        if remaining_exploit <= 0 {
            remaining.push(*firewall);
        } else {
            destroyed.push(*firewall);
            remaining_exploit -= firewall.value;
        }
    }

    let backtrace = remaining_exploit.max(0);
    FirewallResolution {
        damage_to_defender: 0,
        backtrace_to_attacker: backtrace,
        remaining_firewalls: remaining,
        destroyed_firewalls: destroyed,
        fully_blocked: backtrace == 0,
    }
}

/// Sum of every firewall's absorption value.
#[must_use]
pub fn total_firewall_value(firewalls: &[ActiveFirewall]) -> i32 {
    firewalls.iter().map(|fw| fw.value).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walls(values: &[i32]) -> Vec<ActiveFirewall> {
        values
            .iter()
            .zip(1..)
            .map(|(&value, id)| ActiveFirewall::new(FirewallId(id), value))
            .collect()
    }

    #[test]
    fn test_no_firewalls_passes_through() {
        let r = resolve_exploit_vs_firewall(5, &[]);
        assert_eq!(r.damage_to_defender, 5);
        assert_eq!(r.backtrace_to_attacker, 0);
        assert!(!r.fully_blocked);
        assert!(r.destroyed_firewalls.is_empty());
    }

    #[test]
    fn test_fully_blocked_destroys_consumed_firewalls() {
        let r = resolve_exploit_vs_firewall(5, &walls(&[3, 4]));
        assert!(r.fully_blocked);
        assert_eq!(r.damage_to_defender, 0);
        assert_eq!(r.backtrace_to_attacker, 0);
        assert_eq!(r.destroyed_firewalls.len(), 2);
        assert!(r.remaining_firewalls.is_empty());
    }

    #[test]
    fn test_excess_value_backtraces() {
        let r = resolve_exploit_vs_firewall(10, &walls(&[3, 4]));
        assert!(!r.fully_blocked);
        assert_eq!(r.backtrace_to_attacker, 3);
        assert_eq!(r.damage_to_defender, 0);
        assert_eq!(r.destroyed_firewalls.len(), 2);
    }

    #[test]
    fn test_zero_exploit_is_noop() {
        let fw = walls(&[3]);
        let r = resolve_exploit_vs_firewall(0, &fw);
        assert!(r.fully_blocked);
        assert_eq!(r.remaining_firewalls, fw);
        assert!(r.destroyed_firewalls.is_empty());
        assert_eq!(r.damage_to_defender, 0);
    }

    #[test]
    fn test_untouched_firewalls_keep_order() {
        let fw = walls(&[2, 5, 1, 4]);
        let r = resolve_exploit_vs_firewall(2, &fw);
        assert!(r.fully_blocked);
        assert_eq!(r.destroyed_firewalls, vec![fw[0]]);
        assert_eq!(r.remaining_firewalls, vec![fw[1], fw[2], fw[3]]);
    }

    #[test]
    fn test_firewall_consumed_whole() {
        // 3 exploit against a 5 firewall destroys it entirely.
        let r = resolve_exploit_vs_firewall(3, &walls(&[5, 2]));
        assert_eq!(r.destroyed_firewalls.len(), 1);
        assert_eq!(r.remaining_firewalls.len(), 1);
        assert_eq!(r.remaining_firewalls[0].value, 2);
    }

    #[test]
    fn test_total_value() {
        assert_eq!(total_firewall_value(&[]), 0);
        assert_eq!(total_firewall_value(&walls(&[3, 4, 1])), 8);
    }
}
