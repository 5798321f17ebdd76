//! Per-match identifier allocation.
//!
//! Card and firewall ids only exist for event logs and traceability; game
//! logic never branches on them. The counters belong to one engine
//! instance, so matches can be created concurrently.

use serde::{Deserialize, Serialize};

use crate::cards::CardId;
use crate::firewall::FirewallId;

/// Monotonic id counters owned by a single match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdAllocator {
    next_card: u32,
    next_firewall: u32,
}

impl IdAllocator {
    /// Fresh counters. The first id handed out is 1.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next_card: 1,
            next_firewall: 1,
        }
    }

    /// Counters that continue from the given next ids.
    #[must_use]
    pub const fn resume(next_card: u32, next_firewall: u32) -> Self {
        Self {
            next_card,
            next_firewall,
        }
    }

    /// Allocate the next card id.
    pub fn next_card(&mut self) -> CardId {
        let id = CardId(self.next_card);
        self.next_card += 1;
        id
    }

    /// Allocate the next firewall id.
    pub fn next_firewall(&mut self) -> FirewallId {
        let id = FirewallId(self.next_firewall);
        self.next_firewall += 1;
        id
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_are_independent() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.next_card(), CardId(1));
        assert_eq!(ids.next_card(), CardId(2));
        assert_eq!(ids.next_firewall(), FirewallId(1));
        assert_eq!(ids.next_card(), CardId(3));
    }

    #[test]
    fn test_instances_do_not_share_state() {
        let mut a = IdAllocator::new();
        let mut b = IdAllocator::new();
        a.next_card();
        a.next_card();
        assert_eq!(b.next_card(), CardId(1));
    }

    #[test]
    fn test_resume() {
        let mut ids = IdAllocator::resume(40, 3);
        assert_eq!(ids.next_card(), CardId(40));
        assert_eq!(ids.next_firewall(), FirewallId(3));
    }
}
