//! Lamport stamps and last-writer-wins registers

use super::ids::ReplicaId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Causal stamp attached to every change.
///
/// Ordered by counter first and replica second, so a write made after
/// observing another write always beats it, and concurrent writes are broken
/// deterministically by replica id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Stamp {
    pub counter: u64,
    pub replica: ReplicaId,
}

impl Stamp {
    pub fn new(counter: u64, replica: ReplicaId) -> Self {
        Self { counter, replica }
    }

    /// Stamp below every real stamp. Used for state every replica creates
    /// identically without exchanging it, such as the board itself.
    pub fn genesis() -> Self {
        Self {
            counter: 0,
            replica: ReplicaId::genesis(),
        }
    }
}

impl fmt::Display for Stamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.counter, self.replica)
    }
}

/// Lamport clock owned by one replica
#[derive(Debug, Clone)]
pub struct LamportClock {
    replica: ReplicaId,
    counter: u64,
}

impl LamportClock {
    pub fn new(replica: ReplicaId) -> Self {
        Self {
            replica,
            counter: 0,
        }
    }

    pub fn replica(&self) -> &ReplicaId {
        &self.replica
    }

    /// Advance and return a stamp greater than anything seen so far
    pub fn tick(&mut self) -> Stamp {
        self.counter += 1;
        Stamp::new(self.counter, self.replica.clone())
    }

    /// Fold in a stamp received from any replica
    pub fn observe(&mut self, stamp: &Stamp) {
        self.counter = self.counter.max(stamp.counter);
    }
}

/// Last-writer-wins register
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lww<T> {
    value: T,
    stamp: Stamp,
}

impl<T: PartialEq> Lww<T> {
    pub fn new(value: T, stamp: Stamp) -> Self {
        Self { value, stamp }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn stamp(&self) -> &Stamp {
        &self.stamp
    }

    /// Merge a write. Returns true if the stored value changed.
    pub fn write(&mut self, value: T, stamp: Stamp) -> bool {
        if stamp <= self.stamp {
            return false;
        }
        let changed = self.value != value;
        self.value = value;
        self.stamp = stamp;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stamp(counter: u64, replica: &str) -> Stamp {
        Stamp::new(counter, ReplicaId::from_string(replica))
    }

    #[test]
    fn test_stamp_orders_counter_before_replica() {
        assert!(stamp(1, "z") < stamp(2, "a"));
        assert!(stamp(3, "a") < stamp(3, "b"));
        assert!(Stamp::genesis() < stamp(1, ""));
    }

    #[test]
    fn test_clock_tick_and_observe() {
        let mut clock = LamportClock::new(ReplicaId::from_string("a"));
        assert_eq!(clock.tick(), stamp(1, "a"));
        clock.observe(&stamp(10, "b"));
        assert_eq!(clock.tick(), stamp(11, "a"));
        clock.observe(&stamp(4, "c"));
        assert_eq!(clock.tick(), stamp(12, "a"));
    }

    #[test]
    fn test_lww_merge_is_order_independent() {
        let writes = [
            ("x".to_string(), stamp(2, "a")),
            ("y".to_string(), stamp(2, "b")),
            ("z".to_string(), stamp(1, "c")),
        ];

        let mut forward = Lww::new(String::new(), Stamp::genesis());
        for (value, s) in writes.iter().cloned() {
            forward.write(value, s);
        }
        let mut backward = Lww::new(String::new(), Stamp::genesis());
        for (value, s) in writes.iter().rev().cloned() {
            backward.write(value, s);
        }

        assert_eq!(forward, backward);
        assert_eq!(forward.get(), "y");
    }

    #[test]
    fn test_lww_write_reports_change() {
        let mut reg = Lww::new("a".to_string(), stamp(1, "r"));
        assert!(!reg.write("b".to_string(), stamp(1, "r")));
        assert!(!reg.write("a".to_string(), stamp(2, "r")));
        assert_eq!(reg.stamp(), &stamp(2, "r"));
        assert!(reg.write("c".to_string(), stamp(3, "r")));
    }
}
