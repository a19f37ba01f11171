//! Position types for replicated ordering using dense markers.

use super::ids::{EntityId, ReplicaId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Exclusive upper bound of a segment digit
const BASE: u64 = 1 << 32;

/// Largest gap left after a freshly generated digit, so appends at the end
/// of a list stay shallow
const STEP: u64 = 1 << 16;

/// Where an element sits: the owning container element plus its marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub owner: EntityId,
    pub marker: Marker,
}

impl Slot {
    pub fn new(owner: EntityId, marker: Marker) -> Self {
        Self { owner, marker }
    }
}

/// One level of a marker path
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Segment {
    pub digit: u32,
    pub replica: ReplicaId,
}

impl Segment {
    fn new(digit: u64, replica: ReplicaId) -> Self {
        // callers only pass digits below BASE
        Self {
            digit: digit as u32,
            replica,
        }
    }
}

/// Ordering key of an element within its owner.
///
/// Markers are paths of `(digit, replica)` segments compared lexicographically.
/// Between any two distinct markers there is always room for another one, and
/// two replicas generating concurrently never produce the same marker because
/// the generating replica is part of the final segment.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Marker(Vec<Segment>);

impl Marker {
    /// Generate a marker strictly between `lo` and `hi`.
    ///
    /// `None` means unbounded on that side. `lo` must sort before `hi`.
    pub fn between(lo: Option<&Marker>, hi: Option<&Marker>, replica: &ReplicaId) -> Self {
        debug_assert!(match (lo, hi) {
            (Some(lo), Some(hi)) => lo < hi,
            _ => true,
        });

        let mut path = Vec::new();
        // A side is tight while the generated prefix still equals its prefix
        let mut lo_tight = lo.is_some();
        let mut hi_tight = hi.is_some();

        for depth in 0.. {
            let lo_seg = lo.filter(|_| lo_tight).and_then(|m| m.0.get(depth));
            let hi_seg = hi.filter(|_| hi_tight).and_then(|m| m.0.get(depth));

            let floor = lo_seg.map_or(0, |s| u64::from(s.digit));
            let ceiling = hi_seg.map_or(BASE, |s| u64::from(s.digit));

            if ceiling > floor + 1 {
                let step = ((ceiling - floor) / 2).clamp(1, STEP);
                path.push(Segment::new(floor + step, replica.clone()));
                break;
            }

            match (lo_seg, hi_seg) {
                (Some(low), _) => {
                    hi_tight = hi_seg == Some(low);
                    path.push(low.clone());
                }
                (None, Some(high)) if high.digit == 0 => {
                    path.push(high.clone());
                }
                (None, _) => {
                    path.push(Segment::new(0, replica.clone()));
                    hi_tight = false;
                }
            }
            if lo_seg.is_none() {
                lo_tight = false;
            }
        }

        Self(path)
    }

    /// Marker for the first element of an empty list
    pub fn first(replica: &ReplicaId) -> Self {
        Self::between(None, None, replica)
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}:{}", seg.digit, seg.replica)?;
        }
        Ok(())
    }
}
