//! Memoized stop-area distances.

use geo::{Distance, Haversine};
use std::collections::HashMap;

use crate::domain::{ObjectId, StopArea};

/// Great-circle distances between stop areas, computed once per pair.
///
/// The cache lives for one validation run; the same stop pair is usually
/// visited by every journey on a pattern.
#[derive(Debug, Default)]
pub struct DistanceCache {
    metres: HashMap<(ObjectId, ObjectId), f64>,
}

impl DistanceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Distance in metres, or `None` when either area has no position.
    pub fn between(&mut self, a: &StopArea, b: &StopArea) -> Option<f64> {
        let (from, to) = (a.position?, b.position?);
        let key = if a.id <= b.id {
            (a.id.clone(), b.id.clone())
        } else {
            (b.id.clone(), a.id.clone())
        };
        let metres = *self
            .metres
            .entry(key)
            .or_insert_with(|| Haversine.distance(from.to_point(), to.to_point()));
        Some(metres)
    }

    pub fn len(&self) -> usize {
        self.metres.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metres.is_empty()
    }
}
