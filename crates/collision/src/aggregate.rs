//! Per-query result aggregation
//!
//! One aggregator lives for exactly one query. The dispatcher hands it each
//! narrow-phase result and the aggregator's answer tells the dispatcher
//! whether to keep going.

use std::ops::ControlFlow;

use geometry::PairDistance;

use crate::proxy::CollisionProxy;

/// Running minimum before any pair has been measured. Never reported.
const NO_DISTANCE: f64 = 1e300;

/// Boolean validity: stops at the first colliding pair.
#[derive(Debug, Default)]
pub struct ValidityAggregator<'c> {
    collision: Option<(&'c str, &'c str)>,
    tested: usize,
}

impl<'c> ValidityAggregator<'c> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, a: &'c str, b: &'c str, colliding: bool) -> ControlFlow<()> {
        self.tested += 1;
        if colliding {
            self.collision = Some((a, b));
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.collision.is_none()
    }

    /// The pair that ended the query, if any.
    #[must_use]
    pub fn collision(&self) -> Option<(&'c str, &'c str)> {
        self.collision
    }

    #[must_use]
    pub fn tested(&self) -> usize {
        self.tested
    }
}

/// Distance mode: keeps every result and the smallest distance seen.
#[derive(Debug)]
pub struct ProximityAggregator {
    proxies: Vec<CollisionProxy>,
    min_distance: f64,
    closest: Option<usize>,
}

impl Default for ProximityAggregator {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl ProximityAggregator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            proxies: Vec::with_capacity(capacity),
            min_distance: NO_DISTANCE,
            closest: None,
        }
    }

    /// Always continues; distance queries look at every pair.
    pub fn record(&mut self, a: &str, b: &str, result: PairDistance) -> ControlFlow<()> {
        if self.closest.is_none() || result.distance < self.min_distance {
            self.min_distance = result.distance;
            self.closest = Some(self.proxies.len());
        }
        self.proxies.push(CollisionProxy::new(a, b, result));
        ControlFlow::Continue(())
    }

    /// Smallest signed distance, or `None` if nothing was measured.
    #[must_use]
    pub fn min_distance(&self) -> Option<f64> {
        self.closest.map(|_| self.min_distance)
    }

    #[must_use]
    pub fn closest(&self) -> Option<&CollisionProxy> {
        self.closest.map(|i| &self.proxies[i])
    }

    #[must_use]
    pub fn proxies(&self) -> &[CollisionProxy] {
        &self.proxies
    }

    #[must_use]
    pub fn into_proxies(self) -> Vec<CollisionProxy> {
        self.proxies
    }

    #[must_use]
    pub fn into_closest(mut self) -> Option<CollisionProxy> {
        self.closest.map(|i| self.proxies.swap_remove(i))
    }
}
