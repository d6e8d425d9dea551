//! Narrow-phase dispatch
//!
//! Runs a per-pair hook over a stream of candidate pairs. The hook only
//! gets shared references to the cached objects and reports back through
//! [`ControlFlow`]; whatever it records goes into state it captured itself,
//! which for the built-in queries is one of the aggregators.

use std::ops::ControlFlow;

use geometry::{GeometryError, NarrowPhase, PairDistance};
use tracing::trace;

use crate::aggregate::{ProximityAggregator, ValidityAggregator};
use crate::error::CollisionError;
use crate::object::CollisionObject;
use crate::pairs::ObjectPair;

pub struct NarrowPhaseDispatcher<'n, N> {
    narrow: &'n N,
}

impl<'n, N: NarrowPhase> NarrowPhaseDispatcher<'n, N> {
    #[must_use]
    pub fn new(narrow: &'n N) -> Self {
        Self { narrow }
    }

    /// Feeds every pair to `hook` until it breaks or the pairs run out.
    /// Returns how many pairs were handed to the hook.
    pub fn visit<'c, I, F>(&self, pairs: I, mut hook: F) -> Result<usize, CollisionError>
    where
        N::Shape: 'c,
        I: IntoIterator<Item = ObjectPair<'c, N::Shape>>,
        F: FnMut(&'c CollisionObject<N::Shape>, &'c CollisionObject<N::Shape>) -> Result<ControlFlow<()>, CollisionError>,
    {
        let mut visited = 0;
        for (a, b) in pairs {
            visited += 1;
            trace!(a = a.name(), b = b.name(), "narrow phase");
            if hook(a, b)?.is_break() {
                trace!(a = a.name(), b = b.name(), visited, "query stopped early");
                break;
            }
        }
        Ok(visited)
    }

    /// Boolean mode: stops as soon as the aggregator has seen a collision.
    pub fn check<'c, I>(&self, pairs: I, aggregator: &mut ValidityAggregator<'c>) -> Result<usize, CollisionError>
    where
        N::Shape: 'c,
        I: IntoIterator<Item = ObjectPair<'c, N::Shape>>,
    {
        self.visit(pairs, |a, b| {
            let colliding = self.collides(a, b)?;
            Ok(aggregator.record(a.name(), b.name(), colliding))
        })
    }

    /// Distance mode: measures every pair.
    pub fn measure<'c, I>(&self, pairs: I, aggregator: &mut ProximityAggregator) -> Result<usize, CollisionError>
    where
        N::Shape: 'c,
        I: IntoIterator<Item = ObjectPair<'c, N::Shape>>,
    {
        self.visit(pairs, |a, b| {
            let result = self.distance(a, b)?;
            Ok(aggregator.record(a.name(), b.name(), result))
        })
    }

    pub fn collides(&self, a: &CollisionObject<N::Shape>, b: &CollisionObject<N::Shape>) -> Result<bool, CollisionError> {
        self.narrow
            .test_pair_collision(a.shape(), a.pose(), b.shape(), b.pose())
            .map_err(|source| pair_error(a, b, source))
    }

    pub fn distance(
        &self,
        a: &CollisionObject<N::Shape>,
        b: &CollisionObject<N::Shape>,
    ) -> Result<PairDistance, CollisionError> {
        self.narrow
            .compute_pair_distance(a.shape(), a.pose(), b.shape(), b.pose())
            .map_err(|source| pair_error(a, b, source))
    }
}

fn pair_error<S>(a: &CollisionObject<S>, b: &CollisionObject<S>, source: GeometryError) -> CollisionError {
    CollisionError::UnsupportedPair {
        a: a.name().to_owned(),
        b: b.name().to_owned(),
        source,
    }
}
