//! The collision world
//!
//! [`CollisionWorld`] owns the narrow phase, the geometry cache, the allowed
//! collision matrix and the configuration, and wires them together into the
//! queries a planner asks. It is an ordinary value: construct one per
//! planning problem and pass it where it is needed.

use std::ops::ControlFlow;
use std::rc::Rc;

use geometry::NarrowPhase;
use glam::DVec3;
use tracing::{debug, instrument};

use crate::acm::AllowedCollisionMatrix;
use crate::aggregate::{ProximityAggregator, ValidityAggregator};
use crate::cache::GeometryCache;
use crate::config::CollisionConfig;
use crate::dispatch::NarrowPhaseDispatcher;
use crate::error::CollisionError;
use crate::kinematics::{KinematicElement, ObjectCategory};
use crate::pairs::PairEnumerator;
use crate::proxy::{CollisionProxy, ProxyRecord};

/// What a motion planner needs from a collision scene.
///
/// Queries take `&self` and never rebuild geometry. Poses are only as
/// fresh as the last [`CollisionScene::sync_transforms`].
pub trait CollisionScene {
    /// Rebuilds all cached shapes from the given elements.
    ///
    /// The scene only keeps weak references. Callers must hold every
    /// element, static obstacles included, for as long as it stays cached;
    /// a dropped element makes the next sync fail with
    /// [`CollisionError::DetachedElement`].
    fn update_objects(&mut self, elements: &[Rc<KinematicElement>]) -> Result<(), CollisionError>;

    /// Copies the current element poses into the cache.
    fn sync_transforms(&mut self) -> Result<(), CollisionError>;

    /// `true` if no filtered pair collides.
    fn is_state_valid(&self, self_collision: bool) -> Result<bool, CollisionError>;

    /// `true` if the two named objects do not collide. Ignores the allowed
    /// collision matrix.
    fn is_pair_collision_free(&self, a: &str, b: &str) -> Result<bool, CollisionError>;

    /// One proxy per filtered pair, in enumeration order.
    fn distances(&self, self_collision: bool) -> Result<Vec<CollisionProxy>, CollisionError>;

    /// Distance between the two named objects, ignoring the matrix.
    fn pair_distance(&self, a: &str, b: &str) -> Result<CollisionProxy, CollisionError>;

    fn robot_link_names(&self) -> Vec<&str>;

    fn world_object_names(&self) -> Vec<&str>;
}

pub struct CollisionWorld<N: NarrowPhase> {
    narrow: N,
    cache: GeometryCache<N::Shape>,
    acm: AllowedCollisionMatrix,
    config: CollisionConfig,
}

impl<N: NarrowPhase> CollisionWorld<N> {
    #[must_use]
    pub fn new(narrow: N, config: CollisionConfig) -> Self {
        Self {
            narrow,
            cache: GeometryCache::new(),
            acm: AllowedCollisionMatrix::from_config(&config),
            config,
        }
    }

    #[must_use]
    pub fn with_allowed_collisions(mut self, acm: AllowedCollisionMatrix) -> Self {
        self.acm = acm;
        self
    }

    #[must_use]
    pub fn config(&self) -> &CollisionConfig {
        &self.config
    }

    #[must_use]
    pub fn allowed_collisions(&self) -> &AllowedCollisionMatrix {
        &self.acm
    }

    pub fn allowed_collisions_mut(&mut self) -> &mut AllowedCollisionMatrix {
        &mut self.acm
    }

    #[must_use]
    pub fn cache(&self) -> &GeometryCache<N::Shape> {
        &self.cache
    }

    #[must_use]
    pub fn narrow_phase(&self) -> &N {
        &self.narrow
    }

    /// World position of a cached object as of the last sync.
    pub fn translation(&self, name: &str) -> Result<DVec3, CollisionError> {
        self.cache.lookup(name).map(|object| object.pose().translation)
    }

    /// How many pairs a full query with this self-collision setting tests.
    #[must_use]
    pub fn candidate_pair_count(&self, self_collision: bool) -> usize {
        self.pairs().count(self_collision)
    }

    /// The first colliding pair in enumeration order, if any.
    pub fn first_collision(&self, self_collision: bool) -> Result<Option<(String, String)>, CollisionError> {
        let mut validity = ValidityAggregator::new();
        self.dispatcher()
            .check(self.pairs().full_scan(self_collision), &mut validity)?;
        Ok(validity
            .collision()
            .map(|(a, b)| (a.to_owned(), b.to_owned())))
    }

    /// The pair with the smallest signed distance, or `None` if no pair
    /// passes the filter.
    pub fn closest_proxy(&self, self_collision: bool) -> Result<Option<CollisionProxy>, CollisionError> {
        let mut proximity = ProximityAggregator::new();
        self.dispatcher()
            .measure(self.pairs().full_scan(self_collision), &mut proximity)?;
        Ok(proximity.into_closest())
    }

    /// Writes one record per filtered pair into `out` without allocating.
    ///
    /// `out` must hold exactly [`CollisionWorld::candidate_pair_count`]
    /// records; otherwise nothing is written.
    pub fn write_distances(&self, self_collision: bool, out: &mut [ProxyRecord]) -> Result<(), CollisionError> {
        let pairs = self.pairs();
        let expected = pairs.count(self_collision);
        if out.len() != expected {
            return Err(CollisionError::SizeMismatch {
                expected,
                actual: out.len(),
            });
        }

        let dispatcher = self.dispatcher();
        let mut slots = out.iter_mut();
        dispatcher.visit(pairs.full_scan(self_collision), |a, b| {
            let result = dispatcher.distance(a, b)?;
            if let Some(slot) = slots.next() {
                *slot = result.into();
            }
            Ok(ControlFlow::Continue(()))
        })?;
        Ok(())
    }

    fn pairs(&self) -> PairEnumerator<'_, N::Shape> {
        PairEnumerator::new(&self.cache, &self.acm)
    }

    fn dispatcher(&self) -> NarrowPhaseDispatcher<'_, N> {
        NarrowPhaseDispatcher::new(&self.narrow)
    }
}

impl<N: NarrowPhase> CollisionScene for CollisionWorld<N> {
    fn update_objects(&mut self, elements: &[Rc<KinematicElement>]) -> Result<(), CollisionError> {
        self.cache.update_objects(elements, &self.narrow, &self.config)
    }

    fn sync_transforms(&mut self) -> Result<(), CollisionError> {
        self.cache.sync_transforms()
    }

    #[instrument(level = "trace", skip(self))]
    fn is_state_valid(&self, self_collision: bool) -> Result<bool, CollisionError> {
        let mut validity = ValidityAggregator::new();
        self.dispatcher()
            .check(self.pairs().full_scan(self_collision), &mut validity)?;
        if let Some((a, b)) = validity.collision() {
            debug!(a, b, tested = validity.tested(), "state in collision");
        }
        Ok(validity.is_valid())
    }

    fn is_pair_collision_free(&self, a: &str, b: &str) -> Result<bool, CollisionError> {
        let mut validity = ValidityAggregator::new();
        self.dispatcher().check(self.pairs().targeted(a, b)?, &mut validity)?;
        Ok(validity.is_valid())
    }

    #[instrument(level = "trace", skip(self))]
    fn distances(&self, self_collision: bool) -> Result<Vec<CollisionProxy>, CollisionError> {
        let pairs = self.pairs();
        let mut proximity = ProximityAggregator::with_capacity(pairs.count(self_collision));
        self.dispatcher()
            .measure(pairs.full_scan(self_collision), &mut proximity)?;
        if let Some(min) = proximity.min_distance() {
            debug!(pairs = proximity.proxies().len(), min, "distance query");
        }
        Ok(proximity.into_proxies())
    }

    fn pair_distance(&self, a: &str, b: &str) -> Result<CollisionProxy, CollisionError> {
        let (first, second) = (self.cache.lookup(a)?, self.cache.lookup(b)?);
        let result = self.dispatcher().distance(first, second)?;
        Ok(CollisionProxy::new(first.name(), second.name(), result))
    }

    fn robot_link_names(&self) -> Vec<&str> {
        self.cache.names(ObjectCategory::RobotLink)
    }

    fn world_object_names(&self) -> Vec<&str> {
        self.cache.names(ObjectCategory::WorldObject)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geometry::{ConvexNarrowPhase, Pose, ShapeDescriptor};

    fn ball(name: &str, category: ObjectCategory, x: f64) -> Rc<KinematicElement> {
        KinematicElement::new(name, category, Some(ShapeDescriptor::Sphere { radius: 0.5 }))
            .with_pose(Pose::from_translation(DVec3::new(x, 0.0, 0.0)))
            .shared()
    }

    #[test]
    fn test_write_distances_checks_buffer_size() {
        let mut world = CollisionWorld::new(ConvexNarrowPhase::new(), CollisionConfig::default());
        world
            .update_objects(&[
                ball("a", ObjectCategory::RobotLink, 0.0),
                ball("b", ObjectCategory::RobotLink, 2.0),
                ball("wall", ObjectCategory::WorldObject, 5.0),
            ])
            .unwrap();
        assert_eq!(world.candidate_pair_count(true), 3);

        let mut short = [ProxyRecord::default(); 2];
        assert_eq!(
            world.write_distances(true, &mut short).unwrap_err(),
            CollisionError::SizeMismatch {
                expected: 3,
                actual: 2
            }
        );
        assert_eq!(short, [ProxyRecord::default(); 2]);

        let mut out = [ProxyRecord::default(); 3];
        world.write_distances(true, &mut out).unwrap();
        let proxies = world.distances(true).unwrap();
        for (record, proxy) in out.iter().zip(&proxies) {
            assert_eq!(*record, proxy.record());
        }
        assert!((out[0].distance - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_translation_and_first_collision() {
        let mut world = CollisionWorld::new(ConvexNarrowPhase::new(), CollisionConfig::default());
        world
            .update_objects(&[
                ball("a", ObjectCategory::RobotLink, 0.0),
                ball("wall", ObjectCategory::WorldObject, 0.5),
            ])
            .unwrap();

        assert_eq!(world.translation("wall").unwrap(), DVec3::new(0.5, 0.0, 0.0));
        assert_eq!(
            world.first_collision(true).unwrap(),
            Some(("a".to_owned(), "wall".to_owned()))
        );
        let closest = world.closest_proxy(true).unwrap().unwrap();
        assert!((closest.distance + 0.5).abs() < 1e-12);
    }
}
