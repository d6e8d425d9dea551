//! Candidate pair enumeration
//!
//! A full scan walks the cache's name-sorted objects as `(i, j)` with
//! `i < j`, so every unordered pair comes up exactly once and in the same
//! order every time. The allowed collision matrix drops what should not be
//! tested. A targeted query yields exactly the requested pair and is not
//! filtered.

use std::iter::FusedIterator;

use crate::acm::AllowedCollisionMatrix;
use crate::cache::GeometryCache;
use crate::error::CollisionError;
use crate::object::CollisionObject;

pub type ObjectPair<'c, S> = (&'c CollisionObject<S>, &'c CollisionObject<S>);

pub struct PairEnumerator<'c, S> {
    cache: &'c GeometryCache<S>,
    acm: &'c AllowedCollisionMatrix,
}

impl<'c, S> PairEnumerator<'c, S> {
    #[must_use]
    pub fn new(cache: &'c GeometryCache<S>, acm: &'c AllowedCollisionMatrix) -> Self {
        Self { cache, acm }
    }

    /// Every pair the matrix lets through. Calling this again restarts the
    /// scan from the first pair.
    #[must_use]
    pub fn full_scan(&self, self_collision: bool) -> CandidatePairs<'c, S> {
        CandidatePairs {
            objects: self.cache.objects(),
            acm: self.acm,
            self_collision,
            i: 0,
            j: 1,
        }
    }

    /// Exactly the pair `(a, b)`, in that order.
    pub fn targeted(&self, a: &str, b: &str) -> Result<std::iter::Once<ObjectPair<'c, S>>, CollisionError> {
        let first = self.cache.lookup(a)?;
        let second = self.cache.lookup(b)?;
        Ok(std::iter::once((first, second)))
    }

    /// Number of pairs a full scan yields.
    #[must_use]
    pub fn count(&self, self_collision: bool) -> usize {
        self.full_scan(self_collision).count()
    }
}

/// Iterator over the filtered pairs of one full scan.
pub struct CandidatePairs<'c, S> {
    objects: &'c [CollisionObject<S>],
    acm: &'c AllowedCollisionMatrix,
    self_collision: bool,
    i: usize,
    j: usize,
}

impl<S> Clone for CandidatePairs<'_, S> {
    fn clone(&self) -> Self {
        Self {
            objects: self.objects,
            acm: self.acm,
            self_collision: self.self_collision,
            i: self.i,
            j: self.j,
        }
    }
}

impl<'c, S> Iterator for CandidatePairs<'c, S> {
    type Item = ObjectPair<'c, S>;

    fn next(&mut self) -> Option<Self::Item> {
        let n = self.objects.len();
        while self.i < n {
            if self.j >= n {
                self.i += 1;
                self.j = self.i + 1;
                continue;
            }
            let a = &self.objects[self.i];
            let b = &self.objects[self.j];
            self.j += 1;
            if self.acm.should_test(a, b, self.self_collision) {
                return Some((a, b));
            }
        }
        None
    }
}

impl<S> FusedIterator for CandidatePairs<'_, S> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CollisionConfig;
    use crate::kinematics::{KinematicElement, ObjectCategory};
    use geometry::{ConvexNarrowPhase, Shape, ShapeDescriptor};
    use std::rc::Rc;

    fn cache(names: &[(&str, ObjectCategory)]) -> GeometryCache<Shape> {
        let elements: Vec<_> = names
            .iter()
            .map(|(name, category)| {
                Rc::new(KinematicElement::new(
                    *name,
                    *category,
                    Some(ShapeDescriptor::Sphere { radius: 0.1 }),
                ))
            })
            .collect();
        let mut cache = GeometryCache::new();
        cache
            .update_objects(&elements, &ConvexNarrowPhase::new(), &CollisionConfig::default())
            .unwrap();
        cache
    }

    fn names<'c>(pairs: impl Iterator<Item = ObjectPair<'c, Shape>>) -> Vec<(&'c str, &'c str)> {
        pairs.map(|(a, b)| (a.name(), b.name())).collect()
    }

    #[test]
    fn test_full_scan_order_is_deterministic() {
        let cache = cache(&[
            ("c", ObjectCategory::RobotLink),
            ("a", ObjectCategory::RobotLink),
            ("b", ObjectCategory::RobotLink),
            ("box", ObjectCategory::WorldObject),
        ]);
        let acm = AllowedCollisionMatrix::default();
        let pairs = PairEnumerator::new(&cache, &acm);

        let first = names(pairs.full_scan(true));
        assert_eq!(
            first,
            [("a", "b"), ("a", "box"), ("a", "c"), ("b", "box"), ("b", "c"), ("box", "c")]
        );
        assert_eq!(names(pairs.full_scan(true)), first);
        assert_eq!(pairs.count(true), 6);

        assert_eq!(names(pairs.full_scan(false)), [("a", "box"), ("b", "box"), ("box", "c")]);
    }

    #[test]
    fn test_empty_and_single_object_caches() {
        let acm = AllowedCollisionMatrix::default();
        let empty = GeometryCache::<Shape>::new();
        assert_eq!(PairEnumerator::new(&empty, &acm).count(true), 0);

        let one = cache(&[("solo", ObjectCategory::RobotLink)]);
        assert_eq!(PairEnumerator::new(&one, &acm).count(true), 0);
    }

    #[test]
    fn test_targeted_bypasses_filter() {
        let cache = cache(&[("table", ObjectCategory::WorldObject), ("shelf", ObjectCategory::WorldObject)]);
        let mut acm = AllowedCollisionMatrix::default();
        acm.ignore("table", "shelf");
        let pairs = PairEnumerator::new(&cache, &acm);

        assert_eq!(pairs.count(true), 0);
        assert_eq!(names(pairs.targeted("table", "shelf").unwrap()), [("table", "shelf")]);
        assert_eq!(
            pairs.targeted("table", "chair").unwrap_err(),
            CollisionError::UnknownObject("chair".into())
        );
    }
}
