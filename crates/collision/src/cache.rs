//! Geometry cache
//!
//! Holds one [`CollisionObject`] per shaped kinematic element, sorted by
//! name so lookups are a binary search and pair enumeration order only
//! depends on the set of names. Shapes are built once per
//! [`GeometryCache::update_objects`]; pose syncs never touch them.

use std::collections::HashSet;
use std::rc::Rc;

use geometry::NarrowPhase;
use tracing::{debug, warn};

use crate::config::{CollisionConfig, ShapeFailurePolicy};
use crate::error::CollisionError;
use crate::kinematics::{KinematicElement, ObjectCategory};
use crate::object::CollisionObject;

#[derive(Debug)]
pub struct GeometryCache<S> {
    objects: Vec<CollisionObject<S>>,
}

impl<S> Default for GeometryCache<S> {
    fn default() -> Self {
        Self { objects: Vec::new() }
    }
}

impl<S> GeometryCache<S> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the cache with objects built from `elements`.
    ///
    /// The new cache is assembled on the side and swapped in only once
    /// every shape has been built, so on error the previous contents are
    /// still in place. Elements without a shape are not cached.
    ///
    /// Only weak references are kept, so the caller must hold every
    /// element alive while it is cached, including ones that never move.
    pub fn update_objects<N>(
        &mut self,
        elements: &[Rc<KinematicElement>],
        narrow: &N,
        config: &CollisionConfig,
    ) -> Result<(), CollisionError>
    where
        N: NarrowPhase<Shape = S>,
    {
        let mut seen = HashSet::with_capacity(elements.len());
        for element in elements {
            if !seen.insert(element.name()) {
                return Err(CollisionError::DuplicateName(element.name().to_owned()));
            }
        }

        let mut objects = Vec::with_capacity(elements.len());
        for element in elements {
            let Some(descriptor) = element.shape() else {
                continue;
            };
            let descriptor = config.prepare_shape(descriptor, element.category());
            match narrow.build_shape(&descriptor) {
                Ok(shape) => objects.push(CollisionObject::new(element, shape)),
                Err(source) => match config.shape_failure {
                    ShapeFailurePolicy::Abort => {
                        return Err(CollisionError::ShapeConstruction {
                            name: element.name().to_owned(),
                            source,
                        });
                    }
                    ShapeFailurePolicy::Skip => {
                        warn!(name = element.name(), error = %source, "skipping element without a usable shape");
                    }
                },
            }
        }
        objects.sort_by(|a, b| a.name().cmp(b.name()));

        self.objects = objects;
        debug!(
            robot_links = self.count(ObjectCategory::RobotLink),
            world_objects = self.count(ObjectCategory::WorldObject),
            "rebuilt collision cache"
        );
        Ok(())
    }

    /// Pulls the current pose of every cached element. Does not allocate.
    pub fn sync_transforms(&mut self) -> Result<(), CollisionError> {
        for object in &mut self.objects {
            object.sync()?;
        }
        Ok(())
    }

    pub fn index_of(&self, name: &str) -> Result<usize, CollisionError> {
        self.objects
            .binary_search_by(|object| object.name().cmp(name))
            .map_err(|_| CollisionError::UnknownObject(name.to_owned()))
    }

    pub fn lookup(&self, name: &str) -> Result<&CollisionObject<S>, CollisionError> {
        self.index_of(name).map(|i| &self.objects[i])
    }

    #[must_use]
    pub fn objects(&self) -> &[CollisionObject<S>] {
        &self.objects
    }

    /// Names of the cached objects in `category`, in name order.
    #[must_use]
    pub fn names(&self, category: ObjectCategory) -> Vec<&str> {
        self.objects
            .iter()
            .filter(|object| object.category() == category)
            .map(CollisionObject::name)
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    fn count(&self, category: ObjectCategory) -> usize {
        self.objects
            .iter()
            .filter(|object| object.category() == category)
            .count()
    }
}
