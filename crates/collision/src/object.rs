use std::rc::{Rc, Weak};

use geometry::Pose;

use crate::error::CollisionError;
use crate::kinematics::{KinematicElement, ObjectCategory};

/// One cached collision object: a built shape plus the identity and the
/// last synced pose of the element it was built from.
#[derive(Debug)]
pub struct CollisionObject<S> {
    name: String,
    category: ObjectCategory,
    parent: Option<String>,
    shape: S,
    pose: Pose,
    source: Weak<KinematicElement>,
}

impl<S> CollisionObject<S> {
    pub(crate) fn new(element: &Rc<KinematicElement>, shape: S) -> Self {
        Self {
            name: element.name().to_owned(),
            category: element.category(),
            parent: element.parent().map(str::to_owned),
            shape,
            pose: element.pose(),
            source: Rc::downgrade(element),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn category(&self) -> ObjectCategory {
        self.category
    }

    #[must_use]
    pub fn is_robot_link(&self) -> bool {
        self.category == ObjectCategory::RobotLink
    }

    #[must_use]
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    #[must_use]
    pub fn shape(&self) -> &S {
        &self.shape
    }

    #[must_use]
    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    /// `true` if either object is the other's kinematic parent.
    #[must_use]
    pub fn is_adjacent_to(&self, other: &Self) -> bool {
        self.parent.as_deref() == Some(other.name.as_str())
            || other.parent.as_deref() == Some(self.name.as_str())
    }

    /// Copies the element's current pose into the cache.
    pub(crate) fn sync(&mut self) -> Result<(), CollisionError> {
        let element = self
            .source
            .upgrade()
            .ok_or_else(|| CollisionError::DetachedElement(self.name.clone()))?;
        self.pose = element.pose();
        Ok(())
    }
}
