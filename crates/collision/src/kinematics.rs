//! Kinematic elements as seen by the collision engine
//!
//! The kinematics provider owns its elements and republishes their poses
//! after every forward-kinematics pass. The engine only ever holds a
//! [`Weak`](std::rc::Weak) back-reference and reads the latest pose when
//! asked to sync.

use std::cell::Cell;
use std::rc::Rc;

use geometry::{Pose, ShapeDescriptor};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectCategory {
    RobotLink,
    WorldObject,
}

/// A named frame of the kinematic tree, optionally carrying collision
/// geometry.
#[derive(Debug)]
pub struct KinematicElement {
    name: String,
    category: ObjectCategory,
    shape: Option<ShapeDescriptor>,
    parent: Option<String>,
    pose: Cell<Pose>,
}

impl KinematicElement {
    #[must_use]
    pub fn new(name: impl Into<String>, category: ObjectCategory, shape: Option<ShapeDescriptor>) -> Self {
        Self {
            name: name.into(),
            category,
            shape,
            parent: None,
            pose: Cell::new(Pose::identity()),
        }
    }

    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    #[must_use]
    pub fn with_pose(self, pose: Pose) -> Self {
        self.pose.set(pose);
        self
    }

    #[must_use]
    pub fn shared(self) -> Rc<Self> {
        Rc::new(self)
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
    pub fn shape(&self) -> Option<&ShapeDescriptor> {
        self.shape.as_ref()
    }

    #[must_use]
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Current world pose.
    #[must_use]
    pub fn pose(&self) -> Pose {
        self.pose.get()
    }

    /// Publishes a new world pose. Cached collision objects pick it up on
    /// the next sync.
    pub fn set_pose(&self, pose: Pose) {
        self.pose.set(pose);
    }
}
