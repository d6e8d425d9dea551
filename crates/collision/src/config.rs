//! Collision scene configuration
//!
//! Mirrors the knobs a planning problem sets on its collision scene. All
//! fields have defaults so a scene file only needs to name what it changes.

use geometry::ShapeDescriptor;
use serde::{Deserialize, Serialize};

use crate::kinematics::ObjectCategory;

/// What `update_objects` does when a shape cannot be built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeFailurePolicy {
    /// Fail the whole rebuild and keep the previous cache.
    #[default]
    Abort,
    /// Leave the element out and log a warning.
    Skip,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// Default for callers that do not choose per query.
    pub self_collision: bool,
    /// Test world objects against each other.
    pub world_collisions: bool,
    /// Skip pairs where one element is the other's kinematic parent.
    pub skip_adjacent_links: bool,
    pub robot_link_scale: f64,
    pub world_link_scale: f64,
    /// Grows radii, half extents and hull margins of robot links.
    pub robot_link_padding: f64,
    pub world_link_padding: f64,
    pub replace_cylinders_with_capsules: bool,
    pub shape_failure: ShapeFailurePolicy,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            self_collision: true,
            world_collisions: false,
            skip_adjacent_links: true,
            robot_link_scale: 1.0,
            world_link_scale: 1.0,
            robot_link_padding: 0.0,
            world_link_padding: 0.0,
            replace_cylinders_with_capsules: false,
            shape_failure: ShapeFailurePolicy::Abort,
        }
    }
}

impl CollisionConfig {
    /// Applies the category's scale and padding (and the cylinder
    /// replacement) to a descriptor before it is turned into a shape.
    #[must_use]
    pub fn prepare_shape(&self, descriptor: &ShapeDescriptor, category: ObjectCategory) -> ShapeDescriptor {
        let (scale, padding) = match category {
            ObjectCategory::RobotLink => (self.robot_link_scale, self.robot_link_padding),
            ObjectCategory::WorldObject => (self.world_link_scale, self.world_link_padding),
        };
        let prepared = descriptor.inflated(scale, padding);
        if self.replace_cylinders_with_capsules {
            prepared.capsule_for_cylinder()
        } else {
            prepared
        }
    }
}
