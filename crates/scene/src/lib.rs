#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
//! Scene files for the collision engine.
//!
//! A scene file describes a set of kinematic elements, the collision
//! configuration, extra allowed-collision entries and an optional sequence
//! of pose steps to replay. [`SceneFile::into_scene`] turns it into a
//! populated [`CollisionWorld`] plus the shared elements that drive it.

use std::collections::BTreeMap;
use std::path::Path;
use std::rc::Rc;

use anyhow::{bail, Context, Result};
use collision::{
    AllowedCollisionMatrix, CollisionConfig, CollisionScene, CollisionWorld, KinematicElement, ObjectCategory,
};
use geometry::{ConvexNarrowPhase, Pose, ShapeDescriptor};
use glam::{DQuat, DVec3};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct SceneFile {
    #[serde(default)]
    pub config: CollisionConfig,
    #[serde(default)]
    pub allowed_collisions: Vec<[String; 2]>,
    pub objects: Vec<ObjectDef>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
pub struct ObjectDef {
    pub name: String,
    pub category: ObjectCategory,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub shape: Option<ShapeDescriptor>,
    #[serde(flatten)]
    pub pose: PoseDef,
}

/// Position plus an `[x, y, z, w]` quaternion.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PoseDef {
    #[serde(default)]
    pub position: [f64; 3],
    #[serde(default = "identity_orientation")]
    pub orientation: [f64; 4],
}

#[derive(Debug, Deserialize)]
pub struct Step {
    pub poses: BTreeMap<String, PoseDef>,
}

fn identity_orientation() -> [f64; 4] {
    [0.0, 0.0, 0.0, 1.0]
}

impl PoseDef {
    #[must_use]
    pub fn to_pose(&self) -> Pose {
        Pose::new(DVec3::from_array(self.position), DQuat::from_array(self.orientation))
    }
}

impl SceneFile {
    pub fn parse(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        Self::parse(&json).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn into_scene(self) -> Result<Scene> {
        let mut elements = Vec::with_capacity(self.objects.len());
        for def in self.objects {
            let mut element = KinematicElement::new(def.name, def.category, def.shape).with_pose(def.pose.to_pose());
            if let Some(parent) = def.parent {
                element = element.with_parent(parent);
            }
            elements.push(element.shared());
        }
        let known = |name: &str| elements.iter().any(|e| e.name() == name);

        for element in &elements {
            if let Some(parent) = element.parent() {
                if !known(parent) {
                    bail!("object {} has unknown parent {}", element.name(), parent);
                }
            }
        }

        let mut acm = AllowedCollisionMatrix::from_config(&self.config);
        for [a, b] in &self.allowed_collisions {
            for name in [a, b] {
                if !known(name.as_str()) {
                    bail!("allowed collision entry names unknown object {name}");
                }
            }
            acm.ignore(a, b);
        }

        for (i, step) in self.steps.iter().enumerate() {
            if let Some(name) = step.poses.keys().find(|name| !known(name.as_str())) {
                bail!("step {i} moves unknown object {name}");
            }
        }

        let mut world = CollisionWorld::new(ConvexNarrowPhase::new(), self.config).with_allowed_collisions(acm);
        world.update_objects(&elements)?;
        info!(
            objects = elements.len(),
            robot_links = world.robot_link_names().len(),
            world_objects = world.world_object_names().len(),
            steps = self.steps.len(),
            "scene loaded"
        );

        let elements = elements
            .into_iter()
            .map(|element| (element.name().to_owned(), element))
            .collect();
        Ok(Scene {
            world,
            elements,
            steps: self.steps,
        })
    }
}

/// A loaded scene: the collision world and the elements that feed it.
pub struct Scene {
    world: CollisionWorld<ConvexNarrowPhase>,
    elements: BTreeMap<String, Rc<KinematicElement>>,
    steps: Vec<Step>,
}

impl Scene {
    #[must_use]
    pub fn world(&self) -> &CollisionWorld<ConvexNarrowPhase> {
        &self.world
    }

    #[must_use]
    pub fn element(&self, name: &str) -> Option<&Rc<KinematicElement>> {
        self.elements.get(name)
    }

    #[must_use]
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Publishes the poses of step `index` and syncs the world.
    pub fn apply_step(&mut self, index: usize) -> Result<()> {
        let Some(step) = self.steps.get(index) else {
            bail!("scene has {} steps, no step {index}", self.steps.len());
        };
        for (name, pose) in &step.poses {
            if let Some(element) = self.elements.get(name) {
                element.set_pose(pose.to_pose());
            }
        }
        self.world.sync_transforms()?;
        Ok(())
    }
}
