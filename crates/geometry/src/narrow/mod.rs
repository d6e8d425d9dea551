//! Narrow-phase queries between two posed shapes
//!
//! [`NarrowPhase`] is the only surface the collision engine sees. The
//! reference [`ConvexNarrowPhase`] routes each pair through a table of
//! closed-form detectors indexed by shape-type pair and falls back to GJK
//! (and EPA for penetrating pairs) for every other convex combination.

mod closed_form;
mod epa;
mod gjk;
mod simplex;

use std::collections::HashMap;

use glam::DVec3;

use crate::error::GeometryError;
use crate::pose::Pose;
use crate::shape::{Shape, ShapeDescriptor, ShapeType};

use gjk::{GjkOutcome, MinkowskiPair};

/// Result of a pairwise distance query.
///
/// `distance` is negative when the shapes overlap. `normal` is the unit
/// vector from A towards B and `point_b ≈ point_a + distance * normal`.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PairDistance {
    pub distance: f64,
    pub point_a: DVec3,
    pub point_b: DVec3,
    pub normal: DVec3,
}

impl PairDistance {
    /// The same result seen from B towards A.
    #[must_use]
    pub fn flipped(self) -> Self {
        Self {
            distance: self.distance,
            point_a: self.point_b,
            point_b: self.point_a,
            normal: -self.normal,
        }
    }

    /// Touching counts as colliding.
    #[must_use]
    pub fn is_colliding(&self) -> bool {
        self.distance <= 0.0
    }
}

/// Pairwise collision and distance primitive.
///
/// Implementations must be side-effect free: the engine may call them in any
/// order, any number of times, and expects identical answers for identical
/// inputs.
pub trait NarrowPhase {
    /// Native shape handle owned by the engine's cache.
    type Shape;

    fn build_shape(&self, descriptor: &ShapeDescriptor) -> Result<Self::Shape, GeometryError>;

    fn test_pair_collision(
        &self,
        a: &Self::Shape,
        pose_a: &Pose,
        b: &Self::Shape,
        pose_b: &Pose,
    ) -> Result<bool, GeometryError>;

    fn compute_pair_distance(
        &self,
        a: &Self::Shape,
        pose_a: &Pose,
        b: &Self::Shape,
        pose_b: &Pose,
    ) -> Result<PairDistance, GeometryError>;
}

/// Function type for a closed-form distance detector. Returns `None` if the
/// shapes are not of the kinds the detector was registered for.
type DistanceDetector = fn(&Shape, &Pose, &Shape, &Pose) -> Option<PairDistance>;

#[derive(Clone, Copy)]
struct Registration {
    detector: DistanceDetector,
    /// The detector expects its arguments in the opposite order.
    swapped: bool,
}

/// Reference narrow phase for convex primitives and half-spaces.
pub struct ConvexNarrowPhase {
    detectors: HashMap<(ShapeType, ShapeType), Registration>,
}

impl ConvexNarrowPhase {
    #[must_use]
    pub fn new() -> Self {
        let mut narrow = Self {
            detectors: HashMap::new(),
        };
        narrow.register_detectors();
        narrow
    }

    fn register_detectors(&mut self) {
        use ShapeType::{Capsule, ConvexHull, Cuboid, Cylinder, HalfSpace, Sphere};

        self.register(Sphere, Sphere, closed_form::sphere_sphere);
        self.register(Sphere, Capsule, closed_form::sphere_capsule);
        self.register(Capsule, Capsule, closed_form::capsule_capsule);
        self.register(Sphere, Cuboid, closed_form::sphere_cuboid);

        for convex in [Sphere, Cuboid, Capsule, Cylinder, ConvexHull] {
            self.register(convex, HalfSpace, closed_form::convex_half_space);
        }
    }

    /// Registers `detector` for `(type_a, type_b)` and, flipped, for the
    /// reverse ordering.
    fn register(&mut self, type_a: ShapeType, type_b: ShapeType, detector: DistanceDetector) {
        self.detectors.insert(
            (type_a, type_b),
            Registration {
                detector,
                swapped: false,
            },
        );
        if type_a != type_b {
            self.detectors.insert(
                (type_b, type_a),
                Registration {
                    detector,
                    swapped: true,
                },
            );
        }
    }

    fn closed_form(
        &self,
        a: &Shape,
        pose_a: &Pose,
        b: &Shape,
        pose_b: &Pose,
    ) -> Option<PairDistance> {
        let reg = self.detectors.get(&(a.shape_type(), b.shape_type()))?;
        if reg.swapped {
            (reg.detector)(b, pose_b, a, pose_a).map(PairDistance::flipped)
        } else {
            (reg.detector)(a, pose_a, b, pose_b)
        }
    }
}

impl Default for ConvexNarrowPhase {
    fn default() -> Self {
        Self::new()
    }
}

fn ensure_convex_pair(a: &Shape, b: &Shape) -> Result<(), GeometryError> {
    if a.shape_type() == ShapeType::HalfSpace || b.shape_type() == ShapeType::HalfSpace {
        Err(GeometryError::UnsupportedPair(a.shape_type(), b.shape_type()))
    } else {
        Ok(())
    }
}

impl NarrowPhase for ConvexNarrowPhase {
    type Shape = Shape;

    fn build_shape(&self, descriptor: &ShapeDescriptor) -> Result<Shape, GeometryError> {
        Shape::from_descriptor(descriptor)
    }

    fn test_pair_collision(
        &self,
        a: &Shape,
        pose_a: &Pose,
        b: &Shape,
        pose_b: &Pose,
    ) -> Result<bool, GeometryError> {
        if let Some(d) = self.closed_form(a, pose_a, b, pose_b) {
            return Ok(d.is_colliding());
        }
        ensure_convex_pair(a, b)?;
        Ok(gjk::intersects(&MinkowskiPair::new(a, pose_a, b, pose_b)))
    }

    fn compute_pair_distance(
        &self,
        a: &Shape,
        pose_a: &Pose,
        b: &Shape,
        pose_b: &Pose,
    ) -> Result<PairDistance, GeometryError> {
        if let Some(d) = self.closed_form(a, pose_a, b, pose_b) {
            return Ok(d);
        }
        ensure_convex_pair(a, b)?;

        let pair = MinkowskiPair::new(a, pose_a, b, pose_b);
        match gjk::closest_points(&pair) {
            GjkOutcome::Separated(d) => Ok(d),
            GjkOutcome::Overlapping(simplex) => epa::penetration(&pair, &simplex).ok_or_else(|| {
                tracing::debug!(a = ?a.shape_type(), b = ?b.shape_type(), "no penetration polytope");
                GeometryError::Degenerate(a.shape_type(), b.shape_type())
            }),
        }
    }
}
