//! GJK distance and intersection queries for convex support mappings

use glam::DVec3;

use super::simplex::{Simplex, SupportPoint};
use super::PairDistance;
use crate::pose::Pose;
use crate::shape::Shape;

const MAX_ITERATIONS: usize = 64;
/// Relative gap between the upper and lower distance bounds at which the
/// search stops.
const REL_TOLERANCE: f64 = 1e-10;
/// Squared distance under which the shapes are considered overlapping.
const OVERLAP_EPS_SQ: f64 = 1e-20;

/// Two posed shapes viewed as their Minkowski difference `A - B`.
pub(crate) struct MinkowskiPair<'s> {
    a: &'s Shape,
    pose_a: &'s Pose,
    b: &'s Shape,
    pose_b: &'s Pose,
}

impl<'s> MinkowskiPair<'s> {
    pub fn new(a: &'s Shape, pose_a: &'s Pose, b: &'s Shape, pose_b: &'s Pose) -> Self {
        Self {
            a,
            pose_a,
            b,
            pose_b,
        }
    }

    pub fn support(&self, dir: DVec3) -> SupportPoint {
        let a = self.a.support(self.pose_a, dir);
        let b = self.b.support(self.pose_b, -dir);
        SupportPoint { w: a - b, a, b }
    }

    /// Start direction: from B's origin towards A's origin.
    fn initial_direction(&self) -> DVec3 {
        (self.pose_a.translation - self.pose_b.translation)
            .try_normalize()
            .unwrap_or(DVec3::X)
    }
}

pub(crate) enum GjkOutcome {
    Separated(PairDistance),
    /// The final simplex encloses (or touches) the origin; it seeds EPA.
    Overlapping(Simplex),
}

pub(crate) fn closest_points(pair: &MinkowskiPair<'_>) -> GjkOutcome {
    let mut simplex = Simplex::new(pair.support(pair.initial_direction()));
    let mut v = simplex.reduce();

    for _ in 0..MAX_ITERATIONS {
        let vv = v.length_squared();
        if vv < OVERLAP_EPS_SQ {
            return GjkOutcome::Overlapping(simplex);
        }

        let s = pair.support(-v);
        if vv - v.dot(s.w) <= REL_TOLERANCE * vv {
            break;
        }

        simplex.push(s);
        v = simplex.reduce();
        if simplex.len() == 4 {
            return GjkOutcome::Overlapping(simplex);
        }
    }

    let (point_a, point_b) = simplex.witnesses();
    let distance = v.length();
    GjkOutcome::Separated(PairDistance {
        distance,
        point_a,
        point_b,
        normal: -v / distance,
    })
}

/// Boolean variant that stops as soon as a separating axis shows up.
pub(crate) fn intersects(pair: &MinkowskiPair<'_>) -> bool {
    let mut simplex = Simplex::new(pair.support(pair.initial_direction()));
    let mut v = simplex.reduce();

    for _ in 0..MAX_ITERATIONS {
        let vv = v.length_squared();
        if vv < OVERLAP_EPS_SQ {
            return true;
        }

        let s = pair.support(-v);
        if v.dot(s.w) > 0.0 {
            return false;
        }
        if vv - v.dot(s.w) <= REL_TOLERANCE * vv {
            return false;
        }

        simplex.push(s);
        v = simplex.reduce();
        if simplex.len() == 4 {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::ShapeDescriptor;
    use glam::DQuat;
    use std::f64::consts::FRAC_PI_4;

    fn cuboid(h: f64) -> Shape {
        Shape::from_descriptor(&ShapeDescriptor::Cuboid {
            half_extents: DVec3::splat(h),
        })
        .unwrap()
    }

    #[test]
    fn test_gjk_cuboids_separated_along_x() {
        let box_shape = cuboid(0.5);
        let pa = Pose::identity();
        let pb = Pose::from_translation(DVec3::new(2.0, 0.25, 0.0));
        let pair = MinkowskiPair::new(&box_shape, &pa, &box_shape, &pb);

        let GjkOutcome::Separated(d) = closest_points(&pair) else {
            panic!("expected separated cuboids");
        };
        assert!((d.distance - 1.0).abs() < 1e-9);
        assert!((d.normal - DVec3::X).length() < 1e-9);
        assert!((d.point_a.x - 0.5).abs() < 1e-9);
        assert!((d.point_b.x - 1.5).abs() < 1e-9);
        assert!(!intersects(&pair));
    }

    #[test]
    fn test_gjk_rotated_cuboid_edge() {
        let box_shape = cuboid(0.5);
        let pa = Pose::identity();
        // Edge of B (rotated 45 degrees about z) points back at A
        let pb = Pose::new(DVec3::new(2.0, 0.0, 0.0), DQuat::from_rotation_z(FRAC_PI_4));
        let pair = MinkowskiPair::new(&box_shape, &pa, &box_shape, &pb);

        let GjkOutcome::Separated(d) = closest_points(&pair) else {
            panic!("expected separated cuboids");
        };
        let expected = 2.0 - 0.5 - 0.5 * 2.0_f64.sqrt();
        assert!((d.distance - expected).abs() < 1e-9);
    }

    #[test]
    fn test_gjk_overlapping_cuboids() {
        let box_shape = cuboid(0.5);
        let pa = Pose::identity();
        let pb = Pose::from_translation(DVec3::new(0.6, 0.1, 0.2));
        let pair = MinkowskiPair::new(&box_shape, &pa, &box_shape, &pb);

        assert!(intersects(&pair));
        assert!(matches!(closest_points(&pair), GjkOutcome::Overlapping(_)));
    }
}
