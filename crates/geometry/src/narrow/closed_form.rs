//! Closed-form distance detectors for the common primitive pairs

use glam::DVec3;

use super::PairDistance;
use crate::pose::Pose;
use crate::shape::{Shape, ShapeDescriptor};

fn sphere_radius(shape: &Shape) -> Option<f64> {
    match shape.descriptor() {
        ShapeDescriptor::Sphere { radius } => Some(*radius),
        _ => None,
    }
}

/// World-space segment endpoints and radius of a capsule.
fn capsule_segment(shape: &Shape, pose: &Pose) -> Option<(DVec3, DVec3, f64)> {
    match shape.descriptor() {
        ShapeDescriptor::Capsule {
            radius,
            half_length,
        } => {
            let axis = DVec3::new(0.0, 0.0, *half_length);
            Some((
                pose.transform_point(-axis),
                pose.transform_point(axis),
                *radius,
            ))
        }
        _ => None,
    }
}

/// Distance between two spheres given their world centers. Every
/// sphere-swept pair (capsules included) reduces to this once the closest
/// core points are known.
fn between_spheres(center_a: DVec3, radius_a: f64, center_b: DVec3, radius_b: f64) -> PairDistance {
    let delta = center_b - center_a;
    let len = delta.length();
    // Concentric centers have no preferred direction
    let normal = if len > 1e-12 { delta / len } else { DVec3::Z };
    PairDistance {
        distance: len - radius_a - radius_b,
        point_a: center_a + normal * radius_a,
        point_b: center_b - normal * radius_b,
        normal,
    }
}

pub(super) fn sphere_sphere(a: &Shape, pa: &Pose, b: &Shape, pb: &Pose) -> Option<PairDistance> {
    Some(between_spheres(
        pa.translation,
        sphere_radius(a)?,
        pb.translation,
        sphere_radius(b)?,
    ))
}

pub(super) fn sphere_capsule(a: &Shape, pa: &Pose, b: &Shape, pb: &Pose) -> Option<PairDistance> {
    let ra = sphere_radius(a)?;
    let (p0, p1, rb) = capsule_segment(b, pb)?;
    let q = closest_point_on_segment(pa.translation, p0, p1);
    Some(between_spheres(pa.translation, ra, q, rb))
}

pub(super) fn capsule_capsule(a: &Shape, pa: &Pose, b: &Shape, pb: &Pose) -> Option<PairDistance> {
    let (p1, q1, ra) = capsule_segment(a, pa)?;
    let (p2, q2, rb) = capsule_segment(b, pb)?;
    let (c1, c2) = closest_points_segment_segment(p1, q1, p2, q2);
    Some(between_spheres(c1, ra, c2, rb))
}

pub(super) fn sphere_cuboid(a: &Shape, pa: &Pose, b: &Shape, pb: &Pose) -> Option<PairDistance> {
    let radius = sphere_radius(a)?;
    let ShapeDescriptor::Cuboid { half_extents } = b.descriptor() else {
        return None;
    };

    let center = pa.translation;
    let local = pb.inverse_transform_point(center);
    let clamped = local.clamp(-*half_extents, *half_extents);
    let delta = clamped - local;
    let len = delta.length();

    if len > 1e-12 {
        let normal = pb.transform_vector(delta / len);
        return Some(PairDistance {
            distance: len - radius,
            point_a: center + normal * radius,
            point_b: pb.transform_point(clamped),
            normal,
        });
    }

    // Center inside the box: leave through the nearest face
    let gaps = *half_extents - local.abs();
    let axis = if gaps.x <= gaps.y && gaps.x <= gaps.z {
        DVec3::X * local.x.signum()
    } else if gaps.y <= gaps.z {
        DVec3::Y * local.y.signum()
    } else {
        DVec3::Z * local.z.signum()
    };
    let gap = gaps.min_element();
    let face = pb.transform_vector(axis);
    Some(PairDistance {
        distance: -(gap + radius),
        point_a: center - face * radius,
        point_b: center + face * gap,
        normal: -face,
    })
}

/// Any convex shape `a` against the half-space `b`.
pub(super) fn convex_half_space(
    a: &Shape,
    pa: &Pose,
    b: &Shape,
    pb: &Pose,
) -> Option<PairDistance> {
    let ShapeDescriptor::HalfSpace { normal, offset } = b.descriptor() else {
        return None;
    };
    let m = pb.transform_vector(*normal);
    let boundary = offset + m.dot(pb.translation);

    let deepest = a.support(pa, -m);
    let distance = m.dot(deepest) - boundary;
    Some(PairDistance {
        distance,
        point_a: deepest,
        point_b: deepest - m * distance,
        normal: -m,
    })
}

fn closest_point_on_segment(p: DVec3, a: DVec3, b: DVec3) -> DVec3 {
    let ab = b - a;
    let denom = ab.length_squared();
    if denom < 1e-24 {
        return a;
    }
    let t = ((p - a).dot(ab) / denom).clamp(0.0, 1.0);
    a + ab * t
}

/// Closest points between segments `p1-q1` and `p2-q2`.
fn closest_points_segment_segment(p1: DVec3, q1: DVec3, p2: DVec3, q2: DVec3) -> (DVec3, DVec3) {
    const EPS: f64 = 1e-24;
    let d1 = q1 - p1;
    let d2 = q2 - p2;
    let r = p1 - p2;
    let a = d1.length_squared();
    let e = d2.length_squared();
    let f = d2.dot(r);

    let (s, t) = if a <= EPS && e <= EPS {
        (0.0, 0.0)
    } else if a <= EPS {
        (0.0, (f / e).clamp(0.0, 1.0))
    } else {
        let c = d1.dot(r);
        if e <= EPS {
            ((-c / a).clamp(0.0, 1.0), 0.0)
        } else {
            let b = d1.dot(d2);
            let denom = a * e - b * b;
            // Parallel segments: any s works, pick the start
            let s = if denom > EPS {
                ((b * f - c * e) / denom).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let t = (b * s + f) / e;
            if t < 0.0 {
                ((-c / a).clamp(0.0, 1.0), 0.0)
            } else if t > 1.0 {
                (((b - c) / a).clamp(0.0, 1.0), 1.0)
            } else {
                (s, t)
            }
        }
    };
    (p1 + d1 * s, p2 + d2 * t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DQuat;
    use std::f64::consts::FRAC_PI_2;

    fn shape(d: ShapeDescriptor) -> Shape {
        Shape::from_descriptor(&d).unwrap()
    }

    fn assert_witness_invariant(d: &PairDistance) {
        let expected = d.point_a + d.normal * d.distance;
        assert!(
            (d.point_b - expected).length() < 1e-9,
            "point_b {:?} != point_a + distance * normal {:?}",
            d.point_b,
            expected
        );
    }

    #[test]
    fn test_spheres_separated_and_penetrating() {
        let s = shape(ShapeDescriptor::Sphere { radius: 1.0 });
        let origin = Pose::identity();

        let apart = sphere_sphere(&s, &origin, &s, &Pose::from_translation(DVec3::new(3.0, 0.0, 0.0))).unwrap();
        assert!((apart.distance - 1.0).abs() < 1e-12);
        assert!((apart.point_a - DVec3::X).length() < 1e-12);
        assert!((apart.point_b - DVec3::new(2.0, 0.0, 0.0)).length() < 1e-12);
        assert_witness_invariant(&apart);

        let overlap = sphere_sphere(&s, &origin, &s, &Pose::from_translation(DVec3::new(1.0, 0.0, 0.0))).unwrap();
        assert!((overlap.distance + 1.0).abs() < 1e-12);
        assert!((overlap.normal - DVec3::X).length() < 1e-12);
        assert_witness_invariant(&overlap);
    }

    #[test]
    fn test_concentric_spheres_have_unit_normal() {
        let s = shape(ShapeDescriptor::Sphere { radius: 0.5 });
        let d = sphere_sphere(&s, &Pose::identity(), &s, &Pose::identity()).unwrap();
        assert!((d.normal.length() - 1.0).abs() < 1e-12);
        assert!((d.distance + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_sphere_next_to_capsule_side() {
        let sphere = shape(ShapeDescriptor::Sphere { radius: 0.5 });
        let capsule = shape(ShapeDescriptor::Capsule {
            radius: 0.25,
            half_length: 1.0,
        });
        let d = sphere_capsule(
            &sphere,
            &Pose::from_translation(DVec3::new(2.0, 0.0, 0.5)),
            &capsule,
            &Pose::identity(),
        )
        .unwrap();
        assert!((d.distance - 1.25).abs() < 1e-12);
        assert!((d.normal + DVec3::X).length() < 1e-12);
        assert_witness_invariant(&d);
    }

    #[test]
    fn test_crossed_capsules() {
        let capsule = shape(ShapeDescriptor::Capsule {
            radius: 0.1,
            half_length: 1.0,
        });
        // Second capsule lies along x, one unit above the first's center
        let lying = Pose::new(DVec3::new(0.0, 1.0, 0.0), DQuat::from_rotation_y(FRAC_PI_2));
        let d = capsule_capsule(&capsule, &Pose::identity(), &capsule, &lying).unwrap();
        assert!((d.distance - 0.8).abs() < 1e-9);
        assert!((d.normal - DVec3::Y).length() < 1e-9);
        assert_witness_invariant(&d);
    }

    #[test]
    fn test_parallel_capsules() {
        let capsule = shape(ShapeDescriptor::Capsule {
            radius: 0.5,
            half_length: 1.0,
        });
        let d = capsule_capsule(
            &capsule,
            &Pose::identity(),
            &capsule,
            &Pose::from_translation(DVec3::new(0.0, 3.0, 0.5)),
        )
        .unwrap();
        assert!((d.distance - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_sphere_inside_cuboid_exits_nearest_face() {
        let sphere = shape(ShapeDescriptor::Sphere { radius: 0.25 });
        let cuboid = shape(ShapeDescriptor::Cuboid {
            half_extents: DVec3::new(1.0, 2.0, 2.0),
        });
        let d = sphere_cuboid(
            &sphere,
            &Pose::from_translation(DVec3::new(0.5, 0.0, 0.0)),
            &cuboid,
            &Pose::identity(),
        )
        .unwrap();
        assert!((d.distance + 0.75).abs() < 1e-12);
        assert!((d.normal + DVec3::X).length() < 1e-12);
        assert!((d.point_b - DVec3::new(1.0, 0.0, 0.0)).length() < 1e-12);
        assert_witness_invariant(&d);
    }

    #[test]
    fn test_sphere_against_rotated_cuboid_corner() {
        let sphere = shape(ShapeDescriptor::Sphere { radius: 0.5 });
        let cuboid = shape(ShapeDescriptor::Cuboid {
            half_extents: DVec3::ONE,
        });
        let rotated = Pose::new(DVec3::ZERO, DQuat::from_rotation_z(FRAC_PI_2 / 2.0));
        // The rotated cube's corner points along +x at sqrt(2)
        let d = sphere_cuboid(
            &sphere,
            &Pose::from_translation(DVec3::new(3.0, 0.0, 0.0)),
            &cuboid,
            &rotated,
        )
        .unwrap();
        let expected = 3.0 - 2.0_f64.sqrt() - 0.5;
        assert!((d.distance - expected).abs() < 1e-9);
        assert_witness_invariant(&d);
    }

    #[test]
    fn test_cuboid_resting_in_floor() {
        let cuboid = shape(ShapeDescriptor::Cuboid {
            half_extents: DVec3::splat(0.5),
        });
        let floor = shape(ShapeDescriptor::HalfSpace {
            normal: DVec3::Z,
            offset: 0.0,
        });
        let d = convex_half_space(
            &cuboid,
            &Pose::from_translation(DVec3::new(0.0, 0.0, 0.4)),
            &floor,
            &Pose::identity(),
        )
        .unwrap();
        assert!((d.distance + 0.1).abs() < 1e-12);
        assert!((d.normal + DVec3::Z).length() < 1e-12);
        assert!(d.point_b.z.abs() < 1e-12);
        assert_witness_invariant(&d);
    }

    #[test]
    fn test_moved_half_space_boundary() {
        let sphere = shape(ShapeDescriptor::Sphere { radius: 1.0 });
        let floor = shape(ShapeDescriptor::HalfSpace {
            normal: DVec3::Z,
            offset: 0.0,
        });
        let d = convex_half_space(
            &sphere,
            &Pose::from_translation(DVec3::new(0.0, 0.0, 5.0)),
            &floor,
            &Pose::from_translation(DVec3::new(0.0, 0.0, 1.0)),
        )
        .unwrap();
        assert!((d.distance - 3.0).abs() < 1e-12);
    }
}
