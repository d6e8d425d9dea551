use anyhow::Result;
use geometry::{
    ConvexNarrowPhase, DQuat, DVec3, GeometryError, NarrowPhase, PairDistance, Pose, Shape, ShapeDescriptor,
    ShapeType,
};
use std::f64::consts::FRAC_PI_2;

fn at(x: f64, y: f64, z: f64) -> Pose {
    Pose::from_translation(DVec3::new(x, y, z))
}

#[test]
fn unit_spheres_three_apart_are_one_unit_apart() -> Result<()> {
    let narrow = ConvexNarrowPhase::new();
    let sphere = narrow.build_shape(&ShapeDescriptor::Sphere { radius: 1.0 })?;

    let d = narrow.compute_pair_distance(&sphere, &at(0.0, 0.0, 0.0), &sphere, &at(3.0, 0.0, 0.0))?;
    assert!((d.distance - 1.0).abs() < 1e-12);
    assert!(!narrow.test_pair_collision(&sphere, &at(0.0, 0.0, 0.0), &sphere, &at(3.0, 0.0, 0.0))?);
    assert!(narrow.test_pair_collision(&sphere, &at(0.0, 0.0, 0.0), &sphere, &at(1.0, 0.0, 0.0))?);
    Ok(())
}

#[test]
fn cylinder_next_to_cuboid_uses_gjk() -> Result<()> {
    let narrow = ConvexNarrowPhase::new();
    let cylinder = narrow.build_shape(&ShapeDescriptor::Cylinder {
        radius: 0.5,
        half_length: 1.0,
    })?;
    let cuboid = narrow.build_shape(&ShapeDescriptor::Cuboid {
        half_extents: DVec3::new(0.5, 0.5, 0.5),
    })?;

    let d = narrow.compute_pair_distance(&cylinder, &at(0.0, 0.0, 0.0), &cuboid, &at(2.0, 0.0, 0.0))?;
    assert!((d.distance - 1.0).abs() < 1e-6);
    assert!((d.normal - DVec3::X).length() < 1e-6);
    assert!(!narrow.test_pair_collision(&cylinder, &at(0.0, 0.0, 0.0), &cuboid, &at(2.0, 0.0, 0.0))?);
    assert!(narrow.test_pair_collision(&cylinder, &at(0.0, 0.0, 0.0), &cuboid, &at(0.9, 0.0, 0.0))?);
    Ok(())
}

#[test]
fn overlapping_cuboids_report_negative_distance() -> Result<()> {
    let narrow = ConvexNarrowPhase::new();
    let cuboid = narrow.build_shape(&ShapeDescriptor::Cuboid {
        half_extents: DVec3::splat(0.5),
    })?;

    let d = narrow.compute_pair_distance(&cuboid, &at(0.0, 0.0, 0.0), &cuboid, &at(0.0, 0.8, 0.05))?;
    assert!(d.distance < 0.0);
    assert!((d.distance + 0.2).abs() < 1e-6);
    assert!((d.normal - DVec3::Y).length() < 1e-6);
    Ok(())
}

#[test]
fn lying_capsule_above_floor() -> Result<()> {
    let narrow = ConvexNarrowPhase::new();
    let capsule = narrow.build_shape(&ShapeDescriptor::Capsule {
        radius: 0.1,
        half_length: 0.5,
    })?;
    let floor = narrow.build_shape(&ShapeDescriptor::HalfSpace {
        normal: DVec3::Z,
        offset: 0.0,
    })?;
    let lying = Pose::new(DVec3::new(0.0, 0.0, 0.3), DQuat::from_rotation_x(FRAC_PI_2));

    let d = narrow.compute_pair_distance(&floor, &Pose::identity(), &capsule, &lying)?;
    assert!((d.distance - 0.2).abs() < 1e-12);
    // Floor is A here, so the normal points up towards the capsule
    assert!((d.normal - DVec3::Z).length() < 1e-12);
    Ok(())
}

#[test]
fn convex_hull_against_sphere() -> Result<()> {
    let narrow = ConvexNarrowPhase::new();
    let tetra = narrow.build_shape(&ShapeDescriptor::ConvexHull {
        points: vec![
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(0.0, 1.0, 0.0),
            DVec3::new(0.0, 0.0, 1.0),
        ],
        margin: 0.0,
    })?;
    let sphere = narrow.build_shape(&ShapeDescriptor::Sphere { radius: 0.5 })?;

    let d = narrow.compute_pair_distance(&tetra, &Pose::identity(), &sphere, &at(-2.0, 0.2, 0.2))?;
    assert!((d.distance - 1.5).abs() < 1e-6);
    Ok(())
}

#[test]
fn invalid_descriptor_is_rejected() {
    let narrow = ConvexNarrowPhase::new();
    let err = narrow
        .build_shape(&ShapeDescriptor::ConvexHull {
            points: vec![],
            margin: 0.0,
        })
        .unwrap_err();
    assert!(matches!(err, GeometryError::InvalidShape(_)));
}

fn assert_witnesses_agree(d: &PairDistance) {
    let expected_b = d.point_a + d.normal * d.distance;
    assert!(
        (d.point_b - expected_b).length() < 1e-6,
        "point_b {} but point_a + distance * normal is {}",
        d.point_b,
        expected_b
    );
    assert!((d.normal.length() - 1.0).abs() < 1e-6);
}

#[test]
fn rotated_cylinder_into_cuboid_terminates() -> Result<()> {
    let narrow = ConvexNarrowPhase::new();
    let cylinder = narrow.build_shape(&ShapeDescriptor::Cylinder {
        radius: 0.3,
        half_length: 0.4,
    })?;
    let cuboid = narrow.build_shape(&ShapeDescriptor::Cuboid {
        half_extents: DVec3::new(0.5, 0.3, 0.2),
    })?;
    let pose_a = Pose::new(
        DVec3::new(0.182, 0.330, 0.246),
        DQuat::from_xyzw(-0.584, 0.281, -0.756, 0.095),
    );
    let pose_b = Pose::new(
        DVec3::new(0.707, 0.035, -0.456),
        DQuat::from_xyzw(0.808, -0.412, -0.414, 0.084),
    );

    assert!(narrow.test_pair_collision(&cylinder, &pose_a, &cuboid, &pose_b)?);
    let d = narrow.compute_pair_distance(&cylinder, &pose_a, &cuboid, &pose_b)?;
    assert!(d.distance < 0.0);
    assert_witnesses_agree(&d);
    Ok(())
}

#[test]
fn flat_hulls_overlapping_in_plane_are_degenerate() -> Result<()> {
    let narrow = ConvexNarrowPhase::new();
    let square = narrow.build_shape(&ShapeDescriptor::ConvexHull {
        points: vec![
            DVec3::new(-1.0, -1.0, 0.0),
            DVec3::new(1.0, -1.0, 0.0),
            DVec3::new(1.0, 1.0, 0.0),
            DVec3::new(-1.0, 1.0, 0.0),
        ],
        margin: 0.0,
    })?;
    let shifted = at(0.5, 0.3, 0.0);

    assert!(narrow.test_pair_collision(&square, &Pose::identity(), &square, &shifted)?);
    let err = narrow
        .compute_pair_distance(&square, &Pose::identity(), &square, &shifted)
        .unwrap_err();
    assert_eq!(err, GeometryError::Degenerate(ShapeType::ConvexHull, ShapeType::ConvexHull));
    Ok(())
}

#[test]
fn padded_hull_is_rounded_by_its_margin() -> Result<()> {
    let narrow = ConvexNarrowPhase::new();
    let descriptor = ShapeDescriptor::ConvexHull {
        points: vec![
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(0.0, 1.0, 0.0),
            DVec3::new(0.0, 0.0, 1.0),
        ],
        margin: 0.0,
    };
    let padded = descriptor.inflated(1.0, 0.25);
    assert!(matches!(padded, ShapeDescriptor::ConvexHull { margin, .. } if margin == 0.25));

    let tetra = narrow.build_shape(&padded)?;
    let sphere = narrow.build_shape(&ShapeDescriptor::Sphere { radius: 0.5 })?;
    let d = narrow.compute_pair_distance(&tetra, &Pose::identity(), &sphere, &at(-2.0, 0.2, 0.2))?;
    assert!((d.distance - 1.25).abs() < 1e-6);
    assert!((d.point_a - DVec3::new(-0.25, 0.2, 0.2)).length() < 1e-6);
    assert_witnesses_agree(&d);

    let floor = narrow.build_shape(&ShapeDescriptor::HalfSpace {
        normal: DVec3::Z,
        offset: -1.0,
    })?;
    let d = narrow.compute_pair_distance(&tetra, &Pose::identity(), &floor, &Pose::identity())?;
    assert!((d.distance - 0.75).abs() < 1e-12);
    Ok(())
}

fn random_pose(rng: &fastrand::Rng) -> Pose {
    let coord = || rng.f64() * 1.2 - 0.6;
    let translation = DVec3::new(coord(), coord(), coord());
    let rotation = DQuat::from_xyzw(coord(), coord(), coord(), coord());
    Pose::new(translation, rotation)
}

#[test]
fn seeded_random_poses_stay_consistent() -> Result<()> {
    let narrow = ConvexNarrowPhase::new();
    let build = |d: ShapeDescriptor| narrow.build_shape(&d);
    let cylinder = build(ShapeDescriptor::Cylinder {
        radius: 0.3,
        half_length: 0.4,
    })?;
    let cuboid = build(ShapeDescriptor::Cuboid {
        half_extents: DVec3::new(0.5, 0.3, 0.2),
    })?;
    let capsule = build(ShapeDescriptor::Capsule {
        radius: 0.2,
        half_length: 0.3,
    })?;
    let hull = build(ShapeDescriptor::ConvexHull {
        points: vec![
            DVec3::new(-0.3, -0.2, -0.1),
            DVec3::new(0.4, -0.2, -0.1),
            DVec3::new(0.0, 0.35, -0.1),
            DVec3::new(0.0, 0.0, 0.45),
        ],
        margin: 0.05,
    })?;
    let pairs: [(&Shape, &Shape); 4] = [
        (&cylinder, &cuboid),
        (&hull, &capsule),
        (&cylinder, &hull),
        (&cuboid, &cuboid),
    ];

    let rng = fastrand::Rng::with_seed(0x5eed_cafe);
    let mut overlapping = 0;
    let mut degenerate = 0;
    let trials = 250;
    for trial in 0..trials {
        for (a, b) in pairs {
            let (pose_a, pose_b) = (random_pose(&rng), random_pose(&rng));
            let collides = narrow.test_pair_collision(a, &pose_a, b, &pose_b)?;
            match narrow.compute_pair_distance(a, &pose_a, b, &pose_b) {
                Ok(d) => {
                    assert_witnesses_agree(&d);
                    if d.distance.abs() > 1e-4 {
                        assert_eq!(
                            collides,
                            d.is_colliding(),
                            "trial {trial}: {:?} vs {:?} at distance {}",
                            a.shape_type(),
                            b.shape_type(),
                            d.distance
                        );
                    }
                    if d.distance < 0.0 {
                        overlapping += 1;
                    }
                }
                Err(GeometryError::Degenerate(..)) => degenerate += 1,
                Err(e) => return Err(e.into()),
            }
        }
    }
    assert!(overlapping > trials / 4, "only {overlapping} overlapping poses");
    assert!(degenerate <= trials / 100, "{degenerate} degenerate overlaps");
    Ok(())
}
