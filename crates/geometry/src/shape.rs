//! Collision shapes
//!
//! [`ShapeDescriptor`] is the plain description a kinematic model carries.
//! [`Shape`] is the validated, immutable native form built from it once per
//! structural update. Every shape is expressed in its own local frame and
//! placed in the world by a [`Pose`].

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::error::GeometryError;
use crate::pose::Pose;

/// Primitive kinds, used to index the detector table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShapeType {
    Sphere,
    Cuboid,
    Capsule,
    Cylinder,
    ConvexHull,
    HalfSpace,
}

/// Shape description as supplied by the kinematics provider.
///
/// Capsules and cylinders are aligned with the local z axis. A half-space is
/// the solid region `normal · x <= offset`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShapeDescriptor {
    Sphere { radius: f64 },
    Cuboid { half_extents: DVec3 },
    Capsule { radius: f64, half_length: f64 },
    Cylinder { radius: f64, half_length: f64 },
    /// Convex hull of `points`, rounded by `margin` (a Minkowski sum with a
    /// sphere). Link padding grows the margin.
    ConvexHull {
        points: Vec<DVec3>,
        #[serde(default)]
        margin: f64,
    },
    HalfSpace { normal: DVec3, offset: f64 },
}

impl ShapeDescriptor {
    #[must_use]
    pub fn shape_type(&self) -> ShapeType {
        match self {
            Self::Sphere { .. } => ShapeType::Sphere,
            Self::Cuboid { .. } => ShapeType::Cuboid,
            Self::Capsule { .. } => ShapeType::Capsule,
            Self::Cylinder { .. } => ShapeType::Cylinder,
            Self::ConvexHull { .. } => ShapeType::ConvexHull,
            Self::HalfSpace { .. } => ShapeType::HalfSpace,
        }
    }

    /// Returns a copy grown for a safety margin.
    ///
    /// Radii and half extents are multiplied by `scale` and then grown by
    /// `padding`. A capsule's half length is only scaled since its rounded
    /// caps already carry the padding. Hull points are scaled
    /// about the local origin and the padding is added to the hull's margin;
    /// a half-space moves its boundary outwards by
    /// `padding`.
    #[must_use]
    pub fn inflated(&self, scale: f64, padding: f64) -> Self {
        match self {
            Self::Sphere { radius } => Self::Sphere {
                radius: radius * scale + padding,
            },
            Self::Cuboid { half_extents } => Self::Cuboid {
                half_extents: *half_extents * scale + DVec3::splat(padding),
            },
            Self::Capsule {
                radius,
                half_length,
            } => Self::Capsule {
                radius: radius * scale + padding,
                half_length: half_length * scale,
            },
            Self::Cylinder {
                radius,
                half_length,
            } => Self::Cylinder {
                radius: radius * scale + padding,
                half_length: half_length * scale + padding,
            },
            Self::ConvexHull { points, margin } => Self::ConvexHull {
                points: points.iter().map(|p| *p * scale).collect(),
                margin: margin * scale + padding,
            },
            Self::HalfSpace { normal, offset } => Self::HalfSpace {
                normal: *normal,
                offset: offset + padding * normal.length(),
            },
        }
    }

    /// Swaps a cylinder for the capsule with the same radius and half length.
    /// Other shapes are returned unchanged.
    #[must_use]
    pub fn capsule_for_cylinder(self) -> Self {
        match self {
            Self::Cylinder {
                radius,
                half_length,
            } => Self::Capsule {
                radius,
                half_length,
            },
            other => other,
        }
    }
}

/// Validated collision shape.
///
/// Constructed only through [`Shape::from_descriptor`], so every dimension is
/// finite and strictly positive and half-space normals are unit length.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    descriptor: ShapeDescriptor,
    bounding_radius: f64,
}

impl Shape {
    pub fn from_descriptor(descriptor: &ShapeDescriptor) -> Result<Self, GeometryError> {
        let (descriptor, bounding_radius) = match descriptor {
            ShapeDescriptor::Sphere { radius } => {
                positive("sphere radius", *radius)?;
                (descriptor.clone(), *radius)
            }
            ShapeDescriptor::Cuboid { half_extents } => {
                positive("cuboid half extent x", half_extents.x)?;
                positive("cuboid half extent y", half_extents.y)?;
                positive("cuboid half extent z", half_extents.z)?;
                (descriptor.clone(), half_extents.length())
            }
            ShapeDescriptor::Capsule {
                radius,
                half_length,
            } => {
                positive("capsule radius", *radius)?;
                positive("capsule half length", *half_length)?;
                (descriptor.clone(), radius + half_length)
            }
            ShapeDescriptor::Cylinder {
                radius,
                half_length,
            } => {
                positive("cylinder radius", *radius)?;
                positive("cylinder half length", *half_length)?;
                (descriptor.clone(), radius.hypot(*half_length))
            }
            ShapeDescriptor::ConvexHull { points, margin } => {
                if points.is_empty() {
                    return Err(GeometryError::InvalidShape(
                        "convex hull has no points".to_string(),
                    ));
                }
                if !points.iter().all(|p| p.is_finite()) {
                    return Err(GeometryError::InvalidShape(
                        "convex hull point is not finite".to_string(),
                    ));
                }
                if !margin.is_finite() || *margin < 0.0 {
                    return Err(GeometryError::InvalidShape(format!(
                        "convex hull margin must be finite and non-negative, got {margin}"
                    )));
                }
                let r = points.iter().map(|p| p.length()).fold(0.0, f64::max);
                (descriptor.clone(), r + margin)
            }
            ShapeDescriptor::HalfSpace { normal, offset } => {
                if !normal.is_finite() || !offset.is_finite() {
                    return Err(GeometryError::InvalidShape(
                        "half-space is not finite".to_string(),
                    ));
                }
                let len = normal.length();
                if len < 1e-12 {
                    return Err(GeometryError::InvalidShape(
                        "half-space normal is zero".to_string(),
                    ));
                }
                (
                    ShapeDescriptor::HalfSpace {
                        normal: *normal / len,
                        offset: offset / len,
                    },
                    f64::INFINITY,
                )
            }
        };
        Ok(Self {
            descriptor,
            bounding_radius,
        })
    }

    #[must_use]
    pub fn descriptor(&self) -> &ShapeDescriptor {
        &self.descriptor
    }

    #[must_use]
    pub fn shape_type(&self) -> ShapeType {
        self.descriptor.shape_type()
    }

    /// Radius of a sphere about the local origin enclosing the shape.
    /// Infinite for half-spaces.
    #[must_use]
    pub fn bounding_radius(&self) -> f64 {
        self.bounding_radius
    }

    /// Furthest point of the shape along `dir`, in the local frame.
    ///
    /// Half-spaces are unbounded and have no support point; callers dispatch
    /// them to dedicated detectors, so this returns the origin for them.
    #[must_use]
    pub fn local_support(&self, dir: DVec3) -> DVec3 {
        match &self.descriptor {
            ShapeDescriptor::Sphere { radius } => {
                dir.try_normalize().unwrap_or(DVec3::Z) * *radius
            }
            ShapeDescriptor::Cuboid { half_extents } => DVec3::new(
                half_extents.x * dir.x.signum(),
                half_extents.y * dir.y.signum(),
                half_extents.z * dir.z.signum(),
            ),
            ShapeDescriptor::Capsule {
                radius,
                half_length,
            } => {
                let cap = DVec3::new(0.0, 0.0, half_length * dir.z.signum());
                cap + dir.try_normalize().unwrap_or(DVec3::Z) * *radius
            }
            ShapeDescriptor::Cylinder {
                radius,
                half_length,
            } => {
                let radial = DVec3::new(dir.x, dir.y, 0.0);
                let len = radial.length();
                let rim = if len < 1e-12 {
                    DVec3::ZERO
                } else {
                    radial * (*radius / len)
                };
                rim + DVec3::new(0.0, 0.0, half_length * dir.z.signum())
            }
            ShapeDescriptor::ConvexHull { points, margin } => {
                let mut best = points[0];
                let mut best_dot = best.dot(dir);
                for p in &points[1..] {
                    let d = p.dot(dir);
                    if d > best_dot {
                        best = *p;
                        best_dot = d;
                    }
                }
                if *margin > 0.0 {
                    best + dir.try_normalize().unwrap_or(DVec3::Z) * *margin
                } else {
                    best
                }
            }
            ShapeDescriptor::HalfSpace { .. } => DVec3::ZERO,
        }
    }

    /// Furthest point along the world direction `dir` of the shape placed at
    /// `pose`, in world coordinates.
    #[must_use]
    pub fn support(&self, pose: &Pose, dir: DVec3) -> DVec3 {
        pose.transform_point(self.local_support(pose.inverse_transform_vector(dir)))
    }
}

fn positive(what: &str, value: f64) -> Result<(), GeometryError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(GeometryError::InvalidShape(format!(
            "{what} must be finite and positive, got {value}"
        )))
    }
}
