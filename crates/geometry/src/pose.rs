//! Rigid world poses
//!
//! A [`Pose`] is what the kinematics provider publishes for every element on
//! every update cycle: a translation and a unit quaternion, no scale. Shape
//! scale and padding are baked into the shape at construction time, so the
//! per-tick path only ever copies poses.

use glam::{DMat4, DQuat, DVec3};

/// Rigid transform from a shape's local frame into the world frame.
#[derive(Debug, Copy, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Pose {
    pub translation: DVec3,
    pub rotation: DQuat,
}

impl Pose {
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            translation: DVec3::ZERO,
            rotation: DQuat::IDENTITY,
        }
    }

    /// Builds a pose, normalising `rotation`.
    ///
    /// A degenerate (zero-length) quaternion falls back to the identity
    /// rotation rather than producing NaNs downstream.
    #[must_use]
    pub fn new(translation: DVec3, rotation: DQuat) -> Self {
        let rotation = if rotation.length_squared() > f64::EPSILON {
            rotation.normalize()
        } else {
            DQuat::IDENTITY
        };
        Self {
            translation,
            rotation,
        }
    }

    #[must_use]
    pub const fn from_translation(translation: DVec3) -> Self {
        Self {
            translation,
            rotation: DQuat::IDENTITY,
        }
    }

    /// Maps a point from the local frame into the world frame.
    #[must_use]
    pub fn transform_point(&self, p: DVec3) -> DVec3 {
        self.rotation * p + self.translation
    }

    /// Rotates a direction from the local frame into the world frame.
    #[must_use]
    pub fn transform_vector(&self, v: DVec3) -> DVec3 {
        self.rotation * v
    }

    /// Maps a world point into the local frame.
    #[must_use]
    pub fn inverse_transform_point(&self, p: DVec3) -> DVec3 {
        self.rotation.inverse() * (p - self.translation)
    }

    #[must_use]
    pub fn inverse_transform_vector(&self, v: DVec3) -> DVec3 {
        self.rotation.inverse() * v
    }

    /// Column-major homogeneous matrix `T * R`.
    #[must_use]
    pub fn to_mat4(&self) -> DMat4 {
        DMat4::from_rotation_translation(self.rotation, self.translation)
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}
