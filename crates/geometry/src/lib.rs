#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! # Proxima Geometry
//!
//! The geometric layer underneath the Proxima collision engine.
//!
//! This crate knows nothing about robots, link names or allowed-collision
//! rules. It answers exactly two questions about a pair of posed shapes:
//! do they overlap, and how far apart are they. Everything above that
//! (caching, pair selection, aggregation) lives in the `collision` crate and
//! talks to this layer only through the [`NarrowPhase`] trait.
//!
//! ## Key Components
//!
//! -   **[`Pose`]:** a rigid world transform (translation + unit quaternion).
//! -   **[`ShapeDescriptor`] / [`Shape`]:** the description a kinematic model
//!     hands over, and the validated native shape built from it once.
//! -   **[`NarrowPhase`]:** the pairwise query surface. [`ConvexNarrowPhase`]
//!     is the reference implementation: closed-form detectors for the common
//!     primitive pairs and GJK/EPA for every other convex pair.
//!
//! ## Sign convention
//!
//! [`PairDistance::distance`] is positive for separated shapes and negative
//! (minus the penetration depth) for overlapping ones. The normal always
//! points from shape A towards shape B and the witness points satisfy
//! `point_b ≈ point_a + distance * normal` in both regimes.
//!
//! ```rust,ignore
//! use geometry::{ConvexNarrowPhase, NarrowPhase, Pose, ShapeDescriptor};
//! use glam::DVec3;
//!
//! let narrow = ConvexNarrowPhase::new();
//! let a = narrow.build_shape(&ShapeDescriptor::Sphere { radius: 1.0 })?;
//! let b = narrow.build_shape(&ShapeDescriptor::Sphere { radius: 1.0 })?;
//! let d = narrow.compute_pair_distance(
//!     &a, &Pose::identity(),
//!     &b, &Pose::from_translation(DVec3::new(3.0, 0.0, 0.0)),
//! )?;
//! assert!((d.distance - 1.0).abs() < 1e-12);
//! ```

pub mod error;
pub mod narrow;
pub mod pose;
pub mod shape;

pub use error::GeometryError;
pub use narrow::{ConvexNarrowPhase, NarrowPhase, PairDistance};
pub use pose::Pose;
pub use shape::{Shape, ShapeDescriptor, ShapeType};

pub use glam::{DQuat, DVec3};
