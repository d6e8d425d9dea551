#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! # Proxima Collision
//!
//! Collision and proximity queries over a robot and its environment, for
//! use inside a motion planner's inner loop.
//!
//! The engine caches one shape per kinematic element, refreshes poses on
//! demand and answers two kinds of question over filtered pairs of cached
//! objects: is anything colliding, and how far apart is everything.
//!
//! ## Key Components
//!
//! -   **[`GeometryCache`]:** name-sorted collision objects, rebuilt from
//!     [`KinematicElement`]s and re-posed by `sync_transforms`.
//! -   **[`AllowedCollisionMatrix`]:** decides which pairs are worth testing.
//! -   **[`PairEnumerator`]:** yields candidate pairs in a deterministic order.
//! -   **[`NarrowPhaseDispatcher`]:** runs the narrow phase over the pairs and
//!     feeds a [`ValidityAggregator`] or a [`ProximityAggregator`].
//! -   **[`CollisionWorld`]:** ties it all together behind the
//!     [`CollisionScene`] trait.
//!
//! ```rust,ignore
//! use collision::{CollisionConfig, CollisionScene, CollisionWorld, KinematicElement, ObjectCategory};
//! use geometry::{ConvexNarrowPhase, ShapeDescriptor};
//!
//! let link = KinematicElement::new("link", ObjectCategory::RobotLink,
//!     Some(ShapeDescriptor::Sphere { radius: 0.1 })).shared();
//! let mut world = CollisionWorld::new(ConvexNarrowPhase::new(), CollisionConfig::default());
//! world.update_objects(&[link.clone()])?;
//! world.sync_transforms()?;
//! assert!(world.is_state_valid(true)?);
//! ```

pub mod acm;
pub mod aggregate;
pub mod cache;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod kinematics;
pub mod object;
pub mod pairs;
pub mod proxy;
pub mod world;

pub use acm::{AllowedCollisionMatrix, PairDecision};
pub use aggregate::{ProximityAggregator, ValidityAggregator};
pub use cache::GeometryCache;
pub use config::{CollisionConfig, ShapeFailurePolicy};
pub use dispatch::NarrowPhaseDispatcher;
pub use error::CollisionError;
pub use kinematics::{KinematicElement, ObjectCategory};
pub use object::CollisionObject;
pub use pairs::{CandidatePairs, ObjectPair, PairEnumerator};
pub use proxy::{CollisionProxy, ProxyRecord};
pub use world::{CollisionScene, CollisionWorld};
