//! # Proxima
//!
//! Collision and proximity queries for robot motion planning.
//!
//! ## Overview
//!
//! A motion planner asks two questions thousands of times per second: is
//! this robot configuration free of collisions, and how close is every link
//! to everything it could hit. Proxima answers both over a cached set of
//! shapes whose poses are refreshed from the kinematic model between
//! queries, so shapes are built once and each query only pays for the pairs
//! it actually tests.
//!
//! ## The Crates
//!
//! -   **`proxima`:** the crate you are viewing. Documentation entry point
//!     and the `proxima` command-line tool for checking scene files.
//! -   **[`geometry`]:** poses, shape descriptors and the [`NarrowPhase`]
//!     trait, with a reference convex implementation.
//! -   **[`collision`]:** the engine. Geometry cache, allowed collision
//!     matrix, pair enumeration, dispatch and result aggregation behind the
//!     [`CollisionScene`] trait.
//! -   **[`scene`]:** JSON scene files that populate a collision world and
//!     replay pose steps against it.
//!
//! ## Command line
//!
//! ```text
//! proxima check scene.json          # validity of the initial state and every step
//! proxima distances scene.json --json
//! proxima pair scene.json gripper table
//! proxima watch scene.json          # re-run `check` on every save
//! ```
//!
//! [`NarrowPhase`]: geometry::NarrowPhase
//! [`CollisionScene`]: collision::CollisionScene

pub use collision;
pub use geometry;
pub use scene;

pub mod report;
