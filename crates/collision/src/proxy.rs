//! Query results
//!
//! [`CollisionProxy`] is the owned, named result of a distance query.
//! [`ProxyRecord`] is the same data without names in a flat `#[repr(C)]`
//! layout, for handing whole batches to an optimizer as a `&[f64]`.

use bytemuck::{Pod, Zeroable};
use geometry::PairDistance;
use glam::DVec3;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollisionProxy {
    pub name_a: String,
    pub name_b: String,
    /// Signed: negative is penetration depth.
    pub distance: f64,
    pub point_a: DVec3,
    pub point_b: DVec3,
    /// Unit vector from A towards B.
    pub normal: DVec3,
}

impl CollisionProxy {
    #[must_use]
    pub fn new(name_a: &str, name_b: &str, result: PairDistance) -> Self {
        Self {
            name_a: name_a.to_owned(),
            name_b: name_b.to_owned(),
            distance: result.distance,
            point_a: result.point_a,
            point_b: result.point_b,
            normal: result.normal,
        }
    }

    #[must_use]
    pub fn is_colliding(&self) -> bool {
        self.distance <= 0.0
    }

    #[must_use]
    pub fn record(&self) -> ProxyRecord {
        ProxyRecord {
            distance: self.distance,
            point_a: self.point_a.to_array(),
            point_b: self.point_b.to_array(),
            normal: self.normal.to_array(),
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct ProxyRecord {
    pub distance: f64,
    pub point_a: [f64; 3],
    pub point_b: [f64; 3],
    pub normal: [f64; 3],
}

impl ProxyRecord {
    /// Scalars per record when viewed through [`ProxyRecord::as_scalars`].
    pub const STRIDE: usize = 10;

    #[must_use]
    pub fn as_scalars(records: &[ProxyRecord]) -> &[f64] {
        bytemuck::cast_slice(records)
    }
}

impl From<PairDistance> for ProxyRecord {
    fn from(result: PairDistance) -> Self {
        Self {
            distance: result.distance,
            point_a: result.point_a.to_array(),
            point_b: result.point_b.to_array(),
            normal: result.normal.to_array(),
        }
    }
}
