use thiserror::Error;

use crate::shape::ShapeType;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("invalid shape: {0}")]
    InvalidShape(String),
    #[error("no detector for {0:?} against {1:?}")]
    UnsupportedPair(ShapeType, ShapeType),
    /// The pair overlaps but no penetration depth could be measured, for
    /// instance when the Minkowski difference is flat.
    #[error("overlap between {0:?} and {1:?} has no measurable depth")]
    Degenerate(ShapeType, ShapeType),
}
