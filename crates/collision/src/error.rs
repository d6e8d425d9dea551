use geometry::GeometryError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CollisionError {
    #[error("duplicate collision object name '{0}'")]
    DuplicateName(String),
    #[error("unknown collision object '{0}'")]
    UnknownObject(String),
    #[error("cannot build a shape for '{name}': {source}")]
    ShapeConstruction {
        name: String,
        #[source]
        source: GeometryError,
    },
    #[error("output buffer has {actual} slots but the query produces {expected} results")]
    SizeMismatch { expected: usize, actual: usize },
    #[error("kinematic element '{0}' was dropped while still cached")]
    DetachedElement(String),
    #[error("narrow phase cannot test '{a}' against '{b}': {source}")]
    UnsupportedPair {
        a: String,
        b: String,
        #[source]
        source: GeometryError,
    },
}
