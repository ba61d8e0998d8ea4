//! Error types

use crate::float_types::Real;

/// Problems with a [`BakeConfig`](crate::config::BakeConfig)
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// (NonPositive) A length, epsilon or intensity must be strictly positive
    #[error("(NonPositive) `{name}` must be > 0, got {value}")]
    NonPositive { name: &'static str, value: Real },
    /// (EdgeRange) The minimum subdivision edge must be shorter than the maximum
    #[error("(EdgeRange) min_edge ({min}) must be smaller than max_edge ({max})")]
    EdgeRange { min: Real, max: Real },
    /// (Zero) A count that drives a loop or a table size is zero
    #[error("(Zero) `{0}` must be at least 1")]
    Zero(&'static str),
}

/// Problems detected while ingesting level geometry
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LevelError {
    /// Invalid tunables
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A triangle references a material that does not exist
    #[error("(MaterialOutOfRange) triangle {triangle} uses material {material}, only {available} loaded")]
    MaterialOutOfRange {
        triangle: usize,
        material: usize,
        available: usize,
    },
}

/// Problems starting or running a build
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// A build is currently compiling the tree or computing lighting
    #[error("(AlreadyRunning) a build is already in progress")]
    AlreadyRunning,
    /// The OS refused to create the worker thread
    #[error("(Spawn) failed to spawn build worker: {0}")]
    Spawn(#[from] std::io::Error),
    /// A blocking build observed the cancel flag
    #[error("(Cancelled) {0}")]
    Cancelled(#[from] Cancelled),
}

/// Problems building the static collision mesh
#[derive(Debug, thiserror::Error)]
pub enum CollisionError {
    /// No triangles were supplied
    #[error("(Empty) cannot build a collision mesh from zero triangles")]
    Empty,
    /// Indicates an inconsistency while building a triangle mesh
    #[error("(TriMesh) {0}")]
    TriMesh(#[from] crate::float_types::parry3d::shape::TriMeshBuilderError),
}

/// The build was cancelled cooperatively. Not reported to the host; a cancelled
/// worker simply stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("build cancelled")]
pub struct Cancelled;
