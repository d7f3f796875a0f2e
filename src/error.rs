//! Error type shared by mesh construction, persistence and export.

use thiserror::Error;

/// Everything that can go wrong while building, loading or exporting a world.
#[derive(Debug, Error)]
pub enum WorldError {
    /// The sample set does not span a 3D volume (too few points, or all
    /// collinear/coplanar), so no closed hull exists.
    #[error("convex hull is degenerate: {0}")]
    DegenerateHull(String),

    /// A hull edge is not shared by exactly two triangles.
    #[error("mesh is not a closed manifold: edge ({}, {}) has {faces} incident faces", edge.0, edge.1)]
    NonManifold { edge: (usize, usize), faces: usize },

    /// A persisted world file could not be parsed.
    #[error("format error on line {line}: {reason}")]
    Format { line: usize, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl WorldError {
    pub(crate) fn format(line: usize, reason: impl Into<String>) -> Self {
        WorldError::Format {
            line,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, WorldError>;
