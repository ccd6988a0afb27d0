use thiserror::Error;

use crate::scene::SceneObjectId;

pub type Result<T, E = WorldError> = std::result::Result<T, E>;

/// Failures surfaced by constructing or stepping operations.
///
/// Usage mistakes that the world tolerates (double registration, removing an
/// unknown id) are not errors; they are reported through return values.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum WorldError {
    #[error("invalid {what}: {value} (must be finite and positive)")]
    InvalidDimension { what: &'static str, value: f32 },

    #[error("mass must be finite and non-negative, got {0}")]
    InvalidMass(f32),

    #[error("scale must be finite and non-zero on every axis")]
    InvalidScale,

    #[error("position and orientation must be finite")]
    InvalidPose,

    #[error("convex hull could not be built from {0} points")]
    DegenerateHull(usize),

    #[error("scene object {id} provides no {needed} for shape inference")]
    MissingBounds {
        id: SceneObjectId,
        needed: &'static str,
    },

    #[error("gravity must be finite")]
    InvalidGravity,

    #[error("solver sub-step count must be at least 1")]
    InvalidSubSteps,

    #[error("time step must be finite and non-negative, got {0}")]
    InvalidTimeStep(f32),

    #[error("invalid maze: {0}")]
    InvalidMaze(String),
}
