/*!
World settings and tuning defaults.

These constants centralize the parameters used by shape construction, body
mass properties and the stepping loop. Keeping them together makes tuning
easier and keeps the defaults of every building operation in one place.

Notes
- Distances are in meters, time in seconds, mass in kilograms.
- `WorldSettings` carries the per-world subset; everything else is a default
  that individual `BodyDef`s may override.
*/

use crate::types::Vec3;

/// Collision margin applied to every non-spherical shape (meters).
///
/// Rapier represents margins as a rounded border. The border is kept inside
/// the requested outer dimensions so a margin never inflates a shape.
pub const DEFAULT_MARGIN: f32 = 0.01;

/// Minimum edge length for boxes inferred from bounding boxes (meters).
/// Flat geometry (planes, decals) would otherwise produce zero-thickness boxes.
pub const DEFAULT_MIN_LENGTH: f32 = 0.01;

/// Default body mass. A mass of `0.0` makes the body static.
pub const DEFAULT_MASS: f32 = 1.0;

pub const DEFAULT_FRICTION: f32 = 0.5;

/// Rolling resistance. Rapier has no rolling friction term, so this becomes the
/// body's angular damping.
pub const DEFAULT_ROLLING_FRICTION: f32 = 0.1;

pub const DEFAULT_RESTITUTION: f32 = 0.0;

/// Vertical gravity used by [`WorldSettings::default`] (m/s^2, negative is down).
pub const DEFAULT_GRAVITY_Y: f32 = -10.0;

/// Constraint solver iterations per integration step.
pub const DEFAULT_SOLVER_SUB_STEPS: usize = 4;

/// Fixed integration step used by the update accumulator (seconds).
pub const FIXED_TIME_STEP: f32 = 1.0 / 60.0;

/// Upper bound on integration steps per `update` call, used by callers that have
/// no better value. Frames longer than `DEFAULT_MAX_SUB_STEPS * FIXED_TIME_STEP`
/// lose the excess time rather than spiral.
pub const DEFAULT_MAX_SUB_STEPS: usize = 10;

/// Default reach of a forward ray check (meters).
pub const DEFAULT_RAY_DISTANCE: f32 = 1.5;

/// Local forward axis of a scene object.
pub const FORWARD: Vec3 = Vec3::new(0.0, 0.0, 1.0);

/// Local backward axis of a scene object.
pub const BACK: Vec3 = Vec3::new(0.0, 0.0, -1.0);

/// Per-world configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldSettings {
    pub gravity: Vec3,
    /// Constraint solver iterations per integration step. Must be at least 1.
    pub solver_sub_steps: usize,
    /// Size of one integration step taken by the update accumulator.
    pub fixed_time_step: f32,
    /// Minimum edge length of boxes built from bounding boxes.
    pub min_box_length: f32,
    /// Collision margin used by `BodyDef::new`.
    pub margin: f32,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, DEFAULT_GRAVITY_Y, 0.0),
            solver_sub_steps: DEFAULT_SOLVER_SUB_STEPS,
            fixed_time_step: FIXED_TIME_STEP,
            min_box_length: DEFAULT_MIN_LENGTH,
            margin: DEFAULT_MARGIN,
        }
    }
}

impl WorldSettings {
    pub fn with_gravity(gravity: Vec3) -> Self {
        Self {
            gravity,
            ..Self::default()
        }
    }
}
