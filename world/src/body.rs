//! Body construction.
//!
//! A [`PhysicsBody`] is a fully built Rapier body/collider pair that is not yet
//! part of any world. Building either succeeds completely or returns an error,
//! so `WorldManager::register` never sees a half-constructed body.

use rapier3d::prelude::*;

use crate::{
    error::{Result, WorldError},
    settings::{
        DEFAULT_FRICTION, DEFAULT_MARGIN, DEFAULT_MASS, DEFAULT_RESTITUTION,
        DEFAULT_ROLLING_FRICTION,
    },
    shape::ShapeDef,
    types::{Quat, Transform, Vec3},
};

/// Mass and surface parameters of a body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MassParams {
    /// Kilograms. `0.0` makes the body static (immovable).
    pub mass: f32,
    pub friction: f32,
    /// Mapped onto angular damping; Rapier has no rolling friction term.
    pub rolling_friction: f32,
    pub restitution: f32,
}

impl Default for MassParams {
    fn default() -> Self {
        Self {
            mass: DEFAULT_MASS,
            friction: DEFAULT_FRICTION,
            rolling_friction: DEFAULT_ROLLING_FRICTION,
            restitution: DEFAULT_RESTITUTION,
        }
    }
}

impl MassParams {
    /// Immovable body with default surface parameters.
    pub fn fixed() -> Self {
        Self {
            mass: 0.0,
            ..Self::default()
        }
    }

    pub fn with_mass(mass: f32) -> Self {
        Self {
            mass,
            ..Self::default()
        }
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        self.mass == 0.0
    }

    fn validate(&self) -> Result<()> {
        if !self.mass.is_finite() || self.mass < 0.0 {
            return Err(WorldError::InvalidMass(self.mass));
        }
        Ok(())
    }
}

/// Everything needed to build one body.
#[derive(Clone, Debug, PartialEq)]
pub struct BodyDef {
    /// Unscaled local shape.
    pub shape: ShapeDef,
    /// Initial world pose.
    pub transform: Transform,
    /// Local scale baked into the shape dimensions at build time.
    pub scale: Vec3,
    pub mass: MassParams,
    /// Collision margin (meters).
    pub margin: f32,
}

impl BodyDef {
    pub fn new(shape: ShapeDef) -> Self {
        Self {
            shape,
            transform: Transform::default(),
            scale: Vec3::new(1.0, 1.0, 1.0),
            mass: MassParams::default(),
            margin: DEFAULT_MARGIN,
        }
    }

    pub fn translation(mut self, translation: Vec3) -> Self {
        self.transform.translation = translation;
        self
    }

    pub fn rotation(mut self, rotation: Quat) -> Self {
        self.transform.rotation = rotation;
        self
    }

    pub fn scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn mass(mut self, mass: MassParams) -> Self {
        self.mass = mass;
        self
    }

    pub fn margin(mut self, margin: f32) -> Self {
        self.margin = margin;
        self
    }
}

/// A built body waiting to be registered.
#[derive(Clone, Debug)]
pub struct PhysicsBody {
    pub(crate) rigid_body: RigidBody,
    pub(crate) collider: Collider,
    shape: ShapeDef,
    mass: MassParams,
}

impl PhysicsBody {
    /// Scaled shape the collider was built from.
    pub fn shape(&self) -> &ShapeDef {
        &self.shape
    }

    pub fn mass(&self) -> &MassParams {
        &self.mass
    }

    pub fn is_static(&self) -> bool {
        self.mass.is_static()
    }

    /// Pose the body will be inserted with.
    pub fn transform(&self) -> Transform {
        Transform::from(self.rigid_body.position())
    }
}

/// Build a body from a definition.
pub fn build_body(def: &BodyDef) -> Result<PhysicsBody> {
    def.mass.validate()?;
    if !def.transform.is_finite() {
        return Err(WorldError::InvalidPose);
    }

    let shape = def.shape.scaled(&def.scale)?;
    let shared = shape.to_shared_shape(def.margin)?;

    let builder = if def.mass.is_static() {
        RigidBodyBuilder::fixed()
    } else {
        RigidBodyBuilder::dynamic().angular_damping(def.mass.rolling_friction)
    };
    let rigid_body = builder.pose(def.transform.iso()).build();

    let mut collider = ColliderBuilder::new(shared)
        .friction(def.mass.friction)
        .restitution(def.mass.restitution);
    if !def.mass.is_static() {
        collider = collider.mass(def.mass.mass);
    }

    Ok(PhysicsBody {
        rigid_body,
        collider: collider.build(),
        shape,
        mass: def.mass,
    })
}
