/*!
Math aliases and plain geometric value types shared by the world modules.

This module intentionally contains no simulation logic. It defines the data
exchanged between:
- the scene collaborator (poses, scale, bounding volumes)
- shape inference (`shape`)
- the world manager (`manager`), which converts to and from Rapier isometries

Rapier re-exports the same nalgebra version we depend on, so these aliases are
interchangeable with `rapier3d::prelude::{Vector, Isometry}` values.
*/

use nalgebra as na;

/// Common math aliases for clarity and consistency.
pub type Vec3 = na::Vector3<f32>;
pub type Quat = na::UnitQuaternion<f32>;
pub type Iso = na::Isometry3<f32>;

/// A rigid transform (isometry) in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Transform {
    #[inline]
    pub fn new(translation: Vec3, rotation: Quat) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    #[inline]
    pub fn from_translation(translation: Vec3) -> Self {
        Self::new(translation, Quat::identity())
    }

    /// Convert to nalgebra `Isometry3` for use with Rapier body builders.
    #[inline]
    pub fn iso(&self) -> Iso {
        Iso::from_parts(
            na::Translation3::new(self.translation.x, self.translation.y, self.translation.z),
            self.rotation,
        )
    }

    /// True when every component is finite.
    pub fn is_finite(&self) -> bool {
        self.translation.iter().all(|c| c.is_finite())
            && self.rotation.coords.iter().all(|c| c.is_finite())
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new(Vec3::zeros(), Quat::identity())
    }
}

impl From<&Iso> for Transform {
    fn from(iso: &Iso) -> Self {
        Self::new(iso.translation.vector, iso.rotation)
    }
}

/// Axis-aligned bounding box, in the local (unscaled) space of a scene object.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    #[inline]
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Box centred on the origin with the given full edge lengths.
    pub fn from_size(size: Vec3) -> Self {
        let half = size * 0.5;
        Self::new(-half, half)
    }

    /// Absolute edge lengths per axis. Inverted boxes still report positive sizes.
    #[inline]
    pub fn size(&self) -> Vec3 {
        (self.max - self.min).abs()
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
}

/// Bounding sphere in local (unscaled) space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

impl From<Aabb> for BoundingSphere {
    /// Smallest sphere enclosing the box.
    fn from(aabb: Aabb) -> Self {
        Self {
            center: aabb.center(),
            radius: aabb.size().norm() * 0.5,
        }
    }
}
