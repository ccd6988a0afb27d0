//! Scene-side collaborator interface.
//!
//! The world never owns scene objects. It only needs a stable id, the current
//! pose and scale, a way to write a pose back, and (for shape inference) a few
//! geometric queries. Anything that renders can implement [`SceneObject`].
//!
//! [`SceneNode`] is a minimal shared handle (`Rc<RefCell<..>>`) for headless use
//! and tests. Cloning it aliases the same node, so a clone handed to
//! `WorldManager::register` keeps writing into the caller's node.

use std::{cell::RefCell, rc::Rc};

use crate::types::{Aabb, BoundingSphere, Quat, Transform, Vec3};

/// Stable unique identifier of a scene object.
pub type SceneObjectId = u64;

/// Built-in geometry parameters a scene object may expose.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum GeometryParams {
    /// Y-aligned cone with base radius and full height.
    Cone { radius: f32, height: f32 },
    /// Plane in the local XY plane with full width (X) and height (Y).
    Plane { width: f32, height: f32 },
    #[default]
    Other,
}

/// A scene object handle as seen by the physics world.
pub trait SceneObject {
    fn id(&self) -> SceneObjectId;

    fn translation(&self) -> Vec3;

    fn rotation(&self) -> Quat;

    fn scale(&self) -> Vec3 {
        Vec3::new(1.0, 1.0, 1.0)
    }

    /// Overwrite position and orientation. Scale is left untouched.
    fn set_pose(&mut self, translation: Vec3, rotation: Quat);

    /// Local-space (unscaled) bounding box of the object's geometry.
    fn local_aabb(&self) -> Option<Aabb> {
        None
    }

    /// Local-space bounding sphere. Defaults to the sphere around [`Self::local_aabb`].
    fn bounding_sphere(&self) -> Option<BoundingSphere> {
        self.local_aabb().map(BoundingSphere::from)
    }

    fn geometry(&self) -> GeometryParams {
        GeometryParams::Other
    }

    fn transform(&self) -> Transform {
        Transform::new(self.translation(), self.rotation())
    }
}

#[derive(Clone, Debug)]
struct NodeState {
    id: SceneObjectId,
    translation: Vec3,
    rotation: Quat,
    scale: Vec3,
    aabb: Option<Aabb>,
    sphere: Option<BoundingSphere>,
    geometry: GeometryParams,
}

/// Shared, single-threaded scene node.
#[derive(Clone, Debug)]
pub struct SceneNode(Rc<RefCell<NodeState>>);

impl SceneNode {
    pub fn new(id: SceneObjectId) -> Self {
        Self(Rc::new(RefCell::new(NodeState {
            id,
            translation: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
            aabb: None,
            sphere: None,
            geometry: GeometryParams::Other,
        })))
    }

    /// Node with a box geometry of the given full edge lengths, centred on its origin.
    pub fn cuboid(id: SceneObjectId, size: Vec3) -> Self {
        Self::new(id).with_aabb(Aabb::from_size(size))
    }

    /// Node with a sphere geometry of the given radius.
    pub fn ball(id: SceneObjectId, radius: f32) -> Self {
        let d = radius * 2.0;
        let node = Self::cuboid(id, Vec3::new(d, d, d));
        node.0.borrow_mut().sphere = Some(BoundingSphere {
            center: Vec3::zeros(),
            radius,
        });
        node
    }

    pub fn with_translation(self, translation: Vec3) -> Self {
        self.0.borrow_mut().translation = translation;
        self
    }

    pub fn with_rotation(self, rotation: Quat) -> Self {
        self.0.borrow_mut().rotation = rotation;
        self
    }

    pub fn with_scale(self, scale: Vec3) -> Self {
        self.0.borrow_mut().scale = scale;
        self
    }

    pub fn with_aabb(self, aabb: Aabb) -> Self {
        self.0.borrow_mut().aabb = Some(aabb);
        self
    }

    pub fn with_geometry(self, geometry: GeometryParams) -> Self {
        self.0.borrow_mut().geometry = geometry;
        self
    }

    /// Scale may change at any time; bodies built earlier keep the scale they were built with.
    pub fn set_scale(&self, scale: Vec3) {
        self.0.borrow_mut().scale = scale;
    }

    /// True when both handles alias the same node.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl SceneObject for SceneNode {
    fn id(&self) -> SceneObjectId {
        self.0.borrow().id
    }

    fn translation(&self) -> Vec3 {
        self.0.borrow().translation
    }

    fn rotation(&self) -> Quat {
        self.0.borrow().rotation
    }

    fn scale(&self) -> Vec3 {
        self.0.borrow().scale
    }

    fn set_pose(&mut self, translation: Vec3, rotation: Quat) {
        let mut state = self.0.borrow_mut();
        state.translation = translation;
        state.rotation = rotation;
    }

    fn local_aabb(&self) -> Option<Aabb> {
        self.0.borrow().aabb
    }

    fn bounding_sphere(&self) -> Option<BoundingSphere> {
        let state = self.0.borrow();
        state.sphere.or(state.aabb.map(BoundingSphere::from))
    }

    fn geometry(&self) -> GeometryParams {
        self.0.borrow().geometry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_alias_the_same_node() {
        let node = SceneNode::new(7);
        let mut alias = node.clone();
        alias.set_pose(Vec3::new(1.0, 2.0, 3.0), Quat::identity());

        assert!(node.ptr_eq(&alias));
        assert_eq!(node.translation(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn set_pose_leaves_scale_alone() {
        let mut node = SceneNode::new(1).with_scale(Vec3::new(2.0, 3.0, 4.0));
        node.set_pose(Vec3::zeros(), Quat::from_euler_angles(0.0, 0.5, 0.0));
        assert_eq!(node.scale(), Vec3::new(2.0, 3.0, 4.0));
    }

    #[test]
    fn ball_bounding_sphere_matches_radius() {
        let node = SceneNode::ball(3, 0.5);
        let sphere = node.bounding_sphere().expect("ball has bounds");
        assert!((sphere.radius - 0.5).abs() < 1.0e-6);
    }

    #[test]
    fn cuboid_bounding_sphere_encloses_box() {
        let node = SceneNode::cuboid(4, Vec3::new(2.0, 2.0, 2.0));
        let sphere = node.bounding_sphere().expect("cuboid has bounds");
        assert!((sphere.radius - 3.0f32.sqrt()).abs() < 1.0e-6);
    }

    #[test]
    fn default_geometry_is_other() {
        assert_eq!(SceneNode::new(2).geometry(), GeometryParams::Other);
    }
}
