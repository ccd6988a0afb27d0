//! Rigid-body world manager.
//!
//! Owns a Rapier simulation world and the association between scene objects and
//! the bodies simulated for them.
//!
//! Responsibilities
//! - Own every Rapier structure of one world (pipeline, islands, broad/narrow
//!   phase, body/collider/joint sets, CCD solver). They are created and dropped
//!   together as one value.
//! - Keep an explicit two-way association: scene object id → registration, and
//!   rigid-body handle → scene object id. Nothing is attached to scene objects.
//! - Step the simulation on a fixed-step accumulator, copy the resulting poses
//!   onto the registered scene objects, and rebuild the [`CollisionIndex`].
//!
//! Ownership
//! - Bodies and colliders created through this manager are released exactly once,
//!   by [`WorldManager::unregister`] or when the manager is dropped.
//! - Scene objects are never destroyed; `unregister` hands the stored handle back.
//!
//! Threading
//! - All mutation goes through `&mut self`. The manager is meant to be driven from
//!   a single thread; callers sharing it must serialize access themselves.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::num::NonZeroUsize;

use rapier3d::prelude::*;

use crate::{
    body::{BodyDef, MassParams, PhysicsBody, build_body},
    collision_index::CollisionIndex,
    error::{Result, WorldError},
    scene::{SceneObject, SceneObjectId},
    settings::WorldSettings,
    shape::{ShapeDef, ShapeKind},
    types::{Transform, Vec3},
};

struct Registration<O> {
    object: O,
    body: RigidBodyHandle,
    collider: ColliderHandle,
}

pub struct WorldManager<O: SceneObject> {
    settings: WorldSettings,
    integration_parameters: IntegrationParameters,
    /// Simulated time not yet consumed by fixed steps.
    accumulator: f32,

    pipeline: PhysicsPipeline,
    collision_pipeline: CollisionPipeline,
    islands: IslandManager,
    broad_phase: BroadPhaseBvh,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,

    registrations: BTreeMap<SceneObjectId, Registration<O>>,
    owners: HashMap<RigidBodyHandle, SceneObjectId>,
    collisions: CollisionIndex,
    /// Reused by every transform sync; empty between updates.
    scratch: Vec<(SceneObjectId, Transform)>,
}

impl<O: SceneObject> WorldManager<O> {
    /// Create a world with the given gravity and solver iterations per step.
    pub fn new(gravity: Vec3, sub_step_count: usize) -> Result<Self> {
        Self::with_settings(WorldSettings {
            gravity,
            solver_sub_steps: sub_step_count,
            ..WorldSettings::default()
        })
    }

    pub fn with_settings(settings: WorldSettings) -> Result<Self> {
        if !settings.gravity.iter().all(|g| g.is_finite()) {
            return Err(WorldError::InvalidGravity);
        }
        if !settings.fixed_time_step.is_finite() || settings.fixed_time_step <= 0.0 {
            return Err(WorldError::InvalidTimeStep(settings.fixed_time_step));
        }
        let solver_iterations =
            NonZeroUsize::new(settings.solver_sub_steps).ok_or(WorldError::InvalidSubSteps)?;

        let mut integration_parameters = IntegrationParameters {
            dt: settings.fixed_time_step,
            ..IntegrationParameters::default()
        };
        integration_parameters.num_solver_iterations = solver_iterations.get();

        log::debug!(
            "Creating physics world: gravity={:?}, solver iterations={}",
            settings.gravity,
            settings.solver_sub_steps
        );

        Ok(Self {
            settings,
            integration_parameters,
            accumulator: 0.0,
            pipeline: PhysicsPipeline::new(),
            collision_pipeline: CollisionPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: BroadPhaseBvh::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            registrations: BTreeMap::new(),
            owners: HashMap::new(),
            collisions: CollisionIndex::new(),
            scratch: Vec::new(),
        })
    }

    pub fn settings(&self) -> &WorldSettings {
        &self.settings
    }

    pub fn gravity(&self) -> Vec3 {
        self.settings.gravity
    }

    /// Change gravity and wake every body so resting bodies react to it.
    pub fn set_gravity(&mut self, gravity: Vec3) -> Result<()> {
        if !gravity.iter().all(|g| g.is_finite()) {
            return Err(WorldError::InvalidGravity);
        }
        self.settings.gravity = gravity;
        for (_, rb) in self.bodies.iter_mut() {
            rb.wake_up(true);
        }
        Ok(())
    }

    /// Build a body from an explicit definition. Nothing is inserted yet.
    pub fn build_body(&self, def: &BodyDef) -> Result<PhysicsBody> {
        build_body(def)
    }

    /// Build a body for `object`, inferring the shape from its geometry and taking
    /// its current pose and scale. Later scale changes are not tracked.
    pub fn build_body_for(&self, object: &O, kind: ShapeKind, mass: MassParams) -> Result<PhysicsBody> {
        let shape = ShapeDef::infer(object, kind, self.settings.min_box_length)?;
        let def = BodyDef::new(shape)
            .translation(object.translation())
            .rotation(object.rotation())
            .scale(object.scale())
            .mass(mass)
            .margin(self.settings.margin);
        build_body(&def)
    }

    /// Insert `body` into the world for `object`.
    ///
    /// Returns `false` without touching the world when the object's id is already
    /// registered; `body` is dropped in that case.
    pub fn register(&mut self, object: O, body: PhysicsBody) -> bool {
        let id = object.id();
        if self.registrations.contains_key(&id) {
            log::warn!("Scene object {id} is already registered, ignoring new body");
            return false;
        }

        let body_handle = self.bodies.insert(body.rigid_body);
        let collider =
            self.colliders
                .insert_with_parent(body.collider, body_handle, &mut self.bodies);

        self.owners.insert(body_handle, id);
        self.registrations.insert(
            id,
            Registration {
                object,
                body: body_handle,
                collider,
            },
        );
        log::debug!("Registered scene object {id} as {body_handle:?}");
        true
    }

    /// Remove the body of `id` from the world and release it.
    ///
    /// Returns the scene object handle that was stored at registration, or `None`
    /// when `id` is not registered.
    pub fn unregister(&mut self, id: SceneObjectId) -> Option<O> {
        let Some(registration) = self.registrations.remove(&id) else {
            log::debug!("Scene object {id} is not registered, nothing to remove");
            return None;
        };

        self.owners.remove(&registration.body);
        // Removing the body also removes its attached collider.
        self.bodies.remove(
            registration.body,
            &mut self.islands,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
        self.collisions.remove_object(id);

        log::debug!("Unregistered scene object {id}");
        Some(registration.object)
    }

    /// Advance the simulation by `dt` seconds and report the contacts of this step.
    ///
    /// Time is consumed in `fixed_time_step` increments, at most `max_sub_steps`
    /// per call; time beyond that budget is dropped. `max_sub_steps == 0` takes a
    /// single variable step of exactly `dt`. When no step is due (including
    /// `dt == 0`) a zero-length step still refreshes contacts.
    ///
    /// Contacts are detected on the final poses, so the returned index always
    /// describes the poses just written to the scene objects.
    ///
    /// After stepping every registered scene object receives its body's pose and
    /// the collision index is rebuilt from the narrow phase.
    pub fn update(&mut self, dt: f32, max_sub_steps: usize) -> Result<&CollisionIndex> {
        if !dt.is_finite() || dt < 0.0 {
            return Err(WorldError::InvalidTimeStep(dt));
        }

        let steps = self.integrate(dt, max_sub_steps);
        log::trace!("Physics update: dt={dt}, steps={steps}");

        self.sync_objects();
        self.rebuild_collisions();
        Ok(&self.collisions)
    }

    fn integrate(&mut self, dt: f32, max_sub_steps: usize) -> usize {
        if max_sub_steps == 0 {
            self.step(dt);
            if dt > 0.0 {
                self.refresh_contacts();
            }
            return usize::from(dt > 0.0);
        }

        let fixed = self.settings.fixed_time_step;
        self.accumulator += dt;
        let due = (self.accumulator / fixed).floor();
        self.accumulator -= due * fixed;

        let steps = (due as usize).min(max_sub_steps);
        if steps == 0 {
            self.step(0.0);
        }
        for _ in 0..steps {
            self.step(fixed);
        }
        if steps > 0 {
            self.refresh_contacts();
        }
        steps
    }

    fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
        self.pipeline.step(
            &self.settings.gravity,
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            &(),
            &(),
        );
    }

    /// Run collision detection on the current poses without integrating.
    ///
    /// A physics step detects contacts before it moves the bodies, so its
    /// manifolds lag one step behind the poses it produces. Must directly follow
    /// a physics step so no user changes to bodies are pending; the island
    /// manager would never see them.
    fn refresh_contacts(&mut self) {
        self.collision_pipeline.step(
            self.integration_parameters.prediction_distance(),
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &(),
            &(),
        );
    }

    fn sync_objects(&mut self) {
        let mut scratch = std::mem::take(&mut self.scratch);

        scratch.extend(self.registrations.iter().filter_map(|(&id, registration)| {
            self.bodies
                .get(registration.body)
                .map(|rb| (id, Transform::from(rb.position())))
        }));

        for (id, pose) in scratch.drain(..) {
            if let Some(registration) = self.registrations.get_mut(&id) {
                registration
                    .object
                    .set_pose(pose.translation, pose.rotation);
            }
        }

        self.scratch = scratch;
    }

    fn rebuild_collisions(&mut self) {
        self.collisions.clear();

        for pair in self.narrow_phase.contact_pairs() {
            if !pair.manifolds.iter().any(|m| !m.points.is_empty()) {
                continue;
            }

            let a = owner_of(&self.colliders, &self.owners, pair.collider1);
            let b = owner_of(&self.colliders, &self.owners, pair.collider2);
            match (a, b) {
                (Some(a), Some(b)) => self.collisions.insert_pair(a, b),
                _ => {
                    log::warn!(
                        "Skipping contact between {:?} and {:?}: collider has no registered scene object",
                        pair.collider1,
                        pair.collider2
                    );
                    self.collisions.note_skipped();
                }
            }
        }
    }

    /// Contacts found by the last [`Self::update`].
    pub fn collisions(&self) -> &CollisionIndex {
        &self.collisions
    }

    pub fn contacts_of(&self, id: SceneObjectId) -> &BTreeSet<SceneObjectId> {
        self.collisions.contacts_of(id)
    }

    pub fn is_contacting(&self, a: SceneObjectId, b: SceneObjectId) -> bool {
        self.collisions.is_contacting(a, b)
    }

    pub fn contains(&self, id: SceneObjectId) -> bool {
        self.registrations.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Registered ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = SceneObjectId> + '_ {
        self.registrations.keys().copied()
    }

    pub fn object(&self, id: SceneObjectId) -> Option<&O> {
        self.registrations.get(&id).map(|r| &r.object)
    }

    /// Current simulated pose of the body registered for `id`.
    pub fn body_transform(&self, id: SceneObjectId) -> Option<Transform> {
        let registration = self.registrations.get(&id)?;
        self.bodies
            .get(registration.body)
            .map(|rb| Transform::from(rb.position()))
    }

    /// Push the body pose of `id` onto its scene object outside of [`Self::update`].
    pub fn sync_object(&mut self, id: SceneObjectId) -> bool {
        let Some(pose) = self.body_transform(id) else {
            return false;
        };
        match self.registrations.get_mut(&id) {
            Some(registration) => {
                registration
                    .object
                    .set_pose(pose.translation, pose.rotation);
                true
            }
            None => false,
        }
    }

    /// Insert fixed world geometry that belongs to no scene object.
    ///
    /// Contacts against it are not reported in the collision index; they are
    /// counted in [`CollisionIndex::skipped_manifolds`].
    pub fn add_static(&mut self, shape: &ShapeDef, transform: Transform) -> Result<ColliderHandle> {
        if !transform.is_finite() {
            return Err(WorldError::InvalidPose);
        }
        let shared = shape.to_shared_shape(self.settings.margin)?;
        let mut collider = ColliderBuilder::new(shared).build();
        collider.set_position(transform.iso());
        Ok(self.colliders.insert(collider))
    }

    pub fn remove_static(&mut self, handle: ColliderHandle) -> bool {
        if self
            .colliders
            .get(handle)
            .is_none_or(|collider| collider.parent().is_some())
        {
            return false;
        }
        self.colliders
            .remove(handle, &mut self.islands, &mut self.bodies, true)
            .is_some()
    }

    /// Cast a ray from the body origin of `id` along `local_direction` rotated into
    /// world space, ignoring the body itself.
    ///
    /// Returns the scene object hit (`None` for unowned statics) and the hit
    /// distance. The broad phase only knows colliders that existed at the last
    /// [`Self::update`].
    pub fn cast_ray_from(
        &self,
        id: SceneObjectId,
        local_direction: Vec3,
        max_distance: f32,
    ) -> Option<(Option<SceneObjectId>, f32)> {
        let registration = self.registrations.get(&id)?;
        let pose = self.bodies.get(registration.body)?.position();

        let direction = pose.rotation * local_direction;
        if direction.norm_squared() <= f32::EPSILON {
            return None;
        }
        let ray = Ray::new(Point::from(pose.translation.vector), direction.normalize());

        let filter = QueryFilter::default().exclude_rigid_body(registration.body);
        let query_pipeline = self.query_pipeline(filter);
        let (collider, distance) = query_pipeline.cast_ray(&ray, max_distance.max(0.0), true)?;

        Some((owner_of(&self.colliders, &self.owners, collider), distance))
    }

    /// True when something lies closer than `max_distance` along the ray
    /// described in [`Self::cast_ray_from`].
    pub fn ray_hit_within(&self, id: SceneObjectId, local_direction: Vec3, max_distance: f32) -> bool {
        self.cast_ray_from(id, local_direction, max_distance)
            .is_some_and(|(_, distance)| distance < max_distance)
    }

    fn query_pipeline<'a>(&'a self, filter: QueryFilter<'a>) -> QueryPipeline<'a> {
        self.broad_phase.as_query_pipeline(
            self.narrow_phase.query_dispatcher(),
            &self.bodies,
            &self.colliders,
            filter,
        )
    }

    /// Rapier collider handle of the body registered for `id`.
    pub fn collider(&self, id: SceneObjectId) -> Option<ColliderHandle> {
        self.registrations.get(&id).map(|r| r.collider)
    }
}

/// Resolve a collider to the scene object registered for its parent body.
fn owner_of(
    colliders: &ColliderSet,
    owners: &HashMap<RigidBodyHandle, SceneObjectId>,
    handle: ColliderHandle,
) -> Option<SceneObjectId> {
    let body = colliders.get(handle)?.parent()?;
    owners.get(&body).copied()
}
