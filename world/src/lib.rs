pub mod body;
pub mod collision_index;
pub mod error;
pub mod manager;
pub mod maze;
pub mod scene;
pub mod settings;
pub mod shape;
pub mod types;

pub use body::{BodyDef, MassParams, PhysicsBody, build_body};
pub use collision_index::CollisionIndex;
pub use error::{Result, WorldError};
pub use manager::WorldManager;
pub use maze::{MazeLayout, TEST_MAZE};
pub use scene::{GeometryParams, SceneNode, SceneObject, SceneObjectId};
pub use settings::{
    BACK, DEFAULT_GRAVITY_Y, DEFAULT_MARGIN, DEFAULT_MAX_SUB_STEPS, DEFAULT_RAY_DISTANCE,
    DEFAULT_SOLVER_SUB_STEPS, FIXED_TIME_STEP, FORWARD, WorldSettings,
};
pub use shape::{ShapeDef, ShapeKind};
pub use types::{Aabb, BoundingSphere, Quat, Transform, Vec3};

pub use rapier3d;
