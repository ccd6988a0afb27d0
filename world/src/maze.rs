//! Grid maze layout.
//!
//! A maze is a row-major grid of cells where `1` marks a wall cube. Cell `(ix, iy)`
//! maps to world `x = cube_size * ix`, `z = cube_size * iy`, with cubes resting
//! on the `y = 0` plane. Walls become static boxes in a [`WorldManager`].

use crate::{
    body::{BodyDef, MassParams},
    error::{Result, WorldError},
    manager::WorldManager,
    scene::SceneObject,
    shape::ShapeDef,
    types::Vec3,
};

/// Cell value of a wall.
pub const WALL: u8 = 1;

/// Small 5x5 sample maze: a ring of walls with one inner wall segment.
pub const TEST_MAZE: [u8; 25] = [
    1, 1, 1, 1, 1, //
    1, 0, 1, 0, 1, //
    1, 0, 1, 0, 1, //
    1, 0, 0, 0, 1, //
    1, 1, 1, 1, 1, //
];

#[derive(Clone, Debug, PartialEq)]
pub struct MazeLayout {
    cells: Vec<u8>,
    width: usize,
    height: usize,
    cube_size: f32,
}

impl MazeLayout {
    pub fn new(cells: Vec<u8>, width: usize, height: usize, cube_size: f32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(WorldError::InvalidMaze(format!(
                "dimensions must be non-zero, got {width}x{height}"
            )));
        }
        if cells.len() != width * height {
            return Err(WorldError::InvalidMaze(format!(
                "expected {} cells for {width}x{height}, got {}",
                width * height,
                cells.len()
            )));
        }
        if !cube_size.is_finite() || cube_size <= 0.0 {
            return Err(WorldError::InvalidDimension {
                what: "maze cube size",
                value: cube_size,
            });
        }

        Ok(Self {
            cells,
            width,
            height,
            cube_size,
        })
    }

    /// The 5x5 [`TEST_MAZE`] with the given cube size.
    pub fn test_maze(cube_size: f32) -> Result<Self> {
        Self::new(TEST_MAZE.to_vec(), 5, 5, cube_size)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cube_size(&self) -> f32 {
        self.cube_size
    }

    /// Row-major index of `(ix, iy)`, or `None` outside the grid.
    pub fn index_of(&self, ix: i64, iy: i64) -> Option<usize> {
        let ix = usize::try_from(ix).ok().filter(|&ix| ix < self.width)?;
        let iy = usize::try_from(iy).ok().filter(|&iy| iy < self.height)?;
        Some(iy * self.width + ix)
    }

    /// World-space centre of the cube at `(ix, iy)`.
    pub fn position_of(&self, ix: i64, iy: i64) -> Vec3 {
        Vec3::new(
            self.cube_size * ix as f32,
            self.cube_size * 0.5,
            self.cube_size * iy as f32,
        )
    }

    /// Grid coordinates of the cell containing world `(x, z)`. May lie outside the grid.
    pub fn cell_at_position(&self, x: f32, z: f32) -> (i64, i64) {
        (
            (x / self.cube_size).floor() as i64,
            (z / self.cube_size).floor() as i64,
        )
    }

    pub fn cell_type(&self, ix: i64, iy: i64) -> Option<u8> {
        self.index_of(ix, iy).map(|i| self.cells[i])
    }

    pub fn is_wall(&self, ix: i64, iy: i64) -> bool {
        self.cell_type(ix, iy) == Some(WALL)
    }

    /// Every wall cell with its world position, in row-major order.
    pub fn walls(&self) -> impl Iterator<Item = (i64, i64, Vec3)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &cell)| cell == WALL)
            .map(|(i, _)| {
                let ix = (i % self.width) as i64;
                let iy = (i / self.width) as i64;
                (ix, iy, self.position_of(ix, iy))
            })
    }

    /// Wall cells inside a `window_w x window_h` block centred on the cell that
    /// contains world `(x, z)`. Cells outside the grid are skipped.
    pub fn walls_around(&self, x: f32, z: f32, window_w: usize, window_h: usize) -> Vec<(i64, i64)> {
        let (cx, cz) = self.cell_at_position(x, z);
        let x0 = cx - (window_w / 2) as i64;
        let z0 = cz - (window_h / 2) as i64;

        (z0..z0 + window_h as i64)
            .flat_map(|iy| (x0..x0 + window_w as i64).map(move |ix| (ix, iy)))
            .filter(|&(ix, iy)| self.is_wall(ix, iy))
            .collect()
    }

    /// Static box body definition for the wall at `(ix, iy)`.
    pub fn wall_body(&self, ix: i64, iy: i64) -> Option<BodyDef> {
        if !self.is_wall(ix, iy) {
            return None;
        }
        let half = self.cube_size * 0.5;
        Some(
            BodyDef::new(ShapeDef::Box {
                half_extents: Vec3::new(half, half, half),
            })
            .translation(self.position_of(ix, iy))
            .mass(MassParams::fixed()),
        )
    }

    /// Register one static body per wall. `make_object` supplies the scene object
    /// for each wall cell; walls whose object id is already registered are skipped.
    ///
    /// Returns the number of walls registered.
    pub fn register_walls<O, F>(&self, world: &mut WorldManager<O>, mut make_object: F) -> Result<usize>
    where
        O: SceneObject,
        F: FnMut(i64, i64, Vec3) -> O,
    {
        let mut registered = 0;
        for (ix, iy, position) in self.walls() {
            let Some(def) = self.wall_body(ix, iy) else {
                continue;
            };
            let body = world.build_body(&def)?;
            if world.register(make_object(ix, iy, position), body) {
                registered += 1;
            }
        }
        Ok(registered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        scene::{SceneNode, SceneObjectId},
        settings::FIXED_TIME_STEP,
        shape::ShapeKind,
    };

    fn maze() -> MazeLayout {
        MazeLayout::test_maze(2.0).unwrap()
    }

    #[test]
    fn rejects_mismatched_cell_count() {
        let err = MazeLayout::new(vec![1, 0, 1], 2, 2, 1.0).unwrap_err();
        assert!(matches!(err, WorldError::InvalidMaze(_)));
        assert!(MazeLayout::new(vec![], 0, 0, 1.0).is_err());
        assert!(MazeLayout::new(vec![1], 1, 1, 0.0).is_err());
    }

    #[test]
    fn index_of_covers_origin_and_rejects_outside() {
        let maze = maze();
        assert_eq!(maze.index_of(0, 0), Some(0));
        assert_eq!(maze.index_of(4, 4), Some(24));
        assert_eq!(maze.index_of(5, 0), None);
        assert_eq!(maze.index_of(-1, 2), None);
        assert_eq!(maze.cell_type(0, 0), Some(WALL));
        assert_eq!(maze.cell_type(1, 1), Some(0));
    }

    #[test]
    fn positions_and_cells_agree() {
        let maze = maze();
        assert_eq!(maze.position_of(3, 1), Vec3::new(6.0, 1.0, 2.0));
        assert_eq!(maze.cell_at_position(6.5, 2.1), (3, 1));
        assert_eq!(maze.cell_at_position(-0.5, 0.0), (-1, 0));
    }

    #[test]
    fn walls_lists_every_wall_cell() {
        let walls: Vec<_> = maze().walls().collect();
        assert_eq!(walls.len(), TEST_MAZE.iter().filter(|&&c| c == WALL).count());
        assert_eq!(walls[0], (0, 0, Vec3::new(0.0, 1.0, 0.0)));
    }

    #[test]
    fn walls_around_uses_centred_window() {
        let maze = maze();
        // Centre cell (1, 1) is open; its 3x3 window holds the corner ring and the inner wall.
        let around = maze.walls_around(2.5, 2.5, 3, 3);
        assert_eq!(
            around,
            vec![(0, 0), (1, 0), (2, 0), (0, 1), (2, 1), (0, 2), (2, 2)]
        );

        // A window hanging off the grid only reports cells inside it.
        let corner = maze.walls_around(0.0, 0.0, 3, 3);
        assert_eq!(corner, vec![(0, 0), (1, 0), (0, 1)]);
    }

    #[test]
    fn open_cells_have_no_wall_body() {
        let maze = maze();
        assert!(maze.wall_body(1, 1).is_none());
        let def = maze.wall_body(0, 0).unwrap();
        assert!(def.mass.is_static());
        assert_eq!(
            def.shape,
            ShapeDef::Box {
                half_extents: Vec3::new(1.0, 1.0, 1.0)
            }
        );
    }

    #[test]
    fn ball_against_wall_reports_contact() {
        let maze = maze();
        // Sideways gravity keeps the ball pressed against the wall.
        let mut world = WorldManager::new(Vec3::new(2.0, -9.8, 0.0), 4).unwrap();

        let wall_id = |ix: i64, iy: i64| -> SceneObjectId { 100 + (iy * 5 + ix) as SceneObjectId };
        let count = maze
            .register_walls(&mut world, |ix, iy, position| {
                SceneNode::new(wall_id(ix, iy)).with_translation(position)
            })
            .unwrap();
        assert_eq!(count, maze.walls().count());

        // Floor under the open cells.
        let floor = SceneNode::cuboid(1, Vec3::new(20.0, 0.2, 20.0))
            .with_translation(Vec3::new(4.0, -0.1, 4.0));
        let body = world
            .build_body_for(&floor, ShapeKind::Box, MassParams::fixed())
            .unwrap();
        world.register(floor, body);

        // Ball next to the inner wall at (2, 1), whose face is at x = 3.
        let ball = SceneNode::ball(2, 0.5).with_translation(Vec3::new(2.4, 0.5, 2.0));
        let body = world
            .build_body_for(&ball, ShapeKind::Sphere, MassParams::default())
            .unwrap();
        world.register(ball.clone(), body);

        for _ in 0..30 {
            world.update(FIXED_TIME_STEP, 1).unwrap();
        }

        assert!(world.is_contacting(2, 1));
        assert!(world.is_contacting(2, wall_id(2, 1)));
        assert!(!world.is_contacting(2, wall_id(0, 0)));
    }
}
