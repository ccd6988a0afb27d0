use rapier3d::prelude::*;

use crate::{
    error::{Result, WorldError},
    scene::{GeometryParams, SceneObject},
    types::{Aabb, BoundingSphere, Vec3},
};

/// Collision shapes a body can be built from.
///
/// Every variant carries only the parameters it needs. Values are local-space
/// and unscaled until [`ShapeDef::scaled`] is applied.
#[derive(Clone, Debug, PartialEq)]
pub enum ShapeDef {
    /// Oriented box with given half-extents (meters).
    Box { half_extents: Vec3 },

    /// Sphere/ball (meters).
    Sphere { radius: f32 },

    /// Y-aligned cylinder (meters).
    Cylinder { radius: f32, half_height: f32 },

    /// Y-aligned cone (meters). `half_height` is half the apex-to-base distance.
    Cone { radius: f32, half_height: f32 },

    /// Convex hull of a local-space point cloud.
    ConvexHull { points: Vec<Vec3> },
}

/// Which shape to infer from a scene object in `WorldManager::build_body_for`.
#[derive(Clone, Debug, PartialEq)]
pub enum ShapeKind {
    /// Box from the object's local bounding box, or a thin box for planar geometry.
    Box,
    /// Sphere from the object's bounding sphere.
    Sphere,
    /// Cylinder from the object's bounding-box footprint.
    Cylinder,
    /// Cone from the object's cone geometry parameters.
    Cone,
    /// Convex hull from an explicit vertex list.
    ConvexHull(Vec<Vec3>),
}

impl ShapeDef {
    /// Box covering `aabb`, with every edge at least `min_length` long.
    ///
    /// Flat inputs (a plane's zero thickness) therefore produce a half-extent of
    /// `min_length / 2` on the flat axis instead of a degenerate shape.
    pub fn box_from_aabb(aabb: &Aabb, min_length: f32) -> Self {
        let size = aabb.size().map(|edge| edge.max(min_length));
        ShapeDef::Box {
            half_extents: size * 0.5,
        }
    }

    pub fn sphere_from_bounds(sphere: &BoundingSphere) -> Self {
        ShapeDef::Sphere {
            radius: sphere.radius,
        }
    }

    /// Cylinder standing on the bounding-box footprint: radius is half of
    /// `max(width, depth)`, height is the box height.
    pub fn cylinder_from_aabb(aabb: &Aabb) -> Self {
        let size = aabb.size();
        ShapeDef::Cylinder {
            radius: size.x.max(size.z) * 0.5,
            half_height: size.y * 0.5,
        }
    }

    /// Cone from base radius and full height.
    pub fn cone(radius: f32, height: f32) -> Self {
        ShapeDef::Cone {
            radius,
            half_height: height * 0.5,
        }
    }

    pub fn convex_hull(points: Vec<Vec3>) -> Self {
        ShapeDef::ConvexHull { points }
    }

    /// Resolve a [`ShapeKind`] against a scene object's geometry queries.
    pub fn infer<O: SceneObject>(object: &O, kind: ShapeKind, min_length: f32) -> Result<Self> {
        let missing = |needed| WorldError::MissingBounds {
            id: object.id(),
            needed,
        };

        match kind {
            ShapeKind::Box => match object.geometry() {
                GeometryParams::Plane { width, height } => {
                    let aabb = Aabb::from_size(Vec3::new(width, height, 0.0));
                    Ok(Self::box_from_aabb(&aabb, min_length))
                }
                _ => object
                    .local_aabb()
                    .map(|aabb| Self::box_from_aabb(&aabb, min_length))
                    .ok_or_else(|| missing("bounding box")),
            },
            ShapeKind::Sphere => object
                .bounding_sphere()
                .map(|sphere| Self::sphere_from_bounds(&sphere))
                .ok_or_else(|| missing("bounding sphere")),
            ShapeKind::Cylinder => object
                .local_aabb()
                .map(|aabb| Self::cylinder_from_aabb(&aabb))
                .ok_or_else(|| missing("bounding box")),
            ShapeKind::Cone => match object.geometry() {
                GeometryParams::Cone { radius, height } => Ok(Self::cone(radius, height)),
                _ => Err(missing("cone geometry")),
            },
            ShapeKind::ConvexHull(points) => Ok(Self::convex_hull(points)),
        }
    }

    /// Apply a local scale to the shape dimensions.
    ///
    /// Round shapes cannot scale non-uniformly, so spheres take the largest axis
    /// and cylinders/cones take the largest horizontal axis for their radius.
    pub fn scaled(&self, scale: &Vec3) -> Result<Self> {
        if !scale.iter().all(|s| s.is_finite() && *s != 0.0) {
            return Err(WorldError::InvalidScale);
        }
        let s = scale.abs();
        let radial = s.x.max(s.z);

        Ok(match self {
            ShapeDef::Box { half_extents } => ShapeDef::Box {
                half_extents: half_extents.component_mul(&s),
            },
            ShapeDef::Sphere { radius } => ShapeDef::Sphere {
                radius: radius * s.max(),
            },
            ShapeDef::Cylinder {
                radius,
                half_height,
            } => ShapeDef::Cylinder {
                radius: radius * radial,
                half_height: half_height * s.y,
            },
            ShapeDef::Cone {
                radius,
                half_height,
            } => ShapeDef::Cone {
                radius: radius * radial,
                half_height: half_height * s.y,
            },
            ShapeDef::ConvexHull { points } => ShapeDef::ConvexHull {
                points: points.iter().map(|p| p.component_mul(scale)).collect(),
            },
        })
    }

    /// Check every dimension is finite and strictly positive.
    pub fn validate(&self) -> Result<()> {
        fn positive(what: &'static str, value: f32) -> Result<()> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(WorldError::InvalidDimension { what, value })
            }
        }

        match self {
            ShapeDef::Box { half_extents } => {
                positive("box half-extent x", half_extents.x)?;
                positive("box half-extent y", half_extents.y)?;
                positive("box half-extent z", half_extents.z)
            }
            ShapeDef::Sphere { radius } => positive("sphere radius", *radius),
            ShapeDef::Cylinder {
                radius,
                half_height,
            } => {
                positive("cylinder radius", *radius)?;
                positive("cylinder half-height", *half_height)
            }
            ShapeDef::Cone {
                radius,
                half_height,
            } => {
                positive("cone radius", *radius)?;
                positive("cone half-height", *half_height)
            }
            ShapeDef::ConvexHull { points } => {
                if points.len() < 4 || !points.iter().flatten().all(|c| c.is_finite()) {
                    return Err(WorldError::DegenerateHull(points.len()));
                }
                Ok(())
            }
        }
    }

    /// Build the Rapier shape.
    ///
    /// `margin` becomes a rounded border carved out of the outer dimensions, so
    /// the collision extents match the requested size. It is clamped to half the
    /// smallest dimension and ignored for spheres, whose radius already is the margin.
    /// Hulls are the exception: their vertices are kept and the border grows outward.
    pub fn to_shared_shape(&self, margin: f32) -> Result<SharedShape> {
        self.validate()?;
        let margin = if margin.is_finite() { margin.max(0.0) } else { 0.0 };

        let shape = match self {
            ShapeDef::Box { half_extents } => {
                let border = margin.min(half_extents.min() * 0.5);
                let inner = half_extents.add_scalar(-border);
                if border > 0.0 {
                    SharedShape::round_cuboid(inner.x, inner.y, inner.z, border)
                } else {
                    SharedShape::cuboid(inner.x, inner.y, inner.z)
                }
            }

            ShapeDef::Sphere { radius } => SharedShape::ball(*radius),

            ShapeDef::Cylinder {
                radius,
                half_height,
            } => {
                let border = margin.min(radius.min(*half_height) * 0.5);
                if border > 0.0 {
                    SharedShape::round_cylinder(half_height - border, radius - border, border)
                } else {
                    SharedShape::cylinder(*half_height, *radius)
                }
            }

            ShapeDef::Cone {
                radius,
                half_height,
            } => {
                let border = margin.min(radius.min(*half_height) * 0.5);
                if border > 0.0 {
                    SharedShape::round_cone(half_height - border, radius - border, border)
                } else {
                    SharedShape::cone(*half_height, *radius)
                }
            }

            ShapeDef::ConvexHull { points } => {
                let points: Vec<Point<Real>> = points.iter().map(|p| Point::from(*p)).collect();
                let hull = if margin > 0.0 {
                    SharedShape::round_convex_hull(&points, margin)
                } else {
                    SharedShape::convex_hull(&points)
                };
                hull.ok_or(WorldError::DegenerateHull(points.len()))?
            }
        };

        Ok(shape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneNode;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1.0e-6
    }

    #[test]
    fn flat_aabb_box_uses_min_length() {
        // Zero width on X must not produce a zero half-extent.
        let aabb = Aabb::new(Vec3::new(0.0, -1.0, -2.0), Vec3::new(0.0, 1.0, 2.0));
        let ShapeDef::Box { half_extents } = ShapeDef::box_from_aabb(&aabb, 0.01) else {
            panic!("expected a box");
        };

        assert!(approx(half_extents.x, 0.005));
        assert!(approx(half_extents.y, 1.0));
        assert!(approx(half_extents.z, 2.0));
        assert!(ShapeDef::Box { half_extents }.to_shared_shape(0.01).is_ok());
    }

    #[test]
    fn cylinder_radius_uses_wider_footprint_axis() {
        let aabb = Aabb::from_size(Vec3::new(1.0, 3.0, 2.0));
        assert_eq!(
            ShapeDef::cylinder_from_aabb(&aabb),
            ShapeDef::Cylinder {
                radius: 1.0,
                half_height: 1.5
            }
        );
    }

    #[test]
    fn zero_height_cylinder_is_rejected() {
        let aabb = Aabb::from_size(Vec3::new(1.0, 0.0, 1.0));
        let err = ShapeDef::cylinder_from_aabb(&aabb)
            .to_shared_shape(0.01)
            .unwrap_err();
        assert!(matches!(err, WorldError::InvalidDimension { .. }));
    }

    #[test]
    fn plane_geometry_infers_thin_box() {
        let node = SceneNode::new(9).with_geometry(GeometryParams::Plane {
            width: 4.0,
            height: 2.0,
        });
        let shape = ShapeDef::infer(&node, ShapeKind::Box, 0.02).unwrap();
        assert_eq!(
            shape,
            ShapeDef::Box {
                half_extents: Vec3::new(2.0, 1.0, 0.01)
            }
        );
    }

    #[test]
    fn cone_inference_requires_cone_geometry() {
        let node = SceneNode::cuboid(5, Vec3::new(1.0, 1.0, 1.0));
        let err = ShapeDef::infer(&node, ShapeKind::Cone, 0.01).unwrap_err();
        assert_eq!(
            err,
            WorldError::MissingBounds {
                id: 5,
                needed: "cone geometry"
            }
        );

        let cone = SceneNode::new(6).with_geometry(GeometryParams::Cone {
            radius: 0.5,
            height: 2.0,
        });
        assert_eq!(
            ShapeDef::infer(&cone, ShapeKind::Cone, 0.01).unwrap(),
            ShapeDef::Cone {
                radius: 0.5,
                half_height: 1.0
            }
        );
    }

    #[test]
    fn scaling_applies_per_axis_and_rejects_zero() {
        let shape = ShapeDef::Box {
            half_extents: Vec3::new(1.0, 1.0, 1.0),
        };
        assert_eq!(
            shape.scaled(&Vec3::new(2.0, -3.0, 0.5)).unwrap(),
            ShapeDef::Box {
                half_extents: Vec3::new(2.0, 3.0, 0.5)
            }
        );
        assert_eq!(
            shape.scaled(&Vec3::new(1.0, 0.0, 1.0)).unwrap_err(),
            WorldError::InvalidScale
        );
    }

    #[test]
    fn margin_does_not_inflate_box() {
        let shape = ShapeDef::Box {
            half_extents: Vec3::new(1.0, 0.5, 2.0),
        };
        let aabb = shape
            .to_shared_shape(0.05)
            .unwrap()
            .compute_local_aabb();
        let half = aabb.half_extents();
        assert!(approx(half.x, 1.0));
        assert!(approx(half.y, 0.5));
        assert!(approx(half.z, 2.0));
    }

    #[test]
    fn hull_needs_enough_points() {
        let flat = ShapeDef::convex_hull(vec![Vec3::zeros(), Vec3::x(), Vec3::y()]);
        assert_eq!(flat.validate(), Err(WorldError::DegenerateHull(3)));

        let tetra = ShapeDef::convex_hull(vec![Vec3::zeros(), Vec3::x(), Vec3::y(), Vec3::z()]);
        assert!(tetra.to_shared_shape(0.0).is_ok());
        assert!(tetra.to_shared_shape(0.01).is_ok());
    }
}
