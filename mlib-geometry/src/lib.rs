//! Geometry primitives for the mlib engine: bounding volumes, planes, and
//! the line/triangle intersection and SAT-normal-tracking routines the
//! collision pipeline (`mlib-physics`) is built on.
//!
//! Grounded on `fyrox-math`'s `aabb.rs`/`plane.rs`/`ray.rs` for the
//! `nalgebra`-first style, and on `examples/original_source/Mlib/Geometry`
//! for the exact shapes (`BoundingSphere`, `BoundingBox`, `Sat_Normals.hpp`)
//! the spec's Component B describes.

pub mod bounding_box;
pub mod bounding_sphere;
pub mod line_triangle;
pub mod plane;
pub mod sat;

pub use bounding_box::BoundingBox;
pub use bounding_sphere::BoundingSphere;
pub use line_triangle::{line_intersects_triangle, LineTriangleIntersection};
pub use plane::Plane;
pub use sat::SatTracker;

use std::fmt;

/// Errors raised while constructing or querying geometry primitives.
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryError {
    EmptyBoundingInput,
    DegenerateTriangle,
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeometryError::EmptyBoundingInput => {
                write!(f, "bounding volume received no elements")
            }
            GeometryError::DegenerateTriangle => write!(f, "triangle is degenerate"),
        }
    }
}

impl std::error::Error for GeometryError {}
