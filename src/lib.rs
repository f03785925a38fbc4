//! Spatial indices over 2D objects: an adaptive [`Quadtree`] that splits nodes on demand and
//! a [`LinearQuadtree`] with a fixed, flat skeleton addressed by Morton location codes.
//!
//! Both answer the same queries: every object that may overlap a point or an axis aligned
//! rectangle, and every object stored along a line segment. Results are candidates, callers
//! do the exact overlap tests.
//!
//! # Contracts:
//! - Queries never miss an object that overlaps the query inside the tree bounds.
//! - A query may report objects that do not overlap it.
//!
pub mod config;
pub mod geom;
pub mod linear_quadtree;
pub mod quadtree;
pub mod shape;

pub use config::{ConfigError, LinearConfig, QuadtreeConfig};
pub use geom::{
    has_intersect, intersect, line_side, point_side, polygon_side, LineSegment, Orientation,
    Point, Rectangle, Scalar,
};
pub use linear_quadtree::{LinearQuadtree, LocatorCode};
pub use quadtree::Quadtree;
pub use shape::{Shape, Spatial};
