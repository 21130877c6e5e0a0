//! Mathematical structs and functions used to measure rail geometry.

use cgmath::{Point2, Vector2};
pub use bezier::{CubicBezier2d, LineSegment2d};
pub use curve::*;

mod bezier;
mod curve;

/// A 2D point
pub type Point2d = Point2<f64>;

/// A 2D vector
pub type Vector2d = Vector2<f64>;
