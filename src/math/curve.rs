use super::{Point2d, Vector2d};
use crate::util::Interval;
pub use algorithms::*;

mod algorithms;

/// A parametric curve in the horizontal plane, used to model the centreline of a rail.
pub trait ParametricCurve2d {
    /// Samples the parametric curve.
    fn sample(&self, t: f64) -> Point2d;

    /// Returns the minimum and maximum t-values that define the bounds of the curve.
    fn bounds(&self) -> Interval<f64>;

    /// Samples the derivative of the parametric curve.
    fn sample_dt(&self, t: f64) -> Vector2d;

    /// Samples the second derivative of the parametric curve.
    fn sample_dt2(&self, t: f64) -> Vector2d;
}
