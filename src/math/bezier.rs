use super::curve::ParametricCurve2d;
use super::{Point2d, Vector2d};
use crate::util::Interval;
use cgmath::prelude::*;

/// A straight line segment
#[derive(Copy, Clone, Debug)]
pub struct LineSegment2d {
    points: [Point2d; 2],
}

impl LineSegment2d {
    pub const fn from_ends(start: Point2d, end: Point2d) -> Self {
        Self {
            points: [start, end],
        }
    }
}

impl ParametricCurve2d for LineSegment2d {
    fn sample(&self, t: f64) -> Point2d {
        self.points[0] + t * (self.points[1] - self.points[0])
    }

    fn bounds(&self) -> Interval<f64> {
        Interval { min: 0.0, max: 1.0 }
    }

    fn sample_dt(&self, _t: f64) -> Vector2d {
        self.points[1] - self.points[0]
    }

    fn sample_dt2(&self, _t: f64) -> Vector2d {
        Vector2d::zero()
    }
}

/// A cubic bezier curve
#[derive(Copy, Clone, Debug)]
pub struct CubicBezier2d {
    points: [Point2d; 4],
}

impl CubicBezier2d {
    pub const fn new(points: &[Point2d; 4]) -> Self {
        Self { points: *points }
    }

    /// Creates a curve leaving `start` along `start_dir` and arriving at `end` along `end_dir`,
    /// with each control point a third of the chord length from its end point.
    pub fn from_tangents(start: Point2d, start_dir: Vector2d, end: Point2d, end_dir: Vector2d) -> Self {
        let reach = start.distance(end) / 3.0;
        Self {
            points: [start, start + reach * start_dir, end - reach * end_dir, end],
        }
    }
}

impl ParametricCurve2d for CubicBezier2d {
    fn sample(&self, t: f64) -> Point2d {
        let t1 = 1.0 - t;
        Point2d::from_vec(
            t1 * t1 * t1 * self.points[0].to_vec()
                + 3.0 * t1 * t1 * t * self.points[1].to_vec()
                + 3.0 * t1 * t * t * self.points[2].to_vec()
                + t * t * t * self.points[3].to_vec(),
        )
    }

    fn bounds(&self) -> Interval<f64> {
        Interval { min: 0.0, max: 1.0 }
    }

    fn sample_dt(&self, t: f64) -> Vector2d {
        let t1 = 1.0 - t;
        (-3.0 * t1 * t1) * self.points[0].to_vec()
            + (9.0 * t * t - 12.0 * t + 3.0) * self.points[1].to_vec()
            + (-9.0 * t * t + 6.0 * t) * self.points[2].to_vec()
            + (3.0 * t * t) * self.points[3].to_vec()
    }

    fn sample_dt2(&self, t: f64) -> Vector2d {
        let t1 = 1.0 - t;
        (6.0 * t1) * self.points[0].to_vec()
            + (18.0 * t - 12.0) * self.points[1].to_vec()
            + (6.0 - 18.0 * t) * self.points[2].to_vec()
            + (6.0 * t) * self.points[3].to_vec()
    }
}
