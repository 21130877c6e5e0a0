use super::ParametricCurve2d;
use crate::{math::Point2d, util::Interval};
use cgmath::prelude::*;
use itertools::Itertools;

/// The number of samples used when searching for the tightest point of a curve.
const RADIUS_SAMPLES: usize = 32;

/// Approximates the arc length of a curve by summing the lengths of
/// subdivided segments no longer than `max_length` units.
pub fn curve_length(curve: &impl ParametricCurve2d, max_length: f64) -> f64 {
    SubdividedSamples::new(curve, max_length)
        .map(|(_, p)| p)
        .tuple_windows()
        .map(|(a, b)| a.distance(b))
        .sum()
}

/// Finds the smallest radius of curvature along a curve.
/// Returns infinity for a curve with no curvature.
pub fn min_radius_of_curvature(curve: &impl ParametricCurve2d) -> f64 {
    let bounds = curve.bounds();
    (0..=RADIUS_SAMPLES)
        .map(|i| bounds.lerp(i as f64 / RADIUS_SAMPLES as f64))
        .map(|t| {
            let d1 = curve.sample_dt(t);
            let d2 = curve.sample_dt2(t);
            let cross = (d1.x * d2.y - d1.y * d2.x).abs();
            if cross < 1e-9 {
                f64::INFINITY
            } else {
                d1.magnitude().powi(3) / cross
            }
        })
        .fold(f64::INFINITY, f64::min)
}

/// Samples along a curve, subdivided until consecutive points are no more than a given distance apart.
struct SubdividedSamples<'a, C> {
    curve: &'a C,
    stack: Vec<(f64, Point2d)>,
    length2: f64,
}

impl<'a, C: ParametricCurve2d> SubdividedSamples<'a, C> {
    fn new(curve: &'a C, max_length: f64) -> Self {
        let Interval { min, max } = curve.bounds();
        let mid = 0.5 * (min + max);
        Self {
            curve,
            stack: vec![
                (max, curve.sample(max)),
                (mid, curve.sample(mid)),
                (min, curve.sample(min)),
            ],
            length2: max_length.powi(2),
        }
    }
}

impl<'a, C: ParametricCurve2d> Iterator for SubdividedSamples<'a, C> {
    type Item = (f64, Point2d);

    fn next(&mut self) -> Option<Self::Item> {
        let (t1, p1) = self.stack.pop()?;
        if let Some((mut t2, mut p2)) = self.stack.last().copied() {
            while (p2 - p1).magnitude2() > self.length2 {
                let mid_t = 0.5 * (t1 + t2);
                (t2, p2) = (mid_t, self.curve.sample(mid_t));
                self.stack.push((t2, p2));
            }
        }
        Some((t1, p1))
    }
}
