//! Parametric curves with two components (x and y), reparameterized from an
//! internal parameter `t` in `[0, 1]` to the arc length parameter `s` in
//! `[0, length]`. All public queries take arc length; the unit-speed
//! normalization makes `deriv` the unit tangent and the higher derivatives
//! consistent with a unit-speed parameterization.

use crate::geometry::{Angle, Vector2d};
use crate::line::LineSegment;
use crate::math::EPSILON;
use crate::quintic::QuinticSpline;
use tracing::debug;

/// Default maximum distance between two arc length samples.
pub const MAX_SEGMENT_LENGTH: f64 = 0.25;
/// Default maximum number of times a curve interval can be subdivided.
pub const MAX_DEPTH: u32 = 15;
/// Default maximum change in curvature between two arc length samples.
pub const MAX_DELTA_K: f64 = 0.01;

/// A parametric curve over an internal parameter `t`, queried by arc length.
pub trait ParametricCurve {
    /// Returns the length of the curve.
    fn length(&self) -> f64;

    /// Finds the internal parameter `t` corresponding to the arc length `s`,
    /// clamped to `[0, 1]` outside the curve. Must not divide by zero even for
    /// a degenerate curve with `length() == 0`.
    fn reparam(&self, s: f64) -> f64;

    fn internal_get(&self, t: f64) -> Vector2d;
    fn internal_deriv(&self, t: f64) -> Vector2d;
    fn internal_second_deriv(&self, t: f64) -> Vector2d;
    fn internal_third_deriv(&self, t: f64) -> Vector2d;

    /// Returns the point `s` units along the curve.
    fn get(&self, s: f64) -> Vector2d {
        self.internal_get(self.reparam(s))
    }

    /// Returns the unit tangent `s` units along the curve.
    fn deriv(&self, s: f64) -> Vector2d {
        let deriv = self.internal_deriv(self.reparam(s));
        deriv / deriv.norm()
    }

    /// Returns the second derivative with respect to arc length `s` units
    /// along the curve (the curvature vector).
    fn second_deriv(&self, s: f64) -> Vector2d {
        let t = self.reparam(s);
        let deriv = self.internal_deriv(t);
        let second = self.internal_second_deriv(t);
        (second * deriv.dot(deriv) - deriv * second.dot(deriv)) / deriv.norm().powi(4)
    }

    /// Returns the third derivative with respect to arc length `s` units along
    /// the curve.
    fn third_deriv(&self, s: f64) -> Vector2d {
        let t = self.reparam(s);
        let deriv = self.internal_deriv(t);
        let second = self.internal_second_deriv(t);
        let third = self.internal_third_deriv(t);
        let pt1 = third * deriv.dot(deriv) - deriv * deriv.dot(third);
        let pt2 = second * second.dot(deriv) - deriv * second.dot(second);
        (pt1 + pt2) / deriv.norm().powi(9)
    }

    /// Returns the angle of the tangent line `s` units along the curve.
    fn tangent_angle(&self, s: f64) -> Angle {
        self.deriv(s).angle()
    }

    /// Returns the derivative of the tangent angle with respect to arc length,
    /// i.e. the signed curvature.
    fn tangent_angle_deriv(&self, s: f64) -> Angle {
        Angle::rad(self.deriv(s).cross(self.second_deriv(s)))
    }

    /// Returns the second derivative of the tangent angle with respect to arc
    /// length.
    fn tangent_angle_second_deriv(&self, s: f64) -> Angle {
        Angle::rad(self.deriv(s).cross(self.third_deriv(s)))
    }

    /// Returns the signed curvature `s` units along the curve.
    fn curvature(&self, s: f64) -> f64 {
        self.tangent_angle_deriv(s).radians()
    }

    fn start(&self) -> Vector2d {
        self.internal_get(0.0)
    }

    fn end(&self) -> Vector2d {
        self.internal_get(1.0)
    }
}

/// Arc length parameterization of a curve, built once by recursive adaptive
/// subdivision and immutable afterwards.
///
/// Subdivision splits each interval at its midpoint, estimates the interval
/// length from the two chords and recurses while the curvature change or the
/// interval length exceed the configured bounds, so samples concentrate in
/// high-curvature regions. The total leaf count is bounded by `max_depth`.
#[derive(Debug, Clone)]
pub struct ArcLengthParameterization {
    t_samples: Vec<f64>,
    s_samples: Vec<f64>,
    length: f64,
}

impl ArcLengthParameterization {
    /// Builds the `(t, s)` sample table for the curve described by `point` and
    /// `curvature` over `t` in `[0, 1]`.
    pub fn new(
        point: &dyn Fn(f64) -> Vector2d,
        curvature: &dyn Fn(f64) -> f64,
        max_segment_length: f64,
        max_depth: u32,
        max_delta_k: f64,
    ) -> ArcLengthParameterization {
        let mut t_samples = vec![0.0];
        let mut s_samples = vec![0.0];
        let mut length = 0.0;

        fn subdivide(
            point: &dyn Fn(f64) -> Vector2d,
            curvature: &dyn Fn(f64) -> f64,
            t_lo: f64,
            t_hi: f64,
            depth: u32,
            max_segment_length: f64,
            max_depth: u32,
            max_delta_k: f64,
            t_samples: &mut Vec<f64>,
            s_samples: &mut Vec<f64>,
            length: &mut f64,
        ) {
            let t_mid = (t_lo + t_hi) * 0.5;
            let v_lo = point(t_lo);
            let v_mid = point(t_mid);
            let v_hi = point(t_hi);
            let delta_k = (curvature(t_lo) - curvature(t_hi)).abs();
            let segment_length = v_lo.dist_to(v_mid) + v_mid.dist_to(v_hi);

            if depth < max_depth && (delta_k > max_delta_k || segment_length > max_segment_length)
            {
                subdivide(
                    point, curvature, t_lo, t_mid, depth + 1, max_segment_length, max_depth,
                    max_delta_k, t_samples, s_samples, length,
                );
                subdivide(
                    point, curvature, t_mid, t_hi, depth + 1, max_segment_length, max_depth,
                    max_delta_k, t_samples, s_samples, length,
                );
            } else {
                *length += segment_length;
                s_samples.push(*length);
                t_samples.push(t_hi);
            }
        }

        subdivide(
            point, curvature, 0.0, 1.0, 0, max_segment_length, max_depth, max_delta_k,
            &mut t_samples, &mut s_samples, &mut length,
        );

        debug!(samples = t_samples.len(), length, "arc length parameterization built");
        ArcLengthParameterization { t_samples, s_samples, length }
    }

    /// Builds the table with the default subdivision bounds.
    pub fn with_defaults(
        point: &dyn Fn(f64) -> Vector2d,
        curvature: &dyn Fn(f64) -> f64,
    ) -> ArcLengthParameterization {
        Self::new(point, curvature, MAX_SEGMENT_LENGTH, MAX_DEPTH, MAX_DELTA_K)
    }

    /// Returns the computed curve length.
    pub fn length(&self) -> f64 {
        self.length
    }

    /// The internal parameter samples, strictly ascending from 0 to 1.
    pub fn t_samples(&self) -> &[f64] {
        &self.t_samples
    }

    /// The arc length samples, ascending from 0 to `length()`.
    pub fn s_samples(&self) -> &[f64] {
        &self.s_samples
    }

    /// Finds the internal parameter `t` corresponding to the arc length `s` by
    /// binary search over the bracketing samples followed by linear
    /// interpolation. Clamps to `0.0` / `1.0` outside the curve.
    pub fn reparam(&self, s: f64) -> f64 {
        if s <= 0.0 {
            return 0.0;
        }
        if s >= self.length {
            return 1.0;
        }
        let hi = self.s_samples.partition_point(|&sample| sample < s);
        let lo = hi - 1;
        let (s0, s1) = (self.s_samples[lo], self.s_samples[hi]);
        let (t0, t1) = (self.t_samples[lo], self.t_samples[hi]);
        if s1 - s0 < EPSILON {
            return t0;
        }
        t0 + (s - s0) * (t1 - t0) / (s1 - s0)
    }
}

/// A path-capable curve: one of the concrete curve shapes this crate builds
/// paths from.
#[derive(Debug, Clone)]
pub enum Curve {
    Line(LineSegment),
    Spline(QuinticSpline),
}

impl ParametricCurve for Curve {
    fn length(&self) -> f64 {
        match self {
            Curve::Line(line) => line.length(),
            Curve::Spline(spline) => spline.length(),
        }
    }

    fn reparam(&self, s: f64) -> f64 {
        match self {
            Curve::Line(line) => line.reparam(s),
            Curve::Spline(spline) => spline.reparam(s),
        }
    }

    fn internal_get(&self, t: f64) -> Vector2d {
        match self {
            Curve::Line(line) => line.internal_get(t),
            Curve::Spline(spline) => spline.internal_get(t),
        }
    }

    fn internal_deriv(&self, t: f64) -> Vector2d {
        match self {
            Curve::Line(line) => line.internal_deriv(t),
            Curve::Spline(spline) => spline.internal_deriv(t),
        }
    }

    fn internal_second_deriv(&self, t: f64) -> Vector2d {
        match self {
            Curve::Line(line) => line.internal_second_deriv(t),
            Curve::Spline(spline) => spline.internal_second_deriv(t),
        }
    }

    fn internal_third_deriv(&self, t: f64) -> Vector2d {
        match self {
            Curve::Line(line) => line.internal_third_deriv(t),
            Curve::Spline(spline) => spline.internal_third_deriv(t),
        }
    }
}
