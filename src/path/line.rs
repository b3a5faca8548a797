//! Parametric representation of a straight line.

use crate::curve::ParametricCurve;
use crate::geometry::Vector2d;
use crate::math::EPSILON;

/// A line from `start` to `end`, parameterized by `t` in `[0, 1]`.
#[derive(Debug, Clone)]
pub struct LineSegment {
    start: Vector2d,
    diff: Vector2d,
}

impl LineSegment {
    pub fn new(start: Vector2d, end: Vector2d) -> LineSegment {
        LineSegment { start, diff: end - start }
    }
}

impl ParametricCurve for LineSegment {
    fn length(&self) -> f64 {
        self.diff.norm()
    }

    fn reparam(&self, s: f64) -> f64 {
        let length = self.length();
        if length < EPSILON {
            0.0
        } else {
            (s / length).clamp(0.0, 1.0)
        }
    }

    fn internal_get(&self, t: f64) -> Vector2d {
        self.start + self.diff * t
    }

    fn internal_deriv(&self, _t: f64) -> Vector2d {
        let length = self.length();
        if length < EPSILON {
            Vector2d::default()
        } else {
            self.diff / length
        }
    }

    fn internal_second_deriv(&self, _t: f64) -> Vector2d {
        Vector2d::default()
    }

    fn internal_third_deriv(&self, _t: f64) -> Vector2d {
        Vector2d::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::epsilon_eq;

    #[test]
    fn test_line_queries() {
        let line = LineSegment::new(Vector2d::new(0.0, 0.0), Vector2d::new(30.0, 20.0));
        let expected = (30.0f64 * 30.0 + 20.0 * 20.0).sqrt();
        assert!(epsilon_eq(line.length(), expected));
        assert!(line.get(line.length()).epsilon_eq(Vector2d::new(30.0, 20.0)));
        assert!(line.get(line.length() / 2.0).epsilon_eq(Vector2d::new(15.0, 10.0)));
        assert!(epsilon_eq(line.deriv(1.0).norm(), 1.0));
        assert!(epsilon_eq(line.curvature(1.0), 0.0));
    }

    #[test]
    fn test_zero_length_line_reparam_is_safe() {
        let line = LineSegment::new(Vector2d::new(5.0, 5.0), Vector2d::new(5.0, 5.0));
        assert_eq!(line.reparam(0.0), 0.0);
        assert_eq!(line.reparam(1.0), 0.0);
        assert!(line.get(0.0).epsilon_eq(Vector2d::new(5.0, 5.0)));
    }
}
