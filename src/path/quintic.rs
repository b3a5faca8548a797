//! Quintic Bezier polynomials and splines.

use crate::curve::{ArcLengthParameterization, ParametricCurve};
use crate::geometry::Vector2d;

/// A quintic Bezier polynomial over `t` in `[0, 1]` matching value, derivative
/// and second derivative boundary conditions at both ends.
#[derive(Debug, Clone)]
pub struct QuinticPolynomial {
    control_points: [f64; 6],
    coeffs: [f64; 6],
    dcoeffs: [f64; 5],
    d2coeffs: [f64; 4],
}

impl QuinticPolynomial {
    pub fn new(
        start: f64,
        start_deriv: f64,
        start_second_deriv: f64,
        end: f64,
        end_deriv: f64,
        end_second_deriv: f64,
    ) -> QuinticPolynomial {
        let p0 = start;
        let p1 = 0.2 * start_deriv + p0;
        let p2 = 0.05 * start_second_deriv + 2.0 * p1 - p0;
        let p3 = 0.05 * end_second_deriv + 2.0 * (end - 0.2 * end_deriv) - end;
        let p4 = end - 0.2 * end_deriv;
        let p5 = end;

        let coeffs = [
            p5 - 5.0 * p4 + 10.0 * p3 - 10.0 * p2 + 5.0 * p1 - p0,
            5.0 * (p4 - 4.0 * p3 + 6.0 * p2 - 4.0 * p1 + p0),
            10.0 * (p3 - 3.0 * p2 + 3.0 * p1 - p0),
            10.0 * (p2 - 2.0 * p1 + p0),
            5.0 * p1 - 5.0 * p0,
            p0,
        ];
        let dcoeffs = [
            5.0 * coeffs[0],
            4.0 * coeffs[1],
            3.0 * coeffs[2],
            2.0 * coeffs[3],
            coeffs[4],
        ];
        let d2coeffs = [
            4.0 * dcoeffs[0],
            3.0 * dcoeffs[1],
            2.0 * dcoeffs[2],
            dcoeffs[3],
        ];

        QuinticPolynomial {
            control_points: [p0, p1, p2, p3, p4, p5],
            coeffs,
            dcoeffs,
            d2coeffs,
        }
    }

    /// The Bezier control points `p0..p5`.
    pub fn control_points(&self) -> &[f64; 6] {
        &self.control_points
    }

    /// Returns the value of the polynomial at `t`.
    pub fn get(&self, t: f64) -> f64 {
        self.coeffs
            .iter()
            .fold(0.0, |acc, &c| acc * t + c)
    }

    /// Returns the derivative of the polynomial at `t`.
    pub fn deriv(&self, t: f64) -> f64 {
        self.dcoeffs
            .iter()
            .fold(0.0, |acc, &c| acc * t + c)
    }

    /// Returns the second derivative of the polynomial at `t`.
    pub fn second_deriv(&self, t: f64) -> f64 {
        self.d2coeffs
            .iter()
            .fold(0.0, |acc, &c| acc * t + c)
    }

    /// Returns the third derivative of the polynomial at `t`.
    pub fn third_deriv(&self, t: f64) -> f64 {
        (3.0 * self.d2coeffs[0] * t + 2.0 * self.d2coeffs[1]) * t + self.d2coeffs[2]
    }
}

/// End point of an interpolated quintic spline: position, derivative and
/// second derivative with respect to the internal parameter.
#[derive(Debug, Clone, Copy)]
pub struct Knot {
    pub pos: Vector2d,
    pub deriv: Vector2d,
    pub second_deriv: Vector2d,
}

impl Knot {
    pub fn new(pos: Vector2d, deriv: Vector2d, second_deriv: Vector2d) -> Knot {
        Knot { pos, deriv, second_deriv }
    }

    /// A knot with an unconstrained (zero) second derivative.
    pub fn with_deriv(pos: Vector2d, deriv: Vector2d) -> Knot {
        Knot::new(pos, deriv, Vector2d::default())
    }
}

/// A quintic Bezier spline between two knots. The arc length sample table is
/// built once at construction.
#[derive(Debug, Clone)]
pub struct QuinticSpline {
    x: QuinticPolynomial,
    y: QuinticPolynomial,
    parameterization: ArcLengthParameterization,
}

impl QuinticSpline {
    pub fn new(start: Knot, end: Knot) -> QuinticSpline {
        let x = QuinticPolynomial::new(
            start.pos.x, start.deriv.x, start.second_deriv.x,
            end.pos.x, end.deriv.x, end.second_deriv.x,
        );
        let y = QuinticPolynomial::new(
            start.pos.y, start.deriv.y, start.second_deriv.y,
            end.pos.y, end.deriv.y, end.second_deriv.y,
        );

        let point = |t: f64| Vector2d::new(x.get(t), y.get(t));
        let curvature = |t: f64| {
            let deriv = Vector2d::new(x.deriv(t), y.deriv(t));
            let second = Vector2d::new(x.second_deriv(t), y.second_deriv(t));
            let norm = deriv.norm();
            if norm < crate::math::EPSILON {
                0.0
            } else {
                deriv.cross(second) / norm.powi(3)
            }
        };
        let parameterization = ArcLengthParameterization::with_defaults(&point, &curvature);

        QuinticSpline { x, y, parameterization }
    }

    /// The x polynomial (`x(t)`).
    pub fn x(&self) -> &QuinticPolynomial {
        &self.x
    }

    /// The y polynomial (`y(t)`).
    pub fn y(&self) -> &QuinticPolynomial {
        &self.y
    }

    pub fn parameterization(&self) -> &ArcLengthParameterization {
        &self.parameterization
    }
}

impl ParametricCurve for QuinticSpline {
    fn length(&self) -> f64 {
        self.parameterization.length()
    }

    fn reparam(&self, s: f64) -> f64 {
        self.parameterization.reparam(s)
    }

    fn internal_get(&self, t: f64) -> Vector2d {
        Vector2d::new(self.x.get(t), self.y.get(t))
    }

    fn internal_deriv(&self, t: f64) -> Vector2d {
        Vector2d::new(self.x.deriv(t), self.y.deriv(t))
    }

    fn internal_second_deriv(&self, t: f64) -> Vector2d {
        Vector2d::new(self.x.second_deriv(t), self.y.second_deriv(t))
    }

    fn internal_third_deriv(&self, t: f64) -> Vector2d {
        Vector2d::new(self.x.third_deriv(t), self.y.third_deriv(t))
    }
}
