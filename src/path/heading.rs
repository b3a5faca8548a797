//! Heading interpolators: functions from arc length to robot heading,
//! independent of the positional shape of the curve they are bound to.
//!
//! Construction is two-phase. A [HeadingInterpolation] describes what the
//! caller wants; [HeadingInterpolator::init] binds it to a concrete curve and
//! precomputes whatever the variant needs (the tangent offset, the linear
//! sweep, the quintic heading spline). The initialized interpolator does not
//! hold a reference to its curve; the owning path segment passes the curve
//! into every query.

use crate::curve::{Curve, ParametricCurve};
use crate::geometry::Angle;
use crate::quintic::QuinticPolynomial;
use bitflags::bitflags;

bitflags! {
    /// Boundary continuity a heading interpolator requires from the previous
    /// path segment when appended to a path.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Continuity: u8 {
        /// The start heading must match the previous end heading.
        const HEADING = 0b01;
        /// The start pose derivative (tangent direction and heading rate) must
        /// match the previous end pose derivative.
        const FIRST_DERIV = 0b10;
    }
}

/// A requested heading behavior, not yet bound to a curve.
#[derive(Debug, Clone, Copy)]
pub enum HeadingInterpolation {
    /// Follow the curve tangent (plus whatever offset the current heading has
    /// relative to the tangent at the joint).
    Tangent,
    /// Hold the heading the robot has when the segment starts.
    Constant,
    /// Sweep linearly in arc length to the given absolute target heading.
    Linear(Angle),
    /// Follow a quintic heading spline to the given absolute target heading.
    Spline(Angle),
}

/// A heading interpolator bound to a curve, produced by [HeadingInterpolator::init].
#[derive(Debug, Clone)]
pub enum HeadingInterpolator {
    Tangent { offset: Angle },
    Constant { heading: Angle },
    Linear { start: Angle, angle: Angle },
    Spline { start: Angle, spline: QuinticPolynomial },
}

impl HeadingInterpolator {
    /// Binds `interpolation` to `curve`, taking the boundary state at the
    /// segment start from the caller. `start_heading_deriv` and
    /// `start_heading_second_deriv` seed the spline variant; when `None` they
    /// default to the curve's own tangent angle derivatives, which guarantees
    /// a smooth handoff into and out of tangent-following motion.
    pub fn init(
        interpolation: HeadingInterpolation,
        start_heading: Angle,
        start_heading_deriv: Option<Angle>,
        start_heading_second_deriv: Option<Angle>,
        curve: &Curve,
    ) -> HeadingInterpolator {
        match interpolation {
            HeadingInterpolation::Tangent => HeadingInterpolator::Tangent {
                offset: start_heading - curve.tangent_angle(0.0),
            },
            HeadingInterpolation::Constant => HeadingInterpolator::Constant {
                heading: start_heading,
            },
            HeadingInterpolation::Linear(target) => HeadingInterpolator::Linear {
                start: start_heading,
                angle: (target - start_heading).norm_delta(),
            },
            HeadingInterpolation::Spline(target) => {
                let len = curve.length();
                let delta = (target - start_heading).norm_delta();
                let start_deriv =
                    start_heading_deriv.unwrap_or_else(|| curve.tangent_angle_deriv(0.0));
                let start_second_deriv = start_heading_second_deriv
                    .unwrap_or_else(|| curve.tangent_angle_second_deriv(0.0));
                // The spline runs over normalized arc length, so the boundary
                // derivatives are rescaled by the curve length.
                let spline = QuinticPolynomial::new(
                    0.0,
                    (start_deriv * len).radians(),
                    (start_second_deriv * (len * len)).radians(),
                    delta.radians(),
                    (curve.tangent_angle_deriv(len) * len).radians(),
                    (curve.tangent_angle_second_deriv(len) * (len * len)).radians(),
                );
                HeadingInterpolator::Spline { start: start_heading, spline }
            }
        }
    }

    /// Returns the heading at `s` units along `curve`, normalized to `[0, 2pi)`.
    pub fn get(&self, curve: &Curve, s: f64) -> Angle {
        match self {
            HeadingInterpolator::Tangent { offset } => {
                (*offset + curve.tangent_angle(s)).norm()
            }
            HeadingInterpolator::Constant { heading } => heading.norm(),
            HeadingInterpolator::Linear { start, angle } => {
                (*start + *angle * (s / curve.length())).norm()
            }
            HeadingInterpolator::Spline { start, spline } => {
                (*start + Angle::rad(spline.get(s / curve.length()))).norm()
            }
        }
    }

    /// Returns the heading derivative with respect to arc length at `s`.
    pub fn deriv(&self, curve: &Curve, s: f64) -> Angle {
        match self {
            HeadingInterpolator::Tangent { .. } => curve.tangent_angle_deriv(s),
            HeadingInterpolator::Constant { .. } => Angle::rad(0.0),
            HeadingInterpolator::Linear { angle, .. } => *angle / curve.length(),
            HeadingInterpolator::Spline { spline, .. } => {
                let len = curve.length();
                Angle::rad(spline.deriv(s / len) / len)
            }
        }
    }

    /// Returns the heading second derivative with respect to arc length at `s`.
    pub fn second_deriv(&self, curve: &Curve, s: f64) -> Angle {
        match self {
            HeadingInterpolator::Tangent { .. } => curve.tangent_angle_second_deriv(s),
            HeadingInterpolator::Constant { .. } | HeadingInterpolator::Linear { .. } => {
                Angle::rad(0.0)
            }
            HeadingInterpolator::Spline { spline, .. } => {
                let len = curve.length();
                Angle::rad(spline.second_deriv(s / len) / (len * len))
            }
        }
    }

    /// The continuity this interpolator demands from the segment it follows.
    pub fn required_continuity(&self) -> Continuity {
        match self {
            HeadingInterpolator::Tangent { .. } | HeadingInterpolator::Linear { .. } => {
                Continuity::HEADING | Continuity::FIRST_DERIV
            }
            HeadingInterpolator::Constant { .. } | HeadingInterpolator::Spline { .. } => {
                Continuity::HEADING
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vector2d;
    use crate::line::LineSegment;
    use crate::math::epsilon_eq;

    fn line_curve() -> Curve {
        Curve::Line(LineSegment::new(Vector2d::new(0.0, 0.0), Vector2d::new(20.0, 0.0)))
    }

    #[test]
    fn test_tangent_offset() {
        let curve = line_curve();
        let interp = HeadingInterpolator::init(
            HeadingInterpolation::Tangent,
            Angle::deg(45.0),
            None,
            None,
            &curve,
        );
        // Start heading is preserved; line tangent is 0, so heading is the offset.
        assert!(interp.get(&curve, 0.0).epsilon_eq(Angle::deg(45.0)));
        assert!(interp.get(&curve, 10.0).epsilon_eq(Angle::deg(45.0)));
        assert!(epsilon_eq(interp.deriv(&curve, 10.0).radians(), 0.0));
    }

    #[test]
    fn test_constant() {
        let curve = line_curve();
        let interp = HeadingInterpolator::init(
            HeadingInterpolation::Constant,
            Angle::deg(90.0),
            None,
            None,
            &curve,
        );
        assert!(interp.get(&curve, 15.0).epsilon_eq(Angle::deg(90.0)));
        assert!(epsilon_eq(interp.deriv(&curve, 15.0).radians(), 0.0));
        assert!(epsilon_eq(interp.second_deriv(&curve, 15.0).radians(), 0.0));
    }

    #[test]
    fn test_linear_sweep() {
        let curve = line_curve();
        let interp = HeadingInterpolator::init(
            HeadingInterpolation::Linear(Angle::deg(90.0)),
            Angle::deg(0.0),
            None,
            None,
            &curve,
        );
        assert!(interp.get(&curve, 0.0).epsilon_eq(Angle::deg(0.0)));
        assert!(interp.get(&curve, 10.0).epsilon_eq(Angle::deg(45.0)));
        assert!(interp.get(&curve, 20.0).epsilon_eq(Angle::deg(90.0)));
        let expected = Angle::deg(90.0).radians() / 20.0;
        assert!(epsilon_eq(interp.deriv(&curve, 5.0).radians(), expected));
    }

    #[test]
    fn test_spline_boundaries() {
        let curve = line_curve();
        let interp = HeadingInterpolator::init(
            HeadingInterpolation::Spline(Angle::deg(90.0)),
            Angle::deg(0.0),
            Some(Angle::rad(0.0)),
            Some(Angle::rad(0.0)),
            &curve,
        );
        assert!(interp.get(&curve, 0.0).epsilon_eq(Angle::deg(0.0)));
        assert!(interp.get(&curve, 20.0).epsilon_eq(Angle::deg(90.0)));
        // The straight curve has zero tangent angle derivatives, so the spline
        // leaves and arrives with zero heading rate.
        assert!(epsilon_eq(interp.deriv(&curve, 0.0).radians(), 0.0));
        assert!(epsilon_eq(interp.deriv(&curve, 20.0).radians(), 0.0));
    }

    #[test]
    fn test_required_continuity() {
        let curve = line_curve();
        let tangent = HeadingInterpolator::init(
            HeadingInterpolation::Tangent, Angle::rad(0.0), None, None, &curve,
        );
        let constant = HeadingInterpolator::init(
            HeadingInterpolation::Constant, Angle::rad(0.0), None, None, &curve,
        );
        assert!(tangent.required_continuity().contains(Continuity::FIRST_DERIV));
        assert!(!constant.required_continuity().contains(Continuity::FIRST_DERIV));
    }
}
