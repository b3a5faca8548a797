//! Incremental construction of [Path]s with continuity enforcement.

use crate::curve::Curve;
use crate::geometry::{Angle, Pose2d, Vector2d};
use crate::heading::{Continuity, HeadingInterpolation, HeadingInterpolator};
use crate::line::LineSegment;
use crate::path::{Path, PathSegment};
use crate::quintic::{Knot, QuinticSpline};
use std::error::Error;
use std::fmt;

/// Errors raised while assembling a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathBuilderError {
    /// The appended segment's boundary state disagrees with the previous
    /// segment's end state beyond tolerance.
    ContinuityViolation,
    /// The requested segment has (numerically) zero length.
    EmptySegment,
    /// `build()` was called on a builder with no accumulated segments.
    EmptyPath,
}

impl fmt::Display for PathBuilderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathBuilderError::ContinuityViolation => {
                write!(f, "appended segment violates path continuity")
            }
            PathBuilderError::EmptySegment => write!(f, "requested path segment is empty"),
            PathBuilderError::EmptyPath => write!(f, "cannot build a path without segments"),
        }
    }
}

impl Error for PathBuilderError {}

/// Builder accumulating [PathSegment]s from the current end state.
///
/// Every step constructs the new segment's curve from the builder's current
/// end pose, initializes the requested heading interpolation against that
/// curve, and checks boundary continuity before committing; a failed step
/// leaves the builder untouched.
#[derive(Debug, Clone)]
pub struct PathBuilder {
    current_pose: Pose2d,
    current_deriv: Pose2d,
    current_second_deriv: Pose2d,
    segments: Vec<PathSegment>,
}

impl PathBuilder {
    /// Starts a path at `start_pose`, moving along its heading.
    pub fn new(start_pose: Pose2d) -> PathBuilder {
        Self::with_tangent(start_pose, start_pose.heading)
    }

    /// Starts a path at `start_pose`, moving along `start_tangent`.
    pub fn with_tangent(start_pose: Pose2d, start_tangent: Angle) -> PathBuilder {
        Self::from_state(
            start_pose,
            Pose2d::from_vec(start_tangent.vec(), Angle::rad(0.0)),
            Pose2d::default(),
        )
    }

    /// Starts a path at `start_pose`, moving backwards.
    pub fn reversed(start_pose: Pose2d) -> PathBuilder {
        Self::with_tangent(start_pose, (start_pose.heading + Angle::deg(180.0)).norm())
    }

    /// Starts a path that splices onto `path` at arc length `s`.
    pub fn from_path(path: &Path, s: f64) -> PathBuilder {
        Self::from_state(path.get(s), path.deriv(s), path.second_deriv(s))
    }

    pub(crate) fn from_state(
        pose: Pose2d,
        deriv: Pose2d,
        second_deriv: Pose2d,
    ) -> PathBuilder {
        PathBuilder {
            current_pose: pose,
            current_deriv: deriv,
            current_second_deriv: second_deriv,
            segments: Vec::new(),
        }
    }

    /// The pose the next segment will start from.
    pub fn current_pose(&self) -> Pose2d {
        self.current_pose
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    fn make_line(&self, end: Vector2d) -> Result<LineSegment, PathBuilderError> {
        if self.current_pose.vec().epsilon_eq(end) {
            return Err(PathBuilderError::EmptySegment);
        }
        Ok(LineSegment::new(self.current_pose.vec(), end))
    }

    fn make_spline(
        &self,
        end_position: Vector2d,
        end_tangent: Angle,
        start_tangent_mag: Option<f64>,
        end_tangent_mag: Option<f64>,
    ) -> Result<QuinticSpline, PathBuilderError> {
        if self.current_pose.vec().epsilon_eq(end_position) {
            return Err(PathBuilderError::EmptySegment);
        }
        let chord = self.current_pose.vec().dist_to(end_position);
        let start = Knot::new(
            self.current_pose.vec(),
            self.current_deriv.vec() * start_tangent_mag.unwrap_or(chord),
            self.current_second_deriv.vec(),
        );
        let end = Knot::with_deriv(
            end_position,
            Vector2d::polar(end_tangent_mag.unwrap_or(chord), end_tangent),
        );
        Ok(QuinticSpline::new(start, end))
    }

    fn add_segment(
        &mut self,
        curve: Curve,
        interpolation: HeadingInterpolation,
    ) -> Result<&mut PathBuilder, PathBuilderError> {
        let interpolator = HeadingInterpolator::init(
            interpolation,
            self.current_pose.heading,
            Some(self.current_deriv.heading),
            Some(self.current_second_deriv.heading),
            &curve,
        );
        let segment = PathSegment::new(curve, interpolator);

        if !self.segments.is_empty() {
            let required = segment.interpolator().required_continuity();
            let start = segment.start();
            if !start.vec().epsilon_eq(self.current_pose.vec()) {
                return Err(PathBuilderError::ContinuityViolation);
            }
            if required.contains(Continuity::HEADING)
                && !start.heading.epsilon_eq(self.current_pose.heading)
            {
                return Err(PathBuilderError::ContinuityViolation);
            }
            if required.contains(Continuity::FIRST_DERIV) {
                let start_deriv = segment.start_deriv();
                if !start_deriv.vec().epsilon_eq(self.current_deriv.vec())
                    || !start_deriv.heading.strict_epsilon_eq(self.current_deriv.heading)
                {
                    return Err(PathBuilderError::ContinuityViolation);
                }
            }
        }

        self.current_pose = segment.end();
        self.current_deriv = segment.end_deriv();
        self.current_second_deriv = segment.end_second_deriv();
        self.segments.push(segment);
        Ok(self)
    }

    /// Adds a line segment to `end_position` with the given heading
    /// interpolation.
    pub fn add_line(
        &mut self,
        end_position: Vector2d,
        interpolation: HeadingInterpolation,
    ) -> Result<&mut PathBuilder, PathBuilderError> {
        let line = self.make_line(end_position)?;
        self.add_segment(Curve::Line(line), interpolation)
    }

    /// Adds a spline segment to `end_position` arriving along `end_tangent`,
    /// with the given heading interpolation. Tangent magnitudes default to the
    /// chord length when `None`.
    pub fn add_spline(
        &mut self,
        end_position: Vector2d,
        end_tangent: Angle,
        interpolation: HeadingInterpolation,
        start_tangent_mag: Option<f64>,
        end_tangent_mag: Option<f64>,
    ) -> Result<&mut PathBuilder, PathBuilderError> {
        let spline =
            self.make_spline(end_position, end_tangent, start_tangent_mag, end_tangent_mag)?;
        self.add_segment(Curve::Spline(spline), interpolation)
    }

    pub fn line_to(&mut self, end: Vector2d) -> Result<&mut PathBuilder, PathBuilderError> {
        self.add_line(end, HeadingInterpolation::Tangent)
    }

    pub fn line_to_constant_heading(
        &mut self,
        end: Vector2d,
    ) -> Result<&mut PathBuilder, PathBuilderError> {
        self.add_line(end, HeadingInterpolation::Constant)
    }

    pub fn line_to_linear_heading(
        &mut self,
        end: Pose2d,
    ) -> Result<&mut PathBuilder, PathBuilderError> {
        self.add_line(end.vec(), HeadingInterpolation::Linear(end.heading))
    }

    pub fn line_to_spline_heading(
        &mut self,
        end: Pose2d,
    ) -> Result<&mut PathBuilder, PathBuilderError> {
        self.add_line(end.vec(), HeadingInterpolation::Spline(end.heading))
    }

    pub fn spline_to(
        &mut self,
        end: Vector2d,
        end_tangent: Angle,
    ) -> Result<&mut PathBuilder, PathBuilderError> {
        self.add_spline(end, end_tangent, HeadingInterpolation::Tangent, None, None)
    }

    pub fn spline_to_constant_heading(
        &mut self,
        end: Vector2d,
        end_tangent: Angle,
    ) -> Result<&mut PathBuilder, PathBuilderError> {
        self.add_spline(end, end_tangent, HeadingInterpolation::Constant, None, None)
    }

    pub fn spline_to_linear_heading(
        &mut self,
        end: Pose2d,
        end_tangent: Angle,
    ) -> Result<&mut PathBuilder, PathBuilderError> {
        self.add_spline(
            end.vec(),
            end_tangent,
            HeadingInterpolation::Linear(end.heading),
            None,
            None,
        )
    }

    pub fn spline_to_spline_heading(
        &mut self,
        end: Pose2d,
        end_tangent: Angle,
    ) -> Result<&mut PathBuilder, PathBuilderError> {
        self.add_spline(
            end.vec(),
            end_tangent,
            HeadingInterpolation::Spline(end.heading),
            None,
            None,
        )
    }

    /// Moves `distance` units along the current tangent.
    pub fn forward(&mut self, distance: f64) -> Result<&mut PathBuilder, PathBuilderError> {
        let direction = self.current_deriv.vec().angle();
        let end = self.current_pose.vec() + Vector2d::polar(distance, direction);
        self.line_to(end)
    }

    /// Moves `distance` units against the current tangent.
    pub fn back(&mut self, distance: f64) -> Result<&mut PathBuilder, PathBuilderError> {
        self.forward(-distance)
    }

    /// Strafes `distance` units to the robot's left, holding the heading.
    pub fn strafe_left(&mut self, distance: f64) -> Result<&mut PathBuilder, PathBuilderError> {
        let direction = self.current_pose.heading + Angle::deg(90.0);
        let end = self.current_pose.vec() + Vector2d::polar(distance, direction);
        self.line_to_constant_heading(end)
    }

    /// Strafes `distance` units to the robot's right, holding the heading.
    pub fn strafe_right(&mut self, distance: f64) -> Result<&mut PathBuilder, PathBuilderError> {
        self.strafe_left(-distance)
    }

    /// Moves straight to `end`, holding the heading.
    pub fn strafe_to(&mut self, end: Vector2d) -> Result<&mut PathBuilder, PathBuilderError> {
        self.line_to_constant_heading(end)
    }

    /// Finalizes the accumulated segments into an immutable [Path].
    pub fn build(self) -> Result<Path, PathBuilderError> {
        if self.segments.is_empty() {
            return Err(PathBuilderError::EmptyPath);
        }
        Ok(Path::new(self.segments))
    }
}
