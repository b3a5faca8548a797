//! Trajectory construction with partial-failure accumulation.
//!
//! Every step (line, spline, turn, wait) is numbered in call order. A step
//! that fails (a continuity violation while extending the path, or an
//! unsatisfiable constraint while profiling it) is recorded against its step
//! index and dropped; construction continues with the remaining steps. The
//! terminal [TrajectoryBuilder::build] returns the finished trajectory, or the
//! error list together with the best-effort partial trajectory.

use crate::constraints::{
    MinAccelerationConstraint, MinVelocityConstraint, TrajectoryConstraints,
    UnsatisfiableConstraint,
};
use crate::geometry::{Angle, Pose2d, Vector2d};
use crate::heading::HeadingInterpolation;
use crate::motion_state::MotionState;
use crate::path_builder::{PathBuilder, PathBuilderError};
use crate::trajectory::Trajectory;
use crate::trajectory_generator::{
    DEFAULT_RESOLUTION, generate_path_segment, generate_turn_segment,
};
use crate::trajectory_segments::TrajectorySegment;
use std::error::Error;
use std::fmt;

/// A failure attributed to a single builder step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrajectoryBuildError {
    Path(PathBuilderError),
    Constraint(UnsatisfiableConstraint),
}

impl fmt::Display for TrajectoryBuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrajectoryBuildError::Path(e) => write!(f, "{}", e),
            TrajectoryBuildError::Constraint(e) => write!(f, "{}", e),
        }
    }
}

impl Error for TrajectoryBuildError {}

impl From<PathBuilderError> for TrajectoryBuildError {
    fn from(e: PathBuilderError) -> Self {
        TrajectoryBuildError::Path(e)
    }
}

impl From<UnsatisfiableConstraint> for TrajectoryBuildError {
    fn from(e: UnsatisfiableConstraint) -> Self {
        TrajectoryBuildError::Constraint(e)
    }
}

/// The aggregated outcome of a failed build: every `(step index, error)` pair
/// plus the best-effort trajectory assembled from the surviving steps.
#[derive(Debug)]
pub struct TrajectoryBuildErrors {
    pub partial: Option<Trajectory>,
    pub errors: Vec<(usize, TrajectoryBuildError)>,
}

impl fmt::Display for TrajectoryBuildErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} trajectory step(s) failed:", self.errors.len())?;
        for (step, error) in &self.errors {
            write!(f, " [step {}] {};", step, error)?;
        }
        Ok(())
    }
}

impl Error for TrajectoryBuildErrors {}

/// Builder assembling path-following, turn and wait segments into a
/// [Trajectory], profiling each pushed path against the drivetrain's
/// constraint bundle.
pub struct TrajectoryBuilder {
    path_builder: PathBuilder,
    velocity_constraint: MinVelocityConstraint,
    acceleration_constraint: MinAccelerationConstraint,
    max_ang_vel: Angle,
    max_ang_accel: Angle,
    max_ang_jerk: Angle,
    resolution: f64,
    segments: Vec<TrajectorySegment>,
    errors: Vec<(usize, TrajectoryBuildError)>,
    step: usize,
    last_state: MotionState,
}

impl TrajectoryBuilder {
    /// Starts a trajectory at `start_pose`, moving along its heading, with
    /// the given drivetrain constraints.
    pub fn new(start_pose: Pose2d, constraints: TrajectoryConstraints) -> TrajectoryBuilder {
        Self::with_tangent(start_pose, start_pose.heading, constraints)
    }

    /// Starts a trajectory at `start_pose`, moving along `start_tangent`.
    pub fn with_tangent(
        start_pose: Pose2d,
        start_tangent: Angle,
        constraints: TrajectoryConstraints,
    ) -> TrajectoryBuilder {
        TrajectoryBuilder {
            path_builder: PathBuilder::with_tangent(start_pose, start_tangent),
            velocity_constraint: constraints.velocity_constraint(),
            acceleration_constraint: constraints.acceleration_constraint(),
            max_ang_vel: constraints.max_ang_vel(),
            max_ang_accel: constraints.max_ang_accel(),
            max_ang_jerk: constraints.max_ang_jerk(),
            resolution: DEFAULT_RESOLUTION,
            segments: Vec::new(),
            errors: Vec::new(),
            step: 0,
            last_state: MotionState::at_rest(0.0),
        }
    }

    /// Starts a trajectory at `start_pose`, moving backwards.
    pub fn reversed(
        start_pose: Pose2d,
        constraints: TrajectoryConstraints,
    ) -> TrajectoryBuilder {
        Self::with_tangent(
            start_pose,
            (start_pose.heading + Angle::deg(180.0)).norm(),
            constraints,
        )
    }

    /// Overrides the constraint sampling resolution (arc length units).
    pub fn with_resolution(mut self, resolution: f64) -> TrajectoryBuilder {
        self.resolution = resolution;
        self
    }

    fn record(&mut self, error: TrajectoryBuildError) {
        tracing::warn!(step = self.step, %error, "trajectory step failed");
        self.errors.push((self.step, error));
    }

    /// Runs one path-extending step, recording its failure if any.
    fn path_step(
        &mut self,
        add: impl FnOnce(&mut PathBuilder) -> Result<(), PathBuilderError>,
    ) -> &mut TrajectoryBuilder {
        if let Err(error) = add(&mut self.path_builder) {
            self.record(error.into());
        }
        self.step += 1;
        self
    }

    /// Profiles and pushes the accumulated path, if any, splicing the profile
    /// onto the end state of the previous segment.
    fn push_path(&mut self) {
        if self.path_builder.is_empty() {
            return;
        }
        let current = self.path_builder.current_pose();
        let builder = std::mem::replace(&mut self.path_builder, PathBuilder::new(current));
        match builder.build() {
            Ok(path) => {
                let end_state = (path.end(), path.end_deriv(), path.end_second_deriv());
                match generate_path_segment(
                    path,
                    &self.velocity_constraint,
                    &self.acceleration_constraint,
                    self.last_state,
                    self.resolution,
                ) {
                    Ok(segment) => {
                        if let TrajectorySegment::Path { profile, .. } = &segment {
                            self.last_state = profile.end();
                        }
                        self.segments.push(segment);
                        // Continue the next path from the real end state so
                        // later continuity checks compare against it.
                        self.path_builder =
                            PathBuilder::from_state(end_state.0, end_state.1, end_state.2);
                    }
                    Err(error) => self.record(error.into()),
                }
            }
            Err(error) => self.record(error.into()),
        }
    }

    /// The pose the next step will start from.
    pub fn current_pose(&self) -> Pose2d {
        self.path_builder.current_pose()
    }

    /// Adds a line segment with the given heading interpolation.
    pub fn add_line(
        &mut self,
        end: Vector2d,
        interpolation: HeadingInterpolation,
    ) -> &mut TrajectoryBuilder {
        self.path_step(|pb| pb.add_line(end, interpolation).map(|_| ()))
    }

    /// Adds a spline segment with the given heading interpolation.
    pub fn add_spline(
        &mut self,
        end: Vector2d,
        end_tangent: Angle,
        interpolation: HeadingInterpolation,
        start_tangent_mag: Option<f64>,
        end_tangent_mag: Option<f64>,
    ) -> &mut TrajectoryBuilder {
        self.path_step(|pb| {
            pb.add_spline(end, end_tangent, interpolation, start_tangent_mag, end_tangent_mag)
                .map(|_| ())
        })
    }

    pub fn line_to(&mut self, end: Vector2d) -> &mut TrajectoryBuilder {
        self.path_step(|pb| pb.line_to(end).map(|_| ()))
    }

    pub fn line_to_constant_heading(&mut self, end: Vector2d) -> &mut TrajectoryBuilder {
        self.path_step(|pb| pb.line_to_constant_heading(end).map(|_| ()))
    }

    pub fn line_to_linear_heading(&mut self, end: Pose2d) -> &mut TrajectoryBuilder {
        self.path_step(|pb| pb.line_to_linear_heading(end).map(|_| ()))
    }

    pub fn line_to_spline_heading(&mut self, end: Pose2d) -> &mut TrajectoryBuilder {
        self.path_step(|pb| pb.line_to_spline_heading(end).map(|_| ()))
    }

    pub fn spline_to(&mut self, end: Vector2d, end_tangent: Angle) -> &mut TrajectoryBuilder {
        self.path_step(|pb| pb.spline_to(end, end_tangent).map(|_| ()))
    }

    pub fn spline_to_constant_heading(
        &mut self,
        end: Vector2d,
        end_tangent: Angle,
    ) -> &mut TrajectoryBuilder {
        self.path_step(|pb| pb.spline_to_constant_heading(end, end_tangent).map(|_| ()))
    }

    pub fn spline_to_linear_heading(
        &mut self,
        end: Pose2d,
        end_tangent: Angle,
    ) -> &mut TrajectoryBuilder {
        self.path_step(|pb| pb.spline_to_linear_heading(end, end_tangent).map(|_| ()))
    }

    pub fn spline_to_spline_heading(
        &mut self,
        end: Pose2d,
        end_tangent: Angle,
    ) -> &mut TrajectoryBuilder {
        self.path_step(|pb| pb.spline_to_spline_heading(end, end_tangent).map(|_| ()))
    }

    pub fn forward(&mut self, distance: f64) -> &mut TrajectoryBuilder {
        self.path_step(|pb| pb.forward(distance).map(|_| ()))
    }

    pub fn back(&mut self, distance: f64) -> &mut TrajectoryBuilder {
        self.path_step(|pb| pb.back(distance).map(|_| ()))
    }

    pub fn strafe_left(&mut self, distance: f64) -> &mut TrajectoryBuilder {
        self.path_step(|pb| pb.strafe_left(distance).map(|_| ()))
    }

    pub fn strafe_right(&mut self, distance: f64) -> &mut TrajectoryBuilder {
        self.path_step(|pb| pb.strafe_right(distance).map(|_| ()))
    }

    pub fn strafe_to(&mut self, end: Vector2d) -> &mut TrajectoryBuilder {
        self.path_step(|pb| pb.strafe_to(end).map(|_| ()))
    }

    /// Adds an in-place turn through `angle`.
    pub fn turn(&mut self, angle: Angle) -> &mut TrajectoryBuilder {
        self.push_path();
        let start = match self.segments.last() {
            Some(segment) => segment.end(),
            None => self.path_builder.current_pose(),
        };
        let segment = generate_turn_segment(
            start,
            angle,
            self.max_ang_vel,
            self.max_ang_accel,
            self.max_ang_jerk,
        );
        let end = segment.end();
        self.segments.push(segment);
        self.last_state = MotionState::at_rest(0.0);
        self.path_builder = PathBuilder::new(end);
        self.step += 1;
        self
    }

    /// Adds an in-place turn to the absolute heading `heading`.
    pub fn turn_to(&mut self, heading: Angle) -> &mut TrajectoryBuilder {
        self.push_path();
        let start = match self.segments.last() {
            Some(segment) => segment.end(),
            None => self.path_builder.current_pose(),
        };
        let angle = (heading - start.heading).norm_delta();
        let segment = generate_turn_segment(
            start,
            angle,
            self.max_ang_vel,
            self.max_ang_accel,
            self.max_ang_jerk,
        );
        let end = segment.end();
        self.segments.push(segment);
        self.last_state = MotionState::at_rest(0.0);
        self.path_builder = PathBuilder::new(end);
        self.step += 1;
        self
    }

    /// Adds a stationary hold for `seconds`.
    pub fn wait(&mut self, seconds: f64) -> &mut TrajectoryBuilder {
        self.push_path();
        let pose = match self.segments.last() {
            Some(segment) => segment.end(),
            None => self.path_builder.current_pose(),
        };
        self.segments.push(TrajectorySegment::Wait { pose, duration: seconds });
        self.last_state = MotionState::at_rest(0.0);
        self.path_builder = PathBuilder::new(pose);
        self.step += 1;
        self
    }

    /// Finalizes the trajectory. Returns the finished object, or the error
    /// list plus the best-effort partial trajectory when any step failed.
    pub fn build(mut self) -> Result<Trajectory, TrajectoryBuildErrors> {
        self.push_path();
        if self.segments.is_empty() && self.errors.is_empty() {
            self.errors.push((self.step, PathBuilderError::EmptyPath.into()));
        }
        if self.errors.is_empty() {
            Ok(Trajectory::new(self.segments))
        } else {
            let partial = if self.segments.is_empty() {
                None
            } else {
                Some(Trajectory::new(self.segments))
            };
            Err(TrajectoryBuildErrors { partial, errors: self.errors })
        }
    }
}
