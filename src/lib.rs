//! Trajectory generation, motion profiling and wheel odometry for small
//! autonomous ground robots (mecanum, tank, swerve and differential swerve
//! drivetrains).
//!
//! The crate covers the build-time pipeline
//! waypoints -> [path::Path] -> constrained [motion_profile::MotionProfile] ->
//! [trajectory::Trajectory], and the runtime side: a control loop queries
//! `Trajectory::get(t)` / `velocity(t)` each tick and feeds the targets to a
//! drivetrain, while a [localization::Localizer] refines the pose estimate
//! from wheel encoder deltas.
//!
//! # Features
//!
//! - Quintic spline and line primitives with adaptive arc length
//!   reparameterization that concentrates samples in high-curvature regions.
//! - Tangent, constant, linear and quintic-spline heading interpolation,
//!   independent of the positional shape of the path.
//! - Path construction with boundary continuity enforcement.
//! - Composable, pure velocity/acceleration constraints (translational,
//!   angular, and per-drivetrain wheel speed caps), evaluated in parallel
//!   during profile generation.
//! - Trapezoidal and jerk-limited (S-curve) motion profiles with arbitrary
//!   boundary velocities for trajectory splicing.
//! - Trajectory assembly from path-following, turn and wait segments with
//!   best-effort partial results and per-step error reporting.
//! - Forward/inverse kinematics and incremental localizers for each
//!   supported drivetrain, plus a three-tracking-wheel localizer.
//!
//! ## Examples
//!
//! The demo binary (`src/main.rs`) walks through building a trajectory,
//! sampling it, and converting the sampled velocities into wheel commands.

pub mod geometry;
pub mod math;

#[path = "path/curve.rs"]
pub mod curve;
#[path = "path/line.rs"]
pub mod line;
#[path = "path/quintic.rs"]
pub mod quintic;
#[path = "path/heading.rs"]
pub mod heading;
#[path = "path/path.rs"]
pub mod path;
#[path = "path/builder.rs"]
pub mod path_builder;

#[path = "profile/state.rs"]
pub mod motion_state;
#[path = "profile/profile.rs"]
pub mod motion_profile;
#[path = "profile/generator.rs"]
pub mod profile_generator;

pub mod constraints;

#[path = "trajectory/segments.rs"]
pub mod trajectory_segments;
#[path = "trajectory/trajectory.rs"]
pub mod trajectory;
#[path = "trajectory/generator.rs"]
pub mod trajectory_generator;
#[path = "trajectory/builder.rs"]
pub mod trajectory_builder;

#[path = "kinematics/kinematics.rs"]
pub mod kinematics;
#[path = "kinematics/mecanum.rs"]
pub mod mecanum;
#[path = "kinematics/tank.rs"]
pub mod tank;
#[path = "kinematics/swerve.rs"]
pub mod swerve;
#[path = "kinematics/diff_swerve.rs"]
pub mod diff_swerve;

pub mod localization;

#[cfg(test)]
mod tests;
