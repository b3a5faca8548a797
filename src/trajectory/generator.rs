//! Bridges paths and constraint objects into the profile generator.

use crate::constraints::{AccelerationConstraint, UnsatisfiableConstraint, VelocityConstraint};
use crate::geometry::{Angle, Pose2d};
use crate::motion_profile::MotionProfile;
use crate::motion_state::MotionState;
use crate::path::Path;
use crate::profile_generator::{generate_profile, generate_simple_profile};
use crate::trajectory_segments::TrajectorySegment;

/// Default arc length spacing between constraint samples.
pub const DEFAULT_RESOLUTION: f64 = 0.25;

/// Generates the motion profile driving `path` under the given constraints,
/// evaluating them against the path's pose and derivative at each sample.
pub fn generate_path_profile(
    path: &Path,
    velocity_constraint: &dyn VelocityConstraint,
    acceleration_constraint: &dyn AccelerationConstraint,
    start: MotionState,
    goal: MotionState,
    resolution: f64,
) -> Result<MotionProfile, UnsatisfiableConstraint> {
    let base_robot_vel = Pose2d::default();
    generate_profile(
        &start,
        &goal,
        &|s| velocity_constraint.max_velocity(s, path.get(s), path.deriv(s), base_robot_vel),
        &|s| {
            acceleration_constraint.max_acceleration(s, path.get(s), path.deriv(s), base_robot_vel)
        },
        resolution,
    )
}

/// Generates a path-following trajectory segment, seeded with the previous
/// segment's end state (its velocity and acceleration; the position origin is
/// reset so the profile's own arc length starts at zero) and coming to rest at
/// the end of the path.
pub fn generate_path_segment(
    path: Path,
    velocity_constraint: &dyn VelocityConstraint,
    acceleration_constraint: &dyn AccelerationConstraint,
    previous_end: MotionState,
    resolution: f64,
) -> Result<TrajectorySegment, UnsatisfiableConstraint> {
    let start = MotionState::new(0.0, previous_end.v, previous_end.a, previous_end.j);
    let goal = MotionState::at_rest(path.length());
    let profile = generate_path_profile(
        &path,
        velocity_constraint,
        acceleration_constraint,
        start,
        goal,
        resolution,
    )?;
    Ok(TrajectorySegment::Path { path, profile })
}

/// Generates an in-place turn through `angle` at `pose`.
pub fn generate_turn_segment(
    pose: Pose2d,
    angle: Angle,
    max_ang_vel: Angle,
    max_ang_accel: Angle,
    max_ang_jerk: Angle,
) -> TrajectorySegment {
    let profile = generate_simple_profile(
        &MotionState::at_rest(0.0),
        &MotionState::at_rest(angle.radians()),
        max_ang_vel.radians(),
        max_ang_accel.radians(),
        max_ang_jerk.radians(),
    );
    TrajectorySegment::Turn { pose, profile }
}
