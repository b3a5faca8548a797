//! Frame transforms and odometry composition shared by all drivetrain
//! topologies.

use crate::geometry::{Angle, Pose2d, Vector2d};
use crate::math::epsilon_eq;

/// Returns the robot-frame velocity corresponding to a field-frame velocity at
/// the given field pose.
pub fn field_to_robot_velocity(field_pose: Pose2d, field_vel: Pose2d) -> Pose2d {
    Pose2d::from_vec(field_vel.vec().rotated(-field_pose.heading), field_vel.heading)
}

/// Returns the robot-frame acceleration corresponding to a field-frame
/// velocity and acceleration at the given field pose.
pub fn field_to_robot_acceleration(
    field_pose: Pose2d,
    field_vel: Pose2d,
    field_accel: Pose2d,
) -> Pose2d {
    let (sin, cos) = (field_pose.heading.sin(), field_pose.heading.cos());
    Pose2d::from_vec(field_accel.vec().rotated(-field_pose.heading), field_accel.heading)
        + Pose2d::new(
            -field_vel.x * sin + field_vel.y * cos,
            -field_vel.x * cos - field_vel.y * sin,
            Angle::rad(0.0),
        ) * field_vel.heading.radians()
}

/// Returns the error between the target and current pose in the field frame,
/// with the heading error normalized to `(-pi, pi]`.
pub fn field_pose_error(target: Pose2d, current: Pose2d) -> Pose2d {
    Pose2d::from_vec((target - current).vec(), (target.heading - current.heading).norm_delta())
}

/// Returns the error between the target and current pose in the robot frame.
pub fn robot_pose_error(target: Pose2d, current: Pose2d) -> Pose2d {
    let error = field_pose_error(target, current);
    Pose2d::from_vec(error.vec().rotated(-current.heading), error.heading)
}

/// Integrates a robot-frame pose delta onto a field-frame pose.
///
/// The delta is treated as a constant-curvature (constant-twist) motion over
/// the measurement interval rather than a straight displacement, which keeps
/// integration error low under simultaneous translation and rotation. The
/// `sin(theta)/theta` and `(1 - cos(theta))/theta` factors fall back to their
/// Taylor expansions near zero rotation.
pub fn relative_odometry_update(field_pose: Pose2d, robot_pose_delta: Pose2d) -> Pose2d {
    let dtheta = robot_pose_delta.heading.radians();
    let (sine_term, cosine_term) = if epsilon_eq(dtheta, 0.0) {
        (1.0 - dtheta * dtheta / 6.0, dtheta / 2.0)
    } else {
        (dtheta.sin() / dtheta, (1.0 - dtheta.cos()) / dtheta)
    };

    let field_position_delta = Vector2d::new(
        sine_term * robot_pose_delta.x - cosine_term * robot_pose_delta.y,
        cosine_term * robot_pose_delta.x + sine_term * robot_pose_delta.y,
    )
    .rotated(field_pose.heading);

    Pose2d::new(
        field_pose.x + field_position_delta.x,
        field_pose.y + field_position_delta.y,
        (field_pose.heading + robot_pose_delta.heading).norm(),
    )
}
