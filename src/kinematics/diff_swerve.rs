//! Differential swerve kinematics: two steerable modules, each driven by a
//! pair of counter-rotating gears. The wheel velocity of a module is half the
//! difference of its gear velocities; the module orientation advances with
//! half their sum. Gear quantities are ordered (left top, left bottom, right
//! top, right bottom).

use crate::geometry::{Angle, Pose2d, Vector2d};
use crate::swerve;

/// Drivetrain geometry for a differential swerve base: the lateral distance
/// between the two modules. Must be nonzero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiffSwerveGeometry {
    pub track_width: f64,
}

impl DiffSwerveGeometry {
    pub fn new(track_width: f64) -> DiffSwerveGeometry {
        DiffSwerveGeometry { track_width }
    }

    /// Module positions in the robot frame, (left, right).
    pub fn module_positions(&self) -> [Vector2d; 2] {
        [
            Vector2d::new(0.0, self.track_width / 2.0),
            Vector2d::new(0.0, -self.track_width / 2.0),
        ]
    }
}

/// Computes a module's orientation from the total rotations of its gears.
pub fn gear_to_module_orientation(top: Angle, bottom: Angle) -> Angle {
    (top + bottom) * 0.5
}

/// Computes a module's wheel velocity from its gear velocities.
pub fn gear_to_wheel_velocity(top: f64, bottom: f64) -> f64 {
    (top - bottom) / 2.0
}

/// Computes the gear velocities realizing a wheel velocity without changing
/// the module orientation.
pub fn wheel_to_gear_velocities(wheel_velocity: f64) -> [f64; 2] {
    [wheel_velocity, -wheel_velocity]
}

fn module_velocity(robot_vel: Pose2d, position: Vector2d) -> Vector2d {
    let omega = robot_vel.heading.radians();
    robot_vel.vec() + Vector2d::new(-position.y, position.x) * omega
}

/// Computes the module wheel speeds realizing `robot_vel`.
pub fn robot_to_wheel_velocities(robot_vel: Pose2d, geometry: DiffSwerveGeometry) -> [f64; 2] {
    geometry.module_positions().map(|p| module_velocity(robot_vel, p).norm())
}

/// Computes the module orientations realizing `robot_vel`.
pub fn robot_to_module_orientations(
    robot_vel: Pose2d,
    geometry: DiffSwerveGeometry,
) -> [Angle; 2] {
    geometry.module_positions().map(|p| module_velocity(robot_vel, p).angle())
}

/// Computes the module wheel accelerations under `robot_vel` and `robot_accel`.
pub fn robot_to_wheel_accelerations(
    robot_vel: Pose2d,
    robot_accel: Pose2d,
    geometry: DiffSwerveGeometry,
) -> [f64; 2] {
    let positions = geometry.module_positions();
    let mut result = [0.0; 2];
    for (i, p) in positions.iter().enumerate() {
        let velocity = module_velocity(robot_vel, *p);
        let acceleration = module_velocity(robot_accel, *p);
        result[i] = velocity.dot(acceleration) / velocity.norm();
    }
    result
}

/// Computes the module steering angular velocities under `robot_vel` and
/// `robot_accel`.
pub fn robot_to_module_angular_velocities(
    robot_vel: Pose2d,
    robot_accel: Pose2d,
    geometry: DiffSwerveGeometry,
) -> [Angle; 2] {
    let positions = geometry.module_positions();
    let mut result = [Angle::rad(0.0); 2];
    for (i, p) in positions.iter().enumerate() {
        let velocity = module_velocity(robot_vel, *p);
        let acceleration = module_velocity(robot_accel, *p);
        result[i] = Angle::rad(velocity.cross(acceleration) / velocity.squared_norm());
    }
    result
}

/// Recovers the robot-frame velocity from the gear rotations and (linear)
/// gear velocities of both modules.
pub fn gear_to_robot_velocities(
    gear_rotations: [Angle; 4],
    gear_velocities: [f64; 4],
    geometry: DiffSwerveGeometry,
) -> Pose2d {
    let left_orientation = gear_to_module_orientation(gear_rotations[0], gear_rotations[1]);
    let right_orientation = gear_to_module_orientation(gear_rotations[2], gear_rotations[3]);
    let left_vel = gear_to_wheel_velocity(gear_velocities[0], gear_velocities[1]);
    let right_vel = gear_to_wheel_velocity(gear_velocities[2], gear_velocities[3]);
    let vectors = [
        Vector2d::polar(left_vel, left_orientation),
        Vector2d::polar(right_vel, right_orientation),
    ];
    swerve::module_to_robot_velocities(&vectors, &geometry.module_positions())
}
