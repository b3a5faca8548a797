//! Tank (differential) drive kinematics. Wheel quantities are given as
//! (left, right) pairs.

use crate::geometry::{Angle, Pose2d};

/// Drivetrain geometry for a tank base: the lateral distance between the left
/// and right wheel sets. Must be nonzero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TankGeometry {
    pub track_width: f64,
}

impl TankGeometry {
    pub fn new(track_width: f64) -> TankGeometry {
        TankGeometry { track_width }
    }
}

/// Computes the wheel velocities realizing `robot_vel`. The lateral component
/// of the twist is unrealizable on a tank base and is ignored.
pub fn robot_to_wheel_velocities(robot_vel: Pose2d, geometry: TankGeometry) -> [f64; 2] {
    let half = geometry.track_width / 2.0;
    let omega = robot_vel.heading.radians();
    [robot_vel.x - half * omega, robot_vel.x + half * omega]
}

/// Computes the wheel accelerations realizing `robot_accel`.
pub fn robot_to_wheel_accelerations(robot_accel: Pose2d, geometry: TankGeometry) -> [f64; 2] {
    robot_to_wheel_velocities(robot_accel, geometry)
}

/// Recovers the robot-frame velocity from wheel velocities (or wheel position
/// deltas).
pub fn wheel_to_robot_velocities(wheel_velocities: [f64; 2], geometry: TankGeometry) -> Pose2d {
    let [left, right] = wheel_velocities;
    Pose2d::new(
        (left + right) / 2.0,
        0.0,
        Angle::rad((right - left) / geometry.track_width),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::epsilon_eq;

    #[test]
    fn test_round_trip() {
        let geometry = TankGeometry::new(1.5);
        let twist = Pose2d::new(2.0, 0.0, Angle::rad(-0.8));
        let recovered = wheel_to_robot_velocities(robot_to_wheel_velocities(twist, geometry), geometry);
        assert!((recovered.x - twist.x).abs() < 1e-9);
        assert!((recovered.heading.radians() - twist.heading.radians()).abs() < 1e-9);
    }

    #[test]
    fn test_point_turn() {
        let geometry = TankGeometry::new(2.0);
        let wheels = robot_to_wheel_velocities(Pose2d::new(0.0, 0.0, Angle::rad(1.0)), geometry);
        assert!(epsilon_eq(wheels[0], -1.0));
        assert!(epsilon_eq(wheels[1], 1.0));
    }
}
