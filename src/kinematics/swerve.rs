//! Swerve drive kinematics. Modules are ordered front left, back left, back
//! right, front right; robot poses use positive x forward, positive y left,
//! heading counter-clockwise from the x axis.

use crate::geometry::{Angle, Pose2d, Vector2d};
use nalgebra::{Matrix3, RowVector3, Vector3};

/// Drivetrain geometry for a four-module swerve base. Both distances must be
/// nonzero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwerveGeometry {
    pub track_width: f64,
    pub wheel_base: f64,
}

impl SwerveGeometry {
    pub fn new(track_width: f64) -> SwerveGeometry {
        SwerveGeometry { track_width, wheel_base: track_width }
    }

    /// Module positions in the robot frame, front left first, proceeding
    /// counter-clockwise.
    pub fn module_positions(&self) -> [Vector2d; 4] {
        let x = self.wheel_base / 2.0;
        let y = self.track_width / 2.0;
        [
            Vector2d::new(x, y),
            Vector2d::new(-x, y),
            Vector2d::new(-x, -y),
            Vector2d::new(x, -y),
        ]
    }
}

/// The velocity vector of a single module at `position` under the robot-frame
/// velocity `robot_vel`: `v + omega x p`.
fn module_velocity(robot_vel: Pose2d, position: Vector2d) -> Vector2d {
    let omega = robot_vel.heading.radians();
    robot_vel.vec() + Vector2d::new(-position.y, position.x) * omega
}

/// Computes the module velocity vectors realizing `robot_vel`.
pub fn robot_to_module_velocity_vectors(
    robot_vel: Pose2d,
    geometry: SwerveGeometry,
) -> [Vector2d; 4] {
    geometry.module_positions().map(|p| module_velocity(robot_vel, p))
}

/// Computes the wheel speeds realizing `robot_vel`.
pub fn robot_to_wheel_velocities(robot_vel: Pose2d, geometry: SwerveGeometry) -> [f64; 4] {
    robot_to_module_velocity_vectors(robot_vel, geometry).map(|v| v.norm())
}

/// Computes the module steering orientations realizing `robot_vel`.
pub fn robot_to_module_orientations(robot_vel: Pose2d, geometry: SwerveGeometry) -> [Angle; 4] {
    robot_to_module_velocity_vectors(robot_vel, geometry).map(|v| v.angle())
}

/// Computes the module acceleration vectors realizing `robot_accel`.
pub fn robot_to_module_acceleration_vectors(
    robot_accel: Pose2d,
    geometry: SwerveGeometry,
) -> [Vector2d; 4] {
    geometry.module_positions().map(|p| module_velocity(robot_accel, p))
}

/// Computes the wheel accelerations (the rate of change of each wheel speed)
/// under `robot_vel` and `robot_accel`.
pub fn robot_to_wheel_accelerations(
    robot_vel: Pose2d,
    robot_accel: Pose2d,
    geometry: SwerveGeometry,
) -> [f64; 4] {
    let velocities = robot_to_module_velocity_vectors(robot_vel, geometry);
    let accelerations = robot_to_module_acceleration_vectors(robot_accel, geometry);
    let mut result = [0.0; 4];
    for i in 0..4 {
        result[i] = velocities[i].dot(accelerations[i]) / velocities[i].norm();
    }
    result
}

/// Computes the module steering angular velocities under `robot_vel` and
/// `robot_accel`: the time derivative of `atan2` of each module velocity.
pub fn robot_to_module_angular_velocities(
    robot_vel: Pose2d,
    robot_accel: Pose2d,
    geometry: SwerveGeometry,
) -> [Angle; 4] {
    let velocities = robot_to_module_velocity_vectors(robot_vel, geometry);
    let accelerations = robot_to_module_acceleration_vectors(robot_accel, geometry);
    let mut result = [Angle::rad(0.0); 4];
    for i in 0..4 {
        result[i] = Angle::rad(velocities[i].cross(accelerations[i]) / velocities[i].squared_norm());
    }
    result
}

/// Recovers the robot-frame velocity from per-module velocity vectors at the
/// given module positions: the Moore-Penrose least-squares solution of the
/// (overdetermined) module velocity equations, solved through the normal
/// equations. The module layout must span the plane (a documented
/// precondition for any sane drivetrain).
pub fn module_to_robot_velocities(
    module_velocities: &[Vector2d],
    module_positions: &[Vector2d],
) -> Pose2d {
    assert_eq!(
        module_velocities.len(),
        module_positions.len(),
        "one velocity vector per module position required"
    );
    let mut ata = Matrix3::zeros();
    let mut atb = Vector3::zeros();
    for (velocity, position) in module_velocities.iter().zip(module_positions) {
        let row_x = RowVector3::new(1.0, 0.0, -position.y);
        let row_y = RowVector3::new(0.0, 1.0, position.x);
        ata += row_x.transpose() * row_x + row_y.transpose() * row_y;
        atb += row_x.transpose() * velocity.x + row_y.transpose() * velocity.y;
    }
    let solution = ata
        .try_inverse()
        .expect("degenerate module layout")
        * atb;
    Pose2d::new(solution[0], solution[1], Angle::rad(solution[2]))
}

/// Recovers the robot-frame velocity from wheel speeds and module
/// orientations.
pub fn wheel_to_robot_velocities(
    wheel_velocities: [f64; 4],
    module_orientations: [Angle; 4],
    geometry: SwerveGeometry,
) -> Pose2d {
    let vectors: Vec<Vector2d> = wheel_velocities
        .iter()
        .zip(&module_orientations)
        .map(|(&v, &theta)| Vector2d::polar(v, theta))
        .collect();
    module_to_robot_velocities(&vectors, &geometry.module_positions())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_twist_eq(a: Pose2d, b: Pose2d, tolerance: f64) {
        assert!((a.x - b.x).abs() < tolerance, "x: {} vs {}", a.x, b.x);
        assert!((a.y - b.y).abs() < tolerance, "y: {} vs {}", a.y, b.y);
        assert!(
            (a.heading.radians() - b.heading.radians()).abs() < tolerance,
            "omega: {} vs {}",
            a.heading.radians(),
            b.heading.radians()
        );
    }

    #[test]
    fn test_round_trip() {
        let geometry = SwerveGeometry::new(1.0);
        let twist = Pose2d::new(0.9, -1.1, Angle::rad(0.6));
        let wheels = robot_to_wheel_velocities(twist, geometry);
        let orientations = robot_to_module_orientations(twist, geometry);
        let recovered = wheel_to_robot_velocities(wheels, orientations, geometry);
        assert_twist_eq(recovered, twist, 1e-9);
    }

    #[test]
    fn test_pure_rotation_orientations() {
        let geometry = SwerveGeometry::new(2.0);
        let orientations =
            robot_to_module_orientations(Pose2d::new(0.0, 0.0, Angle::rad(1.0)), geometry);
        // Each module's velocity is tangent to the circle through its
        // position: perpendicular to the position vector.
        for (orientation, position) in orientations.iter().zip(geometry.module_positions()) {
            let expected = position.angle() + Angle::deg(90.0);
            assert!(orientation.epsilon_eq(expected));
        }
    }

    #[test]
    fn test_module_angular_velocities_zero_for_steady_translation() {
        let geometry = SwerveGeometry::new(1.0);
        let vel = Pose2d::new(2.0, 1.0, Angle::rad(0.0));
        let accel = Pose2d::new(0.5, 0.25, Angle::rad(0.0));
        // Acceleration parallel to velocity: modules keep their orientation.
        let rates = robot_to_module_angular_velocities(vel, accel, geometry);
        for rate in rates {
            assert!(rate.radians().abs() < 1e-9);
        }
    }
}
