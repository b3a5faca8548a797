use crate::diff_swerve::{self, DiffSwerveGeometry};
use crate::geometry::{Angle, Pose2d};
use crate::kinematics::{field_to_robot_velocity, robot_pose_error};
use crate::math::epsilon_eq;
use crate::mecanum::{self, MecanumGeometry};
use crate::swerve::{self, SwerveGeometry};
use crate::tank::{self, TankGeometry};
use rand::Rng;

fn assert_twist_eq(actual: Pose2d, expected: Pose2d, tolerance: f64) {
    assert!((actual.x - expected.x).abs() < tolerance, "x: {} vs {}", actual.x, expected.x);
    assert!((actual.y - expected.y).abs() < tolerance, "y: {} vs {}", actual.y, expected.y);
    assert!(
        (actual.heading.radians() - expected.heading.radians()).abs() < tolerance,
        "omega: {} vs {}",
        actual.heading.radians(),
        expected.heading.radians()
    );
}

#[test]
fn test_mecanum_round_trip_reference_geometry() {
    // The spec-level reference case: trackWidth = wheelBase = 1,
    // lateralMultiplier = 1.
    let geometry = MecanumGeometry { track_width: 1.0, wheel_base: 1.0, lateral_multiplier: 1.0 };
    let twist = Pose2d::new(1.0, -2.0, Angle::rad(0.5));
    let recovered =
        mecanum::wheel_to_robot_velocities(mecanum::robot_to_wheel_velocities(twist, geometry), geometry);
    assert_twist_eq(recovered, twist, 1e-9);
}

#[test]
fn test_mecanum_round_trip_randomized() {
    let mut rng = rand::thread_rng();
    for _ in 0..200 {
        let geometry = MecanumGeometry {
            track_width: rng.gen_range(0.2..3.0),
            wheel_base: rng.gen_range(0.2..3.0),
            lateral_multiplier: rng.gen_range(0.5..1.5),
        };
        let twist = Pose2d::new(
            rng.gen_range(-5.0..5.0),
            rng.gen_range(-5.0..5.0),
            Angle::rad(rng.gen_range(-3.0..3.0)),
        );
        let recovered = mecanum::wheel_to_robot_velocities(
            mecanum::robot_to_wheel_velocities(twist, geometry),
            geometry,
        );
        assert_twist_eq(recovered, twist, 1e-9);
    }
}

#[test]
fn test_tank_round_trip_randomized() {
    let mut rng = rand::thread_rng();
    for _ in 0..200 {
        let geometry = TankGeometry::new(rng.gen_range(0.2..3.0));
        // Tank twists have no lateral component.
        let twist = Pose2d::new(rng.gen_range(-5.0..5.0), 0.0, Angle::rad(rng.gen_range(-3.0..3.0)));
        let recovered = tank::wheel_to_robot_velocities(
            tank::robot_to_wheel_velocities(twist, geometry),
            geometry,
        );
        assert_twist_eq(recovered, twist, 1e-9);
    }
}

#[test]
fn test_swerve_round_trip_randomized() {
    let mut rng = rand::thread_rng();
    for _ in 0..200 {
        let geometry = SwerveGeometry {
            track_width: rng.gen_range(0.2..3.0),
            wheel_base: rng.gen_range(0.2..3.0),
        };
        let twist = Pose2d::new(
            rng.gen_range(-5.0..5.0),
            rng.gen_range(-5.0..5.0),
            Angle::rad(rng.gen_range(-3.0..3.0)),
        );
        let wheels = swerve::robot_to_wheel_velocities(twist, geometry);
        let orientations = swerve::robot_to_module_orientations(twist, geometry);
        let recovered = swerve::wheel_to_robot_velocities(wheels, orientations, geometry);
        assert_twist_eq(recovered, twist, 1e-9);
    }
}

#[test]
fn test_diff_swerve_round_trip_randomized() {
    let mut rng = rand::thread_rng();
    for _ in 0..200 {
        let geometry = DiffSwerveGeometry::new(rng.gen_range(0.2..3.0));
        let twist = Pose2d::new(
            rng.gen_range(-5.0..5.0),
            rng.gen_range(-5.0..5.0),
            Angle::rad(rng.gen_range(-3.0..3.0)),
        );
        let wheels = diff_swerve::robot_to_wheel_velocities(twist, geometry);
        let orientations = diff_swerve::robot_to_module_orientations(twist, geometry);
        let recovered = diff_swerve::gear_to_robot_velocities(
            [orientations[0], orientations[0], orientations[1], orientations[1]],
            [wheels[0], -wheels[0], wheels[1], -wheels[1]],
            geometry,
        );
        assert_twist_eq(recovered, twist, 1e-9);
    }
}

#[test]
fn test_mecanum_wheel_accelerations_follow_velocity_map() {
    let geometry = MecanumGeometry::new(1.0);
    let accel = Pose2d::new(2.0, 1.0, Angle::rad(0.25));
    let wheel_accels = mecanum::robot_to_wheel_accelerations(accel, geometry);
    let wheel_vels = mecanum::robot_to_wheel_velocities(accel, geometry);
    for (a, v) in wheel_accels.iter().zip(wheel_vels) {
        assert!(epsilon_eq(*a, v));
    }
}

#[test]
fn test_robot_pose_error_in_robot_frame() {
    // Robot at the origin facing +y; target one unit ahead of it.
    let current = Pose2d::new(0.0, 0.0, Angle::deg(90.0));
    let target = Pose2d::new(0.0, 1.0, Angle::deg(90.0));
    let error = robot_pose_error(target, current);
    assert!(epsilon_eq(error.x, 1.0));
    assert!(epsilon_eq(error.y, 0.0));
    assert!(epsilon_eq(error.heading.radians(), 0.0));
}

#[test]
fn test_field_to_robot_velocity_round_trip() {
    let mut rng = rand::thread_rng();
    for _ in 0..50 {
        let pose = Pose2d::new(0.0, 0.0, Angle::rad(rng.gen_range(-3.0..3.0)));
        let field_vel = Pose2d::new(
            rng.gen_range(-5.0..5.0),
            rng.gen_range(-5.0..5.0),
            Angle::rad(rng.gen_range(-3.0..3.0)),
        );
        let robot_vel = field_to_robot_velocity(pose, field_vel);
        // Rotating back recovers the field-frame velocity.
        let back = robot_vel.vec().rotated(pose.heading);
        assert!((back.x - field_vel.x).abs() < 1e-9);
        assert!((back.y - field_vel.y).abs() < 1e-9);
    }
}

#[test]
fn test_swerve_diff_swerve_agree_on_translation() {
    // For pure translation every steerable module sees the same velocity
    // vector regardless of module count or layout.
    let twist = Pose2d::new(3.0, 4.0, Angle::rad(0.0));
    let swerve_wheels = swerve::robot_to_wheel_velocities(twist, SwerveGeometry::new(1.0));
    let diff_wheels =
        diff_swerve::robot_to_wheel_velocities(twist, DiffSwerveGeometry::new(1.0));
    for wheel in swerve_wheels.iter().chain(diff_wheels.iter()) {
        assert!(epsilon_eq(*wheel, 5.0));
    }
}
