use crate::constraints::{GenericConstraints, TrajectoryConstraints};
use crate::geometry::{Angle, Pose2d, Vector2d};
use crate::math::epsilon_eq;
use crate::trajectory_builder::{TrajectoryBuildError, TrajectoryBuilder};
use crate::trajectory_segments::TrajectorySegment;

fn generic() -> TrajectoryConstraints {
    TrajectoryConstraints::Generic(GenericConstraints::default())
}

#[test]
fn test_straight_move_produces_trapezoidal_profile() {
    // 60 units rest-to-rest at max_vel 30, max_accel 30: the triangular peak
    // sqrt(60 * 30) = 42.43 exceeds the cap, so the trajectory must plateau
    // at exactly 30 and take the closed-form 3 seconds.
    let mut builder = TrajectoryBuilder::new(Pose2d::default(), generic());
    builder.forward(60.0);
    let trajectory = builder.build().unwrap();

    assert!((trajectory.duration() - 3.0).abs() < 1e-6);
    let peak = (0..=300)
        .map(|i| {
            trajectory
                .velocity(trajectory.duration() * i as f64 / 300.0)
                .vec()
                .norm()
        })
        .fold(0.0f64, f64::max);
    assert!((peak - 30.0).abs() < 1e-6);

    let end = trajectory.get(trajectory.duration());
    assert!((end.x - 60.0).abs() < 1e-6);
    assert!(trajectory.velocity(trajectory.duration()).vec().norm() < 1e-6);
}

#[test]
fn test_trajectory_with_turn_and_wait() {
    let mut builder = TrajectoryBuilder::new(Pose2d::default(), generic());
    builder.forward(30.0).turn(Angle::deg(90.0)).wait(0.5);
    let trajectory = builder.build().unwrap();
    assert_eq!(trajectory.segments().len(), 3);

    // The wait holds the turned pose.
    let end = trajectory.end();
    assert!(epsilon_eq(end.x, 30.0));
    assert!(epsilon_eq(end.y, 0.0));
    assert!(end.heading.epsilon_eq(Angle::deg(90.0)));

    // Durations accumulate.
    let path_duration = trajectory.segments()[0].duration();
    let turn_duration = trajectory.segments()[1].duration();
    assert!(epsilon_eq(
        trajectory.duration(),
        path_duration + turn_duration + 0.5
    ));

    // The wait segment is stationary.
    let in_wait = path_duration + turn_duration + 0.25;
    assert!(trajectory.velocity(in_wait).vec().norm() < 1e-9);
    assert!(trajectory.velocity(in_wait).heading.radians().abs() < 1e-9);
}

#[test]
fn test_boundary_continuity() {
    let mut builder = TrajectoryBuilder::new(Pose2d::default(), generic());
    builder
        .spline_to(Vector2d::new(30.0, 20.0), Angle::deg(0.0))
        .turn(Angle::deg(45.0))
        .forward(12.0);
    let trajectory = builder.build().unwrap();

    // Pose, velocity and acceleration are continuous across every segment
    // boundary.
    let mut boundary = 0.0;
    for segment in &trajectory.segments()[..trajectory.segments().len() - 1] {
        boundary += segment.duration();
        let eps = 1e-4;
        let pose_before = trajectory.get(boundary - eps);
        let pose_after = trajectory.get(boundary + eps);
        assert!(
            pose_before.vec().dist_to(pose_after.vec()) < 1e-2,
            "position jump at t={}",
            boundary
        );
        let vel_before = trajectory.velocity(boundary - eps);
        let vel_after = trajectory.velocity(boundary + eps);
        assert!(
            (vel_before.vec().norm() - vel_after.vec().norm()).abs() < 0.1,
            "velocity jump at t={}",
            boundary
        );
    }
}

#[test]
fn test_turn_to_absolute_heading() {
    let mut builder = TrajectoryBuilder::new(
        Pose2d::new(5.0, 5.0, Angle::deg(30.0)),
        generic(),
    );
    builder.turn_to(Angle::deg(120.0));
    let trajectory = builder.build().unwrap();
    assert!(trajectory.end().heading.epsilon_eq(Angle::deg(120.0)));
    assert!(trajectory.duration() > 0.0);
    // Position does not move during a turn.
    assert!(epsilon_eq(trajectory.end().x, 5.0));
    assert!(epsilon_eq(trajectory.end().y, 5.0));
}

#[test]
fn test_turn_respects_angular_velocity_limit() {
    let constraints = TrajectoryConstraints::Generic(GenericConstraints {
        max_ang_vel: Angle::deg(90.0),
        max_ang_accel: Angle::deg(180.0),
        ..GenericConstraints::default()
    });
    let mut builder = TrajectoryBuilder::new(Pose2d::default(), constraints);
    builder.turn(Angle::deg(180.0));
    let trajectory = builder.build().unwrap();
    let max_rate = (0..=200)
        .map(|i| {
            trajectory
                .velocity(trajectory.duration() * i as f64 / 200.0)
                .heading
                .radians()
                .abs()
        })
        .fold(0.0f64, f64::max);
    assert!(max_rate <= Angle::deg(90.0).radians() + 1e-6);
}

#[test]
fn test_partial_failure_accumulation() {
    let mut builder = TrajectoryBuilder::new(Pose2d::default(), generic());
    builder.forward(10.0); // step 0
    builder.line_to(Vector2d::new(10.0, 10.0)); // step 1: discontinuous
    builder.forward(5.0); // step 2
    let errors = builder.build().unwrap_err();

    assert_eq!(errors.errors.len(), 1);
    assert_eq!(errors.errors[0].0, 1);
    assert!(matches!(errors.errors[0].1, TrajectoryBuildError::Path(_)));

    // The best-effort trajectory still covers the surviving steps.
    let partial = errors.partial.unwrap();
    assert!((partial.length() - 15.0).abs() < 1e-6);
    let end = partial.end();
    assert!(epsilon_eq(end.x, 15.0));
    assert!(epsilon_eq(end.y, 0.0));
}

#[test]
fn test_empty_build_reports_empty_path() {
    let builder = TrajectoryBuilder::new(Pose2d::default(), generic());
    let errors = builder.build().unwrap_err();
    assert!(errors.partial.is_none());
    assert_eq!(errors.errors.len(), 1);
    assert!(matches!(
        errors.errors[0].1,
        TrajectoryBuildError::Path(crate::path_builder::PathBuilderError::EmptyPath)
    ));
}

#[test]
fn test_distance_and_reparam() {
    let mut builder = TrajectoryBuilder::new(Pose2d::default(), generic());
    builder.forward(60.0);
    let trajectory = builder.build().unwrap();
    assert!(epsilon_eq(trajectory.distance(0.0), 0.0));
    assert!((trajectory.distance(trajectory.duration()) - 60.0).abs() < 1e-6);
    // reparam inverts distance.
    let t = trajectory.reparam(30.0);
    assert!((trajectory.distance(t) - 30.0).abs() < 1e-3);
}

#[test]
fn test_consecutive_path_steps_share_one_segment() {
    let mut builder = TrajectoryBuilder::new(Pose2d::default(), generic());
    builder.forward(10.0).forward(10.0);
    let trajectory = builder.build().unwrap();
    // Two contiguous path steps accumulate into a single profiled segment.
    assert_eq!(trajectory.segments().len(), 1);
    assert!(matches!(trajectory.segments()[0], TrajectorySegment::Path { .. }));
    assert!((trajectory.length() - 20.0).abs() < 1e-6);
}
