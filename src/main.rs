use anyhow::Result;
use rs_drive_planner::constraints::{MecanumConstraints, TrajectoryConstraints};
use rs_drive_planner::geometry::{Angle, Pose2d, Vector2d};
use rs_drive_planner::kinematics::field_to_robot_velocity;
use rs_drive_planner::localization::{Localizer, MecanumLocalizer, WheelReading};
use rs_drive_planner::mecanum::{self, MecanumGeometry};
use rs_drive_planner::trajectory_builder::TrajectoryBuilder;

/// Usage example: build a trajectory, sample it like a control loop would,
/// and convert the sampled velocities into wheel commands.
fn main() -> Result<()> {
    let geometry = MecanumGeometry { track_width: 12.0, wheel_base: 12.0, lateral_multiplier: 1.0 };
    let constraints = TrajectoryConstraints::Mecanum(MecanumConstraints {
        max_wheel_vel: 60.0,
        geometry,
        max_vel: 40.0,
        max_accel: 40.0,
        max_ang_vel: Angle::deg(180.0),
        max_ang_accel: Angle::deg(180.0),
        max_ang_jerk: Angle::deg(0.0),
    });

    let mut builder = TrajectoryBuilder::new(Pose2d::default(), constraints);
    builder
        .spline_to(Vector2d::new(30.0, 20.0), Angle::deg(0.0))
        .turn(Angle::deg(90.0))
        .forward(12.0)
        .wait(0.5);
    let trajectory = builder.build().map_err(|errors| {
        anyhow::anyhow!("trajectory build failed: {}", errors)
    })?;

    println!("Built a trajectory:");
    println!("  duration: {:.3} s", trajectory.duration());
    println!("  path length: {:.3}", trajectory.length());
    println!("  start: {}", trajectory.start());
    println!("  end:   {}", trajectory.end());

    println!("Sampled states and wheel velocity commands:");
    let samples = 10;
    for i in 0..=samples {
        let t = trajectory.duration() * i as f64 / samples as f64;
        let pose = trajectory.get(t);
        let velocity = trajectory.velocity(t);
        let robot_vel = field_to_robot_velocity(pose, velocity);
        let wheels = mecanum::robot_to_wheel_velocities(robot_vel, geometry);
        println!(
            "  t={:5.2}s pose={} wheels=[{:6.2} {:6.2} {:6.2} {:6.2}]",
            t, pose, wheels[0], wheels[1], wheels[2], wheels[3]
        );
    }

    // Replay the trajectory through the localizer, as if the robot tracked it
    // perfectly: odometry should land close to the trajectory's end pose.
    let mut localizer = MecanumLocalizer::new(geometry);
    let ticks = 500;
    let dt = trajectory.duration() / ticks as f64;
    let mut positions = [0.0; 4];
    localizer.update(&WheelReading::positions(positions));
    for i in 1..=ticks {
        let t = dt * i as f64;
        let robot_vel = field_to_robot_velocity(trajectory.get(t), trajectory.velocity(t));
        let wheels = mecanum::robot_to_wheel_velocities(robot_vel, geometry);
        for (position, wheel) in positions.iter_mut().zip(wheels) {
            *position += wheel * dt;
        }
        localizer.update(&WheelReading::positions(positions));
    }
    println!("Odometry replay:");
    println!("  trajectory end: {}", trajectory.end());
    println!("  pose estimate:  {}", localizer.pose_estimate());

    Ok(())
}
