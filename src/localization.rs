//! Incremental pose estimation from wheel encoders and optional heading
//! sensors.
//!
//! A localizer owns a mutable pose estimate and refines it once per control
//! tick from the deltas of its wheel readings, integrating each robot-frame
//! delta with the constant-curvature odometry composition. An external
//! heading sensor, when present, is authoritative over wheel-odometry heading;
//! an external heading-rate sensor likewise overrides the kinematic angular
//! velocity estimate. Assigning the pose estimate clears the internal
//! delta-tracking state so the next update does not integrate across the
//! discontinuity.
//!
//! Updates must be issued sequentially by a single control loop; the
//! delta-tracking state is not synchronized.

use crate::diff_swerve::{self, DiffSwerveGeometry};
use crate::geometry::{Angle, Pose2d, Vector2d};
use crate::kinematics::relative_odometry_update;
use crate::mecanum::{self, MecanumGeometry};
use crate::swerve::{self, SwerveGeometry};
use crate::tank::{self, TankGeometry};
use nalgebra::{Matrix3, Vector3};
use tracing::trace;

/// A pose estimator updated once per control tick from a sensor reading.
pub trait Localizer {
    /// The per-tick sensor reading this localizer consumes.
    type Update;

    /// Current robot pose estimate.
    fn pose_estimate(&self) -> Pose2d;

    /// Overrides the pose estimate and clears delta-tracking state.
    fn set_pose_estimate(&mut self, pose: Pose2d);

    /// Current robot pose velocity, when wheel velocity telemetry exists.
    fn pose_velocity(&self) -> Option<Pose2d>;

    /// Completes a single localization update.
    fn update(&mut self, reading: &Self::Update);
}

/// One tick of drive-encoder telemetry for a drivetrain with `N` wheels.
#[derive(Debug, Clone, Copy)]
pub struct WheelReading<const N: usize> {
    /// Wheel positions in linear distance units.
    pub positions: [f64; N],
    /// Wheel velocities in linear distance units, when available.
    pub velocities: Option<[f64; N]>,
    /// External heading, when a heading sensor is present.
    pub heading: Option<Angle>,
    /// External heading rate, when the sensor reports one.
    pub heading_velocity: Option<Angle>,
}

impl<const N: usize> WheelReading<N> {
    /// A reading with positions only.
    pub fn positions(positions: [f64; N]) -> WheelReading<N> {
        WheelReading { positions, velocities: None, heading: None, heading_velocity: None }
    }
}

/// Shared delta-tracking core for the wheel-odometry localizers.
#[derive(Debug, Clone)]
struct OdometryCore<const N: usize> {
    pose: Pose2d,
    velocity: Option<Pose2d>,
    last_positions: Option<[f64; N]>,
    last_heading: Option<Angle>,
}

impl<const N: usize> OdometryCore<N> {
    fn new() -> OdometryCore<N> {
        OdometryCore {
            pose: Pose2d::default(),
            velocity: None,
            last_positions: None,
            last_heading: None,
        }
    }

    fn reset(&mut self, pose: Pose2d) {
        trace!(%pose, "pose estimate reset");
        self.pose = pose;
        self.last_positions = None;
        self.last_heading = None;
    }

    /// Integrates one tick. `wheel_to_twist` converts wheel deltas (or
    /// velocities) into a robot-frame twist.
    fn update(
        &mut self,
        reading: &WheelReading<N>,
        wheel_to_twist: impl Fn([f64; N]) -> Pose2d,
    ) {
        if let Some(last) = self.last_positions {
            let mut deltas = [0.0; N];
            for i in 0..N {
                deltas[i] = reading.positions[i] - last[i];
            }
            let robot_delta = wheel_to_twist(deltas);
            let heading_delta = match (reading.heading, self.last_heading) {
                (Some(current), Some(previous)) => (current - previous).norm_delta(),
                _ => robot_delta.heading,
            };
            self.pose = relative_odometry_update(
                self.pose,
                Pose2d::from_vec(robot_delta.vec(), heading_delta),
            );
        }

        self.velocity = reading.velocities.map(|velocities| {
            let twist = wheel_to_twist(velocities);
            match reading.heading_velocity {
                Some(rate) => Pose2d::from_vec(twist.vec(), rate),
                None => twist,
            }
        });

        self.last_positions = Some(reading.positions);
        self.last_heading = reading.heading;
    }
}

/// Drive-encoder localizer for mecanum bases.
#[derive(Debug, Clone)]
pub struct MecanumLocalizer {
    geometry: MecanumGeometry,
    core: OdometryCore<4>,
}

impl MecanumLocalizer {
    pub fn new(geometry: MecanumGeometry) -> MecanumLocalizer {
        MecanumLocalizer { geometry, core: OdometryCore::new() }
    }
}

impl Localizer for MecanumLocalizer {
    type Update = WheelReading<4>;

    fn pose_estimate(&self) -> Pose2d {
        self.core.pose
    }

    fn set_pose_estimate(&mut self, pose: Pose2d) {
        self.core.reset(pose);
    }

    fn pose_velocity(&self) -> Option<Pose2d> {
        self.core.velocity
    }

    fn update(&mut self, reading: &WheelReading<4>) {
        let geometry = self.geometry;
        self.core
            .update(reading, |wheels| mecanum::wheel_to_robot_velocities(wheels, geometry));
    }
}

/// Drive-encoder localizer for tank bases.
#[derive(Debug, Clone)]
pub struct TankLocalizer {
    geometry: TankGeometry,
    core: OdometryCore<2>,
}

impl TankLocalizer {
    pub fn new(geometry: TankGeometry) -> TankLocalizer {
        TankLocalizer { geometry, core: OdometryCore::new() }
    }
}

impl Localizer for TankLocalizer {
    type Update = WheelReading<2>;

    fn pose_estimate(&self) -> Pose2d {
        self.core.pose
    }

    fn set_pose_estimate(&mut self, pose: Pose2d) {
        self.core.reset(pose);
    }

    fn pose_velocity(&self) -> Option<Pose2d> {
        self.core.velocity
    }

    fn update(&mut self, reading: &WheelReading<2>) {
        let geometry = self.geometry;
        self.core
            .update(reading, |wheels| tank::wheel_to_robot_velocities(wheels, geometry));
    }
}

/// One tick of telemetry for a four-module swerve base.
#[derive(Debug, Clone, Copy)]
pub struct SwerveReading {
    pub wheel_positions: [f64; 4],
    pub wheel_velocities: Option<[f64; 4]>,
    pub module_orientations: [Angle; 4],
    pub heading: Option<Angle>,
    pub heading_velocity: Option<Angle>,
}

/// Drive-encoder localizer for swerve bases.
#[derive(Debug, Clone)]
pub struct SwerveLocalizer {
    geometry: SwerveGeometry,
    core: OdometryCore<4>,
    last_orientations: Option<[Angle; 4]>,
}

impl SwerveLocalizer {
    pub fn new(geometry: SwerveGeometry) -> SwerveLocalizer {
        SwerveLocalizer { geometry, core: OdometryCore::new(), last_orientations: None }
    }
}

impl Localizer for SwerveLocalizer {
    type Update = SwerveReading;

    fn pose_estimate(&self) -> Pose2d {
        self.core.pose
    }

    fn set_pose_estimate(&mut self, pose: Pose2d) {
        self.core.reset(pose);
        self.last_orientations = None;
    }

    fn pose_velocity(&self) -> Option<Pose2d> {
        self.core.velocity
    }

    fn update(&mut self, reading: &SwerveReading) {
        let geometry = self.geometry;
        // Wheel deltas are resolved along the module orientations of the
        // previous tick, matching the interval they were accumulated over.
        let orientations = self.last_orientations.unwrap_or(reading.module_orientations);
        let wheel_reading = WheelReading {
            positions: reading.wheel_positions,
            velocities: reading.wheel_velocities,
            heading: reading.heading,
            heading_velocity: reading.heading_velocity,
        };
        self.core.update(&wheel_reading, |wheels| {
            swerve::wheel_to_robot_velocities(wheels, orientations, geometry)
        });
        self.last_orientations = Some(reading.module_orientations);
    }
}

/// One tick of telemetry for a differential swerve base.
#[derive(Debug, Clone, Copy)]
pub struct DiffSwerveReading {
    /// Gear positions in linear distance units.
    pub gear_positions: [f64; 4],
    /// Gear velocities in linear distance units, when available.
    pub gear_velocities: Option<[f64; 4]>,
    /// Total gear rotations (for module orientation recovery).
    pub gear_rotations: [Angle; 4],
    pub heading: Option<Angle>,
    pub heading_velocity: Option<Angle>,
}

/// Drive-encoder localizer for differential swerve bases.
#[derive(Debug, Clone)]
pub struct DiffSwerveLocalizer {
    geometry: DiffSwerveGeometry,
    core: OdometryCore<4>,
    last_rotations: Option<[Angle; 4]>,
}

impl DiffSwerveLocalizer {
    pub fn new(geometry: DiffSwerveGeometry) -> DiffSwerveLocalizer {
        DiffSwerveLocalizer { geometry, core: OdometryCore::new(), last_rotations: None }
    }
}

impl Localizer for DiffSwerveLocalizer {
    type Update = DiffSwerveReading;

    fn pose_estimate(&self) -> Pose2d {
        self.core.pose
    }

    fn set_pose_estimate(&mut self, pose: Pose2d) {
        self.core.reset(pose);
        self.last_rotations = None;
    }

    fn pose_velocity(&self) -> Option<Pose2d> {
        self.core.velocity
    }

    fn update(&mut self, reading: &DiffSwerveReading) {
        let geometry = self.geometry;
        let rotations = self.last_rotations.unwrap_or(reading.gear_rotations);
        let wheel_reading = WheelReading {
            positions: reading.gear_positions,
            velocities: reading.gear_velocities,
            heading: reading.heading,
            heading_velocity: reading.heading_velocity,
        };
        self.core.update(&wheel_reading, |gears| {
            diff_swerve::gear_to_robot_velocities(rotations, gears, geometry)
        });
        self.last_rotations = Some(reading.gear_rotations);
    }
}

/// One tick of passive tracking-wheel telemetry.
#[derive(Debug, Clone, Copy)]
pub struct TrackingWheelReading<const N: usize> {
    /// Tracking wheel positions in linear distance units.
    pub positions: [f64; N],
    /// Tracking wheel velocities, when available.
    pub velocities: Option<[f64; N]>,
}

/// Dead-wheel localizer using three passive tracking wheels.
///
/// Each wheel pose gives the wheel's position in the robot frame and the
/// direction it rolls in. The three wheel equations form an invertible linear
/// map from the robot twist to the wheel deltas; the inverse is computed once
/// at construction.
#[derive(Debug, Clone)]
pub struct ThreeWheelLocalizer {
    inverse: Matrix3<f64>,
    pose: Pose2d,
    velocity: Option<Pose2d>,
    last_positions: Option<[f64; 3]>,
}

impl ThreeWheelLocalizer {
    /// Builds the localizer from the three tracking wheel poses. The layout
    /// must not be degenerate (e.g. all three wheels parallel), which is a
    /// configuration error, not a runtime condition.
    pub fn new(wheel_poses: [Pose2d; 3]) -> ThreeWheelLocalizer {
        let mut forward = Matrix3::zeros();
        for (i, wheel) in wheel_poses.iter().enumerate() {
            let heading = wheel.heading;
            forward[(i, 0)] = heading.cos();
            forward[(i, 1)] = heading.sin();
            forward[(i, 2)] = wheel.x * heading.sin() - wheel.y * heading.cos();
        }
        let inverse = forward
            .try_inverse()
            .expect("degenerate tracking wheel layout");
        ThreeWheelLocalizer { inverse, pose: Pose2d::default(), velocity: None, last_positions: None }
    }

    fn wheel_to_twist(&self, deltas: [f64; 3]) -> Pose2d {
        let twist = self.inverse * Vector3::new(deltas[0], deltas[1], deltas[2]);
        Pose2d::from_vec(Vector2d::new(twist[0], twist[1]), Angle::rad(twist[2]))
    }
}

impl Localizer for ThreeWheelLocalizer {
    type Update = TrackingWheelReading<3>;

    fn pose_estimate(&self) -> Pose2d {
        self.pose
    }

    fn set_pose_estimate(&mut self, pose: Pose2d) {
        trace!(%pose, "pose estimate reset");
        self.pose = pose;
        self.last_positions = None;
    }

    fn pose_velocity(&self) -> Option<Pose2d> {
        self.velocity
    }

    fn update(&mut self, reading: &TrackingWheelReading<3>) {
        if let Some(last) = self.last_positions {
            let deltas = [
                reading.positions[0] - last[0],
                reading.positions[1] - last[1],
                reading.positions[2] - last[2],
            ];
            let robot_delta = self.wheel_to_twist(deltas);
            self.pose = relative_odometry_update(self.pose, robot_delta);
        }
        self.velocity = reading.velocities.map(|v| self.wheel_to_twist(v));
        self.last_positions = Some(reading.positions);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::epsilon_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_zero_deltas_leave_pose_unchanged() {
        let mut localizer = MecanumLocalizer::new(MecanumGeometry::new(1.0));
        let reading = WheelReading::positions([3.0, 3.0, 3.0, 3.0]);
        localizer.update(&reading);
        localizer.update(&reading);
        localizer.update(&reading);
        let pose = localizer.pose_estimate();
        assert!(epsilon_eq(pose.x, 0.0));
        assert!(epsilon_eq(pose.y, 0.0));
        assert!(pose.heading.epsilon_eq(Angle::rad(0.0)));
    }

    #[test]
    fn test_straight_line_odometry() {
        let mut localizer = MecanumLocalizer::new(MecanumGeometry::new(1.0));
        for i in 0..=10 {
            let p = i as f64 * 0.5;
            localizer.update(&WheelReading::positions([p, p, p, p]));
        }
        let pose = localizer.pose_estimate();
        assert!(epsilon_eq(pose.x, 5.0));
        assert!(epsilon_eq(pose.y, 0.0));
        assert!(pose.heading.epsilon_eq(Angle::rad(0.0)));
    }

    #[test]
    fn test_external_heading_is_authoritative() {
        let mut localizer = MecanumLocalizer::new(MecanumGeometry::new(1.0));
        // Wheels claim no rotation, the heading sensor disagrees.
        let mut reading = WheelReading::positions([0.0; 4]);
        reading.heading = Some(Angle::rad(0.0));
        localizer.update(&reading);
        reading.heading = Some(Angle::rad(0.3));
        localizer.update(&reading);
        assert!(localizer.pose_estimate().heading.epsilon_eq(Angle::rad(0.3)));
    }

    #[test]
    fn test_pose_reset_clears_delta_tracking() {
        let mut localizer = TankLocalizer::new(TankGeometry::new(1.0));
        localizer.update(&WheelReading::positions([0.0, 0.0]));
        localizer.update(&WheelReading::positions([1.0, 1.0]));
        assert!(epsilon_eq(localizer.pose_estimate().x, 1.0));

        localizer.set_pose_estimate(Pose2d::new(10.0, 10.0, Angle::rad(0.0)));
        // The first update after a reset must not integrate a delta against
        // readings from before the reset.
        localizer.update(&WheelReading::positions([5.0, 5.0]));
        assert!(epsilon_eq(localizer.pose_estimate().x, 10.0));
        localizer.update(&WheelReading::positions([6.0, 6.0]));
        assert!(epsilon_eq(localizer.pose_estimate().x, 11.0));
    }

    #[test]
    fn test_tank_arc_matches_closed_form() {
        // Drive a quarter circle of radius 2 with track width 1: the left
        // wheel traces radius 1.5, the right 2.5.
        let mut localizer = TankLocalizer::new(TankGeometry::new(1.0));
        let steps = 200;
        let total_angle = PI / 2.0;
        for i in 0..=steps {
            let theta = total_angle * i as f64 / steps as f64;
            localizer.update(&WheelReading::positions([1.5 * theta, 2.5 * theta]));
        }
        let pose = localizer.pose_estimate();
        assert!((pose.x - 2.0).abs() < 1e-6, "x: {}", pose.x);
        assert!((pose.y - 2.0).abs() < 1e-6, "y: {}", pose.y);
        assert!(pose.heading.epsilon_eq(Angle::rad(total_angle)));
    }

    #[test]
    fn test_pose_velocity_from_wheel_telemetry() {
        let mut localizer = MecanumLocalizer::new(MecanumGeometry::new(1.0));
        assert!(localizer.pose_velocity().is_none());
        let mut reading = WheelReading::positions([0.0; 4]);
        reading.velocities = Some([2.0, 2.0, 2.0, 2.0]);
        localizer.update(&reading);
        let velocity = localizer.pose_velocity().unwrap();
        assert!(epsilon_eq(velocity.x, 2.0));
        // A heading-rate sensor overrides the kinematic estimate.
        reading.heading_velocity = Some(Angle::rad(0.5));
        localizer.update(&reading);
        assert!(epsilon_eq(localizer.pose_velocity().unwrap().heading.radians(), 0.5));
    }

    #[test]
    fn test_three_wheel_localizer_straight_line() {
        // Two forward wheels offset laterally, one lateral wheel.
        let localizer_poses = [
            Pose2d::new(0.0, 1.0, Angle::rad(0.0)),
            Pose2d::new(0.0, -1.0, Angle::rad(0.0)),
            Pose2d::new(-1.0, 0.0, Angle::deg(90.0)),
        ];
        let mut localizer = ThreeWheelLocalizer::new(localizer_poses);
        localizer.update(&TrackingWheelReading { positions: [0.0, 0.0, 0.0], velocities: None });
        localizer.update(&TrackingWheelReading { positions: [2.0, 2.0, 0.0], velocities: None });
        let pose = localizer.pose_estimate();
        assert!(epsilon_eq(pose.x, 2.0));
        assert!(epsilon_eq(pose.y, 0.0));
        assert!(pose.heading.epsilon_eq(Angle::rad(0.0)));
    }

    #[test]
    fn test_swerve_localizer_forward() {
        let mut localizer = SwerveLocalizer::new(SwerveGeometry::new(1.0));
        let forward = [Angle::rad(0.0); 4];
        let reading = |p: f64| SwerveReading {
            wheel_positions: [p; 4],
            wheel_velocities: None,
            module_orientations: forward,
            heading: None,
            heading_velocity: None,
        };
        localizer.update(&reading(0.0));
        localizer.update(&reading(1.0));
        localizer.update(&reading(2.0));
        let pose = localizer.pose_estimate();
        assert!((pose.x - 2.0).abs() < 1e-9);
        assert!(pose.y.abs() < 1e-9);
    }
}
