//! Composable velocity and acceleration constraints.
//!
//! A constraint is a pure evaluator: given an arc length, the path pose and
//! unit tangent derivative there, and the base robot-frame velocity already
//! committed on other axes, it returns the maximum additional scalar motion it
//! allows, or signals that the base velocity alone already violates it.
//! Constraints must be `Send + Sync` because the profile generator evaluates
//! samples in parallel.

use crate::diff_swerve::{self, DiffSwerveGeometry};
use crate::geometry::{Angle, Pose2d};
use crate::kinematics::field_to_robot_velocity;
use crate::mecanum::{self, MecanumGeometry};
use crate::swerve::{self, SwerveGeometry};
use crate::tank::{self, TankGeometry};
use std::error::Error;
use std::fmt;

/// Raised when no velocity or acceleration satisfies a constraint at some arc
/// length sample: the requested motion is kinematically infeasible there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnsatisfiableConstraint;

impl fmt::Display for UnsatisfiableConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no feasible velocity/acceleration satisfies the constraint")
    }
}

impl Error for UnsatisfiableConstraint {}

/// Bounds the feasible profile velocity at a path location.
pub trait VelocityConstraint: Send + Sync {
    /// Returns the maximum profile velocity at arc length `s`, where `pose`
    /// and `deriv` describe the path there and `base_robot_vel` is the
    /// already-committed robot-frame velocity.
    fn max_velocity(
        &self,
        s: f64,
        pose: Pose2d,
        deriv: Pose2d,
        base_robot_vel: Pose2d,
    ) -> Result<f64, UnsatisfiableConstraint>;
}

/// Bounds the feasible profile acceleration at a path location.
pub trait AccelerationConstraint: Send + Sync {
    /// Returns the maximum profile acceleration at arc length `s`.
    fn max_acceleration(
        &self,
        s: f64,
        pose: Pose2d,
        deriv: Pose2d,
        base_robot_vel: Pose2d,
    ) -> Result<f64, UnsatisfiableConstraint>;
}

impl<F> VelocityConstraint for F
where
    F: Fn(f64, Pose2d, Pose2d, Pose2d) -> Result<f64, UnsatisfiableConstraint> + Send + Sync,
{
    fn max_velocity(
        &self,
        s: f64,
        pose: Pose2d,
        deriv: Pose2d,
        base_robot_vel: Pose2d,
    ) -> Result<f64, UnsatisfiableConstraint> {
        self(s, pose, deriv, base_robot_vel)
    }
}

/// Limits translational speed, accounting for the speed the base velocity has
/// already consumed.
#[derive(Debug, Clone, Copy)]
pub struct TranslationalVelocityConstraint {
    pub max_translational_vel: f64,
}

impl VelocityConstraint for TranslationalVelocityConstraint {
    fn max_velocity(
        &self,
        _s: f64,
        pose: Pose2d,
        deriv: Pose2d,
        base_robot_vel: Pose2d,
    ) -> Result<f64, UnsatisfiableConstraint> {
        let v0 = base_robot_vel.vec().norm();
        if v0 >= self.max_translational_vel {
            return Err(UnsatisfiableConstraint);
        }
        let robot_deriv = field_to_robot_velocity(pose, deriv);
        let b = base_robot_vel.vec().dot(robot_deriv.vec());
        Ok((b * b - v0 * v0 + self.max_translational_vel * self.max_translational_vel).sqrt() - b)
    }
}

/// Limits angular velocity.
#[derive(Debug, Clone, Copy)]
pub struct AngularVelocityConstraint {
    pub max_ang_vel: Angle,
}

impl VelocityConstraint for AngularVelocityConstraint {
    fn max_velocity(
        &self,
        _s: f64,
        _pose: Pose2d,
        deriv: Pose2d,
        base_robot_vel: Pose2d,
    ) -> Result<f64, UnsatisfiableConstraint> {
        let max = self.max_ang_vel.radians();
        let omega0 = base_robot_vel.heading.radians();
        if omega0.abs() >= max {
            return Err(UnsatisfiableConstraint);
        }
        let heading_deriv = deriv.heading.radians();
        Ok(f64::max(
            (max - omega0) / heading_deriv,
            (-max - omega0) / heading_deriv,
        ))
    }
}

/// Shared wheel-speed bound: the profile velocity under which every wheel
/// stays within `max_wheel_vel`, given the wheel speeds already committed by
/// the base velocity.
fn wheel_velocity_bound(
    base_wheels: &[f64],
    deriv_wheels: &[f64],
    max_wheel_vel: f64,
) -> Result<f64, UnsatisfiableConstraint> {
    if base_wheels.iter().any(|w| w.abs() >= max_wheel_vel) {
        return Err(UnsatisfiableConstraint);
    }
    Ok(base_wheels
        .iter()
        .zip(deriv_wheels)
        .map(|(&w0, &w)| f64::max((max_wheel_vel - w0) / w, (-max_wheel_vel - w0) / w))
        .fold(f64::INFINITY, f64::min))
}

/// Limits the individual wheel speeds of a mecanum drivetrain.
#[derive(Debug, Clone, Copy)]
pub struct MecanumVelocityConstraint {
    pub max_wheel_vel: f64,
    pub geometry: MecanumGeometry,
}

impl VelocityConstraint for MecanumVelocityConstraint {
    fn max_velocity(
        &self,
        _s: f64,
        pose: Pose2d,
        deriv: Pose2d,
        base_robot_vel: Pose2d,
    ) -> Result<f64, UnsatisfiableConstraint> {
        let base = mecanum::robot_to_wheel_velocities(base_robot_vel, self.geometry);
        let robot_deriv = field_to_robot_velocity(pose, deriv);
        let wheels = mecanum::robot_to_wheel_velocities(robot_deriv, self.geometry);
        wheel_velocity_bound(&base, &wheels, self.max_wheel_vel)
    }
}

/// Limits the individual wheel speeds of a tank drivetrain.
#[derive(Debug, Clone, Copy)]
pub struct TankVelocityConstraint {
    pub max_wheel_vel: f64,
    pub geometry: TankGeometry,
}

impl VelocityConstraint for TankVelocityConstraint {
    fn max_velocity(
        &self,
        _s: f64,
        pose: Pose2d,
        deriv: Pose2d,
        base_robot_vel: Pose2d,
    ) -> Result<f64, UnsatisfiableConstraint> {
        let base = tank::robot_to_wheel_velocities(base_robot_vel, self.geometry);
        let robot_deriv = field_to_robot_velocity(pose, deriv);
        let wheels = tank::robot_to_wheel_velocities(robot_deriv, self.geometry);
        wheel_velocity_bound(&base, &wheels, self.max_wheel_vel)
    }
}

/// Limits the individual wheel speeds of a swerve drivetrain.
#[derive(Debug, Clone, Copy)]
pub struct SwerveVelocityConstraint {
    pub max_wheel_vel: f64,
    pub geometry: SwerveGeometry,
}

impl VelocityConstraint for SwerveVelocityConstraint {
    fn max_velocity(
        &self,
        _s: f64,
        pose: Pose2d,
        deriv: Pose2d,
        base_robot_vel: Pose2d,
    ) -> Result<f64, UnsatisfiableConstraint> {
        let base = swerve::robot_to_wheel_velocities(base_robot_vel, self.geometry);
        let robot_deriv = field_to_robot_velocity(pose, deriv);
        let wheels = swerve::robot_to_wheel_velocities(robot_deriv, self.geometry);
        wheel_velocity_bound(&base, &wheels, self.max_wheel_vel)
    }
}

/// Limits the gear speeds of a differential swerve drivetrain. With the
/// module orientation held, the gear speed magnitude equals the wheel speed.
#[derive(Debug, Clone, Copy)]
pub struct DiffSwerveVelocityConstraint {
    pub max_gear_vel: f64,
    pub geometry: DiffSwerveGeometry,
}

impl VelocityConstraint for DiffSwerveVelocityConstraint {
    fn max_velocity(
        &self,
        _s: f64,
        pose: Pose2d,
        deriv: Pose2d,
        base_robot_vel: Pose2d,
    ) -> Result<f64, UnsatisfiableConstraint> {
        let base = diff_swerve::robot_to_wheel_velocities(base_robot_vel, self.geometry);
        let robot_deriv = field_to_robot_velocity(pose, deriv);
        let wheels = diff_swerve::robot_to_wheel_velocities(robot_deriv, self.geometry);
        wheel_velocity_bound(&base, &wheels, self.max_gear_vel)
    }
}

/// Limits translational (profile) acceleration.
#[derive(Debug, Clone, Copy)]
pub struct TranslationalAccelerationConstraint {
    pub max_translational_accel: f64,
}

impl AccelerationConstraint for TranslationalAccelerationConstraint {
    fn max_acceleration(
        &self,
        _s: f64,
        _pose: Pose2d,
        _deriv: Pose2d,
        _base_robot_vel: Pose2d,
    ) -> Result<f64, UnsatisfiableConstraint> {
        Ok(self.max_translational_accel)
    }
}

/// Limits angular acceleration through the linearized bound
/// `max_ang_accel / |d(heading)/ds|`; straight path stretches leave the
/// profile acceleration unbounded.
#[derive(Debug, Clone, Copy)]
pub struct AngularAccelerationConstraint {
    pub max_ang_accel: Angle,
}

impl AccelerationConstraint for AngularAccelerationConstraint {
    fn max_acceleration(
        &self,
        _s: f64,
        _pose: Pose2d,
        deriv: Pose2d,
        _base_robot_vel: Pose2d,
    ) -> Result<f64, UnsatisfiableConstraint> {
        Ok(self.max_ang_accel.radians() / deriv.heading.radians().abs())
    }
}

/// The minimum of a list of velocity constraints. Evaluates every member and
/// propagates the first infeasibility encountered.
pub struct MinVelocityConstraint {
    constraints: Vec<Box<dyn VelocityConstraint>>,
}

impl MinVelocityConstraint {
    pub fn new(constraints: Vec<Box<dyn VelocityConstraint>>) -> MinVelocityConstraint {
        MinVelocityConstraint { constraints }
    }
}

impl VelocityConstraint for MinVelocityConstraint {
    fn max_velocity(
        &self,
        s: f64,
        pose: Pose2d,
        deriv: Pose2d,
        base_robot_vel: Pose2d,
    ) -> Result<f64, UnsatisfiableConstraint> {
        let mut min = f64::INFINITY;
        for constraint in &self.constraints {
            min = min.min(constraint.max_velocity(s, pose, deriv, base_robot_vel)?);
        }
        Ok(min)
    }
}

/// The minimum of a list of acceleration constraints. Evaluates every member
/// and propagates the first infeasibility encountered.
pub struct MinAccelerationConstraint {
    constraints: Vec<Box<dyn AccelerationConstraint>>,
}

impl MinAccelerationConstraint {
    pub fn new(constraints: Vec<Box<dyn AccelerationConstraint>>) -> MinAccelerationConstraint {
        MinAccelerationConstraint { constraints }
    }
}

impl AccelerationConstraint for MinAccelerationConstraint {
    fn max_acceleration(
        &self,
        s: f64,
        pose: Pose2d,
        deriv: Pose2d,
        base_robot_vel: Pose2d,
    ) -> Result<f64, UnsatisfiableConstraint> {
        let mut min = f64::INFINITY;
        for constraint in &self.constraints {
            min = min.min(constraint.max_acceleration(s, pose, deriv, base_robot_vel)?);
        }
        Ok(min)
    }
}

/// Generic (topology-free) constraint parameters.
#[derive(Debug, Clone, Copy)]
pub struct GenericConstraints {
    pub max_vel: f64,
    pub max_accel: f64,
    pub max_ang_vel: Angle,
    pub max_ang_accel: Angle,
    pub max_ang_jerk: Angle,
}

impl Default for GenericConstraints {
    fn default() -> Self {
        GenericConstraints {
            max_vel: 30.0,
            max_accel: 30.0,
            max_ang_vel: Angle::deg(180.0),
            max_ang_accel: Angle::deg(180.0),
            max_ang_jerk: Angle::deg(0.0),
        }
    }
}

/// Mecanum constraint parameters.
#[derive(Debug, Clone, Copy)]
pub struct MecanumConstraints {
    pub max_wheel_vel: f64,
    pub geometry: MecanumGeometry,
    pub max_vel: f64,
    pub max_accel: f64,
    pub max_ang_vel: Angle,
    pub max_ang_accel: Angle,
    pub max_ang_jerk: Angle,
}

impl Default for MecanumConstraints {
    fn default() -> Self {
        let generic = GenericConstraints::default();
        MecanumConstraints {
            max_wheel_vel: 100.0,
            geometry: MecanumGeometry::new(1.0),
            max_vel: generic.max_vel,
            max_accel: generic.max_accel,
            max_ang_vel: generic.max_ang_vel,
            max_ang_accel: generic.max_ang_accel,
            max_ang_jerk: generic.max_ang_jerk,
        }
    }
}

/// Tank constraint parameters.
#[derive(Debug, Clone, Copy)]
pub struct TankConstraints {
    pub max_wheel_vel: f64,
    pub geometry: TankGeometry,
    pub max_vel: f64,
    pub max_accel: f64,
    pub max_ang_vel: Angle,
    pub max_ang_accel: Angle,
    pub max_ang_jerk: Angle,
}

/// Swerve constraint parameters.
#[derive(Debug, Clone, Copy)]
pub struct SwerveConstraints {
    pub max_wheel_vel: f64,
    pub geometry: SwerveGeometry,
    pub max_vel: f64,
    pub max_accel: f64,
    pub max_ang_vel: Angle,
    pub max_ang_accel: Angle,
    pub max_ang_jerk: Angle,
}

/// Differential swerve constraint parameters.
#[derive(Debug, Clone, Copy)]
pub struct DiffSwerveConstraints {
    pub max_gear_vel: f64,
    pub geometry: DiffSwerveGeometry,
    pub max_vel: f64,
    pub max_accel: f64,
    pub max_ang_vel: Angle,
    pub max_ang_accel: Angle,
    pub max_ang_jerk: Angle,
}

/// Per-drivetrain constraint bundle: a named set of drivetrain parameters
/// producing the min-aggregated velocity and acceleration constraints the
/// trajectory builder profiles against.
#[derive(Debug, Clone, Copy)]
pub enum TrajectoryConstraints {
    Generic(GenericConstraints),
    Mecanum(MecanumConstraints),
    Tank(TankConstraints),
    Swerve(SwerveConstraints),
    DiffSwerve(DiffSwerveConstraints),
}

impl TrajectoryConstraints {
    /// Builds the aggregated velocity constraint for this drivetrain.
    pub fn velocity_constraint(&self) -> MinVelocityConstraint {
        match *self {
            TrajectoryConstraints::Generic(c) => MinVelocityConstraint::new(vec![
                Box::new(TranslationalVelocityConstraint { max_translational_vel: c.max_vel }),
                Box::new(AngularVelocityConstraint { max_ang_vel: c.max_ang_vel }),
            ]),
            TrajectoryConstraints::Mecanum(c) => MinVelocityConstraint::new(vec![
                Box::new(MecanumVelocityConstraint {
                    max_wheel_vel: c.max_wheel_vel,
                    geometry: c.geometry,
                }),
                Box::new(TranslationalVelocityConstraint { max_translational_vel: c.max_vel }),
                Box::new(AngularVelocityConstraint { max_ang_vel: c.max_ang_vel }),
            ]),
            TrajectoryConstraints::Tank(c) => MinVelocityConstraint::new(vec![
                Box::new(TankVelocityConstraint {
                    max_wheel_vel: c.max_wheel_vel,
                    geometry: c.geometry,
                }),
                Box::new(TranslationalVelocityConstraint { max_translational_vel: c.max_vel }),
                Box::new(AngularVelocityConstraint { max_ang_vel: c.max_ang_vel }),
            ]),
            TrajectoryConstraints::Swerve(c) => MinVelocityConstraint::new(vec![
                Box::new(SwerveVelocityConstraint {
                    max_wheel_vel: c.max_wheel_vel,
                    geometry: c.geometry,
                }),
                Box::new(TranslationalVelocityConstraint { max_translational_vel: c.max_vel }),
                Box::new(AngularVelocityConstraint { max_ang_vel: c.max_ang_vel }),
            ]),
            TrajectoryConstraints::DiffSwerve(c) => MinVelocityConstraint::new(vec![
                Box::new(DiffSwerveVelocityConstraint {
                    max_gear_vel: c.max_gear_vel,
                    geometry: c.geometry,
                }),
                Box::new(TranslationalVelocityConstraint { max_translational_vel: c.max_vel }),
                Box::new(AngularVelocityConstraint { max_ang_vel: c.max_ang_vel }),
            ]),
        }
    }

    /// Builds the aggregated acceleration constraint for this drivetrain.
    pub fn acceleration_constraint(&self) -> MinAccelerationConstraint {
        let (max_accel, max_ang_accel) = match *self {
            TrajectoryConstraints::Generic(c) => (c.max_accel, c.max_ang_accel),
            TrajectoryConstraints::Mecanum(c) => (c.max_accel, c.max_ang_accel),
            TrajectoryConstraints::Tank(c) => (c.max_accel, c.max_ang_accel),
            TrajectoryConstraints::Swerve(c) => (c.max_accel, c.max_ang_accel),
            TrajectoryConstraints::DiffSwerve(c) => (c.max_accel, c.max_ang_accel),
        };
        MinAccelerationConstraint::new(vec![
            Box::new(TranslationalAccelerationConstraint { max_translational_accel: max_accel }),
            Box::new(AngularAccelerationConstraint { max_ang_accel }),
        ])
    }

    pub fn max_ang_vel(&self) -> Angle {
        match *self {
            TrajectoryConstraints::Generic(c) => c.max_ang_vel,
            TrajectoryConstraints::Mecanum(c) => c.max_ang_vel,
            TrajectoryConstraints::Tank(c) => c.max_ang_vel,
            TrajectoryConstraints::Swerve(c) => c.max_ang_vel,
            TrajectoryConstraints::DiffSwerve(c) => c.max_ang_vel,
        }
    }

    pub fn max_ang_accel(&self) -> Angle {
        match *self {
            TrajectoryConstraints::Generic(c) => c.max_ang_accel,
            TrajectoryConstraints::Mecanum(c) => c.max_ang_accel,
            TrajectoryConstraints::Tank(c) => c.max_ang_accel,
            TrajectoryConstraints::Swerve(c) => c.max_ang_accel,
            TrajectoryConstraints::DiffSwerve(c) => c.max_ang_accel,
        }
    }

    pub fn max_ang_jerk(&self) -> Angle {
        match *self {
            TrajectoryConstraints::Generic(c) => c.max_ang_jerk,
            TrajectoryConstraints::Mecanum(c) => c.max_ang_jerk,
            TrajectoryConstraints::Tank(c) => c.max_ang_jerk,
            TrajectoryConstraints::Swerve(c) => c.max_ang_jerk,
            TrajectoryConstraints::DiffSwerve(c) => c.max_ang_jerk,
        }
    }
}
