//! 2D geometry primitives: angles with explicit units, vectors, and robot poses.
//!
//! All headings stored in a [Pose2d] or returned by path queries are normalized
//! to `[0, 2pi)`; angle *differences* are normalized to `(-pi, pi]` via
//! [Angle::norm_delta]. Arithmetic between angles of different units converts
//! before combining, so mixing degree and radian values is safe.

use crate::math::{epsilon_eq, wrap};
use std::f64::consts::PI;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Units an [Angle] can be expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AngleUnit {
    /// 1/360 of a full rotation.
    Degrees,
    /// 1/2pi of a full rotation.
    Radians,
}

/// An angle with an explicit unit.
#[derive(Debug, Clone, Copy)]
pub struct Angle {
    value: f64,
    units: AngleUnit,
}

impl Default for Angle {
    fn default() -> Self {
        Angle::rad(0.0)
    }
}

impl Angle {
    /// Constructs an angle from the specified value in degrees.
    pub fn deg(value: f64) -> Angle {
        Angle { value, units: AngleUnit::Degrees }
    }

    /// Constructs an angle from the specified value in radians.
    pub fn rad(value: f64) -> Angle {
        Angle { value, units: AngleUnit::Radians }
    }

    /// The measure of this angle in degrees.
    pub fn degrees(&self) -> f64 {
        match self.units {
            AngleUnit::Degrees => self.value,
            AngleUnit::Radians => self.value.to_degrees(),
        }
    }

    /// The measure of this angle in radians.
    pub fn radians(&self) -> f64 {
        match self.units {
            AngleUnit::Degrees => self.value.to_radians(),
            AngleUnit::Radians => self.value,
        }
    }

    /// The measure of this angle in the requested units.
    pub fn value_in(&self, units: AngleUnit) -> f64 {
        match units {
            AngleUnit::Degrees => self.degrees(),
            AngleUnit::Radians => self.radians(),
        }
    }

    fn full_circle(units: AngleUnit) -> f64 {
        match units {
            AngleUnit::Degrees => 360.0,
            AngleUnit::Radians => 2.0 * PI,
        }
    }

    /// Returns this angle normalized to `[0, 2pi)` radians (`[0, 360)` degrees).
    pub fn norm(&self) -> Angle {
        Angle {
            value: wrap(self.value, 0.0, Self::full_circle(self.units)),
            units: self.units,
        }
    }

    /// Returns this angle normalized to `(-pi, pi]` radians (`(-180, 180]` degrees).
    pub fn norm_delta(&self) -> Angle {
        let half = Self::full_circle(self.units) / 2.0;
        let wrapped = wrap(self.value, -half, half);
        Angle {
            value: if wrapped == -half { half } else { wrapped },
            units: self.units,
        }
    }

    /// Returns the shortest signed angle that can be added to this angle to
    /// reach `other` (e.g., 10 deg to 350 deg yields -20 deg).
    pub fn angle_to(&self, other: Angle) -> Angle {
        (other - *self).norm_delta()
    }

    /// Returns the unit vector pointing along this angle.
    pub fn vec(&self) -> Vector2d {
        Vector2d::polar(1.0, *self)
    }

    pub fn cos(&self) -> f64 {
        self.radians().cos()
    }

    pub fn sin(&self) -> f64 {
        self.radians().sin()
    }

    pub fn tan(&self) -> f64 {
        self.radians().tan()
    }

    pub fn abs(&self) -> Angle {
        Angle { value: self.value.abs(), units: self.units }
    }

    /// Approximate equality that treats angles pointing in the same direction
    /// as equal (0 deg = 360 deg = 720 deg).
    pub fn epsilon_eq(&self, other: Angle) -> bool {
        epsilon_eq(self.norm().value_in(other.units), other.norm().value)
    }

    /// Approximate equality of the raw values (0 deg != 360 deg).
    pub fn strict_epsilon_eq(&self, other: Angle) -> bool {
        epsilon_eq(self.value_in(other.units), other.value)
    }
}

impl Add for Angle {
    type Output = Angle;
    fn add(self, other: Angle) -> Angle {
        Angle { value: self.value_in(other.units) + other.value, units: other.units }
    }
}

impl Sub for Angle {
    type Output = Angle;
    fn sub(self, other: Angle) -> Angle {
        Angle { value: self.value_in(other.units) - other.value, units: other.units }
    }
}

impl Mul<f64> for Angle {
    type Output = Angle;
    fn mul(self, scalar: f64) -> Angle {
        Angle { value: self.value * scalar, units: self.units }
    }
}

impl Div<f64> for Angle {
    type Output = Angle;
    fn div(self, scalar: f64) -> Angle {
        Angle { value: self.value / scalar, units: self.units }
    }
}

/// The ratio of two angles, unit-converted first.
impl Div<Angle> for Angle {
    type Output = f64;
    fn div(self, other: Angle) -> f64 {
        self.value_in(other.units) / other.value
    }
}

impl Neg for Angle {
    type Output = Angle;
    fn neg(self) -> Angle {
        Angle { value: -self.value, units: self.units }
    }
}

impl PartialEq for Angle {
    fn eq(&self, other: &Angle) -> bool {
        self.value_in(other.units) == other.value
    }
}

impl PartialOrd for Angle {
    fn partial_cmp(&self, other: &Angle) -> Option<std::cmp::Ordering> {
        self.value_in(other.units).partial_cmp(&other.value)
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}°", self.degrees())
    }
}

/// A 2D vector (x and y).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vector2d {
    pub x: f64,
    pub y: f64,
}

impl Vector2d {
    pub fn new(x: f64, y: f64) -> Vector2d {
        Vector2d { x, y }
    }

    /// Returns a vector in Cartesian coordinates from one in polar coordinates.
    pub fn polar(r: f64, theta: Angle) -> Vector2d {
        Vector2d::new(r * theta.cos(), r * theta.sin())
    }

    /// Returns the magnitude of this vector.
    pub fn norm(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Returns the squared magnitude of this vector.
    pub fn squared_norm(&self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    /// Returns the angle of this vector.
    pub fn angle(&self) -> Angle {
        Angle::rad(self.y.atan2(self.x))
    }

    /// Returns the dot product of two vectors.
    pub fn dot(&self, other: Vector2d) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Returns the 2D cross product of two vectors.
    pub fn cross(&self, other: Vector2d) -> f64 {
        self.x * other.y - self.y * other.x
    }

    /// Returns the distance between two vectors.
    pub fn dist_to(&self, other: Vector2d) -> f64 {
        (*self - other).norm()
    }

    /// Returns the projection of this vector onto another.
    pub fn project_onto(&self, other: Vector2d) -> Vector2d {
        other * (self.dot(other) / other.dot(other))
    }

    /// Rotates this vector counter-clockwise by `angle`.
    pub fn rotated(&self, angle: Angle) -> Vector2d {
        let (sin, cos) = (angle.sin(), angle.cos());
        Vector2d::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    pub fn epsilon_eq(&self, other: Vector2d) -> bool {
        epsilon_eq(self.x, other.x) && epsilon_eq(self.y, other.y)
    }
}

impl Add for Vector2d {
    type Output = Vector2d;
    fn add(self, other: Vector2d) -> Vector2d {
        Vector2d::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Vector2d {
    type Output = Vector2d;
    fn sub(self, other: Vector2d) -> Vector2d {
        Vector2d::new(self.x - other.x, self.y - other.y)
    }
}

impl Mul<f64> for Vector2d {
    type Output = Vector2d;
    fn mul(self, scalar: f64) -> Vector2d {
        Vector2d::new(self.x * scalar, self.y * scalar)
    }
}

impl Div<f64> for Vector2d {
    type Output = Vector2d;
    fn div(self, scalar: f64) -> Vector2d {
        Vector2d::new(self.x / scalar, self.y / scalar)
    }
}

impl Neg for Vector2d {
    type Output = Vector2d;
    fn neg(self) -> Vector2d {
        Vector2d::new(-self.x, -self.y)
    }
}

impl fmt::Display for Vector2d {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}

/// A 2D robot pose (position and heading) or one of its derivatives.
///
/// When a `Pose2d` holds a derivative, `heading` is the angular rate (or its
/// derivative) rather than a direction, which is why pose arithmetic is plain
/// componentwise arithmetic.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Pose2d {
    pub x: f64,
    pub y: f64,
    pub heading: Angle,
}

impl Pose2d {
    pub fn new(x: f64, y: f64, heading: Angle) -> Pose2d {
        Pose2d { x, y, heading }
    }

    pub fn from_vec(pos: Vector2d, heading: Angle) -> Pose2d {
        Pose2d { x: pos.x, y: pos.y, heading }
    }

    /// Returns this pose without its heading.
    pub fn vec(&self) -> Vector2d {
        Vector2d::new(self.x, self.y)
    }

    /// Returns the unit vector pointing along this pose's heading.
    pub fn heading_vec(&self) -> Vector2d {
        self.heading.vec()
    }

    /// Approximate equality with strict heading comparison (0 deg != 360 deg).
    pub fn epsilon_eq(&self, other: Pose2d) -> bool {
        epsilon_eq(self.x, other.x)
            && epsilon_eq(self.y, other.y)
            && self.heading.strict_epsilon_eq(other.heading)
    }

    /// Approximate equality treating same-direction headings as equal.
    pub fn epsilon_eq_heading(&self, other: Pose2d) -> bool {
        epsilon_eq(self.x, other.x)
            && epsilon_eq(self.y, other.y)
            && self.heading.epsilon_eq(other.heading)
    }
}

impl Add for Pose2d {
    type Output = Pose2d;
    fn add(self, other: Pose2d) -> Pose2d {
        Pose2d::new(self.x + other.x, self.y + other.y, self.heading + other.heading)
    }
}

impl Sub for Pose2d {
    type Output = Pose2d;
    fn sub(self, other: Pose2d) -> Pose2d {
        Pose2d::new(self.x - other.x, self.y - other.y, self.heading - other.heading)
    }
}

impl Mul<f64> for Pose2d {
    type Output = Pose2d;
    fn mul(self, scalar: f64) -> Pose2d {
        Pose2d::new(self.x * scalar, self.y * scalar, self.heading * scalar)
    }
}

impl Div<f64> for Pose2d {
    type Output = Pose2d;
    fn div(self, scalar: f64) -> Pose2d {
        Pose2d::new(self.x / scalar, self.y / scalar, self.heading / scalar)
    }
}

impl Neg for Pose2d {
    type Output = Pose2d;
    fn neg(self) -> Pose2d {
        Pose2d::new(-self.x, -self.y, -self.heading)
    }
}

impl fmt::Display for Pose2d {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3}, {})", self.x, self.y, self.heading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_angle_norm() {
        assert!(epsilon_eq(Angle::deg(370.0).norm().degrees(), 10.0));
        assert!(epsilon_eq(Angle::deg(-10.0).norm().degrees(), 350.0));
        assert!(epsilon_eq(Angle::rad(5.0 * PI).norm().radians(), PI));
    }

    #[test]
    fn test_angle_norm_delta() {
        assert!(epsilon_eq(Angle::deg(270.0).norm_delta().degrees(), -90.0));
        assert!(epsilon_eq(Angle::deg(-190.0).norm_delta().degrees(), 170.0));
        assert!(epsilon_eq(Angle::deg(180.0).norm_delta().degrees(), 180.0));
    }

    #[test]
    fn test_angle_mixed_units() {
        let sum = Angle::deg(90.0) + Angle::rad(PI / 2.0);
        assert!(epsilon_eq(sum.radians(), PI));
        assert!(Angle::deg(180.0).epsilon_eq(Angle::rad(PI)));
        assert!(Angle::deg(360.0).epsilon_eq(Angle::rad(0.0)));
        assert!(!Angle::deg(360.0).strict_epsilon_eq(Angle::rad(0.0)));
    }

    #[test]
    fn test_angle_to() {
        assert!(epsilon_eq(Angle::deg(10.0).angle_to(Angle::deg(350.0)).degrees(), -20.0));
        assert!(epsilon_eq(Angle::deg(350.0).angle_to(Angle::deg(10.0)).degrees(), 20.0));
    }

    #[test]
    fn test_vector_rotation() {
        let v = Vector2d::new(1.0, 0.0).rotated(Angle::deg(90.0));
        assert!(v.epsilon_eq(Vector2d::new(0.0, 1.0)));
        assert!(epsilon_eq(Vector2d::new(3.0, 4.0).norm(), 5.0));
    }

    #[test]
    fn test_vector_products() {
        let a = Vector2d::new(1.0, 2.0);
        let b = Vector2d::new(3.0, -1.0);
        assert!(epsilon_eq(a.dot(b), 1.0));
        assert!(epsilon_eq(a.cross(b), -7.0));
        let p = Vector2d::new(2.0, 2.0).project_onto(Vector2d::new(1.0, 0.0));
        assert!(p.epsilon_eq(Vector2d::new(2.0, 0.0)));
    }

    #[test]
    fn test_pose_arithmetic() {
        let a = Pose2d::new(1.0, 2.0, Angle::deg(30.0));
        let b = Pose2d::new(0.5, -1.0, Angle::deg(15.0));
        let sum = a + b;
        assert!(epsilon_eq(sum.x, 1.5));
        assert!(epsilon_eq(sum.y, 1.0));
        assert!(epsilon_eq(sum.heading.degrees(), 45.0));
        let head = Pose2d::new(0.0, 0.0, Angle::deg(90.0)).heading_vec();
        assert!(head.epsilon_eq(Vector2d::new(0.0, 1.0)));
    }
}
