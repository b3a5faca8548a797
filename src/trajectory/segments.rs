//! Trajectory segments: the time-indexed pieces a trajectory is spliced from.

use crate::geometry::{Angle, Pose2d, Vector2d};
use crate::motion_profile::MotionProfile;
use crate::path::Path;

/// One time-contiguous piece of a trajectory.
#[derive(Debug, Clone)]
pub enum TrajectorySegment {
    /// Follows `path`, with `profile` mapping time to arc length along it.
    Path { path: Path, profile: MotionProfile },
    /// Turns in place at `pose`; `profile` maps time to the heading offset in
    /// radians.
    Turn { pose: Pose2d, profile: MotionProfile },
    /// Holds `pose` for `duration` seconds.
    Wait { pose: Pose2d, duration: f64 },
}

impl TrajectorySegment {
    pub fn duration(&self) -> f64 {
        match self {
            TrajectorySegment::Path { profile, .. } => profile.duration(),
            TrajectorySegment::Turn { profile, .. } => profile.duration(),
            TrajectorySegment::Wait { duration, .. } => *duration,
        }
    }

    /// Path length covered by this segment (zero for turns and waits).
    pub fn length(&self) -> f64 {
        match self {
            TrajectorySegment::Path { path, .. } => path.length(),
            TrajectorySegment::Turn { .. } | TrajectorySegment::Wait { .. } => 0.0,
        }
    }

    /// Returns the pose at time `t` into the segment.
    pub fn get(&self, t: f64) -> Pose2d {
        match self {
            TrajectorySegment::Path { path, profile } => path.get(profile.get(t).x),
            TrajectorySegment::Turn { pose, profile } => Pose2d::from_vec(
                pose.vec(),
                (pose.heading + Angle::rad(profile.get(t).x)).norm(),
            ),
            TrajectorySegment::Wait { pose, .. } => *pose,
        }
    }

    /// Returns the distance traveled `t` seconds into the segment.
    pub fn distance(&self, t: f64) -> f64 {
        match self {
            TrajectorySegment::Path { profile, .. } => profile.get(t).x,
            TrajectorySegment::Turn { .. } | TrajectorySegment::Wait { .. } => 0.0,
        }
    }

    /// Returns the pose derivative with respect to the segment's own spatial
    /// parameter at time `t`.
    pub fn deriv(&self, t: f64) -> Pose2d {
        match self {
            TrajectorySegment::Path { path, profile } => path.deriv(profile.get(t).x),
            TrajectorySegment::Turn { profile, .. } => Pose2d::from_vec(
                self.get(t).heading_vec(),
                Angle::rad(profile.get(t).v),
            ),
            TrajectorySegment::Wait { pose, .. } => {
                Pose2d::from_vec(pose.heading_vec(), Angle::rad(0.0))
            }
        }
    }

    /// Returns the pose second derivative at time `t`.
    pub fn second_deriv(&self, t: f64) -> Pose2d {
        match self {
            TrajectorySegment::Path { path, profile } => path.second_deriv(profile.get(t).x),
            TrajectorySegment::Turn { .. } => self.acceleration(t),
            TrajectorySegment::Wait { .. } => Pose2d::default(),
        }
    }

    /// Returns the field-frame pose velocity at time `t`.
    pub fn velocity(&self, t: f64) -> Pose2d {
        match self {
            TrajectorySegment::Path { path, profile } => {
                let state = profile.get(t);
                path.deriv(state.x) * state.v
            }
            TrajectorySegment::Turn { profile, .. } => Pose2d::from_vec(
                Vector2d::default(),
                Angle::rad(profile.get(t).v),
            ),
            TrajectorySegment::Wait { .. } => Pose2d::default(),
        }
    }

    /// Returns the field-frame pose acceleration at time `t`.
    pub fn acceleration(&self, t: f64) -> Pose2d {
        match self {
            TrajectorySegment::Path { path, profile } => {
                let state = profile.get(t);
                path.second_deriv(state.x) * (state.v * state.v)
                    + path.deriv(state.x) * state.a
            }
            TrajectorySegment::Turn { profile, .. } => Pose2d::from_vec(
                Vector2d::default(),
                Angle::rad(profile.get(t).a),
            ),
            TrajectorySegment::Wait { .. } => Pose2d::default(),
        }
    }

    /// Returns the start pose.
    pub fn start(&self) -> Pose2d {
        match self {
            TrajectorySegment::Path { path, .. } => path.start(),
            TrajectorySegment::Turn { pose, .. } => *pose,
            TrajectorySegment::Wait { pose, .. } => *pose,
        }
    }

    /// Returns the end pose.
    pub fn end(&self) -> Pose2d {
        match self {
            TrajectorySegment::Path { path, .. } => path.end(),
            TrajectorySegment::Turn { pose, profile } => Pose2d::from_vec(
                pose.vec(),
                (pose.heading + Angle::rad(profile.end().x)).norm(),
            ),
            TrajectorySegment::Wait { pose, .. } => *pose,
        }
    }
}
