//! Time-parameterized trajectories: the object a drivetrain controller
//! queries once per control tick.

use crate::geometry::Pose2d;
use crate::math::epsilon_eq;
use crate::trajectory_segments::TrajectorySegment;

/// An ordered sequence of trajectory segments with continuous pose, velocity
/// and acceleration across boundaries. Immutable once built; safe to query
/// concurrently.
#[derive(Debug, Clone)]
pub struct Trajectory {
    segments: Vec<TrajectorySegment>,
}

impl Trajectory {
    /// Creates a trajectory from its segments. The list must not be empty;
    /// use [crate::trajectory_builder::TrajectoryBuilder] for checked
    /// construction.
    pub fn new(segments: Vec<TrajectorySegment>) -> Trajectory {
        assert!(
            !segments.is_empty(),
            "a Trajectory cannot be constructed without segments"
        );
        Trajectory { segments }
    }

    pub fn from_segment(segment: TrajectorySegment) -> Trajectory {
        Trajectory::new(vec![segment])
    }

    pub fn segments(&self) -> &[TrajectorySegment] {
        &self.segments
    }

    /// Returns the total duration in seconds.
    pub fn duration(&self) -> f64 {
        self.segments.iter().map(TrajectorySegment::duration).sum()
    }

    /// Returns the total path length.
    pub fn length(&self) -> f64 {
        self.segments.iter().map(TrajectorySegment::length).sum()
    }

    /// Returns the segment active at time `t` and the time offset into it.
    pub fn segment(&self, t: f64) -> (&TrajectorySegment, f64) {
        if t <= 0.0 {
            return (&self.segments[0], 0.0);
        }
        let mut remaining = t;
        for segment in &self.segments {
            if remaining <= segment.duration() {
                return (segment, remaining);
            }
            remaining -= segment.duration();
        }
        let last = self.segments.last().unwrap();
        (last, last.duration())
    }

    /// Returns the pose `t` seconds into the trajectory.
    pub fn get(&self, t: f64) -> Pose2d {
        let (segment, offset) = self.segment(t);
        segment.get(offset)
    }

    /// Returns the field-frame pose velocity at time `t`.
    pub fn velocity(&self, t: f64) -> Pose2d {
        let (segment, offset) = self.segment(t);
        segment.velocity(offset)
    }

    /// Returns the field-frame pose acceleration at time `t`.
    pub fn acceleration(&self, t: f64) -> Pose2d {
        let (segment, offset) = self.segment(t);
        segment.acceleration(offset)
    }

    /// Returns the pose derivative with respect to arc length at time `t`.
    pub fn deriv(&self, t: f64) -> Pose2d {
        let (segment, offset) = self.segment(t);
        segment.deriv(offset)
    }

    /// Returns the pose second derivative at time `t`.
    pub fn second_deriv(&self, t: f64) -> Pose2d {
        let (segment, offset) = self.segment(t);
        segment.second_deriv(offset)
    }

    /// Returns the distance traveled `t` seconds into the trajectory.
    pub fn distance(&self, t: f64) -> f64 {
        if t <= 0.0 {
            return 0.0;
        }
        let mut distance = 0.0;
        let mut remaining = t;
        for segment in &self.segments {
            if remaining <= segment.duration() {
                return distance + segment.distance(remaining);
            }
            remaining -= segment.duration();
            distance += segment.length();
        }
        distance
    }

    /// Returns the time at which the trajectory has traveled distance `s`, by
    /// bisection. Only meaningful while distance is non-decreasing.
    pub fn reparam(&self, s: f64) -> f64 {
        let mut t_lo = 0.0;
        let mut t_hi = self.duration();
        for _ in 0..50 {
            let t_mid = 0.5 * (t_lo + t_hi);
            if self.distance(t_mid) > s {
                t_hi = t_mid;
            } else {
                t_lo = t_mid;
            }
            if epsilon_eq(t_lo, t_hi) {
                break;
            }
        }
        0.5 * (t_lo + t_hi)
    }

    /// Returns the start pose.
    pub fn start(&self) -> Pose2d {
        self.segments.first().unwrap().start()
    }

    /// Returns the end pose.
    pub fn end(&self) -> Pose2d {
        self.segments.last().unwrap().end()
    }
}
