//! Time-indexed motion profiles composed of closed-form segments.

use crate::math::epsilon_eq;
use crate::motion_state::{MotionSegment, MotionState};
use std::fmt;

/// A motion profile: an ordered sequence of time-contiguous segments, each
/// evaluable in closed form. Position and velocity are continuous across
/// segment boundaries by construction.
#[derive(Debug, Clone)]
pub struct MotionProfile {
    segments: Vec<MotionSegment>,
}

impl MotionProfile {
    /// Creates a profile from its segments. The list must not be empty.
    pub fn new(segments: Vec<MotionSegment>) -> MotionProfile {
        assert!(
            !segments.is_empty(),
            "a MotionProfile cannot be constructed without segments"
        );
        MotionProfile { segments }
    }

    pub fn segments(&self) -> &[MotionSegment] {
        &self.segments
    }

    /// Returns the state at time `t`, clamped to the profile boundaries.
    pub fn get(&self, t: f64) -> MotionState {
        if t < 0.0 {
            return self.segments.first().unwrap().start;
        }
        let mut remaining = t;
        for segment in &self.segments {
            if remaining <= segment.dt {
                return segment.at(remaining);
            }
            remaining -= segment.dt;
        }
        self.end()
    }

    /// Finds the state at position `s` by bisection over time. Only meaningful
    /// for profiles whose position is non-decreasing.
    pub fn get_by_distance(&self, s: f64) -> MotionState {
        let mut t_lo = 0.0;
        let mut t_hi = self.duration();
        for _ in 0..50 {
            let t_mid = 0.5 * (t_lo + t_hi);
            if self.get(t_mid).x > s {
                t_hi = t_mid;
            } else {
                t_lo = t_mid;
            }
            if epsilon_eq(t_lo, t_hi) {
                break;
            }
        }
        self.get(0.5 * (t_lo + t_hi))
    }

    /// Returns the total duration of the profile.
    pub fn duration(&self) -> f64 {
        self.segments.iter().map(|segment| segment.dt).sum()
    }

    /// Returns the start state.
    pub fn start(&self) -> MotionState {
        self.segments.first().unwrap().start
    }

    /// Returns the end state.
    pub fn end(&self) -> MotionState {
        self.segments.last().unwrap().end()
    }

    /// Returns a flipped (negated) version of the profile.
    pub fn flipped(&self) -> MotionProfile {
        MotionProfile::new(self.segments.iter().map(MotionSegment::flipped).collect())
    }
}

impl fmt::Display for MotionProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "({}, {:.3}s)", segment.start, segment.dt)?;
        }
        write!(f, "]")
    }
}

/// Builder appending constant-acceleration and constant-jerk controls from a
/// start state, keeping position and velocity continuous.
#[derive(Debug, Clone)]
pub struct MotionProfileBuilder {
    current: MotionState,
    segments: Vec<MotionSegment>,
}

impl MotionProfileBuilder {
    pub fn new(start: MotionState) -> MotionProfileBuilder {
        MotionProfileBuilder { current: start, segments: Vec::new() }
    }

    /// Appends a constant-acceleration control for `dt` seconds.
    pub fn append_acceleration_control(&mut self, accel: f64, dt: f64) -> &mut Self {
        if dt <= 0.0 {
            return self;
        }
        let start = MotionState::new(self.current.x, self.current.v, accel, 0.0);
        let segment = MotionSegment::new(start, dt);
        self.current = segment.end();
        self.segments.push(segment);
        self
    }

    /// Appends a constant-jerk control for `dt` seconds, continuing from the
    /// current acceleration.
    pub fn append_jerk_control(&mut self, jerk: f64, dt: f64) -> &mut Self {
        if dt <= 0.0 {
            return self;
        }
        let start = MotionState::new(self.current.x, self.current.v, self.current.a, jerk);
        let segment = MotionSegment::new(start, dt);
        self.current = segment.end();
        self.segments.push(segment);
        self
    }

    /// Appends another profile's controls, re-based onto the current state.
    pub fn append_profile(&mut self, profile: &MotionProfile) -> &mut Self {
        for segment in profile.segments() {
            if epsilon_eq(segment.start.j, 0.0) {
                self.append_acceleration_control(segment.start.a, segment.dt);
            } else {
                // Restore the segment's entry acceleration before continuing
                // under its jerk.
                self.current.a = segment.start.a;
                self.append_jerk_control(segment.start.j, segment.dt);
            }
        }
        self
    }

    /// The state the next appended control would start from.
    pub fn current_state(&self) -> MotionState {
        self.current
    }

    pub fn build(self) -> MotionProfile {
        if self.segments.is_empty() {
            // A degenerate profile holds its start state for zero seconds.
            return MotionProfile::new(vec![MotionSegment::new(self.current, 0.0)]);
        }
        MotionProfile::new(self.segments)
    }
}
