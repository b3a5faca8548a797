//! Kinematic state of a motion profile along one scalar axis.

use std::fmt;

/// Position, velocity, acceleration and jerk along one scalar axis (arc
/// length or angle) at a single instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionState {
    pub x: f64,
    pub v: f64,
    pub a: f64,
    pub j: f64,
}

impl MotionState {
    pub fn new(x: f64, v: f64, a: f64, j: f64) -> MotionState {
        MotionState { x, v, a, j }
    }

    /// A state at rest at position `x`.
    pub fn at_rest(x: f64) -> MotionState {
        MotionState::new(x, 0.0, 0.0, 0.0)
    }

    /// Evaluates the state at time offset `t` under constant jerk.
    pub fn at(&self, t: f64) -> MotionState {
        MotionState::new(
            self.x + self.v * t + self.a / 2.0 * t * t + self.j / 6.0 * t * t * t,
            self.v + self.a * t + self.j / 2.0 * t * t,
            self.a + self.j * t,
            self.j,
        )
    }

    /// Returns a flipped (negated) version of the state.
    pub fn flipped(&self) -> MotionState {
        MotionState::new(-self.x, -self.v, -self.a, -self.j)
    }

    /// Returns the state with velocity, acceleration and jerk zeroed.
    pub fn stationary(&self) -> MotionState {
        MotionState::at_rest(self.x)
    }
}

impl fmt::Display for MotionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(x={:.3}, v={:.3}, a={:.3}, j={:.3})",
            self.x, self.v, self.a, self.j
        )
    }
}

/// Segment of a motion profile with constant jerk (usually constant
/// acceleration, jerk zero).
#[derive(Debug, Clone, Copy)]
pub struct MotionSegment {
    pub start: MotionState,
    pub dt: f64,
}

impl MotionSegment {
    pub fn new(start: MotionState, dt: f64) -> MotionSegment {
        MotionSegment { start, dt }
    }

    /// Returns the state at time `t` into the segment.
    pub fn at(&self, t: f64) -> MotionState {
        self.start.at(t)
    }

    /// Returns the state at the end of the segment.
    pub fn end(&self) -> MotionState {
        self.start.at(self.dt)
    }

    /// Returns a flipped (negated) version of the segment.
    pub fn flipped(&self) -> MotionSegment {
        MotionSegment::new(self.start.flipped(), self.dt)
    }
}
