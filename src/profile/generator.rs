//! Motion profile generation: a simple generator for constant limits (with
//! optional jerk limiting) and a constrained generator that integrates
//! arbitrary velocity/acceleration limits over arc length.

use crate::constraints::UnsatisfiableConstraint;
use crate::math::EPSILON;
use crate::motion_profile::{MotionProfile, MotionProfileBuilder};
use crate::motion_state::{MotionSegment, MotionState};
use rayon::prelude::*;
use tracing::debug;

/// Generates a profile from `start` to `goal` under constant `max_vel` and
/// `max_accel`. When `max_jerk` is nonzero an S-curve profile is generated
/// instead of a trapezoidal one. If the boundary states preclude obeying the
/// limits, the smallest violating profile is produced rather than failing.
pub fn generate_simple_profile(
    start: &MotionState,
    goal: &MotionState,
    max_vel: f64,
    max_accel: f64,
    max_jerk: f64,
) -> MotionProfile {
    assert!(max_vel > 0.0 && max_accel > 0.0, "velocity and acceleration limits must be positive");

    // Plan the flipped profile when the goal precedes the start.
    if goal.x < start.x {
        return generate_simple_profile(
            &start.flipped(),
            &goal.flipped(),
            max_vel,
            max_accel,
            max_jerk,
        )
        .flipped();
    }

    if max_jerk.abs() < EPSILON || start.a.abs() > EPSILON || goal.a.abs() > EPSILON {
        generate_accel_limited(start, goal, max_vel, max_accel)
    } else {
        generate_s_curve(start, goal, max_vel, max_accel, max_jerk)
    }
}

/// Acceleration-limited (trapezoidal) profile. Assumes `goal.x >= start.x`.
fn generate_accel_limited(
    start: &MotionState,
    goal: &MotionState,
    max_vel: f64,
    max_accel: f64,
) -> MotionProfile {
    let distance = goal.x - start.x;
    let (v0, v1) = (start.v, goal.v);

    if distance < EPSILON {
        return MotionProfileBuilder::new(*start).build();
    }

    // Not enough room to change velocity within the limit: violate it with a
    // single ramp at the required acceleration.
    if (v1 * v1 - v0 * v0).abs() > 2.0 * max_accel * distance + EPSILON {
        let required = (v1 * v1 - v0 * v0) / (2.0 * distance);
        let dt = if required.abs() > EPSILON {
            (v1 - v0) / required
        } else {
            distance / v0
        };
        let mut builder = MotionProfileBuilder::new(*start);
        builder.append_acceleration_control(required, dt);
        return builder.build();
    }

    // Peak velocity of the pure accelerate-then-decelerate profile.
    let peak = (max_accel * distance + (v0 * v0 + v1 * v1) / 2.0).sqrt();

    if peak <= max_vel {
        let mut builder = MotionProfileBuilder::new(*start);
        builder
            .append_acceleration_control(max_accel, (peak - v0) / max_accel)
            .append_acceleration_control(-max_accel, (peak - v1) / max_accel);
        return builder.build();
    }

    let d1 = (v0 * v0 - max_vel * max_vel).abs() / (2.0 * max_accel);
    let d3 = (v1 * v1 - max_vel * max_vel).abs() / (2.0 * max_accel);
    let coast = distance - d1 - d3;

    if coast >= 0.0 {
        // Trapezoid with a plateau at max_vel. The entry and exit ramps
        // accelerate or decelerate depending on which side of the plateau the
        // boundary velocities lie.
        let mut builder = MotionProfileBuilder::new(*start);
        builder
            .append_acceleration_control(
                (max_vel - v0).signum() * max_accel,
                (max_vel - v0).abs() / max_accel,
            )
            .append_acceleration_control(0.0, coast / max_vel)
            .append_acceleration_control(
                (v1 - max_vel).signum() * max_accel,
                (v1 - max_vel).abs() / max_accel,
            );
        return builder.build();
    }

    // Both boundary velocities sit above the reachable plateau: dip to a
    // valley velocity and come back up.
    let valley = ((v0 * v0 + v1 * v1) / 2.0 - max_accel * distance).max(0.0).sqrt();
    let mut builder = MotionProfileBuilder::new(*start);
    builder
        .append_acceleration_control(-max_accel, (v0 - valley) / max_accel)
        .append_acceleration_control(max_accel, (v1 - valley) / max_accel);
    builder.build()
}

/// The jerk controls taking velocity from `v_from` to `v_to` with zero
/// boundary acceleration.
fn jerk_phase(v_from: f64, v_to: f64, max_accel: f64, max_jerk: f64) -> Vec<(f64, f64)> {
    let delta_v = (v_to - v_from).abs();
    if delta_v < EPSILON {
        return Vec::new();
    }
    let sign = (v_to - v_from).signum();
    if delta_v >= max_accel * max_accel / max_jerk {
        // Reaches max acceleration: jerk up, hold, jerk down.
        let tj = max_accel / max_jerk;
        let ta = delta_v / max_accel - tj;
        vec![(sign * max_jerk, tj), (0.0, ta), (-sign * max_jerk, tj)]
    } else {
        let tj = (delta_v / max_jerk).sqrt();
        vec![(sign * max_jerk, tj), (-sign * max_jerk, tj)]
    }
}

/// Displacement covered by a jerk phase entered at velocity `v`.
fn phase_displacement(controls: &[(f64, f64)], v: f64) -> f64 {
    let mut builder = MotionProfileBuilder::new(MotionState::new(0.0, v, 0.0, 0.0));
    for &(jerk, dt) in controls {
        builder.append_jerk_control(jerk, dt);
    }
    builder.current_state().x
}

/// Jerk-limited (S-curve) profile. Assumes `goal.x >= start.x` and zero
/// boundary acceleration.
fn generate_s_curve(
    start: &MotionState,
    goal: &MotionState,
    max_vel: f64,
    max_accel: f64,
    max_jerk: f64,
) -> MotionProfile {
    let distance = goal.x - start.x;
    let (v0, v1) = (start.v, goal.v);

    let assemble = |peak: f64, coast: f64| -> MotionProfile {
        let mut builder = MotionProfileBuilder::new(*start);
        for (jerk, dt) in jerk_phase(v0, peak, max_accel, max_jerk) {
            builder.append_jerk_control(jerk, dt);
        }
        if coast > EPSILON {
            builder.append_acceleration_control(0.0, coast / peak);
        }
        for (jerk, dt) in jerk_phase(peak, v1, max_accel, max_jerk) {
            builder.append_jerk_control(jerk, dt);
        }
        builder.build()
    };

    let total_displacement = |peak: f64| -> f64 {
        phase_displacement(&jerk_phase(v0, peak, max_accel, max_jerk), v0)
            + phase_displacement(&jerk_phase(peak, v1, max_accel, max_jerk), peak)
    };

    let full = total_displacement(max_vel);
    if full <= distance {
        return assemble(max_vel, distance - full);
    }

    // The profile never reaches max_vel; search for the peak velocity whose
    // accelerate/decelerate phases exactly cover the distance. A closed form
    // exists but is a nasty cubic; bisection is plenty fast here.
    let mut lower = v0.max(v1);
    let mut upper = max_vel;
    if total_displacement(lower) > distance + EPSILON {
        // Even the minimal S-curve overshoots: the jerk limit cannot be
        // honored over this distance.
        return generate_accel_limited(start, goal, max_vel, max_accel);
    }
    for _ in 0..1000 {
        let peak = (lower + upper) / 2.0;
        let error = distance - total_displacement(peak);
        if error.abs() < 1e-9 {
            return assemble(peak, 0.0);
        }
        if error > 0.0 {
            lower = peak;
        } else {
            upper = peak;
        }
    }
    assemble((lower + upper) / 2.0, 0.0)
}

/// Generates a profile with dynamic velocity and acceleration limits,
/// following the standard forward/backward envelope construction: sample the
/// limits over arc length, integrate maximum acceleration forward from the
/// start velocity and backward from the goal velocity, take the pointwise
/// minimum, then convert the envelope to time-indexed segments.
///
/// The limit callbacks must be pure: samples are evaluated in parallel.
pub fn generate_profile(
    start: &MotionState,
    goal: &MotionState,
    max_vel: &(dyn Fn(f64) -> Result<f64, UnsatisfiableConstraint> + Sync),
    max_accel: &(dyn Fn(f64) -> Result<f64, UnsatisfiableConstraint> + Sync),
    resolution: f64,
) -> Result<MotionProfile, UnsatisfiableConstraint> {
    if goal.x < start.x {
        let flipped = generate_profile(
            &start.flipped(),
            &goal.flipped(),
            &|s| max_vel(-s),
            &|s| max_accel(-s),
            resolution,
        )?;
        return Ok(flipped.flipped());
    }

    let length = goal.x - start.x;
    if length < EPSILON {
        return Ok(MotionProfile::new(vec![MotionSegment::new(*start, 0.0)]));
    }

    let count = ((length / resolution).ceil() as usize).max(2);
    let ds = length / count as f64;
    let positions: Vec<f64> = (0..=count).map(|i| start.x + ds * i as f64).collect();

    let v_limits: Vec<f64> = positions
        .par_iter()
        .map(|&s| max_vel(s))
        .collect::<Result<_, _>>()?;
    let a_limits: Vec<f64> = positions
        .par_iter()
        .map(|&s| max_accel(s))
        .collect::<Result<_, _>>()?;

    let mut forward = vec![0.0; count + 1];
    forward[0] = start.v;
    for i in 1..=count {
        let reachable = (forward[i - 1] * forward[i - 1] + 2.0 * a_limits[i - 1] * ds).sqrt();
        forward[i] = v_limits[i].min(reachable);
    }

    let mut backward = vec![0.0; count + 1];
    backward[count] = goal.v;
    for i in (0..count).rev() {
        let reachable = (backward[i + 1] * backward[i + 1] + 2.0 * a_limits[i] * ds).sqrt();
        backward[i] = v_limits[i].min(reachable);
    }

    let velocities: Vec<f64> = forward
        .iter()
        .zip(&backward)
        .map(|(&f, &b)| f.min(b))
        .collect();

    let mut segments = Vec::with_capacity(count);
    for i in 0..count {
        let (v1, v2) = (velocities[i], velocities[i + 1]);
        if v1 + v2 < EPSILON {
            // Momentary full stop (a cusp in the envelope): no time passes
            // within the sample itself.
            continue;
        }
        let accel = (v2 * v2 - v1 * v1) / (2.0 * ds);
        let dt = if accel.abs() < EPSILON {
            ds / v1
        } else {
            (v2 - v1) / accel
        };
        segments.push(MotionSegment::new(
            MotionState::new(positions[i], v1, accel, 0.0),
            dt,
        ));
    }
    if segments.is_empty() {
        segments.push(MotionSegment::new(*start, 0.0));
    }

    let profile = MotionProfile::new(segments);
    debug!(
        samples = count + 1,
        duration = profile.duration(),
        "generated constrained motion profile"
    );
    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::epsilon_eq;

    #[test]
    fn test_trapezoidal_profile() {
        // 60 units at max_vel 30, max_accel 30: the unconstrained triangular
        // peak sqrt(60 * 30) = 42.43 exceeds 30, so the profile must plateau
        // at exactly 30 with the closed-form 3 second duration.
        let profile = generate_simple_profile(
            &MotionState::at_rest(0.0),
            &MotionState::at_rest(60.0),
            30.0,
            30.0,
            0.0,
        );
        assert!(epsilon_eq(profile.duration(), 3.0));
        let peak = profile.get(1.5).v;
        assert!(epsilon_eq(peak, 30.0));
        assert!(epsilon_eq(profile.end().x, 60.0));
        assert!(epsilon_eq(profile.end().v, 0.0));
    }

    #[test]
    fn test_triangular_profile() {
        // Short move never reaches max_vel.
        let profile = generate_simple_profile(
            &MotionState::at_rest(0.0),
            &MotionState::at_rest(10.0),
            30.0,
            30.0,
            0.0,
        );
        let peak = (30.0f64 * 10.0).sqrt();
        assert!(epsilon_eq(profile.duration(), 2.0 * peak / 30.0));
        assert!(epsilon_eq(profile.end().x, 10.0));
        for i in 0..=20 {
            let t = profile.duration() * i as f64 / 20.0;
            assert!(profile.get(t).v <= peak + 1e-9);
        }
    }

    #[test]
    fn test_boundary_velocities() {
        let profile = generate_simple_profile(
            &MotionState::new(0.0, 5.0, 0.0, 0.0),
            &MotionState::new(40.0, 10.0, 0.0, 0.0),
            30.0,
            30.0,
            0.0,
        );
        assert!(epsilon_eq(profile.start().v, 5.0));
        assert!((profile.end().v - 10.0).abs() < 1e-6);
        assert!((profile.end().x - 40.0).abs() < 1e-6);
    }

    #[test]
    fn test_reversed_move() {
        let profile = generate_simple_profile(
            &MotionState::at_rest(60.0),
            &MotionState::at_rest(0.0),
            30.0,
            30.0,
            0.0,
        );
        assert!(epsilon_eq(profile.duration(), 3.0));
        assert!(epsilon_eq(profile.end().x, 0.0));
        assert!(profile.get(1.5).v < 0.0);
    }

    #[test]
    fn test_s_curve_profile() {
        let profile = generate_simple_profile(
            &MotionState::at_rest(0.0),
            &MotionState::at_rest(60.0),
            30.0,
            30.0,
            30.0,
        );
        // Jerk phases each take 1 s (max_accel / max_jerk) and cover exactly
        // the distance with no coast: 4 s total.
        assert!((profile.duration() - 4.0).abs() < 1e-6);
        assert!((profile.end().x - 60.0).abs() < 1e-6);
        assert!((profile.end().v).abs() < 1e-6);
        // Acceleration is continuous: sample the jerk-limited ramp.
        let mut last_a = profile.get(0.0).a;
        for i in 1..=400 {
            let t = profile.duration() * i as f64 / 400.0;
            let a = profile.get(t).a;
            assert!((a - last_a).abs() < 0.5, "acceleration jumped at t={}", t);
            last_a = a;
        }
    }

    #[test]
    fn test_constrained_profile_respects_limits() {
        let max_vel = |_: f64| -> Result<f64, UnsatisfiableConstraint> { Ok(20.0) };
        let max_accel = |_: f64| -> Result<f64, UnsatisfiableConstraint> { Ok(25.0) };
        let profile = generate_profile(
            &MotionState::at_rest(0.0),
            &MotionState::at_rest(50.0),
            &max_vel,
            &max_accel,
            0.25,
        )
        .unwrap();
        let duration = profile.duration();
        let mut last = profile.get(0.0);
        for i in 1..=500 {
            let t = duration * i as f64 / 500.0;
            let state = profile.get(t);
            assert!(state.v <= 20.0 + 1e-6);
            // |dv²/ds| consistent with the acceleration bound.
            let ds = state.x - last.x;
            if ds > 1e-9 {
                let implied = (state.v * state.v - last.v * last.v).abs() / (2.0 * ds);
                assert!(implied <= 25.0 + 1e-3);
            }
            last = state;
        }
        assert!((profile.end().x - 50.0).abs() < 1e-6);
    }

    #[test]
    fn test_constrained_profile_boundary_velocities() {
        let max_vel = |_: f64| -> Result<f64, UnsatisfiableConstraint> { Ok(30.0) };
        let max_accel = |_: f64| -> Result<f64, UnsatisfiableConstraint> { Ok(30.0) };
        let profile = generate_profile(
            &MotionState::new(0.0, 4.0, 0.0, 0.0),
            &MotionState::new(60.0, 6.0, 0.0, 0.0),
            &max_vel,
            &max_accel,
            0.25,
        )
        .unwrap();
        assert!(epsilon_eq(profile.start().v, 4.0));
        assert!((profile.end().v - 6.0).abs() < 1e-3);
    }

    #[test]
    fn test_constrained_profile_matches_trapezoid_duration() {
        let max_vel = |_: f64| -> Result<f64, UnsatisfiableConstraint> { Ok(30.0) };
        let max_accel = |_: f64| -> Result<f64, UnsatisfiableConstraint> { Ok(30.0) };
        let profile = generate_profile(
            &MotionState::at_rest(0.0),
            &MotionState::at_rest(60.0),
            &max_vel,
            &max_accel,
            0.25,
        )
        .unwrap();
        assert!((profile.duration() - 3.0).abs() < 1e-6);
        let peak = (0..=300)
            .map(|i| profile.get(profile.duration() * i as f64 / 300.0).v)
            .fold(0.0f64, f64::max);
        assert!((peak - 30.0).abs() < 1e-6);
    }

    #[test]
    fn test_constrained_profile_propagates_infeasibility() {
        let max_vel = |s: f64| -> Result<f64, UnsatisfiableConstraint> {
            if s > 10.0 { Err(UnsatisfiableConstraint) } else { Ok(30.0) }
        };
        let max_accel = |_: f64| -> Result<f64, UnsatisfiableConstraint> { Ok(30.0) };
        let result = generate_profile(
            &MotionState::at_rest(0.0),
            &MotionState::at_rest(60.0),
            &max_vel,
            &max_accel,
            0.25,
        );
        assert!(result.is_err());
    }
}
