//! Paths: ordered sequences of curve + heading interpolator pairs queried by
//! global arc length.

use crate::curve::{Curve, ParametricCurve};
use crate::geometry::{Angle, Pose2d, Vector2d};
use crate::heading::HeadingInterpolator;

/// An immutable pairing of one curve with one heading interpolator, covering
/// `s` in `[0, length]`.
#[derive(Debug, Clone)]
pub struct PathSegment {
    curve: Curve,
    interpolator: HeadingInterpolator,
}

impl PathSegment {
    pub fn new(curve: Curve, interpolator: HeadingInterpolator) -> PathSegment {
        PathSegment { curve, interpolator }
    }

    pub fn curve(&self) -> &Curve {
        &self.curve
    }

    pub fn interpolator(&self) -> &HeadingInterpolator {
        &self.interpolator
    }

    pub fn length(&self) -> f64 {
        self.curve.length()
    }

    /// Returns the pose `s` units along the segment.
    pub fn get(&self, s: f64) -> Pose2d {
        Pose2d::from_vec(self.curve.get(s), self.interpolator.get(&self.curve, s))
    }

    /// Returns the pose derivative (unit tangent and heading rate) at `s`.
    pub fn deriv(&self, s: f64) -> Pose2d {
        Pose2d::from_vec(self.curve.deriv(s), self.interpolator.deriv(&self.curve, s))
    }

    /// Returns the pose second derivative at `s`.
    pub fn second_deriv(&self, s: f64) -> Pose2d {
        Pose2d::from_vec(
            self.curve.second_deriv(s),
            self.interpolator.second_deriv(&self.curve, s),
        )
    }

    pub fn tangent_angle(&self, s: f64) -> Angle {
        self.curve.tangent_angle(s)
    }

    pub fn curvature(&self, s: f64) -> f64 {
        self.curve.curvature(s)
    }

    pub fn start(&self) -> Pose2d {
        self.get(0.0)
    }

    pub fn start_deriv(&self) -> Pose2d {
        self.deriv(0.0)
    }

    pub fn start_second_deriv(&self) -> Pose2d {
        self.second_deriv(0.0)
    }

    pub fn end(&self) -> Pose2d {
        self.get(self.length())
    }

    pub fn end_deriv(&self) -> Pose2d {
        self.deriv(self.length())
    }

    pub fn end_second_deriv(&self) -> Pose2d {
        self.second_deriv(self.length())
    }
}

/// A path composed of one or more contiguous path segments. The end pose of
/// each segment coincides with the start pose of the next; global arc length
/// is the sum of segment lengths.
#[derive(Debug, Clone)]
pub struct Path {
    segments: Vec<PathSegment>,
}

impl Path {
    /// Creates a path from its segments. The segment list must not be empty;
    /// use [crate::path_builder::PathBuilder] to get a checked construction.
    pub fn new(segments: Vec<PathSegment>) -> Path {
        assert!(!segments.is_empty(), "a Path cannot be constructed without segments");
        Path { segments }
    }

    pub fn from_segment(segment: PathSegment) -> Path {
        Path::new(vec![segment])
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Returns the length of the path.
    pub fn length(&self) -> f64 {
        self.segments.iter().map(PathSegment::length).sum()
    }

    /// Returns the segment owning arc length `s` and the remaining
    /// displacement along it. Clamps to the first and last segments.
    pub fn segment(&self, s: f64) -> (&PathSegment, f64) {
        if s <= 0.0 {
            return (&self.segments[0], 0.0);
        }
        let mut remaining = s;
        for segment in &self.segments {
            if remaining <= segment.length() {
                return (segment, remaining);
            }
            remaining -= segment.length();
        }
        let last = self.segments.last().unwrap();
        (last, last.length())
    }

    /// Returns the pose `s` units along the path.
    pub fn get(&self, s: f64) -> Pose2d {
        let (segment, remaining) = self.segment(s);
        segment.get(remaining)
    }

    /// Returns the pose derivative `s` units along the path.
    pub fn deriv(&self, s: f64) -> Pose2d {
        let (segment, remaining) = self.segment(s);
        segment.deriv(remaining)
    }

    /// Returns the pose second derivative `s` units along the path.
    pub fn second_deriv(&self, s: f64) -> Pose2d {
        let (segment, remaining) = self.segment(s);
        segment.second_deriv(remaining)
    }

    pub fn tangent_angle(&self, s: f64) -> Angle {
        let (segment, remaining) = self.segment(s);
        segment.tangent_angle(remaining)
    }

    pub fn curvature(&self, s: f64) -> f64 {
        let (segment, remaining) = self.segment(s);
        segment.curvature(remaining)
    }

    pub fn start(&self) -> Pose2d {
        self.segments.first().unwrap().start()
    }

    pub fn start_deriv(&self) -> Pose2d {
        self.segments.first().unwrap().start_deriv()
    }

    pub fn start_second_deriv(&self) -> Pose2d {
        self.segments.first().unwrap().start_second_deriv()
    }

    pub fn end(&self) -> Pose2d {
        self.segments.last().unwrap().end()
    }

    pub fn end_deriv(&self) -> Pose2d {
        self.segments.last().unwrap().end_deriv()
    }

    pub fn end_second_deriv(&self) -> Pose2d {
        self.segments.last().unwrap().end_second_deriv()
    }

    /// Projects `query` onto the path with the first-order iterative method,
    /// starting from `guess` (an arc length along the path).
    pub fn fast_project(&self, query: Vector2d, guess: f64, iterations: usize) -> f64 {
        let mut s = guess;
        for _ in 0..iterations {
            let point = self.get(s).vec();
            let deriv = self.deriv(s).vec();
            let ds = (query - point).dot(deriv);
            s = (s + ds).clamp(0.0, self.length());
        }
        s
    }

    /// Projects `query` onto the path by running [Path::fast_project] from
    /// guesses spaced `ds` apart and keeping the closest result.
    pub fn project(&self, query: Vector2d, ds: f64) -> f64 {
        let length = self.length();
        let samples = ((length / ds).round() as usize).max(1);
        (0..=samples)
            .map(|i| {
                let guess = length * i as f64 / samples as f64;
                self.fast_project(query, guess, 10)
            })
            .min_by(|&a, &b| {
                let da = self.get(a).vec().dist_to(query);
                let db = self.get(b).vec().dist_to(query);
                da.partial_cmp(&db).unwrap()
            })
            .unwrap_or(0.0)
    }
}
