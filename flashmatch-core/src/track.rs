//! Reconstructed trajectories.

use crate::{Error, Result};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A point in detector coordinates (cm).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point3 {
    /// Drift coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
    /// Beam coordinate.
    pub z: f64,
}

impl Point3 {
    /// Creates a new point.
    #[inline]
    #[must_use]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to another point.
    #[inline]
    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        let dz = other.z - self.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Midpoint between this point and another.
    #[inline]
    #[must_use]
    pub fn midpoint(&self, other: &Self) -> Self {
        Self {
            x: 0.5 * (self.x + other.x),
            y: 0.5 * (self.y + other.y),
            z: 0.5 * (self.z + other.z),
        }
    }

    /// The same point shifted along the drift coordinate.
    #[inline]
    #[must_use]
    pub fn shifted_x(&self, offset: f64) -> Self {
        Self {
            x: self.x + offset,
            ..*self
        }
    }
}

impl fmt::Display for Point3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.x, self.y, self.z)
    }
}

/// Time extent of the charge associated with a track (microseconds).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrackTiming {
    /// Earliest hit time.
    pub start: f64,
    /// Latest hit time.
    pub end: f64,
}

impl TrackTiming {
    /// Midpoint of the time extent.
    #[must_use]
    pub fn centre(&self) -> f64 {
        self.start + 0.5 * (self.end - self.start)
    }
}

/// An ordered, non-empty sequence of trajectory points.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawTrack"))]
pub struct Track {
    points: Vec<Point3>,
    timing: Option<TrackTiming>,
}

#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct RawTrack {
    points: Vec<Point3>,
    #[serde(default)]
    timing: Option<TrackTiming>,
}

#[cfg(feature = "serde")]
impl TryFrom<RawTrack> for Track {
    type Error = Error;

    fn try_from(raw: RawTrack) -> Result<Self> {
        Ok(Self::new(raw.points)?.with_timing_opt(raw.timing))
    }
}

impl Track {
    /// Creates a track from its trajectory points.
    ///
    /// # Errors
    /// Returns [`Error::EmptyTrack`] if `points` is empty.
    pub fn new(points: Vec<Point3>) -> Result<Self> {
        if points.is_empty() {
            return Err(Error::EmptyTrack);
        }
        Ok(Self {
            points,
            timing: None,
        })
    }

    /// Attaches hit timing to the track.
    #[must_use]
    pub fn with_timing(self, start: f64, end: f64) -> Self {
        self.with_timing_opt(Some(TrackTiming { start, end }))
    }

    fn with_timing_opt(mut self, timing: Option<TrackTiming>) -> Self {
        self.timing = timing;
        self
    }

    /// Trajectory points.
    #[must_use]
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    /// Hit timing, if known.
    #[must_use]
    pub fn timing(&self) -> Option<TrackTiming> {
        self.timing
    }

    /// First trajectory point.
    #[must_use]
    pub fn start(&self) -> Point3 {
        self.points[0]
    }

    /// Last trajectory point.
    #[must_use]
    pub fn end(&self) -> Point3 {
        self.points[self.points.len() - 1]
    }

    /// Number of trajectory points.
    #[must_use]
    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    /// Consecutive point pairs.
    pub fn segments(&self) -> impl Iterator<Item = (Point3, Point3)> + '_ {
        self.points.windows(2).map(|pair| (pair[0], pair[1]))
    }

    /// Path length summed over all segments.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.segments().map(|(a, b)| a.distance(&b)).sum()
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Track properties:")?;
        writeln!(f, "\tLength={}", self.length())?;
        writeln!(f, "\tBegin Location (x,y,z)={}", self.start())?;
        writeln!(f, "\tEnd Location (x,y,z)={}", self.end())?;
        write!(f, "\tTrajectoryPoints={}", self.num_points())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_track_rejected() {
        assert!(matches!(Track::new(Vec::new()), Err(Error::EmptyTrack)));
    }

    #[test]
    fn test_track_length_and_endpoints() {
        let track = Track::new(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(3.0, 4.0, 0.0),
            Point3::new(3.0, 4.0, 10.0),
        ])
        .unwrap();

        assert_relative_eq!(track.length(), 15.0);
        assert_eq!(track.start(), Point3::new(0.0, 0.0, 0.0));
        assert_eq!(track.end(), Point3::new(3.0, 4.0, 10.0));
        assert_eq!(track.segments().count(), 2);
    }

    #[test]
    fn test_single_point_track_has_no_segments() {
        let track = Track::new(vec![Point3::new(1.0, 2.0, 3.0)]).unwrap();
        assert_eq!(track.segments().count(), 0);
        assert_eq!(track.start(), track.end());
        assert_relative_eq!(track.length(), 0.0);
    }

    #[test]
    fn test_timing_centre() {
        let track = Track::new(vec![Point3::default()])
            .unwrap()
            .with_timing(100.0, 300.0);
        assert_relative_eq!(track.timing().unwrap().centre(), 200.0);
    }

    #[test]
    fn test_midpoint_and_shift() {
        let a = Point3::new(0.0, 2.0, 4.0);
        let b = Point3::new(2.0, 4.0, 8.0);
        let mid = a.midpoint(&b).shifted_x(10.0);
        assert_eq!(mid, Point3::new(11.0, 3.0, 6.0));
    }
}
