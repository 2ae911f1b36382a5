//! Curves offset from a basis curve by station-wise distances.

use crate::error::{Error, Result};
use crate::placement::{BasisCurve, SectionFrame};

/// Offsets defined at one station. An axis left `None` takes its value from
/// the neighbouring points.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OffsetPoint {
    pub station: f64,
    #[serde(default)]
    pub lateral: Option<f64>,
    #[serde(default)]
    pub vertical: Option<f64>,
}

impl OffsetPoint {
    pub fn new(station: f64, lateral: Option<f64>, vertical: Option<f64>) -> Self {
        Self {
            station,
            lateral,
            vertical,
        }
    }
}

/// Ordered offset control points.
///
/// Per axis, a station between two points that both define the axis is
/// interpolated linearly. Otherwise the last value defined at or before the
/// station is held; before it, the first defined value. An axis no point
/// defines is zero.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "Vec<OffsetPoint>", into = "Vec<OffsetPoint>")]
pub struct OffsetProfile {
    points: Vec<OffsetPoint>,
}

impl TryFrom<Vec<OffsetPoint>> for OffsetProfile {
    type Error = Error;

    fn try_from(points: Vec<OffsetPoint>) -> Result<Self> {
        OffsetProfile::new(points)
    }
}

impl From<OffsetProfile> for Vec<OffsetPoint> {
    fn from(profile: OffsetProfile) -> Self {
        profile.points
    }
}

impl OffsetProfile {
    /// Validates that stations are finite and non-decreasing.
    pub fn new(points: Vec<OffsetPoint>) -> Result<Self> {
        for point in &points {
            let values = [point.station, point.lateral.unwrap_or(0.0), point.vertical.unwrap_or(0.0)];
            if values.iter().any(|v| !v.is_finite()) {
                return Err(Error::construction(format!(
                    "offset point {:?} is not finite",
                    point
                )));
            }
        }
        for pair in points.windows(2) {
            if pair[1].station < pair[0].station {
                return Err(Error::construction(format!(
                    "offset stations must not decrease, {} follows {}",
                    pair[1].station, pair[0].station
                )));
            }
        }
        Ok(Self { points })
    }

    /// The same offsets everywhere.
    pub fn constant(lateral: f64, vertical: f64) -> Self {
        Self {
            points: vec![OffsetPoint::new(0.0, Some(lateral), Some(vertical))],
        }
    }

    pub fn points(&self) -> &[OffsetPoint] {
        &self.points
    }

    pub fn lateral_at(&self, station: f64) -> f64 {
        self.axis_at(station, |p| p.lateral)
    }

    pub fn vertical_at(&self, station: f64) -> f64 {
        self.axis_at(station, |p| p.vertical)
    }

    /// `(lateral, vertical)` at `station`.
    pub fn offsets_at(&self, station: f64) -> (f64, f64) {
        (self.lateral_at(station), self.vertical_at(station))
    }

    fn axis_at<F: Fn(&OffsetPoint) -> Option<f64>>(&self, station: f64, axis: F) -> f64 {
        let count = self.points.partition_point(|p| p.station <= station);
        if count > 0 && count < self.points.len() {
            let a = &self.points[count - 1];
            let b = &self.points[count];
            if let (Some(va), Some(vb)) = (axis(a), axis(b)) {
                let t = (station - a.station) / (b.station - a.station);
                return va + t * (vb - va);
            }
        }
        self.points[..count]
            .iter()
            .rev()
            .find_map(&axis)
            .or_else(|| self.points.iter().find_map(&axis))
            .unwrap_or(0.0)
    }
}

/// A curve running alongside a basis curve at the profile's offsets,
/// measured along the basis cross-section. It shares the basis stations and
/// orientation.
#[derive(Debug, Clone)]
pub struct OffsetCurveByDistances<C> {
    basis: C,
    profile: OffsetProfile,
}

impl<C: BasisCurve> OffsetCurveByDistances<C> {
    pub fn new(basis: C, profile: OffsetProfile) -> Self {
        Self { basis, profile }
    }

    pub fn basis(&self) -> &C {
        &self.basis
    }

    pub fn profile(&self) -> &OffsetProfile {
        &self.profile
    }
}

impl<C: BasisCurve> BasisCurve for OffsetCurveByDistances<C> {
    fn domain(&self) -> (f64, f64) {
        self.basis.domain()
    }

    fn section_frame(&self, station: f64) -> Result<SectionFrame> {
        let base = self.basis.section_frame(station)?;
        let (lateral, vertical) = self.profile.offsets_at(station);
        Ok(base.shifted(lateral, vertical))
    }
}
