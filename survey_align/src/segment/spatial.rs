//! Straight 3D segments, the pieces of polyline basis curves.

use nalgebra::Vector3;

use crate::error::{Error, Result};
use crate::geometry::Point3;
use crate::settings::EvaluationSettings;

use super::{check_length, SegmentFunction};

/// Start point and unit direction of a straight 3D segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialAnchor {
    pub origin: Vector3<f64>,
    pub direction: Vector3<f64>,
}

impl SpatialAnchor {
    /// Anchor of the segment from `from` to `to`. Fails for coincident points.
    pub fn between(from: Point3, to: Point3) -> Result<Self> {
        let delta = to.to_vector() - from.to_vector();
        let length = delta.norm();
        if length == 0.0 || !length.is_finite() {
            return Err(Error::degenerate(format!(
                "polyline segment from {:?} to {:?} has no direction",
                from, to
            )));
        }
        Ok(Self {
            origin: from.to_vector(),
            direction: delta / length,
        })
    }
}

/// Position and unit direction on a 3D segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialState {
    pub point: Vector3<f64>,
    pub direction: Vector3<f64>,
}

/// Straight segment in space, measured by 3D arc length.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpatialLine;

impl SegmentFunction for SpatialLine {
    type Anchor = SpatialAnchor;
    /// Distance travelled from the start.
    type Local = f64;
    type State = SpatialState;

    fn kind(&self) -> &'static str {
        "polyline segment"
    }

    fn validate(&self, length: f64) -> Result<()> {
        if length < 0.0 {
            return Err(Error::construction(format!(
                "polyline segment length must not be negative, got {}",
                length
            )));
        }
        check_length(self.kind(), length, false)
    }

    fn local(&self, _length: f64, offset: f64, _settings: &EvaluationSettings) -> f64 {
        offset
    }

    fn compose(anchor: &SpatialAnchor, local: f64) -> SpatialState {
        SpatialState {
            point: anchor.origin + anchor.direction * local,
            direction: anchor.direction,
        }
    }

    fn extrapolate(state: &SpatialState, distance: f64) -> SpatialState {
        SpatialState {
            point: state.point + state.direction * distance,
            direction: state.direction,
        }
    }

    fn continue_from(state: &SpatialState) -> SpatialAnchor {
        SpatialAnchor {
            origin: state.point,
            direction: state.direction,
        }
    }

    fn state_gap(a: &SpatialState, b: &SpatialState) -> f64 {
        (a.point - b.point).norm()
    }
}
