//! Polyline basis curves measured by 3D arc length.

use log::debug;

use crate::error::{Error, Result};
use crate::geometry::{distance3, Frame, Point, Point3};
use crate::piecewise::{Extent, PiecewiseStationFunction};
use crate::segment::{SpatialAnchor, SpatialLine, SpatialState, StationSegment};
use crate::settings::EvaluationSettings;

/// Straight legs through a list of 2D or 3D vertices. Station 0 is the first
/// vertex; a station on an interior vertex belongs to the following leg.
#[derive(Debug, Clone)]
pub struct PolylineCurve {
    vertices: Vec<Point3>,
    function: PiecewiseStationFunction<SpatialLine>,
}

impl PolylineCurve {
    /// Builds a polyline through `vertices`. Repeated vertices are skipped.
    pub fn new(vertices: &[Point3], settings: EvaluationSettings) -> Result<Self> {
        let mut distinct: Vec<Point3> = Vec::with_capacity(vertices.len());
        for v in vertices {
            if !(v.x.is_finite() && v.y.is_finite() && v.z.is_finite()) {
                return Err(Error::construction(format!("polyline vertex {:?} is not finite", v)));
            }
            if distinct.last() != Some(v) {
                distinct.push(*v);
            }
        }
        if distinct.len() < 2 {
            return Err(Error::degenerate(format!(
                "polyline needs two distinct vertices, got {}",
                distinct.len()
            )));
        }
        if distinct.len() < vertices.len() {
            debug!(
                "skipped {} repeated polyline vertices",
                vertices.len() - distinct.len()
            );
        }

        let mut station = 0.0;
        let mut segments = Vec::with_capacity(distinct.len() - 1);
        for pair in distinct.windows(2) {
            let length = distance3(pair[0], pair[1]);
            let anchor = SpatialAnchor::between(pair[0], pair[1])?;
            segments.push(StationSegment::new(station, length, anchor, SpatialLine));
            station += length;
        }
        let function = PiecewiseStationFunction::from_segments(segments, Extent::CLOSED, settings)?;
        Ok(Self {
            vertices: distinct,
            function,
        })
    }

    /// Polyline in the XY plane.
    pub fn from_2d(vertices: &[Point], settings: EvaluationSettings) -> Result<Self> {
        let points: Vec<Point3> = vertices.iter().map(|p| Point3::new(p.x, p.y, 0.0)).collect();
        Self::new(&points, settings)
    }

    pub fn vertices(&self) -> &[Point3] {
        &self.vertices
    }

    pub fn length(&self) -> f64 {
        let (start, end) = self.function.nominal_range();
        end - start
    }

    pub fn domain(&self) -> (f64, f64) {
        self.function.domain()
    }

    pub fn evaluate(&self, station: f64) -> Result<SpatialState> {
        self.function.evaluate(station)
    }

    pub fn point_at(&self, station: f64) -> Result<Point3> {
        Ok(Point3::from_vector(&self.evaluate(station)?.point))
    }

    /// Frame at `station`: tangent along the leg, lateral horizontal to the left.
    pub fn frame_at(&self, station: f64) -> Result<Frame> {
        let state = self.evaluate(station)?;
        Ok(Frame::from_direction(state.point, state.direction))
    }
}
