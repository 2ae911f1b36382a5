//! Horizontal and vertical alignment curves and their composition.

use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::geometry::{Frame, Point, Point3};
use crate::piecewise::{Extent, PiecewiseStationFunction, SegmentChain};
use crate::segment::{
    HorizontalGeometry, HorizontalState, Placement2, StationSegment, VerticalGeometry,
    VerticalState,
};
use crate::settings::EvaluationSettings;
use crate::superelevation::{CantFunction, CantState};
use crate::transition::TransitionShape;

/// Plan geometry of an alignment: position, heading and curvature by station.
#[derive(Debug, Clone)]
pub struct HorizontalAlignmentCurve {
    function: PiecewiseStationFunction<HorizontalGeometry>,
}

/// Builder chaining horizontal segments from a start point and heading.
pub type HorizontalBuilder = SegmentChain<HorizontalGeometry>;

impl HorizontalAlignmentCurve {
    /// Starts a curve at station `start_station`, point `start` and direction `heading`.
    pub fn builder(start_station: f64, start: Point, heading: f64) -> HorizontalBuilder {
        SegmentChain::new(start_station, Placement2::new(start, heading))
    }

    /// Builds a curve from segments with explicit placements.
    pub fn from_segments(
        segments: Vec<StationSegment<HorizontalGeometry>>,
        extent: Extent,
        settings: EvaluationSettings,
    ) -> Result<Self> {
        Ok(Self {
            function: PiecewiseStationFunction::from_segments(segments, extent, settings)?,
        })
    }

    pub fn evaluate(&self, station: f64) -> Result<HorizontalState> {
        self.function.evaluate(station)
    }

    pub fn point_at(&self, station: f64) -> Result<Point> {
        Ok(self.evaluate(station)?.point)
    }

    /// Heading in radians, counter-clockwise from +X.
    pub fn heading_at(&self, station: f64) -> Result<f64> {
        Ok(self.evaluate(station)?.heading)
    }

    pub fn domain(&self) -> (f64, f64) {
        self.function.domain()
    }

    /// Station length covered by the segments.
    pub fn length(&self) -> f64 {
        let (start, end) = self.function.nominal_range();
        end - start
    }

    pub fn function(&self) -> &PiecewiseStationFunction<HorizontalGeometry> {
        &self.function
    }

    pub fn sample(&self, stations: &[f64]) -> Result<Vec<HorizontalState>> {
        self.function.sample(stations)
    }
}

impl SegmentChain<HorizontalGeometry> {
    pub fn line(self, length: f64) -> Self {
        self.segment(length, HorizontalGeometry::Line)
    }

    /// Circular arc; a positive radius turns left.
    pub fn arc(self, length: f64, radius: f64) -> Self {
        self.segment(length, HorizontalGeometry::CircularArc { radius })
    }

    pub fn clothoid(self, length: f64, start_radius: f64, end_radius: f64) -> Self {
        self.segment(length, HorizontalGeometry::clothoid(start_radius, end_radius))
    }

    pub fn spiral(self, shape: TransitionShape, length: f64, start_radius: f64, end_radius: f64) -> Self {
        self.segment(
            length,
            HorizontalGeometry::Spiral {
                shape,
                start_radius,
                end_radius,
            },
        )
    }

    pub fn cubic(self, length: f64, start_radius: f64, end_radius: f64) -> Self {
        self.segment(
            length,
            HorizontalGeometry::CubicParabola {
                start_radius,
                end_radius,
            },
        )
    }

    pub fn build(self) -> Result<HorizontalAlignmentCurve> {
        Ok(HorizontalAlignmentCurve {
            function: self.build_function()?,
        })
    }
}

/// Profile of an alignment: elevation and gradient by station.
#[derive(Debug, Clone)]
pub struct VerticalAlignmentCurve {
    function: PiecewiseStationFunction<VerticalGeometry>,
}

/// Builder chaining vertical segments from a start elevation.
pub type VerticalBuilder = SegmentChain<VerticalGeometry>;

impl VerticalAlignmentCurve {
    pub fn builder(start_station: f64, start_elevation: f64) -> VerticalBuilder {
        SegmentChain::new(start_station, start_elevation)
    }

    pub fn from_segments(
        segments: Vec<StationSegment<VerticalGeometry>>,
        extent: Extent,
        settings: EvaluationSettings,
    ) -> Result<Self> {
        Ok(Self {
            function: PiecewiseStationFunction::from_segments(segments, extent, settings)?,
        })
    }

    /// Profile through `(station, elevation)` points joined by straight grades.
    pub fn from_grade_points(points: &[(f64, f64)], settings: EvaluationSettings) -> Result<Self> {
        let Some(&(start_station, start_elevation)) = points.first() else {
            return Err(Error::construction("a grade profile needs at least two points"));
        };
        let mut builder = Self::builder(start_station, start_elevation).settings(settings);
        for pair in points.windows(2) {
            let run = pair[1].0 - pair[0].0;
            if run <= 0.0 {
                return Err(Error::construction(format!(
                    "grade point stations must increase, {} follows {}",
                    pair[1].0, pair[0].0
                )));
            }
            builder = builder.grade(run, (pair[1].1 - pair[0].1) / run);
        }
        builder.build()
    }

    pub fn evaluate(&self, station: f64) -> Result<VerticalState> {
        self.function.evaluate(station)
    }

    pub fn elevation_at(&self, station: f64) -> Result<f64> {
        Ok(self.evaluate(station)?.elevation)
    }

    pub fn gradient_at(&self, station: f64) -> Result<f64> {
        Ok(self.evaluate(station)?.gradient)
    }

    pub fn domain(&self) -> (f64, f64) {
        self.function.domain()
    }

    pub fn function(&self) -> &PiecewiseStationFunction<VerticalGeometry> {
        &self.function
    }

    pub fn sample(&self, stations: &[f64]) -> Result<Vec<VerticalState>> {
        self.function.sample(stations)
    }
}

impl SegmentChain<VerticalGeometry> {
    pub fn grade(self, length: f64, gradient: f64) -> Self {
        self.segment(length, VerticalGeometry::ConstantGradient { gradient })
    }

    pub fn parabolic(self, length: f64, start_gradient: f64, end_gradient: f64) -> Self {
        self.segment(
            length,
            VerticalGeometry::ParabolicArc {
                start_gradient,
                end_gradient,
            },
        )
    }

    pub fn circular(self, length: f64, start_gradient: f64, end_gradient: f64) -> Self {
        self.segment(
            length,
            VerticalGeometry::CircularArc {
                start_gradient,
                end_gradient,
            },
        )
    }

    pub fn build(self) -> Result<VerticalAlignmentCurve> {
        Ok(VerticalAlignmentCurve {
            function: self.build_function()?,
        })
    }
}

/// Everything known about an alignment at one station.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignmentState {
    pub station: f64,
    pub horizontal: HorizontalState,
    pub vertical: VerticalState,
    pub cant: Option<CantState>,
}

impl AlignmentState {
    pub fn point(&self) -> Point3 {
        Point3::new(
            self.horizontal.point.x,
            self.horizontal.point.y,
            self.vertical.elevation,
        )
    }

    /// Roll of the cross-section, zero without cant.
    pub fn roll(&self) -> f64 {
        self.cant.map_or(0.0, |c| c.roll)
    }

    /// Frame before cant: tangent along the 3D travel direction, lateral horizontal.
    pub fn level_frame(&self) -> Frame {
        let origin = self.point().to_vector();
        Frame::from_heading(origin, self.horizontal.heading, self.vertical.gradient)
    }

    /// Frame of the cross-section: the level frame raised by the cant lift
    /// and rolled about the tangent.
    pub fn canted_frame(&self) -> Frame {
        let level = self.level_frame();
        match self.cant {
            Some(cant) => level.translated(level.up * cant.lift).rolled(cant.roll),
            None => level,
        }
    }
}

/// A horizontal curve with optional vertical profile and cant, sharing one
/// station coordinate. Immutable once built.
#[derive(Debug, Clone)]
pub struct Alignment {
    horizontal: HorizontalAlignmentCurve,
    vertical: Option<VerticalAlignmentCurve>,
    cant: Option<CantFunction>,
}

impl Alignment {
    pub fn new(horizontal: HorizontalAlignmentCurve) -> Self {
        Self {
            horizontal,
            vertical: None,
            cant: None,
        }
    }

    pub fn with_vertical(mut self, vertical: VerticalAlignmentCurve) -> Self {
        self.vertical = Some(vertical);
        self
    }

    pub fn with_cant(mut self, cant: CantFunction) -> Self {
        self.cant = Some(cant);
        self
    }

    pub fn horizontal(&self) -> &HorizontalAlignmentCurve {
        &self.horizontal
    }

    pub fn vertical(&self) -> Option<&VerticalAlignmentCurve> {
        self.vertical.as_ref()
    }

    pub fn cant(&self) -> Option<&CantFunction> {
        self.cant.as_ref()
    }

    /// Station range of the horizontal curve. The profiles are queried at the
    /// same stations and report their own domain errors.
    pub fn domain(&self) -> (f64, f64) {
        self.horizontal.domain()
    }

    /// Evaluates the horizontal curve and each profile at `station`.
    pub fn state_at(&self, station: f64) -> Result<AlignmentState> {
        let horizontal = self.horizontal.evaluate(station)?;
        let vertical = match &self.vertical {
            Some(v) => v.evaluate(station)?,
            None => VerticalState::level(),
        };
        let cant = self.cant.as_ref().map(|c| c.evaluate(station)).transpose()?;
        Ok(AlignmentState {
            station,
            horizontal,
            vertical,
            cant,
        })
    }

    pub fn point_at(&self, station: f64) -> Result<Point3> {
        Ok(self.state_at(station)?.point())
    }

    /// Cross-section frame at `station`, including cant.
    pub fn frame_at(&self, station: f64) -> Result<Frame> {
        Ok(self.state_at(station)?.canted_frame())
    }

    pub fn sample(&self, stations: &[f64]) -> Result<Vec<AlignmentState>> {
        stations.iter().map(|s| self.state_at(*s)).collect()
    }

    pub fn par_sample(&self, stations: &[f64]) -> Result<Vec<AlignmentState>> {
        stations.par_iter().map(|s| self.state_at(*s)).collect()
    }
}
