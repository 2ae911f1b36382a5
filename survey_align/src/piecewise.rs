//! Piecewise functions of station.
//!
//! A [`PiecewiseStationFunction`] owns an ordered, contiguous list of
//! [`StationSegment`]s and a sorted index of their start stations. Lookups are
//! a binary search over that index followed by one closed-form segment
//! evaluation.

use log::{debug, trace, warn};
use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::segment::{SegmentFunction, StationSegment};
use crate::settings::EvaluationSettings;

/// Whether the function continues past its first or last segment.
///
/// An open end extrapolates the boundary state in a straight line (or at a
/// constant rate); a closed end rejects stations beyond it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Extent {
    pub open_start: bool,
    pub open_end: bool,
}

impl Extent {
    pub const CLOSED: Extent = Extent {
        open_start: false,
        open_end: false,
    };

    pub const OPEN: Extent = Extent {
        open_start: true,
        open_end: true,
    };
}

/// Ordered, contiguous, immutable collection of station segments.
#[derive(Debug, Clone)]
pub struct PiecewiseStationFunction<G: SegmentFunction> {
    segments: Vec<StationSegment<G>>,
    starts: Vec<f64>,
    extent: Extent,
    settings: EvaluationSettings,
}

impl<G: SegmentFunction> PiecewiseStationFunction<G> {
    /// Builds a function whose segments follow each other, starting at
    /// `start_station` with `anchor`. Each further anchor is taken from the end
    /// state of the previous segment, so the result is continuous by construction.
    pub fn chain<I>(
        start_station: f64,
        anchor: G::Anchor,
        segments: I,
        extent: Extent,
        settings: EvaluationSettings,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = (f64, G)>,
    {
        settings.validate()?;
        let mut station = start_station;
        let mut anchor = anchor;
        let mut built = Vec::new();
        for (length, geometry) in segments {
            geometry.validate(length)?;
            let segment = StationSegment::new(station, length, anchor, geometry);
            if segment.span().is_finite() {
                let end = segment.evaluate(segment.span(), &settings);
                anchor = G::continue_from(&end);
            }
            station = segment.end();
            built.push(segment);
        }
        Self::assemble(built, extent, settings)
    }

    /// Builds a function from segments that carry their own anchors. Joins
    /// whose states differ by more than the continuity tolerance are logged.
    pub fn from_segments(
        segments: Vec<StationSegment<G>>,
        extent: Extent,
        settings: EvaluationSettings,
    ) -> Result<Self> {
        settings.validate()?;
        let function = Self::assemble(segments, extent, settings)?;
        for (index, pair) in function.segments.windows(2).enumerate() {
            let end = pair[0].evaluate(pair[0].span(), &settings);
            let start = pair[1].evaluate(0.0, &settings);
            let gap = G::state_gap(&end, &start);
            if gap > settings.continuity_tolerance {
                warn!(
                    "{} {} ends {:.3e} away from the start of {} {} at station {}",
                    pair[0].geometry.kind(),
                    index,
                    gap,
                    pair[1].geometry.kind(),
                    index + 1,
                    pair[1].start
                );
            }
        }
        Ok(function)
    }

    fn assemble(
        segments: Vec<StationSegment<G>>,
        mut extent: Extent,
        settings: EvaluationSettings,
    ) -> Result<Self> {
        if segments.is_empty() {
            return Err(Error::construction("a piecewise function needs at least one segment"));
        }
        let last = segments.len() - 1;
        for (index, segment) in segments.iter().enumerate() {
            if !segment.start.is_finite() {
                return Err(Error::construction(format!(
                    "segment {} starts at non-finite station {}",
                    index, segment.start
                )));
            }
            segment.geometry.validate(segment.length)?;
            if segment.length.is_infinite() && index != last {
                return Err(Error::construction(format!(
                    "only the last segment may be unbounded, segment {} of {} is",
                    index,
                    segments.len()
                )));
            }
        }
        for (index, pair) in segments.windows(2).enumerate() {
            let (a, b) = (&pair[0], &pair[1]);
            if b.start < a.start {
                return Err(Error::construction(format!(
                    "segment stations are not increasing: {} follows {}",
                    b.start, a.start
                )));
            }
            let gap = b.start - a.end();
            if gap.abs() > settings.station_tolerance {
                let what = if gap > 0.0 { "gap" } else { "overlap" };
                return Err(Error::construction(format!(
                    "{} of {} between segment {} (ends at {}) and segment {} (starts at {})",
                    what,
                    gap.abs(),
                    index,
                    a.end(),
                    index + 1,
                    b.start
                )));
            }
        }
        if segments[last].length.is_infinite() {
            extent.open_end = true;
        }
        let starts = segments.iter().map(|s| s.start).collect();
        let function = Self {
            segments,
            starts,
            extent,
            settings,
        };
        let (start, end) = function.domain();
        debug!(
            "built piecewise function of {} segment(s) over [{}, {}]",
            function.segments.len(),
            start,
            end
        );
        Ok(function)
    }

    /// Station range accepted by [`evaluate`](Self::evaluate). Open ends are infinite.
    pub fn domain(&self) -> (f64, f64) {
        let start = if self.extent.open_start {
            f64::NEG_INFINITY
        } else {
            self.first().start
        };
        let end = if self.extent.open_end {
            f64::INFINITY
        } else {
            self.last().end()
        };
        (start, end)
    }

    /// Station range covered by the segments themselves.
    pub fn nominal_range(&self) -> (f64, f64) {
        (self.first().start, self.last().end())
    }

    pub fn extent(&self) -> Extent {
        self.extent
    }

    pub fn settings(&self) -> &EvaluationSettings {
        &self.settings
    }

    pub fn segments(&self) -> &[StationSegment<G>] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    fn first(&self) -> &StationSegment<G> {
        &self.segments[0]
    }

    fn last(&self) -> &StationSegment<G> {
        &self.segments[self.segments.len() - 1]
    }

    fn out_of_domain(&self, station: f64) -> Error {
        let (start, end) = self.domain();
        Error::Domain {
            station,
            start,
            end,
        }
    }

    /// Index of the segment owning `station`: the last segment starting at or
    /// before it, or the first segment for stations before the start.
    pub fn segment_index(&self, station: f64) -> usize {
        self.starts.partition_point(|s| *s <= station).saturating_sub(1)
    }

    /// Evaluates the function at `station`. Non-finite stations are outside
    /// every domain, open or closed.
    pub fn evaluate(&self, station: f64) -> Result<G::State> {
        if !station.is_finite() {
            return Err(self.out_of_domain(station));
        }
        let tolerance = self.settings.station_tolerance;
        let first = self.first();
        if station < first.start {
            let before = first.start - station;
            if self.extent.open_start {
                trace!("extrapolating {} before station {}", before, first.start);
                let state = first.evaluate(0.0, &self.settings);
                return Ok(G::extrapolate(&state, -before));
            }
            if before <= tolerance {
                return Ok(first.evaluate(0.0, &self.settings));
            }
            return Err(self.out_of_domain(station));
        }

        let index = self.segment_index(station);
        let segment = &self.segments[index];
        let offset = station - segment.start;
        let span = segment.span();
        if offset <= span {
            return Ok(segment.evaluate(offset, &self.settings));
        }
        if index + 1 < self.segments.len() {
            // Inside the tolerated gap before the next segment.
            return Ok(segment.evaluate(span, &self.settings));
        }
        let beyond = offset - span;
        if self.extent.open_end {
            trace!("extrapolating {} past station {}", beyond, segment.end());
            let state = segment.evaluate(span, &self.settings);
            return Ok(G::extrapolate(&state, beyond));
        }
        if beyond <= tolerance {
            return Ok(segment.evaluate(span, &self.settings));
        }
        Err(self.out_of_domain(station))
    }

    /// State at the first segment's start.
    pub fn start_state(&self) -> G::State {
        self.first().evaluate(0.0, &self.settings)
    }

    /// State at the last segment's end, `None` when the last segment is unbounded.
    pub fn end_state(&self) -> Option<G::State> {
        let last = self.last();
        last.span()
            .is_finite()
            .then(|| last.evaluate(last.span(), &self.settings))
    }

    /// Evaluates every station in order.
    pub fn sample(&self, stations: &[f64]) -> Result<Vec<G::State>> {
        stations.iter().map(|s| self.evaluate(*s)).collect()
    }

    /// Evaluates every station on the rayon thread pool. The output order
    /// matches `stations`.
    pub fn par_sample(&self, stations: &[f64]) -> Result<Vec<G::State>>
    where
        G: Sync,
        G::Anchor: Sync,
        G::State: Send,
    {
        stations.par_iter().map(|s| self.evaluate(*s)).collect()
    }
}

/// Collects segments that follow each other from a start anchor. The curve
/// types add shape-specific methods and their own `build`.
#[derive(Debug, Clone)]
pub struct SegmentChain<G: SegmentFunction> {
    pub(crate) start_station: f64,
    pub(crate) anchor: G::Anchor,
    pub(crate) segments: Vec<(f64, G)>,
    pub(crate) extent: Extent,
    pub(crate) settings: EvaluationSettings,
}

impl<G: SegmentFunction> SegmentChain<G> {
    pub fn new(start_station: f64, anchor: G::Anchor) -> Self {
        Self {
            start_station,
            anchor,
            segments: Vec::new(),
            extent: Extent::CLOSED,
            settings: EvaluationSettings::default(),
        }
    }

    /// Appends a segment of signed `length`.
    pub fn segment(mut self, length: f64, geometry: G) -> Self {
        self.segments.push((length, geometry));
        self
    }

    pub fn extent(mut self, extent: Extent) -> Self {
        self.extent = extent;
        self
    }

    /// Extrapolates stations before the first segment.
    pub fn open_start(mut self) -> Self {
        self.extent.open_start = true;
        self
    }

    /// Extrapolates stations after the last segment.
    pub fn open_end(mut self) -> Self {
        self.extent.open_end = true;
        self
    }

    pub fn settings(mut self, settings: EvaluationSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Builds the underlying piecewise function.
    pub fn build_function(self) -> Result<PiecewiseStationFunction<G>> {
        PiecewiseStationFunction::chain(
            self.start_station,
            self.anchor,
            self.segments,
            self.extent,
            self.settings,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::segment::{HorizontalGeometry, Placement2, VerticalGeometry};
    use approx::assert_relative_eq;

    fn vertical(extent: Extent) -> PiecewiseStationFunction<VerticalGeometry> {
        PiecewiseStationFunction::chain(
            0.0,
            100.0,
            [
                (100.0, VerticalGeometry::ConstantGradient { gradient: 0.02 }),
                (
                    200.0,
                    VerticalGeometry::ParabolicArc {
                        start_gradient: 0.02,
                        end_gradient: -0.01,
                    },
                ),
                (100.0, VerticalGeometry::ConstantGradient { gradient: -0.01 }),
            ],
            extent,
            EvaluationSettings::default(),
        )
        .unwrap()
    }

    #[test]
    fn chained_segments_are_contiguous() {
        let f = vertical(Extent::CLOSED);
        assert_eq!(f.len(), 3);
        assert_eq!(f.domain(), (0.0, 400.0));
        let starts: Vec<f64> = f.segments().iter().map(|s| s.start).collect();
        assert_eq!(starts, vec![0.0, 100.0, 300.0]);
        assert_relative_eq!(f.evaluate(100.0).unwrap().elevation, 102.0, epsilon = 1e-12);
        assert_relative_eq!(f.evaluate(300.0).unwrap().elevation, 103.0, epsilon = 1e-12);
    }

    #[test]
    fn closed_ends_reject_outside_stations() {
        let f = vertical(Extent::CLOSED);
        assert!(matches!(f.evaluate(-1.0), Err(Error::Domain { .. })));
        assert!(matches!(f.evaluate(400.1), Err(Error::Domain { .. })));
        assert!(f.evaluate(400.0 + 1e-7).is_ok());
        assert!(f.evaluate(f64::NAN).is_err());
    }

    #[test]
    fn open_ends_extrapolate_along_boundary_grade() {
        let f = vertical(Extent::OPEN);
        assert_eq!(f.domain(), (f64::NEG_INFINITY, f64::INFINITY));
        let before = f.evaluate(-50.0).unwrap();
        assert_relative_eq!(before.elevation, 99.0, epsilon = 1e-12);
        let after = f.evaluate(500.0).unwrap();
        assert_relative_eq!(after.elevation, 103.0 - 1.0 - 1.0, epsilon = 1e-12);
        assert_relative_eq!(after.gradient, -0.01);
    }

    #[test]
    fn open_ends_reject_infinite_stations() {
        let f = vertical(Extent::OPEN);
        for station in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
            assert!(matches!(f.evaluate(station), Err(Error::Domain { .. })));
        }
    }

    #[test]
    fn unbounded_last_segment_opens_end() {
        let f = PiecewiseStationFunction::chain(
            0.0,
            Placement2::new(Point::new(0.0, 0.0), 0.0),
            [(f64::INFINITY, HorizontalGeometry::Line)],
            Extent::CLOSED,
            EvaluationSettings::default(),
        )
        .unwrap();
        assert!(f.extent().open_end);
        assert!(f.end_state().is_none());
        assert_relative_eq!(f.evaluate(1e6).unwrap().point.x, 1e6);
    }

    #[test]
    fn unbounded_inner_segment_is_rejected() {
        let result = PiecewiseStationFunction::chain(
            0.0,
            Placement2::new(Point::new(0.0, 0.0), 0.0),
            [
                (f64::INFINITY, HorizontalGeometry::Line),
                (10.0, HorizontalGeometry::Line),
            ],
            Extent::CLOSED,
            EvaluationSettings::default(),
        );
        assert!(matches!(result, Err(Error::Construction(_))));
    }

    #[test]
    fn explicit_segments_must_be_contiguous() {
        let settings = EvaluationSettings::default();
        let gap = vec![
            StationSegment::new(0.0, 10.0, 0.0, VerticalGeometry::ConstantGradient { gradient: 0.0 }),
            StationSegment::new(10.5, 10.0, 0.0, VerticalGeometry::ConstantGradient { gradient: 0.0 }),
        ];
        assert!(matches!(
            PiecewiseStationFunction::from_segments(gap, Extent::CLOSED, settings),
            Err(Error::Construction(_))
        ));
        let backwards = vec![
            StationSegment::new(10.0, 10.0, 0.0, VerticalGeometry::ConstantGradient { gradient: 0.0 }),
            StationSegment::new(0.0, 10.0, 0.0, VerticalGeometry::ConstantGradient { gradient: 0.0 }),
        ];
        assert!(PiecewiseStationFunction::from_segments(backwards, Extent::CLOSED, settings).is_err());
        assert!(PiecewiseStationFunction::<VerticalGeometry>::from_segments(
            Vec::new(),
            Extent::CLOSED,
            settings
        )
        .is_err());
    }

    #[test]
    fn discontinuous_explicit_anchors_still_build() {
        let segments = vec![
            StationSegment::new(0.0, 10.0, 0.0, VerticalGeometry::ConstantGradient { gradient: 0.1 }),
            StationSegment::new(10.0, 10.0, 5.0, VerticalGeometry::ConstantGradient { gradient: 0.1 }),
        ];
        let f = PiecewiseStationFunction::from_segments(segments, Extent::CLOSED, EvaluationSettings::default())
            .unwrap();
        assert_relative_eq!(f.evaluate(15.0).unwrap().elevation, 5.5, epsilon = 1e-12);
    }

    #[test]
    fn boundary_station_belongs_to_next_segment() {
        let f = vertical(Extent::CLOSED);
        assert_eq!(f.segment_index(99.999), 0);
        assert_eq!(f.segment_index(100.0), 1);
        assert_eq!(f.segment_index(-5.0), 0);
        assert_eq!(f.segment_index(1e9), 2);
    }

    #[test]
    fn parallel_sampling_matches_sequential() {
        let f = vertical(Extent::CLOSED);
        let stations: Vec<f64> = (0..=400).map(|i| i as f64).collect();
        assert_eq!(f.sample(&stations).unwrap(), f.par_sample(&stations).unwrap());
        assert!(f.sample(&[10.0, 500.0]).is_err());
    }
}
