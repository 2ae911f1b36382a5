//! Linear placement: points addressed by distance along a curve.

use nalgebra::Matrix4;
use rayon::prelude::*;

use crate::alignment::{Alignment, HorizontalAlignmentCurve};
use crate::error::{Error, Result};
use crate::geometry::Frame;
use crate::polyline::PolylineCurve;
use crate::settings::EvaluationSettings;

/// Distance along a basis curve.
///
/// Both kinds resolve identically; the non-negative kind only restricts the
/// values it accepts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DistanceMeasure {
    Length(f64),
    NonNegativeLength(f64),
}

impl DistanceMeasure {
    /// Non-negative distance; rejects negative and NaN values.
    pub fn non_negative(value: f64) -> Result<Self> {
        let measure = DistanceMeasure::NonNegativeLength(value);
        measure.value()?;
        Ok(measure)
    }

    /// The distance as a station value.
    pub fn value(self) -> Result<f64> {
        match self {
            DistanceMeasure::Length(v) => Ok(v),
            DistanceMeasure::NonNegativeLength(v) if v >= 0.0 => Ok(v),
            DistanceMeasure::NonNegativeLength(v) => Err(Error::construction(format!(
                "non-negative distance along is {}",
                v
            ))),
        }
    }
}

/// Axes offsets are measured along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OffsetFrame {
    /// The cross-section, rolled by cant.
    #[default]
    CrossSection,
    /// The un-rolled section: lateral offsets stay horizontal.
    Horizontal,
}

/// A point given by distance along a curve and offsets from it. Lateral
/// offsets are positive to the left, vertical offsets positive up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointAddress {
    pub distance_along: DistanceMeasure,
    pub lateral: Option<f64>,
    pub vertical: Option<f64>,
    pub longitudinal: Option<f64>,
    pub offset_frame: OffsetFrame,
}

impl PointAddress {
    pub fn new(distance_along: DistanceMeasure) -> Self {
        Self {
            distance_along,
            lateral: None,
            vertical: None,
            longitudinal: None,
            offset_frame: OffsetFrame::default(),
        }
    }

    /// Address at `station` with no offsets.
    pub fn at(station: f64) -> Self {
        Self::new(DistanceMeasure::Length(station))
    }

    pub fn with_lateral(mut self, lateral: f64) -> Self {
        self.lateral = Some(lateral);
        self
    }

    pub fn with_vertical(mut self, vertical: f64) -> Self {
        self.vertical = Some(vertical);
        self
    }

    pub fn with_longitudinal(mut self, longitudinal: f64) -> Self {
        self.longitudinal = Some(longitudinal);
        self
    }

    pub fn with_offset_frame(mut self, frame: OffsetFrame) -> Self {
        self.offset_frame = frame;
        self
    }
}

/// The two frames of a cross-section: rolled by cant, and level. Both share
/// the origin and the tangent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionFrame {
    pub canted: Frame,
    pub level: Frame,
}

impl SectionFrame {
    /// A section without cant.
    pub fn uncanted(frame: Frame) -> Self {
        Self {
            canted: frame,
            level: frame,
        }
    }

    /// Moves both frames by the same offsets, measured along the canted axes.
    pub fn shifted(&self, lateral: f64, vertical: f64) -> Self {
        let delta = self.canted.lateral * lateral + self.canted.up * vertical;
        Self {
            canted: self.canted.translated(delta),
            level: self.level.translated(delta),
        }
    }
}

/// A curve points can be addressed along.
pub trait BasisCurve {
    /// Accepted distance-along range; open ends are infinite.
    fn domain(&self) -> (f64, f64);

    /// Cross-section frames at `station`.
    fn section_frame(&self, station: f64) -> Result<SectionFrame>;
}

impl BasisCurve for Alignment {
    fn domain(&self) -> (f64, f64) {
        Alignment::domain(self)
    }

    fn section_frame(&self, station: f64) -> Result<SectionFrame> {
        let state = self.state_at(station)?;
        let canted = state.canted_frame();
        let level = Frame {
            origin: canted.origin,
            ..state.level_frame()
        };
        Ok(SectionFrame { canted, level })
    }
}

impl BasisCurve for HorizontalAlignmentCurve {
    fn domain(&self) -> (f64, f64) {
        HorizontalAlignmentCurve::domain(self)
    }

    fn section_frame(&self, station: f64) -> Result<SectionFrame> {
        let state = self.evaluate(station)?;
        let origin = nalgebra::Vector3::new(state.point.x, state.point.y, 0.0);
        Ok(SectionFrame::uncanted(Frame::from_heading(
            origin,
            state.heading,
            0.0,
        )))
    }
}

impl BasisCurve for PolylineCurve {
    fn domain(&self) -> (f64, f64) {
        PolylineCurve::domain(self)
    }

    fn section_frame(&self, station: f64) -> Result<SectionFrame> {
        Ok(SectionFrame::uncanted(self.frame_at(station)?))
    }
}

impl<C: BasisCurve + ?Sized> BasisCurve for &C {
    fn domain(&self) -> (f64, f64) {
        (**self).domain()
    }

    fn section_frame(&self, station: f64) -> Result<SectionFrame> {
        (**self).section_frame(station)
    }
}

/// Resolves point addresses on basis curves into rigid transforms.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlignmentPlacementResolver {
    settings: EvaluationSettings,
}

impl AlignmentPlacementResolver {
    pub fn new(settings: EvaluationSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &EvaluationSettings {
        &self.settings
    }

    /// Frame of the addressed point. The orientation is the cross-section's;
    /// the origin is moved by the address offsets.
    pub fn resolve_frame<C: BasisCurve + ?Sized>(&self, curve: &C, address: &PointAddress) -> Result<Frame> {
        let station = address.distance_along.value()?;
        let section = curve.section_frame(station)?;
        let axes = match address.offset_frame {
            OffsetFrame::CrossSection => section.canted,
            OffsetFrame::Horizontal => section.level,
        };
        let moved = axes.offset(
            address.longitudinal.unwrap_or(0.0),
            address.lateral.unwrap_or(0.0),
            address.vertical.unwrap_or(0.0),
        );
        let frame = Frame {
            origin: moved.origin,
            ..section.canted
        };
        self.check(&frame, station)?;
        Ok(frame)
    }

    /// Homogeneous transform of the addressed point. Columns are tangent,
    /// lateral, up and origin.
    pub fn resolve<C: BasisCurve + ?Sized>(&self, curve: &C, address: &PointAddress) -> Result<Matrix4<f64>> {
        Ok(self.resolve_frame(curve, address)?.to_matrix())
    }

    /// Resolves each station with no offsets.
    pub fn sample<C: BasisCurve + ?Sized>(&self, curve: &C, stations: &[f64]) -> Result<Vec<Matrix4<f64>>> {
        stations
            .iter()
            .map(|s| self.resolve(curve, &PointAddress::at(*s)))
            .collect()
    }

    /// Resolves each station on the rayon thread pool, keeping input order.
    pub fn par_sample<C: BasisCurve + Sync + ?Sized>(
        &self,
        curve: &C,
        stations: &[f64],
    ) -> Result<Vec<Matrix4<f64>>> {
        stations
            .par_iter()
            .map(|s| self.resolve(curve, &PointAddress::at(*s)))
            .collect()
    }

    fn check(&self, frame: &Frame, station: f64) -> Result<()> {
        let tolerance = self.settings.determinant_tolerance;
        let det = frame.determinant();
        let error = frame.orthonormality_error();
        if !frame.origin.iter().all(|c| c.is_finite())
            || !((det - 1.0).abs() <= tolerance)
            || !(error <= tolerance)
        {
            return Err(Error::InternalInvariant(format!(
                "placement at station {} is not rigid: determinant {}, orthonormality error {:.3e}",
                station, det, error
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    struct Skewed;

    impl BasisCurve for Skewed {
        fn domain(&self) -> (f64, f64) {
            (0.0, 1.0)
        }

        fn section_frame(&self, _station: f64) -> Result<SectionFrame> {
            let mut frame = Frame::from_heading(Vector3::zeros(), 0.0, 0.0);
            frame.lateral = Vector3::new(0.3, 1.0, 0.0);
            Ok(SectionFrame::uncanted(frame))
        }
    }

    #[test]
    fn distance_kinds_resolve_identically() {
        let curve = HorizontalAlignmentCurve::builder(0.0, Point::new(0.0, 0.0), 0.5)
            .line(20.0)
            .build()
            .unwrap();
        let resolver = AlignmentPlacementResolver::default();
        let a = resolver.resolve(&curve, &PointAddress::at(7.5)).unwrap();
        let b = resolver
            .resolve(
                &curve,
                &PointAddress::new(DistanceMeasure::non_negative(7.5).unwrap()),
            )
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn negative_non_negative_distance_is_rejected() {
        assert!(DistanceMeasure::non_negative(-1.0).is_err());
        assert!(DistanceMeasure::non_negative(f64::NAN).is_err());
        assert!(DistanceMeasure::non_negative(0.0).is_ok());
        let curve = PolylineCurve::from_2d(
            &[Point::new(0.0, 0.0), Point::new(1.0, 0.0)],
            EvaluationSettings::default(),
        )
        .unwrap();
        let address = PointAddress::new(DistanceMeasure::NonNegativeLength(-0.5));
        assert!(matches!(
            AlignmentPlacementResolver::default().resolve(&curve, &address),
            Err(Error::Construction(_))
        ));
    }

    #[test]
    fn non_orthonormal_section_is_reported() {
        let result = AlignmentPlacementResolver::default().resolve(&Skewed, &PointAddress::at(0.5));
        assert!(matches!(result, Err(Error::InternalInvariant(_))));
    }

    #[test]
    fn longitudinal_offset_moves_along_tangent() {
        let curve = HorizontalAlignmentCurve::builder(0.0, Point::new(0.0, 0.0), 0.0)
            .line(20.0)
            .build()
            .unwrap();
        let frame = AlignmentPlacementResolver::default()
            .resolve_frame(&curve, &PointAddress::at(5.0).with_longitudinal(2.0).with_lateral(1.0))
            .unwrap();
        assert_relative_eq!(frame.origin, Vector3::new(7.0, 1.0, 0.0), epsilon = 1e-12);
    }
}
