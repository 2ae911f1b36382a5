//! Segment-level curve math.
//!
//! Every segment type implements [`SegmentFunction`]: it evaluates its shape
//! in a local frame starting at the segment start, and knows how to place that
//! local result through the segment's anchor into the parent frame.

use std::fmt::Debug;

use crate::error::{Error, Result};
use crate::settings::EvaluationSettings;

pub mod cant;
pub mod horizontal;
pub mod spatial;
pub mod vertical;

pub use cant::{CantGeometry, CantShape, CantValue};
pub use horizontal::{HorizontalGeometry, HorizontalState, Placement2};
pub use spatial::{SpatialAnchor, SpatialLine, SpatialState};
pub use vertical::{VerticalGeometry, VerticalState};

/// Closed-form evaluator for one family of segments.
pub trait SegmentFunction: Clone + Debug {
    /// Placement of the segment's local frame in the parent frame.
    type Anchor: Copy + Debug;
    /// Result of a local evaluation, before anchoring.
    type Local;
    /// Result in the parent frame.
    type State: Copy + Debug;

    /// Short name used in error and log messages.
    fn kind(&self) -> &'static str;

    /// Checks the shape parameters against the (signed) segment length.
    fn validate(&self, length: f64) -> Result<()>;

    /// Evaluates the shape `offset` along the segment, `0 <= offset <= |length|`.
    fn local(&self, length: f64, offset: f64, settings: &EvaluationSettings) -> Self::Local;

    /// Places a local result through the anchor.
    fn compose(anchor: &Self::Anchor, local: Self::Local) -> Self::State;

    /// Continues a boundary state by `distance` in a straight line / at constant rate.
    fn extrapolate(state: &Self::State, distance: f64) -> Self::State;

    /// Anchor for a segment that continues from `state`.
    fn continue_from(state: &Self::State) -> Self::Anchor;

    /// Largest mismatch between two states in value or direction, used to
    /// report discontinuous joins.
    fn state_gap(a: &Self::State, b: &Self::State) -> f64;
}

/// One segment of a piecewise station function: its station domain, anchor and shape.
#[derive(Debug, Clone)]
pub struct StationSegment<G: SegmentFunction> {
    /// Station of the segment start.
    pub start: f64,
    /// Signed length; the station domain is `[start, start + |length|)`.
    pub length: f64,
    pub anchor: G::Anchor,
    pub geometry: G,
}

impl<G: SegmentFunction> StationSegment<G> {
    pub fn new(start: f64, length: f64, anchor: G::Anchor, geometry: G) -> Self {
        Self {
            start,
            length,
            anchor,
            geometry,
        }
    }

    /// Station width of the segment.
    pub fn span(&self) -> f64 {
        self.length.abs()
    }

    pub fn end(&self) -> f64 {
        self.start + self.span()
    }

    /// Evaluates the segment `offset` past its start, composed into the parent frame.
    pub fn evaluate(&self, offset: f64, settings: &EvaluationSettings) -> G::State {
        let local = self.geometry.local(self.length, offset, settings);
        G::compose(&self.anchor, local)
    }
}

/// JSON has no infinity, so unbounded radii and lengths are written as `null`.
pub(crate) mod infinite_as_null {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
    }
}

/// Curvature of a signed radius; an infinite radius is straight.
pub(crate) fn curvature_of(radius: f64) -> f64 {
    if radius.is_infinite() {
        0.0
    } else {
        1.0 / radius
    }
}

pub(crate) fn check_radius(kind: &str, name: &str, radius: f64) -> Result<()> {
    if radius.is_nan() || radius == 0.0 {
        return Err(Error::construction(format!(
            "{} {} must be non-zero, got {}",
            kind, name, radius
        )));
    }
    Ok(())
}

pub(crate) fn check_finite(kind: &str, name: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(Error::construction(format!(
            "{} {} must be finite, got {}",
            kind, name, value
        )));
    }
    Ok(())
}

/// Common length checks: no NaN, and a varying shape needs a finite length
/// and a non-zero length when its end values differ.
pub(crate) fn check_length(kind: &str, length: f64, varies: bool) -> Result<()> {
    if length.is_nan() {
        return Err(Error::construction(format!("{} length is NaN", kind)));
    }
    if varies && length.is_infinite() {
        return Err(Error::construction(format!(
            "{} with distinct end values cannot have an unbounded length",
            kind
        )));
    }
    if varies && length == 0.0 {
        return Err(Error::degenerate(format!(
            "zero-length {} with distinct end values",
            kind
        )));
    }
    Ok(())
}
