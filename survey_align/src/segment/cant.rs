//! Cant (superelevation) segments.
//!
//! A cant segment blends the superelevation of the left and right rail (or
//! pavement edge) from start to end values with one of the transition shapes.

use crate::error::{Error, Result};
use crate::settings::EvaluationSettings;
use crate::transition::TransitionShape;

use super::{check_finite, check_length, SegmentFunction};

/// Transition shape of a cant segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CantShape {
    Constant,
    LinearTransition,
    SineCurve,
    CosineCurve,
    BlossCurve,
    HelmertCurve,
    VienneseBend,
}

impl CantShape {
    /// The blending function, `None` for constant cant.
    pub fn transition(self) -> Option<TransitionShape> {
        match self {
            CantShape::Constant => None,
            CantShape::LinearTransition => Some(TransitionShape::Linear),
            CantShape::SineCurve => Some(TransitionShape::Sine),
            CantShape::CosineCurve => Some(TransitionShape::Cosine),
            CantShape::BlossCurve => Some(TransitionShape::Bloss),
            CantShape::HelmertCurve => Some(TransitionShape::Helmert),
            CantShape::VienneseBend => Some(TransitionShape::VienneseBend),
        }
    }
}

/// Superelevation of both sides and their rates of change per unit station.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CantValue {
    pub left: f64,
    pub right: f64,
    pub left_rate: f64,
    pub right_rate: f64,
}

/// One cant segment.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CantGeometry {
    pub shape: CantShape,
    #[serde(default)]
    pub start_cant_left: f64,
    #[serde(default)]
    pub start_cant_right: f64,
    #[serde(default)]
    pub end_cant_left: f64,
    #[serde(default)]
    pub end_cant_right: f64,
}

impl CantGeometry {
    /// Constant superelevation over the whole segment.
    pub fn constant(left: f64, right: f64) -> Self {
        Self {
            shape: CantShape::Constant,
            start_cant_left: left,
            start_cant_right: right,
            end_cant_left: left,
            end_cant_right: right,
        }
    }

    /// Transition from `(start_left, start_right)` to `(end_left, end_right)`.
    pub fn transition(
        shape: CantShape,
        (start_left, start_right): (f64, f64),
        (end_left, end_right): (f64, f64),
    ) -> Self {
        Self {
            shape,
            start_cant_left: start_left,
            start_cant_right: start_right,
            end_cant_left: end_left,
            end_cant_right: end_right,
        }
    }

    fn varies(&self) -> bool {
        self.start_cant_left != self.end_cant_left || self.start_cant_right != self.end_cant_right
    }
}

impl SegmentFunction for CantGeometry {
    /// Cant values are absolute; the anchor carries nothing.
    type Anchor = ();
    type Local = CantValue;
    type State = CantValue;

    fn kind(&self) -> &'static str {
        match self.shape {
            CantShape::Constant => "constant cant",
            CantShape::LinearTransition => "linear cant transition",
            CantShape::SineCurve => "sine cant transition",
            CantShape::CosineCurve => "cosine cant transition",
            CantShape::BlossCurve => "Bloss cant transition",
            CantShape::HelmertCurve => "Helmert cant transition",
            CantShape::VienneseBend => "Viennese bend cant transition",
        }
    }

    fn validate(&self, length: f64) -> Result<()> {
        let kind = self.kind();
        check_finite(kind, "start cant left", self.start_cant_left)?;
        check_finite(kind, "start cant right", self.start_cant_right)?;
        check_finite(kind, "end cant left", self.end_cant_left)?;
        check_finite(kind, "end cant right", self.end_cant_right)?;
        if self.shape == CantShape::Constant && self.varies() {
            return Err(Error::construction(format!(
                "{} must have equal start and end values",
                kind
            )));
        }
        if length < 0.0 {
            return Err(Error::construction(format!(
                "{} length must not be negative, got {}",
                kind, length
            )));
        }
        check_length(kind, length, self.varies())
    }

    fn local(&self, length: f64, u: f64, _settings: &EvaluationSettings) -> CantValue {
        let Some(shape) = self.shape.transition().filter(|_| self.varies()) else {
            return CantValue {
                left: self.start_cant_left,
                right: self.start_cant_right,
                left_rate: 0.0,
                right_rate: 0.0,
            };
        };
        let t = u / length;
        let f = shape.blend(t);
        let df = shape.blend_rate(t) / length;
        let dl = self.end_cant_left - self.start_cant_left;
        let dr = self.end_cant_right - self.start_cant_right;
        // Exact end values so adjoining segments meet bit for bit.
        let (left, right) = if f == 1.0 {
            (self.end_cant_left, self.end_cant_right)
        } else {
            (self.start_cant_left + dl * f, self.start_cant_right + dr * f)
        };
        CantValue {
            left,
            right,
            left_rate: dl * df,
            right_rate: dr * df,
        }
    }

    fn compose(_anchor: &(), local: CantValue) -> CantValue {
        local
    }

    fn extrapolate(state: &CantValue, distance: f64) -> CantValue {
        CantValue {
            left: state.left + state.left_rate * distance,
            right: state.right + state.right_rate * distance,
            ..*state
        }
    }

    fn continue_from(_state: &CantValue) {}

    fn state_gap(a: &CantValue, b: &CantValue) -> f64 {
        (a.left - b.left).abs().max((a.right - b.right).abs())
    }
}
