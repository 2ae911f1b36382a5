//! Vertical profile segments. Elevation is a function of horizontal distance.

use crate::error::Result;
use crate::settings::EvaluationSettings;

use super::{check_finite, check_length, SegmentFunction};

/// Elevation, gradient (rise over run) and rate of change of the gradient.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VerticalState {
    pub elevation: f64,
    pub gradient: f64,
    pub grade_rate: f64,
}

impl VerticalState {
    /// Level profile at elevation zero, used when an alignment has no vertical curve.
    pub fn level() -> Self {
        Self {
            elevation: 0.0,
            gradient: 0.0,
            grade_rate: 0.0,
        }
    }
}

/// Shape of a vertical profile segment.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VerticalGeometry {
    /// Straight grade.
    ConstantGradient { gradient: f64 },
    /// Parabolic vertical curve: the gradient changes linearly with distance.
    ParabolicArc { start_gradient: f64, end_gradient: f64 },
    /// Circular vertical curve tangent to both gradients.
    CircularArc { start_gradient: f64, end_gradient: f64 },
}

impl VerticalGeometry {
    pub fn gradients(&self) -> (f64, f64) {
        match *self {
            VerticalGeometry::ConstantGradient { gradient } => (gradient, gradient),
            VerticalGeometry::ParabolicArc {
                start_gradient,
                end_gradient,
            }
            | VerticalGeometry::CircularArc {
                start_gradient,
                end_gradient,
            } => (start_gradient, end_gradient),
        }
    }

    /// Signed radius of a circular vertical curve (positive for a sag).
    pub fn radius(&self, length: f64) -> Option<f64> {
        match *self {
            VerticalGeometry::CircularArc {
                start_gradient,
                end_gradient,
            } if start_gradient != end_gradient => {
                let s0 = start_gradient.atan().sin();
                let s1 = end_gradient.atan().sin();
                Some(length / (s1 - s0))
            }
            _ => None,
        }
    }
}

impl SegmentFunction for VerticalGeometry {
    /// Elevation at the segment start.
    type Anchor = f64;
    type Local = VerticalState;
    type State = VerticalState;

    fn kind(&self) -> &'static str {
        match self {
            VerticalGeometry::ConstantGradient { .. } => "constant gradient",
            VerticalGeometry::ParabolicArc { .. } => "parabolic vertical curve",
            VerticalGeometry::CircularArc { .. } => "circular vertical curve",
        }
    }

    fn validate(&self, length: f64) -> Result<()> {
        let kind = self.kind();
        let (g0, g1) = self.gradients();
        check_finite(kind, "start gradient", g0)?;
        check_finite(kind, "end gradient", g1)?;
        if length < 0.0 {
            return Err(crate::error::Error::construction(format!(
                "{} length must not be negative, got {}",
                kind, length
            )));
        }
        check_length(kind, length, g0 != g1)
    }

    fn local(&self, length: f64, u: f64, _settings: &EvaluationSettings) -> VerticalState {
        match *self {
            VerticalGeometry::ConstantGradient { gradient } => VerticalState {
                elevation: gradient * u,
                gradient,
                grade_rate: 0.0,
            },
            VerticalGeometry::ParabolicArc {
                start_gradient,
                end_gradient,
            } => {
                let rate = if start_gradient == end_gradient {
                    0.0
                } else {
                    (end_gradient - start_gradient) / length
                };
                VerticalState {
                    elevation: u * (start_gradient + 0.5 * rate * u),
                    gradient: start_gradient + rate * u,
                    grade_rate: rate,
                }
            }
            VerticalGeometry::CircularArc { start_gradient, .. } => {
                let Some(radius) = self.radius(length) else {
                    return VerticalState {
                        elevation: start_gradient * u,
                        gradient: start_gradient,
                        grade_rate: 0.0,
                    };
                };
                let a0 = start_gradient.atan();
                let (sin0, cos0) = a0.sin_cos();
                let sin = (sin0 + u / radius).clamp(-1.0, 1.0);
                let cos = (1.0 - sin * sin).sqrt();
                // R (cos a0 - cos a) rewritten without the cancellation.
                let elevation = u * (sin + sin0) / (cos0 + cos);
                VerticalState {
                    elevation,
                    gradient: sin / cos,
                    grade_rate: 1.0 / (radius * cos * cos * cos),
                }
            }
        }
    }

    fn compose(anchor: &f64, local: VerticalState) -> VerticalState {
        VerticalState {
            elevation: anchor + local.elevation,
            ..local
        }
    }

    fn extrapolate(state: &VerticalState, distance: f64) -> VerticalState {
        VerticalState {
            elevation: state.elevation + state.gradient * distance,
            gradient: state.gradient,
            grade_rate: 0.0,
        }
    }

    fn continue_from(state: &VerticalState) -> f64 {
        state.elevation
    }

    fn state_gap(a: &VerticalState, b: &VerticalState) -> f64 {
        (a.elevation - b.elevation)
            .abs()
            .max((a.gradient - b.gradient).abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn eval(geometry: VerticalGeometry, length: f64, u: f64) -> VerticalState {
        geometry.local(length, u, &EvaluationSettings::default())
    }

    #[test]
    fn parabolic_mid_point() {
        let curve = VerticalGeometry::ParabolicArc {
            start_gradient: 0.0175,
            end_gradient: -0.0100,
        };
        let mid = eval(curve, 1600.0, 800.0);
        assert_relative_eq!(mid.elevation, 8.5, epsilon = 1e-9);
        assert_relative_eq!(mid.gradient, 0.00375, epsilon = 1e-12);
        assert_relative_eq!(mid.grade_rate, -0.0275 / 1600.0, epsilon = 1e-15);
    }

    #[test]
    fn circular_arc_reaches_end_gradient() {
        for (g0, g1) in [(-0.5, -1.0), (0.0, 0.5), (1.0, 0.5), (0.5, 0.0)] {
            let curve = VerticalGeometry::CircularArc {
                start_gradient: g0,
                end_gradient: g1,
            };
            let start = eval(curve, 100.0, 0.0);
            let end = eval(curve, 100.0, 100.0);
            assert_relative_eq!(start.elevation, 0.0);
            assert_relative_eq!(start.gradient, g0, epsilon = 1e-12);
            assert_relative_eq!(end.gradient, g1, epsilon = 1e-9);
        }
    }

    #[test]
    fn circular_arc_matches_circle_equation() {
        let curve = VerticalGeometry::CircularArc {
            start_gradient: 0.0,
            end_gradient: 0.5,
        };
        let r = curve.radius(100.0).unwrap();
        let p = eval(curve, 100.0, 60.0);
        // Circle centred straight above the start point.
        let dz = r - p.elevation;
        assert_relative_eq!(60.0 * 60.0 + dz * dz, r * r, max_relative = 1e-9);
    }

    #[test]
    fn slope_is_derivative_of_elevation() {
        let h = 1e-5;
        for curve in [
            VerticalGeometry::ParabolicArc {
                start_gradient: 0.5,
                end_gradient: -1.0,
            },
            VerticalGeometry::CircularArc {
                start_gradient: 0.5,
                end_gradient: -1.0,
            },
        ] {
            let fd = (eval(curve, 100.0, 40.0 + h).elevation - eval(curve, 100.0, 40.0 - h).elevation)
                / (2.0 * h);
            assert_relative_eq!(eval(curve, 100.0, 40.0).gradient, fd, epsilon = 1e-7);
        }
    }

    #[test]
    fn degenerate_vertical_curve() {
        let curve = VerticalGeometry::ParabolicArc {
            start_gradient: 0.01,
            end_gradient: 0.02,
        };
        assert!(curve.validate(0.0).is_err());
        assert!(curve.validate(-10.0).is_err());
        assert!(VerticalGeometry::ConstantGradient { gradient: 0.01 }
            .validate(f64::INFINITY)
            .is_ok());
    }
}
