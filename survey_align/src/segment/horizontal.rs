//! Horizontal segments: lines, circular arcs, transition spirals and cubic parabolas.

use std::f64::consts::PI;

use crate::error::Result;
use crate::geometry::{distance, rotate, Point};
use crate::settings::EvaluationSettings;
use crate::transition::{integrate_direction, panels_for, TransitionShape};

use super::{check_length, check_radius, curvature_of, SegmentFunction};

/// Largest Fresnel argument evaluated in closed form. Beyond it the clothoid is
/// nearly a circle and the difference of two Fresnel values loses precision,
/// so the position is integrated instead.
const FRESNEL_ARGUMENT_LIMIT: f64 = 50.0;

/// Position and heading at which a segment's local frame is placed.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Placement2 {
    pub point: Point,
    /// Direction of travel in radians, counter-clockwise from +X.
    pub heading: f64,
}

impl Placement2 {
    pub fn new(point: Point, heading: f64) -> Self {
        Self { point, heading }
    }
}

/// Plan position, heading and signed curvature (positive turning left).
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HorizontalState {
    pub point: Point,
    pub heading: f64,
    pub curvature: f64,
}

impl HorizontalState {
    /// Unit direction of travel.
    pub fn direction(&self) -> (f64, f64) {
        (self.heading.cos(), self.heading.sin())
    }
}

/// Shape of a horizontal segment. Radii are signed (positive turns left) and
/// an infinite radius is straight.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HorizontalGeometry {
    /// Straight tangent.
    Line,
    /// Circular curve of constant radius.
    CircularArc { radius: f64 },
    /// Transition spiral whose curvature blends from the start to the end
    /// radius with `shape`. A linear shape is the clothoid.
    Spiral {
        shape: TransitionShape,
        #[serde(with = "super::infinite_as_null", default = "straight")]
        start_radius: f64,
        #[serde(with = "super::infinite_as_null", default = "straight")]
        end_radius: f64,
    },
    /// Cubic parabola. Its station parameter is the longitudinal coordinate
    /// of the local frame, not arc length.
    CubicParabola {
        #[serde(with = "super::infinite_as_null", default = "straight")]
        start_radius: f64,
        #[serde(with = "super::infinite_as_null", default = "straight")]
        end_radius: f64,
    },
}

fn straight() -> f64 {
    f64::INFINITY
}

impl HorizontalGeometry {
    /// Clothoid between two radii.
    pub fn clothoid(start_radius: f64, end_radius: f64) -> Self {
        HorizontalGeometry::Spiral {
            shape: TransitionShape::Linear,
            start_radius,
            end_radius,
        }
    }

    /// Start and end curvature.
    pub fn curvatures(&self) -> (f64, f64) {
        match *self {
            HorizontalGeometry::Line => (0.0, 0.0),
            HorizontalGeometry::CircularArc { radius } => {
                let k = curvature_of(radius);
                (k, k)
            }
            HorizontalGeometry::Spiral {
                start_radius,
                end_radius,
                ..
            }
            | HorizontalGeometry::CubicParabola {
                start_radius,
                end_radius,
            } => (curvature_of(start_radius), curvature_of(end_radius)),
        }
    }

    /// Evaluates the shape at local parameter `u` (signed) of a segment of signed length `length`.
    fn shape_at(&self, length: f64, u: f64, settings: &EvaluationSettings) -> HorizontalState {
        match *self {
            HorizontalGeometry::Line => HorizontalState {
                point: Point::new(u, 0.0),
                heading: 0.0,
                curvature: 0.0,
            },
            HorizontalGeometry::CircularArc { radius } => constant_curvature(curvature_of(radius), u),
            HorizontalGeometry::Spiral { shape, .. } => {
                let (k0, k1) = self.curvatures();
                if k0 == k1 || length == 0.0 || length.is_infinite() {
                    return constant_curvature(k0, u);
                }
                let dk = k1 - k0;
                let heading = k0 * u + dk * length * shape.blend_integral(u / length);
                let curvature = k0 + dk * shape.blend(u / length);
                let closed_form = match shape {
                    TransitionShape::Linear => clothoid_point(k0, k1, length, u),
                    _ => None,
                };
                let (x, y) = match closed_form {
                    Some(p) => p,
                    None => spiral_point(shape, k0, k1, length, u, settings),
                };
                HorizontalState {
                    point: Point::new(x, y),
                    heading,
                    curvature,
                }
            }
            HorizontalGeometry::CubicParabola { .. } => {
                let (k0, k1) = self.curvatures();
                let rate = if length == 0.0 || length.is_infinite() {
                    0.0
                } else {
                    (k1 - k0) / length
                };
                let x = u;
                let y = x * x * (0.5 * k0 + rate * x / 6.0);
                let dy = x * (k0 + 0.5 * rate * x);
                let ddy = k0 + rate * x;
                HorizontalState {
                    point: Point::new(x, y),
                    heading: dy.atan(),
                    curvature: ddy / (1.0 + dy * dy).powf(1.5),
                }
            }
        }
    }
}

fn constant_curvature(k: f64, u: f64) -> HorizontalState {
    let point = if k == 0.0 {
        Point::new(u, 0.0)
    } else {
        let theta = k * u;
        let half = (0.5 * theta).sin();
        Point::new(theta.sin() / k, 2.0 * half * half / k)
    };
    HorizontalState {
        point,
        heading: k * u,
        curvature: k,
    }
}

/// Clothoid position from Fresnel integrals, with heading `k0 s + kp s² / 2`.
/// Returns `None` when the Fresnel arguments are too large to be accurate.
fn clothoid_point(k0: f64, k1: f64, length: f64, u: f64) -> Option<(f64, f64)> {
    let kp = (k1 - k0) / length;
    let alpha = kp / 2.0;
    let sign = alpha.signum();
    let scale = (2.0 * alpha.abs() / PI).sqrt();
    let shift = k0 / (2.0 * alpha);
    let z0 = scale * shift;
    let z1 = scale * (u + shift);
    if !(z0.abs() <= FRESNEL_ARGUMENT_LIMIT && z1.abs() <= FRESNEL_ARGUMENT_LIMIT) {
        return None;
    }
    let delta = -k0 * k0 / (4.0 * alpha);
    let (s0, c0) = fresnel::fresnl(z0);
    let (s1, c1) = fresnel::fresnl(z1);
    let fac = 1.0 / scale;
    let (ds, dc) = (s1 - s0, c1 - c0);
    let (sin_d, cos_d) = delta.sin_cos();
    let x = fac * (dc * cos_d - sign * ds * sin_d);
    let y = fac * (sign * ds * cos_d + dc * sin_d);
    Some((x, y))
}

/// Spiral position by Gauss-Legendre quadrature of the closed-form heading.
fn spiral_point(
    shape: TransitionShape,
    k0: f64,
    k1: f64,
    length: f64,
    u: f64,
    settings: &EvaluationSettings,
) -> (f64, f64) {
    let dk = k1 - k0;
    let heading = |s: f64| k0 * s + dk * length * shape.blend_integral(s / length);
    let turning = k0.abs().max(k1.abs()) * u.abs();
    let panels = panels_for(settings.quadrature_panels, u, length, turning);

    let mut x = 0.0;
    let mut y = 0.0;
    let mut from = 0.0;
    for t in shape.breakpoints() {
        let b = t * length;
        if b.abs() < u.abs() && b.signum() == u.signum() {
            let (dx, dy) = integrate_direction(heading, from, b, panels);
            x += dx;
            y += dy;
            from = b;
        }
    }
    let (dx, dy) = integrate_direction(heading, from, u, panels);
    (x + dx, y + dy)
}

impl SegmentFunction for HorizontalGeometry {
    type Anchor = Placement2;
    type Local = HorizontalState;
    type State = HorizontalState;

    fn kind(&self) -> &'static str {
        match self {
            HorizontalGeometry::Line => "line",
            HorizontalGeometry::CircularArc { .. } => "circular arc",
            HorizontalGeometry::Spiral { shape, .. } => match shape {
                TransitionShape::Linear => "clothoid",
                TransitionShape::Bloss => "Bloss spiral",
                TransitionShape::Sine => "sine spiral",
                TransitionShape::Cosine => "cosine spiral",
                TransitionShape::Helmert => "Helmert spiral",
                TransitionShape::VienneseBend => "Viennese bend",
            },
            HorizontalGeometry::CubicParabola { .. } => "cubic parabola",
        }
    }

    fn validate(&self, length: f64) -> Result<()> {
        let kind = self.kind();
        match *self {
            HorizontalGeometry::Line => check_length(kind, length, false),
            HorizontalGeometry::CircularArc { radius } => {
                check_radius(kind, "radius", radius)?;
                super::check_finite(kind, "radius", radius)?;
                check_length(kind, length, false)
            }
            HorizontalGeometry::Spiral {
                start_radius,
                end_radius,
                ..
            }
            | HorizontalGeometry::CubicParabola {
                start_radius,
                end_radius,
            } => {
                check_radius(kind, "start radius", start_radius)?;
                check_radius(kind, "end radius", end_radius)?;
                let (k0, k1) = self.curvatures();
                check_length(kind, length, k0 != k1)
            }
        }
    }

    fn local(&self, length: f64, offset: f64, settings: &EvaluationSettings) -> HorizontalState {
        if length < 0.0 {
            // Traversed backwards: travel direction and turning sense flip.
            let state = self.shape_at(length, -offset, settings);
            HorizontalState {
                heading: state.heading + PI,
                curvature: -state.curvature,
                ..state
            }
        } else {
            self.shape_at(length, offset, settings)
        }
    }

    fn compose(anchor: &Placement2, local: HorizontalState) -> HorizontalState {
        let (dx, dy) = rotate(local.point.x, local.point.y, anchor.heading);
        HorizontalState {
            point: Point::new(anchor.point.x + dx, anchor.point.y + dy),
            heading: anchor.heading + local.heading,
            curvature: local.curvature,
        }
    }

    fn extrapolate(state: &HorizontalState, distance: f64) -> HorizontalState {
        let (cos, sin) = state.direction();
        HorizontalState {
            point: Point::new(state.point.x + distance * cos, state.point.y + distance * sin),
            heading: state.heading,
            curvature: 0.0,
        }
    }

    fn continue_from(state: &HorizontalState) -> Placement2 {
        Placement2::new(state.point, state.heading)
    }

    fn state_gap(a: &HorizontalState, b: &HorizontalState) -> f64 {
        let turn = b.heading - a.heading;
        let turn = turn.sin().atan2(turn.cos());
        distance(a.point, b.point).max(turn.abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn eval(geometry: HorizontalGeometry, length: f64, offset: f64) -> HorizontalState {
        geometry.local(length, offset, &EvaluationSettings::default())
    }

    #[test]
    fn clothoid_end_point() {
        let geometry = HorizontalGeometry::clothoid(f64::INFINITY, 100.0);
        let end = eval(geometry, 50.0, 50.0);
        assert!((end.point.x - 49.6884029).abs() < 1e-6);
        assert!((end.point.y - 4.1481024).abs() < 1e-6);
        assert!((end.heading.cos() - 0.9689124).abs() < 1e-6);
        assert!((end.heading.sin() - 0.2474039).abs() < 1e-6);
        assert_relative_eq!(end.curvature, 0.01, epsilon = 1e-15);
    }

    #[test]
    fn clothoid_closed_form_matches_quadrature() {
        let settings = EvaluationSettings::default();
        for (r0, r1) in [(1000.0, 300.0), (-300.0, -1000.0), (300.0, f64::INFINITY), (-1000.0, -300.0)] {
            let (k0, k1) = (curvature_of(r0), curvature_of(r1));
            for u in [10.0, 55.0, 100.0] {
                let (xf, yf) = clothoid_point(k0, k1, 100.0, u).unwrap();
                let (xq, yq) = spiral_point(TransitionShape::Linear, k0, k1, 100.0, u, &settings);
                assert_relative_eq!(xf, xq, epsilon = 1e-8);
                assert_relative_eq!(yf, yq, epsilon = 1e-8);
            }
        }
    }

    #[test]
    fn nearly_circular_clothoid_falls_back_to_quadrature() {
        let k0 = 1.0 / 500.0;
        let k1 = k0 + 1e-13;
        assert!(clothoid_point(k0, k1, 100.0, 100.0).is_none());
        let state = eval(HorizontalGeometry::clothoid(1.0 / k0, 1.0 / k1), 100.0, 100.0);
        let arc = constant_curvature(k0, 100.0);
        assert_relative_eq!(state.point.x, arc.point.x, epsilon = 1e-7);
        assert_relative_eq!(state.point.y, arc.point.y, epsilon = 1e-7);
    }

    #[test]
    fn arc_quarter_turn() {
        let r = 100.0;
        let len = 0.5 * PI * r;
        let end = eval(HorizontalGeometry::CircularArc { radius: r }, len, len);
        assert_relative_eq!(end.point.x, r, epsilon = 1e-9);
        assert_relative_eq!(end.point.y, r, epsilon = 1e-9);
        assert_relative_eq!(end.heading, 0.5 * PI, epsilon = 1e-12);

        let right = eval(HorizontalGeometry::CircularArc { radius: -r }, len, len);
        assert_relative_eq!(right.point.y, -r, epsilon = 1e-9);
    }

    #[test]
    fn spiral_heading_and_curvature_reach_end_values() {
        for shape in [
            TransitionShape::Bloss,
            TransitionShape::Sine,
            TransitionShape::Cosine,
            TransitionShape::Helmert,
            TransitionShape::VienneseBend,
        ] {
            let geometry = HorizontalGeometry::Spiral {
                shape,
                start_radius: f64::INFINITY,
                end_radius: 300.0,
            };
            let end = eval(geometry, 100.0, 100.0);
            // Every symmetric shape turns by (k0 + k1) L / 2.
            assert_relative_eq!(end.heading, 0.5 * 100.0 / 300.0, epsilon = 1e-12);
            assert_relative_eq!(end.curvature, 1.0 / 300.0, epsilon = 1e-15);
        }
    }

    #[test]
    fn helmert_position_is_converged() {
        let geometry = HorizontalGeometry::Spiral {
            shape: TransitionShape::Helmert,
            start_radius: 1000.0,
            end_radius: 300.0,
        };
        let coarse = geometry.local(100.0, 80.0, &EvaluationSettings::default());
        let fine = geometry.local(
            100.0,
            80.0,
            &EvaluationSettings {
                quadrature_panels: 200,
                ..Default::default()
            },
        );
        assert_relative_eq!(coarse.point.x, fine.point.x, epsilon = 1e-9);
        assert_relative_eq!(coarse.point.y, fine.point.y, epsilon = 1e-9);
    }

    #[test]
    fn cubic_uses_longitudinal_parameter() {
        let geometry = HorizontalGeometry::CubicParabola {
            start_radius: f64::INFINITY,
            end_radius: 300.0,
        };
        let end = eval(geometry, 100.0, 100.0);
        assert_relative_eq!(end.point.x, 100.0);
        assert_relative_eq!(end.point.y, 100.0f64.powi(3) / (6.0 * 300.0 * 100.0), epsilon = 1e-12);
        assert_relative_eq!(end.heading, (100.0 / 600.0f64).atan(), epsilon = 1e-12);
    }

    #[test]
    fn negative_length_reverses_travel() {
        let state = eval(HorizontalGeometry::Line, -10.0, 4.0);
        assert_relative_eq!(state.point.x, -4.0);
        assert_relative_eq!(state.heading.cos(), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn degenerate_spiral_is_rejected() {
        let geometry = HorizontalGeometry::clothoid(f64::INFINITY, 300.0);
        assert!(matches!(
            geometry.validate(0.0),
            Err(crate::error::Error::DegenerateGeometry(_))
        ));
        assert!(geometry.validate(f64::INFINITY).is_err());
        assert!(HorizontalGeometry::clothoid(300.0, 300.0).validate(0.0).is_ok());
        assert!(HorizontalGeometry::CircularArc { radius: 0.0 }.validate(10.0).is_err());
    }

    #[test]
    fn radius_null_round_trips_as_straight() {
        let json = r#"{ "type": "spiral", "shape": "bloss", "start_radius": null, "end_radius": -300.0 }"#;
        let geometry: HorizontalGeometry = serde_json::from_str(json).unwrap();
        assert_eq!(geometry.curvatures(), (0.0, -1.0 / 300.0));
        let back = serde_json::to_string(&geometry).unwrap();
        assert!(back.contains("\"start_radius\":null"));
    }
}
