//! Normalised transition shapes and the quadrature used to integrate spiral positions.
//!
//! A transition shape is a blending function `f(t)` on `t ∈ [0, 1]` with
//! `f(0) = 0` and `f(1) = 1`. Cant segments blend their start and end values
//! with it; horizontal transition spirals blend curvature with it.

use std::f64::consts::PI;

use crate::settings::MAX_QUADRATURE_PANELS;

/// Blending function of a transition segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionShape {
    /// `f = t`. As a horizontal spiral this is the clothoid.
    Linear,
    /// `f = 3t² - 2t³`.
    Bloss,
    /// `f = t - sin(2πt) / 2π`.
    Sine,
    /// `f = (1 - cos πt) / 2`.
    Cosine,
    /// Two parabolas meeting at `t = ½`.
    Helmert,
    /// Seventh-order polynomial `35t⁴ - 84t⁵ + 70t⁶ - 20t⁷`.
    VienneseBend,
}

impl TransitionShape {
    /// Blended fraction at normalised progress `t`. Outside `[0, 1]` the
    /// boundary value is held, and the boundary values are exact.
    pub fn blend(self, t: f64) -> f64 {
        if t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }
        match self {
            TransitionShape::Linear => t,
            TransitionShape::Bloss => t * t * (3.0 - 2.0 * t),
            TransitionShape::Sine => t - (2.0 * PI * t).sin() / (2.0 * PI),
            TransitionShape::Cosine => 0.5 * (1.0 - (PI * t).cos()),
            TransitionShape::Helmert => {
                if t <= 0.5 {
                    2.0 * t * t
                } else {
                    let r = 1.0 - t;
                    1.0 - 2.0 * r * r
                }
            }
            TransitionShape::VienneseBend => {
                let t4 = t.powi(4);
                t4 * (35.0 + t * (-84.0 + t * (70.0 - 20.0 * t)))
            }
        }
    }

    /// Derivative `df/dt`. Zero outside `[0, 1]`.
    pub fn blend_rate(self, t: f64) -> f64 {
        if !(0.0..=1.0).contains(&t) {
            return 0.0;
        }
        match self {
            TransitionShape::Linear => 1.0,
            TransitionShape::Bloss => 6.0 * t * (1.0 - t),
            TransitionShape::Sine => 1.0 - (2.0 * PI * t).cos(),
            TransitionShape::Cosine => 0.5 * PI * (PI * t).sin(),
            TransitionShape::Helmert => {
                if t <= 0.5 {
                    4.0 * t
                } else {
                    4.0 * (1.0 - t)
                }
            }
            TransitionShape::VienneseBend => {
                let t3 = t.powi(3);
                t3 * (140.0 + t * (-420.0 + t * (420.0 - 140.0 * t)))
            }
        }
    }

    /// Integral `F(t) = ∫₀ᵗ f`. Continues linearly past `t = 1` (where `f = 1`)
    /// and is zero for negative `t`.
    pub fn blend_integral(self, t: f64) -> f64 {
        if t <= 0.0 {
            return 0.0;
        }
        if t > 1.0 {
            return 0.5 + (t - 1.0);
        }
        match self {
            TransitionShape::Linear => 0.5 * t * t,
            TransitionShape::Bloss => t * t * t * (1.0 - 0.5 * t),
            TransitionShape::Sine => 0.5 * t * t + ((2.0 * PI * t).cos() - 1.0) / (4.0 * PI * PI),
            TransitionShape::Cosine => 0.5 * t - (PI * t).sin() / (2.0 * PI),
            TransitionShape::Helmert => {
                if t <= 0.5 {
                    2.0 * t * t * t / 3.0
                } else {
                    let r = 1.0 - t;
                    t - 0.5 + 2.0 * r * r * r / 3.0
                }
            }
            TransitionShape::VienneseBend => {
                let t5 = t.powi(5);
                t5 * (7.0 + t * (-14.0 + t * (10.0 - 2.5 * t)))
            }
        }
    }

    /// Interior points of `[0, 1]` where the shape is not smooth. Quadrature
    /// panels are split there.
    pub fn breakpoints(self) -> &'static [f64] {
        match self {
            TransitionShape::Helmert => &[0.5],
            _ => &[],
        }
    }
}

const GAUSS_NODES: [f64; 5] = [
    0.148_874_338_981_631_2,
    0.433_395_394_129_247_2,
    0.679_409_568_299_024_4,
    0.865_063_366_688_984_5,
    0.973_906_528_517_171_7,
];

const GAUSS_WEIGHTS: [f64; 5] = [
    0.295_524_224_714_752_9,
    0.269_266_719_309_996_3,
    0.219_086_362_515_982_0,
    0.149_451_349_150_580_6,
    0.066_671_344_308_688_1,
];

/// Integrates the unit direction `(cos θ(s), sin θ(s))` from `a` to `b` with
/// `panels` equal 10-point Gauss-Legendre panels. `b < a` integrates backwards.
pub fn integrate_direction<F: Fn(f64) -> f64>(heading: F, a: f64, b: f64, panels: usize) -> (f64, f64) {
    let panels = panels.clamp(1, MAX_QUADRATURE_PANELS);
    let h = (b - a) / panels as f64;
    let half = 0.5 * h;
    let mut x = 0.0;
    let mut y = 0.0;
    for i in 0..panels {
        let mid = a + (i as f64 + 0.5) * h;
        for (node, weight) in GAUSS_NODES.iter().zip(GAUSS_WEIGHTS.iter()) {
            for s in [mid - half * node, mid + half * node] {
                let (sin, cos) = heading(s).sin_cos();
                x += weight * cos;
                y += weight * sin;
            }
        }
    }
    (x * half, y * half)
}

/// Panel count for integrating over `[0, u]` of a segment of length `length`
/// whose heading turns by roughly `turning` radians over that range.
pub fn panels_for(base: usize, u: f64, length: f64, turning: f64) -> usize {
    let fraction = if length.is_finite() && length != 0.0 {
        (u / length).abs().min(1.0)
    } else {
        1.0
    };
    let by_length = (base as f64 * fraction).ceil() as usize;
    let by_turning = (turning.abs() / 0.25).ceil() as usize;
    by_length.max(by_turning).clamp(1, MAX_QUADRATURE_PANELS)
}
