//! Cant (superelevation) by station.
//!
//! Cant is given as the superelevation of the left and right rail heads (or
//! pavement edges) relative to the reference axis. The cross-section rolls by
//! the angle whose sine is their difference over the rail head distance, and
//! the reference axis rises by their mean.

use crate::error::{Error, Result};
use crate::piecewise::{Extent, PiecewiseStationFunction, SegmentChain};
use crate::segment::{CantGeometry, CantShape, CantValue, StationSegment};
use crate::settings::EvaluationSettings;

/// Cant at one station.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CantState {
    pub left: f64,
    pub right: f64,
    /// Roll about the tangent in radians; positive raises the left side.
    pub roll: f64,
    /// Derivative of `roll` with respect to station.
    pub roll_rate: f64,
    /// Rise of the reference axis, the mean of both sides.
    pub lift: f64,
}

/// Piecewise cant profile over a fixed rail head distance.
#[derive(Debug, Clone)]
pub struct CantFunction {
    function: PiecewiseStationFunction<CantGeometry>,
    rail_head_distance: f64,
}

/// Builder for a cant profile.
#[derive(Debug, Clone)]
pub struct CantBuilder {
    chain: SegmentChain<CantGeometry>,
    rail_head_distance: f64,
}

impl CantFunction {
    pub fn builder(start_station: f64, rail_head_distance: f64) -> CantBuilder {
        CantBuilder {
            chain: SegmentChain::new(start_station, ()),
            rail_head_distance,
        }
    }

    /// Builds a cant profile from explicitly placed segments.
    pub fn from_segments(
        segments: Vec<StationSegment<CantGeometry>>,
        rail_head_distance: f64,
        extent: Extent,
        settings: EvaluationSettings,
    ) -> Result<Self> {
        let function = PiecewiseStationFunction::from_segments(segments, extent, settings)?;
        Self::with_function(function, rail_head_distance)
    }

    fn with_function(
        function: PiecewiseStationFunction<CantGeometry>,
        rail_head_distance: f64,
    ) -> Result<Self> {
        if !rail_head_distance.is_finite() || rail_head_distance <= 0.0 {
            return Err(Error::construction(format!(
                "rail head distance must be positive, got {}",
                rail_head_distance
            )));
        }
        for segment in function.segments() {
            let g = &segment.geometry;
            for cant in [
                g.start_cant_left - g.start_cant_right,
                g.end_cant_left - g.end_cant_right,
            ] {
                if cant.abs() >= rail_head_distance {
                    return Err(Error::construction(format!(
                        "cant difference {} at station {} is not below the rail head distance {}",
                        cant, segment.start, rail_head_distance
                    )));
                }
            }
        }
        Ok(Self {
            function,
            rail_head_distance,
        })
    }

    pub fn rail_head_distance(&self) -> f64 {
        self.rail_head_distance
    }

    pub fn domain(&self) -> (f64, f64) {
        self.function.domain()
    }

    pub fn function(&self) -> &PiecewiseStationFunction<CantGeometry> {
        &self.function
    }

    pub fn evaluate(&self, station: f64) -> Result<CantState> {
        let value = self.function.evaluate(station)?;
        Ok(self.state(value))
    }

    pub fn roll_at(&self, station: f64) -> Result<f64> {
        Ok(self.evaluate(station)?.roll)
    }

    pub fn sample(&self, stations: &[f64]) -> Result<Vec<CantState>> {
        stations.iter().map(|s| self.evaluate(*s)).collect()
    }

    fn state(&self, value: CantValue) -> CantState {
        let g = self.rail_head_distance;
        // Extrapolated values may run past a vertical cross-section.
        let ratio = ((value.left - value.right) / g).clamp(-1.0, 1.0);
        let rate = (value.left_rate - value.right_rate) / g;
        let cos = (1.0 - ratio * ratio).sqrt();
        CantState {
            left: value.left,
            right: value.right,
            roll: ratio.asin(),
            roll_rate: if cos > 0.0 { rate / cos } else { 0.0 },
            lift: 0.5 * (value.left + value.right),
        }
    }
}

impl CantBuilder {
    /// Constant cant over `length`.
    pub fn constant(mut self, length: f64, left: f64, right: f64) -> Self {
        self.chain = self.chain.segment(length, CantGeometry::constant(left, right));
        self
    }

    /// Transition over `length` from `start` to `end`, each `(left, right)`.
    pub fn transition(mut self, shape: CantShape, length: f64, start: (f64, f64), end: (f64, f64)) -> Self {
        self.chain = self
            .chain
            .segment(length, CantGeometry::transition(shape, start, end));
        self
    }

    pub fn segment(mut self, length: f64, geometry: CantGeometry) -> Self {
        self.chain = self.chain.segment(length, geometry);
        self
    }

    pub fn extent(mut self, extent: Extent) -> Self {
        self.chain = self.chain.extent(extent);
        self
    }

    pub fn settings(mut self, settings: EvaluationSettings) -> Self {
        self.chain = self.chain.settings(settings);
        self
    }

    pub fn build(self) -> Result<CantFunction> {
        CantFunction::with_function(self.chain.build_function()?, self.rail_head_distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ramp() -> CantFunction {
        CantFunction::builder(0.0, 1.5)
            .constant(50.0, 0.0, 0.0)
            .transition(CantShape::LinearTransition, 100.0, (0.0, 0.0), (0.15, 0.0))
            .constant(50.0, 0.15, 0.0)
            .build()
            .unwrap()
    }

    #[test]
    fn level_before_the_transition() {
        let cant = ramp();
        let state = cant.evaluate(10.0).unwrap();
        assert_eq!(state.roll, 0.0);
        assert_eq!(state.lift, 0.0);
    }

    #[test]
    fn interpolates_linear_transition() {
        let cant = ramp();
        let state = cant.evaluate(100.0).unwrap();
        assert_relative_eq!(state.left, 0.075, epsilon = 1e-15);
        assert_relative_eq!(state.roll, (0.075f64 / 1.5).asin(), epsilon = 1e-15);
        assert_relative_eq!(state.lift, 0.0375, epsilon = 1e-15);
    }

    #[test]
    fn roll_rate_is_derivative_of_roll() {
        let cant = ramp();
        let h = 1e-5;
        let fd = (cant.roll_at(120.0 + h).unwrap() - cant.roll_at(120.0 - h).unwrap()) / (2.0 * h);
        assert_relative_eq!(cant.evaluate(120.0).unwrap().roll_rate, fd, epsilon = 1e-9);
    }

    #[test]
    fn holds_end_value_on_final_segment() {
        let state = ramp().evaluate(200.0).unwrap();
        assert_relative_eq!(state.roll, 0.1f64.asin(), epsilon = 1e-15);
    }

    #[test]
    fn rejects_bad_rail_head_distance() {
        assert!(CantFunction::builder(0.0, 0.0).constant(10.0, 0.0, 0.0).build().is_err());
        assert!(CantFunction::builder(0.0, 1.0).constant(10.0, 1.2, 0.0).build().is_err());
    }
}
