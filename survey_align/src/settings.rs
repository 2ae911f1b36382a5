//! Numeric settings shared by curve builders and the placement resolver.

use crate::error::{Error, Result};

/// Upper bound on quadrature panels per spiral evaluation.
pub const MAX_QUADRATURE_PANELS: usize = 256;

/// Tolerances and quadrature resolution used while building and evaluating curves.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EvaluationSettings {
    /// Allowed gap or overlap between consecutive segment stations, and the
    /// slack accepted at the edges of a closed domain.
    pub station_tolerance: f64,
    /// Position/heading mismatch at an explicit-anchor join that triggers a warning.
    pub continuity_tolerance: f64,
    /// Allowed deviation of a resolved rotation from an orthonormal, right-handed basis.
    pub determinant_tolerance: f64,
    /// Gauss-Legendre panels used to integrate spiral positions.
    pub quadrature_panels: usize,
}

impl Default for EvaluationSettings {
    fn default() -> Self {
        Self {
            station_tolerance: 1e-6,
            continuity_tolerance: 1e-4,
            determinant_tolerance: 1e-6,
            quadrature_panels: 16,
        }
    }
}

impl EvaluationSettings {
    /// Checks that every tolerance is finite and non-negative and the panel count is usable.
    pub fn validate(&self) -> Result<()> {
        let tolerances = [
            ("station_tolerance", self.station_tolerance),
            ("continuity_tolerance", self.continuity_tolerance),
            ("determinant_tolerance", self.determinant_tolerance),
        ];
        for (name, value) in tolerances {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::construction(format!(
                    "{} must be a finite non-negative number, got {}",
                    name, value
                )));
            }
        }
        if self.quadrature_panels == 0 || self.quadrature_panels > MAX_QUADRATURE_PANELS {
            return Err(Error::construction(format!(
                "quadrature_panels must be in 1..={}, got {}",
                MAX_QUADRATURE_PANELS, self.quadrature_panels
            )));
        }
        Ok(())
    }

    /// Loads settings from a JSON file. Missing fields keep their defaults.
    pub fn load(path: &str) -> std::io::Result<Self> {
        let data = crate::io::read_to_string(path)?;
        let settings: EvaluationSettings = serde_json::from_str(&data)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        settings
            .validate()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        Ok(settings)
    }
}
