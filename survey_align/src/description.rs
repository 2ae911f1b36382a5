//! Serializable description of an alignment, the input format of the CLI.

use serde::{Deserialize, Serialize};

use crate::alignment::{Alignment, HorizontalAlignmentCurve, VerticalAlignmentCurve};
use crate::error::Result;
use crate::geometry::Point;
use crate::piecewise::Extent;
use crate::segment::{CantGeometry, HorizontalGeometry, VerticalGeometry};
use crate::settings::EvaluationSettings;
use crate::superelevation::CantFunction;

/// A horizontal segment: signed length plus shape. A `null` length is unbounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizontalSegmentDescription {
    #[serde(with = "crate::segment::infinite_as_null")]
    pub length: f64,
    #[serde(flatten)]
    pub geometry: HorizontalGeometry,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizontalDescription {
    #[serde(default)]
    pub start_station: f64,
    pub start: Point,
    /// Start heading in radians, counter-clockwise from +X.
    #[serde(default)]
    pub heading: f64,
    pub segments: Vec<HorizontalSegmentDescription>,
    #[serde(flatten)]
    pub extent: Extent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerticalSegmentDescription {
    #[serde(with = "crate::segment::infinite_as_null")]
    pub length: f64,
    #[serde(flatten)]
    pub geometry: VerticalGeometry,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerticalDescription {
    #[serde(default)]
    pub start_station: f64,
    pub start_elevation: f64,
    pub segments: Vec<VerticalSegmentDescription>,
    #[serde(flatten)]
    pub extent: Extent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CantSegmentDescription {
    #[serde(with = "crate::segment::infinite_as_null")]
    pub length: f64,
    #[serde(flatten)]
    pub geometry: CantGeometry,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CantDescription {
    #[serde(default)]
    pub start_station: f64,
    pub rail_head_distance: f64,
    pub segments: Vec<CantSegmentDescription>,
    #[serde(flatten)]
    pub extent: Extent,
}

/// Horizontal curve with optional profile and cant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentDescription {
    pub horizontal: HorizontalDescription,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical: Option<VerticalDescription>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cant: Option<CantDescription>,
}

impl HorizontalDescription {
    pub fn build(&self, settings: EvaluationSettings) -> Result<HorizontalAlignmentCurve> {
        self.segments
            .iter()
            .fold(
                HorizontalAlignmentCurve::builder(self.start_station, self.start, self.heading),
                |b, s| b.segment(s.length, s.geometry),
            )
            .extent(self.extent)
            .settings(settings)
            .build()
    }
}

impl VerticalDescription {
    pub fn build(&self, settings: EvaluationSettings) -> Result<VerticalAlignmentCurve> {
        self.segments
            .iter()
            .fold(
                VerticalAlignmentCurve::builder(self.start_station, self.start_elevation),
                |b, s| b.segment(s.length, s.geometry),
            )
            .extent(self.extent)
            .settings(settings)
            .build()
    }
}

impl CantDescription {
    pub fn build(&self, settings: EvaluationSettings) -> Result<CantFunction> {
        self.segments
            .iter()
            .fold(
                CantFunction::builder(self.start_station, self.rail_head_distance),
                |b, s| b.segment(s.length, s.geometry),
            )
            .extent(self.extent)
            .settings(settings)
            .build()
    }
}

impl AlignmentDescription {
    /// Builds every part; the first construction error is returned.
    pub fn build(&self, settings: EvaluationSettings) -> Result<Alignment> {
        let mut alignment = Alignment::new(self.horizontal.build(settings)?);
        if let Some(vertical) = &self.vertical {
            alignment = alignment.with_vertical(vertical.build(settings)?);
        }
        if let Some(cant) = &self.cant {
            alignment = alignment.with_cant(cant.build(settings)?);
        }
        Ok(alignment)
    }
}
