//! Station-based alignment evaluation.
//!
//! Horizontal curves, vertical profiles and cant are piecewise functions of a
//! shared station coordinate. [`alignment::Alignment`] composes them into a 3D
//! frame, and [`placement::AlignmentPlacementResolver`] turns point addresses
//! (distance along plus offsets) on any [`placement::BasisCurve`] into rigid
//! 4x4 transforms.

pub mod alignment;
pub mod description;
pub mod error;
pub mod geometry;
pub mod io;
pub mod piecewise;
pub mod placement;
pub mod polyline;
pub mod segment;
pub mod settings;
pub mod superelevation;
pub mod transition;
pub mod variable_offset;

pub use alignment::{Alignment, AlignmentState, HorizontalAlignmentCurve, VerticalAlignmentCurve};
pub use error::{Error, Result};
pub use piecewise::{Extent, PiecewiseStationFunction};
pub use placement::{
    AlignmentPlacementResolver, BasisCurve, DistanceMeasure, OffsetFrame, PointAddress,
    SectionFrame,
};
pub use polyline::PolylineCurve;
pub use settings::EvaluationSettings;
pub use superelevation::{CantFunction, CantState};
pub use variable_offset::{OffsetCurveByDistances, OffsetPoint, OffsetProfile};
