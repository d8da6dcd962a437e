//! # GradInsight Shaper
//!
//! Post-processing of analytics replies into chart-ready data.
//!
//! ```text
//! AnalyticsSeries[] ──> employment::shape_employment ──┐
//!                         ├─ individual: one line per (university, degree)
//!                         └─ aggregate:  per-university mean of non-null points
//! SalaryComparisonData ─> salary::shape_salary ────────┤
//! DispersionData ───────> dispersion::shape_dispersion ┤
//!                                                      v
//!                                  chart::*_chart -> ChartConfig -> ChartHost
//! ```
//!
//! Provenance becomes per-segment dash styles; nulls stay nulls so the chart
//! draws gaps instead of interpolating.

mod chart;
mod dispersion;
mod employment;
mod host;
mod options;
mod salary;

pub use chart::{
    dash_pattern, dispersion_chart, employment_chart, salary_chart, AxisOptions, ChartConfig,
    ChartKind, Dataset, Label, SegmentStyle, PALETTE,
};
pub use dispersion::{shape_dispersion, wrap_label, DispersionShape};
pub use employment::{aggregate_by_university, shape_employment};
pub use host::{ChartBackend, ChartHost};
pub use options::{ProvenancePolicy, ShapingOptions};
pub use salary::shape_salary;

use gradinsight_protocol::Provenance;
use serde::Serialize;

/// One line of a chart before styling.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShapedSeries {
    pub label: String,
    pub years: Vec<i32>,
    pub data: Vec<Option<f64>>,
    pub provenance: Provenance,
}
