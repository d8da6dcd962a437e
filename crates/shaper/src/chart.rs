use crate::dispersion::DispersionShape;
use crate::ShapedSeries;
use gradinsight_protocol::{DataSource, Provenance};
use serde::Serialize;

/// Line colours, cycled per dataset.
pub const PALETTE: [&str; 6] = [
    "#2563eb", // blue
    "#16a34a", // green
    "#dc2626", // red
    "#7c3aed", // purple
    "#ea580c", // orange
    "#0891b2", // cyan
];

const P25_COLOR: &str = "#93c5fd";
const MEDIAN_COLOR: &str = "#2563eb";
const P75_COLOR: &str = "#1e3a8a";
const SALARY_AXIS_TITLE: &str = "Monthly Salary (SGD)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Line,
    Bar,
}

/// Style of the line segment that ends at a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentStyle {
    /// No segment ends at the first point.
    Undefined,
    Solid,
    Dashed,
}

/// Axis label; wrapped labels render as several lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Label {
    Single(String),
    Lines(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisOptions {
    pub begin_at_zero: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub label: String,
    pub data: Vec<Option<f64>>,
    pub color: &'static str,
    pub span_gaps: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub segments: Vec<SegmentStyle>,
    /// Per-point tooltip footer naming the data's provenance.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub footers: Vec<String>,
}

/// Input for the external charting library.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartConfig {
    pub kind: ChartKind,
    pub labels: Vec<Label>,
    pub datasets: Vec<Dataset>,
    pub y_axis: AxisOptions,
}

/// Dash style per point: the segment ending at point `i` is dashed when that point is predicted.
///
/// Unknown provenance yields an empty pattern, which draws every segment solid.
pub fn dash_pattern(provenance: &Provenance, len: usize) -> Vec<SegmentStyle> {
    if provenance.is_unknown() {
        return Vec::new();
    }
    (0..len)
        .map(|index| {
            if index == 0 {
                SegmentStyle::Undefined
            } else if provenance.is_predicted(index) {
                SegmentStyle::Dashed
            } else {
                SegmentStyle::Solid
            }
        })
        .collect()
}

fn footers(provenance: &Provenance, len: usize) -> Vec<String> {
    if provenance.is_unknown() {
        return Vec::new();
    }
    (0..len)
        .map(|index| match provenance.source_at(index) {
            Some(DataSource::Predicted) => "(AI Predicted Values)".to_string(),
            Some(DataSource::Official) | None => "(Official Data)".to_string(),
        })
        .collect()
}

fn line_dataset(index: usize, series: &ShapedSeries, with_footers: bool) -> Dataset {
    let len = series.data.len();
    Dataset {
        label: series.label.clone(),
        data: series.data.clone(),
        color: PALETTE[index % PALETTE.len()],
        span_gaps: false,
        segments: dash_pattern(&series.provenance, len),
        footers: if with_footers {
            footers(&series.provenance, len)
        } else {
            Vec::new()
        },
    }
}

fn year_labels(years: &[i32]) -> Vec<Label> {
    years.iter().map(|y| Label::Single(y.to_string())).collect()
}

/// Employment rate lines on a 0-100 axis. `None` when there is nothing to draw.
pub fn employment_chart(series: &[ShapedSeries]) -> Option<ChartConfig> {
    let first = series.first()?;
    Some(ChartConfig {
        kind: ChartKind::Line,
        labels: year_labels(&first.years),
        datasets: series
            .iter()
            .enumerate()
            .map(|(index, s)| line_dataset(index, s, false))
            .collect(),
        y_axis: AxisOptions {
            begin_at_zero: true,
            max: Some(100.0),
            title: None,
        },
    })
}

/// Salary trend lines with provenance footers. `None` when there is nothing to draw.
pub fn salary_chart(series: &[ShapedSeries]) -> Option<ChartConfig> {
    let first = series.first()?;
    Some(ChartConfig {
        kind: ChartKind::Line,
        labels: year_labels(&first.years),
        datasets: series
            .iter()
            .enumerate()
            .map(|(index, s)| line_dataset(index, s, true))
            .collect(),
        y_axis: AxisOptions {
            begin_at_zero: false,
            max: None,
            title: Some(SALARY_AXIS_TITLE.to_string()),
        },
    })
}

/// Grouped percentile bars. `None` when the reply had no series.
pub fn dispersion_chart(shape: &DispersionShape) -> Option<ChartConfig> {
    if shape.is_empty() {
        return None;
    }
    let bar = |label: &str, data: &[Option<f64>], color: &'static str| Dataset {
        label: label.to_string(),
        data: data.to_vec(),
        color,
        span_gaps: false,
        segments: Vec::new(),
        footers: Vec::new(),
    };
    Some(ChartConfig {
        kind: ChartKind::Bar,
        labels: shape
            .labels
            .iter()
            .map(|lines| match lines.as_slice() {
                [single] => Label::Single(single.clone()),
                _ => Label::Lines(lines.clone()),
            })
            .collect(),
        datasets: vec![
            bar("25th Percentile", &shape.p25, P25_COLOR),
            bar("Median", &shape.median, MEDIAN_COLOR),
            bar("75th Percentile", &shape.p75, P75_COLOR),
        ],
        y_axis: AxisOptions {
            begin_at_zero: true,
            max: None,
            title: Some(SALARY_AXIS_TITLE.to_string()),
        },
    })
}
