use crate::options::{ProvenancePolicy, ShapingOptions};
use crate::ShapedSeries;
use gradinsight_protocol::{AnalyticsSeries, DataSource, Provenance};
use gradinsight_selection::DisplayMode;
use std::collections::HashMap;

/// Shape employment series for the given display mode.
pub fn shape_employment(
    series: &[AnalyticsSeries],
    mode: DisplayMode,
    options: &ShapingOptions,
) -> Vec<ShapedSeries> {
    match mode {
        DisplayMode::Individual => series.iter().map(individual).collect(),
        DisplayMode::Aggregate => aggregate_by_university(series, options.provenance),
    }
}

fn individual(series: &AnalyticsSeries) -> ShapedSeries {
    ShapedSeries {
        label: format!("{} ({})", series.degree, series.university),
        years: series.years.clone(),
        data: series.overall_employment_rate.clone(),
        provenance: series.provenance.clone(),
    }
}

/// Collapse per-degree series into one line per university.
///
/// Each point is the unweighted mean of the non-null values at that index,
/// or `None` when every member is null there. The year axis comes from the
/// first member of each group; groups keep their order of first appearance.
pub fn aggregate_by_university(
    series: &[AnalyticsSeries],
    policy: ProvenancePolicy,
) -> Vec<ShapedSeries> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<&AnalyticsSeries>> = HashMap::new();

    for item in series {
        groups
            .entry(item.university.as_str())
            .or_insert_with(|| {
                order.push(item.university.as_str());
                Vec::new()
            })
            .push(item);
    }

    let shaped: Vec<ShapedSeries> = order
        .into_iter()
        .filter_map(|university| {
            groups
                .get(university)
                .map(|members| aggregate_group(university, members, policy))
        })
        .collect();

    log::debug!(
        "Aggregated {} series into {} university lines",
        series.len(),
        shaped.len()
    );

    shaped
}

fn aggregate_group(
    university: &str,
    members: &[&AnalyticsSeries],
    policy: ProvenancePolicy,
) -> ShapedSeries {
    let years = members
        .first()
        .map(|first| first.years.clone())
        .unwrap_or_default();

    let mut data = Vec::with_capacity(years.len());
    let mut sources = Vec::with_capacity(years.len());

    for index in 0..years.len() {
        let mut values = Vec::with_capacity(members.len());
        let mut predicted = false;
        for member in members {
            if let Some(Some(value)) = member.overall_employment_rate.get(index) {
                values.push(*value);
                predicted |= member.provenance.is_predicted(index);
            }
        }
        data.push(mean(&mut values));
        sources.push(if predicted {
            DataSource::Predicted
        } else {
            DataSource::Official
        });
    }

    let any_known = members.iter().any(|member| !member.provenance.is_unknown());
    let provenance = match policy {
        ProvenancePolicy::AnyPredicted if any_known => Provenance::Known(sources),
        ProvenancePolicy::AnyPredicted | ProvenancePolicy::Drop => Provenance::Unknown,
    };

    ShapedSeries {
        label: university.to_string(),
        years,
        data,
        provenance,
    }
}

// Summed in sorted order so the result does not depend on member order.
fn mean(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let sum: f64 = values.iter().sum();
    Some(sum / values.len() as f64)
}
