use crate::ShapedSeries;
use gradinsight_protocol::SalaryComparisonData;

/// Split every compared item into a median line and a mean line.
///
/// Both lines share the item's provenance, so predicted years are dashed on each.
pub fn shape_salary(data: &SalaryComparisonData) -> Vec<ShapedSeries> {
    data.series
        .iter()
        .flat_map(|series| {
            [
                ShapedSeries {
                    label: format!("{} (Median)", series.label),
                    years: data.years.clone(),
                    data: series.median.clone(),
                    provenance: series.provenance.clone(),
                },
                ShapedSeries {
                    label: format!("{} (Mean)", series.label),
                    years: data.years.clone(),
                    data: series.mean.clone(),
                    provenance: series.provenance.clone(),
                },
            ]
        })
        .collect()
}
