use serde::{Deserialize, Serialize};

/// Whether a yearly value was recorded by the survey or forecast by a model.
///
/// Anything other than `"predicted"` is treated as official data.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(from = "String", into = "&'static str")]
pub enum DataSource {
    Official,
    Predicted,
}

impl From<String> for DataSource {
    fn from(raw: String) -> Self {
        if raw.eq_ignore_ascii_case("predicted") {
            DataSource::Predicted
        } else {
            DataSource::Official
        }
    }
}

impl From<DataSource> for &'static str {
    fn from(source: DataSource) -> Self {
        match source {
            DataSource::Official => "official",
            DataSource::Predicted => "predicted",
        }
    }
}

/// Per-point provenance of a series.
///
/// Older service builds omit `data_source` entirely; that decodes to `Unknown`
/// rather than being guessed as official.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(from = "Option<Vec<DataSource>>", into = "Option<Vec<DataSource>>")]
pub enum Provenance {
    Known(Vec<DataSource>),
    #[default]
    Unknown,
}

impl Provenance {
    pub fn is_unknown(&self) -> bool {
        matches!(self, Provenance::Unknown)
    }

    /// Source of point `index`, if provenance is known and covers it.
    pub fn source_at(&self, index: usize) -> Option<DataSource> {
        match self {
            Provenance::Known(sources) => sources.get(index).copied(),
            Provenance::Unknown => None,
        }
    }

    pub fn is_predicted(&self, index: usize) -> bool {
        self.source_at(index) == Some(DataSource::Predicted)
    }
}

impl From<Option<Vec<DataSource>>> for Provenance {
    fn from(raw: Option<Vec<DataSource>>) -> Self {
        match raw {
            Some(sources) => Provenance::Known(sources),
            None => Provenance::Unknown,
        }
    }
}

impl From<Provenance> for Option<Vec<DataSource>> {
    fn from(provenance: Provenance) -> Self {
        match provenance {
            Provenance::Known(sources) => Some(sources),
            Provenance::Unknown => None,
        }
    }
}

/// Employment rate of one (university, degree) pair over the requested years.
///
/// `years`, `overall_employment_rate` and the provenance list are parallel.
/// A `None` rate is a year without data and renders as a gap.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AnalyticsSeries {
    pub university: String,
    pub degree: String,
    pub years: Vec<i32>,
    pub overall_employment_rate: Vec<Option<f64>>,
    #[serde(default, rename = "data_source", skip_serializing_if = "Provenance::is_unknown")]
    pub provenance: Provenance,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct EmploymentData {
    pub series: Vec<AnalyticsSeries>,
}

/// Mean and median salary of one compared item, aligned with the reply's `years`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SalarySeries {
    pub label: String,
    #[serde(default)]
    pub mean: Vec<Option<f64>>,
    #[serde(default)]
    pub median: Vec<Option<f64>>,
    #[serde(default, rename = "data_source", skip_serializing_if = "Provenance::is_unknown")]
    pub provenance: Provenance,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct SalaryComparisonData {
    #[serde(default)]
    pub years: Vec<i32>,
    pub series: Vec<SalarySeries>,
}

/// Salary percentiles for one label in a single year.
///
/// `p25 <= median <= p75` is expected from upstream but not checked here.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SalaryDispersionSeries {
    pub label: String,
    pub p25: Option<f64>,
    pub median: Option<f64>,
    pub p75: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct DispersionData {
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub series: Vec<SalaryDispersionSeries>,
}
