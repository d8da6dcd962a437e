use anyhow::Result;
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub mod request;
pub mod series;

pub use request::{DispersionRequest, EmploymentRequest, GroupBy, SalaryComparisonRequest};
pub use series::{
    AnalyticsSeries, DataSource, DispersionData, EmploymentData, Provenance,
    SalaryComparisonData, SalaryDispersionSeries, SalarySeries,
};

/// One row of `/metadata/full`: a degree offered by a university.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MetadataRow {
    pub university: String,
    pub degree: String,
}

impl MetadataRow {
    pub fn new(university: impl Into<String>, degree: impl Into<String>) -> Self {
        Self {
            university: university.into(),
            degree: degree.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy)]
struct RawYears {
    min: i32,
    max: i32,
}

/// Inclusive survey year bounds reported by `/metadata/years`. Always `min <= max`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(try_from = "RawYears", into = "RawYears")]
pub struct YearsRange {
    min: i32,
    max: i32,
}

impl TryFrom<RawYears> for YearsRange {
    type Error = anyhow::Error;

    fn try_from(raw: RawYears) -> Result<Self> {
        Self::new(raw.min, raw.max)
    }
}

impl From<YearsRange> for RawYears {
    fn from(range: YearsRange) -> Self {
        Self {
            min: range.min,
            max: range.max,
        }
    }
}

impl YearsRange {
    pub fn new(min: i32, max: i32) -> Result<Self> {
        if min > max {
            anyhow::bail!("invalid years range (min={min}, max={max})");
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> i32 {
        self.min
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn clamp(&self, year: i32) -> i32 {
        year.clamp(self.min, self.max)
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.min..=self.max).contains(&year)
    }
}

/// The three analytics views the service offers.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum AnalyticsKind {
    Employment,
    SalaryComparison,
    SalaryDispersion,
}

impl AnalyticsKind {
    pub const ALL: [AnalyticsKind; 3] = [
        AnalyticsKind::Employment,
        AnalyticsKind::SalaryComparison,
        AnalyticsKind::SalaryDispersion,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            AnalyticsKind::Employment => "employment",
            AnalyticsKind::SalaryComparison => "salary-comparison",
            AnalyticsKind::SalaryDispersion => "salary-dispersion",
        }
    }

    /// Path of the endpoint serving this kind, relative to the base URL.
    pub const fn endpoint(self) -> &'static str {
        match self {
            AnalyticsKind::Employment => "/analytics/employment",
            AnalyticsKind::SalaryComparison => "/analytics/salary-comparison",
            AnalyticsKind::SalaryDispersion => "/analytics/salary-dispersion",
        }
    }

    pub const fn index(self) -> usize {
        match self {
            AnalyticsKind::Employment => 0,
            AnalyticsKind::SalaryComparison => 1,
            AnalyticsKind::SalaryDispersion => 2,
        }
    }
}

impl std::fmt::Display for AnalyticsKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Analytics replies are either the payload or `{"error": "..."}` with a 200 status.
///
/// Only a string `error` field selects `Failure`; anything else must decode as
/// `T`, and its decoding error is kept.
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum Envelope<T> {
    Failure { error: String },
    Success(T),
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Envelope<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        if let Some(error) = value.get("error").and_then(Value::as_str) {
            return Ok(Envelope::Failure {
                error: error.to_string(),
            });
        }
        T::deserialize(value)
            .map(Envelope::Success)
            .map_err(D::Error::custom)
    }
}

impl<T> Envelope<T> {
    pub fn into_result(self) -> std::result::Result<T, String> {
        match self {
            Envelope::Failure { error } => Err(error),
            Envelope::Success(data) => Ok(data),
        }
    }
}

pub fn serialize_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn years_range_rejects_inverted_bounds() {
        assert!(YearsRange::new(2023, 2013).is_err());
        let range = YearsRange::new(2013, 2023).unwrap();
        assert_eq!(range.clamp(2030), 2023);
        assert_eq!(range.clamp(1999), 2013);
        assert!(range.contains(2013));
        assert!(!range.contains(2024));
    }

    #[test]
    fn years_range_decoding_enforces_order() {
        let err = serde_json::from_str::<YearsRange>(r#"{"min":2023,"max":2013}"#).unwrap_err();
        assert!(err.to_string().contains("invalid years range"), "{err}");

        let range: YearsRange = serde_json::from_str(r#"{"min":2013,"max":2023}"#).unwrap();
        assert_eq!((range.min(), range.max()), (2013, 2023));
        assert_eq!(
            serde_json::to_value(range).unwrap(),
            serde_json::json!({"min": 2013, "max": 2023})
        );
    }

    #[test]
    fn envelope_prefers_error_field() {
        let raw = r#"{"error":"No data found for university: XYZ"}"#;
        let envelope: Envelope<EmploymentData> = serde_json::from_str(raw).unwrap();
        assert_eq!(
            envelope.into_result().unwrap_err(),
            "No data found for university: XYZ"
        );
    }

    #[test]
    fn envelope_decodes_success_payload() {
        let raw = r#"{"series":[]}"#;
        let envelope: Envelope<EmploymentData> = serde_json::from_str(raw).unwrap();
        assert!(envelope.into_result().unwrap().series.is_empty());
    }

    #[test]
    fn envelope_rejects_bodies_without_payload() {
        for raw in [r#"{"message":"Internal Server Error"}"#, r#"{"error":null}"#] {
            let err = serde_json::from_str::<Envelope<EmploymentData>>(raw).unwrap_err();
            assert!(err.to_string().contains("missing field `series`"), "{raw}: {err}");
        }
    }

    #[test]
    fn envelope_keeps_payload_decoding_error() {
        let err = serde_json::from_str::<Envelope<EmploymentData>>(r#"{"series":"oops"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("invalid type"), "{err}");
        assert!(!err.to_string().contains("untagged"));
    }

    #[test]
    fn kinds_have_distinct_indices() {
        let mut seen = [false; 3];
        for kind in AnalyticsKind::ALL {
            assert!(!seen[kind.index()]);
            seen[kind.index()] = true;
        }
    }
}
