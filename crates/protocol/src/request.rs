use serde::{Deserialize, Serialize};

/// Body of `POST /analytics/employment`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct EmploymentRequest {
    pub universities: Vec<String>,
    pub degrees: Vec<String>,
    pub start_year: i32,
    pub end_year: i32,
    pub enable_prediction: bool,
}

/// What the salary comparison groups its series by.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    #[default]
    University,
    Degree,
}

impl GroupBy {
    pub const fn as_str(self) -> &'static str {
        match self {
            GroupBy::University => "university",
            GroupBy::Degree => "degree",
        }
    }

    /// Query parameter that carries the selected items for this grouping.
    pub const fn items_param(self) -> &'static str {
        match self {
            GroupBy::University => "universities",
            GroupBy::Degree => "degrees",
        }
    }
}

impl std::fmt::Display for GroupBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Query of `GET /analytics/salary-comparison`.
///
/// An empty `items` list is sent without any item parameter so the service
/// falls back to its default top-N set.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SalaryComparisonRequest {
    pub group_by: GroupBy,
    pub items: Vec<String>,
    pub start_year: i32,
    pub end_year: i32,
    pub enable_prediction: bool,
    pub aggregate: bool,
}

impl SalaryComparisonRequest {
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("group_by", self.group_by.as_str().to_string())];
        let param = self.group_by.items_param();
        pairs.extend(self.items.iter().map(|item| (param, item.clone())));
        pairs.push(("start_year", self.start_year.to_string()));
        pairs.push(("end_year", self.end_year.to_string()));
        pairs.push(("enable_prediction", self.enable_prediction.to_string()));
        pairs.push(("aggregate", self.aggregate.to_string()));
        pairs
    }
}

/// Body of `POST /analytics/salary-dispersion`. Empty filters are omitted.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct DispersionRequest {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub universities: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub degrees: Vec<String>,
    pub year: i32,
}
