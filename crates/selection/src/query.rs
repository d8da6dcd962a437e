use crate::error::{Result, SelectionError};
use crate::state::SelectionState;
use crate::thresholds::{DisplayMode, Thresholds};
use gradinsight_protocol::{
    AnalyticsKind, DispersionRequest, EmploymentRequest, GroupBy, SalaryComparisonRequest,
};
use serde::Serialize;

/// A well-formed request for one analytics endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "request", rename_all = "kebab-case")]
pub enum AnalyticsRequest {
    Employment(EmploymentRequest),
    SalaryComparison(SalaryComparisonRequest),
    SalaryDispersion(DispersionRequest),
}

impl AnalyticsRequest {
    pub fn kind(&self) -> AnalyticsKind {
        match self {
            AnalyticsRequest::Employment(_) => AnalyticsKind::Employment,
            AnalyticsRequest::SalaryComparison(_) => AnalyticsKind::SalaryComparison,
            AnalyticsRequest::SalaryDispersion(_) => AnalyticsKind::SalaryDispersion,
        }
    }
}

/// Guidance shown instead of calling the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstraintNotice {
    pub kind: AnalyticsKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryPlan {
    /// Send `request`; `note` is informational text for the user.
    Ready {
        request: AnalyticsRequest,
        note: Option<String>,
    },
    /// The selection violates a view constraint; the service is not called.
    Blocked(ConstraintNotice),
}

impl QueryPlan {
    pub fn request(&self) -> Option<&AnalyticsRequest> {
        match self {
            QueryPlan::Ready { request, .. } => Some(request),
            QueryPlan::Blocked(_) => None,
        }
    }
}

/// Turns a selection snapshot into the request each endpoint expects.
#[derive(Debug, Clone, Copy)]
pub struct QueryBuilder<'a> {
    thresholds: &'a Thresholds,
}

impl<'a> QueryBuilder<'a> {
    pub fn new(thresholds: &'a Thresholds) -> Self {
        Self { thresholds }
    }

    pub fn build(&self, state: &SelectionState, kind: AnalyticsKind) -> Result<QueryPlan> {
        match kind {
            AnalyticsKind::Employment => self.employment(state),
            AnalyticsKind::SalaryComparison => Ok(self.salary_comparison(state)),
            AnalyticsKind::SalaryDispersion => Ok(self.salary_dispersion(state)),
        }
    }

    fn employment(&self, state: &SelectionState) -> Result<QueryPlan> {
        if state.selected_courses.is_empty() {
            return Err(SelectionError::EmptySelection);
        }
        let count = state.selected_courses.len();
        let note = (self.thresholds.display_mode(count) == DisplayMode::Aggregate).then(|| {
            format!("{count} courses selected. Showing averages per university for clarity.")
        });
        let request = EmploymentRequest {
            universities: state.selected_universities.iter().cloned().collect(),
            degrees: state.selected_courses.iter().cloned().collect(),
            start_year: state.years.start,
            end_year: state.years.end,
            enable_prediction: state.enable_prediction,
        };
        Ok(QueryPlan::Ready {
            request: AnalyticsRequest::Employment(request),
            note,
        })
    }

    fn salary_comparison(&self, state: &SelectionState) -> QueryPlan {
        let comparison = &state.comparison;
        let count = comparison.items.len();
        let aggregate = match comparison.group_by {
            GroupBy::Degree => count > self.thresholds.salary_aggregate_min,
            GroupBy::University => false,
        };
        let note = (count == 0).then(|| {
            format!(
                "No items selected, showing Top 5 by {}.",
                comparison.group_by
            )
        });
        let request = SalaryComparisonRequest {
            group_by: comparison.group_by,
            items: comparison.items.iter().cloned().collect(),
            start_year: state.years.start,
            end_year: state.years.end,
            enable_prediction: state.enable_prediction,
            aggregate,
        };
        QueryPlan::Ready {
            request: AnalyticsRequest::SalaryComparison(request),
            note,
        }
    }

    fn salary_dispersion(&self, state: &SelectionState) -> QueryPlan {
        let degree_count = state.selected_courses.len();
        let cap = self.thresholds.dispersion_max_degrees;
        if degree_count > cap {
            return QueryPlan::Blocked(ConstraintNotice {
                kind: AnalyticsKind::SalaryDispersion,
                message: format!(
                    "Salary dispersion compares at most {cap} degrees; {degree_count} are selected. Deselect some degrees to view it."
                ),
            });
        }

        let note = (degree_count == 0 && state.selected_universities.is_empty())
            .then(|| "No items selected, showing Top 5 by degree.".to_string());
        let request = DispersionRequest {
            universities: state.selected_universities.iter().cloned().collect(),
            degrees: state.selected_courses.iter().cloned().collect(),
            year: state.dispersion_year,
        };
        QueryPlan::Ready {
            request: AnalyticsRequest::SalaryDispersion(request),
            note,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SelectionMachine;
    use gradinsight_catalog::CatalogIndex;
    use gradinsight_protocol::{MetadataRow, YearsRange};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn machine_with_degrees(count: usize) -> SelectionMachine {
        let rows: Vec<MetadataRow> = (1..=count)
            .map(|i| MetadataRow::new("U1", format!("D{i}")))
            .collect();
        SelectionMachine::new(
            Arc::new(CatalogIndex::build(&rows)),
            YearsRange::new(2013, 2023).unwrap(),
            Thresholds::default(),
        )
    }

    fn plan(m: &SelectionMachine, kind: AnalyticsKind) -> Result<QueryPlan> {
        QueryBuilder::new(m.thresholds()).build(m.state(), kind)
    }

    #[test]
    fn employment_request_mirrors_selection() {
        let mut m = machine_with_degrees(3);
        m.set_universities(["U1"]).unwrap();
        m.set_courses(["D2", "D1"]).unwrap();
        m.set_years(2015, 2020).unwrap();
        m.set_prediction(true);

        let plan = plan(&m, AnalyticsKind::Employment).unwrap();
        assert_eq!(
            plan.request(),
            Some(&AnalyticsRequest::Employment(EmploymentRequest {
                universities: vec!["U1".into()],
                degrees: vec!["D1".into(), "D2".into()],
                start_year: 2015,
                end_year: 2020,
                enable_prediction: true,
            }))
        );
    }

    #[test]
    fn aggregate_employment_explains_averages() {
        let mut m = machine_with_degrees(7);
        m.set_universities(["U1"]).unwrap();
        m.set_courses(["D1", "D2", "D3", "D4", "D5", "D6"]).unwrap();
        let QueryPlan::Ready { note, .. } = plan(&m, AnalyticsKind::Employment).unwrap() else {
            panic!("expected employment request");
        };
        assert_eq!(note, None);

        m.select_all_courses();
        let QueryPlan::Ready { note, .. } = plan(&m, AnalyticsKind::Employment).unwrap() else {
            panic!("expected employment request");
        };
        assert_eq!(
            note.as_deref(),
            Some("7 courses selected. Showing averages per university for clarity.")
        );
    }

    #[test]
    fn employment_requires_courses() {
        let mut m = machine_with_degrees(3);
        m.set_universities(["U1"]).unwrap();
        assert_eq!(
            plan(&m, AnalyticsKind::Employment).unwrap_err(),
            SelectionError::EmptySelection
        );
    }

    #[test]
    fn degree_comparison_aggregates_above_five_items() {
        let mut m = machine_with_degrees(6);
        m.set_group_by(GroupBy::Degree);
        m.set_comparison_items(["D1", "D2", "D3", "D4", "D5"]).unwrap();
        let Some(AnalyticsRequest::SalaryComparison(five)) =
            plan(&m, AnalyticsKind::SalaryComparison).unwrap().request().cloned()
        else {
            panic!("expected comparison request");
        };
        assert!(!five.aggregate);

        m.set_comparison_items(["D1", "D2", "D3", "D4", "D5", "D6"]).unwrap();
        let Some(AnalyticsRequest::SalaryComparison(six)) =
            plan(&m, AnalyticsKind::SalaryComparison).unwrap().request().cloned()
        else {
            panic!("expected comparison request");
        };
        assert!(six.aggregate);
    }

    #[test]
    fn university_comparison_never_aggregates() {
        let rows: Vec<MetadataRow> = (1..=8)
            .map(|i| MetadataRow::new(format!("U{i}"), "D1"))
            .collect();
        let mut m = SelectionMachine::new(
            Arc::new(CatalogIndex::build(&rows)),
            YearsRange::new(2013, 2023).unwrap(),
            Thresholds::default(),
        );
        m.set_comparison_items(rows.iter().map(|r| r.university.clone()))
            .unwrap();
        let Some(AnalyticsRequest::SalaryComparison(request)) =
            plan(&m, AnalyticsKind::SalaryComparison).unwrap().request().cloned()
        else {
            panic!("expected comparison request");
        };
        assert!(!request.aggregate);
        assert_eq!(request.items.len(), 8);
    }

    #[test]
    fn empty_comparison_falls_back_to_top_n() {
        let m = machine_with_degrees(2);
        match plan(&m, AnalyticsKind::SalaryComparison).unwrap() {
            QueryPlan::Ready {
                request: AnalyticsRequest::SalaryComparison(request),
                note,
            } => {
                assert!(request.items.is_empty());
                assert_eq!(
                    note.as_deref(),
                    Some("No items selected, showing Top 5 by university.")
                );
            }
            other => panic!("unexpected plan: {other:?}"),
        }
    }

    #[test]
    fn dispersion_rejects_eight_degrees_locally() {
        let mut m = machine_with_degrees(8);
        m.set_universities(["U1"]).unwrap();
        m.select_all_courses();
        match plan(&m, AnalyticsKind::SalaryDispersion).unwrap() {
            QueryPlan::Blocked(notice) => {
                assert_eq!(notice.kind, AnalyticsKind::SalaryDispersion);
                assert!(notice.message.contains("at most 7 degrees"));
            }
            other => panic!("expected local rejection, got {other:?}"),
        }
    }

    #[test]
    fn dispersion_accepts_seven_degrees_for_single_year() {
        let mut m = machine_with_degrees(7);
        m.set_universities(["U1"]).unwrap();
        m.select_all_courses();
        m.set_dispersion_year(2019);
        let Some(AnalyticsRequest::SalaryDispersion(request)) =
            plan(&m, AnalyticsKind::SalaryDispersion).unwrap().request().cloned()
        else {
            panic!("expected dispersion request");
        };
        assert_eq!(request.degrees.len(), 7);
        assert_eq!(request.year, 2019);
    }
}
