use crate::error::{Result, SelectionError};
use crate::thresholds::{DisplayMode, Thresholds};
use gradinsight_catalog::CatalogIndex;
use gradinsight_protocol::{AnalyticsKind, GroupBy, YearsRange};
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Analytics kinds whose results a transition made obsolete.
pub type Invalidated = &'static [AnalyticsKind];

const COURSE_VIEWS: Invalidated = &[AnalyticsKind::Employment, AnalyticsKind::SalaryDispersion];
const RANGE_VIEWS: Invalidated = &[AnalyticsKind::Employment, AnalyticsKind::SalaryComparison];
const COMPARISON_VIEWS: Invalidated = &[AnalyticsKind::SalaryComparison];
const DISPERSION_VIEWS: Invalidated = &[AnalyticsKind::SalaryDispersion];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Years {
    pub start: i32,
    pub end: i32,
}

/// Items picked for the salary comparison view.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Comparison {
    pub group_by: GroupBy,
    pub items: BTreeSet<String>,
}

/// Snapshot of everything the user has selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionState {
    pub selected_universities: BTreeSet<String>,
    pub selected_courses: BTreeSet<String>,
    pub years: Years,
    pub enable_prediction: bool,
    pub comparison: Comparison,
    pub dispersion_year: i32,
}

impl SelectionState {
    fn empty(range: YearsRange) -> Self {
        Self {
            selected_universities: BTreeSet::new(),
            selected_courses: BTreeSet::new(),
            years: Years {
                start: range.min(),
                end: range.max(),
            },
            enable_prediction: false,
            comparison: Comparison::default(),
            dispersion_year: range.max(),
        }
    }
}

/// Generation stamp handed out when a request is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub kind: AnalyticsKind,
    pub generation: u64,
}

/// Owns the selection and enforces downstream invalidation.
#[derive(Debug, Clone)]
pub struct SelectionMachine {
    catalog: Arc<CatalogIndex>,
    range: YearsRange,
    thresholds: Thresholds,
    state: SelectionState,
    generations: [u64; 3],
}

impl SelectionMachine {
    pub fn new(catalog: Arc<CatalogIndex>, range: YearsRange, thresholds: Thresholds) -> Self {
        Self {
            catalog,
            range,
            thresholds,
            state: SelectionState::empty(range),
            generations: [0; 3],
        }
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn catalog(&self) -> &CatalogIndex {
        &self.catalog
    }

    pub fn range(&self) -> YearsRange {
        self.range
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn available_courses(&self) -> BTreeSet<String> {
        self.catalog
            .available_courses(&self.state.selected_universities)
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.thresholds
            .display_mode(self.state.selected_courses.len())
    }

    /// Replace the university set. Always clears the course selection.
    pub fn set_universities<I, S>(&mut self, universities: I) -> Result<Invalidated>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let universities: BTreeSet<String> = universities.into_iter().map(Into::into).collect();
        let unknown: Vec<String> = universities
            .iter()
            .filter(|u| !self.catalog.contains_university(u))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            return Err(SelectionError::UnknownUniversities(unknown));
        }

        log::debug!("Selecting {} universities", universities.len());
        self.state.selected_universities = universities;
        self.state.selected_courses.clear();
        Ok(self.invalidate(COURSE_VIEWS))
    }

    /// Replace the course set. Courses outside `available_courses()` reject the whole call.
    pub fn set_courses<I, S>(&mut self, courses: I) -> Result<Invalidated>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let courses: BTreeSet<String> = courses.into_iter().map(Into::into).collect();
        let available = self.available_courses();
        let unavailable: Vec<String> = courses.difference(&available).cloned().collect();
        if !unavailable.is_empty() {
            return Err(SelectionError::UnavailableCourses(unavailable));
        }

        log::debug!("Selecting {} courses", courses.len());
        self.state.selected_courses = courses;
        Ok(self.invalidate(COURSE_VIEWS))
    }

    pub fn select_all_courses(&mut self) -> Invalidated {
        self.state.selected_courses = self.available_courses();
        self.invalidate(COURSE_VIEWS)
    }

    pub fn clear_courses(&mut self) -> Invalidated {
        self.state.selected_courses.clear();
        self.invalidate(COURSE_VIEWS)
    }

    /// Set the year range, clamped to the catalog's years. `start > end` is rejected.
    pub fn set_years(&mut self, start: i32, end: i32) -> Result<Invalidated> {
        if start > end {
            return Err(SelectionError::InvertedYears { start, end });
        }
        if !(self.range.contains(start) && self.range.contains(end)) {
            log::debug!(
                "Clamping {start}-{end} to catalog years {}-{}",
                self.range.min(),
                self.range.max()
            );
        }
        self.state.years = Years {
            start: self.range.clamp(start),
            end: self.range.clamp(end),
        };
        log::debug!(
            "Year range set to {}-{}",
            self.state.years.start,
            self.state.years.end
        );
        Ok(self.invalidate(RANGE_VIEWS))
    }

    pub fn set_prediction(&mut self, enabled: bool) -> Invalidated {
        self.state.enable_prediction = enabled;
        self.invalidate(RANGE_VIEWS)
    }

    /// Switch the comparison grouping. Picked items belong to the old grouping and are dropped.
    pub fn set_group_by(&mut self, group_by: GroupBy) -> Invalidated {
        self.state.comparison = Comparison {
            group_by,
            items: BTreeSet::new(),
        };
        self.invalidate(COMPARISON_VIEWS)
    }

    pub fn set_comparison_items<I, S>(&mut self, items: I) -> Result<Invalidated>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let items: BTreeSet<String> = items.into_iter().map(Into::into).collect();
        let group_by = self.state.comparison.group_by;
        let unknown: Vec<String> = items
            .iter()
            .filter(|item| match group_by {
                GroupBy::University => !self.catalog.contains_university(item),
                GroupBy::Degree => !self.catalog.contains_degree(item),
            })
            .cloned()
            .collect();
        if !unknown.is_empty() {
            return Err(SelectionError::UnknownComparisonItems {
                group_by,
                items: unknown,
            });
        }

        self.state.comparison.items = items;
        Ok(self.invalidate(COMPARISON_VIEWS))
    }

    pub fn set_dispersion_year(&mut self, year: i32) -> Invalidated {
        if !self.range.contains(year) {
            log::debug!("Clamping dispersion year {year}");
        }
        self.state.dispersion_year = self.range.clamp(year);
        self.invalidate(DISPERSION_VIEWS)
    }

    /// Stamp a new request for `kind`. Any earlier ticket for that kind becomes stale.
    pub fn issue_ticket(&mut self, kind: AnalyticsKind) -> Ticket {
        let slot = &mut self.generations[kind.index()];
        *slot += 1;
        Ticket {
            kind,
            generation: *slot,
        }
    }

    /// Ticket for the current generation of `kind`, without superseding outstanding requests.
    pub fn snapshot(&self, kind: AnalyticsKind) -> Ticket {
        Ticket {
            kind,
            generation: self.generations[kind.index()],
        }
    }

    pub fn is_current(&self, ticket: &Ticket) -> bool {
        self.generations[ticket.kind.index()] == ticket.generation
    }

    pub fn generation(&self, kind: AnalyticsKind) -> u64 {
        self.generations[kind.index()]
    }

    fn invalidate(&mut self, kinds: Invalidated) -> Invalidated {
        for kind in kinds {
            self.generations[kind.index()] += 1;
        }
        kinds
    }
}
