use serde::{Deserialize, Serialize};

/// Selection-size limits shared by the query builder and the result shaper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Thresholds {
    /// Largest course count still drawn one line per (university, degree).
    pub individual_max_courses: usize,
    /// Degree-grouped salary comparisons above this count ask for aggregation.
    pub salary_aggregate_min: usize,
    /// Largest degree count the dispersion chart accepts.
    pub dispersion_max_degrees: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            individual_max_courses: 6,
            salary_aggregate_min: 5,
            dispersion_max_degrees: 7,
        }
    }
}

impl Thresholds {
    pub fn display_mode(&self, course_count: usize) -> DisplayMode {
        if course_count <= self.individual_max_courses {
            DisplayMode::Individual
        } else {
            DisplayMode::Aggregate
        }
    }
}

/// How employment series are drawn, derived from the selected course count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    Individual,
    Aggregate,
}
