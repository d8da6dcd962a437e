use gradinsight_protocol::GroupBy;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SelectionError>;

/// Selection problems caught before any request is sent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Start year ({start}) cannot be later than end year ({end})")]
    InvertedYears { start: i32, end: i32 },

    #[error("Unknown universities: {}", .0.join(", "))]
    UnknownUniversities(Vec<String>),

    #[error("Courses not offered by the selected universities: {}", .0.join(", "))]
    UnavailableCourses(Vec<String>),

    #[error("Unknown {group_by} items: {}", .items.join(", "))]
    UnknownComparisonItems { group_by: GroupBy, items: Vec<String> },

    #[error("Select at least one course before running the analysis")]
    EmptySelection,
}
