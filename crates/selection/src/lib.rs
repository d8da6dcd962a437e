//! # GradInsight Selection
//!
//! Cascading filter state (universities → courses → years → options) and the
//! query builder that turns it into analytics requests.
//!
//! Every mutation goes through a transition on [`SelectionMachine`]. Each
//! transition reports the analytics kinds it invalidated; invalidation bumps
//! that kind's generation so a response issued under an older generation is
//! recognised as stale when it arrives.

mod error;
mod query;
mod state;
mod thresholds;

pub use error::{Result, SelectionError};
pub use query::{AnalyticsRequest, ConstraintNotice, QueryBuilder, QueryPlan};
pub use state::{
    Comparison, Invalidated, SelectionMachine, SelectionState, Ticket, Years,
};
pub use thresholds::{DisplayMode, Thresholds};
