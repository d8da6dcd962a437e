//! # GradInsight Catalog
//!
//! Lookup structures derived from the flat `/metadata/full` listing.
//!
//! ```text
//! MetadataRow[]
//!     │
//!     └──> CatalogIndex::build
//!            ├─ all_universities       (sorted, distinct)
//!            ├─ all_degrees            (sorted, distinct)
//!            └─ degrees_by_university  (university -> sorted, distinct degrees)
//! ```
//!
//! The index is built once per metadata load and never mutated afterwards.

mod index;

pub use index::CatalogIndex;
