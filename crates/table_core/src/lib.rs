//! Lazily-loaded, hierarchically-grouped jobs table.
//!
//! Rows are materialized one level at a time: the root page first, then the
//! children of each group the first time it is expanded. [`TableState`] owns
//! the reducer; [`JobsTable`] drives it against the lookup services.

pub mod columns;
pub mod error;
pub mod expansion;
pub mod grouping;
pub mod merge;
pub mod orchestrator;
pub mod row_id;
pub mod rows;
pub mod table;
pub mod tree;

pub use columns::{ColumnSpec, TableOptions, DEFAULT_PAGE_SIZE, PAGE_SIZE_OPTIONS};
pub use error::TableError;
pub use expansion::ExpansionState;
pub use grouping::{Grouping, GroupingError};
pub use orchestrator::{
    ApplyOutcome, FetchRequest, FetchStatus, FetchTarget, LookupRequest, LookupResponse,
    StaleReason, TableEvent, TableSnapshot, TableState,
};
pub use row_id::{RowId, RowIdError};
pub use rows::{Children, GroupRow, LeafRow, Row, RowRef, RowSeq};
pub use table::{fetch, JobsTable};
pub use tree::VisibleRow;
