use shared::error::error_code;
use thiserror::Error;

use crate::{grouping::GroupingError, row_id::RowIdError};

#[derive(Debug, Error)]
pub enum TableError {
    #[error(transparent)]
    RowId(#[from] RowIdError),
    #[error(transparent)]
    Grouping(#[from] GroupingError),
    #[error("page size must be greater than zero")]
    InvalidPageSize,
    #[error("page {page_index} is out of range (pages: {page_count})")]
    PageOutOfRange { page_index: usize, page_count: usize },
    #[error("response kind does not match request {seq}")]
    ResponseMismatch { seq: u64 },
    #[error("lookup for {target} failed: {source:#}")]
    Fetch {
        target: String,
        source: anyhow::Error,
    },
}

impl TableError {
    /// Whether re-issuing the same request may succeed. Remote failures without
    /// an API error code are assumed transient.
    pub fn is_retryable(&self) -> bool {
        match self {
            TableError::Fetch { source, .. } => {
                error_code(source).map_or(true, |code| code.is_retryable())
            }
            _ => false,
        }
    }
}
