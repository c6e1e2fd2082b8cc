//! Fetch orchestration as a pure reducer.
//!
//! `TableState::apply` turns a user interaction into at most one
//! `FetchRequest`; `TableState::apply_response` folds the answer back into the
//! materialized tree. Nothing here performs I/O, so interleavings of requests
//! and responses can be driven step by step.

use std::{collections::BTreeSet, fmt};

use shared::{
    domain::{JobFilter, Take},
    error::error_code,
    protocol::{GetJobsRequest, GetJobsResponse, GroupJobsRequest, GroupJobsResponse},
};
use tracing::{debug, info, warn};

use crate::{
    columns::TableOptions,
    error::TableError,
    expansion::ExpansionState,
    grouping::Grouping,
    merge::{merge_sub_rows, MergeMode},
    row_id::{decode, RowId},
    rows::{empty_rows, project_groups, project_leaves, RowSeq},
    tree::{find_by_path, flatten_visible, VisibleRow},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableEvent {
    SetGrouping(Grouping),
    SetExpanded(ExpansionState),
    ToggleExpanded(RowId),
    SetPageIndex(usize),
    SetPageSize(usize),
    Refresh,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchTarget {
    Root,
    Subtree { row_id: RowId, path: Vec<RowId> },
}

impl FetchTarget {
    pub fn path(&self) -> &[RowId] {
        match self {
            FetchTarget::Root => &[],
            FetchTarget::Subtree { path, .. } => path,
        }
    }

    pub fn row_id(&self) -> Option<&RowId> {
        match self {
            FetchTarget::Root => None,
            FetchTarget::Subtree { row_id, .. } => Some(row_id),
        }
    }

    pub fn is_root(&self) -> bool {
        matches!(self, FetchTarget::Root)
    }
}

impl fmt::Display for FetchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchTarget::Root => f.write_str("root"),
            FetchTarget::Subtree { row_id, .. } => write!(f, "row {row_id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupRequest {
    Jobs(GetJobsRequest),
    Groups(GroupJobsRequest),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupResponse {
    Jobs(GetJobsResponse),
    Groups(GroupJobsResponse),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Issue order; later requests have larger numbers.
    pub seq: u64,
    /// Grouping generation the request was built under.
    pub epoch: u64,
    pub target: FetchTarget,
    pub lookup: LookupRequest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaleReason {
    GroupingChanged,
    Superseded,
    PathNotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    Stale(StaleReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    Idle,
    Fetching,
    Error,
}

#[derive(Debug, Clone)]
pub struct FetchFailure {
    pub request: FetchRequest,
    pub message: String,
    pub retryable: bool,
}

/// What the display layer renders. A new `roots` allocation means the tree
/// changed; rows that compare `Arc::ptr_eq` to the previous snapshot did not.
#[derive(Debug, Clone)]
pub struct TableSnapshot {
    pub roots: RowSeq,
    pub visible: Vec<VisibleRow>,
    pub grouping: Grouping,
    pub page_index: usize,
    pub page_size: usize,
    pub page_count: usize,
    pub total_row_count: usize,
    pub loaded: bool,
    pub status: FetchStatus,
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TableState {
    options: TableOptions,
    grouping: Grouping,
    expansion: ExpansionState,
    roots: RowSeq,
    page_index: usize,
    page_size: usize,
    total_row_count: usize,
    loaded: bool,
    epoch: u64,
    next_seq: u64,
    latest_root_seq: Option<u64>,
    in_flight: BTreeSet<u64>,
    last_failure: Option<FetchFailure>,
}

impl TableState {
    pub fn new(options: TableOptions) -> Self {
        let page_size = options.page_size.max(1);
        Self {
            options,
            grouping: Grouping::default(),
            expansion: ExpansionState::default(),
            roots: empty_rows(),
            page_index: 0,
            page_size,
            total_row_count: 0,
            loaded: false,
            epoch: 0,
            next_seq: 0,
            latest_root_seq: None,
            in_flight: BTreeSet::new(),
            last_failure: None,
        }
    }

    pub fn options(&self) -> &TableOptions {
        &self.options
    }

    pub fn grouping(&self) -> &Grouping {
        &self.grouping
    }

    pub fn expansion(&self) -> &ExpansionState {
        &self.expansion
    }

    pub fn roots(&self) -> &RowSeq {
        &self.roots
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_row_count(&self) -> usize {
        self.total_row_count
    }

    pub fn page_count(&self) -> usize {
        self.total_row_count.div_ceil(self.page_size)
    }

    pub fn last_failure(&self) -> Option<&FetchFailure> {
        self.last_failure.as_ref()
    }

    pub fn status(&self) -> FetchStatus {
        if self.last_failure.is_some() {
            FetchStatus::Error
        } else if !self.in_flight.is_empty() {
            FetchStatus::Fetching
        } else {
            FetchStatus::Idle
        }
    }

    pub fn visible_rows(&self) -> Vec<VisibleRow> {
        flatten_visible(&self.roots, &self.expansion)
    }

    pub fn snapshot(&self) -> TableSnapshot {
        TableSnapshot {
            roots: self.roots.clone(),
            visible: self.visible_rows(),
            grouping: self.grouping.clone(),
            page_index: self.page_index,
            page_size: self.page_size,
            page_count: self.page_count(),
            total_row_count: self.total_row_count,
            loaded: self.loaded,
            status: self.status(),
            error: self.last_failure.as_ref().map(|f| f.message.clone()),
        }
    }

    pub fn apply(&mut self, event: TableEvent) -> Result<Option<FetchRequest>, TableError> {
        match event {
            TableEvent::SetGrouping(grouping) => self.set_grouping(grouping),
            TableEvent::SetExpanded(next) => self.set_expanded(next),
            TableEvent::ToggleExpanded(row_id) => {
                let next = self.expansion.toggled(&row_id);
                self.set_expanded(next)
            }
            TableEvent::SetPageIndex(page_index) => {
                if page_index == self.page_index {
                    return Ok(None);
                }
                self.check_page(page_index, self.page_size)?;
                self.page_index = page_index;
                Ok(Some(self.issue_root()))
            }
            TableEvent::SetPageSize(page_size) => {
                if page_size == 0 {
                    return Err(TableError::InvalidPageSize);
                }
                if page_size == self.page_size {
                    return Ok(None);
                }
                // Keep the first row of the current page on screen.
                let first_row = self.page_index.saturating_mul(self.page_size);
                self.page_index = first_row / page_size;
                self.page_size = page_size;
                Ok(Some(self.issue_root()))
            }
            TableEvent::Refresh => Ok(Some(self.issue_root())),
        }
    }

    /// Rejects pages whose first row cannot be addressed, and pages past the
    /// end once the row count is known.
    fn check_page(&self, page_index: usize, page_size: usize) -> Result<(), TableError> {
        let out_of_range = TableError::PageOutOfRange {
            page_index,
            page_count: self.page_count(),
        };
        if page_index.checked_mul(page_size).is_none() {
            return Err(out_of_range);
        }
        if self.loaded && page_index >= self.page_count().max(1) {
            return Err(out_of_range);
        }
        Ok(())
    }

    fn set_grouping(&mut self, grouping: Grouping) -> Result<Option<FetchRequest>, TableError> {
        grouping.validate(&self.options)?;
        if grouping == self.grouping {
            return Ok(None);
        }

        self.grouping = grouping;
        self.epoch += 1;
        self.roots = empty_rows();
        self.expansion = ExpansionState::default();
        self.page_index = 0;
        // Requests built under the previous grouping can no longer land.
        self.in_flight.clear();
        Ok(Some(self.issue_root()))
    }

    fn set_expanded(&mut self, next: ExpansionState) -> Result<Option<FetchRequest>, TableError> {
        let delta = self.expansion.diff(&next);
        self.expansion = next;

        if !delta.newly_collapsed.is_empty() {
            // Collapsed subtrees stay materialized for the next expand.
            debug!(collapsed = delta.newly_collapsed.len(), "table: collapsing rows");
            return Ok(None);
        }
        let Some(expanded) = delta.newly_expanded.first() else {
            return Ok(None);
        };
        if delta.newly_expanded.len() > 1 {
            warn!(
                count = delta.newly_expanded.len(),
                processing = %expanded,
                "table: more than one row newly expanded, fetching only the first"
            );
        }

        let decoded = decode(expanded.as_str())?;
        let Some(node) = find_by_path(&self.roots, &decoded.path_from_root) else {
            debug!(row = %expanded, "table: expanded row is not materialized, nothing to fetch");
            return Ok(None);
        };
        let Some(group) = node.as_group() else {
            return Ok(None);
        };
        if group.children.is_fetched() {
            debug!(row = %expanded, "table: re-expanding materialized row");
            return Ok(None);
        }

        let depth = decoded.depth();
        if depth > self.grouping.len() {
            warn!(row = %expanded, depth, "table: expanded row is deeper than the grouping");
            return Ok(None);
        }

        let lookup = self.build_lookup(depth, decoded.filters(), 0, Take::Unbounded);
        let request = self.issue(
            FetchTarget::Subtree {
                row_id: decoded.row_id,
                path: decoded.path_from_root,
            },
            lookup,
        );
        debug!(
            seq = request.seq,
            target = %request.target,
            depth,
            "table: fetching children"
        );
        Ok(Some(request))
    }

    /// Expansion survives until the response lands, so a failed page fetch
    /// leaves the current view intact.
    fn issue_root(&mut self) -> FetchRequest {
        if let Some(previous) = self.latest_root_seq.take() {
            self.in_flight.remove(&previous);
        }

        let skip = self.page_index.saturating_mul(self.page_size);
        let lookup = self.build_lookup(0, Vec::new(), skip, Take::Limit(self.page_size));
        let request = self.issue(FetchTarget::Root, lookup);
        self.latest_root_seq = Some(request.seq);
        info!(
            seq = request.seq,
            page_index = self.page_index,
            page_size = self.page_size,
            grouping = ?self.grouping.fields(),
            "table: fetching root rows"
        );
        request
    }

    fn issue(&mut self, target: FetchTarget, lookup: LookupRequest) -> FetchRequest {
        self.next_seq += 1;
        self.in_flight.insert(self.next_seq);
        self.last_failure = None;
        FetchRequest {
            seq: self.next_seq,
            epoch: self.epoch,
            target,
            lookup,
        }
    }

    fn build_lookup(
        &self,
        depth: usize,
        filters: Vec<JobFilter>,
        skip: usize,
        take: Take,
    ) -> LookupRequest {
        match self.grouping.level(depth) {
            None => LookupRequest::Jobs(GetJobsRequest {
                filters,
                order: self.options.job_order.clone(),
                skip,
                take,
            }),
            Some(grouped_field) => LookupRequest::Groups(GroupJobsRequest {
                filters,
                order: self.options.group_order.clone(),
                grouped_field,
                aggregates: self.options.aggregate_fields(),
                skip,
                take,
            }),
        }
    }

    fn staleness(&self, request: &FetchRequest) -> Option<StaleReason> {
        if request.epoch != self.epoch {
            return Some(StaleReason::GroupingChanged);
        }
        match &request.target {
            FetchTarget::Root if self.latest_root_seq != Some(request.seq) => {
                Some(StaleReason::Superseded)
            }
            FetchTarget::Subtree { path, .. } if find_by_path(&self.roots, path).is_none() => {
                Some(StaleReason::PathNotFound)
            }
            _ => None,
        }
    }

    pub fn apply_response(
        &mut self,
        request: &FetchRequest,
        response: LookupResponse,
    ) -> Result<ApplyOutcome, TableError> {
        self.in_flight.remove(&request.seq);
        if let Some(reason) = self.staleness(request) {
            debug!(
                seq = request.seq,
                target = %request.target,
                ?reason,
                "table: dropping stale response"
            );
            return Ok(ApplyOutcome::Stale(reason));
        }

        let parent = request.target.row_id();
        let projected = match (&request.lookup, response) {
            (LookupRequest::Jobs(_), LookupResponse::Jobs(page)) => {
                project_leaves(page.jobs, parent).map(|rows| (rows, page.total_jobs))
            }
            (LookupRequest::Groups(lookup), LookupResponse::Groups(page)) => {
                project_groups(page.groups, parent, lookup.grouped_field)
                    .map(|rows| (rows, page.total_groups))
            }
            _ => return Err(TableError::ResponseMismatch { seq: request.seq }),
        };
        let (rows, total) = match projected {
            Ok(projected) => projected,
            Err(err) => {
                self.last_failure = Some(FetchFailure {
                    request: request.clone(),
                    message: err.to_string(),
                    retryable: false,
                });
                return Err(err.into());
            }
        };

        let row_count = rows.len();
        let outcome = merge_sub_rows(&self.roots, rows, request.target.path(), MergeMode::Replace);
        if !request.target.is_root() && outcome.target.is_none() {
            return Ok(ApplyOutcome::Stale(StaleReason::PathNotFound));
        }

        self.roots = outcome.roots;
        if request.target.is_root() {
            // The previous root sequence and every subtree under it are gone.
            self.expansion = ExpansionState::default();
            self.total_row_count = total;
            self.loaded = true;
        }
        debug!(
            seq = request.seq,
            target = %request.target,
            rows = row_count,
            total,
            "table: merged response"
        );
        Ok(ApplyOutcome::Applied)
    }

    /// Records a failed lookup. When the request was already stale the
    /// failure is dropped and the reason returned instead.
    pub fn fail_request(
        &mut self,
        request: &FetchRequest,
        error: &anyhow::Error,
    ) -> Option<StaleReason> {
        self.in_flight.remove(&request.seq);
        if let Some(reason) = self.staleness(request) {
            debug!(seq = request.seq, ?reason, "table: ignoring failure of stale request");
            return Some(reason);
        }

        warn!(
            seq = request.seq,
            target = %request.target,
            error = %format!("{error:#}"),
            "table: lookup failed"
        );
        self.last_failure = Some(FetchFailure {
            request: request.clone(),
            message: format!("{error:#}"),
            retryable: error_code(error).map_or(true, |code| code.is_retryable()),
        });
        None
    }

    /// Re-issues the last failed request if it is retryable.
    pub fn retry(&mut self) -> Option<FetchRequest> {
        if !self.last_failure.as_ref()?.retryable {
            return None;
        }
        let previous = self.last_failure.take()?.request;
        info!(seq = previous.seq, target = %previous.target, "table: retrying lookup");
        let request = if previous.target.is_root() {
            self.issue_root()
        } else {
            self.issue(previous.target, previous.lookup)
        };
        Some(request)
    }
}

#[cfg(test)]
#[path = "tests/orchestrator_tests.rs"]
mod tests;
