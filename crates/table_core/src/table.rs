use std::sync::Arc;

use anyhow::Result;
use shared::service::{
    GetJobsService, GroupJobsService, UnavailableGetJobsService, UnavailableGroupJobsService,
};
use tokio::sync::{watch, Mutex};
use tracing::debug;

use crate::{
    columns::TableOptions,
    error::TableError,
    orchestrator::{
        ApplyOutcome, FetchRequest, LookupRequest, LookupResponse, TableEvent, TableSnapshot,
        TableState,
    },
};

/// Runs a single lookup against the services it names.
pub async fn fetch(
    request: &FetchRequest,
    jobs: &dyn GetJobsService,
    groups: &dyn GroupJobsService,
) -> Result<LookupResponse> {
    match &request.lookup {
        LookupRequest::Jobs(lookup) => Ok(LookupResponse::Jobs(jobs.get_jobs(lookup).await?)),
        LookupRequest::Groups(lookup) => {
            Ok(LookupResponse::Groups(groups.group_jobs(lookup).await?))
        }
    }
}

/// Async driver around [`TableState`]. Every state change is published on a
/// watch channel; the lock is never held across a lookup, so several
/// interactions may be in flight at once.
pub struct JobsTable {
    jobs: Arc<dyn GetJobsService>,
    groups: Arc<dyn GroupJobsService>,
    state: Mutex<TableState>,
    snapshots: watch::Sender<TableSnapshot>,
}

impl JobsTable {
    pub fn new(options: TableOptions) -> Arc<Self> {
        Self::new_with_services(
            options,
            Arc::new(UnavailableGetJobsService),
            Arc::new(UnavailableGroupJobsService),
        )
    }

    pub fn new_with_services(
        options: TableOptions,
        jobs: Arc<dyn GetJobsService>,
        groups: Arc<dyn GroupJobsService>,
    ) -> Arc<Self> {
        let state = TableState::new(options);
        let (snapshots, _) = watch::channel(state.snapshot());
        Arc::new(Self {
            jobs,
            groups,
            state: Mutex::new(state),
            snapshots,
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<TableSnapshot> {
        self.snapshots.subscribe()
    }

    pub fn snapshot(&self) -> TableSnapshot {
        self.snapshots.borrow().clone()
    }

    /// A copy of the current reducer state.
    pub async fn state(&self) -> TableState {
        self.state.lock().await.clone()
    }

    /// Fetches the first page under the current settings.
    pub async fn load(&self) -> Result<Option<ApplyOutcome>, TableError> {
        self.dispatch(TableEvent::Refresh).await
    }

    /// Applies `event` and, if it needs data, runs the lookup and merges the
    /// answer. Returns `None` when the event required no lookup.
    pub async fn dispatch(&self, event: TableEvent) -> Result<Option<ApplyOutcome>, TableError> {
        let request = {
            let mut state = self.state.lock().await;
            let request = state.apply(event)?;
            self.publish(&state);
            request
        };

        match request {
            Some(request) => self.execute(request).await.map(Some),
            None => Ok(None),
        }
    }

    /// Re-runs the last failed lookup, if it may succeed on a second attempt.
    pub async fn retry(&self) -> Result<Option<ApplyOutcome>, TableError> {
        let request = {
            let mut state = self.state.lock().await;
            let request = state.retry();
            self.publish(&state);
            request
        };

        match request {
            Some(request) => self.execute(request).await.map(Some),
            None => Ok(None),
        }
    }

    async fn execute(&self, request: FetchRequest) -> Result<ApplyOutcome, TableError> {
        debug!(seq = request.seq, target = %request.target, "table: running lookup");
        let response = fetch(&request, self.jobs.as_ref(), self.groups.as_ref()).await;

        let mut state = self.state.lock().await;
        let result = match response {
            Ok(response) => state.apply_response(&request, response),
            Err(source) => match state.fail_request(&request, &source) {
                Some(reason) => Ok(ApplyOutcome::Stale(reason)),
                None => Err(TableError::Fetch {
                    target: request.target.to_string(),
                    source,
                }),
            },
        };
        self.publish(&state);
        result
    }

    fn publish(&self, state: &TableState) {
        self.snapshots.send_replace(state.snapshot());
    }
}
