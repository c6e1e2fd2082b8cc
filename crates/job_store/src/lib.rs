//! In-memory job lookups, used by tests and the CLI in place of a remote
//! service.

use std::{cmp::Ordering, collections::BTreeMap, str::FromStr};

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use shared::{
    domain::{CellValue, Job, JobField, JobFilter, JobGroup, JobOrder, JobState, Take},
    error::ApiException,
    protocol::{GetJobsRequest, GetJobsResponse, GroupJobsRequest, GroupJobsResponse},
    service::{GetJobsService, GroupJobsService},
};
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct InMemoryJobStore {
    jobs: Vec<Job>,
}

impl InMemoryJobStore {
    pub fn new(jobs: Vec<Job>) -> Self {
        Self { jobs }
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    fn filtered(&self, filters: &[JobFilter]) -> Vec<&Job> {
        self.jobs
            .iter()
            .filter(|job| filters.iter().all(|filter| filter.matches(job)))
            .collect()
    }
}

fn validate_take(take: Take) -> Result<()> {
    if take == Take::Limit(0) {
        return Err(ApiException::validation("take must be greater than zero").into());
    }
    Ok(())
}

fn slice<T>(items: Vec<T>, skip: usize, take: Take) -> Vec<T> {
    let rest = items.into_iter().skip(skip);
    match take.limit() {
        Some(limit) => rest.take(limit).collect(),
        None => rest.collect(),
    }
}

fn job_order_field(order: &JobOrder) -> Result<JobField> {
    JobField::from_str(&order.field).map_err(|err| ApiException::validation(err.to_string()).into())
}

fn compare_groups(order: &JobOrder, a: &JobGroup, b: &JobGroup) -> Ordering {
    let ordering = match order.field.as_str() {
        "name" => a.name.cmp(&b.name),
        "count" => a.count.cmp(&b.count),
        other => {
            let field = JobField::from_str(other).ok();
            let value_a = field.and_then(|f| a.aggregates.get(&f));
            let value_b = field.and_then(|f| b.aggregates.get(&f));
            match (value_a, value_b) {
                (Some(value_a), Some(value_b)) => value_a.compare(value_b),
                _ => Ordering::Equal,
            }
        }
    };
    order.apply(ordering)
}

/// Groups `jobs` by `field` in first-seen order. An aggregate is reported only
/// when every member of the group carries the same value.
fn group_by(jobs: &[&Job], field: JobField, aggregates: &[JobField]) -> Vec<JobGroup> {
    let mut index: BTreeMap<String, usize> = BTreeMap::new();
    let mut groups: Vec<(JobGroup, BTreeMap<JobField, Option<CellValue>>)> = Vec::new();

    for job in jobs {
        let name = job.value(field).to_string();
        match index.get(&name) {
            Some(&position) => {
                let (group, shared) = &mut groups[position];
                group.count += 1;
                for (aggregate, value) in shared.iter_mut() {
                    if value.as_ref() != Some(&job.value(*aggregate)) {
                        *value = None;
                    }
                }
            }
            None => {
                index.insert(name.clone(), groups.len());
                let shared = aggregates
                    .iter()
                    .map(|aggregate| (*aggregate, Some(job.value(*aggregate))))
                    .collect();
                groups.push((
                    JobGroup {
                        name,
                        count: 1,
                        aggregates: BTreeMap::new(),
                    },
                    shared,
                ));
            }
        }
    }

    groups
        .into_iter()
        .map(|(mut group, shared)| {
            group.aggregates = shared
                .into_iter()
                .filter_map(|(aggregate, value)| value.map(|value| (aggregate, value)))
                .collect();
            group
        })
        .collect()
}

#[async_trait]
impl GetJobsService for InMemoryJobStore {
    async fn get_jobs(&self, request: &GetJobsRequest) -> Result<GetJobsResponse> {
        validate_take(request.take)?;
        let field = job_order_field(&request.order)?;

        let mut jobs = self.filtered(&request.filters);
        jobs.sort_by(|a, b| request.order.apply(a.value(field).compare(&b.value(field))));
        let total_jobs = jobs.len();
        let jobs: Vec<Job> = slice(jobs, request.skip, request.take)
            .into_iter()
            .cloned()
            .collect();

        debug!(
            filters = request.filters.len(),
            skip = request.skip,
            returned = jobs.len(),
            total_jobs,
            "store: get jobs"
        );
        Ok(GetJobsResponse { jobs, total_jobs })
    }
}

#[async_trait]
impl GroupJobsService for InMemoryJobStore {
    async fn group_jobs(&self, request: &GroupJobsRequest) -> Result<GroupJobsResponse> {
        validate_take(request.take)?;

        let jobs = self.filtered(&request.filters);
        let mut groups = group_by(&jobs, request.grouped_field, &request.aggregates);
        groups.sort_by(|a, b| compare_groups(&request.order, a, b));
        let total_groups = groups.len();
        let groups = slice(groups, request.skip, request.take);

        debug!(
            grouped_field = %request.grouped_field,
            filters = request.filters.len(),
            returned = groups.len(),
            total_groups,
            "store: group jobs"
        );
        Ok(GroupJobsResponse {
            groups,
            total_groups,
        })
    }
}

const OWNERS: [&str; 4] = ["alice", "bob", "carol", "dave"];
const MEMORY: [&str; 4] = ["1Gi", "2Gi", "4Gi", "8Gi"];
const EPHEMERAL_STORAGE: [&str; 3] = ["10Gi", "20Gi", "50Gi"];

struct XorShift(u64);

impl XorShift {
    fn new(seed: u64) -> Self {
        // xorshift never leaves the all-zero state.
        Self(seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) | 1)
    }

    fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    fn pick<T: Copy>(&mut self, items: &[T]) -> T {
        items[(self.next() % items.len() as u64) as usize]
    }
}

/// Deterministic jobs for tests and demos. Job `i` has id `i`, lives in
/// queue `queue-{i % num_queues}` and job set `job-set-{i % num_job_sets}`;
/// the remaining fields are drawn from a generator seeded with `seed`.
pub fn make_test_jobs(n: usize, seed: u64, num_queues: usize, num_job_sets: usize) -> Vec<Job> {
    let num_queues = num_queues.max(1);
    let num_job_sets = num_job_sets.max(1);
    let mut rng = XorShift::new(seed);
    let base = DateTime::<Utc>::UNIX_EPOCH + Duration::days(19_000);

    (0..n)
        .map(|i| Job {
            job_id: i.to_string(),
            queue: format!("queue-{}", i % num_queues),
            job_set: format!("job-set-{}", i % num_job_sets),
            owner: rng.pick(&OWNERS).to_string(),
            state: rng.pick(&JobState::ALL),
            cpu: 250 * (1 + (rng.next() % 16) as i64),
            memory: rng.pick(&MEMORY).to_string(),
            ephemeral_storage: rng.pick(&EPHEMERAL_STORAGE).to_string(),
            submitted: base + Duration::seconds(i as i64 * 90),
        })
        .collect()
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
