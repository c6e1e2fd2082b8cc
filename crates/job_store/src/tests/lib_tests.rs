use super::*;
use shared::error::{error_code, ErrorCode};

fn store() -> InMemoryJobStore {
    InMemoryJobStore::new(make_test_jobs(6, 7, 2, 3))
}

fn group_request(grouped_field: JobField, aggregates: Vec<JobField>) -> GroupJobsRequest {
    GroupJobsRequest {
        filters: Vec::new(),
        order: JobOrder::asc("name"),
        grouped_field,
        aggregates,
        skip: 0,
        take: Take::Unbounded,
    }
}

#[test]
fn test_jobs_are_deterministic_per_seed() {
    assert_eq!(make_test_jobs(20, 42, 3, 4), make_test_jobs(20, 42, 3, 4));

    let jobs = make_test_jobs(5, 42, 2, 3);
    let ids: Vec<&str> = jobs.iter().map(|job| job.job_id.as_str()).collect();
    assert_eq!(ids, vec!["0", "1", "2", "3", "4"]);
    assert_eq!(jobs[3].queue, "queue-1");
    assert_eq!(jobs[4].job_set, "job-set-1");
}

#[tokio::test]
async fn pages_through_filtered_jobs() {
    let store = store();
    let response = store
        .get_jobs(&GetJobsRequest {
            filters: vec![JobFilter::exact(JobField::Queue, "queue-0")],
            order: JobOrder::desc("jobId"),
            skip: 1,
            take: Take::Limit(1),
        })
        .await
        .expect("get jobs");

    assert_eq!(response.total_jobs, 3);
    assert_eq!(response.jobs.len(), 1);
    assert_eq!(response.jobs[0].job_id, "2");
}

#[tokio::test]
async fn filters_are_conjunctive() {
    let store = store();
    let response = store
        .get_jobs(&GetJobsRequest {
            filters: vec![
                JobFilter::exact(JobField::Queue, "queue-0"),
                JobFilter::exact(JobField::JobSet, "job-set-1"),
            ],
            order: JobOrder::asc("jobId"),
            skip: 0,
            take: Take::Unbounded,
        })
        .await
        .expect("get jobs");

    let ids: Vec<&str> = response.jobs.iter().map(|job| job.job_id.as_str()).collect();
    assert_eq!(ids, vec!["4"]);
    assert_eq!(response.total_jobs, 1);
}

#[tokio::test]
async fn groups_jobs_with_counts() {
    let response = store()
        .group_jobs(&group_request(JobField::Queue, Vec::new()))
        .await
        .expect("group jobs");

    assert_eq!(response.total_groups, 2);
    let groups: Vec<(&str, u64)> = response
        .groups
        .iter()
        .map(|group| (group.name.as_str(), group.count))
        .collect();
    assert_eq!(groups, vec![("queue-0", 3), ("queue-1", 3)]);
}

#[tokio::test]
async fn reports_aggregates_only_when_members_agree() {
    let mut request = group_request(JobField::JobSet, vec![JobField::Queue]);
    request.filters = vec![JobFilter::exact(JobField::Queue, "queue-0")];
    let response = store().group_jobs(&request).await.expect("group jobs");
    assert!(response
        .groups
        .iter()
        .all(|group| group.aggregates.get(&JobField::Queue) == Some(&CellValue::from("queue-0"))));

    let response = store()
        .group_jobs(&group_request(JobField::Queue, vec![JobField::JobSet]))
        .await
        .expect("group jobs");
    assert!(response
        .groups
        .iter()
        .all(|group| !group.aggregates.contains_key(&JobField::JobSet)));
}

#[tokio::test]
async fn orders_groups_by_count() {
    let store = InMemoryJobStore::new(make_test_jobs(7, 1, 3, 1));
    let mut request = group_request(JobField::Queue, Vec::new());
    request.order = JobOrder::desc("count");
    request.take = Take::Limit(2);

    let response = store.group_jobs(&request).await.expect("group jobs");
    assert_eq!(response.total_groups, 3);
    assert_eq!(response.groups[0].name, "queue-0");
    assert_eq!(response.groups[0].count, 3);
    assert_eq!(response.groups.len(), 2);
}

#[tokio::test]
async fn rejects_empty_pages_and_unknown_order_fields() {
    let store = store();
    let err = store
        .get_jobs(&GetJobsRequest {
            filters: Vec::new(),
            order: JobOrder::asc("jobId"),
            skip: 0,
            take: Take::Limit(0),
        })
        .await
        .expect_err("zero take");
    assert_eq!(error_code(&err), Some(ErrorCode::Validation));

    let err = store
        .get_jobs(&GetJobsRequest {
            filters: Vec::new(),
            order: JobOrder::asc("priority"),
            skip: 0,
            take: Take::Unbounded,
        })
        .await
        .expect_err("unknown field");
    assert_eq!(error_code(&err), Some(ErrorCode::Validation));
}
