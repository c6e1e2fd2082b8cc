use serde::{Deserialize, Serialize};

use crate::domain::{Job, JobField, JobFilter, JobGroup, JobOrder, Take};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetJobsRequest {
    pub filters: Vec<JobFilter>,
    pub order: JobOrder,
    pub skip: usize,
    pub take: Take,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetJobsResponse {
    pub jobs: Vec<Job>,
    pub total_jobs: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupJobsRequest {
    pub filters: Vec<JobFilter>,
    pub order: JobOrder,
    pub grouped_field: JobField,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aggregates: Vec<JobField>,
    pub skip: usize,
    pub take: Take,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupJobsResponse {
    pub groups: Vec<JobGroup>,
    pub total_groups: usize,
}
