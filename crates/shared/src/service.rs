//! Remote lookup seams consumed by the table engine.
//!
//! Implementations must treat filters conjunctively and be free of side
//! effects, so that identical requests yield identical responses.

use anyhow::Result;
use async_trait::async_trait;

use crate::{
    error::ApiException,
    protocol::{GetJobsRequest, GetJobsResponse, GroupJobsRequest, GroupJobsResponse},
};

#[async_trait]
pub trait GetJobsService: Send + Sync {
    async fn get_jobs(&self, request: &GetJobsRequest) -> Result<GetJobsResponse>;
}

#[async_trait]
pub trait GroupJobsService: Send + Sync {
    async fn group_jobs(&self, request: &GroupJobsRequest) -> Result<GroupJobsResponse>;
}

pub struct UnavailableGetJobsService;

#[async_trait]
impl GetJobsService for UnavailableGetJobsService {
    async fn get_jobs(&self, _request: &GetJobsRequest) -> Result<GetJobsResponse> {
        Err(ApiException::unavailable("job lookup service is unavailable").into())
    }
}

pub struct UnavailableGroupJobsService;

#[async_trait]
impl GroupJobsService for UnavailableGroupJobsService {
    async fn group_jobs(&self, _request: &GroupJobsRequest) -> Result<GroupJobsResponse> {
        Err(ApiException::unavailable("job grouping service is unavailable").into())
    }
}
