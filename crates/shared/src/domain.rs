use std::{cmp::Ordering, collections::BTreeMap, fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum JobField {
    JobId,
    Queue,
    JobSet,
    Owner,
    State,
    Cpu,
    Memory,
    EphemeralStorage,
    Submitted,
}

impl JobField {
    pub const ALL: [JobField; 9] = [
        JobField::JobId,
        JobField::Queue,
        JobField::JobSet,
        JobField::Owner,
        JobField::State,
        JobField::Cpu,
        JobField::Memory,
        JobField::EphemeralStorage,
        JobField::Submitted,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            JobField::JobId => "jobId",
            JobField::Queue => "queue",
            JobField::JobSet => "jobSet",
            JobField::Owner => "owner",
            JobField::State => "state",
            JobField::Cpu => "cpu",
            JobField::Memory => "memory",
            JobField::EphemeralStorage => "ephemeralStorage",
            JobField::Submitted => "submitted",
        }
    }
}

impl fmt::Display for JobField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown job field '{0}'")]
pub struct UnknownJobField(pub String);

impl FromStr for JobField {
    type Err = UnknownJobField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobField::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| UnknownJobField(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    Queued,
    Pending,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl JobState {
    pub const ALL: [JobState; 6] = [
        JobState::Queued,
        JobState::Pending,
        JobState::Running,
        JobState::Succeeded,
        JobState::Failed,
        JobState::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            JobState::Queued => "QUEUED",
            JobState::Pending => "PENDING",
            JobState::Running => "RUNNING",
            JobState::Succeeded => "SUCCEEDED",
            JobState::Failed => "FAILED",
            JobState::Cancelled => "CANCELLED",
        }
    }
}

/// A single column value of a job or an aggregate of a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Int(i64),
    Timestamp(DateTime<Utc>),
    Text(String),
}

impl CellValue {
    /// Orders values of the same kind naturally and falls back to their
    /// rendered text across kinds.
    pub fn compare(&self, other: &CellValue) -> Ordering {
        match (self, other) {
            (CellValue::Int(a), CellValue::Int(b)) => a.cmp(b),
            (CellValue::Timestamp(a), CellValue::Timestamp(b)) => a.cmp(b),
            (CellValue::Text(a), CellValue::Text(b)) => a.cmp(b),
            (a, b) => a.to_string().cmp(&b.to_string()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Int(v) => write!(f, "{v}"),
            CellValue::Timestamp(v) => f.write_str(&v.to_rfc3339()),
            CellValue::Text(v) => f.write_str(v),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Int(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub job_id: String,
    pub queue: String,
    pub job_set: String,
    pub owner: String,
    pub state: JobState,
    /// Requested CPU in millicores.
    pub cpu: i64,
    pub memory: String,
    pub ephemeral_storage: String,
    pub submitted: DateTime<Utc>,
}

impl Job {
    pub fn value(&self, field: JobField) -> CellValue {
        match field {
            JobField::JobId => CellValue::Text(self.job_id.clone()),
            JobField::Queue => CellValue::Text(self.queue.clone()),
            JobField::JobSet => CellValue::Text(self.job_set.clone()),
            JobField::Owner => CellValue::Text(self.owner.clone()),
            JobField::State => CellValue::Text(self.state.as_str().to_string()),
            JobField::Cpu => CellValue::Int(self.cpu),
            JobField::Memory => CellValue::Text(self.memory.clone()),
            JobField::EphemeralStorage => CellValue::Text(self.ephemeral_storage.clone()),
            JobField::Submitted => CellValue::Timestamp(self.submitted),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchType {
    Exact,
}

/// Equality predicate on one job field. Filters in a request are ANDed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobFilter {
    pub field: JobField,
    pub value: String,
    pub match_type: MatchType,
}

impl JobFilter {
    pub fn exact(field: JobField, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
            match_type: MatchType::Exact,
        }
    }

    pub fn matches(&self, job: &Job) -> bool {
        match self.match_type {
            MatchType::Exact => job.value(self.field).to_string() == self.value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Sort order of a lookup. For job lookups `field` names a [`JobField`];
/// group lookups additionally accept `name`, `count` and aggregate fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobOrder {
    pub field: String,
    pub direction: SortDirection,
}

impl JobOrder {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }

    pub fn apply(&self, ordering: Ordering) -> Ordering {
        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Take {
    Limit(usize),
    Unbounded,
}

impl Take {
    pub fn limit(self) -> Option<usize> {
        match self {
            Take::Limit(n) => Some(n),
            Take::Unbounded => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobGroup {
    pub name: String,
    pub count: u64,
    #[serde(default)]
    pub aggregates: BTreeMap<JobField, CellValue>,
}
