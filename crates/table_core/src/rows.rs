use std::{collections::BTreeMap, sync::Arc};

use shared::domain::{CellValue, Job, JobField, JobGroup};

use crate::row_id::{encode, RowId, RowIdError, Segment};

pub type RowRef = Arc<Row>;

/// An immutable sequence of sibling rows. Cloning is cheap and keeps the
/// identity of every row in it.
pub type RowSeq = Arc<[RowRef]>;

pub fn empty_rows() -> RowSeq {
    Arc::from(Vec::<RowRef>::new())
}

#[derive(Debug, Clone, PartialEq)]
pub enum Row {
    Group(GroupRow),
    Leaf(LeafRow),
}

impl Row {
    pub fn row_id(&self) -> &RowId {
        match self {
            Row::Group(group) => &group.row_id,
            Row::Leaf(leaf) => &leaf.row_id,
        }
    }

    pub fn as_group(&self) -> Option<&GroupRow> {
        match self {
            Row::Group(group) => Some(group),
            Row::Leaf(_) => None,
        }
    }

    pub fn as_leaf(&self) -> Option<&LeafRow> {
        match self {
            Row::Leaf(leaf) => Some(leaf),
            Row::Group(_) => None,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Row::Group(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Children {
    Unfetched,
    Fetched(RowSeq),
}

impl Children {
    pub fn fetched(&self) -> Option<&RowSeq> {
        match self {
            Children::Fetched(rows) => Some(rows),
            Children::Unfetched => None,
        }
    }

    pub fn is_fetched(&self) -> bool {
        matches!(self, Children::Fetched(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupRow {
    pub row_id: RowId,
    pub field: JobField,
    pub value: String,
    pub count: u64,
    pub aggregates: BTreeMap<JobField, CellValue>,
    pub children: Children,
}

impl GroupRow {
    pub fn with_children(&self, children: Children) -> Self {
        Self {
            children,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeafRow {
    pub row_id: RowId,
    pub job: Job,
}

impl LeafRow {
    pub fn cell(&self, field: JobField) -> CellValue {
        self.job.value(field)
    }
}

/// Leaf rows for `jobs`, nested under `parent` when the jobs belong to an
/// expanded group.
pub fn project_leaves(jobs: Vec<Job>, parent: Option<&RowId>) -> Result<Vec<RowRef>, RowIdError> {
    jobs.into_iter()
        .map(|job| {
            let row_id = encode(&Segment::leaf(job.job_id.as_str()), parent)?;
            Ok(Arc::new(Row::Leaf(LeafRow { row_id, job })))
        })
        .collect()
}

pub fn project_groups(
    groups: Vec<JobGroup>,
    parent: Option<&RowId>,
    grouped_field: JobField,
) -> Result<Vec<RowRef>, RowIdError> {
    groups
        .into_iter()
        .map(|group| {
            let row_id = encode(&Segment::group(grouped_field, group.name.as_str()), parent)?;
            Ok(Arc::new(Row::Group(GroupRow {
                row_id,
                field: grouped_field,
                value: group.name,
                count: group.count,
                aggregates: group.aggregates,
                children: Children::Unfetched,
            })))
        })
        .collect()
}

#[cfg(test)]
#[path = "tests/rows_tests.rs"]
mod tests;
