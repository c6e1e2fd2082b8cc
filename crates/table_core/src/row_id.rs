//! Reversible identifiers for positions in the grouping tree.
//!
//! A row id is a chain of `type:value` segments joined by `>`, read from the
//! root level down, e.g. `queue:queue-2>jobSet:set-1>job:17`.

use std::fmt;

use shared::domain::{JobField, JobFilter};
use thiserror::Error;

pub const LEVEL_SEPARATOR: char = '>';
pub const TYPE_SEPARATOR: char = ':';
pub const LEAF_SEGMENT_TYPE: &str = "job";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowIdError {
    #[error("invalid row id segment '{kind}:{value}': {reason}")]
    InvalidSegment {
        kind: String,
        value: String,
        reason: &'static str,
    },
    #[error("malformed row id '{row_id}': {reason}")]
    Malformed {
        row_id: String,
        reason: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowId(String);

impl RowId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn parse(raw: &str) -> Result<Self, RowIdError> {
        decode(raw).map(|decoded| decoded.row_id)
    }

    /// Number of segments, i.e. the depth of the node counting from 1.
    pub fn depth(&self) -> usize {
        self.0.split(LEVEL_SEPARATOR).count()
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RowId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub kind: String,
    pub value: String,
}

impl Segment {
    pub fn new(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: value.into(),
        }
    }

    pub fn group(field: JobField, value: impl Into<String>) -> Self {
        Self::new(field.as_str(), value)
    }

    pub fn leaf(job_id: impl Into<String>) -> Self {
        Self::new(LEAF_SEGMENT_TYPE, job_id)
    }

    /// The grouping field this segment stands for; `None` for leaf segments
    /// and unknown types.
    pub fn field(&self) -> Option<JobField> {
        self.kind.parse().ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedRowId {
    pub row_id: RowId,
    pub segments: Vec<Segment>,
    pub path_from_root: Vec<RowId>,
}

impl DecodedRowId {
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// One equality filter per grouping segment. Segments whose type is not a
    /// job field (the leaf segment) contribute nothing.
    pub fn filters(&self) -> Vec<JobFilter> {
        self.segments
            .iter()
            .filter_map(|segment| {
                segment
                    .field()
                    .map(|field| JobFilter::exact(field, segment.value.clone()))
            })
            .collect()
    }
}

pub fn encode(segment: &Segment, parent: Option<&RowId>) -> Result<RowId, RowIdError> {
    validate_segment(segment)?;
    let part = format!("{}{TYPE_SEPARATOR}{}", segment.kind, segment.value);
    Ok(match parent {
        Some(parent) => RowId(format!("{}{LEVEL_SEPARATOR}{part}", parent.0)),
        None => RowId(part),
    })
}

pub fn decode(raw: &str) -> Result<DecodedRowId, RowIdError> {
    let malformed = |reason| RowIdError::Malformed {
        row_id: raw.to_string(),
        reason,
    };

    if raw.is_empty() {
        return Err(malformed("empty row id"));
    }

    let mut segments = Vec::new();
    let mut path_from_root = Vec::new();
    let mut prefix_end = 0;
    for part in raw.split(LEVEL_SEPARATOR) {
        if part.is_empty() {
            return Err(malformed("empty segment"));
        }
        let (kind, value) = part
            .split_once(TYPE_SEPARATOR)
            .ok_or_else(|| malformed("segment is missing ':'"))?;
        if kind.is_empty() {
            return Err(malformed("segment has an empty type"));
        }
        if value.contains(TYPE_SEPARATOR) {
            return Err(malformed("segment value contains ':'"));
        }

        prefix_end += if segments.is_empty() {
            part.len()
        } else {
            part.len() + LEVEL_SEPARATOR.len_utf8()
        };
        segments.push(Segment::new(kind, value));
        path_from_root.push(RowId(raw[..prefix_end].to_string()));
    }

    Ok(DecodedRowId {
        row_id: RowId(raw.to_string()),
        segments,
        path_from_root,
    })
}

fn validate_segment(segment: &Segment) -> Result<(), RowIdError> {
    let invalid = |reason| RowIdError::InvalidSegment {
        kind: segment.kind.clone(),
        value: segment.value.clone(),
        reason,
    };

    if segment.kind.is_empty() {
        return Err(invalid("type must not be empty"));
    }
    let reserved = [LEVEL_SEPARATOR, TYPE_SEPARATOR];
    if segment.kind.contains(&reserved[..]) {
        return Err(invalid("type contains a reserved delimiter"));
    }
    if segment.value.contains(&reserved[..]) {
        return Err(invalid("value contains a reserved delimiter"));
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/row_id_tests.rs"]
mod tests;
