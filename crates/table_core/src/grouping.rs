use shared::domain::JobField;
use thiserror::Error;

use crate::columns::TableOptions;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GroupingError {
    #[error("field '{0}' is already grouped")]
    Duplicate(JobField),
    #[error("field '{0}' cannot be grouped")]
    NotGroupable(JobField),
    #[error("grouping level {index} does not exist (levels: {len})")]
    OutOfRange { index: usize, len: usize },
}

/// Ordered grouping levels, outermost first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grouping(Vec<JobField>);

impl Grouping {
    pub fn new(fields: impl IntoIterator<Item = JobField>) -> Self {
        Self(fields.into_iter().collect())
    }

    pub fn fields(&self) -> &[JobField] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The field that splits rows at `depth`; `None` once every level is
    /// used up and only leaves remain.
    pub fn level(&self, depth: usize) -> Option<JobField> {
        self.0.get(depth).copied()
    }

    pub fn validate(&self, options: &TableOptions) -> Result<(), GroupingError> {
        for (index, field) in self.0.iter().enumerate() {
            if !options.is_groupable(*field) {
                return Err(GroupingError::NotGroupable(*field));
            }
            if self.0[..index].contains(field) {
                return Err(GroupingError::Duplicate(*field));
            }
        }
        Ok(())
    }

    /// Adds a new innermost level.
    pub fn push(&self, field: JobField) -> Result<Self, GroupingError> {
        if self.0.contains(&field) {
            return Err(GroupingError::Duplicate(field));
        }
        let mut fields = self.0.clone();
        fields.push(field);
        Ok(Self(fields))
    }

    /// Swaps the field at `index`; every level to its right is dropped.
    pub fn replace_at(&self, index: usize, field: JobField) -> Result<Self, GroupingError> {
        if index >= self.0.len() {
            return Err(GroupingError::OutOfRange {
                index,
                len: self.0.len(),
            });
        }
        let kept = &self.0[..index];
        if kept.contains(&field) {
            return Err(GroupingError::Duplicate(field));
        }
        let mut fields = kept.to_vec();
        fields.push(field);
        Ok(Self(fields))
    }

    pub fn remove_at(&self, index: usize) -> Result<Self, GroupingError> {
        if index >= self.0.len() {
            return Err(GroupingError::OutOfRange {
                index,
                len: self.0.len(),
            });
        }
        let mut fields = self.0.clone();
        fields.remove(index);
        Ok(Self(fields))
    }

    /// Groupable columns not used by any level yet.
    pub fn available(&self, options: &TableOptions) -> Vec<JobField> {
        options
            .columns
            .iter()
            .filter(|c| c.groupable && !self.0.contains(&c.key))
            .map(|c| c.key)
            .collect()
    }
}

impl From<Vec<JobField>> for Grouping {
    fn from(fields: Vec<JobField>) -> Self {
        Self(fields)
    }
}
