use serde::{Deserialize, Serialize};
use shared::domain::{JobField, JobOrder};

pub const PAGE_SIZE_OPTIONS: [usize; 5] = [10, 20, 30, 40, 50];
pub const DEFAULT_PAGE_SIZE: usize = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub key: JobField,
    pub name: String,
    pub groupable: bool,
    pub selected: bool,
}

impl ColumnSpec {
    fn new(key: JobField, name: &str, groupable: bool, selected: bool) -> Self {
        Self {
            key,
            name: name.to_string(),
            groupable,
            selected,
        }
    }
}

pub fn default_column_specs() -> Vec<ColumnSpec> {
    vec![
        ColumnSpec::new(JobField::JobId, "Job Id", false, true),
        ColumnSpec::new(JobField::JobSet, "Job Set", true, true),
        ColumnSpec::new(JobField::Queue, "Queue", true, true),
        ColumnSpec::new(JobField::State, "State", true, true),
        ColumnSpec::new(JobField::Owner, "Owner", true, true),
        ColumnSpec::new(JobField::Cpu, "CPU", false, true),
        ColumnSpec::new(JobField::Memory, "Memory", false, true),
        ColumnSpec::new(JobField::EphemeralStorage, "Ephemeral Storage", false, true),
        ColumnSpec::new(JobField::Submitted, "Submitted", false, false),
    ]
}

/// Engine-side configuration of a jobs table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableOptions {
    pub page_size: usize,
    pub columns: Vec<ColumnSpec>,
    pub job_order: JobOrder,
    pub group_order: JobOrder,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            columns: default_column_specs(),
            job_order: JobOrder::asc(JobField::JobId.as_str()),
            group_order: JobOrder::asc("name"),
        }
    }
}

impl TableOptions {
    pub fn column(&self, field: JobField) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.key == field)
    }

    pub fn is_groupable(&self, field: JobField) -> bool {
        self.column(field).is_some_and(|c| c.groupable)
    }

    /// Fields a group lookup aggregates: the selected groupable columns.
    pub fn aggregate_fields(&self) -> Vec<JobField> {
        self.columns
            .iter()
            .filter(|c| c.selected && c.groupable)
            .map(|c| c.key)
            .collect()
    }

    pub fn selected_columns(&self) -> impl Iterator<Item = &ColumnSpec> {
        self.columns.iter().filter(|c| c.selected)
    }
}
