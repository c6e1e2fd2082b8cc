//! Splicing freshly fetched rows into a partially materialized tree.
//!
//! Rows are immutable and shared through `Arc`. A merge rebuilds only the
//! chain of groups from the root to the target, so every row on that chain is
//! a new allocation while every row off it keeps its identity. Consumers can
//! skip unchanged subtrees with `Arc::ptr_eq`.

use std::sync::Arc;

use tracing::debug;

use crate::{
    row_id::RowId,
    rows::{Children, Row, RowRef, RowSeq},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMode {
    Replace,
    Append,
}

#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub roots: RowSeq,
    /// The rebuilt target group; `None` for root replacement and for merges
    /// whose path no longer resolves.
    pub target: Option<RowRef>,
}

/// Merges `new_rows` as the children of the group at `target_path`.
///
/// An empty path replaces the whole root sequence. A path that does not
/// resolve against `existing` leaves the tree untouched and reports no
/// target.
pub fn merge_sub_rows(
    existing: &RowSeq,
    new_rows: Vec<RowRef>,
    target_path: &[RowId],
    mode: MergeMode,
) -> MergeOutcome {
    let Some((first, rest)) = target_path.split_first() else {
        return MergeOutcome {
            roots: Arc::from(new_rows),
            target: None,
        };
    };

    match rebuild_level(existing, first, rest, new_rows, mode) {
        Some((roots, target)) => MergeOutcome {
            roots,
            target: Some(target),
        },
        None => {
            debug!(
                target_row = %target_path[target_path.len() - 1],
                depth = target_path.len(),
                "table: merge path not found, keeping tree"
            );
            MergeOutcome {
                roots: Arc::clone(existing),
                target: None,
            }
        }
    }
}

fn rebuild_level(
    level: &RowSeq,
    step: &RowId,
    rest: &[RowId],
    new_rows: Vec<RowRef>,
    mode: MergeMode,
) -> Option<(RowSeq, RowRef)> {
    let index = level.iter().position(|row| row.row_id() == step)?;
    let group = level[index].as_group()?;

    let (node, target) = match rest.split_first() {
        None => {
            let children: RowSeq = match (mode, &group.children) {
                (MergeMode::Append, Children::Fetched(existing)) => {
                    existing.iter().cloned().chain(new_rows).collect()
                }
                _ => Arc::from(new_rows),
            };
            let node = Arc::new(Row::Group(group.with_children(Children::Fetched(children))));
            (Arc::clone(&node), node)
        }
        Some((next, rest)) => {
            let current = group.children.fetched()?;
            let (children, target) = rebuild_level(current, next, rest, new_rows, mode)?;
            let node = Arc::new(Row::Group(group.with_children(Children::Fetched(children))));
            (node, target)
        }
    };

    let mut rows = level.to_vec();
    rows[index] = node;
    Some((Arc::from(rows), target))
}

#[cfg(test)]
#[path = "tests/merge_tests.rs"]
mod tests;
