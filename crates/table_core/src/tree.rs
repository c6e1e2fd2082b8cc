use crate::{
    expansion::ExpansionState,
    row_id::RowId,
    rows::{RowRef, RowSeq},
};

/// A row as the display layer lays it out: depth 0 for root rows.
#[derive(Debug, Clone)]
pub struct VisibleRow {
    pub row: RowRef,
    pub depth: usize,
}

/// Flattens the tree into display order.
///
/// Only expanded groups contribute their fetched children; a collapsed group
/// keeps its subtree but hides it.
pub fn flatten_visible(roots: &RowSeq, expansion: &ExpansionState) -> Vec<VisibleRow> {
    let mut out = Vec::new();
    for row in roots.iter() {
        push_visible(row, 0, expansion, &mut out);
    }
    out
}

fn push_visible(row: &RowRef, depth: usize, expansion: &ExpansionState, out: &mut Vec<VisibleRow>) {
    out.push(VisibleRow {
        row: RowRef::clone(row),
        depth,
    });
    let Some(group) = row.as_group() else {
        return;
    };
    if !expansion.is_expanded(&group.row_id) {
        return;
    }
    if let Some(children) = group.children.fetched() {
        for child in children.iter() {
            push_visible(child, depth + 1, expansion, out);
        }
    }
}

/// Resolves a root-to-node chain of row ids, as produced by
/// `DecodedRowId::path_from_root`.
pub fn find_by_path(roots: &RowSeq, path: &[RowId]) -> Option<RowRef> {
    let (last, ancestors) = path.split_last()?;
    let mut level = roots.clone();
    for step in ancestors {
        let row = level.iter().find(|row| row.row_id() == step)?;
        level = row.as_group()?.children.fetched()?.clone();
    }
    level.iter().find(|row| row.row_id() == last).cloned()
}

/// Number of nodes held in memory, at any depth.
pub fn materialized_len(roots: &RowSeq) -> usize {
    roots
        .iter()
        .map(|row| {
            1 + row
                .as_group()
                .and_then(|group| group.children.fetched())
                .map(materialized_len)
                .unwrap_or(0)
        })
        .sum()
}

#[cfg(test)]
#[path = "tests/tree_tests.rs"]
mod tests;
