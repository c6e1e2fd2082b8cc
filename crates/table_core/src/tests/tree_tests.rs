use std::{collections::BTreeMap, sync::Arc};

use shared::domain::JobField;

use super::*;
use crate::rows::{Children, GroupRow, Row};

fn group(raw_id: &str, children: Option<Vec<RowRef>>) -> RowRef {
    Arc::new(Row::Group(GroupRow {
        row_id: RowId::parse(raw_id).expect("row id"),
        field: JobField::Queue,
        value: raw_id.to_string(),
        count: 0,
        aggregates: BTreeMap::new(),
        children: match children {
            Some(rows) => Children::Fetched(Arc::from(rows)),
            None => Children::Unfetched,
        },
    }))
}

fn row_id(raw: &str) -> RowId {
    RowId::parse(raw).expect("row id")
}

fn sample() -> RowSeq {
    Arc::from(vec![
        group(
            "queue:a",
            Some(vec![
                group("queue:a>jobSet:1", Some(vec![group("queue:a>jobSet:1>owner:x", None)])),
                group("queue:a>jobSet:2", None),
            ]),
        ),
        group("queue:b", None),
    ])
}

#[test]
fn collapsed_groups_hide_their_children() {
    let roots = sample();
    let visible = flatten_visible(&roots, &ExpansionState::default());
    assert_eq!(visible.len(), 2);
    assert!(visible.iter().all(|v| v.depth == 0));
}

#[test]
fn expanded_groups_show_children_in_pre_order() {
    let roots = sample();
    let expansion: ExpansionState = [row_id("queue:a"), row_id("queue:a>jobSet:1")]
        .into_iter()
        .collect();

    let visible: Vec<(String, usize)> = flatten_visible(&roots, &expansion)
        .into_iter()
        .map(|v| (v.row.row_id().to_string(), v.depth))
        .collect();

    assert_eq!(
        visible,
        vec![
            ("queue:a".to_string(), 0),
            ("queue:a>jobSet:1".to_string(), 1),
            ("queue:a>jobSet:1>owner:x".to_string(), 2),
            ("queue:a>jobSet:2".to_string(), 1),
            ("queue:b".to_string(), 0),
        ]
    );
}

#[test]
fn nested_expansion_under_a_collapsed_parent_stays_hidden() {
    let roots = sample();
    let expansion: ExpansionState = [row_id("queue:a>jobSet:1")].into_iter().collect();
    assert_eq!(flatten_visible(&roots, &expansion).len(), 2);
}

#[test]
fn finds_rows_by_path() {
    let roots = sample();
    let found = find_by_path(
        &roots,
        &[row_id("queue:a"), row_id("queue:a>jobSet:2")],
    )
    .expect("found");
    assert_eq!(found.row_id().as_str(), "queue:a>jobSet:2");

    assert!(find_by_path(&roots, &[row_id("queue:c")]).is_none());
    assert!(find_by_path(&roots, &[]).is_none());
    assert!(find_by_path(&roots, &[row_id("queue:b"), row_id("queue:b>jobSet:1")]).is_none());
}

#[test]
fn counts_materialized_nodes_at_every_depth() {
    assert_eq!(materialized_len(&sample()), 5);
}
