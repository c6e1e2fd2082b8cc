use std::collections::BTreeMap;

use shared::domain::JobField;

use super::*;
use crate::rows::GroupRow;

fn group(raw_id: &str, children: Option<Vec<RowRef>>) -> RowRef {
    let row_id = RowId::parse(raw_id).expect("row id");
    let value = raw_id.rsplit(':').next().unwrap_or_default().to_string();
    Arc::new(Row::Group(GroupRow {
        row_id,
        field: JobField::Queue,
        value,
        count: 0,
        aggregates: BTreeMap::new(),
        children: match children {
            Some(rows) => Children::Fetched(Arc::from(rows)),
            None => Children::Unfetched,
        },
    }))
}

fn path(raw: &[&str]) -> Vec<RowId> {
    raw.iter()
        .map(|r| RowId::parse(r).expect("row id"))
        .collect()
}

fn ids(rows: &RowSeq) -> Vec<String> {
    rows.iter().map(|row| row.row_id().to_string()).collect()
}

fn children_of(row: &RowRef) -> RowSeq {
    row.as_group()
        .and_then(|g| g.children.fetched())
        .cloned()
        .expect("fetched children")
}

#[test]
fn returns_given_rows_if_no_parent_path_given() {
    let existing: RowSeq = Arc::from(vec![group("fruit:apple", None)]);
    let new_rows = vec![group("fruit:banana", None)];

    let outcome = merge_sub_rows(&existing, new_rows.clone(), &[], MergeMode::Replace);

    assert_eq!(ids(&outcome.roots), vec!["fruit:banana"]);
    assert!(Arc::ptr_eq(&outcome.roots[0], &new_rows[0]));
    assert!(outcome.target.is_none());
}

#[test]
fn merges_in_new_rows_at_the_correct_location() {
    let existing: RowSeq = Arc::from(vec![
        group("fruit:apple", Some(Vec::new())),
        group("fruit:banana", Some(Vec::new())),
    ]);
    let new_rows = vec![group("fruit:banana>taste:delicious", None)];

    let outcome = merge_sub_rows(
        &existing,
        new_rows,
        &path(&["fruit:banana"]),
        MergeMode::Replace,
    );

    assert_eq!(ids(&outcome.roots), vec!["fruit:apple", "fruit:banana"]);
    assert!(children_of(&outcome.roots[0]).is_empty());
    assert_eq!(
        ids(&children_of(&outcome.roots[1])),
        vec!["fruit:banana>taste:delicious"]
    );
    let target = outcome.target.expect("target");
    assert!(Arc::ptr_eq(&target, &outcome.roots[1]));
}

#[test]
fn does_not_touch_the_tree_if_merging_failed() {
    let existing: RowSeq = Arc::from(vec![
        group("fruit:apple", Some(Vec::new())),
        group("fruit:banana", Some(Vec::new())),
    ]);

    let outcome = merge_sub_rows(
        &existing,
        vec![group("taste:delicious", None)],
        &path(&["fruit:avocado"]),
        MergeMode::Replace,
    );

    assert!(Arc::ptr_eq(&outcome.roots, &existing));
    assert_eq!(*outcome.roots, *existing);
    assert!(outcome.target.is_none());
}

#[test]
fn unresolved_nested_path_is_a_no_op() {
    let existing: RowSeq = Arc::from(vec![group(
        "fruit:apple",
        Some(vec![group("fruit:apple>color:green", None)]),
    )]);

    for target in [
        vec!["fruit:apple", "fruit:apple>color:red"],
        vec!["fruit:apple", "fruit:apple>color:green", "fruit:apple>color:green>size:s"],
    ] {
        let outcome = merge_sub_rows(
            &existing,
            vec![group("taste:sour", None)],
            &path(&target),
            MergeMode::Replace,
        );
        assert!(Arc::ptr_eq(&outcome.roots, &existing));
        assert!(outcome.target.is_none());
    }
}

#[test]
fn overrides_existing_sub_rows_if_not_appending() {
    let existing: RowSeq = Arc::from(vec![group(
        "fruit:apple",
        Some(vec![group("fruit:apple>color:green", None)]),
    )]);

    let outcome = merge_sub_rows(
        &existing,
        vec![group("fruit:apple>taste:delicious", None)],
        &path(&["fruit:apple"]),
        MergeMode::Replace,
    );

    assert_eq!(
        ids(&children_of(&outcome.roots[0])),
        vec!["fruit:apple>taste:delicious"]
    );
}

#[test]
fn appends_to_existing_sub_rows_if_appending() {
    let green = group("fruit:apple>color:green", None);
    let existing: RowSeq = Arc::from(vec![group("fruit:apple", Some(vec![green.clone()]))]);

    let outcome = merge_sub_rows(
        &existing,
        vec![group("fruit:apple>taste:delicious", None)],
        &path(&["fruit:apple"]),
        MergeMode::Append,
    );

    let children = children_of(&outcome.roots[0]);
    assert_eq!(
        ids(&children),
        vec!["fruit:apple>color:green", "fruit:apple>taste:delicious"]
    );
    assert!(Arc::ptr_eq(&children[0], &green));
}

#[test]
fn appending_to_unfetched_children_starts_a_new_list() {
    let existing: RowSeq = Arc::from(vec![group("fruit:apple", None)]);

    let outcome = merge_sub_rows(
        &existing,
        vec![group("fruit:apple>taste:delicious", None)],
        &path(&["fruit:apple"]),
        MergeMode::Append,
    );

    assert_eq!(
        ids(&children_of(&outcome.roots[0])),
        vec!["fruit:apple>taste:delicious"]
    );
}

#[test]
fn rebuilds_the_path_and_keeps_siblings() {
    let deep_sibling = group("q:a>s:2", None);
    let untouched_root = group("q:b", Some(vec![group("q:b>s:1", None)]));
    let existing: RowSeq = Arc::from(vec![
        group("q:a", Some(vec![group("q:a>s:1", None), deep_sibling.clone()])),
        untouched_root.clone(),
    ]);

    let outcome = merge_sub_rows(
        &existing,
        vec![group("q:a>s:1>o:x", None)],
        &path(&["q:a", "q:a>s:1"]),
        MergeMode::Replace,
    );

    assert!(!Arc::ptr_eq(&outcome.roots, &existing));
    assert!(!Arc::ptr_eq(&outcome.roots[0], &existing[0]));
    assert!(Arc::ptr_eq(&outcome.roots[1], &untouched_root));

    let level_two = children_of(&outcome.roots[0]);
    let old_level_two = children_of(&existing[0]);
    assert!(!Arc::ptr_eq(&level_two[0], &old_level_two[0]));
    assert!(Arc::ptr_eq(&level_two[1], &deep_sibling));

    let target = outcome.target.expect("target");
    assert!(Arc::ptr_eq(&target, &level_two[0]));
    assert_eq!(ids(&children_of(&target)), vec!["q:a>s:1>o:x"]);

    // The input tree is left as it was.
    assert!(children_of(&existing[0])[0]
        .as_group()
        .expect("group")
        .children
        .fetched()
        .is_none());
}
