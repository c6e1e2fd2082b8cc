use serde_json::{json, Map, Value};
use table_core::{Row, TableOptions, TableSnapshot, VisibleRow};

/// One text line per visible row, indented by depth.
pub fn render_text(
    snapshot: &TableSnapshot,
    options: &TableOptions,
    expanded: impl Fn(&Row) -> bool,
) -> Vec<String> {
    let mut lines: Vec<String> = snapshot
        .visible
        .iter()
        .map(|visible| {
            let indent = "  ".repeat(visible.depth);
            match visible.row.as_ref() {
                Row::Group(group) => {
                    let marker = if expanded(visible.row.as_ref()) { "-" } else { "+" };
                    let aggregates: Vec<String> = group
                        .aggregates
                        .iter()
                        .filter(|(field, _)| **field != group.field)
                        .map(|(field, value)| format!("{field}={value}"))
                        .collect();
                    let mut line = format!(
                        "{indent}{marker} {}: {} ({})",
                        group.field, group.value, group.count
                    );
                    if !aggregates.is_empty() {
                        line.push_str(&format!(" [{}]", aggregates.join(", ")));
                    }
                    line
                }
                Row::Leaf(leaf) => {
                    let cells: Vec<String> = options
                        .selected_columns()
                        .map(|column| leaf.cell(column.key).to_string())
                        .collect();
                    format!("{indent}  {}", cells.join(" | "))
                }
            }
        })
        .collect();

    lines.push(footer(snapshot));
    lines
}

pub fn footer(snapshot: &TableSnapshot) -> String {
    format!(
        "page {}/{} ({} rows, page size {})",
        snapshot.page_index + 1,
        snapshot.page_count.max(1),
        snapshot.total_row_count,
        snapshot.page_size
    )
}

pub fn row_json(visible: &VisibleRow) -> Value {
    match visible.row.as_ref() {
        Row::Group(group) => {
            let aggregates: Map<String, Value> = group
                .aggregates
                .iter()
                .map(|(field, value)| (field.to_string(), json!(value)))
                .collect();
            json!({
                "rowId": visible.row.row_id().as_str(),
                "depth": visible.depth,
                "field": group.field,
                "value": group.value,
                "count": group.count,
                "aggregates": aggregates,
            })
        }
        Row::Leaf(leaf) => json!({
            "rowId": visible.row.row_id().as_str(),
            "depth": visible.depth,
            "job": leaf.job,
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use job_store::make_test_jobs;
    use shared::domain::{CellValue, JobField};
    use table_core::{
        rows::{project_groups, project_leaves},
        FetchStatus, Grouping,
    };

    use super::*;

    fn snapshot(visible: Vec<VisibleRow>, total_row_count: usize) -> TableSnapshot {
        TableSnapshot {
            roots: Arc::from(visible.iter().map(|v| v.row.clone()).collect::<Vec<_>>()),
            visible,
            grouping: Grouping::default(),
            page_index: 0,
            page_size: 30,
            page_count: 1,
            total_row_count,
            loaded: true,
            status: FetchStatus::Idle,
            error: None,
        }
    }

    #[test]
    fn renders_groups_with_markers_and_aggregates() {
        let rows = project_groups(
            vec![shared::domain::JobGroup {
                name: "queue-0".into(),
                count: 4,
                aggregates: [
                    (JobField::Queue, CellValue::from("queue-0")),
                    (JobField::Owner, CellValue::from("alice")),
                ]
                .into_iter()
                .collect(),
            }],
            None,
            JobField::Queue,
        )
        .expect("project");
        let visible = vec![VisibleRow {
            row: rows[0].clone(),
            depth: 0,
        }];

        let lines = render_text(&snapshot(visible, 1), &TableOptions::default(), |_| false);
        assert_eq!(lines[0], "+ queue: queue-0 (4) [owner=alice]");
        assert_eq!(lines[1], "page 1/1 (1 rows, page size 30)");
    }

    #[test]
    fn renders_leaves_with_selected_columns() {
        let jobs = make_test_jobs(1, 5, 1, 1);
        let rows = project_leaves(jobs, None).expect("project");
        let visible = vec![VisibleRow {
            row: rows[0].clone(),
            depth: 1,
        }];

        let lines = render_text(
            &snapshot(visible.clone(), 1),
            &TableOptions::default(),
            |_| false,
        );
        assert!(lines[0].starts_with("    0 | job-set-0 | queue-0 | "));

        let value = row_json(&visible[0]);
        assert_eq!(value["rowId"], "job:0");
        assert_eq!(value["job"]["jobId"], "0");
    }
}
