mod config;
mod render;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use job_store::{make_test_jobs, InMemoryJobStore};
use shared::domain::JobField;
use table_core::{Grouping, JobsTable, RowId, TableEvent, TableOptions};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::load_settings;

/// Browse a generated job list as a lazily loaded, grouped table.
#[derive(Parser, Debug)]
struct Args {
    /// Settings file; defaults to ./jobs_table.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Grouping levels, outermost first (e.g. `queue,jobSet`).
    #[arg(long, value_delimiter = ',')]
    group_by: Vec<JobField>,
    /// Row ids to expand, applied in order (e.g. `queue:queue-0`).
    #[arg(long)]
    expand: Vec<String>,
    /// Zero-based page index.
    #[arg(long, default_value_t = 0)]
    page: usize,
    #[arg(long)]
    page_size: Option<usize>,
    #[arg(long)]
    jobs: Option<usize>,
    #[arg(long)]
    seed: Option<u64>,
    /// Print visible rows as JSON lines.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings(args.config.as_deref());
    if let Some(page_size) = args.page_size {
        settings.page_size = page_size;
    }
    if let Some(jobs) = args.jobs {
        settings.num_jobs = jobs;
    }
    if let Some(seed) = args.seed {
        settings.seed = seed;
    }
    info!(?settings, "jobs_cli: starting");

    let store = Arc::new(InMemoryJobStore::new(make_test_jobs(
        settings.num_jobs,
        settings.seed,
        settings.num_queues,
        settings.num_job_sets,
    )));
    let options = TableOptions {
        page_size: settings.page_size,
        ..TableOptions::default()
    };
    let table = JobsTable::new_with_services(options.clone(), store.clone(), store);

    if args.group_by.is_empty() {
        table.load().await.context("failed to load jobs")?;
    } else {
        table
            .dispatch(TableEvent::SetGrouping(Grouping::new(args.group_by)))
            .await
            .context("failed to group jobs")?;
    }
    if args.page > 0 {
        table
            .dispatch(TableEvent::SetPageIndex(args.page))
            .await
            .context("failed to load page")?;
    }
    for raw in &args.expand {
        let row_id = RowId::parse(raw).with_context(|| format!("invalid row id '{raw}'"))?;
        table
            .dispatch(TableEvent::ToggleExpanded(row_id))
            .await
            .with_context(|| format!("failed to expand '{raw}'"))?;
    }

    let snapshot = table.snapshot();
    if args.json {
        for visible in &snapshot.visible {
            println!("{}", serde_json::to_string(&render::row_json(visible))?);
        }
        return Ok(());
    }

    let state = table.state().await;
    for line in render::render_text(&snapshot, &options, |row| {
        state.expansion().is_expanded(row.row_id())
    }) {
        println!("{line}");
    }
    Ok(())
}
