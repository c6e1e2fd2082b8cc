use std::{collections::HashMap, fs, path::Path};

use table_core::DEFAULT_PAGE_SIZE;
use tracing::warn;

pub const DEFAULT_CONFIG_FILE: &str = "jobs_table.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub page_size: usize,
    pub num_jobs: usize,
    pub num_queues: usize,
    pub num_job_sets: usize,
    pub seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            num_jobs: 10_000,
            num_queues: 10,
            num_job_sets: 50,
            seed: 42,
        }
    }
}

pub fn load_settings(config_path: Option<&Path>) -> Settings {
    let path = config_path.unwrap_or(Path::new(DEFAULT_CONFIG_FILE));
    load_settings_from(path, |key| std::env::var(key).ok())
}

/// Defaults, then the flat key/value table in `path` if it exists, then
/// `JOBS_TABLE__*` variables looked up through `env`.
pub fn load_settings_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<HashMap<String, String>>(&raw) {
            Ok(file_cfg) => {
                for (key, value) in &file_cfg {
                    settings.apply(key, value, &path.display().to_string());
                }
            }
            Err(err) => warn!(path = %path.display(), %err, "config: ignoring unreadable file"),
        }
    }

    for key in Settings::KEYS {
        let var = format!("JOBS_TABLE__{}", key.to_ascii_uppercase());
        if let Some(value) = env(&var) {
            settings.apply(key, &value, &var);
        }
    }

    settings
}

impl Settings {
    const KEYS: [&'static str; 5] = ["page_size", "num_jobs", "num_queues", "num_job_sets", "seed"];

    fn apply(&mut self, key: &str, value: &str, source: &str) {
        let parsed = value.trim().parse::<u64>();
        let Ok(parsed) = parsed else {
            warn!(key, value, source, "config: expected a non-negative integer");
            return;
        };
        match key {
            "page_size" if parsed > 0 => self.page_size = parsed as usize,
            "num_jobs" => self.num_jobs = parsed as usize,
            "num_queues" if parsed > 0 => self.num_queues = parsed as usize,
            "num_job_sets" if parsed > 0 => self.num_job_sets = parsed as usize,
            "seed" => self.seed = parsed,
            _ => warn!(key, value, source, "config: ignoring setting"),
        }
    }
}
