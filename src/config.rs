use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub data_path: PathBuf,
    pub output_dir: PathBuf,
    pub top_n: usize,
    pub page_size: usize,
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("dashboard_data.json"),
            output_dir: PathBuf::from("."),
            top_n: 10,
            page_size: 10,
            log_filter: "info".into(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Missing or unparsable
    /// values fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            data_path: lookup("DASHBOARD_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_path),
            output_dir: lookup("DASHBOARD_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            top_n: positive(lookup("DASHBOARD_TOP_N")).unwrap_or(defaults.top_n),
            page_size: positive(lookup("DASHBOARD_PAGE_SIZE")).unwrap_or(defaults.page_size),
            log_filter: lookup("DASHBOARD_LOG").unwrap_or(defaults.log_filter),
        }
    }

    pub fn output_path(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(file_name)
    }
}

fn positive(value: Option<String>) -> Option<usize> {
    value
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|n| *n > 0)
}
