use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;

use crate::error::ReportError;
use crate::types::TableId;

const DEFAULT_JOBS_REGION: &str = "region-us";

/// Raw settings as read from `config.toml`, before environment overrides
/// and validation.
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub project_id: Option<String>,
    pub bucket_name: Option<String>,
    pub main_table_name: Option<String>,
    pub tracked_datasets: Vec<String>,
    pub billing_project_id: Option<String>,
    pub billing_dataset_id: Option<String>,
    pub jobs_region: Option<String>,
    pub warehouse_path: Option<PathBuf>,
    pub bucket_root: Option<PathBuf>,
    pub billing_db_path: Option<PathBuf>,
}

/// Where the usage data lives and what the storage report covers.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceSettings {
    /// Project holding the tracked datasets and the bucket.
    pub project_id: String,
    pub bucket_name: String,
    /// Table measured in each tracked dataset.
    pub main_table_name: String,
    pub tracked_datasets: Vec<String>,
    pub jobs_region: String,
}

/// Project and dataset receiving the report tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillingTarget {
    pub project_id: String,
    pub dataset_id: String,
}

impl BillingTarget {
    pub fn table(&self, name: &str) -> TableId {
        TableId::new(&self.project_id, &self.dataset_id, name)
    }
}

/// Validated settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub source: SourceSettings,
    pub billing: BillingTarget,
    pub warehouse_path: PathBuf,
    pub bucket_root: PathBuf,
    pub billing_db_path: PathBuf,
}

fn config_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "costrep")
}

/// Load `config.toml`.
///
/// With an explicit path the file must exist. Without one, the platform
/// config dir is tried and a missing file yields empty settings.
pub fn load_config(path: Option<&Path>) -> Result<Config, ReportError> {
    let (path, required) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => match config_dirs() {
            Some(dirs) => (dirs.config_dir().join("config.toml"), false),
            None => return Ok(Config::default()),
        },
    };

    let data = match fs::read_to_string(&path) {
        Ok(data) => data,
        Err(e) if !required && e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(Config::default());
        }
        Err(e) => {
            return Err(ReportError::Config(format!(
                "cannot read {}: {e}",
                path.display()
            )))
        }
    };

    toml::from_str(&data)
        .map_err(|e| ReportError::Config(format!("invalid config at {}: {e}", path.display())))
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn require(value: Option<String>, name: &str) -> Result<String, ReportError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ReportError::Config(format!("missing required setting `{name}`")))
}

impl Config {
    /// Overlay environment variables on top of file values.
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let set = |slot: &mut Option<String>, var: &str| {
            if let Some(v) = lookup(var) {
                *slot = Some(v);
            }
        };
        set(&mut self.project_id, "PROJECT_ID");
        set(&mut self.bucket_name, "BUCKET_NAME");
        set(&mut self.main_table_name, "MAIN_TABLE_NAME");
        set(&mut self.billing_project_id, "BILLING_PROJECT_ID");
        set(&mut self.billing_dataset_id, "BILLING_DATASET_ID");
        set(&mut self.jobs_region, "JOBS_REGION");

        // BIQUERY_PROJECTS is the name older deployments export.
        if let Some(v) = lookup("TRACKED_DATASETS").or_else(|| lookup("BIQUERY_PROJECTS")) {
            self.tracked_datasets = split_list(&v);
        }
        if let Some(v) = lookup("WAREHOUSE_PATH") {
            self.warehouse_path = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("BUCKET_ROOT") {
            self.bucket_root = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("BILLING_DB_PATH") {
            self.billing_db_path = Some(PathBuf::from(v));
        }
        self
    }

    /// Check required values and fill defaults.
    pub fn into_settings(self) -> Result<Settings, ReportError> {
        let tracked_datasets: Vec<String> = self
            .tracked_datasets
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if tracked_datasets.is_empty() {
            return Err(ReportError::Config(
                "missing required setting `tracked_datasets`".to_string(),
            ));
        }

        let billing = BillingTarget {
            project_id: require(self.billing_project_id, "billing_project_id")?,
            dataset_id: require(self.billing_dataset_id, "billing_dataset_id")?,
        };

        let billing_db_path = match self.billing_db_path {
            Some(p) => p,
            None => config_dirs()
                .map(|d| d.data_dir().join(format!("{}.db", billing.dataset_id)))
                .ok_or_else(|| {
                    ReportError::Config("missing required setting `billing_db_path`".to_string())
                })?,
        };

        Ok(Settings {
            source: SourceSettings {
                project_id: require(self.project_id, "project_id")?,
                bucket_name: require(self.bucket_name, "bucket_name")?,
                main_table_name: require(self.main_table_name, "main_table_name")?,
                tracked_datasets,
                jobs_region: self
                    .jobs_region
                    .unwrap_or_else(|| DEFAULT_JOBS_REGION.to_string()),
            },
            billing,
            warehouse_path: self.warehouse_path.ok_or_else(|| {
                ReportError::Config("missing required setting `warehouse_path`".to_string())
            })?,
            bucket_root: self.bucket_root.ok_or_else(|| {
                ReportError::Config("missing required setting `bucket_root`".to_string())
            })?,
            billing_db_path,
        })
    }
}
