// ABOUTME: Configuration types and parsing for flotilla.yml.
// ABOUTME: The config layer is the desired-target producer for reconciliation.

mod init;

pub use init::init_config;

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::backend::DeployableTarget;
use crate::error::{Error, Result};
use crate::reconcile::{DiffOptions, RetryPolicy};
use crate::types::{ChartRef, Namespace, ReleaseName};

pub const CONFIG_FILENAME: &str = "flotilla.yml";
pub const CONFIG_FILENAME_ALT: &str = "flotilla.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".flotilla/config.yml";

/// Which backend implementation the CLI wires up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// In-process backend for local experimentation.
    #[default]
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Release-group identifier version snapshots are stored under.
    pub group: String,

    /// Default namespace for releases that do not declare one.
    #[serde(default)]
    pub namespace: Namespace,

    #[serde(default)]
    pub backend: BackendKind,

    pub releases: Vec<ReleaseConfig>,

    /// Kinds whose diff content is suppressed in reports.
    #[serde(default)]
    pub suppressed_kinds: Vec<String>,

    /// Context lines kept around each diff change; omit to print full diffs.
    #[serde(default)]
    pub context_lines: Option<usize>,

    #[serde(default)]
    pub retry: RetryConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseConfig {
    pub name: ReleaseName,
    pub chart: ChartRef,

    #[serde(default)]
    pub namespace: Option<Namespace>,

    /// Name declared in the chart's own metadata, for force matching.
    #[serde(default)]
    pub metadata_name: Option<String>,

    /// Raw values override text, passed through to the backend untouched.
    #[serde(default)]
    pub values: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_backoff", with = "humantime_serde")]
    pub backoff: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff: default_backoff(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff() -> Duration {
    Duration::from_secs(1)
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    /// Build the desired-target list the classifier consumes.
    pub fn targets(&self) -> Vec<DeployableTarget> {
        self.releases
            .iter()
            .map(|release| DeployableTarget {
                release: release.name.clone(),
                namespace: release
                    .namespace
                    .clone()
                    .unwrap_or_else(|| self.namespace.clone()),
                chart: release.chart.clone(),
                metadata_name: release.metadata_name.clone(),
                values: release.values.clone().unwrap_or_default(),
            })
            .collect()
    }

    pub fn diff_options(&self) -> DiffOptions {
        DiffOptions {
            suppressed_kinds: self.suppressed_kinds.clone(),
            context_lines: self.context_lines,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry.max_attempts, self.retry.backoff)
    }

    pub fn template() -> Self {
        Config {
            group: "storage".to_string(),
            namespace: Namespace::default(),
            backend: BackendKind::Memory,
            releases: vec![ReleaseConfig {
                name: ReleaseName::new("storage-minio").expect("template name is valid"),
                chart: ChartRef::parse("stable/minio").expect("template chart is valid"),
                namespace: None,
                metadata_name: None,
                values: None,
            }],
            suppressed_kinds: vec!["Secret".to_string()],
            context_lines: Some(3),
            retry: RetryConfig::default(),
        }
    }
}
