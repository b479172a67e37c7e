use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::changes::METADATA_FILE;
use crate::data::model::TaskType;
use crate::error::{RefreshError, Result};
use crate::render::FigureConfig;

pub const ROOT_ENV: &str = "DATASET_READMES_ROOT";
pub const SEED_ENV: &str = "DATASET_READMES_SEED";

// ---------------------------------------------------------------------------
// RunConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigureSizes {
    pub label: FigureConfig,
    pub corr: FigureConfig,
    pub catalog: FigureConfig,
}

impl Default for FigureSizes {
    fn default() -> Self {
        FigureSizes {
            label: FigureConfig::new(640, 480),
            corr: FigureConfig::new(640, 560),
            catalog: FigureConfig::new(600, 600),
        }
    }
}

/// Everything a run needs besides the dataset-name lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Repository root; git runs here and all other paths are relative to it.
    pub root: PathBuf,
    /// Top-level catalog directory, relative to `root`.
    pub datasets_dir: String,
    /// Fetch cache; `None` means the catalog directory itself.
    pub cache_dir: Option<PathBuf>,
    /// Row cap for the correlation step.
    pub sample_rows: usize,
    /// Feature cap for the correlation heatmap (the target is extra).
    pub max_corr_columns: usize,
    /// Seed for row sampling; unseeded when `None`.
    pub seed: Option<u64>,
    pub figures: FigureSizes,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            root: PathBuf::from("."),
            datasets_dir: "datasets".into(),
            cache_dir: None,
            sample_rows: 1000,
            max_corr_columns: 20,
            seed: None,
            figures: FigureSizes::default(),
        }
    }
}

impl RunConfig {
    /// Defaults, with the root and seed optionally overridden from the
    /// environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = RunConfig::default();
        if let Some(root) = lookup(ROOT_ENV).filter(|v| !v.trim().is_empty()) {
            config.root = PathBuf::from(root);
        }
        if let Some(seed) = lookup(SEED_ENV).filter(|v| !v.trim().is_empty()) {
            let seed = seed
                .trim()
                .parse::<u64>()
                .map_err(|e| RefreshError::Config(format!("{SEED_ENV}='{seed}': {e}")))?;
            config.seed = Some(seed);
        }
        Ok(config)
    }

    pub fn datasets_path(&self) -> PathBuf {
        self.root.join(&self.datasets_dir)
    }

    pub fn cache_path(&self) -> PathBuf {
        match &self.cache_dir {
            Some(dir) => self.root.join(dir),
            None => self.datasets_path(),
        }
    }

    pub fn dataset_dir(&self, name: &str) -> PathBuf {
        self.datasets_path().join(name)
    }

    pub fn catalog_plot_path(&self) -> PathBuf {
        self.datasets_path().join("dataset_sizes.svg")
    }
}

// ---------------------------------------------------------------------------
// CatalogLists – which datasets belong to which task
// ---------------------------------------------------------------------------

/// Dataset names registered per task type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogLists {
    pub classification: Vec<String>,
    pub regression: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct MetadataTask {
    task: String,
}

impl CatalogLists {
    pub fn new<S: Into<String>>(
        classification: impl IntoIterator<Item = S>,
        regression: impl IntoIterator<Item = S>,
    ) -> Self {
        CatalogLists {
            classification: classification.into_iter().map(Into::into).collect(),
            regression: regression.into_iter().map(Into::into).collect(),
        }
    }

    pub fn names(&self, task: TaskType) -> &[String] {
        match task {
            TaskType::Classification => &self.classification,
            TaskType::Regression => &self.regression,
        }
    }

    /// Build the lists from the `task` field of every
    /// `<datasets_dir>/<name>/metadata.yaml`. Datasets without metadata are
    /// not registered; unreadable metadata, a missing `task` field or an
    /// unknown task are skipped with a warning. Only an unreadable
    /// `datasets_dir` is an error.
    pub fn from_metadata(datasets_dir: &Path) -> Result<Self> {
        let mut dirs: Vec<PathBuf> = std::fs::read_dir(datasets_dir)
            .map_err(|e| RefreshError::io(datasets_dir, e))?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.join(METADATA_FILE).is_file())
            .collect();
        dirs.sort();

        let mut lists = CatalogLists::default();
        for dir in dirs {
            let Some(name) = dir.file_name().map(|n| n.to_string_lossy().into_owned()) else {
                continue;
            };
            let path = dir.join(METADATA_FILE);
            let meta = match read_metadata_task(&path) {
                Ok(meta) => meta,
                Err(e) => {
                    log::warn!("{name}: {e}, skipping");
                    continue;
                }
            };
            match TaskType::parse(&meta.task) {
                Some(TaskType::Classification) => lists.classification.push(name),
                Some(TaskType::Regression) => lists.regression.push(name),
                None => log::warn!("{name}: unknown task '{}' in {METADATA_FILE}, skipping", meta.task),
            }
        }
        Ok(lists)
    }
}

fn read_metadata_task(path: &Path) -> Result<MetadataTask> {
    let text = std::fs::read_to_string(path).map_err(|e| RefreshError::io(path, e))?;
    serde_yaml::from_str(&text).map_err(|e| RefreshError::Config(format!("{}: {e}", path.display())))
}
