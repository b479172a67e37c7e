use std::collections::BTreeSet;
use std::path::PathBuf;

use rand::rngs::StdRng;
use serde::Serialize;

use crate::catalog::{CatalogSummary, STATS_FILE};
use crate::changes::{detect_changes, History};
use crate::config::{CatalogLists, RunConfig};
use crate::data::loader::{load_dataset_stats, DatasetSource};
use crate::data::model::TaskType;
use crate::data::stats::make_rng;
use crate::error::{DatasetFailure, RefreshError, Result, Stage, EXIT_FAILED, EXIT_OK};
use crate::fsutil::write_bytes_atomic;
use crate::plots::corr::CorrelationHeatmap;
use crate::plots::label::LabelDistribution;
use crate::readme::{render_readme, write_readme};

pub const LABEL_PLOT: &str = "label.svg";
pub const CORR_PLOT: &str = "corr.svg";
pub const README: &str = "README.md";

/// Outcome of one run.
#[derive(Debug, Default, Serialize)]
pub struct RunReport {
    pub changed: Vec<String>,
    /// Datasets whose artifacts were fully regenerated.
    pub processed: Vec<String>,
    #[serde(serialize_with = "serialize_failures")]
    pub failures: Vec<DatasetFailure>,
    pub catalog_written: bool,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Exit status for a run that completed.
    pub fn exit_code(&self) -> u8 {
        if self.is_success() {
            EXIT_OK
        } else {
            EXIT_FAILED
        }
    }
}

fn serialize_failures<S: serde::Serializer>(
    failures: &[DatasetFailure],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_seq(failures.iter().map(|f| f.to_string()))
}

/// Rendered artifacts for one dataset, held in memory until all of them
/// succeed.
struct DatasetArtifacts {
    label_svg: String,
    corr_svg: String,
    readme: String,
}

/// Regenerates artifacts for changed datasets.
///
/// A failing dataset is logged and recorded, and the run moves on to the
/// next one; only change detection aborts the run.
pub struct Pipeline {
    config: RunConfig,
    /// `None` reads the lists from catalog metadata once changes are known.
    lists: Option<CatalogLists>,
    rng: StdRng,
}

impl Pipeline {
    pub fn new(config: RunConfig, lists: CatalogLists) -> Self {
        let rng = make_rng(config.seed);
        Pipeline {
            config,
            lists: Some(lists),
            rng,
        }
    }

    /// Registers datasets from `<datasets_dir>/*/metadata.yaml`, after
    /// change detection has succeeded.
    pub fn from_catalog(config: RunConfig) -> Self {
        let rng = make_rng(config.seed);
        Pipeline {
            config,
            lists: None,
            rng,
        }
    }

    pub fn run(&mut self, history: &dyn History, source: &dyn DatasetSource) -> Result<RunReport> {
        let changed = detect_changes(history, &self.config.datasets_dir)?;
        let mut report = RunReport::default();
        if changed.is_empty() {
            return Ok(report);
        }

        let lists = match &self.lists {
            Some(lists) => lists.clone(),
            None => CatalogLists::from_metadata(&self.config.datasets_path())?,
        };
        log::debug!(
            "{} classification and {} regression datasets registered",
            lists.classification.len(),
            lists.regression.len()
        );
        let changed_set: BTreeSet<&str> = changed.iter().map(String::as_str).collect();

        for task in TaskType::ALL {
            for name in lists.names(task).iter().filter(|n| changed_set.contains(n.as_str())) {
                match self.process_dataset(name, task, source) {
                    Ok(()) => report.processed.push(name.clone()),
                    Err(failure) => {
                        log::error!("{failure}");
                        report.failures.push(failure);
                    }
                }
            }
        }

        for name in &changed {
            if !lists.classification.contains(name) && !lists.regression.contains(name) {
                log::warn!("{name} changed but is not registered under any task, skipping");
            }
        }

        match self.write_catalog_summary() {
            Ok(()) => report.catalog_written = true,
            Err(error) => {
                let failure = DatasetFailure::new("catalog", Stage::Catalog, error);
                log::error!("{failure}");
                report.failures.push(failure);
            }
        }

        report.changed = changed;
        Ok(report)
    }

    fn process_dataset(
        &mut self,
        name: &str,
        task: TaskType,
        source: &dyn DatasetSource,
    ) -> std::result::Result<(), DatasetFailure> {
        let fail = |stage: Stage| move |error: RefreshError| DatasetFailure::new(name, stage, error);

        let table = source.fetch(name).map_err(fail(Stage::Fetch))?;
        let target = table.target().ok_or_else(|| {
            fail(Stage::Fetch)(RefreshError::MalformedData {
                dataset: name.to_string(),
                reason: "missing target column".into(),
            })
        })?;

        log::info!("plotting {name}");
        let figures = &self.config.figures;
        let label_svg = LabelDistribution::compute(target, task).render(&figures.label);
        let heatmap = CorrelationHeatmap::compute(
            &table,
            self.config.sample_rows,
            self.config.max_corr_columns,
            &mut self.rng,
        );
        if heatmap.is_degenerate() {
            log::warn!(
                "{}",
                RefreshError::DegenerateCorrelation {
                    dataset: name.to_string()
                }
            );
        }
        let corr_svg = heatmap.render(&figures.corr);

        let dir = self.config.dataset_dir(name);
        let stats_path = dir.join(STATS_FILE);
        let readme = load_dataset_stats(&stats_path)
            .and_then(|stats| render_readme(name, task, &stats, &table, &stats_path))
            .map_err(fail(Stage::Readme))?;

        self.write_artifacts(
            dir,
            DatasetArtifacts {
                label_svg,
                corr_svg,
                readme,
            },
        )
        .map_err(fail(Stage::Write))
    }

    fn write_artifacts(&self, dir: PathBuf, artifacts: DatasetArtifacts) -> Result<()> {
        let label_path = dir.join(LABEL_PLOT);
        write_bytes_atomic(&label_path, artifacts.label_svg.as_bytes())?;
        log::info!("wrote {}", label_path.display());

        let corr_path = dir.join(CORR_PLOT);
        write_bytes_atomic(&corr_path, artifacts.corr_svg.as_bytes())?;
        log::info!("wrote {}", corr_path.display());

        let readme_path = dir.join(README);
        write_readme(&readme_path, &artifacts.readme)?;
        log::info!("wrote {}", readme_path.display());
        Ok(())
    }

    fn write_catalog_summary(&self) -> Result<()> {
        let summary = CatalogSummary::collect(&self.config.datasets_path())?;
        let svg = summary.render(&self.config.figures.catalog);
        let path = self.config.catalog_plot_path();
        write_bytes_atomic(&path, svg.as_bytes())?;
        log::info!(
            "wrote {} ({} classification, {} regression)",
            path.display(),
            summary.count(TaskType::Classification),
            summary.count(TaskType::Regression)
        );
        Ok(())
    }
}
