use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::color::{to_hex, ColorMap};
use crate::data::loader::load_summary_stats;
use crate::data::model::TaskType;
use crate::error::{RefreshError, Result};
use crate::render::chart::{self, Frame};
use crate::render::scale::{LogScale, Scale};
use crate::render::svg::SvgDocument;
use crate::render::FigureConfig;

pub const STATS_FILE: &str = "summary_stats.csv";

/// One summary-statistics row, tagged with its relabelled task.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogRow {
    pub dataset: String,
    pub n_instances: u64,
    pub n_features: u64,
    pub task: TaskType,
    /// Task with its catalog-wide count, e.g. `classification (42)`.
    pub label: String,
}

/// Every dataset's summary statistics, aggregated for the size overview.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogSummary {
    pub rows: Vec<CatalogRow>,
    pub counts: BTreeMap<TaskType, usize>,
}

impl CatalogSummary {
    /// Read `<datasets_dir>/*/summary_stats.csv` in sorted directory order.
    pub fn collect(datasets_dir: &Path) -> Result<Self> {
        let mut files: Vec<(String, PathBuf)> = std::fs::read_dir(datasets_dir)
            .map_err(|e| RefreshError::io(datasets_dir, e))?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_dir())
            .map(|entry| {
                let name = entry.file_name().to_string_lossy().into_owned();
                (name, entry.path().join(STATS_FILE))
            })
            .filter(|(_, path)| path.is_file())
            .collect();
        files.sort();

        let mut tagged = Vec::new();
        for (dataset, path) in files {
            // tagged per row; per-dataset files carry a single row
            for stats in load_summary_stats(&path)? {
                tagged.push((dataset.clone(), stats.n_instances, stats.n_features, stats.task()));
            }
        }
        Ok(Self::from_tagged(tagged))
    }

    /// Build from `(dataset, #instances, #features, task)` tuples.
    pub fn from_tagged(tagged: Vec<(String, u64, u64, TaskType)>) -> Self {
        let mut counts: BTreeMap<TaskType, usize> = BTreeMap::new();
        for (_, _, _, task) in &tagged {
            *counts.entry(*task).or_default() += 1;
        }
        let rows = tagged
            .into_iter()
            .map(|(dataset, n_instances, n_features, task)| CatalogRow {
                label: format!("{task} ({})", counts.get(&task).copied().unwrap_or(0)),
                dataset,
                n_instances,
                n_features,
                task,
            })
            .collect();
        CatalogSummary { rows, counts }
    }

    pub fn count(&self, task: TaskType) -> usize {
        self.counts.get(&task).copied().unwrap_or(0)
    }

    /// Log-log scatter of instances vs features coloured by task label.
    pub fn render(&self, config: &FigureConfig) -> String {
        let mut doc = SvgDocument::new(config.width, config.height);
        let frame = Frame::inset(config.width, config.height, (70.0, 40.0, 20.0, 50.0));

        let (plotted, skipped): (Vec<&CatalogRow>, Vec<&CatalogRow>) = self
            .rows
            .iter()
            .partition(|r| r.n_instances > 0 && r.n_features > 0);
        for row in &skipped {
            log::warn!(
                "{}: cannot place {} instances x {} features on log axes, skipping point",
                row.dataset,
                row.n_instances,
                row.n_features
            );
        }

        let extent = |f: fn(&CatalogRow) -> u64| {
            plotted.iter().map(|r| f(r) as f64).fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            })
        };
        let x_dom = extent(|r| r.n_instances);
        let y_dom = extent(|r| r.n_features);
        let x = LogScale::new(x_dom, frame.x_range())
            .or_else(|| LogScale::new((1.0, 10.0), frame.x_range()));
        let y = LogScale::new(y_dom, frame.y_range())
            .or_else(|| LogScale::new((1.0, 10.0), frame.y_range()));

        if let (Some(x), Some(y)) = (x, y) {
            let x_ticks = x.ticks();
            let y_ticks = y.ticks();
            chart::draw_x_grid(&mut doc, &frame, &x, &x_ticks);
            chart::draw_y_axis(&mut doc, &frame, &y, &y_ticks, Some("#features"), true);
            chart::draw_x_axis(&mut doc, &frame, &x, &x_ticks, Some("#instances"));

            let colors = ColorMap::new(self.rows.iter().map(|r| r.label.as_str()));
            for row in &plotted {
                doc.circle(
                    x.map(row.n_instances as f64),
                    y.map(row.n_features as f64),
                    4.0,
                    &to_hex(colors.color_for(&row.label)),
                );
            }
            chart::draw_legend(&mut doc, &frame, Some("Task"), &colors.legend_entries());
        }

        chart::draw_box(&mut doc, &frame);
        chart::draw_title(&mut doc, &frame, "Dataset Sizes");
        doc.finish()
    }
}
