use std::path::Path;

use tabled::builder::Builder;
use tabled::settings::Style;

use crate::data::model::{DataTable, SummaryStats, TaskType};
use crate::data::stats::{describe, format_g, group_thousands, DESCRIBE_ROWS};
use crate::error::{RefreshError, Result};
use crate::fsutil::write_bytes_atomic;

/// Render a dataset README.
///
/// Counts come from the precomputed summary statistics; the data summary
/// table is computed from the dataset table itself. The class-count line
/// only exists for classification datasets.
pub fn render_readme(
    dataset: &str,
    task: TaskType,
    stats: &SummaryStats,
    table: &DataTable,
    stats_path: &Path,
) -> Result<String> {
    let n_classes_line = match task {
        TaskType::Classification => {
            let n = stats.n_classes.ok_or_else(|| RefreshError::MalformedStats {
                path: stats_path.to_path_buf(),
                reason: "'#Classes' is blank for a classification dataset".into(),
            })?;
            format!("- **number of classes**: {}\n", format_g(n))
        }
        TaskType::Regression => String::new(),
    };

    Ok(format!(
        "# {dataset}\n\
         \n\
         [Metadata](metadata.yaml) | [Summary Statistics](summary_stats.csv)\n\
         \n\
         ## Summary\n\
         \n\
         - **task**: {task}\n\
         - **number of instances**: {n_instances}\n\
         - **number of features**: {n_features}\n\
         {n_classes_line}\
         \n\
         ## Summary Plots\n\
         \n\
         ![Target distribution](label.svg)\n\
         \n\
         ![Correlation plot](corr.svg)\n\
         \n\
         ## Data Summary\n\
         \n\
         {description_table}\n",
        n_instances = group_thousands(stats.n_instances),
        n_features = group_thousands(stats.n_features),
        description_table = describe_markdown(table),
    ))
}

/// Markdown table of describe() statistics, one column per table column.
pub fn describe_markdown(table: &DataTable) -> String {
    let summaries = describe(table);

    let mut builder = Builder::default();
    builder.push_record(
        std::iter::once(String::new()).chain(summaries.iter().map(|s| s.name.clone())),
    );
    for (row, label) in DESCRIBE_ROWS.iter().enumerate() {
        builder.push_record(
            std::iter::once(label.to_string())
                .chain(summaries.iter().map(|s| format_g(s.values()[row]))),
        );
    }

    let mut rendered = builder.build();
    rendered.with(Style::markdown());
    rendered.to_string()
}

/// Write the README, warning when an existing file is replaced. Returns
/// whether a file was overwritten.
pub fn write_readme(path: &Path, contents: &str) -> Result<bool> {
    let existed = path.exists();
    if existed {
        log::warn!("{} exists. Overwriting...", path.display());
    }
    write_bytes_atomic(path, contents.as_bytes())?;
    Ok(existed)
}
