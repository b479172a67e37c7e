use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};
use std::process::Command;

use crate::error::{RefreshError, Result};

/// Per-dataset metadata file name.
pub const METADATA_FILE: &str = "metadata.yaml";
/// Suffix of compressed per-dataset data files.
pub const DATA_SUFFIX: &str = ".tsv.gz";

/// Source of the paths changed by the latest revision.
pub trait History {
    /// Paths, relative to the repository root, that differ between the
    /// current revision and its parent.
    fn changed_paths(&self) -> Result<Vec<String>>;
}

/// `git diff --name-only -z HEAD HEAD~1` run inside `repo_dir`. NUL
/// separation keeps non-ASCII paths unquoted.
#[derive(Debug, Clone)]
pub struct GitHistory {
    repo_dir: PathBuf,
}

impl GitHistory {
    pub fn new(repo_dir: impl Into<PathBuf>) -> Self {
        GitHistory {
            repo_dir: repo_dir.into(),
        }
    }
}

impl History for GitHistory {
    fn changed_paths(&self) -> Result<Vec<String>> {
        let output = Command::new("git")
            .args(["diff", "--name-only", "-z", "HEAD", "HEAD~1"])
            .current_dir(&self.repo_dir)
            .output()
            .map_err(|e| RefreshError::HistoryUnavailable {
                reason: format!("could not run git: {e}"),
            })?;
        if !output.status.success() {
            return Err(RefreshError::HistoryUnavailable {
                reason: format!(
                    "git diff exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }
        Ok(split_name_list(&output.stdout))
    }
}

/// Paths from NUL-terminated `--name-only -z` output.
pub fn split_name_list(stdout: &[u8]) -> Vec<String> {
    stdout
        .split(|b| *b == 0)
        .filter(|p| !p.is_empty())
        .map(|p| String::from_utf8_lossy(p).into_owned())
        .collect()
}

/// Dataset names touched by `paths`: a path counts when it lies under
/// `<top_dir>/<name>/` and is the metadata file or a compressed data file.
/// The result is sorted and free of duplicates.
pub fn changed_datasets<S: AsRef<str>>(paths: &[S], top_dir: &str) -> Vec<String> {
    let mut names = BTreeSet::new();
    for path in paths {
        let path = Path::new(path.as_ref());
        let parts: Vec<&str> = path
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => s.to_str(),
                _ => None,
            })
            .collect();
        if parts.len() < 3 || parts[0] != top_dir {
            continue;
        }
        let file_name = parts[parts.len() - 1];
        if file_name == METADATA_FILE || file_name.ends_with(DATA_SUFFIX) {
            names.insert(parts[1].to_string());
        }
    }
    names.into_iter().collect()
}

/// Run `history` and reduce its paths to changed dataset names.
pub fn detect_changes(history: &dyn History, top_dir: &str) -> Result<Vec<String>> {
    let paths = history.changed_paths()?;
    let changed = changed_datasets(&paths, top_dir);
    log::info!("changed datasets: {changed:?}");
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Vec<&'static str>);

    impl History for Fixed {
        fn changed_paths(&self) -> Result<Vec<String>> {
            Ok(self.0.iter().map(|s| s.to_string()).collect())
        }
    }

    struct Broken;

    impl History for Broken {
        fn changed_paths(&self) -> Result<Vec<String>> {
            Err(RefreshError::HistoryUnavailable {
                reason: "no parent revision".into(),
            })
        }
    }

    #[test]
    fn keeps_metadata_and_data_changes_only() {
        let paths = [
            "datasets/iris/metadata.yaml",
            "datasets/adult/adult.tsv.gz",
            "datasets/adult/metadata.yaml",
            "datasets/wine/README.md",
            "datasets/wine/summary_stats.csv",
            "datasets/wine/label.svg",
            "docs/datasets/fake/metadata.yaml",
            "README.md",
            "datasets/metadata.yaml",
            "datasets/dataset_sizes.svg",
        ];
        assert_eq!(changed_datasets(&paths, "datasets"), vec!["adult", "iris"]);
    }

    #[test]
    fn output_is_sorted_and_unique() {
        let paths = [
            "datasets/zoo/zoo.tsv.gz",
            "datasets/abalone/metadata.yaml",
            "datasets/zoo/metadata.yaml",
            "datasets/abalone/abalone.tsv.gz",
        ];
        assert_eq!(changed_datasets(&paths, "datasets"), vec!["abalone", "zoo"]);
    }

    #[test]
    fn empty_diff_yields_nothing() {
        let none: [&str; 0] = [];
        assert!(changed_datasets(&none, "datasets").is_empty());
    }

    #[test]
    fn detect_surfaces_history_errors() {
        assert!(matches!(
            detect_changes(&Broken, "datasets"),
            Err(RefreshError::HistoryUnavailable { .. })
        ));
        let found = detect_changes(&Fixed(vec!["datasets/a/metadata.yaml"]), "datasets").unwrap();
        assert_eq!(found, vec!["a"]);
    }

    #[test]
    fn git_outside_a_repository_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let result = GitHistory::new(dir.path()).changed_paths();
        assert!(matches!(result, Err(RefreshError::HistoryUnavailable { .. })));
    }

    #[test]
    fn nul_separated_paths_keep_non_ascii_names() {
        let out = "datasets/caf\u{e9}/metadata.yaml\0datasets/iris/iris.tsv.gz\0".as_bytes();
        let paths = split_name_list(out);
        assert_eq!(paths, vec!["datasets/caf\u{e9}/metadata.yaml", "datasets/iris/iris.tsv.gz"]);
        assert_eq!(changed_datasets(&paths, "datasets"), vec!["caf\u{e9}", "iris"]);
        assert!(split_name_list(b"").is_empty());
    }
}
