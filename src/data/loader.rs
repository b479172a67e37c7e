use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;

use super::model::{DataTable, SummaryStats, TARGET_COLUMN};
use crate::error::{RefreshError, Result};

// ---------------------------------------------------------------------------
// Dataset fetch
// ---------------------------------------------------------------------------

/// Something that can produce a dataset table by name.
pub trait DatasetSource {
    fn fetch(&self, name: &str) -> Result<DataTable>;
}

/// Reads datasets from a local cache laid out as
/// `<cache_dir>/<name>/<name>.tsv.gz`.
#[derive(Debug, Clone)]
pub struct LocalCache {
    cache_dir: PathBuf,
}

impl LocalCache {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        LocalCache {
            cache_dir: cache_dir.into(),
        }
    }

    pub fn dataset_path(&self, name: &str) -> PathBuf {
        self.cache_dir.join(name).join(format!("{name}.tsv.gz"))
    }
}

impl DatasetSource for LocalCache {
    fn fetch(&self, name: &str) -> Result<DataTable> {
        let path = self.dataset_path(name);
        let file = File::open(&path).map_err(|e| RefreshError::FetchFailure {
            dataset: name.to_string(),
            reason: format!("{}: {e}", path.display()),
        })?;
        read_table(name, GzDecoder::new(file), b'\t')
    }
}

// ---------------------------------------------------------------------------
// Delimited table reader
// ---------------------------------------------------------------------------

/// Parse a delimited numeric table with a header row. The table must carry
/// a `target` column.
pub fn read_table<R: Read>(dataset: &str, reader: R, delimiter: u8) -> Result<DataTable> {
    let malformed = |reason: String| RefreshError::MalformedData {
        dataset: dataset.to_string(),
        reason,
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .from_reader(reader);
    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| malformed(format!("reading header: {e}")))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if !headers.iter().any(|h| h == TARGET_COLUMN) {
        return Err(malformed(format!("missing '{TARGET_COLUMN}' column")));
    }

    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); headers.len()];
    for (row_no, result) in reader.records().enumerate() {
        let record = result.map_err(|e| malformed(format!("row {row_no}: {e}")))?;
        for (col_idx, cell) in record.iter().enumerate() {
            let value = parse_cell(cell).ok_or_else(|| {
                malformed(format!(
                    "row {row_no}, column '{}': '{cell}' is not a number",
                    headers[col_idx]
                ))
            })?;
            columns[col_idx].push(value);
        }
    }

    DataTable::new(headers, columns).map_err(malformed)
}

/// Empty cells become NaN; anything else must parse as a float.
fn parse_cell(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return Some(f64::NAN);
    }
    s.parse::<f64>().ok()
}

// ---------------------------------------------------------------------------
// Summary statistics
// ---------------------------------------------------------------------------

/// Load every row of a `summary_stats.csv` file.
pub fn load_summary_stats(path: &Path) -> Result<Vec<SummaryStats>> {
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => RefreshError::StatsFileMissing {
            path: path.to_path_buf(),
        },
        _ => RefreshError::io(path, e),
    })?;

    let mut reader = csv::Reader::from_reader(file);
    let rows = reader
        .deserialize()
        .collect::<std::result::Result<Vec<SummaryStats>, _>>()
        .map_err(|e| RefreshError::MalformedStats {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    if rows.is_empty() {
        return Err(RefreshError::MalformedStats {
            path: path.to_path_buf(),
            reason: "no rows".into(),
        });
    }
    Ok(rows)
}

/// The first row of a statistics file; per-dataset files hold exactly one.
pub fn load_dataset_stats(path: &Path) -> Result<SummaryStats> {
    let mut rows = load_summary_stats(path)?;
    Ok(rows.swap_remove(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    #[test]
    fn reads_tab_separated_table() {
        let text = "a\tb\ttarget\n1\t2.5\t0\n3\t-1\t1\n";
        let table = read_table("toy", text.as_bytes(), b'\t').unwrap();
        assert_eq!(table.n_rows(), 2);
        assert_eq!(table.column("b").unwrap(), &[2.5, -1.0]);
        assert_eq!(table.target().unwrap(), &[0.0, 1.0]);
    }

    #[test]
    fn missing_target_is_malformed() {
        let err = read_table("toy", "a\tb\n1\t2\n".as_bytes(), b'\t').unwrap_err();
        assert!(matches!(err, RefreshError::MalformedData { .. }));
    }

    #[test]
    fn non_numeric_cell_is_malformed() {
        let err = read_table("toy", "a\ttarget\nx\t1\n".as_bytes(), b'\t').unwrap_err();
        assert!(err.to_string().contains("'x' is not a number"));
    }

    #[test]
    fn local_cache_reads_gzip() {
        let dir = tempfile::tempdir().unwrap();
        let ds = dir.path().join("toy");
        std::fs::create_dir_all(&ds).unwrap();
        let file = File::create(ds.join("toy.tsv.gz")).unwrap();
        let mut enc = GzEncoder::new(file, Compression::default());
        enc.write_all(b"x\ttarget\n1\t0\n2\t1\n3\t1\n").unwrap();
        enc.finish().unwrap();

        let table = LocalCache::new(dir.path()).fetch("toy").unwrap();
        assert_eq!(table.n_rows(), 3);
    }

    #[test]
    fn local_cache_missing_dataset_is_fetch_failure() {
        let dir = tempfile::tempdir().unwrap();
        let err = LocalCache::new(dir.path()).fetch("nope").unwrap_err();
        assert!(matches!(err, RefreshError::FetchFailure { .. }));
    }

    #[test]
    fn stats_file_missing_and_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary_stats.csv");
        assert!(matches!(
            load_summary_stats(&path),
            Err(RefreshError::StatsFileMissing { .. })
        ));

        std::fs::write(&path, "#instances,#features\nabc,4\n").unwrap();
        assert!(matches!(
            load_summary_stats(&path),
            Err(RefreshError::MalformedStats { .. })
        ));
    }

    #[test]
    fn stats_with_blank_class_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary_stats.csv");
        std::fs::write(
            &path,
            "dataset,#instances,#features,Endpoint_type,#Classes,Imbalance\n\
             toy-reg,200,5,continuous,,0.0\n",
        )
        .unwrap();
        let stats = load_dataset_stats(&path).unwrap();
        assert_eq!(stats.n_instances, 200);
        assert_eq!(stats.n_features, 5);
        assert_eq!(stats.n_classes, None);
        assert_eq!(stats.endpoint_type, "continuous");
    }
}
