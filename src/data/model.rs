use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of the distinguished label column in every dataset table.
pub const TARGET_COLUMN: &str = "target";

// ---------------------------------------------------------------------------
// TaskType
// ---------------------------------------------------------------------------

/// Whether a dataset's target is categorical or continuous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Classification,
    Regression,
}

impl TaskType {
    /// Processing order used by the pipeline.
    pub const ALL: [TaskType; 2] = [TaskType::Classification, TaskType::Regression];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Classification => "classification",
            TaskType::Regression => "regression",
        }
    }

    /// Task implied by a summary-statistics `Endpoint_type` value.
    pub fn from_endpoint(endpoint: &str) -> Self {
        if endpoint.trim() == "continuous" {
            TaskType::Regression
        } else {
            TaskType::Classification
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "classification" => Some(TaskType::Classification),
            "regression" => Some(TaskType::Regression),
            _ => None,
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// DataTable – a numeric, column-major dataset
// ---------------------------------------------------------------------------

/// A dataset matrix: named numeric columns of equal length.
#[derive(Debug, Clone, PartialEq)]
pub struct DataTable {
    columns: Vec<String>,
    /// Column-major storage, parallel to `columns`.
    values: Vec<Vec<f64>>,
    n_rows: usize,
}

impl DataTable {
    /// Build a table, checking that every column has the same length and a
    /// unique name.
    pub fn new(columns: Vec<String>, values: Vec<Vec<f64>>) -> Result<Self, String> {
        if columns.len() != values.len() {
            return Err(format!(
                "{} column names but {} value columns",
                columns.len(),
                values.len()
            ));
        }
        for (i, name) in columns.iter().enumerate() {
            if columns[..i].contains(name) {
                return Err(format!("duplicate column '{name}'"));
            }
        }
        let n_rows = values.first().map_or(0, Vec::len);
        if let Some((name, col)) = columns
            .iter()
            .zip(&values)
            .find(|(_, col)| col.len() != n_rows)
        {
            return Err(format!(
                "column '{name}' has {} rows, expected {n_rows}",
                col.len()
            ));
        }
        Ok(DataTable {
            columns,
            values,
            n_rows,
        })
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .position(|c| c == name)
            .map(|i| self.values[i].as_slice())
    }

    /// The label column, if present.
    pub fn target(&self) -> Option<&[f64]> {
        self.column(TARGET_COLUMN)
    }

    /// `(name, values)` pairs in column order.
    pub fn iter_columns(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.columns
            .iter()
            .zip(&self.values)
            .map(|(n, v)| (n.as_str(), v.as_slice()))
    }

    /// A new table holding only the given rows, in the given order.
    pub fn select_rows(&self, rows: &[usize]) -> DataTable {
        let values = self
            .values
            .iter()
            .map(|col| rows.iter().map(|&r| col[r]).collect())
            .collect();
        DataTable {
            columns: self.columns.clone(),
            values,
            n_rows: rows.len(),
        }
    }
}

// ---------------------------------------------------------------------------
// SummaryStats – one row of summary_stats.csv
// ---------------------------------------------------------------------------

/// Precomputed per-dataset statistics; extra CSV columns are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    #[serde(rename = "#instances")]
    pub n_instances: u64,
    #[serde(rename = "#features")]
    pub n_features: u64,
    /// Blank for most regression datasets.
    #[serde(rename = "#Classes", default, deserialize_with = "csv::invalid_option")]
    pub n_classes: Option<f64>,
    #[serde(rename = "Endpoint_type")]
    pub endpoint_type: String,
}

impl SummaryStats {
    pub fn task(&self) -> TaskType {
        TaskType::from_endpoint(&self.endpoint_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> DataTable {
        DataTable::new(
            vec!["a".into(), "target".into()],
            vec![vec![1.0, 2.0, 3.0], vec![0.0, 1.0, 0.0]],
        )
        .unwrap()
    }

    #[test]
    fn rejects_ragged_columns() {
        let err = DataTable::new(
            vec!["a".into(), "b".into()],
            vec![vec![1.0, 2.0], vec![1.0]],
        )
        .unwrap_err();
        assert!(err.contains("'b'"));
    }

    #[test]
    fn rejects_duplicate_names() {
        assert!(DataTable::new(vec!["a".into(), "a".into()], vec![vec![], vec![]]).is_err());
    }

    #[test]
    fn select_rows_keeps_columns() {
        let t = table().select_rows(&[2, 0]);
        assert_eq!(t.n_rows(), 2);
        assert_eq!(t.column("a").unwrap(), &[3.0, 1.0]);
        assert_eq!(t.target().unwrap(), &[0.0, 0.0]);
    }

    #[test]
    fn endpoint_maps_to_task() {
        assert_eq!(TaskType::from_endpoint("continuous"), TaskType::Regression);
        assert_eq!(TaskType::from_endpoint("categorical"), TaskType::Classification);
        assert_eq!(TaskType::from_endpoint("binary"), TaskType::Classification);
    }
}
