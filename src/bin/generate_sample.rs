//! Writes a small two-dataset catalog (`toy-class`, `toy-reg`) under
//! `<out>/datasets/` for trying the tool without the full catalog.
//!
//! Usage: `generate_sample [out-dir]` (defaults to the current directory).

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use flate2::write::GzEncoder;
use flate2::Compression;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Box-Muller transform for normal distribution
fn gauss(rng: &mut StdRng, mean: f64, std_dev: f64) -> f64 {
    let u1: f64 = rng.gen::<f64>().max(1e-15);
    let u2: f64 = rng.gen();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    mean + std_dev * z
}

struct ToyDataset {
    name: &'static str,
    task: &'static str,
    columns: Vec<String>,
    rows: Vec<Vec<f64>>,
    n_classes: Option<usize>,
}

/// Three gaussian blobs over four measurements, 50 rows per class.
fn toy_classification(rng: &mut StdRng) -> ToyDataset {
    let centers = [
        [5.0, 3.4, 1.5, 0.2],
        [5.9, 2.8, 4.3, 1.3],
        [6.6, 3.0, 5.5, 2.0],
    ];
    let mut rows = Vec::new();
    for (class, center) in centers.iter().enumerate() {
        for _ in 0..50 {
            let mut row: Vec<f64> = center
                .iter()
                .map(|&c| (gauss(rng, c, 0.35) * 10.0).round() / 10.0)
                .collect();
            row.push(class as f64);
            rows.push(row);
        }
    }
    ToyDataset {
        name: "toy-class",
        task: "classification",
        columns: ["sepal-length", "sepal-width", "petal-length", "petal-width", "target"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        rows,
        n_classes: Some(centers.len()),
    }
}

/// Linear target over five features with gaussian noise.
fn toy_regression(rng: &mut StdRng) -> ToyDataset {
    let weights = [3.0, -2.0, 0.5, 0.0, 1.5];
    let rows = (0..200)
        .map(|_| {
            let mut row: Vec<f64> = weights.iter().map(|_| gauss(rng, 0.0, 1.0)).collect();
            let y: f64 = row.iter().zip(&weights).map(|(x, w)| x * w).sum::<f64>() + gauss(rng, 0.0, 0.5);
            row.push(y);
            row
        })
        .collect();
    ToyDataset {
        name: "toy-reg",
        task: "regression",
        columns: (0..weights.len())
            .map(|i| format!("x{i}"))
            .chain(std::iter::once("target".to_string()))
            .collect(),
        rows,
        n_classes: None,
    }
}

fn write_dataset(datasets_dir: &Path, ds: &ToyDataset) -> Result<()> {
    let dir = datasets_dir.join(ds.name);
    std::fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;

    let data_path = dir.join(format!("{}.tsv.gz", ds.name));
    let file = File::create(&data_path).with_context(|| format!("creating {}", data_path.display()))?;
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(GzEncoder::new(file, Compression::default()));
    writer.write_record(&ds.columns)?;
    for row in &ds.rows {
        writer.write_record(row.iter().map(|v| v.to_string()))?;
    }
    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("flushing {}: {e}", data_path.display()))?
        .finish()
        .context("finishing gzip stream")?;

    let metadata = format!(
        "dataset: {name}\ndescription: Synthetic {task} dataset.\nsource: generated\ntask: {task}\n",
        name = ds.name,
        task = ds.task
    );
    std::fs::write(dir.join("metadata.yaml"), metadata)?;

    let endpoint = if ds.task == "regression" { "continuous" } else { "categorical" };
    let mut stats = File::create(dir.join("summary_stats.csv"))?;
    writeln!(stats, "dataset,#instances,#features,Endpoint_type,#Classes,Imbalance")?;
    writeln!(
        stats,
        "{},{},{},{},{},0.0",
        ds.name,
        ds.rows.len(),
        ds.columns.len() - 1,
        endpoint,
        ds.n_classes.map(|n| n.to_string()).unwrap_or_default()
    )?;

    println!("Wrote {} ({} rows)", dir.display(), ds.rows.len());
    Ok(())
}

fn main() -> Result<()> {
    let out = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let datasets_dir = out.join("datasets");

    let mut rng = StdRng::seed_from_u64(42);
    write_dataset(&datasets_dir, &toy_classification(&mut rng))?;
    write_dataset(&datasets_dir, &toy_regression(&mut rng))?;
    Ok(())
}
