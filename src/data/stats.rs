use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::model::DataTable;

// ---------------------------------------------------------------------------
// describe()
// ---------------------------------------------------------------------------

/// Row labels of a describe() table, in order.
pub const DESCRIBE_ROWS: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

/// Descriptive statistics of one column. NaN cells are skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub name: String,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator).
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub q50: f64,
    pub q75: f64,
    pub max: f64,
}

impl ColumnSummary {
    pub fn from_values(name: &str, values: &[f64]) -> Self {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        sorted.sort_by(f64::total_cmp);
        let n = sorted.len();
        let mean = if n == 0 {
            f64::NAN
        } else {
            sorted.iter().sum::<f64>() / n as f64
        };
        let std = if n < 2 {
            f64::NAN
        } else {
            let ss: f64 = sorted.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (n - 1) as f64).sqrt()
        };
        ColumnSummary {
            name: name.to_string(),
            count: n,
            mean,
            std,
            min: sorted.first().copied().unwrap_or(f64::NAN),
            q25: quantile(&sorted, 0.25),
            q50: quantile(&sorted, 0.5),
            q75: quantile(&sorted, 0.75),
            max: sorted.last().copied().unwrap_or(f64::NAN),
        }
    }

    /// Values in [`DESCRIBE_ROWS`] order.
    pub fn values(&self) -> [f64; 8] {
        [
            self.count as f64,
            self.mean,
            self.std,
            self.min,
            self.q25,
            self.q50,
            self.q75,
            self.max,
        ]
    }
}

/// Summaries for every column of the table, in column order.
pub fn describe(table: &DataTable) -> Vec<ColumnSummary> {
    table
        .iter_columns()
        .map(|(name, values)| ColumnSummary::from_values(name, values))
        .collect()
}

/// Linearly interpolated quantile of an ascending slice.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let pos = q.clamp(0.0, 1.0) * (n - 1) as f64;
            let lo = pos.floor() as usize;
            let hi = pos.ceil() as usize;
            let frac = pos - lo as f64;
            sorted[lo] + (sorted[hi] - sorted[lo]) * frac
        }
    }
}

// ---------------------------------------------------------------------------
// Correlation
// ---------------------------------------------------------------------------

/// Pearson correlation coefficient, or `None` when it is undefined
/// (fewer than two rows, a NaN cell, or zero variance on either side).
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len();
    if n < 2 || n != y.len() || x.iter().chain(y).any(|v| v.is_nan()) {
        return None;
    }
    let mean_x = x.iter().sum::<f64>() / n as f64;
    let mean_y = y.iter().sum::<f64>() / n as f64;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (a, b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    Some((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

// ---------------------------------------------------------------------------
// Row sampling
// ---------------------------------------------------------------------------

/// Seeded generator when a seed is given, otherwise seeded from entropy.
pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// At most `max_rows` rows drawn without replacement. Tables that already
/// fit are returned whole. Sampled rows keep their original relative order.
pub fn sample_rows<R: Rng + ?Sized>(table: &DataTable, max_rows: usize, rng: &mut R) -> DataTable {
    if table.n_rows() <= max_rows {
        return table.clone();
    }
    let mut rows = rand::seq::index::sample(rng, table.n_rows(), max_rows).into_vec();
    rows.sort_unstable();
    table.select_rows(&rows)
}

// ---------------------------------------------------------------------------
// Number formatting
// ---------------------------------------------------------------------------

/// `%g`-style formatting with six significant digits.
pub fn format_g(v: f64) -> String {
    if v.is_nan() {
        return "nan".into();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf".into() } else { "-inf".into() };
    }
    let sci = format!("{v:.5e}");
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m.to_string(), e.parse::<i32>().unwrap_or(0)),
        None => (sci.clone(), 0),
    };
    if (-4..6).contains(&exp) {
        let decimals = (5 - exp).max(0) as usize;
        trim_fraction(&format!("{v:.decimals$}"))
    } else {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{sign}{:02}", trim_fraction(&mantissa), exp.abs())
    }
}

fn trim_fraction(s: &str) -> String {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s.to_string()
    }
}

/// Integer with comma thousands separators.
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(n: usize) -> DataTable {
        let a: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let t: Vec<f64> = (0..n).map(|i| (i % 3) as f64).collect();
        DataTable::new(vec!["a".into(), "target".into()], vec![a, t]).unwrap()
    }

    #[test]
    fn describe_matches_pandas_semantics() {
        let s = ColumnSummary::from_values("x", &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(s.count, 4);
        assert_eq!(s.mean, 2.5);
        assert!((s.std - 1.2909944).abs() < 1e-6);
        assert_eq!(s.q25, 1.75);
        assert_eq!(s.q50, 2.5);
        assert_eq!(s.q75, 3.25);
        assert_eq!((s.min, s.max), (1.0, 4.0));
    }

    #[test]
    fn describe_skips_nan() {
        let s = ColumnSummary::from_values("x", &[f64::NAN, 5.0]);
        assert_eq!(s.count, 1);
        assert_eq!(s.mean, 5.0);
        assert!(s.std.is_nan());
    }

    #[test]
    fn pearson_perfect_and_undefined() {
        let x = [1.0, 2.0, 3.0];
        assert!((pearson(&x, &[2.0, 4.0, 6.0]).unwrap() - 1.0).abs() < 1e-12);
        assert!((pearson(&x, &[3.0, 2.0, 1.0]).unwrap() + 1.0).abs() < 1e-12);
        assert_eq!(pearson(&x, &[7.0, 7.0, 7.0]), None);
        assert_eq!(pearson(&[1.0], &[1.0]), None);
    }

    #[test]
    fn sampling_caps_row_count() {
        let mut rng = make_rng(Some(7));
        let big = table(2500);
        let sampled = sample_rows(&big, 1000, &mut rng);
        assert_eq!(sampled.n_rows(), 1000);

        let a = sampled.column("a").unwrap();
        assert!(a.windows(2).all(|w| w[0] < w[1]), "rows must be distinct and ordered");
        // A uniform sample of 0..2500 has a mean near 1250.
        let mean = a.iter().sum::<f64>() / a.len() as f64;
        assert!((mean - 1249.5).abs() < 150.0);
    }

    #[test]
    fn sampling_keeps_small_tables_whole() {
        let mut rng = make_rng(None);
        let small = table(1000);
        assert_eq!(sample_rows(&small, 1000, &mut rng), small);
    }

    #[test]
    fn format_g_like_python() {
        assert_eq!(format_g(150.0), "150");
        assert_eq!(format_g(5.843333333), "5.84333");
        assert_eq!(format_g(0.828066), "0.828066");
        assert_eq!(format_g(1234567.0), "1.23457e+06");
        assert_eq!(format_g(0.00001234), "1.234e-05");
        assert_eq!(format_g(0.0), "0");
        assert_eq!(format_g(-2.5), "-2.5");
        assert_eq!(format_g(f64::NAN), "nan");
    }

    #[test]
    fn thousands_grouping() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(150), "150");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }
}
