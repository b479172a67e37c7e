use crate::data::model::TaskType;
use crate::data::stats::{format_g, quantile};
use crate::render::chart::{self, Frame};
use crate::render::scale::{LinearScale, Scale};
use crate::render::svg::SvgDocument;
use crate::render::FigureConfig;

/// Half-width of a class bin around its class value.
pub const CLASS_BIN_HALF_WIDTH: f64 = 0.25;

/// Upper bound on the number of bins of a continuous histogram.
pub const MAX_CONTINUOUS_BINS: usize = 50;

const BAR_COLOR: &str = "#4c72b0";

#[derive(Debug, Clone, PartialEq)]
pub struct HistBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Histogram of a target column plus the x ticks to label it with.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelDistribution {
    pub task: TaskType,
    pub bins: Vec<HistBin>,
    /// Class values for classification; `None` means automatic ticks.
    pub class_ticks: Option<Vec<f64>>,
}

impl LabelDistribution {
    /// NaN targets are ignored.
    pub fn compute(target: &[f64], task: TaskType) -> Self {
        let values: Vec<f64> = target.iter().copied().filter(|v| !v.is_nan()).collect();
        match task {
            TaskType::Classification => {
                let classes = distinct_sorted(&values);
                let bins = classes
                    .iter()
                    .map(|&c| HistBin {
                        lower: c - CLASS_BIN_HALF_WIDTH,
                        upper: c + CLASS_BIN_HALF_WIDTH,
                        count: values.iter().filter(|&&v| v == c).count(),
                    })
                    .collect();
                LabelDistribution {
                    task,
                    bins,
                    class_ticks: Some(classes),
                }
            }
            TaskType::Regression => LabelDistribution {
                task,
                bins: continuous_histogram(&values),
                class_ticks: None,
            },
        }
    }

    /// All bin edges, ascending.
    pub fn edges(&self) -> Vec<f64> {
        let mut edges: Vec<f64> = self.bins.iter().flat_map(|b| [b.lower, b.upper]).collect();
        edges.sort_by(f64::total_cmp);
        edges.dedup();
        edges
    }

    pub fn total(&self) -> usize {
        self.bins.iter().map(|b| b.count).sum()
    }

    /// Bar chart titled "Target Values" with a "Samples" y axis and no x label.
    pub fn render(&self, config: &FigureConfig) -> String {
        let mut doc = SvgDocument::new(config.width, config.height);
        let frame = Frame::inset(config.width, config.height, (70.0, 40.0, 20.0, 40.0));

        if !self.bins.is_empty() {
            let lo = self.bins.iter().map(|b| b.lower).fold(f64::INFINITY, f64::min);
            let hi = self.bins.iter().map(|b| b.upper).fold(f64::NEG_INFINITY, f64::max);
            let max_count = self.bins.iter().map(|b| b.count).max().unwrap_or(0);

            let x = LinearScale::with_margin((lo, hi), 0.05, frame.x_range());
            let y = LinearScale::new((0.0, (max_count.max(1) as f64) * 1.05), frame.y_range());

            let y_ticks: Vec<(f64, String)> = y
                .ticks()
                .into_iter()
                .filter(|(v, _)| v.fract() == 0.0)
                .collect();
            chart::draw_y_axis(&mut doc, &frame, &y, &y_ticks, Some("Samples"), true);

            for bin in &self.bins {
                let x0 = x.map(bin.lower);
                let x1 = x.map(bin.upper);
                let top = y.map(bin.count as f64);
                doc.rect_outlined(x0, top, x1 - x0, frame.bottom - top, BAR_COLOR, "#ffffff");
            }

            let x_ticks = match &self.class_ticks {
                Some(classes) => classes.iter().map(|&c| (c, format_g(c))).collect(),
                None => x.ticks(),
            };
            chart::draw_x_axis(&mut doc, &frame, &x, &x_ticks, None);
        } else {
            let y = LinearScale::new((0.0, 1.0), frame.y_range());
            chart::draw_y_axis(&mut doc, &frame, &y, &[], Some("Samples"), false);
        }

        chart::draw_box(&mut doc, &frame);
        chart::draw_title(&mut doc, &frame, "Target Values");
        doc.finish()
    }
}

fn distinct_sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(f64::total_cmp);
    out.dedup();
    out
}

/// Freedman–Diaconis bin count, falling back to `sqrt(n)` when the IQR is 0.
pub fn freedman_diaconis_bins(values: &[f64]) -> usize {
    if values.len() < 2 {
        return 1;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len() as f64;
    let iqr = quantile(&sorted, 0.75) - quantile(&sorted, 0.25);
    let h = 2.0 * iqr / n.cbrt();
    let bins = if h == 0.0 {
        n.sqrt() as usize
    } else {
        ((sorted[sorted.len() - 1] - sorted[0]) / h).ceil() as usize
    };
    bins.max(1)
}

/// Equal-width bins over `[min, max]`; the last bin is closed on the right.
fn continuous_histogram(values: &[f64]) -> Vec<HistBin> {
    if values.is_empty() {
        return Vec::new();
    }
    let n_bins = freedman_diaconis_bins(values).min(MAX_CONTINUOUS_BINS);
    let mut lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if hi == lo {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / n_bins as f64;
    let mut counts = vec![0usize; n_bins];
    for v in values {
        let idx = (((v - lo) / width).floor() as usize).min(n_bins - 1);
        counts[idx] += 1;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistBin {
            lower: lo + width * i as f64,
            upper: if i + 1 == n_bins { hi } else { lo + width * (i + 1) as f64 },
            count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_bins_bracket_each_value() {
        for classes in [vec![0.0, 1.0], vec![1.0, 2.0, 5.0, 9.0], vec![-3.0, 0.0, 0.5, 7.0, 100.0]] {
            let target: Vec<f64> = classes.iter().cycle().take(classes.len() * 3).copied().collect();
            let dist = LabelDistribution::compute(&target, TaskType::Classification);
            assert_eq!(dist.bins.len(), classes.len());
            for (bin, &c) in dist.bins.iter().zip(&classes) {
                assert_eq!(bin.lower, c - 0.25);
                assert_eq!(bin.upper, c + 0.25);
                assert_eq!(bin.count, 3);
            }
            assert_eq!(dist.class_ticks.as_deref(), Some(classes.as_slice()));
        }
    }

    #[test]
    fn class_bins_are_sorted_and_counted() {
        let dist = LabelDistribution::compute(&[2.0, 0.0, 2.0, 1.0, 2.0], TaskType::Classification);
        let counts: Vec<usize> = dist.bins.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![1, 1, 3]);
        assert_eq!(dist.edges(), vec![-0.25, 0.25, 0.75, 1.25, 1.75, 2.25]);
    }

    #[test]
    fn regression_histogram_covers_all_values() {
        let target: Vec<f64> = (0..500).map(|i| (i as f64 * 0.37).sin() * 10.0).collect();
        let dist = LabelDistribution::compute(&target, TaskType::Regression);
        assert!(dist.bins.len() <= MAX_CONTINUOUS_BINS);
        assert_eq!(dist.total(), 500);
        assert!(dist.class_ticks.is_none());
        for pair in dist.bins.windows(2) {
            assert!((pair[0].upper - pair[1].lower).abs() < 1e-9);
        }
    }

    #[test]
    fn fd_falls_back_to_sqrt_on_zero_iqr() {
        let mut values = vec![1.0; 100];
        values[0] = 0.0;
        assert_eq!(freedman_diaconis_bins(&values), 10);
    }

    #[test]
    fn constant_regression_target_gets_one_wide_bin() {
        let dist = LabelDistribution::compute(&[4.0, 4.0, 4.0, 4.0], TaskType::Regression);
        assert_eq!(dist.total(), 4);
        assert!(dist.bins.iter().all(|b| b.lower <= 4.0 && b.upper >= 4.0 || b.count == 0));
    }

    #[test]
    fn render_has_title_and_axis_label() {
        let dist = LabelDistribution::compute(&[0.0, 1.0, 1.0], TaskType::Classification);
        let svg = dist.render(&FigureConfig::default());
        assert!(svg.contains(">Target Values</text>"));
        assert!(svg.contains(">Samples</text>"));
        assert!(svg.contains("<rect"));

        let empty = LabelDistribution::compute(&[], TaskType::Regression);
        assert!(empty.render(&FigureConfig::default()).contains(">Target Values</text>"));
    }
}
