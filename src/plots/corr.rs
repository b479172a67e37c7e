use rand::Rng;

use crate::color::{to_hex, DivergingMap};
use crate::data::model::{DataTable, TARGET_COLUMN};
use crate::data::stats::{format_g, pearson, sample_rows};
use crate::render::chart::{self, Frame};
use crate::render::scale::{LinearScale, Scale};
use crate::render::svg::{Anchor, SvgDocument, TextStyle};
use crate::render::FigureConfig;

pub const COLORBAR_LABEL: &str = "Square Corr. Coef";

/// Squared pairwise correlations over the columns most correlated with the
/// target. `columns` ends with the target whenever it is non-empty.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationHeatmap {
    pub columns: Vec<String>,
    /// `matrix[i][j]` is r² between `columns[i]` and `columns[j]`; NaN when
    /// undefined.
    pub matrix: Vec<Vec<f64>>,
    /// Rows the correlations were computed on.
    pub rows_used: usize,
}

impl CorrelationHeatmap {
    /// Sample at most `max_rows` rows, then rank and correlate.
    pub fn compute<R: Rng + ?Sized>(
        table: &DataTable,
        max_rows: usize,
        max_columns: usize,
        rng: &mut R,
    ) -> Self {
        let sampled = sample_rows(table, max_rows, rng);
        Self::from_table(&sampled, max_columns)
    }

    /// Correlations over the whole table, no sampling.
    pub fn from_table(table: &DataTable, max_columns: usize) -> Self {
        let columns = rank_columns(table, max_columns);
        let data: Vec<&[f64]> = columns
            .iter()
            .filter_map(|c| table.column(c))
            .collect();
        let matrix = data
            .iter()
            .map(|a| {
                data.iter()
                    .map(|b| pearson(a, b).map_or(f64::NAN, |r| r * r))
                    .collect()
            })
            .collect();
        CorrelationHeatmap {
            columns,
            matrix,
            rows_used: table.n_rows(),
        }
    }

    /// No feature column has a defined correlation with the target.
    pub fn is_degenerate(&self) -> bool {
        self.columns.len() < 2
    }

    /// Only the strictly lower triangle is shown.
    pub fn is_masked(row: usize, col: usize) -> bool {
        col >= row
    }

    /// Unmasked, defined cell values.
    pub fn visible_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.matrix.iter().enumerate().flat_map(|(i, row)| {
            row.iter()
                .enumerate()
                .filter(move |(j, v)| !Self::is_masked(i, *j) && !v.is_nan())
                .map(|(_, v)| *v)
        })
    }

    /// Heatmap titled "Pairwise Correlations" with lower-cased tick labels
    /// and a colour bar.
    pub fn render(&self, config: &FigureConfig) -> String {
        let mut doc = SvgDocument::new(config.width, config.height);
        let n = self.columns.len();
        let label_room = 12.0
            + 6.0 * self.columns.iter().map(|c| c.chars().count()).max().unwrap_or(0) as f64;
        let frame = Frame::inset(
            config.width,
            config.height,
            (label_room.min(200.0), 40.0, 110.0, label_room.min(200.0)),
        );
        let side = frame.width().min(frame.height());
        let square = Frame {
            left: frame.left,
            top: frame.top,
            right: frame.left + side,
            bottom: frame.top + side,
        };

        let (vmin, vmax) = self
            .visible_values()
            .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
            .unwrap_or((0.0, 1.0));
        let cmap = DivergingMap::centered(vmin, vmax, 0.0);

        if n > 0 {
            let cell = side / n as f64;
            for (i, row) in self.matrix.iter().enumerate() {
                for (j, &v) in row.iter().enumerate() {
                    if Self::is_masked(i, j) || v.is_nan() {
                        continue;
                    }
                    let x = square.left + j as f64 * cell;
                    let y = square.top + i as f64 * cell;
                    doc.rect_outlined(x, y, cell, cell, &to_hex(cmap.color_for(v)), "#ffffff");
                }
            }

            let labels: Vec<String> = self.columns.iter().map(|c| c.to_lowercase()).collect();
            let font = (cell * 0.6).clamp(6.0, 8.0);
            for (k, label) in labels.iter().enumerate() {
                let mid = k as f64 * cell + cell / 2.0;
                doc.text(
                    square.left - 4.0,
                    square.top + mid + font / 3.0,
                    label,
                    TextStyle::new(font).anchor(Anchor::End),
                );
                let x = square.left + mid + font / 3.0;
                let y = square.bottom + 4.0;
                doc.text(x, y, label, TextStyle::new(font).anchor(Anchor::End).rotate(-90.0));
            }
        }

        draw_colorbar(&mut doc, &square, &cmap, vmin, vmax);
        chart::draw_title(&mut doc, &square, "Pairwise Correlations");
        doc.finish()
    }
}

/// Feature columns ranked by descending r² with the target (ties keep
/// column order), truncated to `max_columns`, then the target.
/// Columns with an undefined correlation are dropped; an empty result means
/// the target itself has no defined variance.
pub fn rank_columns(table: &DataTable, max_columns: usize) -> Vec<String> {
    let Some(target) = table.target() else {
        return Vec::new();
    };
    if pearson(target, target).is_none() {
        return Vec::new();
    }
    let mut ranked: Vec<(&str, f64)> = table
        .iter_columns()
        .filter(|(name, _)| *name != TARGET_COLUMN)
        .filter_map(|(name, values)| pearson(values, target).map(|r| (name, r * r)))
        .collect();
    // stable sort keeps column order among ties
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(max_columns);

    let mut columns: Vec<String> = ranked.into_iter().map(|(n, _)| n.to_string()).collect();
    columns.push(TARGET_COLUMN.to_string());
    columns
}

fn draw_colorbar(doc: &mut SvgDocument, square: &Frame, cmap: &DivergingMap, vmin: f64, vmax: f64) {
    let (vmin, vmax) = if vmax > vmin { (vmin, vmax) } else { (vmin - 0.5, vmax + 0.5) };
    let height = square.height() * 0.5;
    let top = square.top + (square.height() - height) / 2.0;
    let bottom = top + height;
    let x = square.right + 20.0;
    let width = 14.0;

    let steps = 64;
    let step_h = height / steps as f64;
    for s in 0..steps {
        let v = vmax - (vmax - vmin) * (s as f64 + 0.5) / steps as f64;
        let y = top + s as f64 * step_h;
        doc.rect(x, y, width, step_h + 0.3, &to_hex(cmap.color_for(v)));
    }

    let scale = LinearScale::new((vmin, vmax), (bottom, top));
    for (v, _) in scale.ticks() {
        let y = scale.map(v);
        doc.line(x + width, y, x + width + 3.0, y, "#333333", 1.0);
        doc.text(x + width + 5.0, y + 3.0, &format_g(v), TextStyle::new(8.0).anchor(Anchor::Start));
    }
    let label_x = x + width + 42.0;
    doc.text(
        label_x,
        top + height / 2.0,
        COLORBAR_LABEL,
        TextStyle::new(10.0).rotate(90.0),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::stats::make_rng;

    fn wide_table(n_rows: usize, n_features: usize) -> DataTable {
        let target: Vec<f64> = (0..n_rows).map(|i| (i % 7) as f64).collect();
        let mut names = Vec::new();
        let mut values = Vec::new();
        for f in 0..n_features {
            names.push(format!("Feat{f}"));
            // decreasing coupling with the target as f grows
            values.push(
                target
                    .iter()
                    .enumerate()
                    .map(|(i, t)| t * (n_features - f) as f64 + ((i * (f + 3)) % 11) as f64)
                    .collect(),
            );
        }
        names.push("target".into());
        values.push(target);
        DataTable::new(names, values).unwrap()
    }

    #[test]
    fn at_most_twenty_features_and_target_last() {
        let table = wide_table(200, 35);
        let heatmap = CorrelationHeatmap::from_table(&table, 20);
        assert_eq!(heatmap.columns.len(), 21);
        assert_eq!(heatmap.columns.last().map(String::as_str), Some("target"));
        assert_eq!(heatmap.columns.iter().filter(|c| *c == "target").count(), 1);
        assert_eq!(heatmap.matrix.len(), 21);
        assert!(heatmap.matrix.iter().all(|row| row.len() == 21));
    }

    #[test]
    fn ranking_is_by_descending_squared_correlation() {
        let target = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let weak = vec![2.0, 1.0, 4.0, 3.0, 5.0];
        let anti = vec![5.0, 4.0, 3.0, 2.0, 1.0];
        let table = DataTable::new(
            vec!["weak".into(), "target".into(), "anti".into()],
            vec![weak, target, anti],
        )
        .unwrap();
        assert_eq!(rank_columns(&table, 20), vec!["anti", "weak", "target"]);
        assert_eq!(rank_columns(&table, 1), vec!["anti", "target"]);
    }

    #[test]
    fn constant_columns_are_dropped() {
        let table = DataTable::new(
            vec!["flat".into(), "x".into(), "target".into()],
            vec![vec![1.0; 4], vec![1.0, 3.0, 2.0, 4.0], vec![0.0, 1.0, 0.0, 1.0]],
        )
        .unwrap();
        let heatmap = CorrelationHeatmap::from_table(&table, 20);
        assert_eq!(heatmap.columns, vec!["x", "target"]);
        assert!(!heatmap.is_degenerate());
    }

    #[test]
    fn only_target_survives_gives_one_by_one() {
        let table = DataTable::new(
            vec!["flat".into(), "target".into()],
            vec![vec![2.0; 3], vec![0.0, 1.0, 2.0]],
        )
        .unwrap();
        let heatmap = CorrelationHeatmap::from_table(&table, 20);
        assert_eq!(heatmap.columns, vec!["target"]);
        assert_eq!(heatmap.matrix, vec![vec![1.0]]);
        assert!(heatmap.is_degenerate());
        assert_eq!(heatmap.visible_values().count(), 0);
        assert!(heatmap.render(&FigureConfig::default()).contains("Pairwise Correlations"));
    }

    #[test]
    fn constant_target_gives_empty_heatmap() {
        let table = DataTable::new(
            vec!["x".into(), "target".into()],
            vec![vec![1.0, 2.0, 3.0], vec![1.0; 3]],
        )
        .unwrap();
        let heatmap = CorrelationHeatmap::from_table(&table, 20);
        assert!(heatmap.columns.is_empty());
        assert!(heatmap.matrix.is_empty());
        assert!(heatmap.is_degenerate());
        let svg = heatmap.render(&FigureConfig::default());
        assert!(svg.contains(">Pairwise Correlations</text>"));
        assert!(svg.contains(COLORBAR_LABEL));
    }

    #[test]
    fn large_tables_are_sampled_to_cap() {
        let mut rng = make_rng(Some(11));
        let big = wide_table(2400, 3);
        assert_eq!(CorrelationHeatmap::compute(&big, 1000, 20, &mut rng).rows_used, 1000);
        let small = wide_table(999, 3);
        assert_eq!(CorrelationHeatmap::compute(&small, 1000, 20, &mut rng).rows_used, 999);
    }

    #[test]
    fn upper_triangle_and_diagonal_are_masked() {
        assert!(CorrelationHeatmap::is_masked(0, 0));
        assert!(CorrelationHeatmap::is_masked(1, 2));
        assert!(!CorrelationHeatmap::is_masked(2, 1));

        let table = wide_table(100, 3);
        let heatmap = CorrelationHeatmap::from_table(&table, 20);
        // 4 columns -> 6 strictly-lower cells
        assert_eq!(heatmap.visible_values().count(), 6);
        assert!(heatmap.visible_values().all(|v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn tick_labels_are_lower_cased() {
        let table = wide_table(50, 2);
        let svg = CorrelationHeatmap::from_table(&table, 20).render(&FigureConfig::default());
        assert!(svg.contains(">feat0</text>"));
        assert!(!svg.contains(">Feat0</text>"));
    }
}
