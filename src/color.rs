use std::collections::BTreeMap;

use palette::white_point::D65;
use palette::{Hsl, Hsluv, IntoColor, LinSrgb, Mix, Srgb};

/// 8-bit sRGB colour as written into SVG attributes.
pub type Rgb8 = Srgb<u8>;

/// `#rrggbb` for SVG `fill`/`stroke` attributes.
pub fn to_hex(c: Rgb8) -> String {
    format!("#{:02x}{:02x}{:02x}", c.red, c.green, c.blue)
}

/// Fallback for labels with no assigned colour.
pub fn gray() -> Rgb8 {
    Srgb::new(128, 128, 128)
}

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Rgb8> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0 + 210.0;
            let hsl = Hsl::new(hue, 0.65, 0.5);
            let rgb: Srgb = hsl.into_color();
            rgb.into_format()
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: category label → colour
// ---------------------------------------------------------------------------

/// Maps the distinct labels of a categorical series to distinct colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Rgb8>,
    default_color: Rgb8,
}

impl ColorMap {
    /// Build a colour map from labels; duplicates are collapsed and the
    /// assignment follows sorted label order.
    pub fn new<'a>(labels: impl IntoIterator<Item = &'a str>) -> Self {
        let unique: std::collections::BTreeSet<&str> = labels.into_iter().collect();
        let palette = generate_palette(unique.len());
        let mapping = unique
            .into_iter()
            .zip(palette)
            .map(|(label, c)| (label.to_string(), c))
            .collect();
        ColorMap {
            mapping,
            default_color: gray(),
        }
    }

    pub fn color_for(&self, label: &str) -> Rgb8 {
        self.mapping
            .get(label)
            .copied()
            .unwrap_or(self.default_color)
    }

    /// Legend entries (label → colour) in label order.
    pub fn legend_entries(&self) -> Vec<(String, Rgb8)> {
        self.mapping
            .iter()
            .map(|(label, c)| (label.clone(), *c))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Diverging colour map for heatmaps
// ---------------------------------------------------------------------------

/// Blue → light grey → red map over `[center - span, center + span]`.
#[derive(Debug, Clone, Copy)]
pub struct DivergingMap {
    negative: LinSrgb,
    neutral: LinSrgb,
    positive: LinSrgb,
    center: f64,
    span: f64,
}

impl DivergingMap {
    /// Map centred on `center`, wide enough to cover `[vmin, vmax]`.
    pub fn centered(vmin: f64, vmax: f64, center: f64) -> Self {
        let span = (vmax - center).abs().max((center - vmin).abs());
        DivergingMap {
            negative: husl(220.0),
            neutral: Srgb::new(0.95f32, 0.95, 0.95).into_linear(),
            positive: husl(10.0),
            center,
            span: if span > 0.0 { span } else { 1.0 },
        }
    }

    pub fn color_for(&self, value: f64) -> Rgb8 {
        let t = ((value - self.center) / self.span).clamp(-1.0, 1.0) as f32;
        let mixed = if t < 0.0 {
            self.neutral.mix(self.negative, -t)
        } else {
            self.neutral.mix(self.positive, t)
        };
        let srgb: Srgb = Srgb::from_linear(mixed);
        srgb.into_format()
    }
}

fn husl(hue: f32) -> LinSrgb {
    let rgb: Srgb = Hsluv::<D65, f32>::new(hue, 75.0, 50.0).into_color();
    rgb.into_linear()
}
