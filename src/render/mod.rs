/// Minimal SVG figure rendering.
///
/// Figures are assembled as strings: `svg` builds the document, `scale`
/// maps data to pixels, `chart` draws the shared furniture (axes, titles,
/// legends).

pub mod chart;
pub mod scale;
pub mod svg;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FigureConfig {
    pub width: u32,
    pub height: u32,
}

impl FigureConfig {
    pub const fn new(width: u32, height: u32) -> Self {
        FigureConfig { width, height }
    }
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
        }
    }
}
