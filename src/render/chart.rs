use super::scale::Scale;
use super::svg::{Anchor, SvgDocument, TextStyle};
use crate::color::{to_hex, Rgb8};

const AXIS_COLOR: &str = "#333333";
const GRID_COLOR: &str = "#e5e5e5";
const TICK_LEN: f64 = 4.0;

/// Pixel bounds of the plotting area inside a figure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Frame {
    /// Plot area of a `width × height` figure after subtracting margins
    /// given as `(left, top, right, bottom)`.
    pub fn inset(width: u32, height: u32, margins: (f64, f64, f64, f64)) -> Self {
        let (l, t, r, b) = margins;
        Frame {
            left: l,
            top: t,
            right: (width as f64 - r).max(l + 1.0),
            bottom: (height as f64 - b).max(t + 1.0),
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    pub fn x_range(&self) -> (f64, f64) {
        (self.left, self.right)
    }

    /// Bottom-to-top so larger values sit higher.
    pub fn y_range(&self) -> (f64, f64) {
        (self.bottom, self.top)
    }

    pub fn center_x(&self) -> f64 {
        self.left + self.width() / 2.0
    }
}

pub fn draw_title(doc: &mut SvgDocument, frame: &Frame, title: &str) {
    doc.text(
        frame.center_x(),
        frame.top - 10.0,
        title,
        TextStyle::new(14.0).bold(),
    );
}

pub fn draw_box(doc: &mut SvgDocument, frame: &Frame) {
    let (l, t, r, b) = (frame.left, frame.top, frame.right, frame.bottom);
    doc.line(l, b, r, b, AXIS_COLOR, 1.0);
    doc.line(l, t, l, b, AXIS_COLOR, 1.0);
    doc.line(l, t, r, t, AXIS_COLOR, 1.0);
    doc.line(r, t, r, b, AXIS_COLOR, 1.0);
}

/// Ticks along the bottom edge. `ticks` outside the frame are skipped.
pub fn draw_x_axis(
    doc: &mut SvgDocument,
    frame: &Frame,
    scale: &dyn Scale,
    ticks: &[(f64, String)],
    label: Option<&str>,
) {
    for (value, text) in ticks {
        let x = scale.map(*value);
        if x < frame.left - 0.5 || x > frame.right + 0.5 {
            continue;
        }
        doc.line(x, frame.bottom, x, frame.bottom + TICK_LEN, AXIS_COLOR, 1.0);
        doc.text(x, frame.bottom + TICK_LEN + 12.0, text, TextStyle::new(10.0));
    }
    if let Some(label) = label.filter(|l| !l.is_empty()) {
        doc.text(frame.center_x(), frame.bottom + 36.0, label, TextStyle::new(12.0));
    }
}

/// Ticks along the left edge, with optional horizontal grid lines.
pub fn draw_y_axis(
    doc: &mut SvgDocument,
    frame: &Frame,
    scale: &dyn Scale,
    ticks: &[(f64, String)],
    label: Option<&str>,
    grid: bool,
) {
    for (value, text) in ticks {
        let y = scale.map(*value);
        if y < frame.top - 0.5 || y > frame.bottom + 0.5 {
            continue;
        }
        if grid {
            doc.line(frame.left, y, frame.right, y, GRID_COLOR, 0.8);
        }
        doc.line(frame.left - TICK_LEN, y, frame.left, y, AXIS_COLOR, 1.0);
        doc.text(
            frame.left - TICK_LEN - 3.0,
            y + 3.5,
            text,
            TextStyle::new(10.0).anchor(Anchor::End),
        );
    }
    if let Some(label) = label.filter(|l| !l.is_empty()) {
        let x = frame.left - 42.0;
        let y = frame.top + frame.height() / 2.0;
        doc.text(x, y, label, TextStyle::new(12.0).rotate(-90.0));
    }
}

/// Vertical grid lines for the given x ticks.
pub fn draw_x_grid(doc: &mut SvgDocument, frame: &Frame, scale: &dyn Scale, ticks: &[(f64, String)]) {
    for (value, _) in ticks {
        let x = scale.map(*value);
        if x >= frame.left && x <= frame.right {
            doc.line(x, frame.top, x, frame.bottom, GRID_COLOR, 0.8);
        }
    }
}

/// Legend box anchored to the upper-left corner of the frame.
pub fn draw_legend(doc: &mut SvgDocument, frame: &Frame, title: Option<&str>, entries: &[(String, Rgb8)]) {
    if entries.is_empty() {
        return;
    }
    let row_h = 16.0;
    let widest = entries.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
    let width = 30.0 + widest as f64 * 6.5;
    let rows = entries.len() + usize::from(title.is_some());
    let (x, y) = (frame.left + 8.0, frame.top + 8.0);
    doc.rect_outlined(x, y, width, rows as f64 * row_h + 8.0, "#ffffff", "#cccccc");

    let mut cy = y + 4.0 + row_h / 2.0;
    if let Some(title) = title {
        doc.text(x + 8.0, cy + 4.0, title, TextStyle::new(11.0).anchor(Anchor::Start).bold());
        cy += row_h;
    }
    for (label, color) in entries {
        doc.circle(x + 12.0, cy, 4.5, &to_hex(*color));
        doc.text(x + 22.0, cy + 4.0, label, TextStyle::new(11.0).anchor(Anchor::Start));
        cy += row_h;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::scale::LinearScale;

    #[test]
    fn frame_inset() {
        let f = Frame::inset(640, 480, (60.0, 40.0, 20.0, 50.0));
        assert_eq!((f.left, f.top, f.right, f.bottom), (60.0, 40.0, 620.0, 430.0));
        assert_eq!(f.width(), 560.0);
        assert_eq!(f.height(), 390.0);
    }

    #[test]
    fn axis_labels_are_drawn() {
        let frame = Frame::inset(200, 200, (50.0, 30.0, 10.0, 40.0));
        let scale = LinearScale::new((0.0, 10.0), frame.y_range());
        let mut doc = SvgDocument::new(200, 200);
        let ticks = vec![(0.0, "0".to_string()), (5.0, "5".to_string()), (50.0, "50".to_string())];
        draw_y_axis(&mut doc, &frame, &scale, &ticks, Some("Samples"), false);
        let svg = doc.finish();
        assert!(svg.contains(">Samples</text>"));
        assert!(svg.contains(">5</text>"));
        assert!(!svg.contains(">50</text>"), "out-of-range tick skipped");
    }
}
