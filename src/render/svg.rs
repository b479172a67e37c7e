use std::fmt::Write;

/// Horizontal text alignment, mapped to `text-anchor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    Middle,
    End,
}

impl Anchor {
    fn as_str(&self) -> &'static str {
        match self {
            Anchor::Start => "start",
            Anchor::Middle => "middle",
            Anchor::End => "end",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TextStyle {
    pub size: f64,
    pub anchor: Anchor,
    /// Rotation in degrees around the text origin.
    pub rotate: f64,
    pub bold: bool,
}

impl TextStyle {
    pub fn new(size: f64) -> Self {
        TextStyle {
            size,
            anchor: Anchor::Middle,
            rotate: 0.0,
            bold: false,
        }
    }

    pub fn anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn rotate(mut self, degrees: f64) -> Self {
        self.rotate = degrees;
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }
}

/// An SVG document assembled element by element.
#[derive(Debug, Clone)]
pub struct SvgDocument {
    width: u32,
    height: u32,
    parts: Vec<String>,
}

impl SvgDocument {
    /// Empty document with a white background.
    pub fn new(width: u32, height: u32) -> Self {
        let mut doc = SvgDocument {
            width,
            height,
            parts: Vec::new(),
        };
        doc.rect(0.0, 0.0, width as f64, height as f64, "#ffffff");
        doc
    }

    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, fill: &str) {
        self.parts.push(format!(
            "<rect x='{x:.2}' y='{y:.2}' width='{:.2}' height='{:.2}' fill='{fill}' />",
            w.max(0.0),
            h.max(0.0)
        ));
    }

    pub fn rect_outlined(&mut self, x: f64, y: f64, w: f64, h: f64, fill: &str, stroke: &str) {
        self.parts.push(format!(
            "<rect x='{x:.2}' y='{y:.2}' width='{:.2}' height='{:.2}' fill='{fill}' stroke='{stroke}' stroke-width='0.8' />",
            w.max(0.0),
            h.max(0.0)
        ));
    }

    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, stroke: &str, width: f64) {
        self.parts.push(format!(
            "<line x1='{x1:.2}' y1='{y1:.2}' x2='{x2:.2}' y2='{y2:.2}' stroke='{stroke}' stroke-width='{width}' />"
        ));
    }

    pub fn circle(&mut self, cx: f64, cy: f64, r: f64, fill: &str) {
        self.parts.push(format!(
            "<circle cx='{cx:.2}' cy='{cy:.2}' r='{r:.2}' fill='{fill}' stroke='#ffffff' stroke-width='0.6' />"
        ));
    }

    pub fn text(&mut self, x: f64, y: f64, content: &str, style: TextStyle) {
        let mut el = format!(
            "<text x='{x:.2}' y='{y:.2}' font-family='sans-serif' font-size='{}' text-anchor='{}'",
            style.size,
            style.anchor.as_str()
        );
        if style.bold {
            el.push_str(" font-weight='bold'");
        }
        if style.rotate != 0.0 {
            let _ = write!(el, " transform='rotate({} {x:.2} {y:.2})'", style.rotate);
        }
        let _ = write!(el, ">{}</text>", escape(content));
        self.parts.push(el);
    }

    pub fn finish(self) -> String {
        let mut out = format!(
            "<svg xmlns='http://www.w3.org/2000/svg' width='{w}' height='{h}' viewBox='0 0 {w} {h}'>",
            w = self.width,
            h = self.height
        );
        for part in &self.parts {
            out.push('\n');
            out.push_str(part);
        }
        out.push_str("\n</svg>\n");
        out
    }
}

/// Escape text content for XML.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\'' => out.push_str("&apos;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_is_deterministic() {
        let build = || {
            let mut doc = SvgDocument::new(100, 50);
            doc.rect(1.0, 2.0, 3.0, 4.0, "#3b82f6");
            doc.text(10.0, 10.0, "a < b", TextStyle::new(12.0).rotate(-90.0));
            doc.finish()
        };
        let a = build();
        assert_eq!(a, build());
        assert!(a.starts_with("<svg xmlns='http://www.w3.org/2000/svg' width='100' height='50'"));
        assert!(a.contains("a &lt; b"));
        assert!(a.contains("rotate(-90 10.00 10.00)"));
        assert!(a.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn negative_sizes_are_clamped() {
        let mut doc = SvgDocument::new(10, 10);
        doc.rect(0.0, 0.0, -5.0, 2.0, "#000000");
        assert!(doc.finish().contains("width='0.00' height='2.00'"));
    }
}
