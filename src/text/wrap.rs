use super::{
    measure::{LineMetrics, TextMeasurer},
    style::TextStyle,
};

/// Asymmetric extents of a block of text around its origin.
///
/// The origin is the anchor of the first line. `top` is measured upwards
/// and `bottom` downwards, so `top + bottom` is the block height.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextBounds {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Default for TextBounds {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl TextBounds {
    /// Identity of the max-fold; every real line replaces it.
    pub const EMPTY: Self = Self {
        left: f32::NEG_INFINITY,
        right: f32::NEG_INFINITY,
        top: f32::NEG_INFINITY,
        bottom: f32::NEG_INFINITY,
    };

    pub fn is_empty(&self) -> bool {
        *self == Self::EMPTY
    }

    /// Grows the bounds to cover the line at `index`.
    ///
    /// Line `i` sits `i * line_height` below the origin, which lowers its
    /// contribution to `top` and raises its contribution to `bottom`.
    pub fn include_line(&mut self, metrics: &LineMetrics, index: usize, line_height: f32) {
        let shift = index as f32 * line_height;
        self.left = self.left.max(metrics.left);
        self.right = self.right.max(metrics.right);
        self.top = self.top.max(metrics.top - shift);
        self.bottom = self.bottom.max(metrics.bottom + shift);
    }

    pub fn width(&self) -> f32 {
        if self.is_empty() {
            0.0
        } else {
            (self.left + self.right).max(0.0)
        }
    }

    pub fn height(&self) -> f32 {
        if self.is_empty() {
            0.0
        } else {
            (self.top + self.bottom).max(0.0)
        }
    }
}

/// Lines produced by [`wrap`] together with their combined bounds.
#[derive(Clone, Debug, PartialEq)]
pub struct WrappedText {
    pub lines: Vec<String>,
    pub line_metrics: Vec<LineMetrics>,
    pub bounds: TextBounds,
    pub line_height: f32,
}

impl WrappedText {
    pub fn new(line_height: f32) -> Self {
        Self {
            lines: Vec::new(),
            line_metrics: Vec::new(),
            bounds: TextBounds::EMPTY,
            line_height,
        }
    }

    /// Appends a line below the existing ones. Bounds never shrink.
    pub fn push_line(&mut self, line: String, metrics: LineMetrics) {
        self.bounds
            .include_line(&metrics, self.lines.len(), self.line_height);
        self.lines.push(line);
        self.line_metrics.push(metrics);
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Iterates over lines with the vertical offset of their anchor.
    pub fn positioned_lines(&self) -> impl Iterator<Item = (&str, f32)> + '_ {
        self.lines
            .iter()
            .enumerate()
            .map(|(index, line)| (line.as_str(), index as f32 * self.line_height))
    }
}

/// Breaks `text` into lines no wider than `style.wrap_width`.
///
/// Paragraphs are separated by `\n` and always produce at least one line.
/// Paragraphs that already fit are kept verbatim; others are packed greedily
/// word by word, joining words with a single space. A word that is wider
/// than the wrap width on its own is kept whole on its own line.
pub fn wrap(text: &str, style: &TextStyle, measurer: &impl TextMeasurer) -> WrappedText {
    let mut wrapped = WrappedText::new(style.line_height);

    for paragraph in text.split('\n') {
        let metrics = LineMetrics::measure(measurer, paragraph, style);
        if metrics.width <= style.wrap_width {
            wrapped.push_line(paragraph.to_owned(), metrics);
        } else {
            wrap_paragraph(paragraph, style, measurer, &mut wrapped);
        }
    }

    wrapped
}

fn wrap_paragraph(
    paragraph: &str,
    style: &TextStyle,
    measurer: &impl TextMeasurer,
    wrapped: &mut WrappedText,
) {
    let mut line = String::new();
    let mut line_metrics: Option<LineMetrics> = None;

    for word in paragraph.split_whitespace() {
        let candidate = if line.is_empty() {
            word.to_owned()
        } else {
            format!("{line} {word}")
        };
        let metrics = LineMetrics::measure(measurer, &candidate, style);

        if metrics.width > style.wrap_width && !line.is_empty() {
            // Close the line before this word; the word opens the next one.
            let closed = std::mem::replace(&mut line, word.to_owned());
            let closed_metrics = line_metrics
                .replace(LineMetrics::measure(measurer, word, style))
                .unwrap_or_else(|| LineMetrics::measure(measurer, &closed, style));
            wrapped.push_line(closed, closed_metrics);
        } else {
            line = candidate;
            line_metrics = Some(metrics);
        }
    }

    // A whitespace-only paragraph still occupies one (empty) line.
    let metrics = line_metrics.unwrap_or_else(|| LineMetrics::measure(measurer, &line, style));
    wrapped.push_line(line, metrics);
}
