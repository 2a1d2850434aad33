use super::style::TextStyle;

/// Ink extents reported by a surface, relative to the text anchor.
///
/// All four values grow outwards: `left` is the distance from the anchor to
/// the leftmost ink, `top` the distance above it, and so on. Any of them may
/// be negative when the ink does not reach the anchor.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BoundingExtents {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

/// Raw result of measuring a string on a surface.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TextMetrics {
    /// Advance width.
    pub width: f32,
    /// `None` on surfaces that cannot report glyph bounding boxes.
    pub actual_bounds: Option<BoundingExtents>,
}

impl TextMetrics {
    pub fn advance_only(width: f32) -> Self {
        Self {
            width,
            actual_bounds: None,
        }
    }
}

/// Capability to measure a string with the surface's current font.
pub trait TextMeasurer {
    fn measure_text(&self, text: &str) -> TextMetrics;
}

impl<F> TextMeasurer for F
where
    F: Fn(&str) -> TextMetrics,
{
    fn measure_text(&self, text: &str) -> TextMetrics {
        self(text)
    }
}

/// Metrics of a single laid out line.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LineMetrics {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
    /// Advance width used for wrap decisions.
    pub width: f32,
}

impl LineMetrics {
    /// Converts a raw measurement into line metrics.
    ///
    /// When the surface has no bounding box support the advance box is
    /// placed according to `style.text_align` and padded by the font size on
    /// each horizontal side, and by one and a half font sizes above and below
    /// the anchor. The estimate errs on the large side so ink is not clipped.
    pub fn from_measurement(metrics: TextMetrics, style: &TextStyle) -> Self {
        match metrics.actual_bounds {
            Some(bounds) => Self {
                left: bounds.left,
                right: bounds.right,
                top: bounds.top,
                bottom: bounds.bottom,
                width: metrics.width,
            },
            None => {
                let font_size = style.font.size;
                let anchor = metrics.width * style.text_align.anchor_fraction();
                Self {
                    left: anchor + font_size,
                    right: metrics.width - anchor + font_size,
                    top: 1.5 * font_size,
                    bottom: 1.5 * font_size,
                    width: metrics.width,
                }
            }
        }
    }

    /// Measures `text` and resolves the result with [`Self::from_measurement`].
    pub fn measure(measurer: &impl TextMeasurer, text: &str, style: &TextStyle) -> Self {
        let metrics = measurer.measure_text(text);
        if metrics.actual_bounds.is_none() {
            log::debug!("No glyph bounds for {text:?}; using estimated box.");
        }
        Self::from_measurement(metrics, style)
    }
}
