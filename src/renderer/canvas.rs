//! Boundary traits between the text cache and the platform that owns pixels.

use crate::{
    error::RenderResult,
    text::{
        BaseAlign, Color, FontSpec, Offset, TextAlign, TextMeasurer, TextStyle,
    },
};

/// Text drawing state applied to a canvas before measuring or drawing.
#[derive(Clone, Debug, PartialEq)]
pub struct CanvasProperties {
    pub font: FontSpec,
    pub text_align: TextAlign,
    pub base_align: BaseAlign,
    /// Width of the stroke drawn by [`Canvas::stroke_text`].
    pub line_width: f32,
    pub stroke_color: Color,
    pub fill_color: Color,
}

impl CanvasProperties {
    pub fn from_style(style: &TextStyle) -> Self {
        Self {
            font: style.font.clone(),
            text_align: style.text_align,
            base_align: style.base_align,
            line_width: style.stroke_width(),
            stroke_color: style.stroke_color(),
            fill_color: style.color,
        }
    }
}

/// Drop shadow applied while compositing an image.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shadow {
    pub color: Color,
    pub blur: f32,
    pub offset: Offset,
}

impl Shadow {
    pub fn from_style(style: &TextStyle) -> Self {
        Self {
            color: style.shadow_color,
            blur: style.shadow_blur_radius,
            offset: style.shadow_offset,
        }
    }
}

/// Offscreen 2D surface that can measure and draw text.
///
/// Coordinates are in pixels with the Y axis pointing down. Text is
/// positioned by its anchor, which the applied [`CanvasProperties`] place
/// relative to the glyphs.
pub trait Canvas: TextMeasurer {
    type Image;

    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Applies font, alignment, stroke and fill state.
    ///
    /// Fails when the font or the drawing context cannot be obtained.
    fn set_properties(&mut self, properties: &CanvasProperties) -> RenderResult<()>;

    /// Resizes the surface.
    ///
    /// Pixels, the transform and all applied properties are reset, so
    /// properties must be applied again before drawing.
    fn resize(&mut self, width: u32, height: u32) -> RenderResult<()>;

    /// Moves the origin used by subsequent draw calls.
    fn translate(&mut self, dx: f32, dy: f32);

    fn stroke_text(&mut self, text: &str, x: f32, y: f32);

    fn fill_text(&mut self, text: &str, x: f32, y: f32);

    /// Composites `image` with its top-left corner at `(x, y)`, casting
    /// `shadow` underneath when given.
    fn draw_image(&mut self, image: &Self::Image, x: f32, y: f32, shadow: Option<&Shadow>);

    /// Finishes drawing and hands out the pixels.
    fn into_image(self) -> Self::Image;
}

/// Capability to obtain fresh offscreen canvases.
pub trait CanvasFactory {
    type Canvas: Canvas;

    fn create_canvas(&self, width: u32, height: u32) -> RenderResult<Self::Canvas>;
}

/// Engine-side surface that receives the finished image.
pub trait DrawTarget<I: ?Sized> {
    fn draw_image(&mut self, image: &I, x: f32, y: f32);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::TextOptions;

    #[test]
    fn properties_follow_style() {
        let style = TextOptions {
            font_size: 18.0,
            bold: true,
            outline_width: 2.0,
            outline_color: Color::new(0.0, 0.0, 1.0, 1.0),
            color: Color::new(1.0, 1.0, 1.0, 1.0),
            text_align: TextAlign::Center,
            base_align: BaseAlign::Top,
            ..Default::default()
        }
        .style();
        let properties = CanvasProperties::from_style(&style);
        assert_eq!(properties.font.to_string(), "normal bold 18px sans-serif");
        assert_eq!(properties.line_width, 4.0);
        assert_eq!(properties.stroke_color, Color::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(properties.fill_color, Color::new(1.0, 1.0, 1.0, 1.0));
        assert_eq!(properties.text_align, TextAlign::Center);
        assert_eq!(properties.base_align, BaseAlign::Top);
    }

    #[test]
    fn outline_color_ignored_without_width() {
        let style = TextOptions {
            outline_color: Color::new(0.0, 1.0, 0.0, 1.0),
            ..Default::default()
        }
        .style();
        let properties = CanvasProperties::from_style(&style);
        assert_eq!(properties.stroke_color.alpha, 0.0);
    }
}
