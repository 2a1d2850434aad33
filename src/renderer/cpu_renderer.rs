mod bitmap;
mod glyph_cache;
mod mask;

use std::sync::Arc;

use euclid::default::{Box2D, Point2D, Size2D, Vector2D};

use crate::{
    error::{RenderError, RenderResult},
    font_storage::ResolvedFont,
    font_system::FontSystem,
    renderer::canvas::{Canvas, CanvasFactory, CanvasProperties, Shadow},
    text::{BaseAlign, BoundingExtents, TextMeasurer, TextMetrics},
};

pub use bitmap::Bitmap;
pub use glyph_cache::{GlyphCache, GlyphKey, RasterizedGlyph};
pub use mask::{AlphaMask, box_radius};

/// Fraction of the ascent where the hanging baseline sits.
const HANGING_RATIO: f32 = 0.8;

/// Limits applied to canvases created by [`CpuCanvasFactory`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CpuCanvasConfig {
    /// Largest width or height, in pixels, a canvas may have.
    pub max_surface_size: u32,
}

impl Default for CpuCanvasConfig {
    fn default() -> Self {
        Self {
            max_surface_size: 16384,
        }
    }
}

impl CpuCanvasConfig {
    fn check(&self, width: u32, height: u32) -> RenderResult<()> {
        if width > self.max_surface_size || height > self.max_surface_size {
            return Err(RenderError::SurfaceUnavailable {
                width,
                height,
                reason: format!("exceeds the {}px limit", self.max_surface_size),
            });
        }
        Ok(())
    }
}

/// Creates [`CpuCanvas`]es that draw with the fonts of a [`FontSystem`].
#[derive(Clone)]
pub struct CpuCanvasFactory {
    fonts: Arc<FontSystem>,
    config: CpuCanvasConfig,
}

impl CpuCanvasFactory {
    pub fn new(fonts: Arc<FontSystem>) -> Self {
        Self::with_config(fonts, CpuCanvasConfig::default())
    }

    pub fn with_config(fonts: Arc<FontSystem>, config: CpuCanvasConfig) -> Self {
        Self { fonts, config }
    }

    pub fn fonts(&self) -> &Arc<FontSystem> {
        &self.fonts
    }

    pub fn config(&self) -> &CpuCanvasConfig {
        &self.config
    }
}

impl CanvasFactory for CpuCanvasFactory {
    type Canvas = CpuCanvas;

    fn create_canvas(&self, width: u32, height: u32) -> RenderResult<CpuCanvas> {
        self.config.check(width, height)?;
        Ok(CpuCanvas {
            fonts: Arc::clone(&self.fonts),
            config: self.config,
            bitmap: Bitmap::new(width, height),
            translation: Vector2D::zero(),
            state: None,
        })
    }
}

/// Font and paint state applied by [`Canvas::set_properties`].
struct TextState {
    properties: CanvasProperties,
    font: ResolvedFont,
    ascent: f32,
    /// Negative below the baseline, as reported by the font.
    descent: f32,
}

impl TextState {
    fn baseline_shift(&self) -> f32 {
        baseline_shift(self.properties.base_align, self.ascent, self.descent)
    }
}

/// Vertical distance from the draw position down to the alphabetic baseline.
///
/// `descent` is negative below the baseline, as fonts report it.
fn baseline_shift(align: BaseAlign, ascent: f32, descent: f32) -> f32 {
    match align {
        BaseAlign::Alphabetic => 0.0,
        BaseAlign::Top => ascent,
        BaseAlign::Hanging => HANGING_RATIO * ascent,
        BaseAlign::Middle => (ascent + descent) / 2.0,
        BaseAlign::Bottom | BaseAlign::Ideographic => descent,
    }
}

/// Pixel rectangle `(x, y, width, height)` of one glyph on the canvas.
type GlyphRect = (i64, i64, i64, i64);

/// Canvas area a text mask has to cover: the union of `rects` grown by
/// `pad`, clipped to the canvas grown by `pad`. `None` when nothing remains.
fn coverage_box(
    rects: impl IntoIterator<Item = GlyphRect>,
    pad: i64,
    canvas: Size2D<u32>,
) -> Option<Box2D<i64>> {
    let ink = rects
        .into_iter()
        .map(|(x, y, width, height)| {
            Box2D::new(Point2D::new(x, y), Point2D::new(x + width, y + height))
        })
        .reduce(|a, b| a.union(&b))?;
    let clipped = Box2D::new(
        Point2D::new((ink.min.x - pad).max(-pad), (ink.min.y - pad).max(-pad)),
        Point2D::new(
            (ink.max.x + pad).min(canvas.width as i64 + pad),
            (ink.max.y + pad).min(canvas.height as i64 + pad),
        ),
    );
    (clipped.max.x > clipped.min.x && clipped.max.y > clipped.min.y).then_some(clipped)
}

#[derive(Clone, Copy, Debug)]
struct PlacedGlyph {
    index: u16,
    /// Pen position relative to the anchor.
    x: f32,
}

/// A string shaped on a single line, positioned relative to its anchor.
struct ShapedLine {
    glyphs: Vec<PlacedGlyph>,
    advance: f32,
    baseline: f32,
}

/// Software canvas drawing into a premultiplied [`Bitmap`].
pub struct CpuCanvas {
    fonts: Arc<FontSystem>,
    config: CpuCanvasConfig,
    bitmap: Bitmap,
    translation: Vector2D<f32>,
    state: Option<TextState>,
}

impl CpuCanvas {
    pub fn bitmap(&self) -> &Bitmap {
        &self.bitmap
    }

    fn shape(&self, state: &TextState, text: &str) -> ShapedLine {
        let font = &state.font.font;
        let size = state.properties.font.size;

        let mut glyphs = Vec::with_capacity(text.len());
        let mut pen = 0.0;
        let mut previous: Option<u16> = None;
        for c in text.chars() {
            let index = font.lookup_glyph_index(c);
            if let Some(kern) =
                previous.and_then(|prev| font.horizontal_kern_indexed(prev, index, size))
            {
                pen += kern;
            }
            glyphs.push(PlacedGlyph { index, x: pen });
            pen += font.metrics_indexed(index, size).advance_width;
            previous = Some(index);
        }

        let shift = -pen * state.properties.text_align.anchor_fraction();
        for glyph in &mut glyphs {
            glyph.x += shift;
        }

        ShapedLine {
            glyphs,
            advance: pen,
            baseline: state.baseline_shift(),
        }
    }

    /// Coverage of `text` anchored at `(x, y)`, cropped to its ink grown by
    /// `pad` pixels. Returns the mask with the canvas position of its
    /// top-left corner.
    fn text_mask(
        &self,
        state: &TextState,
        text: &str,
        x: f32,
        y: f32,
        pad: i64,
    ) -> Option<(AlphaMask, Point2D<i64>)> {
        let line = self.shape(state, text);
        let origin_x = x + self.translation.x;
        let baseline = y + self.translation.y + line.baseline;

        let placed: Vec<_> = line
            .glyphs
            .iter()
            .filter_map(|glyph| {
                let key = GlyphKey::new(state.font.id, glyph.index, state.properties.font.size);
                let raster = self.fonts.glyph(key, &state.font.font);
                let metrics = raster.metrics;
                if metrics.width == 0 || metrics.height == 0 {
                    return None;
                }
                let left = (origin_x + glyph.x + metrics.xmin as f32).floor() as i64;
                let top = (baseline - (metrics.ymin as f32 + metrics.height as f32)).floor() as i64;
                Some((raster, left, top))
            })
            .collect();

        let area = coverage_box(
            placed.iter().map(|(raster, left, top)| {
                (*left, *top, raster.metrics.width as i64, raster.metrics.height as i64)
            }),
            pad,
            Size2D::new(self.bitmap.width(), self.bitmap.height()),
        )?;

        let mut mask = AlphaMask::new(area.width() as usize, area.height() as usize);
        for (raster, left, top) in &placed {
            mask.draw_coverage(
                &raster.coverage,
                raster.metrics.width,
                raster.metrics.height,
                (left - area.min.x) as f32,
                (top - area.min.y) as f32,
            );
        }
        Some((mask, area.min))
    }
}

impl TextMeasurer for CpuCanvas {
    fn measure_text(&self, text: &str) -> TextMetrics {
        let Some(state) = &self.state else {
            log::warn!("measure_text called before set_properties.");
            return TextMetrics::default();
        };

        let line = self.shape(state, text);
        let size = state.properties.font.size;

        let mut ink: Option<BoundingExtents> = None;
        for glyph in &line.glyphs {
            let metrics = state.font.font.metrics_indexed(glyph.index, size);
            if metrics.width == 0 || metrics.height == 0 {
                continue;
            }
            let left = glyph.x + metrics.xmin as f32;
            let right = left + metrics.width as f32;
            let bottom = line.baseline - metrics.ymin as f32;
            let top = bottom - metrics.height as f32;
            let extents = ink.get_or_insert(BoundingExtents {
                left: -left,
                right,
                top: -top,
                bottom,
            });
            extents.left = extents.left.max(-left);
            extents.right = extents.right.max(right);
            extents.top = extents.top.max(-top);
            extents.bottom = extents.bottom.max(bottom);
        }

        // Without ink the advance box is reported with no height.
        let shift = line.advance * state.properties.text_align.anchor_fraction();
        let bounds = ink.unwrap_or(BoundingExtents {
            left: shift,
            right: line.advance - shift,
            top: 0.0,
            bottom: 0.0,
        });

        TextMetrics {
            width: line.advance,
            actual_bounds: Some(bounds),
        }
    }
}

impl Canvas for CpuCanvas {
    type Image = Bitmap;

    fn width(&self) -> u32 {
        self.bitmap.width()
    }

    fn height(&self) -> u32 {
        self.bitmap.height()
    }

    fn set_properties(&mut self, properties: &CanvasProperties) -> RenderResult<()> {
        let font = self.fonts.resolve_font(&properties.font)?;
        let size = properties.font.size;
        let (ascent, descent) = font
            .font
            .horizontal_line_metrics(size)
            .map(|metrics| (metrics.ascent, metrics.descent))
            .unwrap_or((0.8 * size, -0.2 * size));

        self.state = Some(TextState {
            properties: properties.clone(),
            font,
            ascent,
            descent,
        });
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) -> RenderResult<()> {
        self.config.check(width, height)?;
        self.bitmap = Bitmap::new(width, height);
        self.translation = Vector2D::zero();
        self.state = None;
        Ok(())
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.translation += Vector2D::new(dx, dy);
    }

    fn stroke_text(&mut self, text: &str, x: f32, y: f32) {
        let Some(state) = &self.state else {
            log::warn!("stroke_text called before set_properties.");
            return;
        };
        let color = state.properties.stroke_color;
        let radius = state.properties.line_width / 2.0;
        if color.alpha <= 0.0 || radius <= 0.0 {
            return;
        }

        // The dilated rim needs room around the ink.
        let pad = (radius + 0.5).ceil() as i64;
        let Some((mask, at)) = self.text_mask(state, text, x, y, pad) else {
            return;
        };
        self.bitmap.fill_mask(&mask.dilate(radius), at.x, at.y, color);
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32) {
        let Some(state) = &self.state else {
            log::warn!("fill_text called before set_properties.");
            return;
        };
        let color = state.properties.fill_color;
        if color.alpha <= 0.0 {
            return;
        }

        let Some((mask, at)) = self.text_mask(state, text, x, y, 0) else {
            return;
        };
        self.bitmap.fill_mask(&mask, at.x, at.y, color);
    }

    fn draw_image(&mut self, image: &Bitmap, x: f32, y: f32, shadow: Option<&Shadow>) {
        let x = x + self.translation.x;
        let y = y + self.translation.y;

        if let Some(shadow) = shadow.filter(|shadow| shadow.color.alpha > 0.0) {
            let sigma = shadow.blur / 2.0;
            let pad = 3 * box_radius(sigma);
            let mut mask = AlphaMask::from_alpha(image, pad);
            mask.gaussian_blur(sigma);
            self.bitmap.fill_mask(
                &mask,
                (x + shadow.offset.x).round() as i64 - pad as i64,
                (y + shadow.offset.y).round() as i64 - pad as i64,
                shadow.color,
            );
        }

        self.bitmap.draw_bitmap(image, x.round() as i64, y.round() as i64);
    }

    fn into_image(self) -> Bitmap {
        self.bitmap
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        renderer::render_cache::{RenderCache, RenderSnapshot},
        text::{Color, Offset, TextAlign, TextOptions},
    };

    fn factory() -> CpuCanvasFactory {
        CpuCanvasFactory::new(Arc::new(FontSystem::new()))
    }

    fn opaque(width: u32, height: u32, color: Color) -> Bitmap {
        let mut bitmap = Bitmap::new(width, height);
        for y in 0..height as i64 {
            for x in 0..width as i64 {
                bitmap.blend(x, y, color, 1.0);
            }
        }
        bitmap
    }

    /// Factory backed by the first installed font family, if the machine has
    /// any usable one.
    fn system_factory() -> Option<(CpuCanvasFactory, String)> {
        let fonts = FontSystem::new();
        fonts.load_system_fonts();
        let family = fonts
            .faces()
            .into_iter()
            .find_map(|face| face.families.first().map(|(name, _)| name.clone()))?;
        let factory = CpuCanvasFactory::new(Arc::new(fonts));
        let probe = TextOptions {
            font_family: family.clone(),
            ..Default::default()
        }
        .style();
        let mut canvas = factory.create_canvas(1, 1).ok()?;
        canvas
            .set_properties(&CanvasProperties::from_style(&probe))
            .ok()?;
        Some((factory, family))
    }

    #[test]
    fn oversized_surfaces_are_refused() {
        let factory = CpuCanvasFactory::with_config(
            Arc::new(FontSystem::new()),
            CpuCanvasConfig {
                max_surface_size: 64,
            },
        );
        assert!(factory.create_canvas(64, 64).is_ok());
        match factory.create_canvas(65, 1) {
            Err(RenderError::SurfaceUnavailable { width, height, .. }) => {
                assert_eq!((width, height), (65, 1));
            }
            _ => panic!("expected SurfaceUnavailable"),
        }

        let mut canvas = factory.create_canvas(1, 1).unwrap();
        assert!(canvas.resize(1, 100).is_err());
    }

    #[test]
    fn missing_font_fails_set_properties() {
        let mut canvas = factory().create_canvas(1, 1).unwrap();
        let properties = CanvasProperties::from_style(&TextOptions::default().style());
        assert!(matches!(
            canvas.set_properties(&properties),
            Err(RenderError::FontUnavailable { .. })
        ));
    }

    #[test]
    fn text_calls_without_properties_are_ignored() {
        let mut canvas = factory().create_canvas(4, 4).unwrap();
        assert_eq!(canvas.measure_text("abc"), TextMetrics::default());
        canvas.fill_text("abc", 0.0, 0.0);
        canvas.stroke_text("abc", 0.0, 0.0);
        assert!(canvas.bitmap().pixels().iter().all(|p| p[3] == 0.0));
    }

    #[test]
    fn draw_image_respects_translation() {
        let mut canvas = factory().create_canvas(6, 6).unwrap();
        canvas.translate(2.0, 1.0);
        canvas.translate(1.0, 1.0);
        canvas.draw_image(&opaque(1, 1, Color::new(1.0, 0.0, 0.0, 1.0)), 0.0, 0.0, None);
        let image = canvas.into_image();
        assert_eq!(image.pixel(3, 2), Some([1.0, 0.0, 0.0, 1.0]));
        assert_eq!(image.pixels().iter().filter(|p| p[3] > 0.0).count(), 1);
    }

    #[test]
    fn sharp_shadow_is_an_offset_copy_under_the_image() {
        let mut canvas = factory().create_canvas(10, 10).unwrap();
        let shadow = Shadow {
            color: Color::new(0.0, 0.0, 0.0, 0.5),
            blur: 0.0,
            offset: Offset::new(1.0, 1.0),
        };
        canvas.draw_image(
            &opaque(2, 2, Color::new(1.0, 0.0, 0.0, 1.0)),
            1.0,
            1.0,
            Some(&shadow),
        );
        let image = canvas.into_image();
        // Image on top of the overlapping shadow.
        assert_eq!(image.pixel(2, 2), Some([1.0, 0.0, 0.0, 1.0]));
        // Shadow only.
        assert_eq!(image.pixel(3, 3), Some([0.0, 0.0, 0.0, 0.5]));
        assert_eq!(image.pixel(4, 3), Some([0.0; 4]));
    }

    #[test]
    fn blurred_shadow_spreads_and_transparent_shadow_is_skipped() {
        let image = opaque(2, 2, Color::new(1.0, 1.0, 1.0, 1.0));
        let mut blurred = factory().create_canvas(20, 20).unwrap();
        blurred.draw_image(
            &image,
            9.0,
            9.0,
            Some(&Shadow {
                color: Color::new(0.0, 0.0, 0.0, 1.0),
                blur: 4.0,
                offset: Offset::zero(),
            }),
        );
        let blurred = blurred.into_image();
        let alpha = blurred.pixel(7, 9).unwrap()[3];
        assert!(alpha > 0.0 && alpha < 1.0);

        let mut plain = factory().create_canvas(20, 20).unwrap();
        plain.draw_image(
            &image,
            9.0,
            9.0,
            Some(&Shadow {
                color: Color::new(0.0, 0.0, 0.0, 0.0),
                blur: 4.0,
                offset: Offset::zero(),
            }),
        );
        let plain = plain.into_image();
        assert_eq!(plain.pixels().iter().filter(|p| p[3] > 0.0).count(), 4);
    }

    #[test]
    fn resize_clears_pixels_and_transform() {
        let mut canvas = factory().create_canvas(3, 3).unwrap();
        canvas.translate(1.0, 1.0);
        canvas.draw_image(&opaque(1, 1, Color::new(0.0, 1.0, 0.0, 1.0)), 0.0, 0.0, None);
        canvas.resize(2, 2).unwrap();
        assert_eq!((canvas.width(), canvas.height()), (2, 2));
        assert!(canvas.bitmap().pixels().iter().all(|p| p[3] == 0.0));
        canvas.draw_image(&opaque(1, 1, Color::new(0.0, 1.0, 0.0, 1.0)), 0.0, 0.0, None);
        assert_eq!(canvas.bitmap().pixel(0, 0), Some([0.0, 1.0, 0.0, 1.0]));
    }

    #[test]
    fn system_font_measures_and_draws() {
        let Some((factory, family)) = system_factory() else {
            return;
        };
        let style = |align| {
            TextOptions {
                font_family: family.clone(),
                font_size: 24.0,
                text_align: align,
                ..Default::default()
            }
            .style()
        };

        let mut canvas = factory.create_canvas(1, 1).unwrap();
        canvas
            .set_properties(&CanvasProperties::from_style(&style(TextAlign::Left)))
            .unwrap();
        let left = canvas.measure_text("Hello");
        assert!(left.width > 0.0);
        let bounds = left.actual_bounds.unwrap();
        assert!(bounds.right > 0.0);
        assert!(bounds.top > 0.0);

        canvas
            .set_properties(&CanvasProperties::from_style(&style(TextAlign::Right)))
            .unwrap();
        let right = canvas.measure_text("Hello");
        assert_eq!(right.width, left.width);
        assert!(right.actual_bounds.unwrap().left > 0.0);

        let empty = canvas.measure_text("");
        assert_eq!(empty.width, 0.0);
    }

    #[test]
    fn baseline_shift_covers_every_alignment() {
        let (ascent, descent) = (16.0, -4.0);
        let shift = |align| baseline_shift(align, ascent, descent);
        assert_eq!(shift(BaseAlign::Alphabetic), 0.0);
        assert_eq!(shift(BaseAlign::Top), 16.0);
        assert_eq!(shift(BaseAlign::Hanging), 12.8);
        assert_eq!(shift(BaseAlign::Middle), 6.0);
        assert_eq!(shift(BaseAlign::Bottom), -4.0);
        assert_eq!(shift(BaseAlign::Ideographic), -4.0);
    }

    #[test]
    fn coverage_box_is_ink_plus_padding() {
        let canvas = Size2D::new(100, 50);
        let area = coverage_box([(10, 5, 8, 12), (20, 3, 6, 10)], 2, canvas).unwrap();
        assert_eq!(area, Box2D::new(Point2D::new(8, 1), Point2D::new(28, 19)));

        let unpadded = coverage_box([(10, 5, 8, 12)], 0, canvas).unwrap();
        assert_eq!((unpadded.width(), unpadded.height()), (8, 12));
    }

    #[test]
    fn coverage_box_is_clipped_to_the_padded_canvas() {
        let canvas = Size2D::new(20, 10);
        let area = coverage_box([(-50, -50, 200, 200)], 3, canvas).unwrap();
        assert_eq!(area, Box2D::new(Point2D::new(-3, -3), Point2D::new(23, 13)));

        assert_eq!(coverage_box([(40, 0, 5, 5)], 3, canvas), None);
        assert_eq!(coverage_box(std::iter::empty(), 3, canvas), None);
    }

    #[test]
    fn system_font_stroke_widens_the_ink() {
        let Some((factory, family)) = system_factory() else {
            return;
        };
        let style = TextOptions {
            font_family: family,
            font_size: 24.0,
            outline_width: 2.0,
            outline_color: Color::new(1.0, 1.0, 1.0, 1.0),
            base_align: BaseAlign::Top,
            ..Default::default()
        }
        .style();
        let properties = CanvasProperties::from_style(&style);
        let inked = |canvas: &CpuCanvas| {
            canvas
                .bitmap()
                .pixels()
                .iter()
                .filter(|p| p[3] > 0.0)
                .count()
        };

        let mut filled = factory.create_canvas(160, 48).unwrap();
        filled.set_properties(&properties).unwrap();
        filled.fill_text("Hello", 8.0, 8.0);

        let mut stroked = factory.create_canvas(160, 48).unwrap();
        stroked.set_properties(&properties).unwrap();
        stroked.stroke_text("Hello", 8.0, 8.0);
        stroked.fill_text("Hello", 8.0, 8.0);

        assert!(inked(&filled) > 0);
        assert!(inked(&stroked) > inked(&filled));
    }

    #[test]
    fn system_font_renders_through_the_cache() {
        let Some((factory, family)) = system_factory() else {
            return;
        };
        let options = TextOptions {
            text: "Hi there".into(),
            font_family: family,
            font_size: 20.0,
            outline_width: 1.0,
            outline_color: Color::new(1.0, 1.0, 1.0, 1.0),
            shadow_color: Color::new(0.0, 0.0, 0.0, 0.5),
            shadow_offset: Offset::new(2.0, 2.0),
            shadow_blur_radius: 2.0,
            ..Default::default()
        };
        let mut cache: RenderCache<Bitmap> =
            RenderCache::new(RenderSnapshot::new(options.text.clone(), options.style()));

        let mut target = Bitmap::new(200, 60);
        cache.render(&factory, &mut target, 10.0, 30.0).unwrap();
        let entry = cache.entry().unwrap();
        assert_eq!(entry.image.width(), entry.size.width);
        assert!(entry.image.pixels().iter().any(|p| p[3] > 0.0));
        assert!(target.pixels().iter().any(|p| p[3] > 0.0));
        assert_eq!(cache.build_count(), 1);
    }
}
