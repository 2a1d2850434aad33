use euclid::default::{Box2D, Point2D};

use crate::{
    error::RenderResult,
    renderer::{
        canvas::{Canvas, CanvasFactory, DrawTarget},
        render_cache::{RenderCache, RenderSnapshot},
    },
    text::{BaseAlign, Color, FontStyle, Offset, TextAlign, TextOptions, TextStyle},
};

/// Drawable block of styled text.
///
/// Holds the flat [`TextOptions`] and a [`RenderCache`] for the image type
/// `I` of the canvases it is drawn with. Setting an option to the value it
/// already has keeps the cached image.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use textbake::{Bitmap, CpuCanvasFactory, FontSystem, Text};
///
/// let fonts = Arc::new(FontSystem::new());
/// fonts.load_system_fonts();
/// let factory = CpuCanvasFactory::new(fonts);
///
/// let mut text: Text<Bitmap> = Text::with_text("Hello, world");
/// text.set_font_size(32.0);
/// text.set_wrap_width(Some(200.0));
///
/// let mut target = Bitmap::new(320, 240);
/// text.draw(&factory, &mut target, 10.0, 40.0)?;
/// # Ok::<(), textbake::RenderError>(())
/// ```
pub struct Text<I> {
    options: TextOptions,
    cache: RenderCache<I>,
}

impl<I> Default for Text<I> {
    fn default() -> Self {
        Self::new(TextOptions::default())
    }
}

impl<I> Text<I> {
    pub fn new(options: TextOptions) -> Self {
        let cache = RenderCache::new(snapshot(&options));
        Self { options, cache }
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        Self::new(TextOptions {
            text: text.into(),
            ..Default::default()
        })
    }

    pub fn options(&self) -> &TextOptions {
        &self.options
    }

    /// Resolved style the next image is built with.
    pub fn style(&self) -> &TextStyle {
        &self.cache.snapshot().style
    }

    pub fn cache(&self) -> &RenderCache<I> {
        &self.cache
    }

    /// Number of images built over the lifetime of this node.
    pub fn build_count(&self) -> u64 {
        self.cache.build_count()
    }

    /// Replaces every option at once.
    pub fn set_options(&mut self, options: TextOptions) {
        self.options = options;
        self.sync();
    }

    /// Edits options in place, invalidating the image only if the result
    /// differs from the current snapshot.
    pub fn update(&mut self, f: impl FnOnce(&mut TextOptions)) {
        f(&mut self.options);
        self.sync();
    }

    fn sync(&mut self) {
        if self.cache.refresh(snapshot(&self.options)) {
            log::trace!("Text options changed; cached image dropped.");
        }
    }

    /// Draws the text with its origin at `(x, y)` in `target`, building the
    /// image first when needed.
    pub fn draw<F, T>(&mut self, factory: &F, target: &mut T, x: f32, y: f32) -> RenderResult<()>
    where
        F: CanvasFactory,
        F::Canvas: Canvas<Image = I>,
        T: DrawTarget<I> + ?Sized,
    {
        self.cache.render(factory, target, x, y)
    }

    /// Area covered by the image relative to the text origin.
    pub fn local_bounds<F>(&mut self, factory: &F) -> RenderResult<Box2D<f32>>
    where
        F: CanvasFactory,
        F::Canvas: Canvas<Image = I>,
    {
        let entry = self.cache.populate(factory)?;
        let min = Point2D::new(-entry.offset.x, -entry.offset.y);
        Ok(Box2D::new(min, min + entry.size.to_f32().to_vector()))
    }
}

/// option setters
impl<I> Text<I> {
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.update(|o| o.text = text);
    }

    pub fn set_font_family(&mut self, family: impl Into<String>) {
        let family = family.into();
        self.update(|o| o.font_family = family);
    }

    pub fn set_font_style(&mut self, style: FontStyle) {
        self.update(|o| o.font_style = style);
    }

    pub fn set_bold(&mut self, bold: bool) {
        self.update(|o| o.bold = bold);
    }

    pub fn set_font_size(&mut self, size: f32) {
        self.update(|o| o.font_size = size);
    }

    pub fn set_text_align(&mut self, align: TextAlign) {
        self.update(|o| o.text_align = align);
    }

    pub fn set_base_align(&mut self, align: BaseAlign) {
        self.update(|o| o.base_align = align);
    }

    /// `None` follows the font size.
    pub fn set_line_height(&mut self, line_height: Option<f32>) {
        self.update(|o| o.line_height = line_height);
    }

    /// `None` disables wrapping.
    pub fn set_wrap_width(&mut self, wrap_width: Option<f32>) {
        self.update(|o| o.wrap_width = wrap_width);
    }

    pub fn set_color(&mut self, color: Color) {
        self.update(|o| o.color = color);
    }

    pub fn set_outline_color(&mut self, color: Color) {
        self.update(|o| o.outline_color = color);
    }

    pub fn set_outline_width(&mut self, width: f32) {
        self.update(|o| o.outline_width = width);
    }

    pub fn set_shadow_color(&mut self, color: Color) {
        self.update(|o| o.shadow_color = color);
    }

    pub fn set_shadow_offset(&mut self, offset: Offset) {
        self.update(|o| o.shadow_offset = offset);
    }

    pub fn set_shadow_blur_radius(&mut self, radius: f32) {
        self.update(|o| o.shadow_blur_radius = radius);
    }
}

fn snapshot(options: &TextOptions) -> RenderSnapshot {
    RenderSnapshot::new(options.text.clone(), options.style())
}
