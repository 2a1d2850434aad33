use euclid::default::{Point2D, Size2D};

use crate::{
    error::{RenderError, RenderResult},
    renderer::canvas::{Canvas, CanvasFactory, CanvasProperties, DrawTarget, Shadow},
    text::{TextBounds, TextStyle, WrappedText, wrap},
};

/// Everything that influences the rendered bitmap.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderSnapshot {
    pub text: String,
    pub style: TextStyle,
}

impl RenderSnapshot {
    pub fn new(text: impl Into<String>, style: TextStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

/// A rasterized generation of the cache.
pub struct CacheEntry<I> {
    pub image: I,
    /// Position of the text origin inside `image`.
    pub offset: Point2D<f32>,
    pub size: Size2D<u32>,
    pub bounds: TextBounds,
    pub line_count: usize,
}

/// Lazily built bitmap of a text snapshot.
///
/// The cache is either empty or holds the image for exactly its own
/// snapshot. A changed snapshot never patches the image; it replaces the
/// whole cache with an empty one that is built again on the next render.
pub struct RenderCache<I> {
    snapshot: RenderSnapshot,
    entry: Option<CacheEntry<I>>,
    builds: u64,
}

impl<I> RenderCache<I> {
    pub fn new(snapshot: RenderSnapshot) -> Self {
        Self {
            snapshot,
            entry: None,
            builds: 0,
        }
    }

    pub fn snapshot(&self) -> &RenderSnapshot {
        &self.snapshot
    }

    pub fn entry(&self) -> Option<&CacheEntry<I>> {
        self.entry.as_ref()
    }

    pub fn is_populated(&self) -> bool {
        self.entry.is_some()
    }

    /// Number of bitmaps built so far, across all snapshots.
    pub fn build_count(&self) -> u64 {
        self.builds
    }

    /// Returns this cache if `snapshot` equals the current one, otherwise
    /// an empty cache for `snapshot`.
    pub fn refreshed(mut self, snapshot: RenderSnapshot) -> Self {
        self.refresh(snapshot);
        self
    }

    /// In-place form of [`Self::refreshed`]. Returns `true` when the
    /// previous image was discarded.
    pub fn refresh(&mut self, snapshot: RenderSnapshot) -> bool {
        if self.snapshot == snapshot {
            return false;
        }
        *self = Self {
            snapshot,
            entry: None,
            builds: self.builds,
        };
        true
    }

    /// Builds the image if the cache is empty and returns the entry.
    pub fn populate<F>(&mut self, factory: &F) -> RenderResult<&CacheEntry<I>>
    where
        F: CanvasFactory,
        F::Canvas: Canvas<Image = I>,
    {
        let entry = match self.entry.take() {
            Some(entry) => {
                log::trace!("Text cache hit for {:?}.", self.snapshot.text);
                entry
            }
            None => {
                let entry = build(&self.snapshot, factory)?;
                self.builds += 1;
                log::debug!(
                    "Built text bitmap {}x{} ({} lines, generation {}).",
                    entry.size.width,
                    entry.size.height,
                    entry.line_count,
                    self.builds
                );
                entry
            }
        };
        Ok(self.entry.insert(entry))
    }

    /// Draws the text so that its origin lands on `(x, y)` in `target`.
    pub fn render<F, T>(&mut self, factory: &F, target: &mut T, x: f32, y: f32) -> RenderResult<()>
    where
        F: CanvasFactory,
        F::Canvas: Canvas<Image = I>,
        T: DrawTarget<I> + ?Sized,
    {
        let entry = self.populate(factory)?;
        target.draw_image(&entry.image, x - entry.offset.x, y - entry.offset.y);
        Ok(())
    }
}

/// Extra room around the text for a blurred, displaced shadow.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct ShadowMargins {
    left: f32,
    right: f32,
    top: f32,
    bottom: f32,
}

impl ShadowMargins {
    /// Blur spreads to every side; the offset adds to the side the shadow
    /// moves towards and subtracts from the opposite one.
    fn from_style(style: &TextStyle) -> Self {
        if !style.has_shadow() {
            return Self::default();
        }
        let blur = style.shadow_blur_radius.ceil();
        let offset = style.shadow_offset;
        Self {
            left: (blur - offset.x).max(0.0).ceil(),
            right: (blur + offset.x).max(0.0).ceil(),
            top: (blur - offset.y).max(0.0).ceil(),
            bottom: (blur + offset.y).max(0.0).ceil(),
        }
    }
}

/// Whole pixels needed to hold `value`; non-finite and negative values need
/// none.
fn whole_pixels(value: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value.ceil()
    } else {
        0.0
    }
}

/// Converts a surface extent to pixels, refusing sizes a `u32` cannot hold.
fn surface_size(width: f32, height: f32) -> RenderResult<Size2D<u32>> {
    let fits = |value: f32| (0.0..u32::MAX as f32).contains(&value);
    if !fits(width) || !fits(height) {
        return Err(RenderError::SurfaceUnavailable {
            width: width as u32,
            height: height as u32,
            reason: format!("{width}x{height} does not fit a surface"),
        });
    }
    Ok(Size2D::new(width as u32, height as u32))
}

fn draw_lines<C: Canvas>(canvas: &mut C, wrapped: &WrappedText, origin: Point2D<f32>) {
    canvas.translate(origin.x, origin.y);
    for (line, y) in wrapped.positioned_lines() {
        canvas.stroke_text(line, 0.0, y);
        canvas.fill_text(line, 0.0, y);
    }
}

fn build<F>(
    snapshot: &RenderSnapshot,
    factory: &F,
) -> RenderResult<CacheEntry<<F::Canvas as Canvas>::Image>>
where
    F: CanvasFactory,
{
    let style = &snapshot.style;
    let properties = CanvasProperties::from_style(style);

    let mut canvas = factory.create_canvas(1, 1)?;
    canvas.set_properties(&properties)?;
    let wrapped = wrap(&snapshot.text, style, &canvas);
    let bounds = wrapped.bounds;

    let outline = style.outline_margin();
    let text_size = surface_size(
        whole_pixels(bounds.width()) + 2.0 * outline,
        whole_pixels(bounds.height()) + 2.0 * outline,
    )?;
    let origin = Point2D::new(
        finite_or_zero(bounds.left) + outline,
        finite_or_zero(bounds.top) + outline,
    );

    canvas.resize(text_size.width, text_size.height)?;
    canvas.set_properties(&properties)?;
    draw_lines(&mut canvas, &wrapped, origin);

    if !style.has_shadow() {
        return Ok(CacheEntry {
            image: canvas.into_image(),
            offset: origin,
            size: text_size,
            bounds,
            line_count: wrapped.len(),
        });
    }

    let margins = ShadowMargins::from_style(style);
    let size = surface_size(
        text_size.width as f32 + margins.left + margins.right,
        text_size.height as f32 + margins.top + margins.bottom,
    )?;
    let text_image = canvas.into_image();
    let mut composite = factory.create_canvas(size.width, size.height)?;
    composite.draw_image(
        &text_image,
        margins.left,
        margins.top,
        Some(&Shadow::from_style(style)),
    );

    Ok(CacheEntry {
        image: composite.into_image(),
        offset: Point2D::new(origin.x + margins.left, origin.y + margins.top),
        size,
        bounds,
        line_count: wrapped.len(),
    })
}

fn finite_or_zero(value: f32) -> f32 {
    if value.is_finite() { value } else { 0.0 }
}
