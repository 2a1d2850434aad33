use crate::renderer::canvas::DrawTarget;
use crate::text::Color;

use super::mask::AlphaMask;

/// RGBA image produced by the CPU canvas.
///
/// Pixels are arranged in row-major order with the origin at the top-left.
/// Channels are stored premultiplied by alpha in the `0.0..=1.0` range so
/// images can be composited onto each other without fringes.
#[derive(Clone, Debug, PartialEq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Vec<[f32; 4]>,
}

impl Bitmap {
    pub fn new(width: u32, height: u32) -> Self {
        let len = (width as usize).saturating_mul(height as usize);
        Self {
            width,
            height,
            pixels: vec![[0.0; 4]; len],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Premultiplied RGBA of a pixel, `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[f32; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    pub fn pixels(&self) -> &[[f32; 4]] {
        &self.pixels
    }

    fn index(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    /// Source-over blend of a premultiplied color. Out-of-bounds writes are
    /// dropped.
    fn composite(&mut self, x: i64, y: i64, src: [f32; 4]) {
        let Some(index) = self.index(x, y) else {
            return;
        };
        let dst = &mut self.pixels[index];
        let keep = 1.0 - src[3];
        for (d, s) in dst.iter_mut().zip(src) {
            *d = (s + *d * keep).clamp(0.0, 1.0);
        }
    }

    /// Blends `color` into a pixel at the given coverage.
    pub fn blend(&mut self, x: i64, y: i64, color: Color, coverage: f32) {
        let alpha = color.alpha * coverage.clamp(0.0, 1.0);
        if alpha <= 0.0 {
            return;
        }
        self.composite(
            x,
            y,
            [
                color.color.red * alpha,
                color.color.green * alpha,
                color.color.blue * alpha,
                alpha,
            ],
        );
    }

    /// Paints `color` through `mask`, with the mask's top-left at `(x, y)`.
    pub fn fill_mask(&mut self, mask: &AlphaMask, x: i64, y: i64, color: Color) {
        if color.alpha <= 0.0 {
            return;
        }
        for row in 0..mask.height() {
            for col in 0..mask.width() {
                let coverage = mask.get(col, row);
                if coverage > 0.0 {
                    self.blend(x + col as i64, y + row as i64, color, coverage);
                }
            }
        }
    }

    /// Composites `src` over this image with its top-left at `(x, y)`.
    pub fn draw_bitmap(&mut self, src: &Bitmap, x: i64, y: i64) {
        for row in 0..src.height {
            for col in 0..src.width {
                let pixel = src.pixels[row as usize * src.width as usize + col as usize];
                if pixel[3] > 0.0 {
                    self.composite(x + col as i64, y + row as i64, pixel);
                }
            }
        }
    }

    /// Straight-alpha 8-bit RGBA, suitable for image encoders and textures.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 4);
        for [r, g, b, a] in &self.pixels {
            let unpremultiply = |c: f32| if *a > 0.0 { c / a } else { 0.0 };
            out.extend(
                [unpremultiply(*r), unpremultiply(*g), unpremultiply(*b), *a]
                    .map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8),
            );
        }
        out
    }
}

impl DrawTarget<Bitmap> for Bitmap {
    fn draw_image(&mut self, image: &Bitmap, x: f32, y: f32) {
        self.draw_bitmap(image, x.round() as i64, y.round() as i64);
    }
}
