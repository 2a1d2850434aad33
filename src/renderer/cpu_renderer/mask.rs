use super::bitmap::Bitmap;

/// Single channel coverage buffer in `0.0..=1.0`.
///
/// Used as the intermediate for glyph coverage, stroke dilation and shadow
/// blur before the result is painted into a [`Bitmap`].
#[derive(Clone, Debug, PartialEq)]
pub struct AlphaMask {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl AlphaMask {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width.saturating_mul(height)],
        }
    }

    /// Copies the alpha channel of `bitmap`, surrounded by `pad` empty
    /// pixels on every side.
    pub fn from_alpha(bitmap: &Bitmap, pad: usize) -> Self {
        let width = bitmap.width() as usize;
        let height = bitmap.height() as usize;
        let mut mask = Self::new(width + 2 * pad, height + 2 * pad);
        for (index, pixel) in bitmap.pixels().iter().enumerate() {
            let (x, y) = (index % width, index / width);
            mask.data[(y + pad) * mask.width + x + pad] = pixel[3];
        }
        mask
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Coverage at `(x, y)`; zero outside the mask.
    pub fn get(&self, x: usize, y: usize) -> f32 {
        if x >= self.width || y >= self.height {
            return 0.0;
        }
        self.data[y * self.width + x]
    }

    /// Adds coverage to a pixel, saturating at full coverage.
    pub fn accumulate(&mut self, x: i64, y: i64, coverage: f32) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let value = &mut self.data[y as usize * self.width + x as usize];
        *value = (*value + coverage).min(1.0);
    }

    /// Adds an 8-bit glyph coverage block whose top-left lands at `(x, y)`.
    pub fn draw_coverage(&mut self, coverage: &[u8], width: usize, height: usize, x: f32, y: f32) {
        let origin_x = x.floor() as i64;
        let origin_y = y.floor() as i64;
        for row in 0..height {
            for col in 0..width {
                let Some(&value) = coverage.get(row * width + col) else {
                    return;
                };
                if value == 0 {
                    continue;
                }
                self.accumulate(
                    origin_x + col as i64,
                    origin_y + row as i64,
                    value as f32 / 255.0,
                );
            }
        }
    }

    /// Grows the covered area by `radius` pixels in every direction.
    ///
    /// The kernel is a disc with a one pixel soft edge, so fractional radii
    /// produce partially covered rims.
    pub fn dilate(&self, radius: f32) -> Self {
        if radius <= 0.0 {
            return self.clone();
        }
        let reach = (radius + 0.5).ceil() as i64;
        let mut kernel = Vec::new();
        for dy in -reach..=reach {
            for dx in -reach..=reach {
                let distance = ((dx * dx + dy * dy) as f32).sqrt();
                let weight = (radius + 0.5 - distance).clamp(0.0, 1.0);
                if weight > 0.0 {
                    kernel.push((dx, dy, weight));
                }
            }
        }

        let mut out = Self::new(self.width, self.height);
        for y in 0..self.height as i64 {
            for x in 0..self.width as i64 {
                let mut value: f32 = 0.0;
                for &(dx, dy, weight) in &kernel {
                    let (sx, sy) = (x + dx, y + dy);
                    if sx < 0 || sy < 0 {
                        continue;
                    }
                    value = value.max(self.get(sx as usize, sy as usize) * weight);
                }
                out.data[y as usize * self.width + x as usize] = value;
            }
        }
        out
    }

    /// Approximates a Gaussian blur with three box blur passes.
    ///
    /// Returns the number of pixels the blur spreads coverage outwards, which
    /// callers use as padding.
    pub fn gaussian_blur(&mut self, sigma: f32) -> usize {
        let radius = box_radius(sigma);
        if radius == 0 {
            return 0;
        }
        for _ in 0..3 {
            self.box_blur(radius);
        }
        3 * radius
    }

    fn box_blur(&mut self, radius: usize) {
        let mut scratch = vec![0.0; self.data.len()];
        blur_pass(&self.data, &mut scratch, self.width, self.height, radius, true);
        blur_pass(&scratch, &mut self.data, self.width, self.height, radius, false);
    }
}

/// Box radius whose three-pass variance matches `sigma`.
pub fn box_radius(sigma: f32) -> usize {
    if sigma <= 0.0 {
        return 0;
    }
    let box_width = (4.0 * sigma * sigma + 1.0).sqrt();
    ((box_width - 1.0) / 2.0).round().max(1.0) as usize
}

/// One-dimensional box filter. Pixels outside the buffer count as empty.
fn blur_pass(
    src: &[f32],
    dst: &mut [f32],
    width: usize,
    height: usize,
    radius: usize,
    horizontal: bool,
) {
    let (lanes, length) = if horizontal {
        (height, width)
    } else {
        (width, height)
    };
    let at = |lane: usize, i: usize| {
        if horizontal {
            lane * width + i
        } else {
            i * width + lane
        }
    };
    let window = (2 * radius + 1) as f32;
    let mut prefix = vec![0.0f32; length + 1];

    for lane in 0..lanes {
        for i in 0..length {
            prefix[i + 1] = prefix[i] + src[at(lane, i)];
        }
        for i in 0..length {
            let start = i.saturating_sub(radius);
            let end = (i + radius + 1).min(length);
            dst[at(lane, i)] = (prefix[end] - prefix[start]) / window;
        }
    }
}
