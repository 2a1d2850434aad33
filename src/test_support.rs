//! Deterministic stand-ins for platform surfaces, shared by unit tests.

use std::cell::Cell;
use std::collections::HashMap;

use crate::{
    error::{RenderError, RenderResult},
    renderer::canvas::{Canvas, CanvasFactory, CanvasProperties, DrawTarget, Shadow},
    text::{BoundingExtents, TextMeasurer, TextMetrics},
};

/// Measures every character with the same advance unless a width is
/// scripted for the exact string.
///
/// Reported bounds assume left alignment: ink spans `0..width`
/// horizontally and `ascent`/`descent` around the baseline.
#[derive(Clone, Debug)]
pub struct ScriptedMeasurer {
    per_char: f32,
    widths: HashMap<String, f32>,
    ascent: f32,
    descent: f32,
    precise: bool,
}

impl ScriptedMeasurer {
    pub fn monospace(per_char: f32) -> Self {
        Self {
            per_char,
            widths: HashMap::new(),
            ascent: 8.0,
            descent: 2.0,
            precise: true,
        }
    }

    pub fn with_width(mut self, text: &str, width: f32) -> Self {
        self.widths.insert(text.to_owned(), width);
        self
    }

    pub fn with_extents(mut self, ascent: f32, descent: f32) -> Self {
        self.ascent = ascent;
        self.descent = descent;
        self
    }

    pub fn without_bounds(mut self) -> Self {
        self.precise = false;
        self
    }
}

impl TextMeasurer for ScriptedMeasurer {
    fn measure_text(&self, text: &str) -> TextMetrics {
        let width = self
            .widths
            .get(text)
            .copied()
            .unwrap_or(text.chars().count() as f32 * self.per_char);
        TextMetrics {
            width,
            actual_bounds: self.precise.then_some(BoundingExtents {
                left: 0.0,
                right: width,
                top: self.ascent,
                bottom: self.descent,
            }),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum CanvasOp {
    SetProperties(CanvasProperties),
    Resize(u32, u32),
    Translate(f32, f32),
    Stroke(String, f32, f32),
    Fill(String, f32, f32),
    DrawImage {
        image: RecordedImage,
        x: f32,
        y: f32,
        shadow: Option<Shadow>,
    },
}

/// Image produced by [`RecordingCanvas`]: its size and every call made on it.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordedImage {
    pub id: usize,
    pub width: u32,
    pub height: u32,
    pub ops: Vec<CanvasOp>,
}

pub struct RecordingCanvas {
    id: usize,
    measurer: ScriptedMeasurer,
    width: u32,
    height: u32,
    ops: Vec<CanvasOp>,
}

impl TextMeasurer for RecordingCanvas {
    fn measure_text(&self, text: &str) -> TextMetrics {
        self.measurer.measure_text(text)
    }
}

impl Canvas for RecordingCanvas {
    type Image = RecordedImage;

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn set_properties(&mut self, properties: &CanvasProperties) -> RenderResult<()> {
        self.ops.push(CanvasOp::SetProperties(properties.clone()));
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) -> RenderResult<()> {
        self.width = width;
        self.height = height;
        self.ops.push(CanvasOp::Resize(width, height));
        Ok(())
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.ops.push(CanvasOp::Translate(dx, dy));
    }

    fn stroke_text(&mut self, text: &str, x: f32, y: f32) {
        self.ops.push(CanvasOp::Stroke(text.to_owned(), x, y));
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32) {
        self.ops.push(CanvasOp::Fill(text.to_owned(), x, y));
    }

    fn draw_image(&mut self, image: &RecordedImage, x: f32, y: f32, shadow: Option<&Shadow>) {
        self.ops.push(CanvasOp::DrawImage {
            image: image.clone(),
            x,
            y,
            shadow: shadow.copied(),
        });
    }

    fn into_image(self) -> RecordedImage {
        RecordedImage {
            id: self.id,
            width: self.width,
            height: self.height,
            ops: self.ops,
        }
    }
}

/// Hands out [`RecordingCanvas`] instances and counts them.
pub struct RecordingFactory {
    measurer: ScriptedMeasurer,
    created: Cell<usize>,
    fail_next: Cell<bool>,
}

impl RecordingFactory {
    pub fn new(measurer: ScriptedMeasurer) -> Self {
        Self {
            measurer,
            created: Cell::new(0),
            fail_next: Cell::new(false),
        }
    }

    /// Number of canvases successfully created.
    pub fn created(&self) -> usize {
        self.created.get()
    }

    /// Makes the next `create_canvas` call fail once.
    pub fn fail_next_create(&self) {
        self.fail_next.set(true);
    }
}

impl CanvasFactory for RecordingFactory {
    type Canvas = RecordingCanvas;

    fn create_canvas(&self, width: u32, height: u32) -> RenderResult<RecordingCanvas> {
        if self.fail_next.replace(false) {
            return Err(RenderError::ContextUnavailable("scripted failure".into()));
        }
        let id = self.created.get();
        self.created.set(id + 1);
        Ok(RecordingCanvas {
            id,
            measurer: self.measurer.clone(),
            width,
            height,
            ops: Vec::new(),
        })
    }
}

/// One blit received by a recording draw target.
#[derive(Clone, Debug, PartialEq)]
pub struct Blit {
    pub image: RecordedImage,
    pub x: f32,
    pub y: f32,
}

impl DrawTarget<RecordedImage> for Vec<Blit> {
    fn draw_image(&mut self, image: &RecordedImage, x: f32, y: f32) {
        self.push(Blit {
            image: image.clone(),
            x,
            y,
        });
    }
}
