//! # textbake
//!
//! Styled, word-wrapped text baked into cached bitmaps for 2D rendering
//! pipelines.
//!
//! ## Overview
//!
//! Many engine draw APIs can blit images but know nothing about text layout.
//! `textbake` fills that gap: a [`Text`] node wraps its string against a
//! measuring surface, rasterizes every line with fill, outline and drop
//! shadow, and keeps the resulting image until one of its options actually
//! changes.
//!
//! The surface is abstracted by the [`Canvas`] and [`CanvasFactory`] traits,
//! and the engine side by [`DrawTarget`]. A software backend built on
//! `fontdb` and `fontdue` is included ([`CpuCanvasFactory`]).
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use textbake::{Bitmap, CpuCanvasFactory, FontSystem, Text, text::Color};
//!
//! // 1. Create a FontSystem and a canvas factory on top of it
//! let fonts = Arc::new(FontSystem::new());
//! fonts.load_system_fonts();
//! let factory = CpuCanvasFactory::new(fonts);
//!
//! // 2. Configure the text
//! let mut text: Text<Bitmap> = Text::with_text("Hello, world");
//! text.set_font_size(24.0);
//! text.set_outline_width(2.0);
//! text.set_outline_color(Color::new(1.0, 1.0, 1.0, 1.0));
//!
//! // 3. Draw; the bitmap is only rebuilt after an option changes
//! let mut frame = Bitmap::new(640, 480);
//! text.draw(&factory, &mut frame, 32.0, 64.0)?;
//! # Ok::<(), textbake::RenderError>(())
//! ```
//!
//! ## Features
//!
//! *   **Greedy Wrapping**: Splits on newlines and whitespace, never inside a word.
//! *   **Asymmetric Bounds**: Uses real glyph extents so nothing is clipped.
//! *   **Effects**: Outline and blurred, offset drop shadow.
//! *   **Caching**: One rasterization per distinct text and style.

pub mod error;
pub mod font_storage;
pub mod font_system;
pub mod renderer;
pub mod text;
pub mod text_node;

#[cfg(test)]
mod test_support;

// common re-exports
pub use error::{RenderError, RenderResult};
pub use font_storage::FontStorage;
pub use font_system::FontSystem;
pub use renderer::{
    Bitmap, Canvas, CanvasFactory, CpuCanvas, CpuCanvasConfig, CpuCanvasFactory, DrawTarget,
    RenderCache,
};
pub use text_node::Text;

// re-export dependencies
pub use fontdb;
pub use fontdue;
pub use parking_lot;
