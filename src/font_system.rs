use std::{num::NonZeroUsize, path::PathBuf, sync::Arc};

use parking_lot::Mutex;

use crate::{
    error::{RenderError, RenderResult},
    font_storage::{FontStorage, ResolvedFont},
    renderer::cpu_renderer::{GlyphCache, GlyphKey, RasterizedGlyph},
    text::FontSpec,
};

const DEFAULT_GLYPH_CAPACITY: usize = 1024;

/// Shared font database and glyph cache used by CPU canvases.
///
/// Use `Mutex` to allow shared mutable access, so one system can back any
/// number of canvases and text nodes.
///
/// The fields are public to allow direct access to the underlying storage
/// and cache when necessary.
pub struct FontSystem {
    /// The underlying font storage.
    pub font_storage: Mutex<FontStorage>,
    /// Rasterized glyphs shared by every canvas created from this system.
    pub glyph_cache: Mutex<GlyphCache>,
}

impl Default for FontSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FontSystem {
    /// Creates a font system with no fonts and a default sized glyph cache.
    pub fn new() -> Self {
        Self::with_glyph_capacity(
            NonZeroUsize::new(DEFAULT_GLYPH_CAPACITY).unwrap_or(NonZeroUsize::MIN),
        )
    }

    /// Creates a font system whose glyph cache holds at most `capacity`
    /// glyphs.
    pub fn with_glyph_capacity(capacity: NonZeroUsize) -> Self {
        Self {
            font_storage: Mutex::new(FontStorage::new()),
            glyph_cache: Mutex::new(GlyphCache::new(capacity)),
        }
    }
}

/// font storage initialization
impl FontSystem {
    /// Loads the system fonts into the storage.
    pub fn load_system_fonts(&self) {
        self.font_storage.lock().load_system_fonts();
    }

    /// Loads a font from binary data.
    pub fn load_font_binary(&self, data: impl Into<Vec<u8>>) {
        self.font_storage.lock().load_font_binary(data);
    }

    /// Loads a font from a file path.
    pub fn load_font_file(&self, path: PathBuf) -> Result<(), std::io::Error> {
        self.font_storage.lock().load_font_file(path)
    }

    /// Loads all fonts from a directory.
    pub fn load_fonts_dir(&self, dir: PathBuf) {
        self.font_storage.lock().load_fonts_dir(dir)
    }

    /// Removes a face by ID.
    pub fn remove_face(&self, id: fontdb::ID) {
        self.font_storage.lock().remove_face(id);
    }

    /// Checks if the storage is empty.
    pub fn is_empty(&self) -> bool {
        self.font_storage.lock().is_empty()
    }

    /// Returns the number of loaded faces.
    pub fn len(&self) -> usize {
        self.font_storage.lock().len()
    }

    /// Sets the family name for the "serif" generic family.
    pub fn set_serif_family(&self, family: impl Into<String>) {
        self.font_storage.lock().set_serif_family(family);
    }

    /// Sets the family name for the "sans-serif" generic family.
    pub fn set_sans_serif_family(&self, family: impl Into<String>) {
        self.font_storage.lock().set_sans_serif_family(family);
    }

    /// Sets the family name for the "monospace" generic family.
    pub fn set_monospace_family(&self, family: impl Into<String>) {
        self.font_storage.lock().set_monospace_family(family);
    }

    /// Returns a vec over all available faces.
    ///
    /// # Performance
    /// This method clones all face info to avoid holding a lock on the storage.
    /// If you need to iterate without allocation, lock `font_storage` directly.
    pub fn faces(&self) -> Vec<fontdb::FaceInfo> {
        self.font_storage.lock().faces().cloned().collect()
    }
}

/// font resolution and rasterization
impl FontSystem {
    /// Picks the face used to draw `spec`.
    pub fn resolve_font(&self, spec: &FontSpec) -> RenderResult<ResolvedFont> {
        self.font_storage
            .lock()
            .resolve(spec)
            .ok_or_else(|| RenderError::FontUnavailable {
                font: spec.to_string(),
            })
    }

    /// Returns the rasterized glyph for `key`, rasterizing it with `font` on
    /// a cache miss.
    pub fn glyph(&self, key: GlyphKey, font: &fontdue::Font) -> Arc<RasterizedGlyph> {
        self.glyph_cache.lock().rasterize(key, font)
    }

    /// Drops every cached glyph.
    pub fn clear_glyph_cache(&self) {
        self.glyph_cache.lock().clear();
    }
}
