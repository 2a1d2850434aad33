use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Font sizes are quantized to 1/64 px so nearly equal sizes share entries.
pub const SIZE_QUANTIZE: f32 = 64.0;

/// Identifies one glyph rasterized at one size.
///
/// Keys are only meaningful within the font database that issued the font
/// ID; they are not stable across runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GlyphKey {
    font_id: fontdb::ID,
    glyph_index: u16,
    font_size: u32,
}

impl GlyphKey {
    pub fn new(font_id: fontdb::ID, glyph_index: u16, font_size: f32) -> Self {
        Self {
            font_id,
            glyph_index,
            font_size: (font_size * SIZE_QUANTIZE).round() as u32,
        }
    }

    pub fn font_id(&self) -> fontdb::ID {
        self.font_id
    }

    pub fn glyph_index(&self) -> u16 {
        self.glyph_index
    }

    pub fn font_size(&self) -> f32 {
        self.font_size as f32 / SIZE_QUANTIZE
    }
}

/// Coverage bitmap of a glyph along with its placement metrics.
#[derive(Clone, Debug)]
pub struct RasterizedGlyph {
    pub metrics: fontdue::Metrics,
    pub coverage: Vec<u8>,
}

struct Slot {
    glyph: Arc<RasterizedGlyph>,
    last_used: u64,
}

/// Bounded cache of rasterized glyphs.
///
/// When full, the least recently used glyph is evicted. Entries are shared
/// through `Arc` so a glyph stays valid for the caller even if it gets
/// evicted while being drawn.
pub struct GlyphCache {
    capacity: NonZeroUsize,
    clock: u64,
    slots: HashMap<GlyphKey, Slot, fxhash::FxBuildHasher>,
}

impl GlyphCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            capacity,
            clock: 0,
            slots: HashMap::with_capacity_and_hasher(
                capacity.get(),
                fxhash::FxBuildHasher::default(),
            ),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains(&self, key: &GlyphKey) -> bool {
        self.slots.contains_key(key)
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.clock = 0;
    }

    /// Returns the cached glyph for `key`, producing it with `f` on a miss.
    pub fn get_or_insert_with(
        &mut self,
        key: GlyphKey,
        f: impl FnOnce() -> RasterizedGlyph,
    ) -> Arc<RasterizedGlyph> {
        self.clock = self.clock.wrapping_add(1);
        if let Some(slot) = self.slots.get_mut(&key) {
            slot.last_used = self.clock;
            return Arc::clone(&slot.glyph);
        }

        if self.slots.len() >= self.capacity.get() {
            self.evict_least_recent();
        }

        let glyph = Arc::new(f());
        self.slots.insert(
            key,
            Slot {
                glyph: Arc::clone(&glyph),
                last_used: self.clock,
            },
        );
        glyph
    }

    /// Rasterizes `key` with `font` unless it is already cached.
    pub fn rasterize(&mut self, key: GlyphKey, font: &fontdue::Font) -> Arc<RasterizedGlyph> {
        self.get_or_insert_with(key, || {
            let (metrics, coverage) = font.rasterize_indexed(key.glyph_index(), key.font_size());
            RasterizedGlyph { metrics, coverage }
        })
    }

    fn evict_least_recent(&mut self) {
        let oldest = self
            .slots
            .iter()
            .min_by_key(|(_, slot)| slot.last_used)
            .map(|(key, _)| *key);
        if let Some(key) = oldest {
            self.slots.remove(&key);
        }
    }
}
