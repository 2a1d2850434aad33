use std::{collections::HashMap, path::PathBuf, sync::Arc};

use crate::text::{FontSpec, FontStyle};

/// A face picked for a [`FontSpec`], ready for measuring and rasterizing.
#[derive(Clone)]
pub struct ResolvedFont {
    pub id: fontdb::ID,
    pub font: Arc<fontdue::Font>,
}

/// Selection key for a face; size does not influence which face is used.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct FaceKey {
    family: String,
    style: FontStyle,
    bold: bool,
}

/// Manages font loading and face selection using `fontdb` and `fontdue`.
///
/// `fontdb` indexes the available faces; `fontdue` fonts are parsed lazily
/// the first time a face is actually used and kept afterwards.
pub struct FontStorage {
    font_db: fontdb::Database,
    loaded_font: HashMap<fontdb::ID, Arc<fontdue::Font>, fxhash::FxBuildHasher>,
    selected: HashMap<FaceKey, fontdb::ID, fxhash::FxBuildHasher>,
}

impl Default for FontStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl FontStorage {
    pub fn new() -> Self {
        Self {
            font_db: fontdb::Database::new(),
            loaded_font: HashMap::with_hasher(fxhash::FxBuildHasher::default()),
            selected: HashMap::with_hasher(fxhash::FxBuildHasher::default()),
        }
    }
}

/// Loading fonts into fontdb and setting up fontdb.
///
/// Every change to the database drops remembered face selections, since a
/// better match may have become available.
impl FontStorage {
    pub fn load_font_binary(&mut self, data: impl Into<Vec<u8>>) {
        self.font_db.load_font_data(data.into());
        self.selected.clear();
    }

    pub fn load_font_file(&mut self, path: PathBuf) -> Result<(), std::io::Error> {
        self.font_db.load_font_file(path)?;
        self.selected.clear();
        Ok(())
    }

    pub fn load_fonts_dir(&mut self, dir: PathBuf) {
        self.font_db.load_fonts_dir(dir);
        self.selected.clear();
    }

    pub fn load_system_fonts(&mut self) {
        self.font_db.load_system_fonts();
        self.selected.clear();
    }

    pub fn remove_face(&mut self, id: fontdb::ID) {
        self.font_db.remove_face(id);
        self.loaded_font.remove(&id);
        self.selected.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.font_db.is_empty()
    }

    pub fn len(&self) -> usize {
        self.font_db.len()
    }

    pub fn set_serif_family(&mut self, family: impl Into<String>) {
        self.font_db.set_serif_family(family);
        self.selected.clear();
    }

    pub fn set_sans_serif_family(&mut self, family: impl Into<String>) {
        self.font_db.set_sans_serif_family(family);
        self.selected.clear();
    }

    pub fn set_monospace_family(&mut self, family: impl Into<String>) {
        self.font_db.set_monospace_family(family);
        self.selected.clear();
    }

    pub fn faces(&self) -> impl Iterator<Item = &fontdb::FaceInfo> {
        self.font_db.faces()
    }
}

/// Face selection
impl FontStorage {
    /// Picks the best face for `spec`.
    ///
    /// `spec.family` is a comma separated list in CSS order; the CSS generic
    /// names map to fontdb's generic families and `sans-serif` is tried last
    /// when the list does not mention it.
    pub fn resolve(&mut self, spec: &FontSpec) -> Option<ResolvedFont> {
        let key = FaceKey {
            family: spec.family.clone(),
            style: spec.style,
            bold: spec.bold,
        };

        let id = match self.selected.get(&key) {
            Some(&id) => id,
            None => {
                let families = family_list(&spec.family);
                let id = self.font_db.query(&fontdb::Query {
                    families: &families,
                    weight: if spec.bold {
                        fontdb::Weight::BOLD
                    } else {
                        fontdb::Weight::NORMAL
                    },
                    stretch: fontdb::Stretch::Normal,
                    style: match spec.style {
                        FontStyle::Normal => fontdb::Style::Normal,
                        FontStyle::Italic => fontdb::Style::Italic,
                        FontStyle::Oblique => fontdb::Style::Oblique,
                    },
                })?;
                self.selected.insert(key, id);
                id
            }
        };

        let font = self.font(id)?;
        Some(ResolvedFont { id, font })
    }

    /// Retrieves a parsed font by ID, parsing it on first use.
    pub fn font(&mut self, id: fontdb::ID) -> Option<Arc<fontdue::Font>> {
        use std::collections::hash_map::Entry;

        match self.loaded_font.entry(id) {
            Entry::Occupied(entry) => Some(Arc::clone(entry.get())),
            Entry::Vacant(entry) => {
                let font_result = self.font_db.with_face_data(id, |data, index| {
                    fontdue::Font::from_bytes(
                        data,
                        fontdue::FontSettings {
                            collection_index: index,
                            ..Default::default()
                        },
                    )
                })?;

                match font_result {
                    Ok(font) => Some(Arc::clone(entry.insert(Arc::new(font)))),
                    Err(e) => {
                        log::error!("Failed to load font (id: {:?}): {}", id, e);
                        None
                    }
                }
            }
        }
    }
}

/// Splits a CSS-like family list into fontdb families.
fn family_list(family: &str) -> Vec<fontdb::Family<'_>> {
    let mut families: Vec<fontdb::Family<'_>> = family
        .split(',')
        .map(|name| name.trim().trim_matches(|c| c == '"' || c == '\''))
        .filter(|name| !name.is_empty())
        .map(|name| match name {
            "serif" => fontdb::Family::Serif,
            "sans-serif" => fontdb::Family::SansSerif,
            "monospace" => fontdb::Family::Monospace,
            "cursive" => fontdb::Family::Cursive,
            "fantasy" => fontdb::Family::Fantasy,
            name => fontdb::Family::Name(name),
        })
        .collect();

    if !families.contains(&fontdb::Family::SansSerif) {
        families.push(fontdb::Family::SansSerif);
    }
    families
}
