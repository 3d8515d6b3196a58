use crate::config::LayoutConfig;
use crate::units::Px;
use crate::{ConvertError, Result};
use ab_glyph::{Font as _, FontVec, GlyphId, PxScale, ScaleFont};
use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use owned_ttf_parser::{AsFaceRef, Face, OwnedFace};
use std::path::Path;
use std::sync::OnceLock;

/// A parsed font object. Fonts can be TTF or OTF fonts, or any face of a
/// collection. All measurements are returned in pixels for a given pixel size,
/// where the size is the height of the em square.
pub struct Font {
    /// The raw face, used for names and style
    pub face: OwnedFace,
    glyphs: FontVec,
}

impl Font {
    /// Load a font from raw bytes, parsing the font and returning an error if the font
    /// could not be parsed
    pub fn load(bytes: Vec<u8>) -> Result<Font> {
        Self::load_face(bytes, 0)
    }

    /// Load face number `index` of a font file or collection
    pub fn load_face(bytes: Vec<u8>, index: u32) -> Result<Font> {
        let face = OwnedFace::from_vec(bytes.clone(), index)?;
        let glyphs = FontVec::try_from_vec_and_index(bytes, index)?;

        Ok(Font { face, glyphs })
    }

    pub fn load_from_disk<P: AsRef<Path>>(path: P) -> Result<Font> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConvertError::InputNotFound(path.to_path_buf()));
        }
        Self::load(std::fs::read(path)?)
    }

    /// The font to render a page body with: the configured font file if there
    /// is one, otherwise the installed face matching the configured family
    pub fn for_config(config: &LayoutConfig) -> Result<Font> {
        match &config.font_path {
            Some(path) => Self::load_from_disk(path),
            None => Self::find_installed(&config.font_name),
        }
    }

    /// The italic face of the same family as `self`, if one is installed
    pub fn italic_variant(&self) -> Option<Font> {
        if self.is_italic() {
            return None;
        }
        let family = self.family()?;
        find_installed_face(&family, true).ok()
    }

    /// Look up a regular face of `family` among the installed fonts (matched
    /// case-insensitively, ignoring spaces and punctuation). If the family is
    /// not installed, a regular face of another family is used instead.
    pub fn find_installed(family: &str) -> Result<Font> {
        find_installed_face(family, false)
    }

    pub(crate) fn face(&self) -> &Face<'_> {
        self.face.as_face_ref()
    }

    pub(crate) fn glyphs(&self) -> &FontVec {
        &self.glyphs
    }

    /// Obtain the family name of the font, preferring the typographic family
    pub fn family(&self) -> Option<String> {
        let names = self.face().names();
        [
            owned_ttf_parser::name_id::TYPOGRAPHIC_FAMILY,
            owned_ttf_parser::name_id::FAMILY,
        ]
        .into_iter()
        .find_map(|id| {
            names
                .into_iter()
                .find(|name| name.name_id == id && name.is_unicode())
                .and_then(|name| name.to_string())
        })
    }

    pub fn is_italic(&self) -> bool {
        self.face().is_italic()
    }

    /// Obtain the weight of the font, 400 being normal and 700 bold
    pub fn weight(&self) -> u16 {
        self.face().weight().to_number()
    }

    /// The glyph scale for an em size of `size`
    pub(crate) fn scale(&self, size: Px) -> PxScale {
        self.glyphs
            .pt_to_px_scale(size.0)
            .unwrap_or_else(|| PxScale::from(size.0))
    }

    /// Calculate the ascent (distance from the baseline to the top of the font) for the given size
    pub fn ascent(&self, size: Px) -> Px {
        Px(self.glyphs.as_scaled(self.scale(size)).ascent())
    }

    /// Calculate the descent (distance from the baseline to the bottom of the font) for the given size.
    /// Note: this is usually negative
    pub fn descent(&self, size: Px) -> Px {
        Px(self.glyphs.as_scaled(self.scale(size)).descent())
    }

    /// Calculate the leading (extra space between lines) for the given size
    pub fn leading(&self, size: Px) -> Px {
        Px(self.glyphs.as_scaled(self.scale(size)).line_gap())
    }

    /// How far apart two consecutive rows of text sit
    pub fn line_height(&self, size: Px) -> Px {
        self.leading(size) + self.ascent(size) - self.descent(size)
    }

    pub fn glyph_id(&self, ch: char) -> Option<GlyphId> {
        let id = self.glyphs.glyph_id(ch);
        (id.0 != 0).then_some(id)
    }

    /// The glyph to draw for `ch`, falling back to the replacement character
    /// and then to `?` when the font has no glyph for it
    pub fn glyph_or_replacement(&self, ch: char) -> Option<GlyphId> {
        self.glyph_id(ch)
            .or_else(|| self.glyph_id('\u{FFFD}'))
            .or_else(|| self.glyph_id('?'))
    }

    /// Horizontal advance of a glyph at the given size
    pub fn advance(&self, glyph: GlyphId, size: Px) -> Px {
        Px(self.glyphs.as_scaled(self.scale(size)).h_advance(glyph))
    }

    /// Calculate the width of a given string of text at the given size
    pub fn width_of_text(&self, text: &str, size: Px) -> Px {
        let scaled = self.glyphs.as_scaled(self.scale(size));
        text.chars()
            .filter_map(|ch| self.glyph_or_replacement(ch))
            .map(|gid| Px(scaled.h_advance(gid)))
            .sum()
    }
}

fn normalize_family(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// The installed fonts, scanned once per process
pub(crate) fn system_fonts() -> &'static Database {
    static FONTS: OnceLock<Database> = OnceLock::new();
    FONTS.get_or_init(|| {
        let mut db = Database::new();
        db.load_system_fonts();
        log::debug!("found {} installed font faces", db.len());
        db
    })
}

/// The spelling of `family` used by the installed fonts
fn installed_family_name(db: &Database, family: &str) -> Option<String> {
    let wanted = normalize_family(family);
    db.faces()
        .flat_map(|face| face.families.iter())
        .map(|(name, _)| name)
        .find(|name| normalize_family(name) == wanted)
        .cloned()
}

fn load_installed(db: &Database, id: fontdb::ID) -> Option<Result<Font>> {
    db.with_face_data(id, |data, index| Font::load_face(data.to_vec(), index))
}

fn find_installed_face(family: &str, italic: bool) -> Result<Font> {
    let db = system_fonts();
    let style = if italic { Style::Italic } else { Style::Normal };

    if let Some(name) = installed_family_name(db, family) {
        let query = Query {
            families: &[Family::Name(&name)],
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style,
        };
        // the closest match may be upright when no italic face exists
        let matched = db
            .query(&query)
            .filter(|id| db.face(*id).is_some_and(|face| (face.style != Style::Normal) == italic));
        if let Some(font) = matched.and_then(|id| load_installed(db, id)) {
            log::debug!("using font {name:?} (italic: {italic})");
            return font;
        }
    }

    if italic {
        return Err(ConvertError::FontNotFound(format!("{family} italic")));
    }

    let fallback = db
        .faces()
        .filter(|face| face.style == Style::Normal && face.weight == Weight::NORMAL)
        .min_by_key(|face| face.families.first().map(|(name, _)| name.as_str()));
    match fallback {
        Some(face) => {
            let name = face
                .families
                .first()
                .map(|(name, _)| name.as_str())
                .unwrap_or("unnamed");
            log::warn!("font family {family:?} is not installed, falling back to {name:?}");
            load_installed(db, face.id)
                .unwrap_or_else(|| Err(ConvertError::FontNotFound(family.to_string())))
        }
        None => Err(ConvertError::FontNotFound(family.to_string())),
    }
}
