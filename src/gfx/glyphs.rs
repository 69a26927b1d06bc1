//! Fixed-cell bitmap font used by the debug renderer.
//!
//! The atlas is a single image holding printable ASCII (`' '..='~'`) laid
//! out left to right, top to bottom, in a grid of
//! [`ATLAS_COLUMNS`] x [`ATLAS_ROWS`] equally sized cells. Every glyph has
//! the same advance, [`GLYPH_WIDTH`].

use std::path::Path;

use log::warn;

/// Width of one glyph cell in screen units at scale 1.
pub const GLYPH_WIDTH: f32 = 8.0;
/// Height of one glyph cell in screen units at scale 1.
pub const GLYPH_HEIGHT: f32 = 12.0;
pub const ATLAS_COLUMNS: u32 = 16;
pub const ATLAS_ROWS: u32 = 6;

const FIRST_GLYPH: u32 = ' ' as u32;
const LAST_GLYPH: u32 = '~' as u32;
const FALLBACK_GLYPH: char = '?';

/// Decoded RGBA8 pixels of the glyph atlas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtlasImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl AtlasImage {
    /// Fully transparent image. Glyphs sampled from it draw nothing.
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width * height * 4) as usize],
        }
    }

    /// Decode an image file into RGBA8.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, image::ImageError> {
        let rgba = image::open(path)?.to_rgba8();
        Ok(Self {
            width: rgba.width(),
            height: rgba.height(),
            pixels: rgba.into_raw(),
        })
    }

    /// Load the atlas at `path`, or a blank atlas when there is none or it
    /// fails to decode.
    pub fn load_or_blank(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::blank(ATLAS_COLUMNS, ATLAS_ROWS);
        };
        match Self::load(path) {
            Ok(image) => image,
            Err(e) => {
                warn!(
                    "Failed to load glyph atlas {}: {}; debug text will be blank",
                    path.display(),
                    e
                );
                Self::blank(ATLAS_COLUMNS, ATLAS_ROWS)
            }
        }
    }
}

/// UV rectangle of one glyph. `bottom` is the lower edge as seen in the
/// image, so `bottom > top` in texture space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphRegion {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
}

/// Map a character to its cell in the atlas. Characters outside printable
/// ASCII use the `?` cell.
pub fn glyph_region(c: char) -> GlyphRegion {
    let code = c as u32;
    let code = if (FIRST_GLYPH..=LAST_GLYPH).contains(&code) {
        code
    } else {
        FALLBACK_GLYPH as u32
    };
    let cell = code - FIRST_GLYPH;
    let (col, row) = (cell % ATLAS_COLUMNS, cell / ATLAS_COLUMNS);

    let cols = ATLAS_COLUMNS as f32;
    let rows = ATLAS_ROWS as f32;
    GlyphRegion {
        left: col as f32 / cols,
        right: (col + 1) as f32 / cols,
        bottom: (row + 1) as f32 / rows,
        top: row as f32 / rows,
    }
}
