// font-atlas/src/loaders/freetype.rs
//
// Copyright © 2018 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A rasterizer that uses the FreeType library to load faces and render glyphs.
//!
//! Enabled with the Cargo feature `loader-freetype`.

use freetype::freetype::{FT_Done_Face, FT_Done_FreeType, FT_Face, FT_Get_Char_Index};
use freetype::freetype::{FT_Get_Kerning, FT_Init_FreeType, FT_Library, FT_Load_Glyph};
use freetype::freetype::{FT_Long, FT_New_Memory_Face, FT_Render_Glyph, FT_Render_Mode};
use freetype::freetype::{FT_Set_Char_Size, FT_UInt, FT_ULong, FT_Vector};
use log::{debug, warn};
use pathfinder_geometry::vector::Vector2I;
use std::collections::BTreeMap;
use std::fmt::{self, Debug, Formatter};
use std::fs;
use std::path::{Path, PathBuf};
use std::ptr;
use std::slice;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::canvas::{Canvas, Format};
use crate::error::{FontLoadingError, GlyphLoadingError};
use crate::metrics::GlyphMetrics;
use crate::rasterizer::Rasterizer;
use crate::utils;

const FT_LOAD_DEFAULT: i32 = 0;
const FT_KERNING_DEFAULT: FT_UInt = 0;
const FT_FACE_FLAG_KERNING: i64 = 1 << 6;
const FT_PIXEL_MODE_GRAY: u8 = 2;

/// The FreeType library instance. Faces keep it alive until they are done with it.
struct Library(FT_Library);

// FreeType allows a library to be used from any thread as long as calls that create or destroy
// faces are serialized, which the surrounding mutex does.
unsafe impl Send for Library {}

impl Drop for Library {
    fn drop(&mut self) {
        unsafe {
            if !self.0.is_null() {
                FT_Done_FreeType(self.0);
            }
        }
    }
}

/// A rasterizer that uses the FreeType library to load faces and render glyphs.
///
/// Owns one FreeType library instance, created by [`FreeTypeRasterizer::new`]. The library is
/// shut down when the rasterizer and every face it created have been dropped.
pub struct FreeTypeRasterizer {
    library: Arc<Mutex<Library>>,
}

impl FreeTypeRasterizer {
    /// Initializes a new FreeType library instance.
    pub fn new() -> Result<FreeTypeRasterizer, FontLoadingError> {
        unsafe {
            let mut library = ptr::null_mut();
            if FT_Init_FreeType(&mut library) != 0 || library.is_null() {
                return Err(FontLoadingError::LibraryInit);
            }
            debug!("initialized FreeType library");
            Ok(FreeTypeRasterizer {
                library: Arc::new(Mutex::new(Library(library))),
            })
        }
    }
}

impl Debug for FreeTypeRasterizer {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        fmt.write_str("FreeTypeRasterizer")
    }
}

/// A FreeType face together with the font data it reads from.
pub struct FreeTypeFace {
    freetype_face: FT_Face,
    path: PathBuf,
    library: Arc<Mutex<Library>>,
    // FreeType reads glyph data from this buffer for as long as the face lives.
    _font_data: Vec<u8>,
}

unsafe impl Send for FreeTypeFace {}

impl FreeTypeFace {
    /// The file this face was loaded from.
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_glyph(&mut self, glyph_index: u32) -> Result<(), GlyphLoadingError> {
        unsafe {
            if FT_Load_Glyph(self.freetype_face, glyph_index as FT_UInt, FT_LOAD_DEFAULT) != 0 {
                return Err(GlyphLoadingError::NoSuchGlyph);
            }
        }
        Ok(())
    }
}

impl Drop for FreeTypeFace {
    fn drop(&mut self) {
        let _library = lock(&self.library);
        unsafe {
            if !self.freetype_face.is_null() {
                FT_Done_Face(self.freetype_face);
            }
        }
    }
}

impl Debug for FreeTypeFace {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        self.path.display().fmt(fmt)
    }
}

impl Rasterizer for FreeTypeRasterizer {
    type Face = FreeTypeFace;

    fn create_face(&self, path: &Path) -> Result<FreeTypeFace, FontLoadingError> {
        let font_data = fs::read(path)?;
        let library = lock(&self.library);
        unsafe {
            let mut freetype_face = ptr::null_mut();
            if FT_New_Memory_Face(
                library.0,
                font_data.as_ptr(),
                font_data.len() as FT_Long,
                0,
                &mut freetype_face,
            ) != 0
            {
                return Err(FontLoadingError::Parse(path.to_owned()));
            }

            Ok(FreeTypeFace {
                freetype_face,
                path: path.to_owned(),
                library: self.library.clone(),
                _font_data: font_data,
            })
        }
    }

    fn set_character_size(&self, face: &mut FreeTypeFace, size: u32) -> Result<(), FontLoadingError> {
        let char_size = utils::f32_to_f26dot6(size as f32);
        unsafe {
            // A resolution of 0 means 72 dpi, where points and pixels coincide.
            if FT_Set_Char_Size(face.freetype_face, 0, char_size as _, 0, 0) != 0 {
                return Err(FontLoadingError::CharacterSize {
                    path: face.path.clone(),
                    size,
                });
            }
        }
        Ok(())
    }

    fn glyph_indices(&self, face: &FreeTypeFace, characters: &[char]) -> BTreeMap<char, u32> {
        characters
            .iter()
            .map(|&character| unsafe {
                let glyph_index = FT_Get_Char_Index(face.freetype_face, character as FT_ULong);
                (character, glyph_index as u32)
            })
            .collect()
    }

    fn glyph_image(
        &self,
        face: &mut FreeTypeFace,
        _: char,
        glyph_index: u32,
    ) -> Result<Canvas, GlyphLoadingError> {
        face.load_glyph(glyph_index)?;
        unsafe {
            let slot = (*face.freetype_face).glyph;
            if FT_Render_Glyph(slot, FT_Render_Mode::FT_RENDER_MODE_NORMAL) != 0 {
                return Err(GlyphLoadingError::Rasterization);
            }

            let bitmap = &(*slot).bitmap;
            let pixel_mode = (*bitmap).pixel_mode as u8;
            if pixel_mode != FT_PIXEL_MODE_GRAY {
                return Err(GlyphLoadingError::UnsupportedPixelMode(pixel_mode));
            }

            let size = Vector2I::new((*bitmap).width as i32, (*bitmap).rows as i32);
            let pitch = (*bitmap).pitch as i32;
            if size.x() <= 0 || size.y() <= 0 || (*bitmap).buffer.is_null() {
                let size = Vector2I::new(size.x().max(0), size.y().max(0));
                return Ok(Canvas::new(size, Format::A8));
            }
            if pitch < size.x() {
                warn!("glyph_image(): bottom-up or short bitmap rows (pitch {})", pitch);
                return Err(GlyphLoadingError::Rasterization);
            }

            let stride = pitch as usize;
            let buffer = slice::from_raw_parts((*bitmap).buffer as *const u8, stride * size.y() as usize);
            Canvas::from_pixels(buffer.to_vec(), size, stride, Format::A8)
                .ok_or(GlyphLoadingError::Rasterization)
        }
    }

    fn glyph_metrics(
        &self,
        face: &mut FreeTypeFace,
        glyph_indices: &BTreeMap<char, u32>,
    ) -> BTreeMap<char, GlyphMetrics> {
        let (ascender, descender) = unsafe {
            let size_metrics = &(*(*face.freetype_face).size).metrics;
            (
                utils::f26dot6_to_f32(size_metrics.ascender as i64),
                utils::f26dot6_to_f32(size_metrics.descender as i64),
            )
        };

        let mut all_metrics = BTreeMap::new();
        for (&character, &glyph_index) in glyph_indices {
            let mut metrics = GlyphMetrics::empty(character);
            metrics.char_index = glyph_index;
            metrics.ascender = ascender;
            metrics.descender = descender;

            if let Err(error) = face.load_glyph(glyph_index) {
                warn!("glyph_metrics(): {:?} (glyph {}): {}", character, glyph_index, error);
                all_metrics.insert(character, metrics);
                continue;
            }

            let glyph_metrics = unsafe { &(*(*face.freetype_face).glyph).metrics };
            let width = utils::f26dot6_to_f32(glyph_metrics.width as i64);
            let height = utils::f26dot6_to_f32(glyph_metrics.height as i64);
            let bearing_x = utils::f26dot6_to_f32(glyph_metrics.horiBearingX as i64);
            let bearing_y = utils::f26dot6_to_f32(glyph_metrics.horiBearingY as i64);

            metrics.horizontal_advance = utils::f26dot6_to_f32(glyph_metrics.horiAdvance as i64);
            metrics.hori_bearing_x = bearing_x;
            metrics.hori_bearing_y = bearing_y;
            metrics.glyph_width = width;
            metrics.glyph_height = height;
            metrics.x_min = bearing_x;
            metrics.x_max = bearing_x + width;
            metrics.y_min = bearing_y - height;
            metrics.y_max = bearing_y;
            all_metrics.insert(character, metrics);
        }
        all_metrics
    }

    fn has_kerning(&self, face: &FreeTypeFace) -> bool {
        unsafe { ((*face.freetype_face).face_flags as i64) & FT_FACE_FLAG_KERNING != 0 }
    }

    fn kerning(&self, face: &FreeTypeFace, left_glyph_index: u32, right_glyph_index: u32) -> i64 {
        let mut kerning = FT_Vector { x: 0, y: 0 };
        unsafe {
            if FT_Get_Kerning(
                face.freetype_face,
                left_glyph_index as FT_UInt,
                right_glyph_index as FT_UInt,
                FT_KERNING_DEFAULT,
                &mut kerning,
            ) != 0
            {
                return 0;
            }
        }
        kerning.x as i64
    }

    fn line_spacing(&self, face: &FreeTypeFace) -> f32 {
        unsafe { utils::f26dot6_to_f32((*(*face.freetype_face).size).metrics.height as i64) }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
