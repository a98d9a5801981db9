// font-atlas/tests/common/mod.rs
//
// Copyright © 2018 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

// A deterministic in-memory rasterizer shared by the integration tests.

#![allow(dead_code)]

use font_atlas::canvas::{Canvas, Format};
use font_atlas::charset;
use font_atlas::error::{FontLoadingError, GlyphLoadingError};
use font_atlas::metrics::GlyphMetrics;
use font_atlas::rasterizer::Rasterizer;
use pathfinder_geometry::vector::Vector2I;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

/// A file that always exists, standing in for a font file on disk.
pub static EXISTING_FILE_PATH: &'static str = concat!(env!("CARGO_MANIFEST_DIR"), "/Cargo.toml");

pub static MISSING_FILE_PATH: &'static str =
    concat!(env!("CARGO_MANIFEST_DIR"), "/resources/tests/missing.ttf");

/// Characters whose fake glyphs hang below the baseline.
pub const DESCENDING_CHARACTERS: &'static str = "gjpqy";

/// How far descending glyphs hang below the baseline, in pixels.
pub const DESCENT: i32 = 2;

pub struct FakeFace {
    pub path: PathBuf,
    pub size: u32,
}

/// Renders every glyph as a solid rectangle whose size depends only on the character and the
/// pixel size.
#[derive(Default)]
pub struct FakeRasterizer {
    pub kerning: bool,
    /// Kerning between character pairs, in 26.6 fixed point.
    pub kerning_pairs: HashMap<(char, char), i64>,
    /// Characters that fail to rasterize.
    pub failing: Vec<char>,
    /// Characters the face has no glyph for.
    pub missing: Vec<char>,
    /// Characters whose glyphs float this many pixels above the baseline.
    pub raised: HashMap<char, f32>,
    /// Makes the next face creation fail once.
    pub fail_next_face: AtomicBool,
    /// Slows down face creation to widen race windows.
    pub face_delay: Option<Duration>,
    /// Number of faces created, which is the number of atlas builds attempted.
    pub faces_created: AtomicUsize,
}

impl FakeRasterizer {
    pub fn new() -> FakeRasterizer {
        FakeRasterizer::default()
    }

    pub fn with_kerning(pairs: &[((char, char), i64)]) -> FakeRasterizer {
        FakeRasterizer {
            kerning: true,
            kerning_pairs: pairs.iter().cloned().collect(),
            ..FakeRasterizer::default()
        }
    }

    pub fn faces_created(&self) -> usize {
        self.faces_created.load(Ordering::SeqCst)
    }
}

/// Size of the fake glyph image for `character` at `size` pixels.
pub fn glyph_size(character: char, size: u32) -> Vector2I {
    if character == charset::SPACE {
        return Vector2I::zero();
    }
    let code = character as i32;
    Vector2I::new(1 + code % 4, (size as i32) / 2 + code % 3)
}

/// Pen advance of every fake glyph at `size` pixels.
pub fn advance(size: u32) -> f32 {
    (size / 2) as f32
}

pub fn line_spacing(size: u32) -> f32 {
    size as f32 * 1.25
}

fn character_for_index(glyph_index: u32) -> Option<char> {
    std::char::from_u32(glyph_index)
}

impl Rasterizer for FakeRasterizer {
    type Face = FakeFace;

    fn create_face(&self, path: &Path) -> Result<FakeFace, FontLoadingError> {
        self.faces_created.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.face_delay {
            thread::sleep(delay);
        }
        if self.fail_next_face.swap(false, Ordering::SeqCst) {
            return Err(FontLoadingError::Parse(path.to_owned()));
        }
        Ok(FakeFace {
            path: path.to_owned(),
            size: 0,
        })
    }

    fn set_character_size(&self, face: &mut FakeFace, size: u32) -> Result<(), FontLoadingError> {
        if size == 0 {
            return Err(FontLoadingError::CharacterSize {
                path: face.path.clone(),
                size,
            });
        }
        face.size = size;
        Ok(())
    }

    fn glyph_indices(&self, _: &FakeFace, characters: &[char]) -> BTreeMap<char, u32> {
        characters
            .iter()
            .map(|&character| {
                let glyph_index = if self.missing.contains(&character) {
                    0
                } else {
                    character as u32
                };
                (character, glyph_index)
            })
            .collect()
    }

    fn glyph_image(
        &self,
        face: &mut FakeFace,
        character: char,
        glyph_index: u32,
    ) -> Result<Canvas, GlyphLoadingError> {
        if glyph_index == 0 {
            return Err(GlyphLoadingError::NoSuchGlyph);
        }
        if self.failing.contains(&character) {
            return Err(GlyphLoadingError::Rasterization);
        }
        let mut canvas = Canvas::new(glyph_size(character, face.size), Format::A8);
        for byte in canvas.pixels.iter_mut() {
            *byte = 0xff;
        }
        Ok(canvas)
    }

    fn glyph_metrics(
        &self,
        face: &mut FakeFace,
        glyph_indices: &BTreeMap<char, u32>,
    ) -> BTreeMap<char, GlyphMetrics> {
        let size = face.size;
        glyph_indices
            .iter()
            .filter(|&(_, &glyph_index)| glyph_index != 0)
            .map(|(&character, &glyph_index)| {
                let image_size = glyph_size(character, size);
                let descent = if DESCENDING_CHARACTERS.contains(character) {
                    DESCENT as f32
                } else {
                    -self.raised.get(&character).cloned().unwrap_or(0.0)
                };
                let width = image_size.x() as f32;
                let height = image_size.y() as f32;

                let mut metrics = GlyphMetrics::empty(character);
                metrics.char_index = glyph_index;
                metrics.horizontal_advance = advance(size);
                metrics.hori_bearing_x = 0.0;
                metrics.hori_bearing_y = height - descent;
                metrics.ascender = size as f32;
                metrics.descender = -(size as f32) / 4.0;
                metrics.glyph_width = width;
                metrics.glyph_height = height;
                metrics.x_max = width;
                metrics.y_min = -descent;
                metrics.y_max = height - descent;
                (character, metrics)
            })
            .collect()
    }

    fn has_kerning(&self, _: &FakeFace) -> bool {
        self.kerning
    }

    fn kerning(&self, _: &FakeFace, left_glyph_index: u32, right_glyph_index: u32) -> i64 {
        match (
            character_for_index(left_glyph_index),
            character_for_index(right_glyph_index),
        ) {
            (Some(left), Some(right)) => *self.kerning_pairs.get(&(left, right)).unwrap_or(&0),
            _ => 0,
        }
    }

    fn line_spacing(&self, face: &FakeFace) -> f32 {
        line_spacing(face.size)
    }
}
