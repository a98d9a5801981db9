// font-atlas/src/rasterizer.rs
//
// Copyright © 2018 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Provides a common interface to the native library that loads fonts, rasterizes glyphs, and
//! reports glyph metrics and kerning.

use std::collections::BTreeMap;
use std::path::Path;

use crate::canvas::Canvas;
use crate::error::{FontLoadingError, GlyphLoadingError};
use crate::metrics::GlyphMetrics;

/// Provides a common interface to the native library that loads fonts, rasterizes glyphs, and
/// reports glyph metrics and kerning.
///
/// One rasterizer instance owns the native library handle and is shared by every face it
/// creates. Callers serialize access to a single face; distinct faces may be used from
/// different threads at once.
pub trait Rasterizer: Send + Sync {
    /// The handle that the library natively uses to represent a font face.
    type Face: Send;

    /// Opens the face stored in the font file at `path`.
    fn create_face(&self, path: &Path) -> Result<Self::Face, FontLoadingError>;

    /// Scales the face so that glyphs are rendered at `size` pixels.
    fn set_character_size(&self, face: &mut Self::Face, size: u32) -> Result<(), FontLoadingError>;

    /// Returns the glyph index of each character. Characters missing from the face map to 0.
    fn glyph_indices(&self, face: &Self::Face, characters: &[char]) -> BTreeMap<char, u32>;

    /// Rasterizes one glyph to an 8-bit coverage bitmap (`Format::A8`).
    fn glyph_image(
        &self,
        face: &mut Self::Face,
        character: char,
        glyph_index: u32,
    ) -> Result<Canvas, GlyphLoadingError>;

    /// Returns the typographic metrics of each glyph, keyed by character.
    ///
    /// `glyph_bounds` is left zeroed; it is assigned when the atlas is composited.
    fn glyph_metrics(
        &self,
        face: &mut Self::Face,
        glyph_indices: &BTreeMap<char, u32>,
    ) -> BTreeMap<char, GlyphMetrics>;

    /// Returns true if the face carries kerning information.
    fn has_kerning(&self, face: &Self::Face) -> bool;

    /// Returns the horizontal kerning adjustment between two glyph indices, in 26.6 fixed point.
    fn kerning(&self, face: &Self::Face, left_glyph_index: u32, right_glyph_index: u32) -> i64;

    /// Returns the distance between successive baselines at the current size, in pixels.
    fn line_spacing(&self, face: &Self::Face) -> f32;
}
