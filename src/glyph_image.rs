// font-atlas/src/glyph_image.rs
//
// Copyright © 2018 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Rasterizes each supported character into a standalone RGBA image.

use log::warn;
use std::collections::BTreeMap;

use crate::canvas::{Canvas, Format};
use crate::charset::SPACE;
use crate::rasterizer::Rasterizer;

/// Glyph images keyed by the character they depict.
pub type GlyphImages = BTreeMap<char, Canvas>;

/// Rasterizes every character in `glyph_indices` except space.
///
/// Each coverage bitmap becomes a white RGBA image whose alpha is the coverage, so the renderer
/// can tint glyphs by multiplying with a color. Characters the rasterizer fails on are logged
/// and left out; they end up with empty atlas bounds.
pub fn build_glyph_images<R>(
    rasterizer: &R,
    face: &mut R::Face,
    glyph_indices: &BTreeMap<char, u32>,
) -> GlyphImages
where
    R: Rasterizer + ?Sized,
{
    let mut images = GlyphImages::new();
    for (&character, &glyph_index) in glyph_indices {
        if character == SPACE {
            continue;
        }

        let coverage = match rasterizer.glyph_image(face, character, glyph_index) {
            Ok(coverage) => coverage,
            Err(error) => {
                warn!(
                    "build_glyph_images(): skipping {:?} (glyph {}): {}",
                    character, glyph_index, error
                );
                continue;
            }
        };

        images.insert(character, to_white_rgba(&coverage));
    }
    images
}

/// Converts a coverage bitmap to white RGBA, keeping the coverage as alpha.
pub fn to_white_rgba(coverage: &Canvas) -> Canvas {
    let mut image = Canvas::new(coverage.size, Format::Rgba32);
    image.blit_from_canvas(coverage);
    image
}
