// font-atlas/src/metrics.rs
//
// Copyright © 2018 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Per-glyph placement and typographic measurements.

use pathfinder_geometry::rect::RectI;
use pathfinder_geometry::vector::Vector2I;

/// Placement and typographic measurements of one character.
///
/// All measurements are in pixels at the size the atlas was built for. Everything except
/// `glyph_bounds` is fixed by the rasterizer; `glyph_bounds` is filled in when the glyph is
/// composited into the atlas and stays all-zero for characters without an image, such as space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphMetrics {
    /// The character these metrics describe.
    pub glyph: char,
    /// The rasterizer's glyph index, used for kerning lookups. 0 means no glyph.
    pub char_index: u32,
    /// Where the glyph image lives in the atlas, top-left origin.
    pub glyph_bounds: RectI,
    /// Distance to move the pen after drawing this glyph, before kerning.
    pub horizontal_advance: f32,
    /// Offset from the pen to the left edge of the glyph image.
    pub hori_bearing_x: f32,
    /// Offset from the baseline up to the top edge of the glyph image.
    pub hori_bearing_y: f32,
    /// The face's ascender at this size.
    pub ascender: f32,
    /// The face's descender at this size (usually negative).
    pub descender: f32,
    /// Width of the glyph outline.
    pub glyph_width: f32,
    /// Height of the glyph outline.
    pub glyph_height: f32,
    /// Horizontal extent of the outline relative to the pen.
    pub x_min: f32,
    pub x_max: f32,
    /// Vertical extent of the outline relative to the baseline, y up.
    pub y_min: f32,
    pub y_max: f32,
}

impl GlyphMetrics {
    /// Returns zeroed metrics for `glyph`: no advance, no bounds, no glyph index.
    #[inline]
    pub fn empty(glyph: char) -> GlyphMetrics {
        GlyphMetrics {
            glyph,
            char_index: 0,
            glyph_bounds: RectI::new(Vector2I::zero(), Vector2I::zero()),
            horizontal_advance: 0.0,
            hori_bearing_x: 0.0,
            hori_bearing_y: 0.0,
            ascender: 0.0,
            descender: 0.0,
            glyph_width: 0.0,
            glyph_height: 0.0,
            x_min: 0.0,
            x_max: 0.0,
            y_min: 0.0,
            y_max: 0.0,
        }
    }

    /// How far the glyph extends below the baseline.
    #[inline]
    pub fn descent(&self) -> f32 {
        self.glyph_height - self.hori_bearing_y
    }

    /// Returns true if the glyph has a non-empty region in the atlas.
    #[inline]
    pub fn has_image(&self) -> bool {
        self.glyph_bounds.width() > 0 && self.glyph_bounds.height() > 0
    }
}
