// font-atlas/src/font.rs
//
// Copyright © 2018 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A loaded font: measures and lays out text against the metrics of its atlas.

use float_ord::FloatOrd;
use log::debug;
use pathfinder_geometry::vector::Vector2F;
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use crate::cache::{FontAtlasData, FontAtlasKey, FontGlyphs};
use crate::canvas::Canvas;
use crate::charset::INVALID_CHARACTER;
use crate::error::FontUsageError;
use crate::metrics::GlyphMetrics;
use crate::rasterizer::Rasterizer;
use crate::utils;

/// The character whose atlas image is drawn for [`INVALID_CHARACTER`].
pub const FALLBACK_IMAGE_CHARACTER: char = '?';

/// A glyph placed by [`Font::layout`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PositionedGlyph {
    /// The metrics of the glyph, including its atlas rectangle.
    pub metrics: GlyphMetrics,
    /// Top left corner of the glyph image, relative to the first baseline, y down.
    pub position: Vector2F,
}

/// A loaded font.
///
/// Holds a reference to the atlas image and to the metrics it was built with. Disposing the
/// font gives up the image reference; the metrics stay readable so text can still be measured.
/// A font marked as pooled is shared by several owners and must be given back to its pool
/// instead of being disposed.
pub struct Font<R>
where
    R: Rasterizer + ?Sized,
{
    rasterizer: Arc<R>,
    key: FontAtlasKey,
    glyphs: Arc<FontGlyphs<R>>,
    atlas: Option<Arc<Canvas>>,
    pooled: bool,
}

impl<R> Font<R>
where
    R: Rasterizer + ?Sized,
{
    /// Wraps an atlas built by `rasterizer`.
    pub fn new(rasterizer: Arc<R>, data: &FontAtlasData<R>) -> Font<R> {
        Font {
            rasterizer,
            key: data.key().clone(),
            glyphs: data.glyphs().clone(),
            atlas: Some(data.shared_atlas().clone()),
            pooled: false,
        }
    }

    /// The font file and size this font was built for.
    #[inline]
    pub fn key(&self) -> &FontAtlasKey {
        &self.key
    }

    /// The atlas image, or `None` once disposed.
    #[inline]
    pub fn atlas(&self) -> Option<&Canvas> {
        self.atlas.as_deref()
    }

    /// Metrics of every supported character, sorted by character.
    #[inline]
    pub fn metrics(&self) -> &[GlyphMetrics] {
        self.glyphs.metrics()
    }

    /// Looks up the metrics of `character`.
    #[inline]
    pub fn glyph(&self, character: char) -> Option<&GlyphMetrics> {
        self.glyphs.glyph(character)
    }

    /// Returns true if kerning adjustments are applied between glyphs.
    #[inline]
    pub fn has_kerning(&self) -> bool {
        self.glyphs.has_kerning()
    }

    /// Distance between successive baselines, in pixels.
    #[inline]
    pub fn line_spacing(&self) -> f32 {
        self.glyphs.line_spacing()
    }

    /// Kerning between two glyph indices, in whole pixels.
    ///
    /// Zero when the face has no kerning or either index is 0.
    pub fn kerning(&self, left_glyph_index: u32, right_glyph_index: u32) -> f32 {
        if !self.glyphs.has_kerning() || left_glyph_index == 0 || right_glyph_index == 0 {
            return 0.0;
        }
        let delta = self
            .glyphs
            .kerning(&self.rasterizer, left_glyph_index, right_glyph_index);
        utils::f26dot6_to_pixels(delta) as f32
    }

    /// Measures the extent of `text` in pixels.
    ///
    /// `None` and the empty string measure `(0, 0)`. Characters outside the supported set add
    /// nothing. A line is as tall as its tallest glyph plus its largest `glyph_height -
    /// hori_bearing_y`; that term is negative for lines that sit entirely above the baseline.
    /// Lines are separated by `\n`; the width is that of the widest line and each line after
    /// the first adds one line spacing to the height.
    pub fn measure<'a, T>(&self, text: T) -> Vector2F
    where
        T: Into<Option<&'a str>>,
    {
        let text = match text.into() {
            Some(text) if !text.is_empty() => text,
            _ => return Vector2F::zero(),
        };

        let extents: Vec<Vector2F> = lines(text).map(|line| self.measure_line(line)).collect();
        let width = extents.iter().map(|extent| FloatOrd(extent.x())).max();
        let line_height = extents.iter().map(|extent| FloatOrd(extent.y())).max();
        let (width, line_height) = match (width, line_height) {
            (Some(width), Some(line_height)) => (width.0, line_height.0),
            _ => return Vector2F::zero(),
        };

        let height = self.line_spacing() * (extents.len() - 1) as f32 + line_height;
        Vector2F::new(width, height)
    }

    fn measure_line(&self, line: &str) -> Vector2F {
        let mut width = 0.0;
        let mut previous_index = 0;
        let mut found = vec![];
        for character in line.chars() {
            let supported = self.glyph(character).copied();
            let glyph = supported.unwrap_or_else(|| GlyphMetrics::empty(character));
            width += self.kerning(previous_index, glyph.char_index);
            width += glyph.horizontal_advance;
            previous_index = glyph.char_index;
            if supported.is_some() {
                found.push(glyph);
            }
        }

        let max_height = found
            .iter()
            .map(|glyph| FloatOrd(glyph.glyph_height))
            .max()
            .map_or(0.0, |height| height.0);
        let max_descent = found
            .iter()
            .map(|glyph| FloatOrd(glyph.descent()))
            .max()
            .map_or(0.0, |descent| descent.0);
        Vector2F::new(width, max_height + max_descent)
    }

    /// Maps each character of `text` to its metrics.
    ///
    /// Characters outside the supported set become a placeholder whose `glyph` is
    /// [`INVALID_CHARACTER`] and whose atlas image is that of [`FALLBACK_IMAGE_CHARACTER`], so
    /// every character has something to draw.
    pub fn to_glyph_metrics(&self, text: &str) -> Vec<GlyphMetrics> {
        text.chars()
            .map(|character| match self.glyph(character) {
                Some(glyph) => *glyph,
                None => self.invalid_glyph(),
            })
            .collect()
    }

    /// The placeholder substituted for unsupported characters.
    pub fn invalid_glyph(&self) -> GlyphMetrics {
        let mut glyph = self
            .glyph(INVALID_CHARACTER)
            .or_else(|| self.glyph(FALLBACK_IMAGE_CHARACTER))
            .copied()
            .unwrap_or_else(|| GlyphMetrics::empty(INVALID_CHARACTER));
        glyph.glyph = INVALID_CHARACTER;
        glyph
    }

    /// Positions the drawable glyphs of `text`.
    ///
    /// Uses the same advance, kerning and line rules as [`Font::measure`]. Characters without an
    /// atlas image, like space, move the pen but produce no glyph; unsupported characters are
    /// skipped.
    pub fn layout(&self, text: &str) -> Vec<PositionedGlyph> {
        let mut glyphs = vec![];
        let line_spacing = self.line_spacing();
        for (line_index, line) in lines(text).enumerate() {
            let baseline = line_spacing * line_index as f32;
            let mut pen_x = 0.0;
            let mut previous_index = 0;
            for character in line.chars() {
                let glyph = match self.glyph(character) {
                    Some(glyph) => *glyph,
                    None => {
                        previous_index = 0;
                        continue;
                    }
                };
                pen_x += self.kerning(previous_index, glyph.char_index);
                if glyph.has_image() {
                    glyphs.push(PositionedGlyph {
                        metrics: glyph,
                        position: Vector2F::new(
                            pen_x + glyph.hori_bearing_x,
                            baseline - glyph.hori_bearing_y,
                        ),
                    });
                }
                pen_x += glyph.horizontal_advance;
                previous_index = glyph.char_index;
            }
        }
        glyphs
    }

    /// Marks the font as shared (pooled) or exclusively owned.
    #[inline]
    pub fn set_pooled(&mut self, pooled: bool) {
        self.pooled = pooled;
    }

    /// Returns true if the font is shared through a pool.
    #[inline]
    pub fn is_pooled(&self) -> bool {
        self.pooled
    }

    /// Returns true once [`Font::dispose`] has released the atlas image.
    #[inline]
    pub fn is_disposed(&self) -> bool {
        self.atlas.is_none()
    }

    /// Releases this font's reference to its atlas image.
    ///
    /// Fails with [`FontUsageError::DisposePooled`] if the font is pooled: pooled fonts belong
    /// to their pool. Disposing twice is a no-op. Metrics, measurement and layout keep working
    /// after disposal.
    pub fn dispose(&mut self) -> Result<(), FontUsageError> {
        if self.pooled {
            return Err(FontUsageError::DisposePooled);
        }
        if self.atlas.take().is_some() {
            debug!(
                "disposed font {} at {}px",
                self.key.path.display(),
                self.key.size
            );
        }
        Ok(())
    }
}

impl<R> Debug for Font<R>
where
    R: Rasterizer + ?Sized,
{
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        fmt.debug_struct("Font")
            .field("key", &self.key)
            .field("disposed", &self.is_disposed())
            .field("pooled", &self.pooled)
            .finish()
    }
}

fn lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
}
