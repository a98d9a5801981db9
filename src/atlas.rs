// font-atlas/src/atlas.rs
//
// Copyright © 2018 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Packs glyph images into a single atlas image.
//!
//! Every glyph gets a cell of the same size in a square grid. Cells are as large as the largest
//! glyph plus a margin, which keeps linearly filtered samples of one glyph from picking up its
//! neighbors.

use log::{debug, warn};
use pathfinder_geometry::rect::RectI;
use pathfinder_geometry::vector::Vector2I;
use std::collections::BTreeMap;

use crate::canvas::{Canvas, Format};
use crate::error::AtlasLayoutError;
use crate::glyph_image::GlyphImages;
use crate::metrics::GlyphMetrics;

/// Padding added to the largest glyph width and height to form a cell.
pub const ANTI_CROP_MARGIN: u32 = 3;

/// Rows added to the grid on top of the computed square size.
pub const EXTRA_GRID_ROWS: u32 = 1;

/// Options that control atlas construction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AtlasOptions {
    /// Padding added to the largest glyph width and height to form a cell.
    pub margin: u32,
}

impl Default for AtlasOptions {
    #[inline]
    fn default() -> AtlasOptions {
        AtlasOptions {
            margin: ANTI_CROP_MARGIN,
        }
    }
}

/// The grid an atlas is laid out on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AtlasLayout {
    /// Width of the atlas image, in pixels.
    pub width: u32,
    /// Height of the atlas image, in pixels.
    pub height: u32,
    pub rows: u32,
    pub columns: u32,
    /// Size of one grid cell, margin included.
    pub cell_size: Vector2I,
}

impl AtlasLayout {
    /// Plans the grid for `images` using the default margin.
    #[inline]
    pub fn plan(images: &GlyphImages) -> Result<AtlasLayout, AtlasLayoutError> {
        AtlasLayout::plan_with_margin(images, ANTI_CROP_MARGIN)
    }

    /// Plans the grid for `images`.
    ///
    /// The grid side is `ceil(sqrt(count))`, bumped to the next even number when odd, plus
    /// [`EXTRA_GRID_ROWS`]. The grid is always square. The same set of images always yields the
    /// same layout.
    pub fn plan_with_margin(
        images: &GlyphImages,
        margin: u32,
    ) -> Result<AtlasLayout, AtlasLayoutError> {
        if images.is_empty() {
            return Err(AtlasLayoutError::EmptyGlyphSet);
        }

        let max_width = images.values().map(|image| image.size.x()).max().unwrap_or(0);
        let max_height = images.values().map(|image| image.size.y()).max().unwrap_or(0);
        let margin = margin as i32;
        let cell_size = Vector2I::new(max_width + margin, max_height + margin);

        let rows = grid_side(images.len());
        let columns = rows;

        let layout = AtlasLayout {
            width: cell_size.x().max(0) as u32 * columns,
            height: cell_size.y().max(0) as u32 * rows,
            rows,
            columns,
            cell_size,
        };
        debug!(
            "planned {}x{} atlas ({}x{} cells of {}x{}) for {} glyphs",
            layout.width,
            layout.height,
            layout.columns,
            layout.rows,
            cell_size.x(),
            cell_size.y(),
            images.len()
        );
        Ok(layout)
    }

    /// Returns the size of the atlas image.
    #[inline]
    pub fn size(&self) -> Vector2I {
        Vector2I::new(self.width as i32, self.height as i32)
    }

    /// Returns the top left corner of the cell at `column`, `row`.
    #[inline]
    pub fn cell_origin(&self, column: u32, row: u32) -> Vector2I {
        Vector2I::new(
            column as i32 * self.cell_size.x(),
            row as i32 * self.cell_size.y(),
        )
    }
}

fn grid_side(glyph_count: usize) -> u32 {
    let mut side = (glyph_count as f64).sqrt().ceil() as u32;
    if side % 2 == 1 {
        side += 1;
    }
    side + EXTRA_GRID_ROWS
}

/// Draws every glyph image into a new atlas and records where each one went.
///
/// Images are placed left to right, wrapping to the next row after `layout.columns` cells. The
/// rectangle each image occupies is written to the metrics entry for the same character. The
/// finished canvas is flipped vertically, so image row `y` of a glyph placed at `glyph_bounds`
/// is found at row `layout.height - 1 - y` of the result; the bounds themselves stay in the
/// top-left-origin space the glyphs were drawn in.
pub fn composite(
    images: &GlyphImages,
    metrics: &mut BTreeMap<char, GlyphMetrics>,
    layout: &AtlasLayout,
) -> Canvas {
    let mut atlas = Canvas::new(layout.size(), Format::Rgba32);

    let (mut column, mut row) = (0, 0);
    for (&character, image) in images {
        if column >= layout.columns {
            column = 0;
            row += 1;
        }

        let origin = layout.cell_origin(column, row);
        match metrics.get_mut(&character) {
            Some(glyph_metrics) => glyph_metrics.glyph_bounds = RectI::new(origin, image.size),
            None => warn!("composite(): no metrics for {:?}; drawing it anyway", character),
        }
        atlas.blit_from_canvas_at(image, origin);

        column += 1;
    }

    atlas.flip_vertical();
    atlas
}
