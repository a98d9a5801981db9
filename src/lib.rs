// font-atlas/src/lib.rs
//
// Copyright © 2018 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! `font-atlas` rasterizes a font's supported character set into a single RGBA texture atlas
//! and measures text against the resulting glyph metrics.
//!
//! ## Introduction
//!
//! A [`cache::FontAtlasCache`] turns a `(font file, pixel size)` key into a
//! [`cache::FontAtlasData`]: the packed atlas image, ready for GPU upload, plus one
//! [`metrics::GlyphMetrics`] per supported character. The work is done at most once per key.
//!
//! Glyphs are rendered through a [`rasterizer::Rasterizer`]. With the `loader-freetype` feature
//! enabled, [`loaders::freetype::FreeTypeRasterizer`] provides one backed by FreeType.
//!
//! A [`font::Font`] wraps an atlas and measures or lays out strings, applying kerning between
//! adjacent glyphs when the face provides it.
//!
//! ## Pipeline
//!
//! 1. [`glyph_image`] rasterizes every supported character except space into white RGBA images
//!    whose alpha is the glyph coverage.
//!
//! 2. [`atlas::AtlasLayout`] plans a square grid of equally sized cells.
//!
//! 3. [`atlas::composite`] draws the images into their cells, records each glyph's rectangle
//!    in its metrics, and flips the result for bottom-left-origin texture sampling.

#![warn(missing_debug_implementations)]

pub mod atlas;
pub mod cache;
pub mod canvas;
pub mod charset;
pub mod error;
pub mod font;
pub mod glyph_image;
pub mod loaders;
pub mod metrics;
pub mod rasterizer;

mod utils;
