// font-atlas/src/error.rs
//
// Copyright © 2018 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Various types of errors that `font-atlas` can return.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Reasons why a font atlas might fail to load.
#[derive(Debug, Error)]
pub enum FontLoadingError {
    /// The native rasterizer library could not be initialized.
    #[error("failed to initialize the rasterizer library")]
    LibraryInit,

    /// No font file path was supplied.
    #[error("font file path is empty")]
    EmptyPath,

    /// The font file does not exist on disk.
    #[error("font file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The rasterizer could not open a face from the file.
    #[error("failed to parse font file {}", .0.display())]
    Parse(PathBuf),

    /// The rasterizer rejected the requested character size.
    #[error("failed to set character size {size} for font {}", .path.display())]
    CharacterSize {
        /// The font that was being loaded.
        path: PathBuf,
        /// The requested size, in pixels.
        size: u32,
    },

    /// The rasterizer produced no glyph image for any supported character.
    ///
    /// There is no such thing as an empty font, so this indicates a broken font or adapter.
    #[error("font {} produced no glyph images at size {size}", .path.display())]
    EmptyGlyphSet {
        /// The font that was being loaded.
        path: PathBuf,
        /// The requested size, in pixels.
        size: u32,
    },

    /// A disk or similar I/O error occurred while attempting to load the font.
    #[error("I/O error")]
    Io(#[from] io::Error),
}

/// Reasons why a rasterizer might fail to produce a single glyph.
///
/// These are recovered locally: the affected character is left out of the atlas.
#[derive(PartialEq, Debug, Error)]
pub enum GlyphLoadingError {
    /// The font didn't contain a glyph with that ID.
    #[error("no such glyph")]
    NoSuchGlyph,

    /// The glyph was loaded but could not be rendered to a bitmap.
    #[error("glyph rasterization failed")]
    Rasterization,

    /// The rasterizer produced a bitmap in a pixel mode other than 8-bit grayscale.
    #[error("unsupported pixel mode {0}")]
    UnsupportedPixelMode(u8),
}

/// Reasons why an atlas layout cannot be planned.
#[derive(PartialEq, Debug, Error)]
pub enum AtlasLayoutError {
    /// The glyph image set was empty.
    #[error("no glyph images to lay out")]
    EmptyGlyphSet,
}

/// Violations of the font ownership protocol.
#[derive(PartialEq, Debug, Error)]
pub enum FontUsageError {
    /// A pooled (shared) font was disposed directly instead of being returned to its owner.
    #[error("cannot dispose a pooled font")]
    DisposePooled,
}
