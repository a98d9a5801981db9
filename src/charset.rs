// font-atlas/src/charset.rs
//
// Copyright © 2018 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The fixed set of characters rasterized into every atlas.

/// Every character rasterized into an atlas: ASCII letters, digits, punctuation and space.
pub const SUPPORTED_CHARACTERS: &str = concat!(
    "abcdefghijklmnopqrstuvwxyz",
    "ABCDEFGHIJKLMNOPQRSTUVWXYZ",
    "0123456789",
    "`!@#$%^&*()-=",
    "~_+[]\\;',./{}|:\"<>?",
    " ",
);

/// The space character. It has metrics but never a glyph image.
pub const SPACE: char = ' ';

/// Stands in for any character outside [`SUPPORTED_CHARACTERS`] when mapping text to glyphs.
pub const INVALID_CHARACTER: char = '☐';

/// Returns the supported characters in declaration order.
#[inline]
pub fn supported_characters() -> Vec<char> {
    SUPPORTED_CHARACTERS.chars().collect()
}

/// Returns true if `character` is rasterized into every atlas.
#[inline]
pub fn is_supported(character: char) -> bool {
    SUPPORTED_CHARACTERS.contains(character)
}
