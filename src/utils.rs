// font-atlas/src/utils.rs
//
// Copyright © 2018 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Miscellaneous utilities for use in this crate.

#![allow(dead_code)]

/// Converts a 26.6 fixed-point value to a float.
#[inline]
pub(crate) fn f26dot6_to_f32(fixed: i64) -> f32 {
    (fixed as f32) / 64.0
}

/// Converts a float to 26.6 fixed point, rounding to the nearest 1/64.
#[inline]
pub(crate) fn f32_to_f26dot6(float: f32) -> i64 {
    f32::round(float * 64.0) as i64
}

/// Truncates a 26.6 fixed-point value to whole pixels.
#[inline]
pub(crate) fn f26dot6_to_pixels(fixed: i64) -> i64 {
    fixed >> 6
}
