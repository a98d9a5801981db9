// font-atlas/src/canvas.rs
//
// Copyright © 2018 The Pathfinder Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! An in-memory bitmap surface for glyph images and atlases.

use pathfinder_geometry::vector::Vector2I;
use std::cmp;

/// An in-memory bitmap surface for glyph images and atlases.
#[derive(Clone, Debug, PartialEq)]
pub struct Canvas {
    /// The raw pixel data.
    pub pixels: Vec<u8>,
    /// The size of the buffer, in pixels.
    pub size: Vector2I,
    /// The number of *bytes* between successive rows.
    pub stride: usize,
    /// The image format of the canvas.
    pub format: Format,
}

impl Canvas {
    /// Creates a new blank canvas with the given pixel size and format.
    ///
    /// Stride is automatically calculated from width.
    ///
    /// The canvas is initialized with transparent black (all values 0).
    #[inline]
    pub fn new(size: Vector2I, format: Format) -> Canvas {
        Canvas::with_stride(
            size,
            size.x().max(0) as usize * format.bytes_per_pixel() as usize,
            format,
        )
    }

    /// Creates a new blank canvas with the given pixel size, stride (number of bytes between
    /// successive rows), and format.
    ///
    /// The canvas is initialized with transparent black (all values 0).
    pub fn with_stride(size: Vector2I, stride: usize, format: Format) -> Canvas {
        Canvas {
            pixels: vec![0; stride * size.y().max(0) as usize],
            size,
            stride,
            format,
        }
    }

    /// Creates a canvas that takes ownership of existing pixel rows.
    ///
    /// Returns `None` if `pixels` is too short for `size` and `stride`.
    pub fn from_pixels(
        pixels: Vec<u8>,
        size: Vector2I,
        stride: usize,
        format: Format,
    ) -> Option<Canvas> {
        let row_bytes = size.x().max(0) as usize * format.bytes_per_pixel() as usize;
        if stride < row_bytes || pixels.len() < stride * size.y().max(0) as usize {
            return None;
        }
        Some(Canvas {
            pixels,
            size,
            stride,
            format,
        })
    }

    /// Returns the bytes of the pixel at `(x, y)`, or `None` if it lies outside the canvas.
    pub fn pixel_at(&self, x: i32, y: i32) -> Option<&[u8]> {
        if x < 0 || y < 0 || x >= self.size.x() || y >= self.size.y() {
            return None;
        }
        let bytes_per_pixel = self.format.bytes_per_pixel() as usize;
        let start = y as usize * self.stride + x as usize * bytes_per_pixel;
        Some(&self.pixels[start..start + bytes_per_pixel])
    }

    /// Copies `src` into the top left corner of this canvas, converting formats as needed.
    #[inline]
    pub fn blit_from_canvas(&mut self, src: &Canvas) {
        self.blit_from_canvas_at(src, Vector2I::zero())
    }

    /// Copies `src` into this canvas with its top left corner at `origin`.
    ///
    /// Pixels falling outside this canvas are clipped. A8 sources written to an RGBA canvas
    /// become white pixels whose alpha is the source coverage.
    pub fn blit_from_canvas_at(&mut self, src: &Canvas, origin: Vector2I) {
        self.blit_from(&src.pixels, src.size, src.stride, src.format, origin)
    }

    pub(crate) fn blit_from(
        &mut self,
        src_bytes: &[u8],
        src_size: Vector2I,
        src_stride: usize,
        src_format: Format,
        origin: Vector2I,
    ) {
        if origin.x() < 0 || origin.y() < 0 {
            return;
        }
        let width = cmp::min(src_size.x(), self.size.x() - origin.x());
        let height = cmp::min(src_size.y(), self.size.y() - origin.y());
        if width <= 0 || height <= 0 {
            return;
        }
        let region = Region {
            origin_x: origin.x() as usize,
            origin_y: origin.y() as usize,
            width: width as usize,
            height: height as usize,
        };

        match (self.format, src_format) {
            (Format::A8, Format::A8) | (Format::Rgba32, Format::Rgba32) => {
                self.blit_from_with::<BlitMemcpy>(src_bytes, &region, src_stride, src_format)
            }
            (Format::Rgba32, Format::A8) => {
                self.blit_from_with::<BlitA8ToWhiteRgba32>(src_bytes, &region, src_stride, src_format)
            }
            (Format::A8, Format::Rgba32) => {
                self.blit_from_with::<BlitRgba32ToA8>(src_bytes, &region, src_stride, src_format)
            }
        }
    }

    fn blit_from_with<B>(
        &mut self,
        src_bytes: &[u8],
        region: &Region,
        src_stride: usize,
        src_format: Format,
    ) where
        B: Blit,
    {
        let src_bytes_per_pixel = src_format.bytes_per_pixel() as usize;
        let dest_bytes_per_pixel = self.format.bytes_per_pixel() as usize;

        for y in 0..region.height {
            let dest_row_start =
                (region.origin_y + y) * self.stride + region.origin_x * dest_bytes_per_pixel;
            let src_row_start = y * src_stride;
            let dest_row_end = dest_row_start + region.width * dest_bytes_per_pixel;
            let src_row_end = src_row_start + region.width * src_bytes_per_pixel;
            let dest_row_pixels = &mut self.pixels[dest_row_start..dest_row_end];
            let src_row_pixels = &src_bytes[src_row_start..src_row_end];
            B::blit(dest_row_pixels, src_row_pixels)
        }
    }

    /// Mirrors the canvas top to bottom in place.
    ///
    /// Glyphs are drawn with the origin at the top left, y pointing down; textures are sampled
    /// with the origin at the bottom left, y pointing up.
    pub fn flip_vertical(&mut self) {
        let height = self.size.y().max(0) as usize;
        let stride = self.stride;
        for y in 0..height / 2 {
            let (top, bottom) = self.pixels.split_at_mut((height - 1 - y) * stride);
            top[y * stride..(y + 1) * stride].swap_with_slice(&mut bottom[..stride]);
        }
    }
}

/// The image format for the canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Format {
    /// R8G8B8A8, little-endian, not premultiplied.
    Rgba32,
    /// A8.
    A8,
}

impl Format {
    /// Returns the number of bits per pixel that this image format corresponds to.
    #[inline]
    pub fn bits_per_pixel(self) -> u8 {
        match self {
            Format::Rgba32 => 32,
            Format::A8 => 8,
        }
    }

    /// Returns the number of bytes per pixel that this image format corresponds to.
    #[inline]
    pub fn bytes_per_pixel(self) -> u8 {
        self.bits_per_pixel() / 8
    }
}

struct Region {
    origin_x: usize,
    origin_y: usize,
    width: usize,
    height: usize,
}

trait Blit {
    fn blit(dest: &mut [u8], src: &[u8]);
}

struct BlitMemcpy;

impl Blit for BlitMemcpy {
    #[inline]
    fn blit(dest: &mut [u8], src: &[u8]) {
        dest.clone_from_slice(src)
    }
}

struct BlitA8ToWhiteRgba32;

impl Blit for BlitA8ToWhiteRgba32 {
    #[inline]
    fn blit(dest: &mut [u8], src: &[u8]) {
        for (dest, &coverage) in dest.chunks_mut(4).zip(src.iter()) {
            dest.copy_from_slice(&[0xff, 0xff, 0xff, coverage]);
        }
    }
}

struct BlitRgba32ToA8;

impl Blit for BlitRgba32ToA8 {
    #[inline]
    fn blit(dest: &mut [u8], src: &[u8]) {
        for (dest, src) in dest.iter_mut().zip(src.chunks(4)) {
            *dest = src[3]
        }
    }
}
