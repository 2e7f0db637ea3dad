// Copyright 2026 the Underbrush Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Underbrush Surface: backend-agnostic raster surface capability.
//!
//! This crate defines the small drawing interface the mask-synthesis
//! pipeline renders through, plus the plain-old-data types that cross it.
//! It deliberately exposes only what the pipeline needs:
//!
//! - [`RasterSurface`]: a fixed-size drawing target with `fill`,
//!   `draw_path`, and `draw_image` operations, finished into an immutable
//!   [`RasterBuffer`].
//! - [`SurfaceProvider`]: a factory for surfaces. Acquisition may fail
//!   ([`SurfaceProvider::acquire`] returns `None`) on targets without
//!   raster support; callers are expected to skip the requested render
//!   rather than error out.
//! - [`RasterBuffer`]: width/height plus straight-alpha RGBA8 pixels,
//!   tagged with the [`RasterLayer`] it represents. Buffers are immutable
//!   once produced and superseded, never mutated, by later renders.
//!
//! Backends implement [`RasterSurface`] over any 2D drawing primitives
//! (a software rasterizer, a GPU context, a platform canvas). The one
//! hard requirement is determinism: the same sequence of operations on
//! surfaces of the same dimensions must yield byte-identical buffers.

#![no_std]

extern crate alloc;

use alloc::vec::Vec;
use kurbo::{Cap, Join, Point, Stroke};
pub use peniko::{Color, Compose};

/// A simple axis-aligned rectangle in f32 coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RectF {
    /// Minimum X coordinate.
    pub x0: f32,
    /// Minimum Y coordinate.
    pub y0: f32,
    /// Maximum X coordinate.
    pub x1: f32,
    /// Maximum Y coordinate.
    pub y1: f32,
}

impl RectF {
    /// Create a new rectangle from min/max corners.
    #[inline]
    pub const fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// The rectangle covering an entire `width` by `height` surface.
    #[inline]
    pub fn covering(width: u32, height: u32) -> Self {
        Self::new(0.0, 0.0, width as f32, height as f32)
    }

    /// Width of the rectangle.
    #[inline]
    pub const fn width(self) -> f32 {
        self.x1 - self.x0
    }

    /// Height of the rectangle.
    #[inline]
    pub const fn height(self) -> f32 {
        self.y1 - self.y0
    }
}

/// Which derived layer a [`RasterBuffer`] represents.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RasterLayer {
    /// The stroke layer as rendered (strokes over the requested background).
    StrokeRaster,
    /// Strokes over a transparent clear; non-drawn pixels have alpha 0.
    TransparentMask,
    /// Strokes over an opaque black fill.
    BlackMask,
    /// The source image restricted to the drawn region.
    Composite,
}

/// An immutable grid of straight-alpha RGBA8 pixels.
///
/// Produced by finishing a [`RasterSurface`]; superseded (not mutated) by
/// subsequent renders.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterBuffer {
    width: u32,
    height: u32,
    layer: RasterLayer,
    pixels: Vec<u8>,
}

impl RasterBuffer {
    /// Wrap raw RGBA8 pixels as a buffer.
    ///
    /// `pixels.len()` must be exactly `width * height * 4`.
    pub fn from_rgba8(width: u32, height: u32, layer: RasterLayer, pixels: Vec<u8>) -> Self {
        assert_eq!(
            pixels.len(),
            width as usize * height as usize * 4,
            "pixel data must be width * height RGBA8 quads"
        );
        Self {
            width,
            height,
            layer,
            pixels,
        }
    }

    /// Buffer width in pixels.
    #[inline]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Buffer height in pixels.
    #[inline]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Which derived layer this buffer represents.
    #[inline]
    pub const fn layer(&self) -> RasterLayer {
        self.layer
    }

    /// The raw straight-alpha RGBA8 pixel data, row-major.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// The `[r, g, b, a]` quad at `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }

    /// The alpha value at `(x, y)`, or `None` when out of bounds.
    #[inline]
    pub fn alpha(&self, x: u32, y: u32) -> Option<u8> {
        self.pixel(x, y).map(|p| p[3])
    }

    /// Borrow this buffer as a drawable image.
    #[inline]
    pub fn as_image(&self) -> ImageRef<'_> {
        ImageRef {
            width: self.width,
            height: self.height,
            pixels: &self.pixels,
        }
    }
}

/// A borrowed, row-major, straight-alpha RGBA8 image to draw from.
#[derive(Copy, Clone, Debug)]
pub struct ImageRef<'a> {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Tightly packed RGBA8 pixel data, `width * height * 4` bytes.
    pub pixels: &'a [u8],
}

/// How a surface is prepared before strokes are painted.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Background {
    /// Fill the entire surface with an opaque color.
    Solid(Color),
    /// Leave the surface fully transparent.
    Clear,
}

/// The brush stroke style shared by all backends: round caps and joins,
/// stroke width twice the brush radius.
pub fn brush_stroke(radius: f64) -> Stroke {
    let mut stroke = Stroke::new(radius * 2.0);
    stroke.join = Join::Round;
    stroke.start_cap = Cap::Round;
    stroke.end_cap = Cap::Round;
    stroke
}

/// A fixed-size drawing target.
///
/// All coordinates are in surface pixel space. Operations are applied in
/// call order with source-over compositing unless an explicit [`Compose`]
/// says otherwise; later draws layer over earlier ones.
pub trait RasterSurface {
    /// Fill the entire surface with an opaque color.
    fn fill(&mut self, color: Color);

    /// Paint a freehand path with the given brush radius and color.
    ///
    /// Segments are drawn with round caps and joins of diameter
    /// `2 * radius` (see [`brush_stroke`]). A single-point path paints a
    /// round dot of that radius. An empty path paints nothing.
    fn draw_path(&mut self, points: &[Point], radius: f64, color: Color);

    /// Draw `image` scaled into `dst`, composited with `compose`.
    ///
    /// [`Compose::SrcOver`] is ordinary painting; other modes treat the
    /// image as the compose source and the current surface contents as
    /// the destination (e.g. [`Compose::DestIn`] keeps existing pixels
    /// only where the image is opaque, scaled by its alpha).
    fn draw_image(&mut self, image: ImageRef<'_>, dst: RectF, compose: Compose);

    /// Finish drawing and read the surface back as an immutable buffer
    /// tagged with `layer`.
    fn into_buffer(self, layer: RasterLayer) -> RasterBuffer;
}

/// Factory for [`RasterSurface`]s.
///
/// Returning `None` from [`acquire`](Self::acquire) signals that the
/// environment cannot supply a drawing target of the requested size;
/// callers skip the requested render rather than treating this as an
/// error.
pub trait SurfaceProvider {
    /// The surface type this provider creates.
    type Surface: RasterSurface;

    /// Acquire a fresh, fully transparent surface of the given size.
    fn acquire(&self, width: u32, height: u32) -> Option<Self::Surface>;
}
