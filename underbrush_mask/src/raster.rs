// Copyright 2026 the Underbrush Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deterministic rendering of a stroke sequence into a raster buffer.

use underbrush_surface::{
    Background, Color, RasterBuffer, RasterLayer, RasterSurface, SurfaceProvider,
};

use crate::strokes::StrokeOp;

/// Render `strokes` into a `width` by `height` buffer.
///
/// The surface is first prepared with `background`, then each stroke is
/// painted in append order with `stroke_color` (round caps and joins,
/// diameter twice the brush radius), so later strokes layer over earlier
/// ones at brush-radius boundaries.
///
/// Identical inputs always produce byte-identical buffers. Returns `None`
/// only when `provider` cannot supply a surface, in which case the
/// requested render is skipped.
pub fn render<P: SurfaceProvider>(
    strokes: &[StrokeOp],
    width: u32,
    height: u32,
    stroke_color: Color,
    background: Background,
    layer: RasterLayer,
    provider: &P,
) -> Option<RasterBuffer> {
    let mut surface = provider.acquire(width, height)?;
    if let Background::Solid(color) = background {
        surface.fill(color);
    }
    for op in strokes {
        surface.draw_path(op.points(), op.brush_radius(), stroke_color);
    }
    Some(surface.into_buffer(layer))
}
