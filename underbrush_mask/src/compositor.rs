// Copyright 2026 the Underbrush Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Derivation of the three mask artifacts from a stroke layer and the
//! decoded source image.
//!
//! The compositor renders the stroke layer twice — once over solid black
//! for the black mask, once over a transparent clear for the transparent
//! mask — and then restricts the source image to the drawn region. The
//! transparent mask travels through its PNG-encoded form before it is
//! used as the compositing source; the composite draw only starts after
//! that re-decode has completed, so the dependency chain is strictly
//! sequential: render strokes, encode `T`, decode `T`, composite, done.

use underbrush_surface::{
    Background, Color, Compose, RasterBuffer, RasterLayer, RasterSurface, RectF, SurfaceProvider,
};

use crate::codec::{DecodedImage, decode_image, encode_png};
use crate::error::MaskError;
use crate::raster::render;
use crate::strokes::StrokeOp;

/// The three raster artifacts produced by one mask generation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MaskSet {
    /// Opaque white strokes over a fully transparent background.
    pub transparent: RasterBuffer,
    /// White strokes over an opaque black background; the `mask.png` artifact.
    pub black: RasterBuffer,
    /// The source image, scaled to the mask dimensions and kept only where
    /// the transparent mask has coverage; transparent elsewhere.
    pub composite: RasterBuffer,
}

/// Generate the mask set for `strokes` at the given mask dimensions.
///
/// An empty stroke sequence is a valid degenerate input: the black mask
/// comes back uniform black, the transparent mask uniform alpha-0, and
/// the composite fully transparent.
///
/// `Ok(None)` means the surface provider could not supply a drawing
/// target; the generation is skipped without surfacing an error. Codec
/// failures while round-tripping the transparent mask propagate as
/// [`MaskError`].
///
/// This function is pure with respect to its inputs: repeated calls with
/// an unchanged stroke sequence and source yield byte-identical buffers.
pub fn generate<P: SurfaceProvider>(
    strokes: &[StrokeOp],
    width: u32,
    height: u32,
    source: &DecodedImage,
    provider: &P,
) -> Result<Option<MaskSet>, MaskError> {
    let Some(black) = render(
        strokes,
        width,
        height,
        Color::WHITE,
        Background::Solid(Color::BLACK),
        RasterLayer::BlackMask,
        provider,
    ) else {
        log::debug!("raster surface unavailable; mask generation skipped");
        return Ok(None);
    };

    // Same strokes, but composed against a transparent clear instead of
    // the black fill.
    let Some(transparent) = render(
        strokes,
        width,
        height,
        Color::WHITE,
        Background::Clear,
        RasterLayer::TransparentMask,
        provider,
    ) else {
        log::debug!("raster surface unavailable; mask generation skipped");
        return Ok(None);
    };

    // The transparent mask is consumed in its encoded form: encode, then
    // decode back into an image handle before the composite draw.
    let encoded = encode_png(transparent.as_image())?;
    let mask_image = decode_image(&encoded)?;

    let Some(mut surface) = provider.acquire(width, height) else {
        log::debug!("raster surface unavailable; mask generation skipped");
        return Ok(None);
    };
    let dst = RectF::covering(width, height);
    surface.draw_image(source.as_image(), dst, Compose::SrcOver);
    // Keep the scaled source only where the mask has coverage, scaled by
    // the mask's alpha for partial coverage.
    surface.draw_image(mask_image.as_image(), dst, Compose::DestIn);
    let composite = surface.into_buffer(RasterLayer::Composite);

    Ok(Some(MaskSet {
        transparent,
        black,
        composite,
    }))
}
