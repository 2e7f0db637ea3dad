// Copyright 2026 the Underbrush Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Image decoding and PNG encoding at the pipeline's byte boundaries.

use std::io::Cursor;

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use underbrush_surface::ImageRef;

use crate::error::MaskError;

/// A fully decoded, read-only RGBA8 bitmap.
///
/// This is what the input collaborator's bytes become once decode
/// completes, and what the compositor consumes as its drawing sources.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl DecodedImage {
    /// Wrap raw straight-alpha RGBA8 pixels.
    ///
    /// `pixels.len()` must be exactly `width * height * 4`.
    pub fn from_rgba8(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        assert_eq!(
            pixels.len(),
            width as usize * height as usize * 4,
            "pixel data must be width * height RGBA8 quads"
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Image width in pixels.
    #[inline]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    #[inline]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Borrow this image as a drawable source.
    #[inline]
    pub fn as_image(&self) -> ImageRef<'_> {
        ImageRef {
            width: self.width,
            height: self.height,
            pixels: &self.pixels,
        }
    }
}

/// Decode encoded image bytes into an RGBA8 bitmap.
pub fn decode_image(bytes: &[u8]) -> Result<DecodedImage, MaskError> {
    let dynamic =
        image::load_from_memory(bytes).map_err(|e| MaskError::Decode(e.to_string()))?;
    let rgba = dynamic.into_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(DecodedImage::from_rgba8(width, height, rgba.into_raw()))
}

/// Encode an RGBA8 image as PNG bytes.
pub fn encode_png(image: ImageRef<'_>) -> Result<Vec<u8>, MaskError> {
    let mut bytes = Vec::new();
    PngEncoder::new(Cursor::new(&mut bytes))
        .write_image(
            image.pixels,
            image.width,
            image.height,
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| MaskError::Encode(e.to_string()))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn png_round_trip_preserves_pixels() {
        let mut pixels = vec![0_u8; 3 * 2 * 4];
        pixels[0..4].copy_from_slice(&[255, 255, 255, 255]);
        pixels[20..24].copy_from_slice(&[10, 200, 60, 128]);
        let original = DecodedImage::from_rgba8(3, 2, pixels);

        let encoded = encode_png(original.as_image()).expect("png encoding");
        let decoded = decode_image(&encoded).expect("png decoding");
        assert_eq!(decoded, original);
    }

    #[test]
    fn undecodable_bytes_report_a_load_failure() {
        let err = decode_image(b"definitely not an image").expect_err("decode should fail");
        assert!(matches!(err, MaskError::Decode(_)));
    }

    #[test]
    #[should_panic(expected = "pixel data must be")]
    fn decoded_image_rejects_short_pixel_data() {
        let _ = DecodedImage::from_rgba8(2, 2, vec![0_u8; 12]);
    }
}
