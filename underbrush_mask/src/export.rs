// Copyright 2026 the Underbrush Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Serialization of raster buffers for the external save collaborator.
//!
//! Exports are independent and unlimited: unlike mask generation, nothing
//! gates how often a buffer may be encoded and handed to the sink.

use underbrush_surface::RasterBuffer;

use crate::codec::encode_png;
use crate::error::MaskError;

/// Suggested filename for the exported black mask.
pub const MASK_FILENAME: &str = "mask.png";

/// Receives encoded bytes and performs the platform-specific save.
///
/// The pipeline observes no return value; delivery is the sink's problem.
pub trait ExportSink {
    /// Save `bytes` under the suggested `filename`.
    fn save(&mut self, bytes: &[u8], filename: &str);
}

/// Encode `buffer` as PNG and hand it to `sink` under `suggested_name`.
pub fn export_png(
    buffer: &RasterBuffer,
    suggested_name: &str,
    sink: &mut dyn ExportSink,
) -> Result<(), MaskError> {
    let bytes = encode_png(buffer.as_image())?;
    sink.save(&bytes, suggested_name);
    Ok(())
}

/// Suggested filename for the exported composite, derived from the last
/// path segment of the source image's name.
pub fn composite_filename(source_name: &str) -> String {
    let base = source_name
        .rsplit('/')
        .find(|s| !s.is_empty())
        .unwrap_or(source_name);
    format!("{base}-edited.png")
}
