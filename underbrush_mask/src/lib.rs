// Copyright 2026 the Underbrush Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Underbrush Mask: the mask-synthesis pipeline.
//!
//! This crate turns a replayable stroke layer into pixel-accurate raster
//! artifacts:
//!
//! - [`strokes`]: the ordered, undoable record of draw operations.
//! - [`raster`]: deterministic rendering of a stroke sequence into a
//!   [`RasterBuffer`](underbrush_surface::RasterBuffer) through any
//!   [`RasterSurface`](underbrush_surface::RasterSurface).
//! - [`compositor`]: derivation of the transparent mask, the black mask,
//!   and the region-extracted composite from one stroke raster and the
//!   decoded source image.
//! - [`codec`]: PNG encode and image decode built on the `image` crate.
//! - [`export`]: serialization of a buffer to PNG bytes handed to an
//!   external [`ExportSink`].
//!
//! The pipeline is pull-based: nothing is rasterized when strokes change;
//! buffers are computed only when explicitly requested.

pub mod codec;
pub mod compositor;
mod error;
pub mod export;
pub mod raster;
pub mod strokes;

pub use codec::{DecodedImage, decode_image, encode_png};
pub use compositor::{MaskSet, generate};
pub use error::MaskError;
pub use export::{ExportSink, MASK_FILENAME, composite_filename, export_png};
pub use strokes::{StrokeLayer, StrokeOp};
