// Copyright 2026 the Underbrush Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::fmt;

/// Errors produced by the mask pipeline's codec boundaries.
///
/// Surface-acquisition failures are deliberately not represented here;
/// they fail closed as `None` at the call sites that render.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MaskError {
    /// An encoded image could not be decoded into pixels.
    Decode(String),
    /// A raster buffer could not be encoded as PNG.
    Encode(String),
}

impl fmt::Display for MaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode(s) => write!(f, "image decode error: {s}"),
            Self::Encode(s) => write!(f, "png encode error: {s}"),
        }
    }
}

impl std::error::Error for MaskError {}
