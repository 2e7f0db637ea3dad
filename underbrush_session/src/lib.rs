// Copyright 2026 the Underbrush Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Underbrush Session: the per-image editing-session state machine.
//!
//! An [`EditingSession`] binds exactly one source image to one stroke
//! layer and one (at most) generated mask set. Replacing the image means
//! discarding the session and starting a new one; there is no reset
//! transition. The session gates every operation on its current
//! [`SessionState`], so callers can drive it from any event source
//! without checking preconditions themselves: operations that are not
//! valid in the current state are ignored.
//!
//! Mask generation is one-shot per session. The first successful
//! [`generate_masks`](EditingSession::generate_masks) moves the session
//! to [`MasksGenerated`](SessionState::MasksGenerated) and later calls
//! are ignored, even if strokes change afterwards. Exports, by contrast,
//! are unlimited once a mask set exists.

use kurbo::Point;
use underbrush_mask::{
    DecodedImage, ExportSink, MASK_FILENAME, MaskError, MaskSet, StrokeLayer, composite_filename,
    export_png, generate,
};
use underbrush_surface::SurfaceProvider;

/// The lifecycle phase of an [`EditingSession`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// No source image has been selected yet.
    NoImage,
    /// A source image was selected and its decode is in flight.
    ImageLoading,
    /// The source image is decoded; strokes may be edited and masks
    /// have not been generated yet.
    ImageReady,
    /// Masks were generated; strokes may still be edited, but the
    /// generation gate is spent.
    MasksGenerated,
    /// The session is over and its resources are released.
    Closed,
}

/// One editing session: a source image, its stroke layer, and the mask
/// set derived from them.
#[derive(Debug)]
pub struct EditingSession {
    state: SessionState,
    mask_width: u32,
    mask_height: u32,
    source_name: Option<String>,
    source: Option<DecodedImage>,
    strokes: StrokeLayer,
    masks: Option<MaskSet>,
}

impl EditingSession {
    /// Create a session that will rasterize masks at the given
    /// dimensions, independent of the source image's own size.
    pub fn new(mask_width: u32, mask_height: u32) -> Self {
        Self {
            state: SessionState::NoImage,
            mask_width,
            mask_height,
            source_name: None,
            source: None,
            strokes: StrokeLayer::new(),
            masks: None,
        }
    }

    /// The session's current lifecycle phase.
    #[inline]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Mask width in pixels.
    #[inline]
    pub const fn mask_width(&self) -> u32 {
        self.mask_width
    }

    /// Mask height in pixels.
    #[inline]
    pub const fn mask_height(&self) -> u32 {
        self.mask_height
    }

    /// The name the source image was selected under, once one has been.
    #[inline]
    pub fn source_name(&self) -> Option<&str> {
        self.source_name.as_deref()
    }

    /// The decoded source image, present from
    /// [`ImageReady`](SessionState::ImageReady) until close.
    #[inline]
    pub fn source(&self) -> Option<&DecodedImage> {
        self.source.as_ref()
    }

    /// The stroke layer in its current state.
    #[inline]
    pub fn strokes(&self) -> &StrokeLayer {
        &self.strokes
    }

    /// The generated mask set, if generation has succeeded.
    #[inline]
    pub fn masks(&self) -> Option<&MaskSet> {
        self.masks.as_ref()
    }

    /// Record that a source image named `source_name` was selected and
    /// its decode has started.
    ///
    /// Valid only in [`NoImage`](SessionState::NoImage); the session
    /// binds a single source for its whole life, so a second selection
    /// is ignored.
    pub fn begin_load(&mut self, source_name: &str) {
        if self.state != SessionState::NoImage {
            log::debug!("image selection ignored in state {:?}", self.state);
            return;
        }
        self.source_name = Some(source_name.to_string());
        self.state = SessionState::ImageLoading;
    }

    /// Complete the in-flight decode started by
    /// [`begin_load`](Self::begin_load).
    ///
    /// On success the session becomes editable; on failure it closes.
    /// A completion arriving after [`close`](Self::close) is dropped
    /// silently, so callers may cancel a session without waiting for
    /// the decode to finish.
    pub fn finish_load(&mut self, result: Result<DecodedImage, MaskError>) {
        match self.state {
            SessionState::ImageLoading => match result {
                Ok(image) => {
                    self.source = Some(image);
                    self.state = SessionState::ImageReady;
                }
                Err(err) => {
                    log::warn!("source image failed to load: {err}");
                    self.close();
                }
            },
            SessionState::Closed => {}
            _ => log::debug!("decode completion ignored in state {:?}", self.state),
        }
    }

    /// Append a finished stroke to the layer.
    ///
    /// Ignored unless the session holds a decoded image.
    pub fn append_stroke(&mut self, path: Vec<Point>, brush_radius: f64) {
        if self.accepts_strokes() {
            self.strokes.append(path, brush_radius);
        } else {
            log::debug!("stroke ignored in state {:?}", self.state);
        }
    }

    /// Remove the most recent stroke, if any.
    pub fn undo_last_stroke(&mut self) {
        if self.accepts_strokes() {
            self.strokes.undo_last();
        }
    }

    /// Remove all strokes.
    pub fn clear_strokes(&mut self) {
        if self.accepts_strokes() {
            self.strokes.clear();
        }
    }

    fn accepts_strokes(&self) -> bool {
        matches!(
            self.state,
            SessionState::ImageReady | SessionState::MasksGenerated
        )
    }

    /// Generate the mask set from the current strokes and source image.
    ///
    /// This is the session's one-shot operation: only the first
    /// successful generation takes effect, after which further calls
    /// return `None` without rendering. A call that could not obtain a
    /// raster surface, or that failed in a codec, leaves the gate
    /// unspent so a later call may retry.
    pub fn generate_masks<P: SurfaceProvider>(&mut self, provider: &P) -> Option<&MaskSet> {
        if self.state != SessionState::ImageReady {
            log::debug!("mask generation ignored in state {:?}", self.state);
            return None;
        }
        // `ImageReady` implies the source is present.
        let source = self.source.as_ref()?;
        match generate(
            self.strokes.snapshot(),
            self.mask_width,
            self.mask_height,
            source,
            provider,
        ) {
            Ok(Some(set)) => {
                self.masks = Some(set);
                self.state = SessionState::MasksGenerated;
                self.masks.as_ref()
            }
            Ok(None) => None,
            Err(err) => {
                log::warn!("mask generation failed: {err}");
                None
            }
        }
    }

    /// Export the black mask as `mask.png`.
    ///
    /// Returns `Ok(false)` when no mask set has been generated yet.
    pub fn export_black_mask(&self, sink: &mut dyn ExportSink) -> Result<bool, MaskError> {
        let Some(masks) = &self.masks else {
            return Ok(false);
        };
        export_png(&masks.black, MASK_FILENAME, sink)?;
        Ok(true)
    }

    /// Export the composite under a name derived from the source
    /// image's name.
    ///
    /// Returns `Ok(false)` when no mask set has been generated yet.
    pub fn export_composite(&self, sink: &mut dyn ExportSink) -> Result<bool, MaskError> {
        let (Some(masks), Some(name)) = (&self.masks, &self.source_name) else {
            return Ok(false);
        };
        export_png(&masks.composite, &composite_filename(name), sink)?;
        Ok(true)
    }

    /// End the session and release the decoded image, the stroke layer,
    /// and any generated masks.
    ///
    /// Closing is terminal and idempotent.
    pub fn close(&mut self) {
        self.state = SessionState::Closed;
        self.source = None;
        self.masks = None;
        self.strokes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot(x: f64, y: f64) -> Vec<Point> {
        vec![Point::new(x, y)]
    }

    fn loaded_session() -> EditingSession {
        let mut session = EditingSession::new(64, 64);
        session.begin_load("photo.png");
        session.finish_load(Ok(DecodedImage::from_rgba8(1, 1, vec![9, 9, 9, 255])));
        session
    }

    #[test]
    fn a_new_session_has_no_image() {
        let session = EditingSession::new(800, 400);
        assert_eq!(session.state(), SessionState::NoImage);
        assert!(session.source().is_none());
        assert!(session.masks().is_none());
    }

    #[test]
    fn successful_load_makes_the_session_editable() {
        let session = loaded_session();
        assert_eq!(session.state(), SessionState::ImageReady);
        assert_eq!(session.source_name(), Some("photo.png"));
        assert!(session.source().is_some());
    }

    #[test]
    fn failed_load_closes_the_session() {
        let mut session = EditingSession::new(64, 64);
        session.begin_load("broken.png");
        session.finish_load(Err(MaskError::Decode("truncated".to_string())));
        assert_eq!(session.state(), SessionState::Closed);
        assert!(session.source().is_none());
    }

    #[test]
    fn late_completion_after_close_is_dropped() {
        let mut session = EditingSession::new(64, 64);
        session.begin_load("photo.png");
        session.close();
        session.finish_load(Ok(DecodedImage::from_rgba8(1, 1, vec![0, 0, 0, 255])));
        assert_eq!(session.state(), SessionState::Closed);
        assert!(session.source().is_none());
    }

    #[test]
    fn a_second_selection_is_ignored() {
        let mut session = loaded_session();
        session.begin_load("other.png");
        assert_eq!(session.state(), SessionState::ImageReady);
        assert_eq!(session.source_name(), Some("photo.png"));
    }

    #[test]
    fn strokes_are_ignored_without_a_decoded_image() {
        let mut session = EditingSession::new(64, 64);
        session.append_stroke(dot(1.0, 1.0), 4.0);
        session.begin_load("photo.png");
        session.append_stroke(dot(2.0, 2.0), 4.0);
        assert!(session.strokes().is_empty());
    }

    #[test]
    fn stroke_edits_flow_through_once_ready() {
        let mut session = loaded_session();
        session.append_stroke(dot(1.0, 1.0), 4.0);
        session.append_stroke(dot(2.0, 2.0), 4.0);
        session.undo_last_stroke();
        assert_eq!(session.strokes().len(), 1);
        session.clear_strokes();
        assert!(session.strokes().is_empty());
    }

    #[test]
    fn close_releases_session_resources() {
        let mut session = loaded_session();
        session.append_stroke(dot(3.0, 3.0), 2.0);
        session.close();
        assert_eq!(session.state(), SessionState::Closed);
        assert!(session.source().is_none());
        assert!(session.strokes().is_empty());
        session.close();
        assert_eq!(session.state(), SessionState::Closed);
    }

    #[test]
    fn exports_report_nothing_to_save_before_generation() {
        struct PanicSink;
        impl ExportSink for PanicSink {
            fn save(&mut self, _bytes: &[u8], _filename: &str) {
                panic!("nothing should be saved");
            }
        }

        let session = loaded_session();
        let mut sink = PanicSink;
        assert_eq!(session.export_black_mask(&mut sink), Ok(false));
        assert_eq!(session.export_composite(&mut sink), Ok(false));
    }
}
