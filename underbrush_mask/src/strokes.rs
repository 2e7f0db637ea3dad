// Copyright 2026 the Underbrush Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The stroke layer: an ordered, replayable record of draw operations.
//!
//! Append order is both z-order (later strokes layer over earlier ones at
//! overlaps) and undo order (undo removes the most recent stroke). The
//! layer holds vector data only; rasterization happens on demand in
//! [`raster`](crate::raster).

use kurbo::Point;

/// One continuous freehand path with the brush radius captured at draw time.
///
/// Immutable once appended to a [`StrokeLayer`].
#[derive(Clone, Debug, PartialEq)]
pub struct StrokeOp {
    points: Vec<Point>,
    brush_radius: f64,
}

impl StrokeOp {
    /// The path samples, in image coordinate space. Never empty.
    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// The brush radius at draw time. Always positive.
    #[inline]
    pub const fn brush_radius(&self) -> f64 {
        self.brush_radius
    }
}

/// The ordered sequence of [`StrokeOp`]s for one editing session.
///
/// `undo_last` and `clear` on an empty layer are defined no-ops; there is
/// no state beyond empty versus non-empty.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StrokeLayer {
    ops: Vec<StrokeOp>,
}

impl StrokeLayer {
    /// Create an empty stroke layer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new stroke at the end of the layer.
    ///
    /// `path` must be non-empty and `brush_radius` positive; the input
    /// collaborator guarantees both, so this only debug-asserts.
    pub fn append(&mut self, path: Vec<Point>, brush_radius: f64) {
        debug_assert!(!path.is_empty(), "stroke path must contain a point");
        debug_assert!(brush_radius > 0.0, "brush radius must be positive");
        self.ops.push(StrokeOp {
            points: path,
            brush_radius,
        });
    }

    /// Remove the most recently appended stroke, if any.
    pub fn undo_last(&mut self) {
        self.ops.pop();
    }

    /// Remove all strokes, returning the layer to its initial empty state.
    pub fn clear(&mut self) {
        self.ops.clear();
    }

    /// Read-only view of the current stroke sequence, in append order.
    #[inline]
    pub fn snapshot(&self) -> &[StrokeOp] {
        &self.ops
    }

    /// Whether the layer holds no strokes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Number of strokes in the layer.
    #[inline]
    pub fn len(&self) -> usize {
        self.ops.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(coords: &[(f64, f64)]) -> Vec<Point> {
        coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    #[test]
    fn append_preserves_order_and_radius() {
        let mut layer = StrokeLayer::new();
        layer.append(path(&[(1.0, 2.0)]), 4.0);
        layer.append(path(&[(3.0, 4.0), (5.0, 6.0)]), 8.0);

        let ops = layer.snapshot();
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].points(), &[Point::new(1.0, 2.0)]);
        assert_eq!(ops[0].brush_radius(), 4.0);
        assert_eq!(ops[1].points().len(), 2);
        assert_eq!(ops[1].brush_radius(), 8.0);
    }

    #[test]
    fn undo_removes_only_the_last_stroke() {
        let mut layer = StrokeLayer::new();
        layer.append(path(&[(1.0, 1.0)]), 2.0);
        layer.append(path(&[(9.0, 9.0)]), 2.0);
        layer.undo_last();

        assert_eq!(layer.len(), 1);
        assert_eq!(layer.snapshot()[0].points(), &[Point::new(1.0, 1.0)]);
    }

    #[test]
    fn undo_and_clear_on_empty_are_noops() {
        let mut layer = StrokeLayer::new();
        layer.undo_last();
        layer.clear();
        assert!(layer.is_empty());
    }

    #[test]
    fn clear_yields_the_initial_state() {
        let mut layer = StrokeLayer::new();
        layer.append(path(&[(1.0, 1.0), (2.0, 2.0)]), 3.0);
        layer.clear();
        assert_eq!(layer, StrokeLayer::new());
    }
}
