// Copyright 2026 the Underbrush Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Vello CPU-backed implementation of the Underbrush raster surface.
//!
//! This crate implements
//! [`RasterSurface`] on top of the sparse-strips
//! [`vello_cpu::RenderContext`], giving the mask pipeline a deterministic
//! software rasterizer: rendering runs on the u8 pipeline with
//! [`RenderMode::OptimizeSpeed`], so identical draw sequences produce
//! byte-identical buffers across runs and configurations.

#![deny(unsafe_code)]

use core::fmt;
use kurbo::Affine;
use peniko::{
    Blob, BlendMode, ImageAlphaType, ImageData, ImageFormat, ImageQuality, ImageSampler, Mix,
};
use underbrush_surface::{
    Color, Compose, ImageRef, RasterBuffer, RasterLayer, RasterSurface, RectF, SurfaceProvider,
    brush_stroke,
};
use vello_cpu::kurbo::{
    Affine as CpuAffine, BezPath, Cap as CpuCap, Circle, Join as CpuJoin, Rect, Shape,
    Stroke as CpuStroke,
};
use vello_cpu::{
    Image as CpuImage, ImageSource, Pixmap, RenderContext, RenderMode, RenderSettings,
};

/// Tolerance used when flattening dot geometry into a path.
const DOT_TOLERANCE: f64 = 0.1;

/// A fixed-size CPU raster surface.
///
/// Created through [`VelloCpuSurfaceProvider`]; starts fully transparent.
pub struct VelloCpuSurface {
    ctx: RenderContext,
    width: u16,
    height: u16,
}

impl fmt::Debug for VelloCpuSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VelloCpuSurface")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl VelloCpuSurface {
    fn new(width: u16, height: u16) -> Self {
        let settings = RenderSettings {
            // Force u8 pipeline output even if `f32_pipeline` is enabled elsewhere
            // in the build, to keep rasterization byte-stable across configurations.
            render_mode: RenderMode::OptimizeSpeed,
            ..RenderSettings::default()
        };
        Self {
            ctx: RenderContext::new_with(width, height, settings),
            width,
            height,
        }
    }

    fn affine_to_cpu(xf: Affine) -> CpuAffine {
        CpuAffine::new(xf.as_coeffs())
    }

    fn stroke_to_cpu(style: &kurbo::Stroke) -> CpuStroke {
        let mut stroke = CpuStroke::new(style.width);
        stroke.miter_limit = style.miter_limit;
        stroke.join = match style.join {
            kurbo::Join::Bevel => CpuJoin::Bevel,
            kurbo::Join::Miter => CpuJoin::Miter,
            kurbo::Join::Round => CpuJoin::Round,
        };
        stroke.start_cap = match style.start_cap {
            kurbo::Cap::Butt => CpuCap::Butt,
            kurbo::Cap::Round => CpuCap::Round,
            kurbo::Cap::Square => CpuCap::Square,
        };
        stroke.end_cap = match style.end_cap {
            kurbo::Cap::Butt => CpuCap::Butt,
            kurbo::Cap::Round => CpuCap::Round,
            kurbo::Cap::Square => CpuCap::Square,
        };
        stroke
    }
}

impl RasterSurface for VelloCpuSurface {
    fn fill(&mut self, color: Color) {
        self.ctx.set_paint(color);
        self.ctx.fill_rect(&Rect::new(
            0.0,
            0.0,
            f64::from(self.width),
            f64::from(self.height),
        ));
    }

    fn draw_path(&mut self, points: &[kurbo::Point], radius: f64, color: Color) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        self.ctx.set_paint(color);

        if rest.is_empty() {
            // A single sample paints a round dot; stroke expansion of a
            // zero-length segment is not well defined, so fill the disc directly.
            let dot = Circle::new((first.x, first.y), radius);
            self.ctx.fill_path(&dot.to_path(DOT_TOLERANCE));
            return;
        }

        let mut path = BezPath::new();
        path.move_to((first.x, first.y));
        for p in rest {
            path.line_to((p.x, p.y));
        }
        self.ctx.set_stroke(Self::stroke_to_cpu(&brush_stroke(radius)));
        self.ctx.stroke_path(&path);
    }

    fn draw_image(&mut self, image: ImageRef<'_>, dst: RectF, compose: Compose) {
        if image.width == 0 || image.height == 0 {
            return;
        }
        let dst_w = f64::from(dst.width());
        let dst_h = f64::from(dst.height());
        if dst_w.abs() < f64::EPSILON || dst_h.abs() < f64::EPSILON {
            return;
        }

        let data = Blob::from(image.pixels.to_vec());
        let image_data = ImageData {
            data,
            format: ImageFormat::Rgba8,
            alpha_type: ImageAlphaType::Alpha,
            width: image.width,
            height: image.height,
        };
        let source = ImageSource::from_peniko_image_data(&image_data);
        // Nearest-neighbor sampling: the filtered qualities round through
        // premultiplied u8 and are not pixel-exact under scaling.
        let image_paint = CpuImage {
            image: source,
            sampler: ImageSampler {
                quality: ImageQuality::Low,
                ..ImageSampler::default()
            },
        };

        // Map image pixel space onto the destination rect.
        let local = Affine::translate((f64::from(dst.x0), f64::from(dst.y0)))
            * Affine::scale_non_uniform(
                dst_w / f64::from(image.width),
                dst_h / f64::from(image.height),
            );

        // Non-default compose modes apply when the image layer lands on the
        // surface, so the whole draw goes through an offscreen layer.
        let blended = compose != Compose::SrcOver;
        if blended {
            self.ctx.push_layer(
                None,
                Some(BlendMode {
                    mix: Mix::Normal,
                    compose,
                }),
                None,
                None,
                None,
            );
        }

        // Clip to the destination so filtered sampling cannot bleed outside it.
        let mut dst_path = BezPath::new();
        dst_path.move_to((f64::from(dst.x0), f64::from(dst.y0)));
        dst_path.line_to((f64::from(dst.x1), f64::from(dst.y0)));
        dst_path.line_to((f64::from(dst.x1), f64::from(dst.y1)));
        dst_path.line_to((f64::from(dst.x0), f64::from(dst.y1)));
        dst_path.close_path();
        self.ctx.push_clip_layer(&dst_path);

        self.ctx.set_paint(image_paint);
        self.ctx.set_transform(Self::affine_to_cpu(local));
        self.ctx.fill_rect(&Rect::new(
            0.0,
            0.0,
            f64::from(image.width),
            f64::from(image.height),
        ));
        self.ctx.set_transform(CpuAffine::IDENTITY);

        self.ctx.pop_layer(); // pop clip
        if blended {
            self.ctx.pop_layer();
        }
    }

    fn into_buffer(mut self, layer: RasterLayer) -> RasterBuffer {
        let mut pixmap = Pixmap::new(self.width, self.height);
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut pixmap);

        let unpremul = pixmap.take_unpremultiplied();
        let mut bytes = Vec::with_capacity(unpremul.len() * 4);
        for p in unpremul {
            bytes.extend_from_slice(&[p.r, p.g, p.b, p.a]);
        }
        RasterBuffer::from_rgba8(u32::from(self.width), u32::from(self.height), layer, bytes)
    }
}

/// Provider of [`VelloCpuSurface`]s.
///
/// Acquisition fails (returns `None`) for zero-sized surfaces and for
/// dimensions beyond the `u16` range of the CPU renderer.
#[derive(Copy, Clone, Debug, Default)]
pub struct VelloCpuSurfaceProvider;

impl SurfaceProvider for VelloCpuSurfaceProvider {
    type Surface = VelloCpuSurface;

    fn acquire(&self, width: u32, height: u32) -> Option<VelloCpuSurface> {
        if width == 0 || height == 0 {
            return None;
        }
        let width = u16::try_from(width).ok()?;
        let height = u16::try_from(height).ok()?;
        Some(VelloCpuSurface::new(width, height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    fn acquire(width: u32, height: u32) -> VelloCpuSurface {
        VelloCpuSurfaceProvider
            .acquire(width, height)
            .expect("in-range surface dimensions")
    }

    #[test]
    fn provider_rejects_unrepresentable_dimensions() {
        let provider = VelloCpuSurfaceProvider;
        assert!(provider.acquire(0, 10).is_none());
        assert!(provider.acquire(10, 0).is_none());
        assert!(provider.acquire(u32::from(u16::MAX) + 1, 10).is_none());
        assert!(provider.acquire(16, 16).is_some());
    }

    #[test]
    fn fresh_surface_reads_back_transparent() {
        let buf = acquire(4, 4).into_buffer(RasterLayer::TransparentMask);
        assert!(buf.pixels().iter().all(|&b| b == 0));
    }

    #[test]
    fn fill_covers_every_pixel() {
        let mut surface = acquire(4, 4);
        surface.fill(Color::BLACK);
        let buf = surface.into_buffer(RasterLayer::BlackMask);
        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(buf.pixel(x, y), Some([0, 0, 0, 255]));
            }
        }
    }

    #[test]
    fn single_point_path_paints_a_dot() {
        let mut surface = acquire(32, 32);
        surface.fill(Color::BLACK);
        surface.draw_path(&[Point::new(16.0, 16.0)], 5.0, Color::WHITE);
        let buf = surface.into_buffer(RasterLayer::BlackMask);

        // Interior of the disc is solid white; well outside it stays black.
        assert_eq!(buf.pixel(16, 16), Some([255, 255, 255, 255]));
        assert_eq!(buf.pixel(16, 13), Some([255, 255, 255, 255]));
        assert_eq!(buf.pixel(2, 2), Some([0, 0, 0, 255]));
        assert_eq!(buf.pixel(16, 25), Some([0, 0, 0, 255]));
    }

    #[test]
    fn empty_path_paints_nothing() {
        let mut surface = acquire(8, 8);
        surface.draw_path(&[], 4.0, Color::WHITE);
        let buf = surface.into_buffer(RasterLayer::TransparentMask);
        assert!(buf.pixels().iter().all(|&b| b == 0));
    }

    #[test]
    fn draw_image_dest_in_keeps_only_masked_pixels() {
        // Left half of the mask is opaque, right half transparent.
        let mut mask = vec![0_u8; 8 * 8 * 4];
        for y in 0..8 {
            for x in 0..4 {
                let i = (y * 8 + x) * 4;
                mask[i..i + 4].copy_from_slice(&[255, 255, 255, 255]);
            }
        }

        let mut surface = acquire(8, 8);
        surface.fill(Color::from_rgba8(10, 200, 60, 255));
        surface.draw_image(
            ImageRef {
                width: 8,
                height: 8,
                pixels: &mask,
            },
            RectF::covering(8, 8),
            Compose::DestIn,
        );
        let buf = surface.into_buffer(RasterLayer::Composite);

        assert_eq!(buf.pixel(1, 4), Some([10, 200, 60, 255]));
        assert_eq!(buf.alpha(6, 4), Some(0));
    }

    #[test]
    fn draw_image_upscaling_is_pixel_exact() {
        let mut pixels = vec![0_u8; 4 * 4 * 4];
        for px in pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&[10, 200, 60, 255]);
        }

        let mut surface = acquire(8, 8);
        surface.draw_image(
            ImageRef {
                width: 4,
                height: 4,
                pixels: &pixels,
            },
            RectF::covering(8, 8),
            Compose::SrcOver,
        );
        let buf = surface.into_buffer(RasterLayer::Composite);

        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(
                    buf.pixel(x, y),
                    Some([10, 200, 60, 255]),
                    "scaled uniform image should read back exactly at ({x}, {y})"
                );
            }
        }
    }

    #[test]
    fn identical_draw_sequences_are_byte_identical() {
        let render = || {
            let mut surface = acquire(16, 16);
            surface.fill(Color::BLACK);
            surface.draw_path(
                &[Point::new(3.0, 3.0), Point::new(12.0, 11.0)],
                2.5,
                Color::WHITE,
            );
            surface.into_buffer(RasterLayer::BlackMask)
        };
        assert_eq!(render(), render());
    }
}
