//! Anti-aliased raster surface backed by a tiny-skia pixmap.

use std::io::Cursor;

use image::{ImageFormat, Rgba, RgbaImage};
use kurbo::{Affine, PathEl};
use resvg::tiny_skia::{
    self, FillRule, GradientStop, LinearGradient, Pixmap, RadialGradient, SpreadMode, Transform,
};
use resvg::usvg::{Options, Tree};

use super::svg::text_document;
use super::{LineCap, Paint, Shape, SizePx, StrokeStyle, Surface, TextRun, font_database};
use crate::color::Color;
use crate::error::RenderError;

/// A raster surface with an optional device scale.
///
/// # Example
///
/// ```
/// use figure_dresser::{Color, PixmapSurface, Shape, SizePx, Surface};
///
/// let mut surface = PixmapSurface::new(SizePx::new(10, 10), 2.0).unwrap();
/// surface.fill(&Shape::rect(0.0, 0.0, 10.0, 10.0), &Color::WHITE.into());
/// let image = surface.into_image();
/// assert_eq!(image.dimensions(), (20, 20));
/// assert_eq!(image.get_pixel(5, 5).0, [255, 255, 255, 255]);
/// ```
pub struct PixmapSurface {
    pixmap: Pixmap,
    logical: SizePx,
    current: Affine,
    stack: Vec<Affine>,
}

impl PixmapSurface {
    /// Creates a transparent surface of `logical` size drawn at `scale`.
    pub fn new(logical: SizePx, scale: f32) -> Result<Self, RenderError> {
        if logical.is_empty() || !(scale.is_finite() && scale > 0.0) {
            return Err(RenderError::SurfaceAlloc {
                width: logical.width,
                height: logical.height,
            });
        }
        let device = logical.scaled(scale);
        let pixmap = Pixmap::new(device.width, device.height).ok_or(RenderError::SurfaceAlloc {
            width: device.width,
            height: device.height,
        })?;
        Ok(Self {
            pixmap,
            logical,
            current: Affine::scale(f64::from(scale)),
            stack: Vec::new(),
        })
    }

    /// Converts the drawn pixels to a straight-alpha image.
    pub fn into_image(self) -> RgbaImage {
        pixmap_to_rgba_image(&self.pixmap)
    }

    /// Encodes the drawn pixels as PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>, image::ImageError> {
        encode_png(&pixmap_to_rgba_image(&self.pixmap))
    }

    fn paint_for(paint: &Paint) -> tiny_skia::Paint<'static> {
        let mut out = tiny_skia::Paint {
            anti_alias: true,
            ..tiny_skia::Paint::default()
        };
        let shader = match paint {
            Paint::Solid(_) => None,
            Paint::Linear { from, to, stops } => LinearGradient::new(
                skia_point(*from),
                skia_point(*to),
                gradient_stops(stops),
                SpreadMode::Pad,
                Transform::identity(),
            ),
            Paint::Radial {
                center,
                radius,
                stops,
            } => RadialGradient::new(
                skia_point(*center),
                skia_point(*center),
                *radius as f32,
                gradient_stops(stops),
                SpreadMode::Pad,
                Transform::identity(),
            ),
        };
        match shader {
            Some(shader) => out.shader = shader,
            None => {
                let c = paint.first_color();
                out.set_color_rgba8(c.r, c.g, c.b, c.a);
            }
        }
        out
    }
}

fn gradient_stops(stops: &[super::Stop]) -> Vec<GradientStop> {
    stops
        .iter()
        .map(|s| GradientStop::new(s.offset, skia_color(s.color)))
        .collect()
}

fn skia_color(c: Color) -> tiny_skia::Color {
    tiny_skia::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn skia_point(p: kurbo::Point) -> tiny_skia::Point {
    tiny_skia::Point::from_xy(p.x as f32, p.y as f32)
}

fn skia_transform(affine: Affine) -> Transform {
    let [a, b, c, d, e, f] = affine.as_coeffs().map(|v| v as f32);
    Transform::from_row(a, b, c, d, e, f)
}

fn skia_path(shape: &Shape) -> Option<tiny_skia::Path> {
    let mut pb = tiny_skia::PathBuilder::new();
    for &el in shape.to_bez_path().elements() {
        match el {
            PathEl::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(p1, p2) => {
                pb.quad_to(p1.x as f32, p1.y as f32, p2.x as f32, p2.y as f32)
            }
            PathEl::CurveTo(p1, p2, p3) => pb.cubic_to(
                p1.x as f32,
                p1.y as f32,
                p2.x as f32,
                p2.y as f32,
                p3.x as f32,
                p3.y as f32,
            ),
            PathEl::ClosePath => pb.close(),
        }
    }
    pb.finish()
}

impl Surface for PixmapSurface {
    fn size(&self) -> SizePx {
        self.logical
    }

    fn save(&mut self) {
        self.stack.push(self.current);
    }

    fn restore(&mut self) {
        if let Some(previous) = self.stack.pop() {
            self.current = previous;
        }
    }

    fn transform(&mut self, transform: Affine) {
        self.current *= transform;
    }

    fn fill(&mut self, shape: &Shape, paint: &Paint) {
        // Empty paths are skipped, degenerate ones are dropped by tiny-skia.
        let Some(path) = skia_path(shape) else {
            return;
        };
        let paint = Self::paint_for(paint);
        self.pixmap.fill_path(
            &path,
            &paint,
            FillRule::Winding,
            skia_transform(self.current),
            None,
        );
    }

    fn stroke(&mut self, shape: &Shape, paint: &Paint, style: StrokeStyle) {
        let Some(path) = skia_path(shape) else {
            return;
        };
        let paint = Self::paint_for(paint);
        let stroke = tiny_skia::Stroke {
            width: style.width as f32,
            line_cap: match style.cap {
                LineCap::Butt => tiny_skia::LineCap::Butt,
                LineCap::Round => tiny_skia::LineCap::Round,
            },
            line_join: tiny_skia::LineJoin::Round,
            ..tiny_skia::Stroke::default()
        };
        self.pixmap.stroke_path(
            &path,
            &paint,
            &stroke,
            skia_transform(self.current),
            None,
        );
    }

    fn text(&mut self, run: &TextRun) {
        let doc = text_document(self.logical, run);
        let opts = Options {
            fontdb: font_database(),
            ..Options::default()
        };
        match Tree::from_str(&doc, &opts) {
            Ok(tree) => resvg::render(
                &tree,
                skia_transform(self.current),
                &mut self.pixmap.as_mut(),
            ),
            Err(err) => tracing::warn!(%err, text = %run.text, "skipping unparseable text run"),
        }
    }
}

// ============================================================================
// Pixel helpers
// ============================================================================

/// Converts a tiny-skia pixmap to a straight-alpha `RgbaImage`.
pub fn pixmap_to_rgba_image(pixmap: &Pixmap) -> RgbaImage {
    let mut img = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in img.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    img
}

pub(crate) fn encode_png(img: &RgbaImage) -> Result<Vec<u8>, image::ImageError> {
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Stop;

    fn surface(w: u32, h: u32) -> PixmapSurface {
        PixmapSurface::new(SizePx::new(w, h), 1.0).unwrap()
    }

    #[test]
    fn zero_sized_surface_is_an_error() {
        assert!(matches!(
            PixmapSurface::new(SizePx::new(0, 10), 1.0),
            Err(RenderError::SurfaceAlloc { .. })
        ));
        assert!(PixmapSurface::new(SizePx::new(10, 10), 0.0).is_err());
    }

    #[test]
    fn transform_stack_restores() {
        let mut s = surface(20, 20);
        s.save();
        s.transform(Affine::translate((10.0, 10.0)));
        s.fill(&Shape::rect(0.0, 0.0, 5.0, 5.0), &Color::WHITE.into());
        s.restore();
        s.fill(&Shape::rect(0.0, 0.0, 2.0, 2.0), &Color::BLACK.into());

        let img = s.into_image();
        assert_eq!(img.get_pixel(12, 12).0, [255, 255, 255, 255]);
        assert_eq!(img.get_pixel(1, 1).0, [0, 0, 0, 255]);
        assert_eq!(img.get_pixel(6, 6)[3], 0);
    }

    #[test]
    fn linear_gradient_varies_across_the_shape() {
        let mut s = surface(20, 4);
        let paint = Paint::Linear {
            from: kurbo::Point::new(0.0, 0.0),
            to: kurbo::Point::new(20.0, 0.0),
            stops: vec![Stop::new(0.0, Color::BLACK), Stop::new(1.0, Color::WHITE)],
        };
        s.fill(&Shape::rect(0.0, 0.0, 20.0, 4.0), &paint);
        let img = s.into_image();
        assert!(img.get_pixel(1, 2)[0] < img.get_pixel(18, 2)[0]);
    }

    #[test]
    fn degenerate_shapes_are_ignored() {
        let mut s = surface(4, 4);
        s.fill(&Shape::rect(1.0, 1.0, 0.0, 0.0), &Color::WHITE.into());
        s.fill(&Shape::circle(2.0, 2.0, 0.0), &Color::WHITE.into());
        assert!(s.into_image().pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn png_encoding_has_signature() {
        let png = surface(2, 2).encode_png().unwrap();
        assert_eq!(&png[1..4], b"PNG");
    }

    #[test]
    fn translucent_fill_comes_out_straight_alpha() {
        let mut s = surface(6, 6);
        let skin = Color::from_hex("#efc1a0").unwrap();
        s.fill(&Shape::rect(0.0, 0.0, 6.0, 6.0), &skin.alpha(0.5).into());
        let px = s.into_image().get_pixel(3, 3).0;
        assert_eq!(px[3], 128);
        for (got, want) in px[..3].iter().zip([skin.r, skin.g, skin.b]) {
            assert!(got.abs_diff(want) <= 2, "{px:?}");
        }
    }

    #[test]
    fn scale_applies_before_layer_transforms() {
        let mut s = PixmapSurface::new(SizePx::new(10, 10), 2.0).unwrap();
        s.transform(Affine::translate((5.0, 0.0)));
        s.fill(&Shape::rect(0.0, 0.0, 2.0, 2.0), &Color::WHITE.into());
        let img = s.into_image();
        assert_eq!(img.get_pixel(11, 1)[3], 255);
        assert_eq!(img.get_pixel(8, 1)[3], 0);
    }
}
