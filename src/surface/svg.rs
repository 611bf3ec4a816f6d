//! Vector surface that serializes draw calls into an SVG document.

use std::fmt::Write as _;

use image::RgbaImage;
use kurbo::Affine;
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{Options, Tree};

use super::raster::pixmap_to_rgba_image;
use super::{LineCap, Paint, Shape, SizePx, Stop, StrokeStyle, Surface, TextRun, font_database};
use crate::color::Color;
use crate::error::{ExportError, RenderError};
use crate::layer::Slot;

/// Attribute value marking groups that transparent exports leave out.
pub const HIDE_ON_TRANSPARENT: &str = "hide-on-transparent";

/// Builds an SVG document from surface calls.
///
/// Every render-plan slot becomes a `<g data-layer="...">` group; decorative
/// slots additionally carry `data-export="hide-on-transparent"`.
pub struct SvgSurface {
    size: SizePx,
    defs: String,
    body: String,
    /// Transform groups opened since the last save or layer start.
    open: usize,
    /// Saved `open` counts; `true` marks a layer group.
    frames: Vec<(usize, bool)>,
    next_gradient: usize,
}

impl SvgSurface {
    pub fn new(size: SizePx) -> Self {
        Self {
            size,
            defs: String::new(),
            body: String::new(),
            open: 0,
            frames: Vec::new(),
            next_gradient: 0,
        }
    }

    /// Closes any open groups and returns the complete document.
    pub fn finish(mut self) -> String {
        self.close_groups();
        while let Some((open, layer)) = self.frames.pop() {
            if layer {
                self.body.push_str("</g>");
            }
            self.open = open;
            self.close_groups();
        }

        let (w, h) = (self.size.width, self.size.height);
        let mut doc = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
        );
        if !self.defs.is_empty() {
            let _ = write!(doc, "<defs>{}</defs>", self.defs);
        }
        doc.push_str(&self.body);
        doc.push_str("</svg>");
        doc
    }

    fn close_groups(&mut self) {
        for _ in 0..self.open {
            self.body.push_str("</g>");
        }
        self.open = 0;
    }

    fn gradient_def(&mut self, paint: &Paint) -> Option<String> {
        let id = format!("g{}", self.next_gradient);
        match paint {
            Paint::Solid(_) => return None,
            Paint::Linear { from, to, stops } => {
                let _ = write!(
                    self.defs,
                    r#"<linearGradient id="{id}" gradientUnits="userSpaceOnUse" x1="{}" y1="{}" x2="{}" y2="{}">{}</linearGradient>"#,
                    num(from.x),
                    num(from.y),
                    num(to.x),
                    num(to.y),
                    stop_elements(stops)
                );
            }
            Paint::Radial {
                center,
                radius,
                stops,
            } => {
                let _ = write!(
                    self.defs,
                    r#"<radialGradient id="{id}" gradientUnits="userSpaceOnUse" cx="{}" cy="{}" r="{}">{}</radialGradient>"#,
                    num(center.x),
                    num(center.y),
                    num(*radius),
                    stop_elements(stops)
                );
            }
        }
        self.next_gradient += 1;
        Some(id)
    }

    /// `fill`/`stroke` attribute text for a paint.
    fn paint_attrs(&mut self, attr: &str, paint: &Paint) -> String {
        match self.gradient_def(paint) {
            Some(id) => format!(r#"{attr}="url(#{id})""#),
            None => color_attrs(attr, paint.first_color()),
        }
    }

    fn push_shape(&mut self, shape: &Shape, attrs: &str) {
        let _ = match shape {
            Shape::Rect(r) => write!(
                self.body,
                r#"<rect x="{}" y="{}" width="{}" height="{}" {attrs}/>"#,
                num(r.x0),
                num(r.y0),
                num(r.width()),
                num(r.height())
            ),
            Shape::RoundRect(rr) => {
                let r = rr.rect();
                write!(
                    self.body,
                    r#"<rect x="{}" y="{}" width="{}" height="{}" rx="{}" {attrs}/>"#,
                    num(r.x0),
                    num(r.y0),
                    num(r.width()),
                    num(r.height()),
                    num(rr.radii().top_left)
                )
            }
            Shape::Circle(c) => write!(
                self.body,
                r#"<circle cx="{}" cy="{}" r="{}" {attrs}/>"#,
                num(c.center.x),
                num(c.center.y),
                num(c.radius)
            ),
            Shape::Ellipse(e) => {
                let (center, radii) = (e.center(), e.radii());
                write!(
                    self.body,
                    r#"<ellipse cx="{}" cy="{}" rx="{}" ry="{}" {attrs}/>"#,
                    num(center.x),
                    num(center.y),
                    num(radii.x),
                    num(radii.y)
                )
            }
            Shape::Arc(_) | Shape::Path(_) => write!(
                self.body,
                r#"<path d="{}" {attrs}/>"#,
                shape.to_bez_path().to_svg()
            ),
        };
    }
}

/// Formats a coordinate with at most three decimals.
fn num(v: f64) -> String {
    let rounded = (v * 1000.0).round() / 1000.0;
    if rounded == 0.0 {
        "0".to_string()
    } else {
        format!("{rounded}")
    }
}

fn color_attrs(attr: &str, color: Color) -> String {
    if color.a == 255 {
        format!(r#"{attr}="{}""#, color.to_hex())
    } else {
        format!(
            r#"{attr}="{}" {attr}-opacity="{}""#,
            color.to_hex(),
            num(f64::from(color.opacity()))
        )
    }
}

fn stop_elements(stops: &[Stop]) -> String {
    let mut out = String::new();
    for stop in stops {
        let _ = write!(
            out,
            r#"<stop offset="{}" stop-color="{}" stop-opacity="{}"/>"#,
            num(f64::from(stop.offset)),
            stop.color.to_hex(),
            num(f64::from(stop.color.opacity()))
        );
    }
    out
}

impl Surface for SvgSurface {
    fn size(&self) -> SizePx {
        self.size
    }

    fn begin_layer(&mut self, slot: Slot) {
        let marker = if slot.is_decorative() {
            format!(r#" data-export="{HIDE_ON_TRANSPARENT}""#)
        } else {
            String::new()
        };
        let _ = write!(self.body, r#"<g data-layer="{}"{marker}>"#, slot.name());
        self.frames.push((self.open, true));
        self.open = 0;
    }

    fn end_layer(&mut self) {
        self.close_groups();
        self.body.push_str("</g>");
        self.open = self.frames.pop().map_or(0, |(open, _)| open);
    }

    fn save(&mut self) {
        self.frames.push((self.open, false));
        self.open = 0;
    }

    fn restore(&mut self) {
        self.close_groups();
        self.open = self.frames.pop().map_or(0, |(open, _)| open);
    }

    fn transform(&mut self, t: Affine) {
        let [a, b, c, d, e, f] = t.as_coeffs().map(num);
        let _ = write!(
            self.body,
            r#"<g transform="matrix({a} {b} {c} {d} {e} {f})">"#
        );
        self.open += 1;
    }

    fn fill(&mut self, shape: &Shape, paint: &Paint) {
        let attrs = self.paint_attrs("fill", paint);
        self.push_shape(shape, &attrs);
    }

    fn stroke(&mut self, shape: &Shape, paint: &Paint, style: StrokeStyle) {
        let cap = match style.cap {
            LineCap::Butt => "butt",
            LineCap::Round => "round",
        };
        let attrs = format!(
            r#"fill="none" {} stroke-width="{}" stroke-linecap="{cap}" stroke-linejoin="round""#,
            self.paint_attrs("stroke", paint),
            num(style.width)
        );
        self.push_shape(shape, &attrs);
    }

    fn text(&mut self, run: &TextRun) {
        self.body.push_str(&text_element(run));
    }
}

/// A `<text>` element for one run.
pub(crate) fn text_element(run: &TextRun) -> String {
    format!(
        r#"<text x="{}" y="{}" font-family="sans-serif" font-size="{}" font-weight="{}" text-anchor="{}" {}>{}</text>"#,
        num(run.x),
        num(run.y),
        num(run.size),
        run.weight,
        run.anchor.as_svg(),
        color_attrs("fill", run.color),
        escape_xml(&run.text)
    )
}

/// A standalone document holding a single text run.
pub(crate) fn text_document(size: SizePx, run: &TextRun) -> String {
    let (w, h) = (size.width.max(1), size.height.max(1));
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">{}</svg>"#,
        text_element(run)
    )
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Parses an SVG document and rasterizes it at `scale`.
pub fn rasterize_svg(svg: &str, scale: f32) -> Result<RgbaImage, ExportError> {
    let opts = Options {
        fontdb: font_database(),
        ..Options::default()
    };
    let tree = Tree::from_str(svg, &opts).map_err(|e| ExportError::SvgDecode(e.to_string()))?;

    let size = tree.size();
    let width = (size.width() * scale).round() as u32;
    let height = (size.height() * scale).round() as u32;
    let mut pixmap =
        Pixmap::new(width, height).ok_or(RenderError::SurfaceAlloc { width, height })?;
    resvg::render(
        &tree,
        Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );
    Ok(pixmap_to_rgba_image(&pixmap))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::TextAnchor;

    #[test]
    fn layers_and_transforms_are_balanced() {
        let mut svg = SvgSurface::new(SizePx::new(10, 10));
        svg.begin_layer(Slot::Background);
        svg.transform(Affine::translate((1.0, 2.0)));
        svg.fill(&Shape::rect(0.0, 0.0, 2.0, 2.0), &Color::WHITE.into());
        svg.end_layer();
        svg.begin_layer(Slot::Head);
        svg.save();
        svg.transform(Affine::scale(2.0));
        svg.restore();
        svg.end_layer();
        let doc = svg.finish();

        assert_eq!(doc.matches("<g").count(), doc.matches("</g>").count());
        assert!(doc.contains(r#"data-layer="background" data-export="hide-on-transparent""#));
        assert!(doc.contains(r#"<g data-layer="head">"#));
        assert!(doc.contains("matrix(1 0 0 1 1 2)"));
    }

    #[test]
    fn unclosed_groups_are_closed_on_finish() {
        let mut svg = SvgSurface::new(SizePx::new(4, 4));
        svg.begin_layer(Slot::Torso);
        svg.save();
        svg.transform(Affine::translate((1.0, 0.0)));
        let doc = svg.finish();
        assert_eq!(doc.matches("<g").count(), doc.matches("</g>").count());
    }

    #[test]
    fn gradients_go_into_defs() {
        let mut svg = SvgSurface::new(SizePx::new(4, 4));
        let paint = Paint::Radial {
            center: kurbo::Point::new(2.0, 2.0),
            radius: 2.0,
            stops: vec![
                Stop::new(0.0, Color::WHITE),
                Stop::new(1.0, Color::TRANSPARENT),
            ],
        };
        svg.fill(&Shape::circle(2.0, 2.0, 2.0), &paint);
        let doc = svg.finish();
        assert!(doc.contains(r#"<defs><radialGradient id="g0""#));
        assert!(doc.contains(r##"fill="url(#g0)""##));
    }

    #[test]
    fn rounded_corners_never_exceed_half_the_height() {
        let mut svg = SvgSurface::new(SizePx::new(80, 20));
        svg.fill(&Shape::round_rect(26.0, 4.0, 34.0, 10.0, 6.0), &Color::BLACK.into());
        let doc = svg.finish();
        assert!(doc.contains(r#"<rect x="26" y="4" width="34" height="10" rx="5""#), "{doc}");
    }

    #[test]
    fn arcs_are_written_as_path_data() {
        let mut svg = SvgSurface::new(SizePx::new(40, 40));
        let mouth = Shape::arc(20.0, 20.0, 12.0, 0.1 * std::f64::consts::PI, 0.9 * std::f64::consts::PI);
        svg.stroke(&mouth, &Color::BLACK.into(), StrokeStyle::round(3.0));
        let doc = svg.finish();
        assert!(doc.contains(r#"<path d="M"#));
        assert!(doc.contains(r#"stroke-linecap="round""#));
        assert!(!doc.contains("Z\""));
    }

    #[test]
    fn text_is_escaped() {
        let run = TextRun {
            text: "A&B <x>".into(),
            x: 1.0,
            y: 2.0,
            size: 10.0,
            weight: 700,
            anchor: TextAnchor::Start,
            color: Color::WHITE.alpha(0.5),
        };
        let el = text_element(&run);
        assert!(el.contains("A&amp;B &lt;x&gt;"));
        assert!(el.contains(r#"fill-opacity="0.502""#));
    }

    #[test]
    fn rasterize_scales_the_document() {
        let mut svg = SvgSurface::new(SizePx::new(8, 6));
        svg.fill(&Shape::rect(0.0, 0.0, 8.0, 6.0), &Color::rgb(255, 0, 0).into());
        let img = rasterize_svg(&svg.finish(), 2.0).unwrap();
        assert_eq!(img.dimensions(), (16, 12));
        assert_eq!(img.get_pixel(8, 6).0, [255, 0, 0, 255]);
    }

    #[test]
    fn malformed_svg_is_a_decode_error() {
        assert!(matches!(
            rasterize_svg("<svg", 1.0),
            Err(ExportError::SvgDecode(_))
        ));
    }
}
