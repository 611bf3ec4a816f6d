//! Drawing surfaces the layer renderer paints onto.
//!
//! The renderer only speaks to the [`Surface`] trait, so the same draw
//! routines feed the on-screen raster preview ([`PixmapSurface`]), the
//! vector export path ([`SvgSurface`]) and tests ([`Recorder`]).
//!
//! Coordinates are logical pixels. A surface may map them to device pixels
//! with a fixed scale (e.g. 2× for export).

mod raster;
mod svg;

use std::sync::{Arc, OnceLock};

pub use kurbo::{Affine, BezPath, Point, Vec2};
pub use raster::{PixmapSurface, pixmap_to_rgba_image};
pub(crate) use raster::encode_png;
pub use svg::{HIDE_ON_TRANSPARENT, SvgSurface, rasterize_svg};

use kurbo::Shape as _;
use resvg::usvg::fontdb;

use crate::color::Color;
use crate::layer::Slot;

/// Flattening tolerance for curves, in logical pixels.
pub const TOLERANCE: f64 = 0.1;

// ============================================================================
// Geometry
// ============================================================================

/// A 2D size in pixel units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SizePx {
    pub width: u32,
    pub height: u32,
}

impl SizePx {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// The device size of this logical size at `scale`, at least 1×1.
    pub fn scaled(self, scale: f32) -> SizePx {
        let dim = |v: u32| ((v as f32 * scale).round() as u32).max(1);
        SizePx::new(dim(self.width), dim(self.height))
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// A fillable or strokable outline in the current coordinate space.
///
/// Each variant wraps the matching `kurbo` primitive, so backends can keep
/// rectangles and ellipses as native elements and flatten everything else
/// through [`Shape::to_bez_path`].
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Rect(kurbo::Rect),
    /// Corner radii are clamped to half the shorter side on construction.
    RoundRect(kurbo::RoundedRect),
    Circle(kurbo::Circle),
    Ellipse(kurbo::Ellipse),
    /// An open elliptical arc, never closed back to its center.
    Arc(kurbo::Arc),
    Path(BezPath),
}

impl Shape {
    /// Axis-aligned rectangle from its top-left corner and size.
    pub fn rect(x: f64, y: f64, w: f64, h: f64) -> Self {
        Shape::Rect(kurbo::Rect::from_origin_size((x, y), (w, h)))
    }

    /// Rectangle with all four corners rounded by `r`.
    pub fn round_rect(x: f64, y: f64, w: f64, h: f64, r: f64) -> Self {
        Shape::RoundRect(kurbo::RoundedRect::from_origin_size((x, y), (w, h), r))
    }

    pub fn circle(cx: f64, cy: f64, r: f64) -> Self {
        Shape::Circle(kurbo::Circle::new((cx, cy), r))
    }

    pub fn ellipse(cx: f64, cy: f64, rx: f64, ry: f64) -> Self {
        Shape::Ellipse(kurbo::Ellipse::new((cx, cy), (rx, ry), 0.0))
    }

    /// Circular arc from angle `start` to `end`, in radians measured
    /// clockwise from +x in y-down space.
    pub fn arc(cx: f64, cy: f64, r: f64, start: f64, end: f64) -> Self {
        Shape::Arc(kurbo::Arc::new((cx, cy), (r, r), start, end - start, 0.0))
    }

    /// Closed polygon through `points`; empty input gives an empty path.
    pub fn polygon(points: &[(f64, f64)]) -> Self {
        let mut path = BezPath::new();
        if let Some((&first, rest)) = points.split_first() {
            path.move_to(first);
            for &p in rest {
                path.line_to(p);
            }
            path.close_path();
        }
        Shape::Path(path)
    }

    /// The outline as Bézier segments.
    pub fn to_bez_path(&self) -> BezPath {
        match self {
            Shape::Rect(r) => r.to_path(TOLERANCE),
            Shape::RoundRect(r) => r.to_path(TOLERANCE),
            Shape::Circle(c) => c.to_path(TOLERANCE),
            Shape::Ellipse(e) => {
                // kurbo sweeps ellipses as an open full-turn arc
                let mut path = e.to_path(TOLERANCE);
                path.close_path();
                path
            }
            Shape::Arc(a) => a.to_path(TOLERANCE),
            Shape::Path(p) => p.clone(),
        }
    }

    /// Smallest rectangle containing the outline.
    pub fn bounding_box(&self) -> kurbo::Rect {
        match self {
            Shape::Rect(r) => r.bounding_box(),
            Shape::RoundRect(r) => r.bounding_box(),
            Shape::Circle(c) => c.bounding_box(),
            Shape::Ellipse(e) => e.bounding_box(),
            Shape::Arc(a) => a.bounding_box(),
            Shape::Path(p) => p.bounding_box(),
        }
    }
}

impl From<BezPath> for Shape {
    fn from(path: BezPath) -> Self {
        Shape::Path(path)
    }
}

// ============================================================================
// Paint
// ============================================================================

/// A gradient color stop; `offset` in 0.0-1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stop {
    pub offset: f32,
    pub color: Color,
}

impl Stop {
    pub fn new(offset: f32, color: Color) -> Self {
        Self { offset, color }
    }
}

/// How a shape is colored.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(Color),
    Linear {
        from: Point,
        to: Point,
        stops: Vec<Stop>,
    },
    Radial {
        center: Point,
        radius: f64,
        stops: Vec<Stop>,
    },
}

impl Paint {
    /// The color used where a gradient cannot be built.
    pub fn first_color(&self) -> Color {
        match self {
            Paint::Solid(color) => *color,
            Paint::Linear { stops, .. } | Paint::Radial { stops, .. } => {
                stops.first().map(|s| s.color).unwrap_or(Color::TRANSPARENT)
            }
        }
    }
}

impl From<Color> for Paint {
    fn from(color: Color) -> Self {
        Paint::Solid(color)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
}

/// Stroke parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub width: f64,
    pub cap: LineCap,
}

impl StrokeStyle {
    pub fn new(width: f64) -> Self {
        Self {
            width,
            cap: LineCap::Butt,
        }
    }

    /// A stroke with round caps, for open strokes such as brows and mouths.
    pub fn round(width: f64) -> Self {
        Self {
            width,
            cap: LineCap::Round,
        }
    }
}

// ============================================================================
// Text
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAnchor {
    Start,
    #[default]
    Middle,
    End,
}

impl TextAnchor {
    pub fn as_svg(self) -> &'static str {
        match self {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
            TextAnchor::End => "end",
        }
    }
}

/// A single line of text positioned at its baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub weight: u16,
    pub anchor: TextAnchor,
    pub color: Color,
}

/// Shared font database, loaded from the system once per process.
pub(crate) fn font_database() -> Arc<fontdb::Database> {
    static FONTS: OnceLock<Arc<fontdb::Database>> = OnceLock::new();
    FONTS
        .get_or_init(|| {
            let mut db = fontdb::Database::new();
            db.load_system_fonts();
            tracing::debug!(faces = db.len(), "loaded system fonts");
            Arc::new(db)
        })
        .clone()
}

// ============================================================================
// Surface
// ============================================================================

/// A 2D drawing target with a transform stack.
pub trait Surface {
    /// The logical size of the surface.
    fn size(&self) -> SizePx;

    /// Marks the start of a render-plan slot.
    fn begin_layer(&mut self, _slot: Slot) {}

    /// Marks the end of the most recently begun slot.
    fn end_layer(&mut self) {}

    fn save(&mut self);
    fn restore(&mut self);

    /// Pre-concatenates `transform` onto the current matrix, so it applies to
    /// coordinates before any transform already in effect.
    fn transform(&mut self, transform: Affine);

    fn fill(&mut self, shape: &Shape, paint: &Paint);
    fn stroke(&mut self, shape: &Shape, paint: &Paint, style: StrokeStyle);
    fn text(&mut self, run: &TextRun);
}

/// One recorded surface call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    BeginLayer(Slot),
    EndLayer,
    Save,
    Restore,
    Transform(Affine),
    Fill(Shape, Paint),
    Stroke(Shape, Paint, StrokeStyle),
    Text(TextRun),
}

/// A surface that keeps a display list instead of pixels.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    size: SizePx,
    commands: Vec<DrawCommand>,
}

impl Recorder {
    pub fn new(size: SizePx) -> Self {
        Self {
            size,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Slots in the order their layers were begun.
    pub fn layers(&self) -> Vec<Slot> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::BeginLayer(slot) => Some(*slot),
                _ => None,
            })
            .collect()
    }

    /// Commands drawn between the begin and end markers of `slot`.
    pub fn layer_commands(&self, slot: Slot) -> &[DrawCommand] {
        let Some(start) = self
            .commands
            .iter()
            .position(|c| *c == DrawCommand::BeginLayer(slot))
        else {
            return &[];
        };
        let body = &self.commands[start + 1..];
        let end = body
            .iter()
            .position(|c| *c == DrawCommand::EndLayer)
            .unwrap_or(body.len());
        &body[..end]
    }

    /// Number of fill, stroke and text commands.
    pub fn paint_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| {
                matches!(
                    c,
                    DrawCommand::Fill(..) | DrawCommand::Stroke(..) | DrawCommand::Text(_)
                )
            })
            .count()
    }
}

impl Surface for Recorder {
    fn size(&self) -> SizePx {
        self.size
    }

    fn begin_layer(&mut self, slot: Slot) {
        self.commands.push(DrawCommand::BeginLayer(slot));
    }

    fn end_layer(&mut self) {
        self.commands.push(DrawCommand::EndLayer);
    }

    fn save(&mut self) {
        self.commands.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        self.commands.push(DrawCommand::Restore);
    }

    fn transform(&mut self, transform: Affine) {
        self.commands.push(DrawCommand::Transform(transform));
    }

    fn fill(&mut self, shape: &Shape, paint: &Paint) {
        self.commands
            .push(DrawCommand::Fill(shape.clone(), paint.clone()));
    }

    fn stroke(&mut self, shape: &Shape, paint: &Paint, style: StrokeStyle) {
        self.commands
            .push(DrawCommand::Stroke(shape.clone(), paint.clone(), style));
    }

    fn text(&mut self, run: &TextRun) {
        self.commands.push(DrawCommand::Text(run.clone()));
    }
}
