//! Head, hair and face.

use std::f64::consts::{PI, TAU};

use kurbo::BezPath;

use super::{Companions, fill, fill_outlined, highlight, line, shade, stroke_round};
use crate::catalog::CatalogEntry;
use crate::color::{Color, FALLBACK_COLOR};
use crate::surface::{Shape, Surface};

const EYE_COLOR: Color = Color::rgb(0x11, 0x18, 0x27);
const BROW_COLOR: Color = Color::rgb(0x22, 0x1b, 0x1b);
const MOUTH_COLOR: Color = Color::rgb(0x8b, 0x1d, 0x2c);
/// Horizontal distance of each eye from the face center.
pub(crate) const EYE_OFFSET: f64 = 22.0;

/// Head silhouettes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BaseShape {
    #[default]
    Round,
    Square,
    Slim,
}

impl BaseShape {
    pub fn of(entry: &CatalogEntry) -> Self {
        match entry.kind() {
            "round" => Self::Round,
            "square" => Self::Square,
            "slim" => Self::Slim,
            _ => Self::default(),
        }
    }

    /// Top of the head, where hair starts.
    fn crown_y(self) -> f64 {
        match self {
            BaseShape::Round => -176.0,
            BaseShape::Square | BaseShape::Slim => -188.0,
        }
    }

    fn eye_y(self) -> f64 {
        match self {
            BaseShape::Round => -125.0,
            BaseShape::Square | BaseShape::Slim => -118.0,
        }
    }
}

/// Hairstyles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HairKind {
    #[default]
    Short,
    None,
    Side,
    Curly,
    Long,
    Spike,
}

impl HairKind {
    pub fn of(entry: &CatalogEntry) -> Self {
        match entry.kind() {
            "short" => Self::Short,
            "none" => Self::None,
            "side" => Self::Side,
            "curly" => Self::Curly,
            "long" => Self::Long,
            "spike" => Self::Spike,
            _ => Self::default(),
        }
    }
}

pub fn draw_head<S: Surface + ?Sized>(s: &mut S, base: &CatalogEntry, companions: &Companions) {
    let shape = match BaseShape::of(base) {
        BaseShape::Round => Shape::circle(0.0, -120.0, 62.0),
        BaseShape::Square => Shape::round_rect(-58.0, -180.0, 116.0, 120.0, 18.0),
        BaseShape::Slim => Shape::round_rect(-52.0, -184.0, 104.0, 128.0, 30.0),
    };
    fill_outlined(s, shape, companions.skin, shade(0.16), 2.0);
}

/// Hair sits on the crown, which depends on the head shape.
pub fn draw_hair<S: Surface + ?Sized>(s: &mut S, hair: &CatalogEntry, base: &CatalogEntry) {
    let color = hair.color_or("color", FALLBACK_COLOR);
    let outline = shade(0.15);
    let top = BaseShape::of(base).crown_y();

    match HairKind::of(hair) {
        HairKind::None => {}
        HairKind::Short => {
            fill_outlined(s, Shape::round_rect(-52.0, top, 104.0, 34.0, 18.0), color, outline, 1.5);
        }
        HairKind::Side => {
            fill_outlined(
                s,
                Shape::round_rect(-54.0, top + 4.0, 108.0, 30.0, 16.0),
                color,
                outline,
                1.5,
            );
            fill(
                s,
                Shape::polygon(&[
                    (-10.0, top + 4.0),
                    (50.0, top + 10.0),
                    (50.0, top + 30.0),
                    (-4.0, top + 22.0),
                ]),
                color,
            );
        }
        HairKind::Curly => {
            for i in -4i32..=4 {
                let dy = if i.abs() % 2 == 1 { 4.0 } else { 0.0 };
                fill(s, Shape::circle(f64::from(i) * 12.0, top + 18.0 + dy, 14.0), color);
            }
            fill(s, Shape::rect(-56.0, top + 18.0, 112.0, 18.0), color);
        }
        HairKind::Long => {
            fill_outlined(s, Shape::round_rect(-50.0, top, 100.0, 30.0, 16.0), color, outline, 1.5);
            fill(s, Shape::rect(-52.0, top + 16.0, 18.0, 78.0), color);
            fill(s, Shape::rect(34.0, top + 16.0, 18.0, 78.0), color);
        }
        HairKind::Spike => {
            let mut path = BezPath::new();
            path.move_to((-56.0, top + 30.0));
            for i in 0..8 {
                let x = -56.0 + f64::from(i) * 14.0;
                let peak = if i % 2 == 0 { 8.0 } else { 22.0 };
                path.line_to((x + 7.0, top - peak));
                path.line_to((x + 14.0, top + 30.0));
            }
            path.close_path();
            fill(s, Shape::Path(path), color);
        }
    }
}

/// Eye styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EyeKind {
    #[default]
    Oval,
    Wide,
    Sleepy,
    Spark,
}

impl EyeKind {
    pub fn of(entry: &CatalogEntry) -> Self {
        match entry.kind() {
            "oval" => Self::Oval,
            "wide" => Self::Wide,
            "sleepy" => Self::Sleepy,
            "spark" => Self::Spark,
            _ => Self::default(),
        }
    }
}

/// Brow styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BrowKind {
    #[default]
    Soft,
    Angled,
    Flat,
    None,
}

impl BrowKind {
    pub fn of(entry: &CatalogEntry) -> Self {
        match entry.kind() {
            "soft" => Self::Soft,
            "angled" => Self::Angled,
            "flat" => Self::Flat,
            "none" => Self::None,
            _ => Self::default(),
        }
    }
}

/// Mouth styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MouthKind {
    #[default]
    Smile,
    Grin,
    Ooh,
    Line,
}

impl MouthKind {
    pub fn of(entry: &CatalogEntry) -> Self {
        match entry.kind() {
            "smile" => Self::Smile,
            "grin" => Self::Grin,
            "ooh" => Self::Ooh,
            "line" => Self::Line,
            _ => Self::default(),
        }
    }
}

/// Where the face parts sit for a head shape and eye spacing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct FaceLayout {
    /// Eye centers are at `(±dx, eye_y)`.
    pub dx: f64,
    pub eye_y: f64,
}

impl FaceLayout {
    pub fn new(base: &CatalogEntry, eye_spacing: f64) -> Self {
        Self {
            dx: EYE_OFFSET + eye_spacing,
            eye_y: BaseShape::of(base).eye_y(),
        }
    }

    fn eyes(self) -> [f64; 2] {
        [-self.dx, self.dx]
    }

    fn brow_y(self) -> f64 {
        self.eye_y - 19.0
    }

    fn mouth_y(self) -> f64 {
        self.eye_y + 36.0
    }
}

/// A star with `points` tips around `(cx, cy)`.
fn star(cx: f64, cy: f64, outer: f64, inner: f64, points: usize) -> Shape {
    let corners: Vec<(f64, f64)> = (0..points * 2)
        .map(|i| {
            let r = if i % 2 == 0 { outer } else { inner };
            let a = i as f64 * TAU / (points * 2) as f64 - PI / 2.0;
            (cx + r * a.cos(), cy + r * a.sin())
        })
        .collect();
    Shape::polygon(&corners)
}

/// A quadratic stroke from `(x0, y0)` through control `(cx, cy)` to `(x1, y1)`.
fn curve(x0: f64, y0: f64, cx: f64, cy: f64, x1: f64, y1: f64) -> Shape {
    let mut path = BezPath::new();
    path.move_to((x0, y0));
    path.quad_to((cx, cy), (x1, y1));
    Shape::Path(path)
}

pub(crate) fn draw_eyes<S: Surface + ?Sized>(s: &mut S, eyes: &CatalogEntry, face: FaceLayout) {
    let color = eyes.color_or("color", EYE_COLOR);
    let y = face.eye_y;
    for x in face.eyes() {
        match EyeKind::of(eyes) {
            EyeKind::Oval => fill(s, Shape::ellipse(x, y, 8.0, 9.0), color),
            EyeKind::Wide => {
                fill(s, Shape::ellipse(x, y, 10.0, 9.0), color);
                fill(s, Shape::circle(x + 3.0, y - 3.0, 2.5), highlight(1.0));
            }
            EyeKind::Sleepy => {
                stroke_round(s, curve(x - 12.0, y, x, y - 9.0, x + 12.0, y), color, 5.0)
            }
            EyeKind::Spark => fill(s, star(x, y, 11.0, 4.0, 4), color),
        }
    }
}

pub(crate) fn draw_brows<S: Surface + ?Sized>(s: &mut S, brows: &CatalogEntry, face: FaceLayout) {
    let color = brows.color_or("color", BROW_COLOR);
    let y = face.brow_y();
    for (x, side) in face.eyes().into_iter().zip([-1.0, 1.0]) {
        let outer = x + side * 12.0;
        let inner = x - side * 12.0;
        let shape = match BrowKind::of(brows) {
            BrowKind::None => return,
            BrowKind::Soft => curve(outer, y + 2.0, x, y - 5.0, inner, y),
            BrowKind::Angled => line(outer, y + 3.0, inner, y - 4.0),
            BrowKind::Flat => line(outer, y, inner, y),
        };
        stroke_round(s, shape, color, 4.0);
    }
}

pub(crate) fn draw_mouth<S: Surface + ?Sized>(s: &mut S, mouth: &CatalogEntry, face: FaceLayout) {
    let color = mouth.color_or("color", MOUTH_COLOR);
    let y = face.mouth_y();
    match MouthKind::of(mouth) {
        MouthKind::Smile => {
            stroke_round(s, Shape::arc(0.0, y - 10.0, 12.0, 0.15 * PI, 0.85 * PI), color, 4.0)
        }
        MouthKind::Grin => {
            stroke_round(s, Shape::arc(0.0, y - 12.0, 16.0, 0.1 * PI, 0.9 * PI), color, 4.0);
            stroke_round(s, line(-11.0, y - 8.0, 11.0, y - 8.0), highlight(0.9), 2.5);
        }
        MouthKind::Ooh => fill(s, Shape::ellipse(0.0, y, 7.0, 9.0), color),
        MouthKind::Line => stroke_round(s, curve(-13.0, y, 0.0, y + 3.0, 13.0, y), color, 3.5),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, Category};
    use crate::surface::{DrawCommand, LineCap, Paint, Recorder, SizePx};

    #[test]
    fn hair_sits_higher_on_tall_heads() {
        let round = Catalog::find(Category::Base, "base_round");
        let slim = Catalog::find(Category::Base, "base_slim");
        assert!(BaseShape::of(slim).crown_y() < BaseShape::of(round).crown_y());
    }

    #[test]
    fn no_hair_draws_nothing() {
        let mut rec = Recorder::new(SizePx::new(10, 10));
        draw_hair(
            &mut rec,
            Catalog::find(Category::Hair, "hair_none"),
            Catalog::default_entry(Category::Base),
        );
        assert_eq!(rec.paint_count(), 0);
    }

    #[test]
    fn curly_hair_is_nine_curls_and_a_band() {
        let mut rec = Recorder::new(SizePx::new(10, 10));
        draw_hair(
            &mut rec,
            Catalog::find(Category::Hair, "hair_curl"),
            Catalog::default_entry(Category::Base),
        );
        let circles = rec
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::Fill(Shape::Circle(_), _)))
            .count();
        assert_eq!(circles, 9);
        assert_eq!(rec.paint_count(), 10);
    }

    #[test]
    fn unknown_hair_kind_falls_back_to_short() {
        let odd = CatalogEntry {
            id: "hair_odd",
            name: "Odd",
            attributes: &[("type", "mohawk")],
        };
        assert_eq!(HairKind::of(&odd), HairKind::Short);
        assert_eq!(EyeKind::of(&odd), EyeKind::Oval);
        assert_eq!(MouthKind::of(&odd), MouthKind::Smile);
    }

    fn face() -> FaceLayout {
        FaceLayout::new(Catalog::default_entry(Category::Base), 0.0)
    }

    fn record(draw: impl FnOnce(&mut Recorder)) -> Recorder {
        let mut rec = Recorder::new(SizePx::new(10, 10));
        draw(&mut rec);
        rec
    }

    #[test]
    fn every_eye_style_draws_a_pair_centered_on_the_layout() {
        for entry in Catalog::list_for(Category::Eyes) {
            let rec = record(|r| draw_eyes(r, entry, face()));
            let mut centers: Vec<f64> = rec
                .commands()
                .iter()
                .filter_map(|c| match c {
                    DrawCommand::Fill(shape, Paint::Solid(color)) if *color == EYE_COLOR => {
                        Some(shape.bounding_box().center().x)
                    }
                    DrawCommand::Stroke(shape, ..) => Some(shape.bounding_box().center().x),
                    _ => None,
                })
                .collect();
            centers.iter_mut().for_each(|x| *x = x.round());
            assert_eq!(centers, vec![-EYE_OFFSET, EYE_OFFSET], "{}", entry.id);
        }
    }

    #[test]
    fn wide_eyes_get_white_highlights() {
        let wide = Catalog::find(Category::Eyes, "eyes_wide");
        let rec = record(|r| draw_eyes(r, wide, face()));
        assert_eq!(rec.paint_count(), 4);
        assert!(rec.commands().iter().any(
            |c| matches!(c, DrawCommand::Fill(Shape::Circle(_), Paint::Solid(color)) if *color == Color::WHITE)
        ));
    }

    #[test]
    fn brows_use_round_caps_and_none_is_empty() {
        let soft = record(|r| draw_brows(r, Catalog::default_entry(Category::Brows), face()));
        assert_eq!(soft.paint_count(), 2);
        assert!(soft.commands().iter().all(|c| matches!(
            c,
            DrawCommand::Stroke(_, _, style) if style.cap == LineCap::Round
        )));

        let none = record(|r| draw_brows(r, Catalog::find(Category::Brows, "brows_none"), face()));
        assert_eq!(none.paint_count(), 0);
    }

    #[test]
    fn brows_sit_above_the_eyes_and_mouth_below() {
        let layout = face();
        let brows = record(|r| draw_brows(r, Catalog::find(Category::Brows, "brows_flat"), layout));
        let mouth = record(|r| draw_mouth(r, Catalog::find(Category::Mouth, "mouth_ooh"), layout));
        let DrawCommand::Stroke(brow, ..) = &brows.commands()[0] else {
            panic!("brows are strokes");
        };
        let DrawCommand::Fill(lips, _) = &mouth.commands()[0] else {
            panic!("ooh mouth is a fill");
        };
        assert!(brow.bounding_box().y1 < layout.eye_y - 9.0);
        assert!(lips.bounding_box().y0 > layout.eye_y + 9.0);
    }

    #[test]
    fn grin_adds_teeth_over_the_smile() {
        let grin = record(|r| draw_mouth(r, Catalog::find(Category::Mouth, "mouth_grin"), face()));
        let colors: Vec<Color> = grin
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Stroke(_, Paint::Solid(color), _) => Some(*color),
                _ => None,
            })
            .collect();
        assert_eq!(colors, vec![MOUTH_COLOR, Color::WHITE.alpha(0.9)]);
    }
}
