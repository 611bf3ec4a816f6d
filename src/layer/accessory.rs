//! Hats, glasses, neck accessories and hand props.
//!
//! Every accessory category has a `none` entry; selecting it still opens and
//! closes the slot's layer, it just paints nothing inside.

use std::f64::consts::PI;

use super::body::{HAND_X, HAND_Y};
use super::head::FaceLayout;
use super::{fill, fill_outlined, highlight, line, shade, stroke};
use crate::catalog::CatalogEntry;
use crate::color::{Color, FALLBACK_COLOR};
use crate::surface::{BezPath, Paint, Shape, StrokeStyle, Surface};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HatKind {
    #[default]
    None,
    Cap,
    Beanie,
    Bucket,
}

impl HatKind {
    pub fn of(entry: &CatalogEntry) -> Self {
        match entry.kind() {
            "cap" => Self::Cap,
            "beanie" => Self::Beanie,
            "bucket" => Self::Bucket,
            _ => Self::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GlassesKind {
    #[default]
    None,
    Round,
    Square,
    Sun,
}

impl GlassesKind {
    pub fn of(entry: &CatalogEntry) -> Self {
        match entry.kind() {
            "round" => Self::Round,
            "square" => Self::Square,
            "sun" => Self::Sun,
            _ => Self::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NeckKind {
    #[default]
    None,
    Chain,
    Scarf,
    Tie,
}

impl NeckKind {
    pub fn of(entry: &CatalogEntry) -> Self {
        match entry.kind() {
            "chain" => Self::Chain,
            "scarf" => Self::Scarf,
            "tie" => Self::Tie,
            _ => Self::default(),
        }
    }
}

/// Props held in the right hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HandKind {
    #[default]
    None,
    Coffee,
    Controller,
    Flower,
}

impl HandKind {
    pub fn of(entry: &CatalogEntry) -> Self {
        match entry.kind() {
            "coffee" => Self::Coffee,
            "controller" => Self::Controller,
            "flower" => Self::Flower,
            _ => Self::default(),
        }
    }
}

pub fn draw_hat<S: Surface + ?Sized>(s: &mut S, hat: &CatalogEntry) {
    let color = hat.color_or("color", FALLBACK_COLOR);
    let outline = shade(0.18);

    match HatKind::of(hat) {
        HatKind::None => {}
        HatKind::Cap => {
            fill_outlined(s, Shape::round_rect(-44.0, -182.0, 88.0, 20.0, 10.0), color, outline, 1.5);
            fill_outlined(s, Shape::round_rect(26.0, -172.0, 34.0, 10.0, 6.0), color, outline, 1.5);
        }
        HatKind::Beanie => {
            fill_outlined(s, Shape::arc(0.0, -156.0, 48.0, PI, 2.0 * PI), color, outline, 1.5);
            fill_outlined(s, Shape::round_rect(-46.0, -156.0, 92.0, 16.0, 8.0), color, outline, 1.5);
            fill(s, Shape::circle(0.0, -205.0, 8.0), color);
        }
        HatKind::Bucket => {
            fill_outlined(s, Shape::round_rect(-34.0, -184.0, 68.0, 26.0, 8.0), color, outline, 1.5);
            fill_outlined(
                s,
                Shape::polygon(&[(-52.0, -158.0), (52.0, -158.0), (42.0, -142.0), (-42.0, -142.0)]),
                color,
                outline,
                1.5,
            );
        }
    }
}

/// Lenses are centered on the eyes of `face`.
pub(crate) fn draw_glasses<S: Surface + ?Sized>(s: &mut S, glasses: &CatalogEntry, face: FaceLayout) {
    let kind = GlassesKind::of(glasses);
    if kind == GlassesKind::None {
        return;
    }

    let frame = glasses.color_or("color", Color::rgb(0x17, 0x1c, 0x2a));
    let width = if kind == GlassesKind::Sun { 5.0 } else { 3.0 };
    let style = StrokeStyle::new(width);
    let tint = highlight(0.06);
    let y = face.eye_y - 1.0;
    let dx = face.dx;

    for cx in [-dx, dx] {
        let lens = if kind == GlassesKind::Round {
            Shape::circle(cx, y, 16.0)
        } else {
            Shape::round_rect(cx - 15.0, y - 14.0, 30.0, 24.0, 7.0)
        };
        s.fill(&lens, &Paint::Solid(tint));
        s.stroke(&lens, &Paint::Solid(frame), style);
        if kind == GlassesKind::Sun {
            fill(s, Shape::rect(cx - 12.0, y - 11.0, 24.0, 18.0), Color::with_opacity(10, 10, 14, 0.35));
        }
    }

    let inner = dx - if kind == GlassesKind::Round { 16.0 } else { 15.0 };
    s.stroke(&line(-inner, y - 2.0, inner, y - 2.0), &Paint::Solid(frame), style);
}

pub fn draw_neck<S: Surface + ?Sized>(s: &mut S, neck: &CatalogEntry) {
    let color = neck.color_or("color", FALLBACK_COLOR);

    match NeckKind::of(neck) {
        NeckKind::None => {}
        NeckKind::Chain => {
            stroke(s, Shape::arc(0.0, -52.0, 26.0, 0.18 * PI, 0.82 * PI), color, 4.0);
            stroke(s, Shape::circle(0.0, -52.0, 14.0), color, 4.0);
        }
        NeckKind::Scarf => {
            fill(s, Shape::rect(-18.0, -62.0, 36.0, 78.0), color);
            fill(s, Shape::rect(-28.0, -66.0, 56.0, 16.0), color);
            fill(s, Shape::rect(10.0, -6.0, 14.0, 34.0), color);
        }
        NeckKind::Tie => {
            fill(
                s,
                Shape::polygon(&[(0.0, -64.0), (14.0, -42.0), (0.0, 28.0), (-14.0, -42.0)]),
                color,
            );
        }
    }
}

/// Props are drawn around the right hand, over the skin circle.
pub fn draw_hand<S: Surface + ?Sized>(s: &mut S, hand: &CatalogEntry) {
    let color = hand.color_or("color", FALLBACK_COLOR);
    let (hx, hy) = (HAND_X, HAND_Y);

    match HandKind::of(hand) {
        HandKind::None => {}
        HandKind::Coffee => {
            fill(s, Shape::round_rect(hx - 11.0, hy - 12.0, 18.0, 25.0, 4.0), color);
            let mut handle = BezPath::new();
            handle.move_to((hx + 7.0, hy - 6.0));
            handle.quad_to((hx + 15.0, hy + 0.5), (hx + 7.0, hy + 7.0));
            stroke(s, handle.into(), color, 3.0);
            let mut steam = BezPath::new();
            steam.move_to((hx - 7.0, hy - 16.0));
            steam.quad_to((hx - 3.0, hy - 22.0), (hx + 2.0, hy - 29.0));
            stroke(s, steam.into(), Color::rgb(0xd6, 0xd3, 0xd1), 2.0);
        }
        HandKind::Controller => {
            fill(s, Shape::round_rect(hx - 16.0, hy - 10.0, 34.0, 20.0, 9.0), color);
            for bx in [hx - 4.0, hx + 7.0] {
                fill(s, Shape::circle(bx, hy, 3.0), Color::rgb(0x9c, 0xa3, 0xaf));
            }
        }
        HandKind::Flower => {
            stroke(s, line(hx, hy - 18.0, hx, hy + 18.0), Color::rgb(0x16, 0xa3, 0x4a), 4.0);
            fill(s, Shape::circle(hx, hy - 22.0, 7.0), color);
            for px in [hx - 8.0, hx + 8.0] {
                fill(s, Shape::circle(px, hy - 20.0, 5.0), Color::rgb(0xfb, 0x71, 0x85));
            }
        }
    }
}
