//! Legs, torso and arms.

use std::f64::consts::PI;

use super::{Companions, fill, fill_outlined, highlight, line, shade, stroke};
use crate::catalog::CatalogEntry;
use crate::color::{Color, FALLBACK_COLOR};
use crate::surface::{Shape, Surface};

const SHOE_COLOR: Color = Color::rgb(0x20, 0x25, 0x36);
const VEST_SHIRT_COLOR: Color = Color::rgb(0xd8, 0xde, 0xe9);

/// Hand centers are at `(±HAND_X, HAND_Y)` in body space.
pub(crate) const HAND_X: f64 = 77.0;
pub(crate) const HAND_Y: f64 = 20.0;

/// Lower garment shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BottomKind {
    #[default]
    Jeans,
    Pants,
    Shorts,
    Joggers,
    Skirt,
}

impl BottomKind {
    pub fn of(entry: &CatalogEntry) -> Self {
        match entry.kind() {
            "jeans" => Self::Jeans,
            "pants" => Self::Pants,
            "shorts" => Self::Shorts,
            "joggers" => Self::Joggers,
            "skirt" => Self::Skirt,
            _ => Self::default(),
        }
    }
}

/// Upper garment shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TopKind {
    #[default]
    Tee,
    Hoodie,
    Jacket,
    Shirt,
    Sweater,
    Vest,
}

impl TopKind {
    pub fn of(entry: &CatalogEntry) -> Self {
        match entry.kind() {
            "tee" => Self::Tee,
            "hoodie" => Self::Hoodie,
            "jacket" => Self::Jacket,
            "shirt" => Self::Shirt,
            "sweater" => Self::Sweater,
            "vest" => Self::Vest,
            _ => Self::default(),
        }
    }
}

/// Bottom garment, bare legs where it ends, then shoes.
pub fn draw_legs<S: Surface + ?Sized>(s: &mut S, bottom: &CatalogEntry, companions: &Companions) {
    let color = bottom.color_or("color", FALLBACK_COLOR);
    let outline = shade(0.18);
    let kind = BottomKind::of(bottom);

    if kind == BottomKind::Skirt {
        fill_outlined(
            s,
            Shape::polygon(&[(-52.0, 18.0), (52.0, 18.0), (68.0, 88.0), (-68.0, 88.0)]),
            color,
            outline,
            2.0,
        );
        for x in [-28.0, 10.0] {
            fill_outlined(
                s,
                Shape::round_rect(x, 88.0, 18.0, 58.0, 8.0),
                companions.skin,
                outline,
                2.0,
            );
        }
    } else {
        fill_outlined(s, Shape::round_rect(-60.0, 16.0, 120.0, 34.0, 10.0), color, outline, 2.0);
        let leg_len = if kind == BottomKind::Shorts { 52.0 } else { 96.0 };
        let top = 50.0;
        for x in [-48.0, 12.0] {
            fill_outlined(s, Shape::round_rect(x, top, 36.0, leg_len, 12.0), color, outline, 2.0);
        }
        match kind {
            BottomKind::Joggers => {
                for x in [-48.0, 12.0] {
                    fill(s, Shape::rect(x, top + leg_len - 14.0, 36.0, 8.0), shade(0.10));
                }
            }
            BottomKind::Shorts => {
                for x in [-44.0, 16.0] {
                    fill_outlined(
                        s,
                        Shape::round_rect(x, top + leg_len, 28.0, 42.0, 10.0),
                        companions.skin,
                        outline,
                        2.0,
                    );
                }
            }
            _ => {}
        }
    }

    for x in [-56.0, 4.0] {
        fill(s, Shape::round_rect(x, 148.0, 52.0, 18.0, 9.0), SHOE_COLOR);
    }
}

/// Skin at the collar, then the top garment with its trim.
pub fn draw_torso<S: Surface + ?Sized>(s: &mut S, top: &CatalogEntry, companions: &Companions) {
    let color = companions.garment;
    let outline = shade(0.18);

    fill(s, Shape::round_rect(-34.0, -72.0, 68.0, 34.0, 12.0), companions.skin);

    match TopKind::of(top) {
        TopKind::Tee => {
            fill_outlined(s, Shape::round_rect(-62.0, -66.0, 124.0, 92.0, 18.0), color, outline, 2.0);
        }
        TopKind::Hoodie => {
            fill_outlined(s, Shape::round_rect(-64.0, -70.0, 128.0, 98.0, 20.0), color, outline, 2.0);
            let trim = highlight(0.18);
            stroke(s, Shape::arc(0.0, -48.0, 20.0, PI, 2.0 * PI), trim, 2.0);
            stroke(s, line(-8.0, -28.0, -10.0, -4.0), trim, 2.0);
            stroke(s, line(8.0, -28.0, 10.0, -4.0), trim, 2.0);
        }
        TopKind::Jacket => {
            fill_outlined(s, Shape::round_rect(-66.0, -70.0, 132.0, 100.0, 20.0), color, outline, 2.0);
            fill(s, Shape::rect(-4.0, -66.0, 8.0, 92.0), highlight(0.12));
        }
        TopKind::Shirt => {
            fill_outlined(s, Shape::round_rect(-60.0, -68.0, 120.0, 96.0, 18.0), color, outline, 2.0);
            fill(s, Shape::rect(-2.0, -64.0, 4.0, 88.0), shade(0.08));
            fill(s, Shape::polygon(&[(-14.0, -68.0), (0.0, -48.0), (14.0, -68.0)]), shade(0.08));
        }
        TopKind::Sweater => {
            fill_outlined(s, Shape::round_rect(-62.0, -68.0, 124.0, 96.0, 20.0), color, outline, 2.0);
            stroke(s, line(-52.0, -28.0, 52.0, -28.0), highlight(0.18), 2.0);
        }
        TopKind::Vest => {
            fill_outlined(
                s,
                Shape::round_rect(-56.0, -66.0, 112.0, 92.0, 16.0),
                VEST_SHIRT_COLOR,
                outline,
                2.0,
            );
            for x in [-60.0, 16.0] {
                fill_outlined(s, Shape::round_rect(x, -68.0, 44.0, 96.0, 18.0), color, outline, 2.0);
            }
        }
    }
}

/// Sleeves in the garment color, hands in skin.
pub fn draw_arms<S: Surface + ?Sized>(s: &mut S, companions: &Companions) {
    let outline = shade(0.16);
    for x in [-94.0, 60.0] {
        fill_outlined(
            s,
            Shape::round_rect(x, -62.0, 34.0, 72.0, 14.0),
            companions.garment,
            outline,
            2.0,
        );
    }
    for cx in [-HAND_X, HAND_X] {
        fill_outlined(s, Shape::circle(cx, HAND_Y, 13.0), companions.skin, outline, 2.0);
    }
}
