//! Small preview tiles for catalog pickers.
//!
//! A thumbnail shows a fixed generic silhouette on the left and the one
//! entry's shape and color on the right. It never looks at the user's
//! configuration, so thumbnails of the same category stay comparable.

use std::f64::consts::PI;

use image::RgbaImage;
use image::imageops;
use kurbo::{Affine, Point};

use crate::catalog::{Catalog, CatalogEntry, Category};
use crate::color::{Color, FALLBACK_COLOR};
use crate::error::RenderError;
use crate::layer::accessory::{self, GlassesKind, HatKind, NeckKind};
use crate::layer::body::{BottomKind, HAND_X, HAND_Y, TopKind};
use crate::layer::head::{self, BaseShape, FaceLayout, HairKind};
use crate::layer::{fill, highlight, line, stroke};
use crate::surface::{Paint, PixmapSurface, Shape, SizePx, Stop, StrokeStyle, Surface};

/// Fixed thumbnail size in pixels.
pub const THUMBNAIL_SIZE: SizePx = SizePx::new(180, 90);

const SILHOUETTE: Color = Color::rgb(0xd3, 0xb0, 0x93);

/// Draws the preview for `entry` of `category`, scaled to fill `surface`.
pub fn render_thumbnail<S: Surface + ?Sized>(category: Category, entry: &CatalogEntry, surface: &mut S) {
    let size = surface.size();
    surface.save();
    surface.transform(Affine::scale_non_uniform(
        f64::from(size.width) / f64::from(THUMBNAIL_SIZE.width),
        f64::from(size.height) / f64::from(THUMBNAIL_SIZE.height),
    ));

    let (w, h) = (
        f64::from(THUMBNAIL_SIZE.width),
        f64::from(THUMBNAIL_SIZE.height),
    );
    fill(surface, Shape::rect(0.0, 0.0, w, h), highlight(0.02));
    draw_silhouette(surface);
    draw_swatch(surface, category, entry);

    surface.restore();
}

fn draw_silhouette<S: Surface + ?Sized>(s: &mut S) {
    fill(s, Shape::circle(45.0, 34.0, 18.0), SILHOUETTE);
    fill(s, Shape::rect(35.0, 52.0, 20.0, 16.0), SILHOUETTE);
    fill(s, Shape::rect(32.0, 67.0, 8.0, 14.0), SILHOUETTE);
    fill(s, Shape::rect(50.0, 67.0, 8.0, 14.0), SILHOUETTE);
}

/// Skin of the default tone, for swatches that show a head or a hand.
fn default_skin() -> Color {
    Catalog::default_entry(Category::Skin).color_or("color", SILHOUETTE)
}

/// A face disc with one part drawn by the layer routine at half size.
fn draw_face_swatch<S: Surface + ?Sized>(s: &mut S, part: impl FnOnce(&mut S, FaceLayout)) {
    let face = FaceLayout::new(Catalog::default_entry(Category::Base), 0.0);
    s.save();
    s.transform(
        Affine::translate((136.0, 45.0)) * Affine::scale(0.5) * Affine::translate((0.0, 115.0)),
    );
    fill(s, Shape::circle(0.0, -115.0, 62.0), default_skin());
    part(s, face);
    s.restore();
}

fn draw_swatch<S: Surface + ?Sized>(s: &mut S, category: Category, entry: &CatalogEntry) {
    let color = entry.color_or("color", FALLBACK_COLOR);

    match category {
        Category::Skin => fill(s, Shape::circle(135.0, 40.0, 22.0), color),
        Category::Eyes => draw_face_swatch(s, |s, face| head::draw_eyes(s, entry, face)),
        Category::Brows => draw_face_swatch(s, |s, face| head::draw_brows(s, entry, face)),
        Category::Mouth => draw_face_swatch(s, |s, face| head::draw_mouth(s, entry, face)),
        Category::Hand => {
            s.save();
            s.transform(Affine::translate((136.0 - HAND_X, 45.0 - HAND_Y)));
            fill(s, Shape::circle(HAND_X, HAND_Y, 13.0), default_skin());
            accessory::draw_hand(s, entry);
            s.restore();
        }
        Category::BoxTheme => {
            let card = Shape::round_rect(112.0, 12.0, 48.0, 66.0, 8.0);
            s.fill(
                &card,
                &Paint::Linear {
                    from: Point::new(112.0, 12.0),
                    to: Point::new(160.0, 78.0),
                    stops: vec![
                        Stop::new(0.0, entry.color_or("from", Color::BLACK)),
                        Stop::new(0.6, entry.color_or("mid", Color::BLACK)),
                        Stop::new(1.0, entry.color_or("to", Color::BLACK)),
                    ],
                },
            );
            stroke(s, Shape::round_rect(118.0, 24.0, 36.0, 36.0, 6.0), highlight(0.3), 1.5);
        }
        Category::Base => {
            let skin = default_skin();
            let shape = match BaseShape::of(entry) {
                BaseShape::Round => Shape::circle(135.0, 40.0, 22.0),
                BaseShape::Square => Shape::rect(113.0, 18.0, 44.0, 44.0),
                BaseShape::Slim => Shape::round_rect(116.0, 16.0, 38.0, 48.0, 14.0),
            };
            fill(s, shape, skin);
        }
        Category::Hair => {
            let kind = HairKind::of(entry);
            if kind == HairKind::None {
                stroke(s, Shape::rect(112.0, 20.0, 50.0, 30.0), highlight(0.12), 2.0);
                return;
            }
            fill(s, Shape::rect(110.0, 20.0, 50.0, 16.0), color);
            fill(s, Shape::rect(116.0, 16.0, 38.0, 12.0), color);
            match kind {
                HairKind::Curly => {
                    for i in 0..5 {
                        fill(s, Shape::circle(115.0 + f64::from(i) * 10.0, 38.0, 6.0), color);
                    }
                }
                HairKind::Long => fill(s, Shape::rect(112.0, 30.0, 46.0, 26.0), color),
                _ => {}
            }
        }
        Category::Top => {
            fill(s, Shape::round_rect(108.0, 22.0, 56.0, 44.0, 12.0), color);
            match TopKind::of(entry) {
                TopKind::Jacket | TopKind::Vest => {
                    fill(s, Shape::rect(134.0, 24.0, 4.0, 40.0), highlight(0.25));
                }
                TopKind::Hoodie => {
                    stroke(s, Shape::arc(136.0, 33.0, 12.0, 0.0, PI), highlight(0.25), 2.0);
                }
                _ => {}
            }
        }
        Category::Bottom => {
            let kind = BottomKind::of(entry);
            let leg = if kind == BottomKind::Shorts { 14.0 } else { 28.0 };
            fill(s, Shape::rect(116.0, 20.0, 40.0, 18.0), color);
            fill(s, Shape::rect(118.0, 38.0, 14.0, leg), color);
            fill(s, Shape::rect(140.0, 38.0, 14.0, leg), color);
            if kind == BottomKind::Skirt {
                fill(
                    s,
                    Shape::polygon(&[(116.0, 36.0), (156.0, 36.0), (164.0, 62.0), (108.0, 62.0)]),
                    color,
                );
            }
        }
        Category::Hat => match HatKind::of(entry) {
            HatKind::None => {}
            HatKind::Cap => {
                fill(s, Shape::rect(112.0, 28.0, 46.0, 12.0), color);
                fill(s, Shape::rect(150.0, 36.0, 14.0, 4.0), color);
            }
            HatKind::Beanie => {
                fill(s, Shape::arc(136.0, 42.0, 22.0, PI, 2.0 * PI), color);
                fill(s, Shape::rect(114.0, 42.0, 44.0, 8.0), color);
            }
            HatKind::Bucket => {
                fill(s, Shape::rect(118.0, 26.0, 36.0, 20.0), color);
                fill(
                    s,
                    Shape::polygon(&[(112.0, 46.0), (160.0, 46.0), (154.0, 54.0), (118.0, 54.0)]),
                    color,
                );
            }
        },
        Category::Glasses => {
            let kind = GlassesKind::of(entry);
            if kind == GlassesKind::None {
                return;
            }
            let frame = entry.color_or("color", Color::rgb(0x1f, 0x24, 0x34));
            let lenses = if kind == GlassesKind::Round {
                [Shape::circle(124.0, 42.0, 10.0), Shape::circle(148.0, 42.0, 10.0)]
            } else {
                [
                    Shape::rect(114.0, 32.0, 20.0, 18.0),
                    Shape::rect(138.0, 32.0, 20.0, 18.0),
                ]
            };
            for lens in lenses {
                stroke(s, lens, frame, 3.0);
            }
            stroke(s, line(134.0, 40.0, 138.0, 40.0), frame, 3.0);
        }
        Category::Neck => match NeckKind::of(entry) {
            NeckKind::None => {
                stroke(s, Shape::rect(114.0, 20.0, 44.0, 46.0), highlight(0.2), 2.0);
            }
            NeckKind::Chain => {
                stroke(s, Shape::arc(136.0, 36.0, 18.0, 0.15 * PI, 0.85 * PI), color, 3.0);
            }
            NeckKind::Scarf => {
                fill(s, Shape::rect(126.0, 20.0, 20.0, 38.0), color);
                fill(s, Shape::rect(120.0, 20.0, 32.0, 10.0), color);
            }
            NeckKind::Tie => {
                fill(
                    s,
                    Shape::polygon(&[(136.0, 20.0), (146.0, 34.0), (136.0, 68.0), (126.0, 34.0)]),
                    color,
                );
            }
        },
        Category::Stage => {
            let bg = entry.color_or("bg", Color::BLACK);
            let bg2 = entry.color_or("bg2", bg);
            s.fill(
                &Shape::round_rect(108.0, 18.0, 56.0, 48.0, 10.0),
                &Paint::Linear {
                    from: Point::new(0.0, 18.0),
                    to: Point::new(0.0, 66.0),
                    stops: vec![Stop::new(0.0, bg), Stop::new(1.0, bg2)],
                },
            );
            let glow = entry.color_or("glow", FALLBACK_COLOR);
            s.fill(&Shape::circle(136.0, 38.0, 12.0), &Paint::Solid(glow.alpha(0.6)));
            s.stroke(
                &Shape::round_rect(108.0, 18.0, 56.0, 48.0, 10.0),
                &Paint::Solid(highlight(0.12)),
                StrokeStyle::new(2.0),
            );
        }
    }
}

/// Renders one thumbnail at [`THUMBNAIL_SIZE`].
pub fn thumbnail_image(category: Category, entry: &CatalogEntry) -> Result<RgbaImage, RenderError> {
    let mut surface = PixmapSurface::new(THUMBNAIL_SIZE, 1.0)?;
    render_thumbnail(category, entry, &mut surface);
    Ok(surface.into_image())
}

/// Every entry of `category` side by side, in catalog order.
pub fn picker_strip(category: Category) -> Result<RgbaImage, RenderError> {
    let entries = Catalog::list_for(category);
    let mut strip = RgbaImage::new(THUMBNAIL_SIZE.width * entries.len() as u32, THUMBNAIL_SIZE.height);
    for (i, entry) in entries.iter().enumerate() {
        let thumb = thumbnail_image(category, entry)?;
        let x = i as i64 * i64::from(THUMBNAIL_SIZE.width);
        imageops::overlay(&mut strip, &thumb, x, 0);
    }
    tracing::debug!(category = category.key(), count = entries.len(), "rendered picker strip");
    Ok(strip)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Recorder;

    #[test]
    fn thumbnail_has_fixed_size_and_silhouette() {
        let img = thumbnail_image(Category::Top, Catalog::default_entry(Category::Top)).unwrap();
        assert_eq!(img.dimensions(), (180, 90));
        let head = img.get_pixel(45, 34);
        assert_eq!((head[0], head[1], head[2]), (0xd3, 0xb0, 0x93));
    }

    #[test]
    fn swatch_uses_entry_color() {
        let entry = Catalog::find(Category::Top, "top_hoodie");
        let img = thumbnail_image(Category::Top, entry).unwrap();
        let px = img.get_pixel(120, 50);
        assert_eq!((px[0], px[1], px[2]), (0x4f, 0x66, 0xff));
    }

    #[test]
    fn thumbnails_differ_between_entries() {
        let a = thumbnail_image(Category::Hair, Catalog::find(Category::Hair, "hair_short")).unwrap();
        let b = thumbnail_image(Category::Hair, Catalog::find(Category::Hair, "hair_long")).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn every_entry_draws_something_beyond_the_silhouette() {
        for category in Category::ALL {
            for entry in Catalog::list_for(category) {
                let mut rec = Recorder::new(THUMBNAIL_SIZE);
                render_thumbnail(category, entry, &mut rec);
                // backdrop + four silhouette parts
                let base = 5;
                let has_swatch = rec.paint_count() > base;
                let is_blank_none = matches!(category, Category::Hat | Category::Glasses)
                    && entry.kind() == "none";
                assert!(has_swatch || is_blank_none, "{} draws no swatch", entry.id);
            }
        }
    }

    #[test]
    fn face_part_tiles_differ_by_entry() {
        for category in [Category::Eyes, Category::Mouth, Category::Hand, Category::BoxTheme] {
            let entries = Catalog::list_for(category);
            let first = thumbnail_image(category, &entries[0]).unwrap();
            let second = thumbnail_image(category, &entries[1]).unwrap();
            assert_ne!(first, second, "{category:?}");
        }
    }

    #[test]
    fn skin_tile_shows_the_tone() {
        let deep = Catalog::find(Category::Skin, "skin_deep");
        let img = thumbnail_image(Category::Skin, deep).unwrap();
        let px = img.get_pixel(135, 40);
        assert_eq!((px[0], px[1], px[2]), (0x6e, 0x46, 0x30));
    }

    #[test]
    fn picker_strip_lays_thumbnails_out_horizontally() {
        let strip = picker_strip(Category::Glasses).unwrap();
        let count = Catalog::list_for(Category::Glasses).len() as u32;
        assert_eq!(strip.dimensions(), (180 * count, 90));
        let second = thumbnail_image(Category::Glasses, &Catalog::list_for(Category::Glasses)[1]).unwrap();
        assert_eq!(strip.get_pixel(180 + 45, 34), second.get_pixel(45, 34));
    }
}
