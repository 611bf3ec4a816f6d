//! Decorative slots: stage background, box panel, floor shadow and caption.
//!
//! Background, box and caption are drawn in surface coordinates and scale
//! with the surface height; the shadow is drawn under the figure's feet.

use kurbo::{Affine, Point};

use super::{highlight, line};
use crate::catalog::CatalogEntry;
use crate::color::Color;
use crate::config::Caption;
use crate::surface::{Paint, Shape, SizePx, Stop, StrokeStyle, Surface, TextAnchor, TextRun};

/// Surface height the decorative measurements are tuned for.
const REFERENCE_HEIGHT: f64 = 380.0;
const GRID_STEP: f64 = 40.0;

const DEFAULT_BG: Color = Color::rgb(0x0b, 0x0f, 0x1d);
const DEFAULT_BG2: Color = Color::rgb(0x09, 0x0b, 0x13);
const DEFAULT_GLOW: Color = Color::rgb(0x7f, 0x8c, 0xff);
/// The second, fixed-hue glow in the upper right.
const CYAN_GLOW: Color = Color::rgb(85, 210, 255);

const BOX_LABEL: &str = "COLLECTOR EDITION";

/// Logical width, height and the height ratio to [`REFERENCE_HEIGHT`], or
/// `None` for a surface with no area.
fn extent(size: SizePx) -> Option<(f64, f64, f64)> {
    if size.is_empty() {
        return None;
    }
    let (w, h) = (f64::from(size.width), f64::from(size.height));
    Some((w, h, h / REFERENCE_HEIGHT))
}

/// Grid line offsets `0, step, 2·step, ...` below `limit`.
fn grid_offsets(limit: f64, step: f64) -> impl Iterator<Item = f64> {
    let count = if step.is_finite() && step > 0.0 && limit > 0.0 {
        (limit / step).ceil() as usize
    } else {
        0
    };
    (0..count).map(move |i| i as f64 * step)
}

/// Vertical gradient, a glow in the stage color, a cyan glow and a faint grid.
pub fn draw_background<S: Surface + ?Sized>(s: &mut S, size: SizePx, stage: &CatalogEntry) {
    let Some((w, h, k)) = extent(size) else {
        return;
    };
    let full = Shape::rect(0.0, 0.0, w, h);

    let bg = stage.color_or("bg", DEFAULT_BG);
    let bg2 = stage.color_or("bg2", DEFAULT_BG2);
    let glow = stage.color_or("glow", DEFAULT_GLOW);

    s.fill(
        &full,
        &Paint::Linear {
            from: Point::ZERO,
            to: Point::new(0.0, h),
            stops: vec![Stop::new(0.0, bg), Stop::new(1.0, bg2)],
        },
    );

    for (cx, cy, radius, color, opacity) in [
        (0.35, 0.25, 280.0, glow, 0.20),
        (0.72, 0.18, 240.0, CYAN_GLOW, 0.14),
    ] {
        s.fill(
            &full,
            &Paint::Radial {
                center: Point::new(w * cx, h * cy),
                radius: radius * k,
                stops: vec![
                    Stop::new(0.0, color.alpha(opacity)),
                    Stop::new(1.0, color.alpha(0.0)),
                ],
            },
        );
    }

    let grid = Paint::Solid(highlight(0.03));
    let step = GRID_STEP * k;
    for x in grid_offsets(w, step) {
        s.stroke(&line(x + 0.5, 0.0, x + 0.5, h), &grid, StrokeStyle::new(1.0));
    }
    for y in grid_offsets(h, step) {
        s.stroke(&line(0.0, y + 0.5, w, y + 0.5), &grid, StrokeStyle::new(1.0));
    }
}

/// Collector-box backing card in the theme's three-stop diagonal gradient,
/// with a display window around the figure, an edition label and a bar
/// under the caption.
pub fn draw_box<S: Surface + ?Sized>(s: &mut S, size: SizePx, theme: &CatalogEntry) {
    let Some((w, h, k)) = extent(size) else {
        return;
    };
    let from = theme.color_or("from", Color::rgb(0x1e, 0x1b, 0x4b));
    let mid = theme.color_or("mid", Color::rgb(0x43, 0x38, 0xca));
    let to = theme.color_or("to", Color::rgb(0x0f, 0x17, 0x2a));

    let m = 10.0 * k;
    let card = Shape::round_rect(m, m, w - 2.0 * m, h - 2.0 * m, 18.0 * k);
    s.fill(
        &card,
        &Paint::Linear {
            from: Point::new(m, m),
            to: Point::new(w - m, h - m),
            stops: vec![
                Stop::new(0.0, from.alpha(0.55)),
                Stop::new(0.6, mid.alpha(0.45)),
                Stop::new(1.0, to.alpha(0.55)),
            ],
        },
    );
    s.stroke(&card, &Paint::Solid(highlight(0.14)), StrokeStyle::new(1.0));

    let window = Shape::round_rect(w / 2.0 - 100.0 * k, 44.0 * k, 200.0 * k, 262.0 * k, 16.0 * k);
    s.fill(&window, &Paint::Solid(highlight(0.06)));
    s.stroke(&window, &Paint::Solid(highlight(0.24)), StrokeStyle::new(1.0));

    s.text(&TextRun {
        text: BOX_LABEL.to_string(),
        x: m + 14.0 * k,
        y: 30.0 * k,
        size: 10.0 * k,
        weight: 600,
        anchor: TextAnchor::Start,
        color: Color::WHITE.alpha(0.85),
    });

    s.fill(
        &Shape::round_rect(w / 2.0 - 60.0 * k, h - 16.0 * k, 120.0 * k, 4.0 * k, 2.0 * k),
        &Paint::Solid(highlight(0.22)),
    );
}

/// A flattened radial blur on the floor, in figure coordinates.
pub fn draw_shadow<S: Surface + ?Sized>(s: &mut S) {
    s.save();
    s.transform(Affine::translate((0.0, 172.0)).pre_scale_non_uniform(1.0, 0.35));
    s.fill(
        &Shape::circle(0.0, 0.0, 170.0),
        &Paint::Radial {
            center: Point::ZERO,
            radius: 170.0,
            stops: vec![
                Stop::new(0.0, Color::BLACK.alpha(0.5)),
                Stop::new(0.06, Color::BLACK.alpha(0.5)),
                Stop::new(1.0, Color::BLACK.alpha(0.0)),
            ],
        },
    );
    s.restore();
}

/// Title and subtitle under the figure, number in the top corner.
pub fn draw_caption<S: Surface + ?Sized>(s: &mut S, size: SizePx, caption: &Caption) {
    let Some((w, h, k)) = extent(size) else {
        return;
    };
    let runs = [
        (
            caption.title.clone(),
            w / 2.0,
            h - 44.0 * k,
            26.0,
            600,
            TextAnchor::Middle,
            0.8,
        ),
        (
            caption.subtitle.clone(),
            w / 2.0,
            h - 20.0 * k,
            14.0,
            500,
            TextAnchor::Middle,
            0.45,
        ),
        (
            if caption.number.is_empty() {
                String::new()
            } else {
                format!("#{}", caption.number)
            },
            w - 16.0 * k,
            30.0 * k,
            18.0,
            700,
            TextAnchor::End,
            0.9,
        ),
    ];

    for (text, x, y, font_size, weight, anchor, opacity) in runs {
        if text.is_empty() {
            continue;
        }
        s.text(&TextRun {
            text,
            x,
            y,
            size: font_size * k,
            weight,
            anchor,
            color: Color::WHITE.alpha(opacity),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, Category};
    use crate::surface::{DrawCommand, Recorder};

    #[test]
    fn stage_colors_drive_the_background_gradient() {
        let mut rec = Recorder::new(SizePx::new(320, 380));
        let ember = Catalog::find(Category::Stage, "stage_ember");
        draw_background(&mut rec, SizePx::new(320, 380), ember);
        let Some(DrawCommand::Fill(_, Paint::Linear { stops, .. })) = rec.commands().first() else {
            panic!("background should start with a linear gradient");
        };
        assert_eq!(stops[0].color, Color::from_hex("#201109").unwrap());
    }

    #[test]
    fn grid_covers_the_surface() {
        let mut rec = Recorder::new(SizePx::new(320, 380));
        draw_background(&mut rec, SizePx::new(320, 380), Catalog::default_entry(Category::Stage));
        let lines = rec
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::Stroke(..)))
            .count();
        // 8 columns, 10 rows
        assert_eq!(lines, 18);
    }

    #[test]
    fn second_glow_is_cyan() {
        let mut rec = Recorder::new(SizePx::new(320, 380));
        draw_background(&mut rec, SizePx::new(320, 380), Catalog::default_entry(Category::Stage));
        let glows: Vec<Color> = rec
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Fill(_, Paint::Radial { stops, .. }) => Some(stops[0].color),
                _ => None,
            })
            .collect();
        assert_eq!(glows.len(), 2);
        assert_eq!(glows[1], Color::rgb(85, 210, 255).alpha(0.14));
    }

    #[test]
    fn empty_surfaces_draw_nothing() {
        for size in [SizePx::new(320, 0), SizePx::new(0, 380), SizePx::new(0, 0)] {
            let mut rec = Recorder::new(size);
            draw_background(&mut rec, size, Catalog::default_entry(Category::Stage));
            draw_box(&mut rec, size, Catalog::default_entry(Category::BoxTheme));
            draw_caption(&mut rec, size, &Caption::default());
            assert_eq!(rec.paint_count(), 0, "{size:?}");
        }
    }

    #[test]
    fn grid_offsets_stop_on_degenerate_steps() {
        assert_eq!(grid_offsets(100.0, 0.0).count(), 0);
        assert_eq!(grid_offsets(100.0, f64::NAN).count(), 0);
        assert_eq!(grid_offsets(0.0, 40.0).count(), 0);
        assert_eq!(grid_offsets(100.0, 40.0).collect::<Vec<_>>(), vec![0.0, 40.0, 80.0]);
    }

    #[test]
    fn box_card_uses_the_theme_gradient() {
        let mut rec = Recorder::new(SizePx::new(320, 380));
        let sunset = Catalog::find(Category::BoxTheme, "box_sunset");
        draw_box(&mut rec, SizePx::new(320, 380), sunset);
        let Some(DrawCommand::Fill(Shape::RoundRect(_), Paint::Linear { stops, .. })) =
            rec.commands().first()
        else {
            panic!("box should start with its gradient card");
        };
        let hues: Vec<String> = stops.iter().map(|s| s.color.to_hex()).collect();
        assert_eq!(hues, ["#f97316", "#db2777", "#4c1d95"]);
        assert!(rec.commands().iter().any(
            |c| matches!(c, DrawCommand::Text(run) if run.text == BOX_LABEL)
        ));
    }

    #[test]
    fn caption_skips_empty_text_and_prefixes_number() {
        let mut rec = Recorder::new(SizePx::new(320, 380));
        let caption = Caption {
            title: "HERO".into(),
            subtitle: String::new(),
            number: "42".into(),
        };
        draw_caption(&mut rec, SizePx::new(320, 380), &caption);
        let texts: Vec<&str> = rec
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text(run) => Some(run.text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(texts, vec!["HERO", "#42"]);
    }
}
