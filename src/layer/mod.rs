//! The layered figure renderer.
//!
//! A render walks the fixed [`Slot::PLAN`] and draws each slot exactly once,
//! whatever entry is selected for the slot's category. The selected entry only
//! decides *what* shape and color a slot draws, never *where* it sits in the
//! z-order.
//!
//! # Architecture
//!
//! ```text
//! Configuration ──► RenderContext::resolve ──► for slot in PLAN
//!                   (catalog lookups,             begin_layer(slot)
//!                    companion colors)            space transform
//!                                                 draw routine
//!                                                 end_layer()
//! ```
//!
//! Draw routines live in [`scene`] (decorative slots), [`body`], [`head`] and
//! [`accessory`]. Each is a pure function of the resolved entries, the
//! companion colors and the proportion sliders.

pub mod accessory;
pub mod body;
pub mod head;
pub mod scene;

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use image::RgbaImage;
use kurbo::{Affine, BezPath, Vec2};

use crate::catalog::{Catalog, CatalogEntry, Category};
use crate::color::{Color, FALLBACK_COLOR};
use crate::config::{Configuration, Proportions};
use crate::surface::{Paint, Shape, SizePx, StrokeStyle, Surface};

use head::FaceLayout;

// ============================================================================
// Slots
// ============================================================================

/// Whether a slot belongs to the figure or only decorates the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    /// Left out of transparent renders.
    Decorative,
    Figure,
}

/// A fixed z-order position in the render plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slot {
    Background,
    Box,
    Shadow,
    Legs,
    Torso,
    Arms,
    Head,
    Hair,
    Hat,
    Brows,
    Eyes,
    Mouth,
    Glasses,
    Neck,
    Hand,
    Caption,
}

impl Slot {
    /// Every slot, back to front.
    pub const PLAN: [Slot; 16] = [
        Slot::Background,
        Slot::Box,
        Slot::Shadow,
        Slot::Legs,
        Slot::Torso,
        Slot::Arms,
        Slot::Head,
        Slot::Hair,
        Slot::Hat,
        Slot::Brows,
        Slot::Eyes,
        Slot::Mouth,
        Slot::Glasses,
        Slot::Neck,
        Slot::Hand,
        Slot::Caption,
    ];

    /// Decorative for the scene dressing (background, box, shadow, caption),
    /// figure for everything else.
    pub fn kind(self) -> LayerKind {
        match self {
            Slot::Background | Slot::Box | Slot::Shadow | Slot::Caption => LayerKind::Decorative,
            _ => LayerKind::Figure,
        }
    }

    pub fn is_decorative(self) -> bool {
        self.kind() == LayerKind::Decorative
    }

    /// Stable lowercase name, used for SVG layer ids.
    pub fn name(self) -> &'static str {
        match self {
            Slot::Background => "background",
            Slot::Box => "box",
            Slot::Shadow => "shadow",
            Slot::Legs => "legs",
            Slot::Torso => "torso",
            Slot::Arms => "arms",
            Slot::Head => "head",
            Slot::Hair => "hair",
            Slot::Hat => "hat",
            Slot::Brows => "brows",
            Slot::Eyes => "eyes",
            Slot::Mouth => "mouth",
            Slot::Glasses => "glasses",
            Slot::Neck => "neck",
            Slot::Hand => "hand",
            Slot::Caption => "caption",
        }
    }

    /// The category whose selection decides what this slot draws.
    pub fn category(self) -> Option<Category> {
        match self {
            Slot::Background => Some(Category::Stage),
            Slot::Box => Some(Category::BoxTheme),
            Slot::Legs => Some(Category::Bottom),
            Slot::Torso | Slot::Arms => Some(Category::Top),
            Slot::Head => Some(Category::Base),
            Slot::Hair => Some(Category::Hair),
            Slot::Hat => Some(Category::Hat),
            Slot::Brows => Some(Category::Brows),
            Slot::Eyes => Some(Category::Eyes),
            Slot::Mouth => Some(Category::Mouth),
            Slot::Glasses => Some(Category::Glasses),
            Slot::Neck => Some(Category::Neck),
            Slot::Hand => Some(Category::Hand),
            Slot::Shadow | Slot::Caption => None,
        }
    }

    /// The coordinate space the slot is drawn in.
    fn space(self) -> Space {
        match self {
            Slot::Background | Slot::Box | Slot::Caption => Space::Canvas,
            Slot::Shadow => Space::Figure,
            Slot::Legs | Slot::Torso | Slot::Arms | Slot::Neck | Slot::Hand => Space::Body,
            Slot::Head
            | Slot::Hair
            | Slot::Hat
            | Slot::Brows
            | Slot::Eyes
            | Slot::Mouth
            | Slot::Glasses => Space::Head,
        }
    }

    fn bit(self) -> u32 {
        1 << self as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Space {
    /// Surface coordinates.
    Canvas,
    /// Hip-centered figure coordinates, head up (negative y).
    Figure,
    /// Figure coordinates stretched vertically by `bodyScale`.
    Body,
    /// Figure coordinates scaled uniformly by `headScale` around the neck.
    Head,
}

/// Shoulder line the body group stretches from.
const SHOULDER_Y: f64 = -70.0;
/// Neck point the head group scales around.
const NECK_Y: f64 = -60.0;
/// Figure units that fit the surface height.
const FIGURE_SPAN: f64 = 500.0;

/// Maps figure coordinates onto a surface of `size`.
pub fn figure_transform(size: SizePx) -> Affine {
    let (w, h) = (f64::from(size.width), f64::from(size.height));
    Affine::translate((w / 2.0, h * 0.52)).pre_scale(h / FIGURE_SPAN)
}

fn space_transform(space: Space, size: SizePx, proportions: &Proportions) -> Affine {
    let figure = figure_transform(size);
    match space {
        Space::Canvas => Affine::IDENTITY,
        Space::Figure => figure,
        Space::Body => figure
            .pre_translate(Vec2::new(0.0, SHOULDER_Y))
            .pre_scale_non_uniform(1.0, proportions.body_scale)
            .pre_translate(Vec2::new(0.0, -SHOULDER_Y)),
        Space::Head => figure
            .pre_translate(Vec2::new(0.0, NECK_Y))
            .pre_scale(proportions.head_scale)
            .pre_translate(Vec2::new(0.0, -NECK_Y)),
    }
}

// ============================================================================
// Render Context
// ============================================================================

/// Options for one render.
///
/// ```
/// use figure_dresser::{RenderOptions, Slot};
///
/// let options = RenderOptions::transparent().without(Slot::Hand);
/// assert!(!options.draws(Slot::Background));
/// assert!(!options.draws(Slot::Hand));
/// assert!(options.draws(Slot::Head));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Draw the decorative slots (background, box, shadow, caption).
    pub include_background: bool,
    /// One bit per [`Slot`] left out of the render.
    skipped: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            include_background: true,
            skipped: 0,
        }
    }
}

impl RenderOptions {
    /// Every slot of the plan.
    pub fn full() -> Self {
        Self::default()
    }

    /// Figure slots only, on a transparent surface.
    pub fn transparent() -> Self {
        Self {
            include_background: false,
            ..Self::default()
        }
    }

    /// Leaves `slot` out entirely; its layer is not even begun.
    pub fn without(mut self, slot: Slot) -> Self {
        self.skipped |= slot.bit();
        self
    }

    /// Whether a render with these options draws `slot`.
    pub fn draws(self, slot: Slot) -> bool {
        let hidden = slot.is_decorative() && !self.include_background;
        !hidden && self.skipped & slot.bit() == 0
    }
}

/// Colors one slot borrows from another category's selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Companions {
    /// From the skin tone entry.
    pub skin: Color,
    /// From the top entry; sleeves match the torso.
    pub garment: Color,
}

/// Everything a draw routine may read: resolved entries, companion colors,
/// proportions and caption text.
pub struct RenderContext<'a> {
    pub config: &'a Configuration,
    pub base: &'static CatalogEntry,
    pub hair: &'static CatalogEntry,
    pub eyes: &'static CatalogEntry,
    pub brows: &'static CatalogEntry,
    pub mouth: &'static CatalogEntry,
    pub top: &'static CatalogEntry,
    pub bottom: &'static CatalogEntry,
    pub hat: &'static CatalogEntry,
    pub glasses: &'static CatalogEntry,
    pub neck: &'static CatalogEntry,
    pub hand: &'static CatalogEntry,
    pub stage: &'static CatalogEntry,
    pub box_theme: &'static CatalogEntry,
    pub companions: Companions,
}

impl<'a> RenderContext<'a> {
    /// Looks up every selection, substituting defaults for unknown ids.
    pub fn resolve(config: &'a Configuration) -> Self {
        let find = |category| Catalog::find(category, config.selection(category));
        Self {
            config,
            base: find(Category::Base),
            hair: find(Category::Hair),
            eyes: find(Category::Eyes),
            brows: find(Category::Brows),
            mouth: find(Category::Mouth),
            top: find(Category::Top),
            bottom: find(Category::Bottom),
            hat: find(Category::Hat),
            glasses: find(Category::Glasses),
            neck: find(Category::Neck),
            hand: find(Category::Hand),
            stage: find(Category::Stage),
            box_theme: find(Category::BoxTheme),
            companions: Companions {
                skin: find(Category::Skin).color_or("color", FALLBACK_COLOR),
                garment: find(Category::Top).color_or("color", FALLBACK_COLOR),
            },
        }
    }

    pub fn proportions(&self) -> &Proportions {
        &self.config.proportions
    }

    fn face(&self) -> FaceLayout {
        FaceLayout::new(self.base, self.proportions().eye_spacing)
    }
}

// ============================================================================
// Render
// ============================================================================

/// Draws `config` onto `surface`, one layer per slot in plan order.
///
/// With `include_background` unset the decorative slots are skipped entirely
/// and every figure slot is still drawn. Slots removed with
/// [`RenderOptions::without`] are skipped the same way.
///
/// # Example
///
/// ```
/// use figure_dresser::{Configuration, Recorder, RenderOptions, SizePx, Slot, render};
///
/// let mut rec = Recorder::new(SizePx::new(320, 380));
/// render(&Configuration::default(), &mut rec, RenderOptions::transparent());
/// assert_eq!(rec.layers().first(), Some(&Slot::Legs));
/// assert!(!rec.layers().contains(&Slot::Caption));
/// ```
#[tracing::instrument(
    level = "debug",
    skip_all,
    fields(include_background = options.include_background, skipped = options.skipped)
)]
pub fn render<S: Surface + ?Sized>(config: &Configuration, surface: &mut S, options: RenderOptions) {
    let ctx = RenderContext::resolve(config);
    let size = surface.size();

    for slot in Slot::PLAN.into_iter().filter(|slot| options.draws(*slot)) {
        tracing::trace!(
            slot = slot.name(),
            category = slot.category().map(Category::key),
            "drawing slot"
        );
        surface.begin_layer(slot);
        surface.save();
        let space = slot.space();
        if space != Space::Canvas {
            surface.transform(space_transform(space, size, ctx.proportions()));
        }
        draw_slot(slot, &ctx, surface, size);
        surface.restore();
        surface.end_layer();
    }
}

fn draw_slot<S: Surface + ?Sized>(slot: Slot, ctx: &RenderContext<'_>, s: &mut S, size: SizePx) {
    match slot {
        Slot::Background => scene::draw_background(s, size, ctx.stage),
        Slot::Box => scene::draw_box(s, size, ctx.box_theme),
        Slot::Shadow => scene::draw_shadow(s),
        Slot::Legs => body::draw_legs(s, ctx.bottom, &ctx.companions),
        Slot::Torso => body::draw_torso(s, ctx.top, &ctx.companions),
        Slot::Arms => body::draw_arms(s, &ctx.companions),
        Slot::Head => head::draw_head(s, ctx.base, &ctx.companions),
        Slot::Hair => head::draw_hair(s, ctx.hair, ctx.base),
        Slot::Hat => accessory::draw_hat(s, ctx.hat),
        Slot::Brows => head::draw_brows(s, ctx.brows, ctx.face()),
        Slot::Eyes => head::draw_eyes(s, ctx.eyes, ctx.face()),
        Slot::Mouth => head::draw_mouth(s, ctx.mouth, ctx.face()),
        Slot::Glasses => accessory::draw_glasses(s, ctx.glasses, ctx.face()),
        Slot::Neck => accessory::draw_neck(s, ctx.neck),
        Slot::Hand => accessory::draw_hand(s, ctx.hand),
        Slot::Caption => scene::draw_caption(s, size, &ctx.config.caption),
    }
}

// ============================================================================
// Draw helpers
// ============================================================================

/// Fills a shape and outlines it.
pub(crate) fn fill_outlined<S: Surface + ?Sized>(
    s: &mut S,
    shape: Shape,
    fill: Color,
    outline: Color,
    width: f64,
) {
    s.fill(&shape, &Paint::Solid(fill));
    s.stroke(&shape, &Paint::Solid(outline), StrokeStyle::new(width));
}

pub(crate) fn fill<S: Surface + ?Sized>(s: &mut S, shape: Shape, color: Color) {
    s.fill(&shape, &Paint::Solid(color));
}

pub(crate) fn stroke<S: Surface + ?Sized>(s: &mut S, shape: Shape, color: Color, width: f64) {
    s.stroke(&shape, &Paint::Solid(color), StrokeStyle::new(width));
}

/// Stroke with round caps.
pub(crate) fn stroke_round<S: Surface + ?Sized>(s: &mut S, shape: Shape, color: Color, width: f64) {
    s.stroke(&shape, &Paint::Solid(color), StrokeStyle::round(width));
}

/// A straight segment, for strokes.
pub(crate) fn line(x0: f64, y0: f64, x1: f64, y1: f64) -> Shape {
    let mut path = BezPath::new();
    path.move_to((x0, y0));
    path.line_to((x1, y1));
    Shape::Path(path)
}

/// Black at the given opacity, the outline color of most parts.
pub(crate) fn shade(opacity: f32) -> Color {
    Color::BLACK.alpha(opacity)
}

/// White at the given opacity, used for highlights.
pub(crate) fn highlight(opacity: f32) -> Color {
    Color::WHITE.alpha(opacity)
}

// ============================================================================
// CacheKey
// ============================================================================

/// Identifies one preview frame: the logical canvas it was drawn for and the
/// device scale it was rasterized at. The scale is kept as raw `f32` bits so
/// the key can be hashed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    width: u32,
    height: u32,
    scale_bits: u32,
}

impl CacheKey {
    pub fn new(width: u32, height: u32, scale: f32) -> Self {
        Self {
            width,
            height,
            scale_bits: scale.to_bits(),
        }
    }

    pub fn from_size(size: SizePx, scale: f32) -> Self {
        Self::new(size.width, size.height, scale)
    }
}

// ============================================================================
// Frame Cache
// ============================================================================

/// Rendered previews keyed by canvas and scale, each tagged with the
/// configuration version it was drawn from.
#[derive(Debug, Default)]
pub struct FrameCache {
    cache: HashMap<CacheKey, (RgbaImage, u64)>,
}

impl FrameCache {
    /// Gets a cached image if it was stored for `version`.
    pub fn get_cached(&self, key: CacheKey, version: u64) -> Option<&RgbaImage> {
        self.cache
            .get(&key)
            .and_then(|(img, stored)| (*stored == version).then_some(img))
    }

    pub fn store(&mut self, key: CacheKey, image: RgbaImage, version: u64) {
        self.cache.insert(key, (image, version));
    }

    /// Returns the image for `key` at `version`, rendering it on a miss.
    ///
    /// A stale entry is replaced; a failed render leaves the cache as it was.
    pub fn get_or_render<E>(
        &mut self,
        key: CacheKey,
        version: u64,
        render: impl FnOnce() -> Result<RgbaImage, E>,
    ) -> Result<&RgbaImage, E> {
        let slot = match self.cache.entry(key) {
            Entry::Occupied(entry) if entry.get().1 == version => {
                tracing::debug!(?key, version, "frame cache hit");
                entry.into_mut()
            }
            Entry::Occupied(mut entry) => {
                tracing::debug!(?key, version, "frame cache stale");
                entry.insert((render()?, version));
                entry.into_mut()
            }
            Entry::Vacant(entry) => {
                tracing::debug!(?key, version, "frame cache miss");
                entry.insert((render()?, version))
            }
        };
        Ok(&slot.0)
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================
