//! Static registry of selectable figure parts.
//!
//! Every [`Category`] owns an ordered, non-empty list of [`CatalogEntry`]
//! values. The first entry of each list doubles as the category default, so
//! looking up an unknown id and selecting the default draw the same thing.

use serde::{Deserialize, Serialize};

use crate::color::Color;

// ============================================================================
// Category
// ============================================================================

/// A customization slot with its own catalog list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub enum Category {
    Base,
    Skin,
    Hair,
    Eyes,
    Brows,
    Mouth,
    Top,
    Bottom,
    Hat,
    Glasses,
    Neck,
    Hand,
    Stage,
    /// Packaging panel theme, stored under the `box` key.
    #[serde(rename = "box")]
    #[cfg_attr(feature = "clap", value(name = "box"))]
    BoxTheme,
}

impl Category {
    /// All categories in picker order.
    pub const ALL: [Category; 14] = [
        Category::Base,
        Category::Skin,
        Category::Hair,
        Category::Eyes,
        Category::Brows,
        Category::Mouth,
        Category::Top,
        Category::Bottom,
        Category::Hat,
        Category::Glasses,
        Category::Neck,
        Category::Hand,
        Category::Stage,
        Category::BoxTheme,
    ];

    /// The JSON key of this category.
    pub fn key(self) -> &'static str {
        match self {
            Category::Base => "base",
            Category::Skin => "skin",
            Category::Hair => "hair",
            Category::Eyes => "eyes",
            Category::Brows => "brows",
            Category::Mouth => "mouth",
            Category::Top => "top",
            Category::Bottom => "bottom",
            Category::Hat => "hat",
            Category::Glasses => "glasses",
            Category::Neck => "neck",
            Category::Hand => "hand",
            Category::Stage => "stage",
            Category::BoxTheme => "box",
        }
    }

    /// Parses a JSON key back into a category.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.key() == key)
    }

    /// Accessory categories live under the `extras` group of a configuration.
    pub fn is_accessory(self) -> bool {
        matches!(
            self,
            Category::Hat | Category::Glasses | Category::Neck | Category::Hand
        )
    }
}

// ============================================================================
// CatalogEntry
// ============================================================================

/// One selectable option within a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Unique within its category.
    pub id: &'static str,
    /// Display label.
    pub name: &'static str,
    /// Visual attributes such as `type`, `shape` or `color`.
    pub attributes: &'static [(&'static str, &'static str)],
}

impl CatalogEntry {
    /// Looks up an attribute value.
    pub fn attr(&self, key: &str) -> Option<&'static str> {
        self.attributes
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v)
    }

    /// The shape kind of this entry (`type`, then `shape`), or `"none"`.
    pub fn kind(&self) -> &'static str {
        self.attr("type")
            .or_else(|| self.attr("shape"))
            .unwrap_or("none")
    }

    /// Parses a color attribute, falling back when it is missing or malformed.
    pub fn color_or(&self, key: &str, fallback: Color) -> Color {
        self.attr(key).and_then(Color::from_hex).unwrap_or(fallback)
    }
}

const fn entry(
    id: &'static str,
    name: &'static str,
    attributes: &'static [(&'static str, &'static str)],
) -> CatalogEntry {
    CatalogEntry {
        id,
        name,
        attributes,
    }
}

// ============================================================================
// Catalog data
// ============================================================================

const BASES: &[CatalogEntry] = &[
    entry("base_round", "Round Hero", &[("shape", "round")]),
    entry("base_square", "Square Scout", &[("shape", "square")]),
    entry("base_slim", "Slim Runner", &[("shape", "slim")]),
];

const SKINS: &[CatalogEntry] = &[
    entry("skin_peach", "Peach", &[("color", "#efc1a0")]),
    entry("skin_light", "Light", &[("color", "#f6d7c3")]),
    entry("skin_tan", "Tan", &[("color", "#d9a37e")]),
    entry("skin_brown", "Brown", &[("color", "#a8714f")]),
    entry("skin_deep", "Deep", &[("color", "#6e4630")]),
];

const EYES: &[CatalogEntry] = &[
    entry("eyes_oval", "Oval", &[("type", "oval"), ("color", "#111827")]),
    entry("eyes_wide", "Wide", &[("type", "wide"), ("color", "#111827")]),
    entry("eyes_sleepy", "Sleepy", &[("type", "sleepy"), ("color", "#111827")]),
    entry("eyes_spark", "Spark", &[("type", "spark"), ("color", "#111827")]),
];

const BROWS: &[CatalogEntry] = &[
    entry("brows_soft", "Soft", &[("type", "soft"), ("color", "#221b1b")]),
    entry("brows_angled", "Angled", &[("type", "angled"), ("color", "#221b1b")]),
    entry("brows_flat", "Flat", &[("type", "flat"), ("color", "#221b1b")]),
    entry("brows_none", "No Brows", &[("type", "none"), ("color", "#221b1b")]),
];

const MOUTHS: &[CatalogEntry] = &[
    entry("mouth_smile", "Smile", &[("type", "smile"), ("color", "#8b1d2c")]),
    entry("mouth_grin", "Grin", &[("type", "grin"), ("color", "#8b1d2c")]),
    entry("mouth_ooh", "Ooh", &[("type", "ooh"), ("color", "#8b1d2c")]),
    entry("mouth_line", "Line", &[("type", "line"), ("color", "#7b1c26")]),
];

const HAIRS: &[CatalogEntry] = &[
    entry("hair_short", "Short", &[("type", "short"), ("color", "#2f2e36")]),
    entry("hair_none", "No Hair", &[("type", "none"), ("color", "#2b2b33")]),
    entry("hair_side", "Side Part", &[("type", "side"), ("color", "#1f1f27")]),
    entry("hair_curl", "Curly", &[("type", "curly"), ("color", "#2e241f")]),
    entry("hair_long", "Long", &[("type", "long"), ("color", "#2b2327")]),
    entry("hair_spike", "Spiky", &[("type", "spike"), ("color", "#1e2029")]),
];

const TOPS: &[CatalogEntry] = &[
    entry("top_tee", "T-Shirt", &[("type", "tee"), ("color", "#7f8cff")]),
    entry("top_hoodie", "Hoodie", &[("type", "hoodie"), ("color", "#4f66ff")]),
    entry("top_jacket", "Jacket", &[("type", "jacket"), ("color", "#2f3345")]),
    entry("top_shirt", "Shirt", &[("type", "shirt"), ("color", "#cfd8ff")]),
    entry("top_sweater", "Sweater", &[("type", "sweater"), ("color", "#7b6de3")]),
    entry("top_vest", "Vest", &[("type", "vest"), ("color", "#233142")]),
];

const BOTTOMS: &[CatalogEntry] = &[
    entry("bottom_jeans", "Jeans", &[("type", "jeans"), ("color", "#2f5ea8")]),
    entry("bottom_black", "Black Pants", &[("type", "pants"), ("color", "#242733")]),
    entry("bottom_shorts", "Shorts", &[("type", "shorts"), ("color", "#3b4257")]),
    entry("bottom_joggers", "Joggers", &[("type", "joggers"), ("color", "#4b4f63")]),
    entry("bottom_beige", "Beige Pants", &[("type", "pants"), ("color", "#c3ab8c")]),
    entry("bottom_skirt", "Skirt", &[("type", "skirt"), ("color", "#8b5cf6")]),
];

const HATS: &[CatalogEntry] = &[
    entry("hat_none", "No Hat", &[("type", "none"), ("color", "#000000")]),
    entry("hat_cap", "Cap", &[("type", "cap"), ("color", "#262d40")]),
    entry("hat_beanie", "Beanie", &[("type", "beanie"), ("color", "#5d3fd3")]),
    entry("hat_bucket", "Bucket", &[("type", "bucket"), ("color", "#4d5bd9")]),
];

const GLASSES: &[CatalogEntry] = &[
    entry("glasses_none", "No Glasses", &[("type", "none"), ("color", "#000000")]),
    entry("glasses_round", "Round Glasses", &[("type", "round"), ("color", "#1c2234")]),
    entry("glasses_square", "Square Glasses", &[("type", "square"), ("color", "#1a1f2f")]),
    entry("glasses_sun", "Sunglasses", &[("type", "sun"), ("color", "#111318")]),
];

const NECKS: &[CatalogEntry] = &[
    entry("neck_none", "No Accessory", &[("type", "none"), ("color", "#000")]),
    entry("neck_chain", "Chain", &[("type", "chain"), ("color", "#cfd4e8")]),
    entry("neck_scarf", "Scarf", &[("type", "scarf"), ("color", "#ff7aa2")]),
    entry("neck_tie", "Tie", &[("type", "tie"), ("color", "#6ea8ff")]),
];

const HANDS: &[CatalogEntry] = &[
    entry("hand_none", "Empty Hand", &[("type", "none"), ("color", "#000000")]),
    entry("hand_coffee", "Coffee", &[("type", "coffee"), ("color", "#fafaf9")]),
    entry("hand_controller", "Controller", &[("type", "controller"), ("color", "#111827")]),
    entry("hand_flower", "Flower", &[("type", "flower"), ("color", "#ef4444")]),
];

const STAGES: &[CatalogEntry] = &[
    entry(
        "stage_midnight",
        "Midnight",
        &[("bg", "#0b0f1d"), ("bg2", "#090b13"), ("glow", "#7f8cff")],
    ),
    entry(
        "stage_ocean",
        "Ocean",
        &[("bg", "#081523"), ("bg2", "#050d16"), ("glow", "#45d2ff")],
    ),
    entry(
        "stage_violet",
        "Violet",
        &[("bg", "#140f23"), ("bg2", "#0c0816"), ("glow", "#bf84ff")],
    ),
    entry(
        "stage_ember",
        "Ember",
        &[("bg", "#201109"), ("bg2", "#140a05"), ("glow", "#ff8a5f")],
    ),
];

const BOX_THEMES: &[CatalogEntry] = &[
    entry(
        "box_midnight",
        "Midnight",
        &[("from", "#1e1b4b"), ("mid", "#4338ca"), ("to", "#0f172a")],
    ),
    entry(
        "box_sunset",
        "Sunset",
        &[("from", "#f97316"), ("mid", "#db2777"), ("to", "#4c1d95")],
    ),
    entry(
        "box_mint",
        "Mint",
        &[("from", "#064e3b"), ("mid", "#10b981"), ("to", "#a7f3d0")],
    ),
    entry(
        "box_mono",
        "Mono",
        &[("from", "#111827"), ("mid", "#374151"), ("to", "#9ca3af")],
    ),
];

// ============================================================================
// Catalog
// ============================================================================

/// Read-only access to the built-in catalog.
pub struct Catalog;

impl Catalog {
    /// The ordered entries of a category. Never empty.
    pub fn list_for(category: Category) -> &'static [CatalogEntry] {
        match category {
            Category::Base => BASES,
            Category::Skin => SKINS,
            Category::Hair => HAIRS,
            Category::Eyes => EYES,
            Category::Brows => BROWS,
            Category::Mouth => MOUTHS,
            Category::Top => TOPS,
            Category::Bottom => BOTTOMS,
            Category::Hat => HATS,
            Category::Glasses => GLASSES,
            Category::Neck => NECKS,
            Category::Hand => HANDS,
            Category::Stage => STAGES,
            Category::BoxTheme => BOX_THEMES,
        }
    }

    /// The default (first) entry of a category.
    pub fn default_entry(category: Category) -> &'static CatalogEntry {
        &Self::list_for(category)[0]
    }

    /// Finds an entry by id, substituting the category default for unknown ids.
    pub fn find(category: Category, id: &str) -> &'static CatalogEntry {
        match Self::list_for(category).iter().find(|e| e.id == id) {
            Some(found) => found,
            None => {
                tracing::debug!(category = category.key(), id, "unknown catalog id, using default");
                Self::default_entry(category)
            }
        }
    }

    /// Returns true if `id` names an entry of `category`.
    pub fn contains(category: Category, id: &str) -> bool {
        Self::list_for(category).iter().any(|e| e.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_category_is_non_empty_with_unique_ids() {
        for category in Category::ALL {
            let list = Catalog::list_for(category);
            assert!(!list.is_empty(), "{category:?} has no entries");
            let ids: HashSet<_> = list.iter().map(|e| e.id).collect();
            assert_eq!(ids.len(), list.len(), "{category:?} has duplicate ids");
        }
    }

    #[test]
    fn find_falls_back_to_first_entry() {
        let found = Catalog::find(Category::Hair, "hair_mohawk");
        assert_eq!(found.id, "hair_short");
        assert_eq!(found, Catalog::default_entry(Category::Hair));
    }

    #[test]
    fn find_returns_exact_match() {
        let found = Catalog::find(Category::Bottom, "bottom_skirt");
        assert_eq!(found.kind(), "skirt");
        assert!(Catalog::contains(Category::Bottom, "bottom_skirt"));
        assert!(!Catalog::contains(Category::Top, "bottom_skirt"));
    }

    #[test]
    fn color_attribute_falls_back() {
        let stage = Catalog::default_entry(Category::Stage);
        let fallback = Color::rgb(1, 2, 3);
        assert_eq!(stage.color_or("color", fallback), fallback);
        assert_eq!(stage.color_or("glow", fallback), Color::rgb(0x7f, 0x8c, 0xff));
    }

    #[test]
    fn category_keys_round_trip() {
        for category in Category::ALL {
            assert_eq!(Category::from_key(category.key()), Some(category));
        }
        assert_eq!(Category::from_key("extras"), None);
        assert!(Category::Hat.is_accessory());
        assert!(Category::Hand.is_accessory());
        assert!(!Category::Stage.is_accessory());
        assert!(!Category::Eyes.is_accessory());
    }

    #[test]
    fn box_theme_uses_the_box_key() {
        assert_eq!(Category::from_key("box"), Some(Category::BoxTheme));
        assert_eq!(serde_json::to_string(&Category::BoxTheme).unwrap(), r#""box""#);
        let midnight = Catalog::default_entry(Category::BoxTheme);
        assert_eq!(midnight.id, "box_midnight");
        assert_eq!(midnight.color_or("mid", Color::BLACK), Color::rgb(0x43, 0x38, 0xca));
    }

    #[test]
    fn skin_tones_carry_a_color_and_default_to_peach() {
        let peach = Catalog::default_entry(Category::Skin);
        assert_eq!(peach.id, "skin_peach");
        for tone in Catalog::list_for(Category::Skin) {
            assert!(tone.attr("color").and_then(Color::from_hex).is_some(), "{}", tone.id);
        }
    }

    #[test]
    fn base_kind_reads_shape_attribute() {
        assert_eq!(Catalog::find(Category::Base, "base_slim").kind(), "slim");
        assert_eq!(Catalog::find(Category::Stage, "stage_ocean").kind(), "none");
    }
}
