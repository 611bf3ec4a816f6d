//! The figure configuration record and its copy-on-write operations.
//!
//! A [`Configuration`] is the single source of truth for one figure: one
//! selected catalog id per category, caption text and proportion sliders.
//! It serializes to the JSON shape used by both local storage and preset
//! files:
//!
//! ```json
//! {
//!   "base": "base_round",
//!   "skin": "skin_peach",
//!   "hair": "hair_short",
//!   "eyes": "eyes_oval",
//!   "brows": "brows_soft",
//!   "mouth": "mouth_smile",
//!   "top": "top_tee",
//!   "bottom": "bottom_jeans",
//!   "extras": {
//!     "hat": "hat_none", "glasses": "glasses_none", "neck": "neck_none", "hand": "hand_none"
//!   },
//!   "stage": "stage_midnight",
//!   "box": "box_midnight",
//!   "caption": { "title": "CUSTOM FIGURE", "subtitle": "Figure Dresser", "number": "001" },
//!   "proportions": { "headScale": 1.0, "bodyScale": 1.0, "eyeSpacing": 0.0 }
//! }
//! ```
//!
//! # Example
//!
//! ```
//! use figure_dresser::{Category, Configuration};
//!
//! let config = Configuration::default();
//! let longer = config.set_field(&["hair"], "hair_long").unwrap();
//! assert_eq!(longer.selection(Category::Hair), "hair_long");
//! assert_eq!(config.selection(Category::Hair), "hair_short");
//!
//! // Untrusted JSON never fails to merge.
//! let merged = config.merge(&serde_json::json!({ "top": 123 }));
//! assert_eq!(merged, config);
//! ```

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::catalog::{Catalog, Category};
use crate::error::ConfigError;

/// Maximum caption title length in characters.
pub const TITLE_MAX_CHARS: usize = 18;
/// Maximum caption subtitle length in characters.
pub const SUBTITLE_MAX_CHARS: usize = 26;
/// Maximum caption number length in digits.
pub const NUMBER_MAX_DIGITS: usize = 4;

/// Allowed `headScale` range.
pub const HEAD_SCALE_RANGE: (f64, f64) = (0.8, 1.25);
/// Allowed `bodyScale` range.
pub const BODY_SCALE_RANGE: (f64, f64) = (0.85, 1.2);
/// Allowed `eyeSpacing` range, in figure pixels.
pub const EYE_SPACING_RANGE: (f64, f64) = (-8.0, 8.0);

// ============================================================================
// Sub-records
// ============================================================================

/// Accessory selections, one id per accessory slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct Extras {
    pub hat: String,
    pub glasses: String,
    pub neck: String,
    /// Prop held in the right hand.
    pub hand: String,
}

impl Default for Extras {
    fn default() -> Self {
        let id = |c| Catalog::default_entry(c).id.to_string();
        Self {
            hat: id(Category::Hat),
            glasses: id(Category::Glasses),
            neck: id(Category::Neck),
            hand: id(Category::Hand),
        }
    }
}

/// Caption text drawn under the figure in full-scene renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct Caption {
    pub title: String,
    pub subtitle: String,
    pub number: String,
}

impl Default for Caption {
    fn default() -> Self {
        Self {
            title: "CUSTOM FIGURE".to_string(),
            subtitle: "Figure Dresser".to_string(),
            number: "001".to_string(),
        }
    }
}

impl Caption {
    /// Upper-cases and truncates a title.
    pub fn sanitize_title(raw: &str) -> String {
        raw.to_uppercase().chars().take(TITLE_MAX_CHARS).collect()
    }

    /// Truncates a subtitle.
    pub fn sanitize_subtitle(raw: &str) -> String {
        raw.chars().take(SUBTITLE_MAX_CHARS).collect()
    }

    /// Keeps only ASCII digits, truncated.
    pub fn sanitize_number(raw: &str) -> String {
        raw.chars()
            .filter(char::is_ascii_digit)
            .take(NUMBER_MAX_DIGITS)
            .collect()
    }
}

/// Numeric proportion sliders.
///
/// Scales are quantized to 0.01 and eye spacing to whole pixels, matching
/// the slider steps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct Proportions {
    pub head_scale: f64,
    pub body_scale: f64,
    pub eye_spacing: f64,
}

impl Default for Proportions {
    fn default() -> Self {
        Self {
            head_scale: 1.0,
            body_scale: 1.0,
            eye_spacing: 0.0,
        }
    }
}

impl Proportions {
    pub fn sanitize_head_scale(v: f64) -> f64 {
        quantize(v, 100.0, HEAD_SCALE_RANGE)
    }

    pub fn sanitize_body_scale(v: f64) -> f64 {
        quantize(v, 100.0, BODY_SCALE_RANGE)
    }

    pub fn sanitize_eye_spacing(v: f64) -> f64 {
        quantize(v, 1.0, EYE_SPACING_RANGE)
    }
}

fn quantize(v: f64, steps_per_unit: f64, (lo, hi): (f64, f64)) -> f64 {
    let clamped = v.clamp(lo, hi);
    (clamped * steps_per_unit).round() / steps_per_unit
}

// ============================================================================
// Configuration
// ============================================================================

/// The full set of user choices describing one figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct Configuration {
    pub base: String,
    pub skin: String,
    pub hair: String,
    pub eyes: String,
    pub brows: String,
    pub mouth: String,
    pub top: String,
    pub bottom: String,
    pub extras: Extras,
    pub stage: String,
    #[serde(rename = "box")]
    pub box_theme: String,
    pub caption: Caption,
    pub proportions: Proportions,
}

impl Default for Configuration {
    fn default() -> Self {
        let id = |c| Catalog::default_entry(c).id.to_string();
        Self {
            base: id(Category::Base),
            skin: id(Category::Skin),
            hair: id(Category::Hair),
            eyes: id(Category::Eyes),
            brows: id(Category::Brows),
            mouth: id(Category::Mouth),
            top: id(Category::Top),
            bottom: id(Category::Bottom),
            extras: Extras::default(),
            stage: id(Category::Stage),
            box_theme: id(Category::BoxTheme),
            caption: Caption::default(),
            proportions: Proportions::default(),
        }
    }
}

/// A settable location inside a [`Configuration`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Selection(Category),
    Title,
    Subtitle,
    Number,
    HeadScale,
    BodyScale,
    EyeSpacing,
}

impl Field {
    fn from_path(path: &[&str]) -> Option<Self> {
        match path {
            ["extras", key] => Category::from_key(key)
                .filter(|c| c.is_accessory())
                .map(Field::Selection),
            ["caption", "title"] => Some(Field::Title),
            ["caption", "subtitle"] => Some(Field::Subtitle),
            ["caption", "number"] => Some(Field::Number),
            ["proportions", "headScale"] => Some(Field::HeadScale),
            ["proportions", "bodyScale"] => Some(Field::BodyScale),
            ["proportions", "eyeSpacing"] => Some(Field::EyeSpacing),
            [key] => Category::from_key(key)
                .filter(|c| !c.is_accessory())
                .map(Field::Selection),
            _ => None,
        }
    }
}

impl Configuration {
    /// The selected id for a category (which may be unknown to the catalog).
    pub fn selection(&self, category: Category) -> &str {
        match category {
            Category::Base => &self.base,
            Category::Skin => &self.skin,
            Category::Hair => &self.hair,
            Category::Eyes => &self.eyes,
            Category::Brows => &self.brows,
            Category::Mouth => &self.mouth,
            Category::Top => &self.top,
            Category::Bottom => &self.bottom,
            Category::Hat => &self.extras.hat,
            Category::Glasses => &self.extras.glasses,
            Category::Neck => &self.extras.neck,
            Category::Hand => &self.extras.hand,
            Category::Stage => &self.stage,
            Category::BoxTheme => &self.box_theme,
        }
    }

    fn selection_mut(&mut self, category: Category) -> &mut String {
        match category {
            Category::Base => &mut self.base,
            Category::Skin => &mut self.skin,
            Category::Hair => &mut self.hair,
            Category::Eyes => &mut self.eyes,
            Category::Brows => &mut self.brows,
            Category::Mouth => &mut self.mouth,
            Category::Top => &mut self.top,
            Category::Bottom => &mut self.bottom,
            Category::Hat => &mut self.extras.hat,
            Category::Glasses => &mut self.extras.glasses,
            Category::Neck => &mut self.extras.neck,
            Category::Hand => &mut self.extras.hand,
            Category::Stage => &mut self.stage,
            Category::BoxTheme => &mut self.box_theme,
        }
    }

    /// Returns a copy with one category selection replaced.
    pub fn with_selection(&self, category: Category, id: &str) -> Self {
        let mut next = self.clone();
        *next.selection_mut(category) = id.to_string();
        next
    }

    /// Overlays untrusted JSON onto this configuration.
    ///
    /// Only values of the expected JSON type are taken: strings for ids and
    /// caption text, objects for `extras`/`caption`/`proportions`, finite
    /// numbers for sliders. Caption text is bounded and sliders clamped.
    /// Anything else is ignored, so this never fails.
    pub fn merge(&self, incoming: &Value) -> Self {
        let mut out = self.clone();
        let Some(obj) = incoming.as_object() else {
            tracing::debug!("ignoring non-object configuration payload");
            return out;
        };

        for category in Category::ALL.into_iter().filter(|c| !c.is_accessory()) {
            if let Some(id) = string_field(obj, category.key()) {
                *out.selection_mut(category) = id.to_string();
            }
        }

        if let Some(extras) = object_field(obj, "extras") {
            for category in Category::ALL.into_iter().filter(|c| c.is_accessory()) {
                if let Some(id) = string_field(extras, category.key()) {
                    *out.selection_mut(category) = id.to_string();
                }
            }
        }

        if let Some(caption) = object_field(obj, "caption") {
            if let Some(title) = string_field(caption, "title") {
                out.caption.title = Caption::sanitize_title(title);
            }
            if let Some(subtitle) = string_field(caption, "subtitle") {
                out.caption.subtitle = Caption::sanitize_subtitle(subtitle);
            }
            if let Some(number) = string_field(caption, "number") {
                out.caption.number = Caption::sanitize_number(number);
            }
        }

        if let Some(props) = object_field(obj, "proportions") {
            if let Some(v) = number_field(props, "headScale") {
                out.proportions.head_scale = Proportions::sanitize_head_scale(v);
            }
            if let Some(v) = number_field(props, "bodyScale") {
                out.proportions.body_scale = Proportions::sanitize_body_scale(v);
            }
            if let Some(v) = number_field(props, "eyeSpacing") {
                out.proportions.eye_spacing = Proportions::sanitize_eye_spacing(v);
            }
        }

        out
    }

    /// Picks a uniformly random entry for every category using the
    /// thread-local (unseeded) generator.
    pub fn randomize(&self) -> Self {
        self.randomize_with(&mut rand::thread_rng())
    }

    /// Like [`randomize`](Self::randomize) with a caller-supplied generator.
    ///
    /// The caption number is regenerated as a random three-digit string;
    /// title, subtitle and proportions are kept.
    pub fn randomize_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Self {
        let mut next = self.clone();
        for category in Category::ALL {
            if let Some(entry) = Catalog::list_for(category).choose(rng) {
                *next.selection_mut(category) = entry.id.to_string();
            }
        }
        next.caption.number = rng.gen_range(100..=999).to_string();
        next
    }

    /// Returns a copy with the field at `path` replaced by `value`.
    ///
    /// Valid paths are `[category]` for the non-accessory categories
    /// (base, skin, hair, eyes, brows, mouth, top, bottom, stage, box),
    /// `["extras", hat|glasses|neck|hand]`, `["caption", title|subtitle|number]`
    /// and `["proportions", headScale|bodyScale|eyeSpacing]`. The receiver
    /// is never modified.
    pub fn set_field(&self, path: &[&str], value: impl Into<Value>) -> Result<Self, ConfigError> {
        let field =
            Field::from_path(path).ok_or_else(|| ConfigError::UnknownField(path.join(".")))?;
        let value = value.into();
        let invalid = |expected| ConfigError::InvalidValue {
            field: path.join("."),
            expected,
        };

        let mut next = self.clone();
        match field {
            Field::Selection(category) => {
                let id = value.as_str().ok_or_else(|| invalid("a string id"))?;
                *next.selection_mut(category) = id.to_string();
            }
            Field::Title => {
                let text = value.as_str().ok_or_else(|| invalid("a string"))?;
                next.caption.title = Caption::sanitize_title(text);
            }
            Field::Subtitle => {
                let text = value.as_str().ok_or_else(|| invalid("a string"))?;
                next.caption.subtitle = Caption::sanitize_subtitle(text);
            }
            Field::Number => {
                let text = value.as_str().ok_or_else(|| invalid("a string"))?;
                next.caption.number = Caption::sanitize_number(text);
            }
            Field::HeadScale => {
                let v = finite(&value).ok_or_else(|| invalid("a finite number"))?;
                next.proportions.head_scale = Proportions::sanitize_head_scale(v);
            }
            Field::BodyScale => {
                let v = finite(&value).ok_or_else(|| invalid("a finite number"))?;
                next.proportions.body_scale = Proportions::sanitize_body_scale(v);
            }
            Field::EyeSpacing => {
                let v = finite(&value).ok_or_else(|| invalid("a finite number"))?;
                next.proportions.eye_spacing = Proportions::sanitize_eye_spacing(v);
            }
        }
        Ok(next)
    }

    /// Serializes the configuration to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serializes the configuration to a pretty-printed JSON string.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Strictly deserializes a configuration; missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Parses any text and merges it onto the defaults. Never fails.
    pub fn from_json_lenient(json: &str) -> Self {
        match serde_json::from_str::<Value>(json) {
            Ok(value) => Self::default().merge(&value),
            Err(err) => {
                tracing::warn!(%err, "unparseable configuration, using defaults");
                Self::default()
            }
        }
    }
}

fn string_field<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    obj.get(key).and_then(Value::as_str)
}

fn object_field<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a Map<String, Value>> {
    obj.get(key).and_then(Value::as_object)
}

fn number_field(obj: &Map<String, Value>, key: &str) -> Option<f64> {
    obj.get(key).and_then(finite)
}

fn finite(value: &Value) -> Option<f64> {
    value.as_f64().filter(|v| v.is_finite())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use serde_json::json;

    #[test]
    fn merge_empty_object_yields_defaults() {
        let defaults = Configuration::default();
        assert_eq!(defaults.merge(&json!({})), defaults);
        assert_eq!(defaults.merge(&Value::Null), defaults);
        assert_eq!(defaults.merge(&json!([1, 2, 3])), defaults);
    }

    #[test]
    fn merge_ignores_wrong_types() {
        let defaults = Configuration::default();
        let merged = defaults.merge(&json!({
            "top": 123,
            "extras": "hat_cap",
            "caption": { "title": false },
            "proportions": { "headScale": "big" }
        }));
        assert_eq!(merged, defaults);
    }

    #[test]
    fn merge_takes_valid_fields_and_keeps_unknown_ids() {
        let merged = Configuration::default().merge(&json!({
            "hair": "hair_long",
            "bottom": "bottom_unknown",
            "extras": { "hat": "hat_cap", "scarf": "x" },
            "unrelated": { "deep": true }
        }));
        assert_eq!(merged.hair, "hair_long");
        assert_eq!(merged.bottom, "bottom_unknown");
        assert_eq!(merged.extras.hat, "hat_cap");
        assert_eq!(merged.extras.glasses, "glasses_none");
    }

    #[test]
    fn face_parts_hand_and_box_are_selectable() {
        let merged = Configuration::default().merge(&json!({
            "skin": "skin_deep",
            "eyes": "eyes_spark",
            "mouth": "mouth_ooh",
            "box": "box_sunset",
            "extras": { "hand": "hand_flower" }
        }));
        assert_eq!(merged.selection(Category::Skin), "skin_deep");
        assert_eq!(merged.selection(Category::Eyes), "eyes_spark");
        assert_eq!(merged.selection(Category::Brows), "brows_soft");
        assert_eq!(merged.selection(Category::Mouth), "mouth_ooh");
        assert_eq!(merged.box_theme, "box_sunset");
        assert_eq!(merged.extras.hand, "hand_flower");

        let next = merged.set_field(&["extras", "hand"], "hand_coffee").unwrap();
        assert_eq!(next.extras.hand, "hand_coffee");
        assert!(next.set_field(&["hand"], "hand_coffee").is_err());
        let boxed = next.set_field(&["box"], "box_mint").unwrap();
        assert!(boxed.to_json().unwrap().contains(r#""box":"box_mint""#));
    }

    #[test]
    fn merge_bounds_text_and_sliders() {
        let merged = Configuration::default().merge(&json!({
            "caption": {
                "title": "a very long title that keeps going",
                "subtitle": "x".repeat(40),
                "number": "12ab345"
            },
            "proportions": { "headScale": 9.0, "bodyScale": 0.1, "eyeSpacing": 3.6 }
        }));
        assert_eq!(merged.caption.title, "A VERY LONG TITLE ");
        assert_eq!(merged.caption.subtitle.chars().count(), SUBTITLE_MAX_CHARS);
        assert_eq!(merged.caption.number, "1234");
        assert_eq!(merged.proportions.head_scale, 1.25);
        assert_eq!(merged.proportions.body_scale, 0.85);
        assert_eq!(merged.proportions.eye_spacing, 4.0);
    }

    #[test]
    fn set_field_is_copy_on_write() {
        let original = Configuration::default();
        let snapshot = original.clone();
        let next = original.set_field(&["extras", "glasses"], "glasses_sun").unwrap();
        assert_eq!(original, snapshot);
        assert_eq!(next.extras.glasses, "glasses_sun");
        assert_eq!(next.with_selection(Category::Glasses, "glasses_none"), original);
    }

    #[test]
    fn set_field_rejects_bad_paths_and_values() {
        let config = Configuration::default();
        assert_eq!(
            config.set_field(&["hat"], "hat_cap"),
            Err(ConfigError::UnknownField("hat".into()))
        );
        assert_eq!(
            config.set_field(&["extras", "base"], "base_round"),
            Err(ConfigError::UnknownField("extras.base".into()))
        );
        assert!(matches!(
            config.set_field(&["top"], 123),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            config.set_field(&["proportions", "headScale"], "1.1"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn set_field_sanitizes_values() {
        let config = Configuration::default()
            .set_field(&["caption", "title"], "marko")
            .unwrap()
            .set_field(&["proportions", "headScale"], 1.5)
            .unwrap();
        assert_eq!(config.caption.title, "MARKO");
        assert_eq!(config.proportions.head_scale, 1.25);
    }

    #[test]
    fn randomize_keeps_text_and_regenerates_number() {
        let mut rng = StdRng::seed_from_u64(7);
        let config = Configuration::default()
            .set_field(&["caption", "title"], "hero")
            .unwrap();
        let random = config.randomize_with(&mut rng);
        assert_eq!(random.caption.title, "HERO");
        assert_eq!(random.caption.number.len(), 3);
        assert_eq!(random.proportions, config.proportions);
    }

    #[test]
    fn json_round_trip_uses_camel_case() {
        let config = Configuration::default()
            .set_field(&["proportions", "eyeSpacing"], -3)
            .unwrap();
        let json = config.to_json_pretty().unwrap();
        assert!(json.contains("\"eyeSpacing\""));
        assert!(json.contains("\"extras\""));
        assert_eq!(Configuration::from_json(&json).unwrap(), config);
    }

    #[test]
    fn lenient_parse_never_fails() {
        assert_eq!(Configuration::from_json_lenient("not json"), Configuration::default());
        assert_eq!(
            Configuration::from_json_lenient(r#"{"hair":"hair_curl"}"#).hair,
            "hair_curl"
        );
    }

    proptest! {
        #[test]
        fn randomize_only_yields_catalog_ids(seed in any::<u64>()) {
            let random = Configuration::default().randomize_with(&mut StdRng::seed_from_u64(seed));
            for category in Category::ALL {
                prop_assert!(Catalog::contains(category, random.selection(category)));
            }
        }

        #[test]
        fn merge_never_panics_on_arbitrary_json(
            key in "[a-z]{1,8}",
            text in ".{0,40}",
            number in any::<f64>(),
        ) {
            let payload = json!({
                key.clone(): text.clone(),
                "extras": { key.clone(): number },
                "caption": { "title": text.clone(), "number": text },
                "proportions": { "headScale": number, "eyeSpacing": number }
            });
            let merged = Configuration::default().merge(&payload);
            prop_assert!(merged.caption.title.chars().count() <= TITLE_MAX_CHARS);
            prop_assert!(merged.proportions.head_scale >= HEAD_SCALE_RANGE.0);
            prop_assert!(merged.proportions.head_scale <= HEAD_SCALE_RANGE.1);
        }
    }
}
