//! Studio settings file.
//!
//! Every field has a default, so an empty object (or a missing file section)
//! is a valid settings document:
//!
//! ```json
//! {
//!   "canvas": { "width": 320, "height": 380 },
//!   "export": { "scale": 2.0, "backend": "raster", "subject": "figure", "decodeTimeoutMs": 10000 },
//!   "storage": { "key": "figure_dresser_simple_v1" },
//!   "autosave": { "debounceMs": 180 }
//! }
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::export::{Backend, DEFAULT_CANVAS, DEFAULT_DECODE_TIMEOUT, DEFAULT_EXPORT_SCALE};
use crate::persist::{DEFAULT_DEBOUNCE, STORAGE_KEY};
use crate::surface::SizePx;

/// Preview canvas size in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct CanvasSettings {
    pub width: u32,
    pub height: u32,
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            width: DEFAULT_CANVAS.width,
            height: DEFAULT_CANVAS.height,
        }
    }
}

impl CanvasSettings {
    pub fn size(&self) -> SizePx {
        SizePx::new(self.width, self.height)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct ExportSettings {
    /// Device pixels per logical pixel.
    pub scale: f32,
    pub backend: Backend,
    /// Leading part of export filenames.
    pub subject: String,
    pub decode_timeout_ms: u64,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            scale: DEFAULT_EXPORT_SCALE,
            backend: Backend::default(),
            subject: "figure".to_string(),
            decode_timeout_ms: DEFAULT_DECODE_TIMEOUT.as_millis() as u64,
        }
    }
}

impl ExportSettings {
    pub fn decode_timeout(&self) -> Duration {
        Duration::from_millis(self.decode_timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct StorageSettings {
    pub key: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            key: STORAGE_KEY.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct AutosaveSettings {
    pub debounce_ms: u64,
}

impl Default for AutosaveSettings {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE.as_millis() as u64,
        }
    }
}

impl AutosaveSettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

// ============================================================================
// StudioSettings
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct StudioSettings {
    pub canvas: CanvasSettings,
    pub export: ExportSettings,
    pub storage: StorageSettings,
    pub autosave: AutosaveSettings,
}

impl StudioSettings {
    /// Parses and validates a settings document.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reads and validates a settings file.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = fs::read_to_string(path)?;
        let settings = Self::from_json(&text)?;
        tracing::debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Checks the values serde cannot: non-empty canvas, positive scale and timeout, non-blank names.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.canvas.size().is_empty() {
            return Err(SettingsError::invalid("canvas", "width and height must be non-zero"));
        }
        let scale = self.export.scale;
        if !scale.is_finite() || scale <= 0.0 {
            return Err(SettingsError::invalid(
                "export.scale",
                format!("{scale} is not a positive number"),
            ));
        }
        if self.export.subject.trim().is_empty() {
            return Err(SettingsError::invalid("export.subject", "must not be empty"));
        }
        if self.export.decode_timeout_ms == 0 {
            return Err(SettingsError::invalid("export.decodeTimeoutMs", "must be positive"));
        }
        if self.storage.key.trim().is_empty() {
            return Err(SettingsError::invalid("storage.key", "must not be empty"));
        }
        Ok(())
    }
}
