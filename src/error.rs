//! Error types for rendering, export, persistence and settings.

use std::time::Duration;

/// Failures while preparing a drawing surface.
#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("cannot allocate a {width}x{height} surface")]
    SurfaceAlloc { width: u32, height: u32 },
}

/// Failures of the export pipeline.
///
/// None of these leave a file behind or touch the live preview; an export
/// can simply be retried.
#[derive(thiserror::Error, Debug)]
pub enum ExportError {
    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("svg decode failed: {0}")]
    SvgDecode(String),

    #[error("svg decode did not finish within {0:?}")]
    DecodeTimeout(Duration),

    #[error("png encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("an export is already in progress")]
    Busy,

    #[error("cannot write export: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures of a [`Storage`](crate::persist::Storage) backend.
#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("storage quota exceeded ({needed} bytes needed, {quota} allowed)")]
    QuotaExceeded { needed: usize, quota: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failures while saving a configuration or writing a preset.
#[derive(thiserror::Error, Debug)]
pub enum PersistError {
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Rejected [`Configuration::set_field`](crate::Configuration::set_field) calls.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown field path: {0}")]
    UnknownField(String),

    #[error("field {field} expects {expected}")]
    InvalidValue {
        field: String,
        expected: &'static str,
    },
}

/// Invalid [`StudioSettings`](crate::StudioSettings).
#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    #[error("settings parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid setting {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SettingsError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages_name_the_problem() {
        let err = RenderError::SurfaceAlloc {
            width: 0,
            height: 10,
        };
        assert!(err.to_string().contains("0x10"));

        let err = ExportError::DecodeTimeout(Duration::from_millis(5));
        assert!(err.to_string().contains("did not finish"));

        let err = ConfigError::InvalidValue {
            field: "hair".into(),
            expected: "a string",
        };
        assert_eq!(err.to_string(), "field hair expects a string");
    }

    #[test]
    fn render_error_converts_into_export_error() {
        let err: ExportError = RenderError::SurfaceAlloc {
            width: 1,
            height: 0,
        }
        .into();
        assert!(matches!(err, ExportError::Render(_)));
    }
}
