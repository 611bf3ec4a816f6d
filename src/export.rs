//! Offscreen PNG export.
//!
//! Every export renders onto a fresh surface, so the live preview is never
//! touched. Two backends share the layer renderer:
//!
//! - [`Backend::Raster`] draws straight onto a scaled pixmap.
//! - [`Backend::Vector`] renders into an SVG document, then parses and
//!   rasterizes it on a worker thread bounded by a decode timeout.
//!
//! # Example
//!
//! ```
//! use figure_dresser::{Compositor, Configuration, ExportMode};
//!
//! let compositor = Compositor::default();
//! let image = compositor
//!     .export_image(&Configuration::default(), ExportMode::Transparent)
//!     .unwrap();
//! assert!(image.filename.starts_with("figure-transparent-"));
//! assert_eq!((image.width, image.height), (640, 760));
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::config::Configuration;
use crate::error::ExportError;
use crate::layer::{RenderOptions, render};
use crate::settings::StudioSettings;
use crate::surface::{PixmapSurface, SizePx, SvgSurface, encode_png, rasterize_svg};

/// Default export canvas in logical pixels.
pub const DEFAULT_CANVAS: SizePx = SizePx::new(320, 380);
/// Default device scale of exports.
pub const DEFAULT_EXPORT_SCALE: f32 = 2.0;
/// Default bound on the vector decode step.
pub const DEFAULT_DECODE_TIMEOUT: Duration = Duration::from_secs(10);

// ============================================================================
// Modes and backends
// ============================================================================

/// Which layers an export includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum ExportMode {
    /// Background, shadow, figure and caption.
    Full,
    /// The figure alone on a transparent background.
    Transparent,
}

impl ExportMode {
    /// Filename tag.
    pub fn tag(self) -> &'static str {
        match self {
            ExportMode::Full => "scene",
            ExportMode::Transparent => "transparent",
        }
    }

    /// Slots drawn for this mode.
    pub fn render_options(self) -> RenderOptions {
        match self {
            ExportMode::Full => RenderOptions::full(),
            ExportMode::Transparent => RenderOptions::transparent(),
        }
    }
}

/// How an export is rasterized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub enum Backend {
    #[default]
    Raster,
    Vector,
}

/// `<subject>-<tag>-<YYYY-MM-DD-HH-MM-SS>.png`, timestamp in UTC.
pub fn export_filename(subject: &str, mode: ExportMode, at: DateTime<Utc>) -> String {
    format!("{subject}-{}-{}.png", mode.tag(), at.format("%Y-%m-%d-%H-%M-%S"))
}

// ============================================================================
// ExportedImage
// ============================================================================

/// An encoded export, ready to be written out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedImage {
    pub filename: String,
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl ExportedImage {
    /// Writes the PNG into `dir` under its filename.
    ///
    /// The bytes go to a `.part` file first and are renamed into place, so a
    /// failed write never leaves a truncated PNG behind.
    pub fn write_to_dir(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        let path = dir.join(&self.filename);
        let partial = dir.join(format!("{}.part", self.filename));

        let written = fs::write(&partial, &self.png).and_then(|()| fs::rename(&partial, &path));
        if let Err(err) = written {
            let _ = fs::remove_file(&partial);
            return Err(err.into());
        }
        tracing::info!(path = %path.display(), bytes = self.png.len(), "wrote export");
        Ok(path)
    }
}

// ============================================================================
// Compositor
// ============================================================================

/// Renders configurations into PNG exports.
///
/// A compositor runs one export at a time; a second call while one is in
/// flight fails fast with [`ExportError::Busy`].
#[derive(Debug)]
pub struct Compositor {
    canvas: SizePx,
    scale: f32,
    backend: Backend,
    subject: String,
    decode_timeout: Duration,
    busy: AtomicBool,
}

impl Default for Compositor {
    fn default() -> Self {
        Self {
            canvas: DEFAULT_CANVAS,
            scale: DEFAULT_EXPORT_SCALE,
            backend: Backend::default(),
            subject: "figure".to_string(),
            decode_timeout: DEFAULT_DECODE_TIMEOUT,
            busy: AtomicBool::new(false),
        }
    }
}

/// Clears the busy flag when an export finishes, however it finishes.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Compositor {
    /// A compositor configured from the `canvas` and `export` settings.
    pub fn from_settings(settings: &StudioSettings) -> Self {
        Self::default()
            .with_canvas(settings.canvas.size())
            .with_scale(settings.export.scale)
            .with_backend(settings.export.backend)
            .with_subject(settings.export.subject.clone())
            .with_decode_timeout(settings.export.decode_timeout())
    }

    /// Logical canvas size, before the export scale.
    pub fn with_canvas(mut self, canvas: SizePx) -> Self {
        self.canvas = canvas;
        self
    }

    /// Device pixels per logical pixel.
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// Raster draws directly; vector goes through an SVG document.
    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    /// Leading part of export filenames.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// How long the vector backend waits for its rasterized image.
    pub fn with_decode_timeout(mut self, timeout: Duration) -> Self {
        self.decode_timeout = timeout;
        self
    }

    pub fn canvas(&self) -> SizePx {
        self.canvas
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// Whether an export is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    fn begin(&self) -> Result<BusyGuard<'_>, ExportError> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| BusyGuard(&self.busy))
            .map_err(|_| ExportError::Busy)
    }

    /// Renders, rasterizes and encodes one export.
    #[tracing::instrument(skip(self, config), fields(backend = ?self.backend, scale = self.scale))]
    pub fn export_image(
        &self,
        config: &Configuration,
        mode: ExportMode,
    ) -> Result<ExportedImage, ExportError> {
        let _guard = self.begin()?;

        let image = match self.backend {
            Backend::Raster => self.render_raster(config, mode)?,
            Backend::Vector => self.render_vector(config, mode)?,
        };
        let png = encode_png(&image)?;
        let filename = export_filename(&self.subject, mode, Utc::now());
        tracing::info!(%filename, bytes = png.len(), "export ready");

        Ok(ExportedImage {
            filename,
            png,
            width: image.width(),
            height: image.height(),
        })
    }

    /// The vector document an export would rasterize.
    pub fn export_svg(&self, config: &Configuration, mode: ExportMode) -> String {
        let mut surface = SvgSurface::new(self.canvas);
        render(config, &mut surface, mode.render_options());
        surface.finish()
    }

    fn render_raster(&self, config: &Configuration, mode: ExportMode) -> Result<RgbaImage, ExportError> {
        let mut surface = PixmapSurface::new(self.canvas, self.scale)?;
        render(config, &mut surface, mode.render_options());
        Ok(surface.into_image())
    }

    fn render_vector(&self, config: &Configuration, mode: ExportMode) -> Result<RgbaImage, ExportError> {
        let document = self.export_svg(config, mode);
        decode_with_timeout(document, self.scale, self.decode_timeout)
    }
}

/// Rasterizes `document` on a worker thread, giving up after `timeout`.
///
/// A timed-out worker is left to finish on its own; its result is dropped.
pub fn decode_with_timeout(
    document: String,
    scale: f32,
    timeout: Duration,
) -> Result<RgbaImage, ExportError> {
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("svg-decode".into())
        .spawn(move || {
            let _ = tx.send(rasterize_svg(&document, scale));
        })?;

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => {
            tracing::warn!(?timeout, "svg decode timed out");
            Err(ExportError::DecodeTimeout(timeout))
        }
        Err(RecvTimeoutError::Disconnected) => {
            Err(ExportError::SvgDecode("decoder exited without a result".into()))
        }
    }
}
