//! The editing session: current configuration, autosave and caches.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::time::Instant;

use image::RgbaImage;
use rand::Rng;
use serde_json::Value;

use crate::catalog::{Catalog, Category};
use crate::config::Configuration;
use crate::error::{ConfigError, ExportError, PersistError, RenderError};
use crate::export::{Compositor, ExportMode, ExportedImage};
use crate::layer::{CacheKey, FrameCache, RenderOptions, render};
use crate::persist::{PersistenceAdapter, SaveScheduler, Storage, export_preset, import_preset};
use crate::settings::StudioSettings;
use crate::surface::PixmapSurface;
use crate::thumbnail::thumbnail_image;

/// Autosave state, as shown next to the editor.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SaveStatus {
    /// Nothing changed since the session was opened.
    #[default]
    Idle,
    Pending,
    Saved,
    Failed(String),
}

/// Outcome of the last export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    ExportReady(String),
    ExportFailed(String),
}

// ============================================================================
// Studio
// ============================================================================

/// Owns the configuration being edited.
///
/// Every edit replaces the configuration with a new value, bumps the version
/// and schedules a debounced save. Time is passed in explicitly; callers
/// drive autosave with [`tick`](Self::tick).
///
/// # Example
///
/// ```
/// use std::time::{Duration, Instant};
/// use figure_dresser::{Category, MemoryStorage, SaveStatus, Studio, StudioSettings};
///
/// let mut studio = Studio::open(MemoryStorage::new(), StudioSettings::default());
/// let now = Instant::now();
/// studio.select(Category::Hair, "hair_long", now);
/// assert_eq!(studio.save_status(), &SaveStatus::Pending);
///
/// studio.tick(now + Duration::from_millis(200));
/// assert_eq!(studio.save_status(), &SaveStatus::Saved);
/// ```
pub struct Studio<S: Storage> {
    config: Configuration,
    version: u64,
    settings: StudioSettings,
    persistence: PersistenceAdapter<S>,
    scheduler: SaveScheduler,
    save_status: SaveStatus,
    compositor: Compositor,
    previews: FrameCache,
    thumbnails: HashMap<(Category, &'static str), RgbaImage>,
    notice: Option<Notice>,
}

impl<S: Storage> Studio<S> {
    /// Starts a session from whatever `storage` holds.
    pub fn open(storage: S, settings: StudioSettings) -> Self {
        let persistence = PersistenceAdapter::with_key(storage, settings.storage.key.clone());
        let config = persistence.load();
        tracing::info!(key = persistence.key(), "studio opened");

        Self {
            config,
            version: 0,
            scheduler: SaveScheduler::new(settings.autosave.debounce()),
            compositor: Compositor::from_settings(&settings),
            settings,
            persistence,
            save_status: SaveStatus::Idle,
            previews: FrameCache::default(),
            thumbnails: HashMap::new(),
            notice: None,
        }
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// Incremented on every edit.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn settings(&self) -> &StudioSettings {
        &self.settings
    }

    pub fn save_status(&self) -> &SaveStatus {
        &self.save_status
    }

    pub fn storage(&self) -> &S {
        self.persistence.storage()
    }

    /// Takes the last export notice, if any.
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    fn commit(&mut self, next: Configuration, now: Instant) {
        self.config = next;
        self.version += 1;
        self.scheduler.schedule(self.config.clone(), now);
        self.save_status = SaveStatus::Pending;
    }

    // ------------------------------------------------------------------------
    // Edits
    // ------------------------------------------------------------------------

    /// Selects `id` for `category` and schedules a save. Unknown ids are kept.
    pub fn select(&mut self, category: Category, id: &str, now: Instant) {
        let next = self.config.with_selection(category, id);
        self.commit(next, now);
    }

    /// See [`Configuration::set_field`]; a rejected value changes nothing.
    pub fn set_field(
        &mut self,
        path: &[&str],
        value: impl Into<Value>,
        now: Instant,
    ) -> Result<(), ConfigError> {
        let next = self.config.set_field(path, value)?;
        self.commit(next, now);
        Ok(())
    }

    /// Picks a random entry in every category and a new caption number.
    pub fn randomize(&mut self, now: Instant) {
        self.randomize_with(&mut rand::thread_rng(), now);
    }

    /// Like [`Studio::randomize`] with a caller-supplied generator.
    pub fn randomize_with<R: Rng + ?Sized>(&mut self, rng: &mut R, now: Instant) {
        let next = self.config.randomize_with(rng);
        self.commit(next, now);
    }

    /// Back to the default configuration.
    pub fn reset(&mut self, now: Instant) {
        self.commit(Configuration::default(), now);
    }

    /// Replaces the configuration with a preset; unusable presets reset to
    /// defaults.
    pub fn import_preset(&mut self, bytes: &[u8], now: Instant) {
        let next = import_preset(bytes);
        self.commit(next, now);
    }

    /// The current configuration as pretty-printed preset JSON.
    pub fn export_preset(&self) -> Result<String, PersistError> {
        export_preset(&self.config)
    }

    // ------------------------------------------------------------------------
    // Autosave
    // ------------------------------------------------------------------------

    /// Writes the pending save if its quiet period has elapsed.
    ///
    /// Returns `true` when a write was attempted.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.scheduler.take_due(now) {
            Some(config) => {
                self.write(&config);
                true
            }
            None => false,
        }
    }

    /// Writes any pending save immediately.
    pub fn flush(&mut self) -> bool {
        match self.scheduler.flush() {
            Some(config) => {
                self.write(&config);
                true
            }
            None => false,
        }
    }

    fn write(&mut self, config: &Configuration) {
        self.save_status = match self.persistence.save(config) {
            Ok(()) => SaveStatus::Saved,
            Err(err) => {
                tracing::warn!(%err, "autosave failed");
                SaveStatus::Failed(err.to_string())
            }
        };
    }

    // ------------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------------

    /// The full scene at `scale`, re-rendered only after an edit.
    pub fn preview(&mut self, scale: f32) -> Result<&RgbaImage, RenderError> {
        let canvas = self.settings.canvas.size();
        let config = &self.config;
        self.previews
            .get_or_render(CacheKey::from_size(canvas, scale), self.version, || {
                let mut surface = PixmapSurface::new(canvas, scale)?;
                render(config, &mut surface, RenderOptions::full());
                Ok(surface.into_image())
            })
    }

    /// Picker thumbnail for `id`; unknown ids show the category default.
    pub fn thumbnail(&mut self, category: Category, id: &str) -> Result<&RgbaImage, RenderError> {
        let entry = Catalog::find(category, id);
        match self.thumbnails.entry((category, entry.id)) {
            Entry::Occupied(slot) => Ok(&*slot.into_mut()),
            Entry::Vacant(slot) => Ok(&*slot.insert(thumbnail_image(category, entry)?)),
        }
    }

    /// Exports the current configuration and records a [`Notice`].
    pub fn export(&mut self, mode: ExportMode) -> Result<ExportedImage, ExportError> {
        let result = self.compositor.export_image(&self.config, mode);
        self.notice = Some(match &result {
            Ok(image) => Notice::ExportReady(image.filename.clone()),
            Err(err) => Notice::ExportFailed(err.to_string()),
        });
        result
    }
}
