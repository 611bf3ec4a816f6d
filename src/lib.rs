//! figure-dresser: a layered figure renderer for avatar customizers
//!
//! A [`Configuration`] picks one [`CatalogEntry`] per [`Category`] plus a
//! caption and a few proportion sliders. The layer renderer turns it into a
//! fixed stack of drawing steps on any [`Surface`]: a tiny-skia pixmap, an
//! SVG document or a command recorder.
//!
//! # Example
//!
//! ```
//! use figure_dresser::{
//!     Category, Configuration, PixmapSurface, RenderOptions, SizePx, render,
//! };
//!
//! let config = Configuration::default()
//!     .with_selection(Category::Hair, "hair_long")
//!     .set_field(&["caption", "title"], "weekend")
//!     .unwrap();
//! assert_eq!(config.caption.title, "WEEKEND");
//!
//! let mut surface = PixmapSurface::new(SizePx::new(320, 380), 1.0).unwrap();
//! render(&config, &mut surface, RenderOptions::full());
//! let image = surface.into_image();
//! assert_eq!(image.dimensions(), (320, 380));
//! ```
//!
//! # Sessions
//!
//! [`Studio`] keeps the configuration being edited, autosaves it through a
//! [`Storage`] backend and caches previews and thumbnails:
//!
//! ```
//! use std::time::Instant;
//! use figure_dresser::{ExportMode, MemoryStorage, Studio, StudioSettings};
//!
//! let mut studio = Studio::open(MemoryStorage::new(), StudioSettings::default());
//! studio.randomize(Instant::now());
//! let png = studio.export(ExportMode::Transparent).unwrap();
//! assert!(png.filename.ends_with(".png"));
//! ```

mod catalog;
mod color;
mod config;
mod error;
mod export;
mod layer;
mod persist;
mod settings;
mod studio;
mod surface;
mod thumbnail;

pub use catalog::{Catalog, CatalogEntry, Category};
pub use color::{Color, FALLBACK_COLOR};
pub use config::{Caption, Configuration, Extras, Proportions};
pub use error::{ConfigError, ExportError, PersistError, RenderError, SettingsError, StorageError};
pub use export::{Backend, Compositor, ExportMode, ExportedImage, decode_with_timeout, export_filename};
pub use layer::{
    CacheKey, Companions, FrameCache, LayerKind, RenderContext, RenderOptions, Slot,
    figure_transform, render,
};
pub use persist::{
    FileStorage, MemoryStorage, PRESET_FILENAME, PersistenceAdapter, STORAGE_KEY, SaveScheduler,
    Storage, export_preset, import_preset, write_preset,
};
pub use settings::{AutosaveSettings, CanvasSettings, ExportSettings, StorageSettings, StudioSettings};
pub use studio::{Notice, SaveStatus, Studio};
pub use surface::{
    Affine, BezPath, DrawCommand, LineCap, Paint, PixmapSurface, Point, Recorder, Shape, SizePx,
    Stop, StrokeStyle, Surface, SvgSurface, TextAnchor, TextRun, Vec2, rasterize_svg,
};
pub use thumbnail::{THUMBNAIL_SIZE, picker_strip, render_thumbnail, thumbnail_image};
