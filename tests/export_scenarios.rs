use std::time::{Duration, Instant};

use figure_dresser::{
    Backend, Category, Compositor, Configuration, ExportMode, FileStorage, MemoryStorage,
    PersistenceAdapter, PixmapSurface, Recorder, RenderOptions, SaveStatus, SizePx, Slot, Studio,
    StudioSettings, import_preset, render,
};

fn decode(png: &[u8]) -> image::RgbaImage {
    image::load_from_memory(png).unwrap().to_rgba8()
}

#[test]
fn long_hair_scene_export() {
    let config = Configuration::default().with_selection(Category::Hair, "hair_long");
    let compositor = Compositor::default();

    let long = compositor.export_image(&config, ExportMode::Full).unwrap();
    assert!(long.filename.starts_with("figure-scene-"));
    assert!(long.filename.ends_with(".png"));
    assert_eq!((long.width, long.height), (640, 760));

    let short = compositor
        .export_image(&Configuration::default(), ExportMode::Full)
        .unwrap();
    let (long, short) = (decode(&long.png), decode(&short.png));

    // Hair covers figure x in [-54, 54] and y in [-178, -80], which at 2x
    // lands inside this box.
    let hair_box = |x: u32, y: u32| (230..=410).contains(&x) && (110..=285).contains(&y);
    let mut changed = 0;
    for (x, y, px) in long.enumerate_pixels() {
        if hair_box(x, y) {
            changed += usize::from(px != short.get_pixel(x, y));
        } else {
            assert_eq!(px, short.get_pixel(x, y), "pixel {x},{y} outside the hair");
        }
    }
    // The long locks alone span two 18x78 strips.
    assert!(changed > 2 * 18 * 78, "only {changed} pixels changed");

    // The locks reach below the short cut, down past the ears.
    let lock = long.get_pixel(320 - 65, 300 - 55);
    assert_ne!(lock, short.get_pixel(320 - 65, 300 - 55));
}

#[test]
fn hair_choice_only_touches_the_hair_layer() {
    let short = Configuration::default();
    let long = short.with_selection(Category::Hair, "hair_long");
    let size = SizePx::new(320, 380);

    let record = |config: &Configuration| {
        let mut rec = Recorder::new(size);
        render(config, &mut rec, RenderOptions::full());
        rec
    };
    let (a, b) = (record(&short), record(&long));
    for slot in Slot::PLAN {
        if slot == Slot::Hair {
            assert_ne!(a.layer_commands(slot), b.layer_commands(slot));
        } else {
            assert_eq!(a.layer_commands(slot), b.layer_commands(slot), "{slot:?}");
        }
    }

    let without_hair = RenderOptions::full().without(Slot::Hair);
    let raster = |config: &Configuration| {
        let mut surface = PixmapSurface::new(size, 1.0).unwrap();
        render(config, &mut surface, without_hair);
        surface.into_image()
    };
    assert_eq!(raster(&short), raster(&long));
}

#[test]
fn transparent_export_has_no_backdrop_or_caption() {
    let compositor = Compositor::default().with_scale(1.0);
    let image = compositor
        .export_image(&Configuration::default(), ExportMode::Transparent)
        .unwrap();
    assert!(image.filename.starts_with("figure-transparent-"));

    let pixels = decode(&image.png);
    for (x, y) in [(0, 0), (319, 0), (0, 379), (319, 379), (300, 20), (160, 360)] {
        assert_eq!(pixels.get_pixel(x, y)[3], 0, "pixel {x},{y}");
    }

    let mut rec = Recorder::new(SizePx::new(320, 380));
    render(&Configuration::default(), &mut rec, RenderOptions::transparent());
    assert!(rec.layers().iter().all(|slot| !slot.is_decorative()));
    assert!(!rec.layers().contains(&Slot::Caption));
}

#[test]
fn vector_and_raster_backends_agree_on_size() {
    let config = Configuration::default().with_selection(Category::Top, "top_jacket");
    let raster = Compositor::default().export_image(&config, ExportMode::Full).unwrap();
    let vector = Compositor::default()
        .with_backend(Backend::Vector)
        .export_image(&config, ExportMode::Full)
        .unwrap();
    assert_eq!((raster.width, raster.height), (vector.width, vector.height));
    assert_eq!(decode(&vector.png).dimensions(), (640, 760));
}

#[test]
fn wrong_typed_preset_field_keeps_default() {
    let imported = import_preset(br#"{"top": 123}"#);
    assert_eq!(imported.top, Configuration::default().top);
    assert_eq!(imported, Configuration::default());
}

#[test]
fn saved_configuration_loads_back_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let config = Configuration::default()
        .with_selection(Category::Hat, "hat_bucket")
        .with_selection(Category::Stage, "stage_ocean")
        .set_field(&["proportions", "eyeSpacing"], -3)
        .unwrap();

    let mut adapter = PersistenceAdapter::new(FileStorage::open(dir.path()).unwrap());
    adapter.save(&config).unwrap();

    let reopened = PersistenceAdapter::new(FileStorage::open(dir.path()).unwrap());
    assert_eq!(reopened.load(), config);
}

#[test]
fn burst_of_edits_is_saved_once_with_the_last_value() {
    let mut studio = Studio::open(MemoryStorage::new(), StudioSettings::default());
    let t0 = Instant::now();
    for (i, id) in ["top_tee", "top_shirt", "top_sweater"].iter().enumerate() {
        studio.select(Category::Top, id, t0 + Duration::from_millis(40 * i as u64));
    }

    let mut writes = 0;
    for ms in (0..=600).step_by(20) {
        if studio.tick(t0 + Duration::from_millis(ms)) {
            writes += 1;
        }
    }
    assert_eq!(writes, 1);
    assert_eq!(studio.save_status(), &SaveStatus::Saved);

    let stored = studio.storage().get(figure_dresser::STORAGE_KEY).unwrap();
    assert_eq!(Configuration::from_json(stored).unwrap().top, "top_sweater");
}

#[test]
fn quota_failure_is_reported_and_edits_survive() {
    let mut studio = Studio::open(MemoryStorage::new().with_quota(16), StudioSettings::default());
    let t0 = Instant::now();
    studio.select(Category::Hair, "hair_curl", t0);
    assert!(studio.tick(t0 + Duration::from_secs(1)));

    assert!(matches!(studio.save_status(), SaveStatus::Failed(_)));
    assert_eq!(studio.config().hair, "hair_curl");
    assert!(studio.storage().get(figure_dresser::STORAGE_KEY).is_none());
}
