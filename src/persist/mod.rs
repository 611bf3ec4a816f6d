//! Saving and loading configurations.
//!
//! Everything read back from storage or from a preset file goes through
//! [`Configuration::merge`], so stale or hand-edited documents degrade to
//! defaults field by field instead of failing.

mod debounce;
mod storage;

pub use debounce::{DEFAULT_DEBOUNCE, SaveScheduler};
pub use storage::{FileStorage, MemoryStorage, Storage};

use std::path::{Path, PathBuf};

use crate::config::Configuration;
use crate::error::PersistError;

/// Storage key of the current record layout. Bumping the suffix abandons
/// older records.
pub const STORAGE_KEY: &str = "figure_dresser_simple_v1";

/// Suggested filename for exported presets.
pub const PRESET_FILENAME: &str = "figure-preset.json";

/// Reads and writes one configuration record in a [`Storage`].
#[derive(Debug, Clone)]
pub struct PersistenceAdapter<S> {
    storage: S,
    key: String,
}

impl<S: Storage> PersistenceAdapter<S> {
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, STORAGE_KEY)
    }

    /// An adapter that reads and writes under `key` instead of [`STORAGE_KEY`].
    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Writes the whole configuration under the adapter's key.
    pub fn save(&mut self, config: &Configuration) -> Result<(), PersistError> {
        let json = config.to_json()?;
        self.storage.write(&self.key, &json)?;
        tracing::info!(key = %self.key, bytes = json.len(), "saved configuration");
        Ok(())
    }

    /// The stored configuration, or defaults when there is nothing usable.
    pub fn load(&self) -> Configuration {
        match self.storage.read(&self.key) {
            Ok(Some(text)) if !text.trim().is_empty() => Configuration::from_json_lenient(&text),
            Ok(_) => {
                tracing::debug!(key = %self.key, "no saved configuration");
                Configuration::default()
            }
            Err(err) => {
                tracing::warn!(key = %self.key, %err, "cannot read saved configuration");
                Configuration::default()
            }
        }
    }
}

/// Pretty JSON for a preset file.
pub fn export_preset(config: &Configuration) -> Result<String, PersistError> {
    Ok(config.to_json_pretty()?)
}

/// Writes a preset as [`PRESET_FILENAME`] inside `dir`.
pub fn write_preset(config: &Configuration, dir: &Path) -> Result<PathBuf, PersistError> {
    let json = export_preset(config)?;
    let mut storage = FileStorage::open(dir)?;
    let stem = PRESET_FILENAME.trim_end_matches(".json");
    storage.write(stem, &json)?;
    Ok(storage.path_for(stem))
}

/// Reads preset bytes; anything unusable yields defaults.
pub fn import_preset(bytes: &[u8]) -> Configuration {
    match std::str::from_utf8(bytes) {
        Ok(text) => Configuration::from_json_lenient(text),
        Err(err) => {
            tracing::warn!(%err, "preset is not utf-8, using defaults");
            Configuration::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, Category};
    use crate::error::StorageError;
    use proptest::prelude::*;
    use proptest::sample::Index;

    /// An edited configuration: catalog ids plus free-form caption and slider input.
    fn edited_config() -> impl Strategy<Value = Configuration> {
        (
            prop::collection::vec(any::<Index>(), Category::ALL.len()),
            "[ -~]{0,30}",
            "[ -~]{0,40}",
            "[0-9a-z]{0,6}",
            (0.5f64..1.6, 0.5f64..1.6, -12.0f64..12.0),
        )
            .prop_map(|(picks, title, subtitle, number, (head, body, eyes))| {
                let mut config = Configuration::default();
                for (category, pick) in Category::ALL.into_iter().zip(picks) {
                    let entries = Catalog::list_for(category);
                    config = config.with_selection(category, entries[pick.index(entries.len())].id);
                }
                let edits: [(&[&str], serde_json::Value); 6] = [
                    (&["caption", "title"], title.into()),
                    (&["caption", "subtitle"], subtitle.into()),
                    (&["caption", "number"], number.into()),
                    (&["proportions", "headScale"], head.into()),
                    (&["proportions", "bodyScale"], body.into()),
                    (&["proportions", "eyeSpacing"], eyes.into()),
                ];
                edits
                    .into_iter()
                    .fold(config, |c, (path, value)| c.set_field(path, value).unwrap())
            })
    }

    proptest! {
        #[test]
        fn saved_configurations_load_back_unchanged(config in edited_config()) {
            let mut memory = PersistenceAdapter::new(MemoryStorage::new());
            memory.save(&config).unwrap();
            prop_assert_eq!(memory.load(), config.clone());

            let dir = tempfile::tempdir().unwrap();
            let mut files = PersistenceAdapter::new(FileStorage::open(dir.path()).unwrap());
            files.save(&config).unwrap();
            let reopened = PersistenceAdapter::new(FileStorage::open(dir.path()).unwrap());
            prop_assert_eq!(reopened.load(), config);
        }
    }

    #[test]
    fn load_of_empty_storage_is_default() {
        let adapter = PersistenceAdapter::new(MemoryStorage::new());
        assert_eq!(adapter.load(), Configuration::default());
    }

    #[test]
    fn save_then_load_round_trips() {
        let mut adapter = PersistenceAdapter::new(MemoryStorage::new());
        let config = Configuration::default()
            .with_selection(Category::Hair, "hair_long")
            .set_field(&["proportions", "headScale"], 1.13)
            .unwrap()
            .set_field(&["caption", "title"], "rex")
            .unwrap();
        adapter.save(&config).unwrap();
        assert!(adapter.storage().get(STORAGE_KEY).is_some());
        assert_eq!(adapter.load(), config);
    }

    #[test]
    fn corrupt_or_blank_records_load_as_defaults() {
        for junk in ["", "   ", "{not json", "[1,2,3]", "null"] {
            let mut storage = MemoryStorage::new();
            storage.insert(STORAGE_KEY, junk);
            assert_eq!(
                PersistenceAdapter::new(storage).load(),
                Configuration::default(),
                "{junk:?}"
            );
        }
    }

    #[test]
    fn partial_record_keeps_good_fields() {
        let mut storage = MemoryStorage::new();
        storage.insert(STORAGE_KEY, r#"{"hair":"hair_side","top":false}"#);
        let loaded = PersistenceAdapter::new(storage).load();
        assert_eq!(loaded.hair, "hair_side");
        assert_eq!(loaded.top, Configuration::default().top);
    }

    #[test]
    fn quota_failure_surfaces_as_persist_error() {
        let mut adapter = PersistenceAdapter::new(MemoryStorage::new().with_quota(10));
        let err = adapter.save(&Configuration::default()).unwrap_err();
        assert!(matches!(
            err,
            PersistError::Storage(StorageError::QuotaExceeded { .. })
        ));
    }

    #[test]
    fn other_keys_are_ignored() {
        let mut storage = MemoryStorage::new();
        storage.insert("figure_dresser_simple_v0", r#"{"hair":"hair_long"}"#);
        assert_eq!(PersistenceAdapter::new(storage).load(), Configuration::default());
    }

    #[test]
    fn preset_with_wrong_types_keeps_defaults() {
        let imported = import_preset(br#"{"top": 123, "bottom": "bottom_skirt"}"#);
        assert_eq!(imported.top, Configuration::default().top);
        assert_eq!(imported.bottom, "bottom_skirt");
        assert_eq!(import_preset(&[0xff, 0xfe]), Configuration::default());
    }

    #[test]
    fn preset_file_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let config = Configuration::default().with_selection(Category::Neck, "neck_tie");
        let path = write_preset(&config, dir.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), PRESET_FILENAME);
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.contains(&b'\n'));
        assert_eq!(import_preset(&bytes), config);
    }
}
