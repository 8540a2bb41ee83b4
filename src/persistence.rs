//! Layout persistence.
//!
//! Committed block geometry is mirrored into a host-provided string
//! key-value store as one versioned JSON record. The schema version is part
//! of the storage key, so a format change simply misses the old record and
//! the canvas starts from defaults. Loading is forgiving: each numeric field
//! is checked individually and falls back to the caller's default for that
//! block, so a corrupt record can never block the first render.

use std::io;
use std::path::PathBuf;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::common::collections::HashMap;
use crate::model::workspace::{BlockId, BlockLayout};

pub const SCHEMA_VERSION: u32 = 2;

pub fn storage_key() -> String { format!("tabula.layout.v{SCHEMA_VERSION}") }

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend failed: {0}")]
    Backend(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// The storage substrate the host provides — a flat string key-value space,
/// like a browser's local storage or a small settings database.
pub trait LayoutStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// In-memory store for tests and hosts that opt out of durability.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }
}

impl LayoutStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// One file per key under a data directory.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: PathBuf) -> Self { Self { dir } }

    pub fn at_data_dir() -> Self { Self::new(crate::common::config::data_dir()) }

    fn path_for(&self, key: &str) -> PathBuf { self.dir.join(format!("{key}.json")) }
}

impl LayoutStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// The per-block shape inside the stored record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StoredBlock {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub z: u64,
}

impl From<BlockLayout> for StoredBlock {
    fn from(layout: BlockLayout) -> Self {
        Self {
            x: layout.rect.x,
            y: layout.rect.y,
            width: layout.rect.width,
            height: layout.rect.height,
            z: layout.z,
        }
    }
}

#[derive(Serialize)]
struct StoredRecord<'a> {
    version: u32,
    blocks: &'a HashMap<String, StoredBlock>,
}

/// Write every block layout as one record under the versioned key.
pub fn save_layouts<'a>(
    store: &mut dyn LayoutStore,
    layouts: impl IntoIterator<Item = (BlockId, BlockLayout)>,
) -> Result<(), StoreError> {
    let blocks: HashMap<String, StoredBlock> = layouts
        .into_iter()
        .map(|(id, layout)| (id.to_string(), StoredBlock::from(layout)))
        .collect();
    let record = StoredRecord {
        version: SCHEMA_VERSION,
        blocks: &blocks,
    };
    let payload =
        serde_json::to_string(&record).map_err(|err| StoreError::Backend(err.to_string()))?;
    store.set(&storage_key(), &payload)
}

/// The raw loaded record. Blocks stay as JSON values until a caller asks for
/// one with its default; sanitization happens per field at that point.
#[derive(Debug, Default)]
pub struct SavedLayouts {
    blocks: HashMap<String, Value>,
}

impl SavedLayouts {
    pub fn is_empty(&self) -> bool { self.blocks.is_empty() }

    /// Resolve the stored geometry for `id`, field-by-field. Anything that is
    /// not a finite number (or, for z, not an integer) falls back to the
    /// matching field of `default`. Unknown extra fields are ignored.
    pub fn block(&self, id: &BlockId, default: StoredBlock) -> StoredBlock {
        let Some(raw) = self.blocks.get(&id.to_string()) else {
            return default;
        };
        StoredBlock {
            x: finite_or(raw.get("x"), default.x),
            y: finite_or(raw.get("y"), default.y),
            width: finite_or(raw.get("width"), default.width),
            height: finite_or(raw.get("height"), default.height),
            z: raw.get("z").and_then(Value::as_u64).unwrap_or(default.z),
        }
    }
}

fn finite_or(value: Option<&Value>, default: f64) -> f64 {
    match value.and_then(Value::as_f64) {
        Some(num) if num.is_finite() => num,
        _ => default,
    }
}

/// Read the stored record. Never fails: a missing key, a backend error, a
/// version mismatch, or malformed JSON all come back as an empty result.
pub fn load_layouts(store: &dyn LayoutStore) -> SavedLayouts {
    let raw = match store.get(&storage_key()) {
        Ok(Some(raw)) => raw,
        Ok(None) => return SavedLayouts::default(),
        Err(err) => {
            warn!("layout store read failed: {err}");
            return SavedLayouts::default();
        }
    };

    let value: Value = match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(err) => {
            warn!("discarding malformed layout record: {err}");
            return SavedLayouts::default();
        }
    };

    if value.get("version").and_then(Value::as_u64) != Some(SCHEMA_VERSION as u64) {
        warn!("discarding layout record with unexpected version");
        return SavedLayouts::default();
    }

    let blocks = match value.get("blocks") {
        Some(Value::Object(map)) => {
            map.iter().map(|(key, value)| (key.clone(), value.clone())).collect()
        }
        _ => {
            warn!("layout record has no blocks object");
            HashMap::default()
        }
    };

    debug!("loaded {} stored block layout(s)", blocks.len());
    SavedLayouts { blocks }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::model::workspace::ProjectId;

    fn block_id() -> BlockId { BlockId::list(ProjectId::from("p1")) }

    fn default_block() -> StoredBlock {
        StoredBlock {
            x: 48.0,
            y: 48.0,
            width: 520.0,
            height: 660.0,
            z: 1,
        }
    }

    #[test]
    fn test_round_trip() {
        let mut store = MemoryStore::new();
        let layout = BlockLayout::new(Rect::new(10.0, 20.0, 400.0, 500.0), 9);
        save_layouts(&mut store, [(block_id(), layout)]).unwrap();

        let saved = load_layouts(&store);
        let restored = saved.block(&block_id(), default_block());
        assert_eq!(restored, StoredBlock::from(layout));
    }

    #[test]
    fn test_missing_record_is_empty() {
        let store = MemoryStore::new();
        assert!(load_layouts(&store).is_empty());
    }

    #[test]
    fn test_malformed_json_is_discarded() {
        let mut store = MemoryStore::new();
        store.set(&storage_key(), "{not json").unwrap();
        assert!(load_layouts(&store).is_empty());
    }

    #[test]
    fn test_version_mismatch_is_discarded() {
        let mut store = MemoryStore::new();
        store.set(&storage_key(), r#"{"version":1,"blocks":{}}"#).unwrap();
        assert!(load_layouts(&store).is_empty());
    }

    #[test]
    fn test_partial_block_falls_back_per_field() {
        let mut store = MemoryStore::new();
        let payload = format!(
            r#"{{"version":{SCHEMA_VERSION},"blocks":{{"p1/list":{{"x":100.0,"width":"wide","z":4,"extra":true}}}}}}"#
        );
        store.set(&storage_key(), &payload).unwrap();

        let saved = load_layouts(&store);
        let block = saved.block(&block_id(), default_block());
        assert_eq!(block.x, 100.0); // valid field kept
        assert_eq!(block.y, 48.0); // missing -> default
        assert_eq!(block.width, 520.0); // wrong type -> default
        assert_eq!(block.z, 4);
    }

    #[test]
    fn test_null_fields_fall_back() {
        let mut store = MemoryStore::new();
        let payload = format!(
            r#"{{"version":{SCHEMA_VERSION},"blocks":{{"p1/list":{{"x":null,"y":12.0,"z":-3}}}}}}"#
        );
        store.set(&storage_key(), &payload).unwrap();

        let saved = load_layouts(&store);
        let block = saved.block(&block_id(), default_block());
        assert_eq!(block.y, 12.0);
        assert_eq!(block.x, 48.0);
        assert_eq!(block.z, 1); // negative z is not a valid stacking index
    }

    #[test]
    fn test_unknown_block_uses_default() {
        let mut store = MemoryStore::new();
        save_layouts(&mut store, []).unwrap();
        let saved = load_layouts(&store);
        assert_eq!(saved.block(&block_id(), default_block()), default_block());
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path().to_path_buf());

        assert!(store.get("missing").unwrap().is_none());
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        store.remove("k").unwrap();
        assert!(store.get("k").unwrap().is_none());
        store.remove("k").unwrap(); // second remove is fine
    }
}
