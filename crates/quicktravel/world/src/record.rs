//! Persisted actor records
//!
//! Offline actors only exist as records on disk. The relocation core needs
//! one thing from them: the resting block they last set.

use crate::traits::RecordStore;
use parking_lot::RwLock;
use quicktravel_types::{ActorId, BlockPos};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File extension of a persisted record
const RECORD_EXTENSION: &str = "json";

/// The fields of a persisted record this crate reads.
///
/// Records may carry any number of other fields; they are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedRecord {
    /// Resting block, east-west
    #[serde(rename = "SpawnX", default, skip_serializing_if = "Option::is_none")]
    pub spawn_x: Option<i32>,
    /// Resting block, vertical
    #[serde(rename = "SpawnY", default, skip_serializing_if = "Option::is_none")]
    pub spawn_y: Option<i32>,
    /// Resting block, north-south
    #[serde(rename = "SpawnZ", default, skip_serializing_if = "Option::is_none")]
    pub spawn_z: Option<i32>,
}

impl PersistedRecord {
    /// A record with a resting block
    pub fn with_spawn(block: BlockPos) -> Self {
        Self {
            spawn_x: Some(block.x),
            spawn_y: Some(block.y),
            spawn_z: Some(block.z),
        }
    }

    /// The resting block, if all three fields are present
    pub fn spawn(&self) -> Option<BlockPos> {
        match (self.spawn_x, self.spawn_y, self.spawn_z) {
            (Some(x), Some(y), Some(z)) => Some(BlockPos::new(x, y, z)),
            _ => None,
        }
    }
}

/// Records stored as `<actor-id>.json` files in one directory.
pub struct FileRecordStore {
    dir: PathBuf,
}

impl FileRecordStore {
    /// Create a store over `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Get the record directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the record for `id`
    pub fn record_path(&self, id: &ActorId) -> PathBuf {
        self.dir.join(format!("{}.{}", id, RECORD_EXTENSION))
    }

    fn read_record(&self, id: &ActorId) -> Option<PersistedRecord> {
        let path = self.record_path(id);
        if !path.is_file() {
            debug!(actor = %id, "No persisted record");
            return None;
        }

        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!(actor = %id, error = %e, "Failed to load persisted record");
                return None;
            }
        };

        match serde_json::from_str(&contents) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(actor = %id, error = %e, "Failed to load persisted record");
                None
            }
        }
    }
}

impl RecordStore for FileRecordStore {
    fn saved_actor_ids(&self) -> Vec<ActorId> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(dir = %self.dir.display(), error = %e, "Cannot list persisted records");
                return Vec::new();
            }
        };

        entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some(RECORD_EXTENSION))
            .filter_map(|path| path.file_stem()?.to_str()?.parse().ok())
            .collect()
    }

    fn load_record(&self, id: &ActorId) -> Option<BlockPos> {
        self.read_record(id)?.spawn()
    }
}

/// In-memory record store for development and testing.
#[derive(Default)]
pub struct InMemoryRecordStore {
    records: RwLock<HashMap<ActorId, PersistedRecord>>,
}

impl InMemoryRecordStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Save a record
    pub fn insert(&self, id: ActorId, record: PersistedRecord) {
        self.records.write().insert(id, record);
    }

    /// Save a record holding only a resting block
    pub fn insert_spawn(&self, id: ActorId, block: BlockPos) {
        self.insert(id, PersistedRecord::with_spawn(block));
    }

    /// Number of saved records
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Whether no record is saved
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl RecordStore for InMemoryRecordStore {
    fn saved_actor_ids(&self) -> Vec<ActorId> {
        self.records.read().keys().copied().collect()
    }

    fn load_record(&self, id: &ActorId) -> Option<BlockPos> {
        self.records.read().get(id)?.spawn()
    }
}
