//! Event store backends
//!
//! This module defines the `EventStore` trait, the abstraction that lets
//! the engine run against any persistence layer without knowing its format.
//!
//! ## Design Philosophy
//!
//! The trait is intentionally minimal - it only defines the operations the
//! model actually needs:
//! - Load the full event history once, at initialization
//! - Write back a single updated event record
//!
//! All methods are async because storage involves I/O. Rust doesn't have
//! native async traits at this edition, so we use the `async_trait` macro.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::fs;
use tracing::debug;

use engagekit_core::{Error, Event, Result};

use crate::lock_or_recover;

/// The trait all event storage backends implement
///
/// `load` is called exactly once, when the model initializes; a returned
/// error drives the engine into its fail-closed state. `write_event`
/// persists one updated record and is called from a background task, so
/// failures are logged by the caller rather than surfaced.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Loads the complete event history
    async fn load(&self) -> Result<Vec<Event>>;

    /// Persists a single event record, replacing any previous version
    async fn write_event(&self, event: Event) -> Result<()>;
}

/// Zero-persistence backend for demo mode and tests
///
/// Events live only in memory; a restart starts from the seeded history
/// (empty by default).
#[derive(Default)]
pub struct InMemoryStore {
    events: Mutex<HashMap<String, Event>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-seeded with history, for tests
    pub fn with_events(events: Vec<Event>) -> Self {
        let map = events
            .into_iter()
            .map(|event| (event.name.clone(), event))
            .collect();
        Self {
            events: Mutex::new(map),
        }
    }
}

#[async_trait]
impl EventStore for InMemoryStore {
    async fn load(&self) -> Result<Vec<Event>> {
        Ok(lock_or_recover(&self.events).values().cloned().collect())
    }

    async fn write_event(&self, event: Event) -> Result<()> {
        lock_or_recover(&self.events).insert(event.name.clone(), event);
        Ok(())
    }
}

/// File-backed store: one JSON document under the host's storage directory
///
/// The document is a map of event name to record and is rewritten whole on
/// each `write_event`. A missing file is an empty history; an unreadable or
/// unparseable file is a load error.
pub struct JsonFileStore {
    path: PathBuf,
    cache: Mutex<HashMap<String, Event>>,
    // Serializes flushes: concurrent whole-file writes could land out of
    // order or tear the file.
    write_lock: tokio::sync::Mutex<()>,
}

impl JsonFileStore {
    /// File name inside the storage directory
    const FILE_NAME: &'static str = "events.json";

    /// Creates a store rooted at `storage_dir` (created if absent)
    pub fn new(storage_dir: impl AsRef<Path>) -> Result<Self> {
        let storage_dir = storage_dir.as_ref();
        std::fs::create_dir_all(storage_dir).map_err(|e| {
            Error::Storage(anyhow::anyhow!(
                "failed to create storage directory '{}': {}",
                storage_dir.display(),
                e
            ))
        })?;

        Ok(Self {
            path: storage_dir.join(Self::FILE_NAME),
            cache: Mutex::new(HashMap::new()),
            write_lock: tokio::sync::Mutex::new(()),
        })
    }

    async fn flush(&self) -> Result<()> {
        // The snapshot is taken under the write lock, so the last flush to
        // run always carries the newest cache state.
        let _guard = self.write_lock.lock().await;
        let json = {
            let cache = lock_or_recover(&self.cache);
            serde_json::to_vec(&*cache)?
        };

        // Write-then-rename keeps the document whole even if the process
        // dies mid-write.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).await.map_err(|e| {
            Error::Storage(anyhow::anyhow!(
                "failed to write '{}': {}",
                tmp.display(),
                e
            ))
        })?;
        fs::rename(&tmp, &self.path).await.map_err(|e| {
            Error::Storage(anyhow::anyhow!(
                "failed to replace '{}': {}",
                self.path.display(),
                e
            ))
        })
    }
}

#[async_trait]
impl EventStore for JsonFileStore {
    async fn load(&self) -> Result<Vec<Event>> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no event file yet, starting empty");
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(Error::Storage(anyhow::anyhow!(
                    "failed to read '{}': {}",
                    self.path.display(),
                    e
                )))
            }
        };

        let map: HashMap<String, Event> = serde_json::from_slice(&bytes)?;
        *lock_or_recover(&self.cache) = map.clone();
        Ok(map.into_values().collect())
    }

    async fn write_event(&self, event: Event) -> Result<()> {
        lock_or_recover(&self.cache).insert(event.name.clone(), event);
        self.flush().await
    }
}
