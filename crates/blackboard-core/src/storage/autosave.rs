//! Periodic persistence of the board to a storage slot.

use crate::document::{self, BoardDocument};
use crate::storage::{Storage, StorageError, StorageResult};
use crate::store::ElementStore;
use std::sync::Arc;

#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

#[cfg(target_arch = "wasm32")]
use web_time::{Duration, Instant};

/// Default auto-save interval in seconds.
pub const DEFAULT_AUTOSAVE_INTERVAL_SECS: u64 = 30;

/// Slot the autosave writes to.
pub const AUTOSAVE_KEY: &str = "blackboard_autosave";

/// Saves the board on a fixed interval while running and dirty.
///
/// The manager does not own a timer; the host calls [`AutoSaveManager::tick_at`]
/// from its event loop.
pub struct AutoSaveManager<S: Storage> {
    storage: Arc<S>,
    key: String,
    interval: Duration,
    /// Start of the current interval. `None` while stopped.
    period_start: Option<Instant>,
    last_save: Option<Instant>,
    /// Whether the board has unsaved changes.
    dirty: bool,
}

impl<S: Storage> AutoSaveManager<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            storage,
            key: AUTOSAVE_KEY.to_string(),
            interval: Duration::from_secs(DEFAULT_AUTOSAVE_INTERVAL_SECS),
            period_start: None,
            last_save: None,
            dirty: false,
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Start the timer. Starting while running is a no-op.
    pub fn start_at(&mut self, now: Instant) {
        if self.period_start.is_none() {
            self.period_start = Some(now);
            log::debug!("Autosave started ({}s)", self.interval.as_secs());
        }
    }

    pub fn start(&mut self) {
        self.start_at(Instant::now());
    }

    /// Stop the timer. Stopping while stopped is a no-op.
    pub fn stop(&mut self) {
        if self.period_start.take().is_some() {
            log::debug!("Autosave stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.period_start.is_some()
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn last_save(&self) -> Option<Instant> {
        self.last_save
    }

    /// Whether a tick at `now` would save.
    pub fn should_save_at(&self, now: Instant) -> bool {
        match self.period_start {
            Some(start) => self.dirty && now.saturating_duration_since(start) >= self.interval,
            None => false,
        }
    }

    /// Save the store if running, dirty and the interval has elapsed.
    ///
    /// Each elapsed interval starts a new period whether or not a save happened.
    /// Returns true if a save was performed.
    pub async fn tick_at(&mut self, now: Instant, store: &ElementStore) -> StorageResult<bool> {
        let Some(start) = self.period_start else {
            return Ok(false);
        };
        if now.saturating_duration_since(start) < self.interval {
            return Ok(false);
        }
        self.period_start = Some(now);
        if !self.dirty {
            return Ok(false);
        }
        self.save_at(now, store).await?;
        Ok(true)
    }

    pub async fn tick(&mut self, store: &ElementStore) -> StorageResult<bool> {
        self.tick_at(Instant::now(), store).await
    }

    /// Force a save now, regardless of the timer.
    pub async fn save(&mut self, store: &ElementStore) -> StorageResult<()> {
        self.save_at(Instant::now(), store).await
    }

    async fn save_at(&mut self, now: Instant, store: &ElementStore) -> StorageResult<()> {
        let document = document::serialize(store)?;
        self.storage.save(&self.key, &document).await?;
        self.last_save = Some(now);
        self.dirty = false;
        log::info!("Autosaved {} elements to {}", document.element_count, self.key);
        Ok(())
    }

    /// Load the autosave slot into the store.
    ///
    /// Returns `Ok(None)` if nothing has been saved yet. A failed load leaves
    /// the store unchanged.
    pub async fn restore(&mut self, store: &mut ElementStore) -> StorageResult<Option<usize>> {
        let document: BoardDocument = match self.storage.load(&self.key).await {
            Ok(document) => document,
            Err(StorageError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };
        let count = document::load(store, &document)?;
        self.dirty = false;
        Ok(Some(count))
    }

    /// Remove the autosave slot.
    pub async fn discard(&mut self) -> StorageResult<()> {
        self.storage.delete(&self.key).await
    }

    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }
}

/// Create a platform-appropriate storage backend.
#[cfg(not(target_arch = "wasm32"))]
pub fn create_default_storage() -> StorageResult<Arc<crate::storage::FileStorage>> {
    Ok(Arc::new(crate::storage::FileStorage::default_location()?))
}

#[cfg(target_arch = "wasm32")]
pub fn create_default_storage() -> StorageResult<Arc<crate::storage::MemoryStorage>> {
    Ok(Arc::new(crate::storage::MemoryStorage::new()))
}

/// Platform-specific storage backend.
#[cfg(not(target_arch = "wasm32"))]
pub type PlatformStorage = crate::storage::FileStorage;

#[cfg(target_arch = "wasm32")]
pub type PlatformStorage = crate::storage::MemoryStorage;

pub type PlatformAutoSaveManager = AutoSaveManager<PlatformStorage>;

/// Create an auto-save manager with the default storage.
pub fn create_autosave_manager() -> StorageResult<PlatformAutoSaveManager> {
    let storage = create_default_storage()?;
    Ok(AutoSaveManager::new(storage))
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use crate::elements::{Payload, TextPayload};
    use crate::storage::MemoryStorage;
    use pollster::block_on;

    fn store_with(n: usize) -> ElementStore {
        let mut store = ElementStore::new();
        for i in 0..n {
            store
                .add_element(Payload::Text(TextPayload::new("note")), i as f64 * 10.0, 0.0)
                .fit_to_content();
        }
        store
    }

    #[test]
    fn test_not_running_never_saves() {
        let mut manager = AutoSaveManager::new(Arc::new(MemoryStorage::new()));
        manager.mark_dirty();
        let later = Instant::now() + Duration::from_secs(3600);
        assert!(!block_on(manager.tick_at(later, &store_with(1))).unwrap());
        assert!(manager.is_dirty());
    }

    #[test]
    fn test_tick_saves_after_interval() {
        let storage = Arc::new(MemoryStorage::new());
        let mut manager = AutoSaveManager::new(storage.clone());
        let t0 = Instant::now();
        manager.start_at(t0);
        manager.mark_dirty();
        let store = store_with(2);

        assert!(!manager.should_save_at(t0 + Duration::from_secs(29)));
        assert!(!block_on(manager.tick_at(t0 + Duration::from_secs(29), &store)).unwrap());
        assert!(block_on(manager.tick_at(t0 + Duration::from_secs(30), &store)).unwrap());
        assert!(!manager.is_dirty());

        let saved = block_on(storage.load(AUTOSAVE_KEY)).unwrap();
        assert_eq!(saved.element_count, 2);
    }

    #[test]
    fn test_clean_board_is_not_saved() {
        let storage = Arc::new(MemoryStorage::new());
        let mut manager = AutoSaveManager::new(storage.clone());
        let t0 = Instant::now();
        manager.start_at(t0);
        assert!(!block_on(manager.tick_at(t0 + Duration::from_secs(60), &store_with(1))).unwrap());
        assert!(!block_on(storage.exists(AUTOSAVE_KEY)).unwrap());
    }

    #[test]
    fn test_start_stop_idempotent() {
        let mut manager = AutoSaveManager::new(Arc::new(MemoryStorage::new()));
        let t0 = Instant::now();
        manager.start_at(t0);
        // A second start must not reset the period
        manager.start_at(t0 + Duration::from_secs(20));
        manager.mark_dirty();
        assert!(manager.should_save_at(t0 + Duration::from_secs(30)));

        manager.stop();
        manager.stop();
        assert!(!manager.is_running());
        assert!(!manager.should_save_at(t0 + Duration::from_secs(90)));
    }

    #[test]
    fn test_restore_round_trip() {
        let storage = Arc::new(MemoryStorage::new());
        let mut manager = AutoSaveManager::new(storage.clone());
        let store = store_with(3);
        block_on(manager.save(&store)).unwrap();

        let mut other = AutoSaveManager::new(storage);
        let mut restored = ElementStore::new();
        assert_eq!(block_on(other.restore(&mut restored)).unwrap(), Some(3));
        assert_eq!(restored.len(), 3);
    }

    #[test]
    fn test_restore_empty_slot() {
        let mut manager = AutoSaveManager::new(Arc::new(MemoryStorage::new()));
        let mut store = store_with(1);
        assert_eq!(block_on(manager.restore(&mut store)).unwrap(), None);
        assert_eq!(store.len(), 1);
    }
}
