//! FaithSteps Core
//!
//! Platform-agnostic logic for the FaithSteps walking-journey app: the static
//! journey catalog, the single-user progress store and the deterministic
//! trail layout used by the journey map. Rendering and storage timing stay
//! with the host application.

pub mod catalog;
pub mod constants;
pub mod data;
pub mod map;
pub mod numbers;
pub mod onboarding;
pub mod path;
pub mod progress;
pub mod seed;

use anyhow::Context;
use std::cell::RefCell;
use std::collections::HashMap;
use std::convert::Infallible;
use std::rc::Rc;
use std::sync::Arc;
use thiserror::Error;

// Re-export commonly used types
pub use catalog::{Catalog, CatalogError};
pub use constants::{ONBOARDING_STORAGE_KEY, PROGRESS_STORAGE_KEY};
pub use data::{
    BibleVersion, Category, Difficulty, GeoPoint, Journey, Milestone, Scripture, Season,
    SeasonalWindow,
};
pub use map::{Connector, JourneyMapView, MapNode, NodeState};
pub use onboarding::{GoalPreset, OnboardingPreferences, daily_goal_progress};
pub use path::{
    CubicSegment, PathConfig, PathConfigError, PathDescriptor, Point, TerrainProfile, TrailLayout,
    synthesize,
};
pub use progress::{
    Clock, FixedClock, JourneyProgress, JourneyProgressSnapshot, JourneyStart, JourneyStatus,
    JourneyUpdate, MilestoneUpdate, ProgressError, ProgressEvent, ProgressSnapshot, ProgressStore,
    SnapshotError, SystemClock, Totals,
};
pub use seed::{derive_stream_seed, fnv1a64, trail_seed};

/// Key-value persistence supplied by the host platform.
pub trait KeyValueStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read the value stored under `key`
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, Self::Error>;

    /// Store `value` under `key`, replacing any previous value
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write.
    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error>;

    /// Delete `key`
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot delete the entry.
    fn remove(&self, key: &str) -> Result<(), Self::Error>;
}

/// In-process storage; clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStorage for MemoryStorage {
    type Error = Infallible;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), Self::Error> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("storage backend error: {0}")]
    Backend(String),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("stored progress could not be restored: {0}")]
    Restore(#[from] SnapshotError),
}

/// Saves and loads app state through a [`KeyValueStorage`].
///
/// The progress store never persists itself; callers decide when to save.
#[derive(Debug, Clone)]
pub struct Persistence<S: KeyValueStorage> {
    storage: S,
}

impl<S: KeyValueStorage> Persistence<S> {
    pub const fn new(storage: S) -> Self {
        Self { storage }
    }

    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// # Errors
    ///
    /// Returns an error if encoding or the backend write fails.
    pub fn save_onboarding(&self, prefs: &OnboardingPreferences) -> Result<(), PersistenceError> {
        let json = serde_json::to_string(prefs)?;
        self.write(ONBOARDING_STORAGE_KEY, &json)
    }

    /// Stored preferences, or the defaults when nothing was saved yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend read fails or the stored JSON is invalid.
    pub fn load_onboarding(&self) -> Result<OnboardingPreferences, PersistenceError> {
        match self.read(ONBOARDING_STORAGE_KEY)? {
            Some(json) => Ok(serde_json::from_str::<OnboardingPreferences>(&json)?.sanitized()),
            None => Ok(OnboardingPreferences::default()),
        }
    }

    /// # Errors
    ///
    /// Returns an error if encoding or the backend write fails.
    pub fn save_progress<C: Clock>(&self, store: &ProgressStore<C>) -> Result<(), PersistenceError> {
        let json = store.snapshot().to_json()?;
        self.write(PROGRESS_STORAGE_KEY, &json)
    }

    /// Restore saved progress into `store`. Returns false when nothing was saved.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend read fails or the snapshot is invalid;
    /// `store` is left unchanged in that case.
    pub fn load_progress<C: Clock>(
        &self,
        store: &mut ProgressStore<C>,
    ) -> Result<bool, PersistenceError> {
        let Some(json) = self.read(PROGRESS_STORAGE_KEY)? else {
            return Ok(false);
        };
        let snapshot = ProgressSnapshot::from_json(&json)?;
        store.restore(snapshot)?;
        Ok(true)
    }

    /// Remove every key this adapter writes.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot delete an entry.
    pub fn clear(&self) -> Result<(), PersistenceError> {
        for key in [ONBOARDING_STORAGE_KEY, PROGRESS_STORAGE_KEY] {
            self.storage
                .remove(key)
                .map_err(|err| PersistenceError::Backend(err.to_string()))?;
        }
        Ok(())
    }

    fn read(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        self.storage
            .get(key)
            .map_err(|err| PersistenceError::Backend(err.to_string()))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        log::debug!("persisting `{key}` ({} bytes)", value.len());
        self.storage
            .set(key, value)
            .map_err(|err| PersistenceError::Backend(err.to_string()))
    }
}

/// Build a progress store over the bundled catalog and restore any saved progress.
///
/// # Errors
///
/// Returns an error if the bundled catalog is invalid or saved progress cannot be restored.
pub fn open_progress_store<S: KeyValueStorage>(
    persistence: &Persistence<S>,
) -> anyhow::Result<ProgressStore> {
    let catalog = Catalog::load_builtin().context("bundled journey catalog is invalid")?;
    let mut store = ProgressStore::new(Arc::new(catalog));
    let restored = persistence
        .load_progress(&mut store)
        .context("saved journey progress could not be restored")?;
    log::debug!("progress store opened (restored: {restored})");
    Ok(store)
}
