//! Process-wide settings record with persistence and change notification.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tab_gallery_core::{Settings, SettingsPatch};
use tab_gallery_store_fs::KeyValueStore;
use tracing::{debug, error, warn};

use crate::observers::{InitialNotify, Observers, Subscription};

/// Storage key holding the serialized settings record.
pub const SETTINGS_KEY: &str = "settings";

/// Result of [`SettingsStore::load`]. Failures are logged, never raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Nothing persisted yet; the record is unchanged.
    Missing,
    /// The persisted blob was merged over the record.
    Merged,
    /// Storage could not be read or decoded; the record is unchanged.
    Failed,
}

/// Single source of truth for user preferences.
///
/// Owned by the application root and shared by reference. Subscribers only
/// hear about future updates, never about the value present when they subscribe.
pub struct SettingsStore<S> {
    store: S,
    current: Mutex<Settings>,
    observers: Observers<Settings>,
    // Held across persist and notify so writes and deliveries happen in
    // order, each carrying the record as it is when its turn starts.
    turn: tokio::sync::Mutex<()>,
}

impl<S> SettingsStore<S> {
    /// Snapshot of the in-memory record. Never touches storage.
    #[must_use]
    pub fn current(&self) -> Settings {
        self.record().clone()
    }

    /// Register `callback` for future changes. Dropping the handle unsubscribes.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Settings) + Send + Sync + 'static,
    {
        let current = self.current();
        self.observers.subscribe(callback, &current)
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.observers.len()
    }

    /// Backing key-value store.
    pub const fn backend(&self) -> &S {
        &self.store
    }

    fn record(&self) -> MutexGuard<'_, Settings> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S: KeyValueStore> SettingsStore<S> {
    /// Store starting from [`Settings::default`].
    pub fn new(store: S) -> Self {
        Self::with_defaults(store, Settings::default())
    }

    /// Store starting from caller-provided defaults.
    pub fn with_defaults(store: S, defaults: Settings) -> Self {
        Self {
            store,
            current: Mutex::new(defaults),
            observers: Observers::new(InitialNotify::Deferred),
            turn: tokio::sync::Mutex::new(()),
        }
    }

    /// Merge the persisted record over the in-memory one.
    ///
    /// Keys missing from storage keep their current values. Calling this again
    /// with unchanged storage yields the same record. Subscribers are not notified.
    pub async fn load(&self) -> LoadOutcome {
        let raw = match self.store.get_item(SETTINGS_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key = SETTINGS_KEY, "No persisted settings; keeping defaults");
                return LoadOutcome::Missing;
            }
            Err(err) => {
                warn!(key = SETTINGS_KEY, error = %err, "Failed to read settings; keeping defaults");
                return LoadOutcome::Failed;
            }
        };

        match SettingsPatch::from_json(&raw) {
            Ok(patch) => {
                self.record().apply(patch);
                debug!(key = SETTINGS_KEY, "Loaded persisted settings");
                LoadOutcome::Merged
            }
            Err(err) => {
                warn!(key = SETTINGS_KEY, error = %err, "Failed to parse settings; keeping defaults");
                LoadOutcome::Failed
            }
        }
    }

    /// Merge `patch`, persist the whole record, then notify subscribers.
    ///
    /// Persisting and notifying use the in-memory record as it is when this
    /// update's turn comes, so an update whose write finishes late never
    /// replays an older record over a newer one. Subscribers are notified and
    /// the merged record is returned even when persistence fails; the failure
    /// is only logged.
    pub async fn update(&self, patch: SettingsPatch) -> Settings {
        let next = {
            let mut record = self.record();
            record.apply(patch);
            record.clone()
        };

        let turn = self.turn.lock().await;
        let latest = self.current();
        match latest.to_json() {
            Ok(json) => {
                if let Err(err) = self.store.set_item(SETTINGS_KEY, &json).await {
                    error!(key = SETTINGS_KEY, error = %err, "Failed to persist settings");
                }
            }
            Err(err) => error!(key = SETTINGS_KEY, error = %err, "Failed to serialize settings"),
        }

        let failed = self.observers.notify(&self.current());
        if failed > 0 {
            warn!(failed, "Some settings subscribers panicked");
        }
        drop(turn);
        next
    }
}
