//! Application root wiring stores to the navigation shell.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tab_gallery_core::{Settings, SettingsPatch, TabRegistry};
use tab_gallery_store_fs::KeyValueStore;
use tracing::info;

use crate::list_store::{MessageStore, Resource, ResourceStore};
use crate::navigation::{NavigationShell, Redirect};
use crate::observers::Subscription;
use crate::settings_store::{LoadOutcome, SettingsStore};

/// Owns every store and keeps the navigation shell in sync with settings.
pub struct GalleryApp<S> {
    settings: SettingsStore<S>,
    navigation: Arc<Mutex<NavigationShell>>,
    resources: ResourceStore,
    messages: MessageStore,
    load_outcome: LoadOutcome,
    _settings_link: Subscription,
}

impl<S: KeyValueStore> GalleryApp<S> {
    /// Load persisted settings, resolve the tab bar, and subscribe the shell
    /// to settings changes.
    pub async fn bootstrap(store: S, registry: TabRegistry, defaults: Settings) -> Self {
        let settings = SettingsStore::with_defaults(store, defaults);
        let load_outcome = settings.load().await;

        let navigation = Arc::new(Mutex::new(NavigationShell::new(registry, &settings.current())));
        let shell = Arc::clone(&navigation);
        let link = settings.subscribe(move |next: &Settings| {
            if let Some(Redirect { from, to }) = lock(&shell).apply_settings(next) {
                info!(from, to, "Redirected away from hidden tab");
            }
        });

        Self {
            settings,
            navigation,
            resources: ResourceStore::with_items(Resource::catalogue()),
            messages: MessageStore::new(),
            load_outcome,
            _settings_link: link,
        }
    }

    /// Apply `patch` to the settings store; the shell re-resolves before this returns.
    pub async fn update_settings(&self, patch: SettingsPatch) -> Settings {
        self.settings.update(patch).await
    }
}

impl<S> GalleryApp<S> {
    /// Settings store.
    pub const fn settings(&self) -> &SettingsStore<S> {
        &self.settings
    }

    /// Outcome of the initial settings load.
    pub const fn load_outcome(&self) -> LoadOutcome {
        self.load_outcome
    }

    /// Exclusive access to the navigation shell.
    pub fn navigation(&self) -> MutexGuard<'_, NavigationShell> {
        lock(&self.navigation)
    }

    /// Report that the navigation layer finished mounting.
    pub fn mark_mounted(&self) -> Option<Redirect> {
        let redirect = self.navigation().mark_mounted();
        if let Some(Redirect { from, to }) = &redirect {
            info!(from, to, "Redirected away from hidden tab after mount");
        }
        redirect
    }

    /// Example resources.
    pub const fn resources(&self) -> &ResourceStore {
        &self.resources
    }

    /// Chat messages for this session.
    pub const fn messages(&self) -> &MessageStore {
        &self.messages
    }
}

fn lock(shell: &Mutex<NavigationShell>) -> MutexGuard<'_, NavigationShell> {
    shell.lock().unwrap_or_else(PoisonError::into_inner)
}
