//! Integration tests for settings persistence and tab resolution.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tab_gallery_app::{GalleryApp, LoadOutcome, Redirect, Resource, ResourceStore, SETTINGS_KEY, SettingsStore};
use tab_gallery_core::{
    Settings, SettingsPatch, TabDefinition, TabRegistry, TabVariant, UiLevel, is_visible, resolve,
};
use tab_gallery_store_fs::{FsStore, KeyValueStore, MemoryStore, StoreError};
use tempfile::tempdir;
use tokio::sync::Notify;

const HOME_VARIANTS: &[TabVariant] = &[
    TabVariant::titled(UiLevel::BASIC, "Support"),
    TabVariant::titled(UiLevel::INTERMEDIATE, "Intermediate"),
    TabVariant::titled(UiLevel::ADVANCED, "Advanced"),
];

fn counter() -> (Arc<AtomicUsize>, Arc<AtomicUsize>) {
    let count = Arc::new(AtomicUsize::new(0));
    (Arc::clone(&count), count)
}

#[tokio::test]
async fn update_then_load_round_trips_through_disk() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let writer = SettingsStore::new(FsStore::new(dir.path()));
    writer.update(SettingsPatch::ui_level(UiLevel::INTERMEDIATE)).await;

    let reader = SettingsStore::new(FsStore::new(dir.path()));
    assert_eq!(reader.load().await, LoadOutcome::Merged);
    let loaded = reader.current();
    assert_eq!(loaded.ui_level, UiLevel::INTERMEDIATE);
    assert_eq!(
        Settings {
            ui_level: UiLevel::BASIC,
            ..loaded
        },
        Settings::default()
    );
    Ok(())
}

#[tokio::test]
async fn partial_blob_keeps_defaults_for_missing_keys() -> anyhow::Result<()> {
    let backend = MemoryStore::new();
    backend.set_item(SETTINGS_KEY, r#"{"focusedExamples":["battery"]}"#).await?;
    let defaults = Settings {
        ui_level: UiLevel::ADVANCED,
        ..Settings::default()
    };
    let store = SettingsStore::with_defaults(backend, defaults);
    store.load().await;

    let current = store.current();
    assert_eq!(current.ui_level, UiLevel::ADVANCED);
    assert_eq!(current.focused_examples, vec!["battery"]);
    Ok(())
}

#[tokio::test]
async fn load_is_idempotent() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let backend = FsStore::new(dir.path());
    backend
        .set_item(SETTINGS_KEY, r#"{"uiLevel":3,"tabLevels":{"gallery":1}}"#)
        .await?;

    let store = SettingsStore::new(backend);
    store.load().await;
    let first = store.current();
    store.load().await;
    assert_eq!(store.current(), first);
    Ok(())
}

#[tokio::test]
async fn settings_subscribers_are_deferred_but_resource_subscribers_are_not() {
    let settings = SettingsStore::new(MemoryStore::new());
    let (settings_calls, seen) = counter();
    let _settings_sub = settings.subscribe(move |_: &Settings| {
        seen.fetch_add(1, Ordering::SeqCst);
    });
    assert_eq!(settings_calls.load(Ordering::SeqCst), 0);

    let resources = ResourceStore::with_items(Resource::catalogue());
    let (resource_calls, seen) = counter();
    let _resource_sub = resources.subscribe(move |items: &Vec<Resource>| {
        assert_eq!(items.len(), Resource::catalogue().len());
        seen.fetch_add(1, Ordering::SeqCst);
    });
    assert_eq!(resource_calls.load(Ordering::SeqCst), 1);

    settings.update(SettingsPatch::ui_level(UiLevel::ADVANCED)).await;
    assert_eq!(settings_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failing_subscriber_does_not_starve_others() {
    let settings = SettingsStore::new(MemoryStore::new());
    let _bad = settings.subscribe(|_: &Settings| panic!("broken subscriber"));
    let (calls, seen) = counter();
    let _good = settings.subscribe(move |_: &Settings| {
        seen.fetch_add(1, Ordering::SeqCst);
    });

    let updated = settings.update(SettingsPatch::ui_level(UiLevel::INTERMEDIATE)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(settings.current(), updated);
    assert_eq!(settings.subscriber_count(), 2);
}

#[test]
fn home_variant_matches_level_two() {
    let home = TabDefinition::new("index", UiLevel::BASIC, "Home", "house")
        .with_variants(HOME_VARIANTS, "Home", "house")
        .always_visible();
    let settings = Settings::default().merged(SettingsPatch::ui_level(UiLevel::INTERMEDIATE));
    assert_eq!(resolve(&home, &settings).title, "Intermediate");
}

#[test]
fn override_lowers_gallery_threshold() {
    let registry = TabRegistry::builtin();
    let Some(gallery) = registry.get("gallery") else {
        panic!("gallery tab registered");
    };
    let mut settings = Settings::default();
    assert!(!is_visible(gallery, &settings));
    settings.apply(settings.with_tab_level("gallery", UiLevel::BASIC));
    assert!(is_visible(gallery, &settings));
}

#[test]
fn visibility_matches_threshold_rule_for_every_builtin_tab() {
    let registry = TabRegistry::builtin();
    for level in UiLevel::SELECTABLE {
        for override_level in [None, Some(UiLevel::BASIC), Some(UiLevel::ADVANCED)] {
            for tab in registry.iter() {
                let mut settings = Settings::default().merged(SettingsPatch::ui_level(level));
                if let Some(value) = override_level {
                    settings.apply(settings.with_tab_level(tab.name, value));
                }
                let expected = tab.always_visible || override_level.unwrap_or(tab.ui_level) <= level;
                assert_eq!(is_visible(tab, &settings), expected, "{} at {level}", tab.name);
            }
        }
    }
}

#[tokio::test]
async fn app_restart_restores_tabs_and_redirects_after_mount() -> anyhow::Result<()> {
    let dir = tempdir()?;
    {
        let app = GalleryApp::bootstrap(FsStore::new(dir.path()), TabRegistry::builtin(), Settings::default()).await;
        app.update_settings(SettingsPatch::ui_level(UiLevel::ADVANCED)).await;
        assert_eq!(app.mark_mounted(), None);
        app.navigation().navigate("maps")?;
        app.update_settings(SettingsPatch::ui_level(UiLevel::BASIC)).await;
        assert_eq!(app.navigation().current_route(), "index");
    }

    let app = GalleryApp::bootstrap(FsStore::new(dir.path()), TabRegistry::builtin(), Settings::default()).await;
    assert_eq!(app.settings().current().ui_level, UiLevel::BASIC);
    let visible: Vec<&str> = app.navigation().visible_tabs().map(|tab| tab.name).collect();
    assert_eq!(visible, vec!["index", "explore", "settings"]);
    assert_eq!(app.mark_mounted(), None::<Redirect>);
    Ok(())
}

/// Store whose first write blocks until the test releases it.
#[derive(Default)]
struct HeldFirstWrite {
    inner: MemoryStore,
    held: AtomicBool,
    release: Notify,
}

impl KeyValueStore for HeldFirstWrite {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get_item(key).await
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if !self.held.swap(true, Ordering::SeqCst) {
            self.release.notified().await;
        }
        self.inner.set_item(key, value).await
    }
}

#[tokio::test]
async fn tab_bar_follows_latest_level_when_writes_finish_out_of_order() {
    let app = GalleryApp::bootstrap(HeldFirstWrite::default(), TabRegistry::builtin(), Settings::default()).await;

    tokio::join!(
        app.update_settings(SettingsPatch::ui_level(UiLevel::ADVANCED)),
        app.update_settings(SettingsPatch::ui_level(UiLevel::BASIC)),
        async { app.settings().backend().release.notify_one() },
    );

    assert_eq!(app.settings().current().ui_level, UiLevel::BASIC);
    let visible: Vec<&str> = app.navigation().visible_tabs().map(|tab| tab.name).collect();
    assert_eq!(visible, vec!["index", "explore", "settings"]);

    let reloaded = SettingsStore::new(app.settings().backend().inner.clone());
    reloaded.load().await;
    assert_eq!(reloaded.current().ui_level, UiLevel::BASIC);
}
