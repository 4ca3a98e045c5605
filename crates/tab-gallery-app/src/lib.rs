//! Application layer logic for tab-gallery.
//!
//! This crate provides the settings store, observable list stores, the
//! navigation shell, and configuration shared by the CLI and tests.

pub mod app;
pub mod config;
pub mod list_store;
pub mod navigation;
pub mod observers;
pub mod settings_store;

// Re-exports for convenience
pub use app::GalleryApp;
pub use config::{AppConfig, DefaultsConfig, StorageConfig, default_config_path};
pub use list_store::{ListStore, Message, MessageStore, Resource, ResourceKind, ResourceStore, Role};
pub use navigation::{NavigationError, NavigationShell, Redirect};
pub use observers::{InitialNotify, Observers, Subscription};
pub use settings_store::{LoadOutcome, SETTINGS_KEY, SettingsStore};
