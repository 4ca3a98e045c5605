//! Domain types & resolution logic for level-gated tab navigation.

/// User complexity tiers.
pub mod level;
/// Tab visibility and presentation resolution.
pub mod resolver;
/// Persisted user settings and partial updates.
pub mod settings;
/// Static tab descriptors and the registry.
pub mod tab;

pub use level::{ParseLevelError, UiLevel};
pub use resolver::{ResolvedTab, is_visible, presentation, resolve, resolve_all, select_variant, visible_tabs};
pub use settings::{EMPTY_OVERRIDES, Settings, SettingsPatch};
pub use tab::{RegistryError, TabDefinition, TabRegistry, TabVariant};
