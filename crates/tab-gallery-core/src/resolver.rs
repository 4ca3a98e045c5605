//! Pure functions deciding which tabs are shown and how they are labelled.

use serde::Serialize;

use crate::level::UiLevel;
use crate::settings::Settings;
use crate::tab::{TabDefinition, TabRegistry, TabVariant};

/// Outcome of resolving one [`TabDefinition`] against the current settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedTab {
    /// Route name.
    pub name: &'static str,
    /// Whether the tab bar should show the tab.
    pub visible: bool,
    /// Title to display.
    pub title: &'static str,
    /// Icon to display, if any.
    pub icon: Option<&'static str>,
}

/// Threshold used for visibility: the per-tab override, else the registry default.
#[must_use]
pub fn effective_level(tab: &TabDefinition, settings: &Settings) -> UiLevel {
    settings.tab_level(tab.name).unwrap_or(tab.ui_level)
}

/// Returns true when `tab` should be shown for `settings`.
#[must_use]
pub fn is_visible(tab: &TabDefinition, settings: &Settings) -> bool {
    tab.always_visible || effective_level(tab, settings) <= settings.ui_level
}

/// Pick the variant with the highest level not exceeding `level`.
///
/// Among variants sharing that level the first declared one wins.
#[must_use]
pub fn select_variant(tab: &TabDefinition, level: UiLevel) -> Option<&TabVariant> {
    tab.variants
        .iter()
        .filter(|variant| variant.ui_level <= level)
        .fold(None, |best: Option<&TabVariant>, candidate| match best {
            Some(current) if current.ui_level >= candidate.ui_level => Some(current),
            _ => Some(candidate),
        })
}

/// Title and icon for `tab`. Variant selection uses the global level only.
#[must_use]
pub fn presentation(tab: &TabDefinition, settings: &Settings) -> (&'static str, Option<&'static str>) {
    if !tab.has_variants() {
        return (tab.title.unwrap_or(tab.name), tab.icon);
    }
    if let Some(variant) = select_variant(tab, settings.ui_level) {
        return (variant.title, variant.icon.or(tab.default_icon).or(tab.icon));
    }
    let title = tab.default_title.or(tab.title).unwrap_or(tab.name);
    let icon = tab.default_icon.or(tab.icon);
    (title, icon)
}

/// Resolve a single tab.
#[must_use]
pub fn resolve(tab: &TabDefinition, settings: &Settings) -> ResolvedTab {
    let (title, icon) = presentation(tab, settings);
    ResolvedTab {
        name: tab.name,
        visible: is_visible(tab, settings),
        title,
        icon,
    }
}

/// Resolve every registered tab, in registry order.
#[must_use]
pub fn resolve_all(registry: &TabRegistry, settings: &Settings) -> Vec<ResolvedTab> {
    registry.iter().map(|tab| resolve(tab, settings)).collect()
}

/// Resolve and keep only the visible tabs.
#[must_use]
pub fn visible_tabs(registry: &TabRegistry, settings: &Settings) -> Vec<ResolvedTab> {
    registry
        .iter()
        .filter(|tab| is_visible(tab, settings))
        .map(|tab| resolve(tab, settings))
        .collect()
}
