use std::collections::HashSet;

use thiserror::Error;

use crate::level::UiLevel;

/// Level-gated presentation of a tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabVariant {
    /// Level from which this presentation applies.
    pub ui_level: UiLevel,
    /// Title shown in the tab bar.
    pub title: &'static str,
    /// Icon identifier, if the variant changes the icon.
    pub icon: Option<&'static str>,
}

impl TabVariant {
    /// Variant that only changes the title.
    #[must_use]
    pub const fn titled(ui_level: UiLevel, title: &'static str) -> Self {
        Self {
            ui_level,
            title,
            icon: None,
        }
    }

    /// Variant that changes both title and icon.
    #[must_use]
    pub const fn with_icon(ui_level: UiLevel, title: &'static str, icon: &'static str) -> Self {
        Self {
            ui_level,
            title,
            icon: Some(icon),
        }
    }
}

/// Static descriptor of a navigable section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabDefinition {
    /// Unique identifier; doubles as the route name.
    pub name: &'static str,
    /// Minimum level at which the tab is visible by default.
    pub ui_level: UiLevel,
    /// Bypass every level check.
    pub always_visible: bool,
    /// Level-based presentations in declaration order.
    pub variants: &'static [TabVariant],
    /// Fallback title when no variant applies.
    pub default_title: Option<&'static str>,
    /// Fallback icon when no variant applies.
    pub default_icon: Option<&'static str>,
    /// Plain title for tabs without variants.
    pub title: Option<&'static str>,
    /// Plain icon for tabs without variants.
    pub icon: Option<&'static str>,
}

impl TabDefinition {
    /// Tab with a fixed title and icon, visible from `ui_level` on.
    #[must_use]
    pub const fn new(name: &'static str, ui_level: UiLevel, title: &'static str, icon: &'static str) -> Self {
        Self {
            name,
            ui_level,
            always_visible: false,
            variants: &[],
            default_title: None,
            default_icon: None,
            title: Some(title),
            icon: Some(icon),
        }
    }

    /// Mark the tab as visible regardless of level.
    #[must_use]
    pub const fn always_visible(mut self) -> Self {
        self.always_visible = true;
        self
    }

    /// Attach level-based variants with their fallback presentation.
    #[must_use]
    pub const fn with_variants(
        mut self,
        variants: &'static [TabVariant],
        default_title: &'static str,
        default_icon: &'static str,
    ) -> Self {
        self.variants = variants;
        self.default_title = Some(default_title);
        self.default_icon = Some(default_icon);
        self
    }

    /// Returns true when the tab changes presentation with the level.
    #[must_use]
    pub const fn has_variants(&self) -> bool {
        !self.variants.is_empty()
    }
}

/// Errors raised while assembling a [`TabRegistry`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// A definition has an empty name.
    #[error("tab at position {0} has an empty name")]
    EmptyName(usize),
    /// Two definitions share a name.
    #[error("duplicate tab definition: {0}")]
    DuplicateTab(&'static str),
    /// The registry has no tabs, so there is no default route.
    #[error("tab registry must contain at least one tab")]
    Empty,
}

const INDEX_VARIANTS: &[TabVariant] = &[
    TabVariant::with_icon(UiLevel::BASIC, "Support", "lifebuoy"),
    TabVariant::with_icon(UiLevel::INTERMEDIATE, "Intermediate", "graduationcap"),
    TabVariant::with_icon(UiLevel::ADVANCED, "Advanced", "cpu"),
];

const BUILTIN_TABS: &[TabDefinition] = &[
    TabDefinition::new("index", UiLevel::BASIC, "Home", "house.fill")
        .with_variants(INDEX_VARIANTS, "Home", "house.fill")
        .always_visible(),
    TabDefinition::new("explore", UiLevel::BASIC, "Explore", "paperplane.fill"),
    TabDefinition::new("sensors", UiLevel::INTERMEDIATE, "Sensors", "gyroscope"),
    TabDefinition::new("speech", UiLevel::INTERMEDIATE, "Speech", "waveform"),
    TabDefinition::new("chat", UiLevel::INTERMEDIATE, "Chat", "bubble.left.and.bubble.right"),
    TabDefinition::new("maps", UiLevel::ADVANCED, "Maps", "map"),
    TabDefinition::new("storage", UiLevel::ADVANCED, "Storage", "internaldrive"),
    TabDefinition::new("gallery", UiLevel::ADVANCED, "Gallery", "square.grid.2x2"),
    TabDefinition::new("settings", UiLevel::BASIC, "Settings", "gearshape").always_visible(),
];

/// Ordered, immutable list of tabs known to the navigation shell.
#[derive(Debug, Clone)]
pub struct TabRegistry {
    tabs: Vec<TabDefinition>,
}

impl TabRegistry {
    /// Build a registry, rejecting empty or duplicate names.
    ///
    /// # Errors
    /// Returns [`RegistryError`] when the definitions are not usable as routes.
    pub fn new(tabs: &[TabDefinition]) -> Result<Self, RegistryError> {
        if tabs.is_empty() {
            return Err(RegistryError::Empty);
        }
        let mut seen = HashSet::new();
        for (position, tab) in tabs.iter().enumerate() {
            if tab.name.trim().is_empty() {
                return Err(RegistryError::EmptyName(position));
            }
            if !seen.insert(tab.name) {
                return Err(RegistryError::DuplicateTab(tab.name));
            }
        }
        Ok(Self { tabs: tabs.to_vec() })
    }

    /// Tabs shipped with the gallery.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            tabs: BUILTIN_TABS.to_vec(),
        }
    }

    /// Find a tab by route name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TabDefinition> {
        self.tabs.iter().find(|tab| tab.name == name)
    }

    /// Returns true when `name` is a registered route.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterate over tabs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &TabDefinition> + '_ {
        self.tabs.iter()
    }

    /// Number of registered tabs.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.tabs.len()
    }

    /// Returns true when no tab is registered.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    /// Route used when the current one disappears: the first registered tab.
    #[must_use]
    pub fn default_route(&self) -> &'static str {
        self.tabs.first().map_or("index", |tab| tab.name)
    }

    /// Comma separated route names, for error messages.
    #[must_use]
    pub fn names_hint(&self) -> String {
        self.tabs.iter().map(|tab| tab.name).collect::<Vec<_>>().join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registry_is_valid() -> anyhow::Result<()> {
        let registry = TabRegistry::new(BUILTIN_TABS)?;
        assert_eq!(registry.len(), TabRegistry::builtin().len());
        assert!(!registry.is_empty());
        assert_eq!(registry.default_route(), "index");
        assert!(registry.contains("gallery"));
        assert!(!registry.contains("battery"));
        Ok(())
    }

    #[test]
    fn home_tab_carries_level_variants() {
        let registry = TabRegistry::builtin();
        let Some(home) = registry.get("index") else {
            panic!("index tab registered");
        };
        assert!(home.always_visible);
        assert!(home.has_variants());
        let titles: Vec<&str> = home.variants.iter().map(|variant| variant.title).collect();
        assert_eq!(titles, vec!["Support", "Intermediate", "Advanced"]);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let tabs = [
            TabDefinition::new("maps", UiLevel::BASIC, "Maps", "map"),
            TabDefinition::new("maps", UiLevel::ADVANCED, "Maps again", "map"),
        ];
        assert_eq!(
            TabRegistry::new(&tabs).err(),
            Some(RegistryError::DuplicateTab("maps"))
        );
    }

    #[test]
    fn empty_names_and_registries_are_rejected() {
        let tabs = [TabDefinition::new(" ", UiLevel::BASIC, "Blank", "questionmark")];
        assert_eq!(TabRegistry::new(&tabs).err(), Some(RegistryError::EmptyName(0)));
        assert_eq!(TabRegistry::new(&[]).err(), Some(RegistryError::Empty));
    }

    #[test]
    fn names_hint_follows_declaration_order() -> anyhow::Result<()> {
        let registry = TabRegistry::new(&[
            TabDefinition::new("b", UiLevel::BASIC, "B", "b"),
            TabDefinition::new("a", UiLevel::BASIC, "A", "a"),
        ])?;
        assert_eq!(registry.names_hint(), "b, a");
        assert_eq!(registry.default_route(), "b");
        Ok(())
    }
}
