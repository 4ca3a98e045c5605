use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::level::UiLevel;

/// Opaque value stored in [`Settings::overrides`] when nothing was configured.
pub const EMPTY_OVERRIDES: &str = "{}";

/// User-configurable preferences shared by the whole application.
///
/// Serialized as camelCase JSON and persisted as a single blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Selected complexity tier.
    pub ui_level: UiLevel,
    /// Per-tab visibility thresholds overriding the registry default.
    pub tab_levels: BTreeMap<String, UiLevel>,
    /// Custom display names per tab. Stored, but not applied to tab titles.
    pub tab_renames: BTreeMap<String, String>,
    /// Pinned example names, unique, in the order they were pinned.
    pub focused_examples: Vec<String>,
    /// Free-form JSON blob for custom configuration. Never validated.
    pub overrides: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ui_level: UiLevel::BASIC,
            tab_levels: BTreeMap::new(),
            tab_renames: BTreeMap::new(),
            focused_examples: Vec::new(),
            overrides: EMPTY_OVERRIDES.to_owned(),
        }
    }
}

impl Settings {
    /// Shallow-merge `patch` into this record. Map fields are replaced wholesale.
    pub fn apply(&mut self, patch: SettingsPatch) {
        let SettingsPatch {
            ui_level,
            tab_levels,
            tab_renames,
            focused_examples,
            overrides,
        } = patch;

        if let Some(value) = ui_level {
            self.ui_level = value;
        }
        if let Some(value) = tab_levels {
            self.tab_levels = value;
        }
        if let Some(value) = tab_renames {
            self.tab_renames = value;
        }
        if let Some(value) = focused_examples {
            self.focused_examples = dedup_preserving_order(value);
        }
        if let Some(value) = overrides {
            self.overrides = value;
        }
    }

    /// Return a merged copy without touching `self`.
    #[must_use]
    pub fn merged(&self, patch: SettingsPatch) -> Self {
        let mut next = self.clone();
        next.apply(patch);
        next
    }

    /// Visibility threshold override for `tab`, if any.
    #[must_use]
    pub fn tab_level(&self, tab: &str) -> Option<UiLevel> {
        self.tab_levels.get(tab).copied()
    }

    /// Returns true when `example` has been pinned.
    #[must_use]
    pub fn is_focused(&self, example: &str) -> bool {
        self.focused_examples.iter().any(|name| name == example)
    }

    /// Patch that sets a single tab threshold while keeping the other overrides.
    #[must_use]
    pub fn with_tab_level(&self, tab: &str, level: UiLevel) -> SettingsPatch {
        let mut levels = self.tab_levels.clone();
        levels.insert(tab.to_owned(), level);
        SettingsPatch {
            tab_levels: Some(levels),
            ..SettingsPatch::default()
        }
    }

    /// Patch that drops the threshold override for `tab`.
    #[must_use]
    pub fn without_tab_level(&self, tab: &str) -> SettingsPatch {
        let mut levels = self.tab_levels.clone();
        levels.remove(tab);
        SettingsPatch {
            tab_levels: Some(levels),
            ..SettingsPatch::default()
        }
    }

    /// Patch that records a custom display name for `tab`.
    #[must_use]
    pub fn with_tab_rename(&self, tab: &str, title: &str) -> SettingsPatch {
        let mut renames = self.tab_renames.clone();
        renames.insert(tab.to_owned(), title.to_owned());
        SettingsPatch {
            tab_renames: Some(renames),
            ..SettingsPatch::default()
        }
    }

    /// Patch that pins `example`. Pinning twice keeps the original position.
    #[must_use]
    pub fn with_focused_example(&self, example: &str) -> SettingsPatch {
        let mut focused = self.focused_examples.clone();
        if !self.is_focused(example) {
            focused.push(example.to_owned());
        }
        SettingsPatch {
            focused_examples: Some(focused),
            ..SettingsPatch::default()
        }
    }

    /// Patch that unpins `example`.
    #[must_use]
    pub fn without_focused_example(&self, example: &str) -> SettingsPatch {
        let focused = self
            .focused_examples
            .iter()
            .filter(|name| name.as_str() != example)
            .cloned()
            .collect();
        SettingsPatch {
            focused_examples: Some(focused),
            ..SettingsPatch::default()
        }
    }

    /// Serialize the full record for persistence.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Partial update of [`Settings`]. `None` fields leave the target untouched.
///
/// A persisted blob is decoded as a patch, so keys missing from storage keep
/// their in-memory defaults and unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    /// New complexity tier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui_level: Option<UiLevel>,
    /// Replacement threshold map.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_levels: Option<BTreeMap<String, UiLevel>>,
    /// Replacement rename map.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_renames: Option<BTreeMap<String, String>>,
    /// Replacement pinned list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focused_examples: Option<Vec<String>>,
    /// Replacement overrides blob.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overrides: Option<String>,
}

impl SettingsPatch {
    /// Patch that only changes the complexity tier.
    #[must_use]
    pub fn ui_level(level: UiLevel) -> Self {
        Self {
            ui_level: Some(level),
            ..Self::default()
        }
    }

    /// Patch that only replaces the overrides blob.
    #[must_use]
    pub fn overrides(blob: impl Into<String>) -> Self {
        Self {
            overrides: Some(blob.into()),
            ..Self::default()
        }
    }

    /// Patch that overwrites every field with the values of `settings`.
    #[must_use]
    pub fn replace_all(settings: Settings) -> Self {
        Self {
            ui_level: Some(settings.ui_level),
            tab_levels: Some(settings.tab_levels),
            tab_renames: Some(settings.tab_renames),
            focused_examples: Some(settings.focused_examples),
            overrides: Some(settings.overrides),
        }
    }

    /// Returns true when the patch would not change anything.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.ui_level.is_none()
            && self.tab_levels.is_none()
            && self.tab_renames.is_none()
            && self.focused_examples.is_none()
            && self.overrides.is_none()
    }

    /// Decode a persisted blob.
    ///
    /// # Errors
    /// Returns an error when `raw` is not a JSON object with compatible field types.
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}

fn dedup_preserving_order(names: Vec<String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        if !unique.contains(&name) {
            unique.push(name);
        }
    }
    unique
}
