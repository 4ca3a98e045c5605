//! Tab bar state driven by settings changes.

use tab_gallery_core::{ResolvedTab, Settings, TabRegistry, resolve_all};
use thiserror::Error;
use tracing::debug;

/// Move away from a route whose tab became hidden.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    /// Route that was showing.
    pub from: &'static str,
    /// Route now showing.
    pub to: &'static str,
}

/// Errors raised when navigating explicitly.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NavigationError {
    /// No tab is registered under this route.
    #[error("unknown route: {0}")]
    UnknownRoute(String),
    /// The tab exists but the current settings hide it.
    #[error("route {0} is hidden at the current ui level")]
    HiddenRoute(&'static str),
}

/// Visible tab set and current route.
///
/// Redirects are held back until [`NavigationShell::mark_mounted`] so that
/// nothing navigates before the first frame is on screen.
#[derive(Debug)]
pub struct NavigationShell {
    registry: TabRegistry,
    tabs: Vec<ResolvedTab>,
    current: &'static str,
    mounted: bool,
    redirect_pending: bool,
}

impl NavigationShell {
    /// Resolve `registry` against `settings`, starting on the default route.
    #[must_use]
    pub fn new(registry: TabRegistry, settings: &Settings) -> Self {
        let tabs = resolve_all(&registry, settings);
        let current = registry.default_route();
        Self {
            registry,
            tabs,
            current,
            mounted: false,
            redirect_pending: false,
        }
    }

    /// Re-resolve after a settings change.
    ///
    /// Returns the redirect performed, if the current tab became hidden and
    /// the shell is mounted. Before mounting the redirect is deferred.
    pub fn apply_settings(&mut self, settings: &Settings) -> Option<Redirect> {
        self.tabs = resolve_all(&self.registry, settings);
        if self.is_route_visible(self.current) {
            self.redirect_pending = false;
            return None;
        }
        if !self.mounted {
            debug!(route = self.current, "Deferring redirect until mounted");
            self.redirect_pending = true;
            return None;
        }
        self.redirect_to_default()
    }

    /// Record that the navigation layer is mounted and run any deferred redirect.
    pub fn mark_mounted(&mut self) -> Option<Redirect> {
        self.mounted = true;
        let pending = std::mem::take(&mut self.redirect_pending);
        if pending && !self.is_route_visible(self.current) {
            return self.redirect_to_default();
        }
        None
    }

    /// Switch to `route`.
    ///
    /// # Errors
    /// Returns [`NavigationError`] when the route is unknown or currently hidden.
    pub fn navigate(&mut self, route: &str) -> Result<(), NavigationError> {
        let Some(tab) = self.tabs.iter().find(|tab| tab.name == route) else {
            return Err(NavigationError::UnknownRoute(route.to_owned()));
        };
        if !tab.visible {
            return Err(NavigationError::HiddenRoute(tab.name));
        }
        self.current = tab.name;
        self.redirect_pending = false;
        Ok(())
    }

    /// Every registered tab with its resolved presentation.
    #[must_use]
    pub fn tabs(&self) -> &[ResolvedTab] {
        &self.tabs
    }

    /// Tabs the tab bar should render, in registry order.
    pub fn visible_tabs(&self) -> impl Iterator<Item = &ResolvedTab> + '_ {
        self.tabs.iter().filter(|tab| tab.visible)
    }

    /// Route currently shown.
    #[must_use]
    pub const fn current_route(&self) -> &'static str {
        self.current
    }

    /// Whether the navigation layer reported itself mounted.
    #[must_use]
    pub const fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Whether a redirect is waiting for the mount.
    #[must_use]
    pub const fn has_pending_redirect(&self) -> bool {
        self.redirect_pending
    }

    /// Registry backing this shell.
    #[must_use]
    pub const fn registry(&self) -> &TabRegistry {
        &self.registry
    }

    fn is_route_visible(&self, route: &str) -> bool {
        self.tabs.iter().any(|tab| tab.name == route && tab.visible)
    }

    fn redirect_to_default(&mut self) -> Option<Redirect> {
        let to = self.registry.default_route();
        if to == self.current {
            return None;
        }
        let from = std::mem::replace(&mut self.current, to);
        Some(Redirect { from, to })
    }
}
