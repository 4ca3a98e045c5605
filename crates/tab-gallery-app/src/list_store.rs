//! In-memory list stores for example resources and chat messages.

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::observers::{InitialNotify, Observers, Subscription};

/// Observable list. New subscribers immediately receive the current items.
pub struct ListStore<T> {
    items: Mutex<Vec<T>>,
    observers: Observers<Vec<T>>,
}

impl<T: Clone + Send + 'static> Default for ListStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + 'static> ListStore<T> {
    /// Empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::with_items(Vec::new())
    }

    /// List seeded with `items`.
    #[must_use]
    pub fn with_items(items: Vec<T>) -> Self {
        Self {
            items: Mutex::new(items),
            observers: Observers::new(InitialNotify::Immediate),
        }
    }

    /// Snapshot of the current items.
    #[must_use]
    pub fn current(&self) -> Vec<T> {
        self.lock().clone()
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true when the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Replace every item and notify subscribers.
    pub fn replace(&self, items: Vec<T>) {
        self.mutate(|current| *current = items);
    }

    /// Append `item` and notify subscribers.
    pub fn push(&self, item: T) {
        self.mutate(|current| current.push(item));
    }

    /// Remove every item and notify subscribers.
    pub fn clear(&self) {
        self.mutate(Vec::clear);
    }

    /// Register `callback`; it runs once right away with the current items.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Vec<T>) + Send + Sync + 'static,
    {
        let current = self.current();
        self.observers.subscribe(callback, &current)
    }

    fn mutate(&self, change: impl FnOnce(&mut Vec<T>)) {
        let snapshot = {
            let mut items = self.lock();
            change(&mut items);
            items.clone()
        };
        self.observers.notify(&snapshot);
    }

    fn lock(&self) -> MutexGuard<'_, Vec<T>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// What a [`Resource`] points at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// API reference.
    #[default]
    Docs,
    /// Runnable sample project.
    Sample,
    /// Recorded walkthrough.
    Video,
}

impl ResourceKind {
    /// Lowercase label, matching the serialized form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Docs => "docs",
            Self::Sample => "sample",
            Self::Video => "video",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Link to documentation or sample material for an example screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Stable identifier.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Where the resource lives.
    pub url: String,
    /// Kind of material behind the link.
    #[serde(default)]
    pub kind: ResourceKind,
}

impl Resource {
    /// Build a documentation entry.
    pub fn new(id: impl Into<String>, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            url: url.into(),
            kind: ResourceKind::Docs,
        }
    }

    /// Same entry with a different kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: ResourceKind) -> Self {
        self.kind = kind;
        self
    }

    /// Reference material bundled with the gallery, one entry per example.
    #[must_use]
    pub fn catalogue() -> Vec<Self> {
        use ResourceKind::{Docs, Sample, Video};
        [
            ("battery", "Battery", "https://docs.expo.dev/versions/latest/sdk/battery/", Docs),
            ("gyroscope", "Gyroscope", "https://docs.expo.dev/versions/latest/sdk/gyroscope/", Docs),
            ("speech", "Speech", "https://docs.expo.dev/versions/latest/sdk/speech/", Docs),
            ("maps", "Maps", "https://docs.expo.dev/versions/latest/sdk/map-view/", Docs),
            ("storage", "Storage", "https://docs.expo.dev/versions/latest/sdk/async-storage/", Docs),
            ("examples", "Expo examples", "https://github.com/expo/examples", Sample),
            ("expo-channel", "Expo on YouTube", "https://www.youtube.com/@ExpoDevelopers", Video),
        ]
        .into_iter()
        .map(|(id, title, url, kind)| Self::new(id, title, url).with_kind(kind))
        .collect()
    }
}

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Person using the app.
    User,
    /// Model reply.
    Assistant,
    /// Instructions injected by the app.
    System,
}

/// Chat message kept for the current session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Identifier (UUID v7, time ordered).
    pub id: Uuid,
    /// Author.
    pub role: Role,
    /// Message body.
    pub content: String,
    /// Creation time in UTC.
    #[serde(with = "time::serde::rfc3339")]
    pub sent_at: OffsetDateTime,
}

impl Message {
    /// New message stamped with the current time.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            role,
            content: content.into(),
            sent_at: OffsetDateTime::now_utc(),
        }
    }

    /// Message authored by the user.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Reply from the assistant.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Resources shown by the gallery.
pub type ResourceStore = ListStore<Resource>;
/// Chat history for the current session.
pub type MessageStore = ListStore<Message>;
