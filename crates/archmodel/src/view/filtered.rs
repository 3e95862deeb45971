//! Tag filters layered over static views.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Whether a filter keeps or drops the tagged items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterMode {
    Include,
    #[default]
    Exclude,
}

/// A named tag filter over another view.
///
/// Only the definition is stored. Renderers apply it to the base view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilteredView {
    key: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    mode: FilterMode,
    tags: IndexSet<String>,
    base_view_key: String,
}

impl FilteredView {
    /// Builds a filter from tags that are already known to be non-blank.
    pub(crate) fn new(
        base_view_key: &str,
        key: &str,
        description: &str,
        mode: FilterMode,
        tags: IndexSet<String>,
    ) -> Self {
        Self {
            key: key.trim().to_string(),
            description: description.to_string(),
            mode,
            tags,
            base_view_key: base_view_key.to_string(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn mode(&self) -> FilterMode {
        self.mode
    }

    pub fn tags(&self) -> &IndexSet<String> {
        &self.tags
    }

    pub fn base_view_key(&self) -> &str {
        &self.base_view_key
    }

    /// Returns `true` if an item carrying `item_tags` survives the filter.
    pub fn is_shown<S: AsRef<str>>(&self, item_tags: &[S]) -> bool {
        let tagged = item_tags
            .iter()
            .any(|tag| self.tags.contains(tag.as_ref()));
        match self.mode {
            FilterMode::Include => tagged,
            FilterMode::Exclude => !tagged,
        }
    }
}
