//! Presentation settings shared by every view of a workspace.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, validate_url};

/// Style bound to elements carrying a tag. Properties are kept as given,
/// for the renderer to interpret.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementStyle {
    tag: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    properties: IndexMap<String, String>,
}

/// Style bound to relationships carrying a tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipStyle {
    tag: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    properties: IndexMap<String, String>,
}

macro_rules! style_accessors {
    ($name:ident) => {
        impl $name {
            pub fn tag(&self) -> &str {
                &self.tag
            }

            pub fn properties(&self) -> &IndexMap<String, String> {
                &self.properties
            }

            pub fn set_property(&mut self, name: &str, value: &str) -> &mut Self {
                self.properties.insert(name.to_string(), value.to_string());
                self
            }
        }
    };
}

style_accessors!(ElementStyle);
style_accessors!(RelationshipStyle);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Styles {
    #[serde(default)]
    elements: Vec<ElementStyle>,
    #[serde(default)]
    relationships: Vec<RelationshipStyle>,
}

impl Styles {
    pub fn elements(&self) -> &[ElementStyle] {
        &self.elements
    }

    pub fn relationships(&self) -> &[RelationshipStyle] {
        &self.relationships
    }

    /// Returns the style for `tag`, creating it if needed.
    pub fn add_element_style(&mut self, tag: &str) -> &mut ElementStyle {
        let index = match self.elements.iter().position(|style| style.tag == tag) {
            Some(index) => index,
            None => {
                self.elements.push(ElementStyle {
                    tag: tag.to_string(),
                    properties: IndexMap::new(),
                });
                self.elements.len() - 1
            }
        };
        &mut self.elements[index]
    }

    /// Returns the style for `tag`, creating it if needed.
    pub fn add_relationship_style(&mut self, tag: &str) -> &mut RelationshipStyle {
        let index = match self.relationships.iter().position(|style| style.tag == tag) {
            Some(index) => index,
            None => {
                self.relationships.push(RelationshipStyle {
                    tag: tag.to_string(),
                    properties: IndexMap::new(),
                });
                self.relationships.len() - 1
            }
        };
        &mut self.relationships[index]
    }
}

/// Replacement labels for the standard element and relationship kinds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Terminology {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enterprise: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub person: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub software_system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment_node: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub infrastructure_node: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default_view: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_saved_view: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    themes: Vec<String>,
    #[serde(default)]
    terminology: Terminology,
    #[serde(default)]
    styles: Styles,
}

impl ViewConfiguration {
    /// Key of the view shown first.
    pub fn default_view(&self) -> Option<&str> {
        self.default_view.as_deref()
    }

    pub fn set_default_view(&mut self, key: &str) {
        self.default_view = Some(key.to_string()).filter(|k| !k.trim().is_empty());
    }

    /// Key of the view last open in an editor.
    pub fn last_saved_view(&self) -> Option<&str> {
        self.last_saved_view.as_deref()
    }

    pub fn set_last_saved_view(&mut self, key: &str) {
        self.last_saved_view = Some(key.to_string()).filter(|k| !k.trim().is_empty());
    }

    pub fn themes(&self) -> &[String] {
        &self.themes
    }

    /// Appends a theme URL. Blank values are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ModelError::InvalidArgument`] for an invalid URL.
    pub fn add_theme(&mut self, url: &str) -> Result<()> {
        if let Some(url) = validate_url(url)? {
            if !self.themes.contains(&url) {
                self.themes.push(url);
            }
        }
        Ok(())
    }

    /// Replaces every theme. Nothing changes if any URL is invalid.
    pub fn set_themes(&mut self, urls: &[&str]) -> Result<()> {
        let mut themes = Vec::new();
        for url in urls {
            if let Some(url) = validate_url(url)? {
                themes.push(url);
            }
        }
        self.themes = themes;
        Ok(())
    }

    pub fn terminology(&self) -> &Terminology {
        &self.terminology
    }

    pub fn terminology_mut(&mut self) -> &mut Terminology {
        &mut self.terminology
    }

    pub fn styles(&self) -> &Styles {
        &self.styles
    }

    pub fn styles_mut(&mut self) -> &mut Styles {
        &mut self.styles
    }

    /// Carries editor state over from a previously published configuration.
    pub fn copy_configuration_from(&mut self, source: &ViewConfiguration) {
        self.last_saved_view = source.last_saved_view.clone();
    }
}
