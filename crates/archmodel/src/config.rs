//! Configuration applied when preparing a workspace for publication.
//!
//! All types implement [`serde::Deserialize`] so they can be loaded from a
//! configuration file. Every section and field is optional.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining the sections below.
//! - [`LayoutConfig`] - Automatic layout hints for views without a layout.
//! - [`ModelConfig`] - Model post-processing switches.
//!
//! # Example
//!
//! ```
//! # use archmodel::config::AppConfig;
//! let config = AppConfig::default();
//! assert!(config.model().implied_relationships());
//! assert_eq!(config.layout().rank_separation(), 300);
//! ```

use serde::Deserialize;

use archmodel_core::layout::RankDirection;

use crate::{error::Result, view::AutomaticLayout};

/// Top-level configuration combining layout and model settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Layout configuration section.
    #[serde(default)]
    layout: LayoutConfig,

    /// Model configuration section.
    #[serde(default)]
    model: ModelConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    ///
    /// # Arguments
    ///
    /// * `layout` - Automatic layout defaults.
    /// * `model` - Model post-processing switches.
    pub fn new(layout: LayoutConfig, model: ModelConfig) -> Self {
        Self { layout, model }
    }

    /// Returns the layout configuration.
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Returns the model configuration.
    pub fn model(&self) -> &ModelConfig {
        &self.model
    }
}

/// Automatic layout hints given to views that have no layout yet.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    rank_direction: RankDirection,
    rank_separation: i32,
    node_separation: i32,
    edge_separation: i32,
    vertices: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        let layout = AutomaticLayout::default();
        Self {
            rank_direction: layout.rank_direction(),
            rank_separation: layout.rank_separation(),
            node_separation: layout.node_separation(),
            edge_separation: layout.edge_separation(),
            vertices: layout.vertices(),
        }
    }
}

impl LayoutConfig {
    pub fn rank_direction(&self) -> RankDirection {
        self.rank_direction
    }

    pub fn rank_separation(&self) -> i32 {
        self.rank_separation
    }

    pub fn node_separation(&self) -> i32 {
        self.node_separation
    }

    pub fn edge_separation(&self) -> i32 {
        self.edge_separation
    }

    pub fn vertices(&self) -> bool {
        self.vertices
    }

    /// Builds the [`AutomaticLayout`] described by this section.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ModelError::InvalidArgument`] if a configured
    /// separation is negative.
    pub fn automatic_layout(&self) -> Result<AutomaticLayout> {
        AutomaticLayout::new(
            self.rank_direction,
            self.rank_separation,
            self.node_separation,
            self.edge_separation,
            self.vertices,
        )
    }
}

/// Switches for model post-processing.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Whether preparation adds implicit relationships.
    implied_relationships: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            implied_relationships: true,
        }
    }
}

impl ModelConfig {
    /// Creates a model section.
    ///
    /// # Arguments
    ///
    /// * `implied_relationships` - Whether to add implicit relationships.
    pub fn new(implied_relationships: bool) -> Self {
        Self {
            implied_relationships,
        }
    }

    pub fn implied_relationships(&self) -> bool {
        self.implied_relationships
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_automatic_layout() {
        let config = AppConfig::default();
        let layout = config.layout().automatic_layout().unwrap();
        assert_eq!(layout, AutomaticLayout::default());
        assert!(config.model().implied_relationships());
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let json = r#"{"layout": {"rank_separation": 120}, "model": {}}"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.layout().rank_separation(), 120);
        assert_eq!(config.layout().node_separation(), 600);
        assert!(config.model().implied_relationships());
    }

    #[test]
    fn test_negative_separation_is_rejected_when_applied() {
        let json = r#"{"layout": {"edge_separation": -1}}"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert!(config.layout().automatic_layout().is_err());
    }

    #[test]
    fn test_model_switch() {
        let config = AppConfig::new(LayoutConfig::default(), ModelConfig::new(false));
        assert!(!config.model().implied_relationships());
    }
}
