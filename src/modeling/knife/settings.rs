use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use super::belt::{BeltParams, DEFAULT_MAX_ITERATIONS};
use super::correspondence::CorrespondenceMode;
use super::edge::POSITION_EPSILON;
use super::hit_test::PickThresholds;
use super::tool::{InteractionStyle, KnifeOperation};
use super::vertex_cache::VertexCache;

/// Knife settings that persist to disk
#[derive(Resource, Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct KnifeSettings {
    /// Operation selected when the tool starts
    #[serde(default)]
    pub operation: KnifeOperation,
    /// Interaction style selected when the tool starts
    #[serde(default)]
    pub style: InteractionStyle,
    /// Propagate cuts across adjacent quads
    #[serde(default = "default_chain")]
    pub chain: bool,
    /// Edge pick radius in pixels
    #[serde(default = "default_edge_threshold")]
    pub edge_threshold_px: f32,
    /// Vertex snap radius in pixels
    #[serde(default = "default_vertex_threshold")]
    pub vertex_threshold_px: f32,
    /// Distance under which two positions are the same point
    #[serde(default = "default_weld_epsilon")]
    pub weld_epsilon: f32,
    /// Bucket new-vertex lookups in a grid instead of scanning
    #[serde(default)]
    pub use_spatial_hash: bool,
    /// Iteration cap for each direction of a belt walk
    #[serde(default = "default_max_belt_iterations")]
    pub max_belt_iterations: usize,
}

fn default_chain() -> bool {
    true
}

fn default_edge_threshold() -> f32 {
    12.0
}

fn default_vertex_threshold() -> f32 {
    8.0
}

fn default_weld_epsilon() -> f32 {
    POSITION_EPSILON
}

fn default_max_belt_iterations() -> usize {
    DEFAULT_MAX_ITERATIONS
}

impl Default for KnifeSettings {
    fn default() -> Self {
        Self {
            operation: KnifeOperation::default(),
            style: InteractionStyle::default(),
            chain: default_chain(),
            edge_threshold_px: default_edge_threshold(),
            vertex_threshold_px: default_vertex_threshold(),
            weld_epsilon: default_weld_epsilon(),
            use_spatial_hash: false,
            max_belt_iterations: default_max_belt_iterations(),
        }
    }
}

impl KnifeSettings {
    /// Get the settings file path
    fn file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push("bevy_mesh_knife");
            p.push("knife.ron");
            p
        })
    }

    /// Load settings from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = Self::file_path() else {
            return Self::default();
        };

        match fs::read_to_string(&path) {
            Ok(content) => Self::from_ron(&content),
            Err(_) => Self::default(),
        }
    }

    /// Parse settings, falling back to defaults on malformed input
    pub fn from_ron(content: &str) -> Self {
        match ron::from_str(content) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Invalid knife settings, using defaults: {}", e);
                Self::default()
            }
        }
    }

    /// Save settings to disk
    pub fn save(&self) {
        let Some(path) = Self::file_path() else {
            error!("Could not determine config directory");
            return;
        };

        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                error!("Failed to create config directory: {}", e);
                return;
            }
        }

        match ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default()) {
            Ok(content) => {
                if let Err(e) = fs::write(&path, content) {
                    error!("Failed to save knife settings: {}", e);
                } else {
                    info!("Knife settings saved to: {:?}", path);
                }
            }
            Err(e) => {
                error!("Failed to serialize knife settings: {}", e);
            }
        }
    }

    pub fn thresholds(&self) -> PickThresholds {
        PickThresholds {
            edge_px: self.edge_threshold_px,
            vertex_px: self.vertex_threshold_px,
        }
    }

    /// Fresh cache for one commit.
    pub fn vertex_cache(&self) -> VertexCache {
        let cache = VertexCache::new(self.weld_epsilon);
        if self.use_spatial_hash {
            cache.with_spatial_hash()
        } else {
            cache
        }
    }

    pub fn belt_params(&self, mode: CorrespondenceMode) -> BeltParams {
        BeltParams {
            mode,
            epsilon: self.weld_epsilon,
            max_iterations: self.max_belt_iterations,
        }
    }
}
