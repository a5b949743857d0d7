//! Segment blueprints
//!
//! Declarative description of a simulation scenario: which assets to
//! instantiate, with what overrides, plus decorative ghost markers.

use serde::{Deserialize, Serialize};
use crate::asset::AssetOverrides;

/// Static decorative point, rendered without behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GhostMarker {
    pub position: [f32; 3],
    pub color: [u8; 3],
    pub radius: f32,
    pub opacity: f32,
}

impl GhostMarker {
    pub fn new(position: [f32; 3], color: [u8; 3], radius: f32, opacity: f32) -> Self {
        Self { position, color, radius, opacity }
    }
}

/// One asset instance inside a blueprint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetInstance {
    /// Registered asset id
    pub asset: String,
    /// Local instance id (namespaced under the parent when nested)
    pub id: String,
    #[serde(default)]
    pub config: AssetOverrides,
    #[serde(default)]
    pub children: Vec<AssetInstance>,
}

impl AssetInstance {
    pub fn new(asset: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            asset: asset.into(),
            id: id.into(),
            config: AssetOverrides::None,
            children: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: AssetOverrides) -> Self {
        self.config = config;
        self
    }

    pub fn with_child(mut self, child: AssetInstance) -> Self {
        self.children.push(child);
        self
    }

    /// This instance plus all nested children
    pub fn instance_count(&self) -> usize {
        1 + self.children.iter().map(AssetInstance::instance_count).sum::<usize>()
    }
}

/// A named, static composition of asset instances
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentBlueprint {
    pub id: String,
    pub name: String,
    pub assets: Vec<AssetInstance>,
    #[serde(default)]
    pub ghosts: Vec<GhostMarker>,
}

impl SegmentBlueprint {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            assets: Vec::new(),
            ghosts: Vec::new(),
        }
    }

    pub fn with_asset(mut self, instance: AssetInstance) -> Self {
        self.assets.push(instance);
        self
    }

    pub fn with_ghost(mut self, ghost: GhostMarker) -> Self {
        self.ghosts.push(ghost);
        self
    }

    /// Total instances including nested children
    pub fn instance_count(&self) -> usize {
        self.assets.iter().map(AssetInstance::instance_count).sum()
    }
}

/// Separates a parent's id from a child's local id. Not allowed in local ids.
pub const ID_SEPARATOR: char = '/';

/// Join a child's local id onto its parent's materialized id
pub fn namespaced_id(parent: Option<&str>, local: &str) -> String {
    match parent {
        Some(parent) => format!("{}{}{}", parent, ID_SEPARATOR, local),
        None => local.to_string(),
    }
}

/// Parse a RON list of blueprints.
///
/// Option fields in overrides can be written bare with
/// `#![enable(implicit_some)]` at the top of the file.
pub fn parse_blueprints(source: &str) -> Result<Vec<SegmentBlueprint>, ron::error::SpannedError> {
    ron::from_str(source)
}
