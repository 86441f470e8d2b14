use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::api::error::EngineError;

/// A parsed tile map: grid size, tile size, per-gid tile properties and an
/// ordered list of tile and object layers. Loaded from JSON exported by the
/// map editor; all property values are raw strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileMapData {
    /// Width in tiles.
    pub width: u32,
    /// Height in tiles.
    pub height: u32,
    pub tile_width: u32,
    pub tile_height: u32,
    /// Properties per tile gid (keys are decimal gids).
    #[serde(default)]
    pub tile_properties: HashMap<String, HashMap<String, String>>,
    #[serde(default)]
    pub layers: Vec<LayerData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayerData {
    Tiles(TileLayerData),
    Objects(ObjectLayerData),
}

impl LayerData {
    pub fn name(&self) -> &str {
        match self {
            LayerData::Tiles(l) => &l.name,
            LayerData::Objects(l) => &l.name,
        }
    }
}

/// Row-major gids; 0 means no tile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileLayerData {
    pub name: String,
    #[serde(default)]
    pub properties: HashMap<String, String>,
    pub data: Vec<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectLayerData {
    pub name: String,
    #[serde(default)]
    pub objects: Vec<MapObject>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapObject {
    #[serde(default)]
    pub name: String,
    /// Free-form type; used as the class name when no `class` property is
    /// present.
    #[serde(default, rename = "type")]
    pub kind: String,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub properties: HashMap<String, String>,
}

fn default_visible() -> bool {
    true
}

impl TileMapData {
    /// Parse a map from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Raw properties of a tile gid, if any were defined.
    pub fn tile_properties(&self, gid: u32) -> Option<&HashMap<String, String>> {
        self.tile_properties.get(&gid.to_string())
    }
}
