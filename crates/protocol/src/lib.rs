use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use time::OffsetDateTime;

mod grid;
mod tile;

pub use grid::{GridError, GridPos, TileGrid, MAP_DIM};
pub use tile::{
    Attributes, Direction, DirectionalBlock, MapTile, TileGraphic, TileTrigger, UnknownDirection,
    WarpTarget,
};

/// Server-assigned map identifier. `0` marks a map that has never been saved.
pub type MapId = u32;

pub const UNSAVED_MAP_ID: MapId = 0;
pub const UNTITLED_MAP_NAME: &str = "Untitled Map";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub north: Option<MapId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub east: Option<MapId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub south: Option<MapId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub west: Option<MapId>,
}

impl MapLinks {
    pub fn get(&self, dir: Direction) -> Option<MapId> {
        match dir {
            Direction::North => self.north,
            Direction::East => self.east,
            Direction::South => self.south,
            Direction::West => self.west,
        }
    }

    pub fn is_empty(&self) -> bool {
        Direction::ALL.iter().all(|d| self.get(*d).is_none())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameMap {
    pub id: MapId,
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty", deserialize_with = "null_default")]
    pub attributes: Attributes,
    #[serde(with = "time::serde::rfc3339")]
    pub last_updated: OffsetDateTime,
    pub version: u32,
    #[serde(default)]
    pub tiles: TileGrid,
    #[serde(default)]
    pub links: MapLinks,
}

impl GameMap {
    /// Local, unsaved map used when the user starts a new one.
    pub fn blank() -> Self {
        Self {
            id: UNSAVED_MAP_ID,
            name: UNTITLED_MAP_NAME.to_string(),
            tags: Vec::new(),
            attributes: Attributes::new(),
            last_updated: OffsetDateTime::now_utc(),
            version: 1,
            tiles: TileGrid::empty(),
            links: MapLinks::default(),
        }
    }

    /// True until the server has assigned an id.
    pub fn is_unsaved(&self) -> bool {
        self.id == UNSAVED_MAP_ID
    }

    /// Copy of this document with only `name` replaced.
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    pub fn tile(&self, x: usize, y: usize) -> Option<&MapTile> {
        self.tiles.get(GridPos::new(x, y))
    }

    pub fn tile_mut(&mut self, x: usize, y: usize) -> Option<&mut MapTile> {
        self.tiles.get_mut(GridPos::new(x, y))
    }

    /// `None` when `(x, y)` is outside the grid.
    pub fn is_passable(&self, x: usize, y: usize, from: Direction) -> Option<bool> {
        self.tile(x, y).map(|t| t.is_passable_from(from))
    }
}

/// Body of `POST /admin/maps`. The server fills in everything else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateMapRequest {
    pub name: String,
}

/// Treats an explicit JSON `null` like a missing field.
pub(crate) fn null_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

#[cfg(test)]
mod tests;
