use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::MapId;

pub type Attributes = BTreeMap<String, String>;

/// Cardinal direction. Encoded on the wire as 0..=3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Self::North, Self::East, Self::South, Self::West];

    /// Grid delta for one step in this direction (y grows southwards).
    pub fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownDirection(pub u8);

impl fmt::Display for UnknownDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown direction {}", self.0)
    }
}

impl std::error::Error for UnknownDirection {}

impl TryFrom<u8> for Direction {
    type Error = UnknownDirection;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(Self::North),
            1 => Ok(Self::East),
            2 => Ok(Self::South),
            3 => Ok(Self::West),
            other => Err(UnknownDirection(other)),
        }
    }
}

impl From<Direction> for u8 {
    fn from(d: Direction) -> Self {
        match d {
            Direction::North => 0,
            Direction::East => 1,
            Direction::South => 2,
            Direction::West => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionalBlock {
    pub direction: Direction,
    #[serde(default)]
    pub block_inbound: bool,
    #[serde(default)]
    pub block_outbound: bool,
}

/// One graphic layer on a tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileGraphic {
    pub graphic_id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Attributes>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarpTarget {
    pub map_id: MapId,
    pub x: u32,
    pub y: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileTrigger {
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Attributes>,
}

/// A single cell of a map.
///
/// Graphic layers are ordered bottom to top. The game server may send them as
/// an object keyed by z-index and a lone `trigger` string; both decode into the
/// list forms. Every collection defaults to empty so partially-populated tiles
/// decode cleanly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapTile {
    #[serde(default)]
    pub passable: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "graphic_layers")]
    pub graphics: Vec<TileGraphic>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "crate::null_default")]
    pub blocked_directions: Vec<DirectionalBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warp: Option<WarpTarget>,
    #[serde(
        default,
        alias = "trigger",
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "trigger_list"
    )]
    pub triggers: Vec<TileTrigger>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty", deserialize_with = "crate::null_default")]
    pub attributes: Attributes,
}

impl MapTile {
    /// Whether an entity may cross this tile's edge on the `from` side.
    pub fn is_passable_from(&self, from: Direction) -> bool {
        if !self.passable {
            return false;
        }
        !self
            .blocked_directions
            .iter()
            .any(|b| b.direction == from && (b.block_inbound || b.block_outbound))
    }

    /// Topmost graphic layer, if any.
    pub fn top_graphic(&self) -> Option<&TileGraphic> {
        self.graphics.last()
    }
}

/// Accepts a layer list, or an object keyed by z-index (lowest first).
fn graphic_layers<'de, D>(d: D) -> Result<Vec<TileGraphic>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Wire {
        Layers(Vec<TileGraphic>),
        ByZIndex(BTreeMap<String, TileGraphic>),
    }

    let layers = match Option::<Wire>::deserialize(d)? {
        None => Vec::new(),
        Some(Wire::Layers(layers)) => layers,
        Some(Wire::ByZIndex(by_z)) => {
            let mut indexed = by_z
                .into_iter()
                .map(|(key, graphic)| match key.trim().parse::<i32>() {
                    Ok(z) => Ok((z, graphic)),
                    Err(_) => Err(D::Error::custom(format!(
                        "graphics key {key:?} is not a z-index"
                    ))),
                })
                .collect::<Result<Vec<_>, _>>()?;
            indexed.sort_by_key(|(z, _)| *z);
            indexed.into_iter().map(|(_, graphic)| graphic).collect()
        }
    };
    Ok(layers)
}

/// Accepts a trigger list or a single event name.
fn trigger_list<'de, D>(d: D) -> Result<Vec<TileTrigger>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Wire {
        Event(String),
        List(Vec<TileTrigger>),
    }

    let triggers = match Option::<Wire>::deserialize(d)? {
        None => Vec::new(),
        Some(Wire::Event(event)) if event.is_empty() => Vec::new(),
        Some(Wire::Event(event)) => vec![TileTrigger {
            event,
            payload: None,
        }],
        Some(Wire::List(list)) => list,
    };
    Ok(triggers)
}
