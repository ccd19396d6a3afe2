use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::tile::MapTile;

/// Width and height of every server map.
pub const MAP_DIM: usize = 17;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridPos {
    pub x: usize,
    pub y: usize,
}

impl GridPos {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    pub fn in_bounds(self) -> bool {
        self.x < MAP_DIM && self.y < MAP_DIM
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    TooManyColumns(usize),
    ColumnTooTall { column: usize, len: usize },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooManyColumns(n) => {
                write!(f, "tile grid has {n} columns, expected at most {MAP_DIM}")
            }
            Self::ColumnTooTall { column, len } => write!(
                f,
                "tile grid column {column} has {len} tiles, expected at most {MAP_DIM}"
            ),
        }
    }
}

impl std::error::Error for GridError {}

/// Tiles of a map, stored column-major (`columns[x][y]`) to match the server.
///
/// A grid is either empty (a map that was never saved) or exactly
/// `MAP_DIM` x `MAP_DIM`. Undersized input is padded with default tiles;
/// oversized input is rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TileGrid {
    columns: Vec<Vec<MapTile>>,
}

impl TileGrid {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Full-size grid of default (impassable, bare) tiles.
    pub fn filled() -> Self {
        Self {
            columns: vec![vec![MapTile::default(); MAP_DIM]; MAP_DIM],
        }
    }

    pub fn from_columns(mut columns: Vec<Vec<MapTile>>) -> Result<Self, GridError> {
        if columns.is_empty() {
            return Ok(Self::empty());
        }
        if columns.len() > MAP_DIM {
            return Err(GridError::TooManyColumns(columns.len()));
        }
        if let Some((column, col)) = columns
            .iter()
            .enumerate()
            .find(|(_, col)| col.len() > MAP_DIM)
        {
            return Err(GridError::ColumnTooTall {
                column,
                len: col.len(),
            });
        }
        columns.resize_with(MAP_DIM, Vec::new);
        for col in &mut columns {
            col.resize_with(MAP_DIM, MapTile::default);
        }
        Ok(Self { columns })
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Side length: 0 for an empty grid, otherwise `MAP_DIM`.
    pub fn dim(&self) -> usize {
        self.columns.len()
    }

    pub fn get(&self, pos: GridPos) -> Option<&MapTile> {
        self.columns.get(pos.x)?.get(pos.y)
    }

    pub fn get_mut(&mut self, pos: GridPos) -> Option<&mut MapTile> {
        self.columns.get_mut(pos.x)?.get_mut(pos.y)
    }

    /// Iterates tiles in row order (y outer, x inner), which is draw order.
    pub fn iter(&self) -> impl Iterator<Item = (GridPos, &MapTile)> + '_ {
        let dim = self.dim();
        (0..dim).flat_map(move |y| {
            (0..dim).map(move |x| (GridPos::new(x, y), &self.columns[x][y]))
        })
    }
}

impl<'de> Deserialize<'de> for TileGrid {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let columns = Option::<Vec<Vec<MapTile>>>::deserialize(d)?.unwrap_or_default();
        TileGrid::from_columns(columns).map_err(serde::de::Error::custom)
    }
}
