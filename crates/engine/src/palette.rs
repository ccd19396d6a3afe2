use std::fmt::Write as _;

/// Graphic identifier a palette entry stands for.
pub type TileId = u32;

/// Number of entries in the sample palette.
pub const SAMPLE_TILE_COUNT: TileId = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteEntry {
    pub id: TileId,
    pub active: bool,
}

/// Ordered, selectable tile identifiers.
///
/// Holds no selection of its own: the active id is passed in and choices are
/// reported through a callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TilePalette {
    tiles: Vec<TileId>,
}

impl Default for TilePalette {
    fn default() -> Self {
        Self::sample()
    }
}

impl TilePalette {
    pub fn new(tiles: impl IntoIterator<Item = TileId>) -> Self {
        Self {
            tiles: tiles.into_iter().collect(),
        }
    }

    pub fn sample() -> Self {
        Self::new(0..SAMPLE_TILE_COUNT)
    }

    pub fn tiles(&self) -> &[TileId] {
        &self.tiles
    }

    pub fn contains(&self, id: TileId) -> bool {
        self.tiles.contains(&id)
    }

    pub fn entries(&self, active: TileId) -> impl Iterator<Item = PaletteEntry> + '_ {
        self.tiles.iter().map(move |&id| PaletteEntry {
            id,
            active: id == active,
        })
    }

    /// Calls `on_select` when `id` is one of the palette's entries.
    pub fn select(&self, id: TileId, on_select: impl FnOnce(TileId)) -> bool {
        if !self.contains(id) {
            return false;
        }
        on_select(id);
        true
    }

    /// One-line text view; the active entry is bracketed.
    pub fn render_line(&self, active: TileId) -> String {
        let mut out = String::new();
        for (i, entry) in self.entries(active).enumerate() {
            if i > 0 {
                out.push(' ');
            }
            if entry.active {
                let _ = write!(out, "[{}]", entry.id);
            } else {
                let _ = write!(out, "{}", entry.id);
            }
        }
        out
    }
}
