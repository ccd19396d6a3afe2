use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use image::{Rgba, RgbaImage};
use odyssey_admin_protocol::{GridPos, MAP_DIM};

/// Edge length of one tile in pixels.
pub const TILE_SIZE: u32 = 32;

pub const BACKGROUND: Rgba<u8> = Rgba([0x1e, 0x1e, 0x1e, 0xff]);
pub const CELL_FILL: Rgba<u8> = Rgba([0x44, 0x44, 0x44, 0xff]);
pub const CELL_LINE: Rgba<u8> = Rgba([0x55, 0x55, 0x55, 0xff]);

/// Counts live drawing resources. Clones share the same counter.
#[derive(Debug, Clone, Default)]
pub struct ResourceTracker {
    live: Arc<AtomicUsize>,
}

impl ResourceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    fn acquire(&self) -> ResourceGuard {
        self.live.fetch_add(1, Ordering::SeqCst);
        ResourceGuard {
            live: Arc::clone(&self.live),
        }
    }
}

#[derive(Debug)]
struct ResourceGuard {
    live: Arc<AtomicUsize>,
}

impl Drop for ResourceGuard {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    fn is_edge(&self, px: u32, py: u32) -> bool {
        px == self.x || py == self.y || px + 1 == self.x + self.w || py + 1 == self.y + self.h
    }
}

#[derive(Debug)]
struct CellGraphic {
    rect: Rect,
    _guard: ResourceGuard,
}

/// Everything allocated while the canvas is mounted.
#[derive(Debug)]
struct Stage {
    surface: RgbaImage,
    cells: Vec<CellGraphic>,
    _guard: ResourceGuard,
}

#[derive(Debug)]
pub enum CanvasError {
    NotMounted,
    Image(image::ImageError),
}

impl fmt::Display for CanvasError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotMounted => write!(f, "canvas is not mounted"),
            Self::Image(e) => write!(f, "image export failed: {e}"),
        }
    }
}

impl std::error::Error for CanvasError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Image(e) => Some(e),
            Self::NotMounted => None,
        }
    }
}

/// Fixed-size tile grid rendered into an RGBA surface.
///
/// Only the background grid is drawn; tile graphics are not read from the map.
#[derive(Debug)]
pub struct MapCanvas {
    tile_size: u32,
    dim: u32,
    tracker: ResourceTracker,
    stage: Option<Stage>,
}

impl Default for MapCanvas {
    fn default() -> Self {
        Self::new()
    }
}

impl MapCanvas {
    pub fn new() -> Self {
        Self::with_tracker(ResourceTracker::new())
    }

    pub fn with_tracker(tracker: ResourceTracker) -> Self {
        Self {
            tile_size: TILE_SIZE,
            dim: MAP_DIM as u32,
            tracker,
            stage: None,
        }
    }

    pub fn tracker(&self) -> &ResourceTracker {
        &self.tracker
    }

    /// Width and height of the surface in pixels.
    pub fn pixel_size(&self) -> u32 {
        self.tile_size * self.dim
    }

    pub fn is_mounted(&self) -> bool {
        self.stage.is_some()
    }

    /// Allocates the surface and one graphic per cell. Remounting releases the
    /// previous stage first.
    pub fn mount(&mut self) {
        self.unmount();
        let size = self.pixel_size();
        let stage_guard = self.tracker.acquire();
        let mut cells = Vec::with_capacity((self.dim * self.dim) as usize);
        for row in 0..self.dim {
            for col in 0..self.dim {
                let (x, y) = self.cell_origin(col, row);
                cells.push(CellGraphic {
                    rect: Rect {
                        x,
                        y,
                        w: self.tile_size,
                        h: self.tile_size,
                    },
                    _guard: self.tracker.acquire(),
                });
            }
        }
        self.stage = Some(Stage {
            surface: RgbaImage::from_pixel(size, size, BACKGROUND),
            cells,
            _guard: stage_guard,
        });
        log::debug!("canvas mounted ({size}x{size}px)");
    }

    pub fn unmount(&mut self) {
        if self.stage.take().is_some() {
            log::debug!("canvas unmounted");
        }
    }

    /// Redraws the grid. Returns false when not mounted.
    pub fn render(&mut self) -> bool {
        let Some(stage) = self.stage.as_mut() else {
            return false;
        };
        for px in stage.surface.pixels_mut() {
            *px = BACKGROUND;
        }
        for cell in &stage.cells {
            let r = cell.rect;
            for py in r.y..r.y + r.h {
                for px in r.x..r.x + r.w {
                    let color = if r.is_edge(px, py) { CELL_LINE } else { CELL_FILL };
                    stage.surface.put_pixel(px, py, color);
                }
            }
        }
        true
    }

    pub fn surface(&self) -> Option<&RgbaImage> {
        self.stage.as_ref().map(|s| &s.surface)
    }

    /// Top-left pixel of the cell at `(col, row)`.
    pub fn cell_origin(&self, col: u32, row: u32) -> (u32, u32) {
        (col * self.tile_size, row * self.tile_size)
    }

    pub fn hit_test(&self, px: u32, py: u32) -> Option<GridPos> {
        let (col, row) = (px / self.tile_size, py / self.tile_size);
        if col >= self.dim || row >= self.dim {
            return None;
        }
        Some(GridPos::new(col as usize, row as usize))
    }

    pub fn export_png(&self, path: &Path) -> Result<(), CanvasError> {
        let surface = self.surface().ok_or(CanvasError::NotMounted)?;
        surface.save(path).map_err(CanvasError::Image)
    }
}
