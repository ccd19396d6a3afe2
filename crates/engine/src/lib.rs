pub mod canvas;
pub mod context;
pub mod editor;
pub mod palette;
pub mod repository;

pub use canvas::{CanvasError, MapCanvas, ResourceTracker, TILE_SIZE};
pub use context::{Breadcrumb, MenuItem, TitleBar};
pub use editor::{EditorEvent, MapEditor, Operation, Placement, SaveBlocked, SEARCH_DEBOUNCE};
pub use palette::{TileId, TilePalette};
pub use repository::{HttpMapRepository, MapRepository, RepoError, DEFAULT_TIMEOUT};
