#![warn(missing_docs)]

//! Tile sheet classifier, four-layer map painter and arcade test scene
//! built on Macroquad's image and math types.

/// Frame-sequence tile animations.
pub mod animated_tile;
/// Drives tile animations on the map.
pub mod animator;
/// Fixed-step timers.
pub mod clock;
pub mod editor;
mod error;
/// JSON documents on disk.
pub mod loader {
    /// `map.json`.
    pub mod map_json;
    /// `tile-info.json`.
    pub mod tile_info_json;
}
/// The four-layer map.
pub mod map;
pub mod scene;
/// `settings.toml`.
pub mod settings;
/// Terrain names and mask remapping.
pub mod terrain;
/// Per-tile metadata.
pub mod tile_info;
/// Tile sheet grid.
pub mod tileset;
/// Viewport culling and hit testing.
pub mod view;

pub use animated_tile::{AnimatedTile, AnimatedTileSet};
pub use animator::TileAnimator;
pub use clock::FixedStep;
pub use editor::{ApplicationState, Editor, EditorEvent, EditorPaths, TileBrush};
pub use error::EditorError;
pub use map::{MapCell, MapModel, Pixmap, MAX_MAP_SIZE};
pub use scene::{Actor, ActorId, GameScene, SceneEvent};
pub use settings::Settings;
pub use terrain::TerrainRegistry;
pub use tile_info::{TileHandle, TileInfo, TileInfoStore, MAP_LAYERS};
pub use tileset::{TileCoord, TileSet};
