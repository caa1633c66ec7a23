//! The editing session: one tile sheet, its metadata, the map painted from
//! it, the tile animator and the test scene, plus the host-facing input and
//! lifecycle entry points.

use crate::animated_tile::{AnimatedTile, AnimatedTileSet};
use crate::animator::{TileAnimator, TILE_ANIMATION_PERIOD};
use crate::clock::FixedStep;
use crate::error::EditorError;
use crate::loader::{map_json, tile_info_json};
use crate::map::{MapModel, Pixmap, MAX_MAP_SIZE};
use crate::scene::input::{JoypadEvent, Key};
use crate::scene::{GameScene, SceneEvent};
use crate::settings::Settings;
use crate::terrain::{remove_bit, valid_bits, TerrainRegistry};
use crate::tile_info::{TileInfoStore, MAP_LAYERS};
use crate::tileset::{self, TileCoord, TileSet};
use macroquad::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Where the session's files live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorPaths {
    /// Tile sheet bitmap.
    pub tile_set: PathBuf,
    /// `tile-info.json`.
    pub tile_info: PathBuf,
    /// `map.json`.
    pub map: PathBuf,
    /// `settings.toml`.
    pub settings: PathBuf,
}

impl EditorPaths {
    /// The standard file names inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            tile_set: dir.join("tile-set.png"),
            tile_info: dir.join("tile-info.json"),
            map: dir.join("map.json"),
            settings: dir.join("settings.toml"),
        }
    }
}

/// Host application focus state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationState {
    /// Foreground with focus.
    Active,
    /// Visible without focus.
    Inactive,
    /// Not visible.
    Hidden,
    /// About to be frozen by the platform.
    Suspended,
}

/// Notifications for the host, drained with [`Editor::drain_events`].
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    /// Plain click on the sheet.
    TileSelected(TileCoord),
    /// Shift-click on the sheet; the brush was stamped onto the tile.
    TileShiftSelected(TileCoord),
    /// Forwarded from the test scene.
    Scene(SceneEvent),
}

/// Terrain mask and layer that Shift-click stamps onto a tile record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TileBrush {
    /// Terrain bit mask.
    pub terrain: u32,
    /// Map layer.
    pub layer: usize,
}

/// The editing session: sheet, tile metadata, map, timers and test scene.
pub struct Editor {
    paths: EditorPaths,
    settings: Settings,
    tileset: TileSet,
    store: TileInfoStore,
    terrains: TerrainRegistry,
    animations: AnimatedTileSet,
    map: MapModel,
    animator: TileAnimator,
    animation_clock: FixedStep,
    scene: Option<GameScene>,
    selection: Vec<TileCoord>,
    last_from_map: Option<TileCoord>,
    brush: TileBrush,
    app_state: ApplicationState,
    shutdown: bool,
    events: Vec<EditorEvent>,
}

impl Editor {
    /// Fresh session over `tileset`: empty metadata, cleared map.
    pub fn new(paths: EditorPaths, settings: Settings, tileset: TileSet) -> Self {
        let settings = settings.sanitized();
        let store = TileInfoStore::new(tileset.tile_count_x(), tileset.tile_count_y());
        let map = MapModel::new(settings.map_width, settings.map_height);
        let scene = Some(GameScene::new(map_centre(&map, &tileset)));
        Self {
            paths,
            settings,
            tileset,
            store,
            terrains: TerrainRegistry::new(),
            animations: AnimatedTileSet::new(),
            map,
            animator: TileAnimator::new(),
            animation_clock: FixedStep::new(TILE_ANIMATION_PERIOD),
            scene,
            selection: Vec::new(),
            last_from_map: None,
            brush: TileBrush::default(),
            app_state: ApplicationState::Active,
            shutdown: false,
            events: Vec::new(),
        }
    }

    /// Opens the session stored at `paths`. Every file is optional: a
    /// missing or broken one falls back to its default.
    pub fn open(paths: EditorPaths) -> Self {
        let settings = Settings::load(&paths.settings).sanitized();
        let image = match tileset::load_image(&paths.tile_set) {
            Ok(image) => image,
            Err(e) => {
                warn!("{}; using the built-in sheet", e);
                TileSet::default().image().clone()
            }
        };
        let sheet = match TileSet::new(image, settings.tile_width, settings.tile_height) {
            Ok(sheet) => sheet,
            Err(e) => {
                warn!("{}; using the built-in sheet", e);
                TileSet::default()
            }
        };
        let mut editor = Self::new(paths, settings, sheet);
        editor.load_documents();
        editor
    }

    /// Best-effort reload of `tile-info.json` and `map.json`.
    pub fn load_documents(&mut self) {
        match tile_info_json::load_tile_info(&self.paths.tile_info) {
            Ok(doc) => self.adopt_tile_info(doc),
            Err(e) => {
                warn!("{}; starting with fresh tile info", e);
                self.reset_tile_info();
            }
        }
        match map_json::load_map(&self.paths.map, &self.store) {
            Ok(map) => {
                self.settings.map_width = map.cols();
                self.settings.map_height = map.rows();
                self.map = map;
                self.respawn_scene();
            }
            Err(e) => {
                warn!("{}; starting with a cleared map", e);
                self.map.clear(self.settings.map_width, self.settings.map_height);
            }
        }
    }

    /// Puts a fresh scene at the centre of the current map.
    fn respawn_scene(&mut self) {
        if !self.shutdown {
            self.scene = Some(GameScene::new(map_centre(&self.map, &self.tileset)));
        }
    }

    fn adopt_tile_info(&mut self, doc: tile_info_json::TileInfoDocument) {
        let (cols, rows) = (self.tileset.tile_count_x(), self.tileset.tile_count_y());
        self.terrains = doc.terrains;
        self.animations = doc.animations;
        if (doc.store.cols(), doc.store.rows()) == (cols, rows) {
            self.store = doc.store;
        } else {
            warn!(
                saved_cols = doc.store.cols(),
                saved_rows = doc.store.rows(),
                cols,
                rows,
                "saved tile info does not match the sheet, records reset"
            );
            self.store.reset(cols, rows);
            let store = &self.store;
            self.animations
                .retain(|a| a.frames().iter().all(|c| store.handle(c.x, c.y).is_some()));
        }
    }

    fn reset_tile_info(&mut self) {
        self.store
            .reset(self.tileset.tile_count_x(), self.tileset.tile_count_y());
        self.animations.clear();
    }

    /// Writes settings, `tile-info.json` and `map.json`.
    pub fn save(&self) -> Result<(), EditorError> {
        tile_info_json::save_tile_info(
            &self.paths.tile_info,
            &self.store,
            &self.terrains,
            &self.animations,
        )?;
        map_json::save_map(&self.paths.map, &self.map, &self.store)?;
        self.settings.save(&self.paths.settings)?;
        Ok(())
    }

    /// Session file locations.
    pub fn paths(&self) -> &EditorPaths {
        &self.paths
    }

    /// Current settings, map size included.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Mutable settings. Map size changes need [`resize_map`](Editor::resize_map).
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// The tile sheet.
    pub fn tileset(&self) -> &TileSet {
        &self.tileset
    }

    /// Per-tile metadata for the current sheet.
    pub fn store(&self) -> &TileInfoStore {
        &self.store
    }

    /// Mutable tile metadata, for host-side property edits.
    pub fn store_mut(&mut self) -> &mut TileInfoStore {
        &mut self.store
    }

    /// Registered terrains.
    pub fn terrains(&self) -> &TerrainRegistry {
        &self.terrains
    }

    /// Tile animations.
    pub fn animations(&self) -> &AnimatedTileSet {
        &self.animations
    }

    /// The map being painted.
    pub fn map(&self) -> &MapModel {
        &self.map
    }

    /// The test scene; `None` after shutdown.
    pub fn scene(&self) -> Option<&GameScene> {
        self.scene.as_ref()
    }

    /// Selected sheet tiles in row-major order.
    pub fn selection(&self) -> &[TileCoord] {
        &self.selection
    }

    /// Tile last picked from the map with the eyedropper.
    pub fn last_from_map(&self) -> Option<TileCoord> {
        self.last_from_map
    }

    /// Current Shift-click brush.
    pub fn brush(&self) -> TileBrush {
        self.brush
    }

    /// Whether `shutdown` has run.
    pub fn is_shut_down(&self) -> bool {
        self.shutdown
    }

    /// Takes every event queued since the last call.
    pub fn drain_events(&mut self) -> Vec<EditorEvent> {
        std::mem::take(&mut self.events)
    }

    // ---------------------------------------------------------------------
    // Tile sheet
    // ---------------------------------------------------------------------

    /// Swaps in the image at `path`. On error the session is unchanged.
    pub fn open_image(&mut self, path: &Path) -> Result<(), EditorError> {
        let image = tileset::load_image(path)?;
        self.tileset.set_bitmap(image);
        self.rebuild_tile_grid();
        Ok(())
    }

    /// Re-cuts the sheet. On error the session is unchanged.
    pub fn set_tile_size(&mut self, width: u32, height: u32) -> Result<(), EditorError> {
        let resized = TileSet::new(self.tileset.image().clone(), width, height)?;
        self.tileset = resized;
        self.settings.tile_width = width;
        self.settings.tile_height = height;
        self.rebuild_tile_grid();
        Ok(())
    }

    /// Records and map cells refer to the old grid; start both over.
    fn rebuild_tile_grid(&mut self) {
        self.reset_tile_info();
        self.selection.clear();
        self.last_from_map = None;
        self.map.clear(self.map.cols(), self.map.rows());
        info!(
            cols = self.store.cols(),
            rows = self.store.rows(),
            tile_w = self.tileset.tile_width(),
            tile_h = self.tileset.tile_height(),
            "tile grid rebuilt"
        );
    }

    /// Plain click on the sheet: select one tile.
    pub fn select_tile(&mut self, x: u32, y: u32) -> bool {
        if !self.tileset.contains(x, y) {
            return false;
        }
        let c = TileCoord::new(x, y);
        self.selection = vec![c];
        self.events.push(EditorEvent::TileSelected(c));
        true
    }

    /// Rubber-band selection between two corners, clipped to the sheet.
    pub fn select_tile_rect(&mut self, a: TileCoord, b: TileCoord) -> usize {
        let x1 = a.x.max(b.x).min(self.tileset.tile_count_x().saturating_sub(1));
        let y1 = a.y.max(b.y).min(self.tileset.tile_count_y().saturating_sub(1));
        let (x0, y0) = (a.x.min(b.x), a.y.min(b.y));
        self.selection = (y0..=y1)
            .flat_map(|y| (x0..=x1).map(move |x| TileCoord::new(x, y)))
            .filter(|c| self.tileset.contains(c.x, c.y))
            .collect();
        self.selection.len()
    }

    /// Deselects every sheet tile.
    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Terrain mask and layer used by [`shift_select`](Editor::shift_select).
    pub fn set_brush(&mut self, terrain: u32, layer: usize) {
        self.brush = TileBrush {
            terrain: terrain & valid_bits(self.terrains.len()),
            layer: layer.min(MAP_LAYERS - 1),
        };
    }

    /// Shift-click on the sheet: stamp the brush onto that tile's record.
    pub fn shift_select(&mut self, x: u32, y: u32) -> bool {
        let brush = self.brush;
        let Some(info) = self.store.get_mut(x, y) else {
            return false;
        };
        info.terrain = brush.terrain;
        info.layer = brush.layer;
        self.events
            .push(EditorEvent::TileShiftSelected(TileCoord::new(x, y)));
        debug!(x, y, terrain = brush.terrain, layer = brush.layer, "tile classified");
        true
    }

    /// Crops every tile whose terrain mask equals `mask` exactly.
    pub fn tiles_with_terrain(&self, mask: u32) -> Vec<Image> {
        let store = &self.store;
        self.tileset
            .reap_tiles(|x, y| store.get(x, y).map_or(false, |t| t.terrain == mask))
    }

    // ---------------------------------------------------------------------
    // Terrains
    // ---------------------------------------------------------------------

    /// Registers a terrain; `false` if the name is taken or all 32 bits are used.
    pub fn add_terrain(&mut self, name: &str) -> bool {
        self.terrains.add(name)
    }

    /// Removes a terrain and renumbers every mask, the brush included.
    pub fn remove_terrain(&mut self, name: &str) -> Result<(), EditorError> {
        let index = self.terrains.remove(name, &mut self.store)?;
        self.brush.terrain = remove_bit(self.brush.terrain, index);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Map
    // ---------------------------------------------------------------------

    /// Click on a map cell: paint the sheet selection, or the tile picked
    /// from the map when nothing is selected. Returns cells painted.
    pub fn paint_at(&mut self, x: u32, y: u32) -> usize {
        if !self.selection.is_empty() {
            return self.map.paint_block(&self.store, &self.selection, x, y);
        }
        match self.last_from_map {
            Some(c) => self.map.paint_tile(&self.store, c, x, y).map_or(0, |_| 1),
            None => 0,
        }
    }

    /// Ctrl-click on a map cell.
    pub fn erase_at(&mut self, x: u32, y: u32) -> Result<(), EditorError> {
        self.map.erase_overlays(x, y)
    }

    /// Eyedropper: remember the topmost tile at `(x, y)` and drop the
    /// sheet selection so the next click paints it.
    pub fn pick_from_map(&mut self, x: u32, y: u32) -> Option<TileCoord> {
        let picked = (0..MAP_LAYERS)
            .rev()
            .filter_map(|l| self.map.cell(l, x, y)?.tile)
            .find_map(|h| self.store.resolve(h).map(|t| t.coord()))?;
        self.last_from_map = Some(picked);
        self.selection.clear();
        Some(picked)
    }

    /// Fills the ground with the first selected tile.
    pub fn fill_ground_with_selection(&mut self) -> bool {
        let Some(&c) = self.selection.first() else {
            return false;
        };
        self.map
            .fill_ground(self.store.handle(c.x, c.y), Pixmap::Tile(c));
        true
    }

    /// Clears the map at its current size.
    pub fn clear_map(&mut self) {
        self.map.clear(self.map.cols(), self.map.rows());
    }

    /// Rebuilds the map at a new size, each edge clamped to
    /// `[1, MAX_MAP_SIZE]`.
    pub fn resize_map(&mut self, cols: u32, rows: u32) {
        let (cols, rows) = (cols.clamp(1, MAX_MAP_SIZE), rows.clamp(1, MAX_MAP_SIZE));
        self.settings.map_width = cols;
        self.settings.map_height = rows;
        self.map.clear(cols, rows);
    }

    // ---------------------------------------------------------------------
    // Tile animations
    // ---------------------------------------------------------------------

    /// Creates an animation anchored on `anchor`. Returns its index.
    pub fn add_animation(&mut self, name: &str, anchor: TileCoord) -> Option<usize> {
        if self.store.handle(anchor.x, anchor.y).is_none() {
            return None;
        }
        self.animations.push(AnimatedTile::new(name, anchor));
        Some(self.animations.len() - 1)
    }

    /// Deletes animation `index`.
    pub fn remove_animation(&mut self, index: usize) -> bool {
        self.animations.remove(index).is_some()
    }

    /// Appends `frame` to animation `index`; `false` if either is unknown.
    pub fn add_animation_frame(&mut self, index: usize, frame: TileCoord) -> bool {
        if self.store.handle(frame.x, frame.y).is_none() {
            return false;
        }
        match self.animations.get_mut(index) {
            Some(a) => {
                a.push_frame(frame);
                true
            }
            None => false,
        }
    }

    /// Removes frame `frame` of animation `index`. The anchor stays.
    pub fn remove_animation_frame(&mut self, index: usize, frame: usize) -> bool {
        self.animations
            .get_mut(index)
            .map_or(false, |a| a.remove_frame(frame))
    }

    /// Switches wrap or bounce playback and rewinds.
    pub fn set_animation_ping_pong(&mut self, index: usize, ping_pong: bool) -> bool {
        match self.animations.get_mut(index) {
            Some(a) => {
                a.ping_pong = ping_pong;
                a.rewind();
                true
            }
            None => false,
        }
    }

    /// Renames animation `index`.
    pub fn rename_animation(&mut self, index: usize, name: &str) -> bool {
        match self.animations.get_mut(index) {
            Some(a) => {
                a.name = name.to_owned();
                true
            }
            None => false,
        }
    }

    // ---------------------------------------------------------------------
    // Scene input
    // ---------------------------------------------------------------------

    /// Keyboard input for the test scene.
    pub fn key(&mut self, key: Key, down: bool) {
        if let Some(scene) = self.scene.as_mut() {
            scene.key(key, down);
        }
    }

    /// Joypad input for the test scene.
    pub fn joypad(&mut self, event: JoypadEvent) {
        if let Some(scene) = self.scene.as_mut() {
            scene.joypad(event);
        }
    }

    // ---------------------------------------------------------------------
    // Timers and lifecycle
    // ---------------------------------------------------------------------

    /// Runs every timer for `dt`: tile animation, simulation, actors.
    /// Finished actors are removed before this returns. Does nothing once
    /// the session is shut down.
    pub fn advance(&mut self, dt: Duration) {
        if self.shutdown {
            return;
        }
        for _ in 0..self.animation_clock.advance(dt) {
            self.animator
                .tick(&mut self.animations, &self.store, &mut self.map);
        }
        let Some(scene) = self.scene.as_mut() else {
            return;
        };
        let events = scene.advance(dt);
        scene.reap(&events);
        self.events
            .extend(events.into_iter().map(EditorEvent::Scene));
    }

    /// Saves when the application leaves the active state.
    pub fn application_state_changed(
        &mut self,
        state: ApplicationState,
    ) -> Result<(), EditorError> {
        let was_active = self.app_state == ApplicationState::Active;
        self.app_state = state;
        if was_active && state != ApplicationState::Active && !self.shutdown {
            info!(?state, "application backgrounded, saving");
            return self.save();
        }
        Ok(())
    }

    /// Stops every timer, saves, then tears the scene down. Later calls
    /// are no-ops.
    pub fn shutdown(&mut self) -> Result<(), EditorError> {
        if self.shutdown {
            return Ok(());
        }
        self.shutdown = true;
        let saved = self.save();
        if let Err(e) = &saved {
            error!("{}", e);
        }
        self.scene = None;
        self.events.clear();
        info!("editor shut down");
        saved
    }
}

fn map_centre(map: &MapModel, tileset: &TileSet) -> Vec2 {
    vec2(
        map.cols() as f32 * tileset.tile_width() as f32 / 2.0,
        map.rows() as f32 * tileset.tile_height() as f32 / 2.0,
    )
}
