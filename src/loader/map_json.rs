// src/loader/map_json.rs
use crate::error::EditorError;
use crate::map::{MapModel, Pixmap, MAX_MAP_SIZE};
use crate::tile_info::{TileInfoStore, MAP_LAYERS};
use crate::tileset::TileCoord;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// `tile-set-x`/`tile-set-y` value of an empty cell.
const EMPTY_CELL: i64 = -1;

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct JsonMap {
    map_size_x: u32,
    map_size_y: u32,
    layers: Vec<Vec<JsonCell>>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct JsonCell {
    x: u32,
    y: u32,
    tile_set_x: i64,
    tile_set_y: i64,
}

/// Serialises every layer row-major. Cells store the sheet position of
/// their record, so animation frames are not persisted.
pub fn encode_map(map: &MapModel, store: &TileInfoStore) -> Result<String, serde_json::Error> {
    let mut layers: Vec<Vec<JsonCell>> = (0..MAP_LAYERS)
        .map(|_| Vec::with_capacity((map.cols() * map.rows()) as usize))
        .collect();
    for (layer, x, y, cell) in map.cells() {
        let (tile_set_x, tile_set_y) = cell
            .tile
            .and_then(|h| store.resolve(h))
            .map(|t| (t.x as i64, t.y as i64))
            .unwrap_or((EMPTY_CELL, EMPTY_CELL));
        layers[layer].push(JsonCell {
            x,
            y,
            tile_set_x,
            tile_set_y,
        });
    }
    let doc = JsonMap {
        map_size_x: map.cols(),
        map_size_y: map.rows(),
        layers,
    };
    serde_json::to_string_pretty(&doc)
}

/// Parses a `map.json` text against `store`.
///
/// The document must carry exactly `MAP_LAYERS` layers of
/// `map-size-x * map-size-y` cells, each edge at most `MAX_MAP_SIZE`.
/// Cells naming a tile the store does not
/// have are left empty (the ground keeps its placeholder).
pub fn decode_map(text: &str, store: &TileInfoStore, path: &Path) -> Result<MapModel, EditorError> {
    let j: JsonMap = serde_json::from_str(text).map_err(|source| EditorError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    let invalid = |reason: String| EditorError::InvalidDocument {
        path: path.to_path_buf(),
        reason,
    };

    let edges = 1..=MAX_MAP_SIZE;
    if !edges.contains(&j.map_size_x) || !edges.contains(&j.map_size_y) {
        return Err(invalid(format!(
            "map is {}x{}, edges must be 1 to {}",
            j.map_size_x, j.map_size_y, MAX_MAP_SIZE
        )));
    }
    if j.layers.len() != MAP_LAYERS {
        return Err(invalid(format!(
            "expected {} layers, found {}",
            MAP_LAYERS,
            j.layers.len()
        )));
    }
    let want = j.map_size_x as usize * j.map_size_y as usize;
    for (i, l) in j.layers.iter().enumerate() {
        if l.len() != want {
            return Err(invalid(format!(
                "layer {} holds {} cells, map is {}x{}",
                i,
                l.len(),
                j.map_size_x,
                j.map_size_y
            )));
        }
    }

    let mut map = MapModel::new(j.map_size_x, j.map_size_y);
    let mut unknown = 0usize;
    for (layer, cells) in j.layers.iter().enumerate() {
        for c in cells {
            if c.tile_set_x < 0 || c.tile_set_y < 0 {
                continue;
            }
            let coord = TileCoord::new(c.tile_set_x as u32, c.tile_set_y as u32);
            let Some(handle) = store.handle(coord.x, coord.y) else {
                unknown += 1;
                continue;
            };
            if map
                .paint_cell(layer, c.x, c.y, Some(handle), Pixmap::Tile(coord))
                .is_err()
            {
                unknown += 1;
            }
        }
    }
    if unknown > 0 {
        warn!(
            path = %path.display(),
            unknown,
            "map cells referencing unknown tiles were left empty"
        );
    }
    Ok(map)
}

/// Writes `map.json` to `path`.
pub fn save_map(path: &Path, map: &MapModel, store: &TileInfoStore) -> Result<(), EditorError> {
    let txt = encode_map(map, store).map_err(|source| EditorError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, txt).map_err(|source| EditorError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), cols = map.cols(), rows = map.rows(), "map saved");
    Ok(())
}

/// Reads `map.json` from `path`.
pub fn load_map(path: &Path, store: &TileInfoStore) -> Result<MapModel, EditorError> {
    let txt = std::fs::read_to_string(path).map_err(|source| EditorError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let map = decode_map(&txt, store, path)?;
    info!(path = %path.display(), cols = map.cols(), rows = map.rows(), "map loaded");
    Ok(map)
}
