// src/loader/tile_info_json.rs
use crate::animated_tile::{AnimatedTile, AnimatedTileSet};
use crate::error::EditorError;
use crate::terrain::{valid_bits, TerrainRegistry};
use crate::tile_info::{TileInfoStore, MAP_LAYERS, UNASSIGNED};
use crate::tileset::TileCoord;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct JsonTileInfo {
    tiles_x: u32,
    tiles_y: u32,
    #[serde(default)]
    terrains: Vec<JsonTerrain>,
    #[serde(default)]
    tiles: Vec<JsonTile>,
    #[serde(default)]
    tile_animations: Vec<JsonAnimation>,
}

#[derive(Serialize, Deserialize)]
struct JsonTerrain {
    name: String,
}

#[derive(Serialize, Deserialize)]
struct JsonTile {
    x: u32,
    y: u32,
    #[serde(default = "unassigned")]
    name: String,
    #[serde(default)]
    terrain: u32,
    #[serde(default)]
    layer: usize,
}

fn unassigned() -> String {
    UNASSIGNED.to_owned()
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct JsonAnimation {
    name: String,
    #[serde(default)]
    play_back_and_forth: bool,
    #[serde(default)]
    animation_frames: Vec<JsonFrame>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct JsonFrame {
    tile_x: u32,
    tile_y: u32,
}

/// Everything `tile-info.json` holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TileInfoDocument {
    /// Tile records.
    pub store: TileInfoStore,
    /// Terrain names.
    pub terrains: TerrainRegistry,
    /// Animations, in file order.
    pub animations: AnimatedTileSet,
}

/// Serialises store, registry and animations. `tiles-x`/`tiles-y` come
/// from the store itself.
pub fn encode_tile_info(
    store: &TileInfoStore,
    terrains: &TerrainRegistry,
    animations: &AnimatedTileSet,
) -> Result<String, serde_json::Error> {
    let doc = JsonTileInfo {
        tiles_x: store.cols(),
        tiles_y: store.rows(),
        terrains: terrains
            .names()
            .iter()
            .map(|name| JsonTerrain { name: name.clone() })
            .collect(),
        tiles: store
            .iter()
            .map(|t| JsonTile {
                x: t.x,
                y: t.y,
                name: t.name.clone(),
                terrain: t.terrain,
                layer: t.layer,
            })
            .collect(),
        tile_animations: animations
            .iter()
            .map(|a| JsonAnimation {
                name: a.name.clone(),
                play_back_and_forth: a.ping_pong,
                animation_frames: a
                    .frames()
                    .iter()
                    .map(|c| JsonFrame {
                        tile_x: c.x,
                        tile_y: c.y,
                    })
                    .collect(),
            })
            .collect(),
    };
    serde_json::to_string_pretty(&doc)
}

/// Parses a `tile-info.json` text read from `path`.
///
/// The document must list one record per grid position, so the grid it
/// declares is never larger than the text itself. Entries that do not fit
/// the declared grid are dropped, layers are clamped and terrain bits beyond
/// the registry are cleared.
pub fn decode_tile_info(text: &str, path: &Path) -> Result<TileInfoDocument, EditorError> {
    let j: JsonTileInfo = serde_json::from_str(text).map_err(|source| EditorError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    let declared = (j.tiles_x as usize).checked_mul(j.tiles_y as usize);
    if declared != Some(j.tiles.len()) {
        return Err(EditorError::InvalidDocument {
            path: path.to_path_buf(),
            reason: format!(
                "{}x{} tile grid but {} tile records",
                j.tiles_x,
                j.tiles_y,
                j.tiles.len()
            ),
        });
    }

    let mut terrains = TerrainRegistry::new();
    for t in &j.terrains {
        terrains.add(&t.name);
    }
    let mask = valid_bits(terrains.len());

    let mut store = TileInfoStore::new(j.tiles_x, j.tiles_y);
    let mut dropped = 0usize;
    for t in j.tiles {
        match store.get_mut(t.x, t.y) {
            Some(info) => {
                info.name = t.name;
                info.terrain = t.terrain & mask;
                info.layer = t.layer.min(MAP_LAYERS - 1);
            }
            None => dropped += 1,
        }
    }

    let mut animations = AnimatedTileSet::new();
    for a in j.tile_animations {
        let frames: Vec<TileCoord> = a
            .animation_frames
            .iter()
            .map(|f| TileCoord::new(f.tile_x, f.tile_y))
            .filter(|c| store.handle(c.x, c.y).is_some())
            .collect();
        match AnimatedTile::with_frames(a.name, frames, a.play_back_and_forth) {
            Some(anim) => animations.push(anim),
            None => dropped += 1,
        }
    }
    if dropped > 0 {
        warn!(dropped, "tile info entries outside the tile grid were ignored");
    }

    Ok(TileInfoDocument {
        store,
        terrains,
        animations,
    })
}

/// Writes `tile-info.json` to `path`.
pub fn save_tile_info(
    path: &Path,
    store: &TileInfoStore,
    terrains: &TerrainRegistry,
    animations: &AnimatedTileSet,
) -> Result<(), EditorError> {
    let txt = encode_tile_info(store, terrains, animations).map_err(|source| EditorError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, txt).map_err(|source| EditorError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), tiles = store.len(), "tile info saved");
    Ok(())
}

/// Reads `tile-info.json` from `path`.
pub fn load_tile_info(path: &Path) -> Result<TileInfoDocument, EditorError> {
    let txt = std::fs::read_to_string(path).map_err(|source| EditorError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let doc = decode_tile_info(&txt, path)?;
    info!(
        path = %path.display(),
        cols = doc.store.cols(),
        rows = doc.store.rows(),
        terrains = doc.terrains.len(),
        animations = doc.animations.len(),
        "tile info loaded"
    );
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_kebab_case_document() {
        let txt = r#"{
          "tiles-x": 2,
          "tiles-y": 1,
          "terrains": [{"name":"grass"},{"name":"water"}],
          "tiles": [
            {"x":0,"y":0,"name":"meadow","terrain":1,"layer":0},
            {"x":1,"y":0,"name":"pond","terrain":3,"layer":2}
          ],
          "tile-animations": [
            {"name":"ripple","play-back-and-forth":true,
             "animation-frames":[{"tile-x":1,"tile-y":0},{"tile-x":0,"tile-y":0}]}
          ]
        }"#;
        let doc = decode_tile_info(txt, Path::new("tile-info.json")).expect("decode");
        assert_eq!(doc.terrains.names(), ["grass", "water"]);
        assert_eq!(doc.store.at(1, 0).name, "pond");
        assert_eq!(doc.store.at(1, 0).terrain, 3);
        assert_eq!(doc.store.at(1, 0).layer, 2);
        let anim = doc.animations.get(0).unwrap();
        assert!(anim.ping_pong);
        assert_eq!(anim.anchor(), TileCoord::new(1, 0));
    }

    #[test]
    fn sanitises_out_of_range_content() {
        let txt = r#"{
          "tiles-x": 2, "tiles-y": 1,
          "terrains": [{"name":"grass"}],
          "tiles": [
            {"x":0,"y":0,"terrain":255,"layer":9},
            {"x":5,"y":5,"name":"ghost"}
          ],
          "tile-animations": [
            {"name":"nowhere","animation-frames":[{"tile-x":4,"tile-y":4}]}
          ]
        }"#;
        let doc = decode_tile_info(txt, Path::new("tile-info.json")).expect("decode");
        let t = doc.store.at(0, 0);
        assert_eq!(t.name, UNASSIGNED);
        assert_eq!(t.terrain, 1);
        assert_eq!(t.layer, MAP_LAYERS - 1);
        assert_eq!(doc.store.at(1, 0).name, UNASSIGNED);
        assert!(doc.animations.is_empty());
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let txt = r#"{"tiles-x":2,"tiles-y":1,"tiles":[{"x":0,"y":0},{"x":1,"y":0}]}"#;
        let doc = decode_tile_info(txt, Path::new("tile-info.json")).expect("decode");
        assert_eq!(doc.store.len(), 2);
        assert!(doc.terrains.is_empty());
        assert!(doc.animations.is_empty());
    }

    #[test]
    fn grid_larger_than_its_records_is_invalid() {
        let path = Path::new("tile-info.json");
        let err = decode_tile_info(r#"{"tiles-x":200000,"tiles-y":200000}"#, path).unwrap_err();
        assert!(matches!(err, EditorError::InvalidDocument { .. }));
        let short = r#"{"tiles-x":2,"tiles-y":2,"tiles":[{"x":0,"y":0}]}"#;
        assert!(matches!(
            decode_tile_info(short, path),
            Err(EditorError::InvalidDocument { reason, .. }) if reason.contains("2x2")
        ));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            decode_tile_info("{ nope", Path::new("tile-info.json")),
            Err(EditorError::Json { .. })
        ));
    }
}
