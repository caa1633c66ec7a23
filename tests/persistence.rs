// tests/persistence.rs

use macroquad_map_editor::animated_tile::{AnimatedTile, AnimatedTileSet};
use macroquad_map_editor::loader::{map_json, tile_info_json};
use macroquad_map_editor::{MapModel, Pixmap, TerrainRegistry, TileCoord, TileInfoStore};
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_file(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock went backwards")
        .as_nanos();
    std::env::temp_dir().join(format!("mq_map_editor_{nanos}_{name}"))
}

fn classified_store() -> (TileInfoStore, TerrainRegistry, AnimatedTileSet) {
    let mut terrains = TerrainRegistry::new();
    terrains.add("grass");
    terrains.add("water");
    let mut store = TileInfoStore::new(5, 3);
    {
        let t = store.get_mut(4, 2).unwrap();
        t.name = "shore".into();
        t.terrain = 0b11;
        t.layer = 1;
    }
    store.get_mut(0, 1).unwrap().terrain = 0b10;
    let mut animations = AnimatedTileSet::new();
    animations.push(
        AnimatedTile::with_frames(
            "waves",
            vec![TileCoord::new(4, 2), TileCoord::new(3, 2), TileCoord::new(2, 2)],
            true,
        )
        .unwrap(),
    );
    animations.push(AnimatedTile::new("still", TileCoord::new(1, 1)));
    (store, terrains, animations)
}

#[test]
fn tile_info_survives_disk_round_trip() {
    let path = temp_file("tile-info.json");
    let (store, terrains, animations) = classified_store();

    tile_info_json::save_tile_info(&path, &store, &terrains, &animations).expect("save");
    let doc = tile_info_json::load_tile_info(&path).expect("load");

    assert_eq!(doc.store, store);
    assert_eq!(doc.terrains, terrains);
    assert_eq!(doc.animations, animations);
    let _ = fs::remove_file(&path);
}

#[test]
fn saved_tile_info_uses_kebab_case_keys() {
    let (store, terrains, animations) = classified_store();
    let txt = tile_info_json::encode_tile_info(&store, &terrains, &animations).unwrap();
    let value: serde_json::Value = serde_json::from_str(&txt).unwrap();

    assert_eq!(value["tiles-x"], 5);
    assert_eq!(value["tiles-y"], 3);
    assert_eq!(value["terrains"][1]["name"], "water");
    assert_eq!(value["tiles"].as_array().unwrap().len(), 15);
    assert_eq!(value["tile-animations"][0]["play-back-and-forth"], true);
    assert_eq!(value["tile-animations"][0]["animation-frames"][1]["tile-x"], 3);
}

#[test]
fn map_survives_disk_round_trip() {
    let path = temp_file("map.json");
    let (store, ..) = classified_store();
    let mut map = MapModel::new(4, 3);
    map.paint_tile(&store, TileCoord::new(4, 2), 2, 1).unwrap();
    map.paint_tile(&store, TileCoord::new(0, 1), 0, 0).unwrap();
    map.paint_tile(&store, TileCoord::new(3, 0), 3, 2).unwrap();

    map_json::save_map(&path, &map, &store).expect("save");
    let loaded = map_json::load_map(&path, &store).expect("load");

    assert_eq!((loaded.cols(), loaded.rows()), (4, 3));
    let painted: Vec<_> = loaded
        .cells()
        .filter(|(_, _, _, c)| c.tile.is_some())
        .map(|(layer, x, y, c)| (layer, x, y, c.pixmap))
        .collect();
    assert_eq!(
        painted,
        [
            (0, 0, 0, Some(Pixmap::Tile(TileCoord::new(0, 1)))),
            (0, 3, 2, Some(Pixmap::Tile(TileCoord::new(3, 0)))),
            (1, 2, 1, Some(Pixmap::Tile(TileCoord::new(4, 2)))),
        ]
    );
    for ((_, _, _, a), (_, _, _, b)) in loaded.cells().zip(map.cells()) {
        assert_eq!(a, b);
    }
    let _ = fs::remove_file(&path);
}

#[test]
fn saved_map_marks_empty_cells() {
    let store = TileInfoStore::new(2, 2);
    let map = MapModel::new(2, 1);
    let txt = map_json::encode_map(&map, &store).unwrap();
    let value: serde_json::Value = serde_json::from_str(&txt).unwrap();

    assert_eq!(value["map-size-x"], 2);
    let layers = value["layers"].as_array().unwrap();
    assert_eq!(layers.len(), 4);
    assert_eq!(layers[3][1]["x"], 1);
    assert_eq!(layers[3][1]["tile-set-x"], -1);
    assert_eq!(layers[0][0]["tile-set-y"], -1);
}

#[test]
fn missing_files_are_io_errors() {
    let path = temp_file("does-not-exist.json");
    assert!(tile_info_json::load_tile_info(&path).is_err());
    assert!(map_json::load_map(&path, &TileInfoStore::new(1, 1)).is_err());
}
