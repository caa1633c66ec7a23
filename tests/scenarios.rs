// tests/scenarios.rs

use macroquad::prelude::*;
use macroquad_map_editor::animated_tile::AnimatedTile;
use macroquad_map_editor::scene::input::Key;
use macroquad_map_editor::scene::projectile::{Projectile, MAX_PROJECTILE_RANGE, PROJECTILE_PERIOD};
use macroquad_map_editor::terrain::remove_bit;
use macroquad_map_editor::{
    GameScene, MapModel, Pixmap, SceneEvent, TerrainRegistry, TileCoord, TileInfoStore, MAP_LAYERS,
};

#[test]
fn removing_middle_terrain_remaps_masks() {
    let mut registry = TerrainRegistry::new();
    for name in ["grass", "water", "sand"] {
        assert!(registry.add(name));
    }
    let mut store = TileInfoStore::new(2, 2);
    store.get_mut(1, 0).unwrap().terrain = 0b101;

    registry.remove("water", &mut store).expect("water is registered");

    assert_eq!(registry.names(), ["grass", "sand"]);
    assert_eq!(store.at(1, 0).terrain, 0b11);
    assert_eq!(store.at(0, 0).terrain, 0);
}

#[test]
fn terrain_bit_removal_shifts_higher_bits_only() {
    for mask in [0u32, 1, 0b1011_0110, u32::MAX, 0x8000_0001] {
        for i in 0..32 {
            let out = remove_bit(mask, i);
            for k in 0..31 {
                let expect = if k < i { (mask >> k) & 1 } else { (mask >> (k + 1)) & 1 };
                assert_eq!((out >> k) & 1, expect, "mask {mask:#x} index {i} bit {k}");
            }
        }
    }
}

#[test]
fn block_paint_wraps_on_source_row_change() {
    let store = TileInfoStore::new(4, 4);
    let mut map = MapModel::new(10, 10);
    let before = map.clone();
    let block = [TileCoord::new(2, 1), TileCoord::new(3, 1), TileCoord::new(2, 2)];

    assert_eq!(map.paint_block(&store, &block, 5, 7), 3);

    let expected = [((5, 7), (2, 1)), ((6, 7), (3, 1)), ((5, 8), (2, 2))];
    for ((x, y), (tx, ty)) in expected {
        let cell = map.cell(0, x, y).unwrap();
        assert_eq!(cell.pixmap, Some(Pixmap::Tile(TileCoord::new(tx, ty))));
        assert_eq!(cell.tile, store.handle(tx, ty));
    }
    let changed = map
        .cells()
        .zip(before.cells())
        .filter(|((_, _, _, a), (_, _, _, b))| a != b)
        .count();
    assert_eq!(changed, 3);
}

fn frame_sequence(ping_pong: bool, ticks: usize) -> Vec<usize> {
    let frames = vec![TileCoord::new(0, 0), TileCoord::new(1, 0), TileCoord::new(2, 0)];
    let mut water = AnimatedTile::with_frames("water", frames, ping_pong).unwrap();
    (0..ticks)
        .map(|_| {
            water.advance();
            water.frame_index()
        })
        .collect()
}

#[test]
fn animation_cycles_through_frames() {
    assert_eq!(frame_sequence(false, 5), [1, 2, 0, 1, 2]);
}

#[test]
fn ping_pong_animation_bounces() {
    assert_eq!(frame_sequence(true, 6), [1, 2, 1, 0, 1, 2]);
}

#[test]
fn frame_index_stays_in_range() {
    for ping_pong in [false, true] {
        let seq = frame_sequence(ping_pong, 100);
        assert!(seq.iter().all(|&i| i < 3));
    }
}

#[test]
fn forward_key_ramps_speed_to_cap() {
    let mut scene = GameScene::new(vec2(500.0, 500.0));
    scene.key(Key::Up, true);
    for tick in 1..=26 {
        scene.tick();
        let expect = (0.2 * tick as f32).min(5.0);
        assert!(
            (scene.player().speed - expect).abs() < 1e-4,
            "tick {tick}: speed {}",
            scene.player().speed
        );
    }
    assert_eq!(scene.player().speed, 5.0);
}

#[test]
fn idle_player_comes_to_rest() {
    let mut scene = GameScene::new(vec2(500.0, 500.0));
    scene.player_mut().speed = -3.7;
    scene.player_mut().rot_speed = 17;
    for _ in 0..200 {
        scene.tick();
    }
    assert_eq!(scene.player().speed, 0.0);
    assert_eq!(scene.player().rot_speed, 0);
}

#[test]
fn projectile_dies_on_step_101() {
    let mut p = Projectile::new(Vec2::ZERO, vec2(2.0, 0.0));
    for step in 1..=100 {
        assert!(!p.step(), "died early at step {step}");
    }
    assert!(p.step());
    assert!(!p.is_alive());
    assert_eq!(p.pos, vec2(202.0, 0.0));
    assert!(!p.step());
}

#[test]
fn projectile_deactivates_once_within_bound() {
    let mut scene = GameScene::new(vec2(1000.0, 1000.0));
    let id = scene.spawn_projectile(Projectile::new(Vec2::ZERO, vec2(2.0, 0.0)));
    let bound = (MAX_PROJECTILE_RANGE / 2.0).ceil() as usize + 1;

    let mut deactivated_at = Vec::new();
    for tick in 1..=bound + 20 {
        let events = scene.advance(PROJECTILE_PERIOD);
        if events.contains(&SceneEvent::ProjectileDeactivated(id)) {
            deactivated_at.push(tick);
        }
    }
    assert_eq!(deactivated_at.len(), 1);
    assert!(deactivated_at[0] <= bound);
}

#[test]
fn reset_store_indexes_by_position() {
    let mut store = TileInfoStore::new(3, 2);
    store.reset(5, 4);
    for y in 0..4 {
        for x in 0..5 {
            let t = store.at(x, y);
            assert_eq!((t.x, t.y), (x, y));
        }
    }
}

#[test]
fn cleared_ground_is_fully_painted() {
    let mut map = MapModel::new(3, 3);
    map.clear(7, 5);
    let ground: Vec<_> = map.cells().filter(|(layer, ..)| *layer == 0).collect();
    assert_eq!(ground.len(), 35);
    assert!(ground.iter().all(|(_, _, _, c)| c.pixmap.is_some()));
    assert!(map
        .cells()
        .filter(|(layer, ..)| *layer > 0)
        .all(|(_, _, _, c)| !c.is_painted()));
    assert_eq!(MAP_LAYERS, 4);
}
