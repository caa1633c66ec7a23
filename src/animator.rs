use crate::animated_tile::AnimatedTileSet;
use crate::map::{MapModel, Pixmap};
use crate::tile_info::TileInfoStore;
use crate::tileset::TileCoord;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Period of one tile animation frame.
pub const TILE_ANIMATION_PERIOD: Duration = Duration::from_millis(100);

/// Map position of one cell: `(layer, x, y)`.
pub type CellPos = (usize, u32, u32);

/// Drives every [`AnimatedTile`](crate::AnimatedTile) over the map.
///
/// Keeps an index from sheet tile to the map cells holding it; the index is
/// rebuilt whenever the map revision moves.
#[derive(Debug, Default)]
pub struct TileAnimator {
    cells_by_tile: HashMap<TileCoord, Vec<CellPos>>,
    indexed_revision: Option<u64>,
}

impl TileAnimator {
    /// Scheduler with an empty index; the first tick scans the map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Walks every map cell once and records which sheet tile it holds.
    pub fn rescan(&mut self, store: &TileInfoStore, map: &MapModel) {
        self.cells_by_tile.clear();
        for (layer, x, y, cell) in map.cells() {
            let Some(info) = cell.tile.and_then(|h| store.resolve(h)) else {
                continue;
            };
            self.cells_by_tile
                .entry(info.coord())
                .or_default()
                .push((layer, x, y));
        }
        self.indexed_revision = Some(map.revision());
        debug!(tiles = self.cells_by_tile.len(), "animation index rebuilt");
    }

    /// Cells currently driven by `anchor`.
    pub fn cells_for(&self, anchor: TileCoord) -> &[CellPos] {
        self.cells_by_tile
            .get(&anchor)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// One animation step: stamp each sequence's current frame onto the
    /// cells holding its anchor, then advance the sequence. Returns the
    /// number of cells stamped.
    pub fn tick(
        &mut self,
        animations: &mut AnimatedTileSet,
        store: &TileInfoStore,
        map: &mut MapModel,
    ) -> usize {
        if self.indexed_revision != Some(map.revision()) {
            self.rescan(store, map);
        }
        let mut stamped = 0;
        for anim in animations.iter_mut() {
            let frame = Pixmap::Tile(anim.current());
            for &(layer, x, y) in self.cells_for(anim.anchor()) {
                map.stamp(layer, x, y, frame);
                stamped += 1;
            }
            anim.advance();
        }
        stamped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animated_tile::AnimatedTile;

    fn setup() -> (AnimatedTileSet, TileInfoStore, MapModel) {
        let store = TileInfoStore::new(4, 1);
        let mut map = MapModel::new(3, 3);
        map.paint_tile(&store, TileCoord::new(0, 0), 1, 1).unwrap();
        map.paint_tile(&store, TileCoord::new(0, 0), 2, 0).unwrap();
        map.paint_tile(&store, TileCoord::new(3, 0), 0, 0).unwrap();
        let frames = vec![TileCoord::new(0, 0), TileCoord::new(1, 0), TileCoord::new(2, 0)];
        let mut anims = AnimatedTileSet::new();
        anims.push(AnimatedTile::with_frames("water", frames, false).unwrap());
        (anims, store, map)
    }

    #[test]
    fn stamps_only_anchor_cells() {
        let (mut anims, store, mut map) = setup();
        let mut animator = TileAnimator::new();
        assert_eq!(animator.tick(&mut anims, &store, &mut map), 2);
        assert_eq!(animator.tick(&mut anims, &store, &mut map), 2);
        assert_eq!(map.cell(0, 1, 1).unwrap().pixmap, Some(Pixmap::Tile(TileCoord::new(1, 0))));
        assert_eq!(map.cell(0, 2, 0).unwrap().pixmap, Some(Pixmap::Tile(TileCoord::new(1, 0))));
        assert_eq!(map.cell(0, 0, 0).unwrap().pixmap, Some(Pixmap::Tile(TileCoord::new(3, 0))));
        // The cell keeps its record; only the picture changes.
        assert_eq!(map.cell(0, 1, 1).unwrap().tile, store.handle(0, 0));
    }

    #[test]
    fn map_changes_trigger_rescan() {
        let (mut anims, store, mut map) = setup();
        let mut animator = TileAnimator::new();
        animator.tick(&mut anims, &store, &mut map);
        map.paint_tile(&store, TileCoord::new(0, 0), 0, 2).unwrap();
        assert_eq!(animator.tick(&mut anims, &store, &mut map), 3);
        map.erase_overlays(0, 2).unwrap();
        map.clear(3, 3);
        assert_eq!(animator.tick(&mut anims, &store, &mut map), 0);
    }

    #[test]
    fn frame_index_stays_in_range() {
        let (mut anims, store, mut map) = setup();
        anims.get_mut(0).unwrap().ping_pong = true;
        let mut animator = TileAnimator::new();
        for _ in 0..50 {
            animator.tick(&mut anims, &store, &mut map);
            let a = anims.get(0).unwrap();
            assert!(a.frame_index() < a.frames().len());
        }
    }
}
