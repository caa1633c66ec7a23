use crate::error::EditorError;
use crate::tile_info::{TileHandle, TileInfoStore, MAP_LAYERS};
use crate::tileset::{TileCoord, TileSet};
use macroquad::prelude::*;
use tracing::{debug, info};

/// Largest map edge, in cells.
pub const MAX_MAP_SIZE: u32 = 512;

/// What a cell shows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pixmap {
    /// View into the tile sheet.
    Tile(TileCoord),
    /// Flat colour used for the unpainted ground.
    Placeholder(Color),
}

impl Pixmap {
    /// Materialises the pixmap at tile size.
    pub fn to_image(&self, tileset: &TileSet) -> Option<Image> {
        match *self {
            Pixmap::Tile(c) => tileset.tile_at(c.x, c.y),
            Pixmap::Placeholder(color) => Some(Image::gen_image_color(
                tileset.tile_width() as u16,
                tileset.tile_height() as u16,
                color,
            )),
        }
    }
}

/// Ground colour for cell `(x, y)` of a `cols` x `rows` map.
pub fn placeholder_color(x: u32, y: u32, cols: u32, rows: u32) -> Color {
    let fx = x as f32 / cols.max(1) as f32;
    let fy = y as f32 / rows.max(1) as f32;
    Color::new(0.10, 0.25 + 0.45 * fx, 0.25 + 0.45 * fy, 1.0)
}

/// One grid position of one layer.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MapCell {
    /// Record the cell was painted from.
    pub tile: Option<TileHandle>,
    /// What is drawn.
    pub pixmap: Option<Pixmap>,
}

impl MapCell {
    /// Whether anything is drawn.
    #[inline]
    pub fn is_painted(&self) -> bool {
        self.pixmap.is_some()
    }
}

/// `MAP_LAYERS` grids of `cols` x `rows` cells sharing one size.
///
/// Layer 0 is always painted; higher layers are overlays. Every structural
/// change bumps [`revision`](MapModel::revision) so index builders such as
/// the tile animator know when to rescan.
#[derive(Debug, Clone)]
pub struct MapModel {
    cols: u32,
    rows: u32,
    layers: Vec<Vec<MapCell>>,
    revision: u64,
}

impl MapModel {
    /// A freshly cleared `cols` x `rows` map.
    pub fn new(cols: u32, rows: u32) -> Self {
        let mut map = Self {
            cols: 0,
            rows: 0,
            layers: Vec::new(),
            revision: 0,
        };
        map.clear(cols, rows);
        map
    }

    /// Columns per layer.
    pub fn cols(&self) -> u32 {
        self.cols
    }

    /// Rows per layer.
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Bumped on clear, paint, fill and erase; untouched by [`stamp`](MapModel::stamp).
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.cols && y < self.rows)
            .then(|| y as usize * self.cols as usize + x as usize)
    }

    /// Whether `(x, y)` is on the map.
    #[inline]
    pub fn contains(&self, x: u32, y: u32) -> bool {
        self.index(x, y).is_some()
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    /// Rebuilds every layer: ground gets the gradient, overlays are emptied.
    /// Each edge is clamped to `MAX_MAP_SIZE`.
    pub fn clear(&mut self, cols: u32, rows: u32) {
        let (cols, rows) = (cols.min(MAX_MAP_SIZE), rows.min(MAX_MAP_SIZE));
        self.cols = cols;
        self.rows = rows;
        let len = cols as usize * rows as usize;
        let ground: Vec<MapCell> = (0..rows)
            .flat_map(|y| (0..cols).map(move |x| (x, y)))
            .map(|(x, y)| MapCell {
                tile: None,
                pixmap: Some(Pixmap::Placeholder(placeholder_color(x, y, cols, rows))),
            })
            .collect();
        self.layers = std::iter::once(ground)
            .chain((1..MAP_LAYERS).map(|_| vec![MapCell::default(); len]))
            .collect();
        self.touch();
        info!(cols, rows, "map cleared");
    }

    /// Cell at `(x, y)` of `layer`.
    pub fn cell(&self, layer: usize, x: u32, y: u32) -> Option<&MapCell> {
        let i = self.index(x, y)?;
        self.layers.get(layer)?.get(i)
    }

    fn cell_mut(&mut self, layer: usize, x: u32, y: u32) -> Result<&mut MapCell, EditorError> {
        let i = self
            .index(x, y)
            .filter(|_| layer < self.layers.len())
            .ok_or(EditorError::OutOfBounds {
                x: x as i64,
                y: y as i64,
            })?;
        Ok(&mut self.layers[layer][i])
    }

    /// Sets tile and pixmap of one cell.
    pub fn paint_cell(
        &mut self,
        layer: usize,
        x: u32,
        y: u32,
        tile: Option<TileHandle>,
        pixmap: Pixmap,
    ) -> Result<(), EditorError> {
        let cell = self.cell_mut(layer, x, y)?;
        cell.tile = tile;
        cell.pixmap = Some(pixmap);
        self.touch();
        Ok(())
    }

    /// Paints sheet tile `coord` at `(x, y)` on the layer its record asks for.
    /// Returns that layer.
    pub fn paint_tile(
        &mut self,
        store: &TileInfoStore,
        coord: TileCoord,
        x: u32,
        y: u32,
    ) -> Result<usize, EditorError> {
        let handle = store.handle(coord.x, coord.y).ok_or(EditorError::OutOfBounds {
            x: coord.x as i64,
            y: coord.y as i64,
        })?;
        let layer = store.at(coord.x, coord.y).layer.min(MAP_LAYERS - 1);
        self.paint_cell(layer, x, y, Some(handle), Pixmap::Tile(coord))?;
        Ok(layer)
    }

    /// Empties every overlay at `(x, y)`; the ground stays.
    pub fn erase_overlays(&mut self, x: u32, y: u32) -> Result<(), EditorError> {
        for layer in 1..MAP_LAYERS {
            *self.cell_mut(layer, x, y)? = MapCell::default();
        }
        self.touch();
        debug!(x, y, "overlays erased");
        Ok(())
    }

    /// Writes the same tile into every ground cell.
    pub fn fill_ground(&mut self, tile: Option<TileHandle>, pixmap: Pixmap) {
        for cell in &mut self.layers[0] {
            cell.tile = tile;
            cell.pixmap = Some(pixmap);
        }
        self.touch();
        info!(?pixmap, "ground filled");
    }

    /// Paints a block of sheet tiles starting at `(dest_x, dest_y)`.
    ///
    /// `block` is scanned in order; each time the source row changes the
    /// destination column resets to `dest_x` and the destination row moves
    /// down by one. Cells outside the map are skipped, later tiles overwrite
    /// earlier ones. Returns the number of cells painted.
    pub fn paint_block(
        &mut self,
        store: &TileInfoStore,
        block: &[TileCoord],
        dest_x: u32,
        dest_y: u32,
    ) -> usize {
        let mut painted = 0;
        let (mut dx, mut dy) = (dest_x, dest_y);
        let mut prev_row: Option<u32> = None;
        for &src in block {
            match prev_row {
                Some(row) if row != src.y => {
                    dx = dest_x;
                    dy = dy.saturating_add(1);
                }
                Some(_) => dx = dx.saturating_add(1),
                None => {}
            }
            prev_row = Some(src.y);
            if self.contains(dx, dy) && self.paint_tile(store, src, dx, dy).is_ok() {
                painted += 1;
            }
        }
        debug!(dest_x, dest_y, tiles = block.len(), painted, "block painted");
        painted
    }

    /// Swaps a cell's pixmap without counting as a map change.
    pub(crate) fn stamp(&mut self, layer: usize, x: u32, y: u32, pixmap: Pixmap) {
        if let Ok(cell) = self.cell_mut(layer, x, y) {
            cell.pixmap = Some(pixmap);
        }
    }

    /// Every cell of every layer as `(layer, x, y, cell)`, layer by layer,
    /// each layer row-major.
    pub fn cells(&self) -> impl Iterator<Item = (usize, u32, u32, &MapCell)> {
        let cols = self.cols.max(1);
        self.layers.iter().enumerate().flat_map(move |(layer, cells)| {
            cells
                .iter()
                .enumerate()
                .map(move |(i, c)| (layer, i as u32 % cols, i as u32 / cols, c))
        })
    }
}
