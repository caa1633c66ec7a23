use crate::tileset::TileCoord;

/// Number of parallel map layers; layer 0 is the opaque ground.
pub const MAP_LAYERS: usize = 4;

/// Name every record starts with.
pub const UNASSIGNED: &str = "unassigned";

/// Index of a record inside a [`TileInfoStore`] (row-major).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileHandle(pub u32);

/// Metadata attached to one cell of the tile sheet grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileInfo {
    /// Display name; `unassigned` until edited.
    pub name: String,
    /// Bit `k` means "belongs to terrain `k`" of the registry.
    pub terrain: u32,
    /// Map layer tiles of this kind are painted on.
    pub layer: usize,
    /// Sheet column.
    pub x: u32,
    /// Sheet row.
    pub y: u32,
}

impl TileInfo {
    fn fresh(x: u32, y: u32) -> Self {
        Self {
            name: UNASSIGNED.to_owned(),
            terrain: 0,
            layer: 0,
            x,
            y,
        }
    }

    /// Grid position of the tile this record describes.
    #[inline]
    pub fn coord(&self) -> TileCoord {
        TileCoord::new(self.x, self.y)
    }
}

/// One [`TileInfo`] per tile of the sheet, stored row-major.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TileInfoStore {
    cols: u32,
    rows: u32,
    records: Vec<TileInfo>,
}

impl TileInfoStore {
    /// A store already reset to `cols` x `rows`.
    pub fn new(cols: u32, rows: u32) -> Self {
        let mut store = Self::default();
        store.reset(cols, rows);
        store
    }

    /// Drops every record and rebuilds a fresh `cols` x `rows` grid.
    pub fn reset(&mut self, cols: u32, rows: u32) {
        self.cols = cols;
        self.rows = rows;
        self.records = (0..rows)
            .flat_map(|y| (0..cols).map(move |x| TileInfo::fresh(x, y)))
            .collect();
    }

    /// Records per row.
    pub fn cols(&self) -> u32 {
        self.cols
    }

    /// Number of rows.
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Total number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True for a store reset to an empty grid.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Handle of the record at `(x, y)`, if in range.
    #[inline]
    pub fn handle(&self, x: u32, y: u32) -> Option<TileHandle> {
        (x < self.cols && y < self.rows).then(|| TileHandle(y * self.cols + x))
    }

    /// Record at `(x, y)`, if in range.
    pub fn get(&self, x: u32, y: u32) -> Option<&TileInfo> {
        self.handle(x, y).map(|h| &self.records[h.0 as usize])
    }

    /// Mutable record at `(x, y)`, if in range.
    pub fn get_mut(&mut self, x: u32, y: u32) -> Option<&mut TileInfo> {
        let h = self.handle(x, y)?;
        Some(&mut self.records[h.0 as usize])
    }

    /// Record at `(x, y)`.
    ///
    /// # Panics
    /// When `(x, y)` lies outside the grid.
    pub fn at(&self, x: u32, y: u32) -> &TileInfo {
        match self.get(x, y) {
            Some(info) => info,
            None => panic!(
                "tile info ({x}, {y}) out of bounds for {}x{} store",
                self.cols, self.rows
            ),
        }
    }

    /// Record behind a handle; `None` for handles from an older grid.
    pub fn resolve(&self, handle: TileHandle) -> Option<&TileInfo> {
        self.records.get(handle.0 as usize)
    }

    /// Row-major iteration.
    pub fn iter(&self) -> impl Iterator<Item = &TileInfo> {
        self.records.iter()
    }

    /// Row-major mutable iteration.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut TileInfo> {
        self.records.iter_mut()
    }

    /// Visits every record in row-major order.
    pub fn for_each<F: FnMut(&TileInfo)>(&self, visitor: F) {
        self.records.iter().for_each(visitor);
    }
}
