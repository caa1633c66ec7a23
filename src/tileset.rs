use crate::error::EditorError;
use macroquad::prelude::*;
use std::path::Path;
use tracing::info;

/// Smallest tile edge the sheet can be cut into.
pub const MIN_TILE_SIZE: u32 = 8;
/// Largest tile edge the sheet can be cut into.
pub const MAX_TILE_SIZE: u32 = 1024;

const DEFAULT_SHEET_SIZE: u16 = 2000;
const DEFAULT_TILE_SIZE: u32 = 32;

/// Column/row of a tile inside the tile sheet grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    /// Column
    pub x: u32,
    /// Row
    pub y: u32,
}

impl TileCoord {
    /// Shorthand constructor.
    #[inline]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// A bitmap cut into a regular grid of `tile_w` x `tile_h` tiles.
#[derive(Debug, Clone)]
pub struct TileSet {
    image: Image,
    tile_w: u32,
    tile_h: u32,
}

impl Default for TileSet {
    /// Solid 2000x2000 sheet used when no `tile-set.png` is available.
    fn default() -> Self {
        Self {
            image: Image::gen_image_color(
                DEFAULT_SHEET_SIZE,
                DEFAULT_SHEET_SIZE,
                Color::from_rgba(40, 40, 48, 255),
            ),
            tile_w: DEFAULT_TILE_SIZE,
            tile_h: DEFAULT_TILE_SIZE,
        }
    }
}

/// Reads and decodes an image file.
///
/// Unreadable files are [`EditorError::Io`]; files that decode to nothing
/// (bad format, zero-sized) are [`EditorError::InvalidImage`].
pub fn load_image(path: &Path) -> Result<Image, EditorError> {
    let bytes = std::fs::read(path).map_err(|source| EditorError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let image = Image::from_file_with_format(&bytes, None)
        .map_err(|_| EditorError::InvalidImage(path.to_path_buf()))?;
    if image.width == 0 || image.height == 0 {
        return Err(EditorError::InvalidImage(path.to_path_buf()));
    }
    info!(path = %path.display(), width = image.width, height = image.height, "tile sheet decoded");
    Ok(image)
}

fn check_tile_size(width: u32, height: u32) -> Result<(), EditorError> {
    let ok = |v: u32| (MIN_TILE_SIZE..=MAX_TILE_SIZE).contains(&v);
    if ok(width) && ok(height) {
        Ok(())
    } else {
        Err(EditorError::InvalidTileSize { width, height })
    }
}

impl TileSet {
    /// Builds a tile set, rejecting tile sizes outside `[MIN_TILE_SIZE, MAX_TILE_SIZE]`.
    pub fn new(image: Image, tile_w: u32, tile_h: u32) -> Result<Self, EditorError> {
        check_tile_size(tile_w, tile_h)?;
        Ok(Self {
            image,
            tile_w,
            tile_h,
        })
    }

    /// The whole sheet.
    pub fn image(&self) -> &Image {
        &self.image
    }

    /// Replaces the bitmap, keeping the tile size.
    pub fn set_bitmap(&mut self, image: Image) {
        self.image = image;
    }

    /// Tile width in pixels.
    pub fn tile_width(&self) -> u32 {
        self.tile_w
    }

    /// Tile height in pixels.
    pub fn tile_height(&self) -> u32 {
        self.tile_h
    }

    /// Sets the tile width; the tile set is unchanged on error.
    pub fn set_tile_width(&mut self, width: u32) -> Result<(), EditorError> {
        check_tile_size(width, self.tile_h)?;
        self.tile_w = width;
        Ok(())
    }

    /// Sets the tile height; the tile set is unchanged on error.
    pub fn set_tile_height(&mut self, height: u32) -> Result<(), EditorError> {
        check_tile_size(self.tile_w, height)?;
        self.tile_h = height;
        Ok(())
    }

    /// Number of whole tiles per row.
    #[inline]
    pub fn tile_count_x(&self) -> u32 {
        self.image.width as u32 / self.tile_w
    }

    /// Number of whole tile rows.
    #[inline]
    pub fn tile_count_y(&self) -> u32 {
        self.image.height as u32 / self.tile_h
    }

    /// Whether `(x, y)` names a tile of this sheet.
    #[inline]
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x < self.tile_count_x() && y < self.tile_count_y()
    }

    /// Source rectangle of tile `(x, y)` inside the sheet.
    pub fn tile_rect(&self, x: u32, y: u32) -> Rect {
        Rect::new(
            (x * self.tile_w) as f32,
            (y * self.tile_h) as f32,
            self.tile_w as f32,
            self.tile_h as f32,
        )
    }

    /// Tile `(x, y)` cropped out of the sheet, `None` when out of range.
    pub fn tile_at(&self, x: u32, y: u32) -> Option<Image> {
        if !self.contains(x, y) {
            return None;
        }
        Some(self.image.sub_image(self.tile_rect(x, y)))
    }

    /// All tile coordinates in row-major order (y outer, x inner).
    pub fn coords(&self) -> impl Iterator<Item = TileCoord> {
        let (cols, rows) = (self.tile_count_x(), self.tile_count_y());
        (0..rows).flat_map(move |y| (0..cols).map(move |x| TileCoord::new(x, y)))
    }

    /// Crops every tile for which `keep(x, y)` holds, in row-major order.
    pub fn reap_tiles<F>(&self, mut keep: F) -> Vec<Image>
    where
        F: FnMut(u32, u32) -> bool,
    {
        self.coords()
            .filter(|c| keep(c.x, c.y))
            .map(|c| self.image.sub_image(self.tile_rect(c.x, c.y)))
            .collect()
    }
}
