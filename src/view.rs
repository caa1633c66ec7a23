use macroquad::prelude::*;

/// Extra cells drawn around the viewport.
const CULL_MARGIN_CELLS: i32 = 1;

/// Half-open block of map cells `[x0, x1) x [y0, y1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    /// First column.
    pub x0: u32,
    /// First row.
    pub y0: u32,
    /// Column past the last.
    pub x1: u32,
    /// Row past the last.
    pub y1: u32,
}

impl CellRange {
    /// Whether there are none.
    pub fn is_empty(&self) -> bool {
        self.x0 >= self.x1 || self.y0 >= self.y1
    }

    /// Cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> {
        let (x0, x1) = (self.x0, self.x1);
        (self.y0..self.y1).flat_map(move |y| (x0..x1).map(move |x| (x, y)))
    }
}

/// Cells of a `cols` x `rows` map with `cell` sized cells that intersect
/// the world-space rectangle spanned by `view_min` and `view_max`
/// (corners in any order), padded by one cell and clipped to the map.
pub fn visible_cells(
    view_min: Vec2,
    view_max: Vec2,
    cell: Vec2,
    cols: u32,
    rows: u32,
) -> CellRange {
    let cw = cell.x.max(1.0);
    let ch = cell.y.max(1.0);
    let mut cx_min = (view_min.x / cw).floor() as i32;
    let mut cy_min = (view_min.y / ch).floor() as i32;
    let mut cx_max = (view_max.x / cw).floor() as i32;
    let mut cy_max = (view_max.y / ch).floor() as i32;

    if cx_min > cx_max {
        std::mem::swap(&mut cx_min, &mut cx_max);
    }
    if cy_min > cy_max {
        std::mem::swap(&mut cy_min, &mut cy_max);
    }

    cx_min -= CULL_MARGIN_CELLS;
    cy_min -= CULL_MARGIN_CELLS;
    cx_max += CULL_MARGIN_CELLS;
    cy_max += CULL_MARGIN_CELLS;

    let clip = |v: i32, hi: u32| v.clamp(0, hi as i32) as u32;
    CellRange {
        x0: clip(cx_min, cols),
        y0: clip(cy_min, rows),
        x1: clip(cx_max + 1, cols),
        y1: clip(cy_max + 1, rows),
    }
}

/// Map cell under a world-space point, if any.
pub fn cell_at(point: Vec2, cell: Vec2, cols: u32, rows: u32) -> Option<(u32, u32)> {
    if point.x < 0.0 || point.y < 0.0 {
        return None;
    }
    let x = (point.x / cell.x.max(1.0)) as u32;
    let y = (point.y / cell.y.max(1.0)) as u32;
    (x < cols && y < rows).then_some((x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visible_cells_pads_and_clips() {
        let r = visible_cells(vec2(64.0, 64.0), vec2(127.0, 95.0), vec2(32.0, 32.0), 10, 10);
        assert_eq!(r, CellRange { x0: 1, y0: 1, x1: 5, y1: 4 });
        let all = visible_cells(vec2(-500.0, -500.0), vec2(5000.0, 5000.0), vec2(32.0, 32.0), 3, 2);
        assert_eq!(all, CellRange { x0: 0, y0: 0, x1: 3, y1: 2 });
    }

    #[test]
    fn visible_cells_accepts_swapped_corners_in_stable_order() {
        let r = visible_cells(vec2(100.0, 100.0), vec2(0.0, 0.0), vec2(32.0, 32.0), 10, 10);
        let cells: Vec<(u32, u32)> = r.iter().collect();
        assert!(cells.windows(2).all(|w| (w[0].1, w[0].0) < (w[1].1, w[1].0)));
        assert_eq!(cells.first(), Some(&(0, 0)));
    }

    #[test]
    fn view_outside_map_is_empty() {
        let r = visible_cells(vec2(1000.0, 0.0), vec2(1100.0, 50.0), vec2(32.0, 32.0), 4, 4);
        assert!(r.is_empty());
    }

    #[test]
    fn cell_at_maps_points() {
        let size = vec2(16.0, 16.0);
        assert_eq!(cell_at(vec2(17.0, 40.0), size, 4, 4), Some((1, 2)));
        assert_eq!(cell_at(vec2(-1.0, 0.0), size, 4, 4), None);
        assert_eq!(cell_at(vec2(64.0, 0.0), size, 4, 4), None);
    }
}
