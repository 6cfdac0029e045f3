use serde::Deserialize;

use crate::state::Grid;

/// Footprint of a source around its centre.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    /// Chebyshev ball: `max(|dx|, |dy|) <= r`.
    Square,
    /// Euclidean ball: `dx² + dy² <= r²`.
    Circle,
    /// Manhattan ball: `|dx| + |dy| <= r`.
    Diamond,
}

impl Shape {
    /// Whether the offset `(dx, dy)` from the centre lies inside the shape.
    pub fn contains(self, dx: f64, dy: f64, radius: f64) -> bool {
        match self {
            Shape::Square => dx.abs().max(dy.abs()) <= radius,
            Shape::Circle => dx * dx + dy * dy <= radius * radius,
            Shape::Diamond => dx.abs() + dy.abs() <= radius,
        }
    }

    /// Linear indices of interior cells whose physical centre lies inside the
    /// shape centred at `(cx, cy)`. Empty for a non-positive radius.
    pub fn covered_cells(self, grid: &Grid, length_scale: f64, cx: f64, cy: f64, radius: f64) -> Vec<usize> {
        let mut cells = Vec::new();
        if !(radius > 0.0) {
            return cells;
        }
        let h = grid.cell_size(length_scale);
        // Only scan the bounding box of the shape, clipped to the interior.
        let lo = |c: f64| (((c - radius) / h + 0.5).floor().max(1.0)) as usize;
        let hi = |c: f64| (((c + radius) / h + 0.5).ceil().min(grid.n as f64)) as usize;
        let (i_lo, i_hi) = (lo(cx), hi(cx));
        let (j_lo, j_hi) = (lo(cy), hi(cy));
        for j in j_lo..=j_hi {
            for i in i_lo..=i_hi {
                let (x, y) = grid.cell_center(i, j, length_scale);
                if self.contains(x - cx, y - cy, radius) {
                    cells.push(grid.idx(i, j));
                }
            }
        }
        cells
    }
}
