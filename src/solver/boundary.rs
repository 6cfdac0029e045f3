use crate::state::Grid;

/// Field type for boundary condition dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Scalar,
    Vx,
    Vy,
}

/// Closed-box wall boundary conditions.
///   - `FieldType::Vx`: negated at the left/right walls, copied at top/bottom
///   - `FieldType::Vy`: negated at the top/bottom walls, copied at left/right
///   - `FieldType::Scalar`: zero-gradient (copy neighbour) on every wall
///
/// Corners take the average of their two edge neighbours.
pub fn set_bnd(field_type: FieldType, x: &mut [f64], grid: &Grid) {
    let n = grid.n;
    let sx = if field_type == FieldType::Vx { -1.0 } else { 1.0 };
    let sy = if field_type == FieldType::Vy { -1.0 } else { 1.0 };

    for k in 1..=n {
        x[grid.idx(0, k)] = sx * x[grid.idx(1, k)];
        x[grid.idx(n + 1, k)] = sx * x[grid.idx(n, k)];
        x[grid.idx(k, 0)] = sy * x[grid.idx(k, 1)];
        x[grid.idx(k, n + 1)] = sy * x[grid.idx(k, n)];
    }

    x[grid.idx(0, 0)] = 0.5 * (x[grid.idx(1, 0)] + x[grid.idx(0, 1)]);
    x[grid.idx(0, n + 1)] = 0.5 * (x[grid.idx(1, n + 1)] + x[grid.idx(0, n)]);
    x[grid.idx(n + 1, 0)] = 0.5 * (x[grid.idx(n, 0)] + x[grid.idx(n + 1, 1)]);
    x[grid.idx(n + 1, n + 1)] = 0.5 * (x[grid.idx(n, n + 1)] + x[grid.idx(n + 1, n)]);
}
