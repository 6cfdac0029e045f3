use crate::state::Grid;

/// Central-difference divergence `∂vx/∂x + ∂vy/∂y` at every interior cell.
/// Boundary cells are left at zero.
pub fn divergence(vx: &[f64], vy: &[f64], grid: &Grid, h: f64) -> Vec<f64> {
    let mut div = vec![0.0; grid.size];
    for j in 1..=grid.n {
        for i in 1..=grid.n {
            div[grid.idx(i, j)] = 0.5
                * (vx[grid.idx(i + 1, j)] - vx[grid.idx(i - 1, j)] + vy[grid.idx(i, j + 1)] - vy[grid.idx(i, j - 1)])
                / h;
        }
    }
    div
}

/// Largest absolute interior divergence.
pub fn max_divergence(vx: &[f64], vy: &[f64], grid: &Grid, h: f64) -> f64 {
    divergence(vx, vy, grid, h).iter().map(|d| d.abs()).fold(0.0, f64::max)
}

/// Total of a scalar field over interior cells.
pub fn total_mass(field: &[f64], grid: &Grid) -> f64 {
    grid.interior_sum(field)
}

/// Volume-averaged kinetic energy: KE = 0.5 * <vx² + vy²>.
pub fn kinetic_energy(vx: &[f64], vy: &[f64], grid: &Grid) -> f64 {
    let mut sum = 0.0;
    for j in 1..=grid.n {
        for i in 1..=grid.n {
            let ii = grid.idx(i, j);
            sum += vx[ii] * vx[ii] + vy[ii] * vy[ii];
        }
    }
    0.5 * sum / (grid.n * grid.n) as f64
}
