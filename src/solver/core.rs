use crate::state::Grid;
use super::boundary::{set_bnd, FieldType};

/// Relaxation coefficients for [`lin_solve`].
#[derive(Clone, Copy)]
pub enum Relaxation<'a> {
    /// Solves `x = (x0 + a * neighbours) / c` with constant `a`, `c`.
    Uniform { a: f64, c: f64 },
    /// Implicit diffusion with a per-cell diffusivity `d`:
    /// `a = scale * d[i]`, `c = 1 + 4a`, where `scale = dt / h²`.
    Diffusion { diffusivity: &'a [f64], scale: f64 },
}

/// Gauss-Seidel iterative linear solver over interior cells.
/// Boundary conditions are re-applied after every sweep.
pub fn lin_solve(field_type: FieldType, x: &mut [f64], x0: &[f64], relax: Relaxation, iter: usize, grid: &Grid) {
    let n = grid.n;
    for _ in 0..iter {
        for j in 1..=n {
            for i in 1..=n {
                let ii = grid.idx(i, j);
                let neighbors = x[grid.idx(i - 1, j)] + x[grid.idx(i + 1, j)] + x[grid.idx(i, j - 1)] + x[grid.idx(i, j + 1)];
                x[ii] = match relax {
                    Relaxation::Uniform { a, c } => (x0[ii] + a * neighbors) / c,
                    Relaxation::Diffusion { diffusivity, scale } => {
                        let a = scale * diffusivity[ii];
                        (x0[ii] + a * neighbors) / (1.0 + 4.0 * a)
                    }
                };
            }
        }
        set_bnd(field_type, x, grid);
    }
}

/// Diffusion step: solves `(1 - a∇²) x = x0` with `a = dt * d / h²` per cell.
pub fn diffuse(
    field_type: FieldType,
    x: &mut [f64],
    x0: &[f64],
    diffusivity: &[f64],
    dt: f64,
    h: f64,
    iter: usize,
    grid: &Grid,
) {
    let scale = dt / (h * h);
    x.copy_from_slice(x0);
    lin_solve(field_type, x, x0, Relaxation::Diffusion { diffusivity, scale }, iter, grid);
}

/// Semi-Lagrangian advection: traces each cell centre backwards through
/// `(vx, vy)` and bilinearly samples `d0` at the origin.
pub fn advect(
    field_type: FieldType,
    d: &mut [f64],
    d0: &[f64],
    vx: &[f64],
    vy: &[f64],
    dt: f64,
    h: f64,
    grid: &Grid,
) {
    let n = grid.n;
    let dt0 = dt / h;
    let hi = n as f64 + 0.5;

    for j in 1..=n {
        for i in 1..=n {
            let ii = grid.idx(i, j);
            let x = (i as f64 - dt0 * vx[ii]).clamp(0.5, hi);
            let y = (j as f64 - dt0 * vy[ii]).clamp(0.5, hi);

            let i0 = x.floor() as usize;
            let i1 = i0 + 1;
            let j0 = y.floor() as usize;
            let j1 = j0 + 1;
            let s1 = x - i0 as f64;
            let s0 = 1.0 - s1;
            let t1 = y - j0 as f64;
            let t0 = 1.0 - t1;

            d[ii] = s0 * (t0 * d0[grid.idx(i0, j0)] + t1 * d0[grid.idx(i0, j1)])
                + s1 * (t0 * d0[grid.idx(i1, j0)] + t1 * d0[grid.idx(i1, j1)]);
        }
    }
    set_bnd(field_type, d, grid);
}

/// Pressure projection: removes the gradient part of `(vx, vy)`.
/// `p` and `div` are scratch buffers.
pub fn project(vx: &mut [f64], vy: &mut [f64], p: &mut [f64], div: &mut [f64], h: f64, iter: usize, grid: &Grid) {
    let n = grid.n;

    for j in 1..=n {
        for i in 1..=n {
            let ii = grid.idx(i, j);
            div[ii] = -0.5
                * h
                * (vx[grid.idx(i + 1, j)] - vx[grid.idx(i - 1, j)] + vy[grid.idx(i, j + 1)] - vy[grid.idx(i, j - 1)]);
            p[ii] = 0.0;
        }
    }
    set_bnd(FieldType::Scalar, div, grid);
    set_bnd(FieldType::Scalar, p, grid);

    lin_solve(FieldType::Scalar, p, div, Relaxation::Uniform { a: 1.0, c: 4.0 }, iter, grid);

    for j in 1..=n {
        for i in 1..=n {
            let ii = grid.idx(i, j);
            vx[ii] -= 0.5 * (p[grid.idx(i + 1, j)] - p[grid.idx(i - 1, j)]) / h;
            vy[ii] -= 0.5 * (p[grid.idx(i, j + 1)] - p[grid.idx(i, j - 1)]) / h;
        }
    }
    set_bnd(FieldType::Vx, vx, grid);
    set_bnd(FieldType::Vy, vy, grid);
}

/// `x += dt * s`
pub fn add_source(x: &mut [f64], s: &[f64], dt: f64) {
    for (xi, si) in x.iter_mut().zip(s) {
        *xi += dt * si;
    }
}

/// Pin every cell with a set-point to that value.
pub fn hold(x: &mut [f64], held: &[Option<f64>]) {
    for (xi, hi) in x.iter_mut().zip(held) {
        if let Some(v) = *hi {
            *xi = v;
        }
    }
}

/// Exponential decay toward zero: `x *= exp(-rate * dt)`.
pub fn dissipate(x: &mut [f64], rate: f64, dt: f64) {
    if rate == 0.0 {
        return;
    }
    let factor = (-rate * dt).exp();
    for v in x.iter_mut() {
        *v *= factor;
    }
}
