//! Two-substance (air + injected gas) mixture model.
//!
//! The density channel is read as a gas volume fraction (clamped to `[0, 1]`)
//! and the temperature channel as the excess over ambient air. From these the
//! model derives a local mixture density and temperature, which drive
//! buoyancy and, with `advanced_coefficients`, spatially varying transport
//! coefficients.

use crate::state::{Fields, Grid};
use super::params::SimParams;

/// Absolute temperatures below this are treated as this, in kelvin.
const MIN_TEMPERATURE: f64 = 1.0;

#[inline]
fn gas_fraction(ii: usize, fields: &Fields) -> f64 {
    fields.density[ii].clamp(0.0, 1.0)
}

/// Mixture temperature in kelvin.
pub fn mixed_temperature(ii: usize, params: &SimParams, fields: &Fields) -> f64 {
    if !params.temperature_enabled {
        return params.air_temperature;
    }
    (params.air_temperature + fields.temperature[ii]).max(MIN_TEMPERATURE)
}

/// Mixture density if the mixture were at ambient temperature.
pub fn mixed_density_at_air_temp(ii: usize, params: &SimParams, fields: &Fields) -> f64 {
    let c = gas_fraction(ii, fields);
    params.air_density * ((1.0 - c) + c * params.mass_ratio)
}

/// Mixture density at the local temperature (ideal gas, constant pressure).
pub fn mixed_density(ii: usize, params: &SimParams, fields: &Fields) -> f64 {
    let rho = mixed_density_at_air_temp(ii, params, fields);
    rho * params.air_temperature.max(MIN_TEMPERATURE) / mixed_temperature(ii, params, fields)
}

/// Local temperature relative to ambient.
#[inline]
fn theta(ii: usize, params: &SimParams, fields: &Fields) -> f64 {
    mixed_temperature(ii, params, fields) / params.air_temperature.max(MIN_TEMPERATURE)
}

/// Air density over mixture density, guarded against an empty mixture.
#[inline]
fn density_factor(ii: usize, params: &SimParams, fields: &Fields) -> f64 {
    let rho = mixed_density(ii, params, fields);
    if rho > 0.0 {
        params.air_density / rho
    } else {
        1.0
    }
}

/// Kinematic viscosity; power-law temperature dependence when advanced.
pub fn adjusted_viscosity(ii: usize, params: &SimParams, fields: &Fields) -> f64 {
    if !params.advanced_coefficients {
        return params.viscosity;
    }
    params.viscosity * theta(ii, params, fields).powf(0.7) * density_factor(ii, params, fields)
}

pub fn adjusted_mass_diffusivity(ii: usize, params: &SimParams, fields: &Fields) -> f64 {
    if !params.advanced_coefficients {
        return params.diffusion;
    }
    params.diffusion * theta(ii, params, fields).powf(1.75)
}

pub fn adjusted_thermal_diffusivity(ii: usize, params: &SimParams, fields: &Fields) -> f64 {
    if !params.advanced_coefficients {
        return params.diffusivity_temperature;
    }
    params.diffusivity_temperature * theta(ii, params, fields).powf(0.8) * density_factor(ii, params, fields)
}

/// Which transport coefficient a diffusion pass uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diffusivity {
    Viscosity,
    Mass,
    Thermal,
}

impl Diffusivity {
    pub fn at(self, ii: usize, params: &SimParams, fields: &Fields) -> f64 {
        match self {
            Diffusivity::Viscosity => adjusted_viscosity(ii, params, fields),
            Diffusivity::Mass => adjusted_mass_diffusivity(ii, params, fields),
            Diffusivity::Thermal => adjusted_thermal_diffusivity(ii, params, fields),
        }
    }

    /// Evaluate the coefficient for every cell into `out`.
    pub fn fill(self, out: &mut [f64], params: &SimParams, fields: &Fields) {
        if !params.advanced_coefficients {
            out.fill(self.at(0, params, fields));
            return;
        }
        for (ii, d) in out.iter_mut().enumerate() {
            *d = self.at(ii, params, fields);
        }
    }
}

/// Buoyant acceleration along +y at one cell.
pub fn buoyancy(ii: usize, params: &SimParams, fields: &Fields) -> f64 {
    if params.air_density <= 0.0 {
        return 0.0;
    }
    let rho = mixed_density(ii, params, fields);
    params.gravity * params.mass_ratio * (params.air_density - rho) / params.air_density
}

/// Apply buoyancy: light or hot mixture rises, dense or cold mixture sinks.
/// `vy += dt * buoyancy(fields)` over interior cells.
pub fn apply_buoyancy(vy: &mut [f64], fields: &Fields, params: &SimParams, dt: f64, grid: &Grid) {
    for j in 1..=grid.n {
        for i in 1..=grid.n {
            let ii = grid.idx(i, j);
            vy[ii] += dt * buoyancy(ii, params, fields);
        }
    }
}
