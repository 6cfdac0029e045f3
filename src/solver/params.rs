use serde::Deserialize;

use crate::error::{SimError, SimResult};

/// Physical constants and solver options for the smoke simulation.
///
/// All diffusivities are assumed non-negative; the relaxation solver does not
/// guard against negative values.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimParams {
    /// Physical edge length of the interior domain.
    pub length_scale: f64,
    /// Kinematic viscosity.
    pub viscosity: f64,
    /// Mass diffusivity of the injected gas.
    pub diffusion: f64,
    /// Gravitational acceleration magnitude, acting along -y.
    pub gravity: f64,
    pub air_density: f64,
    /// Ratio of injected-gas density to air density at equal temperature.
    pub mass_ratio: f64,
    /// Ambient temperature in kelvin.
    pub air_temperature: f64,
    pub diffusivity_temperature: f64,
    pub density_decay_rate: f64,
    pub temperature_decay_rate: f64,
    pub relaxation_iterations: usize,
    /// Scale coefficients by the local mixture state.
    pub advanced_coefficients: bool,
    pub gravity_enabled: bool,
    pub temperature_enabled: bool,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            length_scale: 10.0,
            viscosity: 0.001,
            diffusion: 0.0,
            gravity: 9.81,
            air_density: 1.2,
            mass_ratio: 0.6,
            air_temperature: 300.0,
            diffusivity_temperature: 0.001,
            density_decay_rate: 0.0,
            temperature_decay_rate: 0.1,
            relaxation_iterations: 30,
            advanced_coefficients: false,
            gravity_enabled: true,
            temperature_enabled: true,
        }
    }
}

impl SimParams {
    /// Default preset with the transport constants replaced.
    pub fn new(length_scale: f64, viscosity: f64, diffusion: f64) -> Self {
        Self { length_scale, viscosity, diffusion, ..Self::default() }
    }

    pub fn with_buoyancy(mut self, gravity: f64, air_density: f64, mass_ratio: f64) -> Self {
        self.gravity = gravity;
        self.air_density = air_density;
        self.mass_ratio = mass_ratio;
        self
    }

    pub fn with_temperature(mut self, air_temperature: f64, diffusivity_temperature: f64) -> Self {
        self.air_temperature = air_temperature;
        self.diffusivity_temperature = diffusivity_temperature;
        self
    }

    pub fn with_decay(mut self, density_decay_rate: f64, temperature_decay_rate: f64) -> Self {
        self.density_decay_rate = density_decay_rate;
        self.temperature_decay_rate = temperature_decay_rate;
        self
    }

    pub fn with_iterations(mut self, relaxation_iterations: usize) -> Self {
        self.relaxation_iterations = relaxation_iterations;
        self
    }

    /// Check the construction preconditions.
    pub fn validate(&self) -> SimResult<()> {
        if !(self.length_scale > 0.0 && self.length_scale.is_finite()) {
            return Err(SimError::InvalidLengthScale(self.length_scale));
        }
        if self.relaxation_iterations < 1 {
            return Err(SimError::InvalidIterations(self.relaxation_iterations));
        }
        Ok(())
    }
}
