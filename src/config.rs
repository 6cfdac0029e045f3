use serde::Deserialize;

use crate::error::ConfigError;
use crate::solver::{SimParams, Simulation};
use crate::source::{EnergyTransfer, Shape, SourceManager};

pub const CONFIG_PATH: &str = "fumarium.yaml";

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    pub physics: SimParams,
    pub run: RunConfig,
    pub sources: Vec<SourceConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Interior cells per axis.
    pub n: usize,
    pub dt: f64,
    pub steps: usize,
    /// Diagnostics are logged every this many steps.
    pub log_every: usize,
    pub energy_transfer: EnergyTransfer,
}

/// One source entry. Positions and radius are in physical units.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SourceConfig {
    Gas {
        shape: Shape,
        flow_rate: f64,
        temperature: f64,
        x: f64,
        y: f64,
        radius: f64,
        #[serde(default = "active_default")]
        active: bool,
    },
    Wind {
        shape: Shape,
        /// Degrees counter-clockwise from +x.
        angle: f64,
        speed: f64,
        x: f64,
        y: f64,
        radius: f64,
        #[serde(default = "active_default")]
        active: bool,
    },
    Heat {
        shape: Shape,
        temperature: f64,
        x: f64,
        y: f64,
        radius: f64,
        #[serde(default = "active_default")]
        active: bool,
    },
    Energy {
        shape: Shape,
        flux: f64,
        reference_temperature: f64,
        x: f64,
        y: f64,
        radius: f64,
        #[serde(default = "active_default")]
        active: bool,
    },
}

fn active_default() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        let physics = SimParams::default();
        let mid = physics.length_scale / 2.0;
        Self {
            sources: vec![SourceConfig::Gas {
                shape: Shape::Circle,
                flow_rate: 1.0,
                temperature: 400.0,
                x: mid,
                y: physics.length_scale * 0.15,
                radius: physics.length_scale * 0.08,
                active: true,
            }],
            physics,
            run: RunConfig::default(),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            n: 64,
            dt: 0.05,
            steps: 400,
            log_every: 50,
            energy_transfer: EnergyTransfer::Linear,
        }
    }
}

impl SourceConfig {
    /// Create this source in `manager`.
    pub fn place(&self, manager: &mut SourceManager) {
        let (id, active) = match *self {
            SourceConfig::Gas { shape, flow_rate, temperature, x, y, radius, active } => {
                (manager.create_gas_source(shape, flow_rate, temperature, x, y, radius), active)
            }
            SourceConfig::Wind { shape, angle, speed, x, y, radius, active } => {
                (manager.create_wind_source(shape, angle.to_radians(), speed, x, y, radius), active)
            }
            SourceConfig::Heat { shape, temperature, x, y, radius, active } => {
                (manager.create_heat_source(shape, temperature, x, y, radius), active)
            }
            SourceConfig::Energy { shape, flux, reference_temperature, x, y, radius, active } => {
                (manager.create_energy_source(shape, flux, reference_temperature, x, y, radius), active)
            }
        };
        manager.set_active(id, active);
    }
}

impl Config {
    /// Build the simulation and its populated source manager.
    pub fn build(&self) -> Result<(Simulation, SourceManager), crate::error::SimError> {
        let sim = Simulation::with_params(self.run.n, self.physics.clone())?;
        let mut manager = SourceManager::new(&sim).with_energy_transfer(self.run.energy_transfer);
        for source in &self.sources {
            source.place(&mut manager);
        }
        Ok((sim, manager))
    }
}

pub fn load_from(path: &std::path::Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

pub fn load() -> Config {
    let path = std::path::Path::new(CONFIG_PATH);
    if !path.exists() {
        return Config::default();
    }
    match load_from(path) {
        Ok(cfg) => cfg,
        Err(e) => {
            log::warn!("{e}; using defaults");
            Config::default()
        }
    }
}
