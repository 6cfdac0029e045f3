//! Source Manager: geometric emitters that stage gas, wind, heat and energy
//! into a [`Simulation`]'s source buffers each tick.

mod shape;

pub use shape::Shape;

use serde::Deserialize;

use crate::error::{SimError, SimResult};
use crate::solver::Simulation;
use crate::state::{Channel, Grid};

/// Law converting an energy source's flux into a temperature rate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnergyTransfer {
    /// `flux * (T_ref - T)`
    #[default]
    Linear,
    /// `flux * (T_ref⁴ - T⁴) / (4 T_ref³)`; matches `Linear` near `T_ref`.
    Radiative,
}

impl EnergyTransfer {
    /// Temperature rate for a cell at absolute temperature `local`.
    pub fn rate(self, flux: f64, reference: f64, local: f64) -> f64 {
        match self {
            EnergyTransfer::Radiative if reference > 0.0 => {
                flux * (reference.powi(4) - local.powi(4)) / (4.0 * reference.powi(3))
            }
            _ => flux * (reference - local),
        }
    }
}

/// What a source emits. Temperatures are absolute, in kelvin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Emission {
    Gas { flow_rate: f64, temperature: f64 },
    /// `angle` in radians from +x, counter-clockwise.
    Wind { speed: f64, angle: f64 },
    Heat { temperature: f64 },
    Energy { flux: f64, reference_temperature: f64 },
}

/// One emitter: shared geometry plus its emission payload.
#[derive(Clone, Debug)]
pub struct Source {
    pub shape: Shape,
    pub center: (f64, f64),
    pub radius: f64,
    pub emission: Emission,
    active: bool,
    indices: Vec<usize>,
}

impl Source {
    pub fn set_active(&mut self, is_active: bool) {
        self.active = is_active;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Cells covered, computed once at creation.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }
}

/// Handle returned by the `create_*` methods.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SourceId(usize);

/// Keeps the sources placed on one simulation's grid.
pub struct SourceManager {
    grid: Grid,
    length_scale: f64,
    pub energy_transfer: EnergyTransfer,
    sources: Vec<Source>,
}

impl SourceManager {
    /// Manager for `sim`'s grid. Cell coverage is computed against the
    /// simulation's length scale at this point; changing it later makes
    /// [`SourceManager::update_sources`] fail.
    pub fn new(sim: &Simulation) -> Self {
        Self {
            grid: *sim.grid(),
            length_scale: sim.params().length_scale,
            energy_transfer: EnergyTransfer::default(),
            sources: Vec::new(),
        }
    }

    pub fn with_energy_transfer(mut self, law: EnergyTransfer) -> Self {
        self.energy_transfer = law;
        self
    }

    pub fn create_gas_source(&mut self, shape: Shape, flow_rate: f64, temperature: f64, x: f64, y: f64, radius: f64) -> SourceId {
        self.create(shape, Emission::Gas { flow_rate, temperature }, x, y, radius)
    }

    pub fn create_wind_source(&mut self, shape: Shape, angle: f64, speed: f64, x: f64, y: f64, radius: f64) -> SourceId {
        self.create(shape, Emission::Wind { speed, angle }, x, y, radius)
    }

    pub fn create_heat_source(&mut self, shape: Shape, temperature: f64, x: f64, y: f64, radius: f64) -> SourceId {
        self.create(shape, Emission::Heat { temperature }, x, y, radius)
    }

    pub fn create_energy_source(
        &mut self,
        shape: Shape,
        flux: f64,
        reference_temperature: f64,
        x: f64,
        y: f64,
        radius: f64,
    ) -> SourceId {
        self.create(shape, Emission::Energy { flux, reference_temperature }, x, y, radius)
    }

    fn create(&mut self, shape: Shape, emission: Emission, x: f64, y: f64, radius: f64) -> SourceId {
        let indices = shape.covered_cells(&self.grid, self.length_scale, x, y, radius);
        if indices.is_empty() {
            log::debug!("{:?} source at ({}, {}) r={} covers no cells", shape, x, y, radius);
        } else {
            log::debug!("{:?} {:?} source at ({}, {}) covers {} cells", shape, emission, x, y, indices.len());
        }
        self.sources.push(Source { shape, center: (x, y), radius, emission, active: true, indices });
        SourceId(self.sources.len() - 1)
    }

    /// Toggle a source. Returns `false` if `id` is unknown.
    pub fn set_active(&mut self, id: SourceId, is_active: bool) -> bool {
        match self.sources.get_mut(id.0) {
            Some(source) => {
                source.set_active(is_active);
                true
            }
            None => false,
        }
    }

    pub fn source(&self, id: SourceId) -> Option<&Source> {
        self.sources.get(id.0)
    }

    pub fn source_mut(&mut self, id: SourceId) -> Option<&mut Source> {
        self.sources.get_mut(id.0)
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Stage every active source's emission into `sim`'s source buffers.
    /// Calls without an intervening step accumulate additive emissions.
    /// Gas and heat temperatures are set-points, so a covered cell is held
    /// at the source temperature and energy sources overlapping it have no
    /// effect there.
    pub fn update_sources(&self, sim: &mut Simulation) -> SimResult<()> {
        if sim.n() != self.grid.n {
            return Err(SimError::GridMismatch { expected: self.grid.n, actual: sim.n() });
        }
        let length_scale = sim.params().length_scale;
        if length_scale != self.length_scale {
            return Err(SimError::LengthScaleMismatch { expected: self.length_scale, actual: length_scale });
        }
        let ambient = sim.params().air_temperature;

        for source in self.sources.iter().filter(|s| s.active) {
            match source.emission {
                Emission::Gas { flow_rate, temperature } => {
                    for &ii in &source.indices {
                        sim.inject_source(Channel::Density, ii, flow_rate)?;
                        sim.assign_source(Channel::Temperature, ii, temperature - ambient)?;
                    }
                }
                Emission::Wind { speed, angle } => {
                    let (sin, cos) = angle.sin_cos();
                    for &ii in &source.indices {
                        sim.inject_source(Channel::XVelocity, ii, speed * cos)?;
                        sim.inject_source(Channel::YVelocity, ii, speed * sin)?;
                    }
                }
                Emission::Heat { temperature } => {
                    for &ii in &source.indices {
                        sim.assign_source(Channel::Temperature, ii, temperature - ambient)?;
                    }
                }
                Emission::Energy { flux, reference_temperature } => {
                    for &ii in &source.indices {
                        let local = ambient + sim.temperature()[ii];
                        let rate = self.energy_transfer.rate(flux, reference_temperature, local);
                        sim.inject_source(Channel::Temperature, ii, rate)?;
                    }
                }
            }
        }
        Ok(())
    }
}
