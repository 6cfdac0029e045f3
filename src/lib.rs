//! Grid-based 2-D smoke and hot-gas simulator.
//!
//! A [`Simulation`] advances velocity, density and temperature fields on an
//! `(N+2)²` grid with the Stable Fluids method. A [`SourceManager`] places
//! gas, wind, heat and energy emitters and stages their output into the
//! simulation once per tick:
//!
//! ```no_run
//! use fumarium::{Shape, Simulation, SourceManager};
//!
//! let mut sim = Simulation::new(64)?;
//! let mut sources = SourceManager::new(&sim);
//! sources.create_gas_source(Shape::Circle, 1.0, 400.0, 5.0, 1.5, 0.8);
//! for _ in 0..100 {
//!     sources.update_sources(&mut sim)?;
//!     sim.step(0.05);
//! }
//! let density = sim.density();
//! # Ok::<(), fumarium::SimError>(())
//! ```

pub mod config;
pub mod error;
pub mod solver;
pub mod source;
pub mod state;

pub use error::{ConfigError, SimError, SimResult};
pub use solver::{diagnostics, SimParams, Simulation};
pub use source::{EnergyTransfer, Emission, Shape, Source, SourceId, SourceManager};
pub use state::{Channel, Grid};
