use std::process::ExitCode;

use fumarium::config;
use fumarium::diagnostics::{kinetic_energy, max_divergence, total_mass};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cfg = config::load();
    let (mut sim, sources) = match cfg.build() {
        Ok(built) => built,
        Err(e) => {
            log::error!("invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    log::info!(
        "N={} dt={} steps={} sources={} (L={}, {} relaxation iterations)",
        sim.n(),
        cfg.run.dt,
        cfg.run.steps,
        sources.len(),
        sim.params().length_scale,
        sim.params().relaxation_iterations
    );

    let log_every = cfg.run.log_every.max(1);
    for step in 1..=cfg.run.steps {
        if let Err(e) = sources.update_sources(&mut sim) {
            log::error!("source update failed: {e}");
            return ExitCode::FAILURE;
        }
        sim.step(cfg.run.dt);

        if step % log_every == 0 || step == cfg.run.steps {
            let grid = sim.grid();
            let max_t = sim.temperature().iter().cloned().fold(0.0_f64, f64::max);
            log::info!(
                "step {:>5}  mass={:.4}  KE={:.3e}  max|div|={:.3e}  max dT={:.2}",
                step,
                total_mass(sim.density(), grid),
                kinetic_energy(sim.x_velocity(), sim.y_velocity(), grid),
                max_divergence(sim.x_velocity(), sim.y_velocity(), grid, sim.cell_size()),
                max_t
            );
        }
    }
    ExitCode::SUCCESS
}
