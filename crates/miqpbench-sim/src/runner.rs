use std::collections::BTreeMap;

use miqpbench_solver::{BackendSettings, SolverBackend};
use miqpbench_types::{Result, SweepConfig};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::generator::generate;
use crate::stats::{aggregate, ConfigurationStatistics, RawSample};

/// Statistics of one backend over a whole sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendRun {
    pub backend: String,
    /// Keyed by configuration index in sweep order
    pub statistics: BTreeMap<usize, ConfigurationStatistics>,
}

/// Experiment runner
///
/// Drives one backend over every configuration of a sweep, one blocking
/// solve at a time.
#[derive(Debug, Default)]
pub struct ExperimentRunner;

impl ExperimentRunner {
    pub fn new() -> Self {
        ExperimentRunner
    }

    /// Run the whole sweep against `backend`.
    ///
    /// A single generator seeded from `sweep.seed` is advanced across every
    /// configuration and repetition. Any backend error aborts the run.
    pub fn run(
        &self,
        sweep: &SweepConfig,
        backend: &dyn SolverBackend,
        settings: &BackendSettings,
    ) -> Result<BTreeMap<usize, ConfigurationStatistics>> {
        sweep.validate()?;
        backend.check_settings(settings)?;

        tracing::info!(
            backend = backend.name(),
            configurations = sweep.len(),
            repeat = sweep.repeat,
            density = sweep.density,
            seed = sweep.seed,
            "starting sweep"
        );

        let mut rng = ChaCha8Rng::seed_from_u64(sweep.seed);
        let mut statistics = BTreeMap::new();

        for (index, dims) in sweep.dims.iter().enumerate() {
            tracing::info!(
                backend = backend.name(),
                config = index,
                n = dims.n,
                m = dims.m,
                p = dims.p,
                "configuration started"
            );

            let mut samples = Vec::with_capacity(sweep.repeat);
            for rep in 0..sweep.repeat {
                let instance = generate(dims.n, dims.m, dims.p, sweep.density, &mut rng)?;
                let fingerprint = instance.fingerprint();

                let result = backend.solve(&instance, settings)?;
                let sample = RawSample::from_result(&result, fingerprint);

                tracing::debug!(
                    backend = backend.name(),
                    config = index,
                    rep,
                    instance = &sample.fingerprint[..12],
                    status = %sample.status,
                    elapsed_ms = sample.solve_time_ms,
                    "repetition finished"
                );
                if !sample.status.is_optimal() {
                    tracing::warn!(
                        backend = backend.name(),
                        config = index,
                        rep,
                        status = %sample.status,
                        "non-optimal termination"
                    );
                }

                samples.push(sample);
            }

            let stats = aggregate(&samples)?;
            tracing::info!(
                backend = backend.name(),
                config = index,
                t_min_ms = stats.solve_time.min,
                t_max_ms = stats.solve_time.max,
                t_avg_ms = stats.solve_time.mean,
                non_optimal = stats.non_optimal(),
                "configuration finished"
            );
            statistics.insert(index, stats);
        }

        Ok(statistics)
    }
}

/// Run the same sweep against each backend in turn.
///
/// Every backend's settings are checked before the first solve, so a bad
/// entry late in the list fails before any time is spent solving.
pub fn run_comparison(
    sweep: &SweepConfig,
    backends: &[(Box<dyn SolverBackend>, BackendSettings)],
) -> Result<Vec<BackendRun>> {
    sweep.validate()?;
    for (backend, settings) in backends {
        backend.check_settings(settings)?;
    }

    let runner = ExperimentRunner::new();
    backends
        .iter()
        .map(|(backend, settings)| {
            Ok(BackendRun {
                backend: backend.name().to_string(),
                statistics: runner.run(sweep, backend.as_ref(), settings)?,
            })
        })
        .collect()
}
