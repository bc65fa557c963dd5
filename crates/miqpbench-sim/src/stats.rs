use std::collections::BTreeMap;

use miqpbench_solver::{SolveStatus, SolverResult};
use miqpbench_types::{fold_hashes, BenchError, HashRef, Result};
use serde::{Deserialize, Serialize};

/// One repetition's measurements, as handed to the aggregator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    /// Primary elapsed time (ms)
    pub solve_time_ms: f64,
    /// Inner relaxation time (ms), for backends that report it
    pub relaxation_time_ms: Option<f64>,
    pub status: SolveStatus,
    /// Fingerprint of the instance this sample was measured on
    pub fingerprint: HashRef,
}

impl RawSample {
    pub fn from_result(result: &SolverResult, fingerprint: HashRef) -> Self {
        RawSample {
            solve_time_ms: result.solve_time_ms(),
            relaxation_time_ms: result.relaxation_time_ms(),
            status: result.status.clone(),
            fingerprint,
        }
    }

    /// Relaxation time as a percentage of the primary time.
    /// A zero primary time counts as 0%.
    pub fn relaxation_share(&self) -> Option<f64> {
        self.relaxation_time_ms.map(|rx| {
            if self.solve_time_ms > 0.0 {
                100.0 * rx / self.solve_time_ms
            } else {
                0.0
            }
        })
    }
}

/// Min / max / mean of a series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl TimeStats {
    pub fn from_samples(samples: &[f64]) -> Result<Self> {
        if samples.is_empty() {
            return Err(BenchError::EmptySample);
        }

        let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
        let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = samples.iter().sum::<f64>() / samples.len() as f64;

        Ok(TimeStats { min, max, mean })
    }
}

/// Summary of all repetitions of one (configuration, backend) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationStatistics {
    pub samples: usize,
    /// Primary time (ms)
    pub solve_time: TimeStats,
    /// Relaxation time as % of primary time; present only when every
    /// sample reported a relaxation time
    pub relaxation_share: Option<TimeStats>,
    /// Repetitions per status label
    pub status_counts: BTreeMap<String, usize>,
    /// Digest of the ordered instance fingerprints
    pub instance_digest: HashRef,
}

impl ConfigurationStatistics {
    /// Repetitions that did not end in an optimal status
    pub fn non_optimal(&self) -> usize {
        let optimal = self
            .status_counts
            .get(&SolveStatus::Optimal.label())
            .copied()
            .unwrap_or(0);
        self.samples - optimal
    }
}

/// Reduce one configuration's raw samples to summary statistics.
pub fn aggregate(samples: &[RawSample]) -> Result<ConfigurationStatistics> {
    if samples.is_empty() {
        return Err(BenchError::EmptySample);
    }

    let solve_times: Vec<f64> = samples.iter().map(|s| s.solve_time_ms).collect();
    let solve_time = TimeStats::from_samples(&solve_times)?;

    // Averaging shares over a partial set would mix units
    let shares: Option<Vec<f64>> = samples.iter().map(RawSample::relaxation_share).collect();
    let relaxation_share = match shares {
        Some(shares) => Some(TimeStats::from_samples(&shares)?),
        None => None,
    };

    let mut status_counts = BTreeMap::new();
    for sample in samples {
        *status_counts.entry(sample.status.label()).or_insert(0) += 1;
    }

    Ok(ConfigurationStatistics {
        samples: samples.len(),
        solve_time,
        relaxation_share,
        status_counts,
        instance_digest: fold_hashes(samples.iter().map(|s| &s.fingerprint)),
    })
}
