use std::collections::BTreeMap;

use miqpbench_sim::{BackendRun, ConfigurationStatistics};
use miqpbench_types::{BenchError, ProblemDims, Result, SweepConfig};
use serde::{Deserialize, Serialize};

/// One configuration of the sweep with every backend's statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub n: usize,
    pub m: usize,
    pub p: usize,
    /// Whether every backend was timed on the same instance sequence
    pub instances_match: bool,
    pub stats: BTreeMap<String, ConfigurationStatistics>,
}

impl ReportRow {
    pub fn dims(&self) -> ProblemDims {
        ProblemDims::new(self.n, self.m, self.p)
    }
}

/// Final comparison table, rows in sweep order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// Backend names in column order
    pub backends: Vec<String>,
    pub rows: Vec<ReportRow>,
}

impl ComparisonReport {
    /// Single-backend view of the table. Empty for an unknown backend.
    pub fn rows_for(&self, backend: &str) -> Vec<(ProblemDims, &ConfigurationStatistics)> {
        self.rows
            .iter()
            .filter_map(|row| row.stats.get(backend).map(|stats| (row.dims(), stats)))
            .collect()
    }

    /// Whether every row of `backend` carries relaxation-time statistics
    pub fn has_relaxation(&self, backend: &str) -> bool {
        let rows = self.rows_for(backend);
        !rows.is_empty() && rows.iter().all(|(_, stats)| stats.relaxation_share.is_some())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Zip each configuration of `sweep` with every backend's statistics.
///
/// Purely structural: fails with `Internal` if a run is missing a
/// configuration, covers configurations the sweep does not declare, or a
/// backend name appears twice.
pub fn build(runs: &[BackendRun], sweep: &SweepConfig) -> Result<ComparisonReport> {
    let mut backends: Vec<String> = Vec::with_capacity(runs.len());
    for run in runs {
        if backends.contains(&run.backend) {
            return Err(BenchError::Internal(format!(
                "backend {} appears twice in the comparison",
                run.backend
            )));
        }
        if run.statistics.len() != sweep.len() {
            return Err(BenchError::Internal(format!(
                "backend {} has statistics for {} configurations, sweep declares {}",
                run.backend,
                run.statistics.len(),
                sweep.len()
            )));
        }
        backends.push(run.backend.clone());
    }

    let mut rows = Vec::with_capacity(sweep.len());
    for (index, dims) in sweep.dims.iter().enumerate() {
        let mut stats = BTreeMap::new();
        for run in runs {
            let config = run.statistics.get(&index).ok_or_else(|| {
                BenchError::Internal(format!(
                    "backend {} is missing configuration {}",
                    run.backend, index
                ))
            })?;
            stats.insert(run.backend.clone(), config.clone());
        }

        let mut digests = stats.values().map(|s| &s.instance_digest);
        let instances_match = match digests.next() {
            Some(first) => digests.all(|digest| digest == first),
            None => true,
        };

        rows.push(ReportRow {
            n: dims.n,
            m: dims.m,
            p: dims.p,
            instances_match,
            stats,
        });
    }

    Ok(ComparisonReport { backends, rows })
}
