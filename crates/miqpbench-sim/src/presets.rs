use miqpbench_types::{BenchError, ProblemDims, Result, SweepConfig};
use serde::{Deserialize, Serialize};

/// Repetitions per configuration
pub const DEFAULT_REPEAT: usize = 10;

/// Nonzero fraction of the random factor of `P` and of `A`
pub const DEFAULT_DENSITY: f64 = 0.6;

pub const DEFAULT_SEED: u64 = 0;

/// Built-in sweeps over (n, m, p)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProblemSet {
    /// Mixed shapes, up to 150 variables and 300 constraints
    #[default]
    Mixed,
    /// Small, fully binary problems with `m = 5n`
    SmallBinary,
}

impl ProblemSet {
    /// Look up a preset by its numeric id (1 or 2)
    pub fn from_id(id: u8) -> Result<Self> {
        match id {
            1 => Ok(ProblemSet::Mixed),
            2 => Ok(ProblemSet::SmallBinary),
            other => Err(BenchError::Config(format!(
                "unknown problem set {}, expected 1 or 2",
                other
            ))),
        }
    }

    pub fn id(&self) -> u8 {
        match self {
            ProblemSet::Mixed => 1,
            ProblemSet::SmallBinary => 2,
        }
    }

    /// Configurations in sweep order
    pub fn dims(&self) -> Vec<ProblemDims> {
        match self {
            ProblemSet::Mixed => {
                let n = [10, 10, 50, 50, 100, 100, 150, 150];
                let m = [5, 100, 25, 200, 50, 200, 100, 300];
                let p = [2, 2, 5, 10, 2, 15, 5, 20];
                (0..n.len())
                    .map(|i| ProblemDims::new(n[i], m[i], p[i]))
                    .collect()
            }
            ProblemSet::SmallBinary => [2, 4, 8, 12, 20, 25, 30, 35]
                .iter()
                .map(|&n| ProblemDims::new(n, 5 * n, n))
                .collect(),
        }
    }

    /// Full sweep with the default repeat count, density and seed
    pub fn sweep(&self) -> SweepConfig {
        SweepConfig {
            dims: self.dims(),
            repeat: DEFAULT_REPEAT,
            density: DEFAULT_DENSITY,
            seed: DEFAULT_SEED,
        }
    }
}
