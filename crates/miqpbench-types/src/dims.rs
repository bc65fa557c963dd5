use serde::{Deserialize, Serialize};

use crate::error::{BenchError, Result};

/// One point of a sweep: `n` variables, `m` base constraint rows and `p`
/// variables restricted to {0, 1}.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProblemDims {
    pub n: usize,
    pub m: usize,
    pub p: usize,
}

impl ProblemDims {
    pub fn new(n: usize, m: usize, p: usize) -> Self {
        ProblemDims { n, m, p }
    }

    /// Check the generator preconditions: `n >= 1` and `p <= n`.
    pub fn validate(&self) -> Result<()> {
        if self.n == 0 {
            return Err(BenchError::InvalidParameters(
                "number of variables n must be at least 1".to_string(),
            ));
        }
        if self.p > self.n {
            return Err(BenchError::InvalidParameters(format!(
                "restricted count p = {} exceeds variable count n = {}",
                self.p, self.n
            )));
        }
        Ok(())
    }

    /// Validate the dimensions together with a density level.
    pub fn validate_with_density(&self, density: f64) -> Result<()> {
        self.validate()?;
        validate_density(density)
    }

    /// Constraint rows after appending two bound rows per restricted variable.
    pub fn augmented_rows(&self) -> usize {
        self.m + 2 * self.p
    }
}

/// Sweep configuration: the ordered problem sizes plus everything needed to
/// replay the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Problem sizes in the order they are run and reported
    pub dims: Vec<ProblemDims>,

    /// Repetitions per configuration
    pub repeat: usize,

    /// Expected nonzero fraction of the random sparse matrices, in (0, 1]
    pub density: f64,

    /// Seed of the single random source driving the whole sweep
    pub seed: u64,
}

impl SweepConfig {
    pub fn new(dims: Vec<ProblemDims>, repeat: usize, density: f64, seed: u64) -> Result<Self> {
        let config = SweepConfig { dims, repeat, density, seed };
        config.validate()?;
        Ok(config)
    }

    /// Build a sweep from parallel `n`, `m`, `p` sequences.
    pub fn from_vectors(
        n: &[usize],
        m: &[usize],
        p: &[usize],
        repeat: usize,
        density: f64,
        seed: u64,
    ) -> Result<Self> {
        if n.len() != m.len() || n.len() != p.len() {
            return Err(BenchError::InvalidParameters(format!(
                "n, m and p must have equal length, got {}, {} and {}",
                n.len(),
                m.len(),
                p.len()
            )));
        }

        let dims = n
            .iter()
            .zip(m)
            .zip(p)
            .map(|((&n, &m), &p)| ProblemDims::new(n, m, p))
            .collect();

        Self::new(dims, repeat, density, seed)
    }

    pub fn validate(&self) -> Result<()> {
        if self.dims.is_empty() {
            return Err(BenchError::InvalidParameters(
                "sweep must contain at least one configuration".to_string(),
            ));
        }
        if self.repeat == 0 {
            return Err(BenchError::InvalidParameters(
                "repeat must be at least 1".to_string(),
            ));
        }
        validate_density(self.density)?;
        for dims in &self.dims {
            dims.validate()?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.dims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dims.is_empty()
    }
}

/// Density must lie in (0, 1]; NaN is rejected.
pub(crate) fn validate_density(density: f64) -> Result<()> {
    if density > 0.0 && density <= 1.0 {
        Ok(())
    } else {
        Err(BenchError::InvalidParameters(format!(
            "density must lie in (0, 1], got {}",
            density
        )))
    }
}
