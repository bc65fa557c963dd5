use std::collections::BTreeSet;

use sha2::{Digest, Sha256};
use sprs::CsMat;

use crate::dims::ProblemDims;
use crate::error::{BenchError, Result};
use crate::hashing::HashRef;

/// Random mixed-integer QP instance in standard form:
/// minimize 0.5 * x^T P x + q^T x
/// subject to l <= A x <= u, x_i in {0, 1} for i in `restricted`
///
/// `A` stacks the `m` base rows on top of two bound rows per restricted
/// variable. For the k-th restricted index `i`, row `m + 2k` encodes
/// `0 <= x_i` and row `m + 2k + 1` encodes `x_i <= 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProblemInstance {
    p: CsMat<f64>,
    q: Vec<f64>,
    a: CsMat<f64>,
    l: Vec<f64>,
    u: Vec<f64>,
    restricted: Vec<usize>,
    base_rows: usize,
}

impl ProblemInstance {
    /// Assemble an instance, checking that every part agrees on the
    /// dimensions and that the bound-row layout is intact.
    pub fn new(
        p: CsMat<f64>,
        q: Vec<f64>,
        a: CsMat<f64>,
        l: Vec<f64>,
        u: Vec<f64>,
        restricted: Vec<usize>,
        base_rows: usize,
    ) -> Result<Self> {
        let instance = ProblemInstance { p, q, a, l, u, restricted, base_rows };
        instance.validate()?;
        Ok(instance)
    }

    fn validate(&self) -> Result<()> {
        let n = self.num_vars();
        let rows = self.num_constraints();

        if n == 0 {
            return Err(BenchError::InvalidParameters("instance has no variables".to_string()));
        }

        if self.p.rows() != n || self.p.cols() != n {
            return Err(BenchError::InvalidParameters(format!(
                "P must be {}x{}, got {}x{}",
                n,
                n,
                self.p.rows(),
                self.p.cols()
            )));
        }

        if self.a.rows() != rows || self.a.cols() != n {
            return Err(BenchError::InvalidParameters(format!(
                "A must be {}x{}, got {}x{}",
                rows,
                n,
                self.a.rows(),
                self.a.cols()
            )));
        }

        if !self.p.is_csc() || !self.a.is_csc() {
            return Err(BenchError::InvalidParameters(
                "P and A must be stored in CSC format".to_string(),
            ));
        }

        if self.u.len() != rows {
            return Err(BenchError::InvalidParameters(format!(
                "bound vectors differ in length: l has {}, u has {}",
                rows,
                self.u.len()
            )));
        }

        if self.base_rows + 2 * self.restricted.len() != rows {
            return Err(BenchError::InvalidParameters(format!(
                "expected {} base rows plus {} bound rows, got {} rows",
                self.base_rows,
                2 * self.restricted.len(),
                rows
            )));
        }

        let mut seen = BTreeSet::new();
        for &idx in &self.restricted {
            if idx >= n {
                return Err(BenchError::InvalidParameters(format!(
                    "restricted index {} out of range for {} variables",
                    idx, n
                )));
            }
            if !seen.insert(idx) {
                return Err(BenchError::InvalidParameters(format!(
                    "restricted index {} appears twice",
                    idx
                )));
            }
        }

        Ok(())
    }

    /// Number of decision variables `n`
    pub fn num_vars(&self) -> usize {
        self.q.len()
    }

    /// Total constraint rows, bound rows included
    pub fn num_constraints(&self) -> usize {
        self.l.len()
    }

    /// Constraint rows before bound augmentation (`m`)
    pub fn num_base_constraints(&self) -> usize {
        self.base_rows
    }

    /// Number of restricted variables `p`
    pub fn num_restricted(&self) -> usize {
        self.restricted.len()
    }

    pub fn dims(&self) -> ProblemDims {
        ProblemDims::new(self.num_vars(), self.base_rows, self.num_restricted())
    }

    /// Symmetric PSD cost matrix `P` (full storage, CSC)
    pub fn cost_matrix(&self) -> &CsMat<f64> {
        &self.p
    }

    pub fn cost_vector(&self) -> &[f64] {
        &self.q
    }

    /// Augmented constraint matrix `A` (CSC)
    pub fn constraint_matrix(&self) -> &CsMat<f64> {
        &self.a
    }

    pub fn lower_bounds(&self) -> &[f64] {
        &self.l
    }

    pub fn upper_bounds(&self) -> &[f64] {
        &self.u
    }

    /// Indices of the variables restricted to {0, 1}, in draw order
    pub fn restricted_indices(&self) -> &[usize] {
        &self.restricted
    }

    /// Rows `(lower, upper)` holding the bounds of the k-th restricted variable.
    pub fn bound_rows(&self, k: usize) -> (usize, usize) {
        let lower = self.base_rows + 2 * k;
        (lower, lower + 1)
    }

    /// Objective value `0.5 x^T P x + q^T x` at `x`.
    pub fn objective(&self, x: &[f64]) -> f64 {
        let mut quad = 0.0;
        for (col, col_view) in self.p.outer_iterator().enumerate() {
            for (row, &val) in col_view.iter() {
                quad += x[row] * val * x[col];
            }
        }
        0.5 * quad + self.q.iter().zip(x).map(|(qi, xi)| qi * xi).sum::<f64>()
    }

    /// Hex SHA-256 over a canonical encoding of the instance.
    ///
    /// Floats are hashed by their IEEE bit pattern, so two instances share a
    /// fingerprint exactly when they are bitwise identical.
    pub fn fingerprint(&self) -> HashRef {
        let mut hasher = Sha256::new();

        put_usize(&mut hasher, self.num_vars());
        put_usize(&mut hasher, self.base_rows);
        put_usize(&mut hasher, self.num_restricted());

        for mat in [&self.p, &self.a] {
            put_usize(&mut hasher, mat.rows());
            put_usize(&mut hasher, mat.cols());
            for (outer, view) in mat.outer_iterator().enumerate() {
                for (inner, &val) in view.iter() {
                    put_usize(&mut hasher, outer);
                    put_usize(&mut hasher, inner);
                    hasher.update(val.to_bits().to_le_bytes());
                }
            }
        }

        for vec in [&self.q, &self.l, &self.u] {
            for &v in vec.iter() {
                hasher.update(v.to_bits().to_le_bytes());
            }
        }

        for &idx in &self.restricted {
            put_usize(&mut hasher, idx);
        }

        hex::encode(hasher.finalize())
    }
}

fn put_usize(hasher: &mut Sha256, v: usize) {
    hasher.update((v as u64).to_le_bytes());
}
