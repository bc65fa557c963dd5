use std::time::{Duration, Instant};

use clarabel::algebra::CscMatrix;
use clarabel::solver::{DefaultSolver, IPSolver, SolverStatus, SupportedConeT};
use miqpbench_types::ProblemInstance;
use sprs::{CsMat, TriMat};

use crate::settings::ClarabelSettings;

/// Instance translated into Clarabel's form:
/// minimize 0.5 x^T P x + q^T x  s.t.  A x + s = b, s in K
pub(crate) struct ConicProblem {
    p: CscMatrix<f64>,
    q: Vec<f64>,
    a: CscMatrix<f64>,
    b: Vec<f64>,
    cones: Vec<SupportedConeT<f64>>,
}

/// What a single Clarabel solve produced
pub(crate) struct ConicOutcome {
    pub status: SolverStatus,
    pub x: Vec<f64>,
    pub objective: f64,
    pub iterations: u32,
    /// Wall time of solver setup plus solve
    pub elapsed: Duration,
}

impl ConicProblem {
    /// Translate `instance` using the row bounds `l`, `u` in place of the
    /// instance's own (branch-and-bound nodes pass tightened copies).
    ///
    /// Rows with `l == u` go to a zero cone; otherwise every finite side
    /// becomes one nonnegative-cone row. Rows free on both sides vanish.
    pub fn with_bounds(instance: &ProblemInstance, l: &[f64], u: &[f64]) -> Self {
        let rows = instance.num_constraints();
        let n = instance.num_vars();

        // Output rows (index, sign) fed by each input row
        let mut targets: Vec<Vec<(usize, f64)>> = vec![Vec::new(); rows];
        let mut b = Vec::with_capacity(2 * rows);

        for i in 0..rows {
            if is_equality(l[i], u[i]) {
                targets[i].push((b.len(), 1.0));
                b.push(u[i]);
            }
        }
        let num_zero = b.len();

        for i in 0..rows {
            if is_equality(l[i], u[i]) {
                continue;
            }
            // (Ax)_i >= l_i  ->  -A_i x + s = -l_i
            if l[i].is_finite() {
                targets[i].push((b.len(), -1.0));
                b.push(-l[i]);
            }
            // (Ax)_i <= u_i  ->  A_i x + s = u_i
            if u[i].is_finite() {
                targets[i].push((b.len(), 1.0));
                b.push(u[i]);
            }
        }
        let num_nonneg = b.len() - num_zero;

        let mut triplets = TriMat::new((b.len(), n));
        for (col, col_view) in instance.constraint_matrix().outer_iterator().enumerate() {
            for (row, &val) in col_view.iter() {
                for &(out, sign) in &targets[row] {
                    triplets.add_triplet(out, col, sign * val);
                }
            }
        }
        let a: CsMat<f64> = triplets.to_csc();

        let mut cones = Vec::new();
        if num_zero > 0 {
            cones.push(SupportedConeT::ZeroConeT(num_zero));
        }
        if num_nonneg > 0 {
            cones.push(SupportedConeT::NonnegativeConeT(num_nonneg));
        }

        ConicProblem {
            p: upper_triangle(instance.cost_matrix()),
            q: instance.cost_vector().to_vec(),
            a: to_clarabel(a),
            b,
            cones,
        }
    }

    /// Translate `instance` with its own bounds
    pub fn from_instance(instance: &ProblemInstance) -> Self {
        Self::with_bounds(instance, instance.lower_bounds(), instance.upper_bounds())
    }

    /// Run Clarabel. The clock covers solver setup and the solve only.
    pub fn solve(&self, settings: &ClarabelSettings) -> ConicOutcome {
        let clarabel_settings = settings.to_clarabel();

        let start = Instant::now();
        let mut solver = DefaultSolver::new(
            &self.p,
            &self.q,
            &self.a,
            &self.b,
            &self.cones,
            clarabel_settings,
        );
        solver.solve();
        let elapsed = start.elapsed();

        ConicOutcome {
            status: solver.solution.status,
            x: solver.solution.x.clone(),
            objective: solver.solution.obj_val,
            iterations: solver.info.iterations,
            elapsed,
        }
    }

    pub fn num_rows(&self) -> usize {
        self.b.len()
    }
}

fn is_equality(l: f64, u: f64) -> bool {
    l.is_finite() && l == u
}

/// Upper triangle of a symmetric CSC matrix, as Clarabel expects for P
fn upper_triangle(mat: &CsMat<f64>) -> CscMatrix<f64> {
    let mut colptr = vec![0];
    let mut rowval = Vec::new();
    let mut nzval = Vec::new();

    for (col, col_view) in mat.outer_iterator().enumerate() {
        for (row, &val) in col_view.iter() {
            if row <= col {
                rowval.push(row);
                nzval.push(val);
            }
        }
        colptr.push(nzval.len());
    }

    CscMatrix::new(mat.rows(), mat.cols(), colptr, rowval, nzval)
}

fn to_clarabel(mat: CsMat<f64>) -> CscMatrix<f64> {
    let (rows, cols) = (mat.rows(), mat.cols());
    let (colptr, rowval, nzval) = mat.into_raw_storage();
    CscMatrix::new(rows, cols, colptr, rowval, nzval)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance() -> ProblemInstance {
        // Base row: -1 <= x0 + x1 <= 2; x1 restricted with rows 1 and 2.
        let mut p = TriMat::new((2, 2));
        p.add_triplet(0, 0, 2.0);
        p.add_triplet(0, 1, 0.5);
        p.add_triplet(1, 0, 0.5);
        p.add_triplet(1, 1, 1.0);

        let mut a = TriMat::new((3, 2));
        a.add_triplet(0, 0, 1.0);
        a.add_triplet(0, 1, 1.0);
        a.add_triplet(1, 1, 1.0);
        a.add_triplet(2, 1, 1.0);

        ProblemInstance::new(
            p.to_csc(),
            vec![1.0, -1.0],
            a.to_csc(),
            vec![-1.0, 0.0, f64::NEG_INFINITY],
            vec![2.0, f64::INFINITY, 1.0],
            vec![1],
            1,
        )
        .unwrap()
    }

    #[test]
    fn test_rows_split_by_finite_side() {
        let conic = ConicProblem::from_instance(&instance());

        // Two sides of the base row plus one side of each bound row
        assert_eq!(conic.num_rows(), 4);
        assert_eq!(conic.b, vec![1.0, 2.0, 0.0, 1.0]);
        assert!(matches!(conic.cones.as_slice(), [SupportedConeT::NonnegativeConeT(4)]));
    }

    #[test]
    fn test_fixed_row_becomes_equality() {
        let inst = instance();
        let mut l = inst.lower_bounds().to_vec();
        let mut u = inst.upper_bounds().to_vec();
        l[1] = 1.0;
        u[1] = 1.0;
        l[2] = f64::NEG_INFINITY;
        u[2] = f64::INFINITY;

        let conic = ConicProblem::with_bounds(&inst, &l, &u);

        assert_eq!(conic.num_rows(), 3);
        assert_eq!(conic.b[0], 1.0);
        assert!(matches!(
            conic.cones.as_slice(),
            [SupportedConeT::ZeroConeT(1), SupportedConeT::NonnegativeConeT(2)]
        ));
    }

    #[test]
    fn test_cost_matrix_cut_to_upper_triangle() {
        let conic = ConicProblem::from_instance(&instance());
        assert_eq!(conic.p.nzval, vec![2.0, 0.5, 1.0]);
        assert_eq!(conic.p.rowval, vec![0, 0, 1]);
        assert_eq!(conic.p.colptr, vec![0, 1, 3]);
    }

    #[test]
    fn test_solve_small_relaxation() {
        let outcome = ConicProblem::from_instance(&instance()).solve(&ClarabelSettings::default());
        assert_eq!(outcome.status, SolverStatus::Solved);
        assert_eq!(outcome.x.len(), 2);
        // x1 stays within its [0, 1] box
        assert!(outcome.x[1] > -1e-6 && outcome.x[1] < 1.0 + 1e-6);
    }
}
