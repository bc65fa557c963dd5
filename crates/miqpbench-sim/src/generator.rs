use miqpbench_types::{ProblemDims, ProblemInstance, Result};
use rand::seq::index;
use rand::Rng;
use rand_distr::StandardNormal;
use sprs::{CsMat, TriMat};

/// Generate one random mixed-integer QP.
///
/// Draw order from `rng` is fixed (restricted indices, the factor of `P`,
/// `q`, `A`, upper bounds, lower bounds), so the instance is a pure function
/// of the generator state and the arguments.
///
/// - `P = Pt^T Pt` for an `n x n` sparse random `Pt`, hence PSD
/// - `q ~ N(0, I)`
/// - `A` is `m x n` sparse random, with `u in (1, 2)` and `l in (-1, 0)`
/// - `p` distinct indices restricted to {0, 1}, each bounded by two
///   appended rows
pub fn generate<R: Rng + ?Sized>(
    n: usize,
    m: usize,
    p: usize,
    density: f64,
    rng: &mut R,
) -> Result<ProblemInstance> {
    ProblemDims::new(n, m, p).validate_with_density(density)?;

    let restricted = index::sample(rng, n, p).into_vec();

    let factor = sparse_random(n, n, density, rng);
    let cost = gram(&factor);
    let q: Vec<f64> = (0..n).map(|_| rng.sample(StandardNormal)).collect();

    let a = sparse_random(m, n, density, rng);
    let u: Vec<f64> = (0..m).map(|_| 1.0 + rng.gen::<f64>()).collect();
    let l: Vec<f64> = (0..m).map(|_| -1.0 + rng.gen::<f64>()).collect();

    let (a, l, u) = add_bounds(&a, l, u, &restricted);

    ProblemInstance::new(cost, q, a, l, u, restricted, m)
}

/// Sparse `rows x cols` matrix with `round(density * rows * cols)` nonzeros
/// at distinct uniformly drawn positions, values uniform in [0, 1).
fn sparse_random<R: Rng + ?Sized>(rows: usize, cols: usize, density: f64, rng: &mut R) -> CsMat<f64> {
    let total = rows * cols;
    let nnz = ((density * total as f64).round() as usize).min(total);

    let mut triplets = TriMat::with_capacity((rows, cols), nnz);
    if nnz > 0 {
        for position in index::sample(rng, total, nnz) {
            triplets.add_triplet(position / cols, position % cols, rng.gen::<f64>());
        }
    }
    triplets.to_csc()
}

/// `M^T M` for a CSC matrix `M`.
///
/// Only the upper triangle is computed and then mirrored, so the result is
/// exactly symmetric.
fn gram(mat: &CsMat<f64>) -> CsMat<f64> {
    let n = mat.cols();
    let columns: Vec<_> = mat.outer_iterator().collect();
    let mut scattered = vec![0.0; mat.rows()];
    let mut triplets = TriMat::new((n, n));

    for j in 0..n {
        for (row, &val) in columns[j].iter() {
            scattered[row] = val;
        }

        for i in 0..=j {
            let dot: f64 = columns[i].iter().map(|(row, &val)| val * scattered[row]).sum();
            if dot != 0.0 {
                triplets.add_triplet(i, j, dot);
                if i != j {
                    triplets.add_triplet(j, i, dot);
                }
            }
        }

        for (row, _) in columns[j].iter() {
            scattered[row] = 0.0;
        }
    }

    triplets.to_csc()
}

/// Append two rows per restricted index: `0 <= x_i` then `x_i <= 1`.
fn add_bounds(
    a: &CsMat<f64>,
    mut l: Vec<f64>,
    mut u: Vec<f64>,
    restricted: &[usize],
) -> (CsMat<f64>, Vec<f64>, Vec<f64>) {
    let m = a.rows();
    let rows = m + 2 * restricted.len();

    let mut triplets = TriMat::with_capacity((rows, a.cols()), a.nnz() + 2 * restricted.len());
    for (col, col_view) in a.outer_iterator().enumerate() {
        for (row, &val) in col_view.iter() {
            triplets.add_triplet(row, col, val);
        }
    }

    for (k, &idx) in restricted.iter().enumerate() {
        triplets.add_triplet(m + 2 * k, idx, 1.0);
        l.push(0.0);
        u.push(f64::INFINITY);

        triplets.add_triplet(m + 2 * k + 1, idx, 1.0);
        l.push(f64::NEG_INFINITY);
        u.push(1.0);
    }

    (triplets.to_csc(), l, u)
}

#[cfg(test)]
mod tests {
    use super::*;
    use miqpbench_types::BenchError;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_sparse_random_density() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mat = sparse_random(20, 10, 0.25, &mut rng);

        assert_eq!(mat.rows(), 20);
        assert_eq!(mat.cols(), 10);
        assert_eq!(mat.nnz(), 50);
        assert!(mat.data().iter().all(|&v| (0.0..1.0).contains(&v)));
    }

    #[test]
    fn test_sparse_random_empty_shape() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mat = sparse_random(0, 10, 0.6, &mut rng);
        assert_eq!(mat.rows(), 0);
        assert_eq!(mat.nnz(), 0);
    }

    #[test]
    fn test_gram_matches_dense_product() {
        // M = [[1, 2], [0, 3], [4, 0]]
        let mut triplets = TriMat::new((3, 2));
        triplets.add_triplet(0, 0, 1.0);
        triplets.add_triplet(0, 1, 2.0);
        triplets.add_triplet(1, 1, 3.0);
        triplets.add_triplet(2, 0, 4.0);
        let m: CsMat<f64> = triplets.to_csc();

        let g = gram(&m);

        // M^T M = [[17, 2], [2, 13]]
        assert_eq!(g.get(0, 0), Some(&17.0));
        assert_eq!(g.get(0, 1), Some(&2.0));
        assert_eq!(g.get(1, 0), Some(&2.0));
        assert_eq!(g.get(1, 1), Some(&13.0));
    }

    #[test]
    fn test_add_bounds_layout() {
        let mut triplets = TriMat::new((1, 3));
        triplets.add_triplet(0, 1, 0.5);
        let a: CsMat<f64> = triplets.to_csc();

        let (a, l, u) = add_bounds(&a, vec![-0.5], vec![1.5], &[2, 0]);

        assert_eq!(a.rows(), 5);
        assert_eq!(l, vec![-0.5, 0.0, f64::NEG_INFINITY, 0.0, f64::NEG_INFINITY]);
        assert_eq!(u, vec![1.5, f64::INFINITY, 1.0, f64::INFINITY, 1.0]);
        assert_eq!(a.get(1, 2), Some(&1.0));
        assert_eq!(a.get(2, 2), Some(&1.0));
        assert_eq!(a.get(3, 0), Some(&1.0));
        assert_eq!(a.get(4, 0), Some(&1.0));
        assert_eq!(a.get(0, 1), Some(&0.5));
    }

    #[test]
    fn test_rejects_too_many_restricted() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let result = generate(5, 3, 7, 0.6, &mut rng);
        assert!(matches!(result, Err(BenchError::InvalidParameters(_))));
    }

    #[test]
    fn test_rejects_zero_variables_and_bad_density() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert!(generate(0, 3, 0, 0.6, &mut rng).is_err());
        assert!(generate(5, 3, 2, 0.0, &mut rng).is_err());
        assert!(generate(5, 3, 2, 1.01, &mut rng).is_err());
    }

    #[test]
    fn test_generated_dimensions() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let instance = generate(10, 5, 2, 0.6, &mut rng).unwrap();

        assert_eq!(instance.num_vars(), 10);
        assert_eq!(instance.num_base_constraints(), 5);
        assert_eq!(instance.num_constraints(), 9);
        assert_eq!(instance.num_restricted(), 2);

        for i in 0..5 {
            assert!(instance.lower_bounds()[i] >= -1.0 && instance.lower_bounds()[i] < 0.0);
            assert!(instance.upper_bounds()[i] >= 1.0 && instance.upper_bounds()[i] < 2.0);
            assert!(instance.lower_bounds()[i] < instance.upper_bounds()[i]);
        }
    }
}
