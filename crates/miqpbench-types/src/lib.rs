mod error;
mod dims;
mod instance;
mod hashing;

pub use error::{BenchError, Result};
pub use dims::{ProblemDims, SweepConfig};
pub use instance::ProblemInstance;
pub use hashing::{compute_hash, fold_hashes, HashRef};
