mod generator;
mod presets;
mod stats;
mod runner;

pub use generator::generate;
pub use presets::{ProblemSet, DEFAULT_DENSITY, DEFAULT_REPEAT, DEFAULT_SEED};
pub use stats::{aggregate, ConfigurationStatistics, RawSample, TimeStats};
pub use runner::{run_comparison, BackendRun, ExperimentRunner};
