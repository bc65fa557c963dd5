mod backend;
mod settings;
mod conic;
mod clarabel_backend;
mod bnb_backend;

pub use backend::{BackendKind, SolveStatus, SolverBackend, SolverResult};
pub use settings::{BackendSettings, BranchingRule, ClarabelSettings, MiqpSettings, TreeExploration};
pub use clarabel_backend::ClarabelBackend;
pub use bnb_backend::BranchAndBoundBackend;
