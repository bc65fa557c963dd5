use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use miqpbench_types::{BenchError, ProblemInstance, Result};
use serde::{Deserialize, Serialize};

use crate::bnb_backend::BranchAndBoundBackend;
use crate::clarabel_backend::ClarabelBackend;
use crate::settings::BackendSettings;

/// Terminal status of one solve, in backend-independent terms
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SolveStatus {
    /// Solved to optimality
    Optimal,
    /// Stopped by a time limit
    TimeLimit,
    /// Any other well-formed termination: infeasible, unbounded, iteration cap
    OtherTerminal,
    /// Raw backend status outside the classes above
    Backend(String),
}

impl SolveStatus {
    pub fn is_optimal(&self) -> bool {
        matches!(self, SolveStatus::Optimal)
    }

    /// Short label used for status tallies
    pub fn label(&self) -> String {
        match self {
            SolveStatus::Optimal => "optimal".to_string(),
            SolveStatus::TimeLimit => "time_limit".to_string(),
            SolveStatus::OtherTerminal => "other".to_string(),
            SolveStatus::Backend(code) => format!("backend:{}", code),
        }
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Outcome of one solve call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverResult {
    pub status: SolveStatus,
    /// Wall time of the full solve
    pub solve_time: Duration,
    /// Time spent in continuous relaxation solves, for backends that have them
    pub relaxation_time: Option<Duration>,
    /// Objective at the returned point, if the backend produced one
    pub objective: Option<f64>,
    /// Interior-point iterations or search nodes, depending on the backend
    pub iterations: usize,
}

impl SolverResult {
    pub fn new(status: SolveStatus, solve_time: Duration) -> Self {
        SolverResult {
            status,
            solve_time,
            relaxation_time: None,
            objective: None,
            iterations: 0,
        }
    }

    pub fn with_relaxation_time(mut self, relaxation_time: Duration) -> Self {
        self.relaxation_time = Some(relaxation_time);
        self
    }

    pub fn with_objective(mut self, objective: f64) -> Self {
        self.objective = Some(objective);
        self
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn solve_time_ms(&self) -> f64 {
        self.solve_time.as_secs_f64() * 1e3
    }

    pub fn relaxation_time_ms(&self) -> Option<f64> {
        self.relaxation_time.map(|t| t.as_secs_f64() * 1e3)
    }
}

/// Trait for solver backends driven by the benchmark harness
pub trait SolverBackend: Send + Sync {
    /// Tag identifying the backend in logs and reports
    fn name(&self) -> &str;

    /// Parse `settings` without solving anything, so that configuration
    /// errors surface before a run starts.
    fn check_settings(&self, settings: &BackendSettings) -> Result<()>;

    /// Solve `instance`. Non-optimal terminations come back as `Ok` with the
    /// matching status; `Err` means the backend itself failed.
    fn solve(&self, instance: &ProblemInstance, settings: &BackendSettings) -> Result<SolverResult>;
}

/// Available backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BackendKind {
    /// Continuous relaxation with one Clarabel solve
    Clarabel,
    /// Branch-and-bound over Clarabel relaxations
    BranchAndBound,
}

impl BackendKind {
    pub fn all() -> &'static [BackendKind] {
        &[BackendKind::Clarabel, BackendKind::BranchAndBound]
    }

    pub fn tag(&self) -> &'static str {
        match self {
            BackendKind::Clarabel => "clarabel",
            BackendKind::BranchAndBound => "miqp-bnb",
        }
    }

    /// Instantiate the backend behind this tag
    pub fn create(&self) -> Box<dyn SolverBackend> {
        match self {
            BackendKind::Clarabel => Box::new(ClarabelBackend::new()),
            BackendKind::BranchAndBound => Box::new(BranchAndBoundBackend::new()),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for BackendKind {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self> {
        let tag = s.trim().to_ascii_lowercase();
        BackendKind::all()
            .iter()
            .copied()
            .find(|kind| kind.tag() == tag)
            .ok_or_else(|| {
                let known: Vec<&str> = BackendKind::all().iter().map(|k| k.tag()).collect();
                BenchError::UnsupportedBackend(format!("{} (known: {})", s, known.join(", ")))
            })
    }
}
