use clarabel::solver::SolverStatus;
use miqpbench_types::{BenchError, ProblemInstance, Result};

use crate::conic::ConicProblem;
use crate::settings::{BackendSettings, ClarabelSettings};
use crate::{SolveStatus, SolverBackend, SolverResult};

const NAME: &str = "clarabel";

/// Clarabel interior-point solve of the continuous relaxation.
///
/// Restricted variables keep their [0, 1] bound rows but integrality is
/// dropped, so one solve settles the instance.
pub struct ClarabelBackend;

impl ClarabelBackend {
    pub fn new() -> Self {
        ClarabelBackend
    }

    fn settings(settings: &BackendSettings) -> Result<ClarabelSettings> {
        settings.parse(NAME)
    }
}

impl Default for ClarabelBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverBackend for ClarabelBackend {
    fn name(&self) -> &str {
        NAME
    }

    fn check_settings(&self, settings: &BackendSettings) -> Result<()> {
        Self::settings(settings).map(|_| ())
    }

    fn solve(&self, instance: &ProblemInstance, settings: &BackendSettings) -> Result<SolverResult> {
        let settings = Self::settings(settings)?;

        let conic = ConicProblem::from_instance(instance);
        let outcome = conic.solve(&settings);

        let status = map_status(outcome.status)?;
        tracing::debug!(
            backend = NAME,
            status = ?outcome.status,
            iterations = outcome.iterations,
            "relaxation solved"
        );

        let mut result = SolverResult::new(status, outcome.elapsed)
            .with_iterations(outcome.iterations as usize);
        if has_primal_point(outcome.status) {
            result = result.with_objective(outcome.objective);
        }
        Ok(result)
    }
}

/// Map Clarabel's status vocabulary onto [`SolveStatus`]
pub(crate) fn map_status(status: SolverStatus) -> Result<SolveStatus> {
    match status {
        SolverStatus::Solved => Ok(SolveStatus::Optimal),
        SolverStatus::MaxTime => Ok(SolveStatus::TimeLimit),
        SolverStatus::PrimalInfeasible
        | SolverStatus::DualInfeasible
        | SolverStatus::AlmostSolved
        | SolverStatus::AlmostPrimalInfeasible
        | SolverStatus::AlmostDualInfeasible
        | SolverStatus::MaxIterations => Ok(SolveStatus::OtherTerminal),
        // solve() returned without touching the problem
        SolverStatus::Unsolved => Err(BenchError::adapter(NAME, "solver returned an unsolved problem")),
        #[allow(unreachable_patterns)]
        other => Ok(SolveStatus::Backend(format!("{:?}", other))),
    }
}

pub(crate) fn has_primal_point(status: SolverStatus) -> bool {
    matches!(status, SolverStatus::Solved | SolverStatus::AlmostSolved)
}
