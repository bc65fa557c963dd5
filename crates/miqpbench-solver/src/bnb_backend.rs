use std::time::{Duration, Instant};

use clarabel::solver::SolverStatus;
use miqpbench_types::{BenchError, ProblemInstance, Result};

use crate::conic::ConicProblem;
use crate::settings::{BackendSettings, BranchingRule, MiqpSettings, TreeExploration};
use crate::{SolveStatus, SolverBackend, SolverResult};

const NAME: &str = "miqp-bnb";

/// Branch-and-bound over the {0, 1} restricted variables, with each node's
/// continuous relaxation solved by Clarabel.
///
/// The secondary time of the result is the total time spent inside those
/// relaxation solves.
pub struct BranchAndBoundBackend;

impl BranchAndBoundBackend {
    pub fn new() -> Self {
        BranchAndBoundBackend
    }

    fn settings(settings: &BackendSettings) -> Result<MiqpSettings> {
        let parsed: MiqpSettings = settings.parse(NAME)?;
        parsed.validate(NAME)?;
        Ok(parsed)
    }
}

impl Default for BranchAndBoundBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverBackend for BranchAndBoundBackend {
    fn name(&self) -> &str {
        NAME
    }

    fn check_settings(&self, settings: &BackendSettings) -> Result<()> {
        Self::settings(settings).map(|_| ())
    }

    fn solve(&self, instance: &ProblemInstance, settings: &BackendSettings) -> Result<SolverResult> {
        let settings = Self::settings(settings)?;

        let start = Instant::now();
        let outcome = Search::new(instance, &settings).run()?;
        let solve_time = start.elapsed();

        let mut result = SolverResult::new(outcome.status, solve_time)
            .with_relaxation_time(outcome.relaxation_time)
            .with_iterations(outcome.nodes);
        if let Some(objective) = outcome.objective {
            result = result.with_objective(objective);
        }
        Ok(result)
    }
}

/// Open node: bounds on each restricted variable plus the parent's bound
#[derive(Debug, Clone)]
struct Node {
    lower: Vec<f64>,
    upper: Vec<f64>,
    depth: usize,
    bound: f64,
}

struct SearchOutcome {
    status: SolveStatus,
    objective: Option<f64>,
    nodes: usize,
    relaxation_time: Duration,
}

/// One branch-and-bound run over a single instance
struct Search<'a> {
    instance: &'a ProblemInstance,
    settings: &'a MiqpSettings,
    open: Vec<Node>,
    incumbent: Option<f64>,
    nodes: usize,
    pruned: usize,
    /// Set when a node was dropped because its relaxation did not converge
    inexact: bool,
    relaxation_time: Duration,
    started: Instant,
}

enum NodeOutcome {
    Pruned,
    Branched(Node, Node),
    Incumbent(f64),
    Unbounded,
}

impl<'a> Search<'a> {
    fn new(instance: &'a ProblemInstance, settings: &'a MiqpSettings) -> Self {
        let p = instance.num_restricted();
        let root = Node {
            lower: vec![0.0; p],
            upper: vec![1.0; p],
            depth: 0,
            bound: f64::NEG_INFINITY,
        };

        Search {
            instance,
            settings,
            open: vec![root],
            incumbent: None,
            nodes: 0,
            pruned: 0,
            inexact: false,
            relaxation_time: Duration::ZERO,
            started: Instant::now(),
        }
    }

    fn run(mut self) -> Result<SearchOutcome> {
        let status = loop {
            if self.time_limit_exceeded() {
                break SolveStatus::TimeLimit;
            }
            if self.nodes >= self.settings.max_iter_bb {
                break SolveStatus::OtherTerminal;
            }

            let node = match self.next_node() {
                Some(node) => node,
                None if self.incumbent.is_some() && !self.inexact => break SolveStatus::Optimal,
                None => break SolveStatus::OtherTerminal,
            };

            if self.dominated(node.bound) {
                self.pruned += 1;
                continue;
            }

            self.nodes += 1;
            match self.process(&node)? {
                NodeOutcome::Pruned => self.pruned += 1,
                NodeOutcome::Branched(down, up) => {
                    // Down branch ends on top so depth-first explores it first
                    self.open.push(up);
                    self.open.push(down);
                }
                NodeOutcome::Incumbent(objective) => {
                    self.incumbent = Some(objective);
                    let before = self.open.len();
                    self.open.retain(|open| !dominated(Some(objective), open.bound));
                    self.pruned += before - self.open.len();
                    if self.settings.verbose {
                        tracing::info!(backend = NAME, node = self.nodes, objective, "new incumbent");
                    }
                }
                NodeOutcome::Unbounded => break SolveStatus::OtherTerminal,
            }

            if self.settings.verbose && self.nodes % self.settings.print_interval == 0 {
                tracing::info!(
                    backend = NAME,
                    nodes = self.nodes,
                    open = self.open.len(),
                    pruned = self.pruned,
                    incumbent = ?self.incumbent,
                    depth = node.depth,
                    "search progress"
                );
            }
        };

        tracing::debug!(
            backend = NAME,
            %status,
            nodes = self.nodes,
            pruned = self.pruned,
            "search finished"
        );

        Ok(SearchOutcome {
            status,
            objective: self.incumbent,
            nodes: self.nodes,
            relaxation_time: self.relaxation_time,
        })
    }

    /// Pop the next node according to the exploration rule
    fn next_node(&mut self) -> Option<Node> {
        let best_bound = match self.settings.tree_explor_rule {
            TreeExploration::DepthFirst => false,
            TreeExploration::TwoPhase => self.incumbent.is_some(),
        };

        if !best_bound {
            return self.open.pop();
        }

        let best = self
            .open
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.bound.total_cmp(&b.bound))
            .map(|(idx, _)| idx)?;
        Some(self.open.swap_remove(best))
    }

    fn process(&mut self, node: &Node) -> Result<NodeOutcome> {
        let (l, u) = self.node_bounds(node);
        let conic = ConicProblem::with_bounds(self.instance, &l, &u);
        let relaxation = conic.solve(&self.settings.relaxation);
        self.relaxation_time += relaxation.elapsed;

        match relaxation.status {
            SolverStatus::Solved | SolverStatus::AlmostSolved => {}
            SolverStatus::PrimalInfeasible | SolverStatus::AlmostPrimalInfeasible => {
                return Ok(NodeOutcome::Pruned);
            }
            SolverStatus::DualInfeasible | SolverStatus::AlmostDualInfeasible => {
                return Ok(NodeOutcome::Unbounded);
            }
            SolverStatus::Unsolved => {
                return Err(BenchError::adapter(
                    NAME,
                    format!("relaxation at node {} returned unsolved", self.nodes),
                ));
            }
            other => {
                tracing::warn!(backend = NAME, node = self.nodes, status = ?other, "relaxation did not converge, dropping node");
                self.inexact = true;
                return Ok(NodeOutcome::Pruned);
            }
        }

        if self.dominated(relaxation.objective) {
            return Ok(NodeOutcome::Pruned);
        }

        match self.select_branching(&relaxation.x) {
            None => Ok(NodeOutcome::Incumbent(relaxation.objective)),
            Some((k, value)) => {
                let mut down = Node {
                    lower: node.lower.clone(),
                    upper: node.upper.clone(),
                    depth: node.depth + 1,
                    bound: relaxation.objective,
                };
                let mut up = down.clone();
                down.upper[k] = value.floor();
                up.lower[k] = value.ceil();
                Ok(NodeOutcome::Branched(down, up))
            }
        }
    }

    /// Row bounds of the node's relaxation. The k-th restricted variable's
    /// box goes on its lower bound row; the upper bound row is freed.
    fn node_bounds(&self, node: &Node) -> (Vec<f64>, Vec<f64>) {
        let mut l = self.instance.lower_bounds().to_vec();
        let mut u = self.instance.upper_bounds().to_vec();

        for k in 0..self.instance.num_restricted() {
            let (lower_row, upper_row) = self.instance.bound_rows(k);
            l[lower_row] = node.lower[k];
            u[lower_row] = node.upper[k];
            l[upper_row] = f64::NEG_INFINITY;
            u[upper_row] = f64::INFINITY;
        }

        (l, u)
    }

    /// Restricted variable to branch on and its relaxed value, or `None`
    /// when every restricted variable is integral within tolerance.
    fn select_branching(&self, x: &[f64]) -> Option<(usize, f64)> {
        match self.settings.branching_rule {
            BranchingRule::MaxFractional => self
                .instance
                .restricted_indices()
                .iter()
                .enumerate()
                .map(|(k, &idx)| (k, x[idx], fractionality(x[idx])))
                .filter(|&(_, _, frac)| frac > self.settings.eps_int_feas)
                .max_by(|a, b| a.2.total_cmp(&b.2))
                .map(|(k, value, _)| (k, value)),
        }
    }

    fn dominated(&self, bound: f64) -> bool {
        dominated(self.incumbent, bound)
    }

    fn time_limit_exceeded(&self) -> bool {
        self.settings
            .time_limit
            .map(|limit| self.started.elapsed().as_secs_f64() >= limit)
            .unwrap_or(false)
    }
}

/// Distance from `value` to the nearest integer
fn fractionality(value: f64) -> f64 {
    (value - value.round()).abs()
}

fn dominated(incumbent: Option<f64>, bound: f64) -> bool {
    match incumbent {
        Some(best) => bound >= best - 1e-9 * best.abs().max(1.0),
        None => false,
    }
}
