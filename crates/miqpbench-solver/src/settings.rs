use clarabel::solver::DefaultSettings;
use miqpbench_types::{BenchError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Backend options as an opaque JSON object.
///
/// The harness forwards this untouched; each backend decides which keys it
/// understands by parsing it into its own settings type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BackendSettings(Map<String, Value>);

impl BackendSettings {
    pub fn new() -> Self {
        BackendSettings(Map::new())
    }

    /// Wrap a JSON value, which must be an object (or null for no options)
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(BackendSettings(map)),
            Value::Null => Ok(BackendSettings::new()),
            other => Err(BenchError::Config(format!(
                "backend settings must be a JSON object, got {}",
                other
            ))),
        }
    }

    /// Builder-style insert
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse into a backend's typed settings
    pub fn parse<T: DeserializeOwned>(&self, backend: &str) -> Result<T> {
        serde_json::from_value(Value::Object(self.0.clone()))
            .map_err(|e| BenchError::settings(backend, e.to_string()))
    }
}

/// Options forwarded to Clarabel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClarabelSettings {
    pub verbose: bool,
    pub max_iter: u32,
    /// Seconds; unlimited when absent
    pub time_limit: Option<f64>,
    pub tol_gap_abs: f64,
    pub tol_gap_rel: f64,
    pub tol_feas: f64,
}

impl Default for ClarabelSettings {
    fn default() -> Self {
        let defaults = DefaultSettings::<f64>::default();
        ClarabelSettings {
            verbose: false,
            max_iter: defaults.max_iter,
            time_limit: None,
            tol_gap_abs: defaults.tol_gap_abs,
            tol_gap_rel: defaults.tol_gap_rel,
            tol_feas: defaults.tol_feas,
        }
    }
}

impl ClarabelSettings {
    pub(crate) fn to_clarabel(&self) -> DefaultSettings<f64> {
        let mut settings = DefaultSettings::default();
        settings.verbose = self.verbose;
        settings.max_iter = self.max_iter;
        settings.time_limit = self.time_limit.unwrap_or(f64::INFINITY);
        settings.tol_gap_abs = self.tol_gap_abs;
        settings.tol_gap_rel = self.tol_gap_rel;
        settings.tol_feas = self.tol_feas;
        settings
    }
}

/// Order in which open branch-and-bound nodes are explored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeExploration {
    /// Always expand the most recently created node
    DepthFirst,
    /// Depth-first until the first incumbent, then best bound
    #[default]
    TwoPhase,
}

/// Branching variable selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchingRule {
    /// Variable whose fractional part is closest to 0.5
    #[default]
    MaxFractional,
}

/// Options of the branch-and-bound backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MiqpSettings {
    /// Integer feasibility tolerance
    pub eps_int_feas: f64,
    /// Maximum number of explored nodes
    pub max_iter_bb: usize,
    pub tree_explor_rule: TreeExploration,
    pub branching_rule: BranchingRule,
    /// Seconds for the whole search; unlimited when absent
    pub time_limit: Option<f64>,
    pub verbose: bool,
    /// Nodes between progress lines when `verbose` is set
    pub print_interval: usize,
    /// Settings for every relaxation solve
    pub relaxation: ClarabelSettings,
}

impl Default for MiqpSettings {
    fn default() -> Self {
        MiqpSettings {
            eps_int_feas: 1e-3,
            max_iter_bb: 1000,
            tree_explor_rule: TreeExploration::TwoPhase,
            branching_rule: BranchingRule::MaxFractional,
            time_limit: None,
            verbose: false,
            print_interval: 1,
            relaxation: ClarabelSettings::default(),
        }
    }
}

impl MiqpSettings {
    pub(crate) fn validate(&self, backend: &str) -> Result<()> {
        if !(self.eps_int_feas > 0.0 && self.eps_int_feas < 0.5) {
            return Err(BenchError::settings(
                backend,
                format!("eps_int_feas must lie in (0, 0.5), got {}", self.eps_int_feas),
            ));
        }
        if self.max_iter_bb == 0 {
            return Err(BenchError::settings(backend, "max_iter_bb must be at least 1"));
        }
        if self.print_interval == 0 {
            return Err(BenchError::settings(backend, "print_interval must be at least 1"));
        }
        Ok(())
    }
}
