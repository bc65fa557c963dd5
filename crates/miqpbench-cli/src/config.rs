use std::path::Path;

use miqpbench_sim::ProblemSet;
use miqpbench_solver::{BackendKind, BackendSettings};
use miqpbench_types::{BenchError, Result, SweepConfig};
use serde::{Deserialize, Serialize};

/// Sweep section of the config file. Explicit `n`/`m`/`p` sequences take
/// precedence over `problem_set`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SweepSection {
    pub problem_set: Option<u8>,
    pub n: Option<Vec<usize>>,
    pub m: Option<Vec<usize>>,
    pub p: Option<Vec<usize>>,
    pub repeat: Option<usize>,
    pub density: Option<f64>,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackendEntry {
    /// Backend tag, e.g. `clarabel` or `miqp-bnb`
    pub kind: String,
    #[serde(default)]
    pub settings: BackendSettings,
}

/// Benchmark configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BenchConfig {
    pub sweep: SweepSection,
    /// Every known backend with default settings when empty
    pub backends: Vec<BackendEntry>,
}

/// Command line values that override the file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub problem_set: Option<u8>,
    pub repeat: Option<usize>,
    pub density: Option<f64>,
    pub seed: Option<u64>,
    pub backends: Vec<String>,
}

/// Fully resolved run: the sweep plus each backend with its settings
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub sweep: SweepConfig,
    pub backends: Vec<(BackendKind, BackendSettings)>,
}

impl BenchConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| BenchError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| BenchError::Config(e.to_string()))
    }

    /// Merge command line overrides and validate everything that can be
    /// checked before solving.
    pub fn resolve(&self, overrides: &Overrides) -> Result<RunPlan> {
        Ok(RunPlan {
            sweep: self.resolve_sweep(overrides)?,
            backends: self.resolve_backends(overrides)?,
        })
    }

    fn resolve_sweep(&self, overrides: &Overrides) -> Result<SweepConfig> {
        let section = &self.sweep;

        // A preset on the command line beats explicit sequences in the file
        let explicit = match (&section.n, &section.m, &section.p) {
            _ if overrides.problem_set.is_some() => None,
            (Some(n), Some(m), Some(p)) => Some((n, m, p)),
            (None, None, None) => None,
            _ => {
                return Err(BenchError::Config(
                    "sweep needs all of n, m and p, or none of them".to_string(),
                ))
            }
        };

        let mut sweep = match explicit {
            Some((n, m, p)) => SweepConfig::from_vectors(
                n,
                m,
                p,
                miqpbench_sim::DEFAULT_REPEAT,
                miqpbench_sim::DEFAULT_DENSITY,
                miqpbench_sim::DEFAULT_SEED,
            )?,
            None => {
                let id = overrides.problem_set.or(section.problem_set);
                let set = match id {
                    Some(id) => ProblemSet::from_id(id)?,
                    None => ProblemSet::default(),
                };
                set.sweep()
            }
        };

        if let Some(repeat) = overrides.repeat.or(section.repeat) {
            sweep.repeat = repeat;
        }
        if let Some(density) = overrides.density.or(section.density) {
            sweep.density = density;
        }
        if let Some(seed) = overrides.seed.or(section.seed) {
            sweep.seed = seed;
        }

        sweep.validate()?;
        Ok(sweep)
    }

    fn resolve_backends(&self, overrides: &Overrides) -> Result<Vec<(BackendKind, BackendSettings)>> {
        let mut file_entries = Vec::with_capacity(self.backends.len());
        for entry in &self.backends {
            let kind: BackendKind = entry.kind.parse()?;
            file_entries.push((kind, entry.settings.clone()));
        }

        let selected: Vec<(BackendKind, BackendSettings)> = if !overrides.backends.is_empty() {
            let mut selected = Vec::with_capacity(overrides.backends.len());
            for tag in &overrides.backends {
                let kind: BackendKind = tag.parse()?;
                let settings = file_entries
                    .iter()
                    .find(|(k, _)| *k == kind)
                    .map(|(_, settings)| settings.clone())
                    .unwrap_or_default();
                selected.push((kind, settings));
            }
            selected
        } else if !file_entries.is_empty() {
            file_entries
        } else {
            BackendKind::all()
                .iter()
                .map(|kind| (*kind, BackendSettings::new()))
                .collect()
        };

        let mut unique: Vec<(BackendKind, BackendSettings)> = Vec::with_capacity(selected.len());
        for (kind, settings) in selected {
            if unique.iter().any(|(k, _)| *k == kind) {
                return Err(BenchError::Config(format!("backend {} listed twice", kind)));
            }
            unique.push((kind, settings));
        }
        Ok(unique)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use miqpbench_types::ProblemDims;

    #[test]
    fn test_empty_config_uses_defaults() {
        let plan = BenchConfig::default().resolve(&Overrides::default()).unwrap();

        assert_eq!(plan.sweep, ProblemSet::Mixed.sweep());
        let kinds: Vec<_> = plan.backends.iter().map(|(k, _)| *k).collect();
        assert_eq!(kinds, vec![BackendKind::Clarabel, BackendKind::BranchAndBound]);
        assert!(plan.backends.iter().all(|(_, s)| s.is_empty()));
    }

    #[test]
    fn test_file_sweep_and_backends() {
        let config = BenchConfig::from_json(
            r#"{
                "sweep": { "n": [10], "m": [5], "p": [2], "repeat": 3, "seed": 9 },
                "backends": [
                    { "kind": "miqp-bnb", "settings": { "max_iter_bb": 50 } }
                ]
            }"#,
        )
        .unwrap();

        let plan = config.resolve(&Overrides::default()).unwrap();
        assert_eq!(plan.sweep.dims, vec![ProblemDims::new(10, 5, 2)]);
        assert_eq!(plan.sweep.repeat, 3);
        assert_eq!(plan.sweep.seed, 9);
        assert_eq!(plan.sweep.density, miqpbench_sim::DEFAULT_DENSITY);
        assert_eq!(plan.backends.len(), 1);
        assert_eq!(plan.backends[0].0, BackendKind::BranchAndBound);
        assert_eq!(plan.backends[0].1.get("max_iter_bb"), Some(&serde_json::json!(50)));
    }

    #[test]
    fn test_overrides_win() {
        let config = BenchConfig::from_json(
            r#"{
                "sweep": { "problem_set": 1, "repeat": 3, "density": 0.5 },
                "backends": [
                    { "kind": "clarabel", "settings": { "max_iter": 20 } },
                    { "kind": "miqp-bnb" }
                ]
            }"#,
        )
        .unwrap();
        let overrides = Overrides {
            problem_set: Some(2),
            repeat: Some(1),
            backends: vec!["clarabel".to_string()],
            ..Overrides::default()
        };

        let plan = config.resolve(&overrides).unwrap();
        assert_eq!(plan.sweep.dims, ProblemSet::SmallBinary.dims());
        assert_eq!(plan.sweep.repeat, 1);
        assert_eq!(plan.sweep.density, 0.5);

        // The file's settings for the selected tag are kept
        assert_eq!(plan.backends.len(), 1);
        assert_eq!(plan.backends[0].1.get("max_iter"), Some(&serde_json::json!(20)));
    }

    #[test]
    fn test_unknown_backend_tag() {
        let overrides = Overrides {
            backends: vec!["gurobi".to_string()],
            ..Overrides::default()
        };
        assert!(matches!(
            BenchConfig::default().resolve(&overrides),
            Err(BenchError::UnsupportedBackend(_))
        ));

        let config = BenchConfig::from_json(r#"{ "backends": [{ "kind": "cplex" }] }"#).unwrap();
        assert!(matches!(
            config.resolve(&Overrides::default()),
            Err(BenchError::UnsupportedBackend(_))
        ));
    }

    #[test]
    fn test_rejects_malformed_files() {
        assert!(matches!(
            BenchConfig::from_json(r#"{ "sweeps": {} }"#),
            Err(BenchError::Config(_))
        ));

        let partial = BenchConfig::from_json(r#"{ "sweep": { "n": [1], "m": [1] } }"#).unwrap();
        assert!(matches!(partial.resolve(&Overrides::default()), Err(BenchError::Config(_))));

        let uneven = BenchConfig::from_json(r#"{ "sweep": { "n": [1, 2], "m": [1], "p": [0] } }"#).unwrap();
        assert!(matches!(
            uneven.resolve(&Overrides::default()),
            Err(BenchError::InvalidParameters(_))
        ));

        let duplicate = Overrides {
            backends: vec!["clarabel".to_string(), "CLARABEL".to_string()],
            ..Overrides::default()
        };
        assert!(matches!(
            BenchConfig::default().resolve(&duplicate),
            Err(BenchError::Config(_))
        ));
    }

    #[test]
    fn test_bad_density_override() {
        let overrides = Overrides {
            density: Some(1.5),
            ..Overrides::default()
        };
        assert!(matches!(
            BenchConfig::default().resolve(&overrides),
            Err(BenchError::InvalidParameters(_))
        ));
    }
}
