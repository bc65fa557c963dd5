// Report assembly tests

#[cfg(test)]
mod tests {
    use crate::*;
    use miqpbench_sim::{aggregate, BackendRun, RawSample};
    use miqpbench_solver::SolveStatus;
    use miqpbench_types::{BenchError, ProblemDims, SweepConfig};
    use std::collections::BTreeMap;

    fn sweep() -> SweepConfig {
        SweepConfig::from_vectors(&[10, 50], &[5, 25], &[2, 5], 2, 0.6, 0).unwrap()
    }

    fn samples(times: &[f64], relaxation: bool, tag: &str) -> Vec<RawSample> {
        times
            .iter()
            .enumerate()
            .map(|(i, &t)| RawSample {
                solve_time_ms: t,
                relaxation_time_ms: relaxation.then_some(t / 2.0),
                status: SolveStatus::Optimal,
                fingerprint: format!("{}-{}", tag, i),
            })
            .collect()
    }

    fn run(backend: &str, relaxation: bool, tags: [&str; 2]) -> BackendRun {
        let mut statistics = BTreeMap::new();
        statistics.insert(0, aggregate(&samples(&[1.0, 3.0], relaxation, tags[0])).unwrap());
        statistics.insert(1, aggregate(&samples(&[10.0, 30.0], relaxation, tags[1])).unwrap());
        BackendRun {
            backend: backend.to_string(),
            statistics,
        }
    }

    #[test]
    fn test_rows_follow_sweep_order() {
        let runs = vec![run("clarabel", false, ["a", "b"]), run("miqp-bnb", true, ["a", "b"])];
        let report = build(&runs, &sweep()).unwrap();

        assert_eq!(report.backends, vec!["clarabel", "miqp-bnb"]);
        assert_eq!(report.len(), 2);
        assert_eq!(report.rows[0].dims(), ProblemDims::new(10, 5, 2));
        assert_eq!(report.rows[1].dims(), ProblemDims::new(50, 25, 5));
        assert!(report.rows.iter().all(|row| row.instances_match));
        assert_eq!(report.rows[1].stats["clarabel"].solve_time.mean, 20.0);
    }

    #[test]
    fn test_single_backend_view() {
        let runs = vec![run("clarabel", false, ["a", "b"]), run("miqp-bnb", true, ["a", "b"])];
        let report = build(&runs, &sweep()).unwrap();

        let view = report.rows_for("miqp-bnb");
        assert_eq!(view.len(), 2);
        assert_eq!(view[0].0, ProblemDims::new(10, 5, 2));
        assert!((view[0].1.relaxation_share.unwrap().mean - 50.0).abs() < 1e-12);

        assert!(report.rows_for("gurobi").is_empty());
        assert!(report.has_relaxation("miqp-bnb"));
        assert!(!report.has_relaxation("clarabel"));
    }

    #[test]
    fn test_mismatched_instances_are_flagged() {
        let runs = vec![run("clarabel", false, ["a", "b"]), run("miqp-bnb", true, ["a", "c"])];
        let report = build(&runs, &sweep()).unwrap();

        assert!(report.rows[0].instances_match);
        assert!(!report.rows[1].instances_match);
        assert!(report.to_string().contains("DIFFER"));
    }

    #[test]
    fn test_missing_configuration_is_internal_error() {
        let mut partial = run("clarabel", false, ["a", "b"]);
        partial.statistics.remove(&1);

        assert!(matches!(build(&[partial], &sweep()), Err(BenchError::Internal(_))));

        let mut shifted = run("clarabel", false, ["a", "b"]);
        let moved = shifted.statistics.remove(&1).unwrap();
        shifted.statistics.insert(7, moved);
        assert!(matches!(build(&[shifted], &sweep()), Err(BenchError::Internal(_))));
    }

    #[test]
    fn test_duplicate_backend_is_internal_error() {
        let runs = vec![run("clarabel", false, ["a", "b"]), run("clarabel", false, ["a", "b"])];
        assert!(matches!(build(&runs, &sweep()), Err(BenchError::Internal(_))));
    }

    #[test]
    fn test_table_columns() {
        let runs = vec![run("clarabel", false, ["a", "b"]), run("miqp-bnb", true, ["a", "b"])];
        let table = build(&runs, &sweep()).unwrap().to_string();
        let lines: Vec<&str> = table.lines().collect();

        // Two header lines plus one line per configuration
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("clarabel") && lines[0].contains("miqp-bnb"));
        assert_eq!(lines[1].matches("t_avg[ms]").count(), 2);
        assert_eq!(lines[1].matches("rx_avg[%]").count(), 1);
        assert!(lines[2].contains("2.000"));
        assert!(lines[2].contains("50.0"));
        assert!(lines[3].trim_start().starts_with("50"));
    }

    #[test]
    fn test_single_backend_table_has_no_instance_column() {
        let table = build(&[run("clarabel", false, ["a", "b"])], &sweep()).unwrap().to_string();

        assert!(!table.contains("instances"));
        assert!(!table.contains("rx_min"));
    }

    #[test]
    fn test_report_serializes() {
        let runs = vec![run("miqp-bnb", true, ["a", "b"])];
        let report = build(&runs, &sweep()).unwrap();

        let json = serde_json::to_string(&report).unwrap();
        let back: ComparisonReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }
}
