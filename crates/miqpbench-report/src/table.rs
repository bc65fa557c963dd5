use std::fmt;

use miqpbench_sim::TimeStats;

use crate::reporter::ComparisonReport;

const DIM_WIDTH: usize = 6;
const COL_WIDTH: usize = 11;

/// Column block of one backend
struct Block<'a> {
    backend: &'a str,
    relaxation: bool,
}

impl Block<'_> {
    fn columns(&self) -> Vec<&'static str> {
        let mut columns = vec!["t_min[ms]", "t_max[ms]", "t_avg[ms]"];
        if self.relaxation {
            columns.extend(["rx_min[%]", "rx_max[%]", "rx_avg[%]"]);
        }
        columns.push("non_opt");
        columns
    }

    fn width(&self) -> usize {
        self.columns().len() * COL_WIDTH
    }
}

fn write_stats(f: &mut fmt::Formatter<'_>, stats: &TimeStats, precision: usize) -> fmt::Result {
    for value in [stats.min, stats.max, stats.mean] {
        write!(f, "{:>w$.p$}", value, w = COL_WIDTH, p = precision)?;
    }
    Ok(())
}

impl fmt::Display for ComparisonReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let blocks: Vec<Block> = self
            .backends
            .iter()
            .map(|backend| Block {
                backend,
                relaxation: self.has_relaxation(backend),
            })
            .collect();
        let compare = blocks.len() > 1;

        // Backend names centered over their blocks
        write!(f, "{:w$}", "", w = 3 * DIM_WIDTH)?;
        for block in &blocks {
            write!(f, " |{:^w$}", block.backend, w = block.width())?;
        }
        writeln!(f)?;

        write!(f, "{:>w$}{:>w$}{:>w$}", "n", "m", "p", w = DIM_WIDTH)?;
        for block in &blocks {
            write!(f, " |")?;
            for column in block.columns() {
                write!(f, "{:>w$}", column, w = COL_WIDTH)?;
            }
        }
        if compare {
            write!(f, " | instances")?;
        }
        writeln!(f)?;

        for row in &self.rows {
            write!(f, "{:>w$}{:>w$}{:>w$}", row.n, row.m, row.p, w = DIM_WIDTH)?;
            for block in &blocks {
                write!(f, " |")?;
                let Some(stats) = row.stats.get(block.backend) else {
                    for _ in block.columns() {
                        write!(f, "{:>w$}", "-", w = COL_WIDTH)?;
                    }
                    continue;
                };

                write_stats(f, &stats.solve_time, 3)?;
                if block.relaxation {
                    match &stats.relaxation_share {
                        Some(share) => write_stats(f, share, 1)?,
                        None => write!(f, "{:>w$}", "-", w = 3 * COL_WIDTH)?,
                    }
                }
                write!(f, "{:>w$}", stats.non_optimal(), w = COL_WIDTH)?;
            }
            if compare {
                write!(f, " | {}", if row.instances_match { "same" } else { "DIFFER" })?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}
