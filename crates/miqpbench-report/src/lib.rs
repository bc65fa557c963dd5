mod reporter;
mod table;

pub use reporter::{build, ComparisonReport, ReportRow};

#[cfg(test)]
mod tests;
