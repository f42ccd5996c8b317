//! Sales & profit analysis for tabular order exports.
//!
//! Loads a `.csv` or `.xlsx` file, validates and cleans it, aggregates sales
//! and profit by month, category and sub-category, and renders static charts.

pub mod analysis;
pub mod charts;
pub mod config;
pub mod data;
pub mod report;
pub mod stats;

pub use analysis::{AnalysisError, AnalysisOutcome, SalesAnalysis};
pub use config::{AnalysisConfig, AnalysisConfigBuilder, ConfigError};
pub use report::{AnalysisReport, ConsoleReporter};
