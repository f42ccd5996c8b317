//! Configuration for a single analysis run.
//!
//! Use [`AnalysisConfig::builder()`] to create a configuration; `build()`
//! validates the numeric settings.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised when a configuration fails validation.
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("No input file given")]
    MissingInput,
    #[error("'{field}' must be at least 1")]
    MustBePositive { field: &'static str },
}

/// Settings for one run of the sales analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Path of the `.csv` or `.xlsx` file to analyse.
    pub input: PathBuf,

    /// Rows shown in the data preview.
    /// Default: 5
    pub head_rows: usize,

    /// Number of sub-categories in the top / bottom rankings.
    /// Default: 10
    pub top_n: usize,

    /// Maximum number of orders drawn for the discount scatter.
    /// Default: 1000
    pub sample_size: usize,

    /// Seed for the scatter sample. `None` draws a different sample each run.
    /// Default: None
    pub seed: Option<u64>,

    /// Whether to render charts at all.
    /// Default: true
    pub render_charts: bool,

    /// Directory that rendered charts are written to as PNG.
    /// `None` keeps figures in memory only.
    /// Default: None
    pub charts_dir: Option<PathBuf>,
}

impl AnalysisConfig {
    /// Create a new builder.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.input.as_os_str().is_empty() {
            return Err(ConfigError::MissingInput);
        }
        if self.head_rows == 0 {
            return Err(ConfigError::MustBePositive { field: "head_rows" });
        }
        if self.top_n == 0 {
            return Err(ConfigError::MustBePositive { field: "top_n" });
        }
        if self.sample_size == 0 {
            return Err(ConfigError::MustBePositive {
                field: "sample_size",
            });
        }
        Ok(())
    }
}

/// Builder for [`AnalysisConfig`].
#[derive(Debug, Default)]
pub struct AnalysisConfigBuilder {
    input: Option<PathBuf>,
    head_rows: Option<usize>,
    top_n: Option<usize>,
    sample_size: Option<usize>,
    seed: Option<u64>,
    render_charts: Option<bool>,
    charts_dir: Option<PathBuf>,
}

impl AnalysisConfigBuilder {
    /// Set the input file.
    pub fn input(mut self, path: impl Into<PathBuf>) -> Self {
        self.input = Some(path.into());
        self
    }

    /// Set how many rows the preview shows.
    pub fn head_rows(mut self, rows: usize) -> Self {
        self.head_rows = Some(rows);
        self
    }

    /// Set the size of the top / bottom sub-category rankings.
    pub fn top_n(mut self, n: usize) -> Self {
        self.top_n = Some(n);
        self
    }

    /// Set the scatter sample size.
    pub fn sample_size(mut self, size: usize) -> Self {
        self.sample_size = Some(size);
        self
    }

    /// Fix the scatter sample seed.
    pub fn seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Enable or disable chart rendering.
    pub fn render_charts(mut self, enabled: bool) -> Self {
        self.render_charts = Some(enabled);
        self
    }

    /// Write charts as PNG into `dir`.
    pub fn charts_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.charts_dir = dir;
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> Result<AnalysisConfig, ConfigError> {
        let config = AnalysisConfig {
            input: self.input.ok_or(ConfigError::MissingInput)?,
            head_rows: self.head_rows.unwrap_or(5),
            top_n: self.top_n.unwrap_or(10),
            sample_size: self.sample_size.unwrap_or(1000),
            seed: self.seed,
            render_charts: self.render_charts.unwrap_or(true),
            charts_dir: self.charts_dir,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnalysisConfig::builder().input("sales.csv").build().unwrap();
        assert_eq!(config.head_rows, 5);
        assert_eq!(config.top_n, 10);
        assert_eq!(config.sample_size, 1000);
        assert_eq!(config.seed, None);
        assert!(config.render_charts);
        assert!(config.charts_dir.is_none());
    }

    #[test]
    fn test_missing_input() {
        assert_eq!(
            AnalysisConfig::builder().build().unwrap_err(),
            ConfigError::MissingInput
        );
        assert_eq!(
            AnalysisConfig::builder().input("").build().unwrap_err(),
            ConfigError::MissingInput
        );
    }

    #[test]
    fn test_zero_values_rejected() {
        assert_eq!(
            AnalysisConfig::builder()
                .input("a.csv")
                .top_n(0)
                .build()
                .unwrap_err(),
            ConfigError::MustBePositive { field: "top_n" }
        );
        assert!(AnalysisConfig::builder()
            .input("a.csv")
            .sample_size(0)
            .build()
            .is_err());
    }

    #[test]
    fn test_round_trips_through_json() {
        let config = AnalysisConfig::builder()
            .input("a.csv")
            .seed(Some(7))
            .build()
            .unwrap();
        let json = serde_json::to_string(&config).unwrap();
        let back: AnalysisConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.seed, Some(7));
    }
}
