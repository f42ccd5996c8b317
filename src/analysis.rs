//! Sales Analysis Runner
//! Runs load → validate → explore → clean → aggregate → chart for one file.

use crate::charts::{ChartError, Figure, StaticChartRenderer};
use crate::config::{AnalysisConfig, ConfigError};
use crate::data::{
    DataLoader, DataProcessor, LoaderError, ProcessorError, SalesRecord, TextEncoding, CATEGORY,
    SUB_CATEGORY,
};
use crate::report::{AnalysisReport, ConsoleReporter};
use crate::stats::{GroupTotal, MonthlyTotal, SalesAggregator, StatsCalculator};
use polars::prelude::*;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Load(#[from] LoaderError),
    #[error(transparent)]
    Process(#[from] ProcessorError),
    #[error("Aggregation failed: {0}")]
    Aggregate(#[from] PolarsError),
}

impl AnalysisError {
    /// Follow-up guidance printed after the error itself.
    pub fn hint(&self) -> Option<String> {
        match self {
            AnalysisError::Load(LoaderError::FileNotFound(_)) => {
                Some("Please check the path and try again.".to_string())
            }
            AnalysisError::Process(err) => err.hint(),
            _ => None,
        }
    }
}

/// Result of a completed run.
pub struct AnalysisOutcome {
    pub report: AnalysisReport,
    pub figures: Vec<Figure>,
}

/// Drives a single analysis run from a validated configuration.
pub struct SalesAnalysis {
    config: AnalysisConfig,
}

impl SalesAnalysis {
    pub fn new(config: AnalysisConfig) -> Result<Self, AnalysisError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Run the whole analysis. With a console reporter, the preview and the
    /// result tables are printed as each stage completes.
    pub fn run(&self, console: Option<&ConsoleReporter>) -> Result<AnalysisOutcome, AnalysisError> {
        let config = &self.config;

        let mut loader = DataLoader::new();
        loader.load(&config.input)?;
        let encoding = loader.get_encoding().unwrap_or(TextEncoding::Utf8);
        let columns = loader.get_columns();
        let df = loader.take_dataframe()?;
        if let Some(console) = console {
            console.print_loaded(&config.input);
        }

        DataProcessor::validate_columns(&df)?;

        let summary = StatsCalculator::describe(&df);
        if let Some(console) = console {
            console.print_overview(&df, &summary);
        }

        let cleaned = DataProcessor::clean(df)?;
        let records = DataProcessor::to_records(&cleaned)?;
        info!("Cleaned {} records", records.len());

        let totals = SalesAggregator::totals(&cleaned)?;
        let monthly = SalesAggregator::monthly(&records);
        let categories = SalesAggregator::by_group(&cleaned, CATEGORY)?;
        let top = SalesAggregator::top_by_sales(&cleaned, SUB_CATEGORY, config.top_n)?;
        let bottom = SalesAggregator::bottom_by_profit(&cleaned, SUB_CATEGORY, config.top_n)?;
        let sample = SalesAggregator::sample(&records, config.sample_size, config.seed);
        debug!(
            "{} months, {} categories, {} sampled orders",
            monthly.len(),
            categories.len(),
            sample.len()
        );

        let figures = if config.render_charts {
            Self::render_figures(&monthly, &categories, &top, &bottom, &sample)
        } else {
            Vec::new()
        };
        let saved_charts = match &config.charts_dir {
            Some(dir) => Self::save_figures(&figures, dir),
            None => Vec::new(),
        };

        let report = AnalysisReport {
            source: config.input.clone(),
            encoding,
            rows: records.len(),
            columns,
            summary,
            totals,
            monthly,
            categories,
            top_subcategories: top,
            bottom_subcategories: bottom,
            scatter_sample_size: sample.len(),
            charts: figures.iter().map(|f| f.title.clone()).collect(),
            saved_charts,
        };

        if let Some(console) = console {
            console.print_results(&report);
        }

        Ok(AnalysisOutcome { report, figures })
    }

    /// Render every chart; one that fails is logged and skipped.
    pub fn render_figures(
        monthly: &[MonthlyTotal],
        categories: &[GroupTotal],
        top: &[GroupTotal],
        bottom: &[GroupTotal],
        sample: &[SalesRecord],
    ) -> Vec<Figure> {
        let attempts: [(&str, Result<Figure, ChartError>); 5] = [
            (
                "Sales & Profit Over Time",
                StaticChartRenderer::monthly_trend(monthly),
            ),
            (
                "Performance by Category",
                StaticChartRenderer::category_performance(categories),
            ),
            (
                "Top Sub-Categories by Sales",
                StaticChartRenderer::top_subcategories(top),
            ),
            (
                "Bottom Sub-Categories by Profit",
                StaticChartRenderer::bottom_subcategories(bottom),
            ),
            (
                "Discount vs. Profit",
                StaticChartRenderer::discount_vs_profit(sample),
            ),
        ];

        attempts
            .into_iter()
            .filter_map(|(name, result)| match result {
                Ok(figure) => {
                    info!("Generated {} plot", name);
                    Some(figure)
                }
                Err(err) => {
                    warn!("Skipping {} plot: {}", name, err);
                    None
                }
            })
            .collect()
    }

    /// Save figures as PNG; failures are logged and skipped.
    pub fn save_figures(figures: &[Figure], dir: &std::path::Path) -> Vec<PathBuf> {
        figures
            .iter()
            .filter_map(|figure| match figure.save(dir) {
                Ok(path) => {
                    info!("Saved {}", path.display());
                    Some(path)
                }
                Err(err) => {
                    warn!("Could not save '{}': {}", figure.title, err);
                    None
                }
            })
            .collect()
    }
}
