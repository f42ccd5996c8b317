//! Statistics Calculator Module
//! Handles descriptive statistics for the numeric columns of a dataset.

use crate::data::numeric_columns;
use polars::prelude::*;
use serde::Serialize;
use statrs::statistics::Statistics;

/// Descriptive statistics for a single numeric column.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnSummary {
    pub name: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub p25: f64,
    pub median: f64,
    pub p75: f64,
    pub max: f64,
}

impl Default for ColumnSummary {
    fn default() -> Self {
        Self {
            name: String::new(),
            count: 0,
            mean: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            p25: f64::NAN,
            median: f64::NAN,
            p75: f64::NAN,
            max: f64::NAN,
        }
    }
}

/// Handles statistical calculations.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Compute descriptive statistics for an array of values.
    ///
    /// NaN values are ignored, matching how nulls are skipped.
    pub fn compute_descriptive_stats(values: &[f64]) -> ColumnSummary {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        let n = sorted.len();
        if n == 0 {
            return ColumnSummary::default();
        }
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        // Sample standard deviation (n - 1); a single value has none
        let std = if n > 1 {
            sorted.iter().std_dev()
        } else {
            f64::NAN
        };

        ColumnSummary {
            name: String::new(),
            count: n,
            mean: sorted.iter().mean(),
            std,
            min: sorted[0],
            p25: Self::percentile(&sorted, 25.0),
            median: Self::percentile(&sorted, 50.0),
            p75: Self::percentile(&sorted, 75.0),
            max: sorted[n - 1],
        }
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    pub fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    /// Non-null values of a column as f64.
    pub fn column_values(df: &DataFrame, name: &str) -> Vec<f64> {
        df.column(name)
            .ok()
            .and_then(|col| col.cast(&DataType::Float64).ok())
            .map(|col| {
                col.f64()
                    .ok()
                    .map(|ca| ca.into_iter().flatten().collect())
                    .unwrap_or_default()
            })
            .unwrap_or_default()
    }

    /// Describe every numeric column of the frame, in column order.
    pub fn describe(df: &DataFrame) -> Vec<ColumnSummary> {
        numeric_columns(df)
            .into_iter()
            .map(|name| {
                let mut summary = Self::compute_descriptive_stats(&Self::column_values(df, &name));
                summary.name = name;
                summary
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptive_stats() {
        let stats = StatsCalculator::compute_descriptive_stats(&[4.0, 1.0, 3.0, 2.0]);
        assert_eq!(stats.count, 4);
        assert!((stats.mean - 2.5).abs() < 1e-12);
        assert!((stats.std - 1.290_994_448_735_805_6).abs() < 1e-9);
        assert_eq!(stats.min, 1.0);
        assert!((stats.p25 - 1.75).abs() < 1e-12);
        assert!((stats.median - 2.5).abs() < 1e-12);
        assert!((stats.p75 - 3.25).abs() < 1e-12);
        assert_eq!(stats.max, 4.0);
    }

    #[test]
    fn test_empty_and_single() {
        assert_eq!(StatsCalculator::compute_descriptive_stats(&[]).count, 0);

        let single = StatsCalculator::compute_descriptive_stats(&[7.0]);
        assert_eq!(single.count, 1);
        assert_eq!(single.median, 7.0);
        assert!(single.std.is_nan());
    }

    #[test]
    fn test_describe_skips_text_columns() {
        let df = df!(
            "Sales" => [100.0, 200.0],
            "Category" => ["A", "B"],
            "Quantity" => [1i64, 3]
        )
        .unwrap();

        let summaries = StatsCalculator::describe(&df);
        let names: Vec<&str> = summaries.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Sales", "Quantity"]);
        assert_eq!(summaries[1].mean, 2.0);
    }
}
