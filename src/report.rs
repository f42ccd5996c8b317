//! Console and JSON reporting of the analysis results.

use crate::data::TextEncoding;
use crate::stats::{ColumnSummary, GroupTotal, MonthlyTotal, SalesTotals};
use polars::prelude::*;
use serde::Serialize;
use std::fmt::Write as _;
use std::path::PathBuf;

/// Everything the analysis computed, serializable for `--json` output.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub source: PathBuf,
    pub encoding: TextEncoding,
    pub rows: usize,
    pub columns: Vec<String>,
    pub summary: Vec<ColumnSummary>,
    pub totals: SalesTotals,
    pub monthly: Vec<MonthlyTotal>,
    pub categories: Vec<GroupTotal>,
    pub top_subcategories: Vec<GroupTotal>,
    pub bottom_subcategories: Vec<GroupTotal>,
    pub scatter_sample_size: usize,
    pub charts: Vec<String>,
    pub saved_charts: Vec<PathBuf>,
}

impl AnalysisReport {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Prints human-readable tables to stdout.
pub struct ConsoleReporter {
    head_rows: usize,
}

impl ConsoleReporter {
    pub fn new(head_rows: usize) -> Self {
        Self { head_rows }
    }

    pub fn print_loaded(&self, source: &std::path::Path) {
        println!("Successfully loaded data from {}.\n", source.display());
    }

    /// Preview rows, column info and descriptive statistics.
    pub fn print_overview(&self, df: &DataFrame, summary: &[ColumnSummary]) {
        println!("--- Data Exploration ---");
        println!("First {} rows of the data:", self.head_rows);
        println!("{}", df.head(Some(self.head_rows)));
        println!("\nData Information (Types, Nulls):");
        print!("{}", info_table(df));
        println!("\nSummary Statistics:");
        print!("{}", describe_table(summary));
        println!("--------------------------\n");
    }

    /// Totals, group tables and the closing insights.
    pub fn print_results(&self, report: &AnalysisReport) {
        println!("--- Starting Analysis & Visualization ---");
        println!("\nTotal Sales: {}", format_currency(report.totals.total_sales));
        println!("Total Profit: {}", format_currency(report.totals.total_profit));
        println!(
            "Overall Profit Margin: {}",
            format_margin(report.totals.profit_margin)
        );

        println!("\nPerformance by Category:");
        print!("{}", group_table("Category", &report.categories));

        println!(
            "\nTop {} Sub-Categories by Sales:",
            report.top_subcategories.len()
        );
        print!("{}", group_table("Sub-Category", &report.top_subcategories));

        println!(
            "\nBottom {} Sub-Categories by Profit (Potential Loss-makers):",
            report.bottom_subcategories.len()
        );
        print!("{}", group_table("Sub-Category", &report.bottom_subcategories));

        if !report.charts.is_empty() {
            println!("\nCharts rendered: {}", report.charts.join(", "));
        }
        for path in &report.saved_charts {
            println!("  saved {}", path.display());
        }

        println!("\n--- Analysis Complete ---");
        println!("Actionable Insights:");
        println!("1. Review the 'Monthly Sales and Profit' plot for seasonality or trends.");
        println!("2. Check 'Performance by Category' to see which categories drive the most revenue vs. profit.");
        println!("3. Examine 'Bottom Sub-Categories by Profit' to identify products that may need repricing, cost reduction, or discontinuation.");
        println!("4. Use the 'Profit vs. Discount' plot to see if high discounts are negatively impacting profitability, especially for specific categories.");
    }
}

/// Format an amount as `$1,234.56` (negative amounts as `-$1,234.56`).
pub fn format_currency(amount: f64) -> String {
    if !amount.is_finite() {
        return amount.to_string();
    }
    let cents = (amount.abs() * 100.0).round() as u128;
    let whole = (cents / 100).to_string();
    let frac = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${grouped}.{frac:02}")
}

/// Format a margin as `23.33%`, or `n/a` when undefined.
pub fn format_margin(margin: Option<f64>) -> String {
    match margin {
        Some(m) => format!("{m:.2}%"),
        None => "n/a".to_string(),
    }
}

/// Name / Sales / Profit table.
pub fn group_table(key: &str, groups: &[GroupTotal]) -> String {
    let width = groups
        .iter()
        .map(|g| g.name.chars().count())
        .chain(std::iter::once(key.len()))
        .max()
        .unwrap_or(key.len());

    let mut out = String::new();
    let _ = writeln!(out, "{:<width$}  {:>14}  {:>14}", key, "Sales", "Profit");
    for g in groups {
        let _ = writeln!(
            out,
            "{:<width$}  {:>14.2}  {:>14.2}",
            g.name, g.sales, g.profit
        );
    }
    out
}

/// Column name, non-null count and dtype for each column.
pub fn info_table(df: &DataFrame) -> String {
    let width = df
        .get_column_names()
        .iter()
        .map(|n| n.chars().count())
        .max()
        .unwrap_or(6)
        .max(6);

    let mut out = String::new();
    let _ = writeln!(out, "{} entries, {} columns", df.height(), df.width());
    let _ = writeln!(out, " #  {:<width$}  {:>14}  Dtype", "Column", "Non-Null Count");
    for (idx, column) in df.get_columns().iter().enumerate() {
        let non_null = column.len() - column.null_count();
        let _ = writeln!(
            out,
            "{:>2}  {:<width$}  {:>14}  {}",
            idx,
            column.name().as_str(),
            format!("{non_null} non-null"),
            column.dtype()
        );
    }
    out
}

/// `describe()`-style table: one column per numeric field.
pub fn describe_table(summary: &[ColumnSummary]) -> String {
    let mut out = String::new();
    if summary.is_empty() {
        out.push_str("(no numeric columns)\n");
        return out;
    }

    let _ = write!(out, "{:<6}", "");
    for s in summary {
        let _ = write!(out, "  {:>12}", s.name);
    }
    out.push('\n');

    let rows: [(&str, fn(&ColumnSummary) -> f64); 8] = [
        ("count", |s| s.count as f64),
        ("mean", |s| s.mean),
        ("std", |s| s.std),
        ("min", |s| s.min),
        ("25%", |s| s.p25),
        ("50%", |s| s.median),
        ("75%", |s| s.p75),
        ("max", |s| s.max),
    ];
    for (label, value) in rows {
        let _ = write!(out, "{:<6}", label);
        for s in summary {
            let _ = write!(out, "  {:>12.4}", value(s));
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(300.0), "$300.00");
        assert_eq!(format_currency(1234567.891), "$1,234,567.89");
        assert_eq!(format_currency(-70.5), "-$70.50");
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(-0.001), "$0.00");
    }

    #[test]
    fn test_format_margin() {
        assert_eq!(format_margin(Some(70.0 / 300.0 * 100.0)), "23.33%");
        assert_eq!(format_margin(None), "n/a");
    }

    #[test]
    fn test_group_table_layout() {
        let table = group_table(
            "Category",
            &[GroupTotal {
                name: "Office Supplies".into(),
                sales: 1500.0,
                profit: -20.25,
            }],
        );
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Category"));
        assert!(lines[1].starts_with("Office Supplies"));
        assert!(lines[1].ends_with("-20.25"));
    }

    #[test]
    fn test_info_table_counts_nulls() {
        let df = df!("Sales" => [Some(1.0), None], "Category" => ["A", "B"]).unwrap();
        let info = info_table(&df);
        assert!(info.starts_with("2 entries, 2 columns"));
        assert!(info.contains("1 non-null"));
        assert!(info.contains("2 non-null"));

        let lines: Vec<&str> = info.lines().collect();
        let header_end = lines[1].find("Non-Null Count").unwrap() + "Non-Null Count".len();
        let row_end = lines[2].find("non-null").unwrap() + "non-null".len();
        assert_eq!(header_end, row_end);
    }

    #[test]
    fn test_describe_table_rows() {
        let summary = vec![ColumnSummary {
            name: "Sales".into(),
            count: 2,
            mean: 150.0,
            std: 70.7107,
            min: 100.0,
            p25: 125.0,
            median: 150.0,
            p75: 175.0,
            max: 200.0,
        }];
        let table = describe_table(&summary);
        assert_eq!(table.lines().count(), 9);
        assert!(table.contains("Sales"));
        assert!(table.lines().nth(1).unwrap().starts_with("count"));
        assert!(describe_table(&[]).contains("no numeric columns"));
    }
}
