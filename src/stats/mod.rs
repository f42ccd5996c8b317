//! Statistics module - descriptive statistics and sales aggregates

mod aggregator;
mod calculator;

pub use aggregator::{GroupTotal, MonthlyTotal, RankBy, SalesAggregator, SalesTotals};
pub use calculator::{ColumnSummary, StatsCalculator};
