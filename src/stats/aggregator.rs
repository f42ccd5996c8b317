//! Sales Aggregator Module
//! Totals, monthly resampling, group-by rankings and the scatter sample.

use crate::data::{SalesRecord, PROFIT, SALES};
use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;
use serde::Serialize;
use std::collections::BTreeMap;

/// Overall sales, profit and margin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SalesTotals {
    pub total_sales: f64,
    pub total_profit: f64,
    /// Profit as a percentage of sales; `None` when there were no sales.
    pub profit_margin: Option<f64>,
}

/// Sums for one calendar month, labelled by its last day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTotal {
    pub month_end: NaiveDate,
    pub sales: f64,
    pub profit: f64,
}

/// Sales and profit sums for one group key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupTotal {
    pub name: String,
    pub sales: f64,
    pub profit: f64,
}

/// Which measure a ranking orders by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankBy {
    /// Highest sales first.
    SalesDescending,
    /// Lowest (most negative) profit first.
    ProfitAscending,
}

/// Handles the aggregate computations over a cleaned dataset.
pub struct SalesAggregator;

impl SalesAggregator {
    /// Sum Sales and Profit and derive the margin.
    pub fn totals(df: &DataFrame) -> PolarsResult<SalesTotals> {
        let total_sales = df.column(SALES)?.f64()?.sum().unwrap_or(0.0);
        let total_profit = df.column(PROFIT)?.f64()?.sum().unwrap_or(0.0);
        Ok(Self::totals_from_sums(total_sales, total_profit))
    }

    fn totals_from_sums(total_sales: f64, total_profit: f64) -> SalesTotals {
        let profit_margin = if total_sales != 0.0 {
            Some(total_profit / total_sales * 100.0)
        } else {
            None
        };

        SalesTotals {
            total_sales,
            total_profit,
            profit_margin,
        }
    }

    /// Bucket records into calendar months and sum each bucket.
    ///
    /// Every month between the first and the last order is present, with zero
    /// sums for months without orders.
    pub fn monthly(records: &[SalesRecord]) -> Vec<MonthlyTotal> {
        let mut buckets: BTreeMap<(i32, u32), (f64, f64)> = BTreeMap::new();
        for record in records {
            let key = (record.order_date.year(), record.order_date.month());
            let entry = buckets.entry(key).or_insert((0.0, 0.0));
            entry.0 += record.sales;
            entry.1 += record.profit;
        }

        let (Some(&first), Some(&last)) = (buckets.keys().next(), buckets.keys().next_back())
        else {
            return Vec::new();
        };

        let mut result = Vec::new();
        let mut current = first;
        while current <= last {
            let (sales, profit) = buckets.get(&current).copied().unwrap_or((0.0, 0.0));
            if let Some(month_end) = month_end(current.0, current.1) {
                result.push(MonthlyTotal {
                    month_end,
                    sales,
                    profit,
                });
            }
            current = next_month(current);
        }
        result
    }

    /// Sum Sales and Profit per value of `column`, ordered by Sales descending.
    pub fn by_group(df: &DataFrame, column: &str) -> PolarsResult<Vec<GroupTotal>> {
        Self::ranked(df, column, RankBy::SalesDescending, None)
    }

    /// The `n` groups with the highest sales.
    pub fn top_by_sales(df: &DataFrame, column: &str, n: usize) -> PolarsResult<Vec<GroupTotal>> {
        Self::ranked(df, column, RankBy::SalesDescending, Some(n))
    }

    /// The `n` groups with the lowest profit.
    pub fn bottom_by_profit(
        df: &DataFrame,
        column: &str,
        n: usize,
    ) -> PolarsResult<Vec<GroupTotal>> {
        Self::ranked(df, column, RankBy::ProfitAscending, Some(n))
    }

    /// Group, sum, sort and optionally truncate. Ties are broken by group name.
    pub fn ranked(
        df: &DataFrame,
        column: &str,
        rank_by: RankBy,
        limit: Option<usize>,
    ) -> PolarsResult<Vec<GroupTotal>> {
        let (sort_key, descending) = match rank_by {
            RankBy::SalesDescending => (SALES, true),
            RankBy::ProfitAscending => (PROFIT, false),
        };

        let mut lazy = df
            .clone()
            .lazy()
            .group_by([col(column)])
            .agg([col(SALES).sum(), col(PROFIT).sum()])
            .sort_by_exprs(
                vec![col(sort_key), col(column)],
                SortMultipleOptions::default().with_order_descending_multi([descending, false]),
            );
        if let Some(n) = limit {
            // Limits past the index width keep every group
            lazy = lazy.limit(IdxSize::try_from(n).unwrap_or(IdxSize::MAX));
        }
        let grouped = lazy.collect()?;

        let names = grouped.column(column)?.cast(&DataType::String)?;
        let names = names.str()?;
        let sales = grouped.column(SALES)?.f64()?;
        let profit = grouped.column(PROFIT)?.f64()?;

        Ok(names
            .into_iter()
            .zip(sales.into_iter())
            .zip(profit.into_iter())
            .map(|((name, sales), profit)| GroupTotal {
                name: name.unwrap_or_default().to_string(),
                sales: sales.unwrap_or(0.0),
                profit: profit.unwrap_or(0.0),
            })
            .collect())
    }

    /// Draw `min(size, records.len())` records without replacement.
    ///
    /// With a seed the draw is reproducible; without one it is seeded from
    /// OS entropy and differs between runs.
    pub fn sample(records: &[SalesRecord], size: usize, seed: Option<u64>) -> Vec<SalesRecord> {
        let amount = size.min(records.len());
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut picked: Vec<usize> = index::sample(&mut rng, records.len(), amount).into_vec();
        picked.sort_unstable();
        picked.into_iter().map(|i| records[i].clone()).collect()
    }
}

/// Last calendar day of the given month.
fn month_end(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = next_month((year, month));
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

fn next_month((year, month): (i32, u32)) -> (i32, u32) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}
