//! Data Processor Module
//! Handles schema validation and cleaning: required columns, mixed-format
//! order dates, numeric coercion and typed record extraction.

use crate::data::dates::{from_epoch_days, parse_mixed_date, to_epoch_days};
use crate::data::loader::is_numeric_dtype;
use crate::data::record::{
    SalesRecord, CATEGORY, DISCOUNT, ORDER_DATE, PROFIT, REQUIRED_COLUMNS, SALES, SUB_CATEGORY,
};
use polars::prelude::*;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Your dataset is missing the following required columns: {0:?}")]
    MissingColumns(Vec<String>),
    #[error("Error converting OrderDate: value '{value}' at row {row} does not match any known date format")]
    DateParseFailure { row: usize, value: String },
    #[error("Column '{column}' has a non-numeric value '{value}' at row {row}")]
    NonNumericValue {
        column: String,
        row: usize,
        value: String,
    },
    #[error("Column '{column}' has {count} missing value(s)")]
    MissingValues { column: String, count: usize },
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

impl ProcessorError {
    /// Follow-up guidance printed after the error itself.
    pub fn hint(&self) -> Option<String> {
        match self {
            ProcessorError::MissingColumns(_) => Some(format!(
                "Please ensure your file has the exact column names: {:?}\n\
                 The analysis cannot proceed without these columns.",
                REQUIRED_COLUMNS
            )),
            ProcessorError::DateParseFailure { .. } => Some(format!(
                "Hint: Your '{ORDER_DATE}' column may have multiple formats or a format that \
                 cannot be guessed.\nIf this error persists, inspect the file and rewrite the \
                 dates in one layout, e.g. all like '4/15/2017' or '2017-04-15'."
            )),
            ProcessorError::MissingValues { column, .. } => Some(format!(
                "Every row needs a value in '{column}'. Fill or remove the incomplete rows."
            )),
            _ => None,
        }
    }
}

/// Handles data validation and cleaning operations.
pub struct DataProcessor;

impl DataProcessor {
    /// Required column names absent from the frame, in required order.
    pub fn missing_columns(df: &DataFrame) -> Vec<String> {
        let present: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        REQUIRED_COLUMNS
            .iter()
            .filter(|name| !present.iter().any(|p| p == *name))
            .map(|name| name.to_string())
            .collect()
    }

    /// Fail unless every required column is present.
    pub fn validate_columns(df: &DataFrame) -> Result<(), ProcessorError> {
        let missing = Self::missing_columns(df);
        if missing.is_empty() {
            info!("Dataset contains all required columns");
            Ok(())
        } else {
            Err(ProcessorError::MissingColumns(missing))
        }
    }

    /// Fail on the first required column holding nulls.
    pub fn check_missing_values(df: &DataFrame) -> Result<(), ProcessorError> {
        for name in REQUIRED_COLUMNS {
            let count = df.column(name)?.null_count();
            if count > 0 {
                return Err(ProcessorError::MissingValues {
                    column: name.to_string(),
                    count,
                });
            }
        }
        Ok(())
    }

    /// Replace the OrderDate column with a polars `Date` column.
    ///
    /// String values go through mixed-format inference one by one; the first
    /// value that matches no layout aborts the whole conversion.
    pub fn normalize_dates(df: &mut DataFrame) -> Result<(), ProcessorError> {
        let column = df.column(ORDER_DATE)?;

        let normalized = match column.dtype() {
            DataType::Date => return Ok(()),
            DataType::Datetime(_, _) => column.cast(&DataType::Date)?,
            _ => {
                let as_text = column.cast(&DataType::String)?;
                let mut days: Vec<Option<i32>> = Vec::with_capacity(as_text.len());

                for (row, value) in as_text.str()?.into_iter().enumerate() {
                    match value {
                        Some(raw) => {
                            let date = parse_mixed_date(raw).ok_or_else(|| {
                                ProcessorError::DateParseFailure {
                                    row,
                                    value: raw.to_string(),
                                }
                            })?;
                            days.push(Some(to_epoch_days(date)));
                        }
                        None => days.push(None),
                    }
                }

                Series::new(ORDER_DATE.into(), days)
                    .cast(&DataType::Date)?
                    .into_column()
            }
        };

        df.with_column(normalized)?;
        debug!("Normalized {} order dates", df.height());
        Ok(())
    }

    /// Coerce a column to Float64, parsing currency-formatted text when needed.
    pub fn coerce_numeric(df: &mut DataFrame, name: &str) -> Result<(), ProcessorError> {
        let column = df.column(name)?;

        let coerced = if is_numeric_dtype(column.dtype()) {
            column.cast(&DataType::Float64)?
        } else {
            let as_text = column.cast(&DataType::String)?;
            let mut values: Vec<Option<f64>> = Vec::with_capacity(as_text.len());

            for (row, value) in as_text.str()?.into_iter().enumerate() {
                match value {
                    Some(raw) => {
                        let parsed =
                            parse_amount(raw).ok_or_else(|| ProcessorError::NonNumericValue {
                                column: name.to_string(),
                                row,
                                value: raw.to_string(),
                            })?;
                        values.push(Some(parsed));
                    }
                    None => values.push(None),
                }
            }

            Column::new(name.into(), values)
        };

        df.with_column(coerced)?;
        Ok(())
    }

    /// Cast a label column to String.
    fn coerce_text(df: &mut DataFrame, name: &str) -> Result<(), ProcessorError> {
        let column = df.column(name)?.cast(&DataType::String)?;
        df.with_column(column)?;
        Ok(())
    }

    /// Full cleaning pass: columns, nulls, dates, numbers, labels.
    pub fn clean(mut df: DataFrame) -> Result<DataFrame, ProcessorError> {
        Self::validate_columns(&df)?;
        Self::check_missing_values(&df)?;
        Self::normalize_dates(&mut df)?;

        for name in [SALES, PROFIT, DISCOUNT] {
            Self::coerce_numeric(&mut df, name)?;
        }
        for name in [CATEGORY, SUB_CATEGORY] {
            Self::coerce_text(&mut df, name)?;
        }

        let out_of_range = df
            .column(DISCOUNT)?
            .f64()?
            .into_iter()
            .flatten()
            .filter(|d| !(0.0..=1.0).contains(d))
            .count();
        if out_of_range > 0 {
            warn!(
                "{} row(s) have a {} outside [0, 1]; keeping them as-is",
                out_of_range, DISCOUNT
            );
        }

        Ok(df)
    }

    /// Extract typed records from a cleaned frame.
    pub fn to_records(df: &DataFrame) -> Result<Vec<SalesRecord>, ProcessorError> {
        Self::check_missing_values(df)?;

        let dates = df.column(ORDER_DATE)?.cast(&DataType::Int32)?;
        let dates = dates.i32()?;
        let sales = df.column(SALES)?.f64()?;
        let profit = df.column(PROFIT)?.f64()?;
        let discount = df.column(DISCOUNT)?.f64()?;
        let category = df.column(CATEGORY)?.str()?;
        let sub_category = df.column(SUB_CATEGORY)?.str()?;

        let missing = |column: &str| ProcessorError::MissingValues {
            column: column.to_string(),
            count: 1,
        };

        (0..df.height())
            .map(|i| -> Result<SalesRecord, ProcessorError> {
                let order_date = dates
                    .get(i)
                    .and_then(from_epoch_days)
                    .ok_or_else(|| missing(ORDER_DATE))?;
                Ok(SalesRecord {
                    order_date,
                    sales: sales.get(i).ok_or_else(|| missing(SALES))?,
                    profit: profit.get(i).ok_or_else(|| missing(PROFIT))?,
                    category: category
                        .get(i)
                        .ok_or_else(|| missing(CATEGORY))?
                        .to_string(),
                    sub_category: sub_category
                        .get(i)
                        .ok_or_else(|| missing(SUB_CATEGORY))?
                        .to_string(),
                    discount: discount.get(i).ok_or_else(|| missing(DISCOUNT))?,
                })
            })
            .collect()
    }
}

/// Parse a currency / percentage formatted amount.
///
/// Accepts `$1,234.50`, `-$3`, `(12.50)` (negative) and `20%` (0.2).
pub fn parse_amount(raw: &str) -> Option<f64> {
    let mut text = raw.trim();
    if text.is_empty() {
        return None;
    }

    let mut negative = false;
    if text.len() >= 2 && text.starts_with('(') && text.ends_with(')') {
        negative = true;
        text = &text[1..text.len() - 1];
    }

    let (text, percent) = match text.strip_suffix('%') {
        Some(rest) => (rest, true),
        None => (text, false),
    };

    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, '$' | '€' | '£' | ',' | ' ' | '\u{a0}'))
        .collect();

    let mut value: f64 = cleaned.parse().ok()?;
    if negative {
        value = -value;
    }
    if percent {
        value /= 100.0;
    }
    value.is_finite().then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_frame() -> DataFrame {
        df!(
            ORDER_DATE => ["4/15/2017", "2017-04-15", "2017-05-02"],
            SALES => [100.0, 200.0, 50.0],
            PROFIT => [20.0, 50.0, -5.0],
            CATEGORY => ["Furniture", "Technology", "Furniture"],
            SUB_CATEGORY => ["Chairs", "Phones", "Tables"],
            DISCOUNT => [0.0, 0.2, 0.5]
        )
        .unwrap()
    }

    #[test]
    fn test_missing_profit_is_reported_alone() {
        let df = sample_frame().drop(PROFIT).unwrap();
        assert_eq!(DataProcessor::missing_columns(&df), vec!["Profit".to_string()]);

        match DataProcessor::validate_columns(&df) {
            Err(ProcessorError::MissingColumns(missing)) => assert_eq!(missing, vec!["Profit"]),
            other => panic!("expected MissingColumns, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_columns_keep_required_order() {
        let df = df!("Other" => [1]).unwrap();
        assert_eq!(DataProcessor::missing_columns(&df), REQUIRED_COLUMNS.to_vec());
    }

    #[test]
    fn test_mixed_dates_normalize() {
        let cleaned = DataProcessor::clean(sample_frame()).unwrap();
        assert_eq!(cleaned.column(ORDER_DATE).unwrap().dtype(), &DataType::Date);

        let records = DataProcessor::to_records(&cleaned).unwrap();
        let april_15 = NaiveDate::from_ymd_opt(2017, 4, 15).unwrap();
        assert_eq!(records[0].order_date, april_15);
        assert_eq!(records[1].order_date, april_15);
        assert_eq!(records[2].sub_category, "Tables");
    }

    #[test]
    fn test_bad_date_aborts_with_row() {
        let mut df = sample_frame();
        df.with_column(Column::new(
            ORDER_DATE.into(),
            ["2017-04-15", "someday", "2017-05-02"],
        ))
        .unwrap();

        match DataProcessor::clean(df) {
            Err(ProcessorError::DateParseFailure { row, value }) => {
                assert_eq!(row, 1);
                assert_eq!(value, "someday");
            }
            other => panic!("expected DateParseFailure, got {:?}", other),
        }
    }

    #[test]
    fn test_null_in_required_column_aborts() {
        let mut df = sample_frame();
        df.with_column(Column::new(SALES.into(), [Some(1.0), None, Some(2.0)]))
            .unwrap();

        match DataProcessor::clean(df) {
            Err(ProcessorError::MissingValues { column, count }) => {
                assert_eq!(column, SALES);
                assert_eq!(count, 1);
            }
            other => panic!("expected MissingValues, got {:?}", other),
        }
    }

    #[test]
    fn test_currency_text_is_coerced() {
        let mut df = sample_frame();
        df.with_column(Column::new(
            SALES.into(),
            ["$1,000.50", "(20)", "7"],
        ))
        .unwrap();

        let cleaned = DataProcessor::clean(df).unwrap();
        let sales: Vec<f64> = cleaned
            .column(SALES)
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(sales, vec![1000.5, -20.0, 7.0]);
    }

    #[test]
    fn test_non_numeric_value_aborts() {
        let mut df = sample_frame();
        df.with_column(Column::new(PROFIT.into(), ["1", "n/a", "2"]))
            .unwrap();

        assert!(matches!(
            DataProcessor::clean(df),
            Err(ProcessorError::NonNumericValue { row: 1, .. })
        ));
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("$1,234.50"), Some(1234.5));
        assert_eq!(parse_amount("-$3"), Some(-3.0));
        assert_eq!(parse_amount("(12.50)"), Some(-12.5));
        assert_eq!(parse_amount("20%"), Some(0.2));
        assert_eq!(parse_amount(" 42 "), Some(42.0));
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount("NaN"), None);
    }

    #[test]
    fn test_hints() {
        assert!(ProcessorError::MissingColumns(vec!["Profit".into()])
            .hint()
            .unwrap()
            .contains("Sub-Category"));
        assert!(ProcessorError::DateParseFailure {
            row: 0,
            value: "x".into()
        }
        .hint()
        .unwrap()
        .starts_with("Hint:"));
    }
}
