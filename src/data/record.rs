//! Sales record model and the column names the analysis depends on.

use chrono::NaiveDate;
use serde::Serialize;

pub const ORDER_DATE: &str = "OrderDate";
pub const SALES: &str = "Sales";
pub const PROFIT: &str = "Profit";
pub const CATEGORY: &str = "Category";
pub const SUB_CATEGORY: &str = "Sub-Category";
pub const DISCOUNT: &str = "Discount";

/// Columns every input file must provide, exact names, in report order.
pub const REQUIRED_COLUMNS: [&str; 6] = [ORDER_DATE, SALES, PROFIT, CATEGORY, SUB_CATEGORY, DISCOUNT];

/// One cleaned row of the dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesRecord {
    pub order_date: NaiveDate,
    pub sales: f64,
    pub profit: f64,
    pub category: String,
    pub sub_category: String,
    pub discount: f64,
}
