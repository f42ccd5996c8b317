//! Data module - file loading, validation and cleaning

pub mod dates;
mod loader;
mod processor;
mod record;

pub use loader::{numeric_columns, DataLoader, FileFormat, LoaderError, TextEncoding};
pub use processor::{parse_amount, DataProcessor, ProcessorError};
pub use record::{
    SalesRecord, CATEGORY, DISCOUNT, ORDER_DATE, PROFIT, REQUIRED_COLUMNS, SALES, SUB_CATEGORY,
};
