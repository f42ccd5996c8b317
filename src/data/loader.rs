//! Sales Data Loader Module
//! Handles CSV / XLSX loading into a Polars DataFrame, with a single
//! legacy-encoding retry for CSV files that are not valid UTF-8.

use calamine::{open_workbook_auto, Data, DataType as _, Reader};
use encoding_rs::WINDOWS_1252;
use polars::prelude::*;
use serde::Serialize;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("The file was not found at '{0}'")]
    FileNotFound(PathBuf),
    #[error("Unsupported file type for '{0}'. Please provide a .csv or .xlsx file")]
    UnsupportedExtension(PathBuf),
    #[error("Could not decode '{0}' as UTF-8 or Latin-1")]
    DecodeFailure(PathBuf),
    #[error("Failed to parse data: {0}")]
    ParseError(#[from] PolarsError),
    #[error("Failed to load spreadsheet: {0}")]
    SpreadsheetError(#[from] calamine::Error),
    #[error("Workbook '{0}' contains no worksheet with data")]
    EmptyWorkbook(PathBuf),
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),
    #[error("No data loaded")]
    NoData,
}

/// Supported input formats, chosen from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Xlsx,
}

impl FileFormat {
    /// Detect the format from the path extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(FileFormat::Csv),
            "xlsx" => Some(FileFormat::Xlsx),
            _ => None,
        }
    }
}

/// Text encoding that a CSV file was decoded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextEncoding {
    Utf8,
    Latin1,
    /// Spreadsheets carry typed cells, no text decoding involved.
    Binary,
}

/// Handles sales file loading with Polars.
pub struct DataLoader {
    df: Option<DataFrame>,
    encoding: Option<TextEncoding>,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    pub fn new() -> Self {
        Self {
            df: None,
            encoding: None,
        }
    }

    /// Load a `.csv` or `.xlsx` file, dispatching on the extension.
    pub fn load(&mut self, file_path: impl AsRef<Path>) -> Result<&DataFrame, LoaderError> {
        let path = file_path.as_ref();
        let format = FileFormat::from_path(path)
            .ok_or_else(|| LoaderError::UnsupportedExtension(path.to_path_buf()))?;

        let (df, encoding) = match format {
            FileFormat::Csv => Self::read_csv(path)?,
            FileFormat::Xlsx => (Self::read_xlsx(path)?, TextEncoding::Binary),
        };

        info!(
            "Loaded {} rows x {} columns from {}",
            df.height(),
            df.width(),
            path.display()
        );
        self.encoding = Some(encoding);
        self.df = Some(df);
        self.df.as_ref().ok_or(LoaderError::NoData)
    }

    /// Read a CSV file, retrying once with Latin-1 when UTF-8 decoding fails.
    fn read_csv(path: &Path) -> Result<(DataFrame, TextEncoding), LoaderError> {
        let bytes = std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => LoaderError::FileNotFound(path.to_path_buf()),
            _ => LoaderError::Io(e),
        })?;

        let (text, encoding) = Self::decode_text(bytes)
            .ok_or_else(|| LoaderError::DecodeFailure(path.to_path_buf()))?;

        let df = Self::parse_csv_text(text)?;
        Ok((df, encoding))
    }

    /// Decode raw bytes as UTF-8, falling back to a single-byte legacy encoding.
    ///
    /// The fallback is Windows-1252, the WHATWG meaning of `latin1`. It matches
    /// ISO-8859-1 except for 0x80..=0x9F, which map to printable characters
    /// (0x80 is `€`) instead of C1 control codes.
    pub fn decode_text(bytes: Vec<u8>) -> Option<(String, TextEncoding)> {
        match String::from_utf8(bytes) {
            Ok(text) => {
                let text = match text.strip_prefix('\u{feff}') {
                    Some(stripped) => stripped.to_string(),
                    None => text,
                };
                Some((text, TextEncoding::Utf8))
            }
            Err(err) => {
                warn!("UTF-8 decoding failed, trying 'latin1' encoding...");
                let bytes = err.into_bytes();
                WINDOWS_1252
                    .decode_without_bom_handling_and_without_replacement(&bytes)
                    .map(|text| (text.into_owned(), TextEncoding::Latin1))
            }
        }
    }

    /// Parse decoded CSV text. Schema inference scans every row so that a
    /// late decimal value does not break an integer-inferred column.
    pub fn parse_csv_text(text: String) -> Result<DataFrame, LoaderError> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(None)
            .into_reader_with_file_handle(Cursor::new(text.into_bytes()))
            .finish()?;
        Ok(df)
    }

    /// Read the first worksheet of an `.xlsx` workbook.
    fn read_xlsx(path: &Path) -> Result<DataFrame, LoaderError> {
        if !path.exists() {
            return Err(LoaderError::FileNotFound(path.to_path_buf()));
        }

        let mut workbook = open_workbook_auto(path)?;
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| LoaderError::EmptyWorkbook(path.to_path_buf()))?;
        debug!("Reading worksheet '{}'", sheet_name);

        let range = workbook.worksheet_range(&sheet_name)?;
        let mut rows = range.rows();
        let header = rows
            .next()
            .ok_or_else(|| LoaderError::EmptyWorkbook(path.to_path_buf()))?;
        let body: Vec<&[Data]> = rows.collect();
        let empty = Data::Empty;

        let columns: Vec<Column> = header
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let cells: Vec<&Data> = body
                    .iter()
                    .map(|row| row.get(idx).unwrap_or(&empty))
                    .collect();
                Self::cells_to_column(&Self::cell_text(name).unwrap_or_default(), &cells)
            })
            .collect();

        Ok(DataFrame::new(columns)?)
    }

    /// Build one column: Float64 when every non-empty cell is numeric, String otherwise.
    fn cells_to_column(name: &str, cells: &[&Data]) -> Column {
        let all_numeric = cells
            .iter()
            .all(|c| matches!(c, Data::Int(_) | Data::Float(_) | Data::Empty));

        if all_numeric {
            let values: Vec<Option<f64>> = cells
                .iter()
                .map(|c| match c {
                    Data::Int(v) => Some(*v as f64),
                    Data::Float(v) => Some(*v),
                    _ => None,
                })
                .collect();
            Column::new(name.into(), values)
        } else {
            let values: Vec<Option<String>> = cells.iter().map(|c| Self::cell_text(c)).collect();
            Column::new(name.into(), values)
        }
    }

    fn cell_text(cell: &Data) -> Option<String> {
        match cell {
            Data::Empty | Data::Error(_) => None,
            Data::String(s) => Some(s.clone()),
            Data::DateTime(_) => cell
                .as_datetime()
                .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string()),
            Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
            Data::Int(v) => Some(v.to_string()),
            Data::Float(v) => Some(v.to_string()),
            Data::Bool(v) => Some(v.to_string()),
        }
    }

    /// Get list of column names from loaded DataFrame.
    pub fn get_columns(&self) -> Vec<String> {
        self.df
            .as_ref()
            .map(|df| {
                df.get_column_names()
                    .iter()
                    .map(|s| s.to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Move the loaded DataFrame out of the loader.
    pub fn take_dataframe(&mut self) -> Result<DataFrame, LoaderError> {
        self.df.take().ok_or(LoaderError::NoData)
    }

    /// Encoding the last file was decoded with.
    pub fn get_encoding(&self) -> Option<TextEncoding> {
        self.encoding
    }
}

/// Names of the numeric columns of a frame, in column order.
pub fn numeric_columns(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|col| is_numeric_dtype(col.dtype()))
        .map(|col| col.name().to_string())
        .collect()
}

/// Integer and floating point dtypes.
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float32
            | DataType::Float64
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            FileFormat::from_path(Path::new("sales.csv")),
            Some(FileFormat::Csv)
        );
        assert_eq!(
            FileFormat::from_path(Path::new("Sales.XLSX")),
            Some(FileFormat::Xlsx)
        );
        assert_eq!(FileFormat::from_path(Path::new("sales.txt")), None);
        assert_eq!(FileFormat::from_path(Path::new("sales")), None);
    }

    #[test]
    fn test_unsupported_extension_is_checked_first() {
        let mut loader = DataLoader::new();
        let err = loader.load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, LoaderError::UnsupportedExtension(_)));
    }

    #[test]
    fn test_missing_csv_is_file_not_found() {
        let mut loader = DataLoader::new();
        let err = loader.load("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, LoaderError::FileNotFound(_)));
    }

    #[test]
    fn test_decode_utf8_strips_bom() {
        let (text, enc) = DataLoader::decode_text(b"\xef\xbb\xbfa,b\n1,2\n".to_vec()).unwrap();
        assert_eq!(enc, TextEncoding::Utf8);
        assert!(text.starts_with("a,b"));
    }

    #[test]
    fn test_decode_falls_back_to_latin1() {
        let (text, enc) = DataLoader::decode_text(b"name\nCaf\xe9\n".to_vec()).unwrap();
        assert_eq!(enc, TextEncoding::Latin1);
        assert_eq!(text, "name\nCaf\u{e9}\n");
    }

    #[test]
    fn test_latin1_fallback_maps_c1_range_like_windows_1252() {
        let (text, enc) = DataLoader::decode_text(b"price\n\x80 5\n".to_vec()).unwrap();
        assert_eq!(enc, TextEncoding::Latin1);
        assert_eq!(text, "price\n\u{20ac} 5\n");
    }

    #[test]
    fn test_parse_csv_text_infers_numeric() {
        let df = DataLoader::parse_csv_text("a,b\n1,x\n2.5,y\n".to_string()).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(numeric_columns(&df), vec!["a".to_string()]);
    }

    #[test]
    fn test_spreadsheet_cells_to_columns() {
        let numeric = [Data::Int(3), Data::Empty, Data::Float(1.5)];
        let refs: Vec<&Data> = numeric.iter().collect();
        let column = DataLoader::cells_to_column("Sales", &refs);
        assert_eq!(column.dtype(), &DataType::Float64);
        assert_eq!(column.null_count(), 1);

        let mixed = [Data::String("Chairs".into()), Data::Int(7)];
        let refs: Vec<&Data> = mixed.iter().collect();
        let column = DataLoader::cells_to_column("Sub-Category", &refs);
        assert_eq!(column.dtype(), &DataType::String);
        assert_eq!(column.str().unwrap().get(1), Some("7"));
    }
}
