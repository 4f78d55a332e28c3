use crate::classifier::CellValue;
use crate::error::GeocolumnError;
use csv::{ReaderBuilder, StringRecord};
use std::fs;
use std::path::{Path, PathBuf};

/// One non-empty value from the selected column
#[derive(Debug, Clone, PartialEq)]
pub struct InputRow {
    /// Field text exactly as read
    pub raw: String,
    pub value: CellValue,
    /// Position within the non-empty subset of the column (0-based)
    pub row_index: usize,
}

/// A loaded CSV file: header plus all data records
#[derive(Debug, Clone)]
pub struct CsvTable {
    path: PathBuf,
    headers: Vec<String>,
    records: Vec<StringRecord>,
}

impl CsvTable {
    /// Load a CSV file with a header row
    pub fn load(path: &Path) -> Result<Self, GeocolumnError> {
        let load_error = |reason: String| GeocolumnError::FileLoad {
            path: path.to_path_buf(),
            reason,
        };

        let bytes = fs::read(path).map_err(|e| load_error(e.to_string()))?;
        let table = Self::parse(path, &bytes).map_err(load_error)?;

        log::info!(
            "Loaded {} ({} columns, {} rows)",
            path.display(),
            table.headers.len(),
            table.records.len()
        );
        Ok(table)
    }

    fn parse(path: &Path, bytes: &[u8]) -> Result<Self, String> {
        // Spreadsheet exports often start with a UTF-8 BOM
        let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(bytes);

        let headers = dedupe_headers(
            reader
                .headers()
                .map_err(|e| format!("Failed to read CSV headers: {}", e))?
                .iter(),
        );

        if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
            return Err("CSV file has no header row".to_string());
        }

        let mut records = Vec::new();
        for (index, result) in reader.records().enumerate() {
            let record =
                result.map_err(|e| format!("Failed to parse CSV row {}: {}", index + 1, e))?;
            records.push(record);
        }

        Ok(Self {
            path: path.to_path_buf(),
            headers,
            records,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of data records (excluding the header)
    pub fn row_count(&self) -> usize {
        self.records.len()
    }

    /// Non-empty values of a column, in file order
    pub fn column_values(&self, column: &str) -> Result<Vec<InputRow>, GeocolumnError> {
        let position = self
            .headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| {
                GeocolumnError::Selection(format!("Column '{}' not found in CSV file", column))
            })?;

        let rows = self
            .records
            .iter()
            // Ragged rows: a missing trailing field reads as empty
            .map(|record| record.get(position).unwrap_or(""))
            .map(|raw| (raw, CellValue::from_field(raw)))
            .filter(|(_, value)| !value.is_empty())
            .enumerate()
            .map(|(row_index, (raw, value))| InputRow {
                raw: raw.to_string(),
                value,
                row_index,
            })
            .collect();

        Ok(rows)
    }
}

/// Rename repeated headers to `name.1`, `name.2`, ... so every column can be
/// selected by name
fn dedupe_headers<'a>(raw: impl Iterator<Item = &'a str>) -> Vec<String> {
    let raw: Vec<&str> = raw.collect();
    let mut headers: Vec<String> = Vec::with_capacity(raw.len());

    for (index, name) in raw.iter().enumerate() {
        let taken = |candidate: &str, headers: &[String]| {
            headers.iter().any(|h| h == candidate) || raw[index + 1..].iter().any(|r| *r == candidate)
        };

        if !headers.iter().any(|h| h == name) {
            headers.push(name.to_string());
            continue;
        }

        let mut suffix = 1;
        let mut candidate = format!("{}.{}", name, suffix);
        while taken(&candidate, &headers) {
            suffix += 1;
            candidate = format!("{}.{}", name, suffix);
        }
        log::debug!("Duplicate column '{}' renamed to '{}'", name, candidate);
        headers.push(candidate);
    }

    headers
}
