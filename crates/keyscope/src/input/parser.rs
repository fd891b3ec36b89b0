//! CSV/TSV parser with delimiter detection and typed cell parsing.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::dataset::{Dataset, Value};
use crate::error::{KeyscopeError, Result};

use super::SourceMetadata;

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Parser configuration.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Delimiter to use (None = auto-detect).
    pub delimiter: Option<u8>,
    /// Whether the file has a header row.
    pub has_header: bool,
    /// Maximum rows to load (None = all).
    pub max_rows: Option<usize>,
    /// Quote character.
    pub quote: u8,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            has_header: true,
            max_rows: None,
            quote: b'"',
        }
    }
}

/// Parses delimited text files into typed datasets.
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    /// Create a new parser with default configuration.
    pub fn new() -> Self {
        Self {
            config: ParserConfig::default(),
        }
    }

    /// Create a parser with custom configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Parse a file and return the dataset and source metadata.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<(Dataset, SourceMetadata)> {
        let path = path.as_ref();

        let mut file = File::open(path).map_err(|e| KeyscopeError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut contents = Vec::new();
        file.read_to_end(&mut contents).map_err(|e| KeyscopeError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let size_bytes = contents.len() as u64;

        let mut hasher = Sha256::new();
        hasher.update(&contents);
        let hash = format!("sha256:{:x}", hasher.finalize());

        let delimiter = match self.config.delimiter {
            Some(d) => d,
            None => detect_delimiter(&contents)?,
        };

        let dataset = self.parse_bytes(&contents, delimiter)?;

        let format = match delimiter {
            b'\t' => "tsv",
            b',' => "csv",
            b';' => "csv-semicolon",
            b'|' => "psv",
            _ => "delimited",
        }
        .to_string();

        let metadata = SourceMetadata::new(
            path.to_path_buf(),
            hash,
            size_bytes,
            format,
            dataset.row_count(),
            dataset.column_count(),
        );

        Ok((dataset, metadata))
    }

    /// Parse bytes directly with a known delimiter.
    pub fn parse_bytes(&self, bytes: &[u8], delimiter: u8) -> Result<Dataset> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(self.config.has_header)
            .quote(self.config.quote)
            .flexible(true)
            .from_reader(bytes);

        let columns: Vec<String> = if self.config.has_header {
            reader.headers()?.iter().map(|s| s.to_string()).collect()
        } else {
            match reader.records().next() {
                Some(Ok(record)) => (0..record.len())
                    .map(|i| format!("column_{}", i + 1))
                    .collect(),
                Some(Err(e)) => return Err(e.into()),
                None => return Err(KeyscopeError::EmptyData("No data rows found".to_string())),
            }
        };

        if columns.is_empty() {
            return Err(KeyscopeError::EmptyData("No columns found".to_string()));
        }

        // Re-create the reader: the first pass may have consumed records
        // while probing for headers.
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(self.config.has_header)
            .quote(self.config.quote)
            .flexible(true)
            .from_reader(bytes);

        let expected_cols = columns.len();
        let mut rows = Vec::new();

        for (row_idx, result) in reader.records().enumerate() {
            if let Some(max) = self.config.max_rows {
                if row_idx >= max {
                    break;
                }
            }

            let record = result?;
            let mut row: Vec<Value> = record.iter().map(parse_cell).collect();

            // Short rows are padded with nulls, long rows truncated, so the
            // dataset invariant (one value per declared column) holds.
            while row.len() < expected_cols {
                row.push(Value::Null);
            }
            row.truncate(expected_cols);

            rows.push(row);
        }

        if rows.is_empty() {
            return Err(KeyscopeError::EmptyData("No data rows found".to_string()));
        }

        Dataset::new(columns, rows)
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// Check if a raw cell represents a missing/null value.
pub fn is_null_marker(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("na")
        || trimmed.eq_ignore_ascii_case("n/a")
        || trimmed.eq_ignore_ascii_case("null")
        || trimmed.eq_ignore_ascii_case("none")
        || trimmed.eq_ignore_ascii_case("nil")
        || trimmed == "."
        || trimmed == "-"
}

/// Parse a raw cell into a tagged scalar.
///
/// This is a loader-side representation choice, not engine type inference:
/// the engine treats every variant uniformly.
pub fn parse_cell(raw: &str) -> Value {
    if is_null_marker(raw) {
        return Value::Null;
    }

    let trimmed = raw.trim();

    match trimmed.to_ascii_lowercase().as_str() {
        "true" | "yes" => return Value::Boolean(true),
        "false" | "no" => return Value::Boolean(false),
        _ => {}
    }

    if let Ok(i) = trimmed.parse::<i64>() {
        return Value::Integer(i);
    }

    if let Ok(f) = trimmed.parse::<f64>() {
        return Value::Float(f);
    }

    Value::Text(raw.to_string())
}

/// Detect the delimiter by analyzing the first few lines.
fn detect_delimiter(bytes: &[u8]) -> Result<u8> {
    let text = String::from_utf8_lossy(bytes);
    let lines: Vec<&str> = text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .take(10)
        .collect();

    if lines.is_empty() {
        return Err(KeyscopeError::EmptyData("No lines to analyze".to_string()));
    }

    let mut best_delimiter = b',';
    let mut best_score = 0usize;

    for &delim in DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_delimiter_in_line(line, delim))
            .collect();

        let first_count = counts[0];
        if first_count == 0 {
            continue;
        }

        // A delimiter that appears the same number of times on every line is
        // almost certainly the real one. Tabs get a slight bonus, being rare
        // inside actual field data.
        let consistent = counts.iter().all(|&c| c == first_count);
        let score = if consistent {
            first_count * 1000 + if delim == b'\t' { 100 } else { 0 }
        } else {
            first_count
        };

        if score > best_score {
            best_score = score;
            best_delimiter = delim;
        }
    }

    Ok(best_delimiter)
}

/// Count delimiter occurrences in a line, respecting quotes.
fn count_delimiter_in_line(line: &str, delimiter: u8) -> usize {
    let delim_char = delimiter as char;
    let mut count = 0;
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c == delim_char && !in_quotes => count += 1,
            _ => {}
        }
    }

    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_delimiter_csv() {
        let data = b"a,b,c\n1,2,3\n4,5,6";
        assert_eq!(detect_delimiter(data).unwrap(), b',');
    }

    #[test]
    fn test_detect_delimiter_tsv() {
        let data = b"a\tb\tc\n1\t2\t3\n4\t5\t6";
        assert_eq!(detect_delimiter(data).unwrap(), b'\t');
    }

    #[test]
    fn test_parse_cell_types() {
        assert_eq!(parse_cell("42"), Value::Integer(42));
        assert_eq!(parse_cell("3.5"), Value::Float(3.5));
        assert_eq!(parse_cell("true"), Value::Boolean(true));
        assert_eq!(parse_cell("NO"), Value::Boolean(false));
        assert_eq!(parse_cell("hello"), Value::Text("hello".to_string()));
        assert_eq!(parse_cell(""), Value::Null);
        assert_eq!(parse_cell("N/A"), Value::Null);
        assert_eq!(parse_cell("."), Value::Null);
    }

    #[test]
    fn test_parse_typed_rows() {
        let parser = Parser::new();
        let data = b"name,age,score\nAlice,30,1.5\nBob,NA,2.0";
        let ds = parser.parse_bytes(data, b',').unwrap();

        assert_eq!(ds.column_names(), &["name", "age", "score"]);
        assert_eq!(ds.row_count(), 2);
        assert_eq!(ds.value(0, "age").unwrap(), &Value::Integer(30));
        assert_eq!(ds.value(1, "age").unwrap(), &Value::Null);
        assert_eq!(ds.value(1, "score").unwrap(), &Value::Float(2.0));
    }

    #[test]
    fn test_short_rows_padded_with_null() {
        let parser = Parser::new();
        let data = b"a,b,c\n1,2\n4,5,6";
        let ds = parser.parse_bytes(data, b',').unwrap();

        assert_eq!(ds.value(0, "c").unwrap(), &Value::Null);
        assert_eq!(ds.value(1, "c").unwrap(), &Value::Integer(6));
    }

    #[test]
    fn test_max_rows_cap() {
        let config = ParserConfig {
            max_rows: Some(2),
            ..ParserConfig::default()
        };
        let parser = Parser::with_config(config);
        let data = b"a\n1\n2\n3\n4";
        let ds = parser.parse_bytes(data, b',').unwrap();
        assert_eq!(ds.row_count(), 2);
    }

    #[test]
    fn test_empty_input_rejected() {
        let parser = Parser::new();
        let err = parser.parse_bytes(b"a,b,c\n", b',').unwrap_err();
        assert!(matches!(err, KeyscopeError::EmptyData(_)));
    }
}
