//! Delimited-text readers and writers shared by every stage.
//!
//! All inputs are small-to-medium tab or comma separated tables, optionally gzip'd. Outputs
//! are always tab separated and written atomically, so a stage that fails never leaves a
//! truncated table behind for the next run to pick up.
use std::ffi::OsStr;
use std::fmt::Display;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::str::FromStr;

use flate2::read::MultiGzDecoder;
use tempfile::NamedTempFile;

use crate::consts::{DELIMITER, GZ_FILE_EXTENSION};
use crate::errors::{Result, SshicError};

///
/// Get a reader for either a gzip'd or non-gzip'd file.
///
/// # Arguments
///
/// - path: path to the file to read
///
pub fn get_dynamic_reader(path: &Path) -> Result<BufReader<Box<dyn Read>>> {
    if !path.is_file() {
        return Err(SshicError::MissingInput(path.to_owned()));
    }

    let is_gzipped = path.extension() == Some(OsStr::new(GZ_FILE_EXTENSION));
    let file = File::open(path)?;
    let file: Box<dyn Read> = match is_gzipped {
        true => Box::new(MultiGzDecoder::new(file)),
        false => Box::new(file),
    };

    Ok(BufReader::new(file))
}

/// Guess the field delimiter of a line: a comma when commas outnumber tabs, a tab otherwise.
pub fn detect_delimiter(line: &str) -> char {
    let tabs = line.matches('\t').count();
    let commas = line.matches(',').count();
    if commas > tabs { ',' } else { DELIMITER }
}

/// Format a nullable cell. `None` is written as an empty field.
pub fn format_value(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

///
/// A fully materialized delimited table: an optional header and rows of raw text fields.
///
#[derive(Debug, Clone, Default)]
pub struct DelimitedTable {
    pub name: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
    has_header: bool,
}

impl DelimitedTable {
    ///
    /// Read a table from disk, detecting the delimiter from its first line.
    ///
    /// # Arguments
    /// - path: path to the (possibly gzip'd) table
    /// - has_header: whether the first non-empty line holds column names
    ///
    pub fn read(path: &Path, has_header: bool) -> Result<Self> {
        let reader = get_dynamic_reader(path)?;

        let mut delimiter: Option<char> = None;
        let mut header: Vec<String> = Vec::new();
        let mut rows: Vec<Vec<String>> = Vec::new();
        let mut first_line = true;

        for line in reader.lines() {
            let line = line?;
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }

            let delimiter = *delimiter.get_or_insert_with(|| detect_delimiter(line));
            let fields: Vec<String> = line.split(delimiter).map(|f| f.trim().to_string()).collect();

            if first_line && has_header {
                header = fields;
            } else {
                rows.push(fields);
            }
            first_line = false;
        }

        Ok(DelimitedTable {
            name: path.display().to_string(),
            header,
            rows,
            has_header,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column, matching names case-insensitively.
    pub fn optional_column(&self, name: &str) -> Option<usize> {
        self.header
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
    }

    pub fn column(&self, name: &str) -> Result<usize> {
        self.optional_column(name)
            .ok_or_else(|| SshicError::MissingColumn {
                table: self.name.clone(),
                column: name.to_string(),
            })
    }

    /// One-based line number of a data row in the source file.
    pub fn line_of(&self, row: usize) -> usize {
        row + if self.has_header { 2 } else { 1 }
    }

    pub fn parse_error(&self, row: usize, message: String) -> SshicError {
        SshicError::Parse {
            table: self.name.clone(),
            line: self.line_of(row),
            message,
        }
    }

    pub fn text(&self, row: usize, col: usize) -> Result<&str> {
        self.rows[row]
            .get(col)
            .map(|s| s.as_str())
            .ok_or_else(|| self.parse_error(row, format!("missing field {}", col + 1)))
    }

    pub fn field<T>(&self, row: usize, col: usize) -> Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        let raw = self.text(row, col)?;
        raw.parse::<T>()
            .map_err(|e| self.parse_error(row, format!("can't parse '{}': {}", raw, e)))
    }

    /// Parse a nullable numeric cell: empty and NaN fields are `None`.
    pub fn optional_f64(&self, row: usize, col: usize) -> Result<Option<f64>> {
        let raw = match self.rows[row].get(col) {
            Some(raw) => raw.as_str(),
            None => return Ok(None),
        };
        if raw.is_empty() || raw.eq_ignore_ascii_case("nan") {
            return Ok(None);
        }
        raw.parse::<f64>()
            .map(Some)
            .map_err(|e| self.parse_error(row, format!("can't parse '{}': {}", raw, e)))
    }
}

///
/// Write a header and rows to `path` as a tab separated table.
///
/// Rows are written to a temporary file next to the target which is then renamed over it,
/// so readers never observe a partially written table.
///
pub fn write_tsv_atomic<P, I>(path: P, header: &[String], rows: I) -> Result<()>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = Vec<String>>,
{
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        writeln!(writer, "{}", header.join("\t"))?;
        for row in rows {
            writeln!(writer, "{}", row.join("\t"))?;
        }
        writer.flush()?;
    }
    tmp.persist(path).map_err(|e| e.error)?;

    Ok(())
}

pub trait TsvWrite {
    /// Column names, in output order.
    fn header(&self) -> Vec<String>;

    /// Formatted rows, in output order.
    fn records(&self) -> Vec<Vec<String>>;

    ///
    /// Write the table to disk as a tab separated file
    ///
    /// # Arguments
    /// - path: the path to the file to dump to
    fn write_tsv<T: AsRef<Path>>(&self, path: T) -> Result<()> {
        write_tsv_atomic(path, &self.header(), self.records())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case("a\tb\tc", '\t')]
    #[case("name,type,chr,start,end", ',')]
    #[case("single", '\t')]
    fn test_detect_delimiter(#[case] line: &str, #[case] expected: char) {
        assert_eq!(detect_delimiter(line), expected);
    }

    #[rstest]
    fn test_missing_input() {
        let result = DelimitedTable::read(Path::new("does/not/exist.tsv"), true);
        assert!(matches!(result, Err(SshicError::MissingInput(_))));
    }

    #[rstest]
    fn test_round_trip_through_disk() {
        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("nested").join("table.tsv");

        let header = vec!["chr".to_string(), "value".to_string()];
        let rows = vec![
            vec!["chr1".to_string(), format_value(Some(0.5))],
            vec!["chr2".to_string(), format_value(None)],
        ];
        write_tsv_atomic(&path, &header, rows).unwrap();

        let table = DelimitedTable::read(&path, true).unwrap();
        assert_eq!(table.header, header);
        assert_eq!(table.len(), 2);
        assert_eq!(table.column("VALUE").unwrap(), 1);
        assert_eq!(table.optional_f64(0, 1).unwrap(), Some(0.5));
        assert_eq!(table.optional_f64(1, 1).unwrap(), None);
        assert_eq!(table.line_of(1), 3);
    }

    #[rstest]
    fn test_parse_error_names_line() {
        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("bad.tsv");
        std::fs::write(&path, "start\n10\nten\n").unwrap();

        let table = DelimitedTable::read(&path, true).unwrap();
        assert_eq!(table.field::<u64>(0, 0).unwrap(), 10);
        match table.field::<u64>(1, 0) {
            Err(SshicError::Parse { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected a parse error, got {:?}", other),
        }
    }

    #[rstest]
    fn test_format_integral_value() {
        assert_eq!(format_value(Some(5.0)), "5");
        assert_eq!(format_value(Some(0.375)), "0.375");
    }
}
