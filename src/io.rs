//! Loading expression pairs and writing reports.
//!
//! Pairs come from a CSV file whose header names an `original` and a
//! `simplified` column (in any order, other columns ignored). Quoting follows
//! RFC 4180 as implemented by the `csv` crate.

use std::fs;
use std::io;
use std::path::Path;

use log::{debug, warn};

use crate::batch::{Pair, Report};
use crate::error::InputError;
use crate::names::NameMap;

fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    // Short rows are reported and skipped, not rejected.
    builder.flexible(true);
    builder
}

fn read_pairs<R: io::Read>(mut reader: csv::Reader<R>) -> Result<Vec<Pair>, InputError> {
    let header = reader.headers()?.clone();
    let column = |name: &'static str| {
        header
            .iter()
            .position(|f| f.trim_start_matches('\u{feff}').trim().eq_ignore_ascii_case(name))
            .ok_or(InputError::MissingColumn(name))
    };
    let original = column("original")?;
    let simplified = column("simplified")?;

    let mut pairs = Vec::new();
    for record in reader.records() {
        let record = record?;
        match (record.get(original), record.get(simplified)) {
            (Some(a), Some(b)) if !a.trim().is_empty() && !b.trim().is_empty() => {
                pairs.push(Pair::new(a, b));
            }
            _ => {
                let line = record.position().map_or(0, |pos| pos.line());
                warn!("line {}: skipping incomplete row", line);
            }
        }
    }
    debug!("loaded {} pairs", pairs.len());
    Ok(pairs)
}

/// Extract expression pairs from CSV text.
///
/// Rows lacking either column, or holding an empty expression, are skipped
/// with a warning.
pub fn parse_pairs(text: &str) -> Result<Vec<Pair>, InputError> {
    read_pairs(reader_builder().from_reader(text.as_bytes()))
}

pub fn load_pairs(path: impl AsRef<Path>) -> Result<Vec<Pair>, InputError> {
    read_pairs(reader_builder().from_path(path)?)
}

/// Write pairs as CSV with an `original,simplified` header.
pub fn write_pairs(path: impl AsRef<Path>, pairs: &[Pair]) -> Result<(), InputError> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_path(path)?;
    writer.write_record(["original", "simplified"])?;
    for pair in pairs {
        writer.serialize(pair)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_report(path: impl AsRef<Path>, report: &Report, names: &NameMap) -> Result<(), InputError> {
    fs::write(path, report.display(names).to_string())?;
    Ok(())
}

pub fn write_json_report(path: impl AsRef<Path>, report: &Report) -> Result<(), InputError> {
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json + "\n")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("guard-equiv-io-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_parse_pairs_quoting() {
        let text = "original,simplified\n\"x > 0, y\",\"a || \"\"b\"\"\"\n\"multi\nline\",z\n";
        let pairs = parse_pairs(text).unwrap();
        assert_eq!(
            pairs,
            vec![Pair::new("x > 0, y", "a || \"b\""), Pair::new("multi\nline", "z")]
        );
    }

    #[test]
    fn test_parse_pairs_crlf_bom_and_blank_lines() {
        let pairs = parse_pairs("\u{feff}original,simplified\r\n\r\na,b\r\n").unwrap();
        assert_eq!(pairs, vec![Pair::new("a", "b")]);
    }

    #[test]
    fn test_parse_pairs_any_column_order() {
        let text = "id,simplified,original\n1,b && a,a && b\n2,,x\n3\n4,\"c || (d && e)\",c\n";
        let pairs = parse_pairs(text).unwrap();
        assert_eq!(
            pairs,
            vec![Pair::new("a && b", "b && a"), Pair::new("c", "c || (d && e)")]
        );
    }

    #[test]
    fn test_missing_column() {
        let err = parse_pairs("original,other\na,b\n").unwrap_err();
        assert!(matches!(err, InputError::MissingColumn("simplified")));
        assert!(matches!(parse_pairs(""), Err(InputError::MissingColumn("original"))));
    }

    #[test]
    fn test_invalid_utf8_reports_line() {
        let path = temp_path("bad.csv");
        fs::write(&path, b"original,simplified\na,b\nc,\xff\n").unwrap();
        let err = load_pairs(&path).unwrap_err();
        let _ = fs::remove_file(&path);
        assert!(matches!(err, InputError::Format { line: 3, .. }), "{}", err);
    }

    #[test]
    fn test_missing_file() {
        let err = load_pairs(temp_path("absent.csv")).unwrap_err();
        assert!(matches!(err, InputError::Io(_)));
    }

    #[test]
    fn test_write_pairs_round_trip() {
        let path = temp_path("pairs.csv");
        let pairs = vec![Pair::new("f(a, b)", "a \"quoted\""), Pair::new("x\ny", "z")];
        write_pairs(&path, &pairs).unwrap();
        let loaded = load_pairs(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded, pairs);
    }
}
