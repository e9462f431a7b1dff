//! Reverse name mapping produced by the name-shortening pre-processor.
//!
//! The mapping file lists one entry per line:
//!
//! ```text
//! Variable Mappings:
//! A -> "dw.is_c1_sys"
//! B -> "IN_PLAY"
//! ```
//!
//! Lines that are not entries (headers, blank lines, the expressions the
//! pre-processor writes alongside) are skipped.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::debug;

use crate::error::InputError;

#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct NameMap {
    map: BTreeMap<String, String>,
}

impl NameMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, short: impl Into<String>, original: impl Into<String>) {
        self.map.insert(short.into(), original.into());
    }

    pub fn parse(text: &str) -> Result<Self, InputError> {
        let mut names = NameMap::new();
        for (i, line) in text.lines().enumerate() {
            let Some((short, original)) = line.split_once("->") else {
                continue;
            };
            let (short, original) = (short.trim(), original.trim());
            if !original.starts_with('"') {
                // An expression with an implication, not an entry.
                continue;
            }
            if original.len() < 2 || !original.ends_with('"') {
                return Err(InputError::Format {
                    line: i + 1,
                    message: format!("unterminated quoted name {}", original),
                });
            }
            if short.is_empty() || short.contains(char::is_whitespace) {
                return Err(InputError::Format {
                    line: i + 1,
                    message: format!("invalid short name {:?}", short),
                });
            }
            names.insert(short, &original[1..original.len() - 1]);
        }
        debug!("parsed {} name mappings", names.len());
        Ok(names)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, InputError> {
        Self::parse(&fs::read_to_string(path)?)
    }

    /// The original identifier for `name`, or `name` itself if unmapped.
    pub fn resolve<'a>(&'a self, name: &'a str) -> &'a str {
        self.map.get(name).map_or(name, String::as_str)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_parse_formatter_output() {
        let text = "logical statement: (A && B) -> C\n\n\
                    simplified statement : !A || !B || C\n\n\
                    Variable Mappings:\n\
                    A -> \"dw.is_c1_sys\"\n\
                    B -> \"IN_PLAY\"\n\
                    C -> \"dw.temporalCounter_i1 >= 20\"\n";
        let names = NameMap::parse(text).unwrap();
        assert_eq!(names.len(), 3);
        assert_eq!(names.resolve("A"), "dw.is_c1_sys");
        assert_eq!(names.resolve("C"), "dw.temporalCounter_i1 >= 20");
        assert_eq!(names.resolve("D"), "D");
    }

    #[test]
    fn test_unterminated_quote() {
        let err = NameMap::parse("Variable Mappings:\nA -> \"oops\n").unwrap_err();
        assert!(matches!(err, InputError::Format { line: 2, .. }));
    }
}
