//! Error types.
//!
//! [`VerifyError`] covers everything that can go wrong while verifying a single
//! pair; it becomes the payload of [`Verdict::Error`][crate::oracle::Verdict].
//! [`InputError`] covers loading pairs and name maps and writing reports.

use std::fmt;

use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::types::VarType;

/// The syntactic class the parser expected at a given token index.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Expected {
    /// A boolean term: variable, literal, negation, comparison or group.
    Term,
    /// An arithmetic operand: integer literal, variable or `x + y` fragment.
    Operand,
    /// A comparison operator after an arithmetic operand.
    Comparison,
    /// A boolean connective or the end of the group.
    Connective,
    /// A closing parenthesis.
    CloseParen,
    /// The end of the expression.
    End,
    /// Nesting no deeper than the given limit.
    MaxDepth(usize),
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Expected::Term => "boolean term",
            Expected::Operand => "arithmetic operand",
            Expected::Comparison => "comparison operator",
            Expected::Connective => "connective",
            Expected::CloseParen => "')'",
            Expected::End => "end of expression",
            Expected::MaxDepth(limit) => return write!(f, "nesting depth of at most {}", limit),
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum VerifyError {
    #[error("unrecognized character {ch:?} at position {pos}")]
    Tokenize { ch: char, pos: usize },

    #[error("type conflict for '{name}': first used as {first}, now requested as {requested}")]
    TypeConflict {
        name: String,
        first: VarType,
        requested: VarType,
    },

    #[error("parse error at token {index}: expected {expected}, found {}", .found.as_deref().unwrap_or("end of input"))]
    Parse {
        index: usize,
        expected: Expected,
        found: Option<String>,
    },

    #[error("decision procedure failed: {0}")]
    DecisionProcedure(String),
}

impl Serialize for VerifyError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[derive(Debug, Error)]
pub enum InputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {message}")]
    Format { line: usize, message: String },

    #[error("missing column '{0}' in header")]
    MissingColumn(&'static str),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<csv::Error> for InputError {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map_or(0, |pos| pos.line() as usize);
        let message = err.to_string();
        match err.into_kind() {
            csv::ErrorKind::Io(err) => InputError::Io(err),
            _ => InputError::Format { line, message },
        }
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_parse_error_message() {
        let err = VerifyError::Parse {
            index: 3,
            expected: Expected::CloseParen,
            found: None,
        };
        assert_eq!(err.to_string(), "parse error at token 3: expected ')', found end of input");

        let err = VerifyError::Parse {
            index: 0,
            expected: Expected::Term,
            found: Some("&&".to_string()),
        };
        assert_eq!(err.to_string(), "parse error at token 0: expected boolean term, found &&");

        let err = VerifyError::Parse {
            index: 7,
            expected: Expected::MaxDepth(500),
            found: Some("!".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "parse error at token 7: expected nesting depth of at most 500, found !"
        );
    }

    #[test]
    fn test_type_conflict_message() {
        let err = VerifyError::TypeConflict {
            name: "A".to_string(),
            first: VarType::Integer,
            requested: VarType::Boolean,
        };
        assert_eq!(
            err.to_string(),
            "type conflict for 'A': first used as Int, now requested as Bool"
        );
    }

    #[test]
    fn test_serialize_as_message() {
        let err = VerifyError::DecisionProcedure("node limit exceeded".to_string());
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(json, "\"decision procedure failed: node limit exceeded\"");
    }

    #[test]
    fn test_csv_error_keeps_line() {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(&b"a,b\nc\n"[..]);
        let err = reader.records().find_map(Result::err).unwrap();
        assert!(matches!(InputError::from(err), InputError::Format { line: 2, .. }));
    }
}
