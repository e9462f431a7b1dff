//! Core value types shared by the front end and the decision procedure.
//!
//! Variables are referred to by [`VarId`] handles that index into the
//! per-call [`VarTable`][crate::factory::VarTable]. Two occurrences of the
//! same name within one verification call always resolve to the same handle.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The type of a guard variable.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum VarType {
    Boolean,
    Integer,
}

impl fmt::Display for VarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarType::Boolean => write!(f, "Bool"),
            VarType::Integer => write!(f, "Int"),
        }
    }
}

/// A handle to a variable in a [`VarTable`][crate::factory::VarTable] (0-indexed).
///
/// Handles are only meaningful relative to the table that created them.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct VarId(u32);

impl VarId {
    pub const fn new(index: u32) -> Self {
        VarId(index)
    }

    /// Returns the position of the variable in its table.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// A concrete value of a variable, as found in a counterexample.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
}

impl Value {
    pub fn ty(self) -> VarType {
        match self {
            Value::Bool(_) => VarType::Boolean,
            Value::Int(_) => VarType::Integer,
        }
    }

    pub fn as_bool(self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(b),
            Value::Int(_) => None,
        }
    }

    pub fn as_int(self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(n),
            Value::Bool(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
        }
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_value_accessors() {
        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert_eq!(Value::Bool(true).as_int(), None);
        assert_eq!(Value::Int(-3).as_int(), Some(-3));
        assert_eq!(Value::Int(-3).ty(), VarType::Integer);
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Bool(false).to_string(), "false");
        assert_eq!(Value::Int(-12).to_string(), "-12");
    }

    #[test]
    fn test_var_id() {
        let v = VarId::new(3);
        assert_eq!(v.index(), 3);
        assert_eq!(v.to_string(), "v3");
        assert!(VarId::new(1) < VarId::new(2));
    }
}
