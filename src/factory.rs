//! Per-call variable table.
//!
//! One [`VarTable`] is created for each verification call and both
//! expressions of the pair are parsed against it, so a name shared by the two
//! sides resolves to the same [`VarId`]. Nothing is global: parallel workers
//! each own their table.

use std::collections::HashMap;

use log::debug;

use crate::error::VerifyError;
use crate::infer::TypeMap;
use crate::types::{VarId, VarType};

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct VarInfo {
    pub name: String,
    pub ty: VarType,
    /// Whether the name denotes an enumerated constant rather than a free variable.
    pub constant: bool,
}

#[derive(Debug, Clone, Default)]
pub struct VarTable {
    vars: Vec<VarInfo>,
    index: HashMap<String, VarId>,
    types: TypeMap,
}

impl VarTable {
    /// Create an empty table whose types are fixed by `types`.
    pub fn new(types: TypeMap) -> Self {
        Self {
            vars: Vec::new(),
            index: HashMap::new(),
            types,
        }
    }

    /// Return the handle for `name`, creating it on first reference.
    ///
    /// The first assigned type of a name is its inferred type. A request with a
    /// different type, on first reference or later, is a type conflict.
    pub fn get_or_create(&mut self, name: &str, ty: VarType) -> Result<VarId, VerifyError> {
        if let Some(&id) = self.index.get(name) {
            let first = self.vars[id.index()].ty;
            if first != ty {
                return Err(VerifyError::TypeConflict {
                    name: name.to_string(),
                    first,
                    requested: ty,
                });
            }
            return Ok(id);
        }

        let first = self.types.ty(name);
        if first != ty {
            return Err(VerifyError::TypeConflict {
                name: name.to_string(),
                first,
                requested: ty,
            });
        }

        let id = VarId::new(self.vars.len() as u32);
        debug!("new variable {} = {} : {}", id, name, ty);
        self.vars.push(VarInfo {
            name: name.to_string(),
            ty,
            constant: self.types.is_constant(name),
        });
        self.index.insert(name.to_string(), id);
        Ok(id)
    }

    pub fn lookup(&self, name: &str) -> Option<VarId> {
        self.index.get(name).copied()
    }

    pub fn info(&self, id: VarId) -> &VarInfo {
        &self.vars[id.index()]
    }

    pub fn name(&self, id: VarId) -> &str {
        &self.vars[id.index()].name
    }

    pub fn ty(&self, id: VarId) -> VarType {
        self.vars[id.index()].ty
    }

    pub fn types(&self) -> &TypeMap {
        &self.types
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (VarId, &VarInfo)> {
        self.vars.iter().enumerate().map(|(i, info)| (VarId::new(i as u32), info))
    }

    /// Handles of all enumerated constants referenced so far.
    pub fn constants(&self) -> Vec<VarId> {
        self.iter().filter(|(_, info)| info.constant).map(|(id, _)| id).collect()
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::config::Config;
    use crate::infer::infer_types;

    #[test]
    fn test_same_handle_for_same_name() {
        let mut table = VarTable::new(infer_types("a && b", &Config::default()));
        let a1 = table.get_or_create("a", VarType::Boolean).unwrap();
        let b = table.get_or_create("b", VarType::Boolean).unwrap();
        let a2 = table.get_or_create("a", VarType::Boolean).unwrap();
        assert_eq!(a1, a2);
        assert_ne!(a1, b);
        assert_eq!(table.len(), 2);
        assert_eq!(table.name(b), "b");
        assert_eq!(table.lookup("a"), Some(a1));
    }

    #[test]
    fn test_conflict_with_inferred_type() {
        let mut table = VarTable::new(infer_types("x > 3", &Config::default()));
        let err = table.get_or_create("x", VarType::Boolean).unwrap_err();
        assert_eq!(
            err,
            VerifyError::TypeConflict {
                name: "x".to_string(),
                first: VarType::Integer,
                requested: VarType::Boolean,
            }
        );
        assert!(table.is_empty());
    }

    #[test]
    fn test_conflict_on_later_request() {
        let mut table = VarTable::new(infer_types("x > 3", &Config::default()));
        table.get_or_create("x", VarType::Integer).unwrap();
        let err = table.get_or_create("x", VarType::Boolean).unwrap_err();
        assert!(matches!(err, VerifyError::TypeConflict { first: VarType::Integer, .. }));
    }

    #[test]
    fn test_constants() {
        let mut table = VarTable::new(infer_types("s == IN_PLAY", &Config::default()));
        let s = table.get_or_create("s", VarType::Integer).unwrap();
        let c = table.get_or_create("IN_PLAY", VarType::Integer).unwrap();
        assert!(!table.info(s).constant);
        assert!(table.info(c).constant);
        assert_eq!(table.constants(), vec![c]);
    }
}
