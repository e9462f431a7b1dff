//! Equivalence oracle.
//!
//! Two guards are equivalent iff their miter `original ^ simplified` is
//! unsatisfiable. A satisfying assignment of the miter is a counterexample;
//! it is double-checked by evaluating both trees before it is reported.

use std::collections::BTreeMap;
use std::fmt;

use log::debug;
use serde::Serialize;

use crate::ast::{Arith, CmpOp, Expr};
use crate::backend::BddSolver;
use crate::config::Config;
use crate::error::VerifyError;
use crate::factory::VarTable;
use crate::solver::{SatResult, Solver};
use crate::types::{Value, VarId};

/// An assignment under which two guards disagree, keyed by variable name.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Counterexample(BTreeMap<String, Value>);

impl Counterexample {
    pub fn get(&self, name: &str) -> Option<Value> {
        self.0.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl fmt::Display for Counterexample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} = {}", name, value)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "verdict", content = "detail", rename_all = "snake_case")]
pub enum Verdict {
    Equivalent,
    NotEquivalent(Counterexample),
    Error(VerifyError),
}

impl Verdict {
    pub fn is_equivalent(&self) -> bool {
        matches!(self, Verdict::Equivalent)
    }

    pub fn counterexample(&self) -> Option<&Counterexample> {
        match self {
            Verdict::NotEquivalent(cex) => Some(cex),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&VerifyError> {
        match self {
            Verdict::Error(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Equivalent => write!(f, "equivalent"),
            Verdict::NotEquivalent(cex) => write!(f, "not equivalent: {}", cex),
            Verdict::Error(e) => write!(f, "error: {}", e),
        }
    }
}

impl From<Result<Option<Counterexample>, VerifyError>> for Verdict {
    fn from(result: Result<Option<Counterexample>, VerifyError>) -> Self {
        match result {
            Ok(None) => Verdict::Equivalent,
            Ok(Some(cex)) => Verdict::NotEquivalent(cex),
            Err(e) => Verdict::Error(e),
        }
    }
}

/// Decide equivalence of two trees parsed against `table` using `solver`.
///
/// Returns `None` if the trees are equivalent, or a validated counterexample.
pub fn find_counterexample<S: Solver>(
    solver: &mut S,
    table: &VarTable,
    original: &Expr,
    simplified: &Expr,
) -> Result<Option<Counterexample>, VerifyError> {
    // Enumerated constants denote distinct codes.
    let constants = table.constants();
    for (i, &a) in constants.iter().enumerate() {
        for &b in &constants[i + 1..] {
            solver.assert(&Expr::compare(CmpOp::Neq, Arith::Var(a), Arith::Var(b)))?;
        }
    }

    let miter = Expr::xor(original.clone(), simplified.clone());
    solver.assert(&miter)?;

    if solver.check()? == SatResult::Unsat {
        return Ok(None);
    }

    let model = solver.model()?;
    let mut vars = original.vars();
    vars.extend(simplified.vars());
    let model: BTreeMap<_, _> = model.into_iter().filter(|(v, _)| vars.contains(v)).collect();

    let env = |v: VarId| model.get(&v).copied();
    let lhs = original.eval(&env);
    let rhs = simplified.eval(&env);
    if lhs.is_none() || lhs == rhs {
        return Err(VerifyError::DecisionProcedure(
            "model does not distinguish the expressions".to_string(),
        ));
    }

    let cex = Counterexample(
        model
            .into_iter()
            .map(|(v, value)| (table.name(v).to_string(), value))
            .collect(),
    );
    debug!("counterexample: {}", cex);
    Ok(Some(cex))
}

/// Decide equivalence of two parsed trees with the BDD backend.
pub fn check_equivalence(table: &VarTable, original: &Expr, simplified: &Expr, config: &Config) -> Verdict {
    let mut literals = Vec::new();
    original.collect_literals(&mut literals);
    simplified.collect_literals(&mut literals);

    let result = BddSolver::new(table, &literals, config)
        .and_then(|mut solver| find_counterexample(&mut solver, table, original, simplified));
    Verdict::from(result)
}
