//! Abstract satisfiability capability used by the equivalence oracle.

use std::collections::BTreeMap;

use crate::ast::Expr;
use crate::error::VerifyError;
use crate::types::{Value, VarId};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SatResult {
    Sat,
    Unsat,
}

/// A satisfying assignment, keyed by variable handle.
pub type Model = BTreeMap<VarId, Value>;

/// A decision procedure for boolean combinations of linear integer comparisons.
///
/// One solver value is one session: assertions accumulate until the value
/// is dropped.
pub trait Solver {
    /// Conjoin `expr` to the asserted constraints.
    fn assert(&mut self, expr: &Expr) -> Result<(), VerifyError>;

    /// Decide satisfiability of all constraints asserted so far.
    fn check(&mut self) -> Result<SatResult, VerifyError>;

    /// A model of the constraints; only valid after `check` returned [`SatResult::Sat`].
    fn model(&self) -> Result<Model, VerifyError>;
}
