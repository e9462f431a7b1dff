//! Typed expression trees.
//!
//! Boolean-typed nodes ([`Expr`]) and arithmetic-typed nodes ([`Arith`]) are
//! distinct types, so a comparison can only ever hold arithmetic operands.
//! Trees own their children exclusively; variables are shared by handle.

use std::collections::BTreeSet;
use std::fmt;

use crate::factory::VarTable;
use crate::types::{Value, VarId};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BoolOp {
    And,
    Or,
    Implies,
    /// Exclusive or. Never produced by the parser; used to build the miter of two guards.
    Xor,
}

impl BoolOp {
    pub fn apply(self, a: bool, b: bool) -> bool {
        match self {
            BoolOp::And => a && b,
            BoolOp::Or => a || b,
            BoolOp::Implies => !a || b,
            BoolOp::Xor => a ^ b,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BoolOp::And => "&&",
            BoolOp::Or => "||",
            BoolOp::Implies => "->",
            BoolOp::Xor => "^",
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum CmpOp {
    Eq,
    Neq,
    Gt,
    Lt,
    Geq,
    Leq,
}

impl CmpOp {
    pub fn apply(self, a: i64, b: i64) -> bool {
        match self {
            CmpOp::Eq => a == b,
            CmpOp::Neq => a != b,
            CmpOp::Gt => a > b,
            CmpOp::Lt => a < b,
            CmpOp::Geq => a >= b,
            CmpOp::Leq => a <= b,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            CmpOp::Eq => "==",
            CmpOp::Neq => "!=",
            CmpOp::Gt => ">",
            CmpOp::Lt => "<",
            CmpOp::Geq => ">=",
            CmpOp::Leq => "<=",
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ArithOp {
    Add,
    Sub,
}

impl ArithOp {
    pub fn apply(self, a: i64, b: i64) -> Option<i64> {
        match self {
            ArithOp::Add => a.checked_add(b),
            ArithOp::Sub => a.checked_sub(b),
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
        }
    }
}

/// A boolean-typed expression.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Expr {
    Lit(bool),
    Var(VarId),
    Not(Box<Expr>),
    Binary(BoolOp, Box<Expr>, Box<Expr>),
    Compare(CmpOp, Arith, Arith),
}

/// An arithmetic-typed expression.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Arith {
    Lit(i64),
    Var(VarId),
    Combine(ArithOp, Box<Arith>, Box<Arith>),
}

impl Expr {
    pub fn not(value: Self) -> Self {
        Expr::Not(Box::new(value))
    }

    pub fn binary(op: BoolOp, lhs: Self, rhs: Self) -> Self {
        Expr::Binary(op, Box::new(lhs), Box::new(rhs))
    }

    pub fn and(lhs: Self, rhs: Self) -> Self {
        Self::binary(BoolOp::And, lhs, rhs)
    }

    pub fn or(lhs: Self, rhs: Self) -> Self {
        Self::binary(BoolOp::Or, lhs, rhs)
    }

    pub fn implies(lhs: Self, rhs: Self) -> Self {
        Self::binary(BoolOp::Implies, lhs, rhs)
    }

    pub fn xor(lhs: Self, rhs: Self) -> Self {
        Self::binary(BoolOp::Xor, lhs, rhs)
    }

    pub fn compare(op: CmpOp, lhs: Arith, rhs: Arith) -> Self {
        Expr::Compare(op, lhs, rhs)
    }

    /// Collect every variable occurring in the expression.
    pub fn collect_vars(&self, out: &mut BTreeSet<VarId>) {
        match self {
            Expr::Lit(_) => {}
            Expr::Var(v) => {
                out.insert(*v);
            }
            Expr::Not(e) => e.collect_vars(out),
            Expr::Binary(_, a, b) => {
                a.collect_vars(out);
                b.collect_vars(out);
            }
            Expr::Compare(_, a, b) => {
                a.collect_vars(out);
                b.collect_vars(out);
            }
        }
    }

    pub fn vars(&self) -> BTreeSet<VarId> {
        let mut out = BTreeSet::new();
        self.collect_vars(&mut out);
        out
    }

    /// Evaluate the expression under an assignment.
    ///
    /// Returns `None` if a variable is unassigned, holds a value of the wrong
    /// type, or an intermediate sum overflows.
    pub fn eval<F>(&self, env: &F) -> Option<bool>
    where
        F: Fn(VarId) -> Option<Value>,
    {
        match self {
            Expr::Lit(b) => Some(*b),
            Expr::Var(v) => env(*v)?.as_bool(),
            Expr::Not(e) => e.eval(env).map(|b| !b),
            Expr::Binary(op, a, b) => Some(op.apply(a.eval(env)?, b.eval(env)?)),
            Expr::Compare(op, a, b) => Some(op.apply(a.eval(env)?, b.eval(env)?)),
        }
    }

    /// Render the expression with variable names taken from `table`.
    pub fn display<'a>(&'a self, table: &'a VarTable) -> ExprDisplay<'a> {
        ExprDisplay { expr: self, table }
    }
}

impl Arith {
    pub fn combine(op: ArithOp, lhs: Self, rhs: Self) -> Self {
        Arith::Combine(op, Box::new(lhs), Box::new(rhs))
    }

    pub fn collect_vars(&self, out: &mut BTreeSet<VarId>) {
        match self {
            Arith::Lit(_) => {}
            Arith::Var(v) => {
                out.insert(*v);
            }
            Arith::Combine(_, a, b) => {
                a.collect_vars(out);
                b.collect_vars(out);
            }
        }
    }

    /// Collect the absolute values of all literals (used to size bit-vectors).
    pub fn collect_literals(&self, out: &mut Vec<u64>) {
        match self {
            Arith::Lit(n) => out.push(n.unsigned_abs()),
            Arith::Var(_) => {}
            Arith::Combine(_, a, b) => {
                a.collect_literals(out);
                b.collect_literals(out);
            }
        }
    }

    pub fn eval<F>(&self, env: &F) -> Option<i64>
    where
        F: Fn(VarId) -> Option<Value>,
    {
        match self {
            Arith::Lit(n) => Some(*n),
            Arith::Var(v) => env(*v)?.as_int(),
            Arith::Combine(op, a, b) => op.apply(a.eval(env)?, b.eval(env)?),
        }
    }
}

impl Expr {
    pub fn collect_literals(&self, out: &mut Vec<u64>) {
        match self {
            Expr::Lit(_) | Expr::Var(_) => {}
            Expr::Not(e) => e.collect_literals(out),
            Expr::Binary(_, a, b) => {
                a.collect_literals(out);
                b.collect_literals(out);
            }
            Expr::Compare(_, a, b) => {
                a.collect_literals(out);
                b.collect_literals(out);
            }
        }
    }
}

pub struct ExprDisplay<'a> {
    expr: &'a Expr,
    table: &'a VarTable,
}

impl fmt::Display for ExprDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_expr(f, self.expr, self.table)
    }
}

fn write_expr(f: &mut fmt::Formatter<'_>, expr: &Expr, table: &VarTable) -> fmt::Result {
    match expr {
        Expr::Lit(b) => write!(f, "{}", b),
        Expr::Var(v) => write!(f, "{}", table.name(*v)),
        Expr::Not(e) => match e.as_ref() {
            Expr::Lit(_) | Expr::Var(_) => {
                write!(f, "!")?;
                write_expr(f, e, table)
            }
            _ => {
                write!(f, "!(")?;
                write_expr(f, e, table)?;
                write!(f, ")")
            }
        },
        Expr::Binary(op, a, b) => {
            write!(f, "(")?;
            write_expr(f, a, table)?;
            write!(f, " {} ", op.symbol())?;
            write_expr(f, b, table)?;
            write!(f, ")")
        }
        Expr::Compare(op, a, b) => {
            write_arith(f, a, table)?;
            write!(f, " {} ", op.symbol())?;
            write_arith(f, b, table)
        }
    }
}

fn write_arith(f: &mut fmt::Formatter<'_>, arith: &Arith, table: &VarTable) -> fmt::Result {
    match arith {
        Arith::Lit(n) => write!(f, "{}", n),
        Arith::Var(v) => write!(f, "{}", table.name(*v)),
        Arith::Combine(op, a, b) => {
            write_arith(f, a, table)?;
            write!(f, " {} ", op.symbol())?;
            write_arith(f, b, table)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use test_log::test;

    use super::*;

    fn env(values: &[(u32, Value)]) -> impl Fn(VarId) -> Option<Value> {
        let map: HashMap<VarId, Value> = values.iter().map(|&(i, v)| (VarId::new(i), v)).collect();
        move |v| map.get(&v).copied()
    }

    #[test]
    fn test_eval_connectives() {
        let a = Expr::Var(VarId::new(0));
        let b = Expr::Var(VarId::new(1));
        let f = Expr::implies(a.clone(), b.clone());
        let e = env(&[(0, Value::Bool(true)), (1, Value::Bool(false))]);
        assert_eq!(f.eval(&e), Some(false));
        assert_eq!(Expr::xor(a.clone(), b.clone()).eval(&e), Some(true));
        assert_eq!(Expr::not(Expr::and(a, b)).eval(&e), Some(true));
    }

    #[test]
    fn test_eval_comparison() {
        // x + 2 == y
        let lhs = Arith::combine(ArithOp::Add, Arith::Var(VarId::new(0)), Arith::Lit(2));
        let f = Expr::compare(CmpOp::Eq, lhs, Arith::Var(VarId::new(1)));
        assert_eq!(f.eval(&env(&[(0, Value::Int(3)), (1, Value::Int(5))])), Some(true));
        assert_eq!(f.eval(&env(&[(0, Value::Int(3)), (1, Value::Int(4))])), Some(false));
    }

    #[test]
    fn test_eval_ill_typed() {
        let f = Expr::Var(VarId::new(0));
        assert_eq!(f.eval(&env(&[(0, Value::Int(1))])), None);
        assert_eq!(f.eval(&env(&[])), None);
    }

    #[test]
    fn test_collect() {
        let lhs = Arith::combine(ArithOp::Sub, Arith::Var(VarId::new(2)), Arith::Lit(-7));
        let f = Expr::and(
            Expr::Var(VarId::new(0)),
            Expr::compare(CmpOp::Lt, lhs, Arith::Lit(40)),
        );
        let vars: Vec<_> = f.vars().into_iter().collect();
        assert_eq!(vars, vec![VarId::new(0), VarId::new(2)]);
        let mut lits = Vec::new();
        f.collect_literals(&mut lits);
        assert_eq!(lits, vec![7, 40]);
    }
}
