//! BDD-based implementation of [`Solver`].
//!
//! Boolean variables map to single BDD variables. Integer variables are
//! bit-blasted into `W`-bit two's-complement vectors; all arithmetic is then
//! evaluated one bit wider per operation, so sums and differences never wrap.
//!
//! Variable order: all booleans first, then the integer bits interleaved
//! (bit 0 of every integer, then bit 1, ...), which keeps adders and
//! comparators linear in size.

use std::time::Instant;

use log::debug;

use crate::ast::{Arith, ArithOp, BoolOp, CmpOp, Expr};
use crate::bdd::Bdd;
use crate::bits::{bits_for, BitVec};
use crate::config::Config;
use crate::error::VerifyError;
use crate::factory::VarTable;
use crate::reference::Ref;
use crate::solver::{Model, SatResult, Solver};
use crate::types::{Value, VarId, VarType};

/// Smallest and largest integer width accepted.
pub const MIN_INT_BITS: u32 = 2;
pub const MAX_INT_BITS: u32 = 62;

/// Pick an integer width for a query with the given literals and integer variables.
///
/// The width covers `(num_ints + 1) * (1 + sum of |literal|)` plus a sign bit
/// and one bit of margin, and is at least 4. A satisfiable conjunction of
/// difference constraints (`x - y < c`, `x == y + c`, ...) has a solution
/// within that range. Returns `None` if the range needs more than
/// [`MAX_INT_BITS`] bits.
pub fn auto_width(literals: &[u64], num_ints: usize) -> Option<u32> {
    let total = literals
        .iter()
        .try_fold(1u128, |acc, &n| acc.checked_add(n as u128))?;
    let bound = total.checked_mul(num_ints as u128 + 1)?;
    let width = (u128::BITS - bound.leading_zeros()) + 2;
    (width <= MAX_INT_BITS).then_some(width.max(4))
}

#[derive(Debug, Clone)]
enum Slot {
    Bool(Ref),
    Int(BitVec),
}

pub struct BddSolver<'t> {
    table: &'t VarTable,
    bdd: Bdd,
    width: u32,
    slots: Vec<Slot>,
    /// BDD variable numbers of each integer's bits, least significant first.
    int_vars: Vec<Vec<u32>>,
    assertions: Ref,
    max_nodes: usize,
    deadline: Option<Instant>,
    result: Option<SatResult>,
}

impl<'t> BddSolver<'t> {
    /// Create a session over the variables of `table`.
    ///
    /// `literals` are the absolute values of all integer literals of the query;
    /// they size the integer width unless `config` fixes it.
    pub fn new(table: &'t VarTable, literals: &[u64], config: &Config) -> Result<Self, VerifyError> {
        let num_ints = table.iter().filter(|(_, info)| info.ty == VarType::Integer).count();
        let width = match config.int_bits {
            Some(w) if !(MIN_INT_BITS..=MAX_INT_BITS).contains(&w) => {
                return Err(VerifyError::DecisionProcedure(format!(
                    "integer width {} is outside {}..={}",
                    w, MIN_INT_BITS, MAX_INT_BITS
                )));
            }
            Some(w) => w,
            None => auto_width(literals, num_ints).ok_or_else(|| {
                VerifyError::DecisionProcedure(format!(
                    "integer literals of this pair need more than {} bits",
                    MAX_INT_BITS
                ))
            })?,
        };

        let bdd = Bdd::default();
        let num_bools = (table.len() - num_ints) as u32;
        let mut slots = Vec::with_capacity(table.len());
        let mut int_vars = Vec::new();
        let (mut next_bool, mut next_int) = (1u32, 0u32);
        for (_, info) in table.iter() {
            match info.ty {
                VarType::Boolean => {
                    slots.push(Slot::Bool(bdd.mk_var(next_bool)));
                    next_bool += 1;
                }
                VarType::Integer => {
                    let vars: Vec<u32> = (0..width)
                        .map(|k| num_bools + k * num_ints as u32 + next_int + 1)
                        .collect();
                    slots.push(Slot::Int(BitVec::from_vars(&bdd, vars.iter().copied())));
                    int_vars.push(vars);
                    next_int += 1;
                }
            }
        }
        debug!(
            "BddSolver: {} booleans, {} integers of {} bits",
            num_bools, num_ints, width
        );

        let assertions = bdd.one;
        Ok(Self {
            table,
            bdd,
            width,
            slots,
            int_vars,
            assertions,
            max_nodes: config.max_nodes,
            deadline: config.timeout.map(|t| Instant::now() + t),
            result: None,
        })
    }

    /// Width of integer variables in this session.
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn num_nodes(&self) -> usize {
        self.bdd.num_nodes()
    }

    fn checkpoint(&self) -> Result<(), VerifyError> {
        let nodes = self.bdd.num_nodes();
        if nodes > self.max_nodes {
            return Err(VerifyError::DecisionProcedure(format!(
                "node budget exhausted ({} > {})",
                nodes, self.max_nodes
            )));
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() > deadline {
                return Err(VerifyError::DecisionProcedure("timeout".to_string()));
            }
        }
        Ok(())
    }

    fn bool_var(&self, v: VarId) -> Result<Ref, VerifyError> {
        match &self.slots[v.index()] {
            Slot::Bool(r) => Ok(*r),
            Slot::Int(_) => Err(VerifyError::DecisionProcedure(format!(
                "'{}' is an integer used as a boolean",
                self.table.name(v)
            ))),
        }
    }

    fn int_var(&self, v: VarId) -> Result<BitVec, VerifyError> {
        match &self.slots[v.index()] {
            Slot::Int(bits) => Ok(bits.clone()),
            Slot::Bool(_) => Err(VerifyError::DecisionProcedure(format!(
                "'{}' is a boolean used as an integer",
                self.table.name(v)
            ))),
        }
    }

    fn encode(&self, expr: &Expr) -> Result<Ref, VerifyError> {
        let res = match expr {
            Expr::Lit(true) => self.bdd.one,
            Expr::Lit(false) => self.bdd.zero,
            Expr::Var(v) => self.bool_var(*v)?,
            Expr::Not(e) => -self.encode(e)?,
            Expr::Binary(op, a, b) => {
                let a = self.encode(a)?;
                let b = self.encode(b)?;
                match op {
                    BoolOp::And => self.bdd.apply_and(a, b),
                    BoolOp::Or => self.bdd.apply_or(a, b),
                    BoolOp::Implies => self.bdd.apply_imply(a, b),
                    BoolOp::Xor => self.bdd.apply_xor(a, b),
                }
            }
            Expr::Compare(op, a, b) => {
                let a = self.encode_arith(a)?;
                let b = self.encode_arith(b)?;
                let width = a.width().max(b.width());
                let (a, b) = (a.sign_extend(width), b.sign_extend(width));
                match op {
                    CmpOp::Eq => self.bdd.bv_eq(&a, &b),
                    CmpOp::Neq => -self.bdd.bv_eq(&a, &b),
                    CmpOp::Lt => self.bdd.bv_slt(&a, &b),
                    CmpOp::Gt => self.bdd.bv_slt(&b, &a),
                    CmpOp::Leq => -self.bdd.bv_slt(&b, &a),
                    CmpOp::Geq => -self.bdd.bv_slt(&a, &b),
                }
            }
        };
        self.checkpoint()?;
        Ok(res)
    }

    fn encode_arith(&self, arith: &Arith) -> Result<BitVec, VerifyError> {
        match arith {
            Arith::Lit(n) => BitVec::constant(&self.bdd, *n, self.width).ok_or_else(|| {
                VerifyError::DecisionProcedure(format!(
                    "literal {} needs {} bits, integers have {}",
                    n,
                    bits_for(*n),
                    self.width
                ))
            }),
            Arith::Var(v) => self.int_var(*v),
            Arith::Combine(op, a, b) => {
                let a = self.encode_arith(a)?;
                let b = self.encode_arith(b)?;
                let width = a.width().max(b.width()) + 1;
                let (a, b) = (a.sign_extend(width), b.sign_extend(width));
                Ok(match op {
                    ArithOp::Add => self.bdd.bv_add(&a, &b),
                    ArithOp::Sub => self.bdd.bv_sub(&a, &b),
                })
            }
        }
    }

    fn decode_int(&self, vars: &[u32], path: &[i32]) -> i64 {
        let mut value = 0i64;
        for (k, &v) in vars.iter().enumerate() {
            if path.contains(&(v as i32)) {
                value |= 1 << k;
            }
        }
        // Sign-extend from `width` bits.
        let shift = 64 - self.width;
        (value << shift) >> shift
    }
}

impl Solver for BddSolver<'_> {
    fn assert(&mut self, expr: &Expr) -> Result<(), VerifyError> {
        let f = self.encode(expr)?;
        self.assertions = self.bdd.apply_and(self.assertions, f);
        self.checkpoint()?;
        self.result = None;
        debug!(
            "assert: {} -> {} nodes total, {} in the conjunction",
            expr.display(self.table),
            self.bdd.num_nodes(),
            self.bdd.size(self.assertions)
        );
        Ok(())
    }

    fn check(&mut self) -> Result<SatResult, VerifyError> {
        let result = if self.bdd.is_zero(self.assertions) {
            SatResult::Unsat
        } else {
            SatResult::Sat
        };
        let (hits, misses) = self.bdd.cache_stats();
        debug!("check: {:?} (cache hits {}, misses {})", result, hits, misses);
        self.result = Some(result);
        Ok(result)
    }

    fn model(&self) -> Result<Model, VerifyError> {
        if self.result != Some(SatResult::Sat) {
            return Err(VerifyError::DecisionProcedure("no model available".to_string()));
        }
        let path = self
            .bdd
            .one_sat(self.assertions)
            .ok_or_else(|| VerifyError::DecisionProcedure("no model available".to_string()))?;

        // Variables off the path are unconstrained; they take false / zero bits.
        let mut model = Model::new();
        let mut ints = self.int_vars.iter();
        for (id, _) in self.table.iter() {
            let value = match &self.slots[id.index()] {
                Slot::Bool(r) => {
                    let v = self.bdd.variable(r.index()) as i32;
                    Value::Bool(path.contains(&v))
                }
                Slot::Int(_) => {
                    let vars = ints.next().ok_or_else(|| {
                        VerifyError::DecisionProcedure("integer layout mismatch".to_string())
                    })?;
                    Value::Int(self.decode_int(vars, &path))
                }
            };
            model.insert(id, value);
        }
        Ok(model)
    }
}
