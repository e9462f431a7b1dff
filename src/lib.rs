//! # guard-equiv: equivalence checking of guard expressions
//!
//! **`guard-equiv`** decides whether two guard expressions (boolean
//! conditions over flags, integer counters and enumerated mode codes, as found
//! on state-transition edges) are logically equivalent under every assignment,
//! and produces a concrete counterexample when they are not.
//!
//! ## Pipeline
//!
//! ```text
//! text --infer--> types --tokenize--> tokens --parse--> Expr
//! (Expr, Expr) --miter--> BDD --one_sat--> Verdict
//! ```
//!
//! - **[`infer`]**: classifies every identifier as Boolean or Integer from its usage.
//! - **[`lexer`]**: turns normalized text into tokens, keeping `x + 1` fragments atomic.
//! - **[`factory`]**: the per-call [`VarTable`][crate::factory::VarTable] of typed variables.
//! - **[`parser`]**: recursive descent over an explicit token cursor.
//! - **[`oracle`]**: decides equivalence through the [`Solver`][crate::solver::Solver] capability.
//! - **[`batch`]**: verifies many pairs with fault isolation and aggregates a report.
//!
//! The shipped decision procedure ([`backend`]) is a BDD manager with
//! complement edges ([`bdd`]), with integers bit-blasted into two's-complement
//! vectors ([`bits`]).
//!
//! ## Basic Usage
//!
//! ```rust
//! use guard_equiv::config::Config;
//! use guard_equiv::oracle::Verdict;
//! use guard_equiv::verify_pair;
//!
//! let config = Config::default();
//!
//! let verdict = verify_pair("!(X > Y)", "X <= Y", &config);
//! assert_eq!(verdict, Verdict::Equivalent);
//!
//! let verdict = verify_pair("A && B", "A || B", &config);
//! let cex = verdict.counterexample().unwrap();
//! assert_ne!(cex.get("A"), cex.get("B"));
//! ```

pub mod ast;
pub mod backend;
pub mod batch;
pub mod bdd;
pub mod bits;
pub mod cache;
pub mod config;
pub mod error;
pub mod factory;
pub mod infer;
pub mod io;
pub mod lexer;
pub mod names;
pub mod oracle;
pub mod parser;
pub mod reference;
pub mod sat;
pub mod solver;
pub mod table;
pub mod types;
pub mod utils;

pub use batch::verify_pair;
