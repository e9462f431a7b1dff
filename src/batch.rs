//! Batch verification with per-pair fault isolation.

use std::fmt;

use log::{info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::ast::Expr;
use crate::config::Config;
use crate::error::VerifyError;
use crate::factory::VarTable;
use crate::infer::infer_types;
use crate::names::NameMap;
use crate::oracle::{check_equivalence, Verdict};
use crate::parser::parse_expr_bounded;

/// One `(original, simplified)` record of the input collection.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Pair {
    pub original: String,
    pub simplified: String,
}

impl Pair {
    pub fn new(original: impl Into<String>, simplified: impl Into<String>) -> Self {
        Self {
            original: original.into(),
            simplified: simplified.into(),
        }
    }
}

/// Infer types over both texts and parse them against one fresh table.
pub fn parse_pair(original: &str, simplified: &str, config: &Config) -> Result<(VarTable, Expr, Expr), VerifyError> {
    let types = infer_types(&format!("{} {}", original, simplified), config);
    let mut table = VarTable::new(types);
    let a = parse_expr_bounded(original, &mut table, config.max_depth)?;
    let b = parse_expr_bounded(simplified, &mut table, config.max_depth)?;
    Ok((table, a, b))
}

/// Verify a single pair of guard expressions.
///
/// ```
/// use guard_equiv::config::Config;
/// use guard_equiv::verify_pair;
///
/// let verdict = verify_pair("!(a && b)", "!a || !b", &Config::default());
/// assert!(verdict.is_equivalent());
/// ```
pub fn verify_pair(original: &str, simplified: &str, config: &Config) -> Verdict {
    match parse_pair(original, simplified, config) {
        Ok((table, a, b)) => check_equivalence(&table, &a, &b, config),
        Err(e) => Verdict::Error(e),
    }
}

/// Verdict for one pair, with its 1-based position in the input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairResult {
    pub index: usize,
    pub original: String,
    pub simplified: String,
    pub verdict: Verdict,
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub equivalent: usize,
    pub not_equivalent: usize,
    pub errors: usize,
}

impl Summary {
    fn record(&mut self, verdict: &Verdict) {
        self.total += 1;
        match verdict {
            Verdict::Equivalent => self.equivalent += 1,
            Verdict::NotEquivalent(_) => self.not_equivalent += 1,
            Verdict::Error(_) => self.errors += 1,
        }
    }
}

/// Aggregate counts plus details of every non-equivalent or failed pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Report {
    pub summary: Summary,
    pub problems: Vec<PairResult>,
}

impl Report {
    /// Render the report, showing counterexample variables under their original names.
    pub fn display<'a>(&'a self, names: &'a NameMap) -> ReportDisplay<'a> {
        ReportDisplay { report: self, names }
    }
}

fn verify_indexed(index: usize, pair: &Pair, config: &Config) -> PairResult {
    let verdict = verify_pair(&pair.original, &pair.simplified, config);
    match &verdict {
        Verdict::Error(e) => warn!("pair {}: {}", index + 1, e),
        Verdict::NotEquivalent(cex) => info!("pair {}: not equivalent ({})", index + 1, cex),
        Verdict::Equivalent => {}
    }
    PairResult {
        index: index + 1,
        original: pair.original.clone(),
        simplified: pair.simplified.clone(),
        verdict,
    }
}

/// Verify every pair independently and aggregate the verdicts in input order.
///
/// With `config.jobs > 1` the pairs are spread over a thread pool; each
/// worker builds its own variable table and solver session.
pub fn verify_batch(pairs: &[Pair], config: &Config) -> Report {
    info!("Verifying {} pairs with {} job(s)", pairs.len(), config.jobs);

    let results: Vec<PairResult> = if config.jobs > 1 {
        match rayon::ThreadPoolBuilder::new().num_threads(config.jobs).build() {
            Ok(pool) => pool.install(|| {
                pairs
                    .par_iter()
                    .enumerate()
                    .map(|(i, pair)| verify_indexed(i, pair, config))
                    .collect()
            }),
            Err(e) => {
                warn!("Could not start thread pool ({}), verifying sequentially", e);
                verify_sequential(pairs, config)
            }
        }
    } else {
        verify_sequential(pairs, config)
    };

    let mut report = Report::default();
    for result in results {
        report.summary.record(&result.verdict);
        if !result.verdict.is_equivalent() {
            report.problems.push(result);
        }
    }
    info!(
        "Done: {} equivalent, {} not equivalent, {} errors",
        report.summary.equivalent, report.summary.not_equivalent, report.summary.errors
    );
    report
}

fn verify_sequential(pairs: &[Pair], config: &Config) -> Vec<PairResult> {
    pairs
        .iter()
        .enumerate()
        .map(|(i, pair)| verify_indexed(i, pair, config))
        .collect()
}

pub struct ReportDisplay<'a> {
    report: &'a Report,
    names: &'a NameMap,
}

impl fmt::Display for ReportDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = &self.report.summary;
        writeln!(f, "Verification Summary:")?;
        writeln!(f, "====================")?;
        writeln!(f, "Total pairs processed: {}", summary.total)?;
        writeln!(f, "Equivalent pairs: {}", summary.equivalent)?;
        writeln!(f, "Non-equivalent pairs: {}", summary.not_equivalent)?;
        writeln!(f, "Errors: {}", summary.errors)?;

        if self.report.problems.is_empty() {
            return Ok(());
        }
        writeln!(f)?;
        writeln!(f, "Detailed Results:")?;
        writeln!(f, "================")?;
        for problem in &self.report.problems {
            writeln!(f)?;
            writeln!(f, "Pair {}:", problem.index)?;
            writeln!(f, "Original: {}", problem.original)?;
            writeln!(f, "Simplified: {}", problem.simplified)?;
            match &problem.verdict {
                Verdict::NotEquivalent(cex) => {
                    writeln!(f, "Counterexample:")?;
                    for (name, value) in cex.iter() {
                        writeln!(f, "  {} = {}", self.names.resolve(name), value)?;
                    }
                }
                Verdict::Error(e) => writeln!(f, "Error: {}", e)?,
                Verdict::Equivalent => {}
            }
        }
        Ok(())
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display(&NameMap::default()))
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    fn pairs() -> Vec<Pair> {
        vec![
            Pair::new("a && b", "b && a"),
            Pair::new("(a && b", "a"),
            Pair::new("a && b", "a || b"),
            Pair::new("x + 2 == y", "x == y - 2"),
        ]
    }

    #[test]
    fn test_counts_and_problems() {
        let report = verify_batch(&pairs(), &Config::default());
        assert_eq!(
            report.summary,
            Summary {
                total: 4,
                equivalent: 2,
                not_equivalent: 1,
                errors: 1,
            }
        );
        let indices: Vec<_> = report.problems.iter().map(|p| p.index).collect();
        assert_eq!(indices, vec![2, 3]);
        assert!(matches!(report.problems[0].verdict, Verdict::Error(VerifyError::Parse { .. })));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let sequential = verify_batch(&pairs(), &Config::default());
        let parallel = verify_batch(&pairs(), &Config::default().with_jobs(3));
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_empty_batch() {
        let report = verify_batch(&[], &Config::default());
        assert_eq!(report.summary, Summary::default());
        assert!(report.to_string().ends_with("Errors: 0\n"));
    }

    #[test]
    fn test_text_layout() {
        // The miter is valid, so the unconstrained `A` is reported as false.
        let report = verify_batch(&[Pair::new("A", "!A")], &Config::default());
        let mut names = NameMap::new();
        names.insert("A", "dw.flag");
        let text = report.display(&names).to_string();
        let expected = "Verification Summary:\n\
                        ====================\n\
                        Total pairs processed: 1\n\
                        Equivalent pairs: 0\n\
                        Non-equivalent pairs: 1\n\
                        Errors: 0\n\
                        \n\
                        Detailed Results:\n\
                        ================\n\
                        \n\
                        Pair 1:\n\
                        Original: A\n\
                        Simplified: !A\n\
                        Counterexample:\n  dw.flag = false\n";
        assert_eq!(text, expected);
    }
}
