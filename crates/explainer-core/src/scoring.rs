//! Rule-based function importance scoring.
//!
//! `score = 2 * fan_in + fan_out + 5 (entry point) + 2 (has docstring)`
//!
//! Ranking is a stable descending sort, so functions with equal scores keep
//! their input order.

use crate::model::FunctionRecord;

const FAN_IN_WEIGHT: u64 = 2;
const FAN_OUT_WEIGHT: u64 = 1;
const ENTRY_POINT_BONUS: u64 = 5;
const DOCSTRING_BONUS: u64 = 2;

/// A function paired with its importance score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredFunction<'a> {
    pub record: &'a FunctionRecord,
    pub score: u64,
}

/// Importance score of a single function.
pub fn score(record: &FunctionRecord) -> u64 {
    let mut total =
        u64::from(record.fan_in) * FAN_IN_WEIGHT + u64::from(record.fan_out) * FAN_OUT_WEIGHT;
    if record.is_entry_point {
        total += ENTRY_POINT_BONUS;
    }
    if record.has_docstring() {
        total += DOCSTRING_BONUS;
    }
    total
}

/// Every function with its score, highest first.
pub fn rank(functions: &[FunctionRecord]) -> Vec<ScoredFunction<'_>> {
    let mut scored: Vec<ScoredFunction<'_>> = functions
        .iter()
        .map(|record| ScoredFunction {
            record,
            score: score(record),
        })
        .collect();
    // sort_by is stable: ties keep input order
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored
}

/// The `n` most important functions, highest score first.
///
/// `n == 0` yields nothing; `n` past the end yields every function.
pub fn select_top_n(functions: &[FunctionRecord], n: usize) -> Vec<&FunctionRecord> {
    let ranked = rank(functions);
    for scored in ranked.iter().take(n) {
        tracing::debug!(function = %scored.record.name, score = scored.score, "selected");
    }
    ranked.into_iter().take(n).map(|s| s.record).collect()
}
