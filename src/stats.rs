use std::fmt;

use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::term::{TermBank, TermData, TermRef};

/// Size profile of a produced interpolant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct InterpolantStats {
    pub conjunctions: usize,
    pub disjunctions: usize,
    pub negations: usize,
    pub variables: usize,
    pub dag_size: usize,
}

pub fn interpolant_stats(bank: &TermBank, term: TermRef) -> InterpolantStats {
    let mut stats = InterpolantStats::default();
    let mut vars = FxHashSet::default();
    let mut seen = FxHashSet::default();
    let mut worklist = vec![term];
    while let Some(t) = worklist.pop() {
        if !seen.insert(t) {
            continue;
        }
        stats.dag_size += 1;
        match bank.data(t) {
            TermData::And(args) => {
                stats.conjunctions += 1;
                worklist.extend(args.iter().copied());
            }
            TermData::Or(args) => {
                stats.disjunctions += 1;
                worklist.extend(args.iter().copied());
            }
            TermData::Not(inner) => {
                stats.negations += 1;
                worklist.push(*inner);
            }
            TermData::Var(v) => {
                vars.insert(*v);
            }
            TermData::True | TermData::False => {}
        }
    }
    stats.variables = vars.len();
    stats
}

impl fmt::Display for InterpolantStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} conjunctions, {} disjunctions, {} negations, {} variables, dag size {}",
            self.conjunctions, self.disjunctions, self.negations, self.variables, self.dag_size
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proof::Var;

    #[test]
    fn test_counts_shared_subterms_once() {
        let mut bank = TermBank::new();
        let p = bank.var_term(Var(0));
        let q = bank.var_term(Var(1));
        let disj = bank.mk_or2(p, q);
        let ndisj = bank.mk_not(disj);
        let formula = bank.mk_and2(disj, ndisj);
        let stats = interpolant_stats(&bank, formula);
        assert_eq!(stats.conjunctions, 1);
        assert_eq!(stats.disjunctions, 1);
        assert_eq!(stats.negations, 1);
        assert_eq!(stats.variables, 2);
        // p, q, the disjunction, its negation, and the conjunction.
        assert_eq!(stats.dag_size, 5);
    }
}
