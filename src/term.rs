use std::fmt;

use itertools::Itertools;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::proof::Var;

/// Identity-comparable handle into a [`TermBank`]. Structurally equal
/// terms are interned to the same handle.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct TermRef(u32);

impl TermRef {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum TermData {
    True,
    False,
    Var(Var),
    Not(TermRef),
    And(Box<[TermRef]>),
    Or(Box<[TermRef]>),
}

/// Hash-consed store of propositional terms. Constructors normalize just
/// enough to keep terms canonical: constants fold, duplicate arguments
/// collapse, argument lists are sorted, and double negation cancels.
#[derive(Debug)]
pub struct TermBank {
    terms: Vec<TermData>,
    cache: FxHashMap<TermData, TermRef>,
}

impl Default for TermBank {
    fn default() -> Self {
        TermBank::new()
    }
}

impl TermBank {
    pub fn new() -> Self {
        let mut bank = TermBank {
            terms: Vec::new(),
            cache: FxHashMap::default(),
        };
        bank.intern(TermData::False);
        bank.intern(TermData::True);
        bank
    }

    fn intern(&mut self, data: TermData) -> TermRef {
        if let Some(&term) = self.cache.get(&data) {
            return term;
        }
        let term = TermRef(self.terms.len() as u32);
        self.terms.push(data.clone());
        self.cache.insert(data, term);
        term
    }

    pub fn term_false(&self) -> TermRef {
        TermRef(0)
    }

    pub fn term_true(&self) -> TermRef {
        TermRef(1)
    }

    pub fn var_term(&mut self, var: Var) -> TermRef {
        self.intern(TermData::Var(var))
    }

    pub fn mk_not(&mut self, term: TermRef) -> TermRef {
        if term == self.term_true() {
            return self.term_false();
        }
        if term == self.term_false() {
            return self.term_true();
        }
        if let TermData::Not(inner) = self.terms[term.index()] {
            return inner;
        }
        self.intern(TermData::Not(term))
    }

    pub fn mk_and(&mut self, args: Vec<TermRef>) -> TermRef {
        self.mk_connective(args, true)
    }

    pub fn mk_or(&mut self, args: Vec<TermRef>) -> TermRef {
        self.mk_connective(args, false)
    }

    pub fn mk_and2(&mut self, a: TermRef, b: TermRef) -> TermRef {
        self.mk_and(vec![a, b])
    }

    pub fn mk_or2(&mut self, a: TermRef, b: TermRef) -> TermRef {
        self.mk_or(vec![a, b])
    }

    fn mk_connective(&mut self, mut args: Vec<TermRef>, conjunction: bool) -> TermRef {
        let absorbing = if conjunction {
            self.term_false()
        } else {
            self.term_true()
        };
        let neutral = if conjunction {
            self.term_true()
        } else {
            self.term_false()
        };
        if args.contains(&absorbing) {
            return absorbing;
        }
        args.retain(|&a| a != neutral);
        args.sort_unstable();
        args.dedup();
        match args.len() {
            0 => neutral,
            1 => args[0],
            _ => {
                let args = args.into_boxed_slice();
                if conjunction {
                    self.intern(TermData::And(args))
                } else {
                    self.intern(TermData::Or(args))
                }
            }
        }
    }

    pub fn data(&self, term: TermRef) -> &TermData {
        &self.terms[term.index()]
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Variables mentioned anywhere under `term`.
    pub fn collect_vars(&self, term: TermRef) -> FxHashSet<Var> {
        let mut vars = FxHashSet::default();
        let mut seen = FxHashSet::default();
        let mut worklist = vec![term];
        while let Some(t) = worklist.pop() {
            if !seen.insert(t) {
                continue;
            }
            match self.data(t) {
                TermData::Var(v) => {
                    vars.insert(*v);
                }
                TermData::Not(inner) => worklist.push(*inner),
                TermData::And(args) | TermData::Or(args) => {
                    worklist.extend(args.iter().copied());
                }
                TermData::True | TermData::False => {}
            }
        }
        vars
    }

    /// Truth value of `term` under `assignment`; unassigned variables
    /// default to false.
    pub fn eval(&self, term: TermRef, assignment: &FxHashMap<Var, bool>) -> bool {
        match self.data(term) {
            TermData::True => true,
            TermData::False => false,
            TermData::Var(v) => assignment.get(v).copied().unwrap_or(false),
            TermData::Not(inner) => !self.eval(*inner, assignment),
            TermData::And(args) => args.iter().all(|&a| self.eval(a, assignment)),
            TermData::Or(args) => args.iter().any(|&a| self.eval(a, assignment)),
        }
    }

    pub fn display(&self, term: TermRef) -> TermDisplay<'_> {
        TermDisplay { bank: self, term }
    }
}

/// S-expression rendering of a term, for logs and diagnostics.
pub struct TermDisplay<'a> {
    bank: &'a TermBank,
    term: TermRef,
}

impl fmt::Display for TermDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.bank.data(self.term) {
            TermData::True => f.write_str("true"),
            TermData::False => f.write_str("false"),
            TermData::Var(v) => write!(f, "{v}"),
            TermData::Not(inner) => write!(f, "(not {})", self.bank.display(*inner)),
            TermData::And(args) => {
                let inner = args.iter().map(|&a| self.bank.display(a).to_string()).join(" ");
                write!(f, "(and {inner})")
            }
            TermData::Or(args) => {
                let inner = args.iter().map(|&a| self.bank.display(a).to_string()).join(" ");
                write!(f, "(or {inner})")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_consing_identity() {
        let mut bank = TermBank::new();
        let p = bank.var_term(Var(0));
        let q = bank.var_term(Var(1));
        let a = bank.mk_or2(p, q);
        let b = bank.mk_or2(q, p);
        assert_eq!(a, b);
    }

    #[test]
    fn test_constant_folding() {
        let mut bank = TermBank::new();
        let p = bank.var_term(Var(0));
        let tru = bank.term_true();
        let fls = bank.term_false();
        assert_eq!(bank.mk_or2(p, tru), tru);
        assert_eq!(bank.mk_or2(p, fls), p);
        assert_eq!(bank.mk_and2(p, fls), fls);
        assert_eq!(bank.mk_and2(p, tru), p);
        assert_eq!(bank.mk_or(vec![]), fls);
        assert_eq!(bank.mk_and(vec![]), tru);
    }

    #[test]
    fn test_double_negation_cancels() {
        let mut bank = TermBank::new();
        let p = bank.var_term(Var(0));
        let np = bank.mk_not(p);
        assert_eq!(bank.mk_not(np), p);
        assert_eq!(bank.mk_not(bank.term_true()), bank.term_false());
    }

    #[test]
    fn test_no_complement_folding() {
        // p and (not p) is kept as-is; only constants fold.
        let mut bank = TermBank::new();
        let p = bank.var_term(Var(0));
        let np = bank.mk_not(p);
        let both = bank.mk_and2(p, np);
        assert_ne!(both, bank.term_false());
        assert!(matches!(bank.data(both), TermData::And(args) if args.len() == 2));
    }

    #[test]
    fn test_eval() {
        let mut bank = TermBank::new();
        let p = bank.var_term(Var(0));
        let q = bank.var_term(Var(1));
        let nq = bank.mk_not(q);
        let formula = bank.mk_or2(p, nq);
        let mut assignment = FxHashMap::default();
        assignment.insert(Var(0), false);
        assignment.insert(Var(1), true);
        assert!(!bank.eval(formula, &assignment));
        assignment.insert(Var(0), true);
        assert!(bank.eval(formula, &assignment));
    }
}
