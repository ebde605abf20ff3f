use rustc_hash::FxHashSet;

use crate::proof::{Lit, Var};

/// Tells the engine which literals are incremental frame markers. Those
/// take part in the proof but must stay invisible in the interpolant.
pub trait AssumptionOracle {
    fn is_assumed_variable(&self, var: Var) -> bool;
    fn is_assumed_literal(&self, lit: Lit) -> bool;
}

/// Oracle for proofs without incremental frames.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoAssumptions;

impl AssumptionOracle for NoAssumptions {
    fn is_assumed_variable(&self, _var: Var) -> bool {
        false
    }

    fn is_assumed_literal(&self, _lit: Lit) -> bool {
        false
    }
}

/// Set of frame literals assumed true by the incremental solver.
#[derive(Clone, Debug, Default)]
pub struct FrameAssumptions {
    lits: FxHashSet<Lit>,
    vars: FxHashSet<Var>,
}

impl FrameAssumptions {
    pub fn new() -> Self {
        FrameAssumptions::default()
    }

    pub fn assume(&mut self, lit: Lit) {
        self.vars.insert(lit.var());
        self.lits.insert(lit);
    }
}

impl AssumptionOracle for FrameAssumptions {
    fn is_assumed_variable(&self, var: Var) -> bool {
        self.vars.contains(&var)
    }

    fn is_assumed_literal(&self, lit: Lit) -> bool {
        self.lits.contains(&lit)
    }
}
