use rustc_hash::FxHashMap;

use crate::color::Color;
use crate::partition::PartitionMask;
use crate::proof::Lit;
use crate::term::{TermBank, TermRef};

/// Verdict of a theory-solver check.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TRes {
    Sat,
    Unsat,
}

/// Narrow interface through which theory backends produce partial
/// interpolants for theory lemmas. The engine asserts the negated lemma,
/// expects a conflict, asks for the interpolant under the current A-mask
/// and atom coloring, and resets the backend afterwards.
pub trait TheoryHandler {
    /// Pushes literals onto the backend; `false` signals an immediate
    /// conflict.
    fn assert_literals(&mut self, lits: &[Lit]) -> anyhow::Result<bool>;

    fn check(&mut self, complete: bool) -> anyhow::Result<TRes>;

    /// Theory-level partial interpolant for the currently asserted
    /// (conflicting) literals. `colors` maps each atom term of the lemma
    /// to its color in the leaf being interpolated.
    fn get_interpolant(
        &mut self,
        a_mask: &PartitionMask,
        colors: &FxHashMap<TermRef, Color>,
        terms: &mut TermBank,
    ) -> anyhow::Result<TermRef>;

    /// Backtracks to `level`; level -1 resets to the empty state.
    fn backtrack(&mut self, level: i32);
}
