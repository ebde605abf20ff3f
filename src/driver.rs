use log::{debug, info};
use rustc_hash::FxHashMap;

use crate::assumptions::AssumptionOracle;
use crate::color::{class_of, Color};
use crate::info::InterpolationInfo;
use crate::labeling::{compute_ps_label_map, label_leaf};
use crate::partition::{ClauseRef, PartitionManager, PartitionMask};
use crate::proof::{Lit, NodeId, NodeKind, ProofGraph, ProofNode, Var};
use crate::simplify::simplify_interpolant;
use crate::stats::interpolant_stats;
use crate::term::{TermBank, TermRef};
use crate::theory::{TRes, TheoryHandler};
use crate::TernOptions;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no interpolation system selected; pick one of pudlak, mc-millan, mc-millan-prime, ps, psw, pss")]
    NoSystemSelected,
    #[error("invariant violation: {0}")]
    Invariant(String),
    #[error("theory backend failure: {0}")]
    TheoryBackend(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Walks a resolution refutation leaves-to-root and composes the partial
/// interpolants of its nodes into the interpolant of the root. One driver
/// owns the coloring state of one run; the proof itself stays read-only.
pub struct Driver<'a> {
    options: &'a TernOptions,
    proof: &'a ProofGraph,
    partitions: &'a dyn PartitionManager,
    assumptions: &'a dyn AssumptionOracle,
    theory: Option<&'a mut dyn TheoryHandler>,
    info: InterpolationInfo,
}

impl<'a> Driver<'a> {
    pub fn new(
        options: &'a TernOptions,
        proof: &'a ProofGraph,
        partitions: &'a dyn PartitionManager,
        assumptions: &'a dyn AssumptionOracle,
    ) -> Self {
        Driver {
            options,
            proof,
            partitions,
            assumptions,
            theory: None,
            info: InterpolationInfo::default(),
        }
    }

    pub fn with_theory_handler(mut self, handler: &'a mut dyn TheoryHandler) -> Self {
        self.theory = Some(handler);
        self
    }

    /// Produces the interpolant of the refutation under `a_mask`.
    pub fn produce_interpolant(
        &mut self,
        terms: &mut TermBank,
        a_mask: &PartitionMask,
    ) -> Result<TermRef> {
        let system = self.options.system.ok_or(Error::NoSystemSelected)?;
        info!("using {system} for propositional interpolation");

        let proof = self.proof;
        let root = proof
            .root()
            .ok_or_else(|| Error::Invariant("proof has no empty-clause root".to_string()))?;

        let partitions = self.partitions;
        let assumptions = self.assumptions;
        let vars = proof.variables();
        self.info.reset(proof.len(), &vars, |var| {
            if assumptions.is_assumed_variable(var) {
                // Frame markers have no partition of their own.
                return Ok(Color::AB);
            }
            class_of(&partitions.variable_mask(var), a_mask)
        })?;

        let ps_labels = if system.needs_proof_statistics() {
            Some(compute_ps_label_map(proof, &self.info, partitions, a_mask)?)
        } else {
            None
        };

        for id in proof.topo_order() {
            let node = proof.node(id);
            let partial = if node.is_leaf() {
                label_leaf(system, node, &mut self.info, assumptions, ps_labels.as_ref())?;
                match node.kind {
                    NodeKind::Original { clause_ref } => {
                        self.original_leaf_interpolant(terms, node, clause_ref, a_mask)?
                    }
                    NodeKind::Theory => self.theory_leaf_interpolant(terms, node, a_mask)?,
                    NodeKind::Split => self.split_leaf_interpolant(terms, node)?,
                    // Ignored when interpolating; absorbed by the
                    // assumption-pivot rule further up.
                    NodeKind::Assumption => terms.term_true(),
                    NodeKind::Resolvent { .. } => unreachable!(),
                }
            } else {
                self.resolvent_interpolant(terms, node)?
            };
            self.info.set_partial(id, partial)?;
        }

        let mut interpolant = self.info.partial(root)?;
        if self.options.pedantic_verification {
            self.verify_shared_symbols(terms, interpolant)?;
        }
        if self.options.simplify {
            interpolant = simplify_interpolant(terms, interpolant);
        }
        debug!("interpolant: {}", terms.display(interpolant));
        debug!("interpolant statistics: {}", interpolant_stats(terms, interpolant));
        Ok(interpolant)
    }

    /// Color of `var` in `node`: the class for local variables, the
    /// node's coloring entry for shared ones.
    fn var_color(&self, node: &ProofNode, var: Var) -> Result<Color> {
        match self.info.var_class(var) {
            Some(Color::A) => Ok(Color::A),
            Some(Color::B) => Ok(Color::B),
            Some(Color::AB) => self.info.node_color(node.id, var).ok_or_else(|| {
                Error::Invariant(format!("shared variable {var} has no color in {}", node.id))
            }),
            _ => Err(Error::Invariant(format!("variable {var} has no class"))),
        }
    }

    /// Literals of the clause whose color in this node is `wanted`.
    /// Literals whose negation is assumed are treated as absent.
    fn restricted_clause(&self, node: &ProofNode, wanted: Color) -> Result<Vec<Lit>> {
        let mut restricted = Vec::new();
        for &lit in &node.clause {
            if self.assumptions.is_assumed_literal(!lit) {
                continue;
            }
            if self.var_color(node, lit.var())? == wanted {
                restricted.push(lit);
            }
        }
        Ok(restricted)
    }

    fn original_leaf_interpolant(
        &self,
        terms: &mut TermBank,
        node: &ProofNode,
        clause_ref: ClauseRef,
        a_mask: &PartitionMask,
    ) -> Result<TermRef> {
        let mut clause_class = class_of(&self.partitions.clause_mask(clause_ref), a_mask)?;
        if clause_class == Color::AB {
            // Original clauses are attributed to one side; shared ones
            // arbitrarily go to A.
            clause_class = Color::A;
        }
        let clause_is_a = clause_class == Color::A;
        let restricted = self.restricted_clause(node, clause_class.opposite())?;
        if restricted.is_empty() {
            return Ok(if clause_is_a {
                terms.term_false()
            } else {
                terms.term_true()
            });
        }
        let mut args = Vec::with_capacity(restricted.len());
        for lit in restricted {
            let mut atom = terms.var_term(lit.var());
            if lit.sign() == clause_is_a {
                atom = terms.mk_not(atom);
            }
            args.push(atom);
        }
        Ok(if clause_is_a {
            terms.mk_or(args)
        } else {
            terms.mk_and(args)
        })
    }

    fn split_leaf_interpolant(&self, terms: &mut TermBank, node: &ProofNode) -> Result<TermRef> {
        if node.clause.len() != 2 {
            return Err(Error::Invariant(format!("split {} is not binary", node.id)));
        }
        let color = self.var_color(node, node.clause[0].var())?;
        let other = self.var_color(node, node.clause[1].var())?;
        if color != other {
            // Both atoms of a split range over the same theory variables.
            return Err(Error::Invariant(format!(
                "split {} atoms disagree on color ({color} vs {other})",
                node.id
            )));
        }
        Ok(match color {
            Color::B => terms.term_true(),
            // A-local splits behave like A-clauses; shared splits are
            // arbitrarily read the same way.
            _ => terms.term_false(),
        })
    }

    fn theory_leaf_interpolant(
        &mut self,
        terms: &mut TermBank,
        node: &ProofNode,
        a_mask: &PartitionMask,
    ) -> Result<TermRef> {
        let mut colors: FxHashMap<TermRef, Color> = FxHashMap::default();
        for &lit in &node.clause {
            let color = self.var_color(node, lit.var())?;
            colors.insert(terms.var_term(lit.var()), color);
        }
        let negated: Vec<Lit> = node.clause.iter().map(|&l| !l).collect();
        let handler = self.theory.as_deref_mut().ok_or_else(|| {
            Error::Invariant(format!("theory leaf {} without a theory handler", node.id))
        })?;

        handler.backtrack(-1);
        let interpolant = run_theory_query(handler, terms, &negated, a_mask, &colors);
        handler.backtrack(-1);
        interpolant
    }

    /// Color of the pivot of a resolvent, after merging both antecedents'
    /// colorings into it. Shared pivots give up their entry here; assumed
    /// pivots resolve to `S`.
    fn pivot_color(&mut self, node: &ProofNode) -> Result<Color> {
        let NodeKind::Resolvent { ant1, ant2, pivot } = node.kind else {
            return Err(Error::Invariant(format!("{} is not a resolvent", node.id)));
        };
        let class = self
            .info
            .var_class(pivot)
            .ok_or_else(|| Error::Invariant(format!("pivot {pivot} has no class")))?;
        self.info.merge_from_antecedents(node.id, ant1, ant2);
        if self.assumptions.is_assumed_variable(pivot) {
            return Ok(Color::S);
        }
        match class {
            Color::A | Color::B => Ok(class),
            Color::AB => {
                let color = self.info.node_color(node.id, pivot).ok_or_else(|| {
                    Error::Invariant(format!("pivot {pivot} has no color in {}", node.id))
                })?;
                self.info.clear_pivot(node.id, pivot);
                Ok(color)
            }
            Color::S => Err(Error::Invariant(format!("pivot {pivot} has no class"))),
        }
    }

    fn resolvent_interpolant(&mut self, terms: &mut TermBank, node: &ProofNode) -> Result<TermRef> {
        let NodeKind::Resolvent { ant1, ant2, pivot } = node.kind else {
            return Err(Error::Invariant(format!("{} is not a resolvent", node.id)));
        };
        let i1 = self.info.partial(ant1)?;
        let i2 = self.info.partial(ant2)?;
        match self.pivot_color(node)? {
            Color::A => Ok(terms.mk_or2(i1, i2)),
            Color::B => Ok(terms.mk_and2(i1, i2)),
            Color::AB => {
                let pivot_atom = terms.var_term(pivot);
                let negated_pivot = terms.mk_not(pivot_atom);
                let alternative =
                    self.options.alternative_interpolant && prefer_alternative(terms, i1, i2);
                if alternative {
                    // (I1 /\ ~p) \/ (I2 /\ p)
                    let lhs = terms.mk_and2(i1, negated_pivot);
                    let rhs = terms.mk_and2(i2, pivot_atom);
                    Ok(terms.mk_or2(lhs, rhs))
                } else {
                    // (I1 \/ p) /\ (I2 \/ ~p)
                    let lhs = terms.mk_or2(i1, pivot_atom);
                    let rhs = terms.mk_or2(i2, negated_pivot);
                    Ok(terms.mk_and2(lhs, rhs))
                }
            }
            Color::S => {
                if self.assumptions.is_assumed_literal(Lit::positive(pivot)) {
                    // The positive occurrence of the assumed literal sits
                    // in the first antecedent; keep the other side.
                    Ok(i2)
                } else {
                    Ok(i1)
                }
            }
        }
    }

    fn verify_shared_symbols(&self, terms: &TermBank, interpolant: TermRef) -> Result<()> {
        for var in terms.collect_vars(interpolant) {
            if self.info.var_class(var) != Some(Color::AB) {
                return Err(Error::Invariant(format!(
                    "interpolant mentions non-shared variable {var}"
                )));
            }
        }
        Ok(())
    }

    /// Coloring entry of `var` at `node` after the last run, if any.
    pub fn node_color(&self, node: NodeId, var: Var) -> Option<Color> {
        self.info.node_color(node, var)
    }

    /// Partial interpolant computed for `node` in the last run, if any.
    pub fn partial_interpolant(&self, node: NodeId) -> Option<TermRef> {
        self.info.partial_opt(node)
    }

    /// Class of `var` under the A-mask of the last run, if seeded.
    pub fn variable_class(&self, var: Var) -> Option<Color> {
        self.info.var_class(var)
    }
}

/// For some shapes of I1, I2 the alternative shared-pivot form is
/// structurally smaller than the standard one.
fn prefer_alternative(terms: &TermBank, i1: TermRef, i2: TermRef) -> bool {
    let i1_false = i1 == terms.term_false();
    let i2_false = i2 == terms.term_false();
    let i1_none = !i1_false && i1 != terms.term_true();
    let i2_none = !i2_false && i2 != terms.term_true();
    (i1_false && i2_none) || (i1_none && i2_false) || (i1_false && i2_false)
}

fn run_theory_query(
    handler: &mut dyn TheoryHandler,
    terms: &mut TermBank,
    negated: &[Lit],
    a_mask: &PartitionMask,
    colors: &FxHashMap<TermRef, Color>,
) -> Result<TermRef> {
    let mut satisfiable = handler.assert_literals(negated)?;
    if satisfiable {
        satisfiable = handler.check(true)? != TRes::Unsat;
    }
    if satisfiable {
        return Err(Error::Invariant(
            "asserting the negation of a theory clause did not conflict".to_string(),
        ));
    }
    Ok(handler.get_interpolant(a_mask, colors, terms)?)
}
