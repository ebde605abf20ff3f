use egg::{define_language, rewrite, AstSize, Extractor, Id, RecExpr, Rewrite, Runner, Symbol};
use log::info;
use rustc_hash::FxHashMap;

use crate::proof::Var;
use crate::term::{TermBank, TermData, TermRef};

define_language! {
    enum PropLanguage {
        Bool(bool),
        "and" = And(Box<[Id]>),
        "or" = Or(Box<[Id]>),
        "not" = Not(Id),
        Symbol(Symbol),
    }
}

/// This rewriter is tuned to the interpolants the labeling systems
/// produce: constant units, repeated antecedent interpolants, and
/// pivot/negated-pivot pairs.
fn prop_rewrites() -> Vec<Rewrite<PropLanguage, ()>> {
    vec![
        rewrite!("and-comm"; "(and ?a ?b)" => "(and ?b ?a)"),
        rewrite!("or-comm"; "(or ?a ?b)" => "(or ?b ?a)"),
        rewrite!("and-true"; "(and ?a true)" => "?a"),
        rewrite!("and-false"; "(and ?a false)" => "false"),
        rewrite!("or-false"; "(or ?a false)" => "?a"),
        rewrite!("or-true"; "(or ?a true)" => "true"),
        rewrite!("and-idem"; "(and ?a ?a)" => "?a"),
        rewrite!("or-idem"; "(or ?a ?a)" => "?a"),
        rewrite!("not-not"; "(not (not ?a))" => "?a"),
        rewrite!("and-compl"; "(and ?a (not ?a))" => "false"),
        rewrite!("or-compl"; "(or ?a (not ?a))" => "true"),
    ]
}

/// Rewrites `term` into a smaller equivalent form, picked by `AstSize`
/// over the saturated e-graph.
pub fn simplify_interpolant(bank: &mut TermBank, term: TermRef) -> TermRef {
    let expr = to_rec_expr(bank, term);
    let runner = Runner::default().with_expr(&expr).run(&prop_rewrites());
    let root = runner.roots[0];
    let extractor = Extractor::new(&runner.egraph, AstSize);
    let (_, best) = extractor.find_best(root);
    let before = expr.as_ref().len();
    let after = best.as_ref().len();
    info!(
        "reduced interpolant from {} to {} nodes -- {}%",
        before,
        after,
        ((after as f64 - before as f64) / before as f64) * 100.0
    );
    from_rec_expr(bank, &best)
}

fn to_rec_expr(bank: &TermBank, term: TermRef) -> RecExpr<PropLanguage> {
    fn build(
        bank: &TermBank,
        term: TermRef,
        expr: &mut RecExpr<PropLanguage>,
        memo: &mut FxHashMap<TermRef, Id>,
    ) -> Id {
        if let Some(&id) = memo.get(&term) {
            return id;
        }
        let id = match bank.data(term) {
            TermData::True => expr.add(PropLanguage::Bool(true)),
            TermData::False => expr.add(PropLanguage::Bool(false)),
            TermData::Var(v) => expr.add(PropLanguage::Symbol(Symbol::from(v.to_string().as_str()))),
            TermData::Not(inner) => {
                let inner = build(bank, *inner, expr, memo);
                expr.add(PropLanguage::Not(inner))
            }
            TermData::And(args) => {
                let ids: Vec<Id> = args
                    .iter()
                    .map(|&a| build(bank, a, expr, memo))
                    .collect();
                expr.add(PropLanguage::And(ids.into_boxed_slice()))
            }
            TermData::Or(args) => {
                let ids: Vec<Id> = args
                    .iter()
                    .map(|&a| build(bank, a, expr, memo))
                    .collect();
                expr.add(PropLanguage::Or(ids.into_boxed_slice()))
            }
        };
        memo.insert(term, id);
        id
    }

    let mut expr = RecExpr::default();
    let mut memo = FxHashMap::default();
    build(bank, term, &mut expr, &mut memo);
    expr
}

fn from_rec_expr(bank: &mut TermBank, expr: &RecExpr<PropLanguage>) -> TermRef {
    let nodes = expr.as_ref();
    let mut built: Vec<TermRef> = Vec::with_capacity(nodes.len());
    for node in nodes {
        let term = match node {
            PropLanguage::Bool(true) => bank.term_true(),
            PropLanguage::Bool(false) => bank.term_false(),
            PropLanguage::Not(id) => {
                let inner = built[usize::from(*id)];
                bank.mk_not(inner)
            }
            PropLanguage::And(ids) => {
                let args = ids.iter().map(|&id| built[usize::from(id)]).collect();
                bank.mk_and(args)
            }
            PropLanguage::Or(ids) => {
                let args = ids.iter().map(|&id| built[usize::from(id)]).collect();
                bank.mk_or(args)
            }
            PropLanguage::Symbol(symbol) => {
                // Symbols are produced by to_rec_expr, always "v<index>".
                let index = symbol
                    .as_str()
                    .strip_prefix('v')
                    .and_then(|digits| digits.parse().ok())
                    .unwrap();
                bank.var_term(Var(index))
            }
        };
        built.push(term);
    }
    *built.last().unwrap()
}
