use rustc_hash::FxHashMap;

use crate::color::Color;
use crate::driver::{Error, Result};
use crate::proof::{NodeId, Var};
use crate::term::TermRef;

/// Per-run interpolation state: the variable-class cache, the per-node
/// colorings of AB-shared variables, and the write-once partial
/// interpolant slot of every proof node. Lives in side tables keyed by
/// node id so a run never touches the proof itself.
#[derive(Default, Debug)]
pub(crate) struct InterpolationInfo {
    var_class: FxHashMap<Var, Color>,
    coloring: Vec<FxHashMap<Var, Color>>,
    partial: Vec<Option<TermRef>>,
}

impl InterpolationInfo {
    /// Clears all state, resizes to the proof, and seeds every variable's
    /// class through `classify`.
    pub fn reset(
        &mut self,
        node_count: usize,
        vars: &[Var],
        mut classify: impl FnMut(Var) -> Result<Color>,
    ) -> Result<()> {
        self.var_class.clear();
        self.coloring.clear();
        self.coloring.resize_with(node_count, FxHashMap::default);
        self.partial.clear();
        self.partial.resize(node_count, None);
        for &var in vars {
            let class = classify(var)?;
            self.var_class.insert(var, class);
        }
        Ok(())
    }

    pub fn var_class(&self, var: Var) -> Option<Color> {
        self.var_class.get(&var).copied()
    }

    pub fn color_var(&mut self, node: NodeId, var: Var, color: Color) {
        self.coloring[node.index()].insert(var, color);
    }

    pub fn node_color(&self, node: NodeId, var: Var) -> Option<Color> {
        self.coloring
            .get(node.index())
            .and_then(|coloring| coloring.get(&var))
            .copied()
    }

    /// Joins both antecedents' colorings into the resolvent's.
    pub fn merge_from_antecedents(&mut self, node: NodeId, ant1: NodeId, ant2: NodeId) {
        let mut merged = self.coloring[ant1.index()].clone();
        for (&var, &color) in &self.coloring[ant2.index()] {
            merged
                .entry(var)
                .and_modify(|c| *c = c.join(color))
                .or_insert(color);
        }
        self.coloring[node.index()] = merged;
    }

    /// The pivot is eliminated by resolution; its entry must not travel
    /// further up.
    pub fn clear_pivot(&mut self, node: NodeId, pivot: Var) {
        self.coloring[node.index()].remove(&pivot);
    }

    pub fn set_partial(&mut self, node: NodeId, term: TermRef) -> Result<()> {
        let slot = &mut self.partial[node.index()];
        if slot.is_some() {
            return Err(Error::Invariant(format!(
                "partial interpolant of {node} set twice"
            )));
        }
        *slot = Some(term);
        Ok(())
    }

    pub fn partial(&self, node: NodeId) -> Result<TermRef> {
        self.partial[node.index()].ok_or_else(|| {
            Error::Invariant(format!("partial interpolant of {node} was never computed"))
        })
    }

    pub fn partial_opt(&self, node: NodeId) -> Option<TermRef> {
        self.partial.get(node.index()).copied().flatten()
    }
}
