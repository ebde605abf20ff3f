use log::debug;
use rustc_hash::FxHashMap;

use crate::assumptions::AssumptionOracle;
use crate::color::{class_of, Color};
use crate::driver::{Error, Result};
use crate::info::InterpolationInfo;
use crate::partition::{PartitionManager, PartitionMask};
use crate::proof::{NodeKind, ProofGraph, ProofNode, Var};
use crate::ItpSystem;

/// Labels computed by the proof-statistics pass, one per AB-shared
/// variable.
pub(crate) type PsLabels = FxHashMap<Var, Color>;

/// Assigns a coloring entry to every AB-shared variable of a leaf clause.
/// A- and B-local variables are covered by their class; assumed variables
/// are filtered at every use site and get no entry at all.
pub(crate) fn label_leaf(
    system: ItpSystem,
    node: &ProofNode,
    info: &mut InterpolationInfo,
    assumptions: &dyn AssumptionOracle,
    ps_labels: Option<&PsLabels>,
) -> Result<()> {
    for lit in &node.clause {
        let var = lit.var();
        if assumptions.is_assumed_variable(var) {
            continue;
        }
        match info.var_class(var) {
            Some(Color::AB) => {}
            Some(Color::A) | Some(Color::B) => continue,
            _ => return Err(Error::Invariant(format!("variable {var} has no class"))),
        }
        let color = match system {
            ItpSystem::Pudlak => Color::AB,
            ItpSystem::McMillan => Color::B,
            ItpSystem::McMillanPrime => Color::A,
            ItpSystem::Ps | ItpSystem::Psw | ItpSystem::Pss => {
                let label = ps_label(ps_labels, var)?;
                match system {
                    ItpSystem::Ps if label == Color::A => Color::A,
                    ItpSystem::Ps => Color::B,
                    ItpSystem::Psw if label == Color::A => Color::A,
                    ItpSystem::Psw => Color::AB,
                    ItpSystem::Pss if label == Color::A => Color::AB,
                    _ => Color::B,
                }
            }
        };
        info.color_var(node.id, var, color);
    }
    Ok(())
}

fn ps_label(ps_labels: Option<&PsLabels>, var: Var) -> Result<Color> {
    let labels = ps_labels.ok_or_else(|| {
        Error::Invariant("proof-sensitive labeling started without a label map".to_string())
    })?;
    labels
        .get(&var)
        .copied()
        .ok_or_else(|| Error::Invariant(format!("no proof-statistics label for {var}")))
}

/// Counts, for every AB-shared variable, its occurrences in A-class
/// versus B-class original leaves, and labels it `A` when the A side
/// strictly wins. Ties and variables without any original occurrence go
/// to `B`. Both occurrence maps are seeded with every AB variable, so
/// their domains always coincide.
pub(crate) fn compute_ps_label_map(
    proof: &ProofGraph,
    info: &InterpolationInfo,
    partitions: &dyn PartitionManager,
    a_mask: &PartitionMask,
) -> Result<PsLabels> {
    let mut occ_a: FxHashMap<Var, usize> = FxHashMap::default();
    let mut occ_b: FxHashMap<Var, usize> = FxHashMap::default();
    for var in proof.variables() {
        if info.var_class(var) == Some(Color::AB) {
            occ_a.insert(var, 0);
            occ_b.insert(var, 0);
        }
    }

    for leaf in proof.leaves() {
        let NodeKind::Original { clause_ref } = leaf.kind else {
            continue;
        };
        let clause_class = class_of(&partitions.clause_mask(clause_ref), a_mask)?;
        for lit in &leaf.clause {
            let var = lit.var();
            if info.var_class(var) != Some(Color::AB) {
                continue;
            }
            match clause_class {
                Color::A => *occ_a.entry(var).or_insert(0) += 1,
                Color::B => *occ_b.entry(var).or_insert(0) += 1,
                _ => {}
            }
        }
    }

    debug_assert_eq!(occ_a.len(), occ_b.len());
    let labels: PsLabels = occ_a
        .iter()
        .map(|(&var, &in_a)| {
            let in_b = occ_b.get(&var).copied().unwrap_or(0);
            let label = if in_a > in_b { Color::A } else { Color::B };
            (var, label)
        })
        .collect();
    debug!("proof statistics cover {} shared variables", labels.len());
    Ok(labels)
}
