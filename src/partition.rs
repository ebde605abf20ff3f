use std::ops::{BitAnd, BitOr};

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::proof::{Lit, Var};

/// Reference to an original clause, used to look up its partition mask.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ClauseRef(pub u32);

/// A set of formula partitions. The A-mask of an interpolation run is one
/// of these; membership on the B side is membership outside the A-mask.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Default)]
pub struct PartitionMask {
    words: SmallVec<[u64; 1]>,
}

impl PartitionMask {
    pub fn empty() -> Self {
        PartitionMask::default()
    }

    pub fn singleton(partition: usize) -> Self {
        let mut mask = PartitionMask::default();
        mask.insert(partition);
        mask
    }

    pub fn from_partitions(partitions: impl IntoIterator<Item = usize>) -> Self {
        let mut mask = PartitionMask::default();
        for partition in partitions {
            mask.insert(partition);
        }
        mask
    }

    pub fn insert(&mut self, partition: usize) {
        let word = partition / 64;
        if self.words.len() <= word {
            self.words.resize(word + 1, 0);
        }
        self.words[word] |= 1 << (partition % 64);
    }

    pub fn contains(&self, partition: usize) -> bool {
        let word = partition / 64;
        self.words.len() > word && self.words[word] & (1 << (partition % 64)) != 0
    }

    pub fn is_zero(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Bits of `self` outside `other`; stands in for `self & !other` on a
    /// bitset without a finite complement.
    pub fn and_not(&self, other: &PartitionMask) -> PartitionMask {
        let words = self
            .words
            .iter()
            .enumerate()
            .map(|(i, &w)| w & !other.words.get(i).copied().unwrap_or(0))
            .collect();
        PartitionMask::normalized(words)
    }

    // Trailing zero words would break the derived equality.
    fn normalized(mut words: SmallVec<[u64; 1]>) -> PartitionMask {
        while words.last() == Some(&0) {
            words.pop();
        }
        PartitionMask { words }
    }

    pub fn union_with(&mut self, other: &PartitionMask) {
        if self.words.len() < other.words.len() {
            self.words.resize(other.words.len(), 0);
        }
        for (i, &w) in other.words.iter().enumerate() {
            self.words[i] |= w;
        }
    }
}

impl BitAnd for &PartitionMask {
    type Output = PartitionMask;

    fn bitand(self, other: &PartitionMask) -> PartitionMask {
        let words = self
            .words
            .iter()
            .zip(other.words.iter())
            .map(|(&a, &b)| a & b)
            .collect();
        PartitionMask::normalized(words)
    }
}

impl BitOr for &PartitionMask {
    type Output = PartitionMask;

    fn bitor(self, other: &PartitionMask) -> PartitionMask {
        let mut out = self.clone();
        out.union_with(other);
        out
    }
}

/// Source of partition masks for variables and original clauses.
pub trait PartitionManager {
    fn variable_mask(&self, var: Var) -> PartitionMask;
    fn clause_mask(&self, clause: ClauseRef) -> PartitionMask;
}

/// In-memory partition bookkeeping. Variable masks accumulate the
/// partitions of the clauses they are recorded in.
#[derive(Default, Debug)]
pub struct PartitionStore {
    clause_masks: Vec<PartitionMask>,
    var_masks: FxHashMap<Var, PartitionMask>,
}

impl PartitionStore {
    pub fn new() -> Self {
        PartitionStore::default()
    }

    /// Records an original clause belonging to `partition`.
    pub fn record_clause(&mut self, lits: &[Lit], partition: usize) -> ClauseRef {
        self.record_clause_with_mask(lits, PartitionMask::singleton(partition))
    }

    pub fn record_clause_with_mask(&mut self, lits: &[Lit], mask: PartitionMask) -> ClauseRef {
        for lit in lits {
            self.var_masks
                .entry(lit.var())
                .or_default()
                .union_with(&mask);
        }
        let clause_ref = ClauseRef(self.clause_masks.len() as u32);
        self.clause_masks.push(mask);
        clause_ref
    }

    /// Marks a variable as occurring in `partition` without recording a
    /// clause, e.g. for theory atoms.
    pub fn record_variable(&mut self, var: Var, partition: usize) {
        self.var_masks.entry(var).or_default().insert(partition);
    }
}

impl PartitionManager for PartitionStore {
    fn variable_mask(&self, var: Var) -> PartitionMask {
        self.var_masks.get(&var).cloned().unwrap_or_default()
    }

    fn clause_mask(&self, clause: ClauseRef) -> PartitionMask {
        self.clause_masks[clause.0 as usize].clone()
    }
}
