use std::fmt;

use serde::Serialize;

use crate::driver::{Error, Result};
use crate::partition::PartitionMask;

/// Side assignment of a variable or clause. As a *class* it is static
/// (A-local, B-local, or AB-shared); as a *color* it is the per-node
/// refinement of AB-shared variables chosen by the labeling system. `S`
/// only ever shows up as the pivot color of assumption resolvents.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Color {
    A,
    B,
    AB,
    S,
}

impl Color {
    pub fn opposite(self) -> Color {
        match self {
            Color::A => Color::B,
            Color::B => Color::A,
            other => other,
        }
    }

    /// Least upper bound in the labeling lattice: agreeing colors stay,
    /// disagreeing ones widen to `AB`.
    pub fn join(self, other: Color) -> Color {
        if self == other {
            self
        } else {
            Color::AB
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Color::A => "A",
            Color::B => "B",
            Color::AB => "AB",
            Color::S => "S",
        };
        f.write_str(name)
    }
}

/// Derives the class of a mask under the A-mask of the current run.
pub fn class_of(mask: &PartitionMask, a_mask: &PartitionMask) -> Result<Color> {
    let in_a = !(mask & a_mask).is_zero();
    let in_b = !mask.and_not(a_mask).is_zero();
    match (in_a, in_b) {
        (true, false) => Ok(Color::A),
        (false, true) => Ok(Color::B),
        (true, true) => Ok(Color::AB),
        (false, false) => Err(Error::Invariant(
            "no class could be determined from the partition mask".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_widens_on_disagreement() {
        assert_eq!(Color::A.join(Color::A), Color::A);
        assert_eq!(Color::B.join(Color::B), Color::B);
        assert_eq!(Color::A.join(Color::B), Color::AB);
        assert_eq!(Color::AB.join(Color::A), Color::AB);
    }

    #[test]
    fn test_class_from_masks() {
        let a_mask = PartitionMask::singleton(0);
        assert_eq!(
            class_of(&PartitionMask::singleton(0), &a_mask).unwrap(),
            Color::A
        );
        assert_eq!(
            class_of(&PartitionMask::singleton(1), &a_mask).unwrap(),
            Color::B
        );
        assert_eq!(
            class_of(&PartitionMask::from_partitions([0, 1]), &a_mask).unwrap(),
            Color::AB
        );
        assert!(class_of(&PartitionMask::empty(), &a_mask).is_err());
    }
}
