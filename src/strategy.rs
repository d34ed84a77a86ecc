//! Cutoff policies: when are two dependency lists "the same", so that recomputation can stop and
//! the previous value is returned?

use crate::dependency::Dependency;

/// How a memo compares the current dependencies with its snapshot, and how it stores the snapshot.
///
/// Chosen once when the memo is built.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// Positional identity. Same length, and each element is [`Dependency::identical`] to the
    /// element at the same index. The snapshot is a shallow copy.
    Strict,
    /// Deep structural equality, see [`Dependency::structurally_equal`]. The snapshot is a deep
    /// copy, so that mutating a dependency in place is detected on the next call.
    #[default]
    Structural,
}

impl Strategy {
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            Strategy::Strict
        } else {
            Strategy::Structural
        }
    }

    pub fn is_strict(self) -> bool {
        self == Strategy::Strict
    }

    pub fn equal<D: Dependency>(self, snapshot: &[D], current: &[D]) -> bool {
        match self {
            Strategy::Strict => {
                snapshot.len() == current.len()
                    && snapshot.iter().zip(current).all(|(a, b)| a.identical(b))
            }
            Strategy::Structural => {
                snapshot.len() == current.len()
                    && snapshot
                        .iter()
                        .zip(current)
                        .all(|(a, b)| a.structurally_equal(b))
            }
        }
    }

    /// Turns the dependencies that were just used for a computation into the snapshot to compare
    /// the next call against.
    pub fn snapshot<D: Dependency>(self, current: Vec<D>) -> Vec<D> {
        match self {
            Strategy::Strict => current,
            Strategy::Structural => current.iter().map(Dependency::deep_clone).collect(),
        }
    }
}
