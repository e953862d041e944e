//! Reduces a batch of ref changes to one [`ClassifiedEventType`].
//!
//! ## Transition table
//!
//! | state \ change | created   | closed    | updated   |
//! |----------------|-----------|-----------|-----------|
//! | `Unset`        | `Created` | `Removed` | `Updated` |
//! | `Created`      | `Created` | `Updated` | `Updated` |
//! | `Removed`      | `Updated` | `Removed` | `Updated` |
//! | `Updated`      | `Updated` | `Updated` | `Updated` |
//!
//! `Updated` is absorbing.

use crate::{ClassifiedEventType, RefChange};

/// Running state of a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Accumulator {
    Unset,
    Created,
    Removed,
    Updated,
}

impl Accumulator {
    fn step(self, change: &RefChange) -> Self {
        match (self, change) {
            (Accumulator::Unset | Accumulator::Created, RefChange::Created { .. }) => {
                Accumulator::Created
            }
            (Accumulator::Unset | Accumulator::Removed, RefChange::Closed { .. }) => {
                Accumulator::Removed
            }
            _ => Accumulator::Updated,
        }
    }

    fn finish(self) -> Option<ClassifiedEventType> {
        match self {
            Accumulator::Unset => None,
            Accumulator::Created => Some(ClassifiedEventType::Created),
            Accumulator::Removed => Some(ClassifiedEventType::Removed),
            Accumulator::Updated => Some(ClassifiedEventType::Updated),
        }
    }
}

/// Classifies `changes` in order.
///
/// Returns `None` only for an empty batch; callers route that case to a full
/// reindex instead of dispatching an event.
pub fn classify(changes: &[RefChange]) -> Option<ClassifiedEventType> {
    changes
        .iter()
        .fold(Accumulator::Unset, Accumulator::step)
        .finish()
}
