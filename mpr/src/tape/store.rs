use super::{Clause, Tape, TapeView};
use crate::Error;

/// Reference to the tape used by a cell
///
/// This is a plain index into either the root [`Tape`] or a
/// [`SubtapeStore`], so cells can be copied between stages without borrowing.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum TapeRef {
    /// The full tape
    #[default]
    Root,
    /// A subtape within the per-frame store
    Stored {
        /// Offset of the first clause
        start: u32,
        /// Number of clauses
        len: u32,
        /// Number of `min` / `max` clauses
        choices: u32,
    },
}

/// Fixed-capacity arena of subtapes, reset at the start of every frame
///
/// Pushing never reallocates; once the capacity is reached, further pushes
/// return [`Error::SubtapeStoreFull`].
#[derive(Debug)]
pub struct SubtapeStore {
    clauses: Vec<Clause>,
    capacity: usize,
}

impl SubtapeStore {
    /// Builds a new store with room for `capacity` clauses in total
    pub fn new(capacity: usize) -> Self {
        Self {
            clauses: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a subtape, returning a reference to it
    pub fn push(
        &mut self,
        clauses: &[Clause],
        choices: usize,
    ) -> Result<TapeRef, Error> {
        if self.clauses.len() + clauses.len() > self.capacity {
            return Err(Error::SubtapeStoreFull(self.capacity));
        }
        let start = self.clauses.len() as u32;
        self.clauses.extend_from_slice(clauses);
        Ok(TapeRef::Stored {
            start,
            len: clauses.len() as u32,
            choices: choices as u32,
        })
    }

    /// Resolves a [`TapeRef`] into a borrowed tape
    ///
    /// # Panics
    /// If the reference points outside of the store, which can only happen if
    /// it was created before the most recent [`clear`](Self::clear).
    pub fn view<'a>(&'a self, root: &'a Tape, r: TapeRef) -> TapeView<'a> {
        match r {
            TapeRef::Root => root.view(),
            TapeRef::Stored {
                start,
                len,
                choices,
            } => {
                let start = start as usize;
                TapeView::new(
                    &self.clauses[start..start + len as usize],
                    choices as usize,
                )
            }
        }
    }

    /// Removes every subtape
    pub fn clear(&mut self) {
        self.clauses.clear();
    }

    /// Returns the number of clauses currently stored
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// Checks whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Returns the maximum number of clauses
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
